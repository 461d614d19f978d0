//! Data-URI decoding for captured signatures.
//!
//! Accepted shape: `data:image/<type>;base64,<body>` where `<type>` is one of
//! png, jpg, jpeg or gif (case-insensitive). Anything else is rejected before
//! a single byte touches the filesystem.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, SignlinkError};

/// Decoded-size ceiling: 5 MiB.
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    Png,
    Jpg,
    Jpeg,
    Gif,
}

impl ImageType {
    pub fn from_subtype(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Some(ImageType::Png),
            "jpg" => Some(ImageType::Jpg),
            "jpeg" => Some(ImageType::Jpeg),
            "gif" => Some(ImageType::Gif),
            _ => None,
        }
    }

    /// File extension; mirrors the subtype the client declared.
    pub fn extension(self) -> &'static str {
        match self {
            ImageType::Png => "png",
            ImageType::Jpg => "jpg",
            ImageType::Jpeg => "jpeg",
            ImageType::Gif => "gif",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ImageType::Png => "image/png",
            ImageType::Jpg | ImageType::Jpeg => "image/jpeg",
            ImageType::Gif => "image/gif",
        }
    }

    /// Recover the type from a stored filename's extension.
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = name
            .strip_suffix(crate::paths::CLAIM_SUFFIX)
            .unwrap_or(name)
            .rsplit('.')
            .next()?;
        Self::from_subtype(ext)
    }
}

impl fmt::Display for ImageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub image_type: ImageType,
    pub bytes: Vec<u8>,
}

/// Parse and decode a data-URI payload, enforcing the type allow-list and
/// the `limit` on decoded size.
pub fn decode_data_uri(payload: &str, limit: usize) -> Result<DecodedImage> {
    let rest = payload
        .trim()
        .strip_prefix("data:image/")
        .ok_or(SignlinkError::InvalidImageType)?;
    let (subtype, body) = rest
        .split_once(";base64,")
        .ok_or(SignlinkError::InvalidImageType)?;
    let image_type = ImageType::from_subtype(subtype).ok_or(SignlinkError::InvalidImageType)?;

    // Cheap upper bound first so oversized bodies are never decoded.
    let estimated = body.len() / 4 * 3;
    if estimated > limit + 3 {
        return Err(SignlinkError::ImageTooLarge {
            size: estimated,
            limit,
        });
    }

    let bytes = STANDARD
        .decode(body.trim())
        .map_err(|_| SignlinkError::InvalidImageData)?;
    if bytes.is_empty() {
        return Err(SignlinkError::InvalidImageData);
    }
    if bytes.len() > limit {
        return Err(SignlinkError::ImageTooLarge {
            size: bytes.len(),
            limit,
        });
    }
    Ok(DecodedImage { image_type, bytes })
}

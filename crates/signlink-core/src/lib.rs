pub mod config;
pub mod error;
pub mod image;
pub mod io;
pub mod link;
pub mod paths;
pub mod store;
pub mod wire;

pub use error::{Result, SignlinkError};

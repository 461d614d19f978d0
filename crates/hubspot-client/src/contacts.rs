use std::time::Duration;

use reqwest::StatusCode;

use crate::types::PropertyPatch;
use crate::{status_error, HubSpotClient, Result};

impl HubSpotClient {
    /// Patch properties on the contact whose `email` matches.
    ///
    /// Addressed by identifying attribute (`idProperty=email`), so no prior
    /// lookup of the contact id is needed. Anything but `200 OK` is an error.
    pub async fn update_contact_by_email(
        &self,
        email: &str,
        patch: &PropertyPatch,
        timeout: Duration,
    ) -> Result<()> {
        let mut url = self.endpoint(&["crm", "v3", "objects", "contacts", email])?;
        url.query_pairs_mut().append_pair("idProperty", "email");

        let resp = self
            .http
            .patch(url)
            .bearer_auth(&self.token)
            .timeout(timeout)
            .json(patch)
            .send()
            .await?;

        if resp.status() != StatusCode::OK {
            return Err(status_error(resp).await);
        }
        tracing::debug!(email, properties = patch.properties.len(), "contact patched");
        Ok(())
    }
}

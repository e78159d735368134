// Session API port profile endpoints (rest/portconf)

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::PortProfile;

impl LegacyClient {
    /// List all port profiles.
    ///
    /// `GET /api/s/{site}/rest/portconf`
    pub async fn list_port_profiles(&self) -> Result<Vec<PortProfile>, Error> {
        let url = self.site_url("rest/portconf")?;
        debug!("listing port profiles");
        self.get(url).await
    }

    /// Write a full port profile record back.
    ///
    /// `PUT /api/s/{site}/rest/portconf/{_id}`
    pub async fn update_port_profile(&self, profile: &PortProfile) -> Result<(), Error> {
        let url = self.site_url(&format!("rest/portconf/{}", profile.id))?;
        debug!(id = %profile.id, name = %profile.name, "updating port profile");
        let _: Vec<serde_json::Value> = self.put(url, profile).await?;
        Ok(())
    }
}

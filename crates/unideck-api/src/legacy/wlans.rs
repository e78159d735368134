// Session API WLAN endpoints (rest/wlanconf)

use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::WlanConf;

impl LegacyClient {
    /// List all wireless networks.
    ///
    /// `GET /api/s/{site}/rest/wlanconf`
    pub async fn list_wlans(&self) -> Result<Vec<WlanConf>, Error> {
        let url = self.site_url("rest/wlanconf")?;
        debug!("listing wlans");
        self.get(url).await
    }

    /// Write a full WLAN record back.
    ///
    /// `PUT /api/s/{site}/rest/wlanconf/{_id}`
    pub async fn update_wlan(&self, wlan: &WlanConf) -> Result<(), Error> {
        let url = self.site_url(&format!("rest/wlanconf/{}", wlan.id))?;
        debug!(id = %wlan.id, "updating wlan");
        let _: Vec<serde_json::Value> = self.put(url, wlan).await?;
        Ok(())
    }

    /// Delete a WLAN.
    ///
    /// `DELETE /api/s/{site}/rest/wlanconf/{_id}`
    pub async fn delete_wlan(&self, id: &str) -> Result<(), Error> {
        let url = self.site_url(&format!("rest/wlanconf/{id}"))?;
        debug!(id, "deleting wlan");
        let _: Vec<serde_json::Value> = self.delete(url).await?;
        Ok(())
    }
}

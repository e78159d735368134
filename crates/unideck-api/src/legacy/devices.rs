// Session API device endpoints
//
// Switch lookup via stat/device, the lightweight device list for option
// building, per-port power cycling via cmd/devmgr and port override
// writes via rest/device.

use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::legacy::client::LegacyClient;
use crate::legacy::models::{DeviceBasic, PortOverride, SwitchDevice};

impl LegacyClient {
    /// Get a single device by MAC address.
    ///
    /// `POST /api/s/{site}/stat/device` with `{"macs": [mac]}`. Returns
    /// `None` if the controller reports no device for that MAC.
    pub async fn get_device(&self, mac: &str) -> Result<Option<SwitchDevice>, Error> {
        let url = self.site_url("stat/device")?;
        debug!(mac, "fetching device");
        let body = json!({ "macs": [mac.to_lowercase()] });
        let devices: Vec<SwitchDevice> = self.post(url, &body).await?;
        Ok(devices.into_iter().next())
    }

    /// List every adopted device with only identity fields.
    ///
    /// `GET /api/s/{site}/stat/device-basic`
    pub async fn list_devices_basic(&self) -> Result<Vec<DeviceBasic>, Error> {
        let url = self.site_url("stat/device-basic")?;
        debug!("listing devices (basic)");
        self.get(url).await
    }

    /// Power-cycle a single PoE port on a switch.
    ///
    /// `POST /api/s/{site}/cmd/devmgr` with
    /// `{"cmd": "power-cycle", "mac": "...", "port_idx": N}`
    pub async fn power_cycle_port(&self, mac: &str, port_idx: u32) -> Result<(), Error> {
        let url = self.site_url("cmd/devmgr")?;
        debug!(mac, port_idx, "power-cycling port");
        let _: Vec<serde_json::Value> = self
            .post(
                url,
                &json!({
                    "cmd": "power-cycle",
                    "mac": mac.to_lowercase(),
                    "port_idx": port_idx,
                }),
            )
            .await?;
        Ok(())
    }

    /// Replace a device's port override list.
    ///
    /// `PUT /api/s/{site}/rest/device/{id}` with `{"port_overrides": [...]}`.
    /// The list is written whole; entries not present are dropped by the
    /// controller, so callers send back everything they read.
    pub async fn set_port_overrides(
        &self,
        device_id: &str,
        overrides: &[PortOverride],
    ) -> Result<(), Error> {
        let url = self.site_url(&format!("rest/device/{device_id}"))?;
        debug!(device_id, count = overrides.len(), "writing port overrides");
        let _: Vec<serde_json::Value> = self
            .put(url, &json!({ "port_overrides": overrides }))
            .await?;
        Ok(())
    }
}

// Session API response types
//
// Models for the controller's session ("legacy") JSON API. All responses are
// wrapped in the `LegacyResponse<T>` envelope. Each record names the fields
// the adapter reads or writes; everything else is carried verbatim in
// `extra` so a read-modify-write cycle sends back what it received.
//
// Identity fields (`_id`, `mac`, `name`, `port_idx`) are required. A record
// missing one fails deserialization instead of defaulting silently.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard session API response envelope.
///
/// Every endpoint wraps its payload:
/// ```json
/// { "meta": { "rc": "ok", "msg": "optional" }, "data": [...] }
/// ```
#[derive(Debug, Deserialize)]
pub struct LegacyResponse<T> {
    pub meta: Meta,
    pub data: Vec<T>,
}

/// Metadata from the envelope. `rc` == `"ok"` means success.
#[derive(Debug, Deserialize)]
pub struct Meta {
    pub rc: String,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Envelope shape used only to pull `meta.msg` out of error responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub meta: Meta,
}

// ── Devices ──────────────────────────────────────────────────────────

/// Switch device from `stat/device`, reduced to what port configuration needs.
///
/// `port_overrides` is required: a device without it cannot be
/// reconfigured per port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchDevice {
    #[serde(rename = "_id")]
    pub id: String,
    pub mac: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub port_overrides: Vec<PortOverride>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One entry of a switch's `port_overrides` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortOverride {
    pub port_idx: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poe_mode: Option<String>,
    /// Passthrough fields (name, portconf_id, op_mode, ...).
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl PortOverride {
    /// A fresh override carrying only a POE mode.
    pub fn with_poe_mode(port_idx: u32, poe_mode: impl Into<String>) -> Self {
        Self {
            port_idx,
            poe_mode: Some(poe_mode.into()),
            extra: serde_json::Map::new(),
        }
    }
}

/// Lightweight device entry from `stat/device-basic`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceBasic {
    pub mac: String,
    /// `usw` for switches, `uap` for access points, `ugw`/`udm` for gateways.
    #[serde(default, rename = "type")]
    pub device_type: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DeviceBasic {
    pub fn is_switch(&self) -> bool {
        self.device_type.as_deref() == Some("usw")
    }
}

// ── Port profiles ────────────────────────────────────────────────────

/// Port profile from `rest/portconf`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortProfile {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poe_mode: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

// ── WLANs ────────────────────────────────────────────────────────────

/// Wireless network from `rest/wlanconf`. `name` is the broadcast SSID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WlanConf {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x_passphrase: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn switch_device_keeps_passthrough_fields() {
        let raw = json!({
            "_id": "5f00",
            "mac": "aa:bb:cc:dd:ee:ff",
            "type": "usw",
            "port_overrides": [
                { "port_idx": 1, "poe_mode": "auto", "name": "Camera", "portconf_id": "p1" }
            ]
        });
        let device: SwitchDevice = serde_json::from_value(raw).unwrap();
        assert_eq!(device.id, "5f00");
        assert_eq!(device.port_overrides[0].poe_mode.as_deref(), Some("auto"));
        assert_eq!(device.port_overrides[0].extra["name"], json!("Camera"));

        let back = serde_json::to_value(&device.port_overrides[0]).unwrap();
        assert_eq!(
            back,
            json!({ "port_idx": 1, "poe_mode": "auto", "name": "Camera", "portconf_id": "p1" })
        );
    }

    #[test]
    fn switch_device_without_overrides_is_rejected() {
        let raw = json!({ "_id": "5f00", "mac": "aa:bb:cc:dd:ee:ff" });
        let err = serde_json::from_value::<SwitchDevice>(raw).unwrap_err();
        assert!(err.to_string().contains("port_overrides"));
    }

    #[test]
    fn wlan_requires_id() {
        let raw = json!({ "name": "GuestNet", "enabled": true });
        assert!(serde_json::from_value::<WlanConf>(raw).is_err());
    }

    #[test]
    fn device_basic_switch_detection() {
        let sw: DeviceBasic =
            serde_json::from_value(json!({ "mac": "aa", "type": "usw" })).unwrap();
        let ap: DeviceBasic =
            serde_json::from_value(json!({ "mac": "bb", "type": "uap" })).unwrap();
        assert!(sw.is_switch());
        assert!(!ap.is_switch());
    }
}

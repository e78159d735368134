// ── Domain model ──
//
// Validated value types for action parameters, the connection status the
// host observes, and the option list entries behind its pickers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::CoreError;

// ── MacAddress ──────────────────────────────────────────────────────

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MacAddress(String);

impl MacAddress {
    /// Parse and normalize a MAC address.
    /// Accepts colon-separated, dash-separated, or bare hex.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, CoreError> {
        let raw = raw.as_ref().trim();
        let hex: String = raw
            .chars()
            .filter(|c| *c != ':' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();

        if hex.len() != 12 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::ValidationFailed {
                message: format!("invalid MAC address {raw:?}"),
            });
        }

        let pairs: Vec<&str> = (0..6).map(|i| &hex[i * 2..i * 2 + 2]).collect();
        Ok(Self(pairs.join(":")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for MacAddress {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MacAddress> for String {
    fn from(mac: MacAddress) -> Self {
        mac.0
    }
}

// ── PortIndex ───────────────────────────────────────────────────────

/// Switch port number, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PortIndex(u32);

impl PortIndex {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 100;

    pub fn new(port: u32) -> Result<Self, CoreError> {
        if (Self::MIN..=Self::MAX).contains(&port) {
            Ok(Self(port))
        } else {
            Err(CoreError::ValidationFailed {
                message: format!(
                    "port {port} is out of range ({}-{})",
                    Self::MIN,
                    Self::MAX
                ),
            })
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PortIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ── PoeMode ─────────────────────────────────────────────────────────

/// Per-port power delivery setting. The string form is the controller's
/// wire value.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PoeMode {
    Auto,
    Pasv24,
    Off,
}

impl PoeMode {
    /// Human label for pickers.
    pub fn label(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Pasv24 => "24V Passive",
            Self::Off => "Off",
        }
    }

    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        raw.parse().map_err(|_| CoreError::ValidationFailed {
            message: format!(
                "unknown POE mode {raw:?} (expected one of: {})",
                Self::iter().map(|m| m.to_string()).collect::<Vec<_>>().join(", ")
            ),
        })
    }
}

// ── WiFi updates ────────────────────────────────────────────────────

/// Minimum WPA passphrase length accepted by the controller.
pub const MIN_PASSPHRASE_LEN: usize = 8;

/// Exactly one change to a WiFi network.
#[derive(Clone, PartialEq, Eq)]
pub enum WifiUpdate {
    /// Rename the broadcast SSID.
    Ssid(String),
    Passphrase(String),
    Enabled(bool),
    Delete,
}

impl WifiUpdate {
    /// Reject values the controller would refuse, before any network call.
    pub fn validate(&self) -> Result<(), CoreError> {
        match self {
            Self::Ssid(ssid) if ssid.trim().is_empty() => Err(CoreError::ValidationFailed {
                message: "SSID must not be empty".into(),
            }),
            Self::Passphrase(pass) if pass.chars().count() < MIN_PASSPHRASE_LEN => {
                Err(CoreError::ValidationFailed {
                    message: format!(
                        "passphrase must be at least {MIN_PASSPHRASE_LEN} characters"
                    ),
                })
            }
            _ => Ok(()),
        }
    }

    /// Renames and deletes change which networks exist under which name.
    pub fn changes_network_list(&self) -> bool {
        matches!(self, Self::Ssid(_) | Self::Delete)
    }
}

impl fmt::Debug for WifiUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssid(ssid) => f.debug_tuple("Ssid").field(ssid).finish(),
            Self::Passphrase(_) => f.write_str("Passphrase([REDACTED])"),
            Self::Enabled(on) => f.debug_tuple("Enabled").field(on).finish(),
            Self::Delete => f.write_str("Delete"),
        }
    }
}

// ── Connection status ───────────────────────────────────────────────

/// Connection status observable by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionStatus {
    Ok,
    Connecting,
    Disconnected,
    ConnectionFailure,
}

// ── Option lists ────────────────────────────────────────────────────

/// One selectable entry in a picker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionEntry {
    pub id: String,
    pub label: String,
}

impl OptionEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// The three cached option lists. Each list is replaced wholesale on refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OptionLists {
    pub switches: Vec<OptionEntry>,
    pub profiles: Vec<OptionEntry>,
    pub networks: Vec<OptionEntry>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn mac_address_normalizes_dashes_and_case() {
        let mac = MacAddress::new("AA-BB-CC-DD-EE-FF").unwrap();
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");

        let mac: MacAddress = "aabbccddeeff".parse().unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:ff");
    }

    #[test]
    fn mac_address_rejects_garbage() {
        assert!(MacAddress::new("").is_err());
        assert!(MacAddress::new("aa:bb:cc:dd:ee").is_err());
        assert!(MacAddress::new("zz:bb:cc:dd:ee:ff").is_err());
    }

    #[test]
    fn port_index_bounds() {
        assert!(PortIndex::new(0).is_err());
        assert_eq!(PortIndex::new(1).unwrap().get(), 1);
        assert_eq!(PortIndex::new(100).unwrap().get(), 100);
        assert!(PortIndex::new(101).is_err());
    }

    #[test]
    fn poe_mode_wire_values_and_labels() {
        assert_eq!(PoeMode::Pasv24.to_string(), "pasv24");
        assert_eq!(PoeMode::parse("off").unwrap(), PoeMode::Off);
        assert_eq!(PoeMode::Pasv24.label(), "24V Passive");
        let err = PoeMode::parse("48v").unwrap_err();
        assert!(err.to_string().contains("auto, pasv24, off"));
    }

    #[test]
    fn wifi_update_validation() {
        assert!(WifiUpdate::Ssid(String::new()).validate().is_err());
        assert!(WifiUpdate::Ssid("  ".into()).validate().is_err());
        assert!(WifiUpdate::Ssid("Office".into()).validate().is_ok());
        assert!(WifiUpdate::Passphrase("short".into()).validate().is_err());
        assert!(WifiUpdate::Passphrase("1234567".into()).validate().is_err());
        assert!(WifiUpdate::Passphrase("12345678".into()).validate().is_ok());
        assert!(WifiUpdate::Enabled(false).validate().is_ok());
        assert!(WifiUpdate::Delete.validate().is_ok());
    }

    #[test]
    fn passphrase_is_redacted_in_debug() {
        let dbg = format!("{:?}", WifiUpdate::Passphrase("hunter2hunter2".into()));
        assert!(!dbg.contains("hunter2"));
    }

    #[test]
    fn connection_status_display() {
        assert_eq!(ConnectionStatus::ConnectionFailure.to_string(), "connection-failure");
        assert_eq!(ConnectionStatus::Ok.to_string(), "ok");
    }
}

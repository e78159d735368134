// ── Action definitions & invocation ──
//
// The host renders one button action per `ActionDefinition` and invokes it
// by id with a JSON object of option values. `Action::from_invocation`
// turns that object into a typed, validated `Action`.

use std::fmt;

use serde::Serialize;
use serde_json::Value;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::error::{CoreError, FailureContext};
use crate::model::{MacAddress, OptionEntry, OptionLists, PoeMode, PortIndex, WifiUpdate};

/// Identifier of each action the host can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize)]
pub enum ActionKind {
    #[strum(serialize = "POECycle")]
    #[serde(rename = "POECycle")]
    PoeCycle,
    #[strum(serialize = "POEMode")]
    #[serde(rename = "POEMode")]
    PoeMode,
    #[strum(serialize = "ProfilePOEMode")]
    #[serde(rename = "ProfilePOEMode")]
    ProfilePoeMode,
    #[strum(serialize = "WifiNetwork")]
    #[serde(rename = "WifiNetwork")]
    WifiNetwork,
}

impl ActionKind {
    pub fn name(self) -> &'static str {
        match self {
            Self::PoeCycle => "Power Cycle POE Switchport",
            Self::PoeMode => "Switchport POE Mode",
            Self::ProfilePoeMode => "Profile POE Mode",
            Self::WifiNetwork => "WiFi Network",
        }
    }
}

// ── Definitions ─────────────────────────────────────────────────────

/// One action as the host renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDefinition {
    pub id: ActionKind,
    pub name: &'static str,
    pub options: Vec<ActionOption>,
}

/// One input field of an action.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ActionOption {
    #[serde(rename = "textinput")]
    TextInput {
        id: &'static str,
        label: &'static str,
        default: String,
    },
    Number {
        id: &'static str,
        label: &'static str,
        default: u32,
        min: u32,
        max: u32,
    },
    Dropdown {
        id: &'static str,
        label: &'static str,
        choices: Vec<OptionEntry>,
        default: Option<String>,
        /// Accept values that are not among `choices`.
        allow_custom: bool,
    },
    Checkbox {
        id: &'static str,
        label: &'static str,
        default: bool,
    },
}

impl ActionOption {
    pub fn id(&self) -> &'static str {
        match self {
            Self::TextInput { id, .. }
            | Self::Number { id, .. }
            | Self::Dropdown { id, .. }
            | Self::Checkbox { id, .. } => id,
        }
    }
}

/// Which change a `WifiNetwork` invocation makes, as the `change` option
/// spells it.
const WIFI_CHANGES: [(&str, &str); 4] = [
    ("ssid", "Rename SSID"),
    ("passphrase", "Change passphrase"),
    ("enabled", "Enable / disable"),
    ("delete", "Delete network"),
];

fn poe_mode_choices() -> Vec<OptionEntry> {
    PoeMode::iter()
        .map(|m| OptionEntry::new(m.to_string(), m.label()))
        .collect()
}

fn switch_option(options: &OptionLists) -> ActionOption {
    ActionOption::Dropdown {
        id: "mac",
        label: "Switch",
        choices: options.switches.clone(),
        default: options.switches.first().map(|o| o.id.clone()),
        allow_custom: true,
    }
}

fn port_option() -> ActionOption {
    ActionOption::Number {
        id: "port",
        label: "Port",
        default: 1,
        min: PortIndex::MIN,
        max: PortIndex::MAX,
    }
}

fn mode_option() -> ActionOption {
    ActionOption::Dropdown {
        id: "mode",
        label: "Mode",
        choices: poe_mode_choices(),
        default: Some(PoeMode::Auto.to_string()),
        allow_custom: false,
    }
}

/// Build every action definition, with pickers filled from `options`.
pub fn definitions(options: &OptionLists) -> Vec<ActionDefinition> {
    ActionKind::iter()
        .map(|kind| {
            let fields = match kind {
                ActionKind::PoeCycle => vec![switch_option(options), port_option()],
                ActionKind::PoeMode => {
                    vec![switch_option(options), port_option(), mode_option()]
                }
                ActionKind::ProfilePoeMode => vec![
                    ActionOption::Dropdown {
                        id: "profile",
                        label: "Profile Name",
                        choices: options.profiles.clone(),
                        default: options.profiles.first().map(|o| o.id.clone()),
                        allow_custom: true,
                    },
                    mode_option(),
                ],
                ActionKind::WifiNetwork => vec![
                    ActionOption::Dropdown {
                        id: "network",
                        label: "Network",
                        choices: options.networks.clone(),
                        default: options.networks.first().map(|o| o.id.clone()),
                        allow_custom: true,
                    },
                    ActionOption::Dropdown {
                        id: "change",
                        label: "Change",
                        choices: WIFI_CHANGES
                            .iter()
                            .map(|(id, label)| OptionEntry::new(*id, *label))
                            .collect(),
                        default: Some("enabled".into()),
                        allow_custom: false,
                    },
                    ActionOption::TextInput {
                        id: "value",
                        label: "New SSID / passphrase",
                        default: String::new(),
                    },
                    ActionOption::Checkbox {
                        id: "enabled",
                        label: "Enabled",
                        default: true,
                    },
                ],
            };
            ActionDefinition {
                id: kind,
                name: kind.name(),
                options: fields,
            }
        })
        .collect()
}

// ── Invocation ──────────────────────────────────────────────────────

/// A validated user action, ready for the command queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    PowerCycle {
        mac: MacAddress,
        port: PortIndex,
    },
    PoeMode {
        mac: MacAddress,
        port: PortIndex,
        mode: PoeMode,
    },
    ProfilePoeMode {
        profile: String,
        mode: PoeMode,
    },
    Wifi {
        network: String,
        update: WifiUpdate,
    },
}

impl Action {
    /// Parse an invocation from the host: an action id plus its option values.
    pub fn from_invocation(id: &str, options: &Value) -> Result<Self, CoreError> {
        let kind: ActionKind = id.parse().map_err(|_| CoreError::ValidationFailed {
            message: format!("unknown action {id:?}"),
        })?;

        match kind {
            ActionKind::PoeCycle => Ok(Self::PowerCycle {
                mac: MacAddress::new(required_str(options, "mac")?)?,
                port: port_value(options)?,
            }),
            ActionKind::PoeMode => Ok(Self::PoeMode {
                mac: MacAddress::new(required_str(options, "mac")?)?,
                port: port_value(options)?,
                mode: PoeMode::parse(required_str(options, "mode")?)?,
            }),
            ActionKind::ProfilePoeMode => Ok(Self::ProfilePoeMode {
                profile: required_str(options, "profile")?.to_owned(),
                mode: PoeMode::parse(required_str(options, "mode")?)?,
            }),
            ActionKind::WifiNetwork => {
                let network = required_str(options, "network")?.to_owned();
                let update = match required_str(options, "change")? {
                    "ssid" => WifiUpdate::Ssid(optional_str(options, "value").to_owned()),
                    "passphrase" => {
                        WifiUpdate::Passphrase(optional_str(options, "value").to_owned())
                    }
                    "enabled" => WifiUpdate::Enabled(bool_value(options, "enabled")?),
                    "enable" => WifiUpdate::Enabled(true),
                    "disable" => WifiUpdate::Enabled(false),
                    "delete" => WifiUpdate::Delete,
                    other => {
                        return Err(CoreError::ValidationFailed {
                            message: format!("unknown WiFi change {other:?}"),
                        });
                    }
                };
                update.validate()?;
                Ok(Self::Wifi { network, update })
            }
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Self::PowerCycle { .. } => ActionKind::PoeCycle,
            Self::PoeMode { .. } => ActionKind::PoeMode,
            Self::ProfilePoeMode { .. } => ActionKind::ProfilePoeMode,
            Self::Wifi { .. } => ActionKind::WifiNetwork,
        }
    }

    /// Whether a successful run changes the option universe.
    pub fn changes_options(&self) -> bool {
        match self {
            Self::Wifi { update, .. } => update.changes_network_list(),
            _ => false,
        }
    }

    /// Target details for failure log lines.
    pub fn failure_context<'a>(&'a self, site: &'a str) -> FailureContext<'a> {
        match self {
            Self::PowerCycle { mac, port } | Self::PoeMode { mac, port, .. } => FailureContext {
                site,
                mac: Some(mac.as_str()),
                port: Some(port.get()),
            },
            Self::ProfilePoeMode { .. } | Self::Wifi { .. } => FailureContext {
                site,
                ..FailureContext::default()
            },
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PowerCycle { mac, port } => write!(f, "power cycle port {mac}@{port}"),
            Self::PoeMode { mac, port, mode } => {
                write!(f, "change port POE mode {mac}@{port} to {mode}")
            }
            Self::ProfilePoeMode { profile, mode } => {
                write!(f, "change port profile POE mode {profile} to {mode}")
            }
            Self::Wifi { network, update } => match update {
                WifiUpdate::Ssid(ssid) => write!(f, "rename WiFi network {network} to {ssid}"),
                WifiUpdate::Passphrase(_) => write!(f, "change passphrase of {network}"),
                WifiUpdate::Enabled(true) => write!(f, "enable WiFi network {network}"),
                WifiUpdate::Enabled(false) => write!(f, "disable WiFi network {network}"),
                WifiUpdate::Delete => write!(f, "delete WiFi network {network}"),
            },
        }
    }
}

// ── Option value helpers ────────────────────────────────────────────

fn required_str<'a>(options: &'a Value, key: &str) -> Result<&'a str, CoreError> {
    match options.get(key).and_then(Value::as_str).map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s),
        _ => Err(CoreError::ValidationFailed {
            message: format!("missing option {key:?}"),
        }),
    }
}

/// Free-text values are taken as typed; validation happens on the update.
fn optional_str<'a>(options: &'a Value, key: &str) -> &'a str {
    options.get(key).and_then(Value::as_str).unwrap_or_default()
}

fn port_value(options: &Value) -> Result<PortIndex, CoreError> {
    let invalid = || CoreError::ValidationFailed {
        message: "option \"port\" must be a whole number".into(),
    };
    let port = match options.get("port") {
        Some(Value::Number(n)) => n.as_u64().ok_or_else(invalid)?,
        Some(Value::String(s)) => s.trim().parse::<u64>().map_err(|_| invalid())?,
        _ => {
            return Err(CoreError::ValidationFailed {
                message: "missing option \"port\"".into(),
            });
        }
    };
    let port = u32::try_from(port).map_err(|_| invalid())?;
    PortIndex::new(port)
}

fn bool_value(options: &Value, key: &str) -> Result<bool, CoreError> {
    match options.get(key) {
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) if s == "true" => Ok(true),
        Some(Value::String(s)) if s == "false" => Ok(false),
        _ => Err(CoreError::ValidationFailed {
            message: format!("option {key:?} must be true or false"),
        }),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_poe_mode_invocation() {
        let action = Action::from_invocation(
            "POEMode",
            &json!({ "mac": "AA:BB:CC:DD:EE:FF", "port": 5, "mode": "pasv24" }),
        )
        .unwrap();

        assert_eq!(
            action,
            Action::PoeMode {
                mac: MacAddress::new("aa:bb:cc:dd:ee:ff").unwrap(),
                port: PortIndex::new(5).unwrap(),
                mode: PoeMode::Pasv24,
            }
        );
        assert!(!action.changes_options());
    }

    #[test]
    fn port_may_arrive_as_text() {
        let action =
            Action::from_invocation("POECycle", &json!({ "mac": "aabbccddeeff", "port": "12" }))
                .unwrap();
        assert_eq!(action.kind(), ActionKind::PoeCycle);
    }

    #[test]
    fn rejects_out_of_range_port() {
        let err = Action::from_invocation("POECycle", &json!({ "mac": "aabbccddeeff", "port": 0 }))
            .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));

        let err =
            Action::from_invocation("POECycle", &json!({ "mac": "aabbccddeeff", "port": 101 }))
                .unwrap_err();
        assert!(matches!(err, CoreError::ValidationFailed { .. }));
    }

    #[test]
    fn rejects_unknown_action_and_mode() {
        assert!(Action::from_invocation("Reboot", &json!({})).is_err());
        assert!(
            Action::from_invocation("ProfilePOEMode", &json!({ "profile": "x", "mode": "48v" }))
                .is_err()
        );
    }

    #[test]
    fn wifi_invocations() {
        let action = Action::from_invocation(
            "WifiNetwork",
            &json!({ "network": "GuestNet", "change": "delete" }),
        )
        .unwrap();
        assert!(action.changes_options());

        let action = Action::from_invocation(
            "WifiNetwork",
            &json!({ "network": "GuestNet", "change": "enabled", "enabled": false }),
        )
        .unwrap();
        assert_eq!(
            action,
            Action::Wifi {
                network: "GuestNet".into(),
                update: WifiUpdate::Enabled(false),
            }
        );
        assert!(!action.changes_options());
    }

    #[test]
    fn wifi_validation_happens_at_parse_time() {
        let err = Action::from_invocation(
            "WifiNetwork",
            &json!({ "network": "GuestNet", "change": "ssid", "value": "" }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("SSID"));

        let err = Action::from_invocation(
            "WifiNetwork",
            &json!({ "network": "GuestNet", "change": "passphrase", "value": "abc" }),
        )
        .unwrap_err();
        assert!(err.to_string().contains("passphrase"));
    }

    #[test]
    fn definitions_use_cached_options() {
        let options = OptionLists {
            switches: vec![OptionEntry::new("aa:aa:aa:aa:aa:aa", "Core (aa:aa:aa:aa:aa:aa)")],
            profiles: vec![],
            networks: vec![OptionEntry::new("GuestNet", "GuestNet (disabled)")],
        };
        let defs = definitions(&options);

        let ids: Vec<String> = defs.iter().map(|d| d.id.to_string()).collect();
        assert_eq!(ids, vec!["POECycle", "POEMode", "ProfilePOEMode", "WifiNetwork"]);

        let json = serde_json::to_value(&defs[1]).unwrap();
        assert_eq!(json["id"], "POEMode");
        assert_eq!(json["options"][0]["type"], "dropdown");
        assert_eq!(json["options"][0]["choices"][0]["id"], "aa:aa:aa:aa:aa:aa");
        assert_eq!(json["options"][1]["type"], "number");
        assert_eq!(json["options"][1]["max"], 100);
        assert_eq!(
            json["options"][2]["choices"],
            json!([
                { "id": "auto", "label": "Auto" },
                { "id": "pasv24", "label": "24V Passive" },
                { "id": "off", "label": "Off" }
            ])
        );

        let wifi = &defs[3];
        assert_eq!(wifi.options[0].id(), "network");
        assert_eq!(serde_json::to_value(&wifi.options[2]).unwrap()["type"], "textinput");
        assert_eq!(serde_json::to_value(&wifi.options[3]).unwrap()["type"], "checkbox");
    }
}

// ── Option cache ──
//
// Picker contents for the host: known switches, port profiles and WiFi
// networks. The three lists are fetched concurrently; a list whose fetch
// fails keeps its previous value.

use tracing::{debug, warn};
use unideck_api::{DeviceBasic, LegacyClient, PortProfile, WlanConf};

use crate::model::{OptionEntry, OptionLists};

/// Fetch all three lists and merge them over `previous`.
pub async fn refresh(client: &LegacyClient, previous: &OptionLists) -> OptionLists {
    let (devices, profiles, wlans) = tokio::join!(
        client.list_devices_basic(),
        client.list_port_profiles(),
        client.list_wlans(),
    );

    let switches = match devices {
        Ok(devices) => switch_options(&devices),
        Err(e) => {
            warn!(error = %e, "failed to fetch switches, keeping previous list");
            previous.switches.clone()
        }
    };
    let profiles = match profiles {
        Ok(profiles) => profile_options(&profiles),
        Err(e) => {
            warn!(error = %e, "failed to fetch port profiles, keeping previous list");
            previous.profiles.clone()
        }
    };
    let networks = match wlans {
        Ok(wlans) => network_options(&wlans),
        Err(e) => {
            warn!(error = %e, "failed to fetch wifi networks, keeping previous list");
            previous.networks.clone()
        }
    };

    debug!(
        switches = switches.len(),
        profiles = profiles.len(),
        networks = networks.len(),
        "option lists refreshed"
    );

    OptionLists {
        switches,
        profiles,
        networks,
    }
}

/// Switches only, keyed by MAC. Labelled `"{name} ({mac})"`, or the MAC
/// alone when the device has no name.
pub fn switch_options(devices: &[DeviceBasic]) -> Vec<OptionEntry> {
    devices
        .iter()
        .filter(|d| d.is_switch())
        .map(|d| {
            let label = match d.name.as_deref().filter(|n| !n.is_empty()) {
                Some(name) => format!("{name} ({})", d.mac),
                None => d.mac.clone(),
            };
            OptionEntry::new(d.mac.clone(), label)
        })
        .collect()
}

/// Profiles are addressed by name.
pub fn profile_options(profiles: &[PortProfile]) -> Vec<OptionEntry> {
    profiles
        .iter()
        .map(|p| OptionEntry::new(p.name.clone(), p.name.clone()))
        .collect()
}

/// Networks are addressed by name; disabled ones say so in their label.
pub fn network_options(wlans: &[WlanConf]) -> Vec<OptionEntry> {
    wlans
        .iter()
        .map(|w| {
            let label = if w.enabled == Some(false) {
                format!("{} (disabled)", w.name)
            } else {
                w.name.clone()
            };
            OptionEntry::new(w.name.clone(), label)
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn switches_are_filtered_and_labelled() {
        let devices: Vec<DeviceBasic> = serde_json::from_value(json!([
            { "mac": "aa:aa:aa:aa:aa:aa", "type": "usw", "name": "Core" },
            { "mac": "bb:bb:bb:bb:bb:bb", "type": "uap", "name": "Lobby AP" },
            { "mac": "cc:cc:cc:cc:cc:cc", "type": "usw" }
        ]))
        .unwrap();

        assert_eq!(
            switch_options(&devices),
            vec![
                OptionEntry::new("aa:aa:aa:aa:aa:aa", "Core (aa:aa:aa:aa:aa:aa)"),
                OptionEntry::new("cc:cc:cc:cc:cc:cc", "cc:cc:cc:cc:cc:cc"),
            ]
        );
    }

    #[test]
    fn disabled_networks_are_marked() {
        let wlans: Vec<WlanConf> = serde_json::from_value(json!([
            { "_id": "w1", "name": "Office", "enabled": true },
            { "_id": "w2", "name": "GuestNet", "enabled": false },
            { "_id": "w3", "name": "IoT" }
        ]))
        .unwrap();

        assert_eq!(
            network_options(&wlans),
            vec![
                OptionEntry::new("Office", "Office"),
                OptionEntry::new("GuestNet", "GuestNet (disabled)"),
                OptionEntry::new("IoT", "IoT"),
            ]
        );
    }

    #[test]
    fn profiles_keep_order() {
        let profiles: Vec<PortProfile> = serde_json::from_value(json!([
            { "_id": "p2", "name": "Cameras" },
            { "_id": "p1", "name": "All" }
        ]))
        .unwrap();

        let ids: Vec<_> = profile_options(&profiles).into_iter().map(|o| o.id).collect();
        assert_eq!(ids, vec!["Cameras", "All"]);
    }
}

// ── Resource mutators ──
//
// Every mutating operation follows the same shape: read the owning remote
// object, locate (or insert) the target entry, then write the whole object
// back in one call addressed by its `_id`. Nothing is written if the read or
// locate step fails.
//
// The controller offers no revision token, so an edit made elsewhere between
// our read and our write is overwritten.

use tracing::debug;
use unideck_api::{LegacyClient, PortOverride, WlanConf};

use crate::error::CoreError;
use crate::model::{MacAddress, PoeMode, PortIndex, WifiUpdate};

/// Power-cycle one switch port. A single command, no read.
pub async fn power_cycle_port(
    client: &LegacyClient,
    mac: &MacAddress,
    port: PortIndex,
) -> Result<(), CoreError> {
    client.power_cycle_port(mac.as_str(), port.get()).await?;
    Ok(())
}

/// Set the POE mode of one port through the device's port overrides.
pub async fn set_port_poe_mode(
    client: &LegacyClient,
    mac: &MacAddress,
    port: PortIndex,
    mode: PoeMode,
) -> Result<(), CoreError> {
    let device = client
        .get_device(mac.as_str())
        .await?
        .ok_or_else(|| CoreError::DeviceNotFound {
            mac: mac.to_string(),
        })?;

    let mut overrides = device.port_overrides;
    upsert_port_override(&mut overrides, port, mode);

    debug!(device_id = %device.id, %mac, port = port.get(), %mode, "writing port override");
    client.set_port_overrides(&device.id, &overrides).await?;
    Ok(())
}

/// Set the POE mode on the port profile with this exact name.
pub async fn set_profile_poe_mode(
    client: &LegacyClient,
    profile_name: &str,
    mode: PoeMode,
) -> Result<(), CoreError> {
    let mut profile = client
        .list_port_profiles()
        .await?
        .into_iter()
        .find(|p| p.name == profile_name)
        .ok_or_else(|| CoreError::ProfileNotFound {
            name: profile_name.to_owned(),
        })?;

    profile.poe_mode = Some(mode.to_string());
    client.update_port_profile(&profile).await?;
    Ok(())
}

/// Apply one change to the WiFi network with this exact name.
pub async fn update_wifi_network(
    client: &LegacyClient,
    network_name: &str,
    update: &WifiUpdate,
) -> Result<(), CoreError> {
    update.validate()?;

    let mut wlan = client
        .list_wlans()
        .await?
        .into_iter()
        .find(|w| w.name == network_name)
        .ok_or_else(|| CoreError::NetworkNotFound {
            name: network_name.to_owned(),
        })?;

    if *update == WifiUpdate::Delete {
        client.delete_wlan(&wlan.id).await?;
        return Ok(());
    }

    apply_wifi_update(&mut wlan, update);
    client.update_wlan(&wlan).await?;
    Ok(())
}

/// Set `poe_mode` on the entry for `port`, appending a fresh entry when the
/// port has no override yet. Other entries and fields are left untouched.
pub fn upsert_port_override(overrides: &mut Vec<PortOverride>, port: PortIndex, mode: PoeMode) {
    match overrides.iter_mut().find(|o| o.port_idx == port.get()) {
        Some(entry) => entry.poe_mode = Some(mode.to_string()),
        None => overrides.push(PortOverride::with_poe_mode(port.get(), mode.to_string())),
    }
}

/// Write one field of a WLAN record. `Delete` has no field to write.
pub fn apply_wifi_update(wlan: &mut WlanConf, update: &WifiUpdate) {
    match update {
        WifiUpdate::Ssid(ssid) => wlan.name.clone_from(ssid),
        WifiUpdate::Passphrase(pass) => wlan.x_passphrase = Some(pass.clone()),
        WifiUpdate::Enabled(on) => wlan.enabled = Some(*on),
        WifiUpdate::Delete => {}
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn overrides(raw: serde_json::Value) -> Vec<PortOverride> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn upsert_changes_existing_port_only() {
        let mut list = overrides(json!([
            { "port_idx": 1, "poe_mode": "auto", "name": "Cam" },
            { "port_idx": 2, "poe_mode": "auto", "op_mode": "switch" }
        ]));
        upsert_port_override(&mut list, PortIndex::new(1).unwrap(), PoeMode::Off);

        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!([
                { "port_idx": 1, "poe_mode": "off", "name": "Cam" },
                { "port_idx": 2, "poe_mode": "auto", "op_mode": "switch" }
            ])
        );
    }

    #[test]
    fn upsert_appends_missing_port() {
        let mut list = overrides(json!([{ "port_idx": 1, "poe_mode": "auto" }]));
        upsert_port_override(&mut list, PortIndex::new(5).unwrap(), PoeMode::Pasv24);

        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!([
                { "port_idx": 1, "poe_mode": "auto" },
                { "port_idx": 5, "poe_mode": "pasv24" }
            ])
        );
    }

    #[test]
    fn upsert_into_empty_list() {
        let mut list = Vec::new();
        upsert_port_override(&mut list, PortIndex::new(3).unwrap(), PoeMode::Auto);
        assert_eq!(list, vec![PortOverride::with_poe_mode(3, "auto")]);
    }

    #[test]
    fn wifi_update_touches_one_field() {
        let mut wlan: WlanConf = serde_json::from_value(json!({
            "_id": "w1",
            "name": "GuestNet",
            "enabled": true,
            "x_passphrase": "oldpassword",
            "security": "wpapsk"
        }))
        .unwrap();
        let before = wlan.clone();

        apply_wifi_update(&mut wlan, &WifiUpdate::Enabled(false));
        assert_eq!(wlan.enabled, Some(false));
        assert_eq!(wlan.name, before.name);
        assert_eq!(wlan.x_passphrase, before.x_passphrase);
        assert_eq!(wlan.extra, before.extra);

        apply_wifi_update(&mut wlan, &WifiUpdate::Ssid("Visitors".into()));
        assert_eq!(wlan.name, "Visitors");

        apply_wifi_update(&mut wlan, &WifiUpdate::Passphrase("newpassword".into()));
        assert_eq!(wlan.x_passphrase.as_deref(), Some("newpassword"));
    }
}

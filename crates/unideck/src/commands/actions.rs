//! One-shot action commands: power-cycle, poe-mode, profile-poe, wifi.

use unideck_core::{Action, Controller, WifiUpdate};

use crate::cli::{Command, WifiChange};
use crate::commands::util;
use crate::error::CliError;
use crate::output::Output;

pub async fn handle(
    controller: &Controller,
    action: Action,
    out: &Output,
    yes: bool,
) -> Result<(), CliError> {
    if matches!(
        action,
        Action::Wifi {
            update: WifiUpdate::Delete,
            ..
        }
    ) && !util::confirm(&format!("Really {action}?"), yes)?
    {
        return Ok(());
    }

    controller.execute(action.clone()).await?;
    out.done(&capitalize(&action.to_string()));
    Ok(())
}

/// Build the typed action. Argument values were parsed by clap; the WiFi
/// change is still checked here.
pub fn to_action(cmd: Command) -> Result<Action, CliError> {
    let action = match cmd {
        Command::PowerCycle(target) => Action::PowerCycle {
            mac: target.mac,
            port: target.port,
        },
        Command::PoeMode { target, mode } => Action::PoeMode {
            mac: target.mac,
            port: target.port,
            mode,
        },
        Command::ProfilePoe { profile, mode } => Action::ProfilePoeMode { profile, mode },
        Command::Wifi(args) => {
            let update = wifi_update(args.change);
            update.validate()?;
            Action::Wifi {
                network: args.network,
                update,
            }
        }
        other => {
            return Err(CliError::Validation {
                field: "command".into(),
                reason: format!("{other:?} is not an action"),
            });
        }
    };
    Ok(action)
}

fn wifi_update(change: WifiChange) -> WifiUpdate {
    if let Some(ssid) = change.ssid {
        WifiUpdate::Ssid(ssid)
    } else if let Some(passphrase) = change.passphrase {
        WifiUpdate::Passphrase(passphrase)
    } else if change.delete {
        WifiUpdate::Delete
    } else {
        // clap requires exactly one of the group
        WifiUpdate::Enabled(change.enable)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;

    use super::*;
    use crate::cli::Cli;

    fn action_for(args: &[&str]) -> Result<Action, CliError> {
        let cli = Cli::try_parse_from(std::iter::once("unideck").chain(args.iter().copied()))
            .unwrap();
        to_action(cli.command)
    }

    #[test]
    fn disable_maps_to_enabled_false() {
        let action = action_for(&["wifi", "GuestNet", "--disable"]).unwrap();
        assert_eq!(
            action,
            Action::Wifi {
                network: "GuestNet".into(),
                update: WifiUpdate::Enabled(false),
            }
        );
    }

    #[test]
    fn short_passphrase_is_rejected_before_any_call() {
        let err = action_for(&["wifi", "Office", "--passphrase", "short"]).unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }

    #[test]
    fn power_cycle_carries_normalized_mac() {
        let action = action_for(&["power-cycle", "AABBCCDDEEFF", "3"]).unwrap();
        let Action::PowerCycle { mac, port } = action else {
            panic!("expected power cycle");
        };
        assert_eq!(mac.as_str(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(port.get(), 3);
    }

    #[test]
    fn capitalizes_first_letter() {
        assert_eq!(capitalize("power cycle port"), "Power cycle port");
        assert_eq!(capitalize(""), "");
    }
}

//! Clap derive structures for the `unideck` CLI.
//!
//! Defines the command tree, global flags, and shared value parsers.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use unideck_core::{MacAddress, PoeMode, PortIndex};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// unideck -- button-deck actions for UniFi switches and WiFi
#[derive(Debug, Parser)]
#[command(
    name = "unideck",
    version,
    about = "Drive UniFi switch ports and WiFi networks from a button deck",
    long_about = "Power-cycle switch ports, change POE modes and manage WiFi networks\n\
        on a UniFi Network controller.\n\n\
        One-shot commands log in, run a single action and exit. `serve` keeps a\n\
        session open and reads JSON action invocations from stdin.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Clone, Args)]
pub struct GlobalOpts {
    /// Config file path
    #[arg(long = "config", short = 'C', env = "UNIDECK_CONFIG", global = true)]
    pub config_file: Option<PathBuf>,

    /// Controller host or URL (overrides config)
    #[arg(long, short = 'H', global = true)]
    pub host: Option<String>,

    /// Controller port (overrides config)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Controller username (overrides config)
    #[arg(long, short = 'u', global = true)]
    pub username: Option<String>,

    /// Site name (overrides config)
    #[arg(long, short = 's', global = true)]
    pub site: Option<String>,

    /// Verify the controller's TLS certificate
    #[arg(long, global = true)]
    pub verify_tls: bool,

    /// Request timeout in seconds (overrides config)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per line
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Power-cycle a switch port
    #[command(alias = "cycle")]
    PowerCycle(PortArgs),

    /// Set the POE mode of a switch port
    PoeMode {
        #[command(flatten)]
        target: PortArgs,

        /// POE mode: auto, pasv24 or off
        #[arg(value_parser = parse_poe_mode)]
        mode: PoeMode,
    },

    /// Set the POE mode of a port profile
    ProfilePoe {
        /// Port profile name
        profile: String,

        /// POE mode: auto, pasv24 or off
        #[arg(value_parser = parse_poe_mode)]
        mode: PoeMode,
    },

    /// Update or delete a WiFi network
    #[command(alias = "w")]
    Wifi(WifiArgs),

    /// List selectable switches, port profiles and WiFi networks
    #[command(alias = "ls")]
    Options {
        /// Only this list
        #[arg(value_enum)]
        list: Option<OptionList>,
    },

    /// Print the action definitions a button host renders
    Actions,

    /// Log in and report the connection status
    Status,

    /// Keep a session open and run actions read from stdin
    Serve,

    /// Manage configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Action arguments ─────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct PortArgs {
    /// Switch MAC address
    #[arg(value_parser = parse_mac)]
    pub mac: MacAddress,

    /// Port number (1-100)
    #[arg(id = "port_index", value_name = "PORT", value_parser = parse_port)]
    pub port: PortIndex,
}

#[derive(Debug, Args)]
pub struct WifiArgs {
    /// WiFi network name (current SSID)
    pub network: String,

    #[command(flatten)]
    pub change: WifiChange,
}

/// Exactly one change per invocation.
#[derive(Debug, Args)]
#[group(required = true, multiple = false)]
pub struct WifiChange {
    /// Rename the broadcast SSID
    #[arg(long)]
    pub ssid: Option<String>,

    /// Set a new passphrase (at least 8 characters)
    #[arg(long)]
    pub passphrase: Option<String>,

    /// Enable the network
    #[arg(long)]
    pub enable: bool,

    /// Disable the network
    #[arg(long)]
    pub disable: bool,

    /// Delete the network
    #[arg(long)]
    pub delete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OptionList {
    Switches,
    Profiles,
    Networks,
}

fn parse_mac(raw: &str) -> Result<MacAddress, String> {
    MacAddress::new(raw).map_err(|e| e.to_string())
}

fn parse_port(raw: &str) -> Result<PortIndex, String> {
    let port: u32 = raw
        .parse()
        .map_err(|_| format!("{raw:?} is not a port number"))?;
    PortIndex::new(port).map_err(|e| e.to_string())
}

fn parse_poe_mode(raw: &str) -> Result<PoeMode, String> {
    PoeMode::parse(raw).map_err(|e| e.to_string())
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create the config file with guided setup
    Init,

    /// Display the resolved configuration (secrets masked)
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value
    Set {
        /// Config key (e.g. "host", "site", "defaults.output")
        key: String,

        /// Value to set
        value: String,
    },

    /// Store the password in the system keyring
    SetPassword,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn port_parser_enforces_range() {
        assert_eq!(parse_port("24").unwrap().get(), 24);
        assert!(parse_port("0").is_err());
        assert!(parse_port("101").is_err());
        assert!(parse_port("eth0").is_err());
    }

    #[test]
    fn wifi_change_is_exclusive() {
        let err = Cli::try_parse_from([
            "unideck", "wifi", "Office", "--enable", "--delete",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let cli = Cli::try_parse_from(["unideck", "wifi", "Office", "--ssid", "HQ"]).unwrap();
        let Command::Wifi(args) = cli.command else {
            panic!("expected wifi command");
        };
        assert_eq!(args.change.ssid.as_deref(), Some("HQ"));
    }

    #[test]
    fn poe_mode_takes_typed_values() {
        let cli = Cli::try_parse_from([
            "unideck",
            "poe-mode",
            "AA-BB-CC-DD-EE-FF",
            "5",
            "pasv24",
        ])
        .unwrap();
        let Command::PoeMode { target, mode } = cli.command else {
            panic!("expected poe-mode command");
        };
        assert_eq!(target.mac.as_str(), "aa:bb:cc:dd:ee:ff");
        assert_eq!(target.port.get(), 5);
        assert_eq!(mode, PoeMode::Pasv24);
    }
}

//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output` (or the config's
//! `defaults.output`). Table uses `tabled`, structured formats use serde,
//! plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use unideck_config::Defaults;
use unideck_core::ConnectionStatus;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};

/// Resolved output settings for one invocation.
#[derive(Debug, Clone, Copy)]
pub struct Output {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

impl Output {
    /// Flags win over the config file's `[defaults]`.
    pub fn new(global: &GlobalOpts, defaults: &Defaults) -> Self {
        let format = global
            .output
            .or_else(|| OutputFormat::from_str(&defaults.output, true).ok())
            .unwrap_or(OutputFormat::Table);
        let color = global
            .color
            .or_else(|| ColorMode::from_str(&defaults.color, true).ok())
            .unwrap_or(ColorMode::Auto);

        Self {
            format,
            color: should_color(color),
            quiet: global.quiet,
        }
    }

    /// Print the rendered output to stdout, respecting quiet mode.
    pub fn print(&self, output: &str) {
        if self.quiet || output.is_empty() {
            return;
        }
        let mut stdout = io::stdout().lock();
        let _ = writeln!(stdout, "{output}");
    }

    /// One-line confirmation on stderr, respecting quiet mode.
    pub fn done(&self, message: &str) {
        if self.quiet {
            return;
        }
        if self.color {
            eprintln!("{} {message}", "✓".green());
        } else {
            eprintln!("✓ {message}");
        }
    }

    pub fn status(&self, status: ConnectionStatus) -> String {
        if !self.color {
            return status.to_string();
        }
        match status {
            ConnectionStatus::Ok => status.green().to_string(),
            ConnectionStatus::Connecting => status.yellow().to_string(),
            ConnectionStatus::Disconnected | ConnectionStatus::ConnectionFailure => {
                status.red().to_string()
            }
        }
    }
}

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stderr().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item views don't use
/// the `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => id_fn(data),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> String {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.unwrap_or_else(|e| format!("{{\"error\":\"serialization failed: {e}\"}}"))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> String {
    serde_yaml::to_string(data).unwrap_or_else(|e| format!("error: serialization failed: {e}"))
}

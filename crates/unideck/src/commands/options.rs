//! Read-only commands: option lists, action definitions, status.

use serde::Serialize;
use tabled::Tabled;

use unideck_core::{ActionDefinition, ActionOption, ConnectionStatus, Controller, OptionEntry};

use crate::cli::OptionList;
use crate::error::CliError;
use crate::output::{self, Output};

// ── Option lists ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct ListedOption<'a> {
    list: &'static str,
    id: &'a str,
    label: &'a str,
}

#[derive(Tabled)]
struct OptionRow {
    #[tabled(rename = "List")]
    list: &'static str,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Label")]
    label: String,
}

pub fn list(
    controller: &Controller,
    only: Option<OptionList>,
    out: &Output,
) -> Result<(), CliError> {
    let lists = controller.options().borrow().clone();

    let sections: [(OptionList, &'static str, &[OptionEntry]); 3] = [
        (OptionList::Switches, "switches", &lists.switches),
        (OptionList::Profiles, "profiles", &lists.profiles),
        (OptionList::Networks, "networks", &lists.networks),
    ];

    let rows: Vec<ListedOption<'_>> = sections
        .iter()
        .filter(|(which, _, _)| only.is_none_or(|o| o == *which))
        .flat_map(|(_, name, entries)| {
            entries.iter().map(move |e| ListedOption {
                list: *name,
                id: &e.id,
                label: &e.label,
            })
        })
        .collect();

    let rendered = output::render_list(
        out.format,
        &rows,
        |o| OptionRow {
            list: o.list,
            id: o.id.to_owned(),
            label: o.label.to_owned(),
        },
        |o| o.id.to_owned(),
    );
    out.print(&rendered);
    Ok(())
}

// ── Action definitions ───────────────────────────────────────────────

#[derive(Tabled)]
struct DefinitionRow {
    #[tabled(rename = "Action")]
    id: String,
    #[tabled(rename = "Name")]
    name: &'static str,
    #[tabled(rename = "Options")]
    options: String,
}

fn option_summary(option: &ActionOption) -> String {
    match option {
        ActionOption::Dropdown { id, choices, .. } => format!("{id} [{}]", choices.len()),
        other => other.id().to_owned(),
    }
}

pub fn definitions(controller: &Controller, out: &Output) -> Result<(), CliError> {
    let defs = controller.action_definitions().borrow().clone();
    let rendered = output::render_list(
        out.format,
        defs.as_slice(),
        |d: &ActionDefinition| DefinitionRow {
            id: d.id.to_string(),
            name: d.name,
            options: d
                .options
                .iter()
                .map(option_summary)
                .collect::<Vec<_>>()
                .join(", "),
        },
        |d| d.id.to_string(),
    );
    out.print(&rendered);
    Ok(())
}

// ── Status ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct StatusReport {
    status: ConnectionStatus,
    site: Option<String>,
    switches: usize,
    profiles: usize,
    networks: usize,
}

pub fn status(controller: &Controller, out: &Output) -> Result<(), CliError> {
    let lists = controller.options().borrow().clone();
    let report = StatusReport {
        status: *controller.status().borrow(),
        site: controller.site(),
        switches: lists.switches.len(),
        profiles: lists.profiles.len(),
        networks: lists.networks.len(),
    };

    let rendered = output::render_single(
        out.format,
        &report,
        |r| {
            format!(
                "Status:   {}\nSite:     {}\nSwitches: {}\nProfiles: {}\nNetworks: {}",
                out.status(r.status),
                r.site.as_deref().unwrap_or("-"),
                r.switches,
                r.profiles,
                r.networks,
            )
        },
        |r| r.status.to_string(),
    );
    out.print(&rendered);
    Ok(())
}

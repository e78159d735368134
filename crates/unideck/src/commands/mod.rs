//! Command dispatch: bridges CLI args -> core actions -> output formatting.

pub mod actions;
pub mod config_cmd;
pub mod options;
pub mod serve;
pub mod util;

use unideck_core::{Action, Controller};

use crate::cli::{Command, OptionList};
use crate::error::CliError;
use crate::output::Output;

/// A controller-bound command, with its arguments already validated.
#[derive(Debug)]
pub enum Job {
    Action(Action),
    Options(Option<OptionList>),
    Actions,
    Status,
}

impl Job {
    /// Validate before any network traffic. `None` for commands that
    /// don't need a controller session.
    pub fn from_command(cmd: Command) -> Result<Option<Self>, CliError> {
        let job = match cmd {
            Command::Options { list } => Self::Options(list),
            Command::Actions => Self::Actions,
            Command::Status => Self::Status,
            Command::Config(_) | Command::Completions(_) | Command::Serve => return Ok(None),
            action => Self::Action(actions::to_action(action)?),
        };
        Ok(Some(job))
    }
}

/// Dispatch a job to the appropriate handler. The controller is already
/// logged in.
pub async fn dispatch(
    job: Job,
    controller: &Controller,
    out: &Output,
    yes: bool,
) -> Result<(), CliError> {
    match job {
        Job::Action(action) => actions::handle(controller, action, out, yes).await,
        Job::Options(list) => options::list(controller, list, out),
        Job::Actions => options::definitions(controller, out),
        Job::Status => options::status(controller, out),
    }
}

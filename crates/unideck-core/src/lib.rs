//! Session coordination between `unideck-api` and a button automation host.
//!
//! - **[`Controller`]** -- Central facade: [`connect()`](Controller::connect)
//!   installs a session and logs in in the background,
//!   [`trigger()`](Controller::trigger) runs an [`Action`] through the
//!   command queue, and watch channels expose status, option lists and
//!   action definitions.
//!
//! - **[`SessionManager`]** -- Owns the single authenticated session:
//!   single-flight login, liveness probe, teardown. Results of a login that
//!   was overtaken by a configuration change are discarded.
//!
//! - **[`CommandQueue`]** -- FIFO executor with concurrency one, so the
//!   read-modify-write sequences in [`mutators`] never interleave.
//!
//! - **[`options`]** / **[`actions`]** -- Picker contents (switches, port
//!   profiles, WiFi networks) and the action definitions rendered from them.

pub mod actions;
pub mod config;
pub mod controller;
pub mod error;
mod liveness;
pub mod model;
pub mod mutators;
pub mod options;
pub mod queue;
pub mod session;

// ── Primary re-exports ──────────────────────────────────────────────
pub use actions::{Action, ActionDefinition, ActionKind, ActionOption};
pub use config::ControllerConfig;
pub use controller::Controller;
pub use error::{CoreError, FailureContext};
pub use model::{
    ConnectionStatus, MacAddress, OptionEntry, OptionLists, PoeMode, PortIndex, WifiUpdate,
};
pub use queue::{CommandQueue, CompletionHandle};
pub use session::{LoginOutcome, SessionManager, SessionState};

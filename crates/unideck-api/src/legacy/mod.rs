// Session API client modules
//
// Hand-written client for the controller endpoints the adapter drives:
// stat/device, cmd/devmgr, rest/device, rest/portconf and rest/wlanconf,
// all wrapped in the standard `{ meta: { rc, msg }, data: [...] }` envelope.

pub mod auth;
pub mod client;
pub mod devices;
pub mod models;
pub mod port_profiles;
pub mod wlans;

pub use client::LegacyClient;

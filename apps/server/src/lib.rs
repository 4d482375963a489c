pub mod api;
pub mod config;
mod domain_events;
pub mod error;
pub mod events;
pub mod extract;
mod main_lib;
pub mod scope;

pub use main_lib::{build_state, init_tracing, AppState};

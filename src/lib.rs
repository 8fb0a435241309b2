//! Keep a local data catalog directory in sync with a team git remote.
//!
//! Layers, innermost first:
//! - [`domain`]: operations, outcomes, repository state, location policy
//! - [`application`]: path validation, repository probing, sync operations
//! - [`infrastructure`]: filesystem and git backends, service wiring
//! - [`cli`]: argument parsing and report rendering

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

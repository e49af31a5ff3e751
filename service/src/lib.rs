//! Infrastructure shared by every crate in the workspace: process configuration and
//! logging bootstrap.

pub mod config;
pub mod logging;

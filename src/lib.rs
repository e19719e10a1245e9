//! CreatureBox installer library
//!
//! The `creaturebox-install` binary is a thin wrapper around
//! [`install::runners::run`]; tests drive [`install::Pipeline`] directly
//! against a [`install::RecordingBackend`].

#[cfg(not(unix))]
compile_error!("creaturebox-install only supports Unix hosts");

pub mod cli;
pub mod config;
pub mod install;

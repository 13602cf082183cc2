pub mod commands;
pub mod config;
pub mod deadline;
pub mod discord;
pub mod error;
pub mod handler;
pub mod lifecycle;
pub mod permissions;
pub mod platform;
pub mod sweep;
pub mod utils;

#[cfg(test)]
mod fake;

#[macro_use]
extern crate tracing;

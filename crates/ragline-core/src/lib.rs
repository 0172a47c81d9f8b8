//! Configuration loading and pipeline bootstrap.

pub mod bootstrap;
pub mod config;
pub mod secret;

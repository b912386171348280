//! Claims review submissions on a project-review marketplace for a certified
//! reviewer and tells them when a claim succeeds.

pub mod app;
pub mod cli;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod domain;
pub mod event;
pub mod id;
pub mod logging;
pub mod notify;
pub mod reporter;
pub mod result;

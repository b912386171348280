//! Review API client modules
//!
//! The HTTP wrapper, the endpoint table, status-code interpretation, and the
//! claim service and poller built on top of them.

pub mod api;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod outcome;
pub mod poller;
pub mod service;

pub use api::ReviewApi;
pub use config::{ClientConfig, PollingConfig};
pub use endpoint::Endpoint;
pub use error::ClientError;
pub use outcome::AssignOutcome;
pub use poller::ClaimPoller;
pub use service::{ReviewService, RoundSummary};

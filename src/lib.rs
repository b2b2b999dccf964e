//! Storefront Shopping Assistant Widget
//!
//! The client side of a storefront chat widget that talks to an external
//! conversational agent over HTTP.
//!
//! # Architecture
//!
//! - **Widget**: open/closed panel, draft input, append-only conversation and
//!   one-at-a-time request dispatch
//! - **Agent client**: `POST /chat` to start a thread, `POST /chat/{threadId}`
//!   to continue it
//! - **Terminal front end**: the `shop-assistant` binary mounts one widget on
//!   stdin/stdout
//!
//! # Modules
//!
//! - [`agent`]: backend boundary, route selection and the HTTP client
//! - [`config`]: layered configuration
//! - [`error`]: error types
//! - [`telemetry`]: tracing subscriber setup
//! - [`widget`]: the chat widget state machine

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]

pub mod agent;
pub mod config;
pub mod error;
pub mod telemetry;
pub mod widget;

pub use agent::{AgentClient, HttpAgentClient, Route, ThreadId};
pub use error::{AgentError, SubmitError};
pub use widget::{ChatWidget, Message};

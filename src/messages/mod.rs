//! Messages module: the one-time message lifecycle.
//!
//! This module provides:
//! - `MessageService`: create, inspect, reveal, list and count (`service`)
//! - `CancelToken`: caller-supplied cancellation and deadlines (`cancel`)

pub mod cancel;
pub mod service;

pub use cancel::CancelToken;
pub use service::MessageService;

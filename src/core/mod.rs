//! # GroupMe Core
//!
//! Core functionality of the GroupMe client.
//!
//! The `core` module contains the building blocks shared by the REST client
//! and the push subscription: error type, runtime and transport
//! abstractions, and the scalar types used by the data model.

pub use error::GroupMeError;
pub mod error;

pub use runtime::Runtime;
pub mod runtime;

pub use transport::Transport;
pub mod transport;

pub use transport_request::{TransportMethod, TransportRequest};
pub mod transport_request;

pub use transport_response::TransportResponse;
pub mod transport_response;

pub use push::{Extension, PushMessage, PushTransport};
pub mod push;

pub use types::{Timestamp, ID};
pub mod types;

pub(crate) mod utils;

//! # GroupMe Developer Experience
//!
//! This module provides the structures and methods for the [GroupMe] chat
//! service: the REST client, the data model and the real-time push
//! subscription.
//!
//! [GroupMe]: https://groupme.com

pub mod data_types;

pub use groupme_client::{
    GroupMeClientBuilder, GroupMeClientConfigBuilder, GroupMeClientInstance, GroupMeClientRef,
    GroupMeGenericClient,
};
#[cfg(feature = "reqwest")]
pub use groupme_client::GroupMeClient;
pub mod groupme_client;

pub use groups::GroupsQuery;
pub mod groups;

pub mod users;

pub use realtime::{PushConfig, PushConfigBuilder, PushSubscription};
pub mod realtime;

//! # GroupMe middleware
//!
//! This module contains the [`GroupMeMiddleware`] which wraps the actual
//! transport and adds the authentication token and client identification to
//! every request.

use crate::{
    core::{
        utils::headers::{APPLICATION_JSON, CONTENT_TYPE, USER_AGENT},
        GroupMeError, Transport, TransportMethod, TransportRequest, TransportResponse,
    },
    dx::groupme_client::{SDK_ID, VERSION},
};
use spin::RwLock;
use std::sync::Arc;

/// Request decorator applied by the client to every API call.
///
/// Adds `token` query parameter, `User-Agent` header and, for `POST`
/// requests, JSON `Content-Type`.
#[derive(Debug)]
pub struct GroupMeMiddleware<T> {
    /// Wrapped transport.
    pub(crate) transport: T,

    /// Access token shared with the client.
    pub(crate) auth_token: Arc<RwLock<String>>,
}

#[async_trait::async_trait]
impl<T> Transport for GroupMeMiddleware<T>
where
    T: Transport,
{
    async fn send(&self, mut req: TransportRequest) -> Result<TransportResponse, GroupMeError> {
        req.query_parameters
            .insert("token".into(), self.auth_token.read().clone());
        req.headers
            .entry(USER_AGENT.into())
            .or_insert_with(|| format!("{SDK_ID}/{VERSION}"));

        if req.method == TransportMethod::Post {
            req.headers
                .insert(CONTENT_TYPE.into(), APPLICATION_JSON.into());
        }

        self.transport.send(req).await
    }
}

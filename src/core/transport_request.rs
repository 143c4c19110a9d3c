//! REST request passed to a [`Transport`].
//!
//! [`Transport`]: crate::core::Transport

use hashbrown::HashMap;
use std::fmt::Display;

/// HTTP method of a GroupMe API call.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub enum TransportMethod {
    /// Read a resource.
    #[default]
    Get,

    /// Create or update a resource. The request body is sent as JSON.
    Post,
}

impl Display for TransportMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TransportMethod::Get => "GET",
            TransportMethod::Post => "POST",
        })
    }
}

/// GroupMe API call before the middleware signs it.
///
/// `path` is relative to the API base (`/users/me`, `/groups`). The access
/// token is added to `query_parameters` by the client, endpoint wrappers
/// only fill in their own parameters.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TransportRequest {
    /// Resource path, relative to the API base.
    pub path: String,

    /// Unencoded query parameters.
    pub query_parameters: HashMap<String, String>,

    /// Request method.
    pub method: TransportMethod,

    /// Extra headers.
    pub headers: HashMap<String, String>,

    /// JSON body of a `POST` request.
    pub body: Option<Vec<u8>>,
}

#[cfg(test)]
mod should {
    use super::*;

    #[test]
    fn default_to_get_without_body() {
        let request = TransportRequest::default();

        assert_eq!(request.method, TransportMethod::Get);
        assert_eq!(request.method.to_string(), "GET");
        assert!(request.body.is_none());
    }

    #[test]
    fn display_post_method() {
        assert_eq!(TransportMethod::Post.to_string(), "POST");
    }
}

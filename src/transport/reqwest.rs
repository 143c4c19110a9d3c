//! # Reqwest Transport Implementation
//!
//! This module contains the [`TransportReqwest`] struct.
//! It is used to send requests to the [`GroupMe API`] using the [`reqwest`]
//! crate.
//!
//! It requires the [`reqwest` feature] to be enabled.
//!
//! [`GroupMe API`]: https://dev.groupme.com/docs/v3
//! [`reqwest`]: https://docs.rs/reqwest
//! [`reqwest` feature]: ../index.html#features

use crate::{
    core::{
        utils::encoding::url_encode, GroupMeError, Transport, TransportMethod, TransportRequest,
        TransportResponse,
    },
    dx::groupme_client::GroupMeClientBuilder,
};
use bytes::Bytes;
use hashbrown::HashMap;
use log::info;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    StatusCode,
};

/// Base address of the GroupMe REST API.
pub const GROUPME_API_BASE: &str = "https://api.groupme.com/v3";

/// This struct is used to send requests to the [`GroupMe API`] using the
/// [`reqwest`] crate.
///
/// It is used as the transport type for the [`GroupMeClient`].
///
/// [`GroupMe API`]: https://dev.groupme.com/docs/v3
/// [`reqwest`]: https://docs.rs/reqwest
/// [`GroupMeClient`]: crate::dx::GroupMeClient
#[derive(Clone, Debug)]
pub struct TransportReqwest {
    reqwest_client: reqwest::Client,

    /// The hostname to use for requests.
    /// It is used as the base URL for all requests.
    ///
    /// It defaults to `https://api.groupme.com/v3`.
    /// # Examples
    /// ```
    /// use groupme::transport::TransportReqwest;
    ///
    /// let transport = {
    ///    let mut transport = TransportReqwest::default();
    ///    transport.hostname = "http://localhost:8080/v3".into();
    ///    transport
    /// };
    /// ```
    pub hostname: String,
}

#[async_trait::async_trait]
impl Transport for TransportReqwest {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, GroupMeError> {
        let request_url = prepare_url(&self.hostname, &request.path, &request.query_parameters);
        info!("{} {}", request.method, redact_token(&request_url));
        let headers = prepare_headers(&request.headers)?;
        let builder = match request.method {
            TransportMethod::Get => self.prepare_get_method(request, request_url),
            TransportMethod::Post => self.prepare_post_method(request, request_url),
        }?;

        let result = builder
            .headers(headers)
            .send()
            .await
            .map_err(|e| GroupMeError::Transport {
                details: e.to_string(),
            })?;

        let status = result.status();
        let headers = result.headers().clone();
        result
            .bytes()
            .await
            .map_err(|e| GroupMeError::Transport {
                details: e.to_string(),
            })
            .and_then(|bytes| create_result(status, &headers, bytes))
    }
}

impl Default for TransportReqwest {
    fn default() -> Self {
        Self {
            reqwest_client: reqwest::Client::default(),
            hostname: GROUPME_API_BASE.into(),
        }
    }
}

impl TransportReqwest {
    /// Create a new [`TransportReqwest`] instance.
    ///
    /// It provides a default [`reqwest`] client using
    /// [`reqwest::Client::default()`] and the default hostname
    /// `https://api.groupme.com/v3`.
    ///
    /// # Example
    /// ```
    /// use groupme::transport::TransportReqwest;
    ///
    /// let transport = TransportReqwest::new();
    /// ```
    ///
    /// [`reqwest`]: https://docs.rs/reqwest
    pub fn new() -> Self {
        Self::default()
    }

    /// set the custom hostname for request
    pub fn set_hostname<S>(&mut self, hostname: S)
    where
        S: Into<String>,
    {
        self.hostname = hostname.into();
    }

    fn prepare_get_method(
        &self,
        _request: TransportRequest,
        url: String,
    ) -> Result<reqwest::RequestBuilder, GroupMeError> {
        Ok(self.reqwest_client.get(url))
    }

    fn prepare_post_method(
        &self,
        request: TransportRequest,
        url: String,
    ) -> Result<reqwest::RequestBuilder, GroupMeError> {
        Ok(self
            .reqwest_client
            .post(url)
            .body(request.body.unwrap_or_default()))
    }
}

fn prepare_headers(request_headers: &HashMap<String, String>) -> Result<HeaderMap, GroupMeError> {
    request_headers
        .iter()
        .try_fold(HeaderMap::new(), |mut headers, (name, value)| {
            let name = HeaderName::try_from(name.as_str()).map_err(|err| {
                GroupMeError::Transport {
                    details: err.to_string(),
                }
            })?;
            let value = HeaderValue::try_from(value.as_str()).map_err(|err| {
                GroupMeError::Transport {
                    details: err.to_string(),
                }
            })?;
            headers.insert(name, value);
            Ok(headers)
        })
}

fn prepare_url(hostname: &str, path: &str, query_params: &HashMap<String, String>) -> String {
    let mut url = format!("{}{}", hostname.trim_end_matches('/'), path);
    if query_params.is_empty() {
        return url;
    }

    // Sorted for stable request URLs.
    let mut query_params = query_params.iter().collect::<Vec<_>>();
    query_params.sort();

    let query = query_params
        .into_iter()
        .map(|(key, value)| format!("{}={}", key, url_encode(value.as_bytes())))
        .collect::<Vec<_>>()
        .join("&");

    url.push('?');
    url.push_str(&query);
    url
}

/// Hide access token from the logged URL.
fn redact_token(url: &str) -> String {
    url.split('&')
        .map(|pair| match pair.split_once("token=") {
            Some((prefix, _)) if prefix.is_empty() || prefix.ends_with('?') => {
                format!("{prefix}token=***")
            }
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&")
}

fn create_result(
    status: StatusCode,
    headers: &HeaderMap,
    body: Bytes,
) -> Result<TransportResponse, GroupMeError> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();

    Ok(TransportResponse {
        status: status.as_u16(),
        headers,
        body: (!body.is_empty()).then(|| body.to_vec()),
    })
}

impl GroupMeClientBuilder {
    /// Creates a new [`GroupMeClientConfigBuilder`] with the default
    /// [`TransportReqwest`] transport.
    ///
    /// The default transport uses the [`reqwest`] crate to send requests to
    /// the [`GroupMe API`] at `https://api.groupme.com/v3`.
    ///
    /// # Examples
    /// ```
    /// use groupme::GroupMeClientBuilder;
    ///
    /// let client = GroupMeClientBuilder::with_reqwest_transport()
    ///     .with_auth_token("access-token")
    ///     .build();
    /// ```
    ///
    /// [`GroupMeClientConfigBuilder`]: crate::dx::groupme_client::GroupMeClientConfigBuilder
    /// [`reqwest`]: https://docs.rs/reqwest
    /// [`GroupMe API`]: https://dev.groupme.com/docs/v3
    pub fn with_reqwest_transport(
    ) -> crate::dx::groupme_client::GroupMeClientConfigBuilder<TransportReqwest> {
        Self::with_transport(TransportReqwest::new())
    }
}

#[cfg(test)]
mod should {
    use super::*;
    use test_case::test_case;
    use wiremock::matchers::{body_string, header, method, path as path_macher, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test_case("/users/me", "/users/me" ; "plain path")]
    #[test_case("/groups/1234", "/groups/1234" ; "resource path")]
    #[test_case("/direct_messages", "/direct_messages" ; "underscore path")]
    #[tokio::test]
    async fn send_via_get_method(path_to_match: &str, path_to_send: &str) {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path_macher(path_to_match.to_string()))
            .and(query_param("token", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"response\":null}"))
            .mount(&server)
            .await;

        let transport = TransportReqwest {
            reqwest_client: reqwest::Client::default(),
            hostname: server.uri(),
        };

        let request = TransportRequest {
            path: path_to_send.into(),
            query_parameters: [("token".into(), "secret".into())].into(),
            method: TransportMethod::Get,
            body: None,
            ..Default::default()
        };

        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, Some(b"{\"response\":null}".to_vec()));
    }

    #[tokio::test]
    async fn send_via_post_method() {
        let message = "{\"message\":{\"text\":\"Hello from post\"}}";
        let path = "/groups/1234/messages";

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_macher(path))
            .and(body_string(message.to_string()))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .mount(&server)
            .await;

        let transport = TransportReqwest {
            reqwest_client: reqwest::Client::default(),
            hostname: server.uri(),
        };

        let request = TransportRequest {
            path: path.into(),
            method: TransportMethod::Post,
            body: Some(message.as_bytes().to_vec()),
            ..Default::default()
        };

        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn send_headers() {
        let path = "/users/me";
        let expected_key = "k";
        let expected_val = "v";

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_macher(path))
            .and(header(expected_key, expected_val))
            .respond_with(ResponseTemplate::new(200).insert_header("x-request", "1"))
            .mount(&server)
            .await;

        let transport = TransportReqwest {
            reqwest_client: reqwest::Client::default(),
            hostname: server.uri(),
        };

        let request = TransportRequest {
            path: path.into(),
            method: TransportMethod::Get,
            headers: [(expected_key.into(), expected_val.into())].into(),
            ..Default::default()
        };

        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, None);
        assert_eq!(response.headers.get("x-request").map(String::as_str), Some("1"));
    }

    #[test]
    fn merge_query_parameters() {
        let query_parameters: HashMap<String, String> = [
            ("per_page".into(), "10".into()),
            ("omit".into(), "memberships".into()),
            ("token".into(), "a+b".into()),
        ]
        .into();

        assert_eq!(
            prepare_url("https://api.groupme.com/v3/", "/groups", &query_parameters),
            "https://api.groupme.com/v3/groups?omit=memberships&per_page=10&token=a%2Bb"
        );
    }

    #[test_case("https://h/v3/users/me?token=abc", "https://h/v3/users/me?token=***" ; "only parameter")]
    #[test_case("https://h/v3/groups?page=1&token=abc", "https://h/v3/groups?page=1&token=***" ; "last parameter")]
    #[test_case("https://h/v3/groups?page=1", "https://h/v3/groups?page=1" ; "no token")]
    fn hide_token_in_logs(url: &str, expected: &str) {
        assert_eq!(redact_token(url), expected);
    }
}

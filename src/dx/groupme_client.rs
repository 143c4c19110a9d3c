//! GroupMe client module
//!
//! This module contains the [`GroupMeClientInstance`] struct.
//! It's used to send requests to the [`GroupMe API`].
//!
//! [`GroupMe API`]: https://dev.groupme.com/docs/v3

use crate::{
    core::{GroupMeError, Transport, TransportRequest},
    transport::middleware::GroupMeMiddleware,
};
use derive_builder::Builder;
use log::{debug, info};
use serde::{de::DeserializeOwned, Deserialize};
use spin::RwLock;
use std::{ops::Deref, sync::Arc};

#[cfg(feature = "reqwest")]
use crate::transport::TransportReqwest;

/// Client identifier sent with every request.
pub const SDK_ID: &str = "GroupMe-Rust";

/// Version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lowest HTTP status code treated as a failed request.
const ERROR_STATUS_CODE_MIN: u16 = 300;

/// GroupMe client with a custom transport.
///
/// Every request is passed through [`GroupMeMiddleware`], which adds the
/// access token.
pub type GroupMeGenericClient<T> = GroupMeClientInstance<GroupMeMiddleware<T>>;

/// GroupMe client
///
/// Client for the [`GroupMe API`] using [`TransportReqwest`].
///
/// # Examples
/// ```no_run
/// use groupme::GroupMeClientBuilder;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GroupMeClientBuilder::with_reqwest_transport()
///     .with_auth_token("access-token")
///     .build()?;
///
/// let me = client.my_user().await?;
/// println!("Logged in as {}", me.name);
/// # Ok(())
/// # }
/// ```
///
/// [`GroupMe API`]: https://dev.groupme.com/docs/v3
#[cfg(feature = "reqwest")]
pub type GroupMeClient = GroupMeGenericClient<TransportReqwest>;

/// GroupMe client raw instance.
///
/// This struct contains the actual client state.
/// It shouldn't be used directly. Use [`GroupMeGenericClient`] or
/// [`GroupMeClient`] instead.
#[derive(Debug)]
pub struct GroupMeClientInstance<T> {
    pub(crate) inner: Arc<GroupMeClientRef<T>>,
}

impl<T> Deref for GroupMeClientInstance<T> {
    type Target = GroupMeClientRef<T>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<T> Clone for GroupMeClientInstance<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

/// Client reference
///
/// This struct contains the actual client state.
/// It's wrapped in `Arc` by [`GroupMeClientInstance`] and uses interior
/// mutability for the access token.
#[derive(Builder, Debug)]
#[builder(
    pattern = "owned",
    name = "GroupMeClientConfigBuilder",
    build_fn(private, name = "build_internal"),
    setter(prefix = "with")
)]
pub struct GroupMeClientRef<T> {
    /// Transport layer
    #[builder(setter(custom), field(vis = "pub(crate)"))]
    pub(crate) transport: T,

    /// Access token
    #[builder(setter(custom), field(vis = "pub(crate)"))]
    pub(crate) auth_token: Arc<RwLock<String>>,
}

impl<T> GroupMeClientInstance<T>
where
    T: Transport,
{
    /// Replace access token used for the following requests.
    pub fn set_token<S>(&self, access_token: S)
    where
        S: Into<String>,
    {
        *self.auth_token.write() = access_token.into();
    }

    /// Current access token.
    ///
    /// Push subscriptions are authorized with the same token.
    pub fn get_token(&self) -> String {
        self.auth_token.read().clone()
    }

    /// Send `request` and decode the `response` member of the reply envelope.
    pub(crate) async fn request<R>(&self, request: TransportRequest) -> Result<R, GroupMeError>
    where
        R: DeserializeOwned,
    {
        debug!("{} {}", request.method, request.path);
        let response = self.transport.send(request).await?;
        let body = response.body.unwrap_or_default();

        if response.status >= ERROR_STATUS_CODE_MIN {
            let meta = serde_json::from_slice::<Envelope<serde_json::Value>>(&body)
                .ok()
                .and_then(|envelope| envelope.meta)
                .unwrap_or(Meta {
                    code: response.status,
                    errors: Vec::new(),
                });

            return Err(GroupMeError::Api {
                code: meta.code,
                errors: meta.errors,
            });
        }

        serde_json::from_slice::<Envelope<R>>(&body)
            .map_err(|err| GroupMeError::Deserialization {
                details: err.to_string(),
            })?
            .response
            .ok_or_else(|| GroupMeError::Deserialization {
                details: "Response envelope without `response` member".into(),
            })
    }
}

/// GroupMe API reply envelope.
#[derive(Debug, Deserialize)]
struct Envelope<R> {
    #[serde(default = "Option::default")]
    response: Option<R>,

    #[serde(default)]
    meta: Option<Meta>,
}

/// Status reported in the reply envelope.
#[derive(Debug, Default, Deserialize)]
struct Meta {
    #[serde(default)]
    code: u16,

    #[serde(default)]
    errors: Vec<String>,
}

impl<T> GroupMeClientConfigBuilder<T> {
    /// Set access token.
    ///
    /// Token can be obtained from the GroupMe developers site.
    pub fn with_auth_token<S>(mut self, access_token: S) -> Self
    where
        S: Into<String>,
    {
        self.auth_token = Some(Arc::new(RwLock::new(access_token.into())));
        self
    }

    /// Build a [`GroupMeGenericClient`] from the builder.
    ///
    /// # Errors
    /// Returns [`GroupMeError::ClientInitialization`] when the access token
    /// is missing or empty.
    pub fn build(self) -> Result<GroupMeGenericClient<T>, GroupMeError> {
        self.build_internal()
            .map_err(|err| GroupMeError::ClientInitialization {
                details: err.to_string(),
            })
            .and_then(|pre_build| {
                if pre_build.auth_token.read().is_empty() {
                    return Err(GroupMeError::ClientInitialization {
                        details: "Access token can't be empty".into(),
                    });
                }

                info!("Client configuration: sdk: {SDK_ID}/{VERSION}");

                Ok(GroupMeClientRef {
                    transport: GroupMeMiddleware {
                        transport: pre_build.transport,
                        auth_token: pre_build.auth_token.clone(),
                    },
                    auth_token: pre_build.auth_token,
                })
            })
            .map(|client| GroupMeClientInstance {
                inner: Arc::new(client),
            })
    }
}

/// GroupMe builder for the [`GroupMeClient`].
///
/// Entry point which selects the transport layer and returns
/// [`GroupMeClientConfigBuilder`] for the remaining parameters.
#[derive(Debug, Clone)]
pub struct GroupMeClientBuilder;

impl GroupMeClientBuilder {
    /// Set the transport layer for the client.
    ///
    /// # Examples
    /// ```
    /// # use groupme::core::{Transport, TransportRequest, TransportResponse, GroupMeError};
    /// use groupme::GroupMeClientBuilder;
    /// #
    /// # struct MyTransport;
    /// # #[async_trait::async_trait]
    /// # impl Transport for MyTransport {
    /// #     async fn send(&self, _request: TransportRequest) -> Result<TransportResponse, GroupMeError> {
    /// #         unimplemented!()
    /// #     }
    /// # }
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// // note that MyTransport must implement the `Transport` trait
    /// let client = GroupMeClientBuilder::with_transport(MyTransport)
    ///     .with_auth_token("access-token")
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn with_transport<T>(transport: T) -> GroupMeClientConfigBuilder<T>
    where
        T: Transport,
    {
        GroupMeClientConfigBuilder {
            transport: Some(transport),
            auth_token: None,
        }
    }
}

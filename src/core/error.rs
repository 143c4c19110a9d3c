//! # Error types
//!
//! This module contains the error types for the [`groupme`] crate.

use snafu::Snafu;

/// GroupMe error type
///
/// This type is used to represent errors that can occur while talking to the
/// GroupMe REST API or while maintaining a push subscription.
/// It is used as the error type for the [`Result`] type.
///
/// # Examples
/// ```
/// use groupme::core::GroupMeError;
///
/// fn foo() -> Result<(), GroupMeError> {
///   Ok(())
/// }
///
/// foo().map_err(|e| match e {
///   GroupMeError::Transport { .. } => println!("Transport error"),
///   GroupMeError::ListenerNotStarted => println!("Call start_listening first"),
///   _ => println!("Other error"),
/// });
/// ```
///
/// [`Result`]: https://doc.rust-lang.org/std/result/enum.Result.html
#[derive(Snafu, Debug, Clone, PartialEq)]
pub enum GroupMeError {
    /// this error is returned when a channel subscription is requested before
    /// the push listener has been started
    #[snafu(display("Push listener not started, call `start_listening` first"))]
    ListenerNotStarted,

    /// this error is returned when `start_listening` is called on a push
    /// subscription which already listens (or has been stopped)
    #[snafu(display("Push listener has already been started"))]
    AlreadyListening,

    /// this error is returned when the transport layer fails
    #[snafu(display("Transport error: {details}"))]
    Transport {
        ///docs
        details: String,
    },

    /// this error is returned when the push service reports an error for one
    /// of the protocol messages
    #[snafu(display("Push protocol error: {details}"))]
    Protocol {
        ///docs
        details: String,
    },

    /// this error is returned when the serialization of the request fails
    #[snafu(display("Serialization error: {details}"))]
    Serialization {
        ///docs
        details: String,
    },

    /// this error is returned when the deserialization of the response or the
    /// push event payload fails
    #[snafu(display("Deserialization error: {details}"))]
    Deserialization {
        ///docs
        details: String,
    },

    /// this error is returned when the GroupMe API responds with an error
    /// status code
    #[snafu(display("Error Code {code}: {errors:?}"))]
    Api {
        /// HTTP status code reported in the `meta` envelope
        code: u16,

        /// Error descriptions reported in the `meta` envelope
        errors: Vec<String>,
    },

    /// this error is returned when the initialization of client fails
    #[snafu(display("Client initialization error: {details}"))]
    ClientInitialization {
        ///docs
        details: String,
    },
}

impl GroupMeError {
    /// Human readable description of well-known API status codes.
    ///
    /// Returns `None` for errors which are not [`GroupMeError::Api`] or for
    /// status codes not documented by GroupMe.
    pub fn api_status_description(&self) -> Option<&'static str> {
        let GroupMeError::Api { code, .. } = self else {
            return None;
        };

        match code {
            200 => Some("success"),
            201 => Some("resource was created successfully"),
            204 => Some("resource was deleted successfully"),
            304 => Some("no new data to return"),
            400 => Some("invalid format or data specified in the request"),
            401 => Some("authentication credentials missing or incorrect"),
            403 => Some("request refused due to update limits"),
            404 => Some("URI is invalid or resource does not exist"),
            420 => Some("application is being rate limited"),
            500 => Some("something unexpected occurred"),
            502 => Some("GroupMe is down or being upgraded"),
            503 => Some("servers are overloaded, try again later"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod should {
    use super::*;

    #[test]
    fn format_api_error_like_meta_envelope() {
        let error = GroupMeError::Api {
            code: 404,
            errors: vec!["not found".into()],
        };

        assert_eq!(error.to_string(), "Error Code 404: [\"not found\"]");
        assert_eq!(
            error.api_status_description(),
            Some("URI is invalid or resource does not exist")
        );
    }

    #[test]
    fn not_describe_non_api_errors() {
        assert_eq!(
            GroupMeError::ListenerNotStarted.api_status_description(),
            None
        );
    }
}

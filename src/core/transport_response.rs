//! This module contains the `TransportResponse` struct.
//!
//! This struct is used to represent the response from a request to the
//! GroupMe API. It is used as the response type for the [`Transport`] trait.
//!
//! [`Transport`]: ../transport/trait.Transport.html

use hashbrown::HashMap;

/// This struct is used to represent the response from a request to the
/// GroupMe API.
///
/// [`Transport`]: ../transport/trait.Transport.html
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct TransportResponse {
    /// status code of the response
    pub status: u16,

    /// headers of the response
    pub headers: HashMap<String, String>,

    /// body of the response
    pub body: Option<Vec<u8>>,
}

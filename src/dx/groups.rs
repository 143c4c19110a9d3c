//! # Groups API
//!
//! Listing of the groups the authenticated user belongs to.

use crate::{
    core::{GroupMeError, Transport, TransportMethod, TransportRequest},
    dx::{data_types::Group, groupme_client::GroupMeClientInstance},
};
use hashbrown::HashMap;

const INDEX_GROUPS_ENDPOINT: &str = "/groups";

/// Optional parameters of [`index_groups`].
///
/// Zero and empty values are not sent, letting GroupMe apply its defaults.
///
/// [`index_groups`]: GroupMeClientInstance::index_groups
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupsQuery {
    /// Fetch a particular page of results. Defaults to 1.
    pub page: u32,

    /// Define page size. Defaults to 10.
    pub per_page: u32,

    /// Comma separated list of data to omit from output.
    ///
    /// Only `memberships` is supported; groups are then returned without
    /// members, which is considerably faster.
    pub omit: String,
}

impl GroupsQuery {
    fn query_parameters(&self) -> HashMap<String, String> {
        let mut query = HashMap::new();

        if self.page != 0 {
            query.insert("page".into(), self.page.to_string());
        }
        if self.per_page != 0 {
            query.insert("per_page".into(), self.per_page.to_string());
        }
        if !self.omit.is_empty() {
            query.insert("omit".into(), self.omit.clone());
        }

        query
    }
}

impl<T> GroupMeClientInstance<T>
where
    T: Transport,
{
    /// List the authenticated user's active groups.
    ///
    /// The response is paginated, with a default of 10 groups per page.
    ///
    /// # Errors
    /// Returns [`GroupMeError::Api`] if GroupMe rejects the request.
    pub async fn index_groups(&self, query: &GroupsQuery) -> Result<Vec<Group>, GroupMeError> {
        self.request(TransportRequest {
            path: INDEX_GROUPS_ENDPOINT.into(),
            query_parameters: query.query_parameters(),
            method: TransportMethod::Get,
            ..Default::default()
        })
        .await
    }
}

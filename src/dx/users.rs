//! # Users API
//!
//! Endpoints describing the authenticated user.

use crate::{
    core::{GroupMeError, Transport, TransportMethod, TransportRequest},
    dx::{data_types::User, groupme_client::GroupMeClientInstance},
};

const MY_USER_ENDPOINT: &str = "/users/me";

impl<T> GroupMeClientInstance<T>
where
    T: Transport,
{
    /// Fetch the user the access token belongs to.
    ///
    /// Its identifier is required to subscribe to the user push channel.
    ///
    /// # Errors
    /// Returns [`GroupMeError::Api`] if GroupMe rejects the request.
    pub async fn my_user(&self) -> Result<User, GroupMeError> {
        self.request(TransportRequest {
            path: MY_USER_ENDPOINT.into(),
            method: TransportMethod::Get,
            ..Default::default()
        })
        .await
    }
}

#[cfg(test)]
mod should {
    use crate::{core::ID, dx::groupme_client::should::client};

    #[tokio::test]
    async fn fetch_current_user() {
        let client = client(
            200,
            r#"{
                "response": {
                    "id": "1234567890",
                    "phone_number": "+1 2123001234",
                    "image_url": "https://i.groupme.com/123456789",
                    "name": "Ronald Swanson",
                    "created_at": 1302623328,
                    "updated_at": 1302623328,
                    "email": "me@example.com",
                    "sms": false
                },
                "meta": {"code": 200}
            }"#,
            |request| assert_eq!(request.path, "/users/me"),
        );

        let user = client.my_user().await.unwrap();

        assert_eq!(user.id, ID::from("1234567890"));
        assert_eq!(user.name, "Ronald Swanson");
        assert_eq!(user.created_at.0, 1302623328);
        assert!(!user.sms);
    }
}

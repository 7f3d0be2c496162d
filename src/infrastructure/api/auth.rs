#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;

use serde_json::json;

use super::client::ApiClient;
use super::client::ApiError;
use super::types::Envelope;
use super::types::LoginData;
use super::types::LoginRequest;
use super::types::ProfileUpdate;
use super::types::RegisterData;
use super::types::RegisterRequest;
use crate::domain::models::UserProfile;

/// Account and session operations. Login and register populate the
/// credential store; logout clears it. The backend has no logout endpoint,
/// so logout is purely local.
#[derive(Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> AuthApi {
        return AuthApi { client };
    }

    pub async fn register(&self, req: &RegisterRequest) -> Result<UserProfile, ApiError> {
        let res: Envelope<RegisterData> = self
            .client
            .post_json("/auth/register/", json!(req))
            .await?;

        return Ok(res.data.user);
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, ApiError> {
        let req = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let res: Envelope<LoginData> = self.client.post_json("/auth/login/", json!(req)).await?;

        self.client
            .store()
            .set_tokens(&res.data.access, Some(&res.data.refresh));

        // Older backend builds leave the profile out of the login payload.
        let user = match res.data.user {
            Some(user) => user,
            None => self.client.get_json::<UserProfile>("/auth/profile/").await?,
        };

        self.client.store().set_user(user.clone());
        return Ok(user);
    }

    pub fn logout(&self) {
        self.client.store().clear();
    }

    pub async fn profile(&self) -> Result<UserProfile, ApiError> {
        let user: UserProfile = self.client.get_json("/auth/profile/").await?;
        self.client.store().set_user(user.clone());
        return Ok(user);
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<UserProfile, ApiError> {
        let user: UserProfile = self.client.put_json("/auth/profile/", json!(update)).await?;
        self.client.store().set_user(user.clone());
        return Ok(user);
    }
}

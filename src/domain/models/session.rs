use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Everything the client persists between runs: the JWT pair and the cached
/// profile snapshot. Tokens are opaque strings and are never inspected.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<UserProfile>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

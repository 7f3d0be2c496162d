#[cfg(test)]
#[path = "credentials_test.rs"]
mod tests;

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::domain::models::Session;
use crate::domain::models::UserProfile;

/// File-backed store for the JWT pair and the cached user profile. The file
/// outlives the process so a login survives restarts; everything in it is
/// wiped on logout or when a token refresh fails for good.
pub struct CredentialStore {
    pub file_path: PathBuf,
    session: RwLock<Session>,
}

impl CredentialStore {
    pub fn load(file_path: PathBuf) -> CredentialStore {
        let session = fs::read_to_string(&file_path)
            .ok()
            .and_then(|payload| return serde_json::from_str::<Session>(&payload).ok())
            .unwrap_or_default();

        return CredentialStore {
            file_path,
            session: RwLock::new(session),
        };
    }

    pub fn access_token(&self) -> Option<String> {
        return self.session.read().unwrap().access_token.clone();
    }

    pub fn refresh_token(&self) -> Option<String> {
        return self.session.read().unwrap().refresh_token.clone();
    }

    pub fn user(&self) -> Option<UserProfile> {
        return self.session.read().unwrap().user.clone();
    }

    pub fn is_authenticated(&self) -> bool {
        let session = self.session.read().unwrap();
        return session.access_token.is_some() || session.refresh_token.is_some();
    }

    /// Replaces the access token. The refresh token is only replaced when the
    /// server rotated it and sent a new one along.
    pub fn set_tokens(&self, access: &str, refresh: Option<&str>) {
        let mut session = self.session.write().unwrap();
        session.access_token = Some(access.to_string());
        if let Some(refresh) = refresh {
            session.refresh_token = Some(refresh.to_string());
        }

        self.persist(&session);
    }

    pub fn set_user(&self, user: UserProfile) {
        let mut session = self.session.write().unwrap();
        session.user = Some(user);
        self.persist(&session);
    }

    pub fn clear(&self) {
        let mut session = self.session.write().unwrap();
        *session = Session::default();
        self.persist(&session);
    }

    fn persist(&self, session: &Session) {
        let payload = match serde_json::to_string_pretty(session) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(err = ?err, "failed to serialize credentials");
                return;
            }
        };

        if let Some(parent) = self.file_path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        if let Err(err) = fs::write(&self.file_path, payload) {
            tracing::warn!(err = ?err, "failed to persist credentials");
        }
    }
}

use serde_derive::Deserialize;
use serde_derive::Serialize;

use crate::configuration::Config;
use crate::configuration::ConfigKey;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Author {
    User,
    Assistant,
    App,
}

impl Author {
    /// Maps the backend's message role to an author. The backend emits
    /// "user", "assistant", and occasionally "system"; system turns are
    /// rendered the same way assistant turns are.
    pub fn from_role(role: &str) -> Author {
        if role == "user" {
            return Author::User;
        }

        return Author::Assistant;
    }
}

impl ToString for Author {
    fn to_string(&self) -> String {
        match self {
            Author::User => return Config::get(ConfigKey::Username),
            Author::Assistant => return String::from("Assistant"),
            Author::App => return String::from("TalkFlow"),
        }
    }
}

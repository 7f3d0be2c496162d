pub mod auth;
pub mod chat;
mod client;
pub mod types;

pub use auth::AuthApi;
pub use chat::ChatApi;
pub use client::ApiClient;
pub use client::ApiError;

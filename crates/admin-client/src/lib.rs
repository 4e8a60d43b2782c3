//! HTTP client for the K1 admin backends.
//!
//! This crate wraps the two upstream services the admin console talks to:
//!
//! - the primary backend (auth, users, transcripts, staff accounts, delivery)
//! - the retrieval API (document corpus management)
//!
//! Every operation is a single HTTP call: no retries, no local state.
//!
//! # Example
//!
//! ```no_run
//! use admin_client::{ApiClient, ClientConfig};
//!
//! # async fn example() -> Result<(), admin_client::ClientError> {
//! let client = ApiClient::new(ClientConfig::default())?;
//!
//! let me = client.auth().me().await?;
//! println!("Signed in as {} ({})", me.username, me.role);
//!
//! for user in client.users().list().await? {
//!     println!("{} -> {}", user.telegram_id, user.display_name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod admin_users;
pub mod auth;
pub mod client;
pub mod config;
pub mod documents;
pub mod error;
pub mod messages;
pub mod types;
pub mod users;

pub use admin_users::AdminUsersApi;
pub use auth::AuthApi;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use documents::DocumentsApi;
pub use error::{ClientError, Result};
pub use messages::MessagesApi;
pub use types::*;
pub use users::UsersApi;

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

//! Authentication core for the single-page client.
//!
//! Everything here is platform independent. The browser build supplies
//! storage, HTTP and history adapters through [`KeyValueStore`],
//! [`HttpTransport`] and [`Navigator`]; tests supply in-memory doubles.

pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod guard;
pub mod navigation;
pub mod oauth;
pub mod session;
pub mod storage;
pub mod token_store;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use client::{AuthClient, AuthEvent, AuthEvents, OAuthCompletion};
pub use clock::{Clock, SystemClock};
pub use config::ClientConfig;
pub use error::{AuthError, AuthResult};
pub use guard::{Guard, GuardOutcome};
pub use navigation::{Location, Navigation, Navigator};
pub use oauth::complete_oauth_login;
pub use session::{LoginArgs, Session, SessionService, SessionSnapshot, SessionStatus};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use token_store::{StoredSession, TokenStore};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, TransportError};

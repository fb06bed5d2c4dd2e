//! Wire types shared between the auth client core and the web frontend.

pub mod api;
pub mod models;

pub use models::UserProfile;

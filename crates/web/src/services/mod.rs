//! Business logic services.
//!
//! # Services
//!
//! - `auth` - User store: account creation and password authentication
//! - `session` - Server-side session manager (token issue, rotation, logout)
//! - `favorites` - Favorite substitute bookmarks
//! - `account` - Create-account, login and logout flows built on the above

pub mod account;
pub mod auth;
pub mod favorites;
pub mod session;

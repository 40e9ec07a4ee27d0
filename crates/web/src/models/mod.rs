//! Domain models for the web service.
//!
//! These are validated domain objects, separate from database row types.

pub mod favorite;
pub mod session;
pub mod user;

pub use favorite::FavoriteLink;
pub use session::{SessionContext, SessionState, keys as session_keys};
pub use user::{Authenticatable, NewUser, User};

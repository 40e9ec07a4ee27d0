//! Favorites inspection command.

use pur_beurre_core::Email;
use pur_beurre_web::db::{PgFavoriteRepository, PgUserRepository};
use pur_beurre_web::services::auth::{AuthError, UserStore, ValidationError};
use pur_beurre_web::services::favorites::FavoritesRegistry;

use super::{CommandError, connect};

/// Print a user's favorite product ids, newest first.
///
/// # Errors
///
/// Returns `CommandError::UnknownUser` if no account has this email.
pub async fn list(email: &str) -> Result<(), CommandError> {
    let email =
        Email::parse(email).map_err(|e| AuthError::Validation(ValidationError::InvalidEmail(e)))?;

    let pool = connect().await?;
    let users = PgUserRepository::new(pool.clone());
    let favorites = PgFavoriteRepository::new(pool);

    let user = UserStore::new(&users)
        .find_by_email(&email)
        .await?
        .ok_or_else(|| CommandError::UnknownUser(email.to_string()))?;

    let products = FavoritesRegistry::new(&favorites)
        .list_favorites(user.id)
        .await?;

    tracing::info!("{} has {} favorite(s)", user.username, products.len());

    #[allow(clippy::print_stdout)]
    {
        for product_id in products {
            println!("{product_id}");
        }
    }

    Ok(())
}

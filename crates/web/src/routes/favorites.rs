//! Favorite substitutes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect},
};

use pur_beurre_core::ProductId;

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::routes::NavState;
use crate::state::AppState;

const FAVORITES_PATH: &str = "/favorites";

/// Favorites page template.
#[derive(Template, WebTemplate)]
#[template(path = "favorites.html")]
pub struct FavoritesTemplate {
    pub nav: NavState,
    pub favorites: Vec<ProductId>,
}

/// List the user's favorites, newest first.
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<impl IntoResponse> {
    let favorites = state.favorites_registry().list_favorites(user.id).await?;

    Ok(FavoritesTemplate {
        nav: NavState::for_user(Some(&user)),
        favorites,
    })
}

/// Bookmark a product.
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect> {
    state
        .favorites_registry()
        .add_favorite(user.id, product_id)
        .await?;
    let product = product_id.to_string();
    add_breadcrumb(
        "favorites",
        "Added favorite",
        Some(&[("product_id", product.as_str())]),
    );

    Ok(Redirect::to(FAVORITES_PATH))
}

/// Remove a bookmark.
pub async fn remove(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(product_id): Path<ProductId>,
) -> Result<Redirect> {
    state
        .favorites_registry()
        .remove_favorite(user.id, product_id)
        .await?;

    Ok(Redirect::to(FAVORITES_PATH))
}

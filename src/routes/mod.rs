use axum::Router;

use crate::state::AppState;

pub mod auth;
pub mod bills;
pub mod cart;
pub mod categories;
pub mod doc;
pub mod foods;
pub mod health;
pub mod history;
pub mod params;
pub mod promotions;
pub mod settings;
pub mod statistics;
pub mod tables;
pub mod users;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/categories", categories::router())
        .nest("/foods", foods::router())
        .nest("/tables", tables::router())
        .nest("/bills", bills::router())
        .nest("/cart", cart::router())
        .nest("/promotions", promotions::router())
        .nest("/history", history::router())
        .nest("/settings", settings::router())
        .nest("/statistics", statistics::router())
}

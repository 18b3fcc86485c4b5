pub mod filters;
pub mod geo;
pub mod handlers;
pub mod implementations;
pub mod models;
pub mod repository;
pub mod schemas;
pub mod search;

#[cfg(test)]
mod tests;

use crate::utilities::app_state::AppState;

use axum::{Router, routing::get};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/properties",
            get(handlers::get_many_properties_handler).post(handlers::create_property_handler),
        )
        .route(
            "/properties/nearby",
            get(handlers::get_nearby_properties_handler),
        )
        .route(
            "/properties/bounds",
            get(handlers::get_properties_in_bounds_handler),
        )
        .route(
            "/properties/{property_id}",
            get(handlers::get_one_property_handler)
                .patch(handlers::update_property_handler)
                .delete(handlers::delete_property_handler),
        )
}

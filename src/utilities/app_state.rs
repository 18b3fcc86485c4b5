use std::sync::Arc;

use axum::extract::FromRef;

use crate::{features::properties::repository::PropertyStore, utilities::config::Config};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub properties: Arc<dyn PropertyStore>,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<dyn PropertyStore> {
    fn from_ref(state: &AppState) -> Self {
        state.properties.clone()
    }
}

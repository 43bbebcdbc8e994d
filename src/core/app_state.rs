use std::sync::Arc;

use crate::core::{config::Config, db::DbPool};

/// Shared handler state: the connection pool plus the loaded configuration.
/// The pool is the only shared mutable resource in the system.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub config: Arc<Config>,
}

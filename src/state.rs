use crate::datalayer::{DbManager, UserStore};

/// Application state shared across all handlers
///
/// The storage handle lives here and is passed into every handler through
/// axum's state extraction; nothing in the process relies on an ambient
/// global connection.
#[derive(Clone)]
pub struct AppState {
    pub db: DbManager,
    pub users: UserStore,
}

impl AppState {
    /// Create new application state around an initialized database
    pub fn new(db: DbManager) -> Self {
        let users = UserStore::new(db.pool_arc());
        Self { db, users }
    }
}

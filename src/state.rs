use sea_orm::DatabaseConnection;

use crate::config::StockPolicy;

/// Handles shared by every request. The connection is created once by the
/// entry point and passed in; nothing resolves it globally.
#[derive(Clone)]
pub struct AppState {
    pub orm: DatabaseConnection,
    pub stock_policy: StockPolicy,
}

impl AppState {
    pub fn new(orm: DatabaseConnection, stock_policy: StockPolicy) -> Self {
        Self { orm, stock_policy }
    }
}

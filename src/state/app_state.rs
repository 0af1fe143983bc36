use mongodb::Database;

use crate::config::settings::AppConfig;

pub struct AppState {
    pub db: Database,
    pub config: AppConfig,
}

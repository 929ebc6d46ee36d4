use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::{
    classifier::CombinationIndex,
    config::Config,
    database::{init_db, load_combinations, seed_reference_data},
    error::AppError,
};

pub struct AppState {
    pub config: Config,
    pub pool: SqlitePool,
    pub combinations: CombinationIndex,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Arc<Self>, AppError> {
        let pool = init_db(&config.database_url).await?;

        if config.seed_on_start {
            seed_reference_data(&pool).await?;
        }

        let rows = load_combinations(&pool).await?;
        let combinations = CombinationIndex::from_rows(rows)?;
        info!("Loaded {} combination rules", combinations.len());

        Ok(Arc::new(Self {
            config,
            pool,
            combinations,
        }))
    }
}

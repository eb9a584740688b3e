use sqlx::MySqlPool;
use tracing::info;

use crate::store::{MemoryStore, MySqlStore, Store};

pub async fn init_db(database_url: &str) -> Result<MySqlPool, sqlx::Error> {
    let pool = MySqlPool::connect(database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied");
    Ok(pool)
}

/// MySQL when a URL is configured, otherwise the in-memory store.
pub async fn init_store(database_url: Option<&str>) -> Result<Store, sqlx::Error> {
    match database_url {
        Some(url) => Ok(Store::MySql(MySqlStore::new(init_db(url).await?))),
        None => Ok(Store::Memory(MemoryStore::new())),
    }
}

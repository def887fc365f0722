use crate::db::{DbPool, OrmConn};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
}

impl AppState {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = crate::db::create_pool(database_url).await?;
        let orm = crate::db::create_orm_conn(database_url).await?;
        Ok(Self { pool, orm })
    }
}

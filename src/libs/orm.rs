use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{
    Sqlite, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteQueryResult,
};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::libs::config::OrmConfig;
use crate::libs::error::{Error, Result};
use crate::libs::executor::{Executor, TableOps};
use crate::libs::render::SqlRenderer;
use crate::libs::schema::{Model, TableSchema};

/// Table operations over a sqlx sqlite pool.
pub struct SqliteOrm {
    config: OrmConfig,
    pool: Option<SqlitePool>,
    renderer: SqlRenderer,
}

impl SqliteOrm {
    pub fn new(config: OrmConfig) -> Self {
        let renderer = SqlRenderer::new(config.quoting);
        Self {
            config,
            pool: None,
            renderer,
        }
    }

    /// Open an existing database file.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut orm = Self::new(OrmConfig::for_path(path));
        orm.connect().await?;
        Ok(orm)
    }

    /// Create an empty database file, replacing any existing one, and open it.
    pub async fn create_and_open(path: impl AsRef<Path>) -> Result<Self> {
        tokio::fs::File::create(path.as_ref()).await?;
        let mut orm = Self::new(OrmConfig::for_path(path).create_if_missing(true));
        orm.connect().await?;
        Ok(orm)
    }

    pub fn config(&self) -> &OrmConfig {
        &self.config
    }

    pub fn renderer(&self) -> SqlRenderer {
        self.renderer
    }

    pub fn is_connected(&self) -> bool {
        self.pool.is_some()
    }

    pub async fn connect(&mut self) -> Result<()> {
        self.config.validate()?;
        let options = match &self.config.filename {
            Some(path) => SqliteConnectOptions::new().filename(path),
            None => SqliteConnectOptions::from_str(&self.config.database_url)?,
        }
        .create_if_missing(self.config.create_if_missing);
        let pool = SqlitePoolOptions::new()
            .max_connections(self.config.max_connections)
            .connect_with(options)
            .await?;
        info!(url = %self.config.database_url, "connected");
        self.pool = Some(pool);
        Ok(())
    }

    pub async fn close(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.close().await;
            info!(url = %self.config.database_url, "closed");
        }
    }

    pub fn pool(&self) -> Result<&SqlitePool> {
        self.pool.as_ref().ok_or(Error::NotConnected)
    }

    /// Run arbitrary statement text.
    pub async fn raw(&self, sql: &str) -> Result<SqliteQueryResult> {
        debug!(%sql, "executing raw statement");
        Ok(sqlx::query(sql).execute(self.pool()?).await?)
    }

    /// Check out one pooled connection. Every statement run through the
    /// session sees the writes of the ones before it.
    pub async fn session(&self) -> Result<SqliteSession> {
        let conn = self.pool()?.acquire().await?;
        Ok(SqliteSession::new(conn))
    }

    pub async fn table_exists<M: Model>(&self) -> Result<bool> {
        let schema = M::schema()?;
        self.table_exists_named(schema.name()).await
    }

    pub async fn table_exists_named(&self, table_name: &str) -> Result<bool> {
        let session = self.session().await?;
        TableOps::new(&session, self.renderer).exists(table_name).await
    }

    pub async fn create_table<M: Model>(&self) -> Result<bool> {
        self.create_schema(&M::schema()?).await
    }

    pub async fn create_schema(&self, schema: &TableSchema) -> Result<bool> {
        let session = self.session().await?;
        TableOps::new(&session, self.renderer).create(schema).await
    }

    pub async fn drop_table<M: Model>(&self) -> Result<bool> {
        let schema = M::schema()?;
        self.drop_table_named(schema.name()).await
    }

    pub async fn drop_table_named(&self, table_name: &str) -> Result<bool> {
        let session = self.session().await?;
        TableOps::new(&session, self.renderer).drop(table_name).await
    }

    /// Rename the table of `M`. The model keeps its declared name, so later
    /// calls through `M` address the old name again.
    pub async fn rename_table<M: Model>(&self, new_name: &str) -> Result<bool> {
        let schema = M::schema()?;
        self.rename_table_named(schema.name(), new_name).await
    }

    pub async fn rename_table_named(&self, old_name: &str, new_name: &str) -> Result<bool> {
        let session = self.session().await?;
        TableOps::new(&session, self.renderer)
            .rename(old_name, new_name)
            .await
    }
}

/// Executor pinned to a single pooled connection.
pub struct SqliteSession {
    conn: Mutex<PoolConnection<Sqlite>>,
}

impl SqliteSession {
    pub fn new(conn: PoolConnection<Sqlite>) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

#[async_trait]
impl Executor for SqliteSession {
    async fn execute(&self, sql: &str) -> Result<()> {
        let mut conn = self.conn.lock().await;
        sqlx::query(sql).execute(&mut **conn).await?;
        Ok(())
    }

    async fn query_count(&self, sql: &str) -> Result<i64> {
        let mut conn = self.conn.lock().await;
        // Drain the rows so the statement is reset before the next one.
        let counts: Vec<i64> = sqlx::query_scalar(sql).fetch_all(&mut **conn).await?;
        Ok(counts.into_iter().next().unwrap_or(0))
    }
}

use async_trait::async_trait;
use tracing::{debug, info};

use crate::libs::error::Result;
use crate::libs::render::SqlRenderer;
use crate::libs::schema::TableSchema;

/// Runs statement text against a database.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run a statement that yields no rows.
    async fn execute(&self, sql: &str) -> Result<()>;

    /// Run a query whose first column of the first row is a count.
    async fn query_count(&self, sql: &str) -> Result<i64>;
}

/// Table level statements guarded by an existence check.
///
/// Each operation returns whether its statement actually ran.
pub struct TableOps<'a, E: ?Sized> {
    executor: &'a E,
    renderer: SqlRenderer,
}

impl<'a, E> TableOps<'a, E>
where
    E: Executor + ?Sized,
{
    pub fn new(executor: &'a E, renderer: SqlRenderer) -> Self {
        Self { executor, renderer }
    }

    pub async fn exists(&self, table_name: &str) -> Result<bool> {
        let sql = self.renderer.table_exists(table_name);
        debug!(%sql, "checking table");
        Ok(self.executor.query_count(&sql).await? > 0)
    }

    /// Create the table unless it already exists.
    pub async fn create(&self, schema: &TableSchema) -> Result<bool> {
        let sql = self.renderer.create_table(schema)?;
        if self.exists(schema.name()).await? {
            debug!(table = schema.name(), "table already exists, skipping create");
            return Ok(false);
        }
        debug!(%sql, "creating table");
        self.executor.execute(&sql).await?;
        info!(table = schema.name(), columns = schema.columns().len(), "created table");
        Ok(true)
    }

    /// Drop the table if it exists.
    pub async fn drop(&self, table_name: &str) -> Result<bool> {
        if !self.exists(table_name).await? {
            debug!(table = table_name, "table missing, skipping drop");
            return Ok(false);
        }
        let sql = self.renderer.drop_table(table_name);
        debug!(%sql, "dropping table");
        self.executor.execute(&sql).await?;
        info!(table = table_name, "dropped table");
        Ok(true)
    }

    /// Rename only when `old_name` exists and `new_name` does not.
    pub async fn rename(&self, old_name: &str, new_name: &str) -> Result<bool> {
        if !self.exists(old_name).await? {
            debug!(table = old_name, "table missing, skipping rename");
            return Ok(false);
        }
        if self.exists(new_name).await? {
            debug!(table = new_name, "target name taken, skipping rename");
            return Ok(false);
        }
        let sql = self.renderer.rename_table(old_name, new_name);
        debug!(%sql, "renaming table");
        self.executor.execute(&sql).await?;
        info!(from = old_name, to = new_name, "renamed table");
        Ok(true)
    }
}

//! Synchronous front end over [`SqliteOrm`] for callers without a runtime.

use std::path::Path;

use sqlx::sqlite::SqliteQueryResult;
use tokio::runtime::{Builder, Runtime};

use crate::libs::config::OrmConfig;
use crate::libs::error::Result;
use crate::libs::orm::SqliteOrm;
use crate::libs::schema::{Model, TableSchema};

/// Owns a current-thread runtime and drives every call to completion on it.
///
/// Must not be used from inside an async context; `block_on` panics there.
pub struct BlockingOrm {
    orm: SqliteOrm,
    runtime: Runtime,
}

impl BlockingOrm {
    pub fn connect(config: OrmConfig) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let mut orm = SqliteOrm::new(config);
        runtime.block_on(orm.connect())?;
        Ok(Self { orm, runtime })
    }

    /// Open an existing database file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let orm = runtime.block_on(SqliteOrm::open(path))?;
        Ok(Self { orm, runtime })
    }

    /// Create an empty database file, replacing any existing one, and open it.
    pub fn create_and_open(path: impl AsRef<Path>) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let orm = runtime.block_on(SqliteOrm::create_and_open(path))?;
        Ok(Self { orm, runtime })
    }

    pub fn orm(&self) -> &SqliteOrm {
        &self.orm
    }

    pub fn is_connected(&self) -> bool {
        self.orm.is_connected()
    }

    pub fn raw(&self, sql: &str) -> Result<SqliteQueryResult> {
        self.runtime.block_on(self.orm.raw(sql))
    }

    pub fn table_exists<M: Model>(&self) -> Result<bool> {
        self.runtime.block_on(self.orm.table_exists::<M>())
    }

    pub fn table_exists_named(&self, table_name: &str) -> Result<bool> {
        self.runtime.block_on(self.orm.table_exists_named(table_name))
    }

    pub fn create_table<M: Model>(&self) -> Result<bool> {
        self.runtime.block_on(self.orm.create_table::<M>())
    }

    pub fn create_schema(&self, schema: &TableSchema) -> Result<bool> {
        self.runtime.block_on(self.orm.create_schema(schema))
    }

    pub fn drop_table<M: Model>(&self) -> Result<bool> {
        self.runtime.block_on(self.orm.drop_table::<M>())
    }

    pub fn drop_table_named(&self, table_name: &str) -> Result<bool> {
        self.runtime.block_on(self.orm.drop_table_named(table_name))
    }

    pub fn rename_table<M: Model>(&self, new_name: &str) -> Result<bool> {
        self.runtime.block_on(self.orm.rename_table::<M>(new_name))
    }

    pub fn rename_table_named(&self, old_name: &str, new_name: &str) -> Result<bool> {
        self.runtime
            .block_on(self.orm.rename_table_named(old_name, new_name))
    }

    pub fn close(&mut self) {
        self.runtime.block_on(self.orm.close());
    }
}

impl Drop for BlockingOrm {
    fn drop(&mut self) {
        // Pool shutdown needs the runtime that opened it.
        self.close();
    }
}

//! Typed sqlite tables from annotated structs.
//!
//! `#[litemodel]` turns a struct into a [`TableDefinition`]. A
//! [`TableSchema`] is derived from it on demand and rendered into statement
//! text; [`SqliteOrm`] runs that text through sqlx.
//!
//! ```ignore
//! use litemodel::*;
//!
//! #[litemodel(table_name = "players")]
//! pub struct Player {
//!     #[litemodel(primary_key, auto_increment)]
//!     pub id: i64,
//!     #[litemodel(not_null, collate = "NOCASE")]
//!     pub name: String,
//!     #[litemodel(default = 0)]
//!     pub score: f64,
//! }
//!
//! let orm = SqliteOrm::create_and_open("game.db").await?;
//! orm.create_table::<Player>().await?;
//! ```

pub mod libs;

pub use libs::*;
pub use litemodel_derive::litemodel;

//! Statement text for table descriptors.
//!
//! Rendering is pure: the same descriptor always yields the same bytes.
//! Identifiers, collation names and default values pass through
//! [`Quoting`], the only place where interpolated text is touched.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::libs::error::Result;
use crate::libs::schema::{ColumnSchema, TableSchema};
use crate::libs::types::DefaultValue;

/// How names, collations and default values are interpolated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quoting {
    /// Text is inserted exactly as declared. Values containing SQL
    /// metacharacters corrupt the statement.
    #[default]
    Verbatim,
    /// Identifiers and collation names are double-quoted, text defaults and
    /// the existence-check table name are single-quoted, embedded quotes are
    /// doubled.
    Escaped,
}

impl Quoting {
    pub fn identifier<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            Quoting::Verbatim => Cow::Borrowed(name),
            Quoting::Escaped => Cow::Owned(format!("\"{}\"", name.replace('"', "\"\""))),
        }
    }

    /// A table name used as a value, as in the `sqlite_master` lookup.
    pub fn name_literal<'a>(&self, name: &'a str) -> Cow<'a, str> {
        match self {
            Quoting::Verbatim => Cow::Borrowed(name),
            Quoting::Escaped => Cow::Owned(string_literal(name)),
        }
    }

    pub fn default_value(&self, value: &DefaultValue) -> String {
        match (self, value) {
            (Quoting::Escaped, DefaultValue::Text(text)) => string_literal(text),
            _ => value.to_string(),
        }
    }
}

fn string_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SqlRenderer {
    quoting: Quoting,
}

impl SqlRenderer {
    pub const fn new(quoting: Quoting) -> Self {
        Self { quoting }
    }

    pub fn quoting(&self) -> Quoting {
        self.quoting
    }

    /// `<name> <storage> ` followed by each present clause, each with one
    /// trailing space, always in this order: primary key, autoincrement,
    /// not null, unique, collate, default.
    pub fn column_declaration(&self, column: &ColumnSchema) -> Result<String> {
        let storage = column.storage_class()?;
        let mut decl = format!("{} {} ", self.quoting.identifier(column.name()), storage);
        if column.is_primary_key() {
            decl.push_str("primary key ");
        }
        if column.is_auto_increment() {
            decl.push_str("autoincrement ");
        }
        if column.is_not_null() {
            decl.push_str("not null ");
        }
        if column.is_unique() {
            decl.push_str("unique ");
        }
        if let Some(collation) = column.collation().filter(|c| !c.is_empty()) {
            decl.push_str(&format!("collate {} ", self.quoting.identifier(collation)));
        }
        if let Some(default) = column.default_value() {
            decl.push_str(&format!("default {} ", self.quoting.default_value(default)));
        }
        Ok(decl)
    }

    pub fn create_table(&self, table: &TableSchema) -> Result<String> {
        let decls = table
            .columns()
            .iter()
            .map(|c| self.column_declaration(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!(
            "create table {} ({})",
            self.quoting.identifier(table.name()),
            decls.join(",")
        ))
    }

    pub fn drop_table(&self, table_name: &str) -> String {
        format!("drop table {}", self.quoting.identifier(table_name))
    }

    pub fn rename_table(&self, old_name: &str, new_name: &str) -> String {
        format!(
            "alter table {} rename to {}",
            self.quoting.identifier(old_name),
            self.quoting.identifier(new_name)
        )
    }

    pub fn table_exists(&self, table_name: &str) -> String {
        format!(
            "select count(*) from sqlite_master where type='table' and name={}",
            self.quoting.name_literal(table_name)
        )
    }
}

const VERBATIM: SqlRenderer = SqlRenderer::new(Quoting::Verbatim);

pub fn column_declaration(column: &ColumnSchema) -> Result<String> {
    VERBATIM.column_declaration(column)
}

pub fn create_table(table: &TableSchema) -> Result<String> {
    VERBATIM.create_table(table)
}

pub fn drop_table(table_name: &str) -> String {
    VERBATIM.drop_table(table_name)
}

pub fn rename_table(old_name: &str, new_name: &str) -> String {
    VERBATIM.rename_table(old_name, new_name)
}

pub fn table_exists(table_name: &str) -> String {
    VERBATIM.table_exists(table_name)
}

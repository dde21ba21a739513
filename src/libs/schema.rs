// schema.rs
use tracing::warn;

use crate::libs::error::Result;
use crate::libs::types::{DefaultValue, StorageClass, TypeTag, map_to_storage_type};

/// Length used by a bare `max_length` marker.
pub const DEFAULT_MAX_LENGTH: u32 = 140;

/// One declared field and the markers decorating it.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefinition {
    pub ident: String,
    pub type_tag: TypeTag,
    pub column: Option<String>,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub not_null: bool,
    pub unique: bool,
    pub default: Option<DefaultValue>,
    pub collate: Option<String>,
    pub max_length: Option<u32>,
    pub ignore: bool,
}

impl FieldDefinition {
    pub fn new(ident: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            ident: ident.into(),
            type_tag,
            column: None,
            primary_key: false,
            auto_increment: false,
            not_null: false,
            unique: false,
            default: None,
            collate: None,
            max_length: None,
            ignore: false,
        }
    }

    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = Some(name.into());
        self
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn default(mut self, value: impl Into<DefaultValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.collate = Some(collation.into());
        self
    }

    pub fn max_length(mut self, len: u32) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn ignore(mut self) -> Self {
        self.ignore = true;
        self
    }
}

/// One declared record type: its name, optional table name and fields in
/// declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub ident: String,
    pub table_name: Option<String>,
    pub fields: Vec<FieldDefinition>,
}

impl TableDefinition {
    pub fn new(ident: impl Into<String>) -> Self {
        Self {
            ident: ident.into(),
            table_name: None,
            fields: Vec::new(),
        }
    }

    pub fn table_name(mut self, name: impl Into<String>) -> Self {
        self.table_name = Some(name.into());
        self
    }

    pub fn field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }
}

/// A record type mapped onto a table.
///
/// Implemented by `#[litemodel]`:
///
/// ```ignore
/// #[litemodel(table_name = "users")]
/// pub struct User {
///     #[litemodel(primary_key, auto_increment)]
///     pub id: i64,
///     #[litemodel(not_null, unique, collate = "NOCASE")]
///     pub email: String,
/// }
///
/// let sql = litemodel::create_table(&User::schema()?)?;
/// ```
pub trait Model {
    fn definition() -> TableDefinition;

    /// A fresh descriptor for this type. Not cached.
    fn schema() -> Result<TableSchema> {
        TableSchema::from_definition(&Self::definition())
    }
}

/// Column descriptor: everything the renderer needs about one field.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSchema {
    name: String,
    type_tag: TypeTag,
    primary: bool,
    auto_increment: bool,
    not_null: bool,
    unique: bool,
    collation: Option<String>,
    default: Option<DefaultValue>,
    max_length: Option<u32>,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            primary: false,
            auto_increment: false,
            not_null: false,
            unique: false,
            collation: None,
            default: None,
            max_length: None,
        }
    }

    /// Flags are copied as declared; no combination is rejected here.
    pub fn from_field(field: &FieldDefinition) -> Self {
        Self {
            name: field.column.clone().unwrap_or_else(|| field.ident.clone()),
            type_tag: field.type_tag.clone(),
            primary: field.primary_key,
            auto_increment: field.auto_increment,
            not_null: field.not_null,
            unique: field.unique,
            collation: field.collate.clone(),
            default: field.default.clone(),
            max_length: field.max_length,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn collate(mut self, collation: impl Into<String>) -> Self {
        self.collation = Some(collation.into());
        self
    }

    pub fn default(mut self, value: impl Into<DefaultValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_max_length(mut self, len: u32) -> Self {
        self.max_length = Some(len);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_tag(&self) -> &TypeTag {
        &self.type_tag
    }

    pub fn storage_class(&self) -> Result<StorageClass> {
        map_to_storage_type(&self.type_tag)
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn collation(&self) -> Option<&str> {
        self.collation.as_deref()
    }

    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.default.as_ref()
    }

    /// Captured from the declaration; the renderer does not use it.
    pub fn max_length(&self) -> Option<u32> {
        self.max_length
    }
}

/// Table descriptor.
///
/// Every column is known to map onto a storage class.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnSchema>,
    primary: Option<usize>,
}

impl TableSchema {
    /// Build a descriptor from hand-written columns.
    ///
    /// Fails on the first column whose type has no storage class. The first
    /// column flagged primary key wins; later ones stay ordinary columns.
    pub fn new(name: impl Into<String>, columns: Vec<ColumnSchema>) -> Result<Self> {
        let name = name.into();
        for column in &columns {
            column.storage_class()?;
        }

        let mut primary = None;
        for (idx, column) in columns.iter().enumerate() {
            if !column.is_primary_key() {
                continue;
            }
            match primary {
                None => primary = Some(idx),
                Some(_) => warn!(
                    table = %name,
                    column = %column.name(),
                    "ignoring additional primary key column"
                ),
            }
        }

        Ok(Self {
            name,
            columns,
            primary,
        })
    }

    pub fn from_definition(def: &TableDefinition) -> Result<Self> {
        let name = def.table_name.clone().unwrap_or_else(|| def.ident.clone());
        let columns = def
            .fields
            .iter()
            .filter(|f| !f.ignore)
            .map(ColumnSchema::from_field)
            .collect();
        Self::new(name, columns)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn primary_key(&self) -> Option<&ColumnSchema> {
        self.primary.map(|idx| &self.columns[idx])
    }

    /// All columns except the selected primary key, in order.
    pub fn alterable_columns(&self) -> Vec<&ColumnSchema> {
        self.columns
            .iter()
            .enumerate()
            .filter(|(idx, _)| Some(*idx) != self.primary)
            .map(|(_, c)| c)
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }
}

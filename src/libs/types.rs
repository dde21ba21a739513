use std::fmt;

use serde::{Deserialize, Serialize};

use crate::libs::error::{Error, Result};

/// The declared value type of a mapped field.
///
/// Only used to derive a [`StorageClass`]; the tag itself never ends up in
/// statement text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeTag {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    Bool,
    /// A field-less enum stored as its discriminant.
    Enum(String),
    F32,
    F64,
    Decimal,
    Text,
    DateTime,
    Bytes,
    /// Anything the mapping does not know about, by type name.
    Other(String),
}

impl TypeTag {
    /// Resolve a Rust type as written in source, e.g. `Option<chrono::NaiveDateTime>`.
    ///
    /// Whitespace and lifetimes are ignored (token streams stringify as
    /// `& 'a str`), paths resolve on their last segment and `Option<T>`
    /// resolves to `T`. Unknown types keep their spelling in `Other`.
    pub fn from_rust_type(ty: &str) -> Self {
        let compact: String = strip_lifetimes(ty)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        Self::from_compact(&compact).unwrap_or_else(|| {
            TypeTag::Other(ty.chars().filter(|c| !c.is_whitespace()).collect())
        })
    }

    fn from_compact(ty: &str) -> Option<Self> {
        if let Some(inner) = generic_arg(ty, "Option") {
            return Self::from_compact(inner);
        }

        if let Some(borrowed) = ty.strip_prefix('&') {
            let borrowed = borrowed.strip_prefix("mut").unwrap_or(borrowed);
            return match borrowed {
                "str" => Some(TypeTag::Text),
                "[u8]" => Some(TypeTag::Bytes),
                _ => None,
            };
        }

        if let Some(inner) = generic_arg(ty, "Vec") {
            return (inner == "u8").then_some(TypeTag::Bytes);
        }
        for pointer in ["Box", "Rc", "Arc"] {
            if let Some(inner) = generic_arg(ty, pointer) {
                return match inner {
                    "str" => Some(TypeTag::Text),
                    "[u8]" => Some(TypeTag::Bytes),
                    _ => None,
                };
            }
        }
        if generic_arg(ty, "DateTime").is_some() {
            return Some(TypeTag::DateTime);
        }

        let tag = match last_segment(ty) {
            "i8" => TypeTag::I8,
            "i16" => TypeTag::I16,
            "i32" => TypeTag::I32,
            "i64" => TypeTag::I64,
            "u8" => TypeTag::U8,
            "u16" => TypeTag::U16,
            "u32" => TypeTag::U32,
            "u64" => TypeTag::U64,
            "bool" => TypeTag::Bool,
            "f32" => TypeTag::F32,
            "f64" => TypeTag::F64,
            "Decimal" => TypeTag::Decimal,
            "String" | "str" => TypeTag::Text,
            "NaiveDateTime" | "SystemTime" | "OffsetDateTime" | "PrimitiveDateTime" => {
                TypeTag::DateTime
            }
            _ => return None,
        };
        Some(tag)
    }

    /// Human readable type name, used in error messages.
    pub fn type_name(&self) -> &str {
        match self {
            TypeTag::I8 => "i8",
            TypeTag::I16 => "i16",
            TypeTag::I32 => "i32",
            TypeTag::I64 => "i64",
            TypeTag::U8 => "u8",
            TypeTag::U16 => "u16",
            TypeTag::U32 => "u32",
            TypeTag::U64 => "u64",
            TypeTag::Bool => "bool",
            TypeTag::Enum(name) | TypeTag::Other(name) => name.as_str(),
            TypeTag::F32 => "f32",
            TypeTag::F64 => "f64",
            TypeTag::Decimal => "Decimal",
            TypeTag::Text => "String",
            TypeTag::DateTime => "DateTime",
            TypeTag::Bytes => "Vec<u8>",
        }
    }
}

fn strip_lifetimes(ty: &str) -> String {
    let mut out = String::with_capacity(ty.len());
    let mut chars = ty.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            while chars.next_if(|c| c.is_alphanumeric() || *c == '_').is_some() {}
            continue;
        }
        out.push(c);
    }
    out
}

// `Outer<Inner>` -> `Inner`, matching on the last path segment of `Outer`.
fn generic_arg<'a>(ty: &'a str, outer: &str) -> Option<&'a str> {
    let inner = ty.strip_suffix('>')?;
    let open = inner.find('<')?;
    if last_segment(&inner[..open]) != outer {
        return None;
    }
    Some(&inner[open + 1..])
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// The five coarse value categories of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StorageClass {
    Integer,
    Real,
    Text,
    Numeric,
    Blob,
}

impl StorageClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageClass::Integer => "integer",
            StorageClass::Real => "real",
            StorageClass::Text => "text",
            StorageClass::Numeric => "numeric",
            StorageClass::Blob => "blob",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a semantic type onto its storage class.
///
/// The set of accepted types is closed; everything else is
/// [`Error::UnsupportedType`].
pub fn map_to_storage_type(tag: &TypeTag) -> Result<StorageClass> {
    match tag {
        TypeTag::I8
        | TypeTag::I16
        | TypeTag::I32
        | TypeTag::I64
        | TypeTag::U8
        | TypeTag::U16
        | TypeTag::U32
        | TypeTag::U64
        | TypeTag::Bool
        | TypeTag::Enum(_) => Ok(StorageClass::Integer),
        TypeTag::F32 | TypeTag::F64 | TypeTag::Decimal => Ok(StorageClass::Real),
        TypeTag::Text => Ok(StorageClass::Text),
        TypeTag::DateTime => Ok(StorageClass::Numeric),
        TypeTag::Bytes => Ok(StorageClass::Blob),
        TypeTag::Other(_) => Err(Error::UnsupportedType {
            type_name: tag.type_name().to_string(),
        }),
    }
}

/// Scalar default value of a column, interpolated into `default <value>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Integer(i64),
    Real(f64),
    Text(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::Bool(true) => f.write_str("True"),
            DefaultValue::Bool(false) => f.write_str("False"),
            DefaultValue::Integer(v) => write!(f, "{v}"),
            DefaultValue::Real(v) => write!(f, "{v}"),
            DefaultValue::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for DefaultValue {
    fn from(v: bool) -> Self {
        DefaultValue::Bool(v)
    }
}

impl From<i64> for DefaultValue {
    fn from(v: i64) -> Self {
        DefaultValue::Integer(v)
    }
}

impl From<i32> for DefaultValue {
    fn from(v: i32) -> Self {
        DefaultValue::Integer(v.into())
    }
}

impl From<f64> for DefaultValue {
    fn from(v: f64) -> Self {
        DefaultValue::Real(v)
    }
}

impl From<&str> for DefaultValue {
    fn from(v: &str) -> Self {
        DefaultValue::Text(v.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(v: String) -> Self {
        DefaultValue::Text(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closed_set_maps_to_documented_classes() {
        let cases = [
            (TypeTag::I8, StorageClass::Integer),
            (TypeTag::I16, StorageClass::Integer),
            (TypeTag::I32, StorageClass::Integer),
            (TypeTag::I64, StorageClass::Integer),
            (TypeTag::U8, StorageClass::Integer),
            (TypeTag::U16, StorageClass::Integer),
            (TypeTag::U32, StorageClass::Integer),
            (TypeTag::U64, StorageClass::Integer),
            (TypeTag::Bool, StorageClass::Integer),
            (TypeTag::Enum("Role".into()), StorageClass::Integer),
            (TypeTag::F32, StorageClass::Real),
            (TypeTag::F64, StorageClass::Real),
            (TypeTag::Decimal, StorageClass::Real),
            (TypeTag::Text, StorageClass::Text),
            (TypeTag::DateTime, StorageClass::Numeric),
            (TypeTag::Bytes, StorageClass::Blob),
        ];
        for (tag, expected) in cases {
            assert_eq!(map_to_storage_type(&tag).unwrap(), expected, "{tag:?}");
        }
    }

    #[test]
    fn unknown_type_is_rejected_by_name() {
        let err = map_to_storage_type(&TypeTag::Other("Uuid".into())).unwrap_err();
        match &err {
            Error::UnsupportedType { type_name } => assert_eq!(type_name, "Uuid"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Uuid"));
    }

    #[test]
    fn rust_spellings_resolve() {
        assert_eq!(TypeTag::from_rust_type("i64"), TypeTag::I64);
        assert_eq!(TypeTag::from_rust_type("std :: string :: String"), TypeTag::Text);
        assert_eq!(TypeTag::from_rust_type("& str"), TypeTag::Text);
        assert_eq!(TypeTag::from_rust_type("Vec < u8 >"), TypeTag::Bytes);
        assert_eq!(TypeTag::from_rust_type("Box<[u8]>"), TypeTag::Bytes);
        assert_eq!(TypeTag::from_rust_type("Option < f64 >"), TypeTag::F64);
        assert_eq!(
            TypeTag::from_rust_type("chrono::DateTime<chrono::Utc>"),
            TypeTag::DateTime
        );
        assert_eq!(
            TypeTag::from_rust_type("Option<chrono::NaiveDateTime>"),
            TypeTag::DateTime
        );
        assert_eq!(
            TypeTag::from_rust_type("rust_decimal::Decimal"),
            TypeTag::Decimal
        );
    }

    #[test]
    fn borrowed_and_shared_spellings_resolve() {
        assert_eq!(TypeTag::from_rust_type("& 'a str"), TypeTag::Text);
        assert_eq!(TypeTag::from_rust_type("&'static str"), TypeTag::Text);
        assert_eq!(TypeTag::from_rust_type("& 'a [u8]"), TypeTag::Bytes);
        assert_eq!(TypeTag::from_rust_type("&'buf mut [u8]"), TypeTag::Bytes);
        assert_eq!(TypeTag::from_rust_type("Option < & 'a str >"), TypeTag::Text);
        assert_eq!(TypeTag::from_rust_type("Box < str >"), TypeTag::Text);
        assert_eq!(TypeTag::from_rust_type("std::rc::Rc<str>"), TypeTag::Text);
        assert_eq!(TypeTag::from_rust_type("Arc<str>"), TypeTag::Text);
        assert_eq!(TypeTag::from_rust_type("Arc<[u8]>"), TypeTag::Bytes);
    }

    #[test]
    fn unrecognized_spellings_keep_their_name() {
        assert_eq!(
            TypeTag::from_rust_type("Vec<String>"),
            TypeTag::Other("Vec<String>".into())
        );
        assert_eq!(TypeTag::from_rust_type("char"), TypeTag::Other("char".into()));
        assert_eq!(TypeTag::from_rust_type("usize"), TypeTag::Other("usize".into()));
        assert_eq!(
            TypeTag::from_rust_type("Cow < 'a , str >"),
            TypeTag::Other("Cow<'a,str>".into())
        );
        assert_eq!(TypeTag::from_rust_type("&'a i32"), TypeTag::Other("&'ai32".into()));
    }

    #[test]
    fn default_values_render_literally() {
        assert_eq!(DefaultValue::from(0).to_string(), "0");
        assert_eq!(DefaultValue::from(1.5).to_string(), "1.5");
        assert_eq!(DefaultValue::from(true).to_string(), "True");
        assert_eq!(DefaultValue::from(false).to_string(), "False");
        assert_eq!(DefaultValue::from("it's").to_string(), "it's");
    }
}

//! Field type to storage value mapping

use std::fmt;

use crate::parser::FieldMetadata;

/// A field type the generated storages know how to bind and read back
#[derive(Debug, Clone, PartialEq)]
pub enum RustType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    String,
    Bytes,
    /// Optional wrapper
    Option(Box<RustType>),
}

/// Scalar types by their spelling in declarations
const SCALARS: &[(&str, RustType)] = &[
    ("bool", RustType::Bool),
    ("i8", RustType::I8),
    ("i16", RustType::I16),
    ("i32", RustType::I32),
    ("i64", RustType::I64),
    ("u8", RustType::U8),
    ("u16", RustType::U16),
    ("u32", RustType::U32),
    ("u64", RustType::U64),
    ("f32", RustType::F32),
    ("f64", RustType::F64),
    ("String", RustType::String),
    ("Vec<u8>", RustType::Bytes),
];

impl RustType {
    /// Type of a key parameter: strings and bytes are taken by reference
    pub fn to_param_type_string(&self) -> String {
        match self {
            RustType::String => "&str".to_string(),
            RustType::Bytes => "&[u8]".to_string(),
            RustType::Option(inner) => format!("Option<{}>", inner.to_param_type_string()),
            other => other.to_string(),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, RustType::Option(_))
    }

    /// Whether a field of this type can be bound without a clone
    pub fn is_copy(&self) -> bool {
        match self {
            RustType::String | RustType::Bytes => false,
            RustType::Option(inner) => inner.is_copy(),
            _ => true,
        }
    }
}

impl fmt::Display for RustType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let RustType::Option(inner) = self {
            return write!(f, "Option<{}>", inner);
        }
        let name = SCALARS
            .iter()
            .find(|(_, ty)| ty == self)
            .map_or("?", |(name, _)| name);
        f.write_str(name)
    }
}

/// Resolve declared field types to storage types
pub struct TypeResolver;

impl TypeResolver {
    /// Get the storage type of a field, `None` when it has no mapping
    pub fn resolve(field: &FieldMetadata) -> Option<RustType> {
        Self::resolve_type(&field.ty)
    }

    /// Resolve a whitespace-free type string such as `Option<String>`
    pub fn resolve_type(ty: &str) -> Option<RustType> {
        let ty = ["std::option::", "core::option::", "std::string::", "std::vec::"]
            .iter()
            .find_map(|prefix| ty.strip_prefix(prefix))
            .unwrap_or(ty);

        if let Some(inner) = ty.strip_prefix("Option<").and_then(|t| t.strip_suffix('>')) {
            return match Self::resolve_type(inner)? {
                // Nested options have no column representation
                RustType::Option(_) => None,
                inner => Some(RustType::Option(Box::new(inner))),
            };
        }

        SCALARS
            .iter()
            .find(|(name, _)| *name == ty)
            .map(|(_, resolved)| resolved.clone())
    }
}

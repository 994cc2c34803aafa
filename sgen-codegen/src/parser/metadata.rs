//! Metadata structures for parsed struct declarations

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// All declarations of one run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Collection {
    /// Module the declarations live in (e.g. `models`)
    pub package: String,

    /// Parsed entities, in file then declaration order
    pub entities: Vec<EntityMetadata>,
}

/// Metadata for a declared struct
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Struct name
    pub name: String,

    /// Doc comment of the struct (if any)
    pub comment: Option<String>,

    /// Fields in declaration order
    pub fields: Vec<FieldMetadata>,

    /// File the struct was declared in
    pub source_file: PathBuf,
}

/// Metadata for a struct field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Field name
    pub name: String,

    /// Field type as written, without whitespace (e.g. `Option<String>`)
    pub ty: String,

    /// Column name (field name unless renamed)
    pub column: String,

    /// Whether this field is the primary key
    pub is_primary_key: bool,

    /// Whether this field is left out of storage
    pub skip: bool,
}

impl Collection {
    /// Get an entity by name
    pub fn get_entity(&self, name: &str) -> Option<&EntityMetadata> {
        self.entities.iter().find(|e| e.name == name)
    }
}

impl EntityMetadata {
    /// Fields that map to columns
    pub fn persisted_fields(&self) -> impl Iterator<Item = &FieldMetadata> {
        self.fields.iter().filter(|f| !f.skip)
    }

    /// The primary key field, if exactly one is declared
    pub fn primary_key(&self) -> Option<&FieldMetadata> {
        let mut keys = self.persisted_fields().filter(|f| f.is_primary_key);
        match (keys.next(), keys.next()) {
            (Some(key), None) => Some(key),
            _ => None,
        }
    }
}

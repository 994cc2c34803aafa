//! Derive macro for sgen struct declarations
//!
//! `sgen` reads the `#[sgen(...)]` attributes of the structs it generates
//! storages for. Deriving [`Entity`] makes those attributes legal in compiled
//! code, checks them at compile time and exposes the column mapping.

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

mod entity;

/// Derive macro for structs with a generated storage.
///
/// Generates the associated constants `COLUMNS` (persisted columns in field
/// order) and `PRIMARY_KEY`.
///
/// # Attributes
///
/// - `#[sgen(rename = "column_name")]` - Use a different column name for this field
/// - `#[sgen(id)]` - Mark the primary key (defaults to a field named `id`)
/// - `#[sgen(skip)]` - Leave this field (or, on the struct, the whole struct) out of storage
///
/// # Example
///
/// ```ignore
/// use sgen_derive::Entity;
///
/// #[derive(Entity)]
/// pub struct User {
///     pub id: i64,
///     #[sgen(rename = "user_name")]
///     pub username: String,
///     #[sgen(skip)]
///     pub cache: Vec<String>,
/// }
///
/// assert_eq!(User::COLUMNS, &["id", "user_name"]);
/// ```
#[proc_macro_derive(Entity, attributes(sgen))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    entity::derive_entity_impl(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

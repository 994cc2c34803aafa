//! Struct declaration parser using syn

use std::path::{Path, PathBuf};

use quote::ToTokens;
use syn::{Attribute, Expr, Field, Fields, Item, ItemStruct, Lit, Meta};
use tracing::debug;

use super::metadata::*;
use crate::error::{CodegenError, Result};

/// `.rs` files directly inside `dir`, sorted by name
pub fn declaration_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| CodegenError::file(dir, e))? {
        let path = entry.map_err(|e| CodegenError::file(dir, e))?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "rs") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Parse every declaration file in `dir`.
///
/// A file that fails to parse is reported and skipped so the remaining files
/// still contribute their entities.
pub fn parse_dir(dir: &Path, package: &str) -> Result<(Collection, Vec<CodegenError>)> {
    let mut collection = Collection {
        package: package.to_string(),
        entities: Vec::new(),
    };
    let mut errors = Vec::new();

    for file in declaration_files(dir)? {
        match parse_file(&file) {
            Ok(entities) => {
                debug!("{}: {} declaration(s)", file.display(), entities.len());
                collection.entities.extend(entities);
            }
            Err(e) => errors.push(e),
        }
    }

    Ok((collection, errors))
}

/// Parse the declarations of one file
pub fn parse_file(path: &Path) -> Result<Vec<EntityMetadata>> {
    let source = std::fs::read_to_string(path).map_err(|e| CodegenError::file(path, e))?;
    parse_source(&source, path)
}

/// Parse the declarations of a source string attributed to `path`
pub fn parse_source(source: &str, path: &Path) -> Result<Vec<EntityMetadata>> {
    let file = syn::parse_file(source)
        .map_err(|e| CodegenError::ParseError(format!("{}: {}", path.display(), e)))?;

    let mut entities = Vec::new();
    for item in file.items {
        if let Item::Struct(item) = item {
            if let Some(entity) = extract_entity(&item, path)? {
                entities.push(entity);
            }
        }
    }
    Ok(entities)
}

/// Options read from `#[sgen(...)]`
#[derive(Debug, Default)]
struct SgenAttrs {
    rename: Option<String>,
    id: bool,
    skip: bool,
}

fn parse_sgen_attrs(attrs: &[Attribute], path: &Path) -> Result<SgenAttrs> {
    let mut parsed = SgenAttrs::default();

    for attr in attrs {
        if !attr.path().is_ident("sgen") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: syn::LitStr = meta.value()?.parse()?;
                parsed.rename = Some(lit.value());
            } else if meta.path.is_ident("id") {
                parsed.id = true;
            } else if meta.path.is_ident("skip") {
                parsed.skip = true;
            } else {
                return Err(meta.error(format!(
                    "unknown sgen attribute `{}`",
                    meta.path.to_token_stream()
                )));
            }
            Ok(())
        })
        .map_err(|e| CodegenError::ParseError(format!("{}: {}", path.display(), e)))?;
    }

    Ok(parsed)
}

/// Extract entity metadata from a struct; `None` for structs that aren't entities
fn extract_entity(item: &ItemStruct, path: &Path) -> Result<Option<EntityMetadata>> {
    let attrs = parse_sgen_attrs(&item.attrs, path)?;
    if attrs.skip {
        return Ok(None);
    }

    let named = match &item.fields {
        Fields::Named(named) => &named.named,
        _ => return Ok(None),
    };

    let mut fields = named
        .iter()
        .map(|field| extract_field(field, path))
        .collect::<Result<Vec<_>>>()?;

    // A field called `id` is the key unless one is marked explicitly
    if !fields.iter().any(|f| f.is_primary_key) {
        if let Some(id) = fields.iter_mut().find(|f| f.name == "id" && !f.skip) {
            id.is_primary_key = true;
        }
    }

    Ok(Some(EntityMetadata {
        name: item.ident.to_string(),
        comment: doc_comment(&item.attrs),
        fields,
        source_file: path.to_path_buf(),
    }))
}

fn extract_field(field: &Field, path: &Path) -> Result<FieldMetadata> {
    let attrs = parse_sgen_attrs(&field.attrs, path)?;
    let name = field
        .ident
        .as_ref()
        .map(|ident| ident.to_string().trim_start_matches("r#").to_string())
        .unwrap_or_default();

    Ok(FieldMetadata {
        column: attrs.rename.unwrap_or_else(|| name.clone()),
        ty: type_string(&field.ty),
        name,
        is_primary_key: attrs.id,
        skip: attrs.skip,
    })
}

/// Render a type without the spacing token streams put between tokens
fn type_string(ty: &syn::Type) -> String {
    ty.to_token_stream()
        .to_string()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect()
}

/// Joined `///` lines of an item
fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr) => match &expr.lit {
                    Lit::Str(s) => Some(s.value().trim().to_string()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join(" "))
    }
}

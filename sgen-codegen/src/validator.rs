//! Semantic checks over parsed declarations

use std::collections::{HashMap, HashSet};

use crate::codegen::{to_module_name, TypeResolver};
use crate::error::CodegenError;
use crate::parser::{Collection, EntityMetadata};

/// Check every entity and return every problem found, in declaration order
pub fn validate(collection: &Collection) -> Vec<CodegenError> {
    let mut errors = Vec::new();

    // Entities share a storage directory when their module names collide
    let mut modules: HashMap<String, &str> = HashMap::new();
    for entity in &collection.entities {
        let module = to_module_name(&entity.name);
        if let Some(first) = modules.get(&module) {
            errors.push(invalid(
                entity,
                format!("collides with `{}` (both map to `{}`)", first, module),
            ));
        } else {
            modules.insert(module, &entity.name);
        }
        validate_entity(entity, &mut errors);
    }

    errors
}

fn validate_entity(entity: &EntityMetadata, errors: &mut Vec<CodegenError>) {
    if entity.persisted_fields().next().is_none() {
        errors.push(invalid(entity, "has no persisted fields".to_string()));
        return;
    }

    let keys: Vec<&str> = entity
        .persisted_fields()
        .filter(|f| f.is_primary_key)
        .map(|f| f.name.as_str())
        .collect();
    match keys.as_slice() {
        [] => errors.push(invalid(
            entity,
            "has no primary key (add a field `id` or mark one with #[sgen(id)])".to_string(),
        )),
        [_] => {}
        many => errors.push(invalid(
            entity,
            format!("has more than one primary key: {}", many.join(", ")),
        )),
    }

    let mut columns = HashSet::new();
    for field in entity.persisted_fields() {
        if !columns.insert(field.column.as_str()) {
            errors.push(invalid(
                entity,
                format!("maps column `{}` more than once", field.column),
            ));
        }

        match TypeResolver::resolve(field) {
            None => errors.push(invalid(
                entity,
                format!(
                    "field `{}` has unsupported type `{}` (mark it #[sgen(skip)] to leave it out)",
                    field.name, field.ty
                ),
            )),
            Some(ty) if field.is_primary_key && ty.is_optional() => errors.push(invalid(
                entity,
                format!("primary key `{}` cannot be optional", field.name),
            )),
            Some(_) => {}
        }
    }
}

fn invalid(entity: &EntityMetadata, message: String) -> CodegenError {
    CodegenError::ValidationError(format!(
        "{} ({}): {}",
        entity.name,
        entity.source_file.display(),
        message
    ))
}

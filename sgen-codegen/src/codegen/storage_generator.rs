//! Storage generator - generates one storage module per entity on top of the
//! staged query builder and database driver

use tracing::debug;

use crate::config::GeneratorConfig;
use crate::error::{CodegenError, Result};
use crate::parser::{Collection, EntityMetadata, FieldMetadata};

use super::code_generator::{GeneratedFile, Renderer};
use super::naming::{
    escape_field_name, generate_delete_by_method_name, generate_find_by_method_name,
    to_module_name, to_table_name,
};
use super::type_resolver::{RustType, TypeResolver};

/// Directory under the output base holding the storage modules
pub const STORAGES_DIR: &str = "storages";

/// Directory under the output base holding the staged modules
pub const GENERAL_DIR: &str = "general";

const HEADER: &str = "// Generated by sgen. Do not edit.\n";

/// Renders storage modules plus the module index files tying them together
pub struct StorageRenderer<'a> {
    config: &'a GeneratorConfig,
}

impl<'a> StorageRenderer<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Self {
        Self { config }
    }

    fn render_index(&self, collection: &Collection) -> Vec<GeneratedFile> {
        let owner = &collection.package;

        let root = format!("{HEADER}\npub mod {GENERAL_DIR};\npub mod {STORAGES_DIR};\n");
        let general = format!(
            "{HEADER}\n#[path = \"db/db.rs\"]\npub mod db;\npub mod query_builder;\n"
        );

        let mut storages = String::from(HEADER);
        storages.push('\n');
        for entity in &collection.entities {
            let module = to_module_name(&entity.name);
            storages.push_str(&format!(
                "#[path = \"{module}/{module}.rs\"]\npub mod {};\n",
                escape_field_name(&module)
            ));
        }

        vec![
            GeneratedFile::new(owner, "", "mod.rs", root),
            GeneratedFile::new(owner, GENERAL_DIR, "mod.rs", general),
            GeneratedFile::new(owner, STORAGES_DIR, "mod.rs", storages),
        ]
    }

    fn render_entity(&self, entity: &EntityMetadata) -> Result<GeneratedFile> {
        let module = to_module_name(&entity.name);
        debug!("Generating storage for {} -> {}/{}.rs", entity.name, module, module);

        let pk = entity.primary_key().ok_or_else(|| {
            CodegenError::ValidationError(format!("{} has no single primary key", entity.name))
        })?;
        let fields = entity
            .persisted_fields()
            .map(|field| resolve(entity, field).map(|ty| (field, ty)))
            .collect::<Result<Vec<_>>>()?;
        let pk_type = resolve(entity, pk)?;

        let mut code = String::new();
        code.push_str(&generate_header(
            entity,
            &self.config.database_module,
            &self.config.models_module,
        ));
        code.push_str(&generate_constants(entity, &fields));
        code.push_str(&generate_from_row(entity));
        code.push_str(&generate_values_of(&entity.name, &fields));
        code.push_str(&generate_find_all(&entity.name));
        code.push_str(&generate_count_all());
        code.push_str(&generate_pk_methods(&entity.name, pk, &pk_type));
        code.push_str(&generate_insert(&entity.name));
        code.push_str(&generate_update(&entity.name, pk, &pk_type, &fields));

        Ok(GeneratedFile::new(
            &entity.name,
            format!("{}/{}", STORAGES_DIR, module),
            format!("{}.rs", module),
            code,
        ))
    }
}

impl Renderer for StorageRenderer<'_> {
    fn render(&self, collection: &Collection) -> Result<Vec<GeneratedFile>> {
        let mut files = self.render_index(collection);
        for entity in &collection.entities {
            files.push(self.render_entity(entity)?);
        }
        Ok(files)
    }
}

fn resolve(entity: &EntityMetadata, field: &FieldMetadata) -> Result<RustType> {
    TypeResolver::resolve(field).ok_or_else(|| {
        CodegenError::ValidationError(format!(
            "{}: field `{}` has unsupported type `{}`",
            entity.name, field.name, field.ty
        ))
    })
}

/// Expression turning `entity.<field>` into a bound value
fn value_expr(field: &FieldMetadata, ty: &RustType) -> String {
    let access = format!("entity.{}", escape_field_name(&field.name));
    if ty.is_copy() {
        format!("Value::from({})", access)
    } else {
        format!("Value::from({}.clone())", access)
    }
}

fn column_list(columns: &[&str]) -> String {
    columns
        .iter()
        .map(|c| format!("{:?}", c))
        .collect::<Vec<_>>()
        .join(", ")
}

fn generate_header(entity: &EntityMetadata, database_module: &str, models_module: &str) -> String {
    let mut code = String::from(HEADER);
    code.push_str(&format!(
        "//! Storage for `{}`, declared in {}\n\n",
        entity.name,
        entity.source_file.display()
    ));
    code.push_str(&format!(
        "use crate::{database_module}::general::db::{{self, Executor, Row, Value}};\n"
    ));
    code.push_str(&format!(
        "use crate::{database_module}::general::query_builder::{{Delete, Insert, Select, Update}};\n"
    ));
    code.push_str(&format!("use crate::{}::{};\n\n", models_module, entity.name));
    code
}

fn generate_constants(entity: &EntityMetadata, fields: &[(&FieldMetadata, RustType)]) -> String {
    let columns: Vec<&str> = fields.iter().map(|(f, _)| f.column.as_str()).collect();
    format!(
        r#"/// Table backing `{name}`
pub const TABLE: &str = "{table}";

/// Persisted columns in field order
pub const COLUMNS: &[&str] = &[{columns}];

"#,
        name = entity.name,
        table = to_table_name(&entity.name),
        columns = column_list(&columns),
    )
}

fn generate_from_row(entity: &EntityMetadata) -> String {
    let assignments = entity
        .fields
        .iter()
        .map(|f| {
            let field = escape_field_name(&f.name);
            if f.skip {
                format!("        {}: Default::default(),", field)
            } else {
                format!("        {}: db::take(&mut values)?,", field)
            }
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"fn from_row(row: Row) -> Option<{name}> {{
    let mut values = row.into_iter();
    Some({name} {{
{assignments}
    }})
}}

"#,
        name = entity.name,
        assignments = assignments,
    )
}

fn generate_values_of(name: &str, fields: &[(&FieldMetadata, RustType)]) -> String {
    let values = fields
        .iter()
        .map(|(f, ty)| format!("        {},", value_expr(f, ty)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"fn values_of(entity: &{name}) -> Vec<Value> {{
    vec![
{values}
    ]
}}

"#
    )
}

fn generate_find_all(name: &str) -> String {
    format!(
        r#"/// Find all records
pub fn find_all<E: Executor>(executor: &mut E) -> Result<Vec<{name}>, E::Error> {{
    let sql = Select::from(TABLE).columns(COLUMNS).build(db::DIALECT);
    let rows = executor.query(&sql, Vec::new())?;
    Ok(rows.into_iter().filter_map(from_row).collect())
}}

"#
    )
}

fn generate_count_all() -> String {
    r#"/// Count all records
pub fn count_all<E: Executor>(executor: &mut E) -> Result<i64, E::Error> {
    let sql = Select::from(TABLE).count().build(db::DIALECT);
    let rows = executor.query(&sql, Vec::new())?;
    Ok(rows
        .into_iter()
        .next()
        .and_then(|row| db::take(&mut row.into_iter()))
        .unwrap_or(0))
}

"#
    .to_string()
}

/// Generate primary key methods (find, delete)
fn generate_pk_methods(name: &str, pk: &FieldMetadata, pk_type: &RustType) -> String {
    let param = escape_field_name(&pk.name);
    let param_type = pk_type.to_param_type_string();
    let find_method = generate_find_by_method_name(&pk.name);
    let delete_method = generate_delete_by_method_name(&pk.name);
    let column = format!("{:?}", pk.column);

    format!(
        r#"/// Find by primary key
pub fn {find_method}<E: Executor>(executor: &mut E, {param}: {param_type}) -> Result<Option<{name}>, E::Error> {{
    let sql = Select::from(TABLE)
        .columns(COLUMNS)
        .filter({column})
        .limit(1)
        .build(db::DIALECT);
    let rows = executor.query(&sql, vec![Value::from({param})])?;
    Ok(rows.into_iter().find_map(from_row))
}}

/// Delete by primary key
pub fn {delete_method}<E: Executor>(executor: &mut E, {param}: {param_type}) -> Result<u64, E::Error> {{
    let sql = Delete::from(TABLE).filter({column}).build(db::DIALECT);
    executor.execute(&sql, vec![Value::from({param})])
}}

"#
    )
}

fn generate_insert(name: &str) -> String {
    format!(
        r#"/// Insert a new record
pub fn insert<E: Executor>(executor: &mut E, entity: &{name}) -> Result<u64, E::Error> {{
    let sql = Insert::into(TABLE).columns(COLUMNS).build(db::DIALECT);
    executor.execute(&sql, values_of(entity))
}}
"#
    )
}

/// Generate update by primary key; entities with only a key get none
fn generate_update(
    name: &str,
    pk: &FieldMetadata,
    pk_type: &RustType,
    fields: &[(&FieldMetadata, RustType)],
) -> String {
    let values: Vec<&(&FieldMetadata, RustType)> =
        fields.iter().filter(|(f, _)| !f.is_primary_key).collect();
    if values.is_empty() {
        return String::new();
    }

    let columns: Vec<&str> = values.iter().map(|(f, _)| f.column.as_str()).collect();
    let binds = values
        .iter()
        .map(|(f, ty)| format!("            {},", value_expr(f, ty)))
        .chain(std::iter::once(format!("            {},", value_expr(pk, pk_type))))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"
/// Update a record by primary key
pub fn update<E: Executor>(executor: &mut E, entity: &{name}) -> Result<u64, E::Error> {{
    let sql = Update::table(TABLE)
        .set(&[{columns}])
        .filter({pk_column:?})
        .build(db::DIALECT);
    executor.execute(
        &sql,
        vec![
{binds}
        ],
    )
}}
"#,
        columns = column_list(&columns),
        pk_column = pk.column,
    )
}

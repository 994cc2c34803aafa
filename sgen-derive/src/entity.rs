//! Entity derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{spanned::Spanned, Attribute, Data, DeriveInput, Error, Field, Fields, Result};

/// Options of one `#[sgen(...)]` list
#[derive(Default)]
struct SgenOptions {
    rename: Option<String>,
    id: bool,
    skip: bool,
}

fn parse_options(attrs: &[Attribute]) -> Result<SgenOptions> {
    let mut options = SgenOptions::default();

    for attr in attrs {
        if attr.path().is_ident("sgen") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename") {
                    let value = meta.value()?;
                    let lit: syn::LitStr = value.parse()?;
                    options.rename = Some(lit.value());
                } else if meta.path.is_ident("id") {
                    options.id = true;
                } else if meta.path.is_ident("skip") {
                    options.skip = true;
                } else {
                    return Err(meta.error(format!(
                        "unknown sgen attribute `{}`",
                        meta.path
                            .get_ident()
                            .map(|i| i.to_string())
                            .unwrap_or_default()
                    )));
                }
                Ok(())
            })?;
        }
    }

    Ok(options)
}

/// Column mapping of one field
struct FieldConfig {
    name: String,
    column_name: String,
    is_primary_key: bool,
    skip: bool,
}

fn parse_field_config(field: &Field) -> Result<FieldConfig> {
    let ident = field
        .ident
        .as_ref()
        .ok_or_else(|| Error::new(field.span(), "tuple structs are not supported"))?;
    let options = parse_options(&field.attrs)?;

    if options.skip && (options.id || options.rename.is_some()) {
        return Err(Error::new(
            field.span(),
            "a skipped field cannot be renamed or be the primary key",
        ));
    }

    let name = ident.unraw().to_string();
    Ok(FieldConfig {
        column_name: options.rename.unwrap_or_else(|| name.clone()),
        name,
        is_primary_key: options.id,
        skip: options.skip,
    })
}

pub fn derive_entity_impl(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => return Err(Error::new(input.span(), "only named fields are supported")),
        },
        _ => return Err(Error::new(input.span(), "only structs are supported")),
    };

    // Skipped structs get no storage, so nothing to describe
    if parse_options(&input.attrs)?.skip {
        return Ok(TokenStream::new());
    }

    let mut field_configs: Vec<FieldConfig> = fields
        .iter()
        .map(parse_field_config)
        .collect::<Result<Vec<_>>>()?;

    if !field_configs.iter().any(|c| c.is_primary_key) {
        if let Some(id) = field_configs.iter_mut().find(|c| c.name == "id" && !c.skip) {
            id.is_primary_key = true;
        }
    }

    let keys: Vec<&FieldConfig> = field_configs.iter().filter(|c| c.is_primary_key).collect();
    let primary_key = match keys.as_slice() {
        [key] => key.column_name.clone(),
        [] => {
            return Err(Error::new(
                input.ident.span(),
                "no primary key (add a field `id` or mark one with #[sgen(id)])",
            ))
        }
        _ => {
            return Err(Error::new(
                input.ident.span(),
                "more than one field is marked #[sgen(id)]",
            ))
        }
    };

    let column_names: Vec<&str> = field_configs
        .iter()
        .filter(|c| !c.skip)
        .map(|c| c.column_name.as_str())
        .collect();

    let expanded = quote! {
        impl #impl_generics #name #ty_generics #where_clause {
            /// Persisted columns in field order
            pub const COLUMNS: &'static [&'static str] = &[#(#column_names),*];

            /// Primary key column
            pub const PRIMARY_KEY: &'static str = #primary_key;
        }
    };

    Ok(expanded)
}

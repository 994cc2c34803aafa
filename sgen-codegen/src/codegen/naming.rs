//! Naming utilities for code generation

use heck::ToSnakeCase;

/// Module and directory name of an entity
/// e.g., "OrderItem" -> "order_item"
pub fn to_module_name(entity_name: &str) -> String {
    entity_name.to_snake_case()
}

/// Table name of an entity (pluralized snake_case)
/// e.g., "OrderItem" -> "order_items", "Category" -> "categories"
pub fn to_table_name(entity_name: &str) -> String {
    let snake = entity_name.to_snake_case();
    match snake.rsplit_once('_') {
        Some((head, last)) => format!("{}_{}", head, pluralize(last)),
        None => pluralize(&snake),
    }
}

/// Generate a find_by method name for a field
pub fn generate_find_by_method_name(field: &str) -> String {
    format!("find_by_{}", field.to_snake_case())
}

/// Generate a delete_by method name for a field
pub fn generate_delete_by_method_name(field: &str) -> String {
    format!("delete_by_{}", field.to_snake_case())
}

/// Plural of an English noun, as used for table names
pub fn pluralize(word: &str) -> String {
    const IRREGULAR: &[(&str, &str)] = &[
        ("person", "people"),
        ("child", "children"),
        ("man", "men"),
        ("woman", "women"),
        ("mouse", "mice"),
        ("index", "indices"),
    ];
    const VES: &[&str] = &["leaf", "shelf", "half", "calf", "loaf", "thief", "wolf"];
    const OES: &[&str] = &["hero", "potato", "tomato", "echo", "veto"];

    if let Some((_, plural)) = IRREGULAR.iter().find(|(singular, _)| *singular == word) {
        return plural.to_string();
    }
    if VES.contains(&word) {
        return format!("{}ves", &word[..word.len() - 1]);
    }
    if OES.contains(&word) {
        return format!("{word}es");
    }

    // Participles used as nouns ("deleted") stay as they are
    if word.is_empty() || (word.len() > 2 && word.ends_with("ed")) {
        return word.to_string();
    }
    if let Some(stem) = word.strip_suffix("fe") {
        return format!("{stem}ves");
    }
    if let Some(stem) = word.strip_suffix("is").filter(|stem| !stem.is_empty()) {
        return format!("{stem}es");
    }
    if ["s", "x", "z", "ch", "sh"].iter().any(|end| word.ends_with(end)) {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix('y') {
        if stem.chars().last().is_some_and(|c| !"aeiou".contains(c)) {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}

/// Whether `name` is a keyword (strict or reserved) and cannot be used as a
/// plain identifier
pub fn is_rust_keyword(name: &str) -> bool {
    !name.is_empty() && name != "_" && syn::parse_str::<syn::Ident>(name).is_err()
}

/// Field name as written in generated code, raw when it is a keyword
pub fn escape_field_name(name: &str) -> String {
    let snake = name.to_snake_case();
    if is_rust_keyword(&snake) {
        format!("r#{}", snake)
    } else {
        snake
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_module_name() {
        assert_eq!(to_module_name("User"), "user");
        assert_eq!(to_module_name("OrderItem"), "order_item");
        assert_eq!(to_module_name("HTTPLog"), "http_log");
    }

    #[test]
    fn test_to_table_name() {
        assert_eq!(to_table_name("User"), "users");
        assert_eq!(to_table_name("OrderItem"), "order_items");
        assert_eq!(to_table_name("Category"), "categories");
        assert_eq!(to_table_name("Person"), "people");
        assert_eq!(to_table_name("AddressBox"), "address_boxes");
    }

    #[test]
    fn test_pluralize() {
        for (word, plural) in [
            ("user", "users"),
            ("status", "statuses"),
            ("box", "boxes"),
            ("batch", "batches"),
            ("category", "categories"),
            ("key", "keys"),
            ("analysis", "analyses"),
            ("leaf", "leaves"),
            ("knife", "knives"),
            ("person", "people"),
            ("hero", "heroes"),
            ("photo", "photos"),
            ("deleted", "deleted"),
        ] {
            assert_eq!(pluralize(word), plural, "{word}");
        }
    }

    #[test]
    fn test_method_names() {
        assert_eq!(generate_find_by_method_name("id"), "find_by_id");
        assert_eq!(generate_find_by_method_name("userId"), "find_by_user_id");
        assert_eq!(generate_delete_by_method_name("token"), "delete_by_token");
    }

    #[test]
    fn test_escape_field_name() {
        assert_eq!(escape_field_name("type"), "r#type");
        assert_eq!(escape_field_name("name"), "name");
        assert_eq!(escape_field_name("async"), "r#async");
        assert_eq!(escape_field_name("yield"), "r#yield");
        assert_eq!(escape_field_name("userName"), "user_name");
    }
}

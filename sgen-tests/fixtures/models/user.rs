use sgen_derive::Entity;

/// A registered account
#[derive(Debug, Clone, Default, PartialEq, Entity)]
pub struct User {
    pub id: i64,
    #[sgen(rename = "user_name")]
    pub name: String,
    pub email: Option<String>,
    pub active: bool,
    #[sgen(skip)]
    pub sessions: Vec<String>,
}

use sgen_derive::Entity;

#[derive(Debug, Clone, Default, PartialEq, Entity)]
pub struct Post {
    #[sgen(id)]
    pub slug: String,
    pub author_id: i64,
    pub r#type: String,
    pub views: u32,
    pub body: Option<Vec<u8>>,
}

/// Not persisted
#[derive(Debug, Entity)]
#[sgen(skip)]
pub struct Draft {
    pub text: String,
}

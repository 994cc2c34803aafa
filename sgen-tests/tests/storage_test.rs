//! Generated storages compiled against the fixture models
//!
//! build.rs runs the generator over `fixtures/models`; the output is included
//! here and driven through a recording executor.

use std::convert::Infallible;

#[path = "../fixtures/models/mod.rs"]
mod models;

// Include generated code from build.rs
// Allow dead_code since not all generated functions are used in tests
#[allow(dead_code)]
mod database {
    include!(concat!(env!("OUT_DIR"), "/database/mod.rs"));
}

use database::general::db::{Executor, Row, Value};
use database::storages::{post, user};
use models::{Post, User};

/// Records every statement and answers queries with canned rows
#[derive(Default)]
struct Recorder {
    statements: Vec<(String, Vec<Value>)>,
    rows: Vec<Row>,
}

impl Recorder {
    fn answering(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    fn last(&self) -> &(String, Vec<Value>) {
        self.statements.last().expect("no statement recorded")
    }
}

impl Executor for Recorder {
    type Error = Infallible;

    fn execute(&mut self, sql: &str, params: Vec<Value>) -> Result<u64, Infallible> {
        self.statements.push((sql.to_string(), params));
        Ok(1)
    }

    fn query(&mut self, sql: &str, params: Vec<Value>) -> Result<Vec<Row>, Infallible> {
        self.statements.push((sql.to_string(), params));
        Ok(std::mem::take(&mut self.rows))
    }
}

fn ann() -> User {
    User {
        id: 1,
        name: "ann".into(),
        email: None,
        active: true,
        sessions: vec!["s1".into()],
    }
}

#[test]
fn test_columns_match_derive() {
    assert_eq!(user::COLUMNS, User::COLUMNS);
    assert_eq!(post::COLUMNS, Post::COLUMNS);
    assert_eq!(User::PRIMARY_KEY, "id");
    assert_eq!(Post::PRIMARY_KEY, "slug");
    assert_eq!(user::TABLE, "users");
    assert_eq!(post::TABLE, "posts");
}

#[test]
fn test_insert() {
    let mut db = Recorder::default();
    user::insert(&mut db, &ann()).unwrap();

    let (sql, params) = db.last();
    assert_eq!(
        sql,
        "INSERT INTO `users` (`id`, `user_name`, `email`, `active`) VALUES (?, ?, ?, ?)"
    );
    assert_eq!(
        params,
        &vec![
            Value::Int(1),
            Value::Text("ann".into()),
            Value::Null,
            Value::Bool(true)
        ]
    );
}

#[test]
fn test_find_by_primary_key() {
    let mut db = Recorder::answering(vec![vec![
        Value::Int(1),
        Value::Text("ann".into()),
        Value::Text("ann@example.com".into()),
        Value::Int(1),
    ]]);

    let found = user::find_by_id(&mut db, 1).unwrap().unwrap();
    assert_eq!(found.email.as_deref(), Some("ann@example.com"));
    assert!(found.active);
    assert!(found.sessions.is_empty());

    let (sql, params) = db.last();
    assert_eq!(
        sql,
        "SELECT `id`, `user_name`, `email`, `active` FROM `users` WHERE `id` = ? LIMIT 1"
    );
    assert_eq!(params, &vec![Value::Int(1)]);
}

#[test]
fn test_find_all_skips_unreadable_rows() {
    let mut db = Recorder::answering(vec![
        vec![
            Value::Int(1),
            Value::Text("ann".into()),
            Value::Null,
            Value::Bool(false),
        ],
        vec![Value::Text("not an id".into())],
    ]);

    let users = user::find_all(&mut db).unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].name, "ann");
}

#[test]
fn test_count_all() {
    let mut db = Recorder::answering(vec![vec![Value::Int(3)]]);
    assert_eq!(user::count_all(&mut db).unwrap(), 3);
    assert_eq!(db.last().0, "SELECT COUNT(*) FROM `users`");

    let mut empty = Recorder::default();
    assert_eq!(user::count_all(&mut empty).unwrap(), 0);
}

#[test]
fn test_update_binds_key_last() {
    let post = Post {
        slug: "hello".into(),
        author_id: 7,
        r#type: "note".into(),
        views: 42,
        body: Some(b"hi".to_vec()),
    };
    let mut db = Recorder::default();
    post::update(&mut db, &post).unwrap();

    let (sql, params) = db.last();
    assert_eq!(
        sql,
        "UPDATE `posts` SET `author_id` = ?, `type` = ?, `views` = ?, `body` = ? WHERE `slug` = ?"
    );
    assert_eq!(params.first(), Some(&Value::Int(7)));
    assert_eq!(params.get(2), Some(&Value::UInt(42)));
    assert_eq!(params.last(), Some(&Value::Text("hello".into())));
}

#[test]
fn test_delete_by_string_key() {
    let mut db = Recorder::default();
    assert_eq!(post::delete_by_slug(&mut db, "hello").unwrap(), 1);

    let (sql, params) = db.last();
    assert_eq!(sql, "DELETE FROM `posts` WHERE `slug` = ?");
    assert_eq!(params, &vec![Value::Text("hello".into())]);
}

#[test]
fn test_generated_sources_carry_header() {
    let source = include_str!(concat!(env!("OUT_DIR"), "/database/storages/user/user.rs"));
    assert!(source.starts_with("// Generated by sgen. Do not edit."));
    assert!(source.contains("use crate::models::User;"));
}

//! Shared fixtures for unit tests: a small blog with posts, comments and
//! users, available both in memory and in SQLite

use serde_json::{Value, json};
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;

use crate::store::{Catalog, MemoryStore};

const SCHEMA: &str = r#"
CREATE TABLE users (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);
CREATE TABLE posts (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    category TEXT,
    view_count INTEGER NOT NULL,
    published_at TEXT,
    author_id INTEGER REFERENCES users(id)
);
CREATE TABLE comments (
    id INTEGER PRIMARY KEY,
    post_id INTEGER NOT NULL REFERENCES posts(id),
    author_id INTEGER REFERENCES users(id),
    text TEXT NOT NULL
)
"#;

pub fn blog_catalog() -> Catalog {
    Catalog::new()
        .table("posts", "Post")
        .table("comments", "Comment")
        .table("users", "User")
        .has_many("posts", "comments", "comments", "post_id")
        .belongs_to("posts", "author", "users", "author_id")
        .belongs_to("comments", "post", "posts", "post_id")
        .belongs_to("comments", "author", "users", "author_id")
        .has_many("users", "posts", "posts", "author_id")
}

fn blog_rows() -> Vec<(&'static str, Value)> {
    vec![
        ("users", json!({"id": 1, "name": "ada"})),
        ("users", json!({"id": 2, "name": "grace"})),
        (
            "posts",
            json!({"id": 1, "title": "Hello", "category": "rust", "view_count": 5,
                   "published_at": "2024-01-01", "author_id": 1}),
        ),
        (
            "posts",
            json!({"id": 2, "title": "Rust tips", "category": "rust", "view_count": 11,
                   "published_at": "2024-06-01", "author_id": 2}),
        ),
        (
            "posts",
            json!({"id": 3, "title": "Draft", "category": "go", "view_count": 20,
                   "published_at": null, "author_id": 1}),
        ),
        (
            "comments",
            json!({"id": 10, "post_id": 1, "author_id": 2, "text": "first!"}),
        ),
        (
            "comments",
            json!({"id": 11, "post_id": 1, "author_id": 1, "text": "nice post"}),
        ),
        (
            "comments",
            json!({"id": 12, "post_id": 2, "author_id": 1, "text": "This is Amazing"}),
        ),
    ]
}

pub fn blog_store() -> MemoryStore {
    let mut store = MemoryStore::new(blog_catalog());
    for (table, row) in blog_rows() {
        store.insert(table, row).unwrap();
    }
    store
}

/// In-memory SQLite pool holding the same rows as [`blog_store`]
pub async fn blog_pool() -> anyhow::Result<SqlitePool> {
    init_tracing();
    // Single connection so every query sees the same in-memory database
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await?;

    for statement in SCHEMA.split(';').filter(|s| !s.trim().is_empty()) {
        sqlx::query(statement.trim()).execute(&pool).await?;
    }

    for (table, row) in blog_rows() {
        let Value::Object(fields) = row else {
            continue;
        };
        let columns: Vec<&str> = fields.keys().map(String::as_str).collect();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        );
        let mut query = sqlx::query(&sql);
        for value in fields.values() {
            query = match value {
                Value::Null => query.bind(None::<String>),
                Value::Number(n) => query.bind(n.as_i64()),
                Value::String(s) => query.bind(s.clone()),
                other => query.bind(other.to_string()),
            };
        }
        query.execute(&pool).await?;
    }

    Ok(pool)
}

/// Route `tracing` output through the test harness; safe to call repeatedly
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("index_query=debug")),
        )
        .with_test_writer()
        .try_init();
}

// Cache database schema.
// Every statement is idempotent so it can run on each startup.

/// SQL schema for the cache database
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS posts_cache (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    body TEXT NOT NULL,
    userId INTEGER NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
    updated_at DATETIME DEFAULT CURRENT_TIMESTAMP
);

CREATE INDEX IF NOT EXISTS idx_posts_cache_updated_at ON posts_cache(updated_at DESC);

CREATE TABLE IF NOT EXISTS users_cache (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    username TEXT NOT NULL,
    email TEXT NOT NULL,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
);
"#;

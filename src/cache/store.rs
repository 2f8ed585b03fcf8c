// Cache store backed by a local SQLite database.
// Strict layer: every failure is returned to the caller.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use tracing::{debug, info, warn};

use crate::api::{Post, User};
use crate::error::{BordadoError, Result};

use super::schema::SCHEMA;

/// Handle to the cache database.
///
/// Cloning shares the same underlying connection. The connection is opened
/// by [`CacheDb::initialize`]; every other operation fails with
/// [`BordadoError::NotInitialized`] until then.
#[derive(Clone)]
pub struct CacheDb {
    conn: Arc<Mutex<Option<Connection>>>,
    path: PathBuf,
    seed_path: Option<PathBuf>,
}

impl CacheDb {
    /// Create an unopened handle for the database at `path`.
    ///
    /// When `seed_path` is given and `path` does not exist yet, the seed file
    /// is copied into place on initialization.
    pub fn new(path: impl Into<PathBuf>, seed_path: Option<PathBuf>) -> Self {
        Self {
            conn: Arc::new(Mutex::new(None)),
            path: path.into(),
            seed_path,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().is_some()
    }

    /// Open the database and create missing tables.
    pub fn initialize(&self) -> Result<()> {
        let mut guard = self.lock();
        if guard.is_some() {
            debug!(path = %self.path.display(), "cache database already open");
            return Ok(());
        }

        self.prepare_file()?;

        let conn = Connection::open(&self.path)?;
        conn.execute_batch(SCHEMA)?;
        *guard = Some(conn);

        info!(path = %self.path.display(), "cache database initialized");
        Ok(())
    }

    /// Close the connection. Later operations fail until re-initialized.
    pub fn close(&self) {
        if self.lock().take().is_some() {
            debug!(path = %self.path.display(), "cache database closed");
        }
    }

    /// Make sure the database file's directory exists, seeding the file from
    /// the template on first run.
    fn prepare_file(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        match &self.seed_path {
            Some(seed) if seed.exists() => {
                fs::copy(seed, &self.path)?;
                info!(seed = %seed.display(), "seeded cache database from template");
            }
            Some(seed) => {
                warn!(seed = %seed.display(), "seed database missing, starting empty");
            }
            None => {}
        }

        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.lock();
        let conn = guard.as_mut().ok_or(BordadoError::NotInitialized)?;
        f(conn)
    }

    /// Insert or replace posts by id, stamping both timestamps with the
    /// write time.
    pub fn upsert_posts(&self, posts: &[Post]) -> Result<()> {
        self.with_conn(|conn| {
            let now = Utc::now();
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    r#"
                    INSERT OR REPLACE INTO posts_cache (id, title, body, userId, created_at, updated_at)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?5)
                    "#,
                )?;
                for post in posts {
                    stmt.execute(params![post.id, post.title, post.body, post.user_id, now])?;
                }
            }
            tx.commit()?;

            debug!(count = posts.len(), "cached posts");
            Ok(())
        })
    }

    /// All cached posts, most recently written first. Posts written in the
    /// same batch share a timestamp and come back by id, highest first.
    pub fn fetch_cached_posts(&self) -> Result<Vec<Post>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                r#"
                SELECT id, title, body, userId, created_at, updated_at
                FROM posts_cache
                ORDER BY updated_at DESC, id DESC
                "#,
            )?;
            let posts = stmt
                .query_map([], row_to_post)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(posts)
        })
    }

    /// Insert or replace users by id.
    pub fn upsert_users(&self, users: &[User]) -> Result<()> {
        self.with_conn(|conn| {
            let now = Utc::now();
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached(
                    r#"
                    INSERT OR REPLACE INTO users_cache (id, name, username, email, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)
                    "#,
                )?;
                for user in users {
                    stmt.execute(params![user.id, user.name, user.username, user.email, now])?;
                }
            }
            tx.commit()?;

            debug!(count = users.len(), "cached users");
            Ok(())
        })
    }

    /// All cached users, in no particular order.
    pub fn fetch_cached_users(&self) -> Result<Vec<User>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, username, email, created_at FROM users_cache")?;
            let users = stmt
                .query_map([], row_to_user)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(users)
        })
    }
}

fn row_to_post(row: &Row) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        body: row.get(2)?,
        user_id: row.get(3)?,
        created_at: row.get::<_, Option<DateTime<Utc>>>(4)?,
        updated_at: row.get::<_, Option<DateTime<Utc>>>(5)?,
    })
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        username: row.get(2)?,
        email: row.get(3)?,
        created_at: row.get::<_, Option<DateTime<Utc>>>(4)?,
    })
}

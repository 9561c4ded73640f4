use sqlx::{migrate::MigrateDatabase, query, query_as, sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::{
    error::AppError,
    model::{Owner, Todo, TodoId, User, UserId},
};

/// Handle to the `users` and `todos` collections.
///
/// Every todo query takes an [`Owner`]. `Owner::User` always adds a
/// `user_id = ?` filter next to the id filter; `Owner::Unscoped` (single-user
/// mode) leaves it out.
#[derive(Debug, Clone)]
pub struct Store {
    db: Pool<Sqlite>,
}

impl Store {
    /// Create the database if missing, connect, and ensure both tables exist.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        // Check if the database exists, if not, create it
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            tracing::info!("creating database {}", url);
            Sqlite::create_database(url).await?;
        }

        // an in-memory database lives and dies with its single connection
        let pool = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect(url)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(max_connections)
                .connect(url)
                .await?
        };
        tracing::info!("connection to the database is successful");

        let store = Self { db: pool };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<(), sqlx::Error> {
        query(
            r#"CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        );"#,
        )
        .execute(&self.db)
        .await?;

        query(
            r#"CREATE TABLE IF NOT EXISTS todos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            task TEXT NOT NULL,
            completed BOOLEAN NOT NULL DEFAULT 0,
            user_id INTEGER REFERENCES users(id)
        );"#,
        )
        .execute(&self.db)
        .await?;

        query("CREATE INDEX IF NOT EXISTS todos_user_id ON todos (user_id);")
            .execute(&self.db)
            .await?;

        query(
            r#"CREATE TABLE IF NOT EXISTS sessions (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id),
            expires_at INTEGER NOT NULL
        );"#,
        )
        .execute(&self.db)
        .await?;

        tracing::debug!("users, todos and sessions tables ready");
        Ok(())
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        query_as::<_, User>("SELECT id, username, password FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.db)
            .await
    }

    /// Insert a user. A unique violation on `username` (two registrations
    /// racing past the existence check) becomes [`AppError::DuplicateUsername`].
    pub async fn insert_user(&self, username: &str, password_hash: &str) -> Result<UserId, AppError> {
        let inserted = query_as::<_, (UserId,)>(
            "INSERT INTO users (username, password) VALUES (?, ?) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.db)
        .await;

        match inserted {
            Ok((id,)) => Ok(id),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::DuplicateUsername)
            }
            Err(e) => Err(e.into()),
        }
    }

    pub async fn insert_session(
        &self,
        id: &str,
        user_id: UserId,
        expires_at: i64,
    ) -> Result<(), sqlx::Error> {
        query("INSERT INTO sessions (id, user_id, expires_at) VALUES (?, ?, ?)")
            .bind(id)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    /// User bound to session `id`, unless the session expired at or before `now`.
    pub async fn find_session_user(&self, id: &str, now: i64) -> Result<Option<UserId>, sqlx::Error> {
        let row = query_as::<_, (UserId,)>(
            "SELECT user_id FROM sessions WHERE id = ? AND expires_at > ?",
        )
        .bind(id)
        .bind(now)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(|(user_id,)| user_id))
    }

    pub async fn delete_session(&self, id: &str) -> Result<u64, sqlx::Error> {
        let result = query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_expired_sessions(&self, now: i64) -> Result<u64, sqlx::Error> {
        let result = query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }

    /// All todos visible to `owner`, in insertion order.
    pub async fn list_todos(&self, owner: Owner) -> Result<Vec<Todo>, sqlx::Error> {
        query_as::<_, Todo>(
            "SELECT id, task, completed, user_id FROM todos \
             WHERE (?1 IS NULL OR user_id = ?1) ORDER BY id",
        )
        .bind(owner.user_id())
        .fetch_all(&self.db)
        .await
    }

    pub async fn insert_todo(&self, owner: Owner, task: &str) -> Result<Todo, sqlx::Error> {
        query_as::<_, Todo>(
            "INSERT INTO todos (task, completed, user_id) VALUES (?, 0, ?) \
             RETURNING id, task, completed, user_id",
        )
        .bind(task)
        .bind(owner.user_id())
        .fetch_one(&self.db)
        .await
    }

    /// Flip `completed` in one statement. `None` when no todo with `id` is
    /// visible to `owner`.
    pub async fn toggle_todo(&self, owner: Owner, id: TodoId) -> Result<Option<Todo>, sqlx::Error> {
        query_as::<_, Todo>(
            "UPDATE todos SET completed = NOT completed \
             WHERE id = ?1 AND (?2 IS NULL OR user_id = ?2) \
             RETURNING id, task, completed, user_id",
        )
        .bind(id)
        .bind(owner.user_id())
        .fetch_optional(&self.db)
        .await
    }

    /// Returns the number of rows removed (0 or 1).
    pub async fn delete_todo(&self, owner: Owner, id: TodoId) -> Result<u64, sqlx::Error> {
        let result = query("DELETE FROM todos WHERE id = ?1 AND (?2 IS NULL OR user_id = ?2)")
            .bind(id)
            .bind(owner.user_id())
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

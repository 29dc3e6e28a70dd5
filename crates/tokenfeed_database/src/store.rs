//! PostgreSQL implementation of FeedStore.

use crate::connection::{PgPool, create_pool, run_migrations};
use crate::schema::posts;
use crate::{DatabaseResult, NewPostRow, PostRow};

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use std::time::Duration;
use tokenfeed_core::{NewPost, Post};
use tokenfeed_error::{StorageError, StorageErrorKind, TokenfeedResult};
use tokenfeed_storage::{FeedStore, check_capacity};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Durable feed store backed by a `posts` table.
///
/// Each append inserts the post and deletes every row beyond the
/// `capacity` most recent inside one transaction. Appends from this
/// process are additionally serialized so `created_at` (the transaction
/// start time) follows id order.
///
/// # Example
/// ```no_run
/// use tokenfeed_database::PostgresFeedStore;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let url = std::env::var("DATABASE_URL")?;
///     let store = PostgresFeedStore::connect(url, 8, Duration::from_secs(10), 500).await?;
///     Ok(())
/// }
/// ```
pub struct PostgresFeedStore {
    pool: PgPool,
    capacity: usize,
    write_lock: Mutex<()>,
}

impl PostgresFeedStore {
    /// Wrap an existing pool. The schema must already be migrated.
    ///
    /// # Errors
    ///
    /// Returns an error if `capacity` is zero.
    pub fn new(pool: PgPool, capacity: usize) -> Result<Self, StorageError> {
        Ok(Self {
            pool,
            capacity: check_capacity(capacity)?,
            write_lock: Mutex::new(()),
        })
    }

    /// Connect, migrate and return a ready store.
    ///
    /// Fails if the database is unreachable or migrations fail. There is no
    /// fallback to another backend.
    #[instrument(skip(database_url))]
    pub async fn connect(
        database_url: String,
        pool_size: u32,
        connect_timeout: Duration,
        capacity: usize,
    ) -> TokenfeedResult<Self> {
        let capacity = check_capacity(capacity)?;

        let pool = tokio::task::spawn_blocking(move || -> DatabaseResult<PgPool> {
            let pool = create_pool(&database_url, pool_size, connect_timeout)?;
            run_migrations(&pool)?;
            Ok(pool)
        })
        .await
        .map_err(|e| StorageError::new(StorageErrorKind::Task(e.to_string())))??;

        info!(pool_size, capacity, "Connected to PostgreSQL feed store");
        Ok(Self::new(pool, capacity)?)
    }

    /// Run `f` on a pooled connection off the async runtime.
    ///
    /// No connection within the pool's timeout means the database is down
    /// or saturated, reported as [`StorageErrorKind::Unavailable`].
    async fn with_connection<T, F>(&self, f: F) -> TokenfeedResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> DatabaseResult<T> + Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || -> TokenfeedResult<T> {
            let mut conn = pool
                .get()
                .map_err(|e| StorageError::new(StorageErrorKind::Unavailable(e.to_string())))?;
            Ok(f(&mut conn)?)
        })
        .await
        .map_err(|e| StorageError::new(StorageErrorKind::Task(e.to_string())))?
    }
}

fn insert_and_trim(
    conn: &mut PgConnection,
    row: NewPostRow,
    capacity: i64,
) -> DatabaseResult<(PostRow, usize)> {
    conn.transaction(|conn| {
        let stored: PostRow = diesel::insert_into(posts::table)
            .values(&row)
            .returning(PostRow::as_returning())
            .get_result(conn)?;

        let total: i64 = posts::table.count().get_result(conn)?;
        let evicted = if total > capacity {
            let keep: Vec<i64> = posts::table
                .select(posts::id)
                .order((posts::created_at.desc(), posts::id.desc()))
                .limit(capacity)
                .load(conn)?;
            diesel::delete(posts::table.filter(posts::id.ne_all(keep))).execute(conn)?
        } else {
            0
        };

        Ok((stored, evicted))
    })
}

fn load_feed(conn: &mut PgConnection, capacity: i64) -> DatabaseResult<Vec<PostRow>> {
    Ok(posts::table
        .select(PostRow::as_select())
        .order((posts::created_at.desc(), posts::id.desc()))
        .limit(capacity)
        .load(conn)?)
}

fn into_posts(rows: Vec<PostRow>) -> TokenfeedResult<Vec<Post>> {
    rows.into_iter()
        .map(|row| Post::try_from(row).map_err(Into::into))
        .collect()
}

#[async_trait]
impl FeedStore for PostgresFeedStore {
    #[instrument(skip(self, post), fields(backend = "postgres"))]
    async fn append(&self, post: NewPost) -> TokenfeedResult<Post> {
        let _guard = self.write_lock.lock().await;

        let row = NewPostRow::from(post);
        let capacity = self.capacity as i64;
        let (stored, evicted) = self
            .with_connection(move |conn| insert_and_trim(conn, row, capacity))
            .await?;

        debug!(id = stored.id, evicted, "Appended post");
        Ok(Post::try_from(stored)?)
    }

    async fn list(&self) -> TokenfeedResult<Vec<Post>> {
        let capacity = self.capacity as i64;
        let rows = self
            .with_connection(move |conn| load_feed(conn, capacity))
            .await?;

        into_posts(rows)
    }

    #[instrument(skip(self, post), fields(backend = "postgres"))]
    async fn append_then_list(&self, post: NewPost) -> TokenfeedResult<(Post, Vec<Post>)> {
        let _guard = self.write_lock.lock().await;

        let row = NewPostRow::from(post);
        let capacity = self.capacity as i64;
        let (stored, rows) = self
            .with_connection(move |conn| {
                conn.transaction(|conn| {
                    let (stored, evicted) = insert_and_trim(conn, row, capacity)?;
                    debug!(id = stored.id, evicted, "Appended post");
                    Ok((stored, load_feed(conn, capacity)?))
                })
            })
            .await?;

        Ok((Post::try_from(stored)?, into_posts(rows)?))
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tokio::sync::watch;

use crate::error::Result;
use crate::schema::{DEMO_DATA, SCHEMA};

/// SQLite in-memory database identifier
const MEMORY_DB_PATH: &str = ":memory:";

/// How long a writer waits on a locked file database before giving up
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConnection = PooledConnection<SqliteConnectionManager>;

/// Tables whose changes can be observed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Users,
    Posts,
    Comments,
    Likes,
    SearchHistory,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::Users,
        Table::Posts,
        Table::Comments,
        Table::Likes,
        Table::SearchHistory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Users => "users",
            Table::Posts => "posts",
            Table::Comments => "comments",
            Table::Likes => "likes",
            Table::SearchHistory => "search_history",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Per-table change counters
struct ChangeNotifier {
    versions: [watch::Sender<u64>; 5],
}

impl ChangeNotifier {
    fn new() -> Self {
        Self {
            versions: std::array::from_fn(|_| watch::channel(0).0),
        }
    }
}

/// Database wrapper with connection pooling and change notification
#[derive(Clone)]
pub struct Database {
    pub pool: DbPool,
    changes: Arc<ChangeNotifier>,
}

impl Database {
    /// Create a new database connection pool
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy();
        let pool = if path_str.trim().eq_ignore_ascii_case(MEMORY_DB_PATH) {
            // Every in-memory connection is its own database, so the pool is
            // pinned to a single long-lived connection.
            Pool::builder()
                .max_size(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .build(SqliteConnectionManager::memory())?
        } else {
            let manager = SqliteConnectionManager::file(path.as_ref())
                .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
            Pool::builder().build(manager)?
        };

        Ok(Self {
            pool,
            changes: Arc::new(ChangeNotifier::new()),
        })
    }

    /// Create an in-memory database (useful for testing)
    pub fn in_memory() -> Result<Self> {
        Self::new(MEMORY_DB_PATH)
    }

    /// Open a database and create the schema in one step
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let db = Self::new(path)?;
        db.initialize()?;
        Ok(db)
    }

    /// Initialize the database schema. Safe to run more than once.
    pub fn initialize(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(SCHEMA)?;
        log::debug!(target: "store", "Schema initialized");
        Ok(())
    }

    /// Seed the database with a couple of demo users and posts
    pub fn seed_demo_data(&self) -> Result<()> {
        let conn = self.connection()?;
        conn.execute_batch(DEMO_DATA)?;
        drop(conn);
        self.notify(Table::Users);
        self.notify(Table::Posts);
        Ok(())
    }

    /// Get a connection from the pool
    pub fn connection(&self) -> Result<DbConnection> {
        Ok(self.pool.get()?)
    }

    /// Subscribe to changes of one table.
    ///
    /// The received value is a version counter; its only meaning is "the
    /// table changed since you last looked".
    pub fn subscribe(&self, table: Table) -> watch::Receiver<u64> {
        self.changes.versions[table.index()].subscribe()
    }

    /// Current version of a table
    pub fn version(&self, table: Table) -> u64 {
        *self.changes.versions[table.index()].borrow()
    }

    /// Record that a table changed and wake its subscribers
    pub fn notify(&self, table: Table) {
        self.changes.versions[table.index()].send_modify(|version| *version += 1);
        log::trace!(target: "store", "{} changed", table.as_str());
    }
}

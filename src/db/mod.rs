mod from_row;
pub mod queries;

use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::config::Config;
use crate::error::Result;

pub type DbPool = Pool<SqliteConnectionManager>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    /// Where the success page's "Go To Orders Page" button points
    pub orders_page_url: String,
    /// Where the failure page's "Go Back" button points
    pub home_url: String,
}

impl AppState {
    pub fn new(db: DbPool, config: &Config) -> Self {
        Self {
            db,
            orders_page_url: config.orders_page_url.clone(),
            home_url: config.home_url.clone(),
        }
    }
}

/// Open a pooled file database and make sure the schema exists.
pub fn create_pool(path: &str) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path)
        .with_init(|conn| conn.busy_timeout(Duration::from_secs(5)));
    let pool = Pool::builder().max_size(8).build(manager)?;

    init_db(&*pool.get()?)?;
    tracing::info!("Database ready at {}", path);

    Ok(pool)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- Checkout sessions written by the storefront, partitioned by payment mode.
        -- `id` is the session's own id field and is not unique across partitions.
        CREATE TABLE IF NOT EXISTS checkout_sessions (
            doc_id INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL,
            payment_mode TEXT NOT NULL,
            data TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_checkout_sessions_mode_id
            ON checkout_sessions(payment_mode, id);

        CREATE TABLE IF NOT EXISTS orders (
            id TEXT PRIMARY KEY,
            uid TEXT,
            payment_mode TEXT NOT NULL,
            amount TEXT NOT NULL,
            checkout TEXT NOT NULL,
            created_at INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_orders_uid ON orders(uid);

        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            carts TEXT NOT NULL DEFAULT '[]',
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS products (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            orders INTEGER NOT NULL DEFAULT 0,
            created_at INTEGER NOT NULL
        );
        "#,
    )?;
    Ok(())
}

//! SQLite-backed local store for the finished-goods catalog.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

use gudang_core::{Category, CategoryId, Product, ProductId, SyncMetadata, derive_categories};

use crate::error::{StoreError, StoreResult};

/// Fixed key of the singleton metadata row.
const METADATA_KEY: &str = "last_sync";

#[derive(Debug, Clone)]
enum Backing {
    File(PathBuf),
    Memory,
}

/// SQLite-backed store for products, derived categories, and sync metadata.
///
/// The handle is cheap to clone and safe to share across tasks; the pool is
/// initialized lazily on first use and `open()` is idempotent. Only the sync
/// orchestrator writes through `replace_all`; reads may run concurrently and
/// stale reads during an in-progress replace are acceptable (they are
/// superseded once the replacing transaction commits).
#[derive(Debug, Clone)]
pub struct ProductStore {
    pool: Arc<Mutex<Option<SqlitePool>>>,
    backing: Backing,
}

impl ProductStore {
    /// Store backed by a SQLite file at `path` (created on first use).
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            pool: Arc::new(Mutex::new(None)),
            backing: Backing::File(path.into()),
        }
    }

    /// Store backed by the default per-user database location,
    /// `{data_dir}/gudang/catalog.db` (overridable via `GUDANG_DATA_DIR`).
    pub fn at_default_path() -> StoreResult<Self> {
        let path = default_db_path().map_err(|e| StoreError::Io(format!("{e:#}")))?;
        Ok(Self::at_path(path))
    }

    /// In-memory store (tests and sync-disabled degraded mode).
    pub fn in_memory() -> Self {
        Self {
            pool: Arc::new(Mutex::new(None)),
            backing: Backing::Memory,
        }
    }

    /// Idempotently establish the store: connect and create the three
    /// collections with their secondary lookup indexes.
    ///
    /// Calling this on an already-open store is a no-op. A connection
    /// failure is `StoreError::Unavailable` (no local cache capability).
    pub async fn open(&self) -> StoreResult<()> {
        self.ensure_initialized().await
    }

    async fn ensure_initialized(&self) -> StoreResult<()> {
        let mut pool_guard = self.pool.lock().await;
        if pool_guard.is_some() {
            return Ok(());
        }

        let pool = match &self.backing {
            Backing::Memory => SqlitePoolOptions::new()
                // One shared connection: each `:memory:` connection would
                // otherwise see its own private database.
                .max_connections(1)
                .connect("sqlite::memory:")
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?,
            Backing::File(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        StoreError::Io(format!("failed to create store directory {parent:?}: {e}"))
                    })?;
                }
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true);
                SqlitePoolOptions::new()
                    .connect_with(options)
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?
            }
        };

        create_schema(&pool).await?;

        *pool_guard = Some(pool);
        tracing::debug!("local catalog store opened");
        Ok(())
    }

    /// Get the pool, initializing if necessary.
    async fn get_pool(&self) -> StoreResult<SqlitePool> {
        self.ensure_initialized().await?;
        let pool_guard = self.pool.lock().await;
        pool_guard
            .as_ref()
            .cloned()
            .ok_or_else(|| StoreError::Unavailable("store handle was released".to_string()))
    }

    /// Transactionally replace the entire catalog with a new sync generation.
    ///
    /// Clears and repopulates products and categories (derived from the given
    /// products) and upserts the metadata row with `{now, products.len()}`,
    /// all in a single transaction: a failure partway leaves the previous
    /// generation untouched.
    pub async fn replace_all(&self, products: &[Product]) -> StoreResult<SyncMetadata> {
        let pool = self.get_pool().await?;
        let categories = derive_categories(products);
        let meta = SyncMetadata {
            synced_at: Utc::now(),
            record_count: products.len() as u64,
        };

        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM categories").execute(&mut *tx).await?;

        for product in products {
            sqlx::query(
                r#"
                INSERT INTO products (
                    id, code, name, category_id, category_name,
                    parent1, parent2, weight, small_uom, big_uom
                )
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                "#,
            )
            .bind(product.id.0)
            .bind(&product.code)
            .bind(&product.name)
            .bind(product.category_id.0)
            .bind(&product.category_name)
            .bind(&product.parent1)
            .bind(&product.parent2)
            .bind(product.weight)
            .bind(&product.small_uom)
            .bind(&product.big_uom)
            .execute(&mut *tx)
            .await?;
        }

        for category in &categories {
            sqlx::query(
                r#"
                INSERT INTO categories (id, name, parent1, parent2, product_count)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(category.id.0)
            .bind(&category.name)
            .bind(&category.parent1)
            .bind(&category.parent2)
            .bind(category.product_count as i64)
            .execute(&mut *tx)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO sync_metadata (key, synced_at, record_count)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                synced_at = excluded.synced_at,
                record_count = excluded.record_count
            "#,
        )
        .bind(METADATA_KEY)
        .bind(meta.synced_at.to_rfc3339())
        .bind(meta.record_count as i64)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!(
            records = products.len(),
            categories = categories.len(),
            "replaced catalog with new sync generation"
        );
        Ok(meta)
    }

    /// Full materialized product list (ordered by id for determinism).
    pub async fn get_all(&self) -> StoreResult<Vec<Product>> {
        let pool = self.get_pool().await?;
        let rows = sqlx::query("SELECT * FROM products ORDER BY id")
            .fetch_all(&pool)
            .await?;
        rows.iter().map(product_from_row).collect()
    }

    /// Products carrying the given category id.
    pub async fn get_by_category(&self, category_id: CategoryId) -> StoreResult<Vec<Product>> {
        let pool = self.get_pool().await?;
        let rows = sqlx::query("SELECT * FROM products WHERE category_id = ?1 ORDER BY id")
            .bind(category_id.0)
            .fetch_all(&pool)
            .await?;
        rows.iter().map(product_from_row).collect()
    }

    /// Case-insensitive substring search over product name OR code.
    pub async fn search(&self, term: &str) -> StoreResult<Vec<Product>> {
        let pool = self.get_pool().await?;
        let needle = format!("%{}%", term.to_lowercase());
        let rows = sqlx::query(
            "SELECT * FROM products WHERE lower(name) LIKE ?1 OR lower(code) LIKE ?1 ORDER BY id",
        )
        .bind(&needle)
        .fetch_all(&pool)
        .await?;
        rows.iter().map(product_from_row).collect()
    }

    /// Derived category summaries of the current generation (ordered by id).
    pub async fn get_categories(&self) -> StoreResult<Vec<Category>> {
        let pool = self.get_pool().await?;
        let rows = sqlx::query("SELECT * FROM categories ORDER BY id")
            .fetch_all(&pool)
            .await?;
        rows.iter().map(category_from_row).collect()
    }

    /// Last successful sync, or `None` if the store was never populated.
    pub async fn get_metadata(&self) -> StoreResult<Option<SyncMetadata>> {
        let pool = self.get_pool().await?;
        let row = sqlx::query("SELECT synced_at, record_count FROM sync_metadata WHERE key = ?1")
            .bind(METADATA_KEY)
            .fetch_optional(&pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let synced_at_str: String = row.try_get("synced_at")?;
        let synced_at = DateTime::parse_from_rfc3339(&synced_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| StoreError::Query(format!("invalid synced_at timestamp in store: {e}")))?;
        let record_count: i64 = row.try_get("record_count")?;

        Ok(Some(SyncMetadata {
            synced_at,
            record_count: record_count.max(0) as u64,
        }))
    }

    /// Clear all three collections in one transaction.
    ///
    /// Succeeds even if the store was never populated; on a store that was
    /// never opened this is a no-op.
    pub async fn wipe(&self) -> StoreResult<()> {
        let pool = {
            let pool_guard = self.pool.lock().await;
            match pool_guard.as_ref() {
                Some(pool) => pool.clone(),
                None => return Ok(()),
            }
        };

        let mut tx = pool.begin().await?;
        sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM categories").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM sync_metadata").execute(&mut *tx).await?;
        tx.commit().await?;

        tracing::info!("wiped local catalog");
        Ok(())
    }

    /// Release the store handle without mutating data (page-unload path).
    ///
    /// The next operation re-opens the store lazily. For in-memory stores
    /// closing discards all data.
    pub async fn close(&self) {
        let pool = {
            let mut pool_guard = self.pool.lock().await;
            pool_guard.take()
        };
        if let Some(pool) = pool {
            pool.close().await;
            tracing::debug!("local catalog store closed");
        }
    }

    /// Drop the store entirely: close the pool and delete the backing file.
    ///
    /// Fallback when `wipe` fails during sign-out cleanup. Secondary failures
    /// are logged and swallowed; cleanup must not surface errors to the user.
    pub async fn destroy(&self) {
        self.close().await;

        if let Backing::File(path) = &self.backing {
            match std::fs::remove_file(path) {
                Ok(()) => tracing::info!("destroyed local catalog store at {path:?}"),
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                Err(err) => {
                    tracing::warn!("failed to delete store file {path:?} during destroy: {err}");
                }
            }
        }
    }
}

async fn create_schema(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS products (
            id             INTEGER PRIMARY KEY,
            code           TEXT NOT NULL,
            name           TEXT NOT NULL,
            category_id    INTEGER NOT NULL,
            category_name  TEXT NOT NULL,
            parent1        TEXT NOT NULL,
            parent2        TEXT NOT NULL,
            weight         REAL NOT NULL,
            small_uom      TEXT NOT NULL,
            big_uom        TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_code ON products (code)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_category_id ON products (category_id)")
        .execute(pool)
        .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_products_category_name ON products (category_name)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id             INTEGER PRIMARY KEY,
            name           TEXT NOT NULL,
            parent1        TEXT NOT NULL,
            parent2        TEXT NOT NULL,
            product_count  INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_categories_name ON categories (name)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sync_metadata (
            key           TEXT PRIMARY KEY CHECK (key = 'last_sync'),
            synced_at     TEXT NOT NULL,
            record_count  INTEGER NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn product_from_row(row: &SqliteRow) -> StoreResult<Product> {
    Ok(Product {
        id: ProductId(row.try_get("id")?),
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        category_id: CategoryId(row.try_get("category_id")?),
        category_name: row.try_get("category_name")?,
        parent1: row.try_get("parent1")?,
        parent2: row.try_get("parent2")?,
        weight: row.try_get("weight")?,
        small_uom: row.try_get("small_uom")?,
        big_uom: row.try_get("big_uom")?,
    })
}

fn category_from_row(row: &SqliteRow) -> StoreResult<Category> {
    let product_count: i64 = row.try_get("product_count")?;
    Ok(Category {
        id: CategoryId(row.try_get("id")?),
        name: row.try_get("name")?,
        parent1: row.try_get("parent1")?,
        parent2: row.try_get("parent2")?,
        product_count: product_count.max(0) as u64,
    })
}

/// Resolve the path to the SQLite catalog database:
/// `{app_data_dir}/gudang/catalog.db`, or `$GUDANG_DATA_DIR/catalog.db`.
fn default_db_path() -> anyhow::Result<PathBuf> {
    if let Ok(dir) = std::env::var("GUDANG_DATA_DIR") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir).join("catalog.db"));
        }
    }

    let base = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .context("failed to resolve OS app data directory - tried data_dir() and home_dir()/.local/share")?;

    Ok(base.join("gudang").join("catalog.db"))
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed local store.
//!
//! The [`Database`] struct owns the two client-side tables: the product cache
//! and the FIFO queue of pending operations. Both survive restarts.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

use crate::error::{Error, Result};
use crate::op::{OpType, PendingOperation};
use crate::product::{temp_id, Image, Product};

/// SQL schema for the local store.
pub const SCHEMA: &str = r#"
-- Cached products, one row per id (negative ids are local-only)
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    price REAL NOT NULL,
    description TEXT,
    barcode TEXT,
    image_url TEXT,
    image_bytes BLOB,
    image_filename TEXT,
    image_mime TEXT
);

-- Operations waiting to reach the server, replayed in id order
CREATE TABLE IF NOT EXISTS pending_ops (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    type TEXT NOT NULL,
    product_id INTEGER NOT NULL,
    name TEXT NOT NULL,
    price REAL NOT NULL,
    description TEXT,
    barcode TEXT,
    image_url TEXT,
    image_bytes BLOB,
    image_filename TEXT,
    image_mime TEXT,
    queued_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_products_name ON products(name);
CREATE INDEX IF NOT EXISTS idx_products_price ON products(price);
CREATE INDEX IF NOT EXISTS idx_products_barcode ON products(barcode);
CREATE INDEX IF NOT EXISTS idx_pending_ops_type ON pending_ops(type);
CREATE INDEX IF NOT EXISTS idx_pending_ops_product ON pending_ops(product_id);
"#;

const PRODUCT_COLUMNS: &str =
    "id, name, price, description, barcode, image_url, image_bytes, image_filename, image_mime";

const OP_COLUMNS: &str = "id, type, product_id, name, price, description, barcode, \
     image_url, image_bytes, image_filename, image_mime, queued_at";

/// Parse a string value from the database, returning a rusqlite error on parse failure.
fn parse_db<T: std::str::FromStr>(
    value: &str,
    column: &str,
) -> std::result::Result<T, rusqlite::Error> {
    value.parse().map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid value '{value}' in column '{column}'"
            ))),
        )
    })
}

/// Parse an RFC3339 timestamp from the database.
fn parse_timestamp(
    value: &str,
    column: &str,
) -> std::result::Result<DateTime<Utc>, rusqlite::Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::CorruptedData(format!(
                    "invalid timestamp '{value}' in column '{column}'"
                ))),
            )
        })
}

/// Rebuild an [`Image`] from its four storage columns starting at `offset`.
fn image_from_row(row: &Row<'_>, offset: usize) -> std::result::Result<Image, rusqlite::Error> {
    let url: Option<String> = row.get(offset)?;
    let bytes: Option<Vec<u8>> = row.get(offset + 1)?;
    let filename: Option<String> = row.get(offset + 2)?;
    let mime_type: Option<String> = row.get(offset + 3)?;

    Ok(match (url, bytes) {
        (Some(url), _) => Image::Uploaded { url },
        (None, Some(bytes)) => Image::PendingUpload {
            bytes,
            filename: filename.unwrap_or_else(|| "image".to_string()),
            mime_type: mime_type.unwrap_or_else(|| "application/octet-stream".to_string()),
        },
        (None, None) => Image::Unset,
    })
}

/// Split an [`Image`] into (url, bytes, filename, mime) storage columns.
fn image_columns(
    image: &Image,
) -> (
    Option<&str>,
    Option<&[u8]>,
    Option<&str>,
    Option<&str>,
) {
    match image {
        Image::Unset => (None, None, None, None),
        Image::Uploaded { url } => (Some(url.as_str()), None, None, None),
        Image::PendingUpload {
            bytes,
            filename,
            mime_type,
        } => (
            None,
            Some(bytes.as_slice()),
            Some(filename.as_str()),
            Some(mime_type.as_str()),
        ),
    }
}

fn product_from_row(row: &Row<'_>) -> std::result::Result<Product, rusqlite::Error> {
    Ok(Product {
        id: row.get(0)?,
        name: row.get(1)?,
        price: row.get(2)?,
        description: row.get(3)?,
        barcode: row.get(4)?,
        image: image_from_row(row, 5)?,
    })
}

fn op_from_row(row: &Row<'_>) -> std::result::Result<PendingOperation, rusqlite::Error> {
    let type_str: String = row.get(1)?;
    let queued_str: String = row.get(11)?;

    Ok(PendingOperation {
        id: row.get(0)?,
        op_type: parse_db(&type_str, "type")?,
        product: Product {
            id: row.get(2)?,
            name: row.get(3)?,
            price: row.get(4)?,
            description: row.get(5)?,
            barcode: row.get(6)?,
            image: image_from_row(row, 7)?,
        },
        queued_at: parse_timestamp(&queued_str, "queued_at")?,
    })
}

fn put_product_on(conn: &Connection, product: &Product) -> Result<()> {
    let (url, bytes, filename, mime) = image_columns(&product.image);
    conn.execute(
        "INSERT OR REPLACE INTO products (id, name, price, description, barcode,
         image_url, image_bytes, image_filename, image_mime)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            product.id,
            product.name,
            product.price,
            product.description,
            product.barcode,
            url,
            bytes,
            filename,
            mime,
        ],
    )?;
    Ok(())
}

/// Run schema creation on a database connection.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// SQLite database connection with local store operations.
pub struct Database {
    /// The underlying SQLite connection.
    pub conn: Connection,
}

impl Database {
    /// Open a database connection at the given path, creating and migrating if needed.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Database { conn };
        run_migrations(&db.conn)?;
        Ok(db)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Products
    // ─────────────────────────────────────────────────────────────────────

    /// All cached products, ordered by id.
    pub fn get_all_products(&self) -> Result<Vec<Product>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"))?;
        let products = stmt
            .query_map([], product_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(products)
    }

    pub fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let product = self
            .conn
            .query_row(
                &format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"),
                params![id],
                product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    /// Like [`Database::get_product`] but a missing row is an error.
    pub fn require_product(&self, id: i64) -> Result<Product> {
        self.get_product(id)?.ok_or(Error::ProductNotFound(id))
    }

    pub fn product_exists(&self, id: i64) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM products WHERE id = ?1",
            params![id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Insert or replace a product by id.
    pub fn put_product(&self, product: &Product) -> Result<()> {
        put_product_on(&self.conn, product)
    }

    /// Remove a product. Missing ids are not an error.
    pub fn delete_product(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM products WHERE id = ?1", params![id])?;
        Ok(())
    }

    pub fn clear_products(&self) -> Result<()> {
        self.conn.execute("DELETE FROM products", [])?;
        Ok(())
    }

    /// Insert or replace every product in `products` as one batch.
    pub fn bulk_put_products(&self, products: &[Product]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for product in products {
            put_product_on(&tx, product)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Replace the whole product table with `products`.
    ///
    /// Clear and insert run in one transaction, so readers never observe an
    /// empty table in between.
    pub fn replace_products(&self, products: &[Product]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute("DELETE FROM products", [])?;
        for product in products {
            put_product_on(&tx, product)?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Products whose name, id, price or barcode contains `query`.
    pub fn search_products(&self, query: &str) -> Result<Vec<Product>> {
        let products = self.get_all_products()?;
        Ok(products.into_iter().filter(|p| p.matches(query)).collect())
    }

    /// Exact barcode lookup, as used by scanner input.
    pub fn find_by_barcode(&self, barcode: &str) -> Result<Option<Product>> {
        let product = self
            .conn
            .query_row(
                &format!(
                    "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1 ORDER BY id LIMIT 1"
                ),
                params![barcode.trim()],
                product_from_row,
            )
            .optional()?;
        Ok(product)
    }

    /// A placeholder id for a product created at `now` that no row uses yet.
    pub fn next_temp_id(&self, now: DateTime<Utc>) -> Result<i64> {
        let mut id = temp_id(now);
        while self.product_exists(id)? {
            id -= 1;
        }
        Ok(id)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Pending operations
    // ─────────────────────────────────────────────────────────────────────

    /// Append an operation to the queue and return its sequence id.
    pub fn enqueue_operation(&self, op_type: OpType, product: &Product) -> Result<i64> {
        let (url, bytes, filename, mime) = image_columns(&product.image);
        self.conn.execute(
            "INSERT INTO pending_ops (type, product_id, name, price, description, barcode,
             image_url, image_bytes, image_filename, image_mime, queued_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                op_type.as_str(),
                product.id,
                product.name,
                product.price,
                product.description,
                product.barcode,
                url,
                bytes,
                filename,
                mime,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Queued operations, oldest first.
    pub fn list_operations(&self) -> Result<Vec<PendingOperation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {OP_COLUMNS} FROM pending_ops ORDER BY id"))?;
        let ops = stmt
            .query_map([], op_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ops)
    }

    /// Queued operations targeting `product_id`, oldest first.
    pub fn operations_for_product(&self, product_id: i64) -> Result<Vec<PendingOperation>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {OP_COLUMNS} FROM pending_ops WHERE product_id = ?1 ORDER BY id"
        ))?;
        let ops = stmt
            .query_map(params![product_id], op_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(ops)
    }

    /// Remove one queued operation. Missing ids are not an error.
    pub fn remove_operation(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM pending_ops WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Remove every queued operation targeting `product_id`; returns how many.
    pub fn remove_operations_for_product(&self, product_id: i64) -> Result<usize> {
        let removed = self.conn.execute(
            "DELETE FROM pending_ops WHERE product_id = ?1",
            params![product_id],
        )?;
        Ok(removed)
    }

    pub fn pending_count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pending_ops", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
#[path = "db_tests.rs"]
mod tests;

//! Creates the tables used by the application.

use rusqlite::Connection;

use crate::Error;

/// Create the `penjualan` (sales) table and its index if they do not exist.
///
/// A database written by other tools is left as-is, the queries only rely on
/// the `tanggal`, `amount`, `qty`, `nama_barang`, `status` and `sumber` columns.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS penjualan (
            id INTEGER PRIMARY KEY,
            tanggal TEXT NOT NULL,
            amount REAL NOT NULL,
            qty INTEGER NOT NULL DEFAULT 1,
            nama_barang TEXT,
            status TEXT,
            sumber TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_penjualan_tanggal ON penjualan(tanggal);",
    )?;

    Ok(())
}

//! Database queries for reading and writing sale records.

use std::sync::Mutex;

use rusqlite::{Connection, Row, params_from_iter};

use crate::{
    Error,
    sale::{
        core::SaleRecord,
        filter::{Channel, SalesFilter},
    },
};

/// Gets the sales within the filter's date range, optionally from one channel.
///
/// Only the date part of `tanggal` is compared, so a sale stamped with a time
/// on the last day of the range is included. Channels are matched ignoring
/// case. Records come back in date order, ties in insertion order.
///
/// # Errors
/// Returns [Error::SqlError] if:
/// - the `penjualan` table does not exist,
/// - SQL query preparation or execution fails,
/// - a row has a column that cannot be read as the expected type.
pub fn get_sales(filter: &SalesFilter, connection: &Connection) -> Result<Vec<SaleRecord>, Error> {
    let base_query = "SELECT
            tanggal,
            amount,
            COALESCE(qty, 1),
            nama_barang,
            COALESCE(status, ''),
            sumber
        FROM penjualan
        WHERE substr(tanggal, 1, 10) BETWEEN ?1 AND ?2";

    let mut params = vec![
        filter.date_range.start().to_string(),
        filter.date_range.end().to_string(),
    ];

    let query = match &filter.channel {
        Channel::All => format!("{base_query} ORDER BY tanggal, rowid"),
        Channel::Named(name) => {
            params.push(name.to_lowercase());
            format!("{base_query} AND lower(sumber) = ?3 ORDER BY tanggal, rowid")
        }
    };

    let mut stmt = connection.prepare(&query)?;
    stmt.query_map(params_from_iter(params), map_sale_row)?
        .collect::<Result<Vec<SaleRecord>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Fetch the sales for `filter` from the shared database connection.
///
/// This is the boundary between the handlers and the database: any failure
/// here means there is no data to aggregate.
///
/// # Errors
/// Returns [Error::UpstreamFetch] if the lock cannot be acquired or the
/// query fails.
pub(crate) fn fetch_sales(
    db_connection: &Mutex<Connection>,
    filter: &SalesFilter,
) -> Result<Vec<SaleRecord>, Error> {
    let connection = db_connection
        .lock()
        .map_err(|error| Error::UpstreamFetch(format!("could not acquire database lock: {error}")))?;

    get_sales(filter, &connection)
        .inspect(|sales| tracing::debug!("Fetched {} sales for {filter:?}", sales.len()))
        .map_err(|error| Error::UpstreamFetch(error.to_string()))
}

/// Insert a sale record into the database.
///
/// # Errors
/// Returns [Error::SqlError] if the table does not exist or the insert fails.
pub fn create_sale(record: &SaleRecord, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO penjualan (tanggal, amount, qty, nama_barang, status, sumber)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            &record.date,
            record.amount,
            record.quantity,
            &record.product_name,
            record.status.as_str(),
            &record.channel,
        ),
    )?;

    Ok(())
}

fn map_sale_row(row: &Row) -> Result<SaleRecord, rusqlite::Error> {
    let status: String = row.get(4)?;

    Ok(SaleRecord {
        date: row.get(0)?,
        amount: row.get(1)?,
        quantity: row.get(2)?,
        product_name: row.get(3)?,
        status: status.into(),
        channel: row.get(5)?,
    })
}

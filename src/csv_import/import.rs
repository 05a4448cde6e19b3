//! Loads parsed sales into the database.

use std::time::Instant;

use rusqlite::Connection;

use crate::{
    Error,
    csv_import::csv::ParsedSales,
    db::initialize,
    sale::create_sale,
};

/// The outcome of an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    /// The number of sales written to the database.
    pub imported: usize,
    /// The number of CSV rows that were dropped while parsing.
    pub skipped: usize,
}

/// Replaces the stored sales with `parsed`.
///
/// The existing rows are deleted and the new ones inserted in a single
/// transaction, so a failed import leaves the previous sales in place.
///
/// # Errors
/// Returns [Error::SqlError] if the transaction cannot be started, a sale
/// cannot be inserted or the transaction cannot be committed.
pub fn import_sales(parsed: &ParsedSales, connection: &Connection) -> Result<ImportSummary, Error> {
    let start_time = Instant::now();

    let tx = connection
        .unchecked_transaction()
        .inspect_err(|error| tracing::error!("could not start transaction: {error}"))?;

    initialize(&tx)?;

    let deleted = tx.execute("DELETE FROM penjualan", ())?;

    for sale in &parsed.sales {
        create_sale(sale, &tx)
            .inspect_err(|error| tracing::error!("Failed to import sale {sale:?}: {error}"))?;
    }

    tx.commit()
        .inspect_err(|error| tracing::error!("could not commit transaction: {error}"))?;

    tracing::info!(
        "Replaced {deleted} sales with {} imported sales in {:.1}ms",
        parsed.sales.len(),
        start_time.elapsed().as_secs_f64() * 1000.0
    );

    Ok(ImportSummary {
        imported: parsed.sales.len(),
        skipped: parsed.skipped_rows,
    })
}

//! Functions to parse the `;` separated sales reports exported from the marketplaces.

use time::{
    Date, PrimitiveDateTime, Time, format_description::BorrowedFormatItem,
    macros::format_description,
};

use crate::{
    Error,
    sale::{SaleRecord, SaleStatus},
};

const DAY_FIRST_SLASH_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day padding:none]/[month padding:none]/[year]");
const DAY_FIRST_DASH_FORMAT: &[BorrowedFormatItem] =
    format_description!("[day padding:none]-[month padding:none]-[year]");
const ISO_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem] =
    format_description!("[hour padding:none]:[minute]:[second]");
const TIME_FORMAT_NO_SECONDS: &[BorrowedFormatItem] =
    format_description!("[hour padding:none]:[minute]");
const STORED_DATE_TIME_FORMAT: &[BorrowedFormatItem] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

const DATE_COLUMN: &str = "tanggal";
const AMOUNT_COLUMN: &str = "amount";
const QUANTITY_COLUMN: &str = "qty";
const PRODUCT_COLUMN: &str = "nama_barang";
const STATUS_COLUMN: &str = "status";
const CHANNEL_COLUMN: &str = "sumber";

/// The sales found after parsing a CSV sales report.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSales {
    /// The sales that could be read, in file order.
    pub sales: Vec<SaleRecord>,
    /// The number of rows dropped because the date or amount could not be read.
    pub skipped_rows: usize,
}

/// Parses a sales report with `;` separated columns.
///
/// Header names are trimmed, lowercased and have spaces replaced by
/// underscores, so "Nama Barang" is read as `nama_barang`. The `tanggal` and
/// `amount` columns are required, `qty`, `nama_barang`, `status` and `sumber`
/// are optional.
///
/// Dates are read day first ("31/01/2024" or "31-01-2024", optionally followed
/// by "HH:MM" or "HH:MM:SS"), ISO dates are accepted too. Amounts use "." as
/// the thousands separator and "," as the decimal point. A missing or
/// unreadable quantity counts as one item.
///
/// Rows without a readable date or amount are skipped and counted.
///
/// # Errors
/// Returns [Error::InvalidCSV] if the header cannot be read or a required
/// column is missing.
pub fn parse_sales_csv(text: &str) -> Result<ParsedSales, Error> {
    let text = text.trim_start_matches('\u{FEFF}');

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|error| Error::InvalidCSV(format!("could not read the header: {error}")))?
        .iter()
        .map(normalize_column_name)
        .collect();

    let column = |name: &str| headers.iter().position(|header| header == name);
    let required_column = |name: &str| {
        column(name).ok_or_else(|| Error::InvalidCSV(format!("missing the column '{name}'")))
    };

    let date_column = required_column(DATE_COLUMN)?;
    let amount_column = required_column(AMOUNT_COLUMN)?;
    let quantity_column = column(QUANTITY_COLUMN);
    let product_column = column(PRODUCT_COLUMN);
    let status_column = column(STATUS_COLUMN);
    let channel_column = column(CHANNEL_COLUMN);

    let mut sales = Vec::new();
    let mut skipped_rows = 0;

    for (row_number, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(error) => {
                tracing::warn!("Skipping malformed CSV row {}: {error}", row_number + 1);
                skipped_rows += 1;
                continue;
            }
        };

        let field = |index: Option<usize>| {
            index
                .and_then(|index| record.get(index))
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let date = field(Some(date_column)).and_then(parse_date_time);
        let amount = field(Some(amount_column)).and_then(parse_amount);

        let (Some(date), Some(amount)) = (date, amount) else {
            tracing::debug!(
                "Skipping CSV row {} without a readable date or amount: {:?}",
                row_number + 1,
                record
            );
            skipped_rows += 1;
            continue;
        };

        let quantity = field(quantity_column)
            .and_then(|quantity| quantity.parse().ok())
            .unwrap_or(1);

        sales.push(SaleRecord {
            date,
            amount,
            quantity,
            product_name: field(product_column).map(str::to_owned),
            status: field(status_column)
                .map(SaleStatus::from)
                .unwrap_or_else(|| SaleStatus::Other(String::new())),
            channel: field(channel_column).map(str::to_owned),
        });
    }

    tracing::debug!(
        "Parsed {} sales from CSV, skipped {skipped_rows} rows",
        sales.len()
    );

    Ok(ParsedSales {
        sales,
        skipped_rows,
    })
}

fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

/// Reads a day first or ISO date with an optional time and formats it as
/// "YYYY-MM-DD HH:MM:SS".
fn parse_date_time(text: &str) -> Option<String> {
    let (date_text, time_text) = match text.split_once([' ', 'T']) {
        Some((date_text, time_text)) => (date_text, time_text.trim()),
        None => (text, ""),
    };

    let date = [
        DAY_FIRST_SLASH_FORMAT,
        DAY_FIRST_DASH_FORMAT,
        ISO_DATE_FORMAT,
    ]
    .into_iter()
    .find_map(|format| Date::parse(date_text, format).ok())?;

    let time = if time_text.is_empty() {
        Time::MIDNIGHT
    } else {
        [TIME_FORMAT, TIME_FORMAT_NO_SECONDS]
            .into_iter()
            .find_map(|format| Time::parse(time_text, format).ok())?
    };

    PrimitiveDateTime::new(date, time)
        .format(STORED_DATE_TIME_FORMAT)
        .ok()
}

/// Reads an amount like "1.250.000" or "1.250,50".
fn parse_amount(text: &str) -> Option<f64> {
    let normalized = text.replace('.', "").replace(',', ".");

    normalized
        .parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
}

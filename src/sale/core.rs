//! The sale record read from the database and its status tag.

use serde::{Deserialize, Serialize};
use time::{
    Date, Time, UtcOffset, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::Error;

/// The date part of a sale's `tanggal` field.
pub(crate) const DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[BorrowedFormatItem] = format_description!("[hour]:[minute]:[second]");
const TIME_FORMAT_NO_SECONDS: &[BorrowedFormatItem] = format_description!("[hour]:[minute]");
const OFFSET_FORMAT: &[BorrowedFormatItem] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");
const OFFSET_FORMAT_NO_COLON: &[BorrowedFormatItem] =
    format_description!("[offset_hour sign:mandatory][offset_minute]");

/// The status tag of a sale.
///
/// Only completed sales and returns are counted separately, every other tag
/// (e.g. "CANCELLED", "SHIPPING") is kept as [SaleStatus::Other].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SaleStatus {
    /// The sale went through: "COMPLETED".
    Completed,
    /// The items were sent back: "RETURN".
    Return,
    /// Any other status tag, stored as given.
    Other(String),
}

impl SaleStatus {
    /// The status tag as it is stored in the database.
    pub fn as_str(&self) -> &str {
        match self {
            SaleStatus::Completed => "COMPLETED",
            SaleStatus::Return => "RETURN",
            SaleStatus::Other(tag) => tag,
        }
    }
}

impl From<&str> for SaleStatus {
    fn from(value: &str) -> Self {
        match value {
            "COMPLETED" => SaleStatus::Completed,
            "RETURN" => SaleStatus::Return,
            other => SaleStatus::Other(other.to_owned()),
        }
    }
}

impl From<String> for SaleStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "COMPLETED" => SaleStatus::Completed,
            "RETURN" => SaleStatus::Return,
            _ => SaleStatus::Other(value),
        }
    }
}

impl From<SaleStatus> for String {
    fn from(value: SaleStatus) -> Self {
        match value {
            SaleStatus::Other(tag) => tag,
            status => status.as_str().to_owned(),
        }
    }
}

/// A single sale transaction.
///
/// The serialized field names match the `penjualan` table and the JSON
/// returned by the sales endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    /// When the sale happened, as an ISO-8601 date or date-time string.
    ///
    /// The text is kept as-is so that unreadable dates are reported when the
    /// records are aggregated.
    #[serde(rename = "tanggal")]
    pub date: String,
    /// The value of the sale.
    pub amount: f64,
    /// How many items were sold.
    #[serde(rename = "qty")]
    pub quantity: u32,
    /// The name of the product sold, if recorded.
    #[serde(rename = "nama_barang")]
    pub product_name: Option<String>,
    /// The status of the sale.
    pub status: SaleStatus,
    /// The marketplace the sale came from, e.g. "Shopee".
    #[serde(rename = "sumber")]
    pub channel: Option<String>,
}

impl SaleRecord {
    /// Create a completed sale of one item with no product or channel.
    ///
    /// Use the builder-style methods to fill in the rest.
    pub fn new(date: &str, amount: f64) -> Self {
        Self {
            date: date.to_owned(),
            amount,
            quantity: 1,
            product_name: None,
            status: SaleStatus::Completed,
            channel: None,
        }
    }

    /// Set the number of items sold.
    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Set the name of the product sold.
    pub fn product(mut self, product_name: &str) -> Self {
        self.product_name = Some(product_name.to_owned());
        self
    }

    /// Set the status of the sale.
    pub fn status(mut self, status: SaleStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the marketplace the sale came from.
    pub fn channel(mut self, channel: &str) -> Self {
        self.channel = Some(channel.to_owned());
        self
    }
}

/// Read the calendar day from a sale date.
///
/// Accepts "YYYY-MM-DD", optionally followed by a space or 'T' and a time
/// "HH:MM" or "HH:MM:SS[.fraction]", which may end with "Z" or a "+HH:MM" /
/// "-HH:MM" offset. The time is only checked, the day is taken as written.
///
/// # Errors
/// Returns [Error::InvalidDate] if `text` is not in one of those forms.
pub(crate) fn parse_sale_date(text: &str) -> Result<Date, Error> {
    let invalid = || Error::InvalidDate(text.to_owned());
    let trimmed = text.trim();

    let (date_text, time_text) = match trimmed.find([' ', 'T']) {
        Some(index) => (&trimmed[..index], Some(trimmed[index + 1..].trim_start())),
        None => (trimmed, None),
    };

    let date = Date::parse(date_text, DATE_FORMAT).map_err(|_| invalid())?;

    match time_text {
        Some(time_text) if !is_valid_time(time_text) => Err(invalid()),
        _ => Ok(date),
    }
}

fn is_valid_time(text: &str) -> bool {
    let (clock, offset) = split_offset(text);

    if offset.is_some_and(|offset| !is_valid_offset(offset)) {
        return false;
    }

    match clock.split_once('.') {
        Some((hms, fraction)) => {
            !fraction.is_empty()
                && fraction.bytes().all(|byte| byte.is_ascii_digit())
                && Time::parse(hms, TIME_FORMAT).is_ok()
        }
        None => {
            Time::parse(clock, TIME_FORMAT).is_ok()
                || Time::parse(clock, TIME_FORMAT_NO_SECONDS).is_ok()
        }
    }
}

/// Splits "10:15:00+07:00" into the clock time and its UTC offset suffix.
fn split_offset(text: &str) -> (&str, Option<&str>) {
    if let Some(clock) = text.strip_suffix('Z') {
        return (clock, Some("Z"));
    }

    match text.rfind(['+', '-']) {
        Some(index) => (&text[..index], Some(&text[index..])),
        None => (text, None),
    }
}

fn is_valid_offset(offset: &str) -> bool {
    offset == "Z"
        || UtcOffset::parse(offset, OFFSET_FORMAT).is_ok()
        || UtcOffset::parse(offset, OFFSET_FORMAT_NO_COLON).is_ok()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{SaleRecord, SaleStatus, parse_sale_date};
    use crate::Error;

    #[test]
    fn parses_plain_date() {
        assert_eq!(parse_sale_date("2024-03-05"), Ok(date!(2024 - 03 - 05)));
    }

    #[test]
    fn parses_date_time_with_space() {
        assert_eq!(
            parse_sale_date("2024-03-05 23:59:59"),
            Ok(date!(2024 - 03 - 05))
        );
    }

    #[test]
    fn parses_iso_date_time_with_zone() {
        assert_eq!(
            parse_sale_date("2024-12-31T10:15:00.000Z"),
            Ok(date!(2024 - 12 - 31))
        );
    }

    #[test]
    fn parses_date_time_without_seconds() {
        assert_eq!(
            parse_sale_date("2024-12-31 10:15"),
            Ok(date!(2024 - 12 - 31))
        );
    }

    #[test]
    fn parses_iso_date_time_without_seconds_with_zone() {
        assert_eq!(
            parse_sale_date("2024-01-01T10:15Z"),
            Ok(date!(2024 - 01 - 01))
        );
        assert_eq!(
            parse_sale_date("2024-01-01T10:15+07:00"),
            Ok(date!(2024 - 01 - 01))
        );
    }

    #[test]
    fn parses_date_time_with_offset() {
        assert_eq!(
            parse_sale_date("2024-01-01T10:15:00+07:00"),
            Ok(date!(2024 - 01 - 01))
        );
        assert_eq!(
            parse_sale_date("2024-01-01T23:30:00.5-0300"),
            Ok(date!(2024 - 01 - 01))
        );
    }

    #[test]
    fn rejects_trailing_text_after_time() {
        assert_eq!(
            parse_sale_date("2024-01-01 10:15:00garbage"),
            Err(Error::InvalidDate("2024-01-01 10:15:00garbage".to_owned()))
        );
        assert!(parse_sale_date("2024-01-01T10:15:00.Z").is_err());
        assert!(parse_sale_date("2024-01-01T10:15:00+7").is_err());
    }

    #[test]
    fn rejects_day_first_date() {
        assert_eq!(
            parse_sale_date("31/12/2024"),
            Err(Error::InvalidDate("31/12/2024".to_owned()))
        );
    }

    #[test]
    fn rejects_impossible_date() {
        assert!(parse_sale_date("2024-02-30").is_err());
    }

    #[test]
    fn rejects_garbage_time() {
        assert!(parse_sale_date("2024-02-03 noon").is_err());
    }

    #[test]
    fn rejects_empty_string() {
        assert!(parse_sale_date("").is_err());
    }

    #[test]
    fn status_matches_exact_tags() {
        assert_eq!(SaleStatus::from("COMPLETED"), SaleStatus::Completed);
        assert_eq!(SaleStatus::from("RETURN"), SaleStatus::Return);
        assert_eq!(
            SaleStatus::from("completed"),
            SaleStatus::Other("completed".to_owned())
        );
        assert_eq!(
            SaleStatus::from("CANCELLED"),
            SaleStatus::Other("CANCELLED".to_owned())
        );
    }

    #[test]
    fn status_round_trips_through_string() {
        let tag: String = SaleStatus::Other("SHIPPING".to_owned()).into();
        assert_eq!(tag, "SHIPPING");

        let tag: String = SaleStatus::Return.into();
        assert_eq!(tag, "RETURN");
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let record = SaleRecord::new("2024-01-01 00:00:00", 150_000.0)
            .quantity(2)
            .product("Kaos Polos")
            .status(SaleStatus::Return)
            .channel("Shopee");

        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "tanggal": "2024-01-01 00:00:00",
                "amount": 150_000.0,
                "qty": 2,
                "nama_barang": "Kaos Polos",
                "status": "RETURN",
                "sumber": "Shopee",
            })
        );
    }

    #[test]
    fn deserializes_from_wire_json() {
        let json = r#"{
            "tanggal": "2024-02-10 00:00:00",
            "amount": 99000,
            "qty": 3,
            "nama_barang": null,
            "status": "PACKED",
            "sumber": "tokopedia"
        }"#;

        let record: SaleRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.date, "2024-02-10 00:00:00");
        assert_eq!(record.amount, 99_000.0);
        assert_eq!(record.quantity, 3);
        assert_eq!(record.product_name, None);
        assert_eq!(record.status, SaleStatus::Other("PACKED".to_owned()));
        assert_eq!(record.channel.as_deref(), Some("tokopedia"));
    }
}

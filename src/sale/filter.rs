//! The date range and channel used to select sale records.

use std::ops::RangeInclusive;

use serde::Deserialize;
use time::{Date, Month};

use crate::{Error, sale::core::DATE_FORMAT};

/// The value of the channel parameter that selects every channel.
pub const ALL_CHANNELS: &str = "all";

/// Which sales channel (marketplace) to include.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    /// Sales from every channel.
    All,
    /// Sales from one channel, stored in lowercase.
    Named(String),
}

impl Channel {
    /// Parse a channel name, ignoring case.
    ///
    /// "all" (in any case) and blank strings select every channel.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();

        if name.is_empty() || name.eq_ignore_ascii_case(ALL_CHANNELS) {
            Channel::All
        } else {
            Channel::Named(name.to_lowercase())
        }
    }

    /// The channel as a query parameter value.
    pub fn as_str(&self) -> &str {
        match self {
            Channel::All => ALL_CHANNELS,
            Channel::Named(name) => name,
        }
    }
}

/// The query parameters accepted by the sales routes.
///
/// All parameters are optional, see [SalesFilter::from_query] for the defaults.
#[derive(Debug, Default, Deserialize)]
pub struct SalesQuery {
    /// The first day to include, "YYYY-MM-DD".
    pub start: Option<String>,
    /// The last day to include, "YYYY-MM-DD".
    pub end: Option<String>,
    /// The channel to include, or "all".
    pub sumber: Option<String>,
}

/// Selects the sale records to aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SalesFilter {
    /// The days to include, both ends inclusive.
    pub date_range: RangeInclusive<Date>,
    /// The channel to include.
    pub channel: Channel,
}

impl SalesFilter {
    /// Build a filter from the query parameters of a request.
    ///
    /// A missing or blank `start` defaults to the first of January and a
    /// missing or blank `end` to the 31st of December of the year containing
    /// `today`. A missing channel selects every channel.
    ///
    /// # Errors
    /// Returns [Error::InvalidFilterDate] if a date is not "YYYY-MM-DD", or
    /// [Error::InvalidDateRange] if the start date is after the end date.
    pub fn from_query(query: &SalesQuery, today: Date) -> Result<Self, Error> {
        let year_start = Date::from_calendar_date(today.year(), Month::January, 1)
            .map_err(|error| Error::InvalidFilterDate(error.to_string()))?;
        let year_end = Date::from_calendar_date(today.year(), Month::December, 31)
            .map_err(|error| Error::InvalidFilterDate(error.to_string()))?;

        let start = parse_filter_date(query.start.as_deref())?.unwrap_or(year_start);
        let end = parse_filter_date(query.end.as_deref())?.unwrap_or(year_end);

        if start > end {
            return Err(Error::InvalidDateRange { start, end });
        }

        let channel = query
            .sumber
            .as_deref()
            .map(Channel::parse)
            .unwrap_or(Channel::All);

        Ok(Self {
            date_range: start..=end,
            channel,
        })
    }
}

fn parse_filter_date(text: Option<&str>) -> Result<Option<Date>, Error> {
    match text.map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => Date::parse(text, DATE_FORMAT)
            .map(Some)
            .map_err(|_| Error::InvalidFilterDate(text.to_owned())),
    }
}

//! Importing sales from the CSV reports exported by the marketplaces.

mod csv;
mod import;

pub use csv::{ParsedSales, parse_sales_csv};
pub use import::{ImportSummary, import_sales};

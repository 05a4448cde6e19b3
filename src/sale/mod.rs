//! Sale records: the record type, the filter that selects them, the database
//! queries, and the JSON endpoint that serves them.

mod core;
mod endpoint;
mod filter;
mod query;

pub use self::core::{SaleRecord, SaleStatus};
pub use endpoint::get_sales_endpoint;
pub use filter::{Channel, SalesFilter, SalesQuery};
pub use query::{create_sale, get_sales};

pub(crate) use self::core::parse_sale_date;
pub(crate) use query::fetch_sales;

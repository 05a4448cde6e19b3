//! Dashboard module
//!
//! Aggregates the filtered sales into daily, monthly, yearly, product and status
//! views and presents them as a JSON summary or as an HTML page with charts.

mod aggregation;
mod charts;
mod handlers;
mod tables;

pub use aggregation::{
    DailyTotal, PeriodTotals, ProductQuantity, SalesSummary, StatusSummary, UNKNOWN_PRODUCT_LABEL,
    aggregate,
};
pub use handlers::{data_unavailable_view, get_dashboard_page, get_summary_endpoint};

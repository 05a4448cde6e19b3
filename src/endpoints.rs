//! The API endpoints URIs.

/// The root route which redirects to the dashboard.
pub const ROOT: &str = "/";
/// The page with the sales charts and tables.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The route for getting the filtered sale records as JSON.
pub const SALES_API: &str = "/penjualan";
/// The route for getting the aggregated sales as JSON.
pub const SUMMARY_API: &str = "/api/summary";

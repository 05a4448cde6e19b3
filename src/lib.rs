//! Sales Dashboard is a web app for reporting on marketplace sales.
//!
//! This library filters sale records stored in SQLite by date range and
//! sales channel, aggregates them into daily, monthly, yearly, per-product and
//! per-status views, and serves those views as JSON and as an HTML dashboard.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use time::Date;
use tokio::signal;

mod app_state;
mod csv_import;
mod dashboard;
mod db;
mod endpoints;
mod html;
mod internal_server_error;
mod logging;
mod not_found;
mod routing;
mod sale;

pub use app_state::{AppState, DEFAULT_CHANNELS};
pub use csv_import::{ImportSummary, ParsedSales, import_sales, parse_sales_csv};
pub use dashboard::{
    DailyTotal, PeriodTotals, ProductQuantity, SalesSummary, StatusSummary, UNKNOWN_PRODUCT_LABEL,
    aggregate,
};
pub use db::initialize as initialize_db;
pub use logging::logging_middleware;
pub use routing::build_router;
pub use sale::{
    Channel, SaleRecord, SaleStatus, SalesFilter, SalesQuery, create_sale, get_sales,
};

use crate::{dashboard::data_unavailable_view, internal_server_error::InternalServerError};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A sale record could not be aggregated.
    ///
    /// `position` is the zero-based index of the offending record in the
    /// list given to [aggregate]. Aggregation stops at the first such record
    /// and no partial summary is returned.
    #[error("sale record #{position} is invalid: {reason}")]
    InvalidRecord {
        /// The index of the record in the input list.
        position: usize,
        /// Why the record was rejected.
        reason: String,
    },

    /// A string could not be read as a sale date.
    #[error("could not parse \"{0}\" as a date")]
    InvalidDate(String),

    /// The sale records could not be fetched from the database.
    ///
    /// The error string should only be logged for debugging on the server.
    /// Clients get a generic "data unavailable" message instead.
    #[error("could not fetch sales: {0}")]
    UpstreamFetch(String),

    /// A date given in the dashboard filter could not be parsed.
    #[error("the filter date \"{0}\" is not a valid YYYY-MM-DD date")]
    InvalidFilterDate(String),

    /// The start of the filter's date range comes after its end.
    #[error("the start date {start} is after the end date {end}")]
    InvalidDateRange {
        /// The first day of the requested range.
        start: Date,
        /// The last day of the requested range.
        end: Date,
    },

    /// The CSV had issues that prevented it from being parsed.
    #[error("Could not parse the CSV file: {0}")]
    InvalidCSV(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {}", value);
        Error::SqlError(value)
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::UpstreamFetch(reason) => {
                tracing::error!("Sales data unavailable: {reason}");
                (StatusCode::SERVICE_UNAVAILABLE, data_unavailable_view()).into_response()
            }
            Error::InvalidFilterDate(_) | Error::InvalidDateRange { .. } => {
                let fix = self.to_string();
                InternalServerError {
                    description: "Invalid filter",
                    fix: &fix,
                }
                .into_response_with_status(StatusCode::BAD_REQUEST)
            }
            Error::InvalidRecord { .. } => {
                tracing::error!("Could not aggregate sales: {self}");
                InternalServerError {
                    description: "Some sale records are invalid",
                    fix: "Check the imported sales data. The server logs name the first bad record.",
                }
                .into_response()
            }
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// The HTTP status code to use when reporting this error to a client.
    fn status_code(&self) -> StatusCode {
        match self {
            Error::UpstreamFetch(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::InvalidFilterDate(_) | Error::InvalidDateRange { .. } => {
                StatusCode::BAD_REQUEST
            }
            Error::InvalidRecord { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Render the error as a JSON object `{"error": "..."}` for API routes.
    fn into_json_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            Error::UpstreamFetch(reason) => {
                tracing::error!("Sales data unavailable: {reason}");
                "Database error".to_owned()
            }
            Error::InvalidFilterDate(_)
            | Error::InvalidDateRange { .. }
            | Error::InvalidRecord { .. } => self.to_string(),
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                "Internal server error".to_owned()
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

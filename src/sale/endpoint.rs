//! The JSON endpoint that returns the filtered sale records.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState,
    sale::{
        fetch_sales,
        filter::{SalesFilter, SalesQuery},
    },
};

/// The state needed for reading sale records.
#[derive(Debug, Clone)]
pub struct SalesState {
    /// The database connection holding the sales table.
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SalesState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Route handler that returns the sales matching the `start`, `end` and
/// `sumber` query parameters as a JSON array.
///
/// Responds with 400 for an invalid filter and 503 if the sales could not be
/// read from the database.
pub async fn get_sales_endpoint(
    State(state): State<SalesState>,
    Query(query): Query<SalesQuery>,
) -> Response {
    let today = OffsetDateTime::now_utc().date();

    let filter = match SalesFilter::from_query(&query, today) {
        Ok(filter) => filter,
        Err(error) => return error.into_json_response(),
    };

    match fetch_sales(&state.db_connection, &filter) {
        Ok(sales) => Json(sales).into_response(),
        Err(error) => error.into_json_response(),
    }
}

//! Dashboard HTTP handlers and view rendering.
//!
//! This module contains:
//! - Route handlers for the dashboard page and the JSON summary
//! - HTML view functions for rendering the dashboard UI
//! - The state type used by the handlers

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    dashboard::{
        aggregation::{SalesSummary, aggregate},
        charts::{
            DashboardChart, charts_script, charts_view, daily_sales_chart, monthly_sales_chart,
            products_chart,
        },
        tables::{monthly_summary_table, summary_statistics_view, yearly_summary_table},
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, ECHARTS_SCRIPT_URL, FORM_LABEL_STYLE, FORM_TEXT_INPUT_STYLE,
        HeadElement, PAGE_CONTAINER_STYLE, base,
    },
    sale::{Channel, SalesFilter, SalesQuery, fetch_sales},
};

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The database connection for reading sales.
    pub db_connection: Arc<Mutex<Connection>>,
    /// The display names of the channels offered in the filter form.
    pub channels: Vec<String>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            channels: state.channels.clone(),
        }
    }
}

/// Display a page with charts and tables for the sales matching the query.
///
/// The sales are fetched and the database lock released before the sales are
/// aggregated.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Query(query): Query<SalesQuery>,
) -> Result<Response, Error> {
    let today = OffsetDateTime::now_utc().date();
    let filter = SalesFilter::from_query(&query, today)?;
    let sales = fetch_sales(&state.db_connection, &filter)?;

    let filter_form = filter_form_view(&filter, &state.channels);

    if sales.is_empty() {
        return Ok(dashboard_no_data_view(&filter_form).into_response());
    }

    let summary = aggregate(&sales)?;
    let charts = build_dashboard_charts(&summary);

    Ok(dashboard_view(&filter_form, &summary, &charts).into_response())
}

/// Return the aggregated sales matching the query as JSON.
pub async fn get_summary_endpoint(
    State(state): State<DashboardState>,
    Query(query): Query<SalesQuery>,
) -> Response {
    let today = OffsetDateTime::now_utc().date();
    let summary = SalesFilter::from_query(&query, today)
        .and_then(|filter| fetch_sales(&state.db_connection, &filter))
        .and_then(|sales| aggregate(&sales));

    match summary {
        Ok(summary) => Json(summary).into_response(),
        Err(error) => error.into_json_response(),
    }
}

/// Creates the dashboard charts from the aggregated sales.
///
/// The chart options are serialized to JSON for ECharts consumption.
fn build_dashboard_charts(summary: &SalesSummary) -> [DashboardChart; 3] {
    [
        DashboardChart {
            id: "daily-sales-chart",
            options: daily_sales_chart(&summary.daily).to_string(),
        },
        DashboardChart {
            id: "monthly-sales-chart",
            options: monthly_sales_chart(&summary.monthly).to_string(),
        },
        DashboardChart {
            id: "products-chart",
            options: products_chart(&summary.products).to_string(),
        },
    ]
}

/// Renders the form for choosing the date range and channel.
///
/// The form submits back to the dashboard with a GET request so the current
/// filter is kept in the URL.
fn filter_form_view(filter: &SalesFilter, channels: &[String]) -> Markup {
    let selected = filter.channel.as_str();

    html! {
        form
            id="sales-filter"
            method="get"
            action=(endpoints::DASHBOARD_VIEW)
            class="w-full mb-4 grid grid-cols-1 md:grid-cols-4 gap-4 items-end"
        {
            div {
                label for="start" class=(FORM_LABEL_STYLE) { "Start date" }
                input
                    type="date"
                    id="start"
                    name="start"
                    value=(filter.date_range.start().to_string())
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div {
                label for="end" class=(FORM_LABEL_STYLE) { "End date" }
                input
                    type="date"
                    id="end"
                    name="end"
                    value=(filter.date_range.end().to_string())
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div {
                label for="sumber" class=(FORM_LABEL_STYLE) { "Channel" }
                select id="sumber" name="sumber" class=(FORM_TEXT_INPUT_STYLE) {
                    option value=(Channel::All.as_str()) selected[filter.channel == Channel::All] {
                        "All"
                    }

                    @for channel in channels {
                        @let value = channel.to_lowercase();
                        option value=(value) selected[value == selected] { (channel) }
                    }
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE) { "Apply" }
        }
    }
}

/// Renders the dashboard page when no sales match the filter.
fn dashboard_no_data_view(filter_form: &Markup) -> Markup {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-2xl font-bold mb-4" { "Sales Dashboard" }

            (filter_form)

            div id="no-sales" class="flex flex-col items-center"
            {
                h2 class="text-xl font-bold"
                {
                    "No sales found"
                }

                p
                {
                    "There are no sales for the selected dates and channel.
                    Try a wider date range or another channel."
                }
            }
        }
    );

    base("Dashboard", &[], &content)
}

/// Renders the page shown when the sales could not be fetched.
///
/// This is kept separate from the no sales page so that a database failure
/// is never mistaken for a period with zero sales.
pub fn data_unavailable_view() -> Markup {
    let content = html!(
        div class=(PAGE_CONTAINER_STYLE)
        {
            div id="data-unavailable" class="flex flex-col items-center"
            {
                h2 class="text-xl font-bold"
                {
                    "Sales data unavailable"
                }

                p
                {
                    "The sales could not be loaded from the database. Try again later."
                }

                a
                    href=(endpoints::DASHBOARD_VIEW)
                    class="text-blue-600 hover:underline dark:text-blue-500 mt-4"
                {
                    "Reload the dashboard"
                }
            }
        }
    );

    base("Data Unavailable", &[], &content)
}

/// Renders the main dashboard page with the filter form, charts and tables.
fn dashboard_view(
    filter_form: &Markup,
    summary: &SalesSummary,
    charts: &[DashboardChart],
) -> Markup {
    let content = html!(
        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            h1 class="text-2xl font-bold mb-4" { "Sales Dashboard" }

            (filter_form)
            (summary_statistics_view(summary))
            (charts_view(charts))

            div class="grid grid-cols-1 xl:grid-cols-2 gap-4 w-full"
            {
                (monthly_summary_table(&summary.monthly))
                (yearly_summary_table(&summary.yearly))
            }
        }
    );

    let scripts = [
        HeadElement::ScriptLink(ECHARTS_SCRIPT_URL.to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}

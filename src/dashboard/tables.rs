//! Table views for dashboard data display.
//!
//! Provides HTML components for the sales summary and the monthly and yearly rollups.

use std::collections::BTreeMap;

use maud::{Markup, html};

use crate::{
    dashboard::aggregation::{PeriodTotals, SalesSummary},
    html::{TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, millions_with_tooltip},
};

const TABLE_HEADER_CELL_STYLE: &str = "px-6 py-3";
const TABLE_NUMBER_CELL_STYLE: &str = "text-right whitespace-nowrap";
const STAT_LABEL_STYLE: &str = "text-sm text-gray-500 dark:text-gray-400";
const STAT_VALUE_STYLE: &str = "text-2xl font-bold text-gray-900 dark:text-white";

/// Renders the headline numbers for the selected sales.
pub(super) fn summary_statistics_view(summary: &SalesSummary) -> Markup {
    let status = &summary.status;

    html! {
        section id="summary-statistics" class="w-full mb-4" {
            h3 class="text-xl font-semibold mb-4" { "Summary" }

            dl class="grid grid-cols-2 lg:grid-cols-4 gap-4" {
                div class="p-4 rounded-lg shadow bg-white dark:bg-gray-800" {
                    dt class=(STAT_LABEL_STYLE) { "Total sales" }
                    dd class=(STAT_VALUE_STYLE) { (millions_with_tooltip(summary.total_amount())) }
                }

                div class="p-4 rounded-lg shadow bg-white dark:bg-gray-800" {
                    dt class=(STAT_LABEL_STYLE) { "Items sold" }
                    dd class=(STAT_VALUE_STYLE) { (status.total_quantity_sold) }
                }

                div class="p-4 rounded-lg shadow bg-white dark:bg-gray-800" {
                    dt class=(STAT_LABEL_STYLE) { "Completed" }
                    dd class={(STAT_VALUE_STYLE) " text-green-600 dark:text-green-400"} {
                        (status.completed_count)
                    }
                }

                div class="p-4 rounded-lg shadow bg-white dark:bg-gray-800" {
                    dt class=(STAT_LABEL_STYLE) { "Returned" }
                    dd class={(STAT_VALUE_STYLE) " text-red-600 dark:text-red-400"} {
                        (status.return_count)
                    }
                }
            }
        }
    }
}

/// Renders a table with one row per month.
pub(super) fn monthly_summary_table(monthly: &BTreeMap<String, PeriodTotals>) -> Markup {
    period_table("monthly-summary-table", "Monthly Summary", "Month", monthly)
}

/// Renders a table with one row per year.
pub(super) fn yearly_summary_table(yearly: &BTreeMap<String, PeriodTotals>) -> Markup {
    period_table("yearly-summary-table", "Yearly Summary", "Year", yearly)
}

fn period_table(
    id: &str,
    title: &str,
    period_label: &str,
    periods: &BTreeMap<String, PeriodTotals>,
) -> Markup {
    if periods.is_empty() {
        return html! {};
    }

    html! {
        div class="w-full mb-4" {
            h3 class="text-xl font-semibold mb-4" { (title) }

            div id=(id) class="overflow-x-auto rounded-lg shadow" {
                table class="w-full text-sm text-left text-gray-500 dark:text-gray-400" {
                    thead class=(TABLE_HEADER_STYLE) {
                        tr {
                            th scope="col" class=(TABLE_HEADER_CELL_STYLE) { (period_label) }
                            th scope="col" class={(TABLE_HEADER_CELL_STYLE) " text-right"} { "Total" }
                            th scope="col" class={(TABLE_HEADER_CELL_STYLE) " text-right"} { "Items" }
                            th scope="col" class={(TABLE_HEADER_CELL_STYLE) " text-right"} { "Completed" }
                            th scope="col" class={(TABLE_HEADER_CELL_STYLE) " text-right"} { "Returned" }
                        }
                    }
                    tbody {
                        @for (period, totals) in periods {
                            tr class=(TABLE_ROW_STYLE) {
                                th scope="row" class={(TABLE_CELL_STYLE) " font-medium text-gray-900 dark:text-white"} {
                                    (period)
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_NUMBER_CELL_STYLE)} {
                                    (millions_with_tooltip(totals.total_amount))
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_NUMBER_CELL_STYLE)} {
                                    (totals.total_quantity)
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_NUMBER_CELL_STYLE)} {
                                    (totals.completed_count)
                                }
                                td class={(TABLE_CELL_STYLE) " " (TABLE_NUMBER_CELL_STYLE)} {
                                    (totals.return_count)
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

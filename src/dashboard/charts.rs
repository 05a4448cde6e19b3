//! Chart generation and rendering for the dashboard.
//!
//! This module creates interactive ECharts visualizations for sales data:
//! - **Daily Sales Chart**: Total sold per day, in millions
//! - **Monthly Sales Chart**: Total sold per month in millions next to the number of items sold
//! - **Best Selling Products Chart**: Share of items sold per product
//!
//! Each chart is generated as JSON configuration for the ECharts library and
//! rendered with corresponding HTML containers and JavaScript initialization code.

use std::collections::BTreeMap;

use charming::{
    Chart,
    component::{Axis, Grid, Legend, Title},
    element::{AxisLabel, AxisPointer, AxisPointerType, AxisType, JsFunction, Tooltip, Trigger},
    series::{Bar, Line, Pie},
};
use maud::{Markup, PreEscaped, html};

use crate::{
    dashboard::aggregation::{DailyTotal, PeriodTotals, ProductQuantity},
    html::{HeadElement, to_millions},
};

/// A dashboard chart with its HTML container ID and ECharts configuration.
pub(super) struct DashboardChart {
    /// The HTML element ID to use for the chart (kebab-case)
    pub id: &'static str,
    /// The ECharts configuration as a JSON string
    pub options: String,
}

/// Renders the HTML containers for dashboard charts.
pub(super) fn charts_view(charts: &[DashboardChart]) -> Markup {
    html!(
        section
            id="charts"
            class="w-full mx-auto mb-4"
        {
            div class="grid grid-cols-1 xl:grid-cols-2 gap-4"
            {
                @for chart in charts {
                    div
                        id=(chart.id)
                        class="min-h-[380px] rounded bg-white dark:bg-gray-100"
                    {}
                }
            }
        }
    )
}

/// Generates JavaScript initialization code for dashboard charts.
///
/// Creates scripts that initialize ECharts instances with dark mode support
/// and responsive resizing.
pub(super) fn charts_script(charts: &[DashboardChart]) -> HeadElement {
    let script_content = charts
        .iter()
        .map(|chart| {
            format!(
                r#"(function() {{
                    const chartDom = document.getElementById("{}");
                    const chart = echarts.init(chartDom);
                    const option = {};
                    chart.setOption(option);

                    window.addEventListener('resize', chart.resize);
                }})();"#,
                chart.id,
                escape_script_text(&chart.options)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let wrapped_script = format!(
        "document.addEventListener('DOMContentLoaded', function() {{\n{}\n}});",
        script_content
    );

    HeadElement::ScriptSource(PreEscaped(wrapped_script))
}

/// Escapes `</` so text taken from sale records (e.g. product names) cannot
/// close the surrounding `<script>` element. Inside a JSON string `<\/` reads
/// back as `</`.
fn escape_script_text(json: &str) -> String {
    json.replace("</", "<\\/")
}

pub(super) fn daily_sales_chart(daily: &[DailyTotal]) -> Chart {
    let labels: Vec<String> = daily.iter().map(|total| total.day.to_string()).collect();
    let values: Vec<f64> = daily
        .iter()
        .map(|total| to_millions(total.total_amount))
        .collect();

    Chart::new()
        .title(Title::new().text("Daily Sales").subtext("In millions of rupiah"))
        .tooltip(millions_tooltip())
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .axis_label(AxisLabel::new().formatter(millions_formatter())),
        )
        .series(Line::new().name("Total").data(values))
}

pub(super) fn monthly_sales_chart(monthly: &BTreeMap<String, PeriodTotals>) -> Chart {
    let labels: Vec<String> = monthly.keys().cloned().collect();
    let totals: Vec<f64> = monthly
        .values()
        .map(|month| to_millions(month.total_amount))
        .collect();
    let quantities: Vec<f64> = monthly
        .values()
        .map(|month| month.total_quantity as f64)
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Monthly Sales")
                .subtext("Total in millions of rupiah and items sold"),
        )
        .tooltip(
            Tooltip::new()
                .trigger(Trigger::Axis)
                .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow)),
        )
        .legend(Legend::new().top("bottom"))
        .grid(default_grid())
        .x_axis(Axis::new().type_(AxisType::Category).data(labels))
        .y_axis(
            Axis::new()
                .type_(AxisType::Value)
                .name("Total")
                .axis_label(AxisLabel::new().formatter(millions_formatter())),
        )
        .y_axis(Axis::new().type_(AxisType::Value).name("Items"))
        .series(Bar::new().name("Total (M)").data(totals))
        .series(Line::new().name("Items sold").y_axis_index(1).data(quantities))
}

pub(super) fn products_chart(products: &[ProductQuantity]) -> Chart {
    let data: Vec<(f64, &str)> = products
        .iter()
        .map(|product| (product.total_quantity as f64, product.name.as_str()))
        .collect();

    Chart::new()
        .title(
            Title::new()
                .text("Best Selling Products")
                .subtext("Items sold"),
        )
        .tooltip(Tooltip::new().trigger(Trigger::Item))
        .legend(Legend::new().top("bottom"))
        .series(Pie::new().name("Items sold").radius("60%").data(data))
}

fn default_grid() -> Grid {
    Grid::new()
        .left("3%")
        .right("4%")
        .bottom("10%")
        .contain_label(true)
}

#[inline]
fn millions_formatter() -> JsFunction {
    JsFunction::new_with_args(
        "number",
        "return (number) ? number.toFixed(2) + ' M' : \"-\";",
    )
}

/// Creates a tooltip configuration for values in millions
fn millions_tooltip() -> Tooltip {
    Tooltip::new()
        .trigger(Trigger::Axis)
        .value_formatter(millions_formatter())
        .axis_pointer(AxisPointer::new().type_(AxisPointerType::Shadow))
}

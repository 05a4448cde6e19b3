//! Sale record aggregation for the dashboard.
//!
//! [aggregate] folds a list of sale records into five views in one pass:
//! daily totals, monthly and yearly rollups, a best-selling product ranking,
//! and global status counters. The accumulator only lives for the duration of
//! one call, so every call starts from scratch.

use std::collections::{BTreeMap, HashMap};

use serde::{Serialize, Serializer};
use time::Date;

use crate::{
    Error,
    sale::{SaleRecord, SaleStatus, parse_sale_date},
};

/// The product name used for sales that have no product name.
pub const UNKNOWN_PRODUCT_LABEL: &str = "Unknown product";

/// The total amount sold on one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyTotal {
    /// The calendar day, serialized as "YYYY-MM-DD".
    #[serde(serialize_with = "serialize_day")]
    pub day: Date,
    /// The sum of the sale amounts on `day`.
    pub total_amount: f64,
}

/// The totals for one month or one year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    /// The sum of the sale amounts in the period.
    pub total_amount: f64,
    /// The number of items sold in the period.
    pub total_quantity: u64,
    /// The number of sales with the status "COMPLETED".
    pub completed_count: u64,
    /// The number of sales with the status "RETURN".
    pub return_count: u64,
}

impl PeriodTotals {
    fn add(&mut self, amount: f64, quantity: u64, status: &SaleStatus) {
        let (completed, returned) = status_increments(status);

        self.total_amount += amount;
        self.total_quantity += quantity;
        self.completed_count += completed;
        self.return_count += returned;
    }
}

/// The number of items sold of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductQuantity {
    /// The product name, or [UNKNOWN_PRODUCT_LABEL].
    pub name: String,
    /// The number of items sold.
    pub total_quantity: u64,
}

/// Counters over every sale in the input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    /// The number of items sold, regardless of status.
    pub total_quantity_sold: u64,
    /// The number of sales with the status "COMPLETED".
    pub completed_count: u64,
    /// The number of sales with the status "RETURN".
    pub return_count: u64,
}

/// The views derived from a list of sale records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesSummary {
    /// The total sold per day, in ascending date order.
    pub daily: Vec<DailyTotal>,
    /// Totals per month keyed by "YYYY-MM", in ascending order.
    pub monthly: BTreeMap<String, PeriodTotals>,
    /// Totals per year keyed by "YYYY", in ascending order.
    pub yearly: BTreeMap<String, PeriodTotals>,
    /// Items sold per product, most sold first. Products that sold the same
    /// number of items keep the order they were first seen in.
    pub products: Vec<ProductQuantity>,
    /// Counters over every sale.
    pub status: StatusSummary,
}

impl SalesSummary {
    /// Whether the summary was built from zero sales.
    pub fn is_empty(&self) -> bool {
        self.daily.is_empty()
    }

    /// The sum of the sale amounts over every day.
    pub fn total_amount(&self) -> f64 {
        self.daily
            .iter()
            .fold(0.0, |total, daily| total + daily.total_amount)
    }
}

/// Aggregates sale records into daily, monthly, yearly, product and status views.
///
/// The records may be in any order. An empty slice gives an empty summary.
///
/// # Errors
/// Returns [Error::InvalidRecord] for the first record whose date cannot be
/// read or whose amount is not a finite number. No partial summary is
/// returned in that case.
pub fn aggregate(records: &[SaleRecord]) -> Result<SalesSummary, Error> {
    let summary = records
        .iter()
        .enumerate()
        .try_fold(Accumulator::default(), |accumulator, (position, record)| {
            accumulator.add(position, record)
        })?
        .finish();

    tracing::debug!(
        "Aggregated {} sales into {} days, {} months, {} years and {} products",
        records.len(),
        summary.daily.len(),
        summary.monthly.len(),
        summary.yearly.len(),
        summary.products.len()
    );

    Ok(summary)
}

/// The running totals for one call to [aggregate].
#[derive(Default)]
struct Accumulator {
    days: BTreeMap<Date, f64>,
    months: BTreeMap<String, PeriodTotals>,
    years: BTreeMap<String, PeriodTotals>,
    /// Index into `products` by product name.
    product_index: HashMap<String, usize>,
    /// Products in the order they were first seen.
    products: Vec<ProductQuantity>,
    status: StatusSummary,
}

impl Accumulator {
    fn add(mut self, position: usize, record: &SaleRecord) -> Result<Self, Error> {
        let day = parse_sale_date(&record.date).map_err(|error| Error::InvalidRecord {
            position,
            reason: error.to_string(),
        })?;

        if !record.amount.is_finite() {
            return Err(Error::InvalidRecord {
                position,
                reason: format!("the amount {} is not a finite number", record.amount),
            });
        }

        let amount = record.amount;
        let quantity = u64::from(record.quantity);

        *self.days.entry(day).or_insert(0.0) += amount;

        self.months
            .entry(month_key(day))
            .or_default()
            .add(amount, quantity, &record.status);
        self.years
            .entry(year_key(day))
            .or_default()
            .add(amount, quantity, &record.status);

        let (completed, returned) = status_increments(&record.status);
        self.status.total_quantity_sold += quantity;
        self.status.completed_count += completed;
        self.status.return_count += returned;

        self.add_product(record.product_name.as_deref(), quantity);

        Ok(self)
    }

    fn add_product(&mut self, product_name: Option<&str>, quantity: u64) {
        let name = product_name
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(UNKNOWN_PRODUCT_LABEL);

        match self.product_index.get(name) {
            Some(&index) => self.products[index].total_quantity += quantity,
            None => {
                self.product_index
                    .insert(name.to_owned(), self.products.len());
                self.products.push(ProductQuantity {
                    name: name.to_owned(),
                    total_quantity: quantity,
                });
            }
        }
    }

    fn finish(self) -> SalesSummary {
        let daily = self
            .days
            .into_iter()
            .map(|(day, total_amount)| DailyTotal { day, total_amount })
            .collect();

        // `sort_by` is stable, so ties keep first-seen order.
        let mut products = self.products;
        products.sort_by(|a, b| b.total_quantity.cmp(&a.total_quantity));

        SalesSummary {
            daily,
            monthly: self.months,
            yearly: self.years,
            products,
            status: self.status,
        }
    }
}

/// The (completed, return) counter increments for a sale with `status`.
///
/// At most one of the two is non-zero.
fn status_increments(status: &SaleStatus) -> (u64, u64) {
    match status {
        SaleStatus::Completed => (1, 0),
        SaleStatus::Return => (0, 1),
        SaleStatus::Other(_) => (0, 0),
    }
}

/// Formats the month of `day` as "YYYY-MM".
fn month_key(day: Date) -> String {
    format!("{:04}-{:02}", day.year(), u8::from(day.month()))
}

/// Formats the year of `day` as "YYYY".
fn year_key(day: Date) -> String {
    format!("{:04}", day.year())
}

fn serialize_day<S: Serializer>(day: &Date, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(day)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::{
        DailyTotal, PeriodTotals, ProductQuantity, StatusSummary, UNKNOWN_PRODUCT_LABEL,
        aggregate, month_key, year_key,
    };
    use crate::{
        Error,
        html::format_millions,
        sale::{SaleRecord, SaleStatus},
    };

    fn create_test_sale(
        date: &str,
        amount: f64,
        quantity: u32,
        product: &str,
        status: SaleStatus,
    ) -> SaleRecord {
        SaleRecord::new(date, amount)
            .quantity(quantity)
            .product(product)
            .status(status)
    }

    fn other(tag: &str) -> SaleStatus {
        SaleStatus::Other(tag.to_owned())
    }

    /// Sales spread over two years, three months, with every kind of status.
    fn mixed_sales() -> Vec<SaleRecord> {
        vec![
            create_test_sale("2024-02-10 09:00:00", 250.5, 3, "Tas", SaleStatus::Completed),
            create_test_sale("2023-12-31", 100.0, 1, "Kaos", SaleStatus::Return),
            create_test_sale("2024-02-10", 49.5, 2, "Kaos", other("CANCELLED")),
            create_test_sale("2024-01-05T12:00:00Z", 1_000.0, 5, "Sepatu", SaleStatus::Completed),
            create_test_sale("2024-01-06", 0.0, 0, "Tas", SaleStatus::Completed),
            create_test_sale("2023-12-01", 75.25, 4, "Topi", SaleStatus::Return),
        ]
    }

    #[test]
    fn scenario_single_completed_sale() {
        let sales = vec![create_test_sale(
            "2024-01-01",
            100.0,
            2,
            "X",
            SaleStatus::Completed,
        )];

        let summary = aggregate(&sales).unwrap();

        assert_eq!(
            summary.daily,
            vec![DailyTotal {
                day: date!(2024 - 01 - 01),
                total_amount: 100.0
            }]
        );
        assert_eq!(
            summary.monthly["2024-01"],
            PeriodTotals {
                total_amount: 100.0,
                total_quantity: 2,
                completed_count: 1,
                return_count: 0,
            }
        );
        assert_eq!(summary.yearly["2024"], summary.monthly["2024-01"]);
        assert_eq!(
            summary.products,
            vec![ProductQuantity {
                name: "X".to_owned(),
                total_quantity: 2
            }]
        );
        assert_eq!(
            summary.status,
            StatusSummary {
                total_quantity_sold: 2,
                completed_count: 1,
                return_count: 0,
            }
        );
    }

    #[test]
    fn scenario_two_sales_same_day_with_return() {
        let sales = vec![
            create_test_sale("2024-03-05", 300.0, 1, "A", SaleStatus::Completed),
            create_test_sale("2024-03-05 17:45:00", 200.0, 4, "B", SaleStatus::Return),
        ];

        let summary = aggregate(&sales).unwrap();

        assert_eq!(
            summary.daily,
            vec![DailyTotal {
                day: date!(2024 - 03 - 05),
                total_amount: 500.0
            }]
        );
        assert_eq!(
            summary.products,
            vec![
                ProductQuantity {
                    name: "B".to_owned(),
                    total_quantity: 4
                },
                ProductQuantity {
                    name: "A".to_owned(),
                    total_quantity: 1
                },
            ]
        );
        assert_eq!(summary.status.completed_count, 1);
        assert_eq!(summary.status.return_count, 1);
        assert_eq!(summary.monthly["2024-03"].return_count, 1);
    }

    #[test]
    fn scenario_empty_input_gives_empty_views() {
        let summary = aggregate(&[]).unwrap();

        assert!(summary.is_empty());
        assert!(summary.daily.is_empty());
        assert!(summary.monthly.is_empty());
        assert!(summary.yearly.is_empty());
        assert!(summary.products.is_empty());
        assert_eq!(summary.status, StatusSummary::default());
        assert_eq!(summary.total_amount(), 0.0);
    }

    #[test]
    fn empty_total_is_positive_zero() {
        let summary = aggregate(&[]).unwrap();

        assert!(summary.total_amount().is_sign_positive());
        assert_eq!(format_millions(summary.total_amount()), "0.00 M");
    }

    #[test]
    fn iso_date_times_with_zones_are_bucketed_by_written_day() {
        let sales = vec![
            create_test_sale("2024-01-01T10:15Z", 100.0, 1, "A", SaleStatus::Completed),
            create_test_sale("2024-01-01T23:00:00+07:00", 50.0, 2, "A", SaleStatus::Completed),
        ];

        let summary = aggregate(&sales).unwrap();

        assert_eq!(
            summary.daily,
            vec![DailyTotal {
                day: date!(2024 - 01 - 01),
                total_amount: 150.0,
            }]
        );
    }

    #[test]
    fn scenario_unparseable_date_fails_whole_run() {
        let sales = vec![
            create_test_sale("2024-01-01", 100.0, 1, "A", SaleStatus::Completed),
            create_test_sale("not a date", 50.0, 1, "B", SaleStatus::Completed),
            create_test_sale("2024-01-03", 10.0, 1, "C", SaleStatus::Completed),
        ];

        let result = aggregate(&sales);

        assert_eq!(
            result,
            Err(Error::InvalidRecord {
                position: 1,
                reason: Error::InvalidDate("not a date".to_owned()).to_string(),
            })
        );
    }

    #[test]
    fn reports_first_invalid_record() {
        let sales = vec![
            create_test_sale("2024-13-01", 1.0, 1, "A", SaleStatus::Completed),
            create_test_sale("also bad", 1.0, 1, "B", SaleStatus::Completed),
        ];

        let result = aggregate(&sales);

        assert!(
            matches!(result, Err(Error::InvalidRecord { position: 0, .. })),
            "got {result:?}"
        );
    }

    #[test]
    fn rejects_non_finite_amount() {
        let sales = vec![create_test_sale(
            "2024-01-01",
            f64::NAN,
            1,
            "A",
            SaleStatus::Completed,
        )];

        let result = aggregate(&sales);

        assert!(
            matches!(result, Err(Error::InvalidRecord { position: 0, .. })),
            "got {result:?}"
        );
    }

    #[test]
    fn amounts_are_conserved_across_views() {
        let sales = mixed_sales();
        let want: f64 = sales.iter().map(|sale| sale.amount).sum();

        let summary = aggregate(&sales).unwrap();

        let daily: f64 = summary.daily.iter().map(|d| d.total_amount).sum();
        let monthly: f64 = summary.monthly.values().map(|m| m.total_amount).sum();
        let yearly: f64 = summary.yearly.values().map(|y| y.total_amount).sum();
        assert_eq!(daily, want);
        assert_eq!(monthly, want);
        assert_eq!(yearly, want);
        assert_eq!(summary.total_amount(), want);
    }

    #[test]
    fn quantities_are_counted_once_per_view() {
        let sales = mixed_sales();
        let want: u64 = sales.iter().map(|sale| u64::from(sale.quantity)).sum();

        let summary = aggregate(&sales).unwrap();

        let products: u64 = summary.products.iter().map(|p| p.total_quantity).sum();
        let monthly: u64 = summary.monthly.values().map(|m| m.total_quantity).sum();
        let yearly: u64 = summary.yearly.values().map(|y| y.total_quantity).sum();
        assert_eq!(products, want);
        assert_eq!(monthly, want);
        assert_eq!(yearly, want);
        assert_eq!(summary.status.total_quantity_sold, want);
    }

    #[test]
    fn status_counters_never_exceed_record_count() {
        let sales = mixed_sales();

        let summary = aggregate(&sales).unwrap();

        let completed = sales
            .iter()
            .filter(|sale| sale.status == SaleStatus::Completed)
            .count() as u64;
        let returned = sales
            .iter()
            .filter(|sale| sale.status == SaleStatus::Return)
            .count() as u64;
        assert_eq!(summary.status.completed_count, completed);
        assert_eq!(summary.status.return_count, returned);
        assert!(completed + returned <= sales.len() as u64);

        for (month, totals) in &summary.monthly {
            let records_in_month = sales
                .iter()
                .filter(|sale| sale.date.starts_with(month.as_str()))
                .count() as u64;
            assert!(totals.completed_count + totals.return_count <= records_in_month);
        }
    }

    #[test]
    fn other_statuses_count_towards_totals_only() {
        let sales = vec![create_test_sale(
            "2024-05-01",
            80.0,
            2,
            "A",
            other("SHIPPING"),
        )];

        let summary = aggregate(&sales).unwrap();

        assert_eq!(
            summary.monthly["2024-05"],
            PeriodTotals {
                total_amount: 80.0,
                total_quantity: 2,
                completed_count: 0,
                return_count: 0,
            }
        );
        assert_eq!(summary.status.total_quantity_sold, 2);
        assert_eq!(summary.status.completed_count, 0);
        assert_eq!(summary.status.return_count, 0);
    }

    #[test]
    fn status_matching_is_case_sensitive() {
        let sales = vec![create_test_sale(
            "2024-05-01",
            80.0,
            2,
            "A",
            SaleStatus::from("completed"),
        )];

        let summary = aggregate(&sales).unwrap();

        assert_eq!(summary.status.completed_count, 0);
    }

    #[test]
    fn daily_series_is_strictly_increasing() {
        let summary = aggregate(&mixed_sales()).unwrap();

        let days: Vec<_> = summary.daily.iter().map(|daily| daily.day).collect();
        assert_eq!(
            days,
            vec![
                date!(2023 - 12 - 01),
                date!(2023 - 12 - 31),
                date!(2024 - 01 - 05),
                date!(2024 - 01 - 06),
                date!(2024 - 02 - 10),
            ]
        );
        assert!(days.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn rollups_are_keyed_by_month_and_year() {
        let summary = aggregate(&mixed_sales()).unwrap();

        let months: Vec<&str> = summary.monthly.keys().map(String::as_str).collect();
        let years: Vec<&str> = summary.yearly.keys().map(String::as_str).collect();
        assert_eq!(months, vec!["2023-12", "2024-01", "2024-02"]);
        assert_eq!(years, vec!["2023", "2024"]);
        assert_eq!(
            summary.yearly["2023"],
            PeriodTotals {
                total_amount: 175.25,
                total_quantity: 5,
                completed_count: 0,
                return_count: 2,
            }
        );
        assert_eq!(
            summary.monthly["2024-02"],
            PeriodTotals {
                total_amount: 300.0,
                total_quantity: 5,
                completed_count: 1,
                return_count: 0,
            }
        );
    }

    #[test]
    fn product_ranking_is_descending_and_stable_on_ties() {
        let sales = vec![
            create_test_sale("2024-01-01", 1.0, 2, "First", SaleStatus::Completed),
            create_test_sale("2024-01-01", 1.0, 5, "Top", SaleStatus::Completed),
            create_test_sale("2024-01-02", 1.0, 1, "Second", SaleStatus::Completed),
            create_test_sale("2024-01-03", 1.0, 1, "Second", SaleStatus::Completed),
            create_test_sale("2024-01-04", 1.0, 2, "Third", SaleStatus::Completed),
        ];

        let summary = aggregate(&sales).unwrap();

        let ranking: Vec<(&str, u64)> = summary
            .products
            .iter()
            .map(|product| (product.name.as_str(), product.total_quantity))
            .collect();
        assert_eq!(
            ranking,
            vec![("Top", 5), ("First", 2), ("Second", 2), ("Third", 2)]
        );
    }

    #[test]
    fn missing_product_names_share_unknown_bucket() {
        let sales = vec![
            SaleRecord::new("2024-01-01", 1.0).quantity(2),
            create_test_sale("2024-01-02", 1.0, 3, "  ", SaleStatus::Completed),
            create_test_sale("2024-01-03", 1.0, 1, "Tas", SaleStatus::Completed),
        ];

        let summary = aggregate(&sales).unwrap();

        assert_eq!(
            summary.products,
            vec![
                ProductQuantity {
                    name: UNKNOWN_PRODUCT_LABEL.to_owned(),
                    total_quantity: 5
                },
                ProductQuantity {
                    name: "Tas".to_owned(),
                    total_quantity: 1
                },
            ]
        );
    }

    #[test]
    fn aggregating_twice_gives_identical_output() {
        let sales = mixed_sales();

        let first = aggregate(&sales).unwrap();
        let second = aggregate(&sales).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn input_order_does_not_change_totals() {
        let sales = mixed_sales();
        let mut reversed = sales.clone();
        reversed.reverse();

        let forward = aggregate(&sales).unwrap();
        let backward = aggregate(&reversed).unwrap();

        assert_eq!(forward.daily, backward.daily);
        assert_eq!(forward.monthly, backward.monthly);
        assert_eq!(forward.yearly, backward.yearly);
        assert_eq!(forward.status, backward.status);
    }

    #[test]
    fn serializes_days_as_iso_dates() {
        let sales = vec![create_test_sale("2024-01-09", 5.0, 1, "A", SaleStatus::Completed)];

        let json = serde_json::to_value(aggregate(&sales).unwrap()).unwrap();

        assert_eq!(json["daily"][0]["day"], "2024-01-09");
        assert_eq!(json["monthly"]["2024-01"]["completed_count"], 1);
        assert_eq!(json["products"][0]["name"], "A");
        assert_eq!(json["status"]["total_quantity_sold"], 1);
    }

    #[test]
    fn formats_period_keys() {
        assert_eq!(month_key(date!(2024 - 03 - 31)), "2024-03");
        assert_eq!(month_key(date!(2024 - 12 - 01)), "2024-12");
        assert_eq!(year_key(date!(2024 - 03 - 31)), "2024");
    }
}

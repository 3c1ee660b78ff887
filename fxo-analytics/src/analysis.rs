//! Performance analysis over the reconciled dataset.

use crate::{
    PipelineError, encoding,
    stats::{self, TTest, Variance},
};
use fxo_core::{
    failure::InsufficientData,
    models::{
        CurrencyCode, Dataset, DatasetQuery, Date, Map, OptimizationFact, ProcessId,
        TransactionFact,
    },
    ports::AnalysisRepository,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The transaction measure whose trend is estimated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendMetric {
    /// Sum of transaction amounts per period
    #[default]
    Volume,
    /// Mean applied rate per period
    Rate,
}

impl fmt::Display for TrendMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Volume => "volume",
            Self::Rate => "rate",
        })
    }
}

/// The bucket width of a trend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    /// Calendar days
    Day,
    /// Calendar months
    #[default]
    Month,
}

impl Period {
    /// The first day of the period containing `date`
    pub fn start_of(self, date: Date) -> Date {
        match self {
            Self::Day => date,
            Self::Month => date.replace_day(1).unwrap_or(date),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Day => "day",
            Self::Month => "month",
        })
    }
}

/// How values falling in the same period are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Add them up
    Sum,
    /// Average them
    Mean,
}

/// Bucket dated values by period and combine each bucket.
///
/// Only periods that contain at least one value are returned, in
/// chronological order.
pub fn period_series(
    records: impl IntoIterator<Item = (Date, f64)>,
    period: Period,
    aggregate: Aggregate,
) -> Vec<f64> {
    let mut buckets: Map<Date, (f64, usize)> = Map::default();
    for (date, value) in records {
        let bucket = buckets.entry(period.start_of(date)).or_insert((0.0, 0));
        bucket.0 += value;
        bucket.1 += 1;
    }
    buckets.sort_keys();

    buckets
        .values()
        .map(|&(total, count)| match aggregate {
            Aggregate::Sum => total,
            Aggregate::Mean => total / count as f64,
        })
        .collect()
}

/// What to analyze.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisScope {
    /// Inclusive bounds on transaction and implementation dates
    #[serde(default)]
    pub window: DatasetQuery,
    /// Transactions from this currency form the first comparison sample
    pub currency_a: CurrencyCode,
    /// Transactions from this currency form the second comparison sample
    pub currency_b: CurrencyCode,
    /// The measure whose trend is estimated
    #[serde(default)]
    pub trend_metric: TrendMetric,
    /// The trend's bucket width
    #[serde(default)]
    pub period: Period,
    /// The comparison's variance assumption
    #[serde(default)]
    pub variance: Variance,
}

impl AnalysisScope {
    /// Compare two currencies over all time, with a monthly volume trend
    pub fn new(currency_a: CurrencyCode, currency_b: CurrencyCode) -> Self {
        Self {
            window: DatasetQuery::default(),
            currency_a,
            currency_b,
            trend_metric: TrendMetric::default(),
            period: Period::default(),
            variance: Variance::default(),
        }
    }
}

/// A fitted linear trend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    /// Change of the metric per period
    pub slope: f64,
    /// e.g. "volume per month"
    pub unit: String,
    /// Number of periods fitted
    pub periods: usize,
}

impl Trend {
    /// Fit the slope of a per-period series
    pub fn fit(series: &[f64], unit: String) -> Result<Self, InsufficientData> {
        Ok(Self {
            slope: stats::linear_slope(series)?,
            unit,
            periods: series.len(),
        })
    }
}

/// Everything the analyzer produces.
///
/// Comparison and trend fail independently of each other; KPIs and
/// correlations are always present, with NaN for estimates over no data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Named key performance indicators
    #[serde(deserialize_with = "encoding::nan_row")]
    pub kpis: Map<String>,
    /// Pearson correlation between every pair of variables
    #[serde(deserialize_with = "encoding::nan_matrix")]
    pub correlations: Map<String, Map<String>>,
    /// Mean transaction amount from `currency_a` vs from `currency_b`
    #[serde(with = "encoding::section")]
    pub comparison: Result<TTest, InsufficientData>,
    /// Trend of the chosen metric
    #[serde(with = "encoding::section")]
    pub trend: Result<Trend, InsufficientData>,
}

/// Load the scoped dataset and analyze it.
#[tracing::instrument(skip(store), fields(a = %scope.currency_a, b = %scope.currency_b))]
pub async fn analyze<S: AnalysisRepository>(
    store: &S,
    scope: &AnalysisScope,
) -> Result<AnalysisResult, PipelineError<S::Error>> {
    let dataset = store
        .dataset(scope.window)
        .await
        .map_err(PipelineError::Store)?;

    tracing::debug!(
        transactions = dataset.transactions.len(),
        optimizations = dataset.optimizations.len(),
        "loaded dataset"
    );

    Ok(analyze_dataset(&dataset, scope))
}

/// Analyze an already loaded dataset.
pub fn analyze_dataset(dataset: &Dataset, scope: &AnalysisScope) -> AnalysisResult {
    let result = AnalysisResult {
        kpis: kpis(dataset),
        correlations: correlations(dataset),
        comparison: comparison(dataset, scope),
        trend: trend(dataset, scope),
    };

    if let Err(failure) = &result.comparison {
        tracing::warn!(%failure, "comparison skipped");
    }
    if let Err(failure) = &result.trend {
        tracing::warn!(%failure, "trend skipped");
    }

    result
}

fn kpis(dataset: &Dataset) -> Map<String> {
    let transactions = &dataset.transactions;
    let optimizations = &dataset.optimizations;
    let column = |f: fn(&OptimizationFact) -> f64| -> Vec<f64> { optimizations.iter().map(f).collect() };

    let rates: Vec<f64> = transactions.iter().map(|t| t.rate).collect();

    [
        (
            "mean_daily_volume",
            stats::mean_of_totals(transactions.iter().map(|t| (t.date, t.amount))),
        ),
        ("mean_exchange_rate", stats::mean(&rates)),
        (
            "mean_efficiency_improvement",
            stats::mean(&column(|o| o.efficiency_improvement)),
        ),
        ("mean_cost_reduction", stats::mean(&column(|o| o.cost_reduction))),
        (
            "mean_processing_time_reduction",
            stats::mean(&column(|o| o.processing_time_reduction)),
        ),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_owned(), value))
    .collect()
}

fn correlations(dataset: &Dataset) -> Map<String, Map<String>> {
    // optimizations arrive in implementation order, so the last one wins
    let latest: Map<ProcessId, &OptimizationFact> = dataset
        .optimizations
        .iter()
        .map(|o| (o.process_id, o))
        .collect();

    let n = dataset.transactions.len();
    let mut columns: Map<String, Vec<Option<f64>>> = [
        "amount",
        "rate",
        "efficiency_improvement",
        "cost_reduction",
        "processing_time_reduction",
    ]
    .into_iter()
    .map(|name| (name.to_owned(), Vec::with_capacity(n)))
    .collect();

    for transaction in &dataset.transactions {
        let optimization = latest.get(&transaction.process_id);
        let row = [
            Some(transaction.amount),
            Some(transaction.rate),
            optimization.map(|o| o.efficiency_improvement),
            optimization.map(|o| o.cost_reduction),
            optimization.map(|o| o.processing_time_reduction),
        ];
        for (column, value) in columns.values_mut().zip(row) {
            column.push(value);
        }
    }

    stats::correlation_matrix(&columns)
}

fn comparison(dataset: &Dataset, scope: &AnalysisScope) -> Result<TTest, InsufficientData> {
    let sample = |code: &CurrencyCode| -> Vec<f64> {
        dataset
            .transactions
            .iter()
            .filter(|t| &t.from_currency == code)
            .map(|t| t.amount)
            .collect()
    };

    stats::t_test(
        &sample(&scope.currency_a),
        &sample(&scope.currency_b),
        scope.variance,
    )
}

fn trend(dataset: &Dataset, scope: &AnalysisScope) -> Result<Trend, InsufficientData> {
    let (aggregate, value): (Aggregate, fn(&TransactionFact) -> f64) = match scope.trend_metric {
        TrendMetric::Volume => (Aggregate::Sum, |t| t.amount),
        TrendMetric::Rate => (Aggregate::Mean, |t| t.rate),
    };

    let series = period_series(
        dataset.transactions.iter().map(|t| (t.date, value(t))),
        scope.period,
        aggregate,
    );

    Trend::fit(&series, format!("{} per {}", scope.trend_metric, scope.period))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use fxo_core::models::TransactionFact;
    use time::macros::date;

    fn code(value: &str) -> CurrencyCode {
        CurrencyCode::new(value).unwrap()
    }

    fn fact(process_id: ProcessId, date: Date, from: &str, amount: f64, rate: f64) -> TransactionFact {
        TransactionFact {
            process_id,
            date,
            from_currency: code(from),
            to_currency: code("EUR"),
            amount,
            rate,
        }
    }

    fn optimization(process_id: ProcessId, day: Date, pct: f64) -> OptimizationFact {
        OptimizationFact {
            process_id,
            implementation_date: day,
            efficiency_improvement: pct,
            cost_reduction: pct / 2.0,
            processing_time_reduction: 1.0,
        }
    }

    #[test]
    fn mean_daily_volume_averages_day_totals() {
        let p = ProcessId::random();
        let dataset = Dataset {
            transactions: vec![
                fact(p, date!(2024 - 01 - 01), "USD", 70.0, 1.0),
                fact(p, date!(2024 - 01 - 01), "USD", 30.0, 1.0),
                fact(p, date!(2024 - 01 - 03), "USD", 50.0, 1.0),
            ],
            optimizations: Vec::new(),
        };
        // a day with zero volume still counts when it has a transaction
        let mut with_zero = dataset.clone();
        with_zero.transactions[1] = fact(p, date!(2024 - 01 - 02), "USD", 0.0, 1.0);
        with_zero.transactions[0].amount = 100.0;

        let kpis = kpis(&with_zero);
        assert_eq!(kpis["mean_daily_volume"], 50.0);
        assert_eq!(kpis["mean_exchange_rate"], 1.0);
        assert!(kpis["mean_efficiency_improvement"].is_nan());

        let names: Vec<&String> = kpis.keys().collect();
        assert_eq!(
            names,
            vec![
                "mean_daily_volume",
                "mean_exchange_rate",
                "mean_efficiency_improvement",
                "mean_cost_reduction",
                "mean_processing_time_reduction",
            ]
        );
        assert_relative_eq!(super::kpis(&dataset)["mean_daily_volume"], 75.0);
    }

    #[test]
    fn correlations_join_the_latest_optimization() {
        let (p, q, r) = (ProcessId::random(), ProcessId::random(), ProcessId::random());
        let dataset = Dataset {
            transactions: vec![
                fact(p, date!(2024 - 01 - 01), "USD", 100.0, 1.0),
                fact(q, date!(2024 - 01 - 02), "USD", 200.0, 1.1),
                fact(r, date!(2024 - 01 - 03), "USD", 300.0, 1.2),
                fact(p, date!(2024 - 01 - 04), "USD", 400.0, 1.3),
            ],
            optimizations: vec![
                optimization(p, date!(2023 - 12 - 01), 50.0),
                optimization(q, date!(2023 - 12 - 15), 20.0),
                // supersedes the first for p
                optimization(p, date!(2023 - 12 - 20), 10.0),
            ],
        };

        let matrix = correlations(&dataset);
        assert_eq!(matrix.len(), 5);
        assert_relative_eq!(matrix["amount"]["rate"], 1.0, max_relative = 1e-12);
        assert_eq!(matrix["rate"]["amount"], matrix["amount"]["rate"]);
        // r has no optimization and p's latest gives 10 twice, with q at 20
        assert!(matrix["amount"]["efficiency_improvement"] < 0.0);
        // processing time reduction is constant
        assert!(matrix["processing_time_reduction"]["processing_time_reduction"].is_nan());
        assert_eq!(matrix["efficiency_improvement"]["efficiency_improvement"], 1.0);
    }

    #[test]
    fn comparison_and_trend_fail_independently() {
        let p = ProcessId::random();
        let dataset = Dataset {
            transactions: vec![
                fact(p, date!(2024 - 01 - 01), "USD", 100.0, 1.0),
                fact(p, date!(2024 - 01 - 02), "USD", 120.0, 1.0),
                fact(p, date!(2024 - 02 - 01), "GBP", 90.0, 1.0),
            ],
            optimizations: Vec::new(),
        };
        let scope = AnalysisScope::new(code("USD"), code("GBP"));
        let result = analyze_dataset(&dataset, &scope);

        let failure = result.comparison.unwrap_err();
        assert_eq!(failure.observed, 1);

        let trend = result.trend.unwrap();
        assert_eq!(trend.unit, "volume per month");
        assert_eq!(trend.periods, 2);
        assert_relative_eq!(trend.slope, -130.0);
        assert_relative_eq!(result.kpis["mean_daily_volume"], 310.0 / 3.0);
    }

    #[test]
    fn results_write_sections_flat_and_read_back() {
        let p = ProcessId::random();
        let dataset = Dataset {
            transactions: vec![
                fact(p, date!(2024 - 01 - 01), "USD", 10.0, 1.0),
                fact(p, date!(2024 - 01 - 02), "USD", 20.0, 1.0),
                fact(p, date!(2024 - 01 - 03), "GBP", 30.0, 1.0),
                fact(p, date!(2024 - 01 - 04), "GBP", 40.0, 1.0),
            ],
            optimizations: Vec::new(),
        };
        let result = analyze_dataset(&dataset, &AnalysisScope::new(code("USD"), code("GBP")));
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["comparison"]["mean_a"], 15.0);
        assert_eq!(json["comparison"]["mean_diff"], -20.0);
        // a single month
        assert_eq!(json["trend"]["insufficient_data"]["observed"], 1);
        // constant rate and no optimizations
        assert!(json["correlations"]["rate"]["rate"].is_null());
        assert!(json["kpis"]["mean_cost_reduction"].is_null());

        let read: AnalysisResult = serde_json::from_value(json).unwrap();
        assert_eq!(read.comparison, result.comparison);
        assert_eq!(read.trend, result.trend);
        assert!(read.correlations["rate"]["rate"].is_nan());
        assert_eq!(read.correlations["amount"]["amount"], 1.0);
        assert!(read.kpis["mean_cost_reduction"].is_nan());
        assert_eq!(read.kpis["mean_daily_volume"], 25.0);
    }

    #[test]
    fn daily_rate_trend() {
        let p = ProcessId::random();
        let dataset = Dataset {
            transactions: vec![
                fact(p, date!(2024 - 01 - 02), "USD", 1.0, 1.10),
                fact(p, date!(2024 - 01 - 01), "USD", 1.0, 1.00),
                fact(p, date!(2024 - 01 - 03), "EUR", 1.0, 1.20),
                fact(p, date!(2024 - 01 - 03), "USD", 1.0, 1.40),
            ],
            optimizations: Vec::new(),
        };
        let scope = AnalysisScope {
            trend_metric: TrendMetric::Rate,
            period: Period::Day,
            ..AnalysisScope::new(code("USD"), code("EUR"))
        };

        // daily means 1.0, 1.1, 1.3
        let trend = trend(&dataset, &scope).unwrap();
        assert_eq!(trend.unit, "rate per day");
        assert_relative_eq!(trend.slope, 0.15, max_relative = 1e-12);
    }

    #[test]
    fn periods_are_chronological_and_sparse() {
        let series = period_series(
            [
                (date!(2024 - 03 - 05), 5.0),
                (date!(2024 - 01 - 31), 1.0),
                (date!(2024 - 01 - 01), 2.0),
            ],
            Period::Month,
            Aggregate::Sum,
        );
        assert_eq!(series, vec![3.0, 5.0]);
    }
}

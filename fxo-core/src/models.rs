mod allocation;
mod analysis;
mod currency;
mod map;
mod optimization;
mod process;
mod sync;

pub use allocation::{Allocation, AllocationProblem, CostCurve, Point, VolumeCurve};
pub use analysis::{Dataset, DatasetQuery, OptimizationFact, TransactionFact};
pub use currency::{Currency, CurrencyCode, ExchangeRate};
pub use map::Map;
pub use optimization::{AiModel, Impact, Optimization, Outcome, Report};
pub use process::{ExchangeHouse, LogisticProcess, ProcessStatus, ProcessType, Transaction};
pub use sync::{
    ProcessExtract, ProcessMetrics, ProcessUpdate, RowOutcome, TransactionAggregates,
    TransactionExtract, TransactionUpsert,
};

/// Calendar dates are used throughout; no entity carries a time of day.
pub type Date = time::Date;

macro_rules! new_id {
    ($struct:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(
            feature = "serde",
            derive(serde::Serialize, serde::Deserialize),
            serde(transparent)
        )]
        pub struct $struct(pub uuid::Uuid);

        impl $struct {
            /// Generate a fresh, random identifier
            pub fn random() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl From<uuid::Uuid> for $struct {
            fn from(value: uuid::Uuid) -> Self {
                Self(value)
            }
        }

        impl From<$struct> for uuid::Uuid {
            fn from(value: $struct) -> Self {
                value.0
            }
        }

        impl std::fmt::Display for $struct {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl std::str::FromStr for $struct {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(s.parse()?))
            }
        }
    };
}

new_id!(HouseId, "Unique identifier for a currency exchange house");
new_id!(CurrencyId, "Unique identifier for a currency");
new_id!(RateId, "Unique identifier for a dated exchange rate");
new_id!(ProcessTypeId, "Unique identifier for a process classification");
new_id!(ProcessId, "Unique identifier for a logistic process");
new_id!(TransactionId, "Unique identifier for a transaction");
new_id!(OptimizationId, "Unique identifier for an optimization record");
new_id!(OutcomeId, "Unique identifier for the outcome of an optimization");
new_id!(ReportId, "Unique identifier for a process report");
new_id!(AiModelId, "Unique identifier for a generative model record");

/// Parse an ISO `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<Date, time::error::Parse> {
    Date::parse(value.trim(), time::macros::format_description!("[year]-[month]-[day]"))
}

/// Format a date as ISO `YYYY-MM-DD`.
pub fn format_date(value: Date) -> String {
    // The format description has no component that can fail for a valid Date
    value
        .format(time::macros::format_description!("[year]-[month]-[day]"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn dates_round_trip_through_iso_text() {
        let parsed = parse_date(" 2024-02-29 ").unwrap();
        assert_eq!(parsed, date!(2024 - 02 - 29));
        assert_eq!(format_date(parsed), "2024-02-29");
        assert!(parse_date("2024-02-30").is_err());
        assert!(parse_date("29/02/2024").is_err());
    }
}

//! Serde adapters for analysis results.
//!
//! JSON has no NaN, so `serde_json` writes it as `null`; the readers here map
//! `null` back to NaN.

use fxo_core::models::Map;
use serde::{Deserialize, Deserializer};

/// An estimate that may have been skipped for lack of data.
///
/// On success the estimate's own fields are written; otherwise the failure is
/// written under `insufficient_data`.
pub(crate) mod section {
    use fxo_core::failure::InsufficientData;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize)]
    #[serde(untagged)]
    enum Written<'a, T> {
        Skipped {
            insufficient_data: &'a InsufficientData,
        },
        Estimate(&'a T),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Read<T> {
        Skipped { insufficient_data: InsufficientData },
        Estimate(T),
    }

    pub fn serialize<T, S>(value: &Result<T, InsufficientData>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Ok(estimate) => Written::Estimate(estimate),
            Err(failure) => Written::Skipped {
                insufficient_data: failure,
            },
        }
        .serialize(serializer)
    }

    pub fn serialize_optional<T, S>(
        value: &Option<Result<T, InsufficientData>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error>
    where
        T: Serialize,
        S: Serializer,
    {
        match value {
            Some(section) => serialize(section, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Result<T, InsufficientData>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        Ok(match Read::deserialize(deserializer)? {
            Read::Skipped { insufficient_data } => Err(insufficient_data),
            Read::Estimate(estimate) => Ok(estimate),
        })
    }
}

/// A float where `null` reads as NaN
pub(crate) fn nan<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::NAN))
}

/// A named row of floats where `null` reads as NaN
pub(crate) fn nan_row<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Map<String>, D::Error> {
    let row = Map::<String, Option<f64>>::deserialize(deserializer)?;
    Ok(row
        .into_iter()
        .map(|(name, value)| (name, value.unwrap_or(f64::NAN)))
        .collect())
}

/// A named matrix of floats where `null` reads as NaN
pub(crate) fn nan_matrix<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Map<String, Map<String>>, D::Error> {
    let matrix = Map::<String, Map<String, Option<f64>>>::deserialize(deserializer)?;
    Ok(matrix
        .into_iter()
        .map(|(name, row)| {
            let row = row
                .into_iter()
                .map(|(other, value)| (other, value.unwrap_or(f64::NAN)))
                .collect();
            (name, row)
        })
        .collect())
}

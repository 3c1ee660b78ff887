use super::{AiModelId, Date, OptimizationId, OutcomeId, ProcessId, ReportId};
use crate::failure::ValidationError;
use std::str::FromStr;

/// Percentage improvements attributed to a process after an intervention.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Optimization {
    /// Identifier
    pub id: OptimizationId,
    /// The process the intervention applied to
    pub process_id: ProcessId,
    /// Improvement in operational efficiency, in percent
    pub efficiency_improvement: f64,
    /// Reduction in operational cost, in percent
    pub cost_reduction: f64,
    /// Reduction in processing time, in percent
    pub processing_time_reduction: f64,
    /// When the intervention took effect
    pub implementation_date: Date,
    /// Free-text notes
    pub notes: Option<String>,
}

impl Optimization {
    /// Check that every percentage is finite
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("efficiency_improvement", self.efficiency_improvement),
            ("cost_reduction", self.cost_reduction),
            ("processing_time_reduction", self.processing_time_reduction),
        ] {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite(field));
            }
        }
        Ok(())
    }
}

/// Qualitative impact of an optimization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum Impact {
    #[allow(missing_docs)]
    Positive,
    #[allow(missing_docs)]
    Neutral,
    #[allow(missing_docs)]
    Negative,
}

impl Impact {
    /// The storage representation of the impact
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Neutral => "neutral",
            Self::Negative => "negative",
        }
    }
}

impl FromStr for Impact {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "positive" => Ok(Self::Positive),
            "neutral" => Ok(Self::Neutral),
            "negative" => Ok(Self::Negative),
            other => Err(ValidationError::UnknownImpact(other.to_owned())),
        }
    }
}

/// The observed result of an optimization.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Outcome {
    /// Identifier
    pub id: OutcomeId,
    /// The optimization being assessed
    pub optimization_id: OptimizationId,
    /// Qualitative impact
    pub impact: Impact,
    /// What happened
    pub description: String,
    /// When it was assessed
    pub date: Date,
    /// Additional remarks
    pub observations: Option<String>,
}

/// A descriptive report about a process.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Report {
    /// Identifier
    pub id: ReportId,
    /// The process reported on
    pub process_id: ProcessId,
    /// Report date
    pub date: Date,
    /// One-line summary
    pub summary: String,
    /// Body
    pub details: String,
    /// Author
    pub created_by: String,
}

/// A generative model used in one or more processes.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AiModel {
    /// Identifier
    pub id: AiModelId,
    /// Model name
    pub name: String,
    /// Free-form description
    pub description: String,
    /// When the model was trained
    pub training_date: Date,
    /// Accuracy on process optimization, in percent
    pub accuracy: f64,
}

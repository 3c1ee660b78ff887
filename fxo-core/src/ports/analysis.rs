use crate::models::{Dataset, DatasetQuery};
use std::future::Future;

/// Read access for the performance analyzer.
pub trait AnalysisRepository: super::Repository {
    /// Snapshot the transactions and optimizations inside the query window.
    ///
    /// Both lists must come from the same consistent read.
    fn dataset(
        &self,
        query: DatasetQuery,
    ) -> impl Future<Output = Result<Dataset, Self::Error>> + Send;
}

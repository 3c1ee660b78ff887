use crate::Db;
use crate::types::{OptimizationFactRow, TransactionFactRow};
use fxo_core::{
    models::{Dataset, DatasetQuery, TransactionFact},
    ports::AnalysisRepository,
};

impl AnalysisRepository for Db {
    async fn dataset(&self, query: DatasetQuery) -> Result<Dataset, Self::Error> {
        // Both reads share one transaction so they observe the same snapshot
        let mut tx = self.reader.begin().await?;

        let transactions = sqlx::query_as::<_, TransactionFactRow>(
            r#"
            select
                x.process_id,
                x.date,
                f.code as from_code,
                t.code as to_code,
                x.amount,
                r.rate
            from
                exchange_transaction x
            join
                currency f on f.id = x.from_currency_id
            join
                currency t on t.id = x.to_currency_id
            join
                exchange_rate r on r.id = x.rate_id
            where
                ($1 is null or x.date >= $1)
            and
                ($2 is null or x.date <= $2)
            order by
                x.date asc, x.rowid asc
            "#,
        )
        .bind(query.since)
        .bind(query.until)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(TransactionFact::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        let optimizations = sqlx::query_as::<_, OptimizationFactRow>(
            r#"
            select
                process_id,
                implementation_date,
                efficiency_improvement,
                cost_reduction,
                processing_time_reduction
            from
                optimization
            where
                ($1 is null or implementation_date >= $1)
            and
                ($2 is null or implementation_date <= $2)
            order by
                implementation_date asc, rowid asc
            "#,
        )
        .bind(query.since)
        .bind(query.until)
        .fetch_all(&mut *tx)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

        tx.commit().await?;

        Ok(Dataset {
            transactions,
            optimizations,
        })
    }
}

use crate::Db;
use crate::types::{OptimizationRow, ProcessRow, RateRow, TransactionRow};
use fxo_core::{
    models::{
        CurrencyCode, Date, ExchangeRate, LogisticProcess, Optimization, ProcessId, Transaction,
    },
    ports::ProcessRepository,
};
use uuid::Uuid;

impl ProcessRepository for Db {
    async fn get_process(&self, id: ProcessId) -> Result<Option<LogisticProcess>, Self::Error> {
        sqlx::query_as::<_, ProcessRow>(
            r#"
            select
                id, house_id, process_type_id, start_date, end_date, status
            from
                logistic_process
            where
                id = $1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.reader)
        .await?
        .map(LogisticProcess::try_from)
        .transpose()
    }

    async fn first_transaction(&self, id: ProcessId) -> Result<Option<Transaction>, Self::Error> {
        // insertion order (rowid) breaks ties between same-day transactions
        sqlx::query_as::<_, TransactionRow>(
            r#"
            select
                x.id,
                x.process_id,
                x.date,
                f.code as from_code,
                t.code as to_code,
                x.amount,
                x.rate_id
            from
                exchange_transaction x
            join
                currency f on f.id = x.from_currency_id
            join
                currency t on t.id = x.to_currency_id
            where
                x.process_id = $1
            order by
                x.date asc, x.rowid asc
            limit 1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.reader)
        .await?
        .map(Transaction::try_from)
        .transpose()
    }

    async fn rate_on_or_before(
        &self,
        from: &CurrencyCode,
        to: &CurrencyCode,
        date: Date,
    ) -> Result<Option<ExchangeRate>, Self::Error> {
        sqlx::query_as::<_, RateRow>(
            r#"
            select
                r.id,
                f.code as from_code,
                t.code as to_code,
                r.date,
                r.rate
            from
                exchange_rate r
            join
                currency f on f.id = r.from_currency_id
            join
                currency t on t.id = r.to_currency_id
            where
                f.code = $1
            and
                t.code = $2
            and
                r.date <= $3
            order by
                r.date desc
            limit 1
            "#,
        )
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(date)
        .fetch_optional(&self.reader)
        .await?
        .map(ExchangeRate::try_from)
        .transpose()
    }

    async fn latest_optimization(
        &self,
        id: ProcessId,
    ) -> Result<Option<Optimization>, Self::Error> {
        let row = sqlx::query_as::<_, OptimizationRow>(
            r#"
            select
                id,
                process_id,
                efficiency_improvement,
                cost_reduction,
                processing_time_reduction,
                implementation_date,
                notes
            from
                optimization
            where
                process_id = $1
            order by
                implementation_date desc, rowid desc
            limit 1
            "#,
        )
        .bind(Uuid::from(id))
        .fetch_optional(&self.reader)
        .await?;

        Ok(row.map(Into::into))
    }
}

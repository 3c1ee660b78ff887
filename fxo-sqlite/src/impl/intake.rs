use super::{Table, currency_id, exists};
use crate::Db;
use crate::types::RateRow;
use fxo_core::{
    failure::ValidationError,
    models::{
        AiModel, Currency, ExchangeHouse, ExchangeRate, LogisticProcess, Optimization, Outcome,
        ProcessId, ProcessType, Report, Transaction,
    },
    ports::{IntakeFailure, IntakeRepository},
};
use uuid::Uuid;

impl IntakeRepository for Db {
    async fn create_house(&self, house: ExchangeHouse) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            insert into
                exchange_house (id, name, location, founded, description)
            values
                ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::from(house.id))
        .bind(house.name)
        .bind(house.location)
        .bind(house.founded)
        .bind(house.description)
        .execute(&self.writer)
        .await?;

        Ok(())
    }

    async fn create_currency(
        &self,
        currency: Currency,
    ) -> Result<Result<(), IntakeFailure>, Self::Error> {
        let inserted = sqlx::query(
            r#"
            insert into
                currency (id, code, name)
            values
                ($1, $2, $3)
            on conflict
                do nothing
            "#,
        )
        .bind(Uuid::from(currency.id))
        .bind(currency.code.as_str())
        .bind(currency.name)
        .execute(&self.writer)
        .await?
        .rows_affected();

        Ok(if inserted == 0 {
            Err(IntakeFailure::Conflict("currency"))
        } else {
            Ok(())
        })
    }

    async fn create_rate(
        &self,
        rate: ExchangeRate,
    ) -> Result<Result<(), IntakeFailure>, Self::Error> {
        if let Err(error) = rate.validate() {
            return Ok(Err(error.into()));
        }

        let mut tx = self.writer.begin().await?;

        let (Some(from_id), Some(to_id)) = (
            currency_id(&mut tx, rate.from.as_str()).await?,
            currency_id(&mut tx, rate.to.as_str()).await?,
        ) else {
            return Ok(Err(IntakeFailure::MissingReference("currency")));
        };

        let inserted = sqlx::query(
            r#"
            insert into
                exchange_rate (id, from_currency_id, to_currency_id, date, rate)
            values
                ($1, $2, $3, $4, $5)
            on conflict
                do nothing
            "#,
        )
        .bind(Uuid::from(rate.id))
        .bind(from_id)
        .bind(to_id)
        .bind(rate.date)
        .bind(rate.rate)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(if inserted == 0 {
            Err(IntakeFailure::Conflict("exchange rate"))
        } else {
            Ok(())
        })
    }

    async fn create_process_type(&self, process_type: ProcessType) -> Result<(), Self::Error> {
        sqlx::query(
            r#"
            insert into
                process_type (id, name, description)
            values
                ($1, $2, $3)
            "#,
        )
        .bind(Uuid::from(process_type.id))
        .bind(process_type.name)
        .bind(process_type.description)
        .execute(&self.writer)
        .await?;

        Ok(())
    }

    async fn create_process(
        &self,
        process: LogisticProcess,
    ) -> Result<Result<(), IntakeFailure>, Self::Error> {
        if let Err(error) = process.validate() {
            return Ok(Err(error.into()));
        }

        let mut tx = self.writer.begin().await?;

        if !exists(&mut tx, Table::House, process.house_id).await? {
            return Ok(Err(IntakeFailure::MissingReference("exchange house")));
        }
        if !exists(&mut tx, Table::ProcessType, process.process_type_id).await? {
            return Ok(Err(IntakeFailure::MissingReference("process type")));
        }

        let inserted = sqlx::query(
            r#"
            insert into
                logistic_process (id, house_id, process_type_id, start_date, end_date, status)
            values
                ($1, $2, $3, $4, $5, $6)
            on conflict
                do nothing
            "#,
        )
        .bind(Uuid::from(process.id))
        .bind(Uuid::from(process.house_id))
        .bind(Uuid::from(process.process_type_id))
        .bind(process.start_date)
        .bind(process.end_date)
        .bind(process.status.as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(if inserted == 0 {
            Err(IntakeFailure::Conflict("process"))
        } else {
            Ok(())
        })
    }

    async fn create_transaction(
        &self,
        transaction: Transaction,
    ) -> Result<Result<(), IntakeFailure>, Self::Error> {
        if let Err(error) = transaction.validate() {
            return Ok(Err(error.into()));
        }

        let mut tx = self.writer.begin().await?;

        if !exists(&mut tx, Table::Process, transaction.process_id).await? {
            return Ok(Err(IntakeFailure::MissingReference("process")));
        }

        let rate = sqlx::query_as::<_, RateRow>(
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
                r.id = $1
            "#,
        )
        .bind(Uuid::from(transaction.rate_id))
        .fetch_optional(&mut *tx)
        .await?
        .map(ExchangeRate::try_from)
        .transpose()?;

        let Some(rate) = rate else {
            return Ok(Err(IntakeFailure::MissingReference("exchange rate")));
        };

        if !rate.applies_to(
            &transaction.from_currency,
            &transaction.to_currency,
            transaction.date,
        ) {
            return Ok(Err(ValidationError::RateMismatch {
                from: transaction.from_currency.clone(),
                to: transaction.to_currency.clone(),
                date: transaction.date,
            }
            .into()));
        }

        // the rate matched the pair, so its currency ids are the transaction's
        let inserted = sqlx::query(
            r#"
            insert into
                exchange_transaction (id, process_id, date, from_currency_id, to_currency_id, amount, rate_id)
            select
                $1, $2, $3, r.from_currency_id, r.to_currency_id, $4, r.id
            from
                exchange_rate r
            where
                r.id = $5
            on conflict
                do nothing
            "#,
        )
        .bind(Uuid::from(transaction.id))
        .bind(Uuid::from(transaction.process_id))
        .bind(transaction.date)
        .bind(transaction.amount)
        .bind(Uuid::from(transaction.rate_id))
        .execute(&mut *tx)
        .await?
        .rows_affected();

        tx.commit().await?;

        Ok(if inserted == 0 {
            Err(IntakeFailure::Conflict("transaction"))
        } else {
            Ok(())
        })
    }

    async fn create_optimization(
        &self,
        optimization: Optimization,
    ) -> Result<Result<(), IntakeFailure>, Self::Error> {
        if let Err(error) = optimization.validate() {
            return Ok(Err(error.into()));
        }

        let mut tx = self.writer.begin().await?;

        if !exists(&mut tx, Table::Process, optimization.process_id).await? {
            return Ok(Err(IntakeFailure::MissingReference("process")));
        }

        sqlx::query(
            r#"
            insert into
                optimization (
                    id,
                    process_id,
                    efficiency_improvement,
                    cost_reduction,
                    processing_time_reduction,
                    implementation_date,
                    notes
                )
            values
                ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::from(optimization.id))
        .bind(Uuid::from(optimization.process_id))
        .bind(optimization.efficiency_improvement)
        .bind(optimization.cost_reduction)
        .bind(optimization.processing_time_reduction)
        .bind(optimization.implementation_date)
        .bind(optimization.notes)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Ok(()))
    }

    async fn create_outcome(
        &self,
        outcome: Outcome,
    ) -> Result<Result<(), IntakeFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        if !exists(&mut tx, Table::Optimization, outcome.optimization_id).await? {
            return Ok(Err(IntakeFailure::MissingReference("optimization")));
        }

        sqlx::query(
            r#"
            insert into
                outcome (id, optimization_id, impact, description, date, observations)
            values
                ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::from(outcome.id))
        .bind(Uuid::from(outcome.optimization_id))
        .bind(outcome.impact.as_str())
        .bind(outcome.description)
        .bind(outcome.date)
        .bind(outcome.observations)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Ok(()))
    }

    async fn create_report(
        &self,
        report: Report,
    ) -> Result<Result<(), IntakeFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        if !exists(&mut tx, Table::Process, report.process_id).await? {
            return Ok(Err(IntakeFailure::MissingReference("process")));
        }

        sqlx::query(
            r#"
            insert into
                report (id, process_id, date, summary, details, created_by)
            values
                ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::from(report.id))
        .bind(Uuid::from(report.process_id))
        .bind(report.date)
        .bind(report.summary)
        .bind(report.details)
        .bind(report.created_by)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Ok(()))
    }

    async fn create_ai_model(
        &self,
        model: AiModel,
        processes: Vec<ProcessId>,
    ) -> Result<Result<(), IntakeFailure>, Self::Error> {
        let mut tx = self.writer.begin().await?;

        for process_id in &processes {
            if !exists(&mut tx, Table::Process, *process_id).await? {
                return Ok(Err(IntakeFailure::MissingReference("process")));
            }
        }

        sqlx::query(
            r#"
            insert into
                ai_model (id, name, description, training_date, accuracy)
            values
                ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::from(model.id))
        .bind(model.name)
        .bind(model.description)
        .bind(model.training_date)
        .bind(model.accuracy)
        .execute(&mut *tx)
        .await?;

        for process_id in processes {
            sqlx::query(
                r#"
                insert into
                    ai_model_process (ai_model_id, process_id)
                values
                    ($1, $2)
                on conflict
                    do nothing
                "#,
            )
            .bind(Uuid::from(model.id))
            .bind(Uuid::from(process_id))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(Ok(()))
    }
}

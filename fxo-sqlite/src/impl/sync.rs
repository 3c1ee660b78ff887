use super::{Table, currency_id, exists};
use crate::Db;
use crate::types::{ProcessExtractRow, TransactionExtractRow};
use fxo_core::{
    failure::LookupFailure,
    models::{
        ProcessExtract, ProcessUpdate, RowOutcome, TransactionExtract, TransactionId,
        TransactionUpsert,
    },
    ports::SyncRepository,
};
use sqlx::SqliteConnection;
use uuid::Uuid;

impl SyncRepository for Db {
    async fn extract_processes(&self) -> Result<Vec<ProcessExtract>, Self::Error> {
        let rows = sqlx::query_as::<_, ProcessExtractRow>(
            r#"
            select
                p.id,
                h.name as house,
                k.name as process_type,
                p.start_date,
                p.end_date,
                p.status
            from
                logistic_process p
            join
                exchange_house h on h.id = p.house_id
            join
                process_type k on k.id = p.process_type_id
            order by
                p.rowid asc
            "#,
        )
        .fetch_all(&self.reader)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn extract_transactions(&self) -> Result<Vec<TransactionExtract>, Self::Error> {
        let rows = sqlx::query_as::<_, TransactionExtractRow>(
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
            order by
                x.process_id asc, x.date asc, x.rowid asc
            "#,
        )
        .fetch_all(&self.reader)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn load_processes(&self, rows: Vec<ProcessUpdate>) -> Result<Vec<RowOutcome>, Self::Error> {
        let mut tx = self.writer.begin().await?;
        let mut outcomes = Vec::with_capacity(rows.len());

        for row in rows {
            outcomes.push(load_process(&mut tx, row).await?);
        }

        tx.commit().await?;
        Ok(outcomes)
    }

    async fn load_transactions(
        &self,
        rows: Vec<TransactionUpsert>,
    ) -> Result<Vec<Result<RowOutcome, LookupFailure>>, Self::Error> {
        let mut tx = self.writer.begin().await?;
        let mut outcomes = Vec::with_capacity(rows.len());

        for row in rows {
            outcomes.push(load_transaction(&mut tx, row).await?);
        }

        tx.commit().await?;
        Ok(outcomes)
    }
}

async fn load_process(
    conn: &mut SqliteConnection,
    row: ProcessUpdate,
) -> Result<RowOutcome, sqlx::Error> {
    let id = Uuid::from(row.id);
    if !exists(&mut *conn, Table::Process, id).await? {
        return Ok(RowOutcome::Missing);
    }

    // Writes only happen when a value differs, which keeps repeated runs free
    let process = sqlx::query(
        r#"
        update
            logistic_process
        set
            status = $2, start_date = $3, end_date = $4
        where
            id = $1
        and
            (status is not $2 or start_date is not $3 or end_date is not $4)
        "#,
    )
    .bind(id)
    .bind(row.status.as_str())
    .bind(row.start_date)
    .bind(row.end_date)
    .execute(&mut *conn)
    .await?
    .rows_affected();

    let aggregates = row.metrics.aggregates;
    let metrics = sqlx::query(
        r#"
        insert into
            process_metrics (process_id, duration_days, total_amount, transaction_count, mean_rate)
        values
            ($1, $2, $3, $4, $5)
        on conflict (process_id) do update set
            duration_days = excluded.duration_days,
            total_amount = excluded.total_amount,
            transaction_count = excluded.transaction_count,
            mean_rate = excluded.mean_rate
        where
            process_metrics.duration_days is not excluded.duration_days
        or
            process_metrics.total_amount is not excluded.total_amount
        or
            process_metrics.transaction_count is not excluded.transaction_count
        or
            process_metrics.mean_rate is not excluded.mean_rate
        "#,
    )
    .bind(id)
    .bind(row.metrics.duration_days)
    .bind(aggregates.map(|a| a.total_amount))
    .bind(aggregates.map(|a| i64::from(a.transaction_count)))
    .bind(aggregates.map(|a| a.mean_rate))
    .execute(&mut *conn)
    .await?
    .rows_affected();

    Ok(if process + metrics > 0 {
        RowOutcome::Updated
    } else {
        RowOutcome::Unchanged
    })
}

async fn load_transaction(
    conn: &mut SqliteConnection,
    row: TransactionUpsert,
) -> Result<Result<RowOutcome, LookupFailure>, sqlx::Error> {
    let Some(from_id) = currency_id(&mut *conn, &row.from_currency).await? else {
        return Ok(Err(LookupFailure::Currency {
            code: row.from_currency,
        }));
    };
    let Some(to_id) = currency_id(&mut *conn, &row.to_currency).await? else {
        return Ok(Err(LookupFailure::Currency {
            code: row.to_currency,
        }));
    };

    // The rate is identified by its value: the latest publication of the pair
    // at that value, on or before the transaction date.
    let rate_id: Option<Uuid> = sqlx::query_scalar(
        r#"
        select
            id
        from
            exchange_rate
        where
            from_currency_id = $1
        and
            to_currency_id = $2
        and
            rate = $3
        and
            date <= $4
        order by
            date desc
        limit 1
        "#,
    )
    .bind(from_id)
    .bind(to_id)
    .bind(row.rate)
    .bind(row.date)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(rate_id) = rate_id else {
        return Ok(Err(LookupFailure::Rate {
            from: row.from_currency,
            to: row.to_currency,
            rate: row.rate,
            date: row.date,
        }));
    };

    let process_id = Uuid::from(row.process_id);
    let existing: Option<(Uuid, Uuid, Uuid, f64, Uuid)> = sqlx::query_as(
        r#"
        select
            id, from_currency_id, to_currency_id, amount, rate_id
        from
            exchange_transaction
        where
            process_id = $1
        and
            date = $2
        "#,
    )
    .bind(process_id)
    .bind(row.date)
    .fetch_optional(&mut *conn)
    .await?;

    let outcome = match existing {
        Some((_, from, to, amount, rate))
            if from == from_id && to == to_id && amount == row.amount && rate == rate_id =>
        {
            RowOutcome::Unchanged
        }
        Some((id, ..)) => {
            sqlx::query(
                r#"
                update
                    exchange_transaction
                set
                    from_currency_id = $2, to_currency_id = $3, amount = $4, rate_id = $5
                where
                    id = $1
                "#,
            )
            .bind(id)
            .bind(from_id)
            .bind(to_id)
            .bind(row.amount)
            .bind(rate_id)
            .execute(&mut *conn)
            .await?;
            RowOutcome::Updated
        }
        None => {
            if !exists(&mut *conn, Table::Process, process_id).await? {
                return Ok(Ok(RowOutcome::Missing));
            }

            sqlx::query(
                r#"
                insert into
                    exchange_transaction (id, process_id, date, from_currency_id, to_currency_id, amount, rate_id)
                values
                    ($1, $2, $3, $4, $5, $6, $7)
                "#,
            )
            .bind(Uuid::from(TransactionId::random()))
            .bind(process_id)
            .bind(row.date)
            .bind(from_id)
            .bind(to_id)
            .bind(row.amount)
            .bind(rate_id)
            .execute(&mut *conn)
            .await?;
            RowOutcome::Inserted
        }
    };

    Ok(Ok(outcome))
}

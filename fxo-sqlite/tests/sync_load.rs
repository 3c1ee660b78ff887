mod common;

use common::World;
use fxo_core::{
    failure::LookupFailure,
    models::{
        ProcessId, ProcessMetrics, ProcessStatus, ProcessUpdate, RowOutcome,
        TransactionAggregates, TransactionUpsert,
    },
    ports::{ProcessRepository, SyncRepository},
};
use time::macros::date;

#[tokio::test]
async fn extraction_joins_names_and_rates() -> anyhow::Result<()> {
    let world = World::new().await?;
    let process = world
        .process(date!(2024 - 01 - 01), None, ProcessStatus::InProgress)
        .await?;
    world
        .transaction(process, date!(2024 - 02 - 10), 300.0, 1)
        .await?;
    world
        .transaction(process, date!(2024 - 01 - 05), 100.0, 0)
        .await?;

    let processes = world.db.extract_processes().await?;
    assert_eq!(processes.len(), 1);
    assert_eq!(processes[0].id, Some(process));
    assert_eq!(processes[0].house, "Casa Central");
    assert_eq!(processes[0].process_type, "Cash Transfer");
    assert_eq!(processes[0].start_date, "2024-01-01");
    assert_eq!(processes[0].end_date, None);
    assert_eq!(processes[0].status, "in_progress");

    let transactions = world.db.extract_transactions().await?;
    let dates: Vec<&str> = transactions.iter().map(|t| t.date.as_str()).collect();
    assert_eq!(dates, vec!["2024-01-05", "2024-02-10"]);
    assert_eq!(transactions[0].from_currency, "USD");
    assert_eq!(transactions[0].rate, 0.91);
    Ok(())
}

#[tokio::test]
async fn process_loads_only_write_changes() -> anyhow::Result<()> {
    let world = World::new().await?;
    let process = world
        .process(date!(2024 - 01 - 01), None, ProcessStatus::InProgress)
        .await?;

    let update = ProcessUpdate {
        id: process,
        status: ProcessStatus::Completed,
        start_date: date!(2024 - 01 - 01),
        end_date: Some(date!(2024 - 01 - 31)),
        metrics: ProcessMetrics {
            duration_days: 30,
            aggregates: Some(TransactionAggregates {
                total_amount: 400.0,
                transaction_count: 2,
                mean_rate: 0.92,
            }),
        },
    };
    let missing = ProcessUpdate {
        id: ProcessId::random(),
        ..update.clone()
    };

    let first = world
        .db
        .load_processes(vec![update.clone(), missing])
        .await?;
    assert_eq!(first, vec![RowOutcome::Updated, RowOutcome::Missing]);

    let stored = world.db.get_process(process).await?.expect("the process");
    assert_eq!(stored.status, ProcessStatus::Completed);
    assert_eq!(stored.end_date, Some(date!(2024 - 01 - 31)));

    let second = world.db.load_processes(vec![update.clone()]).await?;
    assert_eq!(second, vec![RowOutcome::Unchanged]);

    // a metrics change alone is still a write
    let reopened = ProcessUpdate {
        metrics: ProcessMetrics {
            duration_days: 30,
            aggregates: None,
        },
        ..update
    };
    let third = world.db.load_processes(vec![reopened]).await?;
    assert_eq!(third, vec![RowOutcome::Updated]);
    Ok(())
}

#[tokio::test]
async fn transaction_loads_upsert_on_process_and_day() -> anyhow::Result<()> {
    let world = World::new().await?;
    let process = world
        .process(date!(2024 - 01 - 01), None, ProcessStatus::InProgress)
        .await?;
    world
        .transaction(process, date!(2024 - 01 - 05), 100.0, 0)
        .await?;

    let existing = TransactionUpsert {
        process_id: process,
        date: date!(2024 - 01 - 05),
        from_currency: "USD".to_owned(),
        to_currency: "EUR".to_owned(),
        amount: 100.0,
        rate: 0.91,
    };
    let changed = TransactionUpsert {
        date: date!(2024 - 01 - 05),
        amount: 125.0,
        ..existing.clone()
    };
    let fresh = TransactionUpsert {
        date: date!(2024 - 02 - 03),
        rate: 0.93,
        ..existing.clone()
    };

    let outcomes = world
        .db
        .load_transactions(vec![existing.clone(), fresh.clone()])
        .await?;
    assert_eq!(
        outcomes,
        vec![Ok(RowOutcome::Unchanged), Ok(RowOutcome::Inserted)]
    );

    let outcomes = world.db.load_transactions(vec![changed, fresh]).await?;
    assert_eq!(
        outcomes,
        vec![Ok(RowOutcome::Updated), Ok(RowOutcome::Unchanged)]
    );

    let transactions = world.db.extract_transactions().await?;
    assert_eq!(transactions.len(), 2);
    assert_eq!(transactions[0].amount, 125.0);
    Ok(())
}

#[tokio::test]
async fn unresolvable_rows_are_skipped() -> anyhow::Result<()> {
    let world = World::new().await?;
    let process = world
        .process(date!(2024 - 01 - 01), None, ProcessStatus::InProgress)
        .await?;

    let good = TransactionUpsert {
        process_id: process,
        date: date!(2024 - 01 - 05),
        from_currency: "USD".to_owned(),
        to_currency: "EUR".to_owned(),
        amount: 100.0,
        rate: 0.91,
    };
    let unknown_currency = TransactionUpsert {
        date: date!(2024 - 01 - 06),
        to_currency: "XAU".to_owned(),
        ..good.clone()
    };
    let unknown_rate = TransactionUpsert {
        date: date!(2024 - 01 - 07),
        rate: 0.5,
        ..good.clone()
    };
    // 0.93 exists but was published after this date
    let future_rate = TransactionUpsert {
        date: date!(2024 - 01 - 08),
        rate: 0.93,
        ..good.clone()
    };

    let outcomes = world
        .db
        .load_transactions(vec![unknown_currency, unknown_rate, future_rate, good])
        .await?;

    assert_eq!(
        outcomes[0],
        Err(LookupFailure::Currency {
            code: "XAU".to_owned()
        })
    );
    assert!(matches!(outcomes[1], Err(LookupFailure::Rate { rate, .. }) if rate == 0.5));
    assert!(matches!(outcomes[2], Err(LookupFailure::Rate { .. })));
    assert_eq!(outcomes[3], Ok(RowOutcome::Inserted));

    assert_eq!(world.db.extract_transactions().await?.len(), 1);
    Ok(())
}

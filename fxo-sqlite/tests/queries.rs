mod common;

use common::{World, code};
use fxo_core::{
    models::{DatasetQuery, Optimization, OptimizationId, ProcessId, ProcessStatus},
    ports::{AnalysisRepository, IntakeRepository, ProcessRepository},
};
use time::macros::date;

#[tokio::test]
async fn rates_resolve_to_the_latest_publication() -> anyhow::Result<()> {
    let world = World::new().await?;
    let (usd, eur) = (code("USD"), code("EUR"));

    let january = world
        .db
        .rate_on_or_before(&usd, &eur, date!(2024 - 01 - 31))
        .await?
        .expect("january rate");
    assert_eq!(january.rate, 0.91);

    let february = world
        .db
        .rate_on_or_before(&usd, &eur, date!(2024 - 02 - 01))
        .await?
        .expect("february rate");
    assert_eq!(february.rate, 0.93);

    assert!(
        world
            .db
            .rate_on_or_before(&usd, &eur, date!(2023 - 12 - 31))
            .await?
            .is_none()
    );
    assert!(
        world
            .db
            .rate_on_or_before(&eur, &usd, date!(2024 - 03 - 01))
            .await?
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn first_transaction_is_the_earliest() -> anyhow::Result<()> {
    let world = World::new().await?;
    let process = world
        .process(date!(2024 - 01 - 01), None, ProcessStatus::InProgress)
        .await?;

    world
        .transaction(process, date!(2024 - 02 - 10), 300.0, 1)
        .await?;
    let earliest = world
        .transaction(process, date!(2024 - 01 - 05), 100.0, 0)
        .await?;

    let first = world
        .db
        .first_transaction(process)
        .await?
        .expect("a transaction");
    assert_eq!(first.id, earliest);
    assert_eq!(first.from_currency, code("USD"));
    assert_eq!(first.to_currency, code("EUR"));

    assert!(world.db.first_transaction(ProcessId::random()).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn latest_optimization_wins() -> anyhow::Result<()> {
    let world = World::new().await?;
    let process = world
        .process(date!(2024 - 01 - 01), None, ProcessStatus::InProgress)
        .await?;

    assert!(world.db.latest_optimization(process).await?.is_none());

    for (day, pct) in [(date!(2024 - 03 - 01), 12.0), (date!(2024 - 02 - 01), 5.0)] {
        world
            .db
            .create_optimization(Optimization {
                id: OptimizationId::random(),
                process_id: process,
                efficiency_improvement: pct,
                cost_reduction: 3.0,
                processing_time_reduction: 8.0,
                implementation_date: day,
                notes: None,
            })
            .await??;
    }

    let latest = world
        .db
        .latest_optimization(process)
        .await?
        .expect("an optimization");
    assert_eq!(latest.efficiency_improvement, 12.0);
    assert_eq!(latest.implementation_date, date!(2024 - 03 - 01));
    Ok(())
}

#[tokio::test]
async fn dataset_bounds_are_inclusive() -> anyhow::Result<()> {
    let world = World::new().await?;
    let process = world
        .process(date!(2024 - 01 - 01), None, ProcessStatus::InProgress)
        .await?;

    world
        .transaction(process, date!(2024 - 01 - 05), 100.0, 0)
        .await?;
    world
        .transaction(process, date!(2024 - 01 - 20), 200.0, 0)
        .await?;
    world
        .transaction(process, date!(2024 - 02 - 10), 300.0, 1)
        .await?;

    let everything = world.db.dataset(DatasetQuery::default()).await?;
    assert_eq!(everything.transactions.len(), 3);
    assert_eq!(everything.transactions[2].rate, 0.93);

    let window = world
        .db
        .dataset(DatasetQuery {
            since: Some(date!(2024 - 01 - 05)),
            until: Some(date!(2024 - 01 - 20)),
        })
        .await?;
    let amounts: Vec<f64> = window.transactions.iter().map(|t| t.amount).collect();
    assert_eq!(amounts, vec![100.0, 200.0]);
    Ok(())
}

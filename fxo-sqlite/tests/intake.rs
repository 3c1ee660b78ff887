mod common;

use common::{World, code};
use fxo_core::{
    failure::ValidationError,
    models::{
        Currency, CurrencyId, ExchangeRate, HouseId, LogisticProcess, ProcessId, ProcessStatus,
        RateId, Transaction, TransactionId,
    },
    ports::{IntakeFailure, IntakeRepository},
};
use time::macros::date;

#[tokio::test]
async fn duplicate_currency_codes_conflict() -> anyhow::Result<()> {
    let world = World::new().await?;

    let outcome = world
        .db
        .create_currency(Currency {
            id: CurrencyId::random(),
            code: code("USD"),
            name: "Another Dollar".to_owned(),
        })
        .await?;
    assert_eq!(outcome, Err(IntakeFailure::Conflict("currency")));
    Ok(())
}

#[tokio::test]
async fn rates_are_unique_per_pair_and_day() -> anyhow::Result<()> {
    let world = World::new().await?;

    let duplicate = ExchangeRate {
        id: RateId::random(),
        from: code("USD"),
        to: code("EUR"),
        date: date!(2024 - 01 - 01),
        rate: 0.95,
    };
    assert_eq!(
        world.db.create_rate(duplicate).await?,
        Err(IntakeFailure::Conflict("exchange rate"))
    );

    let unknown = ExchangeRate {
        id: RateId::random(),
        from: code("USD"),
        to: code("JPY"),
        date: date!(2024 - 01 - 01),
        rate: 150.0,
    };
    assert_eq!(
        world.db.create_rate(unknown).await?,
        Err(IntakeFailure::MissingReference("currency"))
    );
    Ok(())
}

#[tokio::test]
async fn processes_must_not_end_before_they_start() -> anyhow::Result<()> {
    let world = World::new().await?;

    let outcome = world
        .db
        .create_process(LogisticProcess {
            id: ProcessId::random(),
            house_id: world.house,
            process_type_id: world.process_type,
            start_date: date!(2024 - 03 - 10),
            end_date: Some(date!(2024 - 03 - 01)),
            status: ProcessStatus::Completed,
        })
        .await?;
    assert!(matches!(
        outcome,
        Err(IntakeFailure::Invalid(ValidationError::EndBeforeStart { .. }))
    ));

    let orphan = world
        .db
        .create_process(LogisticProcess {
            id: ProcessId::random(),
            house_id: HouseId::random(),
            process_type_id: world.process_type,
            start_date: date!(2024 - 03 - 01),
            end_date: None,
            status: ProcessStatus::Pending,
        })
        .await?;
    assert_eq!(orphan, Err(IntakeFailure::MissingReference("exchange house")));
    Ok(())
}

#[tokio::test]
async fn transactions_must_reference_an_applicable_rate() -> anyhow::Result<()> {
    let world = World::new().await?;
    let process = world
        .process(date!(2024 - 01 - 01), None, ProcessStatus::InProgress)
        .await?;

    // the February rate was not yet published in January
    let early = Transaction {
        id: TransactionId::random(),
        process_id: process,
        date: date!(2024 - 01 - 15),
        from_currency: code("USD"),
        to_currency: code("EUR"),
        amount: 100.0,
        rate_id: world.rates[1].id,
    };
    assert!(matches!(
        world.db.create_transaction(early).await?,
        Err(IntakeFailure::Invalid(ValidationError::RateMismatch { .. }))
    ));

    // the pair is reversed
    let reversed = Transaction {
        id: TransactionId::random(),
        process_id: process,
        date: date!(2024 - 02 - 15),
        from_currency: code("EUR"),
        to_currency: code("USD"),
        amount: 100.0,
        rate_id: world.rates[1].id,
    };
    assert!(matches!(
        world.db.create_transaction(reversed).await?,
        Err(IntakeFailure::Invalid(ValidationError::RateMismatch { .. }))
    ));

    let negative = Transaction {
        id: TransactionId::random(),
        process_id: process,
        date: date!(2024 - 02 - 15),
        from_currency: code("USD"),
        to_currency: code("EUR"),
        amount: -5.0,
        rate_id: world.rates[1].id,
    };
    assert!(matches!(
        world.db.create_transaction(negative).await?,
        Err(IntakeFailure::Invalid(ValidationError::NonPositiveAmount(_)))
    ));
    Ok(())
}

#[tokio::test]
async fn one_transaction_per_process_and_day() -> anyhow::Result<()> {
    let world = World::new().await?;
    let process = world
        .process(date!(2024 - 01 - 01), None, ProcessStatus::InProgress)
        .await?;

    world
        .transaction(process, date!(2024 - 01 - 10), 100.0, 0)
        .await?;

    let again = Transaction {
        id: TransactionId::random(),
        process_id: process,
        date: date!(2024 - 01 - 10),
        from_currency: code("USD"),
        to_currency: code("EUR"),
        amount: 250.0,
        rate_id: world.rates[0].id,
    };
    assert_eq!(
        world.db.create_transaction(again).await?,
        Err(IntakeFailure::Conflict("transaction"))
    );
    Ok(())
}

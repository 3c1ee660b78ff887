#![allow(dead_code)]
use fxo_core::{
    models::{
        Currency, CurrencyCode, CurrencyId, Date, ExchangeHouse, ExchangeRate, HouseId,
        LogisticProcess, Optimization, OptimizationId, ProcessId, ProcessStatus, ProcessType,
        ProcessTypeId, RateId, Transaction, TransactionId,
    },
    ports::IntakeRepository,
};
use fxo_sqlite::{Db, config::SqliteConfig};
use time::macros::date;

pub fn code(value: &str) -> CurrencyCode {
    CurrencyCode::new(value).unwrap()
}

/// An exchange house with USD, EUR and GBP, trading USD to EUR at 1.25 from
/// the start of 2024.
pub struct Seeded {
    pub db: Db,
    pub house: HouseId,
    pub process_type: ProcessTypeId,
    pub usd_eur: RateId,
}

impl Seeded {
    pub async fn new() -> anyhow::Result<Self> {
        Self::open(&SqliteConfig::default()).await
    }

    pub async fn open(config: &SqliteConfig) -> anyhow::Result<Self> {
        let db = Db::open(config).await?;

        let house = HouseId::random();
        db.create_house(ExchangeHouse {
            id: house,
            name: "Cambio Norte".to_owned(),
            location: "Quito".to_owned(),
            founded: date!(2005 - 06 - 15),
            description: "Airport branch".to_owned(),
        })
        .await?;

        let process_type = ProcessTypeId::random();
        db.create_process_type(ProcessType {
            id: process_type,
            name: "Wire Settlement".to_owned(),
            description: "Interbank settlement".to_owned(),
        })
        .await?;

        for symbol in ["USD", "EUR", "GBP"] {
            db.create_currency(Currency {
                id: CurrencyId::random(),
                code: code(symbol),
                name: symbol.to_owned(),
            })
            .await??;
        }

        let usd_eur = RateId::random();
        db.create_rate(ExchangeRate {
            id: usd_eur,
            from: code("USD"),
            to: code("EUR"),
            date: date!(2024 - 01 - 01),
            rate: 1.25,
        })
        .await??;

        Ok(Self {
            db,
            house,
            process_type,
            usd_eur,
        })
    }

    pub async fn process(&self, start_date: Date, end_date: Option<Date>) -> anyhow::Result<ProcessId> {
        let id = ProcessId::random();
        self.db
            .create_process(LogisticProcess {
                id,
                house_id: self.house,
                process_type_id: self.process_type,
                start_date,
                end_date,
                status: if end_date.is_some() {
                    ProcessStatus::Completed
                } else {
                    ProcessStatus::InProgress
                },
            })
            .await??;
        Ok(id)
    }

    pub async fn transaction(&self, process_id: ProcessId, date: Date, amount: f64) -> anyhow::Result<()> {
        self.db
            .create_transaction(Transaction {
                id: TransactionId::random(),
                process_id,
                date,
                from_currency: code("USD"),
                to_currency: code("EUR"),
                amount,
                rate_id: self.usd_eur,
            })
            .await??;
        Ok(())
    }

    pub async fn optimization(&self, process_id: ProcessId, day: Date, pct: f64) -> anyhow::Result<()> {
        self.db
            .create_optimization(Optimization {
                id: OptimizationId::random(),
                process_id,
                efficiency_improvement: pct,
                cost_reduction: 5.0,
                processing_time_reduction: 12.0,
                implementation_date: day,
                notes: Some("route consolidation".to_owned()),
            })
            .await??;
        Ok(())
    }
}

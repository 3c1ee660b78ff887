#![allow(dead_code)]
use fxo_core::{
    models::{
        Currency, CurrencyCode, CurrencyId, Date, ExchangeHouse, ExchangeRate, HouseId,
        LogisticProcess, ProcessId, ProcessStatus, ProcessType, ProcessTypeId, RateId,
        Transaction, TransactionId,
    },
    ports::IntakeRepository,
};
use fxo_sqlite::{Db, config::SqliteConfig};
use time::macros::date;

/// A house with one process type, the USD and EUR currencies, and a USD/EUR
/// rate history.
pub struct World {
    pub db: Db,
    pub house: HouseId,
    pub process_type: ProcessTypeId,
    pub rates: Vec<ExchangeRate>,
}

pub fn code(value: &str) -> CurrencyCode {
    CurrencyCode::new(value).unwrap()
}

impl World {
    pub async fn new() -> anyhow::Result<Self> {
        let db = Db::open(&SqliteConfig::default()).await?;

        let house = HouseId::random();
        db.create_house(ExchangeHouse {
            id: house,
            name: "Casa Central".to_owned(),
            location: "Montevideo".to_owned(),
            founded: date!(1998 - 03 - 01),
            description: "Retail exchange".to_owned(),
        })
        .await?;

        let process_type = ProcessTypeId::random();
        db.create_process_type(ProcessType {
            id: process_type,
            name: "Cash Transfer".to_owned(),
            description: "Physical cash movement".to_owned(),
        })
        .await?;

        for (symbol, name) in [("USD", "US Dollar"), ("EUR", "Euro")] {
            db.create_currency(Currency {
                id: CurrencyId::random(),
                code: code(symbol),
                name: name.to_owned(),
            })
            .await??;
        }

        let mut rates = Vec::new();
        for (day, rate) in [(date!(2024 - 01 - 01), 0.91), (date!(2024 - 02 - 01), 0.93)] {
            let rate = ExchangeRate {
                id: RateId::random(),
                from: code("USD"),
                to: code("EUR"),
                date: day,
                rate,
            };
            db.create_rate(rate.clone()).await??;
            rates.push(rate);
        }

        Ok(Self {
            db,
            house,
            process_type,
            rates,
        })
    }

    pub async fn process(
        &self,
        start_date: Date,
        end_date: Option<Date>,
        status: ProcessStatus,
    ) -> anyhow::Result<ProcessId> {
        let id = ProcessId::random();
        self.db
            .create_process(LogisticProcess {
                id,
                house_id: self.house,
                process_type_id: self.process_type,
                start_date,
                end_date,
                status,
            })
            .await??;
        Ok(id)
    }

    /// Record a USD to EUR transaction against the given rate
    pub async fn transaction(
        &self,
        process_id: ProcessId,
        date: Date,
        amount: f64,
        rate: usize,
    ) -> anyhow::Result<TransactionId> {
        let id = TransactionId::random();
        self.db
            .create_transaction(Transaction {
                id,
                process_id,
                date,
                from_currency: code("USD"),
                to_currency: code("EUR"),
                amount,
                rate_id: self.rates[rate].id,
            })
            .await??;
        Ok(id)
    }
}

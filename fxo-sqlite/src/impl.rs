//! Repository trait implementations for the SQLite database.

use crate::Db;
use fxo_core::ports::Repository;
use sqlx::SqliteConnection;
use uuid::Uuid;

mod analysis;
mod intake;
mod process;
mod sync;

impl Repository for Db {
    type Error = sqlx::Error;
}

/// Tables whose rows are referenced by id from elsewhere
#[derive(Clone, Copy)]
pub(crate) enum Table {
    House,
    ProcessType,
    Process,
    Optimization,
}

impl Table {
    fn exists_query(self) -> &'static str {
        match self {
            Self::House => "select exists(select 1 from exchange_house where id = $1)",
            Self::ProcessType => "select exists(select 1 from process_type where id = $1)",
            Self::Process => "select exists(select 1 from logistic_process where id = $1)",
            Self::Optimization => "select exists(select 1 from optimization where id = $1)",
        }
    }
}

pub(crate) async fn exists(
    conn: &mut SqliteConnection,
    table: Table,
    id: impl Into<Uuid>,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>(table.exists_query())
        .bind(id.into())
        .fetch_one(conn)
        .await
}

pub(crate) async fn currency_id(
    conn: &mut SqliteConnection,
    code: &str,
) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("select id from currency where code = $1")
        .bind(code)
        .fetch_optional(conn)
        .await
}

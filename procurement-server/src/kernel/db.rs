#[cfg(test)]
use mockall::automock;
use {
    crate::{
        api::RestError,
        bid::repository::{
            BidTable,
            DecisionTable,
        },
        identity::repository::IdentityTable,
        review::repository::ReviewTable,
        tender::repository::TenderTable,
    },
    axum::async_trait,
    sqlx::{
        Pool,
        Postgres,
    },
    std::fmt::Debug,
};

pub type DB = Pool<Postgres>;

/// Entry point to the storage. Every service operation runs inside one transaction.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Debug + Send + Sync + 'static {
    async fn begin(&self) -> Result<Box<dyn Transaction>, RestError>;
}

/// A unit of work over every table of the service.
///
/// Dropping a transaction without calling `commit` discards all of its writes.
#[async_trait]
pub trait Transaction:
    TenderTable + BidTable + DecisionTable + IdentityTable + ReviewTable + Send
{
    async fn commit(self: Box<Self>) -> Result<(), RestError>;
}

pub struct PgTransaction(pub(crate) sqlx::Transaction<'static, Postgres>);

#[async_trait]
impl Database for DB {
    #[tracing::instrument(
        target = "metrics",
        name = "db_begin",
        fields(
            category = "db_queries",
            result = "success",
            name = "begin",
            tracing_enabled
        ),
        skip_all
    )]
    async fn begin(&self) -> Result<Box<dyn Transaction>, RestError> {
        let transaction = Pool::begin(self).await.map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), "DB: Failed to begin transaction");
            RestError::TemporarilyUnavailable
        })?;
        Ok(Box::new(PgTransaction(transaction)))
    }
}

#[async_trait]
impl Transaction for PgTransaction {
    #[tracing::instrument(
        target = "metrics",
        name = "db_commit",
        fields(
            category = "db_queries",
            result = "success",
            name = "commit",
            tracing_enabled
        ),
        skip_all
    )]
    async fn commit(self: Box<Self>) -> Result<(), RestError> {
        self.0.commit().await.map_err(|e| {
            tracing::Span::current().record("result", "error");
            tracing::error!(error = e.to_string(), "DB: Failed to commit transaction");
            RestError::TemporarilyUnavailable
        })
    }
}

/// Marks the current db span as failed and maps the driver error to the one returned to clients.
pub(crate) fn map_db_error(action: &'static str) -> impl FnOnce(sqlx::Error) -> RestError {
    move |e| {
        tracing::Span::current().record("result", "error");
        tracing::error!(error = e.to_string(), "DB: Failed to {}", action);
        RestError::TemporarilyUnavailable
    }
}

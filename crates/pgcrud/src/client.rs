//! Generic client trait for unified database access.

use crate::error::{CrudError, CrudResult};
use tokio_postgres::types::ToSql;
use tokio_postgres::{Row, SimpleQueryMessage, SimpleQueryRow};

/// A trait that unifies database clients and transactions.
///
/// Catalog lookups and statements accept either a pooled connection or a
/// transaction on it, so the same code runs inside and outside the
/// per-statement transaction used for mutations.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = CrudResult<Vec<Row>>> + Send;

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl std::future::Future<Output = CrudResult<u64>> + Send;

    /// Run a parameterless query over the text protocol.
    ///
    /// Every column comes back as text regardless of its SQL type, which is
    /// what record listings need for columns the codec cannot decode.
    fn query_text(
        &self,
        sql: &str,
    ) -> impl std::future::Future<Output = CrudResult<Vec<SimpleQueryRow>>> + Send;

    /// Return a cancellation token for the underlying connection, if supported.
    ///
    /// This enables best-effort server-side query cancellation when a timeout triggers.
    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        None
    }
}

fn text_rows(messages: Vec<SimpleQueryMessage>) -> Vec<SimpleQueryRow> {
    messages
        .into_iter()
        .filter_map(|m| match m {
            SimpleQueryMessage::Row(row) => Some(row),
            _ => None,
        })
        .collect()
}

impl GenericClient for tokio_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<Vec<Row>> {
        tokio_postgres::Client::query(self, sql, params)
            .await
            .map_err(CrudError::execution)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<u64> {
        tokio_postgres::Client::execute(self, sql, params)
            .await
            .map_err(CrudError::execution)
    }

    async fn query_text(&self, sql: &str) -> CrudResult<Vec<SimpleQueryRow>> {
        tokio_postgres::Client::simple_query(self, sql)
            .await
            .map(text_rows)
            .map_err(CrudError::execution)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Client::cancel_token(self))
    }
}

impl GenericClient for tokio_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<Vec<Row>> {
        tokio_postgres::Transaction::query(self, sql, params)
            .await
            .map_err(CrudError::execution)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<u64> {
        tokio_postgres::Transaction::execute(self, sql, params)
            .await
            .map_err(CrudError::execution)
    }

    async fn query_text(&self, sql: &str) -> CrudResult<Vec<SimpleQueryRow>> {
        tokio_postgres::Transaction::simple_query(self, sql)
            .await
            .map(text_rows)
            .map_err(CrudError::execution)
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        Some(tokio_postgres::Transaction::cancel_token(self))
    }
}

// ===== deadpool-postgres support =====

impl GenericClient for deadpool_postgres::Client {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<Vec<Row>> {
        // Delegate to the deref target (ClientWrapper / tokio_postgres::Client).
        GenericClient::query(&***self, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<u64> {
        GenericClient::execute(&***self, sql, params).await
    }

    async fn query_text(&self, sql: &str) -> CrudResult<Vec<SimpleQueryRow>> {
        GenericClient::query_text(&***self, sql).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        GenericClient::cancel_token(&***self)
    }
}

impl GenericClient for deadpool_postgres::Transaction<'_> {
    async fn query(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<Vec<Row>> {
        GenericClient::query(&**self, sql, params).await
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> CrudResult<u64> {
        GenericClient::execute(&**self, sql, params).await
    }

    async fn query_text(&self, sql: &str) -> CrudResult<Vec<SimpleQueryRow>> {
        GenericClient::query_text(&**self, sql).await
    }

    fn cancel_token(&self) -> Option<tokio_postgres::CancelToken> {
        GenericClient::cancel_token(&**self)
    }
}

//! The CRUD entry point.
//!
//! [`DatabaseManager`] owns the pool and runs every metadata lookup and data
//! statement through one *session*: a pooled connection plus, in
//! [`AccessMode::Exclusive`], the manager-wide gate. Mutations run inside a
//! transaction of their own that is committed on success and rolled back on
//! failure. Reads run without a transaction.
//!
//! Column names and types are looked up fresh for every call. A table altered
//! between the lookup and the statement surfaces as a backend error.

use std::future::Future;
use std::time::Duration;

use deadpool_postgres::{Pool, PoolError};
use tokio::sync::{Mutex, MutexGuard};
use tokio_postgres::{CancelToken, NoTls};

use crate::catalog::{self, ColumnMeta};
use crate::client::GenericClient;
use crate::codec::{self, BoundValue, DeclaredType};
use crate::config::{AccessMode, ManagerConfig};
use crate::error::{CrudError, CrudResult};
use crate::pool;
use crate::qb::{self, SqlQb};
use crate::record::{Field, Record};
use crate::trace::TracingSqlHook;

/// Shared handle to the backend.
///
/// Cheap to share behind an `Arc`; every method takes `&self`.
///
/// # Example
///
/// ```ignore
/// use pgcrud::{DatabaseManager, ManagerConfig, Record};
///
/// let db = DatabaseManager::connect("postgres://localhost/school", ManagerConfig::default()).await?;
/// let student = Record::new()
///     .with("id", "1", "integer")?
///     .with("name", "Ana", "character varying")?;
/// db.insert("school", "student", &student).await?;
/// for record in db.select_all("school", "student").await? {
///     println!("{record}");
/// }
/// ```
pub struct DatabaseManager {
    pool: Pool,
    config: ManagerConfig,
    gate: Option<Mutex<()>>,
    sql_hook: Option<TracingSqlHook>,
}

/// A checked-out connection, holding the gate when there is one.
///
/// Fields drop in order: the connection goes back to the pool before the gate
/// opens.
struct Session<'a> {
    client: deadpool_postgres::Client,
    _guard: Option<MutexGuard<'a, ()>>,
}

impl std::fmt::Debug for DatabaseManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseManager")
            .field("config", &self.config)
            .field("pool", &self.pool.status())
            .finish_non_exhaustive()
    }
}

impl DatabaseManager {
    /// Wrap an existing pool. No connection is made.
    pub fn new(pool: Pool, config: ManagerConfig) -> Self {
        let gate = match config.access_mode {
            AccessMode::Exclusive => Some(Mutex::new(())),
            AccessMode::Pooled => None,
        };
        let sql_hook = config.log_sql.then(|| {
            let hook = TracingSqlHook::new().level(config.sql_log_level);
            match config.max_logged_sql {
                Some(max) => hook.max_sql_length(max),
                None => hook.no_truncate(),
            }
        });
        Self {
            pool,
            config,
            gate,
            sql_hook,
        }
    }

    /// Build a pool for `database_url` and verify that it can connect.
    pub async fn connect(database_url: &str, config: ManagerConfig) -> CrudResult<Self> {
        Self::connect_with_credentials(database_url, None, None, config).await
    }

    /// Like [`DatabaseManager::connect`], overriding the URL's credentials.
    pub async fn connect_with_credentials(
        database_url: &str,
        user: Option<&str>,
        password: Option<&str>,
        config: ManagerConfig,
    ) -> CrudResult<Self> {
        let pool = pool::create_pool_with_credentials(database_url, user, password, &config)?;
        pool::check_connection(&pool).await?;
        tracing::info!(
            mode = config.access_mode.as_str(),
            pool_size = config.effective_pool_size(),
            "connected"
        );
        Ok(Self::new(pool, config))
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn pool(&self) -> &Pool {
        &self.pool
    }

    /// Close the pool. Calls made afterwards fail with [`CrudError::Pool`].
    pub fn close(&self) {
        self.pool.close();
    }

    // ==================== Catalog ====================

    pub async fn list_schemas(&self) -> CrudResult<Vec<String>> {
        let session = self.session().await?;
        let client = &session.client;
        self.with_timeout(client.cancel_token(), catalog::list_schemas(client))
            .await
    }

    pub async fn list_tables(&self, schema: &str) -> CrudResult<Vec<String>> {
        let session = self.session().await?;
        let client = &session.client;
        self.with_timeout(client.cancel_token(), catalog::list_tables(client, schema))
            .await
    }

    /// Column names in table order.
    pub async fn list_columns(&self, schema: &str, table: &str) -> CrudResult<Vec<String>> {
        let columns = self.describe_table(schema, table).await?;
        Ok(columns.into_iter().map(|c| c.name).collect())
    }

    /// Declared types, index-aligned with [`DatabaseManager::list_columns`].
    pub async fn list_column_types(&self, schema: &str, table: &str) -> CrudResult<Vec<String>> {
        let columns = self.describe_table(schema, table).await?;
        Ok(columns.into_iter().map(|c| c.data_type).collect())
    }

    pub async fn column_type(&self, schema: &str, table: &str, column: &str) -> CrudResult<String> {
        let session = self.session().await?;
        let client = &session.client;
        self.with_timeout(
            client.cancel_token(),
            catalog::column_type(client, schema, table, column),
        )
        .await
    }

    /// Names, types and positions of every column in one round trip.
    pub async fn describe_table(&self, schema: &str, table: &str) -> CrudResult<Vec<ColumnMeta>> {
        let session = self.session().await?;
        let client = &session.client;
        self.with_timeout(
            client.cancel_token(),
            catalog::describe_table(client, schema, table),
        )
        .await
    }

    /// Every value of one column, in backend order. NULLs are kept as `None`.
    pub async fn column_values(
        &self,
        schema: &str,
        table: &str,
        column: &str,
    ) -> CrudResult<Vec<Option<String>>> {
        let session = self.session().await?;
        let client = &session.client;
        let columns = self
            .with_timeout(
                client.cancel_token(),
                catalog::describe_table(client, schema, table),
            )
            .await?;
        let declared = catalog::find_column_type(&columns, schema, table, column)?;
        let declared = DeclaredType::parse(&declared).ok();

        let sql = qb::select_columns(schema, table, &[column])?.to_sql();
        self.log_statement(qb::SelectQb::KIND, &sql, 0);
        let rows = self
            .with_timeout(client.cancel_token(), client.query_text(&sql))
            .await?;

        Ok(rows
            .iter()
            .map(|row| {
                row.get(0)
                    .map(|raw| declared.map_or_else(|| raw.to_string(), |t| t.canonical_text(raw)))
            })
            .collect())
    }

    // ==================== Reads ====================

    /// Every row of `schema.table` as records in column order.
    ///
    /// Values are fetched as text, so columns of any type can be listed.
    /// Values of supported types are normalized so they can be fed back into
    /// a filter unchanged.
    pub async fn select_all(&self, schema: &str, table: &str) -> CrudResult<Vec<Record>> {
        let sql = qb::select_all(schema, table)?.to_sql();
        self.fetch_records(schema, table, &sql, None).await
    }

    /// Selected columns of every row. Unknown columns fail before the query runs.
    pub async fn select_columns(
        &self,
        schema: &str,
        table: &str,
        columns: &[&str],
    ) -> CrudResult<Vec<Record>> {
        let sql = qb::select_columns(schema, table, columns)?.to_sql();
        self.fetch_records(schema, table, &sql, Some(columns)).await
    }

    async fn fetch_records(
        &self,
        schema: &str,
        table: &str,
        sql: &str,
        wanted: Option<&[&str]>,
    ) -> CrudResult<Vec<Record>> {
        let session = self.session().await?;
        let client = &session.client;
        let columns = self
            .with_timeout(
                client.cancel_token(),
                catalog::describe_table(client, schema, table),
            )
            .await?;
        for column in wanted.unwrap_or_default() {
            catalog::find_column_type(&columns, schema, table, column)?;
        }

        self.log_statement(qb::SelectQb::KIND, sql, 0);
        let rows = self
            .with_timeout(client.cancel_token(), client.query_text(sql))
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let names: Vec<&str> = row.columns().iter().map(|c| c.name()).collect();
            let values: Vec<Option<&str>> = (0..row.len()).map(|i| row.get(i)).collect();
            records.push(build_record(&columns, schema, table, &names, &values)?);
        }
        Ok(records)
    }

    // ==================== Mutations ====================

    /// Insert `record` as one row. Returns the affected row count.
    pub async fn insert(&self, schema: &str, table: &str, record: &Record) -> CrudResult<u64> {
        let qb = qb::insert_record(schema, table, record)?;
        let mut session = self.session().await?;
        self.run_mutation(&mut session, &qb).await
    }

    /// Delete the rows matching every field of `where_record`.
    pub async fn delete(&self, schema: &str, table: &str, where_record: &Record) -> CrudResult<u64> {
        let qb = qb::delete_where(schema, table, where_record)?;
        qb.validate()?;
        let mut session = self.session().await?;
        self.run_mutation(&mut session, &qb).await
    }

    /// Set `set_column` to `new_value` on the rows matching `where_record`.
    ///
    /// `new_value` is parsed as the column's current declared type.
    pub async fn update(
        &self,
        schema: &str,
        table: &str,
        set_column: &str,
        new_value: &str,
        where_record: &Record,
    ) -> CrudResult<u64> {
        if where_record.is_empty() {
            return Err(CrudError::validation(
                "UPDATE requires at least one filter column",
            ));
        }
        let mut session = self.session().await?;
        let client = &session.client;
        let declared = self
            .with_timeout(
                client.cancel_token(),
                catalog::column_type(client, schema, table, set_column),
            )
            .await?;
        let value = codec::bind(&declared, new_value)?;
        let qb = qb::update_where(schema, table, set_column, value, where_record)?;
        self.run_mutation(&mut session, &qb).await
    }

    /// Like [`DatabaseManager::update`] with an already-bound value.
    pub async fn update_bound(
        &self,
        schema: &str,
        table: &str,
        set_column: &str,
        new_value: BoundValue,
        where_record: &Record,
    ) -> CrudResult<u64> {
        let qb = qb::update_where(schema, table, set_column, new_value, where_record)?;
        qb.validate()?;
        let mut session = self.session().await?;
        self.run_mutation(&mut session, &qb).await
    }

    async fn run_mutation<Q: SqlQb>(&self, session: &mut Session<'_>, qb: &Q) -> CrudResult<u64> {
        let (sql, params) = qb.build_checked()?;
        self.log_statement(Q::KIND, &sql, params.len());

        let tx = session
            .client
            .transaction()
            .await
            .map_err(CrudError::execution)?;
        let outcome = self
            .with_timeout(
                GenericClient::cancel_token(&tx),
                GenericClient::execute(&tx, &sql, &params.as_refs()),
            )
            .await;

        let cancel_token = GenericClient::cancel_token(&tx);
        match outcome {
            Ok(affected) => {
                self.with_timeout(cancel_token, async move {
                    tx.commit().await.map_err(CrudError::execution)
                })
                .await?;
                tracing::info!(kind = Q::KIND, affected, "statement committed");
                Ok(affected)
            }
            Err(error) => {
                tracing::warn!(kind = Q::KIND, error = %error, "rolling back");
                let rollback = self
                    .with_timeout(cancel_token, async move {
                        tx.rollback().await.map_err(CrudError::execution)
                    })
                    .await;
                match rollback {
                    Ok(()) => Err(error),
                    Err(rollback) => {
                        tracing::error!(kind = Q::KIND, error = %rollback, "rollback failed");
                        Err(CrudError::RollbackFailed {
                            error: Box::new(error),
                            rollback: rollback.to_string(),
                        })
                    }
                }
            }
        }
    }

    // ==================== Plumbing ====================

    async fn session(&self) -> CrudResult<Session<'_>> {
        let guard = match &self.gate {
            Some(gate) => Some(match self.config.lock_timeout {
                Some(limit) => tokio::time::timeout(limit, gate.lock()).await.map_err(|_| {
                    tracing::warn!(timeout_ms = limit.as_millis() as u64, "gate wait timed out");
                    CrudError::LockTimeout(limit)
                })?,
                None => gate.lock().await,
            }),
            None => None,
        };
        let client = self.pool.get().await.map_err(|e| self.checkout_error(e))?;
        Ok(Session {
            client,
            _guard: guard,
        })
    }

    fn checkout_error(&self, err: PoolError) -> CrudError {
        match err {
            PoolError::Timeout(_) => {
                let limit = self.config.lock_timeout.unwrap_or(Duration::ZERO);
                tracing::warn!(timeout_ms = limit.as_millis() as u64, "pool checkout timed out");
                CrudError::LockTimeout(limit)
            }
            PoolError::Backend(e) => CrudError::Connection(e.to_string()),
            other => CrudError::from(other),
        }
    }

    /// Bound `fut` by the statement timeout, cancelling server-side on expiry.
    async fn with_timeout<T>(
        &self,
        cancel_token: Option<CancelToken>,
        fut: impl Future<Output = CrudResult<T>>,
    ) -> CrudResult<T> {
        let Some(timeout) = self.config.statement_timeout else {
            return fut.await;
        };
        match tokio::time::timeout(timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = timeout.as_millis() as u64, "statement timed out");
                if let Some(token) = cancel_token {
                    // Best-effort: the request is sent in the background.
                    tokio::spawn(async move {
                        let _ = token.cancel_query(NoTls).await;
                    });
                }
                Err(CrudError::Timeout(timeout))
            }
        }
    }

    fn log_statement(&self, kind: &str, sql: &str, param_count: usize) {
        if let Some(hook) = &self.sql_hook {
            hook.before_statement(kind, sql, param_count);
        }
    }
}

/// Pair one text-protocol row with the table's column metadata.
///
/// Columns come out in row order. A column the metadata does not know about
/// (the table changed since the lookup) is reported as
/// [`CrudError::ColumnNotFound`].
pub(crate) fn build_record(
    columns: &[ColumnMeta],
    schema: &str,
    table: &str,
    names: &[&str],
    values: &[Option<&str>],
) -> CrudResult<Record> {
    let mut record = Record::with_capacity(names.len());
    for (name, value) in names.iter().zip(values) {
        let declared = catalog::find_column_type(columns, schema, table, name)?;
        let value = value.map(|raw| match DeclaredType::parse(&declared) {
            Ok(t) => t.canonical_text(raw),
            Err(_) => raw.to_string(),
        });
        record.push_field(Field {
            column: name.to_string(),
            value,
            declared_type: declared,
        })?;
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sql_hook_follows_config() {
        let config = ManagerConfig::new()
            .sql_log_level(tracing::Level::INFO)
            .no_sql_log();
        let pool = pool::create_pool("postgres://localhost/school", &config).unwrap();
        assert!(DatabaseManager::new(pool, config).sql_hook.is_none());

        let mut config = ManagerConfig::new().sql_log_level(tracing::Level::INFO);
        config.max_logged_sql = None;
        let pool = pool::create_pool("postgres://localhost/school", &config).unwrap();
        let hook = DatabaseManager::new(pool, config).sql_hook.unwrap();
        assert_eq!(hook.level, tracing::Level::INFO);
        assert_eq!(hook.max_sql_length, None);
    }

    fn meta(name: &str, data_type: &str, ordinal: i32) -> ColumnMeta {
        ColumnMeta {
            schema: "school".into(),
            table: "student".into(),
            name: name.into(),
            data_type: data_type.into(),
            ordinal,
        }
    }

    fn student_columns() -> Vec<ColumnMeta> {
        vec![
            meta("id", "integer", 1),
            meta("name", "character varying", 2),
            meta("active", "boolean", 3),
        ]
    }

    #[test]
    fn build_record_follows_row_order_and_types() {
        let record = build_record(
            &student_columns(),
            "school",
            "student",
            &["id", "name", "active"],
            &[Some("1"), Some("Ana"), Some("t")],
        )
        .unwrap();

        assert_eq!(record.column_names(), vec!["id", "name", "active"]);
        assert_eq!(record.value("active"), Some("true"));
        assert_eq!(
            record.field("name").unwrap().declared_type,
            "character varying"
        );
        assert_eq!(record.to_string(), "id: 1, name: Ana, active: true");
    }

    #[test]
    fn build_record_keeps_nulls() {
        let record = build_record(
            &student_columns(),
            "school",
            "student",
            &["id", "name"],
            &[Some("2"), None],
        )
        .unwrap();
        assert_eq!(record.len(), 2);
        assert!(record.field("name").unwrap().value.is_none());
    }

    #[test]
    fn build_record_passes_unsupported_types_through() {
        let columns = vec![meta("id", "integer", 1), meta("born", "timestamp", 2)];
        let record = build_record(
            &columns,
            "school",
            "student",
            &["id", "born"],
            &[Some("1"), Some("2001-02-03 04:05:06")],
        )
        .unwrap();
        assert_eq!(record.value("born"), Some("2001-02-03 04:05:06"));
    }

    #[test]
    fn build_record_reports_unknown_column() {
        let err = build_record(
            &student_columns(),
            "school",
            "student",
            &["id", "age"],
            &[Some("1"), Some("20")],
        )
        .unwrap_err();
        assert!(matches!(err, CrudError::ColumnNotFound { ref column, .. } if column == "age"));
    }
}

//! Connection pool utilities

use crate::config::ManagerConfig;
use crate::error::{CrudError, CrudResult};
use deadpool_postgres::{Manager, ManagerConfig as PoolManagerConfig, Pool, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;

const ISO_DATES: &str = "-c DateStyle=ISO";

/// Create a connection pool from a database URL.
///
/// Accepts both URL (`postgres://localhost/school`) and key/value
/// (`host=localhost dbname=school`) forms. The pool is sized from
/// [`ManagerConfig::effective_pool_size`] and waits at most
/// [`ManagerConfig::lock_timeout`] for a free connection. Nothing is
/// connected until the first checkout; use [`check_connection`] to fail fast.
///
/// # Example
///
/// ```ignore
/// let pool = pgcrud::create_pool("postgres://localhost/school", &ManagerConfig::default())?;
/// pgcrud::pool::check_connection(&pool).await?;
/// ```
pub fn create_pool(database_url: &str, config: &ManagerConfig) -> CrudResult<Pool> {
    create_pool_with_credentials(database_url, None, None, config)
}

/// Create a connection pool, overriding the user and password in the URL.
pub fn create_pool_with_credentials(
    database_url: &str,
    user: Option<&str>,
    password: Option<&str>,
    config: &ManagerConfig,
) -> CrudResult<Pool> {
    let pg_config = connection_config(database_url, user, password, config)?;
    let mgr = Manager::from_config(
        pg_config,
        NoTls,
        PoolManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(mgr)
        .max_size(config.effective_pool_size())
        .wait_timeout(config.lock_timeout)
        .create_timeout(config.lock_timeout)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| CrudError::Pool(e.to_string()))
}

/// Parse `database_url` and pin the session settings the codec relies on.
///
/// Values are read back as text, so dates must come out as `YYYY-MM-DD`
/// whatever `DateStyle` the server or the URL asks for. The override is
/// appended because the last `-c` for a setting wins.
fn connection_config(
    database_url: &str,
    user: Option<&str>,
    password: Option<&str>,
    config: &ManagerConfig,
) -> CrudResult<tokio_postgres::Config> {
    let mut pg_config: tokio_postgres::Config = database_url
        .parse()
        .map_err(|e: tokio_postgres::Error| CrudError::Connection(e.to_string()))?;
    if let Some(user) = user {
        pg_config.user(user);
    }
    if let Some(password) = password {
        pg_config.password(password);
    }
    if let Some(timeout) = config.lock_timeout {
        pg_config.connect_timeout(timeout);
    }
    let options = match pg_config.get_options() {
        Some(existing) if !existing.trim().is_empty() => format!("{existing} {ISO_DATES}"),
        _ => ISO_DATES.to_string(),
    };
    pg_config.options(&options);
    Ok(pg_config)
}

/// Open (or reuse) one connection and run a trivial query.
///
/// Any failure is reported as [`CrudError::Connection`].
pub async fn check_connection(pool: &Pool) -> CrudResult<()> {
    let client = pool
        .get()
        .await
        .map_err(|e| CrudError::Connection(e.to_string()))?;
    client
        .simple_query("SELECT 1")
        .await
        .map_err(|e| CrudError::Connection(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_url() {
        let err = create_pool("postgres://user@host:notaport/db", &ManagerConfig::default())
            .unwrap_err();
        assert!(matches!(err, CrudError::Connection(_)));
    }

    #[test]
    fn connections_always_use_iso_dates() {
        let cfg = ManagerConfig::default();

        let pg = connection_config("postgres://localhost/school", None, None, &cfg).unwrap();
        assert_eq!(pg.get_options(), Some("-c DateStyle=ISO"));

        let pg = connection_config(
            "postgres://localhost/school?options=-c%20DateStyle%3DSQL%2CDMY",
            Some("registrar"),
            None,
            &cfg,
        )
        .unwrap();
        assert_eq!(
            pg.get_options(),
            Some("-c DateStyle=SQL,DMY -c DateStyle=ISO")
        );
        assert_eq!(pg.get_user(), Some("registrar"));
    }

    #[tokio::test]
    async fn pool_size_follows_access_mode() {
        let pool = create_pool("postgres://localhost/school", &ManagerConfig::default()).unwrap();
        assert_eq!(pool.status().max_size, 1);

        let pool = create_pool(
            "host=localhost dbname=school",
            &ManagerConfig::new().pooled(5),
        )
        .unwrap();
        assert_eq!(pool.status().max_size, 5);
    }
}

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pgcrud::{AccessMode, ManagerConfig};

use crate::cli::RunArgs;

const DEFAULT_CONFIG: &str = "pgcrud.toml";

/// Contents of `pgcrud.toml`. Every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub schema: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    pub mode: Option<String>,
    pub statement_timeout_ms: Option<u64>,
    pub lock_timeout_ms: Option<u64>,
    pub pool_size: Option<usize>,
    /// Level of the statement log events, e.g. `"info"`.
    pub sql_log_level: Option<String>,
}

impl ConfigFile {
    /// Read `path`. A missing file is only an error when `required`.
    pub fn load(path: &Path, required: bool) -> anyhow::Result<Self> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => anyhow::bail!("failed to read config file {}: {e}", path.display()),
        };
        Self::parse(&raw)
            .map_err(|e| anyhow::anyhow!("failed to parse config file {}: {e}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let mut file: ConfigFile = toml::from_str(raw)?;
        file.expand_env()?;
        Ok(file)
    }

    fn expand_env(&mut self) -> anyhow::Result<()> {
        let db = &mut self.database;
        for slot in [&mut db.url, &mut db.user, &mut db.password, &mut db.schema] {
            if let Some(v) = slot.as_mut() {
                *v = expand_env_vars(v)?;
            }
        }
        if let Some(mode) = self.session.mode.as_mut() {
            *mode = expand_env_vars(mode)?;
        }
        Ok(())
    }
}

/// Everything needed to open a session, after merging all sources.
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub schema: Option<String>,
    pub manager: ManagerConfig,
}

impl Settings {
    /// Merge the config file, the process environment, and `args`.
    ///
    /// Later sources win: file, then environment, then flags.
    pub fn load(args: &RunArgs) -> anyhow::Result<Self> {
        let (path, required) = match &args.config {
            Some(p) => (p.clone(), true),
            None => (PathBuf::from(DEFAULT_CONFIG), false),
        };
        let file = ConfigFile::load(&path, required)?;
        Self::resolve(args, file, |key| std::env::var(key).ok())
    }

    pub fn resolve(
        args: &RunArgs,
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<Self> {
        let ConfigFile { database, session } = file;

        let Some(database_url) = args
            .database
            .clone()
            .or_else(|| env("DATABASE_URL"))
            .or(database.url)
            .filter(|u| !u.trim().is_empty())
        else {
            anyhow::bail!(
                "no database URL: pass --database, set DATABASE_URL, or set database.url in {DEFAULT_CONFIG}"
            );
        };
        let user = args.user.clone().or_else(|| env("PGCRUD_USER")).or(database.user);
        let password = args
            .password
            .clone()
            .or_else(|| env("PGCRUD_PASSWORD"))
            .or(database.password);
        let schema = args
            .schema
            .clone()
            .or_else(|| env("PGCRUD_SCHEMA"))
            .or(database.schema);

        let mode = match args.mode {
            Some(mode) => mode,
            None => match env("PGCRUD_MODE").or(session.mode) {
                Some(s) => s.parse().map_err(|e| anyhow::anyhow!("session.mode: {e}"))?,
                None => AccessMode::default(),
            },
        };
        let timeout_ms = match args.timeout_ms {
            Some(ms) => Some(ms),
            None => match env("PGCRUD_TIMEOUT_MS") {
                Some(s) => Some(s.parse::<u64>().map_err(|_| {
                    anyhow::anyhow!("PGCRUD_TIMEOUT_MS must be milliseconds, got '{s}'")
                })?),
                None => session.statement_timeout_ms,
            },
        };

        let mut manager = ManagerConfig::new().access_mode(mode);
        if let Some(n) = session.pool_size {
            manager.pool_size = n;
        }
        if let Some(ms) = timeout_ms {
            manager = match ms {
                0 => manager.no_statement_timeout(),
                ms => manager.statement_timeout(Duration::from_millis(ms)),
            };
        }
        if let Some(level) = session.sql_log_level {
            let level = level
                .parse::<tracing::Level>()
                .map_err(|e| anyhow::anyhow!("session.sql_log_level: {e}"))?;
            manager = manager.sql_log_level(level);
        }
        if let Some(ms) = session.lock_timeout_ms {
            manager = match ms {
                0 => manager.no_lock_timeout(),
                ms => manager.lock_timeout(Duration::from_millis(ms)),
            };
        }

        Ok(Self {
            database_url,
            user,
            password,
            schema,
            manager,
        })
    }
}

fn expand_env_vars(input: &str) -> anyhow::Result<String> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '$' && chars.peek() == Some(&'{') {
            chars.next(); // consume '{'

            let mut key = String::new();
            let mut closed = false;
            for ch in chars.by_ref() {
                if ch == '}' {
                    closed = true;
                    break;
                }
                key.push(ch);
            }

            if !closed {
                anyhow::bail!("unterminated env var reference: ${{{key}}}");
            }
            if key.is_empty() {
                anyhow::bail!("invalid env var reference: ${{}}");
            }

            let v = std::env::var(&key)
                .map_err(|_| anyhow::anyhow!("missing env var for config expansion: {key}"))?;
            out.push_str(&v);
            continue;
        }

        out.push(c);
    }

    Ok(out)
}

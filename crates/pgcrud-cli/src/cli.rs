use std::path::PathBuf;

use pgcrud::AccessMode;

#[derive(Debug, Clone)]
pub enum Command {
    Help,
    Run(RunArgs),
}

#[derive(Debug, Clone, Default)]
pub struct RunArgs {
    /// Explicit config file. Without one, `pgcrud.toml` is read if present.
    pub config: Option<PathBuf>,
    pub database: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub schema: Option<String>,
    pub mode: Option<AccessMode>,
    pub timeout_ms: Option<u64>,
}

pub fn parse_args(args: &[String]) -> anyhow::Result<Command> {
    let mut it = args.iter().skip(1).map(|s| s.as_str());
    let mut out = RunArgs::default();

    while let Some(token) = it.next() {
        match token {
            "-h" | "--help" => return Ok(Command::Help),
            "--config" => out.config = Some(PathBuf::from(value(&mut it, token)?)),
            _ if token.starts_with("--config=") => {
                out.config = Some(PathBuf::from(token.trim_start_matches("--config=")));
            }
            "--database" => out.database = Some(value(&mut it, token)?.to_string()),
            _ if token.starts_with("--database=") => {
                out.database = Some(token.trim_start_matches("--database=").to_string());
            }
            "--user" => out.user = Some(value(&mut it, token)?.to_string()),
            _ if token.starts_with("--user=") => {
                out.user = Some(token.trim_start_matches("--user=").to_string());
            }
            "--password" => out.password = Some(value(&mut it, token)?.to_string()),
            _ if token.starts_with("--password=") => {
                out.password = Some(token.trim_start_matches("--password=").to_string());
            }
            "--schema" => out.schema = Some(value(&mut it, token)?.to_string()),
            _ if token.starts_with("--schema=") => {
                out.schema = Some(token.trim_start_matches("--schema=").to_string());
            }
            "--mode" => out.mode = Some(parse_mode(value(&mut it, token)?)?),
            _ if token.starts_with("--mode=") => {
                out.mode = Some(parse_mode(token.trim_start_matches("--mode="))?);
            }
            "--timeout" => out.timeout_ms = Some(parse_timeout(value(&mut it, token)?)?),
            _ if token.starts_with("--timeout=") => {
                out.timeout_ms = Some(parse_timeout(token.trim_start_matches("--timeout="))?);
            }
            _ => anyhow::bail!("unknown argument: {token}"),
        }
    }

    Ok(Command::Run(out))
}

fn value<'a>(it: &mut impl Iterator<Item = &'a str>, flag: &str) -> anyhow::Result<&'a str> {
    let Some(v) = it.next() else {
        anyhow::bail!("{flag} requires a value");
    };
    Ok(v)
}

fn parse_mode(s: &str) -> anyhow::Result<AccessMode> {
    s.parse()
        .map_err(|e| anyhow::anyhow!("invalid --mode: {e}"))
}

fn parse_timeout(s: &str) -> anyhow::Result<u64> {
    s.parse()
        .map_err(|_| anyhow::anyhow!("invalid --timeout: {s} (expected milliseconds)"))
}

pub fn print_help() {
    println!(
        "\
pgcrud - browse and edit PostgreSQL tables from the terminal

USAGE:
  pgcrud [OPTIONS]

OPTIONS:
  --config <FILE>               Config file path (default: pgcrud.toml, optional)
  --database <URL>              Database URL (overrides DATABASE_URL and database.url)
  --user <USER>                 Login user
  --password <PASSWORD>         Login password
  --schema <SCHEMA>             Start in this schema instead of choosing one
  --mode <exclusive|pooled>     Session access mode (default: exclusive)
  --timeout <MS>                Statement timeout in milliseconds
  -h, --help                    Print help

ENVIRONMENT:
  DATABASE_URL, PGCRUD_USER, PGCRUD_PASSWORD, PGCRUD_SCHEMA, PGCRUD_MODE,
  PGCRUD_TIMEOUT_MS (a .env file in the working directory is loaded first)
  RUST_LOG                      Log filter (default: pgcrud=warn)"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        std::iter::once("pgcrud")
            .chain(list.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn no_arguments_runs_with_defaults() {
        let Command::Run(run) = parse_args(&args(&[])).unwrap() else {
            panic!("expected run");
        };
        assert!(run.config.is_none());
        assert!(run.database.is_none());
        assert!(run.mode.is_none());
    }

    #[test]
    fn parses_every_flag() {
        let cmd = parse_args(&args(&[
            "--config",
            "dev.toml",
            "--database=postgres://localhost/school",
            "--user",
            "admin",
            "--password",
            "s3cret",
            "--schema=school",
            "--mode",
            "pooled",
            "--timeout=1500",
        ]))
        .unwrap();
        let Command::Run(run) = cmd else {
            panic!("expected run");
        };

        assert_eq!(run.config, Some(PathBuf::from("dev.toml")));
        assert_eq!(run.database.as_deref(), Some("postgres://localhost/school"));
        assert_eq!(run.user.as_deref(), Some("admin"));
        assert_eq!(run.password.as_deref(), Some("s3cret"));
        assert_eq!(run.schema.as_deref(), Some("school"));
        assert_eq!(run.mode, Some(AccessMode::Pooled));
        assert_eq!(run.timeout_ms, Some(1500));
    }

    #[test]
    fn help_wins() {
        assert!(matches!(
            parse_args(&args(&["--user", "x", "-h"])).unwrap(),
            Command::Help
        ));
    }

    #[test]
    fn rejects_bad_input() {
        let err = parse_args(&args(&["--user"])).unwrap_err();
        assert!(err.to_string().contains("--user requires a value"));

        let err = parse_args(&args(&["--mode", "shared"])).unwrap_err();
        assert!(err.to_string().contains("invalid --mode"));

        let err = parse_args(&args(&["--timeout", "-5"])).unwrap_err();
        assert!(err.to_string().contains("invalid --timeout"));

        let err = parse_args(&args(&["list"])).unwrap_err();
        assert!(err.to_string().contains("unknown argument: list"));
    }
}

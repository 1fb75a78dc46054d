use std::fmt;

use quiz_core::compute_mix;
use quiz_core::model::{DailyMixConfig, DifficultyCounts, DifficultyRatio, UserId};
use services::{AppServices, Clock};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingUser,
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidNumber { flag: &'static str, raw: String },
    InvalidRatio { raw: String },
    InvalidDbUrl { raw: String },
    InvalidEnv { var: &'static str, raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingUser => write!(f, "daily requires --user or DAILY_USER_ID"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidNumber { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::InvalidRatio { raw } => {
                write!(f, "invalid --ratio value (expected easy,moderate,difficult): {raw}")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidEnv { var, raw } => write!(f, "invalid {var} value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn parse_number(value: &str, flag: &'static str) -> Result<u32, ArgsError> {
    value.trim().parse().map_err(|_| ArgsError::InvalidNumber {
        flag,
        raw: value.to_string(),
    })
}

const DEFAULT_DB_URL: &str = "sqlite://dev.sqlite3";

/// Parses `var` when set; a set but malformed value is an error.
fn env_value<T: std::str::FromStr>(
    env: &impl Fn(&'static str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ArgsError> {
    env(var)
        .map(|raw| {
            let parsed = raw.trim().parse::<T>();
            parsed.map_err(|_| ArgsError::InvalidEnv { var, raw })
        })
        .transpose()
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- daily [--db <sqlite_url>] [--user <uuid>]");
    eprintln!("                            [--session-size <n>] [--pool-limit <n>]");
    eprintln!("  cargo run -p app -- mix   [--total <n>] [--ratio <e,m,d>]");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --session-size {}", DailyMixConfig::DEFAULT_SESSION_SIZE);
    eprintln!("  --pool-limit {}", DailyMixConfig::DEFAULT_POOL_LIMIT);
    eprintln!("  --total {}  --ratio 0.8,0.2,0", DailyMixConfig::DEFAULT_SESSION_SIZE);
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  DAILY_DB_URL, DAILY_USER_ID, DAILY_SESSION_SIZE, DAILY_POOL_LIMIT, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Daily,
    Mix,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "daily" => Some(Self::Daily),
            "mix" => Some(Self::Mix),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct DailyArgs {
    db_url: String,
    user_id: UserId,
    session_size: u32,
    pool_limit: u32,
}

impl DailyArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        Self::parse_with_env(args, |var| std::env::var(var).ok())
    }

    fn parse_with_env(
        args: &mut impl Iterator<Item = String>,
        env: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Self, ArgsError> {
        let mut db_url = match env("DAILY_DB_URL") {
            Some(value) if value.trim().is_empty() => {
                return Err(ArgsError::InvalidEnv {
                    var: "DAILY_DB_URL",
                    raw: value,
                });
            }
            Some(value) => normalize_sqlite_url(value),
            None => DEFAULT_DB_URL.to_string(),
        };
        let mut user_id = env_value::<UserId>(&env, "DAILY_USER_ID")?;
        let mut session_size = env_value::<u32>(&env, "DAILY_SESSION_SIZE")?
            .unwrap_or(DailyMixConfig::DEFAULT_SESSION_SIZE);
        let mut pool_limit = env_value::<u32>(&env, "DAILY_POOL_LIMIT")?
            .unwrap_or(DailyMixConfig::DEFAULT_POOL_LIMIT);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--user" => {
                    let value = require_value(args, "--user")?;
                    let parsed = value
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    user_id = Some(parsed);
                }
                "--session-size" => {
                    let value = require_value(args, "--session-size")?;
                    session_size = parse_number(&value, "--session-size")?;
                }
                "--pool-limit" => {
                    let value = require_value(args, "--pool-limit")?;
                    pool_limit = parse_number(&value, "--pool-limit")?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            db_url,
            user_id: user_id.ok_or(ArgsError::MissingUser)?,
            session_size,
            pool_limit,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
struct MixArgs {
    total: u32,
    ratio: DifficultyRatio,
}

impl MixArgs {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut total = DailyMixConfig::DEFAULT_SESSION_SIZE;
        let mut ratio = DifficultyRatio::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--total" => {
                    let value = require_value(args, "--total")?;
                    total = parse_number(&value, "--total")?;
                }
                "--ratio" => {
                    let value = require_value(args, "--ratio")?;
                    ratio = value
                        .parse::<DifficultyRatio>()
                        .map_err(|_| ArgsError::InvalidRatio { raw: value.clone() })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { total, ratio })
    }
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = std::path::Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Counts for `total` questions, validated the same way the daily service is.
fn mix_counts(total: u32, ratio: &DifficultyRatio) -> Result<DifficultyCounts, quiz_core::Error> {
    DailyMixConfig::new(total, DailyMixConfig::DEFAULT_POOL_LIMIT, *ratio)?;
    Ok(compute_mix(total, ratio)?)
}

async fn run_daily(args: DailyArgs) -> Result<(), Box<dyn std::error::Error>> {
    prepare_sqlite_file(&args.db_url)?;
    let services = AppServices::new_sqlite(
        &args.db_url,
        Clock::default_clock(),
        args.session_size,
        args.pool_limit,
    )
    .await?;

    let bundle = services.daily_questions().daily_bundle(args.user_id).await?;
    tracing::info!(
        user_id = %args.user_id,
        date = %bundle.date,
        questions = bundle.questions.len(),
        "daily bundle ready"
    );
    println!("{}", serde_json::to_string_pretty(&bundle)?);
    Ok(())
}

fn run_mix(args: &MixArgs) -> Result<(), Box<dyn std::error::Error>> {
    let counts = mix_counts(args.total, &args.ratio)?;
    println!("{}", serde_json::to_string_pretty(&counts)?);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1).peekable();
    let first = argv.peek().cloned();

    // No subcommand means `daily`.
    let cmd = match first.as_deref() {
        None => Command::Daily,
        Some("--help" | "-h") => {
            print_usage();
            return Ok(());
        }
        Some(first) if first.starts_with("--") => Command::Daily,
        Some(first) => {
            let cmd = Command::from_arg(first).ok_or_else(|| {
                eprintln!("unknown subcommand: {first}");
                print_usage();
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
            })?;
            argv.next();
            cmd
        }
    };

    let report = |e: ArgsError| {
        eprintln!("{e}");
        print_usage();
        e
    };

    match cmd {
        Command::Daily => run_daily(DailyArgs::parse(&mut argv).map_err(report)?).await,
        Command::Mix => run_mix(&MixArgs::parse(&mut argv).map_err(report)?),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run().await {
        // Binary glue: print once and exit.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::MixError;
    use quiz_core::model::ConfigError;

    fn argv(items: &[&str]) -> impl Iterator<Item = String> {
        items
            .iter()
            .map(|s| (*s).to_string())
            .collect::<Vec<_>>()
            .into_iter()
    }

    #[test]
    fn mix_args_parse_total_and_ratio() {
        let args = MixArgs::parse(&mut argv(&["--total", "20", "--ratio", "0.2,0.3,0.5"])).unwrap();
        assert_eq!(args.total, 20);
        assert_eq!(args.ratio, DifficultyRatio::new(0.2, 0.3, 0.5));
    }

    #[test]
    fn mix_args_reject_bad_values() {
        assert!(matches!(
            MixArgs::parse(&mut argv(&["--total", "ten"])),
            Err(ArgsError::InvalidNumber { flag: "--total", .. })
        ));
        assert!(matches!(
            MixArgs::parse(&mut argv(&["--ratio", "1,2"])),
            Err(ArgsError::InvalidRatio { .. })
        ));
        assert!(matches!(
            MixArgs::parse(&mut argv(&["--total"])),
            Err(ArgsError::MissingValue { flag: "--total" })
        ));
        assert!(matches!(
            MixArgs::parse(&mut argv(&["--bogus"])),
            Err(ArgsError::UnknownArg(_))
        ));
    }

    fn no_env(_: &'static str) -> Option<String> {
        None
    }

    #[test]
    fn daily_args_read_flags() {
        let mut args = argv(&[
            "--db",
            "sqlite::memory:",
            "--user",
            "00000000-0000-0000-0000-000000000009",
            "--session-size",
            "12",
            "--pool-limit",
            "30",
        ]);
        let args = DailyArgs::parse_with_env(&mut args, no_env).unwrap();
        assert_eq!(args.db_url, "sqlite::memory:");
        assert_eq!(args.user_id.to_string(), "00000000-0000-0000-0000-000000000009");
        assert_eq!(args.session_size, 12);
        assert_eq!(args.pool_limit, 30);
    }

    #[test]
    fn daily_args_fall_back_to_env_then_defaults() {
        let args = DailyArgs::parse_with_env(&mut argv(&[]), |var| match var {
            "DAILY_USER_ID" => Some("00000000-0000-0000-0000-000000000003".into()),
            "DAILY_POOL_LIMIT" => Some("25".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(args.db_url, DEFAULT_DB_URL);
        assert_eq!(args.user_id.to_string(), "00000000-0000-0000-0000-000000000003");
        assert_eq!(args.session_size, DailyMixConfig::DEFAULT_SESSION_SIZE);
        assert_eq!(args.pool_limit, 25);
    }

    #[test]
    fn daily_args_reject_malformed_env_values() {
        let user = |var: &'static str| {
            (var == "DAILY_USER_ID").then(|| "00000000-0000-0000-0000-000000000003".to_string())
        };
        for (bad_var, raw) in [
            ("DAILY_USER_ID", "not-a-uuid"),
            ("DAILY_SESSION_SIZE", "ten"),
            ("DAILY_POOL_LIMIT", "-5"),
            ("DAILY_DB_URL", "  "),
        ] {
            let err = DailyArgs::parse_with_env(&mut argv(&[]), |var| {
                if var == bad_var { Some(raw.to_string()) } else { user(var) }
            })
            .unwrap_err();
            match err {
                ArgsError::InvalidEnv { var, raw: got } => {
                    assert_eq!(var, bad_var);
                    assert_eq!(got, raw);
                }
                other => panic!("unexpected error for {bad_var}: {other}"),
            }
        }
    }

    #[test]
    fn daily_args_require_a_user() {
        let err = DailyArgs::parse_with_env(&mut argv(&[]), no_env).unwrap_err();
        assert!(matches!(err, ArgsError::MissingUser));
    }

    #[test]
    fn mix_counts_match_default_ratio() {
        let counts = mix_counts(10, &DifficultyRatio::default()).unwrap();
        assert_eq!(counts, DifficultyCounts::new(8, 2, 0));
    }

    #[test]
    fn mix_counts_reject_zero_total() {
        let err = mix_counts(0, &DifficultyRatio::default()).unwrap_err();
        assert!(matches!(err, quiz_core::Error::Config(ConfigError::InvalidSessionSize)));
    }

    #[test]
    fn mix_counts_reject_total_below_floor() {
        let err = mix_counts(1, &DifficultyRatio::default()).unwrap_err();
        assert!(matches!(
            err,
            quiz_core::Error::Config(ConfigError::FloorExceedsSessionSize { .. })
                | quiz_core::Error::Mix(MixError::FloorExceedsTotal { .. })
        ));
    }

    #[test]
    fn normalize_keeps_memory_and_absolute_urls() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(normalize_sqlite_url("sqlite:///tmp/q.db".into()), "sqlite:///tmp/q.db");
        assert_eq!(normalize_sqlite_url("sqlite:/tmp/q.db".into()), "sqlite:///tmp/q.db");
    }
}

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use quiz_core::model::{AnswerKey, Difficulty, DifficultyRatio, QuestionDraft, QuestionId, UserId};
use storage::repository::{Storage, StorageError};
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user_id: Option<UserId>,
    ratio: Option<DifficultyRatio>,
    per_band: u32,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidUserId { raw: String },
    InvalidRatio { raw: String },
    InvalidPerBand { raw: String },
    InvalidDbUrl { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidUserId { raw } => write!(f, "invalid --user value: {raw}"),
            ArgsError::InvalidRatio { raw } => {
                write!(f, "invalid --ratio value (expected easy,moderate,difficult): {raw}")
            }
            ArgsError::InvalidPerBand { raw } => write!(f, "invalid --per-band value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
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

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url =
            std::env::var("DAILY_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut user_id = std::env::var("DAILY_USER_ID")
            .ok()
            .and_then(|value| value.parse::<UserId>().ok());
        let mut ratio = None;
        let mut per_band = std::env::var("DAILY_SEED_PER_BAND")
            .ok()
            .and_then(|value| value.parse::<u32>().ok())
            .unwrap_or(20);
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    let parsed = value
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidUserId { raw: value.clone() })?;
                    user_id = Some(parsed);
                }
                "--ratio" => {
                    let value = require_value(&mut args, "--ratio")?;
                    let parsed = value
                        .parse::<DifficultyRatio>()
                        .map_err(|_| ArgsError::InvalidRatio { raw: value.clone() })?;
                    ratio = Some(parsed);
                }
                "--per-band" => {
                    let value = require_value(&mut args, "--per-band")?;
                    per_band = value
                        .parse::<u32>()
                        .map_err(|_| ArgsError::InvalidPerBand { raw: value.clone() })?;
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
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
            user_id,
            ratio,
            per_band,
            now,
        })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --per-band <n>            Sample questions to add per difficulty (default: 20)");
    eprintln!("  --user <uuid>             Learner whose profile ratio to store");
    eprintln!("  --ratio <e,m,d>           Ratio to store for --user (e.g. 0.6,0.3,0.1)");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  DAILY_DB_URL, DAILY_USER_ID, DAILY_SEED_PER_BAND");
}

const SEED_ID_BASE: u128 = 0x5eed_0000_0000_0000_0000_0000_0000_0000;

const SUBJECTS: [&str; 4] = ["Arithmetic", "Geography", "Biology", "History"];

fn sample_draft(difficulty: Difficulty, n: u32) -> QuestionDraft {
    let subject = SUBJECTS[(n as usize) % SUBJECTS.len()];
    let a = u64::from(n) + 2;
    let b = match difficulty {
        Difficulty::Easy => 3,
        Difficulty::Moderate => 17,
        Difficulty::Difficult => 113,
    };
    let product = a * b;
    QuestionDraft {
        subject: subject.to_string(),
        difficulty,
        prompt: format!("[{subject}] What is {a} x {b}?"),
        options: [
            product.to_string(),
            (product + 1).to_string(),
            (product + b).to_string(),
            product.saturating_sub(a).to_string(),
        ],
        correct_answer: AnswerKey::A,
        reasoning: Some(format!("{a} groups of {b} make {product}.")),
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    let mut inserted = 0_u32;
    let mut skipped = 0_u32;
    for (band_idx, difficulty) in (0_u128..).zip(Difficulty::ALL) {
        for n in 0..args.per_band {
            let created_at = now + Duration::seconds(i64::from(n));
            // Stable ids so reseeding the same database skips existing rows.
            let id = QuestionId::new(Uuid::from_u128((band_idx << 32) | u128::from(n) | SEED_ID_BASE));
            let question = sample_draft(difficulty, n).validate(id, created_at)?;
            match storage.questions.insert_question(&question).await {
                Ok(()) => inserted += 1,
                Err(StorageError::Conflict) => skipped += 1,
                Err(err) => return Err(err.into()),
            }
        }
    }

    if let Some(user_id) = args.user_id {
        let ratio = args.ratio.unwrap_or_default();
        storage.profiles.save_difficulty_ratio(user_id, &ratio).await?;
        println!(
            "Stored ratio easy={} moderate={} difficult={} for {user_id}",
            ratio.easy, ratio.moderate, ratio.difficult
        );
    }

    println!(
        "Seeded {inserted} questions ({skipped} skipped) into {}",
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

pub mod config;
pub mod day;
pub mod month;
pub mod notify;
pub mod now;
pub mod symbols;
pub mod sync;

use bellschedule_core::{
    load_newest_context, migrate_legacy_overrides, Config, Context, FileDatasetProvider,
    HttpDatasetProvider, LoadOutcome, Persistence, SqliteStore,
};
use chrono::{Local, NaiveDate, NaiveDateTime, Utc};
use log::warn;

pub type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Opens the default store and upgrades legacy data on first use.
pub fn open_persistence() -> Result<Persistence<SqliteStore>, Box<dyn std::error::Error>> {
    let mut persistence = Persistence::new(SqliteStore::open_default()?);
    migrate_legacy_overrides(&mut persistence)?;
    Ok(persistence)
}

/// Loads the newest context from the configured source, falling back to the
/// cache when the source is unusable.
pub fn load_context(
    config: &Config,
    persistence: &mut Persistence<SqliteStore>,
) -> Result<LoadOutcome, Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    let now = Utc::now();

    let outcome = match &config.dataset.file {
        Some(path) => {
            let provider = FileDatasetProvider::new(path);
            rt.block_on(load_newest_context(&provider, persistence, now))?
        }
        None => match HttpDatasetProvider::new(&config.dataset.base_url, &config.dataset.school) {
            Ok(provider) => rt.block_on(load_newest_context(&provider, persistence, now))?,
            Err(e) => {
                warn!("dataset source unavailable: {e}");
                let context = persistence.load_context()?.ok_or(e)?;
                LoadOutcome {
                    context,
                    warnings: Vec::new(),
                }
            }
        },
    };

    for warning in &outcome.warnings {
        warn!("{warning}");
    }
    Ok(outcome)
}

/// Shorthand for commands that only need a usable context.
pub fn context() -> Result<(Config, Context), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let mut persistence = open_persistence()?;
    let outcome = load_context(&config, &mut persistence)?;
    Ok((config, outcome.context))
}

/// Parses `--at` values, defaulting to the local wall clock.
pub fn parse_instant(at: Option<&str>) -> Result<NaiveDateTime, Box<dyn std::error::Error>> {
    let Some(raw) = at else {
        return Ok(Local::now().naive_local());
    };
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .ok_or_else(|| format!("invalid date-time: {raw} (expected YYYY-MM-DDTHH:MM)").into())
}

pub fn parse_date(date: Option<&str>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match date {
        Some(raw) => Ok(NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|e| format!("invalid date {raw}: {e}"))?),
        None => Ok(Local::now().date_naive()),
    }
}

use chrono::{DateTime, Utc};
use log::{info, warn};

use super::DatasetProvider;
use crate::context::Context;
use crate::error::{CoreError, LoadError};
use crate::storage::{KeyValueStore, Persistence};

/// A usable context plus the non-fatal problems hit while producing it.
#[derive(Debug)]
pub struct LoadOutcome {
    pub context: Context,
    pub warnings: Vec<CoreError>,
}

/// Produces the newest context available.
///
/// A cached snapshot newer than the remote dataset is used as-is. Otherwise
/// the dataset is fetched, the stored overrides are re-applied and a hard
/// snapshot is saved at `now`. Any failure on that path falls back to the
/// cache, with the failures reported as warnings.
///
/// # Errors
/// Returns [`LoadError::NoFallbackAvailable`] when the fetch fails and no
/// cached snapshot can be loaded.
pub async fn load_newest_context<P, S>(
    provider: &P,
    persistence: &mut Persistence<S>,
    now: DateTime<Utc>,
) -> Result<LoadOutcome, LoadError>
where
    P: DatasetProvider,
    S: KeyValueStore,
{
    let mut warnings = Vec::new();

    match provider.fetch_last_modified().await {
        Ok(remote) => match persistence.last_synced() {
            Ok(Some(synced)) if synced > remote => match persistence.load_context() {
                Ok(Some(context)) => {
                    info!("cached snapshot from {synced} is current");
                    return Ok(LoadOutcome { context, warnings });
                }
                Ok(None) => {}
                Err(e) => warnings.push(e),
            },
            Ok(_) => {}
            Err(e) => warnings.push(e),
        },
        Err(e) => {
            warn!("could not check dataset version: {e}");
            warnings.push(e);
        }
    }

    match fetch_fresh(provider, persistence, now).await {
        Ok(context) => {
            if let Err(e) = persistence.save_snapshot(&context, now) {
                warn!("could not cache dataset: {e}");
                warnings.push(e);
            }
            info!("fetched dataset at {now}");
            return Ok(LoadOutcome { context, warnings });
        }
        Err(e) => {
            warn!("dataset fetch failed, falling back to cache: {e}");
            warnings.push(e);
        }
    }

    match persistence.load_context() {
        Ok(Some(context)) => Ok(LoadOutcome { context, warnings }),
        Ok(None) => Err(no_fallback(&warnings)),
        Err(e) => {
            warnings.push(e);
            Err(no_fallback(&warnings))
        }
    }
}

async fn fetch_fresh<P, S>(
    provider: &P,
    persistence: &Persistence<S>,
    now: DateTime<Utc>,
) -> Result<Context, CoreError>
where
    P: DatasetProvider,
    S: KeyValueStore,
{
    let dataset = provider.fetch_dataset().await?;
    let overrides = persistence.load_overrides()?;
    Ok(Context::from_dataset(&dataset, &overrides, now)?)
}

fn no_fallback(errors: &[CoreError]) -> LoadError {
    LoadError::NoFallbackAvailable {
        causes: errors.iter().map(ToString::to_string).collect(),
    }
}

use std::time::Duration;

use crate::error::AppError;
use crate::extract::locator::{Cascade, Locator};
use crate::page::PageHandle;

/// Delay between re-queries while a live page is still rendering.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Outcome of resolving a cascade: the winning locator's full match set, or
/// nothing when no locator matched.
#[derive(Debug)]
pub struct Resolution<E> {
    pub matches: Vec<E>,
    pub locator: Option<Locator>,
}

impl<E> Resolution<E> {
    fn miss() -> Self {
        Resolution {
            matches: Vec::new(),
            locator: None,
        }
    }
}

/// Try each locator of `cascade` under `root` in declared order and return the
/// matches of the first one that finds anything. Results are never merged
/// across locators.
///
/// On a live page with an `attempt_timeout`, each locator is re-queried until it
/// matches or the timeout elapses; a timeout or a query fault counts as a miss
/// and the next locator is tried. Without a timeout, or on a static page, every
/// locator gets exactly one query.
pub async fn resolve<P: PageHandle>(
    page: &P,
    root: Option<&P::Element>,
    cascade: &Cascade,
    attempt_timeout: Option<Duration>,
) -> Resolution<P::Element> {
    for locator in cascade.locators() {
        match attempt(page, locator, root, attempt_timeout).await {
            Ok(matches) if !matches.is_empty() => {
                tracing::debug!(
                    "{}: {} element(s) matched '{locator}'",
                    cascade.name(),
                    matches.len()
                );
                return Resolution {
                    matches,
                    locator: Some(*locator),
                };
            }
            Ok(_) => {}
            Err(e @ AppError::InvalidLocator { .. }) => {
                tracing::warn!("{}: skipping locator: {e}", cascade.name());
            }
            Err(e) => {
                tracing::debug!("{}: locator '{locator}' failed: {e}", cascade.name());
            }
        }
    }
    Resolution::miss()
}

async fn attempt<P: PageHandle>(
    page: &P,
    locator: &Locator,
    root: Option<&P::Element>,
    attempt_timeout: Option<Duration>,
) -> Result<Vec<P::Element>, AppError> {
    match attempt_timeout {
        Some(limit) if page.is_live() => {
            match tokio::time::timeout(limit, poll_until_found(page, locator, root)).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::debug!("locator '{locator}' timed out after {limit:?}");
                    Ok(Vec::new())
                }
            }
        }
        _ => page.query(locator, root).await,
    }
}

async fn poll_until_found<P: PageHandle>(
    page: &P,
    locator: &Locator,
    root: Option<&P::Element>,
) -> Result<Vec<P::Element>, AppError> {
    loop {
        let found = page.query(locator, root).await?;
        if !found.is_empty() {
            return Ok(found);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

//! Ordered fallback across candidate source URLs.

use tracing::warn;

use crate::error::{Result, UrlAttempt, VcsError};

/// What one candidate URL attempt produced.
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// The candidate worked; stop here.
    Ok(T),
    /// The candidate failed; record the diagnostics and move on.
    Failed(String),
    /// Something is wrong beyond this candidate; abort the whole fallback.
    Abort(VcsError),
}

/// Attempts `urls` in order and returns the first success.
///
/// Failed attempts are accumulated; when every candidate fails the attempts
/// are surfaced together as [`VcsError::AllUrlsFailed`] so nothing is lost.
pub fn try_each<T, I, S, F>(urls: I, mut attempt: F) -> Result<T>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
    F: FnMut(&str) -> AttemptOutcome<T>,
{
    let mut attempts = Vec::new();
    for url in urls {
        let url = url.as_ref();
        match attempt(url) {
            AttemptOutcome::Ok(value) => return Ok(value),
            AttemptOutcome::Failed(error) => {
                warn!(url, error = %error.trim(), "candidate url failed");
                attempts.push(UrlAttempt {
                    url: url.to_owned(),
                    error,
                });
            }
            AttemptOutcome::Abort(error) => return Err(error),
        }
    }
    Err(VcsError::AllUrlsFailed { attempts })
}

//! Ordered attempts across the mirror list.
//!
//! Each attempt reports one of three things: it found the value, it reached
//! the repository and the repository authoritatively has nothing, or the
//! transport failed. Only a transport failure moves on to the next mirror.

use std::future::Future;

use tracing::debug;

use super::{Mirror, MirrorList};
use crate::remote::FetchError;

/// Result of one successful round-trip to a mirror
#[derive(Debug)]
pub enum Attempt<T> {
    Found(T),
    /// The mirror answered but the answer holds nothing usable. Stops the search.
    Absent,
}

#[derive(Debug)]
pub struct MirrorFailure {
    pub mirror: Mirror,
    pub error: FetchError,
}

/// Outcome of walking the mirror list
#[derive(Debug)]
pub enum MirrorOutcome<T> {
    Found { mirror: Mirror, value: T },
    Absent { mirror: Mirror },
    /// Every mirror failed at the transport level
    Exhausted { failures: Vec<MirrorFailure> },
}

impl<T> MirrorOutcome<T> {
    pub fn found(self) -> Option<T> {
        match self {
            MirrorOutcome::Found { value, .. } => Some(value),
            _ => None,
        }
    }
}

/// Try each mirror in order until one yields [`Attempt::Found`] or [`Attempt::Absent`].
pub async fn try_in_order<T, F, Fut>(mirrors: &MirrorList, mut attempt: F) -> MirrorOutcome<T>
where
    F: FnMut(Mirror) -> Fut,
    Fut: Future<Output = Result<Attempt<T>, FetchError>>,
{
    let mut failures = Vec::new();

    for mirror in mirrors.iter() {
        match attempt(mirror.clone()).await {
            Ok(Attempt::Found(value)) => {
                return MirrorOutcome::Found {
                    mirror: mirror.clone(),
                    value,
                };
            }
            Ok(Attempt::Absent) => {
                return MirrorOutcome::Absent {
                    mirror: mirror.clone(),
                };
            }
            Err(error) => {
                debug!(mirror = mirror.base(), %error, "mirror attempt failed, trying next");
                failures.push(MirrorFailure {
                    mirror: mirror.clone(),
                    error,
                });
            }
        }
    }

    MirrorOutcome::Exhausted { failures }
}

use serde::{Deserialize, Serialize};

use crate::failure::{Cause, CauseKind, WrappedFailure};

/// Message the host's connection layer attaches to an IO failure when the
/// peer has gone away.
///
/// Matched exactly: case-sensitive, whole string, no trimming. The wording
/// depends on the underlying runtime, so a different transport may report
/// the same condition with another text and be classified as a write failure.
pub const CLIENT_ABORT_MESSAGE: &str = "Connection is closed";

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Classification {
    ClientAborted,
    WriteFailure,
}

pub fn is_client_abort(cause: &Cause) -> bool {
    cause.kind == CauseKind::Io && cause.message.as_deref() == Some(CLIENT_ABORT_MESSAGE)
}

/// First link of `chain` that marks a client abort, with its position.
pub fn find_in_chain<'a>(
    chain: impl IntoIterator<Item = &'a Cause>,
) -> Option<(usize, &'a Cause)> {
    chain
        .into_iter()
        .enumerate()
        .find(|(_, cause)| is_client_abort(cause))
}

pub fn find_client_abort(failure: &WrappedFailure) -> Option<(usize, &Cause)> {
    find_in_chain(failure.chain())
}

pub fn classify_chain<'a>(chain: impl IntoIterator<Item = &'a Cause>) -> Classification {
    match find_in_chain(chain) {
        Some(_) => Classification::ClientAborted,
        None => Classification::WriteFailure,
    }
}

pub fn classify(failure: &WrappedFailure) -> Classification {
    classify_chain(failure.chain())
}

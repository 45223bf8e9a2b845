use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Upper bound on the length of a normalized or decoded failure chain,
/// carrier included.
pub const MAX_CHAIN_DEPTH: usize = 64;

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
pub enum CauseKind {
    /// The framework's carrier wrapping the original failure.
    Wrapped,
    /// IO or connection failure.
    Io,
    IllegalState,
    NullPointer,
    Other,
}

/// One link of a failure chain: `{kind, message, next}`.
///
/// Links are owned through `Box`, so a chain is always finite and acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cause {
    pub kind: CauseKind,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<Cause>>,
}

impl Cause {
    pub fn new(kind: CauseKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
            next: None,
        }
    }

    pub fn without_message(kind: CauseKind) -> Self {
        Self {
            kind,
            message: None,
            next: None,
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(CauseKind::Io, message)
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::new(CauseKind::IllegalState, message)
    }

    /// Sets the immediate next cause, replacing any existing one.
    pub fn caused_by(mut self, next: Cause) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    /// Iterates this cause and everything below it, outermost first.
    pub fn iter(&self) -> impl Iterator<Item = &Cause> {
        std::iter::successors(Some(self), |c| c.next.as_deref())
    }

    /// Normalizes a Rust error and its `source()` chain into a cause chain.
    ///
    /// `std::io::Error` links become [`CauseKind::Io`]; a [`Cause`] or
    /// [`WrappedFailure`] found in the chain keeps its kind; everything else
    /// is [`CauseKind::Other`]. At most `MAX_CHAIN_DEPTH - 1` links are taken,
    /// leaving room for the carrier once wrapped.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        let rest: Vec<&(dyn std::error::Error + 'static)> =
            std::iter::successors(err.source(), |e| e.source())
                .take(MAX_CHAIN_DEPTH - 2)
                .collect();

        let next = rest
            .into_iter()
            .rev()
            .fold(None, |next, e| Some(Box::new(normalize_link(e, next))));

        normalize_link(err, next)
    }
}

fn normalize_link(err: &(dyn std::error::Error + 'static), next: Option<Box<Cause>>) -> Cause {
    if let Some(cause) = err.downcast_ref::<Cause>() {
        return Cause {
            kind: cause.kind,
            message: cause.message.clone(),
            next,
        };
    }
    if let Some(failure) = err.downcast_ref::<WrappedFailure>() {
        return Cause {
            kind: CauseKind::Wrapped,
            message: failure.message().map(str::to_string),
            next,
        };
    }

    let kind = if err.is::<std::io::Error>() {
        CauseKind::Io
    } else {
        CauseKind::Other
    };
    Cause {
        kind,
        message: Some(err.to_string()),
        next,
    }
}

// Unlinks iteratively; the derived drop recurses once per link.
impl Drop for Cause {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(mut cause) = next {
            next = cause.next.take();
        }
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Cause {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.next
            .as_deref()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

/// A failure carried across the writer-hook boundary by the host framework.
///
/// The carrier itself is the first element of [`WrappedFailure::chain`],
/// tagged [`CauseKind::Wrapped`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WrappedFailureDoc", into = "WrappedFailureDoc")]
pub struct WrappedFailure {
    head: Cause,
}

impl WrappedFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            head: Cause::new(CauseKind::Wrapped, message),
        }
    }

    pub fn without_message() -> Self {
        Self {
            head: Cause::without_message(CauseKind::Wrapped),
        }
    }

    /// Wraps `cause`, taking its rendering as the carrier's own message.
    pub fn wrapping(cause: Cause) -> Self {
        Self::new(cause.to_string()).caused_by(cause)
    }

    /// Wraps a Rust error, normalizing its `source()` chain.
    pub fn from_error(err: &(dyn std::error::Error + 'static)) -> Self {
        Self::wrapping(Cause::from_error(err))
    }

    pub fn caused_by(mut self, cause: Cause) -> Self {
        self.head = self.head.caused_by(cause);
        self
    }

    pub fn message(&self) -> Option<&str> {
        self.head.message.as_deref()
    }

    pub fn immediate_cause(&self) -> Option<&Cause> {
        self.head.next.as_deref()
    }

    pub fn as_cause(&self) -> &Cause {
        &self.head
    }

    /// The carrier followed by its causes, outermost first.
    pub fn chain(&self) -> impl Iterator<Item = &Cause> {
        self.head.iter()
    }

    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }
}

impl fmt::Display for WrappedFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message().unwrap_or("wrapped failure"))
    }
}

impl std::error::Error for WrappedFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.immediate_cause()
            .map(|c| c as &(dyn std::error::Error + 'static))
    }
}

/// Serialized form: `{"message": ..., "cause": {kind, message, next}}`.
#[derive(Serialize, Deserialize)]
struct WrappedFailureDoc {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cause: Option<Cause>,
}

impl TryFrom<WrappedFailureDoc> for WrappedFailure {
    type Error = Error;

    fn try_from(doc: WrappedFailureDoc) -> Result<Self, Self::Error> {
        let depth = 1 + doc.cause.as_ref().map_or(0, |c| c.iter().count());
        if depth > MAX_CHAIN_DEPTH {
            return Err(Error::Parse {
                reason: format!("failure chain has {depth} links, limit is {MAX_CHAIN_DEPTH}"),
            });
        }

        let mut head = Cause {
            kind: CauseKind::Wrapped,
            message: doc.message,
            next: None,
        };
        if let Some(cause) = doc.cause {
            head = head.caused_by(cause);
        }
        Ok(Self { head })
    }
}

impl From<WrappedFailure> for WrappedFailureDoc {
    fn from(failure: WrappedFailure) -> Self {
        let mut head = failure.head;
        Self {
            message: head.message.take(),
            cause: head.next.take().map(|c| *c),
        }
    }
}

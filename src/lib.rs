#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::dbg_macro,
        clippy::print_stdout,
        clippy::print_stderr,
        clippy::panic,
    )
)]

pub mod classify;
pub mod config;
pub mod error;
pub mod failure;
pub mod guard;
pub mod hooks;
pub mod sink;

#[cfg(feature = "wasm")]
pub mod wasm;

pub use classify::{
    CLIENT_ABORT_MESSAGE, Classification, classify, classify_chain, find_client_abort,
    find_in_chain, is_client_abort,
};
pub use config::GuardConfig;
pub use error::{Error, WriteError};
pub use failure::{Cause, CauseKind, MAX_CHAIN_DEPTH, WrappedFailure};
pub use guard::{CLIENT_ABORTED_LOG, WRITE_FAILED_LOG, WriteGuard};
pub use hooks::{WriteContext, WriterChain, WriterHook};
pub use sink::{FailureSink, LogRecord, Severity, TracingSink};

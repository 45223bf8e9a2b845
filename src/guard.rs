use crate::classify::{Classification, find_client_abort};
use crate::config::GuardConfig;
use crate::error::WriteError;
use crate::failure::{Cause, WrappedFailure};
use crate::hooks::{WriteContext, WriterHook};
use crate::sink::{FailureSink, LogRecord, Severity, TracingSink};

pub const CLIENT_ABORTED_LOG: &str = "Client aborted request.";
pub const WRITE_FAILED_LOG: &str = "Failed to write response";

/// Writer hook that swallows wrapped failures raised while the response body
/// is written, logging client aborts as warnings and everything else as
/// errors.
///
/// Holds no per-request state; one instance serves every concurrent write.
#[derive(Debug, Clone)]
pub struct WriteGuard<S = TracingSink> {
    sink: S,
    config: GuardConfig,
}

impl WriteGuard<TracingSink> {
    pub fn new() -> Self {
        Self::with_sink(TracingSink)
    }
}

impl Default for WriteGuard<TracingSink> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: FailureSink> WriteGuard<S> {
    pub fn with_sink(sink: S) -> Self {
        Self::with_config(sink, GuardConfig::default())
    }

    pub fn with_config(sink: S, config: GuardConfig) -> Self {
        Self { sink, config }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Runs `proceed` and absorbs any [`WriteError::Wrapped`] it returns.
    ///
    /// `Err` is only ever returned for [`WriteError::Unwrapped`], unchanged
    /// and without logging.
    pub fn guarded_write<F>(&self, proceed: F) -> Result<(), WriteError>
    where
        F: FnOnce() -> Result<(), WriteError>,
    {
        match proceed() {
            Ok(()) => Ok(()),
            Err(WriteError::Wrapped(failure)) => {
                self.handle_failure(&failure);
                Ok(())
            }
            Err(err @ WriteError::Unwrapped(_)) => Err(err),
        }
    }

    /// Classifies `failure` and emits exactly one log entry for it.
    pub fn handle_failure(&self, failure: &WrappedFailure) -> Classification {
        if let Some((_, cause)) = find_client_abort(failure) {
            self.emit(
                Severity::Warn,
                CLIENT_ABORTED_LOG,
                cause,
                Classification::ClientAborted,
            );
            return Classification::ClientAborted;
        }

        match (failure.immediate_cause(), failure.message()) {
            (Some(cause), Some(message)) => {
                let text = format!("{WRITE_FAILED_LOG}: {message}");
                self.emit(Severity::Error, &text, cause, Classification::WriteFailure);
            }
            (Some(cause), None) => {
                self.emit(
                    Severity::Error,
                    WRITE_FAILED_LOG,
                    cause,
                    Classification::WriteFailure,
                );
            }
            (None, _) => {
                self.emit(
                    Severity::Error,
                    WRITE_FAILED_LOG,
                    failure.as_cause(),
                    Classification::WriteFailure,
                );
            }
        }
        Classification::WriteFailure
    }

    fn emit(
        &self,
        severity: Severity,
        message: &str,
        cause: &Cause,
        classification: Classification,
    ) {
        self.sink.record(&LogRecord {
            severity,
            message,
            cause: Some(cause),
            classification,
            hook: &self.config.name,
        });
    }
}

impl<S: FailureSink> WriterHook for WriteGuard<S> {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn priority(&self) -> i32 {
        self.config.priority
    }

    fn around_write(&self, ctx: &mut WriteContext<'_>) -> Result<(), WriteError> {
        self.guarded_write(|| ctx.proceed())
    }
}

use std::sync::Arc;

use crate::classify::Classification;
use crate::failure::Cause;

pub const LOG_TARGET: &str = "client_abort_guard";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display, strum_macros::AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Warn,
    Error,
}

/// One diagnostic entry produced by the guard for a failed write.
#[derive(Debug, Clone, Copy)]
pub struct LogRecord<'a> {
    pub severity: Severity,
    pub message: &'a str,
    pub cause: Option<&'a Cause>,
    pub classification: Classification,
    /// Name of the hook that produced the entry.
    pub hook: &'a str,
}

/// Logging collaborator injected into the guard. Must tolerate concurrent
/// calls from many in-flight writes.
pub trait FailureSink: Send + Sync {
    fn record(&self, record: &LogRecord<'_>);
}

impl<S: FailureSink + ?Sized> FailureSink for Arc<S> {
    fn record(&self, record: &LogRecord<'_>) {
        (**self).record(record);
    }
}

impl<S: FailureSink + ?Sized> FailureSink for &S {
    fn record(&self, record: &LogRecord<'_>) {
        (**self).record(record);
    }
}

/// Default sink: forwards entries as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl FailureSink for TracingSink {
    fn record(&self, record: &LogRecord<'_>) {
        let rendered = record.cause.map(ToString::to_string);
        let cause = rendered.as_deref();
        let cause_kind = record.cause.map(|c| c.kind.as_ref());
        let classification = record.classification.as_ref();

        match record.severity {
            Severity::Warn => tracing::warn!(
                target: LOG_TARGET,
                hook = record.hook,
                classification,
                cause_kind,
                cause,
                "{}",
                record.message
            ),
            Severity::Error => tracing::error!(
                target: LOG_TARGET,
                hook = record.hook,
                classification,
                cause_kind,
                cause,
                "{}",
                record.message
            ),
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "test assertions")]
mod tests {
    use std::collections::BTreeMap;
    use std::fmt;
    use std::sync::Mutex;

    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    #[derive(Debug)]
    struct Captured {
        level: tracing::Level,
        target: String,
        fields: BTreeMap<String, String>,
    }

    #[derive(Clone, Default)]
    struct Capture {
        events: Arc<Mutex<Vec<Captured>>>,
    }

    struct FieldVisitor<'a>(&'a mut BTreeMap<String, String>);

    impl tracing::field::Visit for FieldVisitor<'_> {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            self.0.insert(field.name().to_string(), value.to_string());
        }

        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
            self.0.insert(field.name().to_string(), format!("{value:?}"));
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for Capture {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut fields = BTreeMap::new();
            event.record(&mut FieldVisitor(&mut fields));
            self.events.lock().unwrap().push(Captured {
                level: *event.metadata().level(),
                target: event.metadata().target().to_string(),
                fields,
            });
        }
    }

    #[derive(Default)]
    struct Counting {
        seen: Mutex<Vec<Severity>>,
    }

    impl FailureSink for Counting {
        fn record(&self, record: &LogRecord<'_>) {
            if let Ok(mut seen) = self.seen.lock() {
                seen.push(record.severity);
            }
        }
    }

    fn record_with(sink: &dyn FailureSink, severity: Severity) {
        sink.record(&LogRecord {
            severity,
            message: "m",
            cause: None,
            classification: Classification::WriteFailure,
            hook: "h",
        });
    }

    #[test]
    fn shared_sinks_forward_to_inner() {
        let inner = Arc::new(Counting::default());
        let shared: Arc<Counting> = Arc::clone(&inner);

        record_with(&shared, Severity::Warn);
        record_with(&&*inner, Severity::Error);

        let seen = inner.seen.lock().map(|s| s.clone()).unwrap_or_default();
        assert_eq!(seen, vec![Severity::Warn, Severity::Error]);
    }

    #[test]
    fn tracing_sink_maps_severity_to_level() {
        let capture = Capture::default();
        let subscriber = tracing_subscriber::registry().with(capture.clone());

        let cause = Cause::io("Connection is closed");
        tracing::subscriber::with_default(subscriber, || {
            TracingSink.record(&LogRecord {
                severity: Severity::Warn,
                message: "Client aborted request.",
                cause: Some(&cause),
                classification: Classification::ClientAborted,
                hook: "guard",
            });
            record_with(&TracingSink, Severity::Error);
        });

        let events = capture.events.lock().unwrap();
        assert_eq!(events.len(), 2, "{events:?}");

        let warn = &events[0];
        assert_eq!(warn.level, tracing::Level::WARN);
        assert_eq!(warn.target, LOG_TARGET);
        assert_eq!(warn.fields["message"], "Client aborted request.");
        assert_eq!(warn.fields["hook"], "guard");
        assert_eq!(warn.fields["classification"], "client_aborted");
        assert_eq!(warn.fields["cause_kind"], "io");
        assert_eq!(warn.fields["cause"], "io: Connection is closed");

        let error = &events[1];
        assert_eq!(error.level, tracing::Level::ERROR);
        assert_eq!(error.target, LOG_TARGET);
        assert_eq!(error.fields["message"], "m");
        assert_eq!(error.fields["classification"], "write_failure");
        assert!(!error.fields.contains_key("cause"));
    }

    #[test]
    fn severity_strings() {
        assert_eq!(Severity::Warn.to_string(), "warn");
        assert_eq!(Severity::Error.as_ref(), "error");
    }
}

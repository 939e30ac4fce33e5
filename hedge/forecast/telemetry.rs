use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_logging::{JsonLogger, LogLevel, LogRecord, LogSink};
use uuid::Uuid;

/// Builder for forecasting telemetry sinks.
pub struct ForecastTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    min_level: LogLevel,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl ForecastTelemetryBuilder {
    /// Creates the builder.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            min_level: LogLevel::Debug,
            sinks: Vec::new(),
        }
    }

    /// Appends JSON lines to a file.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Lowest level written to the file sink.
    #[must_use]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Adds an extra sink (in-memory capture, custom writers).
    #[must_use]
    pub fn sink(mut self, sink: Arc<dyn LogSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Builds the telemetry handle.
    pub fn build(self) -> Result<ForecastTelemetry> {
        let mut sinks = self.sinks;
        if let Some(path) = self.log_path {
            sinks.push(Arc::new(JsonLogger::with_min_level(path, self.min_level)?));
        }
        Ok(ForecastTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                session: Uuid::new_v4(),
                sinks,
            }),
        })
    }
}

/// Telemetry handle; clones share the same sinks and session id.
#[derive(Clone)]
pub struct ForecastTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for ForecastTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForecastTelemetry")
            .field("module", &self.inner.module)
            .field("session", &self.inner.session)
            .field("sinks", &self.inner.sinks.len())
            .finish()
    }
}

struct TelemetryInner {
    module: String,
    session: Uuid,
    sinks: Vec<Arc<dyn LogSink>>,
}

impl ForecastTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> ForecastTelemetryBuilder {
        ForecastTelemetryBuilder::new(module)
    }

    /// Identifier stamped on every record from this handle.
    #[must_use]
    pub fn session(&self) -> Uuid {
        self.inner.session
    }

    /// Logs structured metadata to every sink. A failing sink does not stop the others; the
    /// first error is returned once all have been tried.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
        if self.inner.sinks.is_empty() {
            return Ok(());
        }
        let record = LogRecord::new(&self.inner.module, level, message)
            .with_field("session", self.inner.session.to_string())
            .with_fields(metadata);
        let mut first_error = None;
        for sink in &self.inner.sinks {
            if let Err(err) = sink.log(&record) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shared_logging::MemoryLogger;
    use tempfile::tempdir;

    #[test]
    fn telemetry_writes_file_and_memory_sinks() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("forecast.log");
        let memory = Arc::new(MemoryLogger::new());
        let telemetry = ForecastTelemetry::builder("forecast")
            .log_path(&path)
            .min_level(LogLevel::Info)
            .sink(memory.clone())
            .build()
            .unwrap();
        telemetry
            .log(LogLevel::Debug, "engine.round", json!({ "round": 1 }))
            .unwrap();
        telemetry
            .log(LogLevel::Info, "engine.reset", json!({ "experts": 3 }))
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.contains("engine.reset"));
        assert!(content.contains(&telemetry.session().to_string()));
        assert_eq!(memory.len(), 2);
        assert_eq!(memory.records()[0].metadata["round"], json!(1));
    }

    struct BrokenSink;

    impl LogSink for BrokenSink {
        fn log(&self, _record: &LogRecord) -> Result<()> {
            anyhow::bail!("disk full")
        }
    }

    #[test]
    fn failing_sink_does_not_starve_the_rest() {
        let memory = Arc::new(MemoryLogger::new());
        let telemetry = ForecastTelemetry::builder("forecast")
            .sink(Arc::new(BrokenSink))
            .sink(memory.clone())
            .build()
            .unwrap();
        let err = telemetry
            .log(LogLevel::Info, "engine.reset", json!({ "experts": 2 }))
            .unwrap_err();
        assert!(err.to_string().contains("disk full"));
        assert_eq!(memory.len(), 1);
    }

    #[test]
    fn telemetry_without_sinks_is_silent() {
        let telemetry = ForecastTelemetry::builder("forecast").build().unwrap();
        telemetry
            .log(LogLevel::Error, "engine.finished", Value::Null)
            .unwrap();
    }
}

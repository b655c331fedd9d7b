use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestOutcome {
    Passed,
    Failed,
}

/// Hook invoked around every test the [`TestRunner`](super::runner::TestRunner) executes.
pub trait TestObserver {
    fn test_started(&mut self, name: &str);
    fn test_finished(&mut self, name: &str, outcome: TestOutcome);
}

/// Logs each finished test.
#[derive(Debug, Default)]
pub struct LogObserver;

impl TestObserver for LogObserver {
    fn test_started(&mut self, name: &str) {
        log::debug!("Starting {name}");
    }

    fn test_finished(&mut self, name: &str, outcome: TestOutcome) {
        match outcome {
            TestOutcome::Passed => log::info!("{name} passed"),
            TestOutcome::Failed => log::warn!("{name} failed"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TestRecord {
    pub name: String,
    pub outcome: TestOutcome,
    pub finished_at: DateTime<Utc>,
}

/// Collects outcomes and writes them out as a JSON array.
#[derive(Debug, Default)]
pub struct JsonReportObserver {
    records: Vec<TestRecord>,
}

impl JsonReportObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    pub fn write_report<W: Write>(&self, writer: W) -> serde_json::Result<()> {
        serde_json::to_writer_pretty(writer, &self.records)
    }
}

impl TestObserver for JsonReportObserver {
    fn test_started(&mut self, name: &str) {
        log::trace!("Recording {name}");
    }

    fn test_finished(&mut self, name: &str, outcome: TestOutcome) {
        self.records.push(TestRecord {
            name: name.to_string(),
            outcome,
            finished_at: Utc::now(),
        });
    }
}

use crate::harness::observer::{TestObserver, TestOutcome};
use std::panic::{self, AssertUnwindSafe};

/// Identifies a test as `suite/function[/data_tag]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TestCase {
    pub suite: String,
    pub function: String,
    pub data_tag: Option<String>,
}

impl TestCase {
    pub fn new(suite: impl Into<String>, function: impl Into<String>) -> Self {
        TestCase {
            suite: suite.into(),
            function: function.into(),
            data_tag: None,
        }
    }

    pub fn with_data_tag(mut self, tag: impl Into<String>) -> Self {
        self.data_tag = Some(tag.into());
        self
    }

    pub fn name(&self) -> String {
        match &self.data_tag {
            Some(tag) => format!("{}/{}/{}", self.suite, self.function, tag),
            None => format!("{}/{}", self.suite, self.function),
        }
    }
}

/// Runs test bodies and reports each outcome to an optional observer.
#[derive(Default)]
pub struct TestRunner {
    observer: Option<Box<dyn TestObserver>>,
}

impl TestRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observer(observer: Box<dyn TestObserver>) -> Self {
        TestRunner {
            observer: Some(observer),
        }
    }

    pub fn into_observer(self) -> Option<Box<dyn TestObserver>> {
        self.observer
    }

    /// Runs `body`. `false` or a panic counts as a failure; a panic is resumed once the observer
    /// has been told.
    pub fn run<F: FnOnce() -> bool>(&mut self, case: &TestCase, body: F) -> TestOutcome {
        let name = case.name();
        if let Some(observer) = self.observer.as_mut() {
            observer.test_started(&name);
        }

        let result = panic::catch_unwind(AssertUnwindSafe(body));
        let outcome = match result {
            Ok(true) => TestOutcome::Passed,
            _ => TestOutcome::Failed,
        };

        if let Some(observer) = self.observer.as_mut() {
            observer.test_finished(&name, outcome);
        }
        if let Err(payload) = result {
            panic::resume_unwind(payload);
        }
        outcome
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        harness::observer::{JsonReportObserver, LogObserver},
        test::apps::PingEcho,
        TestEngine,
    };
    use std::{cell::RefCell, rc::Rc};

    #[derive(Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl TestObserver for Recorder {
        fn test_started(&mut self, name: &str) {
            self.events.borrow_mut().push(format!("start {name}"));
        }

        fn test_finished(&mut self, name: &str, outcome: TestOutcome) {
            self.events
                .borrow_mut()
                .push(format!("finish {name} {:?}", outcome));
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(TestCase::new("TestAlpha", "validate").name(), "TestAlpha/validate");
        assert_eq!(
            TestCase::new("TestAlpha", "validate")
                .with_data_tag("ascii")
                .name(),
            "TestAlpha/validate/ascii"
        );
    }

    #[test]
    fn runner_without_observer() {
        let mut runner = TestRunner::new();
        let case = TestCase::new("Suite", "passes");
        assert_eq!(runner.run(&case, || true), TestOutcome::Passed);
        assert_eq!(runner.run(&case, || false), TestOutcome::Failed);
    }

    #[test]
    fn observer_sees_start_and_finish() {
        let events = Rc::new(RefCell::new(vec![]));
        let recorder = Recorder {
            events: events.clone(),
        };
        let mut runner = TestRunner::with_observer(Box::new(recorder));
        let engine = TestEngine::new(PingEcho::default());

        let case = TestCase::new("TestEngine", "ping");
        runner.run(&case, || engine.get("/ping", "").text() == "pong");
        let case = TestCase::new("TestEngine", "status").with_data_tag("missing");
        runner.run(&case, || engine.get("/missing", "").status_code() == &200);

        assert_eq!(
            events.borrow().clone(),
            vec![
                "start TestEngine/ping",
                "finish TestEngine/ping Passed",
                "start TestEngine/status/missing",
                "finish TestEngine/status/missing Failed",
            ]
        );
    }

    #[test]
    fn log_observer_passes_outcome_through() {
        let _ = env_logger::builder().is_test(true).try_init();
        let mut runner = TestRunner::with_observer(Box::new(LogObserver));
        let case = TestCase::new("Suite", "logs");
        assert_eq!(runner.run(&case, || true), TestOutcome::Passed);
        assert_eq!(runner.run(&case, || false), TestOutcome::Failed);
    }

    #[test]
    fn panic_is_reported_then_resumed() {
        let mut runner = TestRunner::with_observer(Box::new(JsonReportObserver::new()));
        let case = TestCase::new("Suite", "explodes");
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            runner.run(&case, || panic!("boom"));
        }));
        assert!(result.is_err());
        assert!(runner.into_observer().is_some());
    }
}

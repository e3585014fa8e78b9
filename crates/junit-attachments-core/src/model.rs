//! Read-only view of a finished test run, as supplied by the test engine.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// All suites of one finished run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRun {
    #[serde(default)]
    pub suites: Vec<SuiteResult>,
}

/// One test-framework execution unit (usually one report file).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteResult {
    pub name: String,
    /// Report file location, workspace-relative or absolute.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
    #[serde(default)]
    pub cases: Vec<CaseResult>,
}

/// One test method result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseResult {
    pub name: String,
    /// Fully-qualified owning class name.
    pub class_name: String,
    #[serde(default)]
    pub stdout: Option<String>,
    #[serde(default)]
    pub stderr: Option<String>,
}

impl SuiteResult {
    /// Distinct class names declared by the suite's cases, sorted.
    pub fn class_names(&self) -> BTreeSet<&str> {
        self.cases.iter().map(|c| c.class_name.as_str()).collect()
    }

    /// Classes that receive the suite's own (class-level) output.
    ///
    /// A suite named after one of its classes attaches to that class only.
    /// Otherwise every declared class gets the suite-level attachments; a
    /// suite without cases falls back to its own name.
    pub fn output_classes(&self) -> Vec<&str> {
        let classes = self.class_names();
        if classes.contains(self.name.as_str()) || classes.is_empty() {
            vec![self.name.as_str()]
        } else {
            classes.into_iter().collect()
        }
    }
}

impl CaseResult {
    /// Captured text that belongs to this case alone.
    ///
    /// Each stream identical to the suite's stream is treated as absent so
    /// suite-level markers are not attributed to every case. The result
    /// always ends with a newline so a marker closing stdout is recognised
    /// even when stderr is empty. Returns `None` when nothing is left.
    pub fn distinct_output(&self, suite: &SuiteResult) -> Option<String> {
        let stdout = distinct(self.stdout.as_deref(), suite.stdout.as_deref());
        let stderr = distinct(self.stderr.as_deref(), suite.stderr.as_deref());
        if stdout.is_none() && stderr.is_none() {
            return None;
        }

        let mut text = String::new();
        text.push_str(stdout.unwrap_or_default());
        text.push_str(stderr.unwrap_or_default());
        text.push('\n');
        Some(text)
    }
}

fn distinct<'a>(own: Option<&'a str>, suite: Option<&str>) -> Option<&'a str> {
    match own {
        Some(text) if text.is_empty() => None,
        Some(text) if Some(text) == suite => None,
        other => other,
    }
}

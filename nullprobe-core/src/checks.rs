//! The ordered list of checks a probe run performs.
//!
//! Each check names a query, the shape of its result and what a failure of
//! that query means for the run. The orchestrator walks the list in order;
//! adding a check is a matter of adding a descriptor.

/// Shape of the result a check expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckShape {
    /// Many `(name, value)` rows; both columns are validated
    VariablePairs,
    /// `SHOW SLAVE STATUS` rows; eight named fields are validated
    ReplicationStatus,
    /// Exactly one row with one column
    Scalar,
}

/// What a failing query does to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run with a fatal error
    Abort,
    /// Emit a `gave an error` warning line and continue
    Report,
}

/// One entry of the probe plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// Label used on report lines for the check as a whole
    pub name: String,
    /// SQL text, sent as-is over the text protocol
    pub query: String,
    /// Expected result shape
    pub shape: CheckShape,
    /// Failure handling
    pub on_failure: FailurePolicy,
    /// Narrative line printed before the check runs
    pub heading: Option<String>,
}

impl Check {
    /// Check scanning server variables that match `pattern`.
    pub fn variables(pattern: &str) -> Self {
        let query = format!("show variables like '{pattern}'");
        Self {
            name: query.clone(),
            heading: Some(query.clone()),
            query,
            shape: CheckShape::VariablePairs,
            on_failure: FailurePolicy::Abort,
        }
    }

    /// Check reading the replication status row(s).
    pub fn replication_status() -> Self {
        Self {
            name: "show slave status".to_string(),
            query: "show slave status".to_string(),
            shape: CheckShape::ReplicationStatus,
            on_failure: FailurePolicy::Report,
            heading: Some("show slave status:".to_string()),
        }
    }

    /// Single-value check reported under `name`.
    pub fn scalar(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            shape: CheckShape::Scalar,
            on_failure: FailurePolicy::Report,
            heading: None,
        }
    }

    /// Builder method to set the heading.
    pub fn with_heading(mut self, heading: impl Into<String>) -> Self {
        self.heading = Some(heading.into());
        self
    }

    /// Builder method to set the failure policy.
    pub const fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_failure = policy;
        self
    }
}

/// The standard plan: proxy variables, replication status, then version,
/// hostname and report host.
pub fn default_checks(variable_pattern: &str) -> Vec<Check> {
    vec![
        Check::variables(variable_pattern),
        Check::replication_status(),
        Check::scalar("VERSION()", "SELECT VERSION()").with_heading("other commands:"),
        Check::scalar("@@hostname", "SELECT @@hostname"),
        Check::scalar("@@report_host", "SELECT @@report_host"),
    ]
}

//! Diagnostic sequence orchestrator.
//!
//! A [`Probe`] owns the session for the whole run, walks its check plan in
//! order, routes every retrieved string through the validator and writes
//! one report line per value. The session is closed exactly once when the
//! run ends, whether it completed or aborted.

use crate::checks::{Check, CheckShape, FailurePolicy, default_checks};
use crate::config::ProbeConfig;
use crate::report::{ProbeSummary, ValidationReport};
use crate::scalar::run_scalar;
use crate::source::QuerySource;
use crate::validation::null_offsets;
use crate::{Result, error::ProbeError};
use std::io::Write;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Label for the name column of a variable scan row
pub const VARIABLE_NAME_LABEL: &str = "Variable_name";

/// Narrative line for a replication status query that returned no rows
pub const NO_REPLICATION_ROWS: &str = "show slave status: no rows (not a replica)";

/// One probe run over an exclusively owned session.
pub struct Probe<S: QuerySource> {
    source: S,
    config: ProbeConfig,
    checks: Vec<Check>,
    preamble: Option<String>,
}

impl<S: QuerySource> std::fmt::Debug for Probe<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Probe")
            .field("config", &self.config)
            .field("checks", &self.checks)
            .field("preamble", &self.preamble)
            .finish_non_exhaustive()
    }
}

impl<S: QuerySource> Probe<S> {
    /// Creates a probe running the default check plan.
    pub fn new(source: S, config: ProbeConfig) -> Self {
        let checks = default_checks(&config.variable_pattern);
        Self {
            source,
            config,
            checks,
            preamble: None,
        }
    }

    /// Writes `line` before the first check, inside the run, so a failed
    /// write still releases the session.
    pub fn with_preamble(mut self, line: impl Into<String>) -> Self {
        self.preamble = Some(line.into());
        self
    }

    /// Replaces the check plan.
    pub fn with_checks(mut self, checks: Vec<Check>) -> Self {
        self.checks = checks;
        self
    }

    /// The plan this probe will run, in order.
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// The configuration the probe was built with.
    pub const fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Runs every check in order, writing headings and report lines to
    /// `out`, then closes the session.
    ///
    /// # Errors
    /// Returns the first fatal error: a failing check whose policy is
    /// [`FailurePolicy::Abort`], or a failed write to `out`. The session is
    /// closed before the error is returned.
    pub async fn run<W: Write>(mut self, out: &mut W) -> Result<ProbeSummary> {
        let outcome = self.run_checks(out).await;

        if let Err(e) = self.source.close().await {
            warn!("Failed to close connection cleanly: {}", e);
        } else {
            debug!("Connection closed");
        }

        if let Ok(summary) = &outcome {
            info!(
                "Probe finished: {} ok, {} with nulls, {} failed",
                summary.ok, summary.warnings, summary.failed
            );
        }
        outcome
    }

    async fn run_checks<W: Write>(&mut self, out: &mut W) -> Result<ProbeSummary> {
        let mut summary = ProbeSummary::default();

        if let Some(line) = &self.preamble {
            narrate(out, line)?;
        }

        for check in &self.checks {
            if let Some(heading) = &check.heading {
                narrate(out, heading)?;
            }

            let started = Instant::now();
            run_check(&mut self.source, check, out, &mut summary).await?;
            debug!("{} completed in {:?}", check.name, started.elapsed());
        }

        Ok(summary)
    }
}

async fn run_check<S: QuerySource, W: Write>(
    source: &mut S,
    check: &Check,
    out: &mut W,
    summary: &mut ProbeSummary,
) -> Result<()> {
    match check.shape {
        CheckShape::VariablePairs => match source.fetch_pairs(&check.query).await {
            Ok(pairs) => {
                for pair in pairs {
                    let label = String::from_utf8_lossy(&pair.name).into_owned();
                    emit(out, summary, &ValidationReport::check(VARIABLE_NAME_LABEL, pair.name))?;
                    emit(out, summary, &ValidationReport::check(label, pair.value))?;
                }
                Ok(())
            }
            Err(e) => fail(check, e, out, summary),
        },
        CheckShape::ReplicationStatus => match source.fetch_replication_status(&check.query).await
        {
            Ok(rows) if rows.is_empty() => narrate(out, NO_REPLICATION_ROWS),
            Ok(rows) => {
                for row in &rows {
                    for (label, value) in row.fields() {
                        emit(out, summary, &ValidationReport::check(label, value))?;
                    }
                }
                Ok(())
            }
            Err(e) => fail(check, e, out, summary),
        },
        CheckShape::Scalar => match run_scalar(source, &check.query).await {
            Ok(value) => emit(out, summary, &ValidationReport::check(check.name.as_str(), value)),
            Err(e) => fail(check, e, out, summary),
        },
    }
}

/// Applies the check's failure policy to a query error.
fn fail<W, E>(check: &Check, error: E, out: &mut W, summary: &mut ProbeSummary) -> Result<()>
where
    W: Write,
    E: std::error::Error + Send + Sync + 'static,
{
    match check.on_failure {
        FailurePolicy::Abort => Err(ProbeError::query_failed(check.name.clone(), error)),
        FailurePolicy::Report => {
            warn!("{} failed: {}", check.name, error);
            emit(
                out,
                summary,
                &ValidationReport::query_failed(check.name.as_str(), error.to_string()),
            )
        }
    }
}

fn emit<W: Write>(out: &mut W, summary: &mut ProbeSummary, report: &ValidationReport) -> Result<()> {
    summary.record(report);
    if let ValidationReport::Warning { name, value, count } = report {
        debug!(
            "{} has {} nulls at offsets {:?}",
            name,
            count,
            null_offsets(value)
        );
    }
    writeln!(out, "{report}").map_err(|e| ProbeError::io("Failed to write report line", e))
}

fn narrate<W: Write>(out: &mut W, line: &str) -> Result<()> {
    writeln!(out, "{line}").map_err(|e| ProbeError::io("Failed to write report line", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Writer that fails every write.
    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "stdout closed",
            ))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_fail_report_policy_emits_line() {
        let check = Check::scalar("@@hostname", "SELECT @@hostname");
        let mut out = Vec::new();
        let mut summary = ProbeSummary::default();

        fail(&check, sqlx::Error::RowNotFound, &mut out, &mut summary).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("WARNING: @@hostname gave an error: '"));
        assert_eq!(summary.failed, 1);
    }

    #[test]
    fn test_fail_abort_policy_is_fatal() {
        let check = Check::variables("maxscale%");
        let mut out = Vec::new();
        let mut summary = ProbeSummary::default();

        let result = fail(
            &check,
            sqlx::Error::Protocol("boom".to_string()),
            &mut out,
            &mut summary,
        );

        assert!(matches!(result, Err(ProbeError::Query { .. })));
        assert!(out.is_empty());
        assert_eq!(summary.total(), 0);
    }

    #[test]
    fn test_emit_write_failure_is_io_error() {
        let mut summary = ProbeSummary::default();
        let result = emit(
            &mut BrokenPipe,
            &mut summary,
            &ValidationReport::check("a", "b"),
        );
        assert!(matches!(result, Err(ProbeError::Io { .. })));
    }
}

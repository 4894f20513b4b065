use crate::artifacts;
use crate::engine::{Engine, EngineKind, TexEngine};
use crate::paths::{JobError, JobPaths};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use texloop_log::{DiagnosticReport, LogParser};

/// Terminal result of the rerun loop for one document.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The log no longer requests a rerun and halt-on-error did not trip.
    Success(DiagnosticReport),
    /// The report had errors and `halt_on_errors` is set.
    HaltedOnError(DiagnosticReport),
    /// Every attempt still requested a rerun; carries the last report.
    ExhaustedRetries(DiagnosticReport),
    /// The engine left no usable log; not retried.
    LogUnreadable(String),
    /// Cancellation was observed between attempts.
    Interrupted,
}

impl RunOutcome {
    /// The final report, when one was produced.
    pub fn report(&self) -> Option<&DiagnosticReport> {
        match self {
            RunOutcome::Success(report)
            | RunOutcome::HaltedOnError(report)
            | RunOutcome::ExhaustedRetries(report) => Some(report),
            RunOutcome::LogUnreadable(_) | RunOutcome::Interrupted => None,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Success(_))
    }
}

/// Policy for one document's rerun loop.
///
/// - `max_runs`: attempt budget, default 5.
/// - `halt_on_errors`: stop at the first report with errors, default true.
///   When clear, errors are recorded but reruns continue until convergence
///   or exhaustion.
/// - `engine`: which engine binary to invoke, default pdflatex.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub max_runs: u32,
    pub halt_on_errors: bool,
    pub engine: EngineKind,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_runs: 5,
            halt_on_errors: true,
            engine: EngineKind::default(),
        }
    }
}

/// Drives the engine until the log stops requesting reruns.
///
/// Strictly sequential: one engine invocation and one parse in flight at a
/// time. Each `compile` call owns its output directory and log for the whole
/// loop; running documents concurrently requires disjoint output directories.
pub struct Runner {
    config: RunnerConfig,
    engine: Box<dyn Engine>,
    cancel: Option<Arc<AtomicBool>>,
}

impl Runner {
    pub fn new(config: RunnerConfig) -> Self {
        let engine = Box::new(TexEngine::new(config.engine));
        Self {
            config,
            engine,
            cancel: None,
        }
    }

    /// Substitutes the engine boundary, mainly for tests.
    pub fn with_engine(config: RunnerConfig, engine: Box<dyn Engine>) -> Self {
        Self {
            config,
            engine,
            cancel: None,
        }
    }

    /// Installs a cancellation flag, checked between attempts only; a running
    /// engine process is opaque and never interrupted mid-invocation.
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Runs the rerun loop for one document.
    ///
    /// Input validation failures (wrong extension, missing file) fail fast
    /// with `Err` before any engine invocation; everything the loop itself
    /// decides comes back as a [`RunOutcome`].
    pub fn compile(&self, tex_path: &Path) -> Result<RunOutcome, JobError> {
        self.compile_in(tex_path, None)
    }

    /// As [`compile`](Self::compile), with an explicit output directory.
    pub fn compile_in(
        &self,
        tex_path: &Path,
        out_dir: Option<PathBuf>,
    ) -> Result<RunOutcome, JobError> {
        let paths = JobPaths::resolve(tex_path, out_dir)?;
        let max_runs = self.config.max_runs.max(1);
        let mut last_report = DiagnosticReport::default();

        for attempt in 1..=max_runs {
            if self.is_cancelled() {
                log::info!("cancelled before attempt {}", attempt);
                return Ok(RunOutcome::Interrupted);
            }

            log::info!(
                "[{}/{}] {} {}",
                attempt,
                max_runs,
                self.engine.name(),
                paths.source.display()
            );
            if let Err(err) = self.engine.run(&paths, self.config.halt_on_errors) {
                // No invocation, hence no log to diagnose from.
                return Ok(RunOutcome::LogUnreadable(err.to_string()));
            }

            let report = match self.parse_log(&paths) {
                Ok(report) => report,
                Err(reason) => return Ok(RunOutcome::LogUnreadable(reason)),
            };

            if report.has_errors() && self.config.halt_on_errors {
                // Takes precedence over a simultaneous rerun request.
                return Ok(RunOutcome::HaltedOnError(report));
            }

            // Outputs are relocated after every parsed run, converged or not.
            if let Err(err) = artifacts::relocate_outputs(&paths) {
                log::warn!("could not relocate outputs: {}", err);
            }

            if !report.rerun_needed {
                return Ok(RunOutcome::Success(report));
            }
            log::debug!("log requests another pass");
            last_report = report;
        }

        Ok(RunOutcome::ExhaustedRetries(last_report))
    }

    fn parse_log(&self, paths: &JobPaths) -> Result<DiagnosticReport, String> {
        let log_path = paths.log_path();
        let raw = fs::read(&log_path)
            .map_err(|err| format!("cannot read {}: {}", log_path.display(), err))?;
        // The engine is not encoding-safe; fall back to lossy decoding.
        let text = String::from_utf8_lossy(&raw);
        LogParser::new()
            .parse(&text)
            .map_err(|err| format!("{}: {}", log_path.display(), err))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

use crate::paths::JobPaths;
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to run {engine}: {source}")]
    Spawn {
        engine: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Which TeX engine binary to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineKind {
    #[default]
    Pdflatex,
    Xelatex,
}

impl EngineKind {
    pub fn command(self) -> &'static str {
        match self {
            EngineKind::Pdflatex => "pdflatex",
            EngineKind::Xelatex => "xelatex",
        }
    }
}

/// Blocking boundary to the external batch compiler.
///
/// One call is one engine pass. The implementation must leave a log file at
/// `paths.log_path()`; the exit status is not authoritative, diagnosis comes
/// from that log.
pub trait Engine {
    /// Identifies the engine, e.g. "pdflatex".
    fn name(&self) -> &str;

    fn run(&self, paths: &JobPaths, halt_on_errors: bool) -> Result<(), EngineError>;
}

/// Real engine invocation via `std::process::Command`.
pub struct TexEngine {
    kind: EngineKind,
}

impl TexEngine {
    pub fn new(kind: EngineKind) -> Self {
        Self { kind }
    }
}

impl Engine for TexEngine {
    fn name(&self) -> &str {
        self.kind.command()
    }

    fn run(&self, paths: &JobPaths, halt_on_errors: bool) -> Result<(), EngineError> {
        std::fs::create_dir_all(&paths.out_dir).map_err(|source| EngineError::OutputDir {
            path: paths.out_dir.display().to_string(),
            source,
        })?;

        let mut cmd = Command::new(self.kind.command());
        cmd.arg("-8bit")
            .arg("-no-mktex=pk")
            .arg("-interaction=batchmode")
            .arg("-synctex=1");
        if halt_on_errors {
            cmd.arg("-halt-on-error");
        }
        cmd.arg(format!("-output-directory={}", paths.out_dir.display()))
            .arg(&paths.source)
            // Search path for included files, threaded per invocation rather
            // than mutated process-wide.
            .env("TEXINPUTS", format!("{}:", paths.base_dir.display()))
            .current_dir(&paths.base_dir)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let output = cmd.output().map_err(|source| EngineError::Spawn {
            engine: self.kind.command().to_string(),
            source,
        })?;

        // In batchmode the engine prints little more than its version
        // banner; echo it as the per-pass progress line.
        if let Some(banner) = banner_line(&output.stdout) {
            log::info!("{}", banner);
        }

        if !output.status.success() {
            // Expected for documents with errors in batchmode; the log
            // decides the outcome.
            log::debug!(
                "{} exited with {}; deferring to the log",
                self.kind.command(),
                output.status
            );
        }
        Ok(())
    }
}

/// First non-empty stdout line, normally the engine's version banner.
fn banner_line(stdout: &[u8]) -> Option<String> {
    let text = String::from_utf8_lossy(stdout);
    text.lines()
        .map(str::trim_end)
        .find(|line| !line.is_empty())
        .map(str::to_string)
}

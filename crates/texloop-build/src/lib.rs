//! # TexLoop Build
//!
//! The rerun loop around a batch-mode TeX engine: invoke the engine, parse
//! the log it leaves behind, and repeat until the log stops asking for
//! another pass, an error halts the loop, or the attempt budget runs out.
//!
//! The engine sits behind the [`Engine`] trait so the loop can be exercised
//! against scripted engines in tests; [`TexEngine`] is the real
//! pdflatex/xelatex invocation. Auxiliary outputs (PDF, SyncTeX) are moved
//! back next to the source after every parsed run.
//!
//! ```no_run
//! use texloop_build::{Runner, RunnerConfig};
//! use std::path::Path;
//!
//! let runner = Runner::new(RunnerConfig::default());
//! let outcome = runner.compile(Path::new("thesis.tex"))?;
//! if let Some(report) = outcome.report() {
//!     for line in texloop_log::render(report) {
//!         println!("{}", line.text);
//!     }
//! }
//! # Ok::<(), texloop_build::JobError>(())
//! ```

pub mod artifacts;
pub mod engine;
pub mod paths;
pub mod runner;

pub use engine::{Engine, EngineError, EngineKind, TexEngine};
pub use paths::{JobError, JobPaths};
pub use runner::{RunOutcome, Runner, RunnerConfig};

use clap::{Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use texloop_build::{EngineKind, RunOutcome, Runner, RunnerConfig};
use texloop_log::{render, FormattedLine, LogParser, Severity};

#[derive(Parser)]
#[command(name = "texloop")]
#[command(about = "Rerun-until-converged driver for batch-mode TeX engines", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a document, rerunning until cross-references converge
    Build {
        /// Path to the .tex file (extension optional)
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Attempt budget for the rerun loop
        #[arg(long, default_value_t = 5)]
        max_runs: u32,

        /// Keep rerunning even when a pass reports errors
        #[arg(long)]
        keep_going: bool,

        /// Use xelatex instead of pdflatex
        #[arg(long)]
        xetex: bool,

        /// Directory for the log and intermediate outputs
        #[arg(long, value_name = "DIR")]
        out_dir: Option<PathBuf>,
    },
    /// Parse an existing log file and report its diagnostics
    Parse {
        /// Path to the .log file
        #[arg(value_name = "FILE")]
        path: PathBuf,

        /// Emit the report as JSON instead of rendered lines
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("texloop: {:#}", err);
            ExitCode::from(2)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Commands::Build {
            path,
            max_runs,
            keep_going,
            xetex,
            out_dir,
        } => {
            let config = RunnerConfig {
                max_runs,
                halt_on_errors: !keep_going,
                engine: if xetex {
                    EngineKind::Xelatex
                } else {
                    EngineKind::Pdflatex
                },
            };
            let outcome = Runner::new(config).compile_in(&path, out_dir)?;
            Ok(report_outcome(&outcome))
        }
        Commands::Parse { path, json } => {
            let raw = fs::read(&path)?;
            let report = LogParser::new().parse(&String::from_utf8_lossy(&raw))?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_lines(&render(&report));
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn report_outcome(outcome: &RunOutcome) -> ExitCode {
    if let Some(report) = outcome.report() {
        print_lines(&render(report));
    }
    match outcome {
        RunOutcome::Success(_) => {
            log::info!("typesetting converged");
            ExitCode::SUCCESS
        }
        RunOutcome::HaltedOnError(_) => {
            eprintln!("texloop: stopped on errors");
            ExitCode::FAILURE
        }
        RunOutcome::ExhaustedRetries(_) => {
            eprintln!("texloop: still not converged after the last allowed run");
            ExitCode::FAILURE
        }
        RunOutcome::LogUnreadable(reason) => {
            eprintln!("texloop: no usable log: {}", reason);
            ExitCode::FAILURE
        }
        RunOutcome::Interrupted => {
            eprintln!("texloop: interrupted");
            ExitCode::FAILURE
        }
    }
}

fn print_lines(lines: &[FormattedLine]) {
    for line in lines {
        println!("{} {}", tag(line.severity), line.text);
    }
}

fn tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "[error]",
        Severity::Warning => "[warn ]",
        Severity::BoxNotice => "[box  ]",
        Severity::ReferenceNotice => "[ref  ]",
        Severity::Info => "[info ]",
    }
}

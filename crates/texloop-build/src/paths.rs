use std::path::{Path, PathBuf};
use thiserror::Error;

/// Input validation failure, detected before any engine invocation.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("wrong extension for {0}: expected .tex")]
    WrongExtension(PathBuf),
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),
}

/// Paths derived from the input document.
///
/// For `path/to/file.tex` (or `path/to/file`):
/// - `base_dir`: `path/to`
/// - `stem`: `file`
/// - `source`: `path/to/file.tex`
/// - `out_dir`: where the engine writes its log and outputs
#[derive(Debug, Clone)]
pub struct JobPaths {
    pub base_dir: PathBuf,
    pub stem: String,
    pub source: PathBuf,
    pub out_dir: PathBuf,
}

/// Default output directory name, created under the source directory.
const DEFAULT_OUT_DIR: &str = ".texloop";

impl JobPaths {
    /// Normalizes the input path and derives the working paths.
    ///
    /// An extensionless path gets `.tex` appended; any extension other than
    /// `.tex` is rejected. The source file must already exist.
    pub fn resolve(tex_path: &Path, out_dir: Option<PathBuf>) -> Result<Self, JobError> {
        let source = match tex_path.extension() {
            None => tex_path.with_extension("tex"),
            Some(ext) if ext == "tex" => tex_path.to_path_buf(),
            Some(_) => return Err(JobError::WrongExtension(tex_path.to_path_buf())),
        };
        if !source.is_file() {
            return Err(JobError::MissingInput(source));
        }
        let base_dir = match source.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let stem = source
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out_dir = out_dir.unwrap_or_else(|| base_dir.join(DEFAULT_OUT_DIR));
        Ok(Self {
            base_dir,
            stem,
            source,
            out_dir,
        })
    }

    /// Location contract for the engine's log: `<out_dir>/<stem>.log`.
    pub fn log_path(&self) -> PathBuf {
        self.out_dir.join(format!("{}.log", self.stem))
    }
}

use std::io;
use std::path::PathBuf;

/// Failures surfaced by the library. The scanning and stripping passes never
/// fail; everything here comes from rule lookup or file access.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unsupported file type: {}", .0.display())]
    UnsupportedLanguage(PathBuf),

    #[error("unknown language `{0}`")]
    UnknownLanguage(String),

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not create backup {}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid language rule: {0}")]
    InvalidRules(String),

    #[error("failed to parse rules file {}", path.display())]
    RulesFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

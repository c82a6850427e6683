use std::{
    fs, io,
    path::{Path, PathBuf},
};

use maze_patrol_core::Rules;
use thiserror::Error;

/// Errors raised while reading a TOML rules file.
#[derive(Debug, Error)]
pub(crate) enum RulesFileError {
    /// The file could not be read.
    #[error("failed to read rules file {}", path.display())]
    Read {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not a valid rules document.
    #[error("invalid rules file {}", path.display())]
    Parse {
        /// Path that was requested.
        path: PathBuf,
        /// Parser diagnostic, including the offending line.
        #[source]
        source: toml::de::Error,
    },
}

/// Reads the rules stored at `path`. Missing keys keep their defaults.
pub(crate) fn load_rules(path: &Path) -> Result<Rules, RulesFileError> {
    let text = fs::read_to_string(path).map_err(|source| RulesFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_rules(&text).map_err(|source| RulesFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_rules(text: &str) -> Result<Rules, toml::de::Error> {
    toml::from_str(text)
}

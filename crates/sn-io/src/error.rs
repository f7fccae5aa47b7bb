//! Parse diagnostics with file and line context.

use sn_core::CoreError;
use sn_network::NetworkError;
use sn_props::PropsError;
use thiserror::Error;

pub type IoResult<T> = Result<T, ParseError>;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("{file}:{line}: unexpected '{found}', expected {expected}")]
    Unexpected {
        file: &'static str,
        line: usize,
        found: String,
        expected: &'static str,
    },

    #[error("{file}:{line}: unknown tag '{tag}'")]
    UnknownTag {
        file: &'static str,
        line: usize,
        tag: String,
    },

    #[error("{file}:{line}: duplicate assignment of '{field}'")]
    Duplicate {
        file: &'static str,
        line: usize,
        field: String,
    },

    #[error("{file}:{line}: malformed value '{value}' for '{field}'")]
    Malformed {
        file: &'static str,
        line: usize,
        field: String,
        value: String,
    },

    #[error("{file}: missing required field '{field}'")]
    Missing {
        file: &'static str,
        field: &'static str,
    },

    #[error("{file}: declared {declared} blocks but found {found}")]
    CountMismatch {
        file: &'static str,
        declared: usize,
        found: usize,
    },

    #[error("{file}:{line}: element ids must run densely from 1 in order")]
    ElementOrder { file: &'static str, line: usize },

    #[error("nodes: ids must run densely from 1, problem at id {id}")]
    NodeIds { id: u32 },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Props(#[from] PropsError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

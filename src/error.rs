use thiserror::Error;

use crate::constants::exit_codes;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}.")]
    IoError(#[from] std::io::Error),

    #[error("Set -r|--razor or -t|--t4-template option!")]
    MissingTemplateKind,

    #[error("Failed to build template glob. Original error: {0}")]
    GlobSetParseError(#[from] globset::Error),

    #[error("Failed to walk the processing root. Original error: {0}")]
    WalkdirError(#[from] walkdir::Error),

    #[error("Failed to render. Original error: {0}")]
    MinijinjaError(#[from] minijinja::Error),

    #[error("Cannot proceed: processing root '{root_dir}' does not exist.")]
    RootDoesNotExistError { root_dir: String },

    #[error("Unknown output encoding '{name}' in '{source_path}'.")]
    UnknownEncodingError { name: String, source_path: String },

    #[error("Cannot process the source path: '{source_path}'. Original error: {e}")]
    ProcessError { source_path: String, e: String },
}

/// Convenience type alias for Results with this crate's Error type.
///
/// # Type Parameters
/// * `T` - The type of the success value
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Arguments
/// * `err` - The Error to handle
///
/// # Behavior
/// Prints the error message to stderr and exits with a failure status code
pub fn default_error_handler(err: Error) {
    eprintln!("{}", err);
    std::process::exit(exit_codes::FAILURE);
}

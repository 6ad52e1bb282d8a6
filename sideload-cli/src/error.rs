use sideload_core::SideloadError;
use sideload_http::HttpError;
use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

/// Anything that makes a tool exit unsuccessfully
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Sideload(#[from] SideloadError),

    #[error(transparent)]
    Http(#[from] HttpError),
}

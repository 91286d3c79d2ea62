use thiserror::Error;

/// Caller-side misuse of the normalization core.
///
/// Noisy or missing data never produces one of these; only a raw record whose
/// shape breaks the `RawBlock` contract does.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContractError {
    #[error("raw field '{key}' must be a string, a list of strings or null, found {found}")]
    InvalidShape { key: String, found: &'static str },
    #[error("raw record must be a JSON object, found {found}")]
    NotAnObject { found: &'static str },
}

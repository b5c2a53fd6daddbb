use thiserror::Error;

use crate::entity::Namespace;

/// Errors produced while turning raw API records into catalog entities.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    #[error("{namespace} record has no id")]
    MissingId { namespace: Namespace },
}

pub type Result<T> = std::result::Result<T, NormalizeError>;

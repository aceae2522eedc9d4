//! Wire types for the translate endpoint

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateResponse {
    pub translation: String,
    pub original: String,
    pub from_cache: bool,
}

/// Result of one translation, before it is put on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslateOutcome {
    pub original: String,
    pub translation: String,
    pub from_cache: bool,
}

impl From<TranslateOutcome> for TranslateResponse {
    fn from(outcome: TranslateOutcome) -> Self {
        Self {
            translation: outcome.translation,
            original: outcome.original,
            from_cache: outcome.from_cache,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TranslateError {
    #[error("Se requiere el texto a traducir")]
    EmptyInput,
}

use serde::de::DeserializeOwned;

use crate::error::{ContractError, ContractResult, ErrorKind};

/// Deserialize with JSON-path context in error messages.
pub fn from_str_with_path<T: DeserializeOwned>(src: &str) -> ContractResult<T> {
    let de = &mut serde_json::Deserializer::from_str(src);
    serde_path_to_error::deserialize::<_, T>(de).map_err(located)
}

pub fn from_slice_with_path<T: DeserializeOwned>(bytes: &[u8]) -> ContractResult<T> {
    let de = &mut serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize::<_, T>(de).map_err(located)
}

fn located(err: serde_path_to_error::Error<serde_json::Error>) -> ContractError {
    let path = err.path().to_string();
    ContractError::new(ErrorKind::Json(format!("at JSON path {path} → {}", err.into_inner())))
}

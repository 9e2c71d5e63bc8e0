use api_client::error::ApiError;
use storage::StorageError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    Network(ApiError),

    #[error("Data shape error: {0}")]
    DataShape(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ApiError> for FetchError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::DataShape(message) => FetchError::DataShape(message),
            other => FetchError::Network(other),
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("The snapshot contains no records with a 24h change to analyze")]
    EmptyDataset,

    #[error("Not enough data to select the top {required} movers: only {available} records have a 24h change")]
    InsufficientData { required: usize, available: usize },
}

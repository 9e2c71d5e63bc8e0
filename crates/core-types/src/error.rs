use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid market cap rank {rank} for coin '{coin}': ranks must be strictly positive")]
    InvalidRank { coin: String, rank: u32 },

    #[error("Market cap rank {0} appears more than once in the snapshot")]
    DuplicateRank(u32),
}

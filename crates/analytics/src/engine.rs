use crate::error::AnalyticsError;
use chrono::{DateTime, Utc};
use core_types::{AnalysisResult, CoinRecord, Mover, TOP_MOVERS};
use rust_decimal::Decimal;

/// A stateless calculator for deriving summary statistics from a snapshot.
#[derive(Debug, Default)]
pub struct AnalyticsEngine {}

/// A record paired with its 24h change, for the records that have one.
type Valued<'a> = (&'a CoinRecord, Decimal);

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// The main entry point for calculating the summary.
    ///
    /// # Arguments
    ///
    /// * `records` - The coin records of one snapshot, in snapshot order.
    /// * `generated_at` - The wall-clock time to stamp on the result.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `AnalysisResult` or an `AnalyticsError`.
    ///
    /// Records without a 24h change take no part in any statistic. If none are
    /// left the dataset is empty; if fewer than `TOP_MOVERS` are left the top
    /// movers cannot be selected and the whole calculation fails.
    pub fn calculate(
        &self,
        records: &[CoinRecord],
        generated_at: DateTime<Utc>,
    ) -> Result<AnalysisResult, AnalyticsError> {
        let valued: Vec<Valued> = records
            .iter()
            .filter_map(|r| r.price_change_percentage_24h.map(|change| (r, change)))
            .collect();

        if valued.is_empty() {
            return Err(AnalyticsError::EmptyDataset);
        }
        if valued.len() < records.len() {
            tracing::warn!(
                skipped = records.len() - valued.len(),
                "Records without a 24h change were left out of the analysis."
            );
        }

        let (best, worst) = self.extremes(&valued);
        let top_movers = self.top_movers(&valued)?;
        let (coins_up, coins_down) = self.count_directions(&valued);

        Ok(AnalysisResult {
            best,
            worst,
            average_change: self.mean_change(&valued),
            top_movers,
            coins_up,
            coins_down,
            generated_at,
        })
    }

    /// The first record holding the maximum change and the first holding the minimum.
    fn extremes(&self, valued: &[Valued]) -> (Mover, Mover) {
        let (mut best, mut worst) = (valued[0], valued[0]);
        for &(record, change) in &valued[1..] {
            if change > best.1 {
                best = (record, change);
            }
            if change < worst.1 {
                worst = (record, change);
            }
        }
        (to_mover(best), to_mover(worst))
    }

    /// Population mean of the changes.
    fn mean_change(&self, valued: &[Valued]) -> Decimal {
        let sum: Decimal = valued.iter().map(|(_, change)| *change).sum();
        sum / Decimal::from(valued.len())
    }

    /// The `TOP_MOVERS` highest changes, descending. The sort is stable, so equal
    /// changes keep their snapshot order.
    fn top_movers(&self, valued: &[Valued]) -> Result<Vec<Mover>, AnalyticsError> {
        if valued.len() < TOP_MOVERS {
            return Err(AnalyticsError::InsufficientData {
                required: TOP_MOVERS,
                available: valued.len(),
            });
        }

        let mut ranked = valued.to_vec();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        Ok(ranked.into_iter().take(TOP_MOVERS).map(to_mover).collect())
    }

    /// Strictly positive and strictly negative changes. Zero counts as neither.
    fn count_directions(&self, valued: &[Valued]) -> (usize, usize) {
        valued
            .iter()
            .fold((0, 0), |(up, down), (_, change)| match change {
                c if c.is_zero() => (up, down),
                c if c.is_sign_positive() => (up + 1, down),
                _ => (up, down + 1),
            })
    }
}

fn to_mover((record, change): Valued) -> Mover {
    Mover::new(record.display_name(), change)
}

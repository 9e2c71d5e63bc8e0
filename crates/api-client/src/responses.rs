use core_types::CoinRecord;
use rust_decimal::Decimal;
use serde::Deserialize;

/// One item of the `GET /coins/markets` listing.
///
/// Only the fields the pipeline keeps are declared; everything else in the
/// payload (images, ROI, sparkline, ...) is ignored. Every field may be null
/// or absent upstream.
#[derive(Debug, Clone, Deserialize)]
pub struct CoinMarket {
    pub id: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub current_price: Option<Decimal>,
    pub price_change_percentage_24h: Option<Decimal>,
    pub market_cap: Option<Decimal>,
    pub market_cap_rank: Option<u32>,
    pub total_volume: Option<Decimal>,
    pub circulating_supply: Option<Decimal>,
    pub ath: Option<Decimal>,
    pub atl: Option<Decimal>,
    pub last_updated: Option<String>,
}

impl From<CoinMarket> for CoinRecord {
    fn from(market: CoinMarket) -> Self {
        Self {
            id: market.id,
            symbol: market.symbol,
            name: market.name,
            current_price: market.current_price,
            price_change_percentage_24h: market.price_change_percentage_24h,
            market_cap: market.market_cap,
            market_cap_rank: market.market_cap_rank,
            total_volume: market.total_volume,
            circulating_supply: market.circulating_supply,
            ath: market.ath,
            atl: market.atl,
            last_updated: market.last_updated,
        }
    }
}

// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the four indicators the
// accumulation engine reads.  Every calculation returns `Option<T>` so callers
// are forced to handle insufficient-data and numerical-edge-case scenarios;
// presentation sentinels live in `snapshot::IndicatorDisplay` only.

pub mod bollinger;
pub mod rsi;
pub mod sma;
pub mod snapshot;
pub mod volatility;

pub use bollinger::{calculate_bollinger, BollingerResult};
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use snapshot::{IndicatorDisplay, IndicatorSnapshot, MovingAverages};
pub use volatility::calculate_volatility;

pub mod aggregate;
pub mod dates;
pub mod derive;
pub mod tenure;

pub use aggregate::{aggregate, PortfolioSummary};
pub use derive::{derive, derive_at};
pub use tenure::tenure_between;

/// Round to two decimals, half away from zero (display/storage precision).
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

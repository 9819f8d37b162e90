use rust_decimal::Decimal;
use tracing::warn;

use crate::models::{Classification, NormalizedFinancialRecord, YieldAssessment};

/// Yields strictly below this many basis points count as under the benchmark.
pub const UNDER_BENCHMARK_THRESHOLD_BPS: Decimal = Decimal::TEN;

/// Amounts near the edge of `Decimal`'s range clamp instead of overflowing.
fn clamp_toward(sign_negative: bool) -> Decimal {
    if sign_negative {
        Decimal::MIN
    } else {
        Decimal::MAX
    }
}

fn basis_points(income: Decimal, assets: Decimal) -> Decimal {
    income
        .checked_div(assets)
        .and_then(|ratio| ratio.checked_mul(Decimal::from(10_000)))
        .unwrap_or_else(|| {
            warn!(%income, %assets, "basis points out of range, clamping");
            clamp_toward(income.is_sign_negative())
        })
}

pub fn assess(record: &NormalizedFinancialRecord, benchmark_rate: Decimal) -> YieldAssessment {
    let assets = record.cash_and_short_term_assets;
    let income = record.investment_income;

    let (current_basis_points, classification) = if assets <= Decimal::ZERO {
        (Decimal::ZERO, Classification::NoData)
    } else {
        let bps = basis_points(income, assets);
        let class = if bps < UNDER_BENCHMARK_THRESHOLD_BPS {
            Classification::UnderBenchmark
        } else {
            Classification::AtOrAboveBenchmark
        };
        (bps, class)
    };

    let benchmark_implied_income = assets.saturating_mul(benchmark_rate);

    YieldAssessment {
        current_basis_points,
        benchmark_implied_income,
        annual_gap: benchmark_implied_income.saturating_sub(income),
        classification,
    }
}

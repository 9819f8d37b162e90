use colored::Colorize;
use comfy_table::{Cell, Table};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::Result;
use crate::fmt::{bps, money, percent, whole_dollars};
use crate::models::{Benchmark, Classification, Ein, NormalizedFinancialRecord, YieldAssessment};

const WRAP_WIDTH: usize = 78;

#[derive(Serialize)]
pub struct Report<'a> {
    pub ein: Option<&'a Ein>,
    pub record: &'a NormalizedFinancialRecord,
    pub benchmark: &'a Benchmark,
    pub assessment: &'a YieldAssessment,
}

pub fn narrative(assessment: &YieldAssessment, benchmark: &Benchmark) -> String {
    match assessment.classification {
        Classification::NoData => {
            "No cash or short-term investment figures were reported, so no yield can be \
             calculated for this organization."
                .to_string()
        }
        Classification::UnderBenchmark if assessment.annual_gap <= Decimal::ZERO => {
            "This organization is earning below the 10 basis point benchmark, but the \
             benchmark rate would not add income on these assets."
                .to_string()
        }
        Classification::UnderBenchmark => format!(
            "Yield opportunity identified. This organization is earning below the 10 basis \
             point benchmark. Moving these liquid assets to a benchmark rate of {} ({}) \
             could add about +{} of funding a year.",
            percent(benchmark.rate),
            benchmark.origin.describe(),
            whole_dollars(assessment.annual_gap),
        ),
        Classification::AtOrAboveBenchmark => {
            "This organization is maintaining a healthy yield at or above the 10 basis point \
             benchmark. Consistent stewardship is in place for these liquid assets."
                .to_string()
        }
    }
}

pub fn print_report(report: &Report<'_>) {
    let record = report.record;
    let assessment = report.assessment;
    let under = assessment.classification == Classification::UnderBenchmark;

    let yield_cell = if under {
        Cell::new(bps(assessment.current_basis_points).blue().bold())
    } else {
        Cell::new(bps(assessment.current_basis_points))
    };
    let gap_cell = if under {
        Cell::new(money(assessment.annual_gap).green().bold())
    } else {
        Cell::new(money(assessment.annual_gap))
    };

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Organization"), Cell::new(&record.organization_name)]);
    if let Some(ein) = report.ein {
        table.add_row(vec![Cell::new("EIN"), Cell::new(ein)]);
    }
    table.add_row(vec![
        Cell::new("Form"),
        Cell::new(format!("{} (tax year {})", record.variant, record.tax_year)),
    ]);
    table.add_row(vec![
        Cell::new("Cash & short-term investments"),
        Cell::new(money(record.cash_and_short_term_assets)),
    ]);
    table.add_row(vec![
        Cell::new("Investment income"),
        Cell::new(money(record.investment_income)),
    ]);
    table.add_row(vec![Cell::new("Current yield"), yield_cell]);
    table.add_row(vec![
        Cell::new("Benchmark rate"),
        Cell::new(format!(
            "{} ({})",
            percent(report.benchmark.rate),
            report.benchmark.origin.describe()
        )),
    ]);
    table.add_row(vec![
        Cell::new("Benchmark-implied income"),
        Cell::new(money(assessment.benchmark_implied_income)),
    ]);
    table.add_row(vec![Cell::new("Annual gap".bold()), gap_cell]);

    println!("Yield Assessment\n{table}");
    println!();
    println!("{}", "Stewardship Analysis".bold());
    println!(
        "{}",
        textwrap::fill(&narrative(assessment, report.benchmark), WRAP_WIDTH)
    );
}

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::models::BenchmarkOrigin;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn assessment(classification: Classification, gap: &str) -> YieldAssessment {
        YieldAssessment {
            current_basis_points: dec("3.33"),
            benchmark_implied_income: dec("6000"),
            annual_gap: dec(gap),
            classification,
        }
    }

    fn treasury(rate: &str) -> Benchmark {
        Benchmark {
            rate: dec(rate),
            origin: BenchmarkOrigin::Treasury,
        }
    }

    #[test]
    fn test_under_benchmark_narrative_shows_floored_gap() {
        let text = narrative(&assessment(Classification::UnderBenchmark, "5950.75"), &treasury("0.04"));
        assert!(text.contains("+$5,950"));
        assert!(text.contains("4.00%"));
        assert!(text.contains("4-week Treasury bill yield"));
    }

    #[test]
    fn test_under_benchmark_with_zero_rate_claims_no_impact() {
        let text = narrative(&assessment(Classification::UnderBenchmark, "-5"), &treasury("0"));
        assert!(text.contains("would not add income"));
        assert!(!text.contains('+'));
    }

    #[test]
    fn test_no_data_narrative() {
        let text = narrative(&assessment(Classification::NoData, "0"), &treasury("0.04"));
        assert!(text.contains("no yield can be"));
    }

    #[test]
    fn test_healthy_narrative() {
        let text = narrative(&assessment(Classification::AtOrAboveBenchmark, "-10"), &treasury("0.04"));
        assert!(text.contains("healthy yield"));
        assert!(!text.contains('$'));
    }
}

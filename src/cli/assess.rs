use crate::cli::render::{print_json, print_report, Report};
use crate::error::Result;
use crate::models::Ein;
use crate::pipeline;
use crate::settings::{load_settings, parse_rate};
use crate::sources::{ProPublicaClient, TreasuryClient};

pub async fn run(ein: &str, rate: Option<&str>, json: bool) -> Result<()> {
    let ein = Ein::parse(ein)?;
    let rate_override = rate.map(parse_rate).transpose()?;
    let settings = load_settings();

    let filings = ProPublicaClient::new(&settings)?;
    let benchmarks = TreasuryClient::new(&settings)?;
    let eval = pipeline::evaluate(
        &filings,
        &benchmarks,
        &ein,
        settings.fallback_rate,
        rate_override,
    )
    .await?;

    let report = Report {
        ein: Some(&eval.ein),
        record: &eval.record,
        benchmark: &eval.benchmark,
        assessment: &eval.assessment,
    };
    if json {
        print_json(&report)
    } else {
        print_report(&report);
        Ok(())
    }
}

use crate::error::Result;
use crate::fmt::percent;
use crate::pipeline::resolve_benchmark;
use crate::settings::load_settings;
use crate::sources::TreasuryClient;

pub async fn run() -> Result<()> {
    let settings = load_settings();
    let source = TreasuryClient::new(&settings)?;
    let benchmark = resolve_benchmark(&source, settings.fallback_rate, None).await;
    println!(
        "Benchmark rate: {} ({})",
        percent(benchmark.rate),
        benchmark.origin.describe()
    );
    Ok(())
}

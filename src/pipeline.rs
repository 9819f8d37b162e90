use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::calculator;
use crate::error::ExtractionFailure;
use crate::extractor;
use crate::models::{Benchmark, BenchmarkOrigin, Ein, NormalizedFinancialRecord, YieldAssessment};
use crate::sources::{BenchmarkSource, FilingSource};

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub ein: Ein,
    pub record: NormalizedFinancialRecord,
    pub benchmark: Benchmark,
    pub assessment: YieldAssessment,
}

/// Profile page, then the filing it links to, then extraction.
pub async fn retrieve_record(
    source: &dyn FilingSource,
    ein: &Ein,
) -> Result<NormalizedFinancialRecord, ExtractionFailure> {
    let profile = source.fetch_profile(ein).await?;
    let object_id = extractor::discover_filing_link(&profile)?;
    info!(ein = %ein, object_id = %object_id, "found digital filing");
    let filing = source.fetch_filing(&object_id).await?;
    extractor::extract(&profile, &filing)
}

pub async fn resolve_benchmark(
    source: &dyn BenchmarkSource,
    fallback_rate: Decimal,
    rate_override: Option<Decimal>,
) -> Benchmark {
    if let Some(rate) = rate_override {
        return Benchmark {
            rate,
            origin: BenchmarkOrigin::Override,
        };
    }
    match source.current_rate().await {
        Some(rate) => Benchmark {
            rate,
            origin: BenchmarkOrigin::Treasury,
        },
        None => {
            warn!(%fallback_rate, "using fallback benchmark rate");
            Benchmark {
                rate: fallback_rate,
                origin: BenchmarkOrigin::Fallback,
            }
        }
    }
}

/// The filing chain and the benchmark lookup are independent and run together.
pub async fn evaluate(
    filings: &dyn FilingSource,
    benchmarks: &dyn BenchmarkSource,
    ein: &Ein,
    fallback_rate: Decimal,
    rate_override: Option<Decimal>,
) -> Result<Evaluation, ExtractionFailure> {
    let (record, benchmark) = tokio::join!(
        retrieve_record(filings, ein),
        resolve_benchmark(benchmarks, fallback_rate, rate_override),
    );
    let record = record?;
    let assessment = calculator::assess(&record, benchmark.rate);
    Ok(Evaluation {
        ein: ein.clone(),
        record,
        benchmark,
        assessment,
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::models::{Classification, FilingVariant};

    const PROFILE: &str = r#"<a href="/nonprofits/download-xml?object_id=777">Download XML</a>"#;

    const FILING: &str = r#"<Return xmlns="http://www.irs.gov/efile">
        <ReturnHeader><TaxYr>2023</TaxYr><Filer><BusinessName>
        <BusinessNameLine1Txt>EXAMPLE FOOD SHELF</BusinessNameLine1Txt>
        </BusinessName></Filer></ReturnHeader>
        <ReturnData><IRS990>
        <CYInvestmentIncomeAmt>50</CYInvestmentIncomeAmt>
        <SavingsAndTempCashInvstGrp><EOYAmt>120000</EOYAmt></SavingsAndTempCashInvstGrp>
        <CashNonInterestBearingGrp><EOYAmt>30000</EOYAmt></CashNonInterestBearingGrp>
        </IRS990></ReturnData></Return>"#;

    struct FakeFilings {
        profile: Result<String, ExtractionFailure>,
        filing: Result<String, ExtractionFailure>,
        filing_calls: AtomicUsize,
    }

    impl FakeFilings {
        fn ok(profile: &str, filing: &str) -> Self {
            Self {
                profile: Ok(profile.to_string()),
                filing: Ok(filing.to_string()),
                filing_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl FilingSource for FakeFilings {
        async fn fetch_profile(&self, _ein: &Ein) -> Result<String, ExtractionFailure> {
            self.profile.clone()
        }

        async fn fetch_filing(&self, object_id: &str) -> Result<String, ExtractionFailure> {
            assert_eq!(object_id, "777");
            self.filing_calls.fetch_add(1, Ordering::SeqCst);
            self.filing.clone()
        }
    }

    struct FixedRate(Option<Decimal>);

    #[async_trait]
    impl BenchmarkSource for FixedRate {
        async fn current_rate(&self) -> Option<Decimal> {
            self.0
        }
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn ein() -> Ein {
        Ein::parse("123456789").unwrap()
    }

    #[tokio::test]
    async fn test_evaluate_end_to_end() {
        let filings = FakeFilings::ok(PROFILE, FILING);
        let rates = FixedRate(Some(dec("0.04")));
        let eval = evaluate(&filings, &rates, &ein(), dec("0.035"), None).await.unwrap();
        assert_eq!(eval.record.organization_name, "EXAMPLE FOOD SHELF");
        assert_eq!(eval.record.variant, FilingVariant::StandardForm);
        assert_eq!(eval.benchmark.origin, BenchmarkOrigin::Treasury);
        assert_eq!(eval.assessment.annual_gap, dec("5950"));
        assert_eq!(eval.assessment.classification, Classification::UnderBenchmark);
    }

    #[tokio::test]
    async fn test_fallback_rate_when_source_fails() {
        let b = resolve_benchmark(&FixedRate(None), dec("0.035"), None).await;
        assert_eq!(b.rate, dec("0.035"));
        assert_eq!(b.origin, BenchmarkOrigin::Fallback);
    }

    #[tokio::test]
    async fn test_override_wins() {
        let b = resolve_benchmark(&FixedRate(Some(dec("0.05"))), dec("0.035"), Some(dec("0.01"))).await;
        assert_eq!(b.rate, dec("0.01"));
        assert_eq!(b.origin, BenchmarkOrigin::Override);
    }

    #[tokio::test]
    async fn test_missing_link_stops_before_download() {
        let filings = FakeFilings::ok("<html>no e-file</html>", FILING);
        let err = retrieve_record(&filings, &ein()).await.unwrap_err();
        assert!(matches!(err, ExtractionFailure::NoDigitalFiling(_)));
        assert_eq!(filings.filing_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_profile_failure_propagates() {
        let filings = FakeFilings {
            profile: Err(ExtractionFailure::ProfileUnavailable("HTTP 404".to_string())),
            ..FakeFilings::ok(PROFILE, FILING)
        };
        let rates = FixedRate(Some(dec("0.04")));
        let err = evaluate(&filings, &rates, &ein(), dec("0.035"), None).await.unwrap_err();
        assert!(matches!(err, ExtractionFailure::ProfileUnavailable(_)));
    }

    #[tokio::test]
    async fn test_download_failure_propagates() {
        let filings = FakeFilings {
            filing: Err(ExtractionFailure::FilingDownloadFailed("timeout".to_string())),
            ..FakeFilings::ok(PROFILE, FILING)
        };
        let err = retrieve_record(&filings, &ein()).await.unwrap_err();
        assert!(matches!(err, ExtractionFailure::FilingDownloadFailed(_)));
    }
}

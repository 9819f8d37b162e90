use std::path::Path;

use crate::calculator;
use crate::cli::render::{print_json, print_report, Report};
use crate::error::Result;
use crate::extractor;
use crate::models::{Benchmark, BenchmarkOrigin};
use crate::settings::{load_settings, parse_rate};

pub fn run(file: &str, profile: Option<&str>, rate: Option<&str>, json: bool) -> Result<()> {
    let filing = std::fs::read_to_string(Path::new(file))?;
    let record = match profile {
        Some(profile_path) => {
            let profile_html = std::fs::read_to_string(Path::new(profile_path))?;
            extractor::extract(&profile_html, &filing)?
        }
        None => extractor::extract_filing(&filing),
    };

    let benchmark = match rate {
        Some(raw) => Benchmark {
            rate: parse_rate(raw)?,
            origin: BenchmarkOrigin::Override,
        },
        None => Benchmark {
            rate: load_settings().fallback_rate,
            origin: BenchmarkOrigin::Fallback,
        },
    };
    let assessment = calculator::assess(&record, benchmark.rate);

    let report = Report {
        ein: None,
        record: &record,
        benchmark: &benchmark,
        assessment: &assessment,
    };
    if json {
        print_json(&report)
    } else {
        print_report(&report);
        Ok(())
    }
}

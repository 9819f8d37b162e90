use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, YieldGapError};

pub const NAME_NOT_FOUND: &str = "Organization Name Not Found";
pub const TAX_YEAR_NOT_AVAILABLE: &str = "N/A";

/// Which e-file return schema a filing document follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilingVariant {
    StandardForm,
    ShortForm,
    PrivateFoundationForm,
}

impl FilingVariant {
    /// The IRS form number as it is usually printed.
    pub fn form_label(&self) -> &'static str {
        match self {
            Self::StandardForm => "990",
            Self::ShortForm => "990EZ",
            Self::PrivateFoundationForm => "990-PF",
        }
    }
}

impl fmt::Display for FilingVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.form_label())
    }
}

/// Output of extraction. Always fully populated: missing amounts are zero,
/// missing identity fields carry their sentinel values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedFinancialRecord {
    pub organization_name: String,
    pub cash_and_short_term_assets: Decimal,
    pub investment_income: Decimal,
    pub variant: FilingVariant,
    pub tax_year: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    NoData,
    UnderBenchmark,
    AtOrAboveBenchmark,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldAssessment {
    pub current_basis_points: Decimal,
    pub benchmark_implied_income: Decimal,
    pub annual_gap: Decimal,
    pub classification: Classification,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenchmarkOrigin {
    Treasury,
    Fallback,
    Override,
}

impl BenchmarkOrigin {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Treasury => "4-week Treasury bill yield",
            Self::Fallback => "fallback rate",
            Self::Override => "rate given on the command line",
        }
    }
}

/// Annual benchmark rate as a fraction (0.035 for 3.5%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Benchmark {
    pub rate: Decimal,
    pub origin: BenchmarkOrigin,
}

/// Employer Identification Number, stored as nine digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ein(String);

impl Ein {
    pub fn parse(raw: &str) -> Result<Self> {
        let digits: String = raw
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect();
        if digits.len() != 9 || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(YieldGapError::InvalidEin(raw.to_string()));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Ein {
    type Error = YieldGapError;

    fn try_from(raw: String) -> Result<Self> {
        Self::parse(&raw)
    }
}

impl From<Ein> for String {
    fn from(ein: Ein) -> Self {
        ein.0
    }
}

impl fmt::Display for Ein {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", &self.0[..2], &self.0[2..])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizationHit {
    pub ein: String,
    pub name: String,
    pub city: Option<String>,
    pub state: Option<String>,
}

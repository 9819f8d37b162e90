use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use roxmltree::{Document, Node};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::ExtractionFailure;
use crate::models::{FilingVariant, NormalizedFinancialRecord, NAME_NOT_FOUND, TAX_YEAR_NOT_AVAILABLE};

const PRIVATE_FOUNDATION_MARKER: &str = "IRS990PF";
const SHORT_FORM_MARKER: &str = "IRS990EZ";

/// Checked in order; the first marker present wins.
const VARIANT_MARKERS: &[(&str, FilingVariant)] = &[
    (PRIVATE_FOUNDATION_MARKER, FilingVariant::PrivateFoundationForm),
    (SHORT_FORM_MARKER, FilingVariant::ShortForm),
];

const FILING_LINK_PATTERN: &str = r"/nonprofits/download-xml\?object_id=(\d+)";

static FILING_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FILING_LINK_PATTERN).expect("filing link pattern is valid"));

// ---------------------------------------------------------------------------
// Classification and link discovery
// ---------------------------------------------------------------------------

pub fn classify(document: &str) -> FilingVariant {
    VARIANT_MARKERS
        .iter()
        .find(|(marker, _)| document.contains(*marker))
        .map(|(_, variant)| *variant)
        .unwrap_or(FilingVariant::StandardForm)
}

/// Object id of the first (most recent) e-filed XML linked from a profile page.
pub fn discover_filing_link(profile_html: &str) -> Result<String, ExtractionFailure> {
    FILING_LINK
        .captures(profile_html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| {
            ExtractionFailure::NoDigitalFiling(
                "the profile page links no machine-readable filing".to_string(),
            )
        })
}

// ---------------------------------------------------------------------------
// Filing tree
// ---------------------------------------------------------------------------

struct FilingTree<'input> {
    doc: Option<Document<'input>>,
}

impl<'input> FilingTree<'input> {
    fn parse(xml: &'input str) -> Self {
        match Document::parse(xml) {
            Ok(doc) => Self { doc: Some(doc) },
            Err(e) => {
                warn!(error = %e, "filing is not well-formed XML, extracting defaults");
                Self { doc: None }
            }
        }
    }

    fn root(&self) -> Option<Node<'_, 'input>> {
        self.doc.as_ref().map(|d| d.root_element())
    }

    /// Financial fields live under ReturnData; falls back to the whole document.
    fn return_data(&self) -> Option<Node<'_, 'input>> {
        let root = self.root()?;
        find_element(root, "ReturnData").or(Some(root))
    }

    fn filer(&self) -> Option<Node<'_, 'input>> {
        let root = self.root()?;
        find_element(root, "ReturnHeader")
            .and_then(|header| find_element(header, "Filer"))
            .or_else(|| find_element(root, "Filer"))
    }

    fn amount(&self, field: &str) -> Option<Decimal> {
        let node = find_element(self.return_data()?, field)?;
        parse_amount(field, &element_text(node))
    }

    /// `field` inside the first `group` element, e.g. SavingsAndTempCashInvstGrp/EOYAmt.
    fn group_amount(&self, group: &str, field: &str) -> Option<Decimal> {
        let group_node = find_element(self.return_data()?, group)?;
        let node = find_element(group_node, field)?;
        parse_amount(field, &element_text(node))
    }

    /// First `TaxYr` holding exactly four digits; malformed ones are skipped.
    fn tax_year(&self) -> Option<String> {
        self.root()?
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "TaxYr")
            .find_map(|n| {
                let text = element_text(n);
                let year = text.trim();
                (year.len() == 4 && year.chars().all(|c| c.is_ascii_digit()))
                    .then(|| year.to_string())
            })
    }

    fn name_fragments(&self) -> Vec<String> {
        let Some(filer) = self.filer() else {
            return Vec::new();
        };
        filer
            .descendants()
            .filter(|n| n.is_element() && is_name_line(n.tag_name().name()))
            .map(element_text)
            .collect()
    }
}

fn find_element<'a, 'input>(scope: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    scope
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// Concatenated text of an element, entities and CDATA already decoded.
fn element_text(node: Node<'_, '_>) -> String {
    node.descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect()
}

fn parse_amount(field: &str, raw: &str) -> Option<Decimal> {
    match Decimal::from_str(raw.trim()) {
        Ok(v) => Some(v),
        Err(_) => {
            debug!(field, raw, "unparseable amount treated as absent");
            None
        }
    }
}

/// BusinessNameLine1Txt, BusinessNameLine2Txt, or the older BusinessNameLine1.
fn is_name_line(tag: &str) -> bool {
    let Some(rest) = tag.strip_prefix("BusinessNameLine") else {
        return false;
    };
    let mut chars = rest.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_digit()) && matches!(chars.as_str(), "" | "Txt")
}

fn reconcile_name(fragments: &[String]) -> String {
    let joined = fragments.join(" ");
    let collapsed = joined.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        NAME_NOT_FOUND.to_string()
    } else {
        collapsed
    }
}

// ---------------------------------------------------------------------------
// Per-variant fields
// ---------------------------------------------------------------------------

fn or_zero(value: Option<Decimal>, field: &str) -> Decimal {
    value.unwrap_or_else(|| {
        debug!(field, "field absent, defaulting to zero");
        Decimal::ZERO
    })
}

/// (investment income, cash and short-term assets)
fn financial_fields(tree: &FilingTree<'_>, variant: FilingVariant) -> (Decimal, Decimal) {
    match variant {
        FilingVariant::StandardForm => {
            let income = or_zero(tree.amount("CYInvestmentIncomeAmt"), "CYInvestmentIncomeAmt");
            let savings = or_zero(
                tree.group_amount("SavingsAndTempCashInvstGrp", "EOYAmt"),
                "SavingsAndTempCashInvstGrp/EOYAmt",
            );
            let non_interest = or_zero(
                tree.group_amount("CashNonInterestBearingGrp", "EOYAmt"),
                "CashNonInterestBearingGrp/EOYAmt",
            );
            (income, savings.saturating_add(non_interest))
        }
        FilingVariant::ShortForm => {
            let income = or_zero(tree.amount("InvestmentIncomeAmt"), "InvestmentIncomeAmt");
            let cash = or_zero(
                tree.group_amount("CashSavingsAndInvestmentsGrp", "EOYAmt"),
                "CashSavingsAndInvestmentsGrp/EOYAmt",
            );
            (income, cash)
        }
        FilingVariant::PrivateFoundationForm => {
            let income = or_zero(
                tree.amount("InterestOnSavNetInvstIncmAmt"),
                "InterestOnSavNetInvstIncmAmt",
            );
            // Beginning-of-year cash stands in when the year-end figure is missing.
            let cash = or_zero(
                tree.amount("CashEOYAmt").or_else(|| tree.amount("CashBOYAmt")),
                "CashEOYAmt",
            );
            let savings = or_zero(
                tree.amount("SavAndTempCashInvstEOYAmt"),
                "SavAndTempCashInvstEOYAmt",
            );
            (income, cash.saturating_add(savings))
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Best-effort record from a filing document alone. Never fails.
pub fn extract_filing(filing_document: &str) -> NormalizedFinancialRecord {
    let variant = classify(filing_document);
    let tree = FilingTree::parse(filing_document);

    let organization_name = reconcile_name(&tree.name_fragments());
    let (investment_income, cash_and_short_term_assets) = financial_fields(&tree, variant);
    let tax_year = tree
        .tax_year()
        .unwrap_or_else(|| TAX_YEAR_NOT_AVAILABLE.to_string());

    debug!(
        variant = %variant,
        name = %organization_name,
        tax_year = %tax_year,
        "extracted filing"
    );

    NormalizedFinancialRecord {
        organization_name,
        cash_and_short_term_assets,
        investment_income,
        variant,
        tax_year,
    }
}

/// Extraction from a profile page and the filing it links to. The profile
/// must link a digital filing even when the document is already in hand.
pub fn extract(
    profile_html: &str,
    filing_document: &str,
) -> Result<NormalizedFinancialRecord, ExtractionFailure> {
    discover_filing_link(profile_html)?;
    Ok(extract_filing(filing_document))
}

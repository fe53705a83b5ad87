//! What the results area shows. The page turns a [`ResultView`] into
//! elements; everything that decides *what* to show lives here.

use crate::error::GseaError;
use crate::summary::{AnalysisResult, TermSummary, format_exponential, format_fixed};
use serde_json::Value;

pub const PENDING_TEXT: &str = "Calculating...";
pub const RESULTS_HEADING: &str = "Results:";
pub const ERROR_HEADING: &str = "Error:";
pub const TABLE_HEADER: [&str; 5] = ["Term", "ES", "NES", "P-value", "FDR"];

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub term: String,
    pub es: String,
    pub nes: String,
    pub pval: String,
    pub fdr: String,
}

impl SummaryRow {
    pub fn cells(&self) -> [&str; 5] {
        [
            self.term.as_str(),
            self.es.as_str(),
            self.nes.as_str(),
            self.pval.as_str(),
            self.fdr.as_str(),
        ]
    }
}

impl From<&TermSummary> for SummaryRow {
    fn from(summary: &TermSummary) -> Self {
        Self {
            term: summary.term.clone(),
            es: format_fixed(summary.es, 4),
            nes: format_fixed(summary.nes, 4),
            pval: format_exponential(summary.pval, 2),
            fdr: format_exponential(summary.fdr, 2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultView {
    #[default]
    Empty,
    Pending,
    Table(Vec<SummaryRow>),
    Failure(String),
}

impl ResultView {
    /// Rows keep the module's order; nothing is re-sorted.
    pub fn table(result: &AnalysisResult) -> Self {
        ResultView::Table(result.summaries.iter().map(SummaryRow::from).collect())
    }

    pub fn failure(error: &GseaError) -> Self {
        ResultView::Failure(error.to_string())
    }

    /// Presents a `success` payload; malformed payloads become failures.
    pub fn from_payload(payload: &Value) -> Self {
        match AnalysisResult::from_payload(payload) {
            Ok(result) => Self::table(&result),
            Err(error) => Self::failure(&error),
        }
    }

    pub fn heading(&self) -> Option<&'static str> {
        match self {
            ResultView::Table(_) => Some(RESULTS_HEADING),
            ResultView::Failure(_) => Some(ERROR_HEADING),
            ResultView::Empty | ResultView::Pending => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ResultView::Failure(_))
    }
}

pub mod cases;
pub mod status_date;

use scraper::Html;
use thiserror::Error;

use crate::db::Observation;

/// Canton code recorded in the abbreviation_canton_and_fl column.
pub const REGION: &str = "BE";

/// Provenance URL recorded with every scraped row.
pub const SOURCE_URL: &str =
    "https://www.besondere-lage.sites.be.ch/besondere-lage_sites/de/index/corona/index.html";

/// Everything that can go wrong between raw HTML and an Observation. All of
/// these mean the page no longer looks the way we assume and need a human
/// to look at the markup; none of them are retryable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("no heading matching the case-figures pattern")]
    HeadingNotFound,
    #[error("{0} headings match the case-figures pattern, expected exactly one")]
    AmbiguousHeading(usize),
    #[error("no table follows the case-figures heading")]
    TableNotFound,
    #[error("table shape changed: {headers} header cells and {cells} value cells, expected 2 of each")]
    SchemaChanged { headers: usize, cells: usize },
    #[error("unknown table header {0:?}")]
    UnknownField(String),
    #[error("cell {value:?} under {label:?} is not a non-negative integer")]
    BadCellValue { value: String, label: String },
    #[error("no \"Stand: ...\" status line found on the page")]
    StatusLineNotFound,
    #[error("could not parse status date {0:?}")]
    BadStatusDate(String),
}

/// Raw page HTML in, one Observation out. Every assumption about the page
/// layout is funneled through here so the storage and dispatch code never
/// touch the markup.
pub fn extract_observation(html: &str) -> Result<Observation, ExtractError> {
    let doc = Html::parse_document(html);

    let figures = cases::extract(&doc)?;
    let date = status_date::extract(&doc)?;

    let mut obs = Observation::new(date, REGION, SOURCE_URL);
    obs.confirmed = figures.confirmed;
    obs.deceased = figures.deceased;
    Ok(obs)
}

// ── Tests ──

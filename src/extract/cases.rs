use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::ExtractError;

// The heading wording has drifted before ("Corona-Erkrankungen",
// "Coronaerkrankungen"), so match loosely on the pieces that stay put.
static HEADING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Corona.*[Ee]rkrankungen.*Kanton.*Bern").unwrap());

static HEADING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1, h2, h3").unwrap());
static TABLE_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table").unwrap());
static TH_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static TD_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());

/// Header labels the canton currently publishes, mapped to their meaning.
/// A label not listed here is a page change we refuse to guess about.
const LABELS: &[(&str, Field)] = &[("Fälle", Field::Confirmed), ("Todesfälle", Field::Deceased)];

#[derive(Clone, Copy)]
enum Field {
    Confirmed,
    Deceased,
}

#[derive(Debug, Default)]
pub struct CaseFigures {
    pub confirmed: Option<i64>,
    pub deceased: Option<i64>,
}

/// Locate the case-figures heading, walk into its enclosing container and
/// read the two-column table next to it.
pub fn extract(doc: &Html) -> Result<CaseFigures, ExtractError> {
    let headings: Vec<ElementRef> = doc
        .select(&HEADING_SEL)
        .filter(|h| HEADING_RE.is_match(&element_text(h)))
        .collect();
    let heading = match headings.as_slice() {
        [] => return Err(ExtractError::HeadingNotFound),
        [one] => *one,
        many => return Err(ExtractError::AmbiguousHeading(many.len())),
    };

    let container = heading
        .parent()
        .and_then(ElementRef::wrap)
        .ok_or(ExtractError::TableNotFound)?;
    let table = container
        .select(&TABLE_SEL)
        .next()
        .ok_or(ExtractError::TableNotFound)?;

    let headers: Vec<String> = table.select(&TH_SEL).map(|e| element_text(&e)).collect();
    let cells: Vec<String> = table.select(&TD_SEL).map(|e| element_text(&e)).collect();
    if headers.len() != 2 || cells.len() != 2 {
        return Err(ExtractError::SchemaChanged {
            headers: headers.len(),
            cells: cells.len(),
        });
    }

    let mut figures = CaseFigures::default();
    for (label, raw) in headers.iter().zip(&cells) {
        let field = LABELS
            .iter()
            .find(|(l, _)| *l == label.as_str())
            .map(|(_, f)| *f)
            .ok_or_else(|| ExtractError::UnknownField(label.clone()))?;
        let value = parse_count(raw).ok_or_else(|| ExtractError::BadCellValue {
            value: raw.clone(),
            label: label.clone(),
        })?;
        match field {
            Field::Confirmed => figures.confirmed = Some(value),
            Field::Deceased => figures.deceased = Some(value),
        }
    }
    Ok(figures)
}

fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// "1’234" and "1'234" both show up in Swiss figures.
fn parse_count(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '\u{2019}' && *c != '\'')
        .collect();
    cleaned.trim().parse::<i64>().ok().filter(|v| *v >= 0)
}

// ── Tests ──

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use scraper::Html;

use super::ExtractError;

static STAND_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"Stand:\s*([^)]+)\)").unwrap());
static NUMERIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\.(\d{1,2})\.(\d{4})").unwrap());
static SPELLED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d{1,2})\.?\s+([A-Za-zäöüÄÖÜ]{3,})\s+(\d{4})").unwrap());

const MONTHS: &[&str] = &[
    "januar", "februar", "märz", "april", "mai", "juni", "juli", "august", "september", "oktober",
    "november", "dezember",
];

/// Find the "(Stand: ...)" line anywhere in the document and return the
/// calendar date it encodes. The published time-of-day ("08:00 Uhr") is
/// dropped; the store keys on an empty time field.
pub fn extract(doc: &Html) -> Result<NaiveDate, ExtractError> {
    let node = doc
        .root_element()
        .text()
        .find(|t| t.contains("Stand:"))
        .ok_or(ExtractError::StatusLineNotFound)?;
    let caps = STAND_RE
        .captures(node)
        .ok_or(ExtractError::StatusLineNotFound)?;
    let raw = caps[1].trim();
    parse_german_date(raw).ok_or_else(|| ExtractError::BadStatusDate(raw.to_string()))
}

/// Both forms the canton has used: "18.03.2020" and "18. März 2020".
pub fn parse_german_date(text: &str) -> Option<NaiveDate> {
    if let Some(c) = NUMERIC_RE.captures(text) {
        return NaiveDate::from_ymd_opt(c[3].parse().ok()?, c[2].parse().ok()?, c[1].parse().ok()?);
    }
    if let Some(c) = SPELLED_RE.captures(text) {
        let month = german_month(&c[2])?;
        return NaiveDate::from_ymd_opt(c[3].parse().ok()?, month, c[1].parse().ok()?);
    }
    None
}

fn german_month(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    // "Maerz" shows up where the encoding mangled the umlaut.
    if lower.starts_with("maerz") || lower.starts_with("marz") {
        return Some(3);
    }
    MONTHS
        .iter()
        .position(|m| m.starts_with(&lower) || lower.starts_with(m))
        .map(|i| i as u32 + 1)
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn numeric_with_time_suffix() {
        assert_eq!(
            parse_german_date("18.03.2020, 08:00 Uhr"),
            Some(date(2020, 3, 18))
        );
    }

    #[test]
    fn spelled_out_month() {
        assert_eq!(parse_german_date("18. März 2020"), Some(date(2020, 3, 18)));
        assert_eq!(parse_german_date("1. Dezember 2020"), Some(date(2020, 12, 1)));
    }

    #[test]
    fn mangled_umlaut_month() {
        assert_eq!(parse_german_date("18. Maerz 2020"), Some(date(2020, 3, 18)));
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(parse_german_date("morgen"), None);
        assert_eq!(parse_german_date("99.99.2020"), None);
        assert_eq!(parse_german_date(""), None);
    }

    #[test]
    fn status_line_in_document() {
        let doc = Html::parse_document(
            "<body><p>Zahlen (Stand: 18.03.2020, 08:00 Uhr)</p></body>",
        );
        assert_eq!(extract(&doc).unwrap(), date(2020, 3, 18));
    }

    #[test]
    fn missing_status_line() {
        let doc = Html::parse_document("<body><p>keine Angabe</p></body>");
        assert_eq!(extract(&doc).unwrap_err(), ExtractError::StatusLineNotFound);
    }

    #[test]
    fn unparseable_status_date() {
        let doc = Html::parse_document("<body><p>(Stand: demnächst)</p></body>");
        assert_eq!(
            extract(&doc).unwrap_err(),
            ExtractError::BadStatusDate("demnächst".to_string())
        );
    }
}

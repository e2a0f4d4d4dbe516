//! Partial calendar-date ("timex") handling.
//!
//! Date slots hold timex-style text that may omit the day, the month or the
//! year (`2024-03-05`, `2024-03`, `XXXX-03-05`). This module decides whether
//! such an expression is fully specified, reports which components are
//! missing, and renders the targeted retry message used by the date prompts.

use serde::{Deserialize, Serialize};

/// Format reminder sent alongside every date-prompt rejection.
pub const FORMAT_HINT: &str = "You can use the format YYYY-MM-DD";

/// Components of a calendar date, in the stable reporting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateComponent {
    Day,
    Month,
    Year,
}

impl DateComponent {
    pub fn label(self) -> &'static str {
        match self {
            DateComponent::Day => "the day",
            DateComponent::Month => "the month",
            DateComponent::Year => "the year",
        }
    }
}

/// A possibly partial calendar date recognized from user text or from a
/// recognizer's timex string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DateExpression {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub day: Option<u32>,
}

impl DateExpression {
    /// Recognize ISO-style expressions (`2024-03-05`, `2024-03`, `2024`,
    /// `XXXX-03-05`, a trailing `T…` time part is dropped), slash-separated
    /// equivalents, and written forms (`March`, `March 2024`, `5 March 2024`,
    /// `March 5, 2024`). Returns `None` when nothing date-like is found.
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        parse_iso(trimmed).or_else(|| parse_written(trimmed))
    }

    /// Fully specified: day, month and year all present.
    pub fn is_definite(&self) -> bool {
        self.year.is_some() && self.month.is_some() && self.day.is_some()
    }

    /// Missing components in the stable order day, month, year.
    pub fn missing(&self) -> Vec<DateComponent> {
        let mut missing = Vec::new();
        if self.day.is_none() {
            missing.push(DateComponent::Day);
        }
        if self.month.is_none() {
            missing.push(DateComponent::Month);
        }
        if self.year.is_none() {
            missing.push(DateComponent::Year);
        }
        missing
    }

    /// Normalized partial-date rendering with an `XXXX` year placeholder.
    pub fn timex(&self) -> String {
        let year = match self.year {
            Some(year) => format!("{year:04}"),
            None => "XXXX".to_owned(),
        };
        match (self.month, self.day) {
            (Some(month), Some(day)) => format!("{year}-{month:02}-{day:02}"),
            (Some(month), None) => format!("{year}-{month:02}"),
            _ => year,
        }
    }
}

/// Slot-readiness check: a date slot is resolved only when its stored
/// expression parses as fully specified.
pub fn is_ambiguous(timex: &str) -> bool {
    DateExpression::parse(timex).map_or(true, |expression| !expression.is_definite())
}

/// Targeted retry text, e.g. "Please be more precise. I miss the day and
/// the year."
pub fn imprecision_message(missing: &[DateComponent]) -> String {
    let labels: Vec<&str> = missing.iter().map(|component| component.label()).collect();
    let list = match labels.as_slice() {
        [] => return "Please be more precise.".to_owned(),
        [only] => (*only).to_owned(),
        [head @ .., last] => format!("{} and {}", head.join(", "), last),
    };
    format!("Please be more precise. I miss {list}.")
}

fn parse_iso(text: &str) -> Option<DateExpression> {
    let date_part = text.split('T').next().unwrap_or(text).trim();
    if date_part.is_empty() {
        return None;
    }

    if !date_part.contains('-') && !date_part.contains('/') {
        if date_part.len() == 4 && date_part.chars().all(|c| c.is_ascii_digit()) {
            return Some(DateExpression { year: date_part.parse().ok(), month: None, day: None });
        }
        return None;
    }

    let segments: Vec<&str> = date_part.split(['-', '/']).collect();
    if !(2..=3).contains(&segments.len()) {
        return None;
    }

    let year = match segments[0] {
        "XXXX" => None,
        raw if raw.len() == 4 && raw.chars().all(|c| c.is_ascii_digit()) => raw.parse().ok(),
        _ => return None,
    };
    let month = parse_numeric(segments[1], 1, 12)?;
    let day = match segments.get(2) {
        Some(raw) => Some(parse_numeric(raw, 1, 31)?),
        None => None,
    };

    Some(DateExpression { year, month: Some(month), day })
}

fn parse_written(text: &str) -> Option<DateExpression> {
    let mut year = None;
    let mut month = None;
    let mut day = None;

    for raw_token in text.split_whitespace() {
        let token = raw_token.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        if token.is_empty() {
            continue;
        }
        if month.is_none() {
            if let Some(number) = month_number(token) {
                month = Some(number);
                continue;
            }
        }
        if token.chars().all(|c| c.is_ascii_digit()) {
            if token.len() == 4 && year.is_none() {
                year = token.parse().ok();
                continue;
            }
            if day.is_none() {
                if let Some(number) = parse_numeric(token, 1, 31) {
                    day = Some(number);
                    continue;
                }
            }
        }
        if day.is_none() {
            if let Some(number) = ordinal_day(token) {
                day = Some(number);
            }
        }
    }

    month.map(|month| DateExpression { year, month: Some(month), day })
}

fn parse_numeric(raw: &str, min: u32, max: u32) -> Option<u32> {
    if raw.is_empty() || raw.len() > 2 || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let value: u32 = raw.parse().ok()?;
    (min..=max).contains(&value).then_some(value)
}

fn ordinal_day(token: &str) -> Option<u32> {
    let lowered = token.to_ascii_lowercase();
    let digits = lowered
        .strip_suffix("st")
        .or_else(|| lowered.strip_suffix("nd"))
        .or_else(|| lowered.strip_suffix("rd"))
        .or_else(|| lowered.strip_suffix("th"))?;
    parse_numeric(digits, 1, 31)
}

fn month_number(token: &str) -> Option<u32> {
    const MONTHS: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    let lowered = token.to_ascii_lowercase();
    MONTHS
        .iter()
        .position(|name| **name == lowered || (lowered.len() == 3 && name.starts_with(&lowered)))
        .map(|index| index as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::{imprecision_message, is_ambiguous, DateComponent, DateExpression};

    #[test]
    fn iso_date_is_definite() {
        let expression = DateExpression::parse("2024-03-05").expect("parses");
        assert!(expression.is_definite());
        assert!(expression.missing().is_empty());
        assert_eq!(expression.timex(), "2024-03-05");
    }

    #[test]
    fn month_and_year_misses_exactly_the_day() {
        let expression = DateExpression::parse("March 2024").expect("parses");
        assert!(!expression.is_definite());
        assert_eq!(expression.missing(), vec![DateComponent::Day]);
    }

    #[test]
    fn year_placeholder_misses_the_year() {
        let expression = DateExpression::parse("XXXX-03-05").expect("parses");
        assert_eq!(expression.missing(), vec![DateComponent::Year]);
        assert_eq!(expression.timex(), "XXXX-03-05");
    }

    #[test]
    fn bare_month_misses_day_and_year() {
        let expression = DateExpression::parse("March").expect("parses");
        assert_eq!(expression.missing(), vec![DateComponent::Day, DateComponent::Year]);
    }

    #[test]
    fn written_forms_with_day_are_definite() {
        for text in ["5 March 2024", "March 5, 2024", "March 5th 2024"] {
            let expression = DateExpression::parse(text).expect(text);
            assert!(expression.is_definite(), "{text}");
            assert_eq!(expression.timex(), "2024-03-05");
        }
    }

    #[test]
    fn time_suffix_is_dropped() {
        let expression = DateExpression::parse("2024-06-01T09:00").expect("parses");
        assert_eq!(expression.timex(), "2024-06-01");
    }

    #[test]
    fn relative_phrases_are_not_recognized() {
        assert!(DateExpression::parse("next Tuesday").is_none());
        assert!(is_ambiguous("next Tuesday"));
    }

    #[test]
    fn ambiguity_check_accepts_only_definite_expressions() {
        assert!(!is_ambiguous("2024-03-05"));
        assert!(is_ambiguous("2024-03"));
        assert!(is_ambiguous("2024"));
    }

    #[test]
    fn retry_message_joins_missing_components() {
        assert_eq!(
            imprecision_message(&[DateComponent::Day]),
            "Please be more precise. I miss the day."
        );
        assert_eq!(
            imprecision_message(&[DateComponent::Day, DateComponent::Year]),
            "Please be more precise. I miss the day and the year."
        );
        assert_eq!(
            imprecision_message(&[
                DateComponent::Day,
                DateComponent::Month,
                DateComponent::Year
            ]),
            "Please be more precise. I miss the day, the month and the year."
        );
    }
}

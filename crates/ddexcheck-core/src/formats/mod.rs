//! Value format checks for durations, dates, territories and languages
//!
//! Like the identifier validators these are total: they return a
//! [`Verdict`] and never fail.
//!
//! Copyright (c) 2025 DDEXCheck Team
//! Licensed under the Apache-2.0 license

mod languages;

use crate::identifiers::Verdict;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use isocountry::CountryCode;
use regex::Regex;
use std::sync::OnceLock;

/// Territory value that stands for every territory
pub const WORLDWIDE: &str = "Worldwide";

static DURATION_REGEX: OnceLock<Regex> = OnceLock::new();
static DATE_REGEX: OnceLock<Regex> = OnceLock::new();
static LANGUAGE_REGEX: OnceLock<Regex> = OnceLock::new();

fn duration_regex() -> &'static Regex {
    DURATION_REGEX.get_or_init(|| {
        Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+(?:\.\d+)?)S)?$").expect("duration pattern compiles")
    })
}

fn date_regex() -> &'static Regex {
    DATE_REGEX.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern compiles"))
}

fn language_regex() -> &'static Regex {
    LANGUAGE_REGEX.get_or_init(|| {
        Regex::new(r"^([a-z]{2,3})(?:-([A-Z]{2}))?$").expect("language pattern compiles")
    })
}

/// ISO-8601 duration, `PT#H#M#S` subset with optional fractional seconds
pub fn validate_duration(value: &str) -> Verdict {
    match duration_seconds(value) {
        Some(_) => Verdict::Valid,
        None => Verdict::InvalidFormat(format!("'{}' is not an ISO-8601 duration of the form PT#H#M#S", value.trim())),
    }
}

/// Total length in seconds of a `PT#H#M#S` duration
pub fn duration_seconds(value: &str) -> Option<f64> {
    let captures = duration_regex().captures(value.trim())?;
    if captures.iter().skip(1).all(|group| group.is_none()) {
        return None;
    }

    let component = |index: usize| -> Option<f64> {
        match captures.get(index) {
            Some(m) => m.as_str().parse::<f64>().ok(),
            None => Some(0.0),
        }
    };
    Some(component(1)? * 3600.0 + component(2)? * 60.0 + component(3)?)
}

/// Calendar date in `YYYY-MM-DD` form
pub fn validate_date(value: &str) -> Verdict {
    let value = value.trim();
    if !date_regex().is_match(value) {
        return Verdict::InvalidFormat(format!("'{value}' does not match YYYY-MM-DD"));
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(_) => Verdict::Valid,
        Err(_) => Verdict::InvalidFormat(format!("'{value}' is not a calendar date")),
    }
}

/// ISO-8601 date-time, with or without a zone offset
pub fn validate_date_time(value: &str) -> Verdict {
    let value = value.trim();
    let valid = DateTime::parse_from_rfc3339(value).is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S").is_ok()
        || NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f").is_ok();
    if valid {
        Verdict::Valid
    } else {
        Verdict::InvalidFormat(format!("'{value}' is not an ISO-8601 date-time (YYYY-MM-DDThh:mm:ss)"))
    }
}

/// ISO 3166-1 alpha-2 territory code or `Worldwide`
pub fn validate_territory(value: &str) -> Verdict {
    let value = value.trim();
    if value == WORLDWIDE {
        return Verdict::Valid;
    }
    if value.len() != 2 || !value.chars().all(|c| c.is_ascii_uppercase()) {
        return Verdict::InvalidFormat(format!("'{value}' is not a two-letter uppercase territory code"));
    }
    match CountryCode::for_alpha2(value) {
        Ok(_) => Verdict::Valid,
        Err(_) => Verdict::InvalidFormat(format!("'{value}' is not an ISO 3166-1 territory code")),
    }
}

/// ISO 639 language code, optionally followed by a territory (`en-US`)
pub fn validate_language(value: &str) -> Verdict {
    let value = value.trim();
    let Some(captures) = language_regex().captures(value) else {
        return Verdict::InvalidFormat(format!("'{value}' is not a two- or three-letter language code"));
    };

    let language = captures.get(1).map(|m| m.as_str()).unwrap_or_default();
    let table = if language.len() == 2 {
        languages::ISO_639_1
    } else {
        languages::ISO_639_2
    };
    if table.binary_search(&language).is_err() {
        return Verdict::InvalidFormat(format!("'{language}' is not an ISO 639 language code"));
    }

    if let Some(region) = captures.get(2) {
        if CountryCode::for_alpha2(region.as_str()).is_err() {
            return Verdict::InvalidFormat(format!("'{}' is not an ISO 3166-1 territory code", region.as_str()));
        }
    }
    Verdict::Valid
}

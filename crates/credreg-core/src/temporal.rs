//! # Temporal Types — Calendar Dates
//!
//! Defines `Date`, the `YYYY-MM-DD` calendar date used for a template's
//! service and expiration window.
//!
//! ## Security Invariant
//!
//! A `Date` is accepted only in its exact ten-character form and must name a
//! real calendar day. Because the rendered form is re-derived from the parsed
//! value, two `Date`s that compare equal always produce identical canonical
//! bytes.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::canonical::{Canonical, CanonicalWriter};
use crate::error::CredregError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated calendar date in `YYYY-MM-DD` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Date(NaiveDate);

impl Date {
    /// Parse a `YYYY-MM-DD` string.
    ///
    /// # Errors
    ///
    /// Rejects anything not exactly four digits, dash, two digits, dash, two
    /// digits, and any string naming a nonexistent day (e.g. `2025-02-30`).
    pub fn parse(s: &str) -> Result<Self, CredregError> {
        let shape_ok = s.len() == 10
            && s.bytes().enumerate().all(|(i, b)| match i {
                4 | 7 => b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !shape_ok {
            return Err(CredregError::InvalidFormat {
                field: "date",
                value: s.to_string(),
                reason: "expected YYYY-MM-DD",
            });
        }
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|e| CredregError::InvalidValue(format!("date {s:?}: {e}")))
    }

    /// Access the inner `NaiveDate`.
    pub fn as_naive(&self) -> &NaiveDate {
        &self.0
    }

    /// Render as `YYYY-MM-DD`.
    pub fn to_date_string(&self) -> String {
        self.0.format(DATE_FORMAT).to_string()
    }
}

impl std::fmt::Display for Date {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_date_string())
    }
}

impl TryFrom<String> for Date {
    type Error = CredregError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<Date> for String {
    fn from(d: Date) -> Self {
        d.to_date_string()
    }
}

impl Canonical for Date {
    fn write_canonical(&self, w: &mut CanonicalWriter) {
        w.put_str(&self.to_date_string());
    }
}

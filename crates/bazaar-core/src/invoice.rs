//! # Invoice Numbers
//!
//! Formatting of the human-readable invoice code `PREFIX-YYMMDD-SEQ`.
//!
//! ```text
//! "Acme Store"  ──► prefix  "ACM"
//! 2024-03-09    ──► date    "240309"
//! 7             ──► seq     "0007"   (wider past 9999: "12345")
//!                          ─────────────────
//!                          ACM-240309-0007
//! ```
//!
//! Allocation (counting, collision checks, retry) lives in the sale engine;
//! this module only builds candidates.

use std::fmt;

use chrono::NaiveDate;

use crate::DEFAULT_INVOICE_PREFIX;

const PREFIX_LEN: usize = 3;

/// Derives the invoice prefix from a store name.
///
/// ASCII alphanumerics only, upper-cased, first three characters.
/// Falls back to `INV` when nothing usable remains.
///
/// ## Example
/// ```rust
/// use bazaar_core::invoice::invoice_prefix;
///
/// assert_eq!(invoice_prefix("Acme Store"), "ACM");
/// assert_eq!(invoice_prefix("a-1 b"), "A1B");
/// assert_eq!(invoice_prefix("★☆"), "INV");
/// ```
pub fn invoice_prefix(store_name: &str) -> String {
    let prefix: String = store_name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(PREFIX_LEN)
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if prefix.is_empty() {
        DEFAULT_INVOICE_PREFIX.to_string()
    } else {
        prefix
    }
}

/// A candidate invoice number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceNumber {
    prefix: String,
    date: NaiveDate,
    sequence: u32,
}

impl InvoiceNumber {
    pub fn new(prefix: impl Into<String>, date: NaiveDate, sequence: u32) -> Self {
        Self {
            prefix: prefix.into(),
            date,
            sequence,
        }
    }

    /// First candidate for a store/day given how many sales it already has.
    pub fn first_candidate(prefix: impl Into<String>, date: NaiveDate, existing: u32) -> Self {
        Self::new(prefix, date, existing.saturating_add(1))
    }

    /// The same prefix and date with the next sequence.
    pub fn next(&self) -> Self {
        Self::new(self.prefix.clone(), self.date, self.sequence.saturating_add(1))
    }

    /// First free candidate once sequences up to `used` are taken.
    ///
    /// Never goes backwards: with no (or a lower) `used`, this is `next()`.
    pub fn after(&self, used: Option<u32>) -> Self {
        let mut next = self.next();
        if let Some(used) = used {
            next.sequence = next.sequence.max(used.saturating_add(1));
        }
        next
    }

    /// `PREFIX-YYMMDD-`, shared by every sequence of this prefix and day.
    pub fn stem(&self) -> String {
        format!("{}-{}-", self.prefix, self.date.format("%y%m%d"))
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:04}", self.stem(), self.sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
    }

    #[test]
    fn test_prefix_rules() {
        assert_eq!(invoice_prefix("Acme Store"), "ACM");
        assert_eq!(invoice_prefix("Acme Outlet"), "ACM");
        assert_eq!(invoice_prefix("zé shop"), "ZSH");
        assert_eq!(invoice_prefix("AB"), "AB");
        assert_eq!(invoice_prefix(""), "INV");
        assert_eq!(invoice_prefix("--- ---"), "INV");
    }

    #[test]
    fn test_format() {
        let inv = InvoiceNumber::first_candidate("ACM", date(), 0);
        assert_eq!(inv.to_string(), "ACM-240309-0001");
        assert_eq!(inv.next().to_string(), "ACM-240309-0002");
    }

    #[test]
    fn test_sequence_widens_past_four_digits() {
        let inv = InvoiceNumber::new("ACM", date(), 12345);
        assert_eq!(inv.to_string(), "ACM-240309-12345");
    }

    #[test]
    fn test_after_jumps_past_used_sequences() {
        let inv = InvoiceNumber::first_candidate("ACM", date(), 0);
        assert_eq!(inv.stem(), "ACM-240309-");
        assert_eq!(inv.after(Some(6)).to_string(), "ACM-240309-0007");
        assert_eq!(inv.after(None).to_string(), "ACM-240309-0002");

        let ahead = InvoiceNumber::new("ACM", date(), 9);
        assert_eq!(ahead.after(Some(3)).sequence(), 10);
    }
}

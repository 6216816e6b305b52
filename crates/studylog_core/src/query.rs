//! Query filter for list operations.
//!
//! # Responsibility
//! - Parse the optional "due" window (Go-style duration strings such as
//!   `24h`, `1h30m`, `1.5h`, `300ms`).
//! - Turn a list request into a concrete [`ItemFilter`] at a given instant.
//! - Own the single definition of list ordering used by every backend.
//!
//! # Invariants
//! - Without a due window, results are newest first: `created_at DESC, id ASC`.
//! - With a due window, only items with `reviewed_at <= now - window` remain,
//!   most overdue first: `reviewed_at ASC, id ASC`.
//! - Results are capped at [`PAGE_SIZE`]; there is no deep-paging cursor.

use crate::error::{StoreError, StoreResult};
use crate::model::item::Item;
use once_cell::sync::Lazy;
use regex::Regex;
use std::cmp::Ordering;
use std::time::Duration;

/// Fixed upper bound on list results.
pub const PAGE_SIZE: u32 = 100;

static DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:\d+(?:\.\d*)?|\.\d+)(?:ns|us|µs|μs|ms|s|m|h))+$")
        .expect("valid duration regex")
});
static DURATION_PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d*)(?:\.(\d*))?(ns|us|µs|μs|ms|s|m|h)").expect("valid duration part regex")
});

/// Parses a duration string made of one or more `<number><unit>` parts.
///
/// Units: `ns`, `us` (or `µs`), `ms`, `s`, `m`, `h`. A bare `0` is accepted.
/// A leading `+` is ignored; negative durations are rejected.
pub fn parse_duration(value: &str) -> StoreResult<Duration> {
    let invalid = || StoreError::InvalidInput(format!("invalid duration `{value}`"));

    let trimmed = value.trim();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned.starts_with('-') {
        return Err(StoreError::InvalidInput(format!(
            "duration must not be negative: `{value}`"
        )));
    }
    if unsigned == "0" {
        return Ok(Duration::ZERO);
    }
    if !DURATION_RE.is_match(unsigned) {
        return Err(invalid());
    }

    let mut total_nanos: u128 = 0;
    for caps in DURATION_PART_RE.captures_iter(unsigned) {
        let whole = caps.get(1).map_or("", |m| m.as_str());
        let fraction = caps.get(2).map_or("", |m| m.as_str());
        let unit_nanos = unit_nanos(&caps[3]);

        let whole_value: u128 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid())?
        };
        total_nanos = total_nanos
            .checked_add(whole_value.checked_mul(unit_nanos).ok_or_else(invalid)?)
            .ok_or_else(invalid)?;

        // Digits past nanosecond precision cannot change the result.
        let fraction = &fraction[..fraction.len().min(18)];
        if !fraction.is_empty() {
            let digits: u128 = fraction.parse().map_err(|_| invalid())?;
            let scale = 10_u128.pow(fraction.len() as u32);
            total_nanos = total_nanos
                .checked_add(digits * unit_nanos / scale)
                .ok_or_else(invalid)?;
        }
    }

    if total_nanos > i64::MAX as u128 {
        return Err(invalid());
    }
    Ok(Duration::from_nanos(total_nanos as u64))
}

fn unit_nanos(unit: &str) -> u128 {
    match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        _ => 3_600 * 1_000_000_000,
    }
}

/// Validated list request, independent of the current time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub review_only: bool,
    pub due: Option<Duration>,
}

impl ListQuery {
    /// Builds a list request. A blank `due` string counts as absent.
    pub fn parse(review_only: bool, due: Option<&str>) -> StoreResult<Self> {
        let due = match due.map(str::trim) {
            Some(value) if !value.is_empty() => Some(parse_duration(value)?),
            _ => None,
        };
        Ok(Self { review_only, due })
    }

    /// The unfiltered newest-first listing used for public views.
    pub fn everything() -> Self {
        Self::default()
    }

    /// Resolves the request against `now_ms`.
    pub fn filter_at(&self, now_ms: i64) -> ItemFilter {
        match self.due {
            Some(window) => {
                let window_ms = i64::try_from(window.as_millis()).unwrap_or(i64::MAX);
                ItemFilter {
                    review_only: self.review_only,
                    reviewed_before: Some(now_ms.saturating_sub(window_ms)),
                    order: ItemOrder::ReviewedAsc,
                    limit: PAGE_SIZE,
                }
            }
            None => ItemFilter {
                review_only: self.review_only,
                reviewed_before: None,
                order: ItemOrder::CreatedDesc,
                limit: PAGE_SIZE,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOrder {
    /// `created_at DESC, id ASC`
    CreatedDesc,
    /// `reviewed_at ASC, id ASC`
    ReviewedAsc,
}

/// Concrete filter handed to storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemFilter {
    pub review_only: bool,
    /// Inclusive upper bound on `reviewed_at`.
    pub reviewed_before: Option<i64>,
    pub order: ItemOrder,
    pub limit: u32,
}

impl ItemFilter {
    pub fn matches(&self, item: &Item) -> bool {
        if self.review_only && !item.is_review {
            return false;
        }
        match self.reviewed_before {
            Some(cutoff) => item.reviewed_at <= cutoff,
            None => true,
        }
    }

    pub fn compare(&self, lhs: &Item, rhs: &Item) -> Ordering {
        match self.order {
            ItemOrder::CreatedDesc => rhs.created_at.cmp(&lhs.created_at),
            ItemOrder::ReviewedAsc => lhs.reviewed_at.cmp(&rhs.reviewed_at),
        }
        .then_with(|| lhs.id.cmp(&rhs.id))
    }

    /// Filters, orders and truncates an unordered candidate set.
    pub fn apply<I>(&self, items: I) -> Vec<Item>
    where
        I: IntoIterator<Item = Item>,
    {
        let mut selected = items
            .into_iter()
            .filter(|item| self.matches(item))
            .collect::<Vec<_>>();
        selected.sort_by(|lhs, rhs| self.compare(lhs, rhs));
        selected.truncate(self.limit as usize);
        selected
    }
}

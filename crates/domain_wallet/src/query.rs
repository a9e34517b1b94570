//! Transaction history queries and pagination

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::WalletId;

use crate::error::LedgerError;
use crate::transaction::{Transaction, TransactionKind, TransactionStatus};

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_LIMIT: u32 = 10;
pub const MAX_LIMIT: u32 = 100;

/// Sort direction on `created_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// 1-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    /// Builds a page request, substituting defaults for missing or zero values
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Self {
        Self {
            page: page.filter(|p| *p > 0).unwrap_or(DEFAULT_PAGE),
            limit: limit
                .filter(|l| *l > 0)
                .unwrap_or(DEFAULT_LIMIT)
                .min(MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Pagination metadata returned with every page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_page: u64,
}

impl PageMeta {
    pub fn new(pagination: Pagination, total: u64) -> Self {
        let limit = u64::from(pagination.limit.max(1));
        Self {
            page: pagination.page,
            limit: pagination.limit,
            total,
            total_page: total.div_ceil(limit),
        }
    }
}

/// One page of results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Slices an already filtered and sorted collection
    pub fn from_sorted(items: Vec<T>, pagination: Pagination) -> Self {
        let total = items.len() as u64;
        let data = items
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit as usize)
            .collect();
        Self {
            data,
            meta: PageMeta::new(pagination, total),
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            meta: self.meta,
        }
    }
}

/// Filter over the transaction log
///
/// An empty `wallets` set means every wallet. `from` and `to` are
/// inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionQuery {
    pub wallets: Vec<WalletId>,
    pub kind: Option<TransactionKind>,
    pub status: Option<TransactionStatus>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub sort: SortOrder,
    pub pagination: Pagination,
}

impl TransactionQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_wallet(wallet: WalletId) -> Self {
        Self {
            wallets: vec![wallet],
            ..Default::default()
        }
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn status(mut self, status: TransactionStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn between(mut self, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> Self {
        self.from = from;
        self.to = to;
        self
    }

    pub fn sorted(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn page(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }

    /// Returns true if `entry` passes every filter
    pub fn matches(&self, entry: &Transaction) -> bool {
        (self.wallets.is_empty() || self.wallets.contains(&entry.wallet_id))
            && self.kind.map_or(true, |k| entry.kind == k)
            && self.status.map_or(true, |s| entry.status == s)
            && self.from.map_or(true, |from| entry.created_at >= from)
            && self.to.map_or(true, |to| entry.created_at <= to)
    }
}

/// Which end of a range a time bound closes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

/// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date
///
/// A bare date used as an upper bound covers the whole day.
pub fn parse_time_bound(input: &str, bound: Bound) -> Result<DateTime<Utc>, LedgerError> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(input) {
        return Ok(instant.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| LedgerError::validation(format!("invalid date: {}", input)))?;
    let time = match bound {
        Bound::Lower => NaiveTime::MIN,
        Bound::Upper => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
            .ok_or_else(|| LedgerError::validation("invalid end of day"))?,
    };
    Ok(Utc.from_utc_datetime(&date.and_time(time)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_pagination_defaults() {
        let p = Pagination::new(None, None);
        assert_eq!(p.page, 1);
        assert_eq!(p.limit, 10);
        assert_eq!(p.offset(), 0);

        let p = Pagination::new(Some(0), Some(0));
        assert_eq!((p.page, p.limit), (1, 10));

        let p = Pagination::new(Some(3), Some(1000));
        assert_eq!(p.limit, MAX_LIMIT);
        assert_eq!(p.offset(), 200);
    }

    #[test]
    fn test_page_meta_rounds_up() {
        let meta = PageMeta::new(Pagination::new(Some(1), Some(10)), 21);
        assert_eq!(meta.total_page, 3);

        let empty = PageMeta::new(Pagination::default(), 0);
        assert_eq!(empty.total_page, 0);
    }

    #[test]
    fn test_page_slicing() {
        let items: Vec<u32> = (1..=25).collect();
        let page = Page::from_sorted(items, Pagination::new(Some(3), Some(10)));
        assert_eq!(page.data, vec![21, 22, 23, 24, 25]);
        assert_eq!(page.meta.total, 25);
    }

    #[test]
    fn test_date_only_upper_bound_covers_day() {
        let upper = parse_time_bound("2024-03-05", Bound::Upper).unwrap();
        assert_eq!(upper.day(), 5);
        assert_eq!(upper.hour(), 23);
        assert_eq!(upper.minute(), 59);

        let lower = parse_time_bound("2024-03-05", Bound::Lower).unwrap();
        assert_eq!(lower.hour(), 0);
    }

    #[test]
    fn test_rfc3339_bound() {
        let instant = parse_time_bound("2024-03-05T10:30:00+06:00", Bound::Upper).unwrap();
        assert_eq!(instant.hour(), 4);
        assert!(parse_time_bound("yesterday", Bound::Lower).is_err());
    }
}

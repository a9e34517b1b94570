//! Transaction history DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use domain_wallet::query::{parse_time_bound, Bound};
use domain_wallet::{
    Page, PageMeta, Pagination, SortOrder, Transaction, TransactionKind, TransactionQuery,
    TransactionStatus,
};

use crate::error::ApiError;

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub status: TransactionStatus,
    pub amount: Decimal,
    pub fee: Decimal,
    pub commission: Decimal,
    pub currency: String,
    pub wallet_id: Uuid,
    pub from_wallet_id: Option<Uuid>,
    pub to_wallet_id: Option<Uuid>,
    pub initiated_by: Uuid,
    pub resulting_balance: Decimal,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(entry: Transaction) -> Self {
        Self {
            id: entry.id.into(),
            kind: entry.kind,
            status: entry.status,
            amount: entry.amount.amount(),
            fee: entry.fee.amount(),
            commission: entry.commission.amount(),
            currency: entry.amount.currency().code().to_string(),
            wallet_id: entry.wallet_id.into(),
            from_wallet_id: entry.from_wallet_id.map(Uuid::from),
            to_wallet_id: entry.to_wallet_id.map(Uuid::from),
            initiated_by: entry.initiated_by.into(),
            resulting_balance: entry.resulting_balance.amount(),
            note: entry.note,
            created_at: entry.created_at,
        }
    }
}

/// One page of results with its metadata
#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse<T> {
    pub data: Vec<T>,
    pub meta: PageMeta,
}

impl<T, U: From<T>> From<Page<T>> for PageResponse<U> {
    fn from(page: Page<T>) -> Self {
        Self {
            data: page.data.into_iter().map(U::from).collect(),
            meta: page.meta,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl PageParams {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit)
    }
}

/// History filters
///
/// `from` and `to` accept RFC 3339 timestamps or `YYYY-MM-DD` dates; a
/// bare `to` date covers the whole day.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub kind: Option<String>,
    pub status: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    /// `asc` or `desc` (default)
    pub sort: Option<String>,
}

impl HistoryParams {
    pub fn into_query(self) -> Result<TransactionQuery, ApiError> {
        let mut query = TransactionQuery::all().page(Pagination::new(self.page, self.limit));

        if let Some(kind) = self.kind.as_deref() {
            query = query.kind(kind.parse().map_err(ApiError::BadRequest)?);
        }
        if let Some(status) = self.status.as_deref() {
            query = query.status(status.parse().map_err(ApiError::BadRequest)?);
        }

        let from = self
            .from
            .as_deref()
            .map(|s| parse_time_bound(s, Bound::Lower))
            .transpose()?;
        let to = self
            .to
            .as_deref()
            .map(|s| parse_time_bound(s, Bound::Upper))
            .transpose()?;
        query = query.between(from, to);

        let sort = match self.sort.as_deref().map(str::to_ascii_lowercase).as_deref() {
            None | Some("desc") | Some("descending") => SortOrder::Descending,
            Some("asc") | Some("ascending") => SortOrder::Ascending,
            Some(other) => {
                return Err(ApiError::BadRequest(format!("unknown sort order: {}", other)))
            }
        };
        Ok(query.sorted(sort))
    }
}

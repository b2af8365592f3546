// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Arc;

use chrono::{DateTime, Datelike, FixedOffset, Local, NaiveDate, SecondsFormat};
use rusqlite::types::Value;
use rusqlite::{params, Connection, Params, Row, Statement};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::db::{index_exists, LazyStore, BY_CATEGORY, BY_YEAR_MONTH, STORE};
use crate::error::Result;
use crate::models::{Currency, EntryDraft, LedgerEntry};

/// Source of insertion timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

pub struct CostRepository {
    store: Arc<LazyStore>,
    clock: Arc<dyn Clock>,
}

impl CostRepository {
    pub fn new(store: Arc<LazyStore>) -> Self {
        Self::with_clock(store, Arc::new(SystemClock))
    }

    pub fn with_clock(store: Arc<LazyStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Writes a new entry stamped with the current time and returns it as stored.
    pub async fn insert(&self, draft: EntryDraft) -> Result<LedgerEntry> {
        let now = self.clock.now();
        let amount = draft.amount.unwrap_or(Decimal::ZERO);
        let currency = Currency::coerce(draft.currency.as_deref());
        let category = draft.category.unwrap_or_default();
        let description = draft.description.unwrap_or_default();
        let created_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let date = now.date_naive();
        let (year, month, day) = (now.year(), now.month(), now.day());

        let store = self.store.handle().await?;
        let row = (
            amount.to_string(),
            currency.code(),
            category.clone(),
            description.clone(),
            created_at.clone(),
            date.to_string(),
        );
        let id = store
            .write(move |tx| {
                tx.execute(
                    &format!(
                        "INSERT INTO {STORE}(amount, currency, category, description, created_at,
                             created_year, created_month, created_day, date)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"
                    ),
                    params![row.0, row.1, row.2, row.3, row.4, year, month, day, row.5],
                )?;
                Ok(tx.last_insert_rowid())
            })
            .await?;
        info!(id, %amount, %currency, category = %category, "entry recorded");

        Ok(LedgerEntry {
            id,
            amount,
            currency,
            category,
            description,
            created_at: DateTime::parse_from_rfc3339(&created_at).ok(),
            created_year: Some(year),
            created_month: Some(month),
            created_day: Some(day),
            date: Some(date),
        })
    }

    /// Entries recorded in `year`/`month`, oldest first.
    ///
    /// Uses the composite index when the store has it; stores created before
    /// the index existed are scanned and filtered on the derived (or legacy)
    /// date instead.
    pub async fn find_by_month(&self, year: i32, month: u32) -> Result<Vec<LedgerEntry>> {
        let store = self.store.handle().await?;
        let mut items = store
            .read(move |tx| {
                if index_exists(tx, BY_YEAR_MONTH)? {
                    debug!(year, month, "month query via index");
                    query_entries(
                        tx,
                        &format!(
                            "SELECT * FROM {STORE} INDEXED BY {BY_YEAR_MONTH}
                             WHERE created_year=?1 AND created_month=?2 ORDER BY id"
                        ),
                        params![year, month],
                    )
                } else {
                    debug!(year, month, "no composite index, scanning");
                    query_entries(tx, &format!("SELECT * FROM {STORE} ORDER BY id"), params![])
                }
            })
            .await?;
        items.retain(|e| e.year() == Some(year) && e.month() == Some(month));
        sort_ascending(&mut items);
        Ok(items)
    }

    pub async fn find_by_year(&self, year: i32) -> Result<Vec<LedgerEntry>> {
        let mut items = self.scan().await?;
        items.retain(|e| e.year() == Some(year));
        sort_ascending(&mut items);
        Ok(items)
    }

    pub async fn find_by_category(&self, category: &str) -> Result<Vec<LedgerEntry>> {
        let store = self.store.handle().await?;
        let wanted = category.to_string();
        let filter = wanted.clone();
        let mut items = store
            .read(move |tx| {
                if index_exists(tx, BY_CATEGORY)? {
                    query_entries(
                        tx,
                        &format!(
                            "SELECT * FROM {STORE} INDEXED BY {BY_CATEGORY}
                             WHERE category=?1 ORDER BY id"
                        ),
                        params![wanted],
                    )
                } else {
                    query_entries(tx, &format!("SELECT * FROM {STORE} ORDER BY id"), params![])
                }
            })
            .await?;
        items.retain(|e| e.category == filter);
        sort_ascending(&mut items);
        Ok(items)
    }

    /// The `n` most recently recorded entries, newest first.
    ///
    /// Timestamps decide only between two dated entries that differ; every
    /// other pair is ordered by descending id.
    pub async fn find_recent(&self, n: usize) -> Result<Vec<LedgerEntry>> {
        let items = self.scan().await?;
        let mut out = newest_first(items);
        out.truncate(n);
        Ok(out)
    }

    /// Removes the entry if it exists. Deleting an unknown id is not an error.
    pub async fn delete_by_id(&self, id: i64) -> Result<()> {
        let store = self.store.handle().await?;
        let removed = store
            .write(move |tx| {
                Ok(tx.execute(&format!("DELETE FROM {STORE} WHERE id=?1"), params![id])?)
            })
            .await?;
        if removed == 0 {
            debug!(id, "delete of unknown id ignored");
        } else {
            info!(id, "entry deleted");
        }
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<LedgerEntry>> {
        let store = self.store.handle().await?;
        store
            .read(|tx| query_entries(tx, &format!("SELECT * FROM {STORE} ORDER BY id"), params![]))
            .await
    }
}

// Undated rows (None) sort before dated ones.
fn sort_ascending(items: &mut [LedgerEntry]) {
    items.sort_by_key(LedgerEntry::sort_millis);
}

// Dated and undated rows together have no total order. Each group is sorted
// on its own and the runs are merged by id.
fn newest_first(items: Vec<LedgerEntry>) -> Vec<LedgerEntry> {
    let (mut dated, mut undated): (Vec<_>, Vec<_>) =
        items.into_iter().partition(|e| e.sort_millis().is_some());
    dated.sort_by(|a, b| (b.sort_millis(), b.id).cmp(&(a.sort_millis(), a.id)));
    undated.sort_by(|a, b| b.id.cmp(&a.id));

    let mut out = Vec::with_capacity(dated.len() + undated.len());
    let mut dated = dated.into_iter().peekable();
    let mut undated = undated.into_iter().peekable();
    loop {
        let next = match (dated.peek(), undated.peek()) {
            (Some(d), Some(u)) if d.id > u.id => dated.next(),
            (Some(_), Some(_)) => undated.next(),
            (Some(_), None) => dated.next(),
            (None, Some(_)) => undated.next(),
            (None, None) => break,
        };
        out.extend(next);
    }
    out
}

fn query_entries<P: Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<LedgerEntry>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt.query_map(params, entry_from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

// Rows written by older schema versions may lack columns or carry loosely
// typed values, so every field is read by name and coerced.
fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<LedgerEntry> {
    let int = |name: &str| -> rusqlite::Result<Option<i64>> {
        Ok(match column(row, name)? {
            Value::Integer(i) => Some(i),
            Value::Real(f) => Some(f as i64),
            Value::Text(s) => s.trim().parse().ok(),
            _ => None,
        })
    };
    let text = |name: &str| -> rusqlite::Result<Option<String>> {
        Ok(match column(row, name)? {
            Value::Text(s) => Some(s),
            Value::Integer(i) => Some(i.to_string()),
            Value::Real(f) => Some(f.to_string()),
            _ => None,
        })
    };

    let amount = match column(row, "amount")? {
        Value::Text(s) => s.trim().parse::<Decimal>().unwrap_or(Decimal::ZERO),
        Value::Integer(i) => Decimal::from(i),
        Value::Real(f) => Decimal::try_from(f).unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    };

    Ok(LedgerEntry {
        id: row.get("id")?,
        amount,
        currency: Currency::coerce(text("currency")?.as_deref()),
        category: text("category")?.unwrap_or_default(),
        description: text("description")?.unwrap_or_default(),
        created_at: text("created_at")?.and_then(|s| DateTime::parse_from_rfc3339(&s).ok()),
        created_year: int("created_year")?.and_then(|v| i32::try_from(v).ok()),
        created_month: int("created_month")?.and_then(|v| u32::try_from(v).ok()),
        created_day: int("created_day")?.and_then(|v| u32::try_from(v).ok()),
        date: text("date")?
            .and_then(|s| NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok()),
    })
}

fn column(row: &Row<'_>, name: &str) -> rusqlite::Result<Value> {
    let stmt: &Statement<'_> = row.as_ref();
    match stmt.column_index(name) {
        Ok(i) => row.get(i),
        Err(_) => Ok(Value::Null),
    }
}

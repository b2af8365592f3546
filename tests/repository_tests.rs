// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, TimeZone};
use costbook::db::{self, LazyStore, Location};
use costbook::models::{Currency, EntryDraft};
use costbook::repo::{Clock, CostRepository};
use rusqlite::{Connection, params};
use rust_decimal_macros::dec;
use tempfile::TempDir;

struct StepClock {
    next: Mutex<DateTime<FixedOffset>>,
    step: Duration,
}

impl Clock for StepClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let mut g = self.next.lock().unwrap();
        let t = *g;
        *g = t + self.step;
        t
    }
}

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(2 * 3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, 0, 0)
        .unwrap()
}

fn setup(start: DateTime<FixedOffset>, step: Duration) -> (TempDir, CostRepository) {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(LazyStore::new(
        Location::Dir(dir.path().to_path_buf()),
        "costsdb",
        Some(2),
    ));
    let clock = Arc::new(StepClock {
        next: Mutex::new(start),
        step,
    });
    (dir, CostRepository::with_clock(store, clock))
}

fn food(amount: rust_decimal::Decimal, desc: &str) -> EntryDraft {
    EntryDraft::new(amount, Currency::Usd, "Food", desc)
}

#[tokio::test]
async fn recent_is_newest_first_and_truncated() {
    let (_dir, repo) = setup(at(2026, 3, 1, 9), Duration::seconds(1));
    for i in 1..=5 {
        repo.insert(food(dec!(1) * rust_decimal::Decimal::from(i), "x"))
            .await
            .unwrap();
    }
    let all = repo.find_recent(5).await.unwrap();
    let ids: Vec<i64> = all.iter().map(|e| e.id).collect();
    assert_eq!(ids.len(), 5);
    assert!(ids.windows(2).all(|w| w[0] > w[1]));
    assert_eq!(all[0].amount, dec!(5));

    let top = repo.find_recent(3).await.unwrap();
    assert_eq!(top.len(), 3);
    assert_eq!(top[0].id, ids[0]);
}

#[tokio::test]
async fn identical_timestamps_fall_back_to_descending_id() {
    let (_dir, repo) = setup(at(2026, 3, 1, 9), Duration::zero());
    let a = repo.insert(food(dec!(1), "a")).await.unwrap();
    let b = repo.insert(food(dec!(2), "b")).await.unwrap();
    let c = repo.insert(food(dec!(3), "c")).await.unwrap();
    let ids: Vec<i64> = repo
        .find_recent(10)
        .await
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(ids, vec![c.id, b.id, a.id]);
}

#[tokio::test]
async fn month_query_excludes_adjacent_months() {
    // 02-20, 03-07, 03-22, 04-06
    let (_dir, repo) = setup(at(2026, 2, 20, 12), Duration::days(15));
    let mut ids = Vec::new();
    for d in ["feb", "mar-1", "mar-2", "apr"] {
        ids.push(repo.insert(food(dec!(10), d)).await.unwrap().id);
    }

    let march = repo.find_by_month(2026, 3).await.unwrap();
    let descs: Vec<&str> = march.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(descs, vec!["mar-1", "mar-2"]);
    assert_eq!(march[0].id, ids[1]);
    assert_eq!(march[0].created_day, Some(7));
    assert_eq!(march[1].created_day, Some(22));

    assert_eq!(repo.find_by_month(2026, 2).await.unwrap().len(), 1);
    assert!(repo.find_by_month(2025, 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn year_query_is_ascending_and_scoped() {
    let (_dir, repo) = setup(at(2025, 12, 20, 12), Duration::days(10));
    for d in ["dec", "dec-30", "jan"] {
        repo.insert(food(dec!(1), d)).await.unwrap();
    }
    let y2025 = repo.find_by_year(2025).await.unwrap();
    assert_eq!(y2025.len(), 2);
    assert!(y2025[0].created_at < y2025[1].created_at);
    let y2026 = repo.find_by_year(2026).await.unwrap();
    assert_eq!(y2026.len(), 1);
    assert_eq!(y2026[0].description, "jan");
}

#[tokio::test]
async fn insert_stamps_time_fields_from_the_clock() {
    let (_dir, repo) = setup(at(2026, 3, 14, 10), Duration::zero());
    let e = repo.insert(food(dec!(12.34), "lunch")).await.unwrap();
    assert_eq!(e.created_year, Some(2026));
    assert_eq!(e.created_month, Some(3));
    assert_eq!(e.created_day, Some(14));
    assert_eq!(e.created_at, Some(at(2026, 3, 14, 10)));
    assert_eq!(e.date.map(|d| d.to_string()).as_deref(), Some("2026-03-14"));

    let stored = repo.find_by_month(2026, 3).await.unwrap();
    assert_eq!(stored, vec![e]);
}

#[tokio::test]
async fn insert_coerces_missing_and_invalid_fields() {
    let (_dir, repo) = setup(at(2026, 3, 14, 10), Duration::seconds(1));
    let blank = repo.insert(EntryDraft::default()).await.unwrap();
    assert_eq!(blank.amount, dec!(0));
    assert_eq!(blank.currency, Currency::Usd);
    assert_eq!(blank.category, "");
    assert_eq!(blank.description, "");

    let odd = repo
        .insert(EntryDraft {
            amount: Some(dec!(7.5)),
            currency: Some("DOGE".into()),
            category: Some("Snacks".into()),
            description: None,
        })
        .await
        .unwrap();
    assert_eq!(odd.currency, Currency::Usd);
    // Categories outside the recommended set are kept as-is.
    assert_eq!(odd.category, "Snacks");

    let read = repo.find_recent(1).await.unwrap();
    assert_eq!(read[0].currency, Currency::Usd);
    assert_eq!(read[0].amount, dec!(7.5));
}

#[tokio::test]
async fn category_query_uses_exact_label() {
    let (_dir, repo) = setup(at(2026, 5, 1, 8), Duration::minutes(1));
    repo.insert(EntryDraft::new(dec!(900), Currency::Ils, "Rent", "may"))
        .await
        .unwrap();
    repo.insert(food(dec!(4), "coffee")).await.unwrap();
    repo.insert(EntryDraft::new(dec!(950), Currency::Ils, "Rent", "june"))
        .await
        .unwrap();

    let rent = repo.find_by_category("Rent").await.unwrap();
    let descs: Vec<&str> = rent.iter().map(|e| e.description.as_str()).collect();
    assert_eq!(descs, vec!["may", "june"]);
    assert!(repo.find_by_category("rent").await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_unknown_id_is_a_successful_noop() {
    let (_dir, repo) = setup(at(2026, 3, 1, 9), Duration::seconds(1));
    let a = repo.insert(food(dec!(1), "a")).await.unwrap();
    repo.insert(food(dec!(2), "b")).await.unwrap();

    repo.delete_by_id(9_999).await.unwrap();
    assert_eq!(repo.find_recent(10).await.unwrap().len(), 2);

    repo.delete_by_id(a.id).await.unwrap();
    repo.delete_by_id(a.id).await.unwrap();
    let left = repo.find_recent(10).await.unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].description, "b");
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
    let (_dir, repo) = setup(at(2026, 3, 1, 9), Duration::seconds(1));
    let a = repo.insert(food(dec!(1), "a")).await.unwrap();
    let b = repo.insert(food(dec!(1), "b")).await.unwrap();
    repo.delete_by_id(b.id).await.unwrap();
    let c = repo.insert(food(dec!(1), "c")).await.unwrap();
    assert!(a.id < b.id && b.id < c.id);
}

fn legacy_rows(dir: &std::path::Path, rows: &[(&str, Option<&str>)]) {
    let conn = Connection::open(db::db_path(dir, "costsdb")).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE costs(
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            amount REAL,
            category TEXT,
            description TEXT,
            date TEXT
        );
        PRAGMA user_version = 1;
        "#,
    )
    .unwrap();
    for (desc, date) in rows {
        conn.execute(
            "INSERT INTO costs(amount, category, description, date) VALUES (1.0, 'Food', ?1, ?2)",
            params![desc, date],
        )
        .unwrap();
    }
}

#[tokio::test]
async fn undated_rows_order_by_id_in_recent() {
    let dir = tempfile::tempdir().unwrap();
    legacy_rows(dir.path(), &[("dated", Some("2025-03-05")), ("undated", None)]);
    let repo = CostRepository::new(Arc::new(LazyStore::new(
        Location::Dir(dir.path().to_path_buf()),
        "costsdb",
        Some(1),
    )));

    let recent = repo.find_recent(10).await.unwrap();
    let got: Vec<(i64, &str)> = recent
        .iter()
        .map(|e| (e.id, e.description.as_str()))
        .collect();
    assert_eq!(got, vec![(2, "undated"), (1, "dated")]);
}

#[tokio::test]
async fn recent_mixes_new_and_undated_legacy_rows() {
    let dir = tempfile::tempdir().unwrap();
    legacy_rows(
        dir.path(),
        &[
            ("old-a", Some("2025-03-05")),
            ("undated", None),
            ("old-b", Some("2025-01-01")),
        ],
    );
    let store = Arc::new(LazyStore::new(
        Location::Dir(dir.path().to_path_buf()),
        "costsdb",
        Some(2),
    ));
    let clock = Arc::new(StepClock {
        next: Mutex::new(at(2026, 3, 1, 9)),
        step: Duration::seconds(1),
    });
    let repo = CostRepository::with_clock(store, clock);
    let new = repo.insert(food(dec!(2), "new")).await.unwrap();
    assert_eq!(new.id, 4);

    let descs: Vec<String> = repo
        .find_recent(10)
        .await
        .unwrap()
        .into_iter()
        .map(|e| e.description)
        .collect();
    // Dated rows keep timestamp order among themselves; the undated row is
    // placed by id against its neighbours.
    assert_eq!(descs, vec!["new", "undated", "old-a", "old-b"]);

    let top = repo.find_recent(2).await.unwrap();
    assert_eq!(top[1].description, "undated");
}

//! Integration tests for `SqliteLedger` against in-memory and on-disk
//! databases.

use ledger_core::{Column, Fields, Filters, LedgerStore, Record, Row, Value};

use crate::{Error, LedgerConfig, SqliteLedger};

async fn ledger() -> SqliteLedger {
  let mut l = SqliteLedger::new(&LedgerConfig::in_memory()).expect("valid config");
  l.open().await.expect("in-memory ledger");
  l
}

fn entry(year: i64, month: i64, category: &str, value: i64) -> Fields {
  Fields::new()
    .with("year", year)
    .with("month", month)
    .with("category", category)
    .with("value", value)
}

async fn all(l: &SqliteLedger) -> Vec<Row> { l.select(&Filters::new()).await.unwrap() }

async fn by_id(l: &SqliteLedger, id: i64) -> Vec<Row> {
  l.select(&Filters::new().eq("id", id)).await.unwrap()
}

// ─── Lifecycle ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn open_and_close_are_idempotent() {
  let mut l = SqliteLedger::new(&LedgerConfig::in_memory()).unwrap();
  assert!(!l.is_open());

  l.open().await.unwrap();
  l.open().await.unwrap();
  assert!(l.is_open());

  l.close().await.unwrap();
  l.close().await.unwrap();
  assert!(!l.is_open());
}

#[tokio::test]
async fn operations_on_closed_ledger_fail() {
  let l = SqliteLedger::new(&LedgerConfig::in_memory()).unwrap();
  let err = l.select(&Filters::new()).await.unwrap_err();
  assert!(matches!(err, Error::NotOpen));

  let err = l.insert(&entry(2024, 1, "rent", 1)).await.unwrap_err();
  assert!(matches!(err, Error::NotOpen));
}

#[tokio::test]
async fn open_creates_table_once_and_keeps_rows() {
  let dir = tempfile::tempdir().unwrap();
  let config = LedgerConfig {
    db_path: dir.path().join("ledger.db"),
    ..LedgerConfig::default()
  };

  let mut l = SqliteLedger::new(&config).unwrap();
  l.open().await.unwrap();
  l.insert(&entry(2024, 3, "rent", 1200)).await.unwrap();
  l.close().await.unwrap();

  // Reopening finds the existing table rather than recreating it.
  let mut l = SqliteLedger::new(&config).unwrap();
  l.open().await.unwrap();
  assert_eq!(all(&l).await.len(), 1);
}

#[tokio::test]
async fn custom_schema_drives_table_creation() {
  let config = LedgerConfig {
    table:   "wallet".into(),
    columns: vec![Column::new("spent", "real"), Column::new("note", "text")],
    ..LedgerConfig::in_memory()
  };
  let mut l = SqliteLedger::new(&config).unwrap();
  l.open().await.unwrap();

  l.insert(&Fields::new().with("spent", 3.5).with("note", "coffee").with("year", 2024))
    .await
    .unwrap();

  let frame = l.frame(&Filters::new()).await.unwrap();
  assert_eq!(frame.columns, vec!["id", "spent", "note"]);
  assert_eq!(frame.rows[0][1], Value::Real(3.5));
}

#[tokio::test]
async fn invalid_table_name_is_rejected_up_front() {
  let config = LedgerConfig {
    table: "ledger; DROP TABLE x".into(),
    ..LedgerConfig::in_memory()
  };
  let err = SqliteLedger::new(&config).err().unwrap();
  assert!(matches!(err, Error::Core(ledger_core::Error::InvalidIdentifier(_))));
}

#[tokio::test]
async fn unknown_export_encoding_is_rejected_up_front() {
  let config = LedgerConfig {
    export_encoding: "ebcdic-martian".into(),
    ..LedgerConfig::in_memory()
  };
  let err = SqliteLedger::new(&config).err().unwrap();
  assert!(matches!(err, Error::Csv(ledger_csv::Error::UnknownEncoding(_))));
}

// ─── Insert ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_then_select_returns_recognised_subset() {
  let l = ledger().await;
  let fields = entry(2024, 3, "rent", 1200).with("tyy", 4);
  l.insert(&fields).await.unwrap();

  let rows = all(&l).await;
  assert_eq!(rows.len(), 1);
  let row = &rows[0];
  assert_eq!(row.get("year"), Some(&Value::Integer(2024)));
  assert_eq!(row.get("month"), Some(&Value::Integer(3)));
  assert_eq!(row.get("category"), Some(&Value::from("rent")));
  assert_eq!(row.get("value"), Some(&Value::Integer(1200)));
  assert_eq!(row.get("detail"), Some(&Value::Null));
  assert_eq!(row.get("memo"), Some(&Value::Null));
  assert!(row.get("tyy").is_none());
}

#[tokio::test]
async fn insert_without_recognised_fields_is_a_no_op() {
  let l = ledger().await;
  l.insert(&Fields::new()).await.unwrap();
  l.insert(&Fields::new().with("tyy", 4)).await.unwrap();
  assert!(all(&l).await.is_empty());
}

#[tokio::test]
async fn insert_assigns_fresh_ids() {
  let l = ledger().await;
  l.insert(&entry(2024, 1, "a", 1)).await.unwrap();
  l.insert(&entry(2024, 2, "b", 2)).await.unwrap();
  let ids: Vec<i64> = all(&l).await.iter().map(|r| r.id).collect();
  assert_eq!(ids.len(), 2);
  assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn ids_are_not_reused_after_delete() {
  let l = ledger().await;
  l.insert(&entry(2024, 1, "a", 1)).await.unwrap();
  l.insert(&entry(2024, 1, "b", 1)).await.unwrap();
  let last = all(&l).await.iter().map(|r| r.id).max().unwrap();

  l.delete(last).await.unwrap();
  l.insert(&entry(2024, 1, "c", 1)).await.unwrap();

  let newest = all(&l).await.iter().map(|r| r.id).max().unwrap();
  assert!(newest > last, "AUTOINCREMENT must not hand out {last} again");
}

#[tokio::test]
async fn hostile_text_is_stored_verbatim() {
  let l = ledger().await;
  let memo = "'); DROP TABLE ledger; --";
  l.insert(&Fields::new().with("memo", memo)).await.unwrap();

  let rows = l.select(&Filters::new().eq("memo", memo)).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].get("memo"), Some(&Value::from(memo)));
}

#[tokio::test]
async fn integer_affinity_converts_numeric_text() {
  let l = ledger().await;
  l.insert(&Fields::new().with("year", "2000").with("month", 12))
    .await
    .unwrap();

  let rows = l.select(&Filters::new().eq("year", 2000)).await.unwrap();
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].get("year"), Some(&Value::Integer(2000)));
}

// ─── Update / delete ─────────────────────────────────────────────────────────

#[tokio::test]
async fn update_changes_only_the_given_field() {
  let l = ledger().await;
  l.insert(&entry(2024, 3, "rent", 1200).with("memo", "march"))
    .await
    .unwrap();
  let before = all(&l).await.remove(0);

  let changed = l
    .update(before.id, &Fields::new().with("value", 1250))
    .await
    .unwrap();
  assert_eq!(changed, 1);

  let after = by_id(&l, before.id).await.remove(0);
  assert_eq!(after.get("value"), Some(&Value::Integer(1250)));

  let mut expected = before.fields.clone();
  expected.set("value", 1250);
  assert_eq!(after.fields, expected);
}

#[tokio::test]
async fn update_ignores_identity_and_unknown_keys() {
  let l = ledger().await;
  l.insert(&entry(2024, 3, "rent", 1200)).await.unwrap();
  let id = all(&l).await[0].id;

  let changed = l
    .update(id, &Fields::new().with("id", 999).with("bogus", 1))
    .await
    .unwrap();
  assert_eq!(changed, 0);
  assert_eq!(by_id(&l, id).await.len(), 1);
}

/// A missing id is not an error; the zero count is the only signal.
#[tokio::test]
async fn update_and_delete_of_missing_id_affect_nothing() {
  let l = ledger().await;
  l.insert(&entry(2024, 3, "rent", 1200)).await.unwrap();

  assert_eq!(l.update(4242, &Fields::new().with("value", 1)).await.unwrap(), 0);
  assert_eq!(l.delete(4242).await.unwrap(), 0);

  let rows = all(&l).await;
  assert_eq!(rows.len(), 1);
  assert_eq!(rows[0].get("value"), Some(&Value::Integer(1200)));
}

#[tokio::test]
async fn delete_removes_the_row() {
  let l = ledger().await;
  l.insert(&entry(2024, 3, "rent", 1200)).await.unwrap();
  l.insert(&entry(2024, 3, "food", 80)).await.unwrap();
  let id = all(&l).await[0].id;

  assert_eq!(l.delete(id).await.unwrap(), 1);
  assert!(by_id(&l, id).await.is_empty());
  assert_eq!(all(&l).await.len(), 1);
}

// ─── Select ──────────────────────────────────────────────────────────────────

async fn seeded() -> SqliteLedger {
  let l = ledger().await;
  for (y, m, c, v) in [
    (2024, 1, "A", 10),
    (2024, 1, "B", 20),
    (2024, 2, "C", 30),
    (2023, 12, "A", 40),
    (2023, 12, "B", 50),
  ] {
    l.insert(&entry(y, m, c, v)).await.unwrap();
  }
  l
}

fn values(rows: &[Row]) -> Vec<i64> {
  let mut vs: Vec<i64> = rows
    .iter()
    .filter_map(|r| r.get("value").and_then(Value::as_i64))
    .collect();
  vs.sort();
  vs
}

#[tokio::test]
async fn select_multi_value_is_union_of_equalities() {
  let l = seeded().await;

  let a = l.select(&Filters::new().eq("category", "A")).await.unwrap();
  let b = l.select(&Filters::new().eq("category", "B")).await.unwrap();
  let ab = l
    .select(&Filters::new().any("category", ["A", "B"]))
    .await
    .unwrap();

  let mut union = values(&a);
  union.extend(values(&b));
  union.sort();
  assert_eq!(values(&ab), union);
  assert_eq!(values(&ab), vec![10, 20, 40, 50]);
}

#[tokio::test]
async fn select_conjoins_distinct_keys() {
  let l = seeded().await;
  let rows = l
    .select(&Filters::new().eq("year", 2024).any("category", ["A", "C"]))
    .await
    .unwrap();
  assert_eq!(values(&rows), vec![10, 30]);
}

#[tokio::test]
async fn select_single_element_list_matches_scalar() {
  let l = seeded().await;
  let list = l.select(&Filters::new().any("month", [12])).await.unwrap();
  let scalar = l.select(&Filters::new().eq("month", 12)).await.unwrap();
  assert_eq!(list, scalar);
  assert_eq!(values(&list), vec![40, 50]);
}

#[tokio::test]
async fn select_ignores_unknown_filter_keys() {
  let l = seeded().await;
  let rows = l
    .select(&Filters::new().eq("colour", "red").eq("year", 2023))
    .await
    .unwrap();
  assert_eq!(values(&rows), vec![40, 50]);

  let rows = l.select(&Filters::new().eq("colour", "red")).await.unwrap();
  assert_eq!(rows.len(), 5);
}

#[tokio::test]
async fn select_all_counts_inserted_minus_deleted() {
  let l = seeded().await;
  let ids: Vec<i64> = all(&l).await.iter().map(|r| r.id).collect();
  l.delete(ids[0]).await.unwrap();
  l.delete(ids[3]).await.unwrap();
  assert_eq!(all(&l).await.len(), 3);
}

#[tokio::test]
async fn frame_puts_identity_first() {
  let l = seeded().await;
  let frame = l
    .frame(&Filters::new().eq("category", "C"))
    .await
    .unwrap();
  assert_eq!(frame.columns, vec![
    "id", "year", "month", "category", "detail", "value", "memo"
  ]);
  assert_eq!(frame.len(), 1);
  assert_eq!(frame.rows[0][5], Value::Integer(30));
}

// ─── Rent scenario ───────────────────────────────────────────────────────────

#[tokio::test]
async fn rent_insert_update_delete() {
  let l = ledger().await;
  l.insert(&entry(2024, 3, "rent", 1200)).await.unwrap();

  let rows = all(&l).await;
  assert_eq!(rows.len(), 1);
  let record = Record::try_from(&rows[0]).unwrap();
  assert_eq!(record.year, Some(2024));
  assert_eq!(record.month, Some(3));
  assert_eq!(record.category.as_deref(), Some("rent"));
  assert_eq!(record.value, Some(1200));
  assert_eq!(record.detail, None);
  assert_eq!(record.memo, None);

  l.update(record.id, &Fields::new().with("value", 1250))
    .await
    .unwrap();
  let updated = Record::try_from(&by_id(&l, record.id).await[0]).unwrap();
  assert_eq!(updated, Record { value: Some(1250), ..record.clone() });

  l.delete(record.id).await.unwrap();
  assert!(by_id(&l, record.id).await.is_empty());
}

// ─── Scoped use ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn scoped_closes_after_success() {
  let mut l = SqliteLedger::new(&LedgerConfig::in_memory()).unwrap();
  let n = l
    .scoped(|l| {
      Box::pin(async move {
        l.insert(&entry(2024, 3, "rent", 1200)).await?;
        Ok(l.select(&Filters::new()).await?.len())
      })
    })
    .await
    .unwrap();
  assert_eq!(n, 1);
  assert!(!l.is_open());
}

#[tokio::test]
async fn scoped_closes_after_error() {
  let mut l = SqliteLedger::new(&LedgerConfig::in_memory()).unwrap();
  let result: crate::Result<()> = l
    .scoped(|_| Box::pin(async move { Err(Error::NotOpen) }))
    .await;
  assert!(matches!(result, Err(Error::NotOpen)));
  assert!(!l.is_open());
}

#[tokio::test]
async fn session_opens_configured_file() {
  let dir = tempfile::tempdir().unwrap();
  let config = LedgerConfig {
    db_path: dir.path().join("ledger.db"),
    ..LedgerConfig::default()
  };

  SqliteLedger::session(&config, |l| {
    Box::pin(async move { l.insert(&entry(2024, 3, "rent", 1200)).await })
  })
  .await
  .unwrap();

  let rows = SqliteLedger::session(&config, |l| {
    Box::pin(async move { l.select(&Filters::new()).await })
  })
  .await
  .unwrap();
  assert_eq!(rows.len(), 1);
}

// ─── Export / import round trip ──────────────────────────────────────────────

#[tokio::test]
async fn export_then_import_reproduces_records() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("export.csv");

  let source = seeded().await;
  source
    .insert(&entry(2024, 4, "食費", 900).with("memo", "昼食, 外食"))
    .await
    .unwrap();
  let exported = source.export_csv(&Filters::new(), &path).await.unwrap();
  assert_eq!(exported.len(), 6);

  let bytes = std::fs::read(&path).unwrap();
  let payloads =
    ledger_csv::read_fields(&bytes, source.encoding(), source.table().schema(), None).unwrap();

  let target = ledger().await;
  for fields in &payloads {
    target.insert(fields).await.unwrap();
  }

  let strip = |rows: Vec<Row>| {
    let mut out: Vec<Fields> = rows.into_iter().map(|r| r.fields).collect();
    out.sort_by_key(|f| f.get("value").and_then(Value::as_i64));
    out
  };
  assert_eq!(strip(all(&target).await), strip(all(&source).await));
}

#[tokio::test]
async fn export_then_import_keeps_padded_text() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("export.csv");

  let source = ledger().await;
  source
    .insert(&entry(2024, 5, "rent", 1).with("memo", "  padded  "))
    .await
    .unwrap();
  source
    .insert(&entry(2024, 5, "rent", 2).with("memo", ""))
    .await
    .unwrap();
  source.export_csv(&Filters::new(), &path).await.unwrap();

  let bytes = std::fs::read(&path).unwrap();
  let payloads =
    ledger_csv::read_fields(&bytes, source.encoding(), source.table().schema(), None).unwrap();
  let target = ledger().await;
  for fields in &payloads {
    target.insert(fields).await.unwrap();
  }

  let memos: Vec<Value> = target
    .select(&Filters::new().eq("value", 1).eq("memo", "  padded  "))
    .await
    .unwrap()
    .into_iter()
    .filter_map(|r| r.get("memo").cloned())
    .collect();
  assert_eq!(memos, vec![Value::from("  padded  ")]);

  // An empty string has no distinct CSV spelling and comes back as NULL.
  let empty = target.select(&Filters::new().eq("value", 2)).await.unwrap();
  assert_eq!(empty[0].get("memo"), Some(&Value::Null));
}

mod support;

use ggr_core::SummaryScope;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use support::{day, make_record, setup_db};

#[test]
fn insert_records_skips_duplicate_keys() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    let records = vec![
        make_record("2024-06-01", "alice", "1", "EUR", dec!(1), dec!(10), dec!(5), 3),
        make_record("2024-06-01", "bob", "2", "EUR", dec!(1), dec!(20), dec!(5), 4),
    ];

    let first = db.insert_records(&records).expect("insert");
    assert_eq!(first.inserted, 2);
    assert_eq!(first.skipped, 0);

    let mut changed = records[0].clone();
    changed.bet = dec!(999);
    let second = db.insert_records(&[changed]).expect("insert again");
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 1);

    assert_eq!(db.count_records().expect("count"), 2);
    let stored = db
        .qualifying_records(SummaryScope::Date(day("2024-06-01")))
        .expect("records");
    assert_eq!(stored[0].bet, dec!(10));
}

#[test]
fn record_exists_matches_full_key() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    db.insert_records(&[make_record(
        "2024-06-01", "alice", "1", "EUR", dec!(1), dec!(10), dec!(5), 3,
    )])
    .expect("insert");

    assert!(db.record_exists(day("2024-06-01"), "alice", "1").expect("exists"));
    assert!(!db.record_exists(day("2024-06-01"), "alice", "2").expect("other id"));
    assert!(!db.record_exists(day("2024-06-02"), "alice", "1").expect("other day"));
}

#[test]
fn qualifying_records_drop_zero_rates() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    db.insert_records(&[
        make_record("2024-06-01", "alice", "1", "EUR", dec!(1), dec!(10), dec!(5), 3),
        make_record("2024-06-01", "carol", "3", "XYZ", Decimal::ZERO, dec!(50), dec!(0), 9),
        make_record("2024-06-02", "bob", "2", "USD", dec!(0.92), dec!(20), dec!(5), 4),
    ])
    .expect("insert");

    let all = db.qualifying_records(SummaryScope::All).expect("all");
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|record| record.fx_rate > Decimal::ZERO));
    assert_eq!(all[0].date, day("2024-06-01"));

    let june_first = db
        .qualifying_records(SummaryScope::Date(day("2024-06-01")))
        .expect("one day");
    assert_eq!(june_first.len(), 1);
    assert_eq!(june_first[0].username, "alice");
}

#[test]
fn tiny_rates_still_qualify() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    db.insert_records(&[make_record(
        "2024-06-01",
        "dave",
        "4",
        "GC",
        dec!(0.0000000001),
        dec!(1000),
        dec!(0),
        1,
    )])
    .expect("insert");

    let all = db.qualifying_records(SummaryScope::All).expect("all");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].bet_eur, dec!(0.0000001000));
}

#[test]
fn date_bounds_and_latest_qualifying_date() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    assert_eq!(db.record_date_bounds().expect("empty bounds"), None);
    assert_eq!(db.latest_qualifying_date().expect("empty latest"), None);

    db.insert_records(&[
        make_record("2024-06-01", "alice", "1", "EUR", dec!(1), dec!(10), dec!(5), 3),
        make_record("2024-06-03", "bob", "2", "USD", dec!(0.92), dec!(20), dec!(5), 4),
        make_record("2024-06-05", "carol", "3", "XYZ", Decimal::ZERO, dec!(1), dec!(0), 1),
    ])
    .expect("insert");

    assert_eq!(
        db.record_date_bounds().expect("bounds"),
        Some((day("2024-06-01"), day("2024-06-05")))
    );
    assert_eq!(
        db.latest_qualifying_date().expect("latest"),
        Some(day("2024-06-03"))
    );
}

#[test]
fn distinct_players_counts_account_ids() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    db.insert_records(&[
        make_record("2024-06-01", "alice", "1", "EUR", dec!(1), dec!(10), dec!(5), 3),
        make_record("2024-06-02", "alice", "1", "EUR", dec!(1), dec!(10), dec!(5), 3),
        make_record("2024-06-02", "bob", "2", "EUR", dec!(1), dec!(10), dec!(5), 3),
        make_record("2024-06-02", "carol", "3", "XYZ", Decimal::ZERO, dec!(10), dec!(5), 3),
    ])
    .expect("insert");

    assert_eq!(db.distinct_players(None).expect("all"), 2);
    assert_eq!(db.distinct_players(Some(day("2024-06-02"))).expect("day"), 2);
    assert_eq!(db.distinct_players(Some(day("2024-06-01"))).expect("day"), 1);
}

#[test]
fn unresolved_rows_are_counted_only_when_stored() {
    let mut test_db = setup_db();
    let db = &mut test_db.db;
    let unresolved = make_record("2024-06-01", "carol", "3", "XYZ", Decimal::ZERO, dec!(70), dec!(10), 5);
    let outcome = db
        .insert_records(&[
            unresolved.clone(),
            unresolved,
            make_record("2024-06-01", "dave", "4", "EUR", dec!(1), dec!(30), dec!(15), 5),
        ])
        .expect("insert");
    assert_eq!(outcome.inserted, 2);
    assert_eq!(outcome.skipped, 1);
    assert_eq!(outcome.unresolved_rows, 1);
    assert!(outcome.unresolved_currencies.contains("XYZ"));

    let again = db
        .insert_records(&[make_record("2024-06-01", "carol", "3", "XYZ", Decimal::ZERO, dec!(1), dec!(1), 1)])
        .expect("insert again");
    assert_eq!(again.skipped, 1);
    assert_eq!(again.unresolved_rows, 0);
    assert!(again.unresolved_currencies.is_empty());
}

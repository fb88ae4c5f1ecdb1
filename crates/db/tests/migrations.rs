use rusqlite::Connection;

fn table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
        .expect("prepare");
    stmt.query_map([], |row| row.get::<_, String>(0))
        .expect("query")
        .collect::<Result<Vec<_>, _>>()
        .expect("collect")
}

#[test]
fn migrate_creates_all_tables() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("fresh.sqlite");
    let mut db = ggr_db::Db::open(&db_path).expect("open db");
    db.migrate().expect("migrate db");

    let conn = Connection::open(&db_path).expect("open conn");
    assert_eq!(
        table_names(&conn),
        vec!["consolidated_record", "daily_summary", "exchange_rate"]
    );
}

#[test]
fn migrate_is_repeatable_and_keeps_rows() {
    let dir = tempfile::tempdir().expect("temp dir");
    let db_path = dir.path().join("repeat.sqlite");
    {
        let conn = Connection::open(&db_path).expect("open conn");
        let migration = include_str!("../migrations/0001_init.sql");
        conn.execute_batch(migration).expect("migrate 0001");
        conn.execute(
            r#"
            INSERT INTO exchange_rate (currency, rate, date_fetched)
            VALUES ('GBP', '0.85', '2024-06-01')
            "#,
            [],
        )
        .expect("insert rate");
    }

    let mut db = ggr_db::Db::open(&db_path).expect("open db");
    db.migrate().expect("first migrate");
    db.migrate().expect("second migrate");

    let conn = Connection::open(&db_path).expect("open conn");
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM exchange_rate", [], |row| row.get(0))
        .expect("count rates");
    assert_eq!(count, 1);
    assert!(table_names(&conn).contains(&"daily_summary".to_string()));
}

#[test]
fn migrations_are_listed_in_order() {
    let names: Vec<&str> = ggr_db::MIGRATIONS.iter().map(|(name, _)| *name).collect();
    assert_eq!(names, vec!["0001_init", "0002_daily_summary"]);
}

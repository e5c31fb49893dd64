#![allow(dead_code)]

pub mod fakes;

use rusqlite::Connection;
use votebox_core::db::open_db_in_memory;
use votebox_core::{CatalogRepository, EntrySeed, SqliteCatalogRepository};

pub fn seed(id: i64, name: &str) -> EntrySeed {
    EntrySeed {
        id,
        name: name.to_string(),
        description: String::new(),
        image: None,
        votes: None,
    }
}

pub fn seed_entries(conn: &mut Connection, ids: &[i64]) {
    let seeds = ids
        .iter()
        .map(|id| seed(*id, &format!("project {id}")))
        .collect::<Vec<_>>();
    SqliteCatalogRepository::new(conn)
        .seed_entries(&seeds)
        .unwrap();
}

pub fn conn_with_entries(ids: &[i64]) -> Connection {
    let mut conn = open_db_in_memory().unwrap();
    seed_entries(&mut conn, ids);
    conn
}

pub fn ledger_rows(conn: &Connection) -> Vec<(i64, String)> {
    let mut stmt = conn
        .prepare("SELECT entry_id, identity FROM vote_records ORDER BY id;")
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))
        .unwrap();
    rows.map(Result::unwrap).collect()
}

pub fn votes_of(conn: &Connection, entry_id: i64) -> i64 {
    conn.query_row(
        "SELECT votes FROM entries WHERE id = ?1;",
        [entry_id],
        |row| row.get(0),
    )
    .unwrap()
}

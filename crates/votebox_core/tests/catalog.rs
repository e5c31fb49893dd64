mod common;

use common::seed;
use votebox_core::db::open_db_in_memory;
use votebox_core::{
    CatalogRepository, CatalogSeed, EntrySeed, RepoError, SqliteCatalogRepository,
    SqliteTallyStore, TallyStore,
};

#[test]
fn seed_then_list_keeps_file_order() {
    let mut conn = open_db_in_memory().unwrap();
    let mut catalog = SqliteCatalogRepository::new(&mut conn);

    let inserted = catalog
        .seed_entries(&[seed(20, "drone"), seed(3, "greenhouse"), seed(11, "rover")])
        .unwrap();
    assert_eq!(inserted, 3);

    let ids = catalog
        .list_entries()
        .unwrap()
        .into_iter()
        .map(|entry| entry.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![20, 3, 11]);
}

#[test]
fn reseeding_updates_metadata_but_keeps_running_tally() {
    let mut conn = open_db_in_memory().unwrap();
    SqliteCatalogRepository::new(&mut conn)
        .seed_entries(&[seed(1, "old name")])
        .unwrap();
    SqliteTallyStore::new(&conn).increment(1).unwrap();

    let mut catalog = SqliteCatalogRepository::new(&mut conn);
    let inserted = catalog
        .seed_entries(&[EntrySeed {
            id: 1,
            name: "new name".to_string(),
            description: "now with solar".to_string(),
            image: Some("img/1.png".to_string()),
            votes: Some(99),
        }])
        .unwrap();
    assert_eq!(inserted, 0);

    let entry = catalog.get_entry(1).unwrap().unwrap();
    assert_eq!(entry.name, "new name");
    assert_eq!(entry.description, "now with solar");
    assert_eq!(entry.image.as_deref(), Some("img/1.png"));
    assert_eq!(entry.votes, 1);
}

#[test]
fn seed_file_votes_apply_to_new_entries() {
    let mut conn = open_db_in_memory().unwrap();
    let seed = CatalogSeed::from_json(
        r#"{"projects":[{"id":1,"name":"kiln","description":"","image":null,"votes":4}]}"#,
    )
    .unwrap();

    let mut catalog = SqliteCatalogRepository::new(&mut conn);
    catalog.seed_entries(&seed.projects).unwrap();
    assert_eq!(catalog.get_entry(1).unwrap().unwrap().votes, 4);
}

#[test]
fn remove_entry_reports_missing_ids() {
    let mut conn = open_db_in_memory().unwrap();
    let mut catalog = SqliteCatalogRepository::new(&mut conn);
    catalog.seed_entries(&[seed(1, "lamp")]).unwrap();

    catalog.remove_entry(1).unwrap();
    assert!(catalog.get_entry(1).unwrap().is_none());
    assert!(matches!(catalog.remove_entry(1), Err(RepoError::NotFound(1))));
}

#[test]
fn entry_serializes_with_public_field_names() {
    let mut conn = open_db_in_memory().unwrap();
    let mut catalog = SqliteCatalogRepository::new(&mut conn);
    catalog.seed_entries(&[seed(5, "bridge")]).unwrap();

    let entry = catalog.get_entry(5).unwrap().unwrap();
    let json = serde_json::to_value(&entry).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "id": 5,
            "name": "bridge",
            "description": "",
            "image": null,
            "votes": 0
        })
    );
}

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};

use travellist_core::db::{open_db, open_db_in_memory};
use travellist_core::{
    share_text, NewTravel, SqliteTravelTable, StoreError, TravelFields, TravelOrder, TravelRecord,
    TravelStore,
};

fn fields(city: &str, country: &str, year: i32) -> TravelFields {
    TravelFields::new(city, country, year)
}

#[test]
fn first_auto_insert_on_empty_store_gets_id_one() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    let id = store
        .insert(&NewTravel::auto(fields("Paris", "France", 2019)))
        .unwrap();
    assert_eq!(id, 1);
}

#[test]
fn insert_then_get_roundtrips_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    let input = fields("Valparaiso", "Chile", 2016).with_note("murals everywhere");
    let id = store.insert(&NewTravel::auto(input.clone())).unwrap();

    let loaded = store.get_by_id(id).unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.fields(), input);
}

#[test]
fn explicit_id_is_used_as_is_and_auto_ids_continue_after_it() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    let explicit = store
        .insert(&NewTravel::with_id(41, fields("Reykjavik", "Iceland", 2018)))
        .unwrap();
    let next = store
        .insert(&NewTravel::auto(fields("Akureyri", "Iceland", 2018)))
        .unwrap();

    assert_eq!(explicit, 41);
    assert_eq!(next, 42);

    let err = store
        .insert(&NewTravel::with_id(41, fields("Vik", "Iceland", 2019)))
        .unwrap_err();
    assert!(matches!(err, StoreError::Constraint { id: 41 }));
}

#[test]
fn delete_is_idempotent() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    let keep = store
        .insert(&NewTravel::auto(fields("Seoul", "South Korea", 2022)))
        .unwrap();
    let gone = store
        .insert(&NewTravel::auto(fields("Busan", "South Korea", 2022)))
        .unwrap();

    store.delete(gone).unwrap();
    let after_first = store.list_all().unwrap();
    store.delete(gone).unwrap();
    let after_second = store.list_all().unwrap();

    assert_eq!(after_first, after_second);
    assert_eq!(after_second.len(), 1);
    assert_eq!(after_second[0].id, keep);
}

#[test]
fn update_preserves_identity() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    let id = store
        .insert(&NewTravel::auto(fields("Krakow", "Poland", 2011)))
        .unwrap();
    let replacement = fields("Gdansk", "Poland", 2012).with_note("amber");
    store.update(id, &replacement).unwrap();

    let loaded = store.get_by_id(id).unwrap();
    assert_eq!(loaded, TravelRecord::from_parts(id, replacement));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn update_of_missing_record_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    let err = store
        .update(999, &fields("Nowhere", "Atlantis", 2000))
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(999)));
}

#[test]
fn get_of_missing_record_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    assert!(matches!(store.get_by_id(5), Err(StoreError::NotFound(5))));
}

#[test]
fn list_all_orders_by_year_descending() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    for (city, year) in [("Austin", 2010), ("Boston", 2020), ("Chicago", 2015)] {
        store
            .insert(&NewTravel::auto(fields(city, "USA", year)))
            .unwrap();
    }

    let years: Vec<i32> = store
        .list_all()
        .unwrap()
        .into_iter()
        .map(|record| record.year)
        .collect();
    assert_eq!(years, vec![2020, 2015, 2010]);
}

#[test]
fn equal_years_keep_insertion_order_even_with_explicit_ids() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    store
        .insert(&NewTravel::with_id(50, fields("Split", "Croatia", 2017)))
        .unwrap();
    store
        .insert(&NewTravel::with_id(7, fields("Zadar", "Croatia", 2017)))
        .unwrap();
    store
        .insert(&NewTravel::auto(fields("Pula", "Croatia", 2017)))
        .unwrap();

    let ids: Vec<i64> = store
        .list_all()
        .unwrap()
        .into_iter()
        .map(|record| record.id)
        .collect();
    assert_eq!(ids, vec![50, 7, 51]);
}

#[test]
fn list_all_is_a_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    store
        .insert(&NewTravel::auto(fields("Lyon", "France", 2014)))
        .unwrap();
    let snapshot = store.list_all().unwrap();
    store
        .insert(&NewTravel::auto(fields("Nice", "France", 2015)))
        .unwrap();

    assert_eq!(snapshot.len(), 1);
    assert_eq!(store.list_all().unwrap().len(), 2);
}

#[test]
fn query_cursor_supports_ascending_year() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    store
        .insert(&NewTravel::auto(fields("Perth", "Australia", 2021)))
        .unwrap();
    store
        .insert(&NewTravel::auto(fields("Hobart", "Australia", 2004)))
        .unwrap();

    let mut cursor = store.query(TravelOrder::year_asc()).unwrap();
    let years: Vec<i32> = cursor
        .records()
        .unwrap()
        .map(|record| record.unwrap().year)
        .collect();
    assert_eq!(years, vec![2004, 2021]);
}

#[test]
fn paris_insert_list_delete_scenario() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    let id = store
        .insert(&NewTravel::auto(
            fields("Paris", "France", 2019).with_note(""),
        ))
        .unwrap();
    assert_eq!(id, 1);

    let listed = store.list_all().unwrap();
    assert_eq!(
        listed,
        vec![TravelRecord {
            id: 1,
            city: "Paris".to_string(),
            country: "France".to_string(),
            year: 2019,
            note: None,
        }]
    );
    assert_eq!(
        share_text(&listed[0]),
        "Paris (France)\nYear: 2019\nNote: (no note)"
    );

    store.delete(1).unwrap();
    assert!(store.list_all().unwrap().is_empty());
}

#[test]
fn concurrent_auto_inserts_from_separate_connections_get_distinct_ids() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("concurrent.db");
    drop(open_db(&path).unwrap());

    let writers: Vec<_> = (0..4)
        .map(|writer| {
            let path = path.clone();
            thread::spawn(move || {
                let conn = open_db(&path).unwrap();
                let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());
                (0..25)
                    .map(|n| {
                        store
                            .insert(&NewTravel::auto(fields(
                                &format!("City {writer}-{n}"),
                                "Testland",
                                2000 + n,
                            )))
                            .unwrap()
                    })
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for writer in writers {
        for id in writer.join().unwrap() {
            assert!(ids.insert(id), "duplicate id {id}");
        }
    }
    assert_eq!(ids.len(), 100);
    assert_eq!(ids.iter().copied().max(), Some(100));
}

#[test]
fn writes_on_read_only_database_fail_with_storage_io() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("travels.db");
    {
        let conn = open_db(&path).unwrap();
        let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());
        store
            .insert(&NewTravel::auto(fields("Porto", "Portugal", 2017)))
            .unwrap();
    }

    let conn = Connection::open_with_flags(&path, OpenFlags::SQLITE_OPEN_READ_ONLY).unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    let auto = store.insert(&NewTravel::auto(fields("Braga", "Portugal", 2018)));
    assert!(matches!(auto, Err(StoreError::StorageIo(_))), "{auto:?}");

    let explicit = store.insert(&NewTravel::with_id(3, fields("Faro", "Portugal", 2019)));
    assert!(matches!(explicit, Err(StoreError::StorageIo(_))), "{explicit:?}");

    let update = store.update(1, &fields("Lisbon", "Portugal", 2017));
    assert!(matches!(update, Err(StoreError::StorageIo(_))), "{update:?}");

    let delete = store.delete(1);
    assert!(matches!(delete, Err(StoreError::StorageIo(_))), "{delete:?}");

    assert_eq!(store.get_by_id(1).unwrap().city, "Porto");
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn auto_insert_after_largest_id_is_rejected_without_writing() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    store
        .insert(&NewTravel::with_id(i64::MAX, fields("Cusco", "Peru", 2014)))
        .unwrap();
    let err = store
        .insert(&NewTravel::auto(fields("Lima", "Peru", 2014)))
        .unwrap_err();

    assert!(matches!(err, StoreError::InvalidRequest(_)), "{err:?}");
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn edit_holds_write_lock_between_read_and_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("travels.db");
    let conn = open_db(&path).unwrap();
    let other_conn = open_db(&path).unwrap();
    other_conn.busy_timeout(Duration::ZERO).unwrap();

    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());
    let other = TravelStore::new(SqliteTravelTable::try_new(&other_conn).unwrap());
    let id = store
        .insert(&NewTravel::auto(fields("Kyoto", "Japan", 2019)))
        .unwrap();

    let mut concurrent = None;
    let edited = store
        .edit(id, |current| {
            concurrent = Some(other.update(id, &fields("Osaka", "Japan", 2019)));
            current.with_note("temples")
        })
        .unwrap();

    assert!(matches!(concurrent, Some(Err(StoreError::StorageIo(_)))));
    assert_eq!(edited.city, "Kyoto");
    assert_eq!(edited.note.as_deref(), Some("temples"));
    assert_eq!(other.get_by_id(id).unwrap(), edited);
}

#[test]
fn edit_of_missing_record_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let store = TravelStore::new(SqliteTravelTable::try_new(&conn).unwrap());

    let err = store.edit(7, |current| current).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(7)));
}

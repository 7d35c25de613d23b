use chrono::NaiveDate;
use people_core::db::open_db_in_memory;
use people_core::{NewPerson, PersonRepository, RepoError, SqlitePersonRepository};
use std::collections::HashSet;

#[test]
fn create_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);

    let date = NaiveDate::from_ymd_opt(1906, 12, 9).unwrap();
    let id = repo
        .create_person(&NewPerson::new("Grace").with_date(date))
        .unwrap();

    let loaded = repo.get_person(id).unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.name, "Grace");
    assert_eq!(loaded.date, Some(date));
}

#[test]
fn get_missing_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);

    assert!(repo.get_person(42).unwrap().is_none());
}

#[test]
fn list_on_empty_store_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);

    assert!(repo.list_people().unwrap().is_empty());
    assert_eq!(repo.count_people().unwrap(), 0);
}

#[test]
fn list_returns_rows_in_id_order_with_distinct_ids() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);

    for name in ["Ada", "Grace", "Edsger"] {
        repo.create_person(&NewPerson::new(name)).unwrap();
    }

    let people = repo.list_people().unwrap();
    let names: Vec<_> = people.iter().map(|person| person.name.as_str()).collect();
    assert_eq!(names, vec!["Ada", "Grace", "Edsger"]);

    let ids: HashSet<_> = people.iter().map(|person| person.id).collect();
    assert_eq!(ids.len(), 3);
    assert!(people.windows(2).all(|pair| pair[0].id < pair[1].id));
}

#[test]
fn ids_are_not_reused_after_row_removal() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);

    let first = repo.create_person(&NewPerson::new("Ada")).unwrap();
    conn.execute("DELETE FROM people WHERE id = ?1;", [first])
        .unwrap();
    let second = repo.create_person(&NewPerson::new("Grace")).unwrap();

    assert!(second > first);
}

#[test]
fn validation_failure_blocks_create() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);

    let err = repo.create_person(&NewPerson::new("")).unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    let err = repo
        .create_person(&NewPerson::new("x".repeat(101)))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));

    assert_eq!(repo.count_people().unwrap(), 0);
}

#[test]
fn corrupt_date_row_is_reported_not_masked() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqlitePersonRepository::new(&conn);

    conn.execute(
        "INSERT INTO people (name, date) VALUES ('Ada', 'last tuesday');",
        [],
    )
    .unwrap();

    let err = repo.list_people().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(ref msg) if msg.contains("last tuesday")));
}

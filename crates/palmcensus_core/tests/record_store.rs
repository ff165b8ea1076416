use chrono::{DateTime, Duration, TimeZone, Utc};
use palmcensus_core::db::open_db_in_memory;
use palmcensus_core::{
    CensusData, CensusOperation, CensusType, Company, MemoryRecordStore, PalmTree, Productivity,
    RecordStore, RepoError, SqliteRecordStore, TreeStatus,
};
use rusqlite::Connection;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
}

fn operation(id: &str, date: DateTime<Utc>) -> CensusOperation {
    CensusOperation {
        operation_id: id.to_string(),
        date,
        entity: "Blok A".to_string(),
        census_type: CensusType::FlowerAndFruit,
        tree_image_url: Some("img/a.png".to_string()),
        hectare_covered: 20.5,
        prediction_result: Some("Prediksi hasil: 90 ton".to_string()),
        action_recommendation: None,
        created_at: base_time(),
    }
}

fn tree(id: &str, productivity: Productivity) -> PalmTree {
    PalmTree {
        tree_id: id.to_string(),
        latitude: -6.85,
        longitude: 106.93,
        status: TreeStatus::Diseased,
        productivity,
        health_score: 0.55,
        last_census_date: Some(base_time() - Duration::days(3)),
        created_at: base_time(),
    }
}

fn check_round_trips<S: RecordStore>(store: &S) {
    let op = operation("OP-1", base_time());
    store.insert_operation(&op).unwrap();
    assert_eq!(store.recent_operations(10).unwrap(), vec![op]);

    let mut data = CensusData::empty("OP-1", base_time());
    data.red_fruit = 42;
    data.land_area_census = 12.25;
    store.insert_measurement(&data).unwrap();
    assert_eq!(store.measurement_for_operation("OP-1").unwrap(), Some(data));
    assert_eq!(store.measurement_for_operation("OP-2").unwrap(), None);

    let stored_tree = tree("TREE-1", Productivity::Unproductive);
    store.insert_tree(&stored_tree).unwrap();
    assert_eq!(store.list_trees().unwrap(), vec![stored_tree]);
}

fn check_ordering<S: RecordStore>(store: &S) {
    let t = base_time();
    store.insert_operation(&operation("OP-old", t - Duration::days(2))).unwrap();
    store.insert_operation(&operation("OP-tie-first", t)).unwrap();
    store.insert_operation(&operation("OP-tie-second", t)).unwrap();
    store.insert_operation(&operation("OP-mid", t - Duration::days(1))).unwrap();

    let ids: Vec<String> = store
        .recent_operations(3)
        .unwrap()
        .into_iter()
        .map(|op| op.operation_id)
        .collect();
    assert_eq!(ids, vec!["OP-tie-first", "OP-tie-second", "OP-mid"]);

    let mut first = CensusData::empty("OP-old", t);
    first.male_flower = 1;
    let mut second = CensusData::empty("OP-mid", t);
    second.male_flower = 2;
    store.insert_measurement(&first).unwrap();
    store.insert_measurement(&second).unwrap();
    assert_eq!(store.latest_measurement().unwrap().unwrap().male_flower, 2);
}

fn check_sub_millisecond_times_are_truncated<S: RecordStore>(store: &S) {
    let t = base_time() + Duration::microseconds(1_250);
    let millis = base_time() + Duration::milliseconds(1);

    // Both dates fall in the same millisecond and tie on insertion order.
    store.insert_operation(&operation("OP-first", t)).unwrap();
    store
        .insert_operation(&operation("OP-second", t + Duration::microseconds(400)))
        .unwrap();
    let stored = store.recent_operations(10).unwrap();
    let ids: Vec<&str> = stored.iter().map(|op| op.operation_id.as_str()).collect();
    assert_eq!(ids, vec!["OP-first", "OP-second"]);
    assert!(stored.iter().all(|op| op.date == millis));

    let mut data = CensusData::empty("OP-first", t);
    data.red_fruit = 7;
    store.insert_measurement(&data).unwrap();
    let read_back = store.measurement_for_operation("OP-first").unwrap().unwrap();
    assert_eq!(read_back.created_at, millis);

    let mut precise = tree("TREE-1", Productivity::Productive);
    precise.last_census_date = Some(t);
    precise.created_at = t;
    store.insert_tree(&precise).unwrap();
    let trees = store.list_trees().unwrap();
    assert_eq!(trees[0].last_census_date, Some(millis));
    assert_eq!(trees[0].created_at, millis);
}

fn check_conflicts<S: RecordStore>(store: &S) {
    store.insert_operation(&operation("OP-1", base_time())).unwrap();
    let dup = store.insert_operation(&operation("OP-1", base_time())).unwrap_err();
    assert!(matches!(dup, RepoError::Conflict(_)), "{dup}");

    store
        .insert_measurement(&CensusData::empty("OP-1", base_time()))
        .unwrap();
    let second = store
        .insert_measurement(&CensusData::empty("OP-1", base_time()))
        .unwrap_err();
    assert!(matches!(second, RepoError::Conflict(_)), "{second}");

    let orphan = store
        .insert_measurement(&CensusData::empty("OP-missing", base_time()))
        .unwrap_err();
    assert!(matches!(orphan, RepoError::Conflict(_)), "{orphan}");

    store.insert_tree(&tree("TREE-1", Productivity::Productive)).unwrap();
    let dup_tree = store
        .insert_tree(&tree("TREE-1", Productivity::Productive))
        .unwrap_err();
    assert!(matches!(dup_tree, RepoError::Conflict(_)));
}

fn check_validation<S: RecordStore>(store: &S) {
    let mut bad = tree("TREE-bad", Productivity::Productive);
    bad.health_score = 1.5;
    assert!(matches!(
        store.insert_tree(&bad).unwrap_err(),
        RepoError::Validation(_)
    ));
    assert_eq!(store.count_trees(None).unwrap(), 0);
}

fn check_company_upsert<S: RecordStore>(store: &S) {
    assert!(store.company().unwrap().is_none());

    let first = store.ensure_company(&Company::sample_profile()).unwrap();
    assert!(first.created);

    let mut other = Company::default_profile();
    other.name = "PT Lain".to_string();
    let second = store.ensure_company(&other).unwrap();
    assert!(!second.created);
    assert_eq!(second.company.name, first.company.name);
    assert_eq!(second.company.established_date, first.company.established_date);
    assert_eq!(store.count_companies().unwrap(), 1);
}

fn check_tree_counts<S: RecordStore>(store: &S) {
    store.insert_tree(&tree("T1", Productivity::Productive)).unwrap();
    store.insert_tree(&tree("T2", Productivity::Unproductive)).unwrap();
    store.insert_tree(&tree("T3", Productivity::Productive)).unwrap();
    assert_eq!(store.count_trees(None).unwrap(), 3);
    assert_eq!(store.count_trees(Some(Productivity::Productive)).unwrap(), 2);
    assert_eq!(store.count_trees(Some(Productivity::Unproductive)).unwrap(), 1);
}

fn check_failed_transaction_rolls_back<S: RecordStore>(store: &S) {
    let result: Result<(), RepoError> = store.in_exclusive_transaction(|store| {
        store.insert_tree(&tree("T1", Productivity::Productive))?;
        store.insert_tree(&tree("T1", Productivity::Productive))
    });
    assert!(result.is_err());
    assert_eq!(store.count_trees(None).unwrap(), 0);
}

macro_rules! on_both_stores {
    ($name:ident, $check:ident) => {
        #[test]
        fn $name() {
            let conn = open_db_in_memory().unwrap();
            $check(&SqliteRecordStore::try_new(&conn).unwrap());
            $check(&MemoryRecordStore::new());
        }
    };
}

on_both_stores!(records_round_trip, check_round_trips);
on_both_stores!(operations_order_by_date_then_insertion, check_ordering);
on_both_stores!(
    sub_millisecond_times_are_truncated,
    check_sub_millisecond_times_are_truncated
);
on_both_stores!(uniqueness_and_join_key_conflicts, check_conflicts);
on_both_stores!(invalid_records_are_rejected, check_validation);
on_both_stores!(company_upsert_keeps_first_row, check_company_upsert);
on_both_stores!(tree_counts_filter_by_productivity, check_tree_counts);
on_both_stores!(failed_transaction_rolls_back, check_failed_transaction_rolls_back);

#[test]
fn sqlite_store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();
    let err = SqliteRecordStore::try_new(&conn).err().expect("must reject");
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn sqlite_store_rejects_corrupt_rows_on_read() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch(
        "INSERT INTO palm_trees (tree_id, latitude, longitude, status, productivity, health_score, created_at)
         VALUES ('T1', 0.0, 0.0, 'burnt', 'productive', 0.5, 0);",
    )
    .unwrap();

    let store = SqliteRecordStore::try_new(&conn).unwrap();
    let err = store.list_trees().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("burnt")));
}

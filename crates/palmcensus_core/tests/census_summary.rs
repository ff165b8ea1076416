use chrono::{DateTime, Duration, TimeZone, Utc};
use palmcensus_core::db::open_db_in_memory;
use palmcensus_core::{
    predict_yield, summarize_recent_census, CensusData, CensusOperation, CensusSummary,
    CensusType, MemoryRecordStore, PredictionConfig, RecordStore, SqliteRecordStore,
};

fn day(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 30, 7, 0, 0).unwrap() - Duration::days(offset)
}

fn add_operation<S: RecordStore>(store: &S, id: &str, date: DateTime<Utc>) {
    store
        .insert_operation(&CensusOperation {
            operation_id: id.to_string(),
            date,
            entity: "Blok B".to_string(),
            census_type: CensusType::FlowerAndFruit,
            tree_image_url: None,
            hectare_covered: 15.0,
            prediction_result: None,
            action_recommendation: None,
            created_at: day(0),
        })
        .unwrap();
}

fn add_measurement<S: RecordStore>(store: &S, id: &str, base: u32, area: f64) {
    store
        .insert_measurement(&CensusData {
            operation_id: id.to_string(),
            male_flower: base,
            female_flower: base * 2,
            purse_flower: base * 3,
            red_fruit: base * 4,
            black_fruit: base * 5,
            total_palm_trees: 999,
            productive_trees: 999,
            unproductive_trees: 999,
            land_area_census: area,
            created_at: day(0),
        })
        .unwrap();
}

fn check_empty_store<S: RecordStore>(store: &S) {
    let summary = summarize_recent_census(store, 5).unwrap();
    assert_eq!(summary, CensusSummary::default());
}

fn check_sums_only_most_recent<S: RecordStore>(store: &S) {
    for (offset, base) in [(0, 1), (1, 10), (2, 100), (3, 1000)] {
        let id = format!("OP-{offset}");
        add_operation(store, &id, day(offset));
        add_measurement(store, &id, base, offset as f64 + 0.5);
    }

    let summary = summarize_recent_census(store, 3).unwrap();
    assert_eq!(summary.operations_count, 3);
    assert_eq!(summary.male_flower, 111);
    assert_eq!(summary.female_flower, 222);
    assert_eq!(summary.purse_flower, 333);
    assert_eq!(summary.red_fruit, 444);
    assert_eq!(summary.black_fruit, 555);
    assert!((summary.land_area_census - 4.5).abs() < 1e-9);
}

fn check_limit_above_available<S: RecordStore>(store: &S) {
    add_operation(store, "OP-a", day(1));
    add_measurement(store, "OP-a", 2, 1.0);
    add_operation(store, "OP-b", day(2));
    add_measurement(store, "OP-b", 3, 2.0);

    let summary = summarize_recent_census(store, 5).unwrap();
    assert_eq!(summary.operations_count, 2);
    assert_eq!(summary.male_flower, 5);
}

fn check_missing_measurement_counts_as_zero<S: RecordStore>(store: &S) {
    add_operation(store, "OP-with", day(1));
    add_measurement(store, "OP-with", 7, 3.0);
    add_operation(store, "OP-without", day(0));

    let summary = summarize_recent_census(store, 5).unwrap();
    assert_eq!(summary.operations_count, 2);
    assert_eq!(summary.red_fruit, 28);
    assert!((summary.land_area_census - 3.0).abs() < 1e-9);
}

fn check_date_ties_keep_insertion_order<S: RecordStore>(store: &S) {
    add_operation(store, "OP-first", day(0));
    add_measurement(store, "OP-first", 1, 0.0);
    add_operation(store, "OP-second", day(0));
    add_measurement(store, "OP-second", 10, 0.0);

    let summary = summarize_recent_census(store, 1).unwrap();
    assert_eq!(summary.male_flower, 1);
}

fn check_summary_feeds_prediction<S: RecordStore>(store: &S) {
    add_operation(store, "OP-1", day(0));
    add_measurement(store, "OP-1", 25, 1.0); // red 100, black 125
    add_operation(store, "OP-2", day(1));
    add_measurement(store, "OP-2", 25, 1.0);

    let summary = summarize_recent_census(store, 5).unwrap();
    assert_eq!(summary.red_fruit, 200);
    let prediction = predict_yield(&summary, &PredictionConfig::default());
    assert_eq!(prediction.red_fruit, 230);
    assert_eq!(prediction.black_fruit, 270);
    assert_eq!(prediction.total_fruit, 500);
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

on_both_stores!(empty_store_yields_zero_summary, check_empty_store);
on_both_stores!(sums_only_the_most_recent_operations, check_sums_only_most_recent);
on_both_stores!(limit_above_available_counts_what_exists, check_limit_above_available);
on_both_stores!(missing_measurement_contributes_zero, check_missing_measurement_counts_as_zero);
on_both_stores!(date_ties_keep_insertion_order, check_date_ties_keep_insertion_order);
on_both_stores!(summary_feeds_prediction, check_summary_feeds_prediction);

#[test]
fn summary_serializes_with_contract_field_names() {
    let value = serde_json::to_value(CensusSummary::default()).unwrap();
    for field in [
        "male_flower",
        "female_flower",
        "purse_flower",
        "red_fruit",
        "black_fruit",
        "land_area_census",
        "operations_count",
    ] {
        assert!(value.get(field).is_some(), "missing field {field}");
    }
}

use attendance_tracker::importer::{ImportError, import_roster, parse_roster};
use attendance_tracker::store::{MemoryStore, StoreOp, StudentStore};

const ROSTER: &str = "780150\tMAHFUG MIYA\n780158\tMD. AMINUL ISLAM\n\n   \nGuest Student\n";

#[test]
fn one_record_per_non_blank_line() {
    let text = "a\n\n1\tb\n   \n\t\n2\tc\td\n";
    let non_blank = text.lines().filter(|l| !l.trim().is_empty()).count();
    assert_eq!(parse_roster(text).len(), non_blank);
}

#[actix_web::test]
async fn import_stores_candidates_in_order() {
    let store = MemoryStore::new();

    let added = import_roster(&store, "sub-1", ROSTER).await.unwrap();
    assert_eq!(added.len(), 3);
    assert_eq!(added[0].roll_number.as_deref(), Some("780150"));
    assert_eq!(added[0].name, "MAHFUG MIYA");
    assert_eq!(added[2].roll_number, None);
    assert_eq!(added[2].name, "Guest Student");
    assert!(added.iter().all(|s| s.subject_id == "sub-1"));

    assert_eq!(store.list_students("sub-1").await.unwrap().len(), 3);
}

#[actix_web::test]
async fn blank_text_is_no_valid_data() {
    let store = MemoryStore::new();
    // the store is never reached
    store.fail_next(StoreOp::InsertStudents);

    let err = import_roster(&store, "sub-1", "   \n  ").await.unwrap_err();
    assert!(matches!(err, ImportError::NoValidData));
    assert_eq!(err.to_string(), "No valid student data found");

    let err = import_roster(&store, "sub-1", "").await.unwrap_err();
    assert!(matches!(err, ImportError::NoValidData));
}

#[actix_web::test]
async fn insert_failure_is_a_distinct_error() {
    let store = MemoryStore::new();
    store.fail_next(StoreOp::InsertStudents);

    let err = import_roster(&store, "sub-1", ROSTER).await.unwrap_err();
    assert!(matches!(err, ImportError::Storage(_)));
    assert_eq!(err.to_string(), "Failed to add students");
    assert!(store.list_students("sub-1").await.unwrap().is_empty());

    // same text again once storage recovers
    assert_eq!(import_roster(&store, "sub-1", ROSTER).await.unwrap().len(), 3);
}

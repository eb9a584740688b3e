use attendance_tracker::grid::{AttendanceGrid, DateWindow, GridError};
use attendance_tracker::model::attendance::{AttendanceRecord, CellState, Mark};
use attendance_tracker::store::{AttendanceStore, MemoryStore, StoreOp};
use chrono::NaiveDate;

fn day(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, m, d).unwrap()
}

fn students() -> Vec<String> {
    vec!["s1".to_string(), "s2".to_string()]
}

#[actix_web::test]
async fn initialize_window_loads_seven_days_around_today() {
    let store = MemoryStore::new();
    store
        .insert_attendance(&[
            AttendanceRecord::new("s1", day(9, 7), Mark::Present),
            AttendanceRecord::new("s2", day(9, 13), Mark::Absent),
            // outside the window, must not show up
            AttendanceRecord::new("s1", day(9, 14), Mark::Present),
            // not one of the grid's students
            AttendanceRecord::new("s9", day(9, 10), Mark::Present),
        ])
        .await
        .unwrap();

    let grid = AttendanceGrid::open(&store, students(), day(9, 10)).await.unwrap();

    let dates = grid.window().dates();
    assert_eq!(dates.len(), 7);
    assert_eq!(dates.first(), Some(&day(9, 7)));
    assert_eq!(dates.last(), Some(&day(9, 13)));

    assert_eq!(grid.cell("s1", day(9, 7)), CellState::Present);
    assert_eq!(grid.cell("s2", day(9, 13)), CellState::Absent);
    assert_eq!(grid.cell("s1", day(9, 14)), CellState::Unmarked);
    assert_eq!(grid.cell("s9", day(9, 10)), CellState::Unmarked);
    assert_eq!(grid.matrix().marked(), 2);
}

#[actix_web::test]
async fn three_toggles_cycle_present_absent_present() {
    let store = MemoryStore::new();
    let mut grid = AttendanceGrid::open(&store, students(), day(9, 10)).await.unwrap();

    let mut marks = Vec::new();
    for _ in 0..3 {
        marks.push(grid.toggle("s1", day(9, 10)).await.unwrap());
    }

    assert_eq!(marks, vec![Mark::Present, Mark::Absent, Mark::Present]);
    assert_eq!(grid.cell("s1", day(9, 10)), CellState::Present);

    // replace-on-write keeps a single row per cell
    let rows = store.attendance_rows();
    assert_eq!(rows, vec![AttendanceRecord::new("s1", day(9, 10), Mark::Present)]);
}

#[actix_web::test]
async fn failure_between_delete_and_insert_resyncs_from_storage() {
    let store = MemoryStore::new();
    store
        .insert_attendance(&[
            AttendanceRecord::new("s1", day(9, 10), Mark::Present),
            AttendanceRecord::new("s2", day(9, 9), Mark::Absent),
        ])
        .await
        .unwrap();
    let mut grid = AttendanceGrid::open(&store, students(), day(9, 10)).await.unwrap();

    store.fail_next(StoreOp::InsertAttendance);
    let err = grid.toggle("s1", day(9, 10)).await.unwrap_err();
    assert!(matches!(err, GridError::Save(_)));
    assert_eq!(err.to_string(), "Failed to save attendance");

    // the delete went through, so the cell is lost and reads unmarked again
    assert_eq!(grid.cell("s1", day(9, 10)), CellState::Unmarked);
    // unrelated cells are untouched
    assert_eq!(grid.cell("s2", day(9, 9)), CellState::Absent);
    assert_eq!(store.attendance_rows().len(), 1);

    // next toggle starts over from unmarked
    assert_eq!(grid.toggle("s1", day(9, 10)).await.unwrap(), Mark::Present);
}

#[actix_web::test]
async fn failed_delete_discards_the_optimistic_mark() {
    let store = MemoryStore::new();
    store
        .insert_attendance(&[AttendanceRecord::new("s2", day(9, 11), Mark::Present)])
        .await
        .unwrap();
    let mut grid = AttendanceGrid::open(&store, students(), day(9, 10)).await.unwrap();

    store.fail_next(StoreOp::DeleteAttendance);
    let err = grid.toggle("s2", day(9, 11)).await.unwrap_err();
    assert!(matches!(err, GridError::Save(_)));

    assert_eq!(grid.cell("s2", day(9, 11)), CellState::Present);
    assert_eq!(store.attendance_rows().len(), 1);
}

#[actix_web::test]
async fn extending_the_window_loads_only_the_new_day() {
    let store = MemoryStore::new();
    let mut grid = AttendanceGrid::open(&store, students(), day(9, 10)).await.unwrap();
    let before = *grid.window();

    store
        .insert_attendance(&[
            AttendanceRecord::new("s1", day(9, 14), Mark::Present),
            AttendanceRecord::new("s2", day(9, 6), Mark::Absent),
            // appears after open, inside the old window: not reloaded
            AttendanceRecord::new("s1", day(9, 10), Mark::Absent),
        ])
        .await
        .unwrap();

    assert_eq!(grid.extend_window_forward().await.unwrap(), day(9, 14));
    assert_eq!(grid.extend_window_backward().await.unwrap(), day(9, 6));

    let window = grid.window();
    assert_eq!(window.len(), before.len() + 2);
    assert_eq!(window.first(), day(9, 6));
    assert_eq!(window.last(), day(9, 14));
    let dates = window.dates();
    assert!(dates.windows(2).all(|w| w[0] < w[1]));

    assert_eq!(grid.cell("s1", day(9, 14)), CellState::Present);
    assert_eq!(grid.cell("s2", day(9, 6)), CellState::Absent);
    assert_eq!(grid.cell("s1", day(9, 10)), CellState::Unmarked);
}

#[actix_web::test]
async fn read_failure_is_reported_and_keeps_the_matrix() {
    let store = MemoryStore::new();
    let mut grid = AttendanceGrid::open(&store, students(), day(9, 10)).await.unwrap();
    grid.toggle("s1", day(9, 10)).await.unwrap();

    store.fail_next(StoreOp::SelectAttendance);
    let err = grid.extend_window_forward().await.unwrap_err();
    assert!(matches!(err, GridError::Load(_)));
    assert_eq!(grid.cell("s1", day(9, 10)), CellState::Present);
}

#[actix_web::test]
async fn toggles_outside_the_grid_are_rejected_without_writing() {
    let store = MemoryStore::new();
    let mut grid = AttendanceGrid::new(&store, students(), DateWindow::single(day(9, 10)));
    grid.load_window(&[day(9, 10)]).await.unwrap();

    assert!(matches!(
        grid.toggle("stranger", day(9, 10)).await,
        Err(GridError::UnknownStudent(_))
    ));
    assert!(matches!(
        grid.toggle("s1", day(9, 11)).await,
        Err(GridError::OutsideWindow(_))
    ));
    assert!(store.attendance_rows().is_empty());
}

#[actix_web::test]
async fn grid_without_students_never_queries() {
    let store = MemoryStore::new();
    store.fail_next(StoreOp::SelectAttendance);

    let grid = AttendanceGrid::open(&store, Vec::new(), day(9, 10)).await.unwrap();
    assert_eq!(grid.window().len(), 7);
    assert_eq!(grid.matrix().marked(), 0);
}

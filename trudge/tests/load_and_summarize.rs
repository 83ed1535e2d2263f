use std::fs;
use std::path::PathBuf;

use trudge::{
    filter_by_prefix, lift_names, load, orm, orm_per_lift, orm_series, prettify_name,
    read_summary_csv, session_clusters, write_summary, Formula, Labels, TrudgeError,
};

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join("log.csv")
}

#[test]
fn test_fixture_loads() {
    let sets = load(&fixture()).expect("fixture should load");
    assert_eq!(sets.len(), 8);
    assert_eq!(
        lift_names(&sets),
        vec![
            "Bench",
            "Curl:Dumbbell",
            "Press:Behind The Neck:Snatch Grip",
            "Squat:Back"
        ]
    );
    let sizes: Vec<usize> = session_clusters(&sets).iter().map(|r| r.len()).collect();
    assert_eq!(sizes, vec![3, 3, 2]);
}

#[test]
fn test_summary_picks_heaviest_estimate() {
    let sets = load(&fixture()).unwrap();
    let orms = orm_series(&sets, Formula::Brzycki);
    let summary = orm_per_lift(&sets, &orms).unwrap();
    assert_eq!(summary.len(), 4);

    let squat = summary.iter().find(|r| r.name == "Squat:Back").unwrap();
    assert_eq!(squat.orm, orm(3, 225.0, Formula::Brzycki));
    assert_eq!(squat.time, sets[6].time);

    let press = filter_by_prefix(&sets, "Press");
    assert_eq!(press, vec![2, 7]);
}

#[test]
fn test_summary_csv_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("summary.csv");

    let sets = load(&fixture()).unwrap();
    let orms = orm_series(&sets, Formula::Epley);
    let summary = orm_per_lift(&sets, &orms).unwrap();
    write_summary(&out, &summary, &Labels::default()).unwrap();

    let reloaded = read_summary_csv(fs::File::open(&out).unwrap()).unwrap();
    assert_eq!(reloaded.len(), summary.len());
    for (written, again) in summary.iter().zip(reloaded.iter()) {
        assert_eq!(prettify_name(&written.name), again.name);
        assert_eq!(written.time, again.time);
        assert!((written.orm - again.orm).abs() <= 0.05 + 1e-9);
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, TrudgeError::Io { .. }));
}

#[test]
fn test_bad_flag_aborts_whole_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.csv");
    fs::write(
        &path,
        concat!(
            "time,name,reps,weight,rest,positive,hold,negative,effort,heart,trainer,unilateral,notes\n",
            "2024-01-01,Squat,5,100,1,1,0,1,3,,N,N,\n",
            "2024-01-02,Squat,5,100,1,1,0,1,3,,maybe,N,\n",
        ),
    )
    .unwrap();
    match load(&path) {
        Err(TrudgeError::InvalidFlag { row, field, value }) => {
            assert_eq!(row, 1);
            assert_eq!(field, "trainer");
            assert_eq!(value, "maybe");
        }
        other => panic!("expected invalid flag, got {:?}", other),
    }
}

//! Copy runs: files land under `dest/<rendered date>/` and sources stay put.

use chrono::{TimeZone, Utc};
use filetime::{FileTime, set_file_mtime};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

use file_by_date::{Configuration, OperationResult, Outcome, RawOptions, execute, validate};

fn write_dated(path: &Path, contents: &[u8], y: i32, m: u32, d: u32) {
    fs::write(path, contents).unwrap();
    let ts = Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().timestamp();
    set_file_mtime(path, FileTime::from_unix_time(ts, 0)).unwrap();
}

fn copy_cfg(src: &Path, dest: &Path, dp: &str, fp: Option<&str>) -> Configuration {
    validate(RawOptions {
        copy: true,
        date_pattern: Some(dp.into()),
        date_source: Some("modified".into()),
        file_pattern: fp.map(str::to_string),
        args: vec![
            src.to_string_lossy().into_owned(),
            dest.to_string_lossy().into_owned(),
        ],
        ..Default::default()
    })
    .expect("valid configuration")
}

fn run(cfg: &Configuration) -> (file_by_date::RunSummary, Vec<OperationResult>) {
    let mut results = Vec::new();
    let summary = execute(cfg, |r| results.push(r.clone())).expect("run");
    (summary, results)
}

#[test]
fn copies_matching_file_into_month_folder() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_dated(&src.path().join("a.jpg"), b"jpeg bytes", 2016, 4, 1);
    write_dated(&src.path().join("b.txt"), b"text", 2016, 4, 2);

    let cfg = copy_cfg(src.path(), dest.path(), "%Y/%m", Some("*.jpg"));
    let (summary, results) = run(&cfg);

    assert_eq!(summary.copied, 1);
    assert_eq!(summary.failed, 0);
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].outcome, Outcome::Copied);

    let copied = dest.path().join("2016").join("04").join("a.jpg");
    assert_eq!(fs::read(&copied).unwrap(), b"jpeg bytes");
    assert!(src.path().join("a.jpg").exists(), "copy keeps the source");
    assert!(!dest.path().join("2016").join("04").join("b.txt").exists());
}

#[test]
fn copy_preserves_modification_time() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_dated(&src.path().join("a.jpg"), b"x", 2016, 4, 1);

    run(&copy_cfg(src.path(), dest.path(), "%Y/%m", None));

    let copied = dest.path().join("2016/04/a.jpg");
    let src_meta = fs::metadata(src.path().join("a.jpg")).unwrap();
    let dst_meta = fs::metadata(&copied).unwrap();
    assert_eq!(
        FileTime::from_last_modification_time(&src_meta).unix_seconds(),
        FileTime::from_last_modification_time(&dst_meta).unix_seconds()
    );
}

#[test]
fn second_run_adds_numeric_suffix() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_dated(&src.path().join("a.jpg"), b"first", 2016, 4, 1);
    let cfg = copy_cfg(src.path(), dest.path(), "%Y/%m", Some("*.jpg"));

    run(&cfg);
    let (summary, results) = run(&cfg);

    assert_eq!(summary.copied, 2);
    assert_eq!(summary.renamed, 1);
    assert!(matches!(results[0].outcome, Outcome::CollisionRenamed(_)));
    let month = dest.path().join("2016/04");
    assert_eq!(fs::read(month.join("a.jpg")).unwrap(), b"first");
    assert_eq!(fs::read(month.join("a (2).jpg")).unwrap(), b"first");
}

#[test]
fn files_from_different_dates_are_separated() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_dated(&src.path().join("old.txt"), b"1", 2015, 12, 31);
    write_dated(&src.path().join("new.txt"), b"2", 2016, 1, 1);

    let (summary, _) = run(&copy_cfg(src.path(), dest.path(), "%Y/%m/%d", None));

    assert_eq!(summary.copied, 2);
    assert!(dest.path().join("2015/12/31/old.txt").is_file());
    assert!(dest.path().join("2016/01/01/new.txt").is_file());
}

#[test]
fn empty_date_pattern_copies_into_destination_root() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_dated(&src.path().join("flat.bin"), b"f", 2020, 2, 29);

    let (summary, _) = run(&copy_cfg(src.path(), dest.path(), "", None));

    assert_eq!(summary.copied, 1);
    assert!(dest.path().join("flat.bin").is_file());
}

#[test]
fn non_recursive_run_ignores_subdirectories() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    fs::create_dir(src.path().join("nested")).unwrap();
    write_dated(&src.path().join("nested/deep.jpg"), b"d", 2016, 4, 1);
    write_dated(&src.path().join("top.jpg"), b"t", 2016, 4, 1);

    let (summary, _) = run(&copy_cfg(src.path(), dest.path(), "%Y", None));
    assert_eq!(summary.copied, 1);
    assert!(dest.path().join("2016/top.jpg").is_file());
    assert!(!dest.path().join("2016/deep.jpg").exists());
}

#[test]
fn recursive_run_flattens_into_date_folders() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    fs::create_dir(src.path().join("nested")).unwrap();
    write_dated(&src.path().join("nested/deep.jpg"), b"d", 2016, 4, 1);

    let cfg = validate(RawOptions {
        copy: true,
        recursive: true,
        date_pattern: Some("%Y".into()),
        date_source: Some("modified".into()),
        args: vec![
            src.path().to_string_lossy().into_owned(),
            dest.path().to_string_lossy().into_owned(),
        ],
        ..Default::default()
    })
    .unwrap();
    let (summary, _) = run(&cfg);
    assert_eq!(summary.copied, 1);
    assert!(dest.path().join("2016/deep.jpg").is_file());
}

#[test]
fn empty_source_yields_empty_summary() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    let (summary, results) = run(&copy_cfg(src.path(), dest.path(), "%Y/%m", None));
    assert!(results.is_empty());
    assert_eq!(summary.total(), 0);
    assert!(!summary.interrupted);
}

#[test]
fn destination_inside_source_is_not_reprocessed() {
    let src = tempdir().unwrap();
    let dest = src.path().join("sorted");
    fs::create_dir(&dest).unwrap();
    write_dated(&src.path().join("a.jpg"), b"a", 2016, 4, 1);

    let cfg = validate(RawOptions {
        copy: true,
        recursive: true,
        date_pattern: Some("%Y/%m".into()),
        date_source: Some("modified".into()),
        args: vec![
            src.path().to_string_lossy().into_owned(),
            dest.to_string_lossy().into_owned(),
        ],
        ..Default::default()
    })
    .unwrap();

    let (first, _) = run(&cfg);
    let (second, _) = run(&cfg);
    assert_eq!(first.copied, 1);
    assert_eq!(second.copied, 1, "only the original is copied again");
    assert!(dest.join("2016/04/a.jpg").is_file());
    assert!(dest.join("2016/04/a (2).jpg").is_file());
    assert!(!dest.join("2016/04/a (3).jpg").exists());
}

#[test]
fn failed_file_does_not_stop_the_run() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_dated(&src.path().join("a.jpg"), b"old", 2016, 4, 1);
    write_dated(&src.path().join("b.jpg"), b"new", 2017, 4, 1);
    // A plain file where the 2016 folder should go.
    fs::write(dest.path().join("2016"), b"in the way").unwrap();

    let cfg = copy_cfg(src.path(), dest.path(), "%Y", None);
    let (summary, mut results) = run(&cfg);
    results.sort_by(|a, b| a.source.cmp(&b.source));

    assert_eq!(summary.failed, 1);
    assert_eq!(summary.copied, 1);
    let outcomes: Vec<_> = results.iter().map(|r| r.outcome).collect();
    assert_eq!(outcomes, vec![Outcome::Failed, Outcome::Copied]);
    assert!(results[0].error.is_some());
    assert_eq!(fs::read(dest.path().join("2017").join("b.jpg")).unwrap(), b"new");
}

#[test]
fn same_name_twice_in_one_run_gets_suffix() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    fs::create_dir(src.path().join("x")).unwrap();
    fs::create_dir(src.path().join("y")).unwrap();
    write_dated(&src.path().join("x").join("same.jpg"), b"from x", 2016, 4, 1);
    write_dated(&src.path().join("y").join("same.jpg"), b"from y", 2016, 4, 1);

    let cfg = validate(RawOptions {
        copy: true,
        recursive: true,
        date_pattern: Some("%Y".into()),
        date_source: Some("modified".into()),
        args: vec![
            src.path().to_string_lossy().into_owned(),
            dest.path().to_string_lossy().into_owned(),
        ],
        ..Default::default()
    })
    .unwrap();
    let (summary, _) = run(&cfg);

    assert_eq!(summary.copied, 2);
    assert_eq!(summary.renamed, 1);
    assert_eq!(summary.failed, 0);
    let year = dest.path().join("2016");
    let mut got = vec![
        fs::read(year.join("same.jpg")).unwrap(),
        fs::read(year.join("same (2).jpg")).unwrap(),
    ];
    got.sort();
    assert_eq!(got, vec![b"from x".to_vec(), b"from y".to_vec()]);
}

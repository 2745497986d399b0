//! Dry runs report planned destinations without touching the filesystem.

use chrono::{TimeZone, Utc};
use filetime::{FileTime, set_file_mtime};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;
use walkdir::WalkDir;

use file_by_date::{Command, Configuration, OperationResult, Outcome, RawOptions, execute, validate};

fn write_dated(path: &Path, y: i32, m: u32, d: u32) {
    fs::write(path, b"data").unwrap();
    let ts = Utc.with_ymd_and_hms(y, m, d, 0, 0, 1).unwrap().timestamp();
    set_file_mtime(path, FileTime::from_unix_time(ts, 0)).unwrap();
}

fn dry_cfg(src: &Path, dest: &Path, move_files: bool) -> Configuration {
    validate(RawOptions {
        copy: !move_files,
        move_files,
        dry_run: true,
        recursive: true,
        date_pattern: Some("%Y/%m".into()),
        date_source: Some("modified".into()),
        args: vec![
            src.to_string_lossy().into_owned(),
            dest.to_string_lossy().into_owned(),
        ],
        ..Default::default()
    })
    .unwrap()
}

fn snapshot(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .map(|e| e.into_path())
        .collect()
}

fn collect(cfg: &Configuration) -> Vec<OperationResult> {
    let mut out = Vec::new();
    let summary = execute(cfg, |r| out.push(r.clone())).unwrap();
    assert_eq!(summary.skipped, out.len());
    assert_eq!(summary.copied + summary.moved, 0);
    out
}

#[test]
fn dry_run_leaves_both_trees_untouched() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_dated(&src.path().join("a.jpg"), 2016, 4, 1);
    fs::create_dir(src.path().join("sub")).unwrap();
    write_dated(&src.path().join("sub/b.jpg"), 2017, 5, 2);

    let before_src = snapshot(src.path());
    let before_dest = snapshot(dest.path());

    let results = collect(&dry_cfg(src.path(), dest.path(), true));

    assert_eq!(results.len(), 2);
    assert!(
        results
            .iter()
            .all(|r| r.outcome == Outcome::DryRun(Command::Move))
    );
    assert_eq!(snapshot(src.path()), before_src);
    assert_eq!(snapshot(dest.path()), before_dest);
}

#[test]
fn dry_run_is_repeatable() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_dated(&src.path().join("a.jpg"), 2016, 4, 1);
    let cfg = dry_cfg(src.path(), dest.path(), false);

    let first = collect(&cfg);
    let second = collect(&cfg);
    assert_eq!(first, second);
    let expected = dunce::canonicalize(dest.path()).unwrap().join("2016/04/a.jpg");
    assert_eq!(first[0].destination.as_deref(), Some(expected.as_path()));
}

#[test]
fn dry_run_predicts_suffixes_for_same_named_files() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    fs::create_dir(src.path().join("x")).unwrap();
    fs::create_dir(src.path().join("y")).unwrap();
    write_dated(&src.path().join("x/same.jpg"), 2016, 4, 1);
    write_dated(&src.path().join("y/same.jpg"), 2016, 4, 20);

    let results = collect(&dry_cfg(src.path(), dest.path(), false));

    let names: Vec<String> = results
        .iter()
        .map(|r| {
            r.destination
                .as_deref()
                .and_then(Path::file_name)
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(names, vec!["same.jpg", "same (2).jpg"]);
}

#[test]
fn dry_run_lines_read_as_would() {
    let src = tempdir().unwrap();
    let dest = tempdir().unwrap();
    write_dated(&src.path().join("a.jpg"), 2016, 4, 1);

    let results = collect(&dry_cfg(src.path(), dest.path(), false));
    let line = results[0].to_string();
    assert!(line.starts_with("would copy "), "line was: {line}");
    assert!(line.contains("a.jpg"));
}

//! Run execution.
//!
//! Walks the source directory, filters by the configured matcher, resolves
//! each file's date, plans its destination and copies or moves it. Each
//! matched file yields exactly one [`OperationResult`]; a failure on one file
//! never stops the run.
//!
//! The walk completes before the first file is touched so files produced by
//! the run itself are never picked up again.

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::{Command, Configuration};
use crate::errors::FileByDateError;
use crate::fs_ops::{is_internal_name, resolve_destination_with, transfer};
use crate::planner::{Planned, ensure_dir_chain, plan_destination};
use crate::shutdown;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Copied,
    Moved,
    /// Copied or moved under a suffixed name because the planned one was taken.
    CollisionRenamed(Command),
    /// Dry run: would copy/move; nothing was touched.
    DryRun(Command),
    /// The file already sits at its planned destination.
    AlreadyInPlace,
    Failed,
}

impl Outcome {
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Copied => "copied",
            Outcome::Moved => "moved",
            Outcome::CollisionRenamed(_) => "renamed",
            Outcome::DryRun(_) => "dry-run",
            Outcome::AlreadyInPlace => "in-place",
            Outcome::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationResult {
    pub source: PathBuf,
    /// Resolved destination; `None` if the file failed before planning.
    pub destination: Option<PathBuf>,
    pub outcome: Outcome,
    pub error: Option<String>,
}

impl OperationResult {
    fn failed(source: &Path, destination: Option<PathBuf>, error: String) -> Self {
        Self {
            source: source.to_path_buf(),
            destination,
            outcome: Outcome::Failed,
            error: Some(error),
        }
    }
}

impl fmt::Display for OperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let src = self.source.display();
        let dest = self
            .destination
            .as_deref()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        match self.outcome {
            Outcome::Copied => write!(f, "copy {src} -> {dest}"),
            Outcome::Moved => write!(f, "move {src} -> {dest}"),
            Outcome::CollisionRenamed(cmd) => write!(f, "{cmd} {src} -> {dest} (renamed)"),
            Outcome::DryRun(cmd) => write!(f, "would {cmd} {src} -> {dest}"),
            Outcome::AlreadyInPlace => write!(f, "skip {src} (already in place)"),
            Outcome::Failed => write!(
                f,
                "failed {src}: {}",
                self.error.as_deref().unwrap_or("unknown error")
            ),
        }
    }
}

/// Tally of one run. `renamed` is the part of copied+moved that needed a
/// suffix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub copied: usize,
    pub moved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub renamed: usize,
    /// Cancellation was requested and the run stopped between files.
    pub interrupted: bool,
}

impl RunSummary {
    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Copied => self.copied += 1,
            Outcome::Moved => self.moved += 1,
            Outcome::CollisionRenamed(Command::Copy) => {
                self.copied += 1;
                self.renamed += 1;
            }
            Outcome::CollisionRenamed(Command::Move) => {
                self.moved += 1;
                self.renamed += 1;
            }
            Outcome::DryRun(_) | Outcome::AlreadyInPlace => self.skipped += 1,
            Outcome::Failed => self.failed += 1,
        }
    }

    /// Files that produced a result.
    pub fn total(&self) -> usize {
        self.copied + self.moved + self.skipped + self.failed
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "copied={} moved={} skipped={} failed={} (renamed={})",
            self.copied, self.moved, self.skipped, self.failed, self.renamed
        )?;
        if self.interrupted {
            f.write_str(" [interrupted]")?;
        }
        Ok(())
    }
}

enum Step {
    Done(OperationResult),
    Interrupted,
}

/// Execute one run. `on_result` receives every per-file result as it happens.
///
/// Returns `Err` only when the source directory itself is gone; everything
/// else is reported per file.
pub fn execute(
    cfg: &Configuration,
    mut on_result: impl FnMut(&OperationResult),
) -> Result<RunSummary, FileByDateError> {
    if !cfg.source_dir().is_dir() {
        return Err(FileByDateError::SourceVanished(cfg.source_dir().to_path_buf()));
    }

    let candidates = collect_candidates(cfg);
    info!(
        command = %cfg.command(),
        source = %cfg.source_dir().display(),
        dest = %cfg.dest_dir().display(),
        matched = candidates.len(),
        dry_run = cfg.dry_run(),
        "Starting run"
    );

    let mut summary = RunSummary::default();
    // Dry runs never create files, so names planned earlier in the run are
    // tracked here to report the suffixes a real run would pick.
    let mut planned_names: HashSet<PathBuf> = HashSet::new();

    for src in &candidates {
        if shutdown::is_requested() {
            summary.interrupted = true;
            break;
        }
        match process_one(cfg, src, &mut planned_names) {
            Step::Done(result) => {
                log_result(&result);
                summary.record(result.outcome);
                on_result(&result);
            }
            Step::Interrupted => {
                summary.interrupted = true;
                break;
            }
        }
    }

    if summary.interrupted {
        warn!(%summary, "Run interrupted");
    } else {
        info!(%summary, "Run finished");
    }
    Ok(summary)
}

fn collect_candidates(cfg: &Configuration) -> Vec<PathBuf> {
    let max_depth = if cfg.recursive() { usize::MAX } else { 1 };
    let dest_inside_source =
        cfg.dest_dir() != cfg.source_dir() && cfg.dest_dir().starts_with(cfg.source_dir());

    let mut out = Vec::new();
    let mut walker = WalkDir::new(cfg.source_dir())
        .min_depth(1)
        .max_depth(max_depth)
        .follow_links(cfg.follow_links())
        .sort_by_file_name()
        .into_iter();

    while let Some(entry) = walker.next() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "Skipping unreadable entry");
                continue;
            }
        };
        let file_type = entry.file_type();
        if file_type.is_dir() {
            if dest_inside_source && entry.path() == cfg.dest_dir() {
                debug!(path = %entry.path().display(), "not descending into destination");
                walker.skip_current_dir();
            }
            continue;
        }
        // Without follow_links a symlink reports its own type and is skipped here.
        if !file_type.is_file() {
            debug!(path = %entry.path().display(), "skipping non-regular entry");
            continue;
        }
        let name = entry.file_name();
        if is_internal_name(name) || !cfg.matcher().matches(name) {
            continue;
        }
        out.push(entry.into_path());
    }
    out
}

fn process_one(cfg: &Configuration, src: &Path, planned_names: &mut HashSet<PathBuf>) -> Step {
    let date: DateTime<Utc> = match cfg.date_source().resolve(src) {
        Ok(d) => d,
        Err(e) => return Step::Done(OperationResult::failed(src, None, e.to_string())),
    };
    let planned: Planned = match plan_destination(cfg, src, &date) {
        Ok(p) => p,
        Err(e) => return Step::Done(OperationResult::failed(src, None, e.to_string())),
    };

    let requested = planned.path();
    if is_same_file(src, &requested) {
        return Step::Done(OperationResult {
            source: src.to_path_buf(),
            destination: Some(requested),
            outcome: Outcome::AlreadyInPlace,
            error: None,
        });
    }

    let command = cfg.command();
    if cfg.dry_run() {
        let dest = match resolve_destination_with(&planned.dir, &planned.name, |p| {
            planned_names.contains(p) || p.exists()
        }) {
            Ok(d) => d,
            Err(e) => return Step::Done(OperationResult::failed(src, Some(requested), e.to_string())),
        };
        planned_names.insert(dest.clone());
        return Step::Done(OperationResult {
            source: src.to_path_buf(),
            destination: Some(dest),
            outcome: Outcome::DryRun(command),
            error: None,
        });
    }

    if let Err(e) = ensure_dir_chain(&planned.dir) {
        return Step::Done(OperationResult::failed(src, Some(requested), format!("{e:#}")));
    }

    match transfer(command, src, &planned.dir, &planned.name) {
        Ok(t) => {
            let outcome = match (t.renamed, command) {
                (true, cmd) => Outcome::CollisionRenamed(cmd),
                (false, Command::Copy) => Outcome::Copied,
                (false, Command::Move) => Outcome::Moved,
            };
            Step::Done(OperationResult {
                source: src.to_path_buf(),
                destination: Some(t.dest),
                outcome,
                error: None,
            })
        }
        Err(e) if e.is_interrupted() => Step::Interrupted,
        Err(e) => Step::Done(OperationResult::failed(
            src,
            Some(e.dest.clone().unwrap_or(requested)),
            e.to_string(),
        )),
    }
}

fn is_same_file(a: &Path, b: &Path) -> bool {
    if !b.exists() {
        return false;
    }
    match (dunce::canonicalize(a), dunce::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn log_result(result: &OperationResult) {
    let dest = result
        .destination
        .as_deref()
        .map(|d| d.display().to_string())
        .unwrap_or_default();
    match result.outcome {
        Outcome::Failed => debug!(
            src = %result.source.display(),
            dest = %dest,
            error = result.error.as_deref().unwrap_or(""),
            "File failed"
        ),
        outcome => debug!(
            src = %result.source.display(),
            dest = %dest,
            outcome = outcome.label(),
            "File processed"
        ),
    }
}

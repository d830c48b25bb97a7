use crate::common::fakes::{Behavior, FakeLauncher, FakeProber};
use crate::common::helpers::{TestTree, arg_after};
use hbbatch::engine::hardware::{Capabilities, HardwareCapability};
use hbbatch::engine::{self, Orchestrator, StatusLine, TranscodeError};
use hbbatch::stats::BatchSummary;
use std::collections::HashSet;
use std::path::PathBuf;

fn software() -> Capabilities {
    Capabilities::new(HardwareCapability::None, true)
}

#[test]
fn test_walker_mirrors_tree_and_skips_other_extensions() {
    let tree = TestTree::new().unwrap();
    tree.add("a/x.mp4").unwrap();
    tree.add("a/b/y.mkv").unwrap();
    tree.add("skip.txt").unwrap();

    let config = tree.config("x264").unwrap();
    let launcher = FakeLauncher::new(Behavior::succeed());
    let prober = FakeProber::new(60.0);
    let mut orchestrator = Orchestrator::with_status_line(
        &config,
        software(),
        &launcher,
        &prober,
        StatusLine::new(Vec::new()),
    );

    let summary = engine::process(&config, |job| orchestrator.run(job)).unwrap();

    assert_eq!(
        summary,
        BatchSummary {
            total_jobs: 2,
            verified: 2,
            verification_failed: 0
        }
    );
    assert!(tree.output.join("a/b").is_dir());
    assert!(tree.output.join("a/x.mp4").is_file());
    assert!(tree.output.join("a/b/y.mkv").is_file());
    assert!(!tree.output.join("skip.txt").exists());

    let outputs: HashSet<PathBuf> = launcher
        .launched
        .borrow()
        .iter()
        .filter_map(|cmd| arg_after(cmd, "-o"))
        .map(PathBuf::from)
        .collect();
    assert_eq!(
        outputs,
        HashSet::from([tree.output.join("a/x.mp4"), tree.output.join("a/b/y.mkv")])
    );
}

#[test]
fn test_encode_failure_aborts_remaining_jobs() {
    let tree = TestTree::new().unwrap();
    tree.add("one.mp4").unwrap();
    tree.add("two.mp4").unwrap();
    tree.add("nested/three.mkv").unwrap();

    let config = tree.config("x264").unwrap();
    let launcher = FakeLauncher::new(Behavior::fail(1));
    let prober = FakeProber::new(60.0);
    let mut orchestrator = Orchestrator::with_status_line(
        &config,
        software(),
        &launcher,
        &prober,
        StatusLine::new(Vec::new()),
    );

    let err = engine::process(&config, |job| orchestrator.run(job)).unwrap_err();

    assert!(matches!(err, TranscodeError::Encode { .. }));
    assert_eq!(launcher.launch_count(), 1);
}

#[test]
fn test_verification_failure_does_not_stop_batch() {
    let tree = TestTree::new().unwrap();
    tree.add("good.mp4").unwrap();
    tree.add("sub/bad.mp4").unwrap();
    tree.add("sub/also_good.mkv").unwrap();

    let config = tree.config("x264").unwrap();
    let launcher =
        FakeLauncher::new(Behavior::succeed()).with("bad.mp4", Behavior::empty_output());
    let prober = FakeProber::new(60.0);
    let mut orchestrator = Orchestrator::with_status_line(
        &config,
        software(),
        &launcher,
        &prober,
        StatusLine::new(Vec::new()),
    );

    let summary = engine::process(&config, |job| orchestrator.run(job)).unwrap();

    assert_eq!(launcher.launch_count(), 3);
    assert_eq!(summary.total_jobs, 3);
    assert_eq!(summary.verified, 2);
    assert_eq!(summary.verification_failed, 1);
    assert_eq!(summary.processed(), 3);
}

#[test]
fn test_missing_tool_aborts_on_first_job() {
    let tree = TestTree::new().unwrap();
    tree.add("one.mp4").unwrap();
    tree.add("two.mp4").unwrap();

    let config = tree.config("x264").unwrap();
    let launcher = FakeLauncher::new(Behavior::succeed());
    let prober = FakeProber::new(60.0);
    let mut orchestrator = Orchestrator::with_status_line(
        &config,
        Capabilities::new(HardwareCapability::None, false),
        &launcher,
        &prober,
        StatusLine::new(Vec::new()),
    );

    let mut attempts = 0;
    let err = engine::process(&config, |job| {
        attempts += 1;
        orchestrator.run(job)
    })
    .unwrap_err();

    assert!(matches!(err, TranscodeError::ToolMissing { .. }));
    assert_eq!(attempts, 1);
    assert_eq!(launcher.launch_count(), 0);
}

#[test]
fn test_dry_run_plan_matches_batch_numbering() {
    let tree = TestTree::new().unwrap();
    tree.add("a/x.mp4").unwrap();
    tree.add("a/b/y.MKV").unwrap();

    let config = tree.config("x264").unwrap();
    let jobs = engine::plan_jobs(&config);

    assert_eq!(jobs.len(), 2);
    let indices: HashSet<usize> = jobs.iter().map(|j| j.sequence_index).collect();
    assert_eq!(indices, HashSet::from([1, 2]));
    assert!(jobs.iter().all(|j| j.total_jobs == 2));
    assert!(!tree.output.exists());
}

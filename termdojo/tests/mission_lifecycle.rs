//! End-to-end sandbox scenarios driven through the public API.
//!
//! Covers the filesystem, goal evaluation and session emulator together, and
//! plays built-in missions with their documented example commands.

use serde_json::json;

use termdojo::core::error::FsError;
use termdojo::core::filesystem::{DEFAULT_HOME, DEFAULT_USER, Filesystem};
use termdojo::core::goal::GoalNode;
use termdojo::core::invariants::validate_invariants;
use termdojo::mission::Catalog;
use termdojo::runner::MissionRunner;
use termdojo::test_support::mission;

fn goal(value: serde_json::Value) -> GoalNode {
    GoalNode::parse(&value).expect("goal")
}

#[test]
fn mkdir_creates_nested_directories() {
    let mut fs = Filesystem::new(DEFAULT_HOME, DEFAULT_USER);
    fs.mkdir("/a/b/c").expect("mkdir");
    assert!(fs.exists("/a/b/c"));
    assert!(fs.is_dir("/a/b/c"));
    assert!(validate_invariants(&fs).is_empty());
}

#[test]
fn file_contains_tracks_rewrites() {
    let mut fs = Filesystem::new(DEFAULT_HOME, DEFAULT_USER);
    let contains = goal(json!({"file_contains": {"path": "/test.txt", "content": "World"}}));
    fs.write_file("/test.txt", "Hello World!").expect("write");
    assert!(contains.evaluate(&fs));
    fs.write_file("/test.txt", "Goodbye").expect("write");
    assert!(!contains.evaluate(&fs));
}

#[test]
fn move_goal_flips_after_mv() {
    let mut fs = Filesystem::new(DEFAULT_HOME, DEFAULT_USER);
    fs.mkdir("/documents").expect("mkdir");
    fs.write_file("/downloads/report.pdf", "%PDF").expect("write");
    let moved = goal(json!({"and": [
        {"path_exists": "/documents/report.pdf"},
        {"not": {"path_exists": "/downloads/report.pdf"}}
    ]}));
    assert!(!moved.evaluate(&fs));
    fs.mv("/downloads/report.pdf", "/documents/").expect("mv");
    assert!(moved.evaluate(&fs));
    assert!(validate_invariants(&fs).is_empty());
}

#[test]
fn tmux_nesting_guard() {
    let mut runner =
        MissionRunner::new(mission("tmux", GoalNode::Always), DEFAULT_HOME, DEFAULT_USER)
            .expect("runner");
    let first = runner.execute("tmux");
    assert!(first.success);
    assert_eq!(runner.session().session().expect("session").name, "0");

    for line in ["tmux", "tmux new"] {
        let nested = runner.execute(line);
        assert!(!nested.success, "{line} should be refused while attached");
        assert!(nested.error.contains("nested"));
    }

    assert!(runner.execute("tmux detach").success);
    assert!(runner.execute("tmux new").success);
}

#[test]
fn rm_refuses_directories() {
    let mut fs = Filesystem::new(DEFAULT_HOME, DEFAULT_USER);
    fs.mkdir("/keep").expect("mkdir");
    assert_eq!(fs.rm("/keep"), Err(FsError::IsADirectory("/keep".to_string())));
    assert!(fs.is_dir("/keep"));
}

#[test]
fn clone_is_independent_through_reset() {
    let mut runner =
        MissionRunner::new(mission("clone", GoalNode::Always), DEFAULT_HOME, DEFAULT_USER)
            .expect("runner");
    runner.execute("echo scratch > /tmp/scratch.txt");
    runner.execute("mv documents /tmp/docs");
    runner.reset();
    let fs = runner.filesystem();
    assert!(!fs.exists("/tmp/scratch.txt"));
    assert!(fs.is_dir("/home/learner/documents"));
    assert!(validate_invariants(fs).is_empty());
}

/// Every built-in mission completes when its example commands are typed in order.
#[test]
fn builtin_missions_complete_with_example_commands() {
    let catalog = Catalog::builtin().expect("builtin");
    for mission in catalog.missions() {
        let mut runner =
            MissionRunner::new(mission.clone(), DEFAULT_HOME, DEFAULT_USER).expect("setup");
        assert!(
            !runner.is_completed(),
            "{} should not start completed",
            mission.id
        );
        for command in &mission.commands {
            runner.execute(command);
        }
        assert!(runner.is_completed(), "{} did not complete", mission.id);
        assert!(validate_invariants(runner.filesystem()).is_empty());
    }
}

#[test]
fn split_mission_needs_a_second_pane() {
    let catalog = Catalog::builtin().expect("builtin");
    let split = catalog.get("4.2-tmux-split").expect("4.2").clone();
    let mut runner = MissionRunner::new(split, DEFAULT_HOME, DEFAULT_USER).expect("setup");
    assert!(!runner.execute("tmux split-window").completed);
    assert!(!runner.execute("tmux").completed);
    assert!(runner.execute("tmux split-window").completed);
}

#[test]
fn failed_command_leaves_read_mission_open() {
    let catalog = Catalog::builtin().expect("builtin");
    let read = catalog.get("1.3-read-file").expect("1.3").clone();
    let mut runner = MissionRunner::new(read, DEFAULT_HOME, DEFAULT_USER).expect("setup");
    let result = runner.execute("cat does-not-exist.txt");
    assert!(!result.success);
    assert!(!result.completed);
    assert!(runner.execute("cat secret.txt").completed);
}

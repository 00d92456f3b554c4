use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::TempDir;

fn isolated(dir: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("reprisectl");
    cmd.current_dir(dir.path())
        .env_remove("REPRISE_CONFIG_PATH")
        .env_remove("REPRISE_CONFIG_JSON")
        .env_remove("REPRISE_REMOTE_URL")
        .env("RUST_LOG", "warn");
    cmd
}

#[test]
fn help_lists_subcommands() {
    let mut cmd = cargo_bin_cmd!("reprisectl");
    let output = cmd.arg("--help").assert().success().get_output().stdout.clone();
    let text = String::from_utf8_lossy(&output);
    assert!(text.contains("replay"), "help missing replay");
    assert!(text.contains("progress"), "help missing progress");
    assert!(text.contains("track"), "help missing track");

    let mut replay = cargo_bin_cmd!("reprisectl");
    replay
        .args(["replay", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--speed").and(predicate::str::contains("--viewer")));
}

#[test]
fn track_renders_webvtt() {
    let dir = TempDir::new().unwrap();
    let intervals = dir.path().join("skip.json");
    fs::write(
        &intervals,
        r#"[{"startTime": 0, "endTime": 90, "label": "Opening"}]"#,
    )
    .unwrap();

    isolated(&dir)
        .arg("track")
        .arg(&intervals)
        .args(["--duration", "1400"])
        .assert()
        .success()
        .stdout("WEBVTT\n\n00:00 --> 01:30\nOpening\n\n01:30 --> 23:20\n\n\n");
}

#[test]
fn track_without_intervals_is_omitted() {
    let dir = TempDir::new().unwrap();
    let intervals = dir.path().join("skip.json");
    fs::write(&intervals, "[]").unwrap();

    isolated(&dir)
        .arg("track")
        .arg(&intervals)
        .args(["--duration", "1400"])
        .assert()
        .success()
        .stdout(predicate::str::contains("track omitted"));
}

#[test]
fn inverted_interval_is_rejected() {
    let dir = TempDir::new().unwrap();
    let intervals = dir.path().join("skip.json");
    fs::write(
        &intervals,
        r#"[{"startTime": 90, "endTime": 10, "text": "Opening"}]"#,
    )
    .unwrap();

    isolated(&dir)
        .arg("track")
        .arg(&intervals)
        .args(["--duration", "1400"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid skip interval"));
}

#[test]
fn progress_reports_missing_entries() {
    let dir = TempDir::new().unwrap();
    isolated(&dir)
        .args(["progress", "frieren-episode-5", "--cache"])
        .arg(dir.path().join("cache"))
        .assert()
        .success()
        .stdout(predicate::str::contains("no cached progress for frieren-episode-5"));
}

#[test]
fn replay_caches_progress_and_advances() {
    let dir = TempDir::new().unwrap();
    let cache = dir.path().join("cache");
    let script = dir.path().join("script.json");
    fs::write(
        &script,
        r#"{
            "context": {
                "series_id": "154587",
                "series_title": "Frieren",
                "episode_key": "frieren-episode-5",
                "episode_number": 5,
                "provider_id": "gogoanime",
                "next": { "key": "frieren-episode-6", "number": 6 },
                "skip_intervals": [{ "startTime": 0, "endTime": 90, "label": "Opening" }]
            },
            "events": [
                { "at_ms": 0, "event": { "type": "loaded_metadata", "duration": 1420 } },
                { "at_ms": 0, "event": { "type": "time_update", "current_time": 611.4 } },
                { "at_ms": 0, "event": { "type": "play" } },
                { "at_ms": 12000, "event": { "type": "ended" } }
            ],
            "tail_ms": 10000
        }"#,
    )
    .unwrap();

    isolated(&dir)
        .arg("replay")
        .arg(&script)
        .arg("--cache")
        .arg(&cache)
        .args(["--speed", "10"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("cue-track ready #1")
                .and(predicate::str::contains("progress 611s local=true remote=false"))
                .and(predicate::str::contains("auto-advance Armed"))
                .and(predicate::str::contains(
                    "advance /en/anime/watch/154587/gogoanime?id=frieren-episode-6&num=6",
                ))
                .and(predicate::str::contains("\"closed\": true")),
        );

    let output = isolated(&dir)
        .args(["progress", "frieren-episode-5", "--cache"])
        .arg(&cache)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let record: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(record["episodeKey"], "frieren-episode-5");
    assert_eq!(record["timeWatched"], 611.0);
    assert_eq!(record["nextEpisodeNumber"], 6);
    assert_eq!(record["title"], "Frieren");
}

use assert_cmd::prelude::*;
use std::fs;
use std::net::TcpListener;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::tempdir;

const README: &str = "# Profile\n\nHello there.\n\n<!--CONTRIB_SUMMARY_START-->\nplaceholder\n<!--CONTRIB_SUMMARY_END-->\n\nBye.\n";

const RAW: &str = r#"{
  "login": "octocat",
  "events": [
    { "date": "2024-03-01", "category": "commit", "count": 1, "repository": "octocat/hello" },
    { "date": "2024-03-04", "category": "commit", "count": 2 },
    { "date": "2024-03-04", "category": "issue" },
    { "date": "2024-03-07", "category": "review", "count": 2 },
    { "date": "2024-03-05", "count": 3, "restricted": true, "repository": "corp/internal" }
  ],
  "restricted_periods": [
    { "start": "2024-03-02", "end": "2024-03-03", "count": 5 }
  ]
}"#;

struct Workspace {
    _dir: tempfile::TempDir,
    root: PathBuf,
}

impl Workspace {
    fn new(readme: &str, raw: &str) -> Self {
        let dir = tempdir().unwrap();
        let root = dir.path().to_path_buf();
        fs::write(root.join("README.md"), readme).unwrap();
        fs::write(root.join("raw.json"), raw).unwrap();
        Self { _dir: dir, root }
    }

    fn path(&self, rel: &str) -> PathBuf {
        self.root.join(rel)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("contribmap").unwrap();
        cmd.current_dir(&self.root)
            .env_remove("GITHUB_TOKEN")
            .env_remove("CONTRIB_WINDOW_DAYS")
            .arg("--readme")
            .arg(self.path("README.md"))
            .arg("--assets-dir")
            .arg(self.path("assets"))
            .arg("--data-dir")
            .arg(self.path("data"))
            .args(["--today", "2024-03-07", "--window-days", "7"]);
        cmd
    }

    fn render(&self) -> Command {
        let mut cmd = self.command();
        cmd.arg("render").arg("--input").arg(self.path("raw.json"));
        cmd
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn render_writes_artifacts_and_patches_readme() {
    let ws = Workspace::new(README, RAW);
    ws.render().assert().success();

    for file in [
        "assets/contributions-light.svg",
        "assets/contributions-dark.svg",
        "data/contributions.json",
        "data/summary.md",
    ] {
        assert!(ws.path(file).exists(), "missing {file}");
    }

    let readme = read(&ws.path("README.md"));
    assert!(readme.starts_with("# Profile\n\nHello there.\n\n<!--CONTRIB_SUMMARY_START-->\n"));
    assert!(readme.ends_with("<!--CONTRIB_SUMMARY_END-->\n\nBye.\n"));
    assert!(!readme.contains("placeholder"));
    assert!(readme.contains("- Total contributions: **14**"));
    assert!(readme.contains("- Includes anonymized private activity: **8**"));
    assert!(readme.contains("srcset=\"assets/contributions-dark.svg\""));
    assert!(readme.contains("src=\"assets/contributions-light.svg\""));
    assert!(!readme.contains("corp/internal"));
    assert!(readme.contains("#### Top commit repos\n- **octocat/hello**: 1\n"));

    let snapshot: serde_json::Value = serde_json::from_str(&read(&ws.path("data/contributions.json"))).unwrap();
    assert_eq!(snapshot["login"], "octocat");
    assert_eq!(snapshot["days"].as_array().map(|d| d.len()), Some(7));
    assert_eq!(snapshot["stats"]["total"], 14);
    assert_eq!(snapshot["stats"]["top_repositories"]["commit"][0]["name"], "octocat/hello");
    assert!(snapshot["stats"]["top_repositories"].get("private").is_none());
    assert!(!read(&ws.path("data/contributions.json")).contains("corp/internal"));
}

#[test]
fn rerun_with_same_input_is_idempotent() {
    let ws = Workspace::new(README, RAW);
    ws.render().assert().success();
    let readme = read(&ws.path("README.md"));
    let light = fs::read(ws.path("assets/contributions-light.svg")).unwrap();
    let dark = fs::read(ws.path("assets/contributions-dark.svg")).unwrap();
    let snapshot = read(&ws.path("data/contributions.json"));

    ws.render().assert().success();
    assert_eq!(read(&ws.path("README.md")), readme);
    assert_eq!(fs::read(ws.path("assets/contributions-light.svg")).unwrap(), light);
    assert_eq!(fs::read(ws.path("assets/contributions-dark.svg")).unwrap(), dark);
    assert_eq!(read(&ws.path("data/contributions.json")), snapshot);
}

#[test]
fn missing_markers_fail_without_writing_anything() {
    let doc = "# Profile\n\nNo markers.\n";
    let ws = Workspace::new(doc, RAW);
    ws.render().assert().failure();

    assert_eq!(read(&ws.path("README.md")), doc);
    assert!(!ws.path("assets").exists());
    assert!(!ws.path("data").exists());
}

#[test]
fn negative_count_fails_without_artifacts() {
    let raw = RAW.replace("\"count\": 2 }", "\"count\": -2 }");
    let ws = Workspace::new(README, &raw);
    let out = ws.render().assert().failure().get_output().stderr.clone();

    assert!(String::from_utf8_lossy(&out).contains("events[1].count"));
    assert_eq!(read(&ws.path("README.md")), README);
    assert!(!ws.path("assets").exists());
    assert!(!ws.path("data").exists());
}

#[test]
fn failed_run_keeps_previous_artifacts() {
    let ws = Workspace::new(README, RAW);
    ws.render().assert().success();
    let readme = read(&ws.path("README.md"));
    let light = fs::read(ws.path("assets/contributions-light.svg")).unwrap();

    fs::write(ws.path("raw.json"), RAW.replace("2024-03-01", "2023-01-01")).unwrap();
    ws.render().assert().failure();

    assert_eq!(read(&ws.path("README.md")), readme);
    assert_eq!(fs::read(ws.path("assets/contributions-light.svg")).unwrap(), light);
}

#[test]
fn run_without_token_is_an_auth_failure() {
    let ws = Workspace::new(README, RAW);
    let out = ws.command().arg("run").assert().failure().get_output().stderr.clone();
    assert!(String::from_utf8_lossy(&out).contains("GITHUB_TOKEN is not set"));
    assert_eq!(read(&ws.path("README.md")), README);
}

#[test]
fn dry_run_writes_nothing() {
    let ws = Workspace::new(README, RAW);
    let out = ws
        .command()
        .arg("--dry-run")
        .arg("render")
        .arg("--input")
        .arg(ws.path("raw.json"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let stdout = String::from_utf8_lossy(&out);
    assert!(stdout.contains("Files that would be written"));
    assert!(stdout.contains("-placeholder"));
    assert_eq!(read(&ws.path("README.md")), README);
    assert!(!ws.path("assets").exists());
}

#[test]
fn stats_json_reports_summary() {
    let ws = Workspace::new(README, RAW);
    let out = ws
        .command()
        .args(["stats", "--json", "--input"])
        .arg(ws.path("raw.json"))
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["login"], "octocat");
    assert_eq!(v["stats"]["total"], 14);
    assert_eq!(v["stats"]["max_day_total"], 3);
    assert_eq!(v["stats"]["longest_streak"], 5);
    assert_eq!(v["stats"]["current_streak"], 1);
    assert_eq!(v["stats"]["top_category"], "private");
    assert!(!ws.path("assets").exists());
}

#[test]
fn window_days_out_of_range_is_rejected() {
    let ws = Workspace::new(README, RAW);
    let mut cmd = Command::cargo_bin("contribmap").unwrap();
    cmd.current_dir(&ws.root)
        .args(["--window-days", "400", "render", "--input"])
        .arg(ws.path("raw.json"))
        .assert()
        .failure();
}

#[test]
fn run_against_unresponsive_endpoint_writes_nothing() {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        if let Ok((stream, _)) = listener.accept() {
            std::thread::sleep(Duration::from_secs(10));
            drop(stream);
        }
    });

    let ws = Workspace::new(README, RAW);
    let out = ws
        .command()
        .env("GITHUB_TOKEN", "test-token")
        .arg("run")
        .arg("--endpoint")
        .arg(format!("http://{addr}/graphql"))
        .args(["--timeout", "200ms"])
        .assert()
        .failure()
        .get_output()
        .stderr
        .clone();

    assert!(String::from_utf8_lossy(&out).contains("Transport error"));
    assert_eq!(read(&ws.path("README.md")), README);
    assert!(!ws.path("assets").exists());
    assert!(!ws.path("data").exists());
}

#[test]
fn overflowing_counts_fail_without_artifacts() {
    let big = i64::MAX;
    let raw = format!(
        r#"{{ "login": "octocat", "events": [
            {{ "date": "2024-03-01", "category": "commit", "count": {big} }},
            {{ "date": "2024-03-02", "category": "commit", "count": {big} }},
            {{ "date": "2024-03-03", "category": "commit", "count": {big} }}
        ] }}"#
    );
    let ws = Workspace::new(README, &raw);
    let out = ws.render().assert().failure().get_output().stderr.clone();

    assert!(String::from_utf8_lossy(&out).contains("events[2].count"));
    assert!(!ws.path("assets").exists());
    assert_eq!(read(&ws.path("README.md")), README);
}

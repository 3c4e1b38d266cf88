//! End-to-end tests for the `sp` binary.
//!
//! Each test writes a small JSON history dump into a temp HOME and runs the
//! real binary against it.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

fn sp_binary() -> String {
    env!("CARGO_BIN_EXE_sp").to_string()
}

/// Runs `sp` with an isolated HOME and a fixed local timezone.
fn run_sp(home: &Path, args: &[&str]) -> Output {
    Command::new(sp_binary())
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env("TZ", "UTC")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run sp")
}

fn stdout(output: &Output) -> String {
    assert!(
        output.status.success(),
        "sp should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn write_history(dir: &Path) -> PathBuf {
    let path = dir.join("history.json");
    let history = serde_json::json!([
        {
            "url": "https://www.google.com/search?q=rust+lifetimes",
            "title": "rust lifetimes - Google Search",
            "visit_count": 2,
            "last_visit_time": "2023-05-01 10:00:00"
        },
        {
            "url": "https://www.google.com/search?q=weather",
            "title": "weather - Google Search",
            "last_visit_time": "2023-05-02 10:00:00"
        },
        {
            "url": "https://duckduckgo.com/?q=rust",
            "title": "rust at DuckDuckGo",
            "last_visit_time": "2023-05-03 10:00:00"
        },
        {
            "url": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
            "title": "Rust (programming language)",
            "last_visit_time": "2023-05-03 10:05:00"
        },
        {
            "url": "http://localhost:3000/?q=debug",
            "title": "dev server",
            "last_visit_time": "2023-05-04 09:00:00"
        }
    ]);
    std::fs::write(&path, serde_json::to_string_pretty(&history).unwrap()).unwrap();
    path
}

#[test]
fn test_report_full_history_json() {
    let temp = TempDir::new().unwrap();
    let history = write_history(temp.path());

    let output = run_sp(
        temp.path(),
        &[
            "report",
            "--full",
            "--json",
            "--history",
            history.to_str().unwrap(),
        ],
    );
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();

    assert_eq!(report["period"]["type"], "full");
    assert_eq!(report["totals"]["searches"], 3);
    assert_eq!(report["totals"]["systems"], 2);
    assert_eq!(report["timezone"].as_str().map(str::is_empty), Some(false));

    let engines = report["engines"].as_array().unwrap();
    assert_eq!(engines.len(), 2);
    assert_eq!(engines[0]["engine"], "google.com");
    assert_eq!(engines[0]["count"], 2);
    assert_eq!(engines[1]["engine"], "duckduckgo.com");
    assert_eq!(engines[1]["count"], 1);
}

#[test]
fn test_report_full_history_table() {
    let temp = TempDir::new().unwrap();
    let history = write_history(temp.path());

    let output = run_sp(
        temp.path(),
        &["report", "--full", "--history", history.to_str().unwrap()],
    );
    let text = stdout(&output);
    assert!(
        text.contains("Full history"),
        "missing period header:\n{text}"
    );
    assert!(text.contains("google.com"));
    assert!(text.contains("Total searches:         3"));
    assert!(
        !text.contains("localhost"),
        "skipped domains must not be ranked"
    );
}

#[test]
fn test_old_week_before_history_is_an_error() {
    let temp = TempDir::new().unwrap();
    let history = write_history(temp.path());

    let output = run_sp(
        temp.path(),
        &[
            "report",
            "--week",
            "5000",
            "--history",
            history.to_str().unwrap(),
        ],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("before the earliest recorded event"),
        "{stderr}"
    );
}

#[test]
fn test_list_full_history() {
    let temp = TempDir::new().unwrap();
    let history = write_history(temp.path());

    let output = run_sp(
        temp.path(),
        &["list", "--full", "--history", history.to_str().unwrap()],
    );
    let text = stdout(&output);
    assert!(text.contains("Query:  [rust lifetimes]"));
    assert!(text.contains("System: duckduckgo.com"));
    assert!(!text.contains("wikipedia"), "non-searches are not listed");
}

#[test]
fn test_export_csv_to_file() {
    let temp = TempDir::new().unwrap();
    let history = write_history(temp.path());
    let out = temp.path().join("searches.csv");

    let output = run_sp(
        temp.path(),
        &[
            "export",
            "--full",
            "--history",
            history.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
        ],
    );
    assert!(stdout(&output).contains("Exported 3 searches"));

    let csv = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Date,Root Domain,Search Query,URL");
    assert_eq!(
        lines[1],
        "2023-05-01 10:00:00,www.google.com,rust lifetimes,https://www.google.com/search?q=rust+lifetimes"
    );
    assert_eq!(
        lines[3],
        "2023-05-03 10:00:00,duckduckgo.com,rust,https://duckduckgo.com/?q=rust"
    );
}

#[test]
fn test_export_txt_to_stdout() {
    let temp = TempDir::new().unwrap();
    let history = write_history(temp.path());

    let output = run_sp(
        temp.path(),
        &[
            "export",
            "--full",
            "--format",
            "txt",
            "--history",
            history.to_str().unwrap(),
        ],
    );
    let text = stdout(&output);
    assert_eq!(text.lines().count(), 3);
    assert!(text.starts_with("2023-05-01 10:00:00, www.google.com, rust lifetimes, "));
}

#[test]
fn test_queries_are_counted() {
    let temp = TempDir::new().unwrap();
    let history = write_history(temp.path());

    let output = run_sp(
        temp.path(),
        &[
            "queries",
            "--full",
            "--history",
            history.to_str().unwrap(),
        ],
    );
    assert_eq!(
        stdout(&output),
        "    1  rust\n    1  rust lifetimes\n    1  weather\n"
    );
}

#[test]
fn test_context_marks_subject() {
    let temp = TempDir::new().unwrap();
    let history = write_history(temp.path());

    let output = run_sp(
        temp.path(),
        &[
            "context",
            "--at",
            "2023-05-03 10:00:00",
            "--radius",
            "1",
            "--history",
            history.to_str().unwrap(),
        ],
    );
    let text = stdout(&output);
    assert!(text.contains("**Subject Search Entry**"));
    assert!(text.contains("q=weather"));
    assert!(text.contains("wikipedia.org"));
    assert!(!text.contains("rust+lifetimes"), "outside the radius");
}

#[test]
fn test_context_without_match_fails() {
    let temp = TempDir::new().unwrap();
    let history = write_history(temp.path());

    let output = run_sp(
        temp.path(),
        &[
            "context",
            "--at",
            "2001-01-01 00:00:00",
            "--history",
            history.to_str().unwrap(),
        ],
    );
    assert!(!output.status.success());
}

#[test]
fn test_sources_from_config_file() {
    let temp = TempDir::new().unwrap();
    let history = write_history(temp.path());
    let config = temp.path().join("sp.toml");
    std::fs::write(
        &config,
        format!(
            "[sources]\nlaptop = \"{}\"\n",
            history.display().to_string().replace('\\', "\\\\")
        ),
    )
    .unwrap();

    let output = run_sp(
        temp.path(),
        &["--config", config.to_str().unwrap(), "sources"],
    );
    let text = stdout(&output);
    assert!(text.contains("laptop"));
    assert!(text.contains(" ok "));

    // the named source is usable for reports
    let output = run_sp(
        temp.path(),
        &[
            "--config",
            config.to_str().unwrap(),
            "report",
            "--full",
            "--json",
            "--source",
            "laptop",
        ],
    );
    let report: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(report["totals"]["searches"], 3);
}

#[test]
fn test_missing_history_is_reported() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.json");

    let output = run_sp(
        temp.path(),
        &["report", "--history", missing.to_str().unwrap()],
    );
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load history"), "{stderr}");
}

#[test]
fn test_no_history_configured() {
    let temp = TempDir::new().unwrap();

    let output = run_sp(temp.path(), &["report"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no history configured"), "{stderr}");
}

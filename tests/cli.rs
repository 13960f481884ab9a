use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn pgraph_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("pgraph");
    path
}

const PROFILES: &str = r#"{"public_identifier": "jane-doe", "full_name": "Jane Doe", "experiences": [{"company": "Acme", "title": "Engineer", "description": "Built services with Python and Kubernetes", "location": "Berlin"}], "languages": ["English"]}

{"public_identifier": "john-roe", "full_name": "John Roe", "experiences": [{"company": "Acme", "title": "Manager", "location": "Berlin"}]}
{broken
"#;

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let input_path = root.join("profiles.jsonl");
    fs::write(&input_path, PROFILES).unwrap();

    let config_content = format!(
        r#"[graph]
uri = "bolt://127.0.0.1:1"

[input]
path = "{}"

[ingest]
progress_interval = 1
"#,
        input_path.display()
    );

    let config_path = config_dir.join("pgraph.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_pgraph(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = pgraph_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run pgraph binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_dry_run_ingest() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_pgraph(&config_path, &["ingest", "--dry-run"]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("(dry-run)"));
    assert!(stdout.contains("records written: 2"));
    assert!(stdout.contains("empty: 1"));
    assert!(stdout.contains("malformed: 1"));
    assert!(stdout.contains("ok"));

    let counts: Vec<&str> = stdout.lines().map(str::trim).collect();
    assert!(counts.iter().any(|l| l.split_whitespace().eq(["Person", "2"])));
    assert!(counts.iter().any(|l| l.split_whitespace().eq(["Company", "1"])));
    assert!(counts.iter().any(|l| l.split_whitespace().eq(["WORKS_FOR", "2"])));
    assert!(counts.iter().any(|l| l.split_whitespace().eq(["HAS_SKILL", "2"])));
}

#[test]
fn test_dry_run_with_limit() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) =
        run_pgraph(&config_path, &["ingest", "--dry-run", "--limit", "1"]);
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("records written: 1"));
}

#[test]
fn test_json_progress_on_stderr() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_pgraph(
        &config_path,
        &["--progress", "json", "ingest", "--dry-run"],
    );
    assert!(success, "ingest failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stderr.contains(r#""event":"progress""#));
}

#[test]
fn test_missing_input_fails() {
    let tmp = TempDir::new().unwrap();
    let config_path = tmp.path().join("pgraph.toml");
    fs::write(
        &config_path,
        format!(
            "[input]\npath = \"{}/missing.jsonl\"\n",
            tmp.path().display()
        ),
    )
    .unwrap();

    let (_, stderr, success) = run_pgraph(&config_path, &["ingest", "--dry-run"]);
    assert!(!success);
    assert!(stderr.contains("Failed to open input file"));
}

#[test]
fn test_unreachable_graph_fails() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success) = run_pgraph(&config_path, &["ingest"]);
    assert!(!success);
}

#[test]
fn test_skills_command() {
    let (_tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_pgraph(
        &config_path,
        &["skills", "Built services with Python and Kubernetes"],
    );
    assert!(success, "skills failed: stdout={}, stderr={}", stdout, stderr);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["Kubernetes", "Python"]);

    let (stdout, _, success) = run_pgraph(&config_path, &["skills", "nothing relevant"]);
    assert!(success);
    assert!(stdout.contains("(no skills found)"));
}

#[test]
fn test_custom_vocabulary() {
    let (tmp, config_path) = setup_test_env();
    let vocab_path = tmp.path().join("skills.txt");
    fs::write(&vocab_path, "# custom\nTerraform\n").unwrap();
    let mut config = fs::read_to_string(&config_path).unwrap();
    config.push_str(&format!("\n[skills]\nvocabulary = \"{}\"\n", vocab_path.display()));
    fs::write(&config_path, config).unwrap();

    let (stdout, _, success) = run_pgraph(
        &config_path,
        &["skills", "Python and Terraform"],
    );
    assert!(success);
    assert_eq!(stdout.trim(), "Terraform");
}

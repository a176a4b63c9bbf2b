//! End-to-end tests for the `feednorm` binary: one JSON document per input
//! file on stdout, errors on stderr, non-zero exit when any file fails.

use pretty_assertions::assert_eq;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

const RSS: &str = r#"<rss version="2.0"><channel><title>Example</title>
<link>https://x.test/?utm_source=rss</link>
<item><title>Breaking: <![CDATA[News]]></title><pubDate>Mon, 1 Jan 2024 0:00:00 GMT</pubDate>
<description>one two three four five six seven</description></item>
</channel></rss>"#;

const ATOM: &str = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>Atom</title>
<entry><title>E</title><link href="https://x.test/e"/></entry></feed>"#;

const OPML: &str = r#"<opml version="2.0"><head/><body/></opml>"#;

/// Scratch directory holding the input files of one test.
struct Workdir(PathBuf);

impl Workdir {
    fn new(test: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("feednorm-cli-{test}-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.0.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn missing(&self, name: &str) -> PathBuf {
        self.0.join(name)
    }
}

impl Drop for Workdir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.0).ok();
    }
}

fn feednorm(args: &[&str], files: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_feednorm"))
        .args(args)
        .args(files)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout_documents(output: &Output) -> Vec<Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_normalizes_each_file_in_argument_order() {
    let dir = Workdir::new("order");
    let rss = dir.file("rss.xml", RSS);
    let atom = dir.file("atom.xml", ATOM);

    let output = feednorm(&[], &[&rss, &atom]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let docs = stdout_documents(&output);
    assert_eq!(docs.len(), 2);
    assert_eq!(docs[0]["title"], "Example");
    assert_eq!(docs[0]["link"], "https://x.test/");
    assert_eq!(docs[0]["entries"][0]["title"], "Breaking: News");
    assert_eq!(docs[0]["entries"][0]["published"], "2024-01-01T00:00:00.000Z");
    assert_eq!(docs[1]["title"], "Atom");
    assert_eq!(docs[1]["entries"][0]["link"], "https://x.test/e");
}

#[test]
fn test_unrecognized_document_prints_null() {
    let dir = Workdir::new("null");
    let opml = dir.file("subs.opml", OPML);

    let output = feednorm(&[], &[&opml]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "null");
}

#[test]
fn test_failures_reported_after_all_files() {
    let dir = Workdir::new("failures");
    let missing = dir.missing("gone.xml");
    let broken = dir.file("broken.xml", "<rss><channel><item></channel></rss>");
    let rss = dir.file("rss.xml", RSS);

    let output = feednorm(&[], &[&missing, &broken, &rss]);
    assert!(!output.status.success());

    let docs = stdout_documents(&output);
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["title"], "Example");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("gone.xml"), "stderr: {stderr}");
    assert!(stderr.contains("broken.xml"), "stderr: {stderr}");
    assert!(stderr.contains("2 of 3"), "stderr: {stderr}");
}

#[test]
fn test_tree_flag_prints_generic_tree() {
    let dir = Workdir::new("tree");
    let atom = dir.file("atom.xml", ATOM);

    let output = feednorm(&["--tree"], &[&atom]);
    assert!(output.status.success());

    let docs = stdout_documents(&output);
    assert_eq!(docs[0]["feed"]["@_xmlns"], "http://www.w3.org/2005/Atom");
    assert_eq!(docs[0]["feed"]["entry"]["link"]["@_href"], "https://x.test/e");
}

#[test]
fn test_pretty_flag_spreads_output() {
    let dir = Workdir::new("pretty");
    let atom = dir.file("atom.xml", ATOM);

    let output = feednorm(&["--pretty"], &[&atom]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.lines().count() > 1);
    let doc: Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(doc["title"], "Atom");
}

#[test]
fn test_config_file_applied() {
    let dir = Workdir::new("config");
    let rss = dir.file("rss.xml", RSS);
    let config = dir.file("feednorm.toml", "description_limit = 16\n");

    let output = feednorm(&["--config", config.to_str().unwrap()], &[&rss]);
    assert!(output.status.success());
    let docs = stdout_documents(&output);
    assert_eq!(docs[0]["entries"][0]["description"], "one two three...");
}

#[test]
fn test_invalid_config_aborts() {
    let dir = Workdir::new("bad-config");
    let rss = dir.file("rss.xml", RSS);
    let config = dir.file("feednorm.toml", "description_limit = \"many\"\n");

    let output = feednorm(&["--config", config.to_str().unwrap()], &[&rss]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

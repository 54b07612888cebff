//! Startup misconfiguration must stop the binary before any source is fetched.
//!
//! The RSS feed needs no credential, so it is the source a half-configured
//! process would reach first. Each run points it at a local listener and
//! checks afterwards whether anything connected.

use std::io::ErrorKind;
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Command, Output};

/// An empty working directory so no stray `.env` file is picked up.
fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("newsbot-{name}-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

struct Run {
    output: Output,
    feed_connections: usize,
}

/// Runs one `--once --dry-run` cycle with only `envs` set.
fn run_newsbot(name: &str, envs: &[(&str, &str)]) -> Run {
    let feed = TcpListener::bind("127.0.0.1:0").unwrap();
    feed.set_nonblocking(true).unwrap();
    let feed_url = format!("http://{}/rss", feed.local_addr().unwrap());

    let output = Command::new(env!("CARGO_BIN_EXE_newsbot"))
        .args(["--once", "--dry-run"])
        .env_clear()
        .env("NEWSBOT_RSS_FEED_URL", &feed_url)
        .env("NEWSBOT_LOG_FILE", "")
        .envs(envs.iter().copied())
        .current_dir(scratch_dir(name))
        .output()
        .expect("failed to spawn newsbot");

    // Completed handshakes wait in the backlog even after the client is gone.
    let mut feed_connections = 0;
    loop {
        match feed.accept() {
            Ok(_) => feed_connections += 1,
            Err(e) if e.kind() == ErrorKind::WouldBlock => break,
            Err(e) => panic!("accept failed: {e}"),
        }
    }

    Run {
        output,
        feed_connections,
    }
}

#[test]
fn missing_webhook_url_exits_before_any_fetch() {
    let run = run_newsbot("no-webhook", &[("FRED_API_KEY", "fred-key")]);
    assert!(!run.output.status.success());
    let stderr = String::from_utf8_lossy(&run.output.stderr);
    assert!(stderr.contains("DISCORD_WEBHOOK_URL"), "stderr: {stderr}");
    assert_eq!(run.feed_connections, 0);
    assert!(!String::from_utf8_lossy(&run.output.stdout).contains("News Summary"));
}

#[test]
fn no_credentials_exits_before_any_fetch() {
    let run = run_newsbot(
        "no-credentials",
        &[("DISCORD_WEBHOOK_URL", "http://127.0.0.1:1/hook")],
    );
    assert!(!run.output.status.success());
    assert_eq!(run.feed_connections, 0);
}

#[test]
fn invalid_interval_exits_before_any_fetch() {
    let run = run_newsbot(
        "bad-interval",
        &[
            ("DISCORD_WEBHOOK_URL", "http://127.0.0.1:1/hook"),
            ("FRED_API_KEY", "fred-key"),
            ("NEWSBOT_INTERVAL_SECS", "soon"),
        ],
    );
    assert!(!run.output.status.success());
    assert_eq!(run.feed_connections, 0);
}

#[test]
fn interval_shorter_than_worst_case_cycle_exits_before_any_fetch() {
    let run = run_newsbot(
        "overrun",
        &[
            ("DISCORD_WEBHOOK_URL", "http://127.0.0.1:1/hook"),
            ("FRED_API_KEY", "fred-key"),
            ("NEWSBOT_INTERVAL_SECS", "10"),
        ],
    );
    assert!(!run.output.status.success());
    assert_eq!(run.feed_connections, 0);
}

/// The same harness sees the fetch when startup succeeds, so the zero
/// counts above mean something.
#[test]
fn valid_config_fetches_the_feed_and_prints_the_digest() {
    let run = run_newsbot(
        "valid",
        &[
            ("DISCORD_WEBHOOK_URL", "http://127.0.0.1:1/hook"),
            ("FRED_API_KEY", "fred-key"),
            ("NEWSBOT_REQUEST_TIMEOUT_SECS", "1"),
            ("NEWSBOT_RATE_LIMIT_MS", "0"),
        ],
    );
    let stderr = String::from_utf8_lossy(&run.output.stderr);
    assert!(run.output.status.success(), "stderr: {stderr}");
    assert!(run.feed_connections >= 1);
    let stdout = String::from_utf8_lossy(&run.output.stdout);
    assert!(stdout.contains("News Summary"), "stdout: {stdout}");
}

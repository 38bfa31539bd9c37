// host-lookup-lib/tests/integration.rs

//! Integration tests for the pipeline: counts, dedup, caching and failures

use futures::future::BoxFuture;
use host_lookup_lib::{
    HostResolver, LookupConfig, LookupError, Pipeline, ReportLine, ResolutionCache,
    StaticResolver,
};
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::NamedTempFile;

/// Helper to create an input file with the given content
fn create_input_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file.flush().unwrap();
    file
}

/// Stub resolver that records how often each name was asked for.
#[derive(Default)]
struct CountingResolver {
    answers: HashMap<String, String>,
    calls: Mutex<HashMap<String, usize>>,
}

impl CountingResolver {
    fn new(answers: &[(&str, &str)]) -> Self {
        Self {
            answers: answers
                .iter()
                .map(|(name, addr)| (name.to_string(), addr.to_string()))
                .collect(),
            calls: Mutex::new(HashMap::new()),
        }
    }

    fn calls_for(&self, name: &str) -> usize {
        self.calls.lock().unwrap().get(name).copied().unwrap_or(0)
    }

    fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

impl HostResolver for CountingResolver {
    fn resolve<'a>(&'a self, host: &'a str) -> BoxFuture<'a, Result<String, LookupError>> {
        *self.calls.lock().unwrap().entry(host.to_string()).or_insert(0) += 1;
        Box::pin(async move {
            // Give other resolver tasks a chance to run in between.
            tokio::time::sleep(Duration::from_millis(1)).await;
            self.answers
                .get(host)
                .cloned()
                .ok_or_else(|| LookupError::resolution(host, "NXDOMAIN"))
        })
    }
}

fn sorted(mut lines: Vec<ReportLine>) -> Vec<String> {
    lines.sort_by(|a, b| a.name.cmp(&b.name));
    lines.into_iter().map(|line| line.to_string()).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_two_file_scenario() {
    let file_a = create_input_file("host1 host2 host1");
    let file_b = create_input_file("host2 host3");
    let resolver = Arc::new(CountingResolver::new(&[
        ("host1", "1.1.1.1"),
        ("host2", "2.2.2.2"),
    ]));

    let report = Pipeline::new()
        .with_resolver(resolver.clone())
        .run(&[file_a.path(), file_b.path()])
        .await
        .unwrap();

    assert_eq!(
        sorted(report.lines.clone()),
        vec!["2, host1, 1.1.1.1", "2, host2, 2.2.2.2", "1, host3, "]
    );
    assert_eq!(report.summary.files_read, 2);
    assert_eq!(report.summary.tokens, 5);
    assert_eq!(report.summary.distinct, 3);
    assert_eq!(report.summary.resolved, 2);
    assert_eq!(report.summary.failed, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_each_name_resolved_at_most_once() {
    let files: Vec<NamedTempFile> = (0..6)
        .map(|_| create_input_file("a.test b.test a.test c.test b.test a.test"))
        .collect();
    let paths: Vec<_> = files.iter().map(|f| f.path()).collect();
    let resolver = Arc::new(CountingResolver::new(&[
        ("a.test", "10.0.0.1"),
        ("b.test", "10.0.0.2"),
        ("c.test", "10.0.0.3"),
    ]));

    let report = Pipeline::new()
        .with_resolver(resolver.clone())
        .run(&paths)
        .await
        .unwrap();

    for name in ["a.test", "b.test", "c.test"] {
        assert_eq!(resolver.calls_for(name), 1, "{} resolved more than once", name);
    }
    assert_eq!(resolver.total_calls(), 3);
    assert_eq!(report.line("a.test").unwrap().count, 18);
    assert_eq!(report.line("b.test").unwrap().count, 12);
    assert_eq!(report.line("c.test").unwrap().count, 6);
}

#[tokio::test]
async fn test_failed_lookup_is_not_cached() {
    let file = create_input_file("good.test bad.test");
    let resolver = Arc::new(StaticResolver::new().with_entry("good.test", "192.0.2.1"));
    let cache = Arc::new(ResolutionCache::new());

    let report = Pipeline::new()
        .with_resolver(resolver)
        .run_with_cache(&[file.path()], cache.clone())
        .await
        .unwrap();

    assert_eq!(report.line("bad.test").unwrap().address, "");
    assert!(!cache.contains("bad.test"));
    assert_eq!(cache.get("good.test"), Some("192.0.2.1".to_string()));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_producers_keep_names_unique() {
    // Eight files drawing from an overlapping pool of twenty names.
    let mut expected: HashMap<String, usize> = HashMap::new();
    let mut files = Vec::new();
    for file_idx in 0..8 {
        let names: Vec<String> = (0..200)
            .map(|i| format!("n{}.test", (i * 7 + file_idx * 3) % 20))
            .collect();
        for name in &names {
            *expected.entry(name.clone()).or_insert(0) += 1;
        }
        files.push(create_input_file(&names.join(" ")));
    }
    let paths: Vec<_> = files.iter().map(|f| f.path()).collect();

    let config = LookupConfig::default()
        .with_queue_capacity(2)
        .with_max_producers(8)
        .with_jitter(Duration::ZERO);
    let report = Pipeline::with_config(config)
        .with_resolver(Arc::new(StaticResolver::new()))
        .run(&paths)
        .await
        .unwrap();

    assert_eq!(report.lines.len(), expected.len());
    let mut seen = HashMap::new();
    for line in &report.lines {
        assert!(
            seen.insert(line.name.clone(), line.count).is_none(),
            "duplicate entry for {}",
            line.name
        );
    }
    assert_eq!(seen, expected);
    assert_eq!(report.summary.tokens, 8 * 200);
}

#[tokio::test]
async fn test_rerun_with_fresh_cache_is_idempotent() {
    let file_a = create_input_file("x.test y.test\nx.test");
    let file_b = create_input_file("z.test y.test");
    let resolver = Arc::new(
        StaticResolver::new()
            .with_entry("x.test", "198.51.100.1")
            .with_entry("y.test", "198.51.100.2"),
    );
    let pipeline = Pipeline::new().with_resolver(resolver.clone());

    let first = pipeline.run(&[file_a.path(), file_b.path()]).await.unwrap();
    let second = pipeline.run(&[file_a.path(), file_b.path()]).await.unwrap();

    assert_eq!(sorted(first.lines), sorted(second.lines));
    // Fresh cache per run: every distinct name hits the resolver each time.
    assert_eq!(resolver.lookup_count(), 6);
}

#[tokio::test]
async fn test_unreadable_input_does_not_stop_run() {
    let good = create_input_file("only.test");
    let resolver = Arc::new(StaticResolver::new().with_entry("only.test", "203.0.113.9"));

    let report = Pipeline::new()
        .with_resolver(resolver)
        .run(&[
            std::path::Path::new("/nonexistent/names1.txt"),
            good.path(),
        ])
        .await
        .unwrap();

    assert_eq!(report.summary.files_skipped, 1);
    assert_eq!(
        sorted(report.lines),
        vec!["1, only.test, 203.0.113.9".to_string()]
    );
}

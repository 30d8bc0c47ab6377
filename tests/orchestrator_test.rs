mod common;

use codesearch::{Error, QueryType, SearchOrchestrator, Settlement};
use common::{call_count, snippet, test_config, MockBackend, Reply};
use std::time::Duration;
use tokio::runtime::Handle;

#[tokio::test]
async fn test_search_sends_one_hybrid_request_with_trimmed_query() {
    let backend = MockBackend::new().reply(Reply::Results(vec![snippet("1", "auth/login.ts", 10)]));
    let calls = backend.calls();
    let mut orchestrator = SearchOrchestrator::new(&test_config(), backend);

    let settled = orchestrator.search("  find login handler ").await.unwrap();

    assert_eq!(settled, Settlement::Applied { count: 1 });
    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "demo");
    assert_eq!(calls[0].1.query, "find login handler");
    assert_eq!(calls[0].1.query_type, QueryType::Hybrid);
}

#[tokio::test]
async fn test_empty_query_sends_nothing() {
    let backend = MockBackend::new();
    let calls = backend.calls();
    let mut orchestrator = SearchOrchestrator::new(&test_config(), backend);

    for query in ["", "   ", "\t\n"] {
        let err = orchestrator.search(query).await.unwrap_err();
        assert!(matches!(err, Error::EmptyQuery));
        assert!(orchestrator
            .dispatch(query, &Handle::current())
            .is_err());
    }

    tokio::task::yield_now().await;
    assert_eq!(call_count(&calls), 0);
    assert!(!orchestrator.is_loading());
}

#[tokio::test]
async fn test_busy_only_while_request_in_flight() {
    let backend = MockBackend::new();
    let release = backend.gated_reply(Reply::Results(vec![snippet("1", "a.rs", 1)]));
    let mut orchestrator = SearchOrchestrator::new(&test_config(), backend);

    assert!(!orchestrator.is_loading());
    orchestrator.dispatch("query", &Handle::current()).unwrap();
    assert!(orchestrator.is_loading());

    // Nothing settles until the response is released
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(orchestrator.poll_completions().is_empty());
    assert!(orchestrator.is_loading());

    release.send(()).unwrap();
    let settled = orchestrator.next_completion().await.unwrap();
    assert_eq!(settled, Settlement::Applied { count: 1 });
    assert!(!orchestrator.is_loading());
}

#[tokio::test]
async fn test_busy_cleared_after_failure() {
    let backend = MockBackend::new();
    let release = backend.gated_reply(Reply::Status(500));
    let mut orchestrator = SearchOrchestrator::new(&test_config(), backend);

    orchestrator.dispatch("query", &Handle::current()).unwrap();
    assert!(orchestrator.is_loading());

    release.send(()).unwrap();
    let err = orchestrator.next_completion().await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 500, .. }));
    assert!(!orchestrator.is_loading());
    assert!(orchestrator.state().last_error().is_some());
}

#[tokio::test]
async fn test_results_keep_response_order() {
    let results = vec![
        snippet("c", "z/last.py", 30),
        snippet("a", "a/first.py", 1),
        snippet("b", "m/middle.py", 12),
    ];
    let backend = MockBackend::new().reply(Reply::Results(results.clone()));
    let mut orchestrator = SearchOrchestrator::new(&test_config(), backend);

    orchestrator.search("order").await.unwrap();

    assert_eq!(orchestrator.results(), results.as_slice());
}

#[tokio::test]
async fn test_empty_response_clears_results() {
    let backend = MockBackend::new()
        .reply(Reply::Results(vec![snippet("1", "a.rs", 1)]))
        .reply(Reply::Results(Vec::new()));
    let mut orchestrator = SearchOrchestrator::new(&test_config(), backend);

    orchestrator.search("first").await.unwrap();
    assert_eq!(orchestrator.results().len(), 1);

    let settled = orchestrator.search("second").await.unwrap();
    assert_eq!(settled, Settlement::Applied { count: 0 });
    assert!(orchestrator.results().is_empty());
    assert!(!orchestrator.is_loading());
}

#[tokio::test]
async fn test_network_error_keeps_previous_results() {
    let first = vec![snippet("1", "auth/login.ts", 10), snippet("2", "auth/logout.ts", 4)];
    let backend = MockBackend::new()
        .reply(Reply::Results(first.clone()))
        .reply(Reply::NetworkError);
    let mut orchestrator = SearchOrchestrator::new(&test_config(), backend);

    orchestrator.search("login").await.unwrap();
    let err = orchestrator.search("logout").await.unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert_eq!(orchestrator.results(), first.as_slice());
    assert!(!orchestrator.is_loading());
    assert!(orchestrator
        .state()
        .last_error()
        .unwrap()
        .contains("connection refused"));
}

#[tokio::test]
async fn test_stale_response_is_discarded() {
    let backend = MockBackend::new();
    let release_old =
        backend.gated_reply_for("first", Reply::Results(vec![snippet("old", "old.rs", 1)]));
    let release_new =
        backend.gated_reply_for("second", Reply::Results(vec![snippet("new", "new.rs", 1)]));
    let mut orchestrator = SearchOrchestrator::new(&test_config(), backend);

    let old = orchestrator.dispatch("first", &Handle::current()).unwrap();
    let new = orchestrator.dispatch("second", &Handle::current()).unwrap();
    assert!(new > old);
    assert_eq!(orchestrator.state().latest(), Some(new));

    // Newer response arrives first and is applied
    release_new.send(()).unwrap();
    let settled = orchestrator.next_completion().await.unwrap();
    assert_eq!(settled, Settlement::Applied { count: 1 });
    assert!(!orchestrator.is_loading());

    // The older one shows up late and must not overwrite anything
    release_old.send(()).unwrap();
    let settled = orchestrator.next_completion().await.unwrap();
    assert_eq!(settled, Settlement::Stale);
    assert_eq!(orchestrator.results()[0].id, "new");
    assert_eq!(orchestrator.state().last_query(), Some("second"));
}

#[tokio::test]
async fn test_stale_failure_does_not_touch_state() {
    let backend = MockBackend::new();
    let release_old = backend.gated_reply_for("first", Reply::NetworkError);
    let release_new = backend.gated_reply_for("second", Reply::Results(Vec::new()));
    let mut orchestrator = SearchOrchestrator::new(&test_config(), backend);

    orchestrator.dispatch("first", &Handle::current()).unwrap();
    orchestrator.dispatch("second", &Handle::current()).unwrap();

    release_old.send(()).unwrap();
    let settled = orchestrator.next_completion().await.unwrap();
    assert_eq!(settled, Settlement::Stale);
    // Still waiting on the latest request
    assert!(orchestrator.is_loading());
    assert!(orchestrator.state().last_error().is_none());

    release_new.send(()).unwrap();
    orchestrator.next_completion().await.unwrap();
    assert!(!orchestrator.is_loading());
}

#[tokio::test]
async fn test_cancelled_search_releases_busy_flag() {
    let backend = MockBackend::new();
    let _never = backend.gated_reply(Reply::Results(Vec::new()));
    let mut orchestrator = SearchOrchestrator::new(&test_config(), backend);

    let timed_out =
        tokio::time::timeout(Duration::from_millis(20), orchestrator.search("slow")).await;

    assert!(timed_out.is_err());
    assert!(!orchestrator.is_loading());
    assert!(orchestrator.results().is_empty());
}

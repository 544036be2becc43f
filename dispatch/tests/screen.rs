//! Dispatch behavior against a scripted in-memory transport.
//!
//! # Design
//! `FakeTransport` records every request and answers each call from a queue
//! of oneshot receivers, so a test decides when (and in which order) calls
//! complete. That makes the loading flag and overlapping dispatches
//! observable without timing assumptions.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use echo_core::{
    EchoClient, HttpMethod, HttpRequest, HttpResponse, Operation, ResponseState, TransportError,
};
use echo_dispatch::{ResultPolicy, Screen, Transport};
use serde_json::json;
use tokio::sync::oneshot;

type Reply = Result<HttpResponse, TransportError>;

#[derive(Default)]
struct FakeTransport {
    calls: Mutex<Vec<HttpRequest>>,
    pending: Mutex<VecDeque<oneshot::Receiver<Reply>>>,
}

impl FakeTransport {
    /// Queue the answer for the next call; send on the returned handle to
    /// complete it.
    fn next_reply(&self) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.pending.lock().unwrap().push_back(rx);
        tx
    }

    fn answer_next(&self, reply: Reply) {
        let _ = self.next_reply().send(reply);
    }

    fn calls(&self) -> Vec<HttpRequest> {
        self.calls.lock().unwrap().clone()
    }

    async fn wait_for_calls(&self, n: usize) {
        while self.calls.lock().unwrap().len() < n {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.calls.lock().unwrap().push(request);
        let pending = self.pending.lock().unwrap().pop_front();
        match pending {
            Some(rx) => rx
                .await
                .unwrap_or_else(|_| Err(TransportError::Other("reply dropped".to_string()))),
            None => Err(TransportError::Connect("connection refused".to_string())),
        }
    }
}

const BASE_URL: &str = "http://echo.test";

fn setup(policy: ResultPolicy) -> (Arc<FakeTransport>, Screen) {
    let transport = Arc::new(FakeTransport::default());
    let screen = Screen::with_options(
        EchoClient::with_base_url(BASE_URL),
        transport.clone(),
        policy,
    );
    (transport, screen)
}

fn ok_json(body: &str) -> Reply {
    Ok(HttpResponse::new(200, "OK", body))
}

// --- one call per operation ---

#[tokio::test]
async fn each_operation_issues_one_documented_call() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    screen.set_name("Ana");
    screen.set_message("oi");
    screen.set_status_code("404");

    let expected = [
        (Operation::Get, HttpMethod::Get, "/get", None),
        (Operation::Post, HttpMethod::Post, "/post", Some("POST")),
        (Operation::Put, HttpMethod::Put, "/put", Some("PUT")),
        (Operation::Delete, HttpMethod::Delete, "/delete", None),
        (Operation::Status, HttpMethod::Get, "/status/404", None),
    ];

    for (i, (op, method, path, kind)) in expected.into_iter().enumerate() {
        transport.answer_next(ok_json("{}"));
        screen.dispatch(op).await;

        let calls = transport.calls();
        assert_eq!(calls.len(), i + 1, "{op}: exactly one new call");
        let req = &calls[i];
        assert_eq!(req.method, method, "{op}: method");
        assert_eq!(req.url, format!("{BASE_URL}{path}"), "{op}: url");
        match kind {
            Some(kind) => {
                assert_eq!(req.header("Content-Type"), Some("application/json"), "{op}");
                let body: serde_json::Value =
                    serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
                assert_eq!(body, json!({"nome": "Ana", "mensagem": "oi", "tipo": kind}));
            }
            None => {
                assert!(req.body.is_none(), "{op}: no body");
                assert!(req.headers.is_empty(), "{op}: no headers");
            }
        }
    }
}

#[tokio::test]
async fn status_code_is_not_validated() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    screen.set_status_code("abc");
    transport.answer_next(Ok(HttpResponse::new(400, "Bad Request", "Invalid status code")));

    screen.dispatch(Operation::Status).await;

    assert_eq!(transport.calls()[0].url, "http://echo.test/status/abc");
    assert_eq!(
        screen.response().to_json(),
        Some(json!({"status": 400, "statusText": "Bad Request"}))
    );
}

#[tokio::test]
async fn form_is_read_at_dispatch_time() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    screen.set_name("primeiro");
    transport.answer_next(ok_json("{}"));
    screen.dispatch(Operation::Post).await;

    screen.set_name("segundo");
    transport.answer_next(ok_json("{}"));
    screen.dispatch(Operation::Post).await;

    let names: Vec<String> = transport
        .calls()
        .iter()
        .map(|req| {
            let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
            body["nome"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(names, ["primeiro", "segundo"]);
}

// --- decoding ---

#[tokio::test]
async fn json_body_becomes_response_state() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    transport.answer_next(ok_json(r#"{"a":1}"#));

    screen.dispatch(Operation::Get).await;

    assert_eq!(screen.response(), ResponseState::Decoded(json!({"a": 1})));
    assert!(!screen.is_loading());
}

#[tokio::test]
async fn non_json_body_falls_back_to_status_line() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    screen.set_status_code("418");
    transport.answer_next(Ok(HttpResponse::new(418, "I'm a teapot", "-=[ teapot ]=-")));

    screen.dispatch(Operation::Status).await;

    assert_eq!(
        screen.response().to_json(),
        Some(json!({"status": 418, "statusText": "I'm a teapot"}))
    );
    assert!(!screen.is_loading());
}

// --- failures ---

#[tokio::test]
async fn transport_failure_shows_generic_marker() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    transport.answer_next(Err(TransportError::Connect("connection refused".to_string())));

    screen.dispatch(Operation::Get).await;

    assert_eq!(screen.response(), ResponseState::Failed);
    assert_eq!(
        screen.response().to_json(),
        Some(json!({"error": "Erro ao chamar API"}))
    );
    assert!(!screen.is_loading());
}

#[tokio::test]
async fn every_transport_error_collapses_to_the_same_marker() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    for err in [
        TransportError::Timeout,
        TransportError::Other("tls handshake".to_string()),
    ] {
        transport.answer_next(Err(err));
        screen.dispatch(Operation::Delete).await;
        assert_eq!(screen.response(), ResponseState::Failed);
    }
}

#[tokio::test]
async fn unsupported_operation_skips_the_network() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    let loading = screen.subscribe_loading();

    screen.dispatch_named("PATCH").await;

    assert!(transport.calls().is_empty());
    assert_eq!(screen.response(), ResponseState::Failed);
    assert!(!screen.is_loading());
    assert!(loading.has_changed().unwrap());
}

#[tokio::test]
async fn named_dispatch_accepts_button_labels() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    transport.answer_next(ok_json(r#"{"method":"DELETE"}"#));

    screen.dispatch_named("DELETE").await;

    assert_eq!(transport.calls()[0].method, HttpMethod::Delete);
    assert_eq!(screen.response().to_json().unwrap()["method"], "DELETE");
}

// --- loading flag ---

#[tokio::test]
async fn loading_is_true_only_while_in_flight() {
    for reply in [
        ok_json(r#"{"a":1}"#),
        Ok(HttpResponse::new(204, "No Content", "")),
        Err(TransportError::Timeout),
    ] {
        let (transport, screen) = setup(ResultPolicy::LastWriteWins);
        assert!(!screen.is_loading());

        let gate = transport.next_reply();
        let handle = screen.spawn_dispatch(Operation::Get);
        transport.wait_for_calls(1).await;

        assert!(screen.is_loading());
        assert!(screen.response().is_absent());

        gate.send(reply).unwrap();
        handle.await.unwrap();

        assert!(!screen.is_loading());
        assert!(!screen.response().is_absent());
    }
}

#[tokio::test]
async fn new_dispatch_clears_previous_response() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    transport.answer_next(ok_json(r#"{"first":true}"#));
    screen.dispatch(Operation::Get).await;
    assert!(!screen.response().is_absent());

    let gate = transport.next_reply();
    let handle = screen.spawn_dispatch(Operation::Get);
    transport.wait_for_calls(2).await;
    assert!(screen.response().is_absent());

    gate.send(ok_json(r#"{"second":true}"#)).unwrap();
    handle.await.unwrap();
    assert_eq!(screen.response(), ResponseState::Decoded(json!({"second": true})));
}

#[tokio::test]
async fn response_changes_are_observable() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    let mut rx = screen.subscribe_response();
    transport.answer_next(ok_json(r#"{"x":[1,2]}"#));

    let handle = screen.spawn_dispatch(Operation::Get);
    rx.wait_for(|state| !state.is_absent()).await.unwrap();
    handle.await.unwrap();

    assert_eq!(*rx.borrow(), ResponseState::Decoded(json!({"x": [1, 2]})));
}

// --- overlapping dispatches ---

#[tokio::test]
async fn repeated_dispatch_is_not_deduplicated() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    transport.answer_next(ok_json("{}"));
    transport.answer_next(ok_json("{}"));

    screen.dispatch(Operation::Post).await;
    screen.dispatch(Operation::Post).await;

    let calls = transport.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[0], calls[1]);
}

#[tokio::test]
async fn last_completion_wins_by_default() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    let older = transport.next_reply();
    let newer = transport.next_reply();

    let first = screen.spawn_dispatch(Operation::Get);
    transport.wait_for_calls(1).await;
    let second = screen.spawn_dispatch(Operation::Delete);
    transport.wait_for_calls(2).await;

    newer.send(ok_json(r#"{"from":"delete"}"#)).unwrap();
    second.await.unwrap();
    assert_eq!(screen.response().to_json().unwrap()["from"], "delete");
    // The older call is still in flight, but the flag was cleared anyway.
    assert!(!screen.is_loading());

    older.send(ok_json(r#"{"from":"get"}"#)).unwrap();
    first.await.unwrap();
    assert_eq!(screen.response().to_json().unwrap()["from"], "get");
    assert!(!screen.is_loading());
}

#[tokio::test]
async fn latest_only_drops_superseded_results() {
    let (transport, screen) = setup(ResultPolicy::LatestOnly);
    let older = transport.next_reply();
    let newer = transport.next_reply();

    let first = screen.spawn_dispatch(Operation::Get);
    transport.wait_for_calls(1).await;
    let second = screen.spawn_dispatch(Operation::Delete);
    transport.wait_for_calls(2).await;

    // Stale completion first: nothing changes, the newer call is still loading.
    older.send(ok_json(r#"{"from":"get"}"#)).unwrap();
    first.await.unwrap();
    assert!(screen.response().is_absent());
    assert!(screen.is_loading());

    newer.send(ok_json(r#"{"from":"delete"}"#)).unwrap();
    second.await.unwrap();
    assert_eq!(screen.response().to_json().unwrap()["from"], "delete");
    assert!(!screen.is_loading());
}

#[tokio::test]
async fn latest_only_ignores_late_stale_result() {
    let (transport, screen) = setup(ResultPolicy::LatestOnly);
    let older = transport.next_reply();
    let newer = transport.next_reply();

    let first = screen.spawn_dispatch(Operation::Get);
    transport.wait_for_calls(1).await;
    let second = screen.spawn_dispatch(Operation::Put);
    transport.wait_for_calls(2).await;

    newer.send(ok_json(r#"{"from":"put"}"#)).unwrap();
    second.await.unwrap();
    older.send(Err(TransportError::Timeout)).unwrap();
    first.await.unwrap();

    assert_eq!(screen.response().to_json().unwrap()["from"], "put");
    assert!(!screen.is_loading());
}

// --- abnormal exits ---

struct PanickingTransport;

#[async_trait]
impl Transport for PanickingTransport {
    async fn execute(&self, _request: HttpRequest) -> Result<HttpResponse, TransportError> {
        panic!("transport blew up");
    }
}

#[tokio::test]
async fn panicking_transport_does_not_leave_loading_stuck() {
    let screen = Screen::with_options(
        EchoClient::with_base_url(BASE_URL),
        Arc::new(PanickingTransport),
        ResultPolicy::LastWriteWins,
    );

    let err = screen.spawn_dispatch(Operation::Get).await.unwrap_err();

    assert!(err.is_panic());
    assert!(!screen.is_loading());
    assert!(screen.response().is_absent());
}

#[tokio::test]
async fn aborted_dispatch_lowers_loading() {
    let (transport, screen) = setup(ResultPolicy::LastWriteWins);
    let _gate = transport.next_reply();

    let handle = screen.spawn_dispatch(Operation::Get);
    transport.wait_for_calls(1).await;
    assert!(screen.is_loading());

    handle.abort();
    let err = handle.await.unwrap_err();

    assert!(err.is_cancelled());
    assert!(!screen.is_loading());
}

#[tokio::test]
async fn aborted_stale_dispatch_keeps_newer_loading() {
    let (transport, screen) = setup(ResultPolicy::LatestOnly);
    let _older = transport.next_reply();
    let newer = transport.next_reply();

    let first = screen.spawn_dispatch(Operation::Get);
    transport.wait_for_calls(1).await;
    let second = screen.spawn_dispatch(Operation::Put);
    transport.wait_for_calls(2).await;

    first.abort();
    assert!(first.await.unwrap_err().is_cancelled());
    assert!(screen.is_loading());

    newer.send(ok_json(r#"{"from":"put"}"#)).unwrap();
    second.await.unwrap();
    assert_eq!(screen.response().to_json().unwrap()["from"], "put");
    assert!(!screen.is_loading());
}

//! The worker protocol spoken by hand.

use quarry::runtime::protocol::{chunk_checksum, decode, encode};
use quarry::runtime::{ErrorKind, Request, RequestId, Response, WorkerHandle};
use quarry::testing::make_post;
use quarry::{Corpus, ExecutedBy, IndexVersion, Item, SearchConfig, SearchRequest};
use std::time::Duration;

fn worker() -> WorkerHandle {
    WorkerHandle::spawn(SearchConfig::default()).unwrap()
}

fn send_index(handle: &WorkerHandle, request: &Request) {
    handle.send_index(encode(request).unwrap()).unwrap();
}

fn next_response(handle: &WorkerHandle) -> Response {
    let frame = handle
        .responses()
        .recv_timeout(Duration::from_secs(5))
        .expect("worker response");
    decode(&frame).unwrap()
}

fn chunk(batch_id: u64, seq: u32, items: Vec<Item>) -> Request {
    Request::FullChunk {
        batch_id,
        seq,
        checksum: chunk_checksum(&items).unwrap(),
        items,
    }
}

fn item(id: &str, body: &str) -> Item {
    Item::clone(&make_post(id, 1, body))
}

#[test]
fn test_chunked_load_then_query() {
    let handle = worker();
    send_index(
        &handle,
        &Request::FullStart {
            batch_id: 1,
            corpus: Corpus::Authored,
            total_items: 2,
            chunk_count: 2,
        },
    );
    send_index(&handle, &chunk(1, 0, vec![item("a", "alpha beta")]));
    send_index(&handle, &chunk(1, 1, vec![item("b", "alpha")]));
    send_index(&handle, &Request::FullCommit { batch_id: 1 });

    assert_eq!(
        next_response(&handle),
        Response::IndexReady {
            version: IndexVersion(1),
            corpus: Corpus::Authored,
            doc_count: 2,
            batch_id: Some(1),
        }
    );

    let run = Request::QueryRun {
        request_id: RequestId(7),
        observed_version: IndexVersion(1),
        request: SearchRequest::new("alpha -beta"),
    };
    handle.send_query(encode(&run).unwrap()).unwrap();
    match next_response(&handle) {
        Response::QueryResult { request_id, result } => {
            assert_eq!(request_id, RequestId(7));
            assert_eq!(result.ids, vec!["b"]);
            assert_eq!(result.index_version, IndexVersion(1));
            assert_eq!(result.diagnostics.executed_by, ExecutedBy::Background);
        }
        other => panic!("expected query.result, got {other:?}"),
    }
    handle.shutdown();
}

#[test]
fn test_commit_with_missing_chunk_is_rejected() {
    let handle = worker();
    send_index(
        &handle,
        &Request::FullStart {
            batch_id: 3,
            corpus: Corpus::Context,
            total_items: 2,
            chunk_count: 2,
        },
    );
    send_index(&handle, &chunk(3, 0, vec![item("a", "alpha")]));
    send_index(&handle, &Request::FullCommit { batch_id: 3 });

    match next_response(&handle) {
        Response::Error { kind, batch_id, .. } => {
            assert_eq!(kind, ErrorKind::BatchRejected);
            assert_eq!(batch_id, Some(3));
        }
        other => panic!("expected error, got {other:?}"),
    }
    handle.shutdown();
}

#[test]
fn test_newer_load_supersedes_unfinished_one() {
    let handle = worker();
    for batch_id in [1, 2] {
        send_index(
            &handle,
            &Request::FullStart {
                batch_id,
                corpus: Corpus::Authored,
                total_items: 1,
                chunk_count: 1,
            },
        );
    }
    send_index(&handle, &chunk(1, 0, vec![item("old", "alpha")]));
    match next_response(&handle) {
        Response::Error { kind, batch_id, .. } => {
            assert_eq!(kind, ErrorKind::BatchRejected);
            assert_eq!(batch_id, Some(1));
        }
        other => panic!("expected error, got {other:?}"),
    }

    send_index(&handle, &chunk(2, 0, vec![item("new", "alpha")]));
    send_index(&handle, &Request::FullCommit { batch_id: 2 });
    assert!(matches!(
        next_response(&handle),
        Response::IndexReady { batch_id: Some(2), doc_count: 1, .. }
    ));
    handle.shutdown();
}

#[test]
fn test_undecodable_frames_are_reported() {
    let handle = worker();

    handle.send_index(b"not json".to_vec()).unwrap();
    assert!(matches!(
        next_response(&handle),
        Response::Error { kind: ErrorKind::Deserialize, .. }
    ));

    let future = br#"{"schema":99,"body":{"type":"query.cancel","requestId":1}}"#;
    handle.send_query(future.to_vec()).unwrap();
    match next_response(&handle) {
        Response::Error { kind, message, .. } => {
            assert_eq!(kind, ErrorKind::Schema);
            assert!(kind.is_fatal());
            assert!(message.contains("99"));
        }
        other => panic!("expected error, got {other:?}"),
    }
    handle.shutdown();
}

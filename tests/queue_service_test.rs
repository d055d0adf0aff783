//! Queue service over a real loopback socket.

use std::sync::Arc;

use configwatchd::executor::Executor;
use configwatchd::queue::ReloadQueue;
use configwatchd::rpc::{self, FlushOpts, QueueClient, QueueService, RpcError};
use parking_lot::Mutex;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Span;

#[derive(Default)]
struct RecordingExecutor {
    calls: Mutex<Vec<String>>,
}

impl Executor for RecordingExecutor {
    fn execute(&self, key: &str) {
        self.calls.lock().push(key.to_string());
    }
}

struct Harness {
    queue: Arc<ReloadQueue>,
    executor: Arc<RecordingExecutor>,
    client: QueueClient,
    cancel: CancellationToken,
    handle: JoinHandle<std::io::Result<()>>,
}

impl Harness {
    async fn start(queue_enabled: bool, keys: &[&str]) -> Self {
        let executor = Arc::new(RecordingExecutor::default());
        let queue = Arc::new(ReloadQueue::new(executor.clone()));
        for key in keys {
            queue.enqueue(key);
        }

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let cancel = CancellationToken::new();
        let service = QueueService::new(queue.clone(), queue_enabled);
        let handle = tokio::spawn(rpc::serve(listener, service, cancel.clone(), Span::none()));

        Self {
            queue,
            executor,
            client: QueueClient::new(addr.to_string()).unwrap(),
            cancel,
            handle,
        }
    }

    async fn stop(self) {
        self.cancel.cancel();
        self.handle.await.unwrap().unwrap();
    }
}

fn keys(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_list_returns_insertion_order() {
    let harness = Harness::start(true, &["b", "a", "c"]).await;
    assert_eq!(harness.client.list().await.unwrap(), keys(&["b", "a", "c"]));
    harness.stop().await;
}

#[tokio::test]
async fn test_flush_selected_key() {
    let harness = Harness::start(true, &["a", "k", "b"]).await;

    let processed = harness
        .client
        .flush(&FlushOpts {
            keys: keys(&["k"]),
            clear: false,
        })
        .await
        .unwrap();

    assert_eq!(processed, keys(&["k"]));
    assert_eq!(harness.client.list().await.unwrap(), keys(&["a", "b"]));
    assert_eq!(*harness.executor.calls.lock(), keys(&["k"]));
    harness.stop().await;
}

#[tokio::test]
async fn test_flush_clear_does_not_execute() {
    let harness = Harness::start(true, &["a", "k", "b"]).await;

    harness
        .client
        .flush(&FlushOpts {
            keys: keys(&["k"]),
            clear: true,
        })
        .await
        .unwrap();
    assert_eq!(harness.queue.list(), keys(&["a", "b"]));

    harness
        .client
        .flush(&FlushOpts {
            keys: vec![],
            clear: true,
        })
        .await
        .unwrap();
    assert!(harness.queue.is_empty());
    assert!(harness.executor.calls.lock().is_empty());
    harness.stop().await;
}

#[tokio::test]
async fn test_flush_all_matches_flush_of_every_key() {
    let all = Harness::start(true, &["a", "b", "c"]).await;
    let named = Harness::start(true, &["a", "b", "c"]).await;

    all.client.flush(&FlushOpts::default()).await.unwrap();
    let every_key = named.client.list().await.unwrap();
    named
        .client
        .flush(&FlushOpts {
            keys: every_key,
            clear: false,
        })
        .await
        .unwrap();

    assert_eq!(all.queue.list(), named.queue.list());
    assert_eq!(*all.executor.calls.lock(), *named.executor.calls.lock());
    assert_eq!(*all.executor.calls.lock(), keys(&["a", "b", "c"]));

    all.stop().await;
    named.stop().await;
}

#[tokio::test]
async fn test_disabled_queue_reports_error_without_mutation() {
    let harness = Harness::start(false, &["a"]).await;

    let list_err = harness.client.list().await.unwrap_err();
    assert!(matches!(list_err, RpcError::QueueDisabled));

    let flush_err = harness
        .client
        .flush(&FlushOpts::default())
        .await
        .unwrap_err();
    assert!(matches!(flush_err, RpcError::QueueDisabled));
    assert_eq!(flush_err.to_string(), "Queue is disabled, nothing to do.");

    assert_eq!(harness.queue.list(), keys(&["a"]));
    assert!(harness.executor.calls.lock().is_empty());
    harness.stop().await;
}

#[tokio::test]
async fn test_concurrent_clients() {
    let harness = Harness::start(true, &[]).await;
    let addr = harness.client.addr().to_string();

    let mut tasks = Vec::new();
    for i in 0..10 {
        let queue = harness.queue.clone();
        let addr = addr.clone();
        tasks.push(tokio::spawn(async move {
            queue.enqueue(&format!("key-{i}"));
            let client = QueueClient::new(addr).unwrap();
            client.list().await.unwrap()
        }));
    }
    for task in tasks {
        assert!(!task.await.unwrap().is_empty());
    }

    harness.client.flush(&FlushOpts::default()).await.unwrap();
    assert_eq!(harness.executor.calls.lock().len(), 10);
    assert!(harness.client.list().await.unwrap().is_empty());
    harness.stop().await;
}

#[tokio::test]
async fn test_client_reports_unreachable_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = QueueClient::new(addr.to_string()).unwrap();
    let err = client.list().await.unwrap_err();
    assert!(matches!(err, RpcError::Connect { .. }));
    assert!(err.to_string().contains("Error dialing"));
}

//! Test utilities for exercising the executor without a network.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing_subscriber::fmt::MakeWriter;

use crate::error::Result;
use crate::transport::{RawResponse, Request, Transport};

/// A transport that replays scripted responses and records every request.
#[derive(Debug, Default)]
pub struct StubTransport {
    responses: Mutex<VecDeque<RawResponse>>,
    requests: Mutex<Vec<Request>>,
}

impl StubTransport {
    /// Creates a stub that answers with `responses`, in order.
    pub fn new(responses: impl IntoIterator<Item = RawResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Every request sent so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of calls made so far.
    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Transport for StubTransport {
    async fn send(&self, request: &Request) -> Result<RawResponse> {
        self.requests.lock().unwrap().push(request.clone());
        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("stub transport ran out of scripted responses");
        Ok(response)
    }
}

/// A JSON array of `count` REST repositories named `owner/repo-{offset + i}`.
pub fn rest_page(owner: &str, offset: usize, count: usize) -> String {
    let items: Vec<_> = (offset..offset + count)
        .map(|i| {
            serde_json::json!({
                "full_name": format!("{owner}/repo-{i}"),
                "private": i % 2 == 1,
                "owner": { "login": owner },
                "fork": false
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}

/// A GraphQL repository node.
pub fn graphql_repo(name_with_owner: &str, is_private: bool) -> serde_json::Value {
    let owner = name_with_owner.split('/').next().unwrap_or_default();
    serde_json::json!({
        "nameWithOwner": name_with_owner,
        "isPrivate": is_private,
        "isFork": false,
        "owner": { "login": owner },
        "parent": null
    })
}

/// Log sink shared between a scoped subscriber and the test.
#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

struct LogBufferGuard<'a>(MutexGuard<'a, Vec<u8>>);

impl Write for LogBufferGuard<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBufferGuard<'a>;

    fn make_writer(&'a self) -> Self::Writer {
        LogBufferGuard(self.0.lock().unwrap())
    }
}

/// Runs `f` with a thread-local subscriber and returns what it logged.
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.0.lock().unwrap()).into_owned();
    (result, logs)
}

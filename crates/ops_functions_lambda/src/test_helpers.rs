//! In-memory adapter doubles and log capture shared by unit and integration
//! tests.

use std::collections::{HashMap, HashSet};
use std::io;
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing_subscriber::fmt::MakeWriter;

use crate::adapters::chat_completion::ChatCompletion;
use crate::adapters::feed_source::FeedSource;
use crate::adapters::notifier::Notifier;
use crate::adapters::object_store::{CopyRequest, ObjectStore, StorageError, StorageErrorKind};
use crate::adapters::record_table::{RecordTable, TableItem};

/// Object store backed by a set of `(bucket, key)` pairs. Successful copies
/// make the destination visible to later probes.
#[derive(Default)]
pub struct RecordingObjectStore {
    objects: Mutex<HashSet<(String, String)>>,
    probe_failures: Mutex<HashMap<String, StorageErrorKind>>,
    copy_failures: Mutex<HashMap<String, StorageErrorKind>>,
    probes: Mutex<Vec<(String, String)>>,
    copies: Mutex<Vec<CopyRequest>>,
}

impl RecordingObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_object(&self, bucket: &str, key: &str) {
        self.objects
            .lock()
            .expect("poisoned mutex")
            .insert((bucket.to_string(), key.to_string()));
    }

    pub fn fail_probe(&self, key: &str, kind: StorageErrorKind) {
        self.probe_failures
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), kind);
    }

    pub fn fail_copy(&self, key: &str, kind: StorageErrorKind) {
        self.copy_failures
            .lock()
            .expect("poisoned mutex")
            .insert(key.to_string(), kind);
    }

    pub fn probes(&self) -> Vec<(String, String)> {
        self.probes.lock().expect("poisoned mutex").clone()
    }

    pub fn copies(&self) -> Vec<CopyRequest> {
        self.copies.lock().expect("poisoned mutex").clone()
    }
}

impl ObjectStore for RecordingObjectStore {
    fn probe_object(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        self.probes
            .lock()
            .expect("poisoned mutex")
            .push((bucket.to_string(), key.to_string()));

        if let Some(kind) = self.probe_failures.lock().expect("poisoned mutex").get(key) {
            return Err(StorageError::new(*kind, format!("simulated probe failure for {key}")));
        }

        let exists = self
            .objects
            .lock()
            .expect("poisoned mutex")
            .contains(&(bucket.to_string(), key.to_string()));
        if exists {
            Ok(())
        } else {
            Err(StorageError::not_found(format!("{bucket}/{key} does not exist")))
        }
    }

    fn copy_object(&self, request: &CopyRequest) -> Result<(), StorageError> {
        self.copies
            .lock()
            .expect("poisoned mutex")
            .push(request.clone());

        if let Some(kind) = self
            .copy_failures
            .lock()
            .expect("poisoned mutex")
            .get(&request.destination_key)
        {
            return Err(StorageError::new(
                *kind,
                format!("simulated copy failure for {}", request.destination_key),
            ));
        }

        self.seed_object(&request.destination_bucket, &request.destination_key);
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic_arn: String,
    pub subject: String,
    pub message: String,
}

#[derive(Default)]
pub struct RecordingNotifier {
    published: Mutex<Vec<PublishedMessage>>,
    failure: Option<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().expect("poisoned mutex").clone()
    }
}

impl Notifier for RecordingNotifier {
    fn publish(&self, topic_arn: &str, subject: &str, message: &str) -> Result<(), String> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        self.published
            .lock()
            .expect("poisoned mutex")
            .push(PublishedMessage {
                topic_arn: topic_arn.to_string(),
                subject: subject.to_string(),
                message: message.to_string(),
            });
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingTable {
    items: Mutex<Vec<(String, TableItem)>>,
    failure: Option<String>,
}

impl RecordingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: &str) -> Self {
        Self {
            items: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        }
    }

    pub fn items(&self) -> Vec<(String, TableItem)> {
        self.items.lock().expect("poisoned mutex").clone()
    }
}

impl RecordTable for RecordingTable {
    fn put_item(&self, table_name: &str, item: &TableItem) -> Result<(), String> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }

        self.items
            .lock()
            .expect("poisoned mutex")
            .push((table_name.to_string(), item.clone()));
        Ok(())
    }
}

pub struct StaticFeedSource {
    document: Result<String, String>,
    requests: Mutex<Vec<String>>,
}

impl StaticFeedSource {
    pub fn serving(document: &str) -> Self {
        Self {
            document: Ok(document.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            document: Err(message.to_string()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().expect("poisoned mutex").clone()
    }
}

impl FeedSource for StaticFeedSource {
    fn fetch_feed(&self, url: &str) -> Result<String, String> {
        self.requests
            .lock()
            .expect("poisoned mutex")
            .push(url.to_string());
        self.document.clone()
    }
}

pub struct CannedCompletion {
    reply: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl CannedCompletion {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("poisoned mutex").clone()
    }
}

impl ChatCompletion for CannedCompletion {
    fn complete(&self, prompt: &str) -> Result<String, String> {
        self.prompts
            .lock()
            .expect("poisoned mutex")
            .push(prompt.to_string());
        self.reply.clone()
    }
}

#[derive(Clone, Default)]
struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .expect("poisoned mutex")
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for SharedBuffer {
    type Writer = SharedBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `body` with a thread-local JSON subscriber and return every emitted
/// log record alongside its result.
pub fn capture_logs<T>(body: impl FnOnce() -> T) -> (T, Vec<Value>) {
    let buffer = SharedBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_max_level(tracing::Level::TRACE)
        .with_writer(buffer.clone())
        .finish();

    let result = tracing::subscriber::with_default(subscriber, body);

    let bytes = buffer.0.lock().expect("poisoned mutex").clone();
    let records = String::from_utf8_lossy(&bytes)
        .lines()
        .filter_map(|line| serde_json::from_str(line).ok())
        .collect();
    (result, records)
}

/// Records whose `event` field equals `event`.
pub fn records_for_event<'a>(records: &'a [Value], event: &str) -> Vec<&'a Value> {
    records
        .iter()
        .filter(|record| record.get("event").and_then(Value::as_str) == Some(event))
        .collect()
}

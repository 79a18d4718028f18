use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::http::HeaderValue;
use reqwest::{Client, StatusCode};
use serde_json::{Value, json};

use formrelay::config::{Config, MongoConfig, SmtpConfig, TlsMode};
use formrelay::db::{StorageError, SubmissionStore};
use formrelay::email::templates::render_notification;
use formrelay::email::{DeliveryError, Notifier};
use formrelay::models::{Submission, SubmissionId};

pub const ALLOWED_ORIGIN: &str = "http://localhost:3000";
pub const MAX_BODY_SIZE: usize = 4096;

/// In-memory store that records every insert. Can be told to fail.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<Vec<Submission>>,
    calls: AtomicUsize,
    failing: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn docs(&self) -> Vec<Submission> {
        self.docs.lock().unwrap().clone()
    }
}

#[async_trait]
impl SubmissionStore for MemoryStore {
    async fn store(&self, submission: &Submission) -> Result<SubmissionId, StorageError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(StorageError::Unavailable(
                "connection refused (os error 111)".into(),
            ));
        }
        self.docs.lock().unwrap().push(submission.clone());
        Ok(SubmissionId(format!("{n:024x}")))
    }

    async fn ping(&self) -> Result<(), StorageError> {
        if self.failing {
            return Err(StorageError::Unavailable("no servers available".into()));
        }
        Ok(())
    }
}

/// Captures rendered notifications instead of sending them.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    calls: AtomicUsize,
    failing: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, submission: &Submission) -> Result<(), DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            return Err(DeliveryError::Transport(
                "535 5.7.8 Username and Password not accepted".into(),
            ));
        }
        self.sent.lock().unwrap().push(render_notification(submission));
        Ok(())
    }
}

/// A running test server wired to in-memory doubles.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Submit form-urlencoded data, return (body, status).
    pub async fn submit_form(&self, data: &[(&str, &str)]) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/submit-form"))
            .form(data)
            .send()
            .await
            .expect("submit form failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Submit the canonical valid contact form.
    pub async fn submit_valid(&self) -> (Value, StatusCode) {
        self.submit_form(&[
            ("name", "Jane Doe"),
            ("email", "jane@example.com"),
            ("message", "Hello, I am interested."),
        ])
        .await
    }
}

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        max_body_size: MAX_BODY_SIZE,
        cors_origins: vec![HeaderValue::from_static(ALLOWED_ORIGIN)],
        log_level: "warn".to_string(),
        mongo: MongoConfig {
            uri: "mongodb://localhost:27017".to_string(),
            database: "formrelay_test".to_string(),
            collection: "form_submissions".to_string(),
            max_pool_size: 1,
            connect_timeout: std::time::Duration::from_secs(1),
        },
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 2525,
            user: "mailer@example.com".to_string(),
            pass: "unused".to_string(),
            from: "mailer@example.com".to_string(),
            notify_to: "inbox@example.com".to_string(),
            tls: TlsMode::None,
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(MemoryStore::default(), RecordingNotifier::default()).await
}

/// Spawn the real router on a random port around the given doubles.
pub async fn spawn_app_with(store: MemoryStore, notifier: RecordingNotifier) -> TestApp {
    let store = Arc::new(store);
    let notifier = Arc::new(notifier);

    let app = formrelay::build_app(test_config(), store.clone(), notifier.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    TestApp {
        addr,
        client: Client::new(),
        store,
        notifier,
    }
}

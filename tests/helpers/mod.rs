//! Shared test helpers for integration tests.
//!
//! Builds the full router over in-memory backends and a local blob
//! directory, plus worker runners sharing the same backends.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use printquote_core::config::AppConfig;
use printquote_core::result::AppResult;
use printquote_core::traits::{BlobStorage, KeyValueStore, QueueBroker};
use printquote_entity::quote::{Complexity, Material};
use printquote_service::StatusTracker;
use printquote_storage::providers::local::LocalBlobStorage;
use printquote_store::StoreManager;
use printquote_store::memory::{MemoryKeyValueStore, MemoryQueueBroker};
use printquote_toolchain::{Orientation, SliceReport, SliceSettings, Toolchain, ToolchainError};
use printquote_worker::{Fetcher, QuotePipeline, RunnerSettings, StageError, WorkerRunner};

/// Closed, outward-facing unit tetrahedron.
pub const TETRAHEDRON_STL: &str = "solid tetra
  facet normal 0 0 0
    outer loop
      vertex 0 0 0
      vertex 0 1 0
      vertex 1 0 0
    endloop
  endfacet
  facet normal 0 0 0
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 0 1
    endloop
  endfacet
  facet normal 0 0 0
    outer loop
      vertex 0 0 0
      vertex 0 0 1
      vertex 0 1 0
    endloop
  endfacet
  facet normal 0 0 0
    outer loop
      vertex 1 0 0
      vertex 0 1 0
      vertex 0 0 1
    endloop
  endfacet
endsolid tetra
";

/// A single loose triangle: not watertight, no volume.
pub const OPEN_STL: &str = "solid open
  facet normal 0 0 1
    outer loop
      vertex 0 0 0
      vertex 1 0 0
      vertex 0 1 0
    endloop
  endfacet
endsolid open
";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store, for direct inspection
    pub store: Arc<MemoryKeyValueStore>,
    /// Backing queue, for direct inspection
    pub broker: Arc<MemoryQueueBroker>,
    /// Application config
    pub config: AppConfig,
    /// Upload directory served as `/blobs`
    pub blob_dir: tempfile::TempDir,
    /// Root of worker job workspaces
    pub work_dir: tempfile::TempDir,
}

impl TestApp {
    /// Create a test application with local blob storage
    pub async fn new() -> Self {
        Self::build(default_config(), None).await
    }

    /// Create a test application with a custom config
    pub async fn with_config(config: AppConfig) -> Self {
        Self::build(config, None).await
    }

    /// Create a test application with a custom blob backend
    pub async fn with_blobs(blobs: Arc<dyn BlobStorage>) -> Self {
        Self::build(default_config(), Some(blobs)).await
    }

    async fn build(mut config: AppConfig, blobs: Option<Arc<dyn BlobStorage>>) -> Self {
        let blob_dir = tempfile::tempdir().unwrap();
        let work_dir = tempfile::tempdir().unwrap();
        config.blob.local.root = blob_dir.path().display().to_string();
        config.worker.temp_dir = work_dir.path().display().to_string();

        let blobs = match blobs {
            Some(blobs) => blobs,
            None => Arc::new(
                LocalBlobStorage::new(
                    &config.blob.local.root,
                    &config.blob.local.public_base_url,
                )
                .await
                .unwrap(),
            ),
        };

        let store = Arc::new(MemoryKeyValueStore::new());
        let broker = Arc::new(MemoryQueueBroker::new());
        let stores = StoreManager::from_parts(store.clone(), broker.clone());
        let state = printquote_api::AppState::new(config.clone(), stores, blobs);

        Self {
            router: printquote_api::build_app(state),
            store,
            broker,
            config,
            blob_dir,
            work_dir,
        }
    }

    /// Send a request with an optional JSON body
    pub async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let body = body
            .map(|b| serde_json::to_string(&b).unwrap())
            .unwrap_or_default();
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body))
            .unwrap();
        self.send(req).await
    }

    /// Send a raw request
    pub async fn send(&self, req: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }

    /// Submit a JSON quote request and return the job id
    pub async fn submit(&self, body: Value) -> String {
        let response = self.request("POST", "/quote", Some(body)).await;
        assert_eq!(response.status, StatusCode::ACCEPTED, "{:?}", response.body);
        response.body["job_id"].as_str().unwrap().to_string()
    }

    /// Poll the status endpoint once
    pub async fn status(&self, job_id: &str) -> TestResponse {
        self.request("GET", &format!("/status/{job_id}"), None).await
    }

    /// Pending queue entries
    pub async fn queue_len(&self) -> u64 {
        self.broker.len(&self.config.queue.name).await.unwrap()
    }

    /// A worker runner over the app's backends
    pub fn runner(
        &self,
        name: &str,
        toolchain: Arc<dyn Toolchain>,
        fetcher: Arc<dyn Fetcher>,
        job_timeout: Duration,
    ) -> WorkerRunner {
        let tracker = StatusTracker::new(
            self.store.clone() as Arc<dyn KeyValueStore>,
            Duration::from_secs(self.config.store.job_ttl_seconds),
        );
        let pipeline = QuotePipeline::new(
            toolchain,
            self.config.pricing.clone(),
            self.config.toolchain.supported_formats.clone(),
        );
        WorkerRunner::new(
            name,
            self.broker.clone() as Arc<dyn QueueBroker>,
            tracker,
            fetcher,
            Arc::new(pipeline),
            RunnerSettings {
                queue: self.config.queue.name.clone(),
                pop_timeout: Duration::from_millis(50),
                job_timeout,
                temp_dir: self.work_dir.path().to_path_buf(),
            },
        )
    }

    /// Entries left under the worker temp root
    pub fn workspace_entries(&self) -> usize {
        std::fs::read_dir(self.work_dir.path()).unwrap().count()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

/// Defaults with the memory backend
pub fn default_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.store.provider = "memory".to_string();
    config.blob.provider = "local".to_string();
    config
}

/// Build a multipart/form-data request for `/upload`
pub fn multipart_request(filename: &str, data: &[u8], fields: &[(&str, &str)]) -> Request<Body> {
    const BOUNDARY: &str = "printquote-test-boundary";
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Writes a fixed STL body instead of downloading.
#[derive(Debug)]
pub struct StaticFetcher {
    body: &'static str,
}

impl StaticFetcher {
    pub fn new(body: &'static str) -> Arc<Self> {
        Arc::new(Self { body })
    }
}

#[async_trait]
impl Fetcher for StaticFetcher {
    async fn fetch(&self, url: &str, dir: &Path, stem: &str) -> Result<PathBuf, StageError> {
        let ext = printquote_worker::fetch::extension_from_url(url);
        let path = dir.join(format!("{stem}.{ext}"));
        tokio::fs::write(&path, self.body).await.unwrap();
        Ok(path)
    }
}

/// How the fake slicer behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SliceMode {
    /// Two hours, no supports.
    TwoHours,
    /// Never returns.
    Hang,
}

/// Toolchain double: real mesh validation, scripted orientation and slicing.
///
/// Counts slice calls per job stem so tests can prove each job ran once.
#[derive(Debug)]
pub struct FakeToolchain {
    mode: SliceMode,
    complexity: Complexity,
    pub slices: Mutex<HashMap<String, usize>>,
}

impl FakeToolchain {
    pub fn new(mode: SliceMode, complexity: Complexity) -> Arc<Self> {
        Arc::new(Self {
            mode,
            complexity,
            slices: Mutex::new(HashMap::new()),
        })
    }

    pub fn slice_counts(&self) -> HashMap<String, usize> {
        self.slices.lock().unwrap().clone()
    }
}

#[async_trait]
impl Toolchain for FakeToolchain {
    async fn convert(&self, input: &Path, workspace: &Path, stem: &str) -> Result<PathBuf, ToolchainError> {
        let out = workspace.join(format!("{stem}.stl"));
        tokio::fs::copy(input, &out).await?;
        Ok(out)
    }

    async fn orient(&self, stl: &Path, _: &Path, _: &str) -> Result<Orientation, ToolchainError> {
        Ok(Orientation {
            stl_path: stl.to_path_buf(),
            complexity: self.complexity,
            oriented: true,
        })
    }

    async fn slice(
        &self,
        _stl: &Path,
        workspace: &Path,
        stem: &str,
        _settings: SliceSettings,
        _material: &Material,
    ) -> Result<SliceReport, ToolchainError> {
        *self
            .slices
            .lock()
            .unwrap()
            .entry(stem.to_string())
            .or_default() += 1;
        tokio::fs::write(workspace.join(format!("{stem}.gcode")), "; fake\n").await?;
        match self.mode {
            SliceMode::Hang => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            SliceMode::TwoHours => Ok(SliceReport {
                print_time: "2h 0m 0s".to_string(),
                print_time_seconds: 7200,
                print_time_hours: 2.0,
                filament_used_mm: 3000.0,
                filament_grams: 8.95,
                support_material: false,
            }),
        }
    }
}

/// Blob backend that is always down.
#[derive(Debug)]
pub struct DownBlobs;

#[async_trait]
impl BlobStorage for DownBlobs {
    fn provider_type(&self) -> &str {
        "down"
    }

    async fn put(&self, _filename: &str, _data: bytes::Bytes) -> AppResult<String> {
        Err(printquote_core::AppError::storage("upload endpoint returned 500"))
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(false)
    }
}

//! In-memory collaborators for coordinator integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use tempfile::TempDir;

use batchjob_cloud::{CloudError, InferenceClient, ObjectStore, RecordStore};
use batchjob_core::clock::Clock;
use batchjob_core::config::JobConfig;
use batchjob_core::joblog::JobLogger;
use batchjob_core::record::JobRecord;
use batchjob_worker::JobCoordinator;

pub const BUCKET: &str = "b";
pub const FILE_NAME: &str = "sample.csv";
pub const INPUT: &[u8] = b"1,2,3\n4,5,6\n";
pub const RESPONSE: &[u8] = b"result";

// ---------------------------------------------------------------------------
// Object store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    upload_attempts: Mutex<Vec<String>>,
    reject_uploads: bool,
}

impl MemoryObjectStore {
    /// Every `upload` fails with an access-denied error.
    pub fn rejecting_uploads(self) -> Self {
        Self {
            reject_uploads: true,
            ..self
        }
    }

    pub fn with_object(self, bucket: &str, key: &str, data: &[u8]) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data.to_vec());
        self
    }

    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    /// Keys passed to `upload`, whether or not the upload succeeded.
    pub fn upload_attempts(&self) -> Vec<String> {
        self.upload_attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn download(&self, bucket: &str, key: &str, dest: &Path) -> Result<u64, CloudError> {
        let data = self.get(bucket, key).ok_or_else(|| CloudError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        })?;
        tokio::fs::write(dest, &data).await?;
        Ok(data.len() as u64)
    }

    async fn upload(&self, src: &Path, bucket: &str, key: &str) -> Result<u64, CloudError> {
        self.upload_attempts.lock().unwrap().push(key.to_string());
        if self.reject_uploads {
            return Err(CloudError::ObjectStore("AccessDenied: write not permitted".into()));
        }
        let data = tokio::fs::read(src).await?;
        let len = data.len() as u64;
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data);
        Ok(len)
    }
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

/// Returns a fixed response and records every request.
pub struct FixedInference {
    response: Vec<u8>,
    fail: bool,
    calls: Mutex<Vec<InferenceCall>>,
}

#[derive(Debug, Clone)]
pub struct InferenceCall {
    pub endpoint: String,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl FixedInference {
    pub fn responding(response: &[u8]) -> Self {
        Self {
            response: response.to_vec(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::responding(b"")
        }
    }

    pub fn calls(&self) -> Vec<InferenceCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for FixedInference {
    async fn invoke(
        &self,
        endpoint: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<Vec<u8>, CloudError> {
        self.calls.lock().unwrap().push(InferenceCall {
            endpoint: endpoint.to_string(),
            content_type: content_type.to_string(),
            body,
        });
        if self.fail {
            return Err(CloudError::Inference("ModelError: endpoint returned 500".into()));
        }
        Ok(self.response.clone())
    }
}

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryRecordStore {
    fail: bool,
    records: Mutex<Vec<(String, JobRecord)>>,
}

impl MemoryRecordStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<(String, JobRecord)> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn put_record(&self, table: &str, record: &JobRecord) -> Result<(), CloudError> {
        if self.fail {
            return Err(CloudError::RecordStore(
                "ResourceNotFoundException: table missing".into(),
            ));
        }
        self.records
            .lock()
            .unwrap()
            .push((table.to_string(), record.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

/// Advances by a fixed step on every call to `now()`.
pub struct SteppingClock {
    next: Mutex<NaiveDateTime>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: NaiveDateTime, step: Duration) -> Self {
        Self {
            next: Mutex::new(start),
            step,
        }
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> NaiveDateTime {
        let mut next = self.next.lock().unwrap();
        let now = *next;
        *next = now + self.step;
        now
    }
}

/// 2024-03-05 10:00:00.000
pub fn job_start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 5)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap()
}

/// The output key a job timed by [`Harness`] uploads to.
pub const EXPECTED_OUTPUT_KEY: &str = "output/03-05-2024-10:00:02.500-sample.csv";

// ---------------------------------------------------------------------------
// Job log capture
// ---------------------------------------------------------------------------

/// In-memory job log sink shared between a [`JobLogger`] and the test.
#[derive(Debug, Clone, Default)]
pub struct CapturedLog(Arc<Mutex<Vec<u8>>>);

impl CapturedLog {
    /// All lines written so far.
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.lock().unwrap())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for CapturedLog {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// One job's collaborators plus a scratch working directory.
pub struct Harness {
    pub work_dir: TempDir,
    pub store: Arc<MemoryObjectStore>,
    pub inference: Arc<FixedInference>,
    pub records: Arc<MemoryRecordStore>,
}

impl Harness {
    /// Store holding `input/sample.csv`, inference answering `b"result"`.
    pub fn new() -> Self {
        Self::with(
            MemoryObjectStore::default().with_object(BUCKET, "input/sample.csv", INPUT),
            FixedInference::responding(RESPONSE),
            MemoryRecordStore::default(),
        )
    }

    pub fn with(
        store: MemoryObjectStore,
        inference: FixedInference,
        records: MemoryRecordStore,
    ) -> Self {
        Self {
            work_dir: tempfile::tempdir().expect("tempdir should be created"),
            store: Arc::new(store),
            inference: Arc::new(inference),
            records: Arc::new(records),
        }
    }

    pub fn local_path(&self) -> std::path::PathBuf {
        self.work_dir.path().join(FILE_NAME)
    }

    /// Build a coordinator whose clock advances 2.5 s per reading.
    pub fn coordinator(&self, policy: &str, debug: bool) -> (JobCoordinator, CapturedLog) {
        let work_dir = self.work_dir.path().to_string_lossy().into_owned();
        let mut vars: HashMap<&str, String> = HashMap::from([
            ("INPUT_BUCKET", BUCKET.to_string()),
            ("FILE_NAME", FILE_NAME.to_string()),
            ("REGION", "us-west-2".to_string()),
            ("WORK_DIR", work_dir),
            ("FAILURE_POLICY", policy.to_string()),
        ]);
        if debug {
            vars.insert("DEBUG", "LOGTYPE".to_string());
        }

        let config = JobConfig::from_lookup(|key| vars.get(key).cloned())
            .expect("test config should be valid");
        let log = CapturedLog::default();
        let logger = JobLogger::with_sink(config.debug, log.clone());

        let coordinator = JobCoordinator::new(
            config,
            self.store.clone(),
            self.inference.clone(),
            self.records.clone(),
            logger,
        )
        .with_clock(Arc::new(SteppingClock::new(
            job_start(),
            Duration::milliseconds(2_500),
        )));

        (coordinator, log)
    }
}

/// Number of captured lines containing `needle`.
pub fn count_lines(lines: &[String], needle: &str) -> usize {
    lines.iter().filter(|l| l.contains(needle)).count()
}

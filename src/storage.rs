use crate::errors::StoreError;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tokio::fs;
use tracing::error;

const COMPLETED_DAYS_KEY: &str = "completedDays";

/// Named scalar fields kept alongside the completed-day list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScalarKey {
    Progress,
    Goal,
    CurrentDay,
    Streak,
}

impl ScalarKey {
    pub fn as_str(self) -> &'static str {
        match self {
            ScalarKey::Progress => "progress",
            ScalarKey::Goal => "goal",
            ScalarKey::CurrentDay => "currentDate",
            ScalarKey::Streak => "streakCount",
        }
    }
}

/// Durable key-value capability the tracker persists through.
///
/// `save_*` stage values; `commit` makes everything staged durable in one write.
#[async_trait]
pub trait Store: Send {
    /// `Ok(None)` when nothing has been saved yet.
    fn load_completed_days(&self) -> Result<Option<Vec<String>>, StoreError>;
    fn save_completed_days(&mut self, days: &[String]);
    fn load_scalar(&self, key: ScalarKey) -> Result<Option<Value>, StoreError>;
    fn save_scalar(&mut self, key: ScalarKey, value: Value);
    async fn commit(&mut self) -> Result<(), StoreError>;
}

fn stage_days(doc: &mut Map<String, Value>, days: &[String]) {
    doc.insert(
        COMPLETED_DAYS_KEY.to_string(),
        Value::Array(days.iter().cloned().map(Value::String).collect()),
    );
}

fn days_from_value(value: Option<&Value>) -> Result<Option<Vec<String>>, StoreError> {
    let Some(value) = value else {
        return Ok(None);
    };
    let Value::Array(items) = value else {
        return Err(StoreError::Malformed {
            key: COMPLETED_DAYS_KEY,
        });
    };
    // Non-string entries are kept as their JSON text so the loader can skip them individually.
    Ok(Some(
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
    ))
}

/// All fields in one JSON object file, replaced atomically on every commit.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    doc: Map<String, Value>,
}

impl JsonFileStore {
    /// Opens the store. A missing file is empty; an unreadable one is logged and treated as empty.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let doc = match read_document(&path).await {
            Ok(doc) => doc,
            Err(err) => {
                error!("failed to load data file {}: {err}", path.display());
                Map::new()
            }
        };
        Self { path, doc }
    }
}

async fn read_document(path: &Path) -> Result<Map<String, Value>, StoreError> {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<Value>(&bytes)? {
            Value::Object(doc) => Ok(doc),
            _ => Err(StoreError::Malformed { key: "<root>" }),
        },
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(Map::new()),
        Err(err) => Err(err.into()),
    }
}

#[async_trait]
impl Store for JsonFileStore {
    fn load_completed_days(&self) -> Result<Option<Vec<String>>, StoreError> {
        days_from_value(self.doc.get(COMPLETED_DAYS_KEY))
    }

    fn save_completed_days(&mut self, days: &[String]) {
        stage_days(&mut self.doc, days);
    }

    fn load_scalar(&self, key: ScalarKey) -> Result<Option<Value>, StoreError> {
        Ok(self.doc.get(key.as_str()).cloned())
    }

    fn save_scalar(&mut self, key: ScalarKey, value: Value) {
        self.doc.insert(key.as_str().to_string(), value);
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let payload = serde_json::to_vec_pretty(&self.doc)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, payload).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

/// In-process store. Only committed values are visible to loads.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    committed: Map<String, Value>,
    staged: Map<String, Value>,
    fail_commits: bool,
    commits: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose commits fail until `set_fail_commits(false)`.
    pub fn failing() -> Self {
        Self {
            fail_commits: true,
            ..Self::default()
        }
    }

    /// Pre-populates committed state, as if written by an earlier run.
    pub fn with_completed_days(mut self, days: &[&str]) -> Self {
        let days: Vec<String> = days.iter().map(|day| day.to_string()).collect();
        stage_days(&mut self.committed, &days);
        self
    }

    pub fn with_scalar(mut self, key: ScalarKey, value: Value) -> Self {
        self.committed.insert(key.as_str().to_string(), value);
        self
    }

    pub fn set_fail_commits(&mut self, fail: bool) {
        self.fail_commits = fail;
    }

    /// Number of successful commits.
    pub fn commits(&self) -> usize {
        self.commits
    }

    pub fn commit_now(&mut self) -> Result<(), StoreError> {
        if self.fail_commits {
            return Err(StoreError::Unavailable("commits disabled".to_string()));
        }
        for (key, value) in std::mem::take(&mut self.staged) {
            self.committed.insert(key, value);
        }
        self.commits += 1;
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn load_completed_days(&self) -> Result<Option<Vec<String>>, StoreError> {
        days_from_value(self.committed.get(COMPLETED_DAYS_KEY))
    }

    fn save_completed_days(&mut self, days: &[String]) {
        stage_days(&mut self.staged, days);
    }

    fn load_scalar(&self, key: ScalarKey) -> Result<Option<Value>, StoreError> {
        Ok(self.committed.get(key.as_str()).cloned())
    }

    fn save_scalar(&mut self, key: ScalarKey, value: Value) {
        self.staged.insert(key.as_str().to_string(), value);
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.commit_now()
    }
}

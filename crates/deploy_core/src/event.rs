use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::contract::ConfigError;

#[derive(Debug, Clone, Deserialize)]
pub struct StorageUploadEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<StorageEventRecord>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageEventRecord {
    pub s3: StorageEntity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageEntity {
    pub bucket: StorageBucket,
    pub object: StorageObject,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageBucket {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageObject {
    pub key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadedObject {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedUpload {
    pub upload: UploadedObject,
    /// Records after the first one; they are never processed.
    pub ignored_records: usize,
}

/// Reads the bucket and key of the first record. The key is taken verbatim,
/// without URL decoding.
pub fn extract_upload(event: &Value) -> Result<ExtractedUpload, ConfigError> {
    let parsed: StorageUploadEvent = serde_json::from_value(event.clone())
        .map_err(|error| ConfigError::new(format!("Malformed storage event: {error}")))?;

    let mut records = parsed.records.into_iter();
    let Some(first) = records.next() else {
        return Err(ConfigError::new("Storage event contains no records"));
    };

    Ok(ExtractedUpload {
        upload: UploadedObject {
            bucket: first.s3.bucket.name,
            key: first.s3.object.key,
        },
        ignored_records: records.count(),
    })
}

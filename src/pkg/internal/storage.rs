use std::sync::Arc;

use aws_sdk_s3::primitives::ByteStream;
use standard_error::{Interpolate, StandardError};
use uuid::Uuid;

use crate::{conf::Settings, prelude::Result};

/// Keys for every object this service creates live under this prefix.
const KEY_PREFIX: &str = "resumeflow";

#[derive(Debug, Clone)]
pub struct UploadResult {
    pub url: String,
    /// Opaque deletion handle; owned by the orchestrator once issued.
    pub handle: String,
}

#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, data: Vec<u8>, name: &str, folder: &str) -> Result<UploadResult>;
    async fn delete(&self, handle: &str) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct ResumeStorage {
    client: Arc<aws_sdk_s3::Client>,
    bucket: String,
    endpoint: String,
}

impl ResumeStorage {
    pub fn new(client: Arc<aws_sdk_s3::Client>, settings: &Settings) -> Self {
        ResumeStorage {
            client,
            bucket: settings.s3_bucket_name.clone(),
            endpoint: settings.s3_endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint, self.bucket, key)
    }

    /// Recovers the deletion handle from a URL previously issued by `put`.
    pub fn handle_for_url(&self, url: &str) -> Option<String> {
        let prefix = format!("{}/{}/", self.endpoint, self.bucket);
        url.strip_prefix(&prefix)
            .filter(|key| !key.is_empty())
            .map(|key| key.to_string())
    }
}

fn object_key(name: &str, folder: &str) -> String {
    let safe_name: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("{}/{}/{}-{}", KEY_PREFIX, folder, Uuid::new_v4(), safe_name)
}

#[async_trait::async_trait]
impl ObjectStore for ResumeStorage {
    async fn put(&self, data: Vec<u8>, name: &str, folder: &str) -> Result<UploadResult> {
        let key = object_key(name, folder);
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StandardError::new("ERR-S3-002").interpolate_err(e.to_string()))?;
        tracing::debug!("stored object {}", &key);
        Ok(UploadResult {
            url: self.public_url(&key),
            handle: key,
        })
    }

    async fn delete(&self, handle: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(handle)
            .send()
            .await
            .map_err(|e| StandardError::new("ERR-S3-003").interpolate_err(e.to_string()))?;
        tracing::debug!("deleted object {}", handle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_is_namespaced_and_sanitized() {
        let key = object_key("my resume (final).pdf", "resumes");
        assert!(key.starts_with("resumeflow/resumes/"));
        assert!(key.ends_with("-my_resume__final_.pdf"));
        assert!(!key.contains(' '));
    }

    #[test]
    fn test_object_keys_are_unique_per_upload() {
        let a = object_key("resume.pdf", "resumes");
        let b = object_key("resume.pdf", "resumes");
        assert_ne!(a, b);
    }

    fn storage() -> ResumeStorage {
        let conf = aws_sdk_s3::Config::builder()
            .behavior_version(aws_sdk_s3::config::BehaviorVersion::latest())
            .build();
        ResumeStorage {
            client: Arc::new(aws_sdk_s3::Client::from_conf(conf)),
            bucket: "documents".into(),
            endpoint: "http://localhost:9000".into(),
        }
    }

    #[test]
    fn test_handle_round_trips_through_url() {
        let storage = storage();
        let key = object_key("resume.pdf", "resumes");
        let url = storage.public_url(&key);
        assert_eq!(storage.handle_for_url(&url), Some(key));
    }

    #[test]
    fn test_foreign_url_yields_no_handle() {
        let storage = storage();
        assert_eq!(
            storage.handle_for_url("https://elsewhere.example.com/documents/x.pdf"),
            None
        );
    }
}

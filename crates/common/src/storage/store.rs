use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::{StreamExt, TryStreamExt};
use object_store::aws::AmazonS3Builder;
use object_store::local::LocalFileSystem;
use object_store::memory::InMemory;
use object_store::path::Path as ObjectPath;
use object_store::{
    Attribute, AttributeValue, Attributes, GetOptions, ObjectMeta, ObjectStore, PutOptions,
    PutPayload,
};

use super::config::StorageConfig;
use super::error::{Result, StorageError};

/// Streaming blob body.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Metadata for one blob or directory level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobMeta {
    /// Full key; directory entries carry a trailing slash.
    pub key: String,
    /// Size in bytes; zero for directory entries.
    pub size: u64,
    /// Creation time as reported by the store; absent for directory entries.
    pub created: Option<DateTime<Utc>>,
    /// Store-assigned entity tag.
    pub etag: Option<String>,
    /// Declared content type, on backends that record one.
    pub content_type: Option<String>,
    /// Whether the key denotes a directory level rather than an object.
    pub is_dir: bool,
}

/// Wrapper around different object storage backends.
#[derive(Debug, Clone)]
pub struct Storage {
    inner: Arc<dyn ObjectStore>,
    supports_attributes: bool,
}

impl Storage {
    /// Create a new storage backend from configuration.
    pub async fn new(config: StorageConfig) -> Result<Self> {
        let (inner, supports_attributes): (Arc<dyn ObjectStore>, bool) = match &config {
            StorageConfig::Memory => (Arc::new(InMemory::new()), true),

            StorageConfig::Local { root } => {
                // Ensure directory exists
                tokio::fs::create_dir_all(root).await?;
                let store = LocalFileSystem::new_with_prefix(root)
                    .map_err(|e| StorageError::InvalidConfig(e.to_string()))?;
                // The filesystem backend rejects put attributes, so declared
                // content types are not persisted there.
                (Arc::new(store), false)
            }

            StorageConfig::S3 {
                endpoint,
                access_key,
                secret_key,
                bucket,
                region,
            } => {
                let builder = AmazonS3Builder::new()
                    .with_endpoint(endpoint)
                    .with_access_key_id(access_key)
                    .with_secret_access_key(secret_key)
                    .with_bucket_name(bucket)
                    .with_region(region.as_deref().unwrap_or("us-east-1"))
                    .with_allow_http(endpoint.starts_with("http://"));

                let store: Arc<dyn ObjectStore> = Arc::new(
                    builder
                        .build()
                        .map_err(|e| StorageError::InvalidConfig(e.to_string()))?,
                );

                // Verify the bucket exists by listing (empty prefix).
                // This will fail fast if the bucket doesn't exist.
                {
                    let prefix = ObjectPath::from("");
                    let mut stream = store.list(Some(&prefix));
                    match stream.try_next().await {
                        Ok(_) => {} // Bucket exists (may or may not have items)
                        Err(object_store::Error::NotFound { .. }) => {
                            return Err(StorageError::BucketNotFound(bucket.clone()));
                        }
                        Err(e) => {
                            // Check if error message indicates bucket doesn't exist
                            let msg = e.to_string();
                            if msg.contains("NoSuchBucket")
                                || msg.contains("bucket") && msg.contains("not")
                            {
                                return Err(StorageError::BucketNotFound(bucket.clone()));
                            }
                            return Err(e.into());
                        }
                    }
                }

                (store, true)
            }
        };

        Ok(Self {
            inner,
            supports_attributes,
        })
    }

    fn object_path(key: &str) -> ObjectPath {
        ObjectPath::from(key)
    }

    fn blob_meta(meta: &ObjectMeta, content_type: Option<String>) -> BlobMeta {
        BlobMeta {
            key: meta.location.to_string(),
            size: meta.size as u64,
            created: Some(meta.last_modified),
            etag: meta.e_tag.clone(),
            content_type,
            is_dir: false,
        }
    }

    /// Metadata for the blob at `key`, including its declared content type
    /// on attribute-aware backends. `Ok(None)` when no blob exists there.
    pub async fn head(&self, key: &str) -> Result<Option<BlobMeta>> {
        let path = Self::object_path(key);
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        match self.inner.get_opts(&path, options).await {
            Ok(result) => {
                let content_type = result
                    .attributes
                    .get(&Attribute::ContentType)
                    .map(|v| v.as_ref().to_string());
                Ok(Some(Self::blob_meta(&result.meta, content_type)))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Fetch the blob at `key` for download: metadata plus a streaming body.
    pub async fn get(&self, key: &str) -> Result<Option<(BlobMeta, ByteStream)>> {
        let path = Self::object_path(key);
        match self.inner.get(&path).await {
            Ok(result) => {
                let content_type = result
                    .attributes
                    .get(&Attribute::ContentType)
                    .map(|v| v.as_ref().to_string());
                let meta = Self::blob_meta(&result.meta, content_type);
                let stream = result.into_stream().map_err(StorageError::from).boxed();
                Ok(Some((meta, stream)))
            }
            Err(object_store::Error::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create or overwrite the blob at `key`.
    pub async fn put(&self, key: &str, content_type: Option<&str>, data: Bytes) -> Result<()> {
        let path = Self::object_path(key);
        let mut options = PutOptions::default();
        if self.supports_attributes {
            if let Some(content_type) = content_type {
                let mut attributes = Attributes::new();
                attributes.insert(
                    Attribute::ContentType,
                    AttributeValue::from(content_type.to_string()),
                );
                options.attributes = attributes;
            }
        }
        self.inner
            .put_opts(&path, PutPayload::from(data), options)
            .await?;
        Ok(())
    }

    /// Whether a blob exists at `key`.
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let path = Self::object_path(key);
        match self.inner.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// One-level listing under `prefix`: sub-directories first as
    /// trailing-slash keys, then objects, preserving store order.
    pub async fn list_dir(&self, prefix: &str) -> Result<Vec<BlobMeta>> {
        let path = (!prefix.is_empty()).then(|| Self::object_path(prefix));
        let listing = self.inner.list_with_delimiter(path.as_ref()).await?;

        let mut page = Vec::with_capacity(listing.common_prefixes.len() + listing.objects.len());

        for dir in listing.common_prefixes {
            page.push(BlobMeta {
                key: format!("{}/", dir),
                size: 0,
                created: None,
                etag: None,
                content_type: None,
                is_dir: true,
            });
        }
        for object in listing.objects {
            page.push(Self::blob_meta(&object, None));
        }

        Ok(page)
    }
}

//! Property repository: named string settings such as the last scan time

use crate::codec::{field, Entity, FieldDescriptor};
use crate::error::{LibraryError, Result};
use crate::models::Property;
use crate::repositories::KvRepository;
use async_trait::async_trait;
use core_store::KvStore;
use std::sync::Arc;

impl Entity for Property {
    const TABLE: &'static str = "property";

    fn id(&self) -> &str {
        &self.id
    }

    fn fields() -> Vec<FieldDescriptor<Self>> {
        vec![field!(Property, "Id", id), field!(Property, "Value", value)]
    }
}

/// Property repository interface
#[async_trait]
pub trait PropertyRepository: Send + Sync {
    /// Store `value` under `id`, replacing any previous value
    async fn put(&self, id: &str, value: &str) -> Result<()>;

    /// Read the value stored under `id`
    ///
    /// # Errors
    /// Returns `LibraryError::NotFound` if the property was never set
    async fn get(&self, id: &str) -> Result<String>;

    /// Read the value stored under `id`, or `default` if it was never set
    async fn default_get(&self, id: &str, default: &str) -> Result<String>;
}

/// Key-value store implementation of PropertyRepository
#[derive(Clone)]
pub struct KvPropertyRepository {
    inner: KvRepository<Property>,
}

impl KvPropertyRepository {
    /// Create a new KvPropertyRepository
    pub fn new(store: Arc<dyn KvStore>) -> Result<Self> {
        Ok(Self {
            inner: KvRepository::new(store)?,
        })
    }
}

#[async_trait]
impl PropertyRepository for KvPropertyRepository {
    async fn put(&self, id: &str, value: &str) -> Result<()> {
        let property = Property {
            id: id.to_string(),
            value: value.to_string(),
        };
        self.inner.put(&property).await
    }

    async fn get(&self, id: &str) -> Result<String> {
        Ok(self.inner.get(id).await?.value)
    }

    async fn default_get(&self, id: &str, default: &str) -> Result<String> {
        match self.get(id).await {
            Ok(value) => Ok(value),
            Err(LibraryError::NotFound { .. }) => Ok(default.to_string()),
            Err(e) => Err(e),
        }
    }
}

use async_trait::async_trait;
use quiz_core::model::User;

use super::KvRepository;
use crate::keys;
use crate::repository::{IdentityRepository, StorageError};

#[async_trait]
impl IdentityRepository for KvRepository {
    async fn current_user(&self) -> Result<Option<User>, StorageError> {
        self.read(keys::CURRENT_USER).await
    }

    async fn set_current_user(&self, user: &User) -> Result<(), StorageError> {
        self.write(keys::CURRENT_USER, user).await
    }

    async fn clear_current_user(&self) -> Result<(), StorageError> {
        self.store.remove(keys::CURRENT_USER).await
    }
}

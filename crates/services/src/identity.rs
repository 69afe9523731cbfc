use std::sync::Arc;

use quiz_core::ValidationError;
use quiz_core::model::{EngineSettings, Role, User, UserDraft};
use storage::repository::IdentityRepository;

use crate::error::IdentityError;

/// Sign-in state for this device.
#[derive(Clone)]
pub struct IdentityService {
    settings: EngineSettings,
    identity: Arc<dyn IdentityRepository>,
}

impl IdentityService {
    #[must_use]
    pub fn new(settings: EngineSettings, identity: Arc<dyn IdentityRepository>) -> Self {
        Self { settings, identity }
    }

    /// Validate the form and remember the user.
    ///
    /// Instructors must also supply the configured password.
    ///
    /// # Errors
    ///
    /// Returns `IdentityError::Validation` for a blank name or bad email,
    /// `IdentityError::InvalidCredentials` for a wrong instructor pair, or
    /// `IdentityError::Storage` if the identity cannot be stored.
    pub async fn login(
        &self,
        draft: UserDraft,
        password: Option<&str>,
    ) -> Result<User, IdentityError> {
        let user = draft.validate().map_err(ValidationError::from)?;
        if user.role() == Role::Instructor {
            let ok = password
                .is_some_and(|p| self.settings.instructor_credentials_match(user.email(), p));
            if !ok {
                tracing::warn!(email = user.email(), "instructor login refused");
                return Err(IdentityError::InvalidCredentials);
            }
        }
        self.identity.set_current_user(&user).await?;
        tracing::info!(email = user.email(), role = ?user.role(), "signed in");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `IdentityError::Storage` if the identity cannot be read.
    pub async fn current_user(&self) -> Result<Option<User>, IdentityError> {
        Ok(self.identity.current_user().await?)
    }

    /// # Errors
    ///
    /// Returns `IdentityError::Storage` if the identity cannot be removed.
    pub async fn logout(&self) -> Result<(), IdentityError> {
        self.identity.clear_current_user().await?;
        Ok(())
    }
}

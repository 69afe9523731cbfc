use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::catalog::QuizCatalogService;
use crate::error::AppServicesError;
use crate::grading::GradingService;
use crate::identity::IdentityService;
use crate::notifier::{EmailJsNotifier, Notifier};
use crate::sessions::SessionEngine;
use crate::settings::QuizSettings;

/// Assembles every app-facing service over one store.
#[derive(Clone)]
pub struct QuizServices {
    catalog: QuizCatalogService,
    sessions: SessionEngine,
    grading: GradingService,
    identity: IdentityService,
}

impl QuizServices {
    /// Read settings from the environment and open the `SQLite` store.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if settings are invalid, the store cannot
    /// be opened or the default catalog cannot be seeded.
    pub async fn from_env(clock: Clock) -> Result<Self, AppServicesError> {
        let settings = QuizSettings::from_env()?;
        Self::new_sqlite(&settings, clock).await
    }

    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the store cannot be opened or the
    /// default catalog cannot be seeded.
    pub async fn new_sqlite(settings: &QuizSettings, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(&settings.db_url).await?;
        let notifier: Arc<dyn Notifier> = Arc::new(EmailJsNotifier::new(settings.emailjs.clone()));
        let services = Self::build(&storage, settings, clock, notifier);
        services.catalog.list().await?;
        Ok(services)
    }

    #[must_use]
    pub fn build(
        storage: &Storage,
        settings: &QuizSettings,
        clock: Clock,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let catalog = QuizCatalogService::new(
            clock,
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.releases),
        );
        let sessions = SessionEngine::new(
            clock,
            settings.engine.clone(),
            catalog.clone(),
            Arc::clone(&storage.results),
        );
        let grading = GradingService::new(catalog.clone(), storage, notifier);
        let identity = IdentityService::new(settings.engine.clone(), Arc::clone(&storage.identity));

        Self {
            catalog,
            sessions,
            grading,
            identity,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &QuizCatalogService {
        &self.catalog
    }

    #[must_use]
    pub fn sessions(&self) -> &SessionEngine {
        &self.sessions
    }

    #[must_use]
    pub fn grading(&self) -> &GradingService {
        &self.grading
    }

    #[must_use]
    pub fn identity(&self) -> &IdentityService {
        &self.identity
    }
}

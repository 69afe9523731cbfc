use std::sync::Arc;

use rand::rng;
use rand::seq::IndexedRandom;

use quiz_core::ValidationError;
use quiz_core::model::{
    QUIZ_CODE_ALPHABET, QUIZ_CODE_LEN, Quiz, QuizCode, QuizDraft, QuizId, default_quiz,
};
use storage::repository::{QuizRepository, ReleaseRepository};

use crate::Clock;
use crate::error::CatalogError;

const CODE_ATTEMPTS: usize = 32;

/// Quiz authoring and lookup.
///
/// A store with no catalog key starts out holding the default quiz.
#[derive(Clone)]
pub struct QuizCatalogService {
    clock: Clock,
    quizzes: Arc<dyn QuizRepository>,
    releases: Arc<dyn ReleaseRepository>,
}

impl QuizCatalogService {
    #[must_use]
    pub fn new(
        clock: Clock,
        quizzes: Arc<dyn QuizRepository>,
        releases: Arc<dyn ReleaseRepository>,
    ) -> Self {
        Self {
            clock,
            quizzes,
            releases,
        }
    }

    /// All quizzes, seeding the default quiz on first use.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the catalog cannot be read or seeded.
    pub async fn list(&self) -> Result<Vec<Quiz>, CatalogError> {
        if let Some(quizzes) = self.quizzes.load_catalog().await? {
            return Ok(quizzes);
        }
        let seeded = vec![default_quiz()];
        self.quizzes.save_catalog(&seeded).await?;
        tracing::info!("seeded default quiz catalog");
        Ok(seeded)
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the catalog cannot be read.
    pub async fn get(&self, id: &QuizId) -> Result<Option<Quiz>, CatalogError> {
        Ok(self.list().await?.into_iter().find(|q| q.id() == id))
    }

    /// Look up a quiz by its access code, ignoring case and surrounding
    /// whitespace. Malformed codes simply find nothing.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the catalog cannot be read.
    pub async fn get_by_code(&self, raw: &str) -> Result<Option<Quiz>, CatalogError> {
        let Ok(code) = QuizCode::parse(raw) else {
            return Ok(None);
        };
        Ok(self.list().await?.into_iter().find(|q| q.code() == &code))
    }

    /// # Errors
    ///
    /// Returns `CatalogError::Storage` if the flag cannot be read.
    pub async fn is_released(&self, id: &QuizId) -> Result<bool, CatalogError> {
        Ok(self.releases.is_released(id).await?)
    }

    /// Validate and store a new quiz under a fresh id and unique code.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Validation` for an invalid draft,
    /// `CatalogError::CodeSpaceExhausted` if no free code was found, or
    /// `CatalogError::Storage` if the catalog cannot be written.
    pub async fn create(&self, draft: QuizDraft) -> Result<Quiz, CatalogError> {
        let mut quizzes = self.list().await?;
        let id = self.fresh_id(&quizzes);
        let code = fresh_code(&quizzes)?;

        let quiz = draft
            .validate(id, code)
            .map_err(ValidationError::from)?;
        quizzes.push(quiz.clone());
        self.quizzes.save_catalog(&quizzes).await?;

        tracing::info!(quiz = %quiz.id(), code = %quiz.code(), "quiz created");
        Ok(quiz)
    }

    /// Replace a quiz definition, keeping its id and code.
    ///
    /// Attempts already running keep the definition they started with.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` for an unknown id,
    /// `CatalogError::Validation` for an invalid draft, or
    /// `CatalogError::Storage` on persistence failures.
    pub async fn update(&self, id: &QuizId, draft: QuizDraft) -> Result<Quiz, CatalogError> {
        let mut quizzes = self.list().await?;
        let slot = quizzes
            .iter_mut()
            .find(|q| q.id() == id)
            .ok_or(CatalogError::NotFound)?;

        let quiz = draft
            .validate(id.clone(), slot.code().clone())
            .map_err(ValidationError::from)?;
        *slot = quiz.clone();
        self.quizzes.save_catalog(&quizzes).await?;

        tracing::info!(quiz = %quiz.id(), "quiz updated");
        Ok(quiz)
    }

    fn fresh_id(&self, quizzes: &[Quiz]) -> QuizId {
        let base = format!("quiz_{}", self.clock.now().timestamp_millis());
        let mut candidate = QuizId::new(base.clone());
        let mut n = 1;
        while quizzes.iter().any(|q| q.id() == &candidate) {
            candidate = QuizId::new(format!("{base}_{n}"));
            n += 1;
        }
        candidate
    }
}

fn random_code() -> String {
    let mut rng = rng();
    (0..QUIZ_CODE_LEN)
        .filter_map(|_| QUIZ_CODE_ALPHABET.choose(&mut rng).copied())
        .map(char::from)
        .collect()
}

fn fresh_code(quizzes: &[Quiz]) -> Result<QuizCode, CatalogError> {
    for _ in 0..CODE_ATTEMPTS {
        let Ok(code) = QuizCode::parse(&random_code()) else {
            continue;
        };
        if quizzes.iter().all(|q| q.code() != &code) {
            return Ok(code);
        }
    }
    Err(CatalogError::CodeSpaceExhausted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{DEFAULT_QUIZ_CODE, Question, QuestionKind, QuizError};
    use quiz_core::time::fixed_clock;
    use storage::repository::Storage;

    fn service(storage: &Storage) -> QuizCatalogService {
        QuizCatalogService::new(
            fixed_clock(),
            Arc::clone(&storage.quizzes),
            Arc::clone(&storage.releases),
        )
    }

    fn draft(title: &str) -> QuizDraft {
        QuizDraft::new(title).with_question(Question::new(
            "q1",
            "Capital of France?",
            QuestionKind::Identification {
                correct_answer: "Paris".into(),
            },
        ))
    }

    #[tokio::test]
    async fn first_listing_seeds_default_quiz() {
        let storage = Storage::in_memory();
        let catalog = service(&storage);

        let quizzes = catalog.list().await.unwrap();
        assert_eq!(quizzes.len(), 1);
        assert_eq!(quizzes[0].code().as_str(), DEFAULT_QUIZ_CODE);
        assert!(storage.quizzes.load_catalog().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn code_lookup_ignores_case_and_whitespace() {
        let storage = Storage::in_memory();
        let catalog = service(&storage);

        let found = catalog.get_by_code("  dcit26qz ").await.unwrap();
        assert!(found.is_some());
        assert!(catalog.get_by_code("NOPE").await.unwrap().is_none());
        assert!(catalog.get_by_code("ZZZZZZZZ").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn created_quizzes_get_unique_ids_and_codes() {
        let storage = Storage::in_memory();
        let catalog = service(&storage);

        let a = catalog.create(draft("A")).await.unwrap();
        let b = catalog.create(draft("B")).await.unwrap();
        assert_ne!(a.id(), b.id());
        assert_ne!(a.code(), b.code());
        assert_eq!(a.code().as_str().len(), QUIZ_CODE_LEN);

        let found = catalog
            .get_by_code(&a.code().as_str().to_lowercase())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.title(), "A");
        assert_eq!(catalog.list().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_without_writing() {
        let storage = Storage::in_memory();
        let catalog = service(&storage);

        let err = catalog.create(QuizDraft::new("Empty")).await.unwrap_err();
        assert!(matches!(
            err,
            CatalogError::Validation(ValidationError::Quiz(QuizError::NoQuestions))
        ));
        assert_eq!(catalog.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn update_keeps_id_and_code() {
        let storage = Storage::in_memory();
        let catalog = service(&storage);
        let quiz = catalog.create(draft("Before")).await.unwrap();

        let updated = catalog
            .update(quiz.id(), draft("After").with_duration_secs(90))
            .await
            .unwrap();
        assert_eq!(updated.id(), quiz.id());
        assert_eq!(updated.code(), quiz.code());
        assert_eq!(updated.duration_secs(), 90);

        let missing = catalog
            .update(&QuizId::new("nope"), draft("X"))
            .await
            .unwrap_err();
        assert!(matches!(missing, CatalogError::NotFound));
    }
}

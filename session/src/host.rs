use quizdeck_backend::{BackendError, QuizBackend};
use quizdeck_ontology::{AttemptRecord, AttemptResult, User};

use crate::{Attempt, SessionConfig};

/// The quiz could not be loaded; no attempt is started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no quiz available: {0}")]
pub struct NoQuizAvailable<E: std::fmt::Debug + std::fmt::Display>(#[source] pub BackendError<E>);

impl<E: std::fmt::Debug + std::fmt::Display> NoQuizAvailable<E> {
    #[inline]
    #[must_use]
    pub const fn cause(&self) -> &BackendError<E> {
        &self.0
    }

    #[inline]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self.0, BackendError::NotFound(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self.0, BackendError::Malformed { .. })
    }
}

/// Fetches quiz `quiz_id` and starts an attempt on it.
///
/// # Errors
/// if the quiz does not exist, is malformed, or the backend fails
pub async fn load_attempt<B: QuizBackend + Sync>(
    backend: &B,
    quiz_id: &str,
    config: &SessionConfig,
) -> Result<Attempt, NoQuizAvailable<B::Error>> {
    match backend.get_quiz(quiz_id).await {
        Ok(quiz) => Ok(Attempt::new(quiz, config)),
        Err(e) => {
            tracing::warn!("failed to load quiz {quiz_id}: {e}");
            Err(NoQuizAvailable(e))
        }
    }
}

/// Stores the marks of a finished attempt with `user` and appends an attempt
/// record. Anonymous attempts are not recorded; returns whether anything
/// was stored.
///
/// # Errors
/// if updating the user or storing the record fails
pub async fn record_result<B: QuizBackend + Sync>(
    backend: &B,
    user: Option<&mut User>,
    quiz_id: &str,
    result: &AttemptResult,
) -> Result<bool, BackendError<B::Error>> {
    let Some(user) = user else {
        tracing::debug!("anonymous attempt of {quiz_id}; not recording");
        return Ok(false);
    };
    let mut updated = user.clone();
    updated.results.insert(quiz_id.into(), result.marks);
    backend.update_user(&updated).await?;
    *user = updated;
    backend
        .record_attempt(&AttemptRecord::now(&user.username, quiz_id))
        .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, unused_variables)]
    use super::*;
    use crate::{AttemptState, Submission, trace};
    use quizdeck_backend::{MemoryBackend, MemoryError, RecordKind};
    use quizdeck_ontology::documents::FromDocument;
    use rstest::rstest;

    fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        let doc = serde_json::json!({
            "name": "Capitals",
            "reorder": false,
            "questions": [
                { "question": "France?", "answer": 1, "options": ["Lyon", "Paris"], "marks": 2 },
                { "question": "Italy?", "type": "text", "answer": "Rome", "marks": 3 },
            ]
        });
        backend.insert_quiz("capitals", doc.as_object().cloned().unwrap());
        let broken = serde_json::json!({ "name": "Broken", "questions": [{ "question": "?" }] });
        backend.insert_quiz("broken", broken.as_object().cloned().unwrap());
        backend
    }

    #[rstest]
    #[tokio::test]
    async fn failures_are_distinct(trace: ()) {
        let backend = backend();
        let config = SessionConfig::default();
        let e = load_attempt(&backend, "missing", &config).await.unwrap_err();
        assert!(e.is_not_found() && !e.is_malformed());
        let e = load_attempt(&backend, "broken", &config).await.unwrap_err();
        assert!(e.is_malformed());
        backend.set_offline(true);
        let e = load_attempt(&backend, "capitals", &config).await.unwrap_err();
        assert_eq!(e.cause(), &BackendError::Connection(MemoryError::Offline));
    }

    #[rstest]
    #[tokio::test]
    async fn finished_attempts_are_recorded(trace: ()) {
        let backend = backend();
        let mut user = User::new("ada", "Ada", "Lovelace");
        backend.create_user(&user, "hash").await.unwrap();

        let config = SessionConfig {
            shuffle_options: Some(false),
            ..Default::default()
        };
        let mut attempt = load_attempt(&backend, "capitals", &config).await.unwrap();
        attempt.choose(1);
        attempt.next();
        attempt.set_text("Rome");
        assert_eq!(attempt.submit(), Submission::Ready);
        let result = attempt.complete().unwrap();
        assert_eq!(attempt.state(), AttemptState::Done);
        assert_eq!(result.marks, 5);

        assert!(record_result(&backend, Some(&mut user), "capitals", &result).await.unwrap());
        assert_eq!(user.results.get("capitals"), Some(&5));
        let stored = User::from_document("ada", &backend.user_document("ada").unwrap()).unwrap();
        assert_eq!(stored, user);
        let attempts = backend.attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!((&*attempts[0].username, &*attempts[0].quiz_id), ("ada", "capitals"));
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_attempts_are_not_recorded(trace: ()) {
        let backend = backend();
        let result = AttemptResult {
            correct: Box::new([true, true]),
            marks: 5,
            total: 5,
        };
        assert!(!record_result(&backend, None, "capitals", &result).await.unwrap());
        assert!(backend.attempts().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn failed_updates_leave_the_user_unchanged(trace: ()) {
        let backend = backend();
        let mut user = User::new("ada", "Ada", "Lovelace");
        backend.create_user(&user, "hash").await.unwrap();
        backend.set_offline(true);
        let result = AttemptResult {
            correct: Box::new([true, true]),
            marks: 5,
            total: 5,
        };
        assert_eq!(
            record_result(&backend, Some(&mut user), "capitals", &result).await,
            Err(BackendError::Connection(MemoryError::Offline))
        );
        assert!(user.results.is_empty());
        backend.set_offline(false);
        assert!(backend.attempts().is_empty());
    }

    #[rstest]
    #[tokio::test]
    async fn recording_for_unknown_users_fails(trace: ()) {
        let backend = backend();
        let mut ghost = User::new("ghost", "No", "One");
        let result = AttemptResult {
            correct: Box::new([false, false]),
            marks: 0,
            total: 5,
        };
        assert_eq!(
            record_result(&backend, Some(&mut ghost), "capitals", &result).await,
            Err(BackendError::NotFound(RecordKind::User))
        );
        assert!(backend.attempts().is_empty());
    }
}

use chrono::{DateTime, Utc};
use quizdeck_backend::{BackendError, QuizBackend};
use rustc_hash::FxHashMap;

/// One line of the activity feed: who scored what on which quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ActivityItem {
    pub username: Box<str>,
    pub full_name: String,
    /// the quiz's display name
    pub quiz: Box<str>,
    /// the user's latest marks on the quiz
    pub marks: u32,
    pub total: u32,
    pub time: DateTime<Utc>,
}

impl ActivityItem {
    /// `marks * 100 / total`, rounded down; `0` for a quiz without marks.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let pct = u64::from(self.marks) * 100 / u64::from(self.total);
        u32::try_from(pct).unwrap_or(u32::MAX)
    }
}

impl std::fmt::Display for ActivityItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}/{} ({}%)",
            self.full_name,
            self.quiz,
            self.marks,
            self.total,
            self.percentage()
        )
    }
}

/// Skips lookups that cannot produce a feed line; connection errors abort.
fn skippable<T, E: std::fmt::Display + std::fmt::Debug>(
    r: Result<T, BackendError<E>>,
) -> Result<Option<T>, BackendError<E>> {
    match r {
        Ok(t) => Ok(Some(t)),
        Err(e @ (BackendError::NotFound(_) | BackendError::Malformed { .. })) => {
            tracing::debug!("skipping feed entry: {e}");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Builds the activity feed from all attempt records, newest first.
///
/// Records whose user or quiz is missing or malformed, or whose user has no
/// stored result for the quiz, are left out. Each user and quiz is fetched
/// once.
///
/// # Errors
/// if the records cannot be loaded or the backend fails otherwise
pub async fn activity_feed<B: QuizBackend + Sync>(
    backend: &B,
) -> Result<Vec<ActivityItem>, BackendError<B::Error>> {
    let records = backend.get_attempts().await?;
    let mut users = FxHashMap::default();
    let mut quizzes = FxHashMap::default();
    let mut items = Vec::with_capacity(records.len());
    for record in records {
        if !users.contains_key(&record.username) {
            let user = skippable(backend.get_user(&record.username).await)?;
            users.insert(record.username.clone(), user);
        }
        if !quizzes.contains_key(&record.quiz_id) {
            let quiz = skippable(backend.get_quiz(&record.quiz_id).await)?
                .map(|q| (q.name.clone(), q.total_marks()));
            quizzes.insert(record.quiz_id.clone(), quiz);
        }
        let (Some(Some(user)), Some(Some((quiz, total)))) =
            (users.get(&record.username), quizzes.get(&record.quiz_id))
        else {
            continue;
        };
        let Some(marks) = user.results.get(&record.quiz_id) else {
            tracing::debug!("{} has no result for {}", record.username, record.quiz_id);
            continue;
        };
        items.push(ActivityItem {
            username: record.username,
            full_name: user.full_name(),
            quiz: quiz.clone(),
            marks: *marks,
            total: *total,
            time: record.time,
        });
    }
    items.sort_by(|a, b| b.time.cmp(&a.time));
    Ok(items)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, unused_variables)]
    use super::*;
    use crate::trace;
    use chrono::TimeZone;
    use quizdeck_backend::{MemoryBackend, MemoryError};
    use quizdeck_ontology::{AttemptRecord, User};
    use rstest::rstest;

    fn record(username: &str, quiz_id: &str, minute: u32) -> AttemptRecord {
        AttemptRecord {
            username: username.into(),
            quiz_id: quiz_id.into(),
            time: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        }
    }

    async fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        let quiz = serde_json::json!({
            "name": "Capitals",
            "questions": [
                { "question": "France?", "answer": 1, "options": ["Lyon", "Paris"], "marks": 2 },
                { "question": "Italy?", "type": "text", "answer": "Rome", "marks": 2 },
            ]
        });
        backend.insert_quiz("capitals", quiz.as_object().cloned().unwrap());
        let mut ada = User::new("ada", "Ada", "Lovelace");
        ada.results.insert("capitals".into(), 3);
        backend.create_user(&ada, "hash").await.unwrap();
        let mut alan = User::new("alan", "Alan", "Turing");
        alan.results.insert("capitals".into(), 4);
        backend.create_user(&alan, "hash").await.unwrap();
        backend
    }

    #[rstest]
    #[tokio::test]
    async fn newest_first(trace: ()) {
        let backend = backend().await;
        backend.record_attempt(&record("ada", "capitals", 1)).await.unwrap();
        backend.record_attempt(&record("alan", "capitals", 5)).await.unwrap();
        backend.record_attempt(&record("ada", "capitals", 3)).await.unwrap();
        let feed = activity_feed(&backend).await.unwrap();
        let order: Vec<_> = feed.iter().map(|i| (&*i.username, i.time)).collect();
        assert_eq!(
            order,
            vec![
                ("alan", record("", "", 5).time),
                ("ada", record("", "", 3).time),
                ("ada", record("", "", 1).time),
            ]
        );
        assert_eq!(feed[0].to_string(), "Alan Turing Capitals 4/4 (100%)");
        assert_eq!(feed[1].to_string(), "Ada Lovelace Capitals 3/4 (75%)");
    }

    #[rstest]
    #[tokio::test]
    async fn unresolvable_records_are_skipped(trace: ()) {
        let backend = backend().await;
        backend.record_attempt(&record("ghost", "capitals", 1)).await.unwrap();
        backend.record_attempt(&record("ada", "missing", 2)).await.unwrap();
        let broken = serde_json::json!({ "firstName": 3 });
        backend.insert_user("broken", broken.as_object().cloned().unwrap());
        backend.record_attempt(&record("broken", "capitals", 3)).await.unwrap();
        backend
            .create_user(&User::new("grace", "Grace", "Hopper"), "hash")
            .await
            .unwrap();
        backend.record_attempt(&record("grace", "capitals", 4)).await.unwrap();
        backend.record_attempt(&record("ada", "capitals", 5)).await.unwrap();
        let feed = activity_feed(&backend).await.unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(&*feed[0].username, "ada");
        assert_eq!(feed[0].percentage(), 75);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_errors_abort(trace: ()) {
        let backend = backend().await;
        backend.record_attempt(&record("ada", "capitals", 1)).await.unwrap();
        backend.set_offline(true);
        assert_eq!(
            activity_feed(&backend).await,
            Err(BackendError::Connection(MemoryError::Offline))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn empty_feed(trace: ()) {
        let backend = backend().await;
        assert!(activity_feed(&backend).await.unwrap().is_empty());
    }
}

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use quizdeck_ontology::{
    AttemptRecord, DocumentMap, Notification, Quiz, User,
    documents::{FromDocument, ToDocument},
    users,
};
use rustc_hash::FxHashMap;

use crate::{BackendError, QuizBackend, RecordKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum MemoryError {
    #[error("backend is offline")]
    Offline,
}

#[derive(Default)]
struct Collections {
    quizzes: FxHashMap<Box<str>, DocumentMap>,
    users: FxHashMap<Box<str>, DocumentMap>,
    notifications: FxHashMap<Box<str>, DocumentMap>,
    items: Vec<DocumentMap>,
}

/// A [`QuizBackend`] keeping raw documents in memory.
///
/// Documents are decoded on every read, so malformed documents inserted via
/// [`insert_quiz`](Self::insert_quiz) and friends surface as
/// [`BackendError::Malformed`] exactly like they would from a hosted store.
#[derive(Default)]
pub struct MemoryBackend {
    collections: RwLock<Collections>,
    offline: AtomicBool,
}

type Result<T> = std::result::Result<T, BackendError<MemoryError>>;

impl MemoryBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline, every operation fails with [`MemoryError::Offline`].
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::Release);
    }

    pub fn insert_quiz(&self, id: &str, doc: DocumentMap) {
        self.collections.write().quizzes.insert(id.into(), doc);
    }

    pub fn insert_user(&self, username: &str, doc: DocumentMap) {
        self.collections.write().users.insert(username.into(), doc);
    }

    pub fn insert_notification(&self, id: &str, doc: DocumentMap) {
        self.collections
            .write()
            .notifications
            .insert(id.into(), doc);
    }

    /// The raw stored document of a user.
    #[must_use]
    pub fn user_document(&self, username: &str) -> Option<DocumentMap> {
        self.collections.read().users.get(username).cloned()
    }

    /// All recorded attempts, oldest first. Malformed records are skipped.
    #[must_use]
    pub fn attempts(&self) -> Vec<AttemptRecord> {
        self.collections
            .read()
            .items
            .iter()
            .filter_map(|d| AttemptRecord::from_document("", d).ok())
            .collect()
    }

    fn online(&self) -> Result<()> {
        if self.offline.load(Ordering::Acquire) {
            tracing::debug!("rejecting request: offline");
            Err(BackendError::Connection(MemoryError::Offline))
        } else {
            Ok(())
        }
    }

    fn decode<T: FromDocument>(kind: RecordKind, id: &str, doc: &DocumentMap) -> Result<T> {
        T::from_document(id, doc).map_err(|e| BackendError::malformed(kind, id, e))
    }

    pub(crate) fn quiz(&self, id: &str) -> Result<Quiz> {
        self.online()?;
        let lock = self.collections.read();
        let doc = lock
            .quizzes
            .get(id)
            .ok_or(BackendError::NotFound(RecordKind::Quiz))?;
        tracing::info!("loading quiz {id}");
        Self::decode(RecordKind::Quiz, id, doc)
    }

    fn quizzes(&self) -> Result<Vec<Quiz>> {
        self.online()?;
        let lock = self.collections.read();
        let mut ids: Vec<_> = lock.quizzes.keys().collect();
        ids.sort_unstable();
        ids.into_iter()
            .map(|id| Self::decode(RecordKind::Quiz, id, &lock.quizzes[id]))
            .collect()
    }

    fn user(&self, username: &str) -> Result<User> {
        self.online()?;
        let lock = self.collections.read();
        let doc = lock
            .users
            .get(username)
            .ok_or(BackendError::NotFound(RecordKind::User))?;
        Self::decode(RecordKind::User, username, doc)
    }

    fn create(&self, user: &User, password_hash: &str) -> Result<()> {
        self.online()?;
        let mut lock = self.collections.write();
        if lock.users.contains_key(&user.username) {
            return Err(BackendError::UserAlreadyExists);
        }
        let mut doc = user.to_document();
        doc.insert(users::PASSWORD.into(), password_hash.into());
        tracing::info!("creating user {}", user.username);
        lock.users.insert(user.username.clone(), doc);
        drop(lock);
        Ok(())
    }

    fn update(&self, user: &User) -> Result<()> {
        self.online()?;
        let mut lock = self.collections.write();
        let doc = lock
            .users
            .get_mut(&user.username)
            .ok_or(BackendError::NotFound(RecordKind::User))?;
        doc.extend(user.to_document());
        drop(lock);
        Ok(())
    }

    fn login(&self, username: &str, password_hash: &str) -> Result<User> {
        self.online()?;
        let lock = self.collections.read();
        let doc = lock
            .users
            .get(username)
            .ok_or(BackendError::NotFound(RecordKind::User))?;
        if User::password_hash(doc) != Some(password_hash) {
            return Err(BackendError::IncorrectPassword);
        }
        Self::decode(RecordKind::User, username, doc)
    }

    fn set_password(&self, username: &str, password_hash: &str) -> Result<()> {
        self.online()?;
        let mut lock = self.collections.write();
        let doc = lock
            .users
            .get_mut(username)
            .ok_or(BackendError::NotFound(RecordKind::User))?;
        doc.insert(users::PASSWORD.into(), password_hash.into());
        drop(lock);
        Ok(())
    }

    fn record(&self, record: &AttemptRecord) -> Result<()> {
        self.online()?;
        tracing::info!("recording attempt of {} at {}", record.username, record.quiz_id);
        self.collections.write().items.push(record.to_document());
        Ok(())
    }

    fn notifications(&self) -> Result<Vec<Notification>> {
        self.online()?;
        let mut list = self
            .collections
            .read()
            .notifications
            .iter()
            .map(|(id, doc)| Self::decode(RecordKind::Notification, id, doc))
            .collect::<Result<Vec<_>>>()?;
        Notification::sort(&mut list);
        Ok(list)
    }

    fn notification(&self, id: &str) -> Result<Notification> {
        self.online()?;
        let lock = self.collections.read();
        let doc = lock
            .notifications
            .get(id)
            .ok_or(BackendError::NotFound(RecordKind::Notification))?;
        Self::decode(RecordKind::Notification, id, doc)
    }

    fn records(&self) -> Result<Vec<AttemptRecord>> {
        self.online()?;
        self.collections
            .read()
            .items
            .iter()
            .enumerate()
            .map(|(i, doc)| Self::decode(RecordKind::Attempt, &i.to_string(), doc))
            .collect()
    }
}

impl QuizBackend for MemoryBackend {
    type Error = MemoryError;

    #[inline]
    fn get_quiz(&self, id: &str) -> impl Future<Output = Result<Quiz>> + Send {
        std::future::ready(self.quiz(id))
    }

    #[inline]
    fn get_quizzes(&self) -> impl Future<Output = Result<Vec<Quiz>>> + Send {
        std::future::ready(self.quizzes())
    }

    #[inline]
    fn get_user(&self, username: &str) -> impl Future<Output = Result<User>> + Send {
        std::future::ready(self.user(username))
    }

    #[inline]
    fn create_user(
        &self,
        user: &User,
        password_hash: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        std::future::ready(self.create(user, password_hash))
    }

    #[inline]
    fn update_user(&self, user: &User) -> impl Future<Output = Result<()>> + Send {
        std::future::ready(self.update(user))
    }

    #[inline]
    fn log_in(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<User>> + Send {
        std::future::ready(self.login(username, password_hash))
    }

    #[inline]
    fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<()>> + Send {
        std::future::ready(self.set_password(username, password_hash))
    }

    #[inline]
    fn record_attempt(&self, record: &AttemptRecord) -> impl Future<Output = Result<()>> + Send {
        std::future::ready(self.record(record))
    }

    #[inline]
    fn get_notifications(&self) -> impl Future<Output = Result<Vec<Notification>>> + Send {
        std::future::ready(self.notifications())
    }

    #[inline]
    fn get_notification(&self, id: &str) -> impl Future<Output = Result<Notification>> + Send {
        std::future::ready(self.notification(id))
    }

    #[inline]
    fn get_attempts(&self) -> impl Future<Output = Result<Vec<AttemptRecord>>> + Send {
        std::future::ready(self.records())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, unused_variables)]
    use super::*;
    use crate::trace;
    use quizdeck_ontology::PropertyError;
    use rstest::rstest;

    fn doc(v: serde_json::Value) -> DocumentMap {
        v.as_object().cloned().unwrap()
    }

    fn backend() -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.insert_quiz(
            "q1",
            doc(serde_json::json!({
                "name": "Capitals",
                "questions": [{ "question": "France?", "answer": 0, "options": ["Paris", "Lyon"] }]
            })),
        );
        backend
    }

    #[rstest]
    #[tokio::test]
    async fn quizzes_are_decoded(trace: ()) {
        let backend = backend();
        let quiz = backend.get_quiz("q1").await.unwrap();
        assert_eq!(&*quiz.name, "Capitals");
        assert_eq!(
            backend.get_quiz("q2").await,
            Err(BackendError::NotFound(RecordKind::Quiz))
        );
        backend.insert_quiz("q0", doc(serde_json::json!({ "name": "Broken" })));
        let Err(BackendError::Malformed { kind, id, source }) = backend.get_quiz("q0").await else {
            panic!("expected a malformed quiz");
        };
        assert_eq!((kind, &*id), (RecordKind::Quiz, "q0"));
        assert_eq!(source, PropertyError::Missing("questions".into()));
        assert!(backend.get_quizzes().await.is_err());
    }

    #[rstest]
    #[tokio::test]
    async fn offline_is_a_connection_error(trace: ()) {
        let backend = backend();
        backend.set_offline(true);
        assert_eq!(
            backend.get_quiz("q1").await,
            Err(BackendError::Connection(MemoryError::Offline))
        );
        backend.set_offline(false);
        assert_eq!(backend.get_quizzes().await.unwrap().len(), 1);
    }

    #[rstest]
    #[tokio::test]
    async fn user_lifecycle(trace: ()) {
        let backend = backend();
        let mut user = User::new("ada", "Ada", "Lovelace");
        assert!(!backend.has_user("ada").await.unwrap());
        backend.create_user(&user, "hash").await.unwrap();
        assert!(backend.has_user("ada").await.unwrap());
        assert_eq!(
            backend.create_user(&user, "other").await,
            Err(BackendError::UserAlreadyExists)
        );
        assert_eq!(
            backend.log_in("ada", "wrong").await,
            Err(BackendError::IncorrectPassword)
        );
        assert_eq!(
            backend.log_in("bob", "hash").await,
            Err(BackendError::NotFound(RecordKind::User))
        );
        user.results.insert("q1".into(), 3);
        backend.update_user(&user).await.unwrap();
        assert_eq!(backend.log_in("ada", "hash").await.unwrap(), user);
        backend.update_password("ada", "new").await.unwrap();
        assert!(backend.log_in("ada", "new").await.is_ok());
        assert_eq!(
            User::password_hash(&backend.user_document("ada").unwrap()),
            Some("new")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn attempts_and_notifications(trace: ()) {
        let backend = backend();
        backend
            .record_attempt(&AttemptRecord::now("ada", "q1"))
            .await
            .unwrap();
        assert_eq!(&*backend.attempts()[0].quiz_id, "q1");
        backend.insert_notification(
            "old",
            doc(serde_json::json!({ "title": "Old", "time": "2020-01-01T00:00:00Z" })),
        );
        backend.insert_notification(
            "new",
            doc(serde_json::json!({ "title": "New", "time": "2024-01-01T00:00:00Z" })),
        );
        let list = backend.get_notifications().await.unwrap();
        assert_eq!(
            list.iter().map(|n| &*n.id).collect::<Vec<_>>(),
            vec!["new", "old"]
        );
        assert_eq!(&*backend.get_notification("old").await.unwrap().title, "Old");
        assert_eq!(
            backend.get_notification("gone").await,
            Err(BackendError::NotFound(RecordKind::Notification))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn attempt_records(trace: ()) {
        let backend = backend();
        let first = AttemptRecord::now("ada", "q1");
        let second = AttemptRecord::now("bob", "q1");
        backend.record_attempt(&first).await.unwrap();
        backend.record_attempt(&second).await.unwrap();
        assert_eq!(backend.get_attempts().await.unwrap(), vec![first, second]);

        backend.collections.write().items.push(doc(serde_json::json!({ "username": "eve" })));
        let Err(BackendError::Malformed { kind, id, .. }) = backend.get_attempts().await else {
            panic!("expected a malformed record");
        };
        assert_eq!((kind, &*id), (RecordKind::Attempt, "2"));
    }
}

use crate::{BackendError, QuizBackend};
use dashmap::Entry;
use futures_util::TryFutureExt;
use kanal::AsyncSender;
use parking_lot::RwLock;
use quizdeck_ontology::{AttemptRecord, Notification, Quiz, User};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Deserialize, serde::Serialize)]
pub enum CacheError<E: std::fmt::Debug> {
    #[error("channel closed")]
    Closed,
    #[error("channel sender closed")]
    SendClosed,
    #[error("channel receiver closed")]
    ReceiveClosed,
    #[error("{0}")]
    Connection(E),
}

impl<E: std::fmt::Debug> From<CacheError<BackendError<E>>> for BackendError<CacheError<E>> {
    fn from(value: CacheError<BackendError<E>>) -> Self {
        match value {
            CacheError::Connection(c) => match c {
                BackendError::Connection(c) => Self::Connection(CacheError::Connection(c)),
                BackendError::NotFound(n) => Self::NotFound(n),
                BackendError::Malformed { kind, id, source } => {
                    Self::Malformed { kind, id, source }
                }
                BackendError::UserAlreadyExists => Self::UserAlreadyExists,
                BackendError::IncorrectPassword => Self::IncorrectPassword,
            },
            CacheError::Closed => Self::Connection(CacheError::Closed),
            CacheError::ReceiveClosed => Self::Connection(CacheError::ReceiveClosed),
            CacheError::SendClosed => Self::Connection(CacheError::SendClosed),
        }
    }
}

#[inline]
fn lift<E: std::fmt::Debug>(e: BackendError<E>) -> BackendError<CacheError<E>> {
    CacheError::Connection(e).into()
}

/// Wraps a [`QuizBackend`], caching quizzes by id.
///
/// Concurrent requests for the same quiz share a single load of the inner
/// backend. Failed loads are not cached; the next request retries. Everything
/// but quizzes is passed through.
pub struct CachedBackend<B: QuizBackend>
where
    B::Error: Clone + Send + Sync + std::fmt::Debug,
{
    inner: B,
    quiz_cache: Cache<Box<str>, Quiz, BackendError<B::Error>>,
}

impl<B: QuizBackend> CachedBackend<B>
where
    B::Error: Clone + Send + Sync + std::fmt::Debug,
{
    #[inline]
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            quiz_cache: Cache {
                map: dashmap::DashMap::new(),
            },
        }
    }

    #[inline]
    pub const fn inner(&self) -> &B {
        &self.inner
    }

    /// Drops the cached version of a quiz, if any.
    pub fn invalidate(&self, id: &str) {
        self.quiz_cache.map.remove(id);
    }
}

impl<B: QuizBackend + Sync> QuizBackend for CachedBackend<B>
where
    B::Error: Clone + Send + Sync + std::fmt::Debug,
{
    type Error = CacheError<B::Error>;

    fn get_quiz(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Quiz, BackendError<Self::Error>>> + Send {
        let inner = &self.inner;
        self.quiz_cache
            .get(id.into(), move |id| async move { inner.get_quiz(&id).await })
            .map_err(Into::into)
    }

    #[inline]
    fn get_quizzes(
        &self,
    ) -> impl Future<Output = Result<Vec<Quiz>, BackendError<Self::Error>>> + Send {
        self.inner.get_quizzes().map_err(lift)
    }

    #[inline]
    fn get_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<User, BackendError<Self::Error>>> + Send {
        self.inner.get_user(username).map_err(lift)
    }

    #[inline]
    fn has_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<bool, BackendError<Self::Error>>> + Send {
        self.inner.has_user(username).map_err(lift)
    }

    #[inline]
    fn create_user(
        &self,
        user: &User,
        password_hash: &str,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
        self.inner
            .create_user(user, password_hash)
            .map_err(lift)
    }

    #[inline]
    fn update_user(
        &self,
        user: &User,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
        self.inner.update_user(user).map_err(lift)
    }

    #[inline]
    fn log_in(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<User, BackendError<Self::Error>>> + Send {
        self.inner
            .log_in(username, password_hash)
            .map_err(lift)
    }

    #[inline]
    fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
        self.inner
            .update_password(username, password_hash)
            .map_err(lift)
    }

    #[inline]
    fn record_attempt(
        &self,
        record: &AttemptRecord,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
        self.inner
            .record_attempt(record)
            .map_err(lift)
    }

    #[inline]
    fn get_notifications(
        &self,
    ) -> impl Future<Output = Result<Vec<Notification>, BackendError<Self::Error>>> + Send {
        self.inner
            .get_notifications()
            .map_err(lift)
    }

    #[inline]
    fn get_notification(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Notification, BackendError<Self::Error>>> + Send {
        self.inner.get_notification(id).map_err(lift)
    }

    #[inline]
    fn get_attempts(
        &self,
    ) -> impl Future<Output = Result<Vec<AttemptRecord>, BackendError<Self::Error>>> + Send {
        self.inner.get_attempts().map_err(lift)
    }
}

#[derive(Clone)]
enum MaybeValue<T: Clone, E: Clone> {
    Done(Result<T, E>),
    Pending(kanal::AsyncReceiver<Result<T, E>>),
}

struct Cache<K, V, E: std::fmt::Debug + Clone + Send + Sync>
where
    K: std::hash::Hash + Clone + Eq,
    V: Clone + Send + Sync,
{
    map: dashmap::DashMap<K, Arc<RwLock<MaybeValue<V, E>>>>,
}
impl<K, V, E> Cache<K, V, E>
where
    K: std::hash::Hash + Clone + Eq,
    V: Clone + Send + Sync,
    E: std::fmt::Debug + Clone + Send + Sync,
{
    fn get<Fut: Future<Output = Result<V, E>> + Send>(
        &self,
        k: K,
        f: impl FnOnce(K) -> Fut,
    ) -> impl Future<Output = Result<V, CacheError<E>>> + Send {
        use either::Either::{Left, Right};
        match self.map.entry(k.clone()) {
            Entry::Occupied(mut lock) => {
                let pending = match &*lock.get().read() {
                    MaybeValue::Done(Ok(a)) => return Left(Left(std::future::ready(Ok(a.clone())))),
                    MaybeValue::Done(Err(_)) => None,
                    // a pending load without sender was dropped before finishing
                    MaybeValue::Pending(k) if k.sender_count() == 0 => None,
                    MaybeValue::Pending(k) => Some(k.clone()),
                };
                if let Some(receiver) = pending {
                    tracing::trace!("joining pending load");
                    return Left(Right(Self::recv(receiver)));
                }
                tracing::debug!("retrying failed or abandoned load");
                let (sender, receiver) = kanal::unbounded_async();
                let receiver = Arc::new(RwLock::new(MaybeValue::Pending(receiver)));
                lock.insert(receiver.clone());
                Right(Self::call(f(k), sender, receiver))
            }
            Entry::Vacant(v) => {
                let (sender, receiver) = kanal::unbounded_async();
                let receiver = Arc::new(RwLock::new(MaybeValue::Pending(receiver)));
                v.insert(receiver.clone());
                Right(Self::call(f(k), sender, receiver))
            }
        }
    }

    async fn call(
        f: impl Future<Output = Result<V, E>>,
        sender: AsyncSender<Result<V, E>>,
        receiver: Arc<RwLock<MaybeValue<V, E>>>,
    ) -> Result<V, CacheError<E>> {
        let r = f.await;
        {
            let mut lock = receiver.write();
            *lock = MaybeValue::Done(r.clone());
        }
        // one message per waiting receiver; the channel is unbounded
        for _ in 0..sender.receiver_count() {
            sender.send(r.clone()).await?;
        }
        drop(sender);
        r.map_err(CacheError::Connection)
    }

    #[inline]
    async fn recv(k: kanal::AsyncReceiver<Result<V, E>>) -> Result<V, CacheError<E>> {
        match k.recv().await {
            Ok(r) => r.map_err(CacheError::Connection),
            Err(e) => Err(e.into()),
        }
    }
}

impl<E: std::fmt::Debug> From<kanal::SendError> for CacheError<E> {
    #[inline]
    fn from(value: kanal::SendError) -> Self {
        match value {
            kanal::SendError::Closed => Self::Closed,
            kanal::SendError::ReceiveClosed => Self::ReceiveClosed,
        }
    }
}

impl<E: std::fmt::Debug> From<kanal::ReceiveError> for CacheError<E> {
    #[inline]
    fn from(value: kanal::ReceiveError) -> Self {
        match value {
            kanal::ReceiveError::Closed => Self::Closed,
            kanal::ReceiveError::SendClosed => Self::SendClosed,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, unused_variables)]
    use super::*;
    use crate::{MemoryBackend, MemoryError, RecordKind, trace};
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts quiz loads and delays them, so concurrent requests overlap.
    struct Counting {
        inner: MemoryBackend,
        loads: AtomicUsize,
    }

    impl QuizBackend for Counting {
        type Error = MemoryError;
        fn get_quiz(
            &self,
            id: &str,
        ) -> impl Future<Output = Result<Quiz, BackendError<Self::Error>>> + Send {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let result = self.inner.quiz(id);
            async move {
                tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                result
            }
        }
        fn get_quizzes(
            &self,
        ) -> impl Future<Output = Result<Vec<Quiz>, BackendError<Self::Error>>> + Send {
            self.inner.get_quizzes()
        }
        fn get_user(
            &self,
            username: &str,
        ) -> impl Future<Output = Result<User, BackendError<Self::Error>>> + Send {
            self.inner.get_user(username)
        }
        fn create_user(
            &self,
            user: &User,
            password_hash: &str,
        ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
            self.inner.create_user(user, password_hash)
        }
        fn update_user(
            &self,
            user: &User,
        ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
            self.inner.update_user(user)
        }
        fn log_in(
            &self,
            username: &str,
            password_hash: &str,
        ) -> impl Future<Output = Result<User, BackendError<Self::Error>>> + Send {
            self.inner.log_in(username, password_hash)
        }
        fn update_password(
            &self,
            username: &str,
            password_hash: &str,
        ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
            self.inner.update_password(username, password_hash)
        }
        fn record_attempt(
            &self,
            record: &AttemptRecord,
        ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
            self.inner.record_attempt(record)
        }
        fn get_notifications(
            &self,
        ) -> impl Future<Output = Result<Vec<Notification>, BackendError<Self::Error>>> + Send
        {
            self.inner.get_notifications()
        }
        fn get_notification(
            &self,
            id: &str,
        ) -> impl Future<Output = Result<Notification, BackendError<Self::Error>>> + Send {
            self.inner.get_notification(id)
        }
        fn get_attempts(
            &self,
        ) -> impl Future<Output = Result<Vec<AttemptRecord>, BackendError<Self::Error>>> + Send
        {
            self.inner.get_attempts()
        }
    }

    fn counting() -> CachedBackend<Counting> {
        let inner = MemoryBackend::new();
        let doc = serde_json::json!({
            "name": "Capitals",
            "questions": [{ "question": "France?", "answer": 0, "options": ["Paris", "Lyon"] }]
        });
        inner.insert_quiz("q1", doc.as_object().cloned().unwrap());
        Counting {
            inner,
            loads: AtomicUsize::new(0),
        }
        .cached()
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_loads_are_shared(trace: ()) {
        let backend = counting();
        let (a, b, c) = futures::join!(
            backend.get_quiz("q1"),
            backend.get_quiz("q1"),
            backend.get_quiz("q1")
        );
        let a = a.unwrap();
        assert_eq!(a, b.unwrap());
        assert_eq!(a, c.unwrap());
        assert_eq!(backend.get_quiz("q1").await.unwrap(), a);
        assert_eq!(backend.inner().loads.load(Ordering::SeqCst), 1);
        backend.invalidate("q1");
        backend.get_quiz("q1").await.unwrap();
        assert_eq!(backend.inner().loads.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn abandoned_loads_are_retried(trace: ()) {
        let backend = counting();
        drop(backend.get_quiz("q1"));
        let started = backend.get_quiz("q1");
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(1), started).await;
        assert!(timed_out.is_err());
        let quiz = backend.get_quiz("q1").await.unwrap();
        assert_eq!(&*quiz.name, "Capitals");
        assert_eq!(backend.get_quiz("q1").await.unwrap(), quiz);
        assert_eq!(backend.inner().loads.load(Ordering::SeqCst), 2);
    }

    #[rstest]
    #[tokio::test]
    async fn failures_are_not_cached(trace: ()) {
        let backend = counting();
        assert_eq!(
            backend.get_quiz("q2").await,
            Err(BackendError::NotFound(RecordKind::Quiz))
        );
        backend.inner().inner.set_offline(true);
        assert_eq!(
            backend.get_quiz("q1").await,
            Err(BackendError::Connection(CacheError::Connection(
                MemoryError::Offline
            )))
        );
        backend.inner().inner.set_offline(false);
        assert!(backend.get_quiz("q1").await.is_ok());
        assert_eq!(backend.inner().loads.load(Ordering::SeqCst), 3);
    }
}

#![allow(unexpected_cfgs)]
#![cfg_attr(all(doc, CHANNEL_NIGHTLY), feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
/*!
 * ## Feature flags
 */
#![cfg_attr(doc,doc = document_features::document_features!())]

#[cfg(feature = "cached")]
mod cache;
#[cfg(feature = "cached")]
pub use cache::*;

mod memory;
pub use memory::*;

pub mod errors;
pub use errors::*;

use futures_util::FutureExt;
use quizdeck_ontology::{AttemptRecord, Notification, Quiz, User};

pub trait QuizBackend {
    type Error: std::fmt::Display + std::fmt::Debug;

    #[cfg(feature = "cached")]
    #[inline]
    fn cached(self) -> cache::CachedBackend<Self>
    where
        Self: Sized + Sync,
        Self::Error: Clone + Send + Sync,
    {
        cache::CachedBackend::new(self)
    }

    fn get_quiz(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Quiz, BackendError<Self::Error>>> + Send;

    /// All quizzes, ordered by id. Fails if any stored quiz is malformed.
    fn get_quizzes(
        &self,
    ) -> impl Future<Output = Result<Vec<Quiz>, BackendError<Self::Error>>> + Send;

    fn get_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<User, BackendError<Self::Error>>> + Send;

    fn has_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<bool, BackendError<Self::Error>>> + Send {
        self.get_user(username).map(|r| match r {
            Ok(_) | Err(BackendError::Malformed { .. }) => Ok(true),
            Err(BackendError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        })
    }

    /// Stores a new user together with its password hash.
    ///
    /// Fails with [`BackendError::UserAlreadyExists`] if the username is
    /// taken.
    fn create_user(
        &self,
        user: &User,
        password_hash: &str,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send;

    /// Overwrites the stored profile of an existing user; the password hash
    /// is kept.
    fn update_user(
        &self,
        user: &User,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send;

    /// Fails with [`BackendError::NotFound`] for unknown users and
    /// [`BackendError::IncorrectPassword`] if the hash does not match.
    fn log_in(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<User, BackendError<Self::Error>>> + Send;

    fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send;

    fn record_attempt(
        &self,
        record: &AttemptRecord,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send;

    /// All notifications, newest first.
    fn get_notifications(
        &self,
    ) -> impl Future<Output = Result<Vec<Notification>, BackendError<Self::Error>>> + Send;

    fn get_notification(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Notification, BackendError<Self::Error>>> + Send;

    /// All attempt records, oldest first. Fails if any stored record is
    /// malformed.
    fn get_attempts(
        &self,
    ) -> impl Future<Output = Result<Vec<AttemptRecord>, BackendError<Self::Error>>> + Send;
}

impl<B: QuizBackend + Sync> QuizBackend for &B {
    type Error = B::Error;

    #[inline]
    fn get_quiz(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Quiz, BackendError<Self::Error>>> + Send {
        (**self).get_quiz(id)
    }

    #[inline]
    fn get_quizzes(
        &self,
    ) -> impl Future<Output = Result<Vec<Quiz>, BackendError<Self::Error>>> + Send {
        (**self).get_quizzes()
    }

    #[inline]
    fn get_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<User, BackendError<Self::Error>>> + Send {
        (**self).get_user(username)
    }

    #[inline]
    fn has_user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<bool, BackendError<Self::Error>>> + Send {
        (**self).has_user(username)
    }

    #[inline]
    fn create_user(
        &self,
        user: &User,
        password_hash: &str,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
        (**self).create_user(user, password_hash)
    }

    #[inline]
    fn update_user(
        &self,
        user: &User,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
        (**self).update_user(user)
    }

    #[inline]
    fn log_in(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<User, BackendError<Self::Error>>> + Send {
        (**self).log_in(username, password_hash)
    }

    #[inline]
    fn update_password(
        &self,
        username: &str,
        password_hash: &str,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
        (**self).update_password(username, password_hash)
    }

    #[inline]
    fn record_attempt(
        &self,
        record: &AttemptRecord,
    ) -> impl Future<Output = Result<(), BackendError<Self::Error>>> + Send {
        (**self).record_attempt(record)
    }

    #[inline]
    fn get_notifications(
        &self,
    ) -> impl Future<Output = Result<Vec<Notification>, BackendError<Self::Error>>> + Send {
        (**self).get_notifications()
    }

    #[inline]
    fn get_notification(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Notification, BackendError<Self::Error>>> + Send {
        (**self).get_notification(id)
    }

    #[inline]
    fn get_attempts(
        &self,
    ) -> impl Future<Output = Result<Vec<AttemptRecord>, BackendError<Self::Error>>> + Send {
        (**self).get_attempts()
    }
}

#[cfg(test)]
#[rstest::fixture]
fn trace() {
    let _ = tracing_subscriber::fmt().try_init();
}

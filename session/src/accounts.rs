use quizdeck_backend::{BackendError, QuizBackend};
use quizdeck_ontology::{
    AttemptResult, User, Violation,
    users::validation::{
        normalize_whitespace, validate_credentials, validate_first_name, validate_last_name,
        validate_password,
    },
};
use rustc_hash::FxHashSet;

use crate::{Attempt, NoQuizAvailable, SessionConfig};

/// Turns a plain password into the hash the backend stores.
pub trait PasswordHasher {
    fn hash(&self, password: &str) -> String;
}
impl<F: Fn(&str) -> String> PasswordHasher for F {
    #[inline]
    fn hash(&self, password: &str) -> String {
        self(password)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountError<E: std::fmt::Debug + std::fmt::Display> {
    #[error("invalid input: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Invalid(Box<[Violation]>),
    #[error(transparent)]
    Backend(#[from] BackendError<E>),
    #[error("not logged in")]
    NotLoggedIn,
    #[error("old password does not match")]
    WrongOldPassword,
}

impl<E: std::fmt::Debug + std::fmt::Display> AccountError<E> {
    fn check(violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self::Invalid(violations.into_boxed_slice()))
        }
    }
}

/// The account side of a session: who is logged in, with which password,
/// and which notifications have been read.
///
/// Notifications read while anonymous are remembered locally and handed to
/// the account created by [`sign_up`](Self::sign_up).
pub struct Accounts<B, H> {
    backend: B,
    hasher: H,
    user: Option<User>,
    password: Option<String>,
    read: FxHashSet<Box<str>>,
}

impl<B: QuizBackend + Sync, H: PasswordHasher> Accounts<B, H> {
    #[must_use]
    pub fn new(backend: B, hasher: H) -> Self {
        Self {
            backend,
            hasher,
            user: None,
            password: None,
            read: FxHashSet::default(),
        }
    }

    #[inline]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[inline]
    pub const fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[inline]
    pub const fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Names are whitespace-normalized before validation.
    ///
    /// # Errors
    /// if the input is invalid, the username is taken, or the backend fails
    pub async fn sign_up(
        &mut self,
        username: &str,
        password: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<&User, AccountError<B::Error>> {
        let mut user = User::new(
            username,
            &normalize_whitespace(first_name),
            &normalize_whitespace(last_name),
        );
        AccountError::check(user.validate(Some(password)))?;
        if self.backend.has_user(username).await? {
            return Err(BackendError::UserAlreadyExists.into());
        }
        user.read.extend(self.read.iter().cloned());
        self.backend
            .create_user(&user, &self.hasher.hash(password))
            .await?;
        tracing::info!("signed up {username}");
        self.read.clear();
        self.password = Some(password.to_string());
        Ok(self.user.insert(user))
    }

    /// # Errors
    /// if the input is invalid, the user does not exist or is malformed,
    /// the password is wrong, or the backend fails
    pub async fn log_in(
        &mut self,
        username: &str,
        password: &str,
    ) -> Result<&User, AccountError<B::Error>> {
        AccountError::check(validate_credentials(username, password))?;
        let user = self
            .backend
            .log_in(username, &self.hasher.hash(password))
            .await?;
        tracing::info!("logged in {username}");
        self.password = Some(password.to_string());
        Ok(self.user.insert(user))
    }

    pub fn log_out(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::info!("logged out {}", user.username);
        }
        self.password = None;
        self.read.clear();
    }

    /// Reloads the logged in user from the backend.
    ///
    /// # Errors
    /// if nobody is logged in or the backend fails
    pub async fn refresh(&mut self) -> Result<&User, AccountError<B::Error>> {
        let Some(user) = &self.user else {
            return Err(AccountError::NotLoggedIn);
        };
        let fresh = self.backend.get_user(&user.username).await?;
        Ok(self.user.insert(fresh))
    }

    /// Changes the first and last name; nothing else about the user is
    /// touched.
    ///
    /// # Errors
    /// if nobody is logged in, a name is invalid, or the backend fails
    pub async fn update_names(
        &mut self,
        first_name: &str,
        last_name: &str,
    ) -> Result<(), AccountError<B::Error>> {
        let Some(user) = self.user.as_mut() else {
            return Err(AccountError::NotLoggedIn);
        };
        let first_name = normalize_whitespace(first_name);
        let last_name = normalize_whitespace(last_name);
        AccountError::check(
            [validate_first_name(&first_name), validate_last_name(&last_name)]
                .into_iter()
                .flatten()
                .collect(),
        )?;
        let mut updated = user.clone();
        updated.first_name = first_name.into();
        updated.last_name = last_name.into();
        self.backend.update_user(&updated).await?;
        *user = updated;
        Ok(())
    }

    /// # Errors
    /// if nobody is logged in, `old` is not the password used to log in,
    /// `new` is invalid, or the backend fails
    pub async fn change_password(
        &mut self,
        old: &str,
        new: &str,
    ) -> Result<(), AccountError<B::Error>> {
        let Some(user) = &self.user else {
            return Err(AccountError::NotLoggedIn);
        };
        if self.password.as_deref() != Some(old) {
            return Err(AccountError::WrongOldPassword);
        }
        AccountError::check(validate_password(new).into_iter().collect())?;
        self.backend
            .update_password(&user.username, &self.hasher.hash(new))
            .await?;
        self.password = Some(new.to_string());
        Ok(())
    }

    /// Marks notification `id` as read, persisting it if somebody is
    /// logged in.
    ///
    /// # Errors
    /// if the backend fails; the notification stays unread then
    pub async fn mark_read(&mut self, id: &str) -> Result<(), AccountError<B::Error>> {
        let Some(user) = self.user.as_mut() else {
            self.read.insert(id.into());
            return Ok(());
        };
        if !user.read.insert(id.into()) {
            return Ok(());
        }
        if let Err(e) = self.backend.update_user(user).await {
            user.read.remove(id);
            return Err(e.into());
        }
        Ok(())
    }

    #[must_use]
    pub fn has_read(&self, id: &str) -> bool {
        self.user
            .as_ref()
            .map_or_else(|| self.read.contains(id), |u| u.has_read(id))
    }

    /// # Errors
    /// if nobody is logged in or the backend fails
    pub async fn set_warn_blank(&mut self, warn: bool) -> Result<(), AccountError<B::Error>> {
        let Some(user) = self.user.as_mut() else {
            return Err(AccountError::NotLoggedIn);
        };
        if user.warn_blank == warn {
            return Ok(());
        }
        user.warn_blank = warn;
        if let Err(e) = self.backend.update_user(user).await {
            user.warn_blank = !warn;
            return Err(e.into());
        }
        Ok(())
    }

    /// Starts an attempt on `quiz_id` with the preferences of the logged in
    /// user.
    ///
    /// # Errors
    /// see [`load_attempt`](crate::load_attempt)
    pub async fn load_attempt(
        &self,
        quiz_id: &str,
        config: SessionConfig,
    ) -> Result<Attempt, NoQuizAvailable<B::Error>> {
        let config = config.for_user(self.user.as_ref());
        crate::load_attempt(&self.backend, quiz_id, &config).await
    }

    /// # Errors
    /// see [`record_result`](crate::record_result)
    pub async fn record_result(
        &mut self,
        quiz_id: &str,
        result: &AttemptResult,
    ) -> Result<bool, BackendError<B::Error>> {
        crate::record_result(&self.backend, self.user.as_mut(), quiz_id, result).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, unused_variables)]
    use super::*;
    use crate::trace;
    use quizdeck_backend::{MemoryBackend, MemoryError, RecordKind};
    use quizdeck_ontology::{Field, documents::FromDocument};
    use rstest::rstest;

    fn hash(password: &str) -> String {
        format!("hashed:{password}")
    }

    fn stored(backend: &MemoryBackend, username: &str) -> User {
        User::from_document(username, &backend.user_document(username).unwrap()).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn sign_up_then_log_in(trace: ()) {
        let backend = MemoryBackend::new();
        let mut accounts = Accounts::new(&backend, hash);
        let user = accounts
            .sign_up("ada", "analytical", "  Ada  ", "Lovelace   Byron")
            .await
            .unwrap();
        assert_eq!(&*user.first_name, "Ada");
        assert_eq!(&*user.last_name, "Lovelace Byron");
        assert_eq!(
            User::password_hash(&backend.user_document("ada").unwrap()),
            Some("hashed:analytical")
        );

        accounts.log_out();
        assert!(!accounts.is_logged_in());
        assert_eq!(
            accounts.log_in("ada", "engineering").await.unwrap_err(),
            AccountError::Backend(BackendError::IncorrectPassword)
        );
        assert_eq!(
            accounts.log_in("babbage", "engineering").await.unwrap_err(),
            AccountError::Backend(BackendError::NotFound(RecordKind::User))
        );
        assert_eq!(&*accounts.log_in("ada", "analytical").await.unwrap().username, "ada");
    }

    #[rstest]
    #[tokio::test]
    async fn invalid_input_is_rejected_before_the_backend(trace: ()) {
        let backend = MemoryBackend::new();
        backend.set_offline(true);
        let mut accounts = Accounts::new(&backend, hash);
        let Err(AccountError::Invalid(violations)) =
            accounts.sign_up("a b", "short", "Ada", "").await
        else {
            panic!("expected validation errors");
        };
        assert_eq!(
            &*violations,
            &[
                Violation::InvalidUsername,
                Violation::PasswordTooShort,
                Violation::EmptyName(Field::LastName)
            ]
        );
        assert!(matches!(
            accounts.log_in("", "whatever1").await,
            Err(AccountError::Invalid(_))
        ));
        assert_eq!(
            accounts.log_in("ada", "whatever1").await.unwrap_err(),
            AccountError::Backend(BackendError::Connection(MemoryError::Offline))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn usernames_are_unique(trace: ()) {
        let backend = MemoryBackend::new();
        let mut accounts = Accounts::new(&backend, hash);
        accounts.sign_up("ada", "analytical", "Ada", "Lovelace").await.unwrap();
        accounts.log_out();
        assert_eq!(
            accounts.sign_up("ada", "different", "Other", "Ada").await.unwrap_err(),
            AccountError::Backend(BackendError::UserAlreadyExists)
        );
        assert_eq!(&*stored(&backend, "ada").first_name, "Ada");
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_users_cannot_log_in(trace: ()) {
        let backend = MemoryBackend::new();
        let doc = serde_json::json!({ "firstName": 3, "password": "hashed:analytical" });
        backend.insert_user("ada", doc.as_object().cloned().unwrap());
        let mut accounts = Accounts::new(&backend, hash);
        assert!(matches!(
            accounts.log_in("ada", "analytical").await,
            Err(AccountError::Backend(BackendError::Malformed { .. }))
        ));
        assert!(matches!(
            accounts.sign_up("ada", "analytical", "Ada", "Lovelace").await,
            Err(AccountError::Backend(BackendError::UserAlreadyExists))
        ));
    }

    #[rstest]
    #[tokio::test]
    async fn anonymous_reads_move_into_new_accounts(trace: ()) {
        let backend = MemoryBackend::new();
        let mut accounts = Accounts::new(&backend, hash);
        accounts.mark_read("welcome").await.unwrap();
        assert!(accounts.has_read("welcome"));
        assert!(!accounts.has_read("update"));

        accounts.sign_up("ada", "analytical", "Ada", "Lovelace").await.unwrap();
        assert!(accounts.has_read("welcome"));
        accounts.mark_read("update").await.unwrap();
        let user = stored(&backend, "ada");
        assert!(user.has_read("welcome") && user.has_read("update"));

        accounts.log_out();
        assert!(!accounts.has_read("welcome"));
    }

    #[rstest]
    #[tokio::test]
    async fn failed_reads_stay_unread(trace: ()) {
        let backend = MemoryBackend::new();
        let mut accounts = Accounts::new(&backend, hash);
        accounts.sign_up("ada", "analytical", "Ada", "Lovelace").await.unwrap();
        backend.set_offline(true);
        assert!(accounts.mark_read("welcome").await.is_err());
        assert!(!accounts.has_read("welcome"));
    }

    #[rstest]
    #[tokio::test]
    async fn change_password(trace: ()) {
        let backend = MemoryBackend::new();
        let mut accounts = Accounts::new(&backend, hash);
        assert_eq!(
            accounts.change_password("a", "b").await.unwrap_err(),
            AccountError::NotLoggedIn
        );
        accounts.sign_up("ada", "analytical", "Ada", "Lovelace").await.unwrap();
        assert_eq!(
            accounts.change_password("engineering", "difference").await.unwrap_err(),
            AccountError::WrongOldPassword
        );
        assert_eq!(
            accounts.change_password("analytical", "has space").await.unwrap_err(),
            AccountError::Invalid(Box::new([Violation::PasswordWhitespace]))
        );
        accounts.change_password("analytical", "difference").await.unwrap();
        accounts.log_out();
        assert!(accounts.log_in("ada", "analytical").await.is_err());
        accounts.log_in("ada", "difference").await.unwrap();
    }

    #[rstest]
    #[tokio::test]
    async fn only_names_change(trace: ()) {
        let backend = MemoryBackend::new();
        let mut accounts = Accounts::new(&backend, hash);
        accounts.sign_up("ada", "analytical", "Ada", "Lovelace").await.unwrap();
        accounts.mark_read("welcome").await.unwrap();
        assert_eq!(
            accounts.update_names("Ada1", "King").await.unwrap_err(),
            AccountError::Invalid(Box::new([Violation::InvalidName(Field::FirstName)]))
        );
        accounts.update_names("Augusta  Ada", "King").await.unwrap();
        assert_eq!(accounts.user().unwrap().full_name(), "Augusta Ada King");

        let user = stored(&backend, "ada");
        assert_eq!(&*user.first_name, "Augusta Ada");
        assert!(user.has_read("welcome"));
        assert_eq!(
            User::password_hash(&backend.user_document("ada").unwrap()),
            Some("hashed:analytical")
        );
    }

    #[rstest]
    #[tokio::test]
    async fn refresh_and_preferences(trace: ()) {
        let backend = MemoryBackend::new();
        let mut accounts = Accounts::new(&backend, hash);
        assert_eq!(accounts.refresh().await.unwrap_err(), AccountError::NotLoggedIn);
        accounts.sign_up("ada", "analytical", "Ada", "Lovelace").await.unwrap();
        accounts.set_warn_blank(false).await.unwrap();
        assert!(!stored(&backend, "ada").warn_blank);

        let mut changed = stored(&backend, "ada");
        changed.results.insert("capitals".into(), 4);
        backend.update_user(&changed).await.unwrap();
        let user = accounts.refresh().await.unwrap();
        assert_eq!(user.results.get("capitals"), Some(&4));
        assert!(!user.warn_blank);
    }

    #[rstest]
    #[tokio::test]
    async fn attempts_use_the_user_preferences(trace: ()) {
        let backend = MemoryBackend::new();
        let doc = serde_json::json!({
            "name": "Capitals",
            "questions": [
                { "question": "France?", "answer": 1, "options": ["Lyon", "Paris"] },
                { "question": "Italy?", "type": "text", "answer": "Rome" },
            ]
        });
        backend.insert_quiz("capitals", doc.as_object().cloned().unwrap());
        let mut accounts = Accounts::new(&backend, hash);
        accounts.sign_up("ada", "analytical", "Ada", "Lovelace").await.unwrap();
        accounts.set_warn_blank(false).await.unwrap();

        let mut attempt = accounts
            .load_attempt("capitals", SessionConfig::default())
            .await
            .unwrap();
        attempt.next();
        assert_eq!(attempt.position(), 1);
        assert_eq!(attempt.blanks(), vec![0, 1]);
        assert_eq!(attempt.submit(), crate::Submission::ConfirmationRequired(Box::new([0, 1])));
        attempt.confirm_submit();
        let result = attempt.complete().unwrap();
        assert!(accounts.record_result("capitals", &result).await.unwrap());
        assert_eq!(accounts.user().unwrap().results.get("capitals"), Some(&0));
        assert_eq!(backend.attempts().len(), 1);
    }
}

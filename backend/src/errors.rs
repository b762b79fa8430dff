use quizdeck_ontology::PropertyError;

/// The kind of record an operation was looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum RecordKind {
    Quiz,
    User,
    Notification,
    Attempt,
}
impl RecordKind {
    /// The name of the collection records of this kind are stored in.
    #[must_use]
    pub const fn collection(self) -> &'static str {
        match self {
            Self::Quiz => "quizzes",
            Self::User => "users",
            Self::Notification => "notifications",
            Self::Attempt => "items",
        }
    }
}
impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Quiz => "quiz",
            Self::User => "user",
            Self::Notification => "notification",
            Self::Attempt => "attempt",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum BackendError<E: std::fmt::Debug> {
    #[error("{0}")]
    Connection(#[source] E),
    #[error("{0} not found")]
    NotFound(RecordKind),
    #[error("{kind} {id} is malformed: {source}")]
    Malformed {
        kind: RecordKind,
        id: Box<str>,
        #[source]
        source: PropertyError,
    },
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("incorrect password")]
    IncorrectPassword,
}

impl<F: std::fmt::Display + std::fmt::Debug> BackendError<F> {
    pub fn from_other<I: std::fmt::Display + std::fmt::Debug + From<F>>(self) -> BackendError<I> {
        match self {
            Self::NotFound(n) => BackendError::NotFound(n),
            Self::Malformed { kind, id, source } => BackendError::Malformed { kind, id, source },
            Self::UserAlreadyExists => BackendError::UserAlreadyExists,
            Self::IncorrectPassword => BackendError::IncorrectPassword,
            Self::Connection(c) => BackendError::Connection(c.into()),
        }
    }
}

impl<E: std::fmt::Debug> BackendError<E> {
    #[inline]
    pub(crate) fn malformed(kind: RecordKind, id: &str, source: PropertyError) -> Self {
        tracing::warn!("{kind} {id} is malformed: {source}");
        Self::Malformed {
            kind,
            id: id.into(),
            source,
        }
    }

    /// `true` for errors caused by the stored data rather than the
    /// connection.
    #[must_use]
    pub const fn is_data_error(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Malformed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryError, trace};
    use rstest::rstest;

    #[derive(Debug, thiserror::Error)]
    #[error("wrapped: {0}")]
    struct Wrapped(MemoryError);
    impl From<MemoryError> for Wrapped {
        fn from(value: MemoryError) -> Self {
            Self(value)
        }
    }

    #[rstest]
    #[allow(unused_variables)]
    fn errors_convert(trace: ()) {
        let e = BackendError::Connection(MemoryError::Offline).from_other::<Wrapped>();
        assert_eq!(e.to_string(), "wrapped: backend is offline");
        let e = BackendError::<MemoryError>::NotFound(RecordKind::Quiz).from_other::<Wrapped>();
        assert!(matches!(e, BackendError::NotFound(RecordKind::Quiz)));
        assert!(e.is_data_error());
        assert_eq!(e.to_string(), "quiz not found");
        assert_eq!(RecordKind::Attempt.collection(), "items");
    }
}

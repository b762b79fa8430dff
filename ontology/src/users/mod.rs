pub mod validation;

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use crate::documents::{
    DocumentExt, DocumentMap, FromDocument, PropertyError, PropertyType, ToDocument, strings,
};

pub const FIRST_NAME: &str = "firstName";
pub const LAST_NAME: &str = "lastName";
pub const WARN_BLANK: &str = "warn blank";
pub const READ: &str = "read";
pub const RESULTS: &str = "results";
/// Holds the password hash; never decoded into a [`User`].
pub const PASSWORD: &str = "password";

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct User {
    pub username: Box<str>,
    pub first_name: Box<str>,
    pub last_name: Box<str>,
    /// warn before leaving an unanswered question
    pub warn_blank: bool,
    /// ids of notifications the user has read
    pub read: FxHashSet<Box<str>>,
    /// quiz id => marks of the most recent attempt
    pub results: FxHashMap<Box<str>, u32>,
}

impl User {
    #[must_use]
    pub fn new(username: &str, first_name: &str, last_name: &str) -> Self {
        Self {
            username: username.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            warn_blank: true,
            read: FxHashSet::default(),
            results: FxHashMap::default(),
        }
    }

    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    #[must_use]
    pub fn validate(&self, password: Option<&str>) -> Vec<validation::Violation> {
        validation::validate(
            &self.username,
            password,
            &self.first_name,
            &self.last_name,
        )
    }

    #[inline]
    #[must_use]
    pub fn has_read(&self, notification: &str) -> bool {
        self.read.contains(notification)
    }

    /// The stored password hash of a user document, if any.
    #[must_use]
    pub fn password_hash(doc: &DocumentMap) -> Option<&str> {
        doc.value(PASSWORD).and_then(Value::as_str)
    }
}

impl FromDocument for User {
    fn from_document(id: &str, doc: &DocumentMap) -> Result<Self, PropertyError> {
        let read = doc
            .opt_list(READ)?
            .map(|l| strings(READ, l))
            .transpose()?
            .unwrap_or_default();
        let results = match doc.opt_map(RESULTS)? {
            None => FxHashMap::default(),
            Some(map) => map
                .iter()
                .map(|(quiz, marks)| {
                    marks
                        .as_u64()
                        .and_then(|m| u32::try_from(m).ok())
                        .map(|m| (Box::from(quiz.as_str()), m))
                        .ok_or_else(|| PropertyError::WrongType {
                            name: format!("{RESULTS}.{quiz}").into(),
                            expected: PropertyType::Integer,
                        })
                })
                .collect::<Result<_, _>>()?,
        };
        Ok(Self {
            username: id.into(),
            first_name: doc.string(FIRST_NAME)?.into(),
            last_name: doc.string(LAST_NAME)?.into(),
            warn_blank: doc.bool_or(WARN_BLANK, true)?,
            read: read.into_iter().collect(),
            results,
        })
    }
}

impl ToDocument for User {
    fn to_document(&self) -> DocumentMap {
        let mut doc = DocumentMap::new();
        doc.insert(FIRST_NAME.into(), self.first_name.as_ref().into());
        doc.insert(LAST_NAME.into(), self.last_name.as_ref().into());
        doc.insert(WARN_BLANK.into(), self.warn_blank.into());
        let mut read: Vec<&str> = self.read.iter().map(|r| &**r).collect();
        read.sort_unstable();
        doc.insert(
            READ.into(),
            Value::Array(read.into_iter().map(Value::from).collect()),
        );
        doc.insert(
            RESULTS.into(),
            Value::Object(
                self.results
                    .iter()
                    .map(|(k, v)| (k.to_string(), Value::from(*v)))
                    .collect(),
            ),
        );
        doc
    }
}

crate::utils::tests! {
    defaults {
        let doc = serde_json::json!({ "firstName": "Ada", "lastName": "Lovelace", "password": "abc" });
        let user = User::from_document("ada", doc.as_object().unwrap()).unwrap();
        assert_eq!(user, User::new("ada", "Ada", "Lovelace"));
        assert_eq!(user.full_name(), "Ada Lovelace");
        assert_eq!(User::password_hash(doc.as_object().unwrap()), Some("abc"));
    };
    full_document {
        let doc = serde_json::json!({
            "firstName": "Ada",
            "lastName": "Lovelace",
            "warn blank": false,
            "read": ["n1", "n2"],
            "results": { "quiz1": 7 },
        });
        let user = User::from_document("ada", doc.as_object().unwrap()).unwrap();
        assert!(!user.warn_blank);
        assert!(user.has_read("n2") && !user.has_read("n3"));
        assert_eq!(user.results.get("quiz1"), Some(&7));
        let again = User::from_document("ada", &user.to_document()).unwrap();
        assert_eq!(user, again);
        assert!(User::password_hash(&user.to_document()).is_none());
    };
    names_are_required {
        let doc = serde_json::json!({ "firstName": "Ada" });
        assert_eq!(
            User::from_document("ada", doc.as_object().unwrap()),
            Err(PropertyError::Missing(LAST_NAME.into()))
        );
    };
    malformed_results {
        let doc = serde_json::json!({ "firstName": "A", "lastName": "B", "results": { "q": "ten" } });
        let err = User::from_document("u", doc.as_object().unwrap()).unwrap_err();
        assert_eq!(err.property(), "results.q");
    }
}

//! Schemaless documents as stored by the hosted database.
//!
//! Every record is a JSON object keyed by property name. The typed model
//! types implement [`FromDocument`] / [`ToDocument`]; required properties
//! that are missing or of the wrong type surface as a [`PropertyError`]
//! instead of being defaulted.

use serde_json::Value;

pub type DocumentMap = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyType {
    String,
    Bool,
    Integer,
    List,
    Map,
}
impl PropertyType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bool => "boolean",
            Self::Integer => "integer",
            Self::List => "list",
            Self::Map => "map",
        }
    }
}
impl std::fmt::Display for PropertyType {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PropertyError {
    #[error("property {0} not found")]
    Missing(Box<str>),
    #[error("property {name} is not a {expected}")]
    WrongType {
        name: Box<str>,
        expected: PropertyType,
    },
    #[error("property {0} must not be empty")]
    Empty(Box<str>),
    #[error("property {name} refers to option {index}, but there are only {len} options")]
    OptionOutOfRange {
        name: Box<str>,
        index: i64,
        len: usize,
    },
    #[error("{0} has an invalid question format")]
    UnknownQuestionFormat(Box<str>),
}

impl PropertyError {
    /// Qualifies the offending property name with the path of its parent,
    /// e.g. `answer` within `questions[2]` becomes `questions[2].answer`.
    #[must_use]
    pub fn within(self, parent: &str) -> Self {
        let qualify = |n: Box<str>| format!("{parent}.{n}").into_boxed_str();
        match self {
            Self::Missing(n) => Self::Missing(qualify(n)),
            Self::Empty(n) => Self::Empty(qualify(n)),
            Self::UnknownQuestionFormat(n) => Self::UnknownQuestionFormat(qualify(n)),
            Self::WrongType { name, expected } => Self::WrongType {
                name: qualify(name),
                expected,
            },
            Self::OptionOutOfRange { name, index, len } => Self::OptionOutOfRange {
                name: qualify(name),
                index,
                len,
            },
        }
    }

    /// The (possibly qualified) name of the offending property.
    #[must_use]
    pub fn property(&self) -> &str {
        match self {
            Self::Missing(n)
            | Self::Empty(n)
            | Self::UnknownQuestionFormat(n)
            | Self::WrongType { name: n, .. }
            | Self::OptionOutOfRange { name: n, .. } => n,
        }
    }
}

pub trait FromDocument: Sized {
    /// # Errors
    /// if a required property is missing or has the wrong type
    fn from_document(id: &str, doc: &DocumentMap) -> Result<Self, PropertyError>;
}

pub trait ToDocument {
    fn to_document(&self) -> DocumentMap;
}

#[inline]
fn wrong(name: &str, expected: PropertyType) -> PropertyError {
    PropertyError::WrongType {
        name: name.into(),
        expected,
    }
}

/// Typed accessors on a [`DocumentMap`].
///
/// `null` values are treated like absent ones.
pub trait DocumentExt {
    fn value(&self, key: &str) -> Option<&Value>;

    /// # Errors
    fn prop(&self, key: &str) -> Result<&Value, PropertyError> {
        self.value(key)
            .ok_or_else(|| PropertyError::Missing(key.into()))
    }

    /// # Errors
    fn string(&self, key: &str) -> Result<&str, PropertyError> {
        self.prop(key)?
            .as_str()
            .ok_or_else(|| wrong(key, PropertyType::String))
    }

    /// # Errors
    fn opt_string(&self, key: &str) -> Result<Option<&str>, PropertyError> {
        self.value(key)
            .map(|v| v.as_str().ok_or_else(|| wrong(key, PropertyType::String)))
            .transpose()
    }

    /// # Errors
    fn bool_or(&self, key: &str, default: bool) -> Result<bool, PropertyError> {
        self.value(key).map_or(Ok(default), |v| {
            v.as_bool().ok_or_else(|| wrong(key, PropertyType::Bool))
        })
    }

    /// # Errors
    fn integer(&self, key: &str) -> Result<i64, PropertyError> {
        self.prop(key)?
            .as_i64()
            .ok_or_else(|| wrong(key, PropertyType::Integer))
    }

    /// # Errors
    fn opt_integer(&self, key: &str) -> Result<Option<i64>, PropertyError> {
        self.value(key)
            .map(|v| v.as_i64().ok_or_else(|| wrong(key, PropertyType::Integer)))
            .transpose()
    }

    /// # Errors
    fn list(&self, key: &str) -> Result<&[Value], PropertyError> {
        self.prop(key)?
            .as_array()
            .map(Vec::as_slice)
            .ok_or_else(|| wrong(key, PropertyType::List))
    }

    /// # Errors
    fn opt_list(&self, key: &str) -> Result<Option<&[Value]>, PropertyError> {
        self.value(key)
            .map(|v| {
                v.as_array()
                    .map(Vec::as_slice)
                    .ok_or_else(|| wrong(key, PropertyType::List))
            })
            .transpose()
    }

    /// # Errors
    fn opt_map(&self, key: &str) -> Result<Option<&DocumentMap>, PropertyError> {
        self.value(key)
            .map(|v| v.as_object().ok_or_else(|| wrong(key, PropertyType::Map)))
            .transpose()
    }

    /// A list whose elements must all be strings.
    ///
    /// # Errors
    fn string_list(&self, key: &str) -> Result<Vec<Box<str>>, PropertyError> {
        strings(key, self.list(key)?)
    }

    /// A list whose elements must all be integers.
    ///
    /// # Errors
    fn integer_list(&self, key: &str) -> Result<Vec<i64>, PropertyError> {
        self.list(key)?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_i64()
                    .ok_or_else(|| wrong(&format!("{key}[{i}]"), PropertyType::Integer))
            })
            .collect()
    }
}

/// # Errors
/// if any element is not a string
pub fn strings(key: &str, values: &[Value]) -> Result<Vec<Box<str>>, PropertyError> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            v.as_str()
                .map(Into::into)
                .ok_or_else(|| wrong(&format!("{key}[{i}]"), PropertyType::String))
        })
        .collect()
}

impl DocumentExt for DocumentMap {
    #[inline]
    fn value(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !v.is_null())
    }
}

crate::utils::tests! {
    typed_accessors {
        let doc = serde_json::json!({
            "name": "Algebra",
            "flag": true,
            "count": 3,
            "nothing": null,
            "tags": ["a", "b"],
        });
        let doc = doc.as_object().unwrap();
        assert_eq!(doc.string("name").unwrap(), "Algebra");
        assert!(doc.bool_or("flag", false).unwrap());
        assert!(doc.bool_or("absent", true).unwrap());
        assert_eq!(doc.integer("count").unwrap(), 3);
        assert_eq!(doc.opt_string("nothing").unwrap(), None);
        assert_eq!(doc.string_list("tags").unwrap(), vec![Box::<str>::from("a"), Box::from("b")]);
    };
    missing_and_wrong_type_are_distinct {
        let doc = serde_json::json!({ "name": 5 });
        let doc = doc.as_object().unwrap();
        assert_eq!(doc.string("title"), Err(PropertyError::Missing("title".into())));
        assert_eq!(
            doc.string("name"),
            Err(PropertyError::WrongType { name: "name".into(), expected: PropertyType::String })
        );
    };
    list_elements_are_checked {
        let doc = serde_json::json!({ "answers": [0, "two"] });
        let doc = doc.as_object().unwrap();
        let err = doc.integer_list("answers").unwrap_err();
        assert_eq!(err.property(), "answers[1]");
    };
    errors_are_qualified {
        let err = PropertyError::Missing("answer".into()).within("questions[2]");
        assert_eq!(err.to_string(), "property questions[2].answer not found");
    }
}

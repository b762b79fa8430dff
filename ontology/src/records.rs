use chrono::{DateTime, Utc};

use crate::documents::{DocumentExt, DocumentMap, FromDocument, PropertyError, PropertyType, ToDocument};

/// Appended to the `items` collection whenever a logged-in user submits a
/// quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttemptRecord {
    pub username: Box<str>,
    pub quiz_id: Box<str>,
    pub time: DateTime<Utc>,
}

impl AttemptRecord {
    #[must_use]
    pub fn now(username: &str, quiz_id: &str) -> Self {
        Self {
            username: username.into(),
            quiz_id: quiz_id.into(),
            time: Utc::now(),
        }
    }
}

impl ToDocument for AttemptRecord {
    fn to_document(&self) -> DocumentMap {
        let mut doc = DocumentMap::new();
        doc.insert("username".into(), self.username.as_ref().into());
        doc.insert("quizId".into(), self.quiz_id.as_ref().into());
        doc.insert("time".into(), self.time.to_rfc3339().into());
        doc
    }
}

impl FromDocument for AttemptRecord {
    fn from_document(_: &str, doc: &DocumentMap) -> Result<Self, PropertyError> {
        let time = DateTime::parse_from_rfc3339(doc.string("time")?)
            .map_err(|_| PropertyError::WrongType {
                name: "time".into(),
                expected: PropertyType::String,
            })?
            .with_timezone(&Utc);
        Ok(Self {
            username: doc.string("username")?.into(),
            quiz_id: doc.string("quizId")?.into(),
            time,
        })
    }
}

crate::utils::tests! {
    record_document {
        let record = AttemptRecord::now("ada", "quiz1");
        let doc = record.to_document();
        assert_eq!(doc.string("quizId").unwrap(), "quiz1");
        let again = AttemptRecord::from_document("item", &doc).unwrap();
        assert_eq!(again, record);
    }
}

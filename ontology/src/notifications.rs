use chrono::{DateTime, Utc};

use crate::documents::{DocumentExt, DocumentMap, FromDocument, PropertyError, PropertyType, ToDocument};

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Notification {
    pub id: Box<str>,
    pub title: Box<str>,
    pub content: Box<str>,
    pub time: DateTime<Utc>,
}

impl Notification {
    /// Sorts newest first; ties are ordered by id.
    pub fn sort(notifications: &mut [Self]) {
        notifications.sort_by(|a, b| b.time.cmp(&a.time).then_with(|| a.id.cmp(&b.id)));
    }
}

impl FromDocument for Notification {
    fn from_document(id: &str, doc: &DocumentMap) -> Result<Self, PropertyError> {
        let time = match doc.opt_string("time")? {
            None => DateTime::UNIX_EPOCH,
            Some(s) => DateTime::parse_from_rfc3339(s)
                .map_err(|_| PropertyError::WrongType {
                    name: "time".into(),
                    expected: PropertyType::String,
                })?
                .with_timezone(&Utc),
        };
        Ok(Self {
            id: id.into(),
            title: doc.opt_string("title")?.unwrap_or_default().into(),
            content: doc.opt_string("content")?.unwrap_or_default().into(),
            time,
        })
    }
}

impl ToDocument for Notification {
    fn to_document(&self) -> DocumentMap {
        let mut doc = DocumentMap::new();
        doc.insert("title".into(), self.title.as_ref().into());
        doc.insert("content".into(), self.content.as_ref().into());
        doc.insert("time".into(), self.time.to_rfc3339().into());
        doc
    }
}

crate::utils::tests! {
    defaults {
        let doc = serde_json::json!({});
        let n = Notification::from_document("n", doc.as_object().unwrap()).unwrap();
        assert_eq!((&*n.title, &*n.content), ("", ""));
        assert_eq!(n.time, DateTime::UNIX_EPOCH);
    };
    bad_time {
        let doc = serde_json::json!({ "time": "yesterday" });
        let err = Notification::from_document("n", doc.as_object().unwrap()).unwrap_err();
        assert_eq!(err.property(), "time");
    };
    newest_first {
        let mut list: Vec<_> = [("a", "2024-01-01T00:00:00Z"), ("b", "2024-03-01T10:00:00+02:00"), ("c", "2023-12-31T23:59:59Z")]
            .into_iter()
            .map(|(id, t)| {
                let doc = serde_json::json!({ "title": id, "time": t });
                Notification::from_document(id, doc.as_object().unwrap()).unwrap()
            })
            .collect();
        Notification::sort(&mut list);
        assert_eq!(list.iter().map(|n| &*n.id).collect::<Vec<_>>(), vec!["b", "a", "c"]);
        let again = Notification::from_document("b", &list[0].to_document()).unwrap();
        assert_eq!(again, list[0]);
    }
}

pub mod answers;
pub mod scoring;

use crate::documents::{
    DocumentExt, DocumentMap, FromDocument, PropertyError, PropertyType, ToDocument,
};
use serde_json::Value;
use smallvec::SmallVec;

pub const DEFAULT_MARKS: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quiz {
    pub id: Box<str>,
    pub name: Box<str>,
    /// whether questions may be presented in a shuffled order
    pub reorder: bool,
    pub questions: Box<[Question]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Question {
    pub prompt: Box<str>,
    pub marks: u32,
    pub kind: QuestionKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
pub enum QuestionKind {
    /// Free-text answer; ungraded (always correct) if `answer` is `None`.
    Subjective {
        input: InputKind,
        answer: Option<Box<str>>,
    },
    SingleChoice {
        options: Box<[Box<str>]>,
        answer: u16,
        reorder: bool,
    },
    MultipleChoice {
        options: Box<[Box<str>]>,
        /// sorted, without duplicates
        answers: SmallVec<u16, 4>,
        /// caps the number of selectable options to `answers.len()`
        hint: bool,
        reorder: bool,
    },
}

/// Expected kind of a free-text answer; determines the keyboard/input
/// constraints the host offers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InputKind {
    Integer,
    Decimal,
    #[default]
    Text,
    LongText,
}
impl InputKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Integer => "integer",
            Self::Decimal => "decimal",
            Self::Text => "text",
            Self::LongText => "long text",
        }
    }

    /// Unknown kinds fall back to [`InputKind::Text`].
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "integer" => Self::Integer,
            "decimal" => Self::Decimal,
            "long text" => Self::LongText,
            _ => Self::Text,
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }

    #[inline]
    #[must_use]
    pub const fn is_multiline(self) -> bool {
        matches!(self, Self::LongText)
    }
}

impl Quiz {
    #[must_use]
    pub fn total_marks(&self) -> u32 {
        self.questions.iter().map(|q| q.marks).sum()
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.questions.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

impl Question {
    #[must_use]
    pub fn options(&self) -> &[Box<str>] {
        match &self.kind {
            QuestionKind::Subjective { .. } => &[],
            QuestionKind::SingleChoice { options, .. }
            | QuestionKind::MultipleChoice { options, .. } => options,
        }
    }

    #[must_use]
    pub const fn reorders_options(&self) -> bool {
        match &self.kind {
            QuestionKind::Subjective { .. } => false,
            QuestionKind::SingleChoice { reorder, .. }
            | QuestionKind::MultipleChoice { reorder, .. } => *reorder,
        }
    }

    /// The hint shown for multi-select questions in hint mode.
    #[must_use]
    pub fn selection_hint(&self) -> Option<String> {
        match &self.kind {
            QuestionKind::MultipleChoice {
                answers,
                hint: true,
                ..
            } => Some(format!("Select {} answers", answers.len())),
            _ => None,
        }
    }

    /// Human-readable rendering of the expected answer, for result review.
    #[must_use]
    pub fn answer_text(&self) -> Option<String> {
        let option = |i: u16| self.options().get(usize::from(i)).map(|s| &**s);
        match &self.kind {
            QuestionKind::Subjective { answer, .. } => answer.as_deref().map(ToString::to_string),
            QuestionKind::SingleChoice { answer, .. } => option(*answer).map(ToString::to_string),
            QuestionKind::MultipleChoice { answers, .. } => Some(
                answers
                    .iter()
                    .filter_map(|i| option(*i))
                    .map(|s| format!("•\t{s}"))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
        }
    }
}

fn option_index(name: &str, index: i64, len: usize) -> Result<u16, PropertyError> {
    u16::try_from(index)
        .ok()
        .filter(|i| usize::from(*i) < len)
        .ok_or_else(|| PropertyError::OptionOutOfRange {
            name: name.into(),
            index,
            len,
        })
}

fn non_empty_options(doc: &DocumentMap) -> Result<Box<[Box<str>]>, PropertyError> {
    let options = doc.string_list("options")?;
    if options.is_empty() {
        return Err(PropertyError::Empty("options".into()));
    }
    Ok(options.into_boxed_slice())
}

impl Question {
    /// The variant is determined by which key is present: `type` for
    /// subjective, `answer` for single-select, `answers` for multi-select.
    ///
    /// # Errors
    /// if a required property is missing, has the wrong type, or a correct
    /// option index is out of range.
    pub fn from_document(doc: &DocumentMap) -> Result<Self, PropertyError> {
        let prompt = doc.string("question")?.into();
        let marks = match doc.opt_integer("marks")? {
            None => DEFAULT_MARKS,
            Some(m) => u32::try_from(m).map_err(|_| PropertyError::WrongType {
                name: "marks".into(),
                expected: PropertyType::Integer,
            })?,
        };
        let kind = if doc.value("type").is_some() {
            QuestionKind::Subjective {
                input: InputKind::parse(doc.string("type")?),
                answer: doc.opt_string("answer")?.map(Into::into),
            }
        } else if doc.value("answer").is_some() {
            let options = non_empty_options(doc)?;
            QuestionKind::SingleChoice {
                answer: option_index("answer", doc.integer("answer")?, options.len())?,
                reorder: doc.bool_or("reorder", true)?,
                options,
            }
        } else if doc.value("answers").is_some() {
            let options = non_empty_options(doc)?;
            let mut answers = doc
                .integer_list("answers")?
                .into_iter()
                .enumerate()
                .map(|(i, a)| option_index(&format!("answers[{i}]"), a, options.len()))
                .collect::<Result<Vec<_>, _>>()?;
            answers.sort_unstable();
            answers.dedup();
            QuestionKind::MultipleChoice {
                answers: answers.into_iter().collect(),
                hint: doc.bool_or("hint", false)?,
                reorder: doc.bool_or("reorder", true)?,
                options,
            }
        } else {
            return Err(PropertyError::UnknownQuestionFormat("question".into()));
        };
        Ok(Self {
            prompt,
            marks,
            kind,
        })
    }
}

impl ToDocument for Question {
    fn to_document(&self) -> DocumentMap {
        let mut doc = DocumentMap::new();
        doc.insert("question".into(), self.prompt.as_ref().into());
        doc.insert("marks".into(), self.marks.into());
        let options =
            |o: &[Box<str>]| Value::Array(o.iter().map(|s| Value::from(&**s)).collect());
        match &self.kind {
            QuestionKind::Subjective { input, answer } => {
                doc.insert("type".into(), input.as_str().into());
                if let Some(a) = answer {
                    doc.insert("answer".into(), a.as_ref().into());
                }
            }
            QuestionKind::SingleChoice {
                options: o,
                answer,
                reorder,
            } => {
                doc.insert("answer".into(), (*answer).into());
                doc.insert("options".into(), options(o));
                doc.insert("reorder".into(), (*reorder).into());
            }
            QuestionKind::MultipleChoice {
                options: o,
                answers,
                hint,
                reorder,
            } => {
                doc.insert(
                    "answers".into(),
                    Value::Array(answers.iter().map(|a| Value::from(*a)).collect()),
                );
                doc.insert("options".into(), options(o));
                doc.insert("hint".into(), (*hint).into());
                doc.insert("reorder".into(), (*reorder).into());
            }
        }
        doc
    }
}

impl FromDocument for Quiz {
    fn from_document(id: &str, doc: &DocumentMap) -> Result<Self, PropertyError> {
        let name = doc.string("name")?.into();
        let reorder = doc.bool_or("reorder", true)?;
        let list = doc.list("questions")?;
        if list.is_empty() {
            return Err(PropertyError::Empty("questions".into()));
        }
        let questions = list
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let parent = format!("questions[{i}]");
                let Some(q) = v.as_object() else {
                    return Err(PropertyError::WrongType {
                        name: parent.into(),
                        expected: PropertyType::Map,
                    });
                };
                Question::from_document(q).map_err(|e| e.within(&parent))
            })
            .collect::<Result<Box<[_]>, _>>()?;
        Ok(Self {
            id: id.into(),
            name,
            reorder,
            questions,
        })
    }
}

impl ToDocument for Quiz {
    fn to_document(&self) -> DocumentMap {
        let mut doc = DocumentMap::new();
        doc.insert("name".into(), self.name.as_ref().into());
        doc.insert("reorder".into(), self.reorder.into());
        doc.insert(
            "questions".into(),
            Value::Array(
                self.questions
                    .iter()
                    .map(|q| Value::Object(q.to_document()))
                    .collect(),
            ),
        );
        doc
    }
}

crate::utils::tests! {
    decodes_all_question_kinds {
        let doc = serde_json::json!({
            "name": "Basics",
            "questions": [
                { "question": "Six times seven?", "type": "integer", "answer": "42", "marks": 2 },
                { "question": "Capital of France?", "answer": 1, "options": ["Lyon", "Paris", "Nice"], "reorder": false },
                { "question": "Primes?", "answers": [2, 0], "options": ["2", "4", "5"], "hint": true },
            ]
        });
        let quiz = Quiz::from_document("q1", doc.as_object().unwrap()).unwrap();
        assert_eq!(&*quiz.id, "q1");
        assert!(quiz.reorder);
        assert_eq!(quiz.total_marks(), 4);
        assert_eq!(
            quiz.questions[0].kind,
            QuestionKind::Subjective { input: InputKind::Integer, answer: Some("42".into()) }
        );
        let QuestionKind::SingleChoice { answer, reorder, .. } = &quiz.questions[1].kind else {
            panic!("expected single choice");
        };
        assert_eq!((*answer, *reorder), (1, false));
        let QuestionKind::MultipleChoice { answers, hint, reorder, .. } = &quiz.questions[2].kind else {
            panic!("expected multiple choice");
        };
        assert_eq!(&answers[..], &[0, 2]);
        assert!(*hint && *reorder);
        assert_eq!(quiz.questions[2].selection_hint().as_deref(), Some("Select 2 answers"));
    };
    multi_select_hint_defaults_off {
        let doc = serde_json::json!({ "question": "?", "answers": [0], "options": ["a", "b"] });
        let q = Question::from_document(doc.as_object().unwrap()).unwrap();
        assert!(matches!(q.kind, QuestionKind::MultipleChoice { hint: false, .. }));
        assert_eq!(q.selection_hint(), None);
    };
    unknown_input_kind_is_text {
        assert_eq!(InputKind::parse("essay"), InputKind::Text);
        assert_eq!(InputKind::parse("long text"), InputKind::LongText);
        assert!(InputKind::Decimal.is_numeric());
    };
    required_properties_are_not_defaulted {
        let doc = serde_json::json!({ "questions": [{ "question": "?", "type": "text" }] });
        assert_eq!(
            Quiz::from_document("q", doc.as_object().unwrap()),
            Err(PropertyError::Missing("name".into()))
        );
        let doc = serde_json::json!({ "name": "n", "questions": [{ "question": "?", "answer": "1", "options": ["a"] }] });
        let err = Quiz::from_document("q", doc.as_object().unwrap()).unwrap_err();
        assert_eq!(err.property(), "questions[0].answer");
    };
    unknown_question_format {
        let doc = serde_json::json!({ "name": "n", "questions": [{ "question": "?" }] });
        let err = Quiz::from_document("q", doc.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, PropertyError::UnknownQuestionFormat(_)));
    };
    empty_quiz_is_rejected {
        let doc = serde_json::json!({ "name": "n", "questions": [] });
        assert_eq!(
            Quiz::from_document("q", doc.as_object().unwrap()),
            Err(PropertyError::Empty("questions".into()))
        );
    };
    out_of_range_answer_is_rejected {
        let doc = serde_json::json!({ "question": "?", "answers": [0, 3], "options": ["a", "b"] });
        let err = Question::from_document(doc.as_object().unwrap()).unwrap_err();
        assert_eq!(
            err,
            PropertyError::OptionOutOfRange { name: "answers[1]".into(), index: 3, len: 2 }
        );
    };
    documents_round_trip {
        let doc = serde_json::json!({
            "name": "Basics",
            "reorder": false,
            "questions": [
                { "question": "Say anything", "type": "long text" },
                { "question": "Pick", "answers": [1], "options": ["a", "b"], "hint": true, "reorder": false },
            ]
        });
        let quiz = Quiz::from_document("q", doc.as_object().unwrap()).unwrap();
        let again = Quiz::from_document("q", &quiz.to_document()).unwrap();
        assert_eq!(quiz, again);
    };
    answer_text_for_review {
        let q = Question {
            prompt: "Primes?".into(),
            marks: 1,
            kind: QuestionKind::MultipleChoice {
                options: vec!["2".into(), "4".into(), "5".into()].into_boxed_slice(),
                answers: [0u16, 2].into_iter().collect(),
                hint: false,
                reorder: false,
            },
        };
        assert_eq!(q.answer_text().as_deref(), Some("•\t2\n•\t5"));
    }
}

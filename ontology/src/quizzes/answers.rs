use smallvec::SmallVec;

use crate::quizzes::{Question, QuestionKind, Quiz};

/// The answer currently captured for one question. Option indices always
/// refer to the question's *original* option order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value"))]
pub enum Answer {
    Text(String),
    Single(Option<u16>),
    /// sorted, without duplicates
    Multiple(SmallVec<u16, 8>),
}

/// Outcome of a selection change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    Added,
    Removed,
    /// the selection already was in the requested state
    Unchanged,
    /// the change is not allowed: hint-mode capacity reached, an invalid
    /// option index, or a question of a different kind
    Rejected,
}

impl Answer {
    /// The empty answer matching `question`'s kind.
    #[must_use]
    pub fn blank_for(question: &Question) -> Self {
        match &question.kind {
            QuestionKind::Subjective { .. } => Self::Text(String::new()),
            QuestionKind::SingleChoice { .. } => Self::Single(None),
            QuestionKind::MultipleChoice { .. } => Self::Multiple(SmallVec::new()),
        }
    }

    /// Replaces the text of a free-text answer; returns `false` (and does
    /// nothing) for other kinds.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match self {
            Self::Text(s) => {
                *s = text.into();
                true
            }
            _ => false,
        }
    }

    /// Chooses option `index` of a single-select question.
    pub fn choose(&mut self, question: &Question, index: u16) -> Selection {
        match (self, &question.kind) {
            (Self::Single(current), QuestionKind::SingleChoice { options, .. })
                if usize::from(index) < options.len() =>
            {
                if *current == Some(index) {
                    Selection::Unchanged
                } else {
                    *current = Some(index);
                    Selection::Added
                }
            }
            _ => Selection::Rejected,
        }
    }

    /// Adds option `index` to a multi-select answer. In hint mode, adding
    /// beyond the size of the correct-answer set is rejected.
    pub fn select(&mut self, question: &Question, index: u16) -> Selection {
        let (
            Self::Multiple(chosen),
            QuestionKind::MultipleChoice {
                options,
                answers,
                hint,
                ..
            },
        ) = (self, &question.kind)
        else {
            return Selection::Rejected;
        };
        if usize::from(index) >= options.len() {
            return Selection::Rejected;
        }
        match chosen.binary_search(&index) {
            Ok(_) => Selection::Unchanged,
            Err(_) if *hint && chosen.len() >= answers.len() => {
                tracing::debug!(
                    "rejecting option {index}: {} of {} already chosen",
                    chosen.len(),
                    answers.len()
                );
                Selection::Rejected
            }
            Err(pos) => {
                chosen.insert(pos, index);
                Selection::Added
            }
        }
    }

    /// Removes option `index` from a multi-select answer.
    pub fn deselect(&mut self, index: u16) -> Selection {
        let Self::Multiple(chosen) = self else {
            return Selection::Rejected;
        };
        match chosen.binary_search(&index) {
            Ok(pos) => {
                chosen.remove(pos);
                Selection::Removed
            }
            Err(_) => Selection::Unchanged,
        }
    }

    pub fn toggle(&mut self, question: &Question, index: u16) -> Selection {
        if self.is_selected(index) && matches!(self, Self::Multiple(_)) {
            self.deselect(index)
        } else {
            self.select(question, index)
        }
    }

    /// Whether option `index` is currently chosen.
    #[must_use]
    pub fn is_selected(&self, index: u16) -> bool {
        match self {
            Self::Text(_) => false,
            Self::Single(s) => *s == Some(index),
            Self::Multiple(chosen) => chosen.contains(&index),
        }
    }

    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// `true` if there is no usable answer yet.
    ///
    /// An answer of the wrong kind for `question` counts as blank.
    #[must_use]
    pub fn is_blank(&self, question: &Question) -> bool {
        match (self, &question.kind) {
            (Self::Text(s), QuestionKind::Subjective { .. }) => s.is_empty(),
            (Self::Single(s), QuestionKind::SingleChoice { .. }) => s.is_none(),
            (
                Self::Multiple(chosen),
                QuestionKind::MultipleChoice {
                    answers, hint, ..
                },
            ) => *hint && chosen.len() != answers.len(),
            _ => true,
        }
    }

    /// `true` if the answer is correct for `question`.
    ///
    /// Free text must match the reference answer exactly; questions without
    /// a reference answer accept anything. Indices out of range and answers
    /// of the wrong kind are never correct.
    #[must_use]
    pub fn is_correct(&self, question: &Question) -> bool {
        match (self, &question.kind) {
            (Self::Text(s), QuestionKind::Subjective { answer, .. }) => {
                answer.as_deref().is_none_or(|a| a == s)
            }
            (Self::Single(s), QuestionKind::SingleChoice { options, answer, .. }) => {
                s.is_some_and(|i| usize::from(i) < options.len() && i == *answer)
            }
            (Self::Multiple(chosen), QuestionKind::MultipleChoice { options, answers, .. }) => {
                chosen.iter().all(|i| usize::from(*i) < options.len())
                    && chosen.len() == answers.len()
                    && answers.iter().all(|a| chosen.contains(a))
            }
            _ => false,
        }
    }
}

/// Answers for every question of one attempt, in original question order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnswerState(Box<[Answer]>);

impl AnswerState {
    #[must_use]
    pub fn new(quiz: &Quiz) -> Self {
        Self(quiz.questions.iter().map(Answer::blank_for).collect())
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Answer> {
        self.0.get(index)
    }

    #[inline]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Answer> {
        self.0.get_mut(index)
    }

    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Answer] {
        &self.0
    }
}

crate::utils::tests! {
    single_select_results {
        let q = single(&["A", "B", "C"], 1);
        let mut a = Answer::blank_for(&q);
        assert!(a.is_blank(&q));
        assert!(!a.is_correct(&q));
        assert_eq!(a.choose(&q, 1), Selection::Added);
        assert!(!a.is_blank(&q));
        assert!(a.is_correct(&q));
        for wrong in [0, 2] {
            a.choose(&q, wrong);
            assert!(!a.is_correct(&q));
        }
        assert_eq!(a.choose(&q, 3), Selection::Rejected);
        assert!(a.is_selected(2));
    };
    subjective_results {
        let q = subjective(Some("42"));
        let mut a = Answer::blank_for(&q);
        assert!(a.is_blank(&q));
        assert!(!a.is_correct(&q));
        assert!(a.set_text("43"));
        assert!(!a.is_correct(&q));
        a.set_text("42");
        assert!(a.is_correct(&q) && !a.is_blank(&q));
        a.set_text(" 42");
        assert!(!a.is_correct(&q));
    };
    ungraded_subjective_is_always_correct {
        let q = subjective(None);
        let mut a = Answer::blank_for(&q);
        assert!(a.is_correct(&q));
        a.set_text("anything");
        assert!(a.is_correct(&q));
    };
    hint_mode_caps_selection {
        let q = multiple(&["a", "b", "c", "d"], &[0, 2], true);
        let mut a = Answer::blank_for(&q);
        assert_eq!(a.select(&q, 1), Selection::Added);
        assert!(a.is_blank(&q));
        assert_eq!(a.select(&q, 3), Selection::Added);
        assert!(!a.is_blank(&q));
        assert_eq!(a.select(&q, 0), Selection::Rejected);
        assert_eq!(a, Answer::Multiple([1u16, 3].into_iter().collect()));
        assert_eq!(a.toggle(&q, 1), Selection::Removed);
        assert_eq!(a.toggle(&q, 0), Selection::Added);
        assert_eq!(a.toggle(&q, 2), Selection::Rejected);
        a.deselect(3);
        a.select(&q, 2);
        assert!(a.is_correct(&q));
    };
    multi_select_without_hint_is_never_blank {
        let q = multiple(&["a", "b", "c"], &[0, 2], false);
        let mut a = Answer::blank_for(&q);
        assert!(!a.is_blank(&q));
        assert!(!a.is_correct(&q));
        for i in 0..3 {
            assert_eq!(a.select(&q, i), Selection::Added);
        }
        assert!(!a.is_correct(&q));
        a.deselect(1);
        assert!(a.is_correct(&q));
    };
    out_of_range_fails_closed {
        let q = single(&["A", "B"], 1);
        assert!(!Answer::Single(Some(7)).is_correct(&q));
        let q = multiple(&["a", "b"], &[0], false);
        assert!(!Answer::Multiple([0u16, 9].into_iter().collect()).is_correct(&q));
        assert!(!Answer::Text("x".into()).is_correct(&q));
        assert!(Answer::Text("x".into()).is_blank(&q));
    };
    wrong_kind_mutations_are_rejected {
        let q = subjective(None);
        let mut a = Answer::blank_for(&q);
        assert_eq!(a.select(&q, 0), Selection::Rejected);
        assert_eq!(a.choose(&q, 0), Selection::Rejected);
        let mut s = Answer::Single(None);
        assert!(!s.set_text("nope"));
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::quizzes::{InputKind, Question, QuestionKind};

    fn options(o: &[&str]) -> Box<[Box<str>]> {
        o.iter().map(|s| Box::from(*s)).collect()
    }

    pub fn subjective(answer: Option<&str>) -> Question {
        Question {
            prompt: "Answer".into(),
            marks: 2,
            kind: QuestionKind::Subjective {
                input: InputKind::Text,
                answer: answer.map(Into::into),
            },
        }
    }

    pub fn single(o: &[&str], answer: u16) -> Question {
        Question {
            prompt: "Pick one".into(),
            marks: 3,
            kind: QuestionKind::SingleChoice {
                options: options(o),
                answer,
                reorder: false,
            },
        }
    }

    pub fn multiple(o: &[&str], answers: &[u16], hint: bool) -> Question {
        Question {
            prompt: "Pick some".into(),
            marks: 5,
            kind: QuestionKind::MultipleChoice {
                options: options(o),
                answers: answers.iter().copied().collect(),
                hint,
                reorder: false,
            },
        }
    }
}
#[cfg(test)]
use fixtures::{multiple, single, subjective};

use crate::quizzes::{Question, Quiz, answers::Answer};

/// Blank status and correctness of a single answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Evaluation {
    pub is_blank: bool,
    pub is_correct: bool,
}

#[must_use]
pub fn evaluate(question: &Question, answer: &Answer) -> Evaluation {
    let evaluation = Evaluation {
        is_blank: answer.is_blank(question),
        is_correct: answer.is_correct(question),
    };
    tracing::debug!("evaluated {answer:?}: {evaluation:?}");
    evaluation
}

/// Sum of the marks of all questions whose correctness entry is `true`.
/// Missing entries count as incorrect; surplus entries are ignored.
#[must_use]
pub fn aggregate(quiz: &Quiz, correctness: &[bool]) -> u32 {
    quiz.questions
        .iter()
        .zip(correctness.iter().copied().chain(std::iter::repeat(false)))
        .filter_map(|(q, correct)| correct.then_some(q.marks))
        .sum()
}

/// The outcome of a finished attempt. Correctness is in original question
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttemptResult {
    pub correct: Box<[bool]>,
    pub marks: u32,
    pub total: u32,
}

impl AttemptResult {
    #[must_use]
    pub fn new(quiz: &Quiz, correct: Box<[bool]>) -> Self {
        Self {
            marks: aggregate(quiz, &correct),
            total: quiz.total_marks(),
            correct,
        }
    }

    /// Scores every answer against `quiz`. `answers` is in original question
    /// order.
    #[must_use]
    pub fn score(quiz: &Quiz, answers: &[Answer]) -> Self {
        let correct = quiz
            .questions
            .iter()
            .enumerate()
            .map(|(i, q)| answers.get(i).is_some_and(|a| evaluate(q, a).is_correct))
            .collect();
        Self::new(quiz, correct)
    }

    /// `marks * 100 / total`, rounded down; `0` for a quiz without marks.
    #[must_use]
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let pct = u64::from(self.marks) * 100 / u64::from(self.total);
        u32::try_from(pct).unwrap_or(u32::MAX)
    }

    #[inline]
    #[must_use]
    pub fn is_correct(&self, index: usize) -> bool {
        self.correct.get(index).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct.iter().filter(|c| **c).count()
    }
}

crate::utils::tests! {
    aggregate_bounds {
        let quiz = sample_quiz();
        assert_eq!(aggregate(&quiz, &[false; 3]), 0);
        assert_eq!(aggregate(&quiz, &[true; 3]), quiz.total_marks());
        assert_eq!(aggregate(&quiz, &[true]), 2);
        assert_eq!(aggregate(&quiz, &[false, true, true, true]), 8);
    };
    aggregate_of_empty_quiz {
        let quiz = Quiz { id: "e".into(), name: "Empty".into(), reorder: false, questions: Box::new([]) };
        assert_eq!(aggregate(&quiz, &[true]), 0);
        let result = AttemptResult::new(&quiz, Box::new([]));
        assert_eq!(result.percentage(), 0);
    };
    full_marks_end_to_end {
        let quiz = sample_quiz();
        let mut state = AnswerState::new(&quiz);
        state.get_mut(0).unwrap().set_text("whatever I like");
        state.get_mut(1).unwrap().choose(&quiz.questions[1], 0);
        let multi = state.get_mut(2).unwrap();
        multi.select(&quiz.questions[2], 2);
        multi.select(&quiz.questions[2], 0);
        let blanks = quiz
            .questions
            .iter()
            .zip(state.as_slice())
            .filter(|(q, a)| evaluate(q, a).is_blank)
            .count();
        assert_eq!(blanks, 0);
        let result = AttemptResult::score(&quiz, state.as_slice());
        assert_eq!((result.marks, result.total), (10, 10));
        assert_eq!(result.percentage(), 100);
        assert_eq!(result.correct_count(), 3);
    };
    partial_marks {
        let quiz = sample_quiz();
        let mut state = AnswerState::new(&quiz);
        state.get_mut(1).unwrap().choose(&quiz.questions[1], 1);
        state.get_mut(2).unwrap().select(&quiz.questions[2], 0);
        let result = AttemptResult::score(&quiz, state.as_slice());
        // the ungraded subjective question counts even when left empty
        assert_eq!(&*result.correct, &[true, false, false]);
        assert_eq!(result.marks, 2);
        assert_eq!(result.percentage(), 20);
        assert!(!result.is_correct(7));
    };
    missing_answers_fail_closed {
        let quiz = sample_quiz();
        let result = AttemptResult::score(&quiz, &[]);
        assert_eq!(result.marks, 0);
        assert_eq!(result.correct.len(), 3);
    }
}

#[cfg(test)]
fn sample_quiz() -> Quiz {
    use crate::quizzes::answers::fixtures::{multiple, single, subjective};
    Quiz {
        id: "sample".into(),
        name: "Sample".into(),
        reorder: false,
        questions: vec![
            subjective(None),
            single(&["yes", "no"], 0),
            multiple(&["2", "4", "5", "9"], &[0, 2], true),
        ]
        .into_boxed_slice(),
    }
}
#[cfg(test)]
use crate::quizzes::answers::AnswerState;

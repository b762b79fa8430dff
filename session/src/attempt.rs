//! The progression controller of a single quiz attempt.
//!
//! Questions are addressed by their *position* in presentation order. With
//! reordering enabled the position differs from the question's index in
//! the quiz definition; answers and results always use the original
//! indices.

use kanal::{Receiver, Sender};
use quizdeck_ontology::{
    Answer, AnswerState, AttemptResult, InputKind, Question, QuestionKind, Quiz, Selection,
    evaluate, utils::Ordering,
};
use rand::{SeedableRng, rngs::StdRng};

use crate::{SessionConfig, review::ReviewItem};

/// Where an attempt currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AttemptState {
    /// showing the question at this position
    Viewing(usize),
    /// the question at this position was left blank; `next` again skips it
    WarningPending(usize),
    /// submitted; `ready` once there are no blanks or the user confirmed
    Submitting { ready: bool },
    Done,
}

/// Outcome of [`Attempt::submit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// no blanks; [`Attempt::complete`] may be called
    Ready,
    /// blank positions exist; the caller has to
    /// [`confirm_submit`](Attempt::confirm_submit) or
    /// [`cancel_submit`](Attempt::cancel_submit)
    ConfirmationRequired(Box<[usize]>),
    /// not at the last question, or already submitted
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AttemptEvent {
    QuestionChanged { position: usize, question: usize },
    /// "You haven't answered yet! Press again to skip"
    Unanswered { position: usize },
    ConfirmationRequired { blanks: Box<[usize]> },
    Finished(AttemptResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Viewing,
    Warning,
    Submitting { confirmed: bool },
    Done,
}

pub struct Attempt {
    quiz: Quiz,
    /// position => question index
    order: Ordering,
    /// per question index: display position => option index
    options: Box<[Ordering]>,
    /// dropped once the attempt is done
    answers: Option<AnswerState>,
    /// per position
    blanks: Box<[bool]>,
    position: usize,
    phase: Phase,
    warn_blank: bool,
    result: Option<AttemptResult>,
    subscribers: Vec<Sender<AttemptEvent>>,
}

impl std::fmt::Debug for Attempt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attempt")
            .field("quiz", &self.quiz.id)
            .field("state", &self.state())
            .field("blanks", &self.blanks())
            .finish_non_exhaustive()
    }
}

impl Attempt {
    #[must_use]
    pub fn new(quiz: Quiz, config: &SessionConfig) -> Self {
        let mut rng = config.seed.map_or_else(
            || StdRng::from_rng(&mut rand::rng()),
            StdRng::seed_from_u64,
        );
        let order = Ordering::new(
            quiz.len(),
            config.shuffles_questions(quiz.reorder),
            &mut rng,
        );
        let options = quiz
            .questions
            .iter()
            .map(|q| {
                Ordering::new(
                    q.options().len(),
                    config.shuffles_options(q.reorders_options()),
                    &mut rng,
                )
            })
            .collect();
        let answers = AnswerState::new(&quiz);
        let blanks = order
            .iter()
            .map(|i| {
                answers
                    .get(i)
                    .is_none_or(|a| evaluate(&quiz.questions[i], a).is_blank)
            })
            .collect();
        tracing::debug!("starting attempt of {} ({} questions)", quiz.id, quiz.len());
        Self {
            quiz,
            order,
            options,
            answers: Some(answers),
            blanks,
            position: 0,
            phase: Phase::Viewing,
            warn_blank: config.warns_blank(),
            result: None,
            subscribers: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.quiz.len()
    }

    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.quiz.is_empty()
    }

    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn state(&self) -> AttemptState {
        match self.phase {
            Phase::Viewing => AttemptState::Viewing(self.position),
            Phase::Warning => AttemptState::WarningPending(self.position),
            Phase::Submitting { confirmed } => AttemptState::Submitting {
                ready: confirmed,
            },
            Phase::Done => AttemptState::Done,
        }
    }

    /// The question index shown at `position`.
    #[inline]
    #[must_use]
    pub fn question_index(&self, position: usize) -> Option<usize> {
        self.order.original(position)
    }

    /// Blank positions, ascending. Only updated when a question is left and
    /// on submission.
    #[must_use]
    pub fn blanks(&self) -> Vec<usize> {
        self.blanks
            .iter()
            .enumerate()
            .filter_map(|(p, b)| b.then_some(p))
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn first_blank(&self) -> Option<usize> {
        self.blanks.iter().position(|b| *b)
    }

    #[inline]
    #[must_use]
    pub const fn result(&self) -> Option<&AttemptResult> {
        self.result.as_ref()
    }

    /// Receives all [`AttemptEvent`]s from now on.
    pub fn subscribe(&mut self) -> Receiver<AttemptEvent> {
        let (sender, receiver) = kanal::unbounded();
        self.subscribers.push(sender);
        receiver
    }

    fn emit(&mut self, event: &AttemptEvent) {
        self.subscribers.retain(|s| s.send(event.clone()).is_ok());
    }

    #[inline]
    const fn navigable(&self) -> bool {
        matches!(self.phase, Phase::Viewing | Phase::Warning)
    }

    #[inline]
    const fn is_last(&self) -> bool {
        self.position + 1 >= self.quiz.len()
    }

    fn current(&self) -> Option<(usize, &Question)> {
        let index = self.order.original(self.position)?;
        Some((index, self.quiz.questions.get(index)?))
    }

    fn refresh_blank(&mut self, position: usize) -> bool {
        let Some(index) = self.order.original(position) else {
            return false;
        };
        let blank = match (&self.answers, self.quiz.questions.get(index)) {
            (Some(answers), Some(q)) => answers.get(index).is_none_or(|a| evaluate(q, a).is_blank),
            _ => false,
        };
        if let Some(b) = self.blanks.get_mut(position) {
            *b = blank;
        }
        blank
    }

    fn move_to(&mut self, position: usize) {
        self.refresh_blank(self.position);
        tracing::trace!("moving from {} to {position}", self.position);
        self.position = position;
        self.phase = Phase::Viewing;
        if let Some(question) = self.order.original(position) {
            self.emit(&AttemptEvent::QuestionChanged { position, question });
        }
    }

    /// Advances to the next question. If the current one is blank and
    /// warnings are enabled, the first call only raises the warning.
    /// Does nothing at the last question.
    pub fn next(&mut self) -> AttemptState {
        if !self.navigable() || self.is_last() {
            return self.state();
        }
        let warn =
            self.phase == Phase::Viewing && self.warn_blank && self.refresh_blank(self.position);
        if warn {
            tracing::trace!("question at {} is unanswered", self.position);
            self.phase = Phase::Warning;
            self.emit(&AttemptEvent::Unanswered {
                position: self.position,
            });
        } else {
            self.move_to(self.position + 1);
        }
        self.state()
    }

    /// Goes back one question; does nothing at the first one.
    pub fn prev(&mut self) -> AttemptState {
        if self.navigable() && self.position > 0 {
            self.move_to(self.position - 1);
        }
        self.state()
    }

    /// Jumps to `position`; out of range positions are ignored.
    pub fn jump(&mut self, position: usize) -> AttemptState {
        if self.navigable() && position < self.quiz.len() && position != self.position {
            self.move_to(position);
        }
        self.state()
    }

    #[inline]
    pub fn jump_first(&mut self) -> AttemptState {
        self.jump(0)
    }

    #[inline]
    pub fn jump_last(&mut self) -> AttemptState {
        self.jump(self.quiz.len().saturating_sub(1))
    }

    /// The display position of question `question` of the quiz definition.
    #[inline]
    #[must_use]
    pub fn position_of(&self, question: usize) -> Option<usize> {
        self.order.position(question)
    }

    /// Jumps to the position showing question `question` of the quiz
    /// definition, e.g. from an outline of all questions.
    pub fn jump_to_question(&mut self, question: usize) -> AttemptState {
        match self.position_of(question) {
            Some(position) => self.jump(position),
            None => self.state(),
        }
    }

    fn answer_mut(&mut self) -> Option<(&Question, &Ordering, &mut Answer)> {
        if !self.navigable() {
            return None;
        }
        let index = self.order.original(self.position)?;
        let question = self.quiz.questions.get(index)?;
        let options = self.options.get(index)?;
        let answer = self.answers.as_mut()?.get_mut(index)?;
        Some((question, options, answer))
    }

    /// Sets the text of the current free-text question.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        self.answer_mut().is_some_and(|(_, _, a)| a.set_text(text))
    }

    /// Chooses the option displayed at `option` for the current single-select
    /// question.
    pub fn choose(&mut self, option: usize) -> Selection {
        let Some((question, options, answer)) = self.answer_mut() else {
            return Selection::Rejected;
        };
        match options.original(option).and_then(|i| u16::try_from(i).ok()) {
            Some(i) => answer.choose(question, i),
            None => Selection::Rejected,
        }
    }

    /// Toggles the option displayed at `option` for the current multi-select
    /// question.
    pub fn toggle(&mut self, option: usize) -> Selection {
        let Some((question, options, answer)) = self.answer_mut() else {
            return Selection::Rejected;
        };
        match options.original(option).and_then(|i| u16::try_from(i).ok()) {
            Some(i) => answer.toggle(question, i),
            None => Selection::Rejected,
        }
    }

    /// Submits from the last question. Repeated submissions are ignored.
    pub fn submit(&mut self) -> Submission {
        if !self.navigable() || !self.is_last() {
            tracing::trace!("ignoring submission in {:?}", self.state());
            return Submission::Ignored;
        }
        for p in 0..self.blanks.len() {
            self.refresh_blank(p);
        }
        let blanks = self.blanks();
        if blanks.is_empty() {
            self.phase = Phase::Submitting { confirmed: true };
            tracing::trace!("submitting");
            Submission::Ready
        } else {
            self.phase = Phase::Submitting { confirmed: false };
            tracing::trace!("submitting with blanks at {blanks:?}");
            let blanks = blanks.into_boxed_slice();
            self.emit(&AttemptEvent::ConfirmationRequired {
                blanks: blanks.clone(),
            });
            Submission::ConfirmationRequired(blanks)
        }
    }

    /// "Submit anyway".
    pub fn confirm_submit(&mut self) -> bool {
        if self.phase == (Phase::Submitting { confirmed: false }) {
            self.phase = Phase::Submitting { confirmed: true };
            true
        } else {
            false
        }
    }

    /// Returns to the first blank question, or stays at the current one if
    /// there is none.
    pub fn cancel_submit(&mut self) -> Option<usize> {
        if !matches!(self.phase, Phase::Submitting { .. }) {
            return None;
        }
        let target = self.first_blank().unwrap_or(self.position);
        self.phase = Phase::Viewing;
        if target != self.position {
            self.move_to(target);
        }
        Some(target)
    }

    /// Finishes a ready submission, scoring all answers. The answers are
    /// dropped afterwards.
    pub fn complete(&mut self) -> Option<AttemptResult> {
        if self.phase != (Phase::Submitting { confirmed: true }) {
            return None;
        }
        let answers = self.answers.take()?;
        let result = AttemptResult::score(&self.quiz, answers.as_slice());
        tracing::debug!(
            "attempt of {} finished: {}/{}",
            self.quiz.id,
            result.marks,
            result.total
        );
        self.phase = Phase::Done;
        self.result = Some(result.clone());
        self.emit(&AttemptEvent::Finished(result.clone()));
        Some(result)
    }

    /// Per-question review of a finished attempt, in definition order.
    pub fn review(&self) -> Option<impl Iterator<Item = ReviewItem<'_>>> {
        self.result
            .as_ref()
            .map(|r| crate::review(&self.quiz, r))
    }

    /// A snapshot of the current question. `None` once the attempt is done.
    #[must_use]
    pub fn view(&self) -> Option<QuestionView<'_>> {
        let answers = self.answers.as_ref()?;
        let (index, question) = self.current()?;
        let answer = answers.get(index)?;
        let options = || {
            self.options
                .get(index)
                .map(|o| {
                    o.iter()
                        .filter_map(|i| {
                            let label = question.options().get(i)?;
                            let index = u16::try_from(i).ok()?;
                            Some(OptionView {
                                index,
                                label: &**label,
                                selected: answer.is_selected(index),
                            })
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default()
        };
        let body = match &question.kind {
            QuestionKind::Subjective { input, .. } => QuestionBody::Text {
                input: *input,
                text: answer.text().unwrap_or_default(),
            },
            QuestionKind::SingleChoice { .. } => QuestionBody::Single { options: options() },
            QuestionKind::MultipleChoice { .. } => QuestionBody::Multiple {
                options: options(),
                hint: question.selection_hint(),
            },
        };
        Some(QuestionView {
            position: self.position,
            question: index,
            count: self.quiz.len(),
            prompt: &question.prompt,
            marks: question.marks,
            body,
            warning: self.phase == Phase::Warning,
            is_last: self.is_last(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct QuestionView<'a> {
    pub position: usize,
    /// index in the quiz definition
    pub question: usize,
    pub count: usize,
    pub prompt: &'a str,
    pub marks: u32,
    pub body: QuestionBody<'a>,
    /// the "not answered yet" warning is showing
    pub warning: bool,
    /// offer submitting instead of moving on
    pub is_last: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum QuestionBody<'a> {
    Text {
        input: InputKind,
        text: &'a str,
    },
    /// options in display order
    Single { options: Vec<OptionView<'a>> },
    Multiple {
        options: Vec<OptionView<'a>>,
        hint: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OptionView<'a> {
    /// index in the question definition
    pub index: u16,
    pub label: &'a str,
    pub selected: bool,
}

crate::tests! {
    warning_before_skipping_blank {
        let mut attempt = Attempt::new(sample(), &fixed());
        assert_eq!(attempt.state(), AttemptState::Viewing(0));
        assert_eq!(attempt.next(), AttemptState::WarningPending(0));
        assert!(attempt.view().unwrap().warning);
        assert_eq!(attempt.next(), AttemptState::Viewing(1));
        assert_eq!(attempt.blanks(), vec![0, 1, 2]);
        attempt.choose(0);
        assert_eq!(attempt.next(), AttemptState::Viewing(2));
        assert_eq!(attempt.blanks(), vec![0, 2]);
    };
    answered_questions_advance_directly {
        let mut attempt = Attempt::new(sample(), &fixed());
        assert!(attempt.set_text("anything"));
        assert_eq!(attempt.next(), AttemptState::Viewing(1));
    };
    warnings_can_be_disabled {
        let config = SessionConfig { warn_blank: Some(false), ..fixed() };
        let mut attempt = Attempt::new(sample(), &config);
        assert_eq!(attempt.next(), AttemptState::Viewing(1));
    };
    index_changes_clear_the_warning {
        let mut attempt = Attempt::new(sample(), &fixed());
        attempt.jump(1);
        assert_eq!(attempt.next(), AttemptState::WarningPending(1));
        assert_eq!(attempt.prev(), AttemptState::Viewing(0));
        attempt.jump(1);
        assert_eq!(attempt.next(), AttemptState::WarningPending(1));
        assert_eq!(attempt.jump_last(), AttemptState::Viewing(2));
    };
    navigation_bounds {
        let mut attempt = Attempt::new(sample(), &fixed());
        assert_eq!(attempt.prev(), AttemptState::Viewing(0));
        assert_eq!(attempt.jump(3), AttemptState::Viewing(0));
        assert_eq!(attempt.jump_last(), AttemptState::Viewing(2));
        assert_eq!(attempt.next(), AttemptState::Viewing(2));
        assert_eq!(attempt.jump_first(), AttemptState::Viewing(0));
    };
    submitting_with_blanks_requires_confirmation {
        let mut attempt = Attempt::new(sample(), &fixed());
        attempt.set_text("x");
        assert_eq!(attempt.submit(), Submission::Ignored);
        attempt.jump_last();
        assert_eq!(attempt.submit(), Submission::ConfirmationRequired(Box::new([1, 2])));
        assert_eq!(attempt.complete(), None);
        assert_eq!(attempt.submit(), Submission::Ignored);
        assert_eq!(attempt.cancel_submit(), Some(1));
        assert_eq!(attempt.state(), AttemptState::Viewing(1));
        attempt.jump_last();
        attempt.submit();
        assert!(attempt.confirm_submit());
        assert_eq!(attempt.state(), AttemptState::Submitting { ready: true });
        let result = attempt.complete().unwrap();
        assert_eq!(&*result.correct, &[true, false, false]);
        assert_eq!(result.marks, 2);
        assert_eq!(attempt.state(), AttemptState::Done);
        assert!(attempt.view().is_none());
        assert_eq!(attempt.submit(), Submission::Ignored);
        assert_eq!(attempt.complete(), None);
        assert_eq!(attempt.result(), Some(&result));
    };
    full_marks {
        let mut attempt = Attempt::new(sample(), &fixed());
        attempt.set_text("my own answer");
        attempt.next();
        assert_eq!(attempt.choose(0), Selection::Added);
        attempt.next();
        assert_eq!(attempt.toggle(2), Selection::Added);
        assert_eq!(attempt.toggle(0), Selection::Added);
        assert_eq!(attempt.toggle(1), Selection::Rejected);
        assert_eq!(attempt.submit(), Submission::Ready);
        assert!(attempt.blanks().is_empty());
        let result = attempt.complete().unwrap();
        assert_eq!((result.marks, result.total), (10, 10));
        assert_eq!(result.percentage(), 100);
        let review: Vec<_> = attempt.review().unwrap().collect();
        assert!(review.iter().all(|r| r.correct));
        assert_eq!(review[2].answer.as_deref(), Some("•\t2\n•\t5"));
    };
    cancelling_without_blanks_stays {
        let mut attempt = Attempt::new(sample(), &fixed());
        attempt.set_text("a");
        attempt.next();
        attempt.choose(1);
        attempt.next();
        attempt.toggle(0);
        attempt.toggle(1);
        assert_eq!(attempt.submit(), Submission::Ready);
        assert!(!attempt.confirm_submit());
        assert_eq!(attempt.cancel_submit(), Some(2));
        assert_eq!(attempt.state(), AttemptState::Viewing(2));
    };
    view_snapshot {
        let mut attempt = Attempt::new(sample(), &fixed());
        let view = attempt.view().unwrap();
        assert_eq!(view.prompt, "Say anything");
        assert_eq!(view.body, QuestionBody::Text { input: InputKind::Text, text: "" });
        attempt.set_text("hello");
        assert_eq!(attempt.view().unwrap().body, QuestionBody::Text { input: InputKind::Text, text: "hello" });
        attempt.jump_last();
        attempt.toggle(1);
        let view = attempt.view().unwrap();
        assert!(view.is_last);
        let QuestionBody::Multiple { options, hint } = view.body else {
            panic!("expected a multi-select question");
        };
        assert_eq!(hint.as_deref(), Some("Select 2 answers"));
        assert_eq!(
            options.iter().map(|o| (o.label, o.selected)).collect::<Vec<_>>(),
            vec![("2", false), ("4", true), ("5", false), ("9", false)]
        );
        assert!(!attempt.set_text("wrong kind"));
        assert_eq!(attempt.choose(0), Selection::Rejected);
        assert_eq!(attempt.toggle(9), Selection::Rejected);
    };
    reordering_keeps_original_indices {
        let quiz = reorderable(6);
        let config = SessionConfig { seed: Some(42), ..Default::default() };
        let mut attempt = Attempt::new(quiz, &config);
        let mut seen: Vec<_> = (0..6).filter_map(|p| attempt.question_index(p)).collect();
        seen.sort_unstable();
        assert_eq!(seen, (0..6).collect::<Vec<_>>());
        for p in 0..6 {
            attempt.jump(p);
            let view = attempt.view().unwrap();
            assert_eq!(Some(view.question), attempt.question_index(p));
            let QuestionBody::Single { options } = view.body else {
                panic!("expected a single-select question");
            };
            let right = options.iter().position(|o| o.label == "right").unwrap();
            assert_eq!(options[right].index, 0);
            attempt.choose(right);
        }
        assert_eq!(attempt.submit(), Submission::Ready);
        let result = attempt.complete().unwrap();
        assert_eq!(result.correct_count(), 6);
        assert_eq!(result.marks, 6);
    };
    jump_to_question_follows_the_ordering {
        let config = SessionConfig { seed: Some(42), ..Default::default() };
        let mut attempt = Attempt::new(reorderable(6), &config);
        for question in (0..6).rev() {
            let position = attempt.position_of(question).unwrap();
            assert_eq!(attempt.question_index(position), Some(question));
            assert_eq!(attempt.jump_to_question(question), AttemptState::Viewing(position));
            assert_eq!(attempt.view().unwrap().question, question);
        }
        let before = attempt.state();
        assert_eq!(attempt.position_of(6), None);
        assert_eq!(attempt.jump_to_question(6), before);
    };
    reordering_can_be_disabled {
        let config = SessionConfig {
            shuffle_questions: Some(false),
            shuffle_options: Some(false),
            seed: Some(1),
            ..Default::default()
        };
        let attempt = Attempt::new(reorderable(6), &config);
        assert_eq!((0..6).filter_map(|p| attempt.question_index(p)).collect::<Vec<_>>(), (0..6).collect::<Vec<_>>());
        let QuestionBody::Single { options } = attempt.view().unwrap().body else {
            panic!("expected a single-select question");
        };
        assert_eq!(options.iter().map(|o| o.index).collect::<Vec<_>>(), vec![0, 1, 2]);
    };
    events {
        let mut attempt = Attempt::new(sample(), &fixed());
        let events = attempt.subscribe();
        attempt.next();
        attempt.next();
        attempt.jump_last();
        attempt.submit();
        attempt.confirm_submit();
        let result = attempt.complete().unwrap();
        let received: Vec<_> = std::iter::from_fn(|| events.try_recv().ok().flatten()).collect();
        assert_eq!(
            received,
            vec![
                AttemptEvent::Unanswered { position: 0 },
                AttemptEvent::QuestionChanged { position: 1, question: 1 },
                AttemptEvent::QuestionChanged { position: 2, question: 2 },
                AttemptEvent::ConfirmationRequired { blanks: Box::new([0, 1, 2]) },
                AttemptEvent::Finished(result),
            ]
        );
    };
    empty_quiz {
        let quiz = Quiz { id: "e".into(), name: "Empty".into(), reorder: true, questions: Box::new([]) };
        let mut attempt = Attempt::new(quiz, &SessionConfig::default());
        assert!(attempt.view().is_none());
        assert_eq!(attempt.next(), AttemptState::Viewing(0));
        assert_eq!(attempt.submit(), Submission::Ready);
        let result = attempt.complete().unwrap();
        assert_eq!(result.percentage(), 0);
    }
}

#[cfg(test)]
fn fixed() -> SessionConfig {
    SessionConfig {
        shuffle_questions: Some(false),
        shuffle_options: Some(false),
        ..Default::default()
    }
}

/// ungraded subjective (2 marks), single-select with answer 0 (3 marks),
/// multi-select with answers {0, 2} in hint mode (5 marks)
#[cfg(test)]
fn sample() -> Quiz {
    use quizdeck_ontology::documents::FromDocument;
    let doc = serde_json::json!({
        "name": "Sample",
        "questions": [
            { "question": "Say anything", "type": "text", "marks": 2 },
            { "question": "Yes?", "answer": 0, "options": ["yes", "no"], "marks": 3 },
            { "question": "Primes?", "answers": [0, 2], "options": ["2", "4", "5", "9"], "hint": true, "marks": 5 },
        ]
    });
    Quiz::from_document("sample", doc.as_object().unwrap()).unwrap()
}

#[cfg(test)]
fn reorderable(n: usize) -> Quiz {
    use quizdeck_ontology::documents::FromDocument;
    let questions: Vec<_> = (0..n)
        .map(|i| serde_json::json!({
            "question": format!("Question {i}"),
            "answer": 0,
            "options": ["right", "wrong", "also wrong"],
        }))
        .collect();
    let doc = serde_json::json!({ "name": "Shuffled", "questions": questions });
    Quiz::from_document("shuffled", doc.as_object().unwrap()).unwrap()
}

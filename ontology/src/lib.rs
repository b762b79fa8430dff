#![allow(unexpected_cfgs)]
#![cfg_attr(all(doc, CHANNEL_NIGHTLY), feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
/*!
 * ## Feature flags
 */
#![cfg_attr(doc,doc = document_features::document_features!())]

pub mod documents;
pub mod notifications;
pub mod quizzes;
pub mod records;
pub mod users;
pub mod utils;

pub use documents::{DocumentMap, PropertyError};
pub use notifications::Notification;
pub use records::AttemptRecord;
pub use quizzes::{
    InputKind, Question, QuestionKind, Quiz,
    answers::{Answer, AnswerState, Selection},
    scoring::{AttemptResult, Evaluation, aggregate, evaluate},
};
pub use users::{
    User,
    validation::{Field, Violation},
};

#[cfg(test)]
#[rstest::fixture]
fn trace() {
    let _ = tracing_subscriber::fmt().try_init();
}

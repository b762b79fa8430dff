#![allow(unexpected_cfgs)]
#![cfg_attr(all(doc, CHANNEL_NIGHTLY), feature(doc_auto_cfg))]
#![doc = include_str!("../README.md")]
/*!
 * ## Feature flags
 */
#![cfg_attr(doc,doc = document_features::document_features!())]

mod accounts;
mod attempt;
mod config;
mod feed;
mod host;
mod review;

pub use accounts::{AccountError, Accounts, PasswordHasher};
pub use attempt::{
    Attempt, AttemptEvent, AttemptState, OptionView, QuestionBody, QuestionView, Submission,
};
pub use config::SessionConfig;
pub use feed::{ActivityItem, activity_feed};
pub use host::{NoQuizAvailable, load_attempt, record_result};
pub use review::{ReviewItem, review};

macro_rules! tests {
    ($($(#[$meta:meta])* $name:ident $(($($(#[$pmeta:meta])* $argn:ident:$argtp:ty),+))? $code:block);* $(;)?) => {
        #[cfg(test)]
        mod tests {
            #![allow(unused_imports)]
            #![allow(clippy::unwrap_used)]
            use super::*;
            use crate::trace;
            use rstest::{rstest,fixture};
            $(
                #[rstest]
                #[allow(unused_variables)]
                $(#[$meta])*
                fn $name(trace:()$($(,$(#[$pmeta])* $argn:$argtp)+)?) $code
            )*

        }
    };
}
pub(crate) use tests;

#[cfg(test)]
#[rstest::fixture]
fn trace() {
    let _ = tracing_subscriber::fmt().try_init();
}

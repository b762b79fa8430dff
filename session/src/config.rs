use quizdeck_ontology::User;

/// Per-attempt settings, usually provided by the host as JSON. Unset values
/// fall back to the quiz's own flags and the user's preferences.
#[derive(Clone, Default, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SessionConfig {
    /// `Some(false)` keeps questions in definition order even if the quiz
    /// allows reordering. `Some(true)` cannot enable it for quizzes that
    /// forbid it.
    #[serde(default, rename = "shuffleQuestions")]
    pub shuffle_questions: Option<bool>,

    /// Like [`shuffle_questions`](Self::shuffle_questions), for the options
    /// of objective questions.
    #[serde(default, rename = "shuffleOptions")]
    pub shuffle_options: Option<bool>,

    #[serde(default, rename = "warnBlank")]
    pub warn_blank: Option<bool>,

    /// Seeds the shuffling, for reproducible presentation orders.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl SessionConfig {
    /// Only JSON objects are accepted; unknown keys are ignored.
    ///
    /// # Errors
    /// if `json` is not a valid config object
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;
        serde_json::from_value(serde_json::Value::Object(map))
    }

    /// Fills in the warning preference of `user` unless already set.
    #[must_use]
    pub fn for_user(mut self, user: Option<&User>) -> Self {
        if self.warn_blank.is_none() {
            self.warn_blank = user.map(|u| u.warn_blank);
        }
        self
    }

    #[inline]
    #[must_use]
    pub fn shuffles_questions(&self, quiz_allows: bool) -> bool {
        quiz_allows && self.shuffle_questions.unwrap_or(true)
    }

    #[inline]
    #[must_use]
    pub fn shuffles_options(&self, question_allows: bool) -> bool {
        question_allows && self.shuffle_options.unwrap_or(true)
    }

    #[inline]
    #[must_use]
    pub fn warns_blank(&self) -> bool {
        self.warn_blank.unwrap_or(true)
    }
}

crate::tests! {
    from_json {
        let config = SessionConfig::from_json(r#"{ "shuffleQuestions": false, "seed": 3 }"#).unwrap();
        assert_eq!(config.shuffle_questions, Some(false));
        assert_eq!(config.seed, Some(3));
        assert!(!config.shuffles_questions(true));
        assert!(config.shuffles_options(true));
        assert!(!config.shuffles_options(false));
        assert!(SessionConfig::from_json("[]").is_err());
        assert!(SessionConfig::from_json("[true, false, true, 1]").is_err());
        assert!(SessionConfig::from_json(r#"{ "seed": "x" }"#).is_err());
        assert_eq!(SessionConfig::from_json("{}").unwrap(), SessionConfig::default());
    };
    user_preference {
        let mut user = User::new("ada", "Ada", "Lovelace");
        user.warn_blank = false;
        assert!(!SessionConfig::default().for_user(Some(&user)).warns_blank());
        assert!(SessionConfig::default().for_user(None).warns_blank());
        let explicit = SessionConfig { warn_blank: Some(true), ..Default::default() };
        assert!(explicit.for_user(Some(&user)).warns_blank());
    }
}

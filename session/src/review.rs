use quizdeck_ontology::{AttemptResult, Quiz};

/// One line of the result review.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReviewItem<'a> {
    pub prompt: &'a str,
    pub correct: bool,
    /// marks awarded for this question
    pub marks: u32,
    /// the expected answer, if the question has one
    pub answer: Option<String>,
}

/// Pairs each question of `quiz` with its outcome in `result`, in
/// definition order.
pub fn review<'a>(quiz: &'a Quiz, result: &'a AttemptResult) -> impl Iterator<Item = ReviewItem<'a>> {
    quiz.questions.iter().enumerate().map(|(i, q)| {
        let correct = result.is_correct(i);
        ReviewItem {
            prompt: &q.prompt,
            correct,
            marks: if correct { q.marks } else { 0 },
            answer: q.answer_text(),
        }
    })
}

crate::tests! {
    review_lines {
        use quizdeck_ontology::documents::FromDocument;
        let doc = serde_json::json!({
            "name": "Review",
            "questions": [
                { "question": "Capital of France?", "answer": 1, "options": ["Lyon", "Paris"], "marks": 4 },
                { "question": "Anything", "type": "long text" },
            ]
        });
        let quiz = Quiz::from_document("r", doc.as_object().unwrap()).unwrap();
        let result = AttemptResult::new(&quiz, Box::new([false, true]));
        let lines: Vec<_> = review(&quiz, &result).collect();
        assert_eq!(lines[0].answer.as_deref(), Some("Paris"));
        assert_eq!((lines[0].correct, lines[0].marks), (false, 0));
        assert_eq!((lines[1].correct, lines[1].marks), (true, 1));
        assert_eq!(lines[1].answer, None);
        assert_eq!(result.percentage(), 20);
    }
}

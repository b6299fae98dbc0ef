//! Assessment grading and the attempt state machine.
//!
//! ```text
//! NotStarted --load--> InProgress --submit--> Passed
//!                          ^                \
//!                          |                 +--> Failed --retake--+
//!                          +-----------------------------------------+
//! ```
//!
//! Grading is a pure function of the loaded questions and the answer set,
//! so submitting twice without new answers yields the same result.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::model::{Question, QuestionId};

/// Marks awarded per correctly answered question.
pub const MARKS_PER_QUESTION: u32 = 10;

/// Minimum percentage needed to pass.
pub const PASS_THRESHOLD: f64 = 70.0;

/// Answer shown for questions the learner skipped.
pub const NOT_ANSWERED: &str = "Not answered";

/// Observable states of an assessment attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentState {
    NotStarted,
    InProgress,
    /// Graded at or above the pass threshold; a certificate may be issued.
    Passed,
    /// Graded below the pass threshold; a retake is available.
    Failed,
}

impl fmt::Display for AssessmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssessmentState::NotStarted => write!(f, "not started"),
            AssessmentState::InProgress => write!(f, "in progress"),
            AssessmentState::Passed => write!(f, "passed"),
            AssessmentState::Failed => write!(f, "failed"),
        }
    }
}

/// Illegal operations on the engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssessmentError {
    #[error("cannot {operation} while the assessment is {state}")]
    InvalidTransition {
        operation: &'static str,
        state: AssessmentState,
    },
}

/// The learner's answers for one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerSet {
    attempt_id: Uuid,
    answers: HashMap<QuestionId, String>,
}

impl AnswerSet {
    /// An empty answer set for a new attempt.
    pub fn new() -> Self {
        Self {
            attempt_id: Uuid::new_v4(),
            answers: HashMap::new(),
        }
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    /// Upsert an answer; the last write wins.
    pub fn insert(&mut self, question_id: QuestionId, value: impl Into<String>) {
        self.answers.insert(question_id, value.into());
    }

    pub fn get(&self, question_id: QuestionId) -> Option<&str> {
        self.answers.get(&question_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.answers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
    }
}

impl Default for AnswerSet {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-question grading detail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: QuestionId,
    pub question: String,
    /// The submitted answer, or [`NOT_ANSWERED`].
    pub user_answer: String,
    pub correct_answer: String,
    pub passed: bool,
}

/// Snapshot produced by grading an attempt. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradingResult {
    /// Percentage score; `0` when there are no questions.
    pub percentage: f64,
    pub earned_marks: u32,
    pub total_marks: u32,
    /// One entry per loaded question, in load order.
    pub details: Vec<QuestionResult>,
}

impl GradingResult {
    pub fn passed(&self) -> bool {
        self.percentage >= PASS_THRESHOLD
    }

    pub fn correct_count(&self) -> usize {
        self.details.iter().filter(|d| d.passed).count()
    }
}

/// Request for the backend to record the attempt's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    pub passed: bool,
    pub score: f64,
}

/// Everything a submission produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub result: GradingResult,
    pub completion: CompletionEvent,
}

/// Whether `submitted` is a correct answer to `question`.
///
/// Multiple-choice answers must match the correct option exactly.
/// Free-text answers are compared after trimming and lowercasing. A missing
/// answer is always wrong.
pub fn is_correct(question: &Question, submitted: Option<&str>) -> bool {
    let Some(submitted) = submitted else {
        return false;
    };
    if question.is_multiple_choice() {
        submitted == question.answer
    } else {
        submitted.trim().to_lowercase() == question.answer.trim().to_lowercase()
    }
}

/// Grade every question against the answer set.
pub fn grade(questions: &[Question], answers: &AnswerSet) -> GradingResult {
    let details: Vec<QuestionResult> = questions
        .iter()
        .map(|q| {
            let submitted = answers.get(q.id);
            QuestionResult {
                question_id: q.id,
                question: q.prompt.clone(),
                user_answer: submitted.unwrap_or(NOT_ANSWERED).to_string(),
                correct_answer: q.answer.clone(),
                passed: is_correct(q, submitted),
            }
        })
        .collect();

    let total_marks = questions.len() as u32 * MARKS_PER_QUESTION;
    let earned_marks = details.iter().filter(|d| d.passed).count() as u32 * MARKS_PER_QUESTION;
    // An empty assessment would be 0/0; it scores zero and fails.
    let percentage = if total_marks == 0 {
        0.0
    } else {
        earned_marks as f64 / total_marks as f64 * 100.0
    };

    GradingResult {
        percentage,
        earned_marks,
        total_marks,
        details,
    }
}

/// One learner's assessment for one course.
#[derive(Debug, Clone)]
pub struct AssessmentEngine {
    state: AssessmentState,
    questions: Vec<Question>,
    answers: AnswerSet,
    result: Option<GradingResult>,
}

impl AssessmentEngine {
    pub fn new() -> Self {
        Self {
            state: AssessmentState::NotStarted,
            questions: Vec::new(),
            answers: AnswerSet::new(),
            result: None,
        }
    }

    pub fn state(&self) -> AssessmentState {
        self.state
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    /// The latest grading result, if the attempt has been submitted.
    pub fn result(&self) -> Option<&GradingResult> {
        self.result.as_ref()
    }

    /// Load a question set and start a fresh attempt.
    pub fn load(&mut self, questions: Vec<Question>) {
        tracing::debug!(count = questions.len(), "loading assessment questions");
        self.questions = questions;
        self.answers = AnswerSet::new();
        self.result = None;
        self.state = AssessmentState::InProgress;
    }

    /// Record an answer. Only legal while the attempt is in progress.
    pub fn answer(
        &mut self,
        question_id: QuestionId,
        value: impl Into<String>,
    ) -> Result<(), AssessmentError> {
        if self.state != AssessmentState::InProgress {
            return Err(AssessmentError::InvalidTransition {
                operation: "answer",
                state: self.state,
            });
        }
        self.answers.insert(question_id, value);
        Ok(())
    }

    /// Grade the attempt and move to `Passed` or `Failed`.
    ///
    /// Submitting an already graded attempt re-grades the same answers and
    /// returns an identical result.
    pub fn submit(&mut self) -> Result<Submission, AssessmentError> {
        if self.state == AssessmentState::NotStarted {
            return Err(AssessmentError::InvalidTransition {
                operation: "submit",
                state: self.state,
            });
        }

        let result = grade(&self.questions, &self.answers);
        let passed = result.passed();
        self.state = if passed {
            AssessmentState::Passed
        } else {
            AssessmentState::Failed
        };
        tracing::info!(
            percentage = result.percentage,
            state = %self.state,
            "assessment graded"
        );

        let completion = CompletionEvent {
            passed,
            score: result.percentage,
        };
        self.result = Some(result.clone());
        Ok(Submission { result, completion })
    }

    /// Discard the failed attempt and start again with the same questions.
    pub fn retake(&mut self) -> Result<(), AssessmentError> {
        if self.state != AssessmentState::Failed {
            return Err(AssessmentError::InvalidTransition {
                operation: "retake",
                state: self.state,
            });
        }
        self.answers = AnswerSet::new();
        self.result = None;
        self.state = AssessmentState::InProgress;
        Ok(())
    }
}

impl Default for AssessmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn free_text(id: QuestionId, answer: &str) -> Question {
        Question {
            id,
            prompt: format!("Question {id}"),
            options: vec![],
            answer: answer.into(),
        }
    }

    fn choice(id: QuestionId, options: &[&str], answer: &str) -> Question {
        Question {
            id,
            prompt: format!("Question {id}"),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer: answer.into(),
        }
    }

    #[test]
    fn free_text_ignores_case_and_whitespace() {
        let q = free_text(1, "Paris");
        assert!(is_correct(&q, Some(" paris ")));
        assert!(is_correct(&q, Some("PARIS")));
        assert!(!is_correct(&q, Some("Lyon")));
    }

    #[test]
    fn multiple_choice_is_exact() {
        let q = choice(1, &["Paris", "paris", "Lyon"], "Paris");
        assert!(is_correct(&q, Some("Paris")));
        assert!(!is_correct(&q, Some("paris")));
        assert!(!is_correct(&q, Some(" Paris ")));
    }

    #[test]
    fn missing_answer_is_wrong_even_for_empty_correct_answer() {
        assert!(!is_correct(&free_text(1, ""), None));
    }

    #[test]
    fn unanswered_question_is_reported_as_not_answered() {
        let questions = vec![free_text(1, "a"), free_text(2, "b")];
        let mut answers = AnswerSet::new();
        answers.insert(1, "a");
        let result = grade(&questions, &answers);
        let skipped = &result.details[1];
        assert!(!skipped.passed);
        assert_eq!(skipped.user_answer, NOT_ANSWERED);
        assert_eq!(skipped.correct_answer, "b");
    }

    #[test]
    fn zero_questions_scores_zero_and_fails() {
        let mut engine = AssessmentEngine::new();
        engine.load(vec![]);
        let submission = engine.submit().unwrap();
        assert_eq!(submission.result.percentage, 0.0);
        assert!(!submission.result.percentage.is_nan());
        assert_eq!(submission.result.total_marks, 0);
        assert!(!submission.completion.passed);
        assert_eq!(engine.state(), AssessmentState::Failed);
    }

    #[test]
    fn half_correct_fails_and_retake_resets_answers() {
        let mut engine = AssessmentEngine::new();
        engine.load(vec![free_text(1, "yes"), free_text(2, "no")]);
        engine.answer(1, "yes").unwrap();
        engine.answer(2, "maybe").unwrap();

        let submission = engine.submit().unwrap();
        assert_eq!(submission.result.percentage, 50.0);
        assert_eq!(submission.result.earned_marks, 10);
        assert_eq!(submission.result.total_marks, 20);
        assert_eq!(engine.state(), AssessmentState::Failed);
        assert_eq!(
            submission.completion,
            CompletionEvent {
                passed: false,
                score: 50.0
            }
        );

        let first_attempt = engine.answers().attempt_id();
        engine.retake().unwrap();
        assert_eq!(engine.state(), AssessmentState::InProgress);
        assert_eq!(engine.questions().len(), 2);
        assert!(engine.answers().is_empty());
        assert!(engine.result().is_none());
        assert_ne!(engine.answers().attempt_id(), first_attempt);
    }

    #[test]
    fn all_correct_passes() {
        let mut engine = AssessmentEngine::new();
        engine.load(vec![
            choice(1, &["a", "b"], "a"),
            free_text(2, "Rust"),
            choice(3, &["x", "y"], "y"),
        ]);
        engine.answer(1, "a").unwrap();
        engine.answer(2, " rust").unwrap();
        engine.answer(3, "y").unwrap();

        let submission = engine.submit().unwrap();
        assert_eq!(submission.result.percentage, 100.0);
        assert!(submission.completion.passed);
        assert_eq!(engine.state(), AssessmentState::Passed);
    }

    #[test]
    fn seventy_percent_is_a_pass() {
        let questions: Vec<Question> = (1..=10).map(|i| free_text(i, "ok")).collect();
        let mut answers = AnswerSet::new();
        for i in 1..=7 {
            answers.insert(i, "ok");
        }
        let result = grade(&questions, &answers);
        assert_eq!(result.percentage, 70.0);
        assert!(result.passed());
    }

    #[test]
    fn resubmitting_is_idempotent() {
        let mut engine = AssessmentEngine::new();
        engine.load(vec![free_text(1, "a"), choice(2, &["b", "c"], "c")]);
        engine.answer(1, "a").unwrap();
        let first = engine.submit().unwrap();
        let second = engine.submit().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn last_answer_wins() {
        let mut engine = AssessmentEngine::new();
        engine.load(vec![free_text(1, "right")]);
        engine.answer(1, "wrong").unwrap();
        engine.answer(1, "right").unwrap();
        assert_eq!(engine.answers().len(), 1);
        assert_eq!(engine.submit().unwrap().result.percentage, 100.0);
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let mut engine = AssessmentEngine::new();
        assert!(engine.answer(1, "x").is_err());
        assert!(engine.submit().is_err());
        assert!(engine.retake().is_err());

        engine.load(vec![free_text(1, "x")]);
        assert_eq!(
            engine.retake(),
            Err(AssessmentError::InvalidTransition {
                operation: "retake",
                state: AssessmentState::InProgress,
            })
        );

        engine.answer(1, "x").unwrap();
        engine.submit().unwrap();
        assert_eq!(engine.state(), AssessmentState::Passed);
        assert!(engine.retake().is_err());
        let err = engine.answer(1, "y").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot answer while the assessment is passed"
        );
    }

    #[test]
    fn answers_for_unknown_questions_do_not_affect_score() {
        let questions = vec![free_text(1, "a")];
        let mut answers = AnswerSet::new();
        answers.insert(1, "a");
        answers.insert(99, "stray");
        let result = grade(&questions, &answers);
        assert_eq!(result.details.len(), 1);
        assert_eq!(result.percentage, 100.0);
    }

    #[test]
    fn reload_starts_a_new_attempt() {
        let mut engine = AssessmentEngine::new();
        engine.load(vec![free_text(1, "a")]);
        engine.answer(1, "b").unwrap();
        engine.submit().unwrap();
        engine.load(vec![free_text(2, "c")]);
        assert_eq!(engine.state(), AssessmentState::InProgress);
        assert!(engine.answers().is_empty());
        assert!(engine.result().is_none());
    }
}

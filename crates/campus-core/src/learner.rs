//! The learner dashboard controller.
//!
//! Owns one learner's view state: the course list, the selected course,
//! note progress and the assessment attempt. Every failure is posted as an
//! error notice and also returned, so a caller can keep the view alive.

use std::sync::Arc;

use chrono::{Local, Utc};
use tracing::instrument;

use crate::assessment::{AssessmentEngine, AssessmentState, GradingResult};
use crate::error::{BackendError, DashboardError};
use crate::model::{
    CertificateData, CompletionRecord, CompletionStatus, Course, CourseId, Enrollment,
    EnrollmentRequest, NotePage, Question, QuestionId,
};
use crate::notify::Notices;
use crate::progress::{PageMove, PageTurn, ProgressEvent, ProgressTracker};
use crate::session::{self, Session};
use crate::traits::Backend;

pub const PASSED_MESSAGE: &str = "Congratulations! You passed the assessment.";
pub const FAILED_MESSAGE: &str = "You did not pass. Please review and retake.";
pub const NOTE_LOAD_FAILED: &str = "Failed to load notes for this page.";

/// Learner dashboard state.
pub struct LearnerDashboard {
    backend: Arc<dyn Backend>,
    session: Option<Session>,
    learner_name: String,
    courses: Vec<Course>,
    selected: Option<Course>,
    enrollment: Option<Enrollment>,
    tracker: ProgressTracker,
    note: Option<NotePage>,
    note_content: String,
    engine: AssessmentEngine,
    notices: Notices,
}

impl LearnerDashboard {
    pub fn new(backend: Arc<dyn Backend>, session: Option<Session>) -> Self {
        let learner_name = session
            .as_ref()
            .map(|s| s.username.clone())
            .unwrap_or_default();
        Self {
            backend,
            session,
            learner_name,
            courses: Vec::new(),
            selected: None,
            enrollment: None,
            tracker: ProgressTracker::new(0),
            note: None,
            note_content: String::new(),
            engine: AssessmentEngine::new(),
            notices: Notices::default(),
        }
    }

    pub fn with_notices(mut self, notices: Notices) -> Self {
        self.notices = notices;
        self
    }

    // -- accessors ----------------------------------------------------------

    pub fn learner_name(&self) -> &str {
        &self.learner_name
    }

    pub fn set_learner_name(&mut self, name: impl Into<String>) {
        self.learner_name = name.into();
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn selected_course(&self) -> Option<&Course> {
        self.selected.as_ref()
    }

    pub fn is_enrolled(&self) -> bool {
        self.enrollment.is_some()
    }

    /// Enrollment in the selected course, updated when an attempt is graded.
    pub fn enrollment(&self) -> Option<&Enrollment> {
        self.enrollment.as_ref()
    }

    pub fn progress(&self) -> f64 {
        self.tracker.progress()
    }

    pub fn current_page(&self) -> Option<u32> {
        self.tracker.current_page()
    }

    pub fn is_assessment_unlocked(&self) -> bool {
        self.tracker.is_unlocked()
    }

    /// HTML content of the page on screen, or the failure placeholder.
    pub fn note_content(&self) -> &str {
        &self.note_content
    }

    pub fn note(&self) -> Option<&NotePage> {
        self.note.as_ref()
    }

    pub fn assessment(&self) -> &AssessmentEngine {
        &self.engine
    }

    pub fn assessment_state(&self) -> AssessmentState {
        self.engine.state()
    }

    pub fn result(&self) -> Option<&GradingResult> {
        self.engine.result()
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut Notices {
        &mut self.notices
    }

    fn fail<T>(&mut self, err: DashboardError) -> Result<T, DashboardError> {
        self.notices.error(err.user_message());
        Err(err)
    }

    fn fail_backend<T>(&mut self, prefix: &str, err: BackendError) -> Result<T, DashboardError> {
        self.notices.error(format!("{prefix}{}", err.user_message()));
        Err(err.into())
    }

    // -- courses ------------------------------------------------------------

    #[instrument(skip(self))]
    pub async fn refresh_courses(&mut self) -> Result<&[Course], DashboardError> {
        match self.backend.courses().await {
            Ok(courses) => {
                tracing::debug!(count = courses.len(), "courses loaded");
                self.courses = courses;
                Ok(&self.courses)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load courses");
                self.notices
                    .error("Failed to load courses. Please check your backend server.");
                Err(e.into())
            }
        }
    }

    /// Select a course, looking it up with the backend when it is not in
    /// the loaded list. Resets progress, enrollment and any assessment
    /// attempt.
    #[instrument(skip(self))]
    pub async fn select_course(&mut self, id: CourseId) -> Result<&Course, DashboardError> {
        let listed = self.courses.iter().find(|c| c.id == id).cloned();
        let course = match listed {
            Some(course) => course,
            None => match self.backend.course(id).await {
                Ok(course) => course,
                Err(e) => {
                    tracing::warn!(error = %e, id, "course lookup failed");
                    return self.fail(DashboardError::precondition(format!(
                        "Course {id} is not available."
                    )));
                }
            },
        };
        self.tracker = ProgressTracker::new(course.pages);
        self.engine = AssessmentEngine::new();
        self.enrollment = None;
        self.note = None;
        self.note_content.clear();
        self.notices.clear();
        Ok(self.selected.insert(course))
    }

    /// Enroll the session's user in the selected course.
    #[instrument(skip(self))]
    pub async fn enroll(&mut self) -> Result<String, DashboardError> {
        let user_id = match session::require_user_id(self.session.as_ref()) {
            Ok(id) => id,
            Err(e) => return self.fail(e),
        };
        if self.learner_name.trim().is_empty() {
            return self.fail(DashboardError::precondition(
                "Please enter your name before enrolling.",
            ));
        }
        let Some(course) = self.selected.clone() else {
            return self.fail(DashboardError::precondition(
                "Please select a course to enroll in.",
            ));
        };

        let request = EnrollmentRequest {
            user_id,
            module_id: course.id,
        };
        match self.backend.enroll(&request).await {
            Ok(reply) => {
                self.enrollment = Some(Enrollment::pending(user_id, course.id));
                let text = reply
                    .message
                    .unwrap_or_else(|| format!("Successfully enrolled in {}!", course.title));
                tracing::info!(user_id, course = course.id, "enrolled");
                self.notices.success(text.clone());
                Ok(text)
            }
            Err(e) => self.fail_backend("Failed to enroll: ", e),
        }
    }

    // -- notes --------------------------------------------------------------

    /// Show the first page of notes for the selected course.
    #[instrument(skip(self))]
    pub async fn start_course(&mut self) -> Result<&NotePage, DashboardError> {
        if let Err(e) = session::require_user_id(self.session.as_ref()) {
            return self.fail(e);
        }
        let ready = self.enrollment.is_some() && !self.learner_name.trim().is_empty();
        let Some(course) = self.selected.clone().filter(|_| ready) else {
            return self.fail(DashboardError::precondition(
                "Please enter your name, select a course, and enroll before starting.",
            ));
        };
        if !self.tracker.has_notes() {
            return self.fail(DashboardError::precondition(format!(
                "Course \"{}\" has no notes configured.",
                course.title
            )));
        }

        let event = self.tracker.start();
        self.announce(event);
        self.load_page(1).await
    }

    pub async fn next_page(&mut self) -> Result<PageMove, DashboardError> {
        let turn = self.tracker.next_page();
        self.turn(turn, "You have reached the last page of notes.")
            .await
    }

    pub async fn previous_page(&mut self) -> Result<PageMove, DashboardError> {
        let turn = self.tracker.previous_page();
        self.turn(turn, "You are on the first page of notes.").await
    }

    async fn turn(
        &mut self,
        turn: PageTurn,
        edge_message: &str,
    ) -> Result<PageMove, DashboardError> {
        match turn.movement {
            PageMove::Moved(page) => {
                self.announce(turn.event);
                self.load_page(page).await?;
            }
            PageMove::AtFirstPage | PageMove::AtLastPage => {
                self.notices.success(edge_message);
            }
            PageMove::NotStarted => {
                return self.fail(DashboardError::precondition(
                    "Please start a course before reading the notes.",
                ));
            }
        }
        Ok(turn.movement)
    }

    fn announce(&mut self, event: Option<ProgressEvent>) {
        if let (Some(ProgressEvent::AssessmentUnlocked), Some(course)) = (event, &self.selected) {
            let text = format!(
                "Hello {}, you have viewed 70% of {} notes. You can now take the assessment.",
                self.learner_name, course.title
            );
            self.notices.success(text);
        }
    }

    async fn load_page(&mut self, page: u32) -> Result<&NotePage, DashboardError> {
        let Some(title) = self.selected.as_ref().map(|c| c.title.clone()) else {
            return self.fail(DashboardError::precondition(
                "Please select a course to enroll in.",
            ));
        };
        match self.backend.note_page(&title, page).await {
            Ok(note) => {
                self.note_content = note.content.clone();
                Ok(self.note.insert(note))
            }
            Err(e) => {
                tracing::error!(error = %e, page, "failed to load note page");
                self.note = None;
                self.note_content = NOTE_LOAD_FAILED.to_string();
                self.notices
                    .error(e.message_or("Failed to load course notes."));
                Err(e.into())
            }
        }
    }

    // -- assessment ---------------------------------------------------------

    /// Fetch the course's questions and start an attempt.
    #[instrument(skip(self))]
    pub async fn prepare_assessment(&mut self) -> Result<&[Question], DashboardError> {
        let started = self.tracker.current_page().is_some();
        let Some(title) = self
            .selected
            .as_ref()
            .filter(|_| started)
            .map(|c| c.title.clone())
        else {
            return self.fail(DashboardError::precondition(
                "Please start a course before taking the assessment.",
            ));
        };
        if !self.tracker.is_unlocked() {
            return self.fail(DashboardError::precondition(
                "View at least 70% of the notes to unlock the assessment.",
            ));
        }
        match self.backend.assessment_questions(&title).await {
            Ok(questions) => {
                self.engine.load(questions);
                Ok(self.engine.questions())
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load questions");
                self.notices.error(e.message_or(
                    "Failed to load assessment questions. Please check your backend server and ensure questions are configured for this course.",
                ));
                Err(e.into())
            }
        }
    }

    pub fn answer(
        &mut self,
        question_id: QuestionId,
        value: impl Into<String>,
    ) -> Result<(), DashboardError> {
        match self.engine.answer(question_id, value) {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e.into()),
        }
    }

    /// Grade the attempt and record the outcome with the backend.
    ///
    /// A failed completion write is reported as a notice; the grading
    /// result is returned regardless.
    #[instrument(skip(self))]
    pub async fn submit_assessment(&mut self) -> Result<GradingResult, DashboardError> {
        let submission = match self.engine.submit() {
            Ok(s) => s,
            Err(e) => return self.fail(e.into()),
        };
        if submission.completion.passed {
            self.notices.success(PASSED_MESSAGE);
        } else {
            self.notices.success(FAILED_MESSAGE);
        }

        let user_id = session::require_user_id(self.session.as_ref());
        match (user_id, &self.selected) {
            (Ok(user_id), Some(course)) => {
                let record = CompletionRecord {
                    user_id,
                    module_id: course.id,
                    completion_status: if submission.completion.passed {
                        CompletionStatus::Completed
                    } else {
                        CompletionStatus::Failed
                    },
                    score: submission.completion.score,
                    completion_date: Utc::now(),
                };
                if let Some(enrollment) = self
                    .enrollment
                    .as_mut()
                    .filter(|e| e.module_id == record.module_id)
                {
                    enrollment.completion_status = record.completion_status;
                    enrollment.score = Some(record.score);
                    enrollment.completion_date = Some(record.completion_date);
                }
                if let Err(e) = self.backend.record_completion(&record).await {
                    tracing::warn!(error = %e, "failed to record completion");
                    self.notices.error(format!(
                        "Failed to update completion status: {}",
                        e.user_message()
                    ));
                }
            }
            _ => {
                tracing::warn!("completion not recorded: no user or course");
                self.notices.error(
                    "Cannot update completion: user not logged in or course not selected.",
                );
            }
        }
        Ok(submission.result)
    }

    pub fn retake_assessment(&mut self) -> Result<(), DashboardError> {
        match self.engine.retake() {
            Ok(()) => Ok(()),
            Err(e) => self.fail(e.into()),
        }
    }

    /// Certificate contents for a passed attempt, dated today.
    pub fn certificate(&mut self) -> Result<CertificateData, DashboardError> {
        let passed = self.engine.state() == AssessmentState::Passed;
        let Some(score) = self
            .engine
            .result()
            .filter(|_| passed)
            .map(|r| r.percentage)
        else {
            return self.fail(DashboardError::precondition(
                "A certificate is only available after passing the assessment.",
            ));
        };
        let course_title = self
            .selected
            .as_ref()
            .map(|c| c.title.clone())
            .unwrap_or_default();
        Ok(CertificateData {
            learner_name: self.learner_name.clone(),
            course_title,
            score,
            issued_on: Local::now().date_naive(),
        })
    }
}

//! crates/essay_scoring_core/src/session.rs
//!
//! The client-side flow of taking one test: load it, read the passage against a
//! timer, write answers against a second timer, then submit once.

use std::time::Duration;

use crate::domain::{EssayTest, Submission};
use crate::validator::{validate_submission, ValidationError};

pub const READING_TIME: Duration = Duration::from_secs(15 * 60);
pub const WRITING_TIME: Duration = Duration::from_secs(60 * 60);

/// An enum representing where the user is in the test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    Loading,
    Reading,
    Writing,
    Submitting,
    Completed,
    /// Terminal: the requested test does not exist.
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("cannot {action} while the session is {phase:?}")]
    IllegalTransition {
        phase: SessionPhase,
        action: &'static str,
    },
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// What happened as a result of advancing the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    Running,
    /// The reading timer ran out and the session moved to writing.
    ReadingFinished,
    /// The writing timer ran out. The submission must be sent as-is.
    AutoSubmit(Submission),
}

/// The state of one user taking one test.
#[derive(Debug, Clone)]
pub struct TestSession {
    test_id: String,
    test: Option<EssayTest>,
    phase: SessionPhase,
    time_left: Duration,
    answer1: String,
    answer2: String,
    last_error: Option<String>,
    result_id: Option<String>,
}

impl TestSession {
    pub fn new(test_id: impl Into<String>) -> Self {
        Self {
            test_id: test_id.into(),
            test: None,
            phase: SessionPhase::Loading,
            time_left: READING_TIME,
            answer1: String::new(),
            answer2: String::new(),
            last_error: None,
            result_id: None,
        }
    }

    pub fn test_id(&self) -> &str {
        &self.test_id
    }

    pub fn test(&self) -> Option<&EssayTest> {
        self.test.as_ref()
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    pub fn time_left(&self) -> Duration {
        self.time_left
    }

    /// The most recent load, validation or submission error, for display.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn result_id(&self) -> Option<&str> {
        self.result_id.as_deref()
    }

    pub fn answers(&self) -> (&str, &str) {
        (&self.answer1, &self.answer2)
    }

    fn expect_phase(&self, expected: SessionPhase, action: &'static str) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(SessionError::IllegalTransition {
                phase: self.phase.clone(),
                action,
            })
        }
    }

    /// Handles the catalog lookup. `None` means the test does not exist.
    pub fn on_test_loaded(&mut self, test: Option<EssayTest>) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Loading, "load a test")?;
        match test {
            Some(test) => {
                self.test = Some(test);
                self.phase = SessionPhase::Reading;
                self.time_left = READING_TIME;
                self.last_error = None;
            }
            None => {
                self.phase = SessionPhase::NotFound;
                self.last_error = Some(format!("Test {} was not found.", self.test_id));
            }
        }
        Ok(())
    }

    /// Records a failed fetch. The session stays in `Loading` so the load can be retried.
    pub fn on_load_failed(&mut self, reason: impl Into<String>) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Loading, "fail a load")?;
        self.last_error = Some(reason.into());
        Ok(())
    }

    /// Advances the active timer by `elapsed`. Phases without a timer ignore ticks.
    ///
    /// The writing timer forces a submission once. If that submission fails, the
    /// session stays in `Writing` with no time left and only `submit` can send it again.
    pub fn tick(&mut self, elapsed: Duration) -> TickOutcome {
        match self.phase {
            SessionPhase::Reading | SessionPhase::Writing => {}
            _ => return TickOutcome::Running,
        }
        if self.time_left.is_zero() {
            return TickOutcome::Running;
        }

        self.time_left = self.time_left.saturating_sub(elapsed);
        if !self.time_left.is_zero() {
            return TickOutcome::Running;
        }

        if self.phase == SessionPhase::Reading {
            self.enter_writing();
            TickOutcome::ReadingFinished
        } else {
            TickOutcome::AutoSubmit(self.begin_submitting())
        }
    }

    /// The user chose to stop reading early.
    pub fn end_reading(&mut self) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Reading, "end reading")?;
        self.enter_writing();
        Ok(())
    }

    pub fn set_answers(
        &mut self,
        answer1: impl Into<String>,
        answer2: impl Into<String>,
    ) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Writing, "edit answers")?;
        self.answer1 = answer1.into();
        self.answer2 = answer2.into();
        Ok(())
    }

    /// Validates the answers and, if they pass, moves to `Submitting` and returns
    /// the submission to send. A failed validation keeps the session in `Writing`.
    pub fn submit(&mut self) -> Result<Submission, SessionError> {
        self.expect_phase(SessionPhase::Writing, "submit")?;
        if let Err(e) = validate_submission(&self.answer1, &self.answer2) {
            self.last_error = Some(e.to_string());
            return Err(e.into());
        }
        Ok(self.begin_submitting())
    }

    pub fn on_submit_succeeded(&mut self, result_id: impl Into<String>) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Submitting, "complete a submission")?;
        self.result_id = Some(result_id.into());
        self.phase = SessionPhase::Completed;
        Ok(())
    }

    /// Returns to `Writing` so the user can retry. The timer is not reset.
    pub fn on_submit_failed(&mut self, reason: impl Into<String>) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Submitting, "fail a submission")?;
        self.last_error = Some(reason.into());
        self.phase = SessionPhase::Writing;
        Ok(())
    }

    fn enter_writing(&mut self) {
        self.phase = SessionPhase::Writing;
        self.time_left = WRITING_TIME;
    }

    fn begin_submitting(&mut self) -> Submission {
        self.phase = SessionPhase::Submitting;
        self.last_error = None;
        Submission {
            test_id: self.test_id.clone(),
            answer1: self.answer1.trim().to_string(),
            answer2: self.answer2.trim().to_string(),
        }
    }
}

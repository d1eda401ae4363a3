// src/session/controller.rs

use std::collections::BTreeSet;

use chrono::Utc;
use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        quiz::{MAX_QUIZ_POINTS, Question, Quiz},
        result::QuizResult,
    },
    session::monitor::{AttentionMonitor, AttentionSignal, AttentionUpdate},
};

/// Implicit class context for quizzes with no eligibility restriction.
pub const GENERAL_CLASS: &str = "general";

/// Outcome of advancing past the current question.
#[derive(Debug)]
pub enum AdvanceOutcome {
    /// Moved to the next question.
    InProgress { next_index: usize },
    /// The last question was scored; the session is terminal and the
    /// result record is ready to be persisted.
    Finished { result: QuizResult },
}

/// One student's attempt at one quiz, from join to submission.
///
/// State machine: `InProgress(i=0..n-1) -> Finished`. The index and score
/// only grow, and `Finished` is terminal. Nothing here is persisted
/// mid-flight; abandoning the session leaves no trace and the attempt can
/// simply be restarted.
#[derive(Debug)]
pub struct QuizSession {
    id: Uuid,
    quiz: Quiz,
    student_id: Uuid,
    student_name: String,

    /// Classes the student may attend under, computed at join. Empty only
    /// when the quiz is unrestricted (context is then implicitly general).
    class_options: Vec<String>,

    /// Chosen once before the first question, immutable afterwards.
    class_context: Option<String>,

    current_index: usize,
    score: f64,
    selected_answer: Option<String>,
    finished: bool,

    monitor: AttentionMonitor,
}

impl QuizSession {
    /// Creates a session for a student whose room-code lookup and
    /// duplicate-attempt check have already passed.
    ///
    /// Computes the eligibility intersection here: a restricted quiz whose
    /// allowed classes don't overlap the student's memberships is rejected
    /// with `AccessDenied` naming the required classes. With exactly one
    /// overlapping class (or an open quiz) the class context is fixed
    /// immediately; with several, the student must pick one before the
    /// first advance.
    pub fn start(
        quiz: Quiz,
        student_id: Uuid,
        student_name: String,
        student_classes: &BTreeSet<String>,
    ) -> Result<Self, AppError> {
        let (class_options, class_context) = if quiz.is_restricted() {
            let mut intersection: Vec<String> = quiz
                .eligible_classes
                .iter()
                .filter(|c| student_classes.contains(*c))
                .cloned()
                .collect();
            intersection.sort();

            match intersection.len() {
                0 => {
                    return Err(AppError::AccessDenied(format!(
                        "This quiz is restricted to: {}",
                        quiz.eligible_classes.join(", ")
                    )));
                }
                1 => {
                    let only = intersection.remove(0);
                    (vec![only.clone()], Some(only))
                }
                _ => (intersection, None),
            }
        } else {
            (Vec::new(), Some(GENERAL_CLASS.to_string()))
        };

        Ok(Self {
            id: Uuid::new_v4(),
            quiz,
            student_id,
            student_name,
            class_options,
            class_context,
            current_index: 0,
            score: 0.0,
            selected_answer: None,
            finished: false,
            monitor: AttentionMonitor::new(),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn finished(&self) -> bool {
        self.finished
    }

    pub fn class_options(&self) -> &[String] {
        &self.class_options
    }

    pub fn class_context(&self) -> Option<&str> {
        self.class_context.as_deref()
    }

    pub fn current_question(&self) -> &Question {
        &self.quiz.questions[self.current_index]
    }

    pub fn monitor(&self) -> &AttentionMonitor {
        &self.monitor
    }

    /// Fixes the class the attempt is recorded under. Allowed only before
    /// any question has been answered, only once, and only from the set
    /// offered at join.
    pub fn select_class_context(&mut self, class_name: &str) -> Result<(), AppError> {
        if self.finished {
            return Err(AppError::SessionAlreadyFinished);
        }
        if self.class_context.is_some() {
            return Err(AppError::BadRequest(
                "Class context is already set for this session".to_string(),
            ));
        }
        if !self.class_options.iter().any(|c| c == class_name) {
            return Err(AppError::BadRequest(format!(
                "'{}' is not among the offered classes: {}",
                class_name,
                self.class_options.join(", ")
            )));
        }

        self.class_context = Some(class_name.to_string());
        Ok(())
    }

    /// Records the candidate answer for the current question. May be called
    /// repeatedly to change the selection before advancing; never touches
    /// the score. No validation beyond "session not finished".
    pub fn select_answer(&mut self, option_value: String) -> Result<(), AppError> {
        if self.finished {
            return Err(AppError::SessionAlreadyFinished);
        }

        self.selected_answer = Some(option_value);
        Ok(())
    }

    /// Scores the current question and moves on, or finishes the session
    /// if this was the last one.
    ///
    /// An absent selection never matches, so skipped questions score zero.
    /// On finish the score is clamped to 100 and the alarm is forced off;
    /// the returned result record is the caller's to persist.
    pub fn advance(&mut self) -> Result<AdvanceOutcome, AppError> {
        if self.finished {
            return Err(AppError::SessionAlreadyFinished);
        }

        let class_context = match &self.class_context {
            Some(c) => c.clone(),
            None => {
                return Err(AppError::BadRequest(format!(
                    "Choose a class before starting: {}",
                    self.class_options.join(", ")
                )));
            }
        };

        let question = &self.quiz.questions[self.current_index];
        if self.selected_answer.as_deref() == Some(question.answer.as_str()) {
            self.score += question.points;
        }
        self.selected_answer = None;

        if self.current_index + 1 < self.quiz.question_count() {
            self.current_index += 1;
            return Ok(AdvanceOutcome::InProgress {
                next_index: self.current_index,
            });
        }

        // Defensive cap: authoring validation keeps per-quiz totals at or
        // under 100, but quizzes written by other tooling may not honor it.
        self.finished = true;
        self.score = self.score.min(MAX_QUIZ_POINTS);
        self.monitor.force_off();

        let result = QuizResult {
            id: Uuid::new_v4(),
            quiz_id: self.quiz.id,
            quiz_code: self.quiz.code.clone(),
            quiz_title: self.quiz.title.clone(),
            student_id: self.student_id,
            student_name: self.student_name.clone(),
            class_context,
            score: self.score,
            published: false,
            submitted_at: Utc::now(),
        };

        Ok(AdvanceOutcome::Finished { result })
    }

    /// The attempt counts as in progress only once the class context is
    /// resolved and until it finishes. A session still waiting on a class
    /// choice has not started.
    pub fn is_in_progress(&self) -> bool {
        !self.finished && self.class_context.is_some()
    }

    /// Feeds one attention signal to the anti-cheat monitor. Signals
    /// outside the in-progress state are ignored by the monitor's own
    /// contract.
    pub fn attention(&mut self, signal: AttentionSignal) -> AttentionUpdate {
        self.monitor.observe(signal, self.is_in_progress())
    }
}

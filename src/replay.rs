//! Step-by-step replay of a validation run
//!
//! [`StepReplay`] wraps the step sequence one pipeline run produced with
//! a cursor, so a presentation layer can walk the rules one at a time.
//! The controller knows nothing about rule content; it only indexes the
//! fixed sequence and aggregates statuses per stage. All cursor movement
//! clamps into `[0, N-1]`, and the last step is an ordinary resting
//! state - replay can always be rewound.
//!
//! Auto-advance is deliberately tick-driven: the host environment owns
//! the timer and calls [`StepReplay::tick`] every [`StepReplay::interval`]
//! while [`StepReplay::is_auto_advancing`] holds. Stopping merely clears
//! the running flag; it never moves the cursor back.

use crate::constants::AUTO_ADVANCE_INTERVAL_MS;
use crate::stage::{StageDescriptor, STAGES};
use crate::types::{StepStatus, ValidationStep};
use serde::Serialize;
use std::time::Duration;

/// Aggregate status of one stage, up to the current cursor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageProgress {
    pub stage: u8,
    pub name: &'static str,
    /// Steps this stage contributes to the sequence
    pub total: usize,
    /// How many of them lie at or before the cursor
    pub completed: usize,
    /// True while none of the completed steps failed (pass and info both
    /// count as clear; an empty prefix is trivially clear)
    pub all_clear: bool,
}

/// Cursor state machine over one validation run
#[derive(Debug, Clone)]
pub struct StepReplay {
    steps: Vec<ValidationStep>,
    cursor: usize,
    auto_advancing: bool,
    interval: Duration,
}

impl StepReplay {
    /// Wrap a step sequence; cursor at 0, auto-advance off.
    pub fn new(steps: Vec<ValidationStep>) -> Self {
        Self::with_interval(steps, Duration::from_millis(AUTO_ADVANCE_INTERVAL_MS))
    }

    /// Same, with a custom auto-advance interval.
    pub fn with_interval(steps: Vec<ValidationStep>, interval: Duration) -> Self {
        StepReplay {
            steps,
            cursor: 0,
            auto_advancing: false,
            interval,
        }
    }

    pub fn steps(&self) -> &[ValidationStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The step under the cursor; `None` only for an empty sequence.
    pub fn current(&self) -> Option<&ValidationStep> {
        self.steps.get(self.cursor)
    }

    pub fn at_last_step(&self) -> bool {
        self.steps.is_empty() || self.cursor == self.steps.len() - 1
    }

    /// Advance one step, clamped at the end. Returns the new cursor.
    pub fn next_step(&mut self) -> usize {
        self.jump_to(self.cursor.saturating_add(1))
    }

    /// Rewind one step, clamped at 0. Returns the new cursor.
    pub fn prev_step(&mut self) -> usize {
        self.jump_to(self.cursor.saturating_sub(1))
    }

    /// Move the cursor to `index`, clamped into `[0, N-1]`.
    pub fn jump_to(&mut self, index: usize) -> usize {
        let last = self.steps.len().saturating_sub(1);
        self.cursor = index.min(last);
        self.cursor
    }

    /// Begin auto-advancing. A sequence already resting on its last step
    /// has nowhere to go, so the flag stays off.
    pub fn start_auto_advance(&mut self) {
        self.auto_advancing = !self.at_last_step();
    }

    /// Cancel auto-advance. Stops future ticks; the cursor stays put.
    pub fn stop_auto_advance(&mut self) {
        self.auto_advancing = false;
    }

    pub fn is_auto_advancing(&self) -> bool {
        self.auto_advancing
    }

    /// How often the host timer should call [`Self::tick`].
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// One timer tick: advance if auto-advance is running, and stop the
    /// run when the last step is reached. Returns true if the cursor
    /// moved.
    pub fn tick(&mut self) -> bool {
        if !self.auto_advancing {
            return false;
        }

        let before = self.cursor;
        self.next_step();
        if self.at_last_step() {
            self.auto_advancing = false;
        }
        self.cursor != before
    }

    /// Per-stage completion and pass/info aggregation up to the cursor,
    /// in stage order - the data behind a stage-chip progress row.
    pub fn stage_progress(&self) -> Vec<StageProgress> {
        STAGES.iter().map(|stage| self.progress_for(stage)).collect()
    }

    fn progress_for(&self, stage: &StageDescriptor) -> StageProgress {
        let mut total = 0;
        let mut completed = 0;
        let mut all_clear = true;

        for (index, step) in self.steps.iter().enumerate() {
            if step.stage != stage.stage {
                continue;
            }
            total += 1;
            if index <= self.cursor {
                completed += 1;
                if step.status == StepStatus::Fail {
                    all_clear = false;
                }
            }
        }

        StageProgress {
            stage: stage.stage,
            name: stage.name,
            total,
            completed,
            all_clear,
        }
    }
}

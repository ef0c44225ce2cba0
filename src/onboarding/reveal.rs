//! Completion reveal: the timed celebration that ends onboarding.
//!
//! One tap on the completion screen starts a fixed [`Timeline`] of cues.
//! The phase only moves forward:
//!
//! ```text
//! idle -> bursting -> celebrating -> revealing -> complete
//! ```
//!
//! With reduced motion the visual phases are skipped and only the success
//! confirmation plays before `complete`. Reaching `complete` marks
//! onboarding done on the shared tracker.
//!
//! The choreographer owns every timer it starts. Unmounting (or dropping)
//! it cancels whatever has not fired yet, including in-flight haptics. A
//! cue that has already started, such as the completion write, runs to the
//! end so the tracker and the root stack never disagree.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::AbortHandle;
use tracing::{debug, info};

use super::effects::{self, Cue, RevealEffect, TouchPoint};
use super::timeline::TimelineHandle;
use super::tracker::OnboardingTracker;
use crate::accessibility::MotionPreference;
use crate::config::RevealTimings;
use crate::feedback::{Feedback, FeedbackCue};

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealPhase {
    Idle,
    Bursting,
    Celebrating,
    Revealing,
    Complete,
}

impl std::fmt::Display for RevealPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Bursting => write!(f, "bursting"),
            Self::Celebrating => write!(f, "celebrating"),
            Self::Revealing => write!(f, "revealing"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// Something the screen should render or react to.
#[derive(Debug, Clone, PartialEq)]
pub enum RevealEvent {
    Phase(RevealPhase),
    Effect(RevealEffect),
}

/// Timer bookkeeping reported at unmount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimerStats {
    pub scheduled: usize,
    pub fired: usize,
    pub cancelled: usize,
}

/// Shared pieces the timeline task needs to act on a cue.
#[derive(Clone)]
struct CueDispatcher {
    tracker: OnboardingTracker,
    feedback: Arc<dyn Feedback>,
    phase_tx: Arc<watch::Sender<RevealPhase>>,
    events_tx: broadcast::Sender<RevealEvent>,
    feedback_tasks: Arc<Mutex<Vec<AbortHandle>>>,
}

impl CueDispatcher {
    async fn dispatch(&self, cue: Cue) {
        match cue {
            Cue::Phase(RevealPhase::Complete) => {
                self.tracker.complete().await;
                self.enter(RevealPhase::Complete);
            }
            Cue::Phase(phase) => {
                self.enter(phase);
            }
            Cue::Effect(effect) => {
                debug!(?effect, "Reveal effect");
                // No subscribers is fine.
                let _ = self.events_tx.send(RevealEvent::Effect(effect));
            }
            Cue::Feedback(cue) => self.play(cue),
        }
    }

    /// Move to `phase` if it is ahead of the current one.
    fn enter(&self, phase: RevealPhase) -> bool {
        let moved = self.phase_tx.send_if_modified(|current| {
            if phase > *current {
                *current = phase;
                true
            } else {
                false
            }
        });
        if moved {
            info!(%phase, "Reveal phase changed");
            let _ = self.events_tx.send(RevealEvent::Phase(phase));
        }
        moved
    }

    /// Fire and forget; never blocks the timeline.
    fn play(&self, cue: FeedbackCue) {
        let feedback = Arc::clone(&self.feedback);
        let task = tokio::spawn(async move { cue.play(feedback.as_ref()).await });
        let mut tasks = self
            .feedback_tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        tasks.retain(|t| !t.is_finished());
        tasks.push(task.abort_handle());
    }

    fn abort_feedback(&self) {
        let mut tasks = self
            .feedback_tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

/// Drives the completion reveal for one mounted completion screen.
pub struct RevealChoreographer {
    dispatcher: CueDispatcher,
    motion: watch::Receiver<bool>,
    timings: RevealTimings,
    touch: Option<TouchPoint>,
    reduced_motion: Option<bool>,
    timeline: Option<TimelineHandle>,
}

impl RevealChoreographer {
    /// Mount the choreographer in the `idle` phase.
    pub fn mount(
        tracker: OnboardingTracker,
        feedback: Arc<dyn Feedback>,
        motion: &dyn MotionPreference,
        timings: RevealTimings,
    ) -> Self {
        let (phase_tx, _rx) = watch::channel(RevealPhase::Idle);
        let (events_tx, _rx) = broadcast::channel(EVENT_CAPACITY);
        Self {
            dispatcher: CueDispatcher {
                tracker,
                feedback,
                phase_tx: Arc::new(phase_tx),
                events_tx,
                feedback_tasks: Arc::new(Mutex::new(Vec::new())),
            },
            motion: motion.subscribe(),
            timings,
            touch: None,
            reduced_motion: None,
            timeline: None,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        *self.dispatcher.phase_tx.borrow()
    }

    pub fn subscribe_phase(&self) -> watch::Receiver<RevealPhase> {
        self.dispatcher.phase_tx.subscribe()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<RevealEvent> {
        self.dispatcher.events_tx.subscribe()
    }

    /// Where the triggering tap landed, once there has been one.
    pub fn touch_point(&self) -> Option<TouchPoint> {
        self.touch
    }

    /// The reduce-motion value the running sequence was started with.
    pub fn reduced_motion(&self) -> Option<bool> {
        self.reduced_motion
    }

    /// Whether the platform currently asks for reduced motion.
    pub fn reduce_motion_requested(&self) -> bool {
        *self.motion.borrow()
    }

    /// Number of timers started by the tap; 0 before it.
    pub fn scheduled_timers(&self) -> usize {
        self.timeline.as_ref().map_or(0, TimelineHandle::scheduled)
    }

    /// Start the reveal. Returns `false` (and changes nothing) if a sequence
    /// is already running or finished.
    pub fn tap(&mut self, at: TouchPoint) -> bool {
        if self.timeline.is_some() || self.phase() != RevealPhase::Idle {
            debug!(phase = %self.phase(), "Ignoring repeated reveal tap");
            return false;
        }

        let reduced = self.reduce_motion_requested();
        self.touch = Some(at);
        self.reduced_motion = Some(reduced);

        let plan = if reduced {
            effects::reduced_plan(&self.timings)
        } else {
            self.dispatcher.enter(RevealPhase::Bursting);
            effects::full_plan(&self.timings, at, &mut rand::thread_rng())
        };
        info!(
            x = at.x,
            y = at.y,
            reduced_motion = reduced,
            timers = plan.len(),
            "Completion reveal started"
        );

        let dispatcher = self.dispatcher.clone();
        self.timeline = Some(plan.spawn(move |cue| {
            let dispatcher = dispatcher.clone();
            async move { dispatcher.dispatch(cue).await }
        }));
        true
    }

    /// Tear down the screen: cancel every pending timer and any haptic
    /// pattern still playing.
    pub fn unmount(mut self) -> TimerStats {
        self.cancel_all()
    }

    fn cancel_all(&mut self) -> TimerStats {
        self.dispatcher.abort_feedback();
        let Some(mut timeline) = self.timeline.take() else {
            return TimerStats::default();
        };
        let cancelled = timeline.cancel();
        let stats = TimerStats {
            scheduled: timeline.scheduled(),
            fired: timeline.fired(),
            cancelled,
        };
        if cancelled > 0 {
            info!(cancelled, phase = %self.phase(), "Reveal cancelled before completion");
        }
        stats
    }
}

impl Drop for RevealChoreographer {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

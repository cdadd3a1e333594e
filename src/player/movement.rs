//! Discrete, timed avatar movement.
//!
//! A move request becomes a queue of `Transition`s. Time is fed in with
//! `MotionController::advance`; whenever a transition's duration has fully
//! elapsed it is committed (grid position and facing update, a
//! `MotionEvent::Moved` is emitted). Between commits `pose` reports eased
//! progress for whoever draws the avatar.
//!
//! State machine: `Idle -> Moving -> Idle`. A new request while moving
//! throws away the rest of the queue, including the half-played transition,
//! and starts from the last committed column.

use super::Facing;
use bevy::math::IVec2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::f32::consts::{PI, TAU};

/// Durations for scheduled transitions, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionTimings {
    #[serde(default = "MotionTimings::default_path_move")]
    pub path_move_secs: f32, // Eased translation per path step
    #[serde(default = "MotionTimings::default_path_rotate")]
    pub path_rotate_secs: f32, // Shortest-arc turn per path step
    #[serde(default = "MotionTimings::default_step")]
    pub step_secs: f32, // Single keyboard step
}

impl MotionTimings {
    fn default_path_move() -> f32 { 0.28 }
    fn default_path_rotate() -> f32 { 0.15 }
    fn default_step() -> f32 { 0.25 }
}

impl Default for MotionTimings {
    fn default() -> Self {
        Self {
            path_move_secs: Self::default_path_move(),
            path_rotate_secs: Self::default_path_rotate(),
            step_secs: Self::default_step(),
        }
    }
}

/// One scheduled rotate+move between neighbouring columns.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: IVec2,
    pub to: IVec2,
    pub facing: Facing,
    pub yaw_from: f32,
    pub yaw_to: f32,
    pub move_secs: f32,
    pub rotate_secs: f32,
}

impl Transition {
    /// Time until the transition commits.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.move_secs.max(self.rotate_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    #[default]
    Idle,
    Moving,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionEvent {
    /// A transition committed; the avatar now stands on `to`.
    Moved { from: IVec2, to: IVec2, facing: Facing },
    /// The next column stopped being navigable; the rest of the queue was dropped.
    Halted { at: IVec2 },
    /// The queue drained and the idle animation should resume.
    Idle,
}

/// Interpolated avatar pose for drawing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPose {
    pub from: IVec2,
    pub to: IVec2,
    /// Eased translation progress in [0, 1].
    pub progress: f32,
    pub yaw: f32,
}

/// Smoothstep ease-in-out.
#[must_use]
pub fn ease_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Signed angle from `from` to `to` along the shorter way round, in (-PI, PI].
#[must_use]
pub fn shortest_arc(from: f32, to: f32) -> f32 {
    let mut d = (to - from).rem_euclid(TAU);
    if d > PI {
        d -= TAU;
    }
    d
}

#[derive(Debug, Clone)]
pub struct MotionController {
    timings: MotionTimings,
    position: Option<IVec2>,
    facing: Facing,
    yaw: f32,
    queue: VecDeque<Transition>,
    elapsed: f32,
    state: MotionState,
}

impl MotionController {
    #[must_use]
    pub fn new(timings: MotionTimings) -> Self {
        Self {
            timings,
            position: None,
            facing: Facing::default(),
            yaw: Facing::default().yaw(),
            queue: VecDeque::new(),
            elapsed: 0.0,
            state: MotionState::Idle,
        }
    }

    pub fn set_timings(&mut self, timings: MotionTimings) {
        self.timings = timings;
    }

    /// Put the avatar on a column (or remove it) with default facing and no
    /// pending motion.
    pub fn spawn(&mut self, at: Option<IVec2>) {
        self.position = at;
        self.facing = Facing::default();
        self.yaw = self.facing.yaw();
        self.cancel();
    }

    /// Last committed column.
    #[must_use]
    pub fn position(&self) -> Option<IVec2> {
        self.position
    }

    #[must_use]
    pub fn facing(&self) -> Facing {
        self.facing
    }

    #[must_use]
    pub fn state(&self) -> MotionState {
        self.state
    }

    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.state == MotionState::Moving
    }

    /// Transitions not yet committed, front first.
    pub fn pending(&self) -> impl Iterator<Item = &Transition> {
        self.queue.iter()
    }

    /// Drop all pending transitions.
    pub fn cancel(&mut self) {
        self.queue.clear();
        self.elapsed = 0.0;
        self.state = MotionState::Idle;
    }

    /// Schedule transitions along `path`, replacing anything in flight.
    ///
    /// A path that adds no step (empty, or only the current column) leaves
    /// the current motion untouched.
    ///
    /// # Arguments
    /// * `path` - consecutive 4-neighbour columns, starting at the current position
    ///
    /// # Return
    /// * `bool` - whether any transition was scheduled
    pub fn follow_path(&mut self, path: &[IVec2]) -> bool {
        let Some(current) = self.position else { return false };

        let mut scheduled = VecDeque::new();
        let mut yaw = self.yaw;
        let mut at = current;
        for &next in path.iter().skip_while(|c| **c == current) {
            let Some(facing) = Facing::from_step(next - at) else {
                debug_assert!(false, "path step {at} -> {next} is not a unit move");
                break;
            };
            let yaw_to = facing.yaw();
            let rotate_secs = if shortest_arc(yaw, yaw_to).abs() > f32::EPSILON {
                self.timings.path_rotate_secs
            } else {
                0.0
            };
            scheduled.push_back(Transition {
                from: at,
                to: next,
                facing,
                yaw_from: yaw,
                yaw_to,
                move_secs: self.timings.path_move_secs,
                rotate_secs,
            });
            yaw = yaw_to;
            at = next;
        }

        if scheduled.is_empty() {
            return false;
        }
        self.cancel();
        self.queue = scheduled;
        self.state = MotionState::Moving;
        true
    }

    /// Schedule a single step, replacing anything in flight. The caller has
    /// already checked the destination.
    pub fn step(&mut self, delta: IVec2) -> bool {
        let (Some(current), Some(facing)) = (self.position, Facing::from_step(delta)) else {
            return false;
        };
        self.cancel();
        self.queue.push_back(Transition {
            from: current,
            to: current + delta,
            facing,
            yaw_from: self.yaw,
            yaw_to: facing.yaw(),
            move_secs: self.timings.step_secs,
            rotate_secs: self.timings.step_secs,
        });
        self.state = MotionState::Moving;
        true
    }

    /// Advance scheduled motion by `dt` seconds, committing every transition
    /// whose time is up.
    ///
    /// # Arguments
    /// * `dt` - elapsed seconds
    /// * `is_navigable` - re-checks each destination at commit time
    pub fn advance(&mut self, dt: f32, is_navigable: impl Fn(IVec2) -> bool) -> Vec<MotionEvent> {
        let mut events = Vec::new();
        if self.queue.is_empty() {
            return events;
        }
        self.elapsed += dt.max(0.0);
        while let Some(duration) = self.queue.front().map(Transition::duration) {
            if self.elapsed < duration {
                break;
            }
            self.elapsed -= duration;
            if !self.commit_front(&is_navigable, &mut events) {
                break;
            }
        }
        self.settle(&mut events);
        events
    }

    /// Commit every pending transition immediately.
    pub fn finish(&mut self, is_navigable: impl Fn(IVec2) -> bool) -> Vec<MotionEvent> {
        let mut events = Vec::new();
        while !self.queue.is_empty() {
            if !self.commit_front(&is_navigable, &mut events) {
                break;
            }
        }
        self.settle(&mut events);
        events
    }

    fn commit_front(&mut self, is_navigable: &impl Fn(IVec2) -> bool, events: &mut Vec<MotionEvent>) -> bool {
        let Some(t) = self.queue.pop_front() else { return false };
        if !is_navigable(t.to) {
            self.queue.clear();
            if let Some(at) = self.position {
                events.push(MotionEvent::Halted { at });
            }
            return false;
        }
        self.position = Some(t.to);
        self.facing = t.facing;
        self.yaw = t.yaw_to;
        events.push(MotionEvent::Moved {
            from: t.from,
            to: t.to,
            facing: t.facing,
        });
        true
    }

    fn settle(&mut self, events: &mut Vec<MotionEvent>) {
        if self.queue.is_empty() && self.state == MotionState::Moving {
            self.state = MotionState::Idle;
            self.elapsed = 0.0;
            events.push(MotionEvent::Idle);
        }
    }

    /// Interpolated pose of the front transition, or the resting pose.
    #[must_use]
    pub fn pose(&self) -> Option<MotionPose> {
        let position = self.position?;
        let Some(t) = self.queue.front() else {
            return Some(MotionPose {
                from: position,
                to: position,
                progress: 1.0,
                yaw: self.yaw,
            });
        };
        let move_t = if t.move_secs > 0.0 { self.elapsed / t.move_secs } else { 1.0 };
        let rotate_t = if t.rotate_secs > 0.0 { (self.elapsed / t.rotate_secs).min(1.0) } else { 1.0 };
        Some(MotionPose {
            from: t.from,
            to: t.to,
            progress: ease_in_out(move_t),
            yaw: t.yaw_from + shortest_arc(t.yaw_from, t.yaw_to) * rotate_t,
        })
    }
}

impl Default for MotionController {
    fn default() -> Self {
        Self::new(MotionTimings::default())
    }
}

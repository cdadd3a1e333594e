//! Notifications produced by `CaveWorld`.
//!
//! The facade queues these as it mutates state; `CaveWorld::drain_events`
//! hands them to whoever observes the world (the Bevy event forwarder, or a
//! test).

use super::construction::BuildFailure;
use crate::block::{BlockKind, ResourceKind};
use crate::grid::GridDims;
use crate::placement::PlacementEvaluation;
use crate::player::Facing;
use bevy::math::{IVec2, IVec3};
use bevy::prelude::Event;

/// Current build-mode preview.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementPreview {
    pub building: String,
    pub evaluation: PlacementEvaluation,
}

#[derive(Event, Debug, Clone, PartialEq)]
pub enum WorldEvent {
    AvatarMoved { from: IVec2, to: IVec2, facing: Facing },
    /// Queued motion was dropped because the next column became unwalkable.
    AvatarHalted { at: IVec2 },
    AvatarIdle { at: IVec2 },
    BlockDug {
        cell: IVec3,
        kind: BlockKind,
        yielded: Option<ResourceKind>,
    },
    /// `None` when build mode ends.
    PlacementPreviewChanged { preview: Option<PlacementPreview> },
    PlacementRejected { origin: IVec2 },
    BuildQueued { id: u32, building: String, origin: IVec2 },
    BuildCompleted { id: u32, building: String, origin: IVec2 },
    BuildFailed { id: u32, building: String, reason: BuildFailure },
    WorldRebuilt { dims: GridDims, seed: u64, spawn: Option<IVec2> },
}

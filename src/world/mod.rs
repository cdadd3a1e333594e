//! The cave world facade.
//!
//! `CaveWorld` owns the grid and everything derived from it (surface cache,
//! relic index), the terrain generator, the avatar's motion controller, the
//! camera rig, the resource ledger and the construction queue. It is the one
//! entry point the input and simulation systems talk to:
//!
//! * gestures (`orbit`, `pan`, `zoom`) and commands (`move_by`, `move_to`,
//!   `dig_forward`, placement calls) run synchronously when input arrives;
//! * `advance_motion` plays scheduled avatar transitions by frame time;
//! * `tick` runs queued build orders at a fixed interval.
//!
//! Nothing here needs locking: the world is a single Bevy resource and every
//! caller holds it mutably for the duration of one call. Outcomes are queued
//! as `WorldEvent`s and collected with `drain_events`.
//!
//! # Example:
//!
//! ```
//! use bevy::math::IVec2;
//! use cave_of_nations::settings::Settings;
//! use cave_of_nations::world::CaveWorld;
//!
//! let mut settings = Settings::default();
//! settings.world.width = 12;
//! settings.world.depth = 12;
//! settings.world.seed = Some(9);
//! let mut world = CaveWorld::new(&settings);
//!
//! let start = world.avatar().expect("spawned");
//! let depth_map = world.surface_depth_map().to_rows();
//! assert_eq!(depth_map.len(), 12);
//! if world.move_by(IVec2::new(1, 0)) {
//!     world.finish_motion();
//!     assert_eq!(world.avatar(), Some(start + IVec2::new(1, 0)));
//! }
//! ```

pub mod construction;
pub mod events;
pub mod ledger;
pub mod relics;

pub use construction::{BuildFailure, BuildOrder, ConstructionQueue, PlacedBuilding};
pub use events::{PlacementPreview, WorldEvent};
pub use ledger::{LedgerError, ResourceLedger};
pub use relics::RelicIndex;

use crate::block::{BlockKind, ResourceKind};
use crate::grid::{DepthMap, GridDims, SurfaceCache, VoxelGrid};
use crate::pathfinding::Pathfinder;
use crate::placement::{evaluate_placement, BuildingTemplate, Footprint, PlacementEvaluation};
use crate::player::{CameraRig, CameraTransform, Facing, MotionController, MotionEvent};
use crate::settings::Settings;
use crate::terrain::TerrainGenerator;
use bevy::log::{debug, info, warn};
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use std::collections::BTreeMap;

/// Build mode: the template being placed and its latest preview.
#[derive(Debug, Clone)]
struct PlacementSession {
    template: BuildingTemplate,
    preview: Option<PlacementEvaluation>,
}

#[derive(Resource)]
pub struct CaveWorld {
    grid: VoxelGrid,
    surface: SurfaceCache,
    generator: TerrainGenerator,
    relics: RelicIndex,
    motion: MotionController,
    camera: CameraRig,
    ledger: ResourceLedger,
    construction: ConstructionQueue,
    placement: Option<PlacementSession>,
    events: Vec<WorldEvent>,
    tile_size: f32,
    fixed_seed: Option<u64>,
    seeds: StdRng,
    seed: u64,
}

fn seed_source(fixed: Option<u64>) -> StdRng {
    match fixed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

impl CaveWorld {
    /// Build a world from settings and generate its first layout.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let dims = settings.world.dims();
        let mut world = Self::assemble(VoxelGrid::new(dims), settings);
        world.rebuild(None);
        world
    }

    /// Wrap an already filled grid without generating terrain. The relic
    /// index is taken from the grid's current contents.
    #[must_use]
    pub fn from_grid(grid: VoxelGrid, settings: &Settings) -> Self {
        let mut world = Self::assemble(grid, settings);
        world.relics.reset(world.grid.cells_of_kind(BlockKind::Relic));
        world.respawn();
        world
    }

    fn assemble(grid: VoxelGrid, settings: &Settings) -> Self {
        Self {
            grid,
            surface: SurfaceCache::new(),
            generator: TerrainGenerator::new(settings.terrain.clone()),
            relics: RelicIndex::new(),
            motion: MotionController::new(settings.motion.clone()),
            camera: CameraRig::new(settings.camera.clone()),
            ledger: ResourceLedger::new(),
            construction: ConstructionQueue::new(),
            placement: None,
            events: Vec::new(),
            tile_size: settings.world.tile_size(),
            fixed_seed: settings.world.seed,
            seeds: seed_source(settings.world.seed),
            seed: 0,
        }
    }

    /// Regenerate the world with the next seed in the sequence.
    ///
    /// # Arguments
    /// * `dims` - new dimensions, or `None` to keep the current ones
    pub fn rebuild(&mut self, dims: Option<GridDims>) {
        let seed = self.seeds.next_u64();
        self.rebuild_with_seed(dims, seed);
    }

    /// Regenerate the world from an explicit seed.
    ///
    /// A dimension change reallocates the grid; otherwise it is cleared in
    /// place. Caches, the relic index, pending builds, the ledger and any
    /// placement preview are reset, the avatar respawns and the camera
    /// reframes the grid.
    pub fn rebuild_with_seed(&mut self, dims: Option<GridDims>, seed: u64) {
        match dims {
            Some(d) if d != self.grid.dims() => self.grid = VoxelGrid::new(d),
            _ => self.grid.clear(),
        }
        self.surface.invalidate_all();
        let generated = self.generator.generate(&mut self.grid, seed);
        self.relics.reset(generated.relics);
        self.construction.clear();
        self.ledger.clear();
        self.cancel_placement();
        self.seed = seed;
        self.respawn();

        let dims = self.grid.dims();
        let spawn = self.motion.position();
        info!(
            "world rebuilt: {}x{}x{} seed {seed}, {} relics, spawn {spawn:?}",
            dims.width,
            dims.height,
            dims.depth,
            self.relics.len()
        );
        self.events.push(WorldEvent::WorldRebuilt { dims, seed, spawn });
    }

    fn respawn(&mut self) {
        let spawn = self.find_spawn();
        if spawn.is_none() {
            warn!("no navigable column to spawn on");
        }
        self.motion.spawn(spawn);

        let dims = self.grid.dims();
        #[allow(clippy::cast_precision_loss)]
        let focus = Vec3::new(
            dims.width as f32 * self.tile_size * 0.5,
            dims.height as f32 * self.tile_size * 0.5,
            dims.depth as f32 * self.tile_size * 0.5,
        );
        self.camera.reset(focus, dims, self.tile_size);
    }

    /// Centre column if walkable, else the walkable column closest to it
    /// (first in scan order on ties).
    fn find_spawn(&self) -> Option<IVec2> {
        let dims = self.grid.dims();
        let center = dims.center_column();
        if self.grid.is_navigable(center.x, center.y) {
            return Some(center);
        }
        dims.iter_columns()
            .filter(|c| self.grid.is_navigable(c.x, c.y))
            .min_by_key(|c| (*c - center).length_squared())
    }

    /// Apply reloaded settings. Dimension or seed changes rebuild the world;
    /// everything else takes effect in place.
    ///
    /// # Return
    /// * `bool` - whether a rebuild happened
    pub fn apply_settings(&mut self, settings: &Settings) -> bool {
        self.generator.set_params(settings.terrain.clone());
        self.motion.set_timings(settings.motion.clone());
        self.camera.set_tuning(settings.camera.clone());

        let dims = settings.world.dims();
        let tile_size = settings.world.tile_size();
        let reseed = settings.world.seed != self.fixed_seed;
        let resize = dims != self.grid.dims();
        #[allow(clippy::float_cmp)]
        let retile = tile_size != self.tile_size;
        self.tile_size = tile_size;

        if reseed {
            self.fixed_seed = settings.world.seed;
            self.seeds = seed_source(self.fixed_seed);
        }
        if reseed || resize || retile {
            self.rebuild(Some(dims));
            return true;
        }
        false
    }

    /// Dig out the surface cell of the column the avatar faces.
    ///
    /// # Return
    /// * `Option<BlockKind>` - the removed kind, or `None` when there is no
    ///   avatar, the faced column is off the grid, or it is already empty
    pub fn dig_forward(&mut self) -> Option<BlockKind> {
        let at = self.motion.position()? + self.motion.facing().step();
        if !self.grid.dims().contains_column(at.x, at.y) {
            return None;
        }
        let y = self.grid.surface_level(at.x, at.y)?;
        let kind = self.grid.set(at.x, y, at.y, BlockKind::Air)?;
        debug_assert!(kind.is_solid(), "surface cell was empty");
        self.surface.invalidate_column(&self.grid, at.x, at.y);

        let cell = IVec3::new(at.x, y, at.y);
        if kind == BlockKind::Relic {
            let removed = self.relics.remove(cell);
            debug_assert!(removed, "relic at {cell} was not indexed");
        }
        let yielded = kind.resource_yield();
        if let Some(resource) = yielded {
            self.ledger.credit(resource, 1);
        }
        debug!("dug {kind} at {cell}");
        self.events.push(WorldEvent::BlockDug { cell, kind, yielded });
        Some(kind)
    }

    /// Step one column in a grid direction.
    ///
    /// # Return
    /// * `bool` - `false` (and nothing changes, facing included) for a
    ///   non-unit delta, an off-grid or unwalkable destination, or no avatar
    pub fn move_by(&mut self, delta: IVec2) -> bool {
        let Some(at) = self.motion.position() else { return false };
        if Facing::from_step(delta).is_none() {
            return false;
        }
        let to = at + delta;
        if !self.grid.is_navigable(to.x, to.y) {
            debug!("step to {to} rejected");
            return false;
        }
        self.motion.step(delta)
    }

    /// Walk to the column under a world-space point.
    pub fn move_to(&mut self, point: Vec3) -> bool {
        match self.grid.dims().world_to_column(point, self.tile_size) {
            Some(column) => self.move_to_column(column),
            None => false,
        }
    }

    /// Walk to `goal` along the shortest walkable path.
    ///
    /// # Return
    /// * `bool` - whether any motion was scheduled; an unreachable goal or
    ///   the avatar's own column leaves the current motion untouched
    pub fn move_to_column(&mut self, goal: IVec2) -> bool {
        let Some(start) = self.motion.position() else { return false };
        let dims = self.grid.dims();
        let grid = &self.grid;
        let path = Pathfinder::new(dims.width, dims.depth).find_path(start, goal, |c| grid.is_navigable(c.x, c.y));
        match path {
            Some(path) => self.motion.follow_path(&path),
            None => {
                debug!("no path from {start} to {goal}");
                false
            }
        }
    }

    /// Play scheduled motion forward by `dt` seconds.
    pub fn advance_motion(&mut self, dt: f32) {
        let grid = &self.grid;
        let events = self.motion.advance(dt, |c| grid.is_navigable(c.x, c.y));
        self.record_motion(events);
    }

    /// Commit all scheduled motion immediately.
    pub fn finish_motion(&mut self) {
        let grid = &self.grid;
        let events = self.motion.finish(|c| grid.is_navigable(c.x, c.y));
        self.record_motion(events);
    }

    fn record_motion(&mut self, events: Vec<MotionEvent>) {
        for event in events {
            let event = match event {
                MotionEvent::Moved { from, to, facing } => WorldEvent::AvatarMoved { from, to, facing },
                MotionEvent::Halted { at } => {
                    info!("avatar halted at {at}: path blocked");
                    WorldEvent::AvatarHalted { at }
                }
                MotionEvent::Idle => match self.motion.position() {
                    Some(at) => WorldEvent::AvatarIdle { at },
                    None => continue,
                },
            };
            self.events.push(event);
        }
    }

    /// Pure footprint check at `origin`.
    #[must_use]
    pub fn evaluate_placement(&self, origin: IVec2, footprint: Footprint) -> PlacementEvaluation {
        evaluate_placement(&self.grid, origin, footprint, self.tile_size)
    }

    /// Terrain check plus occupancy: a footprint touching a placed building
    /// is invalid.
    fn evaluate_site(&self, origin: IVec2, footprint: Footprint) -> PlacementEvaluation {
        let mut evaluation = self.evaluate_placement(origin, footprint);
        if evaluation.valid && footprint.cells(origin).any(|c| self.construction.occupant(c).is_some()) {
            evaluation.valid = false;
        }
        evaluation
    }

    /// Enter build mode with `template`, replacing any current session.
    pub fn begin_placement(&mut self, template: BuildingTemplate) {
        debug!("placing {}", template.name);
        self.placement = Some(PlacementSession { template, preview: None });
    }

    /// Move the preview to `origin`.
    ///
    /// # Return
    /// * `Option<PlacementEvaluation>` - the fresh evaluation, `None` outside build mode
    pub fn update_preview(&mut self, origin: IVec2) -> Option<PlacementEvaluation> {
        let footprint = self.placement.as_ref()?.template.footprint;
        let evaluation = self.evaluate_site(origin, footprint);
        let session = self.placement.as_mut()?;
        if session.preview != Some(evaluation) {
            session.preview = Some(evaluation);
            let preview = PlacementPreview {
                building: session.template.kind.clone(),
                evaluation,
            };
            self.events.push(WorldEvent::PlacementPreviewChanged { preview: Some(preview) });
        }
        Some(evaluation)
    }

    /// Move the preview to the column under a world-space point.
    pub fn update_preview_at(&mut self, point: Vec3) -> Option<PlacementEvaluation> {
        let column = self.grid.dims().world_to_column(point, self.tile_size)?;
        self.update_preview(column)
    }

    /// Queue the previewed building. The site (terrain and placed buildings)
    /// is re-evaluated first; cost is not checked until the order runs on
    /// `tick`.
    ///
    /// # Return
    /// * `Option<u32>` - the build order id, or `None` when there is nothing
    ///   to commit or the site is invalid (build mode stays active)
    pub fn commit_placement(&mut self) -> Option<u32> {
        let session = self.placement.as_ref()?;
        let origin = session.preview?.origin;
        let evaluation = self.evaluate_site(origin, session.template.footprint);
        if !evaluation.valid {
            debug!("placement at {origin} rejected");
            self.events.push(WorldEvent::PlacementRejected { origin });
            return None;
        }
        let session = self.placement.take()?;
        let blueprint = session.template.blueprint(&evaluation);
        let id = self.construction.enqueue(blueprint);
        info!("queued {} #{id} at {origin}", session.template.kind);
        self.events.push(WorldEvent::BuildQueued {
            id,
            building: session.template.kind,
            origin,
        });
        self.events.push(WorldEvent::PlacementPreviewChanged { preview: None });
        Some(id)
    }

    /// Leave build mode, discarding the preview.
    pub fn cancel_placement(&mut self) {
        if self.placement.take().is_some() {
            self.events.push(WorldEvent::PlacementPreviewChanged { preview: None });
        }
    }

    #[must_use]
    pub fn is_placing(&self) -> bool {
        self.placement.is_some()
    }

    /// Current preview, if in build mode and hovering somewhere.
    #[must_use]
    pub fn placement_preview(&self) -> Option<PlacementPreview> {
        let session = self.placement.as_ref()?;
        Some(PlacementPreview {
            building: session.template.kind.clone(),
            evaluation: session.preview?,
        })
    }

    /// Fixed-interval simulation step: run queued build orders.
    pub fn tick(&mut self) {
        let outcomes = self.construction.run_pending(&self.grid, &mut self.ledger, self.tile_size);
        for outcome in outcomes {
            let event = match outcome.result {
                Ok(()) => {
                    info!("built {} #{} at {}", outcome.building, outcome.id, outcome.origin);
                    WorldEvent::BuildCompleted {
                        id: outcome.id,
                        building: outcome.building,
                        origin: outcome.origin,
                    }
                }
                Err(reason) => {
                    warn!("build {} #{} failed: {reason}", outcome.building, outcome.id);
                    WorldEvent::BuildFailed {
                        id: outcome.id,
                        building: outcome.building,
                        reason,
                    }
                }
            };
            self.events.push(event);
        }
    }

    pub fn orbit(&mut self, delta: Vec2) {
        self.camera.orbit(delta);
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.camera.pan(delta);
    }

    pub fn zoom(&mut self, delta: f32) {
        self.camera.zoom(delta);
    }

    #[must_use]
    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    #[must_use]
    pub fn camera_transform(&self) -> CameraTransform {
        self.camera.transform()
    }

    /// Surface level per column, lazily rebuilt.
    pub fn surface_depth_map(&mut self) -> &DepthMap {
        self.surface.get(&self.grid)
    }

    /// Distinct columns holding a relic anywhere in their stack.
    #[must_use]
    pub fn relic_coordinates(&self) -> Vec<IVec2> {
        self.relics.columns()
    }

    /// Columns whose top cell is a relic.
    #[must_use]
    pub fn exposed_relics(&self) -> Vec<IVec2> {
        self.relics.exposed(&self.grid)
    }

    #[must_use]
    pub fn relics(&self) -> &RelicIndex {
        &self.relics
    }

    #[must_use]
    pub fn block_counts(&self) -> BTreeMap<BlockKind, usize> {
        self.grid.block_counts()
    }

    #[must_use]
    pub fn avatar(&self) -> Option<IVec2> {
        self.motion.position()
    }

    #[must_use]
    pub fn facing(&self) -> Facing {
        self.motion.facing()
    }

    #[must_use]
    pub fn motion(&self) -> &MotionController {
        &self.motion
    }

    /// Drawn avatar position and yaw, interpolated between committed columns.
    #[must_use]
    pub fn avatar_world_position(&self) -> Option<(Vec3, f32)> {
        let pose = self.motion.pose()?;
        let dims = self.grid.dims();
        let top = |c: IVec2| {
            let y = self.grid.surface_level(c.x, c.y).unwrap_or(0);
            dims.cell_top_world(IVec3::new(c.x, y, c.y), self.tile_size)
        };
        Some((top(pose.from).lerp(top(pose.to), pose.progress), pose.yaw))
    }

    #[must_use]
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }

    /// Credit resources from outside digging (starting stock, scripted rewards).
    pub fn credit(&mut self, kind: ResourceKind, amount: u32) {
        self.ledger.credit(kind, amount);
    }

    #[must_use]
    pub fn construction(&self) -> &ConstructionQueue {
        &self.construction
    }

    #[must_use]
    pub fn grid(&self) -> &VoxelGrid {
        &self.grid
    }

    #[must_use]
    pub fn dims(&self) -> GridDims {
        self.grid.dims()
    }

    #[must_use]
    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Seed of the current layout.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Take all queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<WorldEvent> {
        std::mem::take(&mut self.events)
    }
}

//! Two-phase building: placement commits enqueue orders, the simulation tick
//! executes them.
//!
//! Execution re-checks the site (terrain may have been dug since the commit)
//! and charges the cost. Finished buildings claim their footprint columns in
//! an occupancy table keyed by column.

use super::ledger::{LedgerError, ResourceLedger};
use crate::grid::VoxelGrid;
use crate::placement::{evaluate_placement, Blueprint};
use bevy::math::IVec2;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum BuildFailure {
    #[error("site at {origin} is no longer buildable")]
    SiteInvalid { origin: IVec2 },
    #[error("site at {origin} overlaps building #{occupant}")]
    Occupied { origin: IVec2, occupant: u32 },
    #[error(transparent)]
    Unaffordable(#[from] LedgerError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuildOrder {
    pub id: u32,
    pub blueprint: Blueprint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedBuilding {
    pub id: u32,
    pub blueprint: Blueprint,
}

/// Result of executing one order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOutcome {
    pub id: u32,
    pub building: String,
    pub origin: IVec2,
    pub result: Result<(), BuildFailure>,
}

#[derive(Debug, Default, Clone)]
pub struct ConstructionQueue {
    next_id: u32,
    pending: VecDeque<BuildOrder>,
    placed: Vec<PlacedBuilding>,
    occupancy: HashMap<IVec2, u32>,
}

impl ConstructionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a blueprint; no cost or site check happens here.
    pub fn enqueue(&mut self, blueprint: Blueprint) -> u32 {
        self.next_id += 1;
        let id = self.next_id;
        self.pending.push_back(BuildOrder { id, blueprint });
        id
    }

    pub fn pending(&self) -> impl Iterator<Item = &BuildOrder> {
        self.pending.iter()
    }

    #[must_use]
    pub fn placed(&self) -> &[PlacedBuilding] {
        &self.placed
    }

    /// Building occupying `column`, if any.
    #[must_use]
    pub fn occupant(&self, column: IVec2) -> Option<u32> {
        self.occupancy.get(&column).copied()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
        self.placed.clear();
        self.occupancy.clear();
    }

    /// Execute every pending order in queue order.
    pub fn run_pending(&mut self, grid: &VoxelGrid, ledger: &mut ResourceLedger, tile_size: f32) -> Vec<BuildOutcome> {
        let orders: Vec<BuildOrder> = self.pending.drain(..).collect();
        orders
            .into_iter()
            .map(|order| {
                let result = self.execute(&order, grid, ledger, tile_size);
                BuildOutcome {
                    id: order.id,
                    building: order.blueprint.kind.clone(),
                    origin: order.blueprint.origin,
                    result: result.map(|()| self.place(order)),
                }
            })
            .collect()
    }

    fn execute(
        &self,
        order: &BuildOrder,
        grid: &VoxelGrid,
        ledger: &mut ResourceLedger,
        tile_size: f32,
    ) -> Result<(), BuildFailure> {
        let bp = &order.blueprint;
        let site = evaluate_placement(grid, bp.origin, bp.footprint, tile_size);
        if !site.valid {
            return Err(BuildFailure::SiteInvalid { origin: bp.origin });
        }
        if let Some(occupant) = bp.cells().find_map(|c| self.occupant(c)) {
            return Err(BuildFailure::Occupied {
                origin: bp.origin,
                occupant,
            });
        }
        ledger.try_spend(&bp.cost)?;
        ledger.add_population(bp.population_bonus);
        Ok(())
    }

    fn place(&mut self, order: BuildOrder) {
        for cell in order.blueprint.cells() {
            self.occupancy.insert(cell, order.id);
        }
        self.placed.push(PlacedBuilding {
            id: order.id,
            blueprint: order.blueprint,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockKind, ResourceKind};
    use crate::grid::GridDims;
    use crate::placement::{BuildingTemplate, Footprint};
    use std::collections::BTreeMap;

    fn flat_grid() -> VoxelGrid {
        let mut grid = VoxelGrid::new(GridDims::new(6, 4, 6));
        for c in grid.dims().iter_columns().collect::<Vec<_>>() {
            grid.set(c.x, 0, c.y, BlockKind::Den);
        }
        grid
    }

    fn blueprint(grid: &VoxelGrid, origin: IVec2, soil: u32) -> Blueprint {
        let template = BuildingTemplate {
            kind: "burrow".into(),
            name: "Burrow".into(),
            cost: BTreeMap::from([(ResourceKind::Soil, soil)]),
            population_bonus: 3,
            footprint: Footprint::new(2, 2),
        };
        template.blueprint(&evaluate_placement(grid, origin, template.footprint, 1.0))
    }

    #[test]
    fn unaffordable_order_fails_at_execution() {
        let grid = flat_grid();
        let mut queue = ConstructionQueue::new();
        let mut ledger = ResourceLedger::new();
        let id = queue.enqueue(blueprint(&grid, IVec2::new(1, 1), 2));
        assert_eq!(queue.pending().count(), 1);

        let outcomes = queue.run_pending(&grid, &mut ledger, 1.0);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].id, id);
        assert!(matches!(outcomes[0].result, Err(BuildFailure::Unaffordable(_))));
        assert!(queue.placed().is_empty());
        assert_eq!(queue.pending().count(), 0);
    }

    #[test]
    fn successful_order_spends_and_occupies() {
        let grid = flat_grid();
        let mut queue = ConstructionQueue::new();
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Soil, 5);
        queue.enqueue(blueprint(&grid, IVec2::new(1, 1), 2));

        let outcomes = queue.run_pending(&grid, &mut ledger, 1.0);
        assert_eq!(outcomes[0].result, Ok(()));
        assert_eq!(ledger.amount(ResourceKind::Soil), 3);
        assert_eq!(ledger.population(), 3);
        assert_eq!(queue.occupant(IVec2::new(2, 2)), Some(outcomes[0].id));
        assert_eq!(queue.occupant(IVec2::new(3, 3)), None);
    }

    #[test]
    fn overlapping_order_is_refused_without_charge() {
        let grid = flat_grid();
        let mut queue = ConstructionQueue::new();
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceKind::Soil, 10);
        let first = queue.enqueue(blueprint(&grid, IVec2::new(1, 1), 2));
        queue.enqueue(blueprint(&grid, IVec2::new(2, 2), 2));

        let outcomes = queue.run_pending(&grid, &mut ledger, 1.0);
        assert_eq!(outcomes[0].result, Ok(()));
        assert_eq!(
            outcomes[1].result,
            Err(BuildFailure::Occupied {
                origin: IVec2::new(2, 2),
                occupant: first
            })
        );
        assert_eq!(ledger.amount(ResourceKind::Soil), 8);
    }

    #[test]
    fn dug_out_site_is_invalid() {
        let mut grid = flat_grid();
        let bp = blueprint(&grid, IVec2::new(1, 1), 0);
        grid.set(2, 0, 2, BlockKind::Air);
        let mut queue = ConstructionQueue::new();
        queue.enqueue(bp);
        let outcomes = queue.run_pending(&grid, &mut ResourceLedger::new(), 1.0);
        assert_eq!(
            outcomes[0].result,
            Err(BuildFailure::SiteInvalid { origin: IVec2::new(1, 1) })
        );
    }
}

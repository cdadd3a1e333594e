//! Grid A* over navigable columns.
//!
//! Moves are 4-connected (+x, -x, +z, -z) with unit cost and a Manhattan
//! heuristic. The open set is a min-heap ordered by `(f, h, insertion)` so
//! equal-cost candidates pop in the order they were discovered, which keeps
//! results reproducible.
//!
//! # Example
//!
//! ```
//! use bevy::math::IVec2;
//! use cave_of_nations::pathfinding::Pathfinder;
//!
//! let finder = Pathfinder::new(8, 8);
//! let path = finder.find_path(IVec2::new(0, 0), IVec2::new(3, 4), |_| true).unwrap();
//! assert_eq!(path.len(), 8);
//! ```

use bevy::math::IVec2;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Neighbour offsets, in expansion order.
pub const STEPS: [IVec2; 4] = [IVec2::new(1, 0), IVec2::new(-1, 0), IVec2::new(0, 1), IVec2::new(0, -1)];

/// Manhattan distance between two columns.
#[must_use]
pub fn manhattan(a: IVec2, b: IVec2) -> u32 {
    (a - b).abs().element_sum().unsigned_abs()
}

#[derive(Debug, Clone, Copy)]
pub struct Pathfinder {
    width: i32,
    depth: i32,
}

impl Pathfinder {
    /// Search space of `width` x `depth` columns.
    #[must_use]
    pub fn new(width: i32, depth: i32) -> Self {
        Self { width, depth }
    }

    fn index(&self, c: IVec2) -> Option<usize> {
        if (0..self.width).contains(&c.x) && (0..self.depth).contains(&c.y) {
            usize::try_from(c.y * self.width + c.x).ok()
        } else {
            None
        }
    }

    fn column(&self, index: usize) -> IVec2 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let i = index as i32;
        IVec2::new(i % self.width, i / self.width)
    }

    /// Shortest 4-connected path from `start` to `goal`.
    ///
    /// # Arguments
    /// * `start` - current column; not itself checked for navigability
    /// * `goal` - destination column
    /// * `is_navigable` - whether a neighbour column may be entered
    ///
    /// # Return
    /// * `Option<Vec<IVec2>>` - columns from `start` to `goal` inclusive, or
    ///   `None` if the goal cannot be reached. `start == goal` short-circuits
    ///   to `[start, goal]`.
    #[must_use]
    pub fn find_path(&self, start: IVec2, goal: IVec2, is_navigable: impl Fn(IVec2) -> bool) -> Option<Vec<IVec2>> {
        if start == goal {
            return Some(vec![start, goal]);
        }
        let start_i = self.index(start)?;
        let goal_i = self.index(goal)?;

        let cells = usize::try_from(self.width * self.depth).ok()?;
        let mut g_score = vec![u32::MAX; cells];
        let mut came_from: Vec<Option<usize>> = vec![None; cells];
        let mut closed = vec![false; cells];
        let mut open = BinaryHeap::new();
        let mut seq: u64 = 0;

        g_score[start_i] = 0;
        let h = manhattan(start, goal);
        open.push(Reverse((h, h, seq, start_i)));

        while let Some(Reverse((_, _, _, current_i))) = open.pop() {
            if current_i == goal_i {
                return Some(self.reconstruct(&came_from, goal_i));
            }
            if closed[current_i] {
                continue;
            }
            closed[current_i] = true;

            let current = self.column(current_i);
            let next_g = g_score[current_i] + 1;
            for step in STEPS {
                let neighbour = current + step;
                let Some(ni) = self.index(neighbour) else { continue };
                if closed[ni] || next_g >= g_score[ni] || !is_navigable(neighbour) {
                    continue;
                }
                g_score[ni] = next_g;
                came_from[ni] = Some(current_i);
                seq += 1;
                let h = manhattan(neighbour, goal);
                open.push(Reverse((next_g + h, h, seq, ni)));
            }
        }
        None
    }

    fn reconstruct(&self, came_from: &[Option<usize>], goal_i: usize) -> Vec<IVec2> {
        let mut path = vec![self.column(goal_i)];
        let mut cursor = goal_i;
        while let Some(prev) = came_from[cursor] {
            path.push(self.column(prev));
            cursor = prev;
        }
        path.reverse();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_contiguous(path: &[IVec2]) {
        for pair in path.windows(2) {
            assert_eq!(manhattan(pair[0], pair[1]), 1, "{:?} -> {:?}", pair[0], pair[1]);
        }
    }

    #[test]
    fn open_grid_path_has_manhattan_length() {
        let finder = Pathfinder::new(10, 10);
        let path = finder.find_path(IVec2::new(0, 0), IVec2::new(3, 4), |_| true).unwrap();
        assert_eq!(path.len(), 8);
        assert_eq!(path.first(), Some(&IVec2::new(0, 0)));
        assert_eq!(path.last(), Some(&IVec2::new(3, 4)));
        assert_contiguous(&path);
    }

    #[test]
    fn same_start_and_goal_short_circuits() {
        let finder = Pathfinder::new(4, 4);
        let p = IVec2::new(2, 1);
        assert_eq!(finder.find_path(p, p, |_| false), Some(vec![p, p]));
    }

    #[test]
    fn enclosed_start_has_no_path() {
        let finder = Pathfinder::new(5, 5);
        let start = IVec2::new(2, 2);
        let walls: HashSet<IVec2> = STEPS.iter().map(|s| start + *s).collect();
        let path = finder.find_path(start, IVec2::new(0, 0), |c| !walls.contains(&c));
        assert!(path.is_none());
    }

    #[test]
    fn routes_around_a_wall() {
        // wall along x = 2 except at z = 4
        let finder = Pathfinder::new(5, 5);
        let blocked = |c: IVec2| c.x == 2 && c.y != 4;
        let path = finder
            .find_path(IVec2::new(0, 0), IVec2::new(4, 0), |c| !blocked(c))
            .unwrap();
        assert_contiguous(&path);
        assert!(path.iter().all(|c| !blocked(*c)));
        assert!(path.contains(&IVec2::new(2, 4)));
        assert_eq!(path.len(), 13);
    }

    #[test]
    fn out_of_bounds_goal_is_unreachable() {
        let finder = Pathfinder::new(3, 3);
        assert!(finder.find_path(IVec2::new(0, 0), IVec2::new(3, 0), |_| true).is_none());
    }

    #[test]
    fn non_navigable_goal_is_unreachable() {
        let finder = Pathfinder::new(4, 4);
        let goal = IVec2::new(3, 3);
        assert!(finder.find_path(IVec2::new(0, 0), goal, |c| c != goal).is_none());
    }

    #[test]
    fn repeated_searches_agree() {
        let finder = Pathfinder::new(12, 12);
        let a = finder.find_path(IVec2::new(1, 1), IVec2::new(9, 7), |_| true);
        let b = finder.find_path(IVec2::new(1, 1), IVec2::new(9, 7), |_| true);
        assert_eq!(a, b);
    }
}

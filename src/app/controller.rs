//! Snap controller
//!
//! Runs once per timer tick. Classifies the sampled input into a gesture,
//! resolves which icons the gesture targets and commits at most one move
//! per icon. The icon list is located fresh on every tick and icon
//! positions are re-read every time they are needed; nothing about the
//! shell is cached between ticks.
//!
//! Failures never propagate: an icon that cannot be read or written is
//! skipped, and a missing icon list turns the tick into a no-op.

use log::{debug, trace};

use crate::app::registry::{OverlayRegistry, OverlaySurface};
use crate::app::state::{Gesture, GestureState};
use crate::domain::core::Point;
use crate::domain::grid::GridGeometry;
use crate::domain::icons::{IconHandle, IconListLocator, IconPositionAccessor};
use crate::input::InputSnapshot;

/// Resolves the grid responsible for a point
pub trait GridLookup {
    fn geometry_at(&self, p: Point) -> Option<GridGeometry>;
}

impl<S: OverlaySurface> GridLookup for OverlayRegistry<S> {
    fn geometry_at(&self, p: Point) -> Option<GridGeometry> {
        OverlayRegistry::geometry_at(self, p)
    }
}

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub gesture: Gesture,
    /// Icons whose new position was written successfully
    pub moved: usize,
}

/// Drives icon snapping from sampled input
pub struct SnapController<L> {
    locator: L,
}

impl<L: IconListLocator> SnapController<L> {
    pub fn new(locator: L) -> Self {
        Self { locator }
    }

    /// Processes one tick of input against the current grids
    pub fn tick<G: GridLookup>(&self, state: &mut GestureState, input: &InputSnapshot, grids: &G) -> TickReport {
        let gesture = state.classify(input);

        let moved = match gesture {
            Gesture::Idle => 0,
            Gesture::Nudge { dx, dy } => self.nudge(state, dx, dy, grids),
            Gesture::Dragging => {
                self.track_drag(state);
                0
            }
            Gesture::DragReleased => self.snap_released(state, grids),
        };

        TickReport { gesture, moved }
    }

    /// Moves every targeted icon one cell in the requested direction
    fn nudge<G: GridLookup>(&self, state: &mut GestureState, dx: i32, dy: i32, grids: &G) -> usize {
        let Some(list) = self.locator.locate() else {
            debug!("Desktop icon list not found; nudge skipped");
            return 0;
        };

        let targets = Self::targets(&list, state);
        let Some(&first) = targets.first() else {
            trace!("Nudge with no selected or remembered icon");
            return 0;
        };

        // Read everything before writing anything
        let planned: Vec<_> = targets
            .iter()
            .filter_map(|&icon| {
                let current = Self::read(&list, icon)?;
                let grid = Self::grid_for(grids, icon, current)?;
                let target = grid.point_of(grid.cell_of(current).offset(dx, dy));
                (target != current).then_some((icon, target))
            })
            .collect();

        state.last_active_icon = Some(first);
        Self::commit(&list, &planned)
    }

    /// Remembers the icon being dragged so a later release can fall back to it
    fn track_drag(&self, state: &mut GestureState) {
        let Some(list) = self.locator.locate() else {
            return;
        };
        if let Some(icon) = list.first_selected_or_focused() {
            state.last_active_icon = Some(icon);
        }
    }

    /// Snaps every targeted icon that is not already on its grid point
    fn snap_released<G: GridLookup>(&self, state: &GestureState, grids: &G) -> usize {
        let Some(list) = self.locator.locate() else {
            debug!("Desktop icon list not found; release snap skipped");
            return 0;
        };

        let planned: Vec<_> = Self::targets(&list, state)
            .into_iter()
            .filter_map(|icon| {
                let current = Self::read(&list, icon)?;
                let grid = Self::grid_for(grids, icon, current)?;
                let snapped = grid.snap(current);
                (snapped != current).then_some((icon, snapped))
            })
            .collect();

        Self::commit(&list, &planned)
    }

    /// Current selection, or the last active icon when nothing is selected
    fn targets(list: &L::List, state: &GestureState) -> Vec<IconHandle> {
        let selected = list.selected_indices();
        if !selected.is_empty() {
            return selected;
        }
        state.last_active_icon.into_iter().collect()
    }

    fn read(list: &L::List, icon: IconHandle) -> Option<Point> {
        match list.position(icon) {
            Ok(p) => Some(p),
            Err(e) => {
                debug!("Skipping icon {}: {e}", icon.index());
                None
            }
        }
    }

    fn grid_for<G: GridLookup>(grids: &G, icon: IconHandle, p: Point) -> Option<GridGeometry> {
        let grid = grids.geometry_at(p);
        if grid.is_none() {
            trace!("Icon {} at ({}, {}) is outside every grid", icon.index(), p.x, p.y);
        }
        grid
    }

    fn commit(list: &L::List, planned: &[(IconHandle, Point)]) -> usize {
        planned
            .iter()
            .filter(|(icon, target)| match list.set_position(*icon, *target) {
                Ok(()) => {
                    trace!("Icon {} -> ({}, {})", icon.index(), target.x, target.y);
                    true
                }
                Err(e) => {
                    debug!("Failed to move icon {}: {e}", icon.index());
                    false
                }
            })
            .count()
    }
}

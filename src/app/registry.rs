//! Monitor → grid overlay registry
//!
//! Keeps exactly one entry per present monitor, keyed by the monitor's
//! stable device name. Each entry pairs the grid geometry used for
//! snapping with the visual overlay drawn on that monitor. The registry is
//! reconciled against the live monitor set on every apply: new monitors
//! gain an entry, changed ones are updated, vanished ones are dropped.

use std::collections::BTreeMap;
use std::fmt::Display;

use log::{debug, info, warn};

use crate::config::{AppSettings, GridStyle};
use crate::domain::core::{Point, Rect};
use crate::domain::grid::GridGeometry;

/// Stable identifier of a display (its device name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorId(pub String);

impl Display for MonitorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Platform-independent description of one present monitor
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorArea {
    pub id: MonitorId,
    /// Usable rectangle excluding taskbars, in virtual-desktop pixels
    pub work_area: Rect,
    /// DPI scale factor (1.0 = 96 DPI)
    pub dpi_scale: f32,
}

/// Visual side of an overlay, implemented by the renderer
pub trait OverlaySurface {
    /// Redraw for new geometry or style
    fn update_grid(&mut self, geometry: &GridGeometry, style: GridStyle);
    /// Show or hide without destroying
    fn set_visible(&mut self, visible: bool);
}

struct OverlayEntry<S> {
    geometry: GridGeometry,
    /// `None` when the overlay window could not be created; snapping still works
    surface: Option<S>,
}

/// What an [`OverlayRegistry::apply`] call changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub added: usize,
    pub updated: usize,
    pub removed: usize,
}

/// Registry of grid overlays, one per monitor
pub struct OverlayRegistry<S> {
    entries: BTreeMap<MonitorId, OverlayEntry<S>>,
    visible: bool,
}

impl<S: OverlaySurface> OverlayRegistry<S> {
    /// Creates an empty registry; `visible` is the initial overlay visibility
    pub fn new(visible: bool) -> Self {
        Self {
            entries: BTreeMap::new(),
            visible,
        }
    }

    /// Reconciles the registry with the present monitors and current settings
    ///
    /// `create` builds the overlay surface for a monitor that has none yet.
    /// A failure is logged and the monitor keeps its grid without a visual.
    pub fn apply<F, E>(&mut self, monitors: &[MonitorArea], settings: &AppSettings, mut create: F) -> ApplyReport
    where
        F: FnMut(&MonitorArea) -> Result<S, E>,
        E: Display,
    {
        let mut report = ApplyReport::default();
        let style = settings.style();

        for monitor in monitors {
            let geometry = GridGeometry::new(monitor.work_area, settings.grid_for(&monitor.id.0));

            if self.has_overlay(&monitor.id) {
                debug!("Update grid overlay for {}", monitor.id);
                report.updated += 1;
            } else {
                info!(
                    "Create grid overlay for {} ({}x{} at {},{})",
                    monitor.id, monitor.work_area.w, monitor.work_area.h, monitor.work_area.x, monitor.work_area.y
                );
                report.added += 1;
            }

            let entry = self
                .entries
                .entry(monitor.id.clone())
                .or_insert(OverlayEntry { geometry, surface: None });
            entry.geometry = geometry;

            if entry.surface.is_none() {
                match create(monitor) {
                    Ok(surface) => entry.surface = Some(surface),
                    Err(e) => warn!("Overlay for {} unavailable: {e}", monitor.id),
                }
            }

            if let Some(surface) = entry.surface.as_mut() {
                surface.update_grid(&entry.geometry, style);
                surface.set_visible(self.visible);
            }
        }

        let before = self.entries.len();
        self.entries
            .retain(|id, _| monitors.iter().any(|m| &m.id == id));
        report.removed = before - self.entries.len();
        if report.removed > 0 {
            info!("Removed {} overlay(s) for disconnected monitors", report.removed);
        }

        report
    }

    /// Returns true if the registry already reflects exactly these monitors
    pub fn matches(&self, monitors: &[MonitorArea]) -> bool {
        monitors.len() == self.entries.len()
            && monitors.iter().all(|m| {
                self.entries
                    .get(&m.id)
                    .is_some_and(|e| e.geometry.work_area() == m.work_area)
            })
    }

    /// Shows or hides every overlay without closing it
    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
        for surface in self.entries.values_mut().filter_map(|e| e.surface.as_mut()) {
            surface.set_visible(visible);
        }
    }

    /// Flips overlay visibility and returns the new state
    pub fn toggle_visible(&mut self) -> bool {
        self.set_visible(!self.visible);
        self.visible
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Number of monitors with a grid
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if this monitor currently has a grid overlay
    pub fn has_overlay(&self, id: &MonitorId) -> bool {
        self.entries.contains_key(id)
    }

    /// Grid of the monitor whose working area contains `p`
    pub fn geometry_at(&self, p: Point) -> Option<GridGeometry> {
        self.entries
            .values()
            .map(|e| e.geometry)
            .find(|g| g.contains(p))
    }

    #[cfg(test)]
    fn surface(&self, id: &MonitorId) -> Option<&S> {
        self.entries.get(id).and_then(|e| e.surface.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::grid::GridConfig;

    #[derive(Debug, Default)]
    struct FakeSurface {
        updates: Vec<GridGeometry>,
        visible: bool,
    }

    impl OverlaySurface for FakeSurface {
        fn update_grid(&mut self, geometry: &GridGeometry, _style: GridStyle) {
            self.updates.push(*geometry);
        }

        fn set_visible(&mut self, visible: bool) {
            self.visible = visible;
        }
    }

    fn monitor(name: &str, work_area: Rect) -> MonitorArea {
        MonitorArea {
            id: MonitorId(name.into()),
            work_area,
            dpi_scale: 1.0,
        }
    }

    fn create(_: &MonitorArea) -> Result<FakeSurface, String> {
        Ok(FakeSurface::default())
    }

    fn two_monitors() -> Vec<MonitorArea> {
        vec![
            monitor("DISPLAY1", Rect::new(0, 0, 1920, 1040)),
            monitor("DISPLAY2", Rect::new(1920, 0, 1280, 1024)),
        ]
    }

    #[test]
    fn apply_creates_one_entry_per_monitor() {
        let mut registry = OverlayRegistry::new(true);
        let report = registry.apply(&two_monitors(), &AppSettings::default(), create);

        assert_eq!(report, ApplyReport { added: 2, updated: 0, removed: 0 });
        assert_eq!(registry.len(), 2);
        assert!(registry.matches(&two_monitors()));

        let surface = registry.surface(&MonitorId("DISPLAY2".into())).unwrap();
        assert_eq!(surface.updates.len(), 1);
        assert!(surface.visible);
    }

    #[test]
    fn reapply_updates_in_place() {
        let mut registry = OverlayRegistry::new(false);
        registry.apply(&two_monitors(), &AppSettings::default(), create);

        let mut settings = AppSettings::default();
        settings.cell_width = 200;
        let report = registry.apply(&two_monitors(), &settings, create);

        assert_eq!(report, ApplyReport { added: 0, updated: 2, removed: 0 });
        let surface = registry.surface(&MonitorId("DISPLAY1".into())).unwrap();
        assert_eq!(surface.updates.len(), 2);
        assert_eq!(surface.updates[1].config().cell_width, 200);
        assert!(!surface.visible);
    }

    #[test]
    fn vanished_monitor_is_removed_and_never_targeted() {
        let mut registry = OverlayRegistry::new(true);
        registry.apply(&two_monitors(), &AppSettings::default(), create);
        assert!(registry.geometry_at(Point::new(2000, 100)).is_some());

        let remaining = vec![monitor("DISPLAY1", Rect::new(0, 0, 1920, 1040))];
        assert!(!registry.matches(&remaining));
        let report = registry.apply(&remaining, &AppSettings::default(), create);

        assert_eq!(report.removed, 1);
        assert!(!registry.has_overlay(&MonitorId("DISPLAY2".into())));
        assert!(registry.geometry_at(Point::new(2000, 100)).is_none());
        assert!(registry.geometry_at(Point::new(10, 10)).is_some());
    }

    #[test]
    fn work_area_change_is_detected() {
        let mut registry = OverlayRegistry::new(true);
        registry.apply(&two_monitors(), &AppSettings::default(), create);

        let mut moved_taskbar = two_monitors();
        moved_taskbar[0].work_area = Rect::new(0, 40, 1920, 1040);
        assert!(!registry.matches(&moved_taskbar));
    }

    #[test]
    fn geometry_uses_monitor_override() {
        let mut settings = AppSettings::default();
        settings.monitors.insert(
            "DISPLAY2".into(),
            crate::config::settings::MonitorOverride {
                cell_width: Some(64),
                ..Default::default()
            },
        );
        let mut registry = OverlayRegistry::new(true);
        registry.apply(&two_monitors(), &settings, create);

        let grid = registry.geometry_at(Point::new(1925, 5)).unwrap();
        assert_eq!(grid.config(), GridConfig::new(64, 96, 8, 12));
        let grid = registry.geometry_at(Point::new(5, 5)).unwrap();
        assert_eq!(grid.config().cell_width, 120);
    }

    #[test]
    fn failed_surface_keeps_grid_and_retries() {
        let mut registry: OverlayRegistry<FakeSurface> = OverlayRegistry::new(true);
        registry.apply(&two_monitors(), &AppSettings::default(), |_| Err("no window"));

        assert_eq!(registry.len(), 2);
        assert!(registry.geometry_at(Point::new(100, 100)).is_some());
        assert!(registry.surface(&MonitorId("DISPLAY1".into())).is_none());

        registry.apply(&two_monitors(), &AppSettings::default(), create);
        assert!(registry.surface(&MonitorId("DISPLAY1".into())).is_some());
    }

    #[test]
    fn toggle_hides_and_shows_all() {
        let mut registry = OverlayRegistry::new(true);
        registry.apply(&two_monitors(), &AppSettings::default(), create);

        assert!(!registry.toggle_visible());
        assert!(!registry.surface(&MonitorId("DISPLAY1".into())).unwrap().visible);
        assert!(!registry.surface(&MonitorId("DISPLAY2".into())).unwrap().visible);

        assert!(registry.toggle_visible());
        assert!(registry.is_visible());
        assert!(registry.surface(&MonitorId("DISPLAY1".into())).unwrap().visible);
    }
}

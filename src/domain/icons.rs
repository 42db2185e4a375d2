//! Desktop icon addressing and the capabilities used to move icons
//!
//! The desktop icons live in a list control owned by the shell process.
//! Everything the snapping logic needs from that control is expressed by
//! the two traits below, so the logic never touches window handles or
//! foreign memory directly.

use crate::domain::core::Point;

/// Upper bound on selected items walked per call
///
/// Guards against a misbehaving control that never reports the end of
/// its selection.
pub const MAX_SELECTED_ITEMS: usize = 4096;

/// Index of one entry in the shell's icon list
///
/// Only meaningful for the list-control instance it was read from. The
/// same index may name a different icon after the shell restarts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct IconHandle(pub i32);

impl IconHandle {
    /// Returns the raw list index
    pub fn index(self) -> i32 {
        self.0
    }
}

/// Icon position in the coordinate space of the icon list control
pub type IconPixelPosition = Point;

/// Read/write access to icon positions inside one located icon list
///
/// Implementations must not cache positions: each call reflects the
/// control's state at the time of the call.
pub trait IconPositionAccessor {
    /// The error type produced when a foreign read or write fails.
    type Error: std::error::Error;

    /// Reads the current position of an icon
    fn position(&self, icon: IconHandle) -> Result<IconPixelPosition, Self::Error>;

    /// Moves an icon to a new position
    fn set_position(&self, icon: IconHandle, position: IconPixelPosition) -> Result<(), Self::Error>;

    /// Returns the next selected icon after `after`, or the first one when
    /// `after` is `None`
    fn next_selected(&self, after: Option<IconHandle>) -> Option<IconHandle>;

    /// Returns the icon holding keyboard focus, if any
    fn focused(&self) -> Option<IconHandle>;

    /// Returns every selected icon in the control's item order
    fn selected_indices(&self) -> Vec<IconHandle> {
        let mut indices = Vec::new();
        let mut cursor = None;

        while let Some(next) = self.next_selected(cursor) {
            // The control walks forward; anything else means it is confused
            if cursor.is_some_and(|prev: IconHandle| next <= prev) {
                break;
            }
            indices.push(next);
            if indices.len() >= MAX_SELECTED_ITEMS {
                break;
            }
            cursor = Some(next);
        }

        indices
    }

    /// Returns the first selected icon, falling back to the focused one
    fn first_selected_or_focused(&self) -> Option<IconHandle> {
        self.next_selected(None).or_else(|| self.focused())
    }
}

/// Finds the icon list the shell is currently using
///
/// Called fresh on every tick. `None` is a normal state (for example while
/// the shell restarts) and means no icons are addressable right now.
pub trait IconListLocator {
    /// The accessor bound to a located list.
    type List: IconPositionAccessor;

    /// Locates the shell's icon list, if it exists right now
    fn locate(&self) -> Option<Self::List>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("unused")]
    struct Never;

    /// Accessor that only answers selection queries
    struct Selection {
        chain: Vec<i32>,
        focused: Option<i32>,
    }

    impl IconPositionAccessor for Selection {
        type Error = Never;

        fn position(&self, _icon: IconHandle) -> Result<Point, Never> {
            Ok(Point::default())
        }

        fn set_position(&self, _icon: IconHandle, _position: Point) -> Result<(), Never> {
            Ok(())
        }

        fn next_selected(&self, after: Option<IconHandle>) -> Option<IconHandle> {
            let pos = match after {
                None => 0,
                Some(prev) => self.chain.iter().position(|&i| i == prev.index())? + 1,
            };
            self.chain.get(pos).map(|&i| IconHandle(i))
        }

        fn focused(&self) -> Option<IconHandle> {
            self.focused.map(IconHandle)
        }
    }

    #[test]
    fn selected_indices_preserves_control_order() {
        let list = Selection {
            chain: vec![2, 5, 9],
            focused: None,
        };
        assert_eq!(
            list.selected_indices(),
            vec![IconHandle(2), IconHandle(5), IconHandle(9)]
        );
    }

    #[test]
    fn selected_indices_stops_when_control_walks_backwards() {
        let list = Selection {
            chain: vec![4, 7, 1, 8],
            focused: None,
        };
        assert_eq!(list.selected_indices(), vec![IconHandle(4), IconHandle(7)]);
    }

    #[test]
    fn empty_selection_is_empty() {
        let list = Selection {
            chain: vec![],
            focused: Some(3),
        };
        assert!(list.selected_indices().is_empty());
    }

    #[test]
    fn first_selected_or_focused_prefers_selection() {
        let selected = Selection {
            chain: vec![6, 8],
            focused: Some(3),
        };
        assert_eq!(selected.first_selected_or_focused(), Some(IconHandle(6)));

        let focused_only = Selection {
            chain: vec![],
            focused: Some(3),
        };
        assert_eq!(focused_only.first_selected_or_focused(), Some(IconHandle(3)));

        let nothing = Selection {
            chain: vec![],
            focused: None,
        };
        assert_eq!(nothing.first_selected_or_focused(), None);
    }
}

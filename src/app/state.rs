//! Gesture state machine
//!
//! Converts level-triggered [`InputSnapshot`]s into at most one edge-triggered
//! [`Gesture`] per tick. The state is an explicit value owned by the caller
//! and threaded into every tick, so input sequences can be replayed in tests.
//!
//! ```text
//! Idle --alt+arrow edge--> Nudge --> Idle
//! Idle --button down--> Dragging --button up--> DragReleased --> Idle
//! ```

use crate::domain::icons::IconHandle;
use crate::input::InputSnapshot;

/// Session state carried from one tick to the next
///
/// Created once at startup and never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GestureState {
    /// An alt+arrow press has already been acted on
    pub armed: bool,
    /// The primary mouse button was down on a previous tick
    pub was_dragging: bool,
    /// Most recent icon known to be selected, focused or moved
    pub last_active_icon: Option<IconHandle>,
}

/// What the current tick should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Nothing to do this tick
    Idle,
    /// Move the targeted icons by `dx` columns and `dy` rows
    Nudge { dx: i32, dy: i32 },
    /// The shell is dragging icons; leave positions alone
    Dragging,
    /// The drag ended on this tick; snap the targeted icons
    DragReleased,
}

impl GestureState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies one tick of input, updating the edge-detection flags
    pub fn classify(&mut self, input: &InputSnapshot) -> Gesture {
        let any_arrow = input.any_arrow();

        if input.alt && any_arrow && !self.armed {
            self.armed = true;
            let (dx, dy) = input.arrow_delta();
            return Gesture::Nudge { dx, dy };
        }

        if !any_arrow {
            self.armed = false;
        }

        if input.primary_button {
            self.was_dragging = true;
            return Gesture::Dragging;
        }

        if self.was_dragging {
            self.was_dragging = false;
            return Gesture::DragReleased;
        }

        Gesture::Idle
    }
}

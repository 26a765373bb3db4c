//! Hardware surface model: the 8x8 matrix plus side, top and config buttons
//!
//! Buttons live in a single arena and are addressed by `ButtonId`, so every
//! other module can key state by a stable index instead of holding references.

mod button;

pub use button::{Button, LedMessage, DEFAULT_OFF_VALUE, DEFAULT_ON_VALUE};

use serde::Serialize;
use std::time::Instant;
use thiserror::Error;

/// Matrix width and height
pub const GRID_SIZE: usize = 8;
/// Number of top-row buttons (4 nav + 4 mode)
pub const TOP_BUTTON_COUNT: usize = 8;
/// Number of side (scene) buttons
pub const SIDE_BUTTON_COUNT: usize = 8;
/// Top buttons before this index are navigation, the rest select modes
pub const NAV_BUTTON_COUNT: usize = 4;

/// Stable identity of a button in the surface arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ButtonId(pub usize);

/// Role of a button on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Control {
    Matrix { col: usize, row: usize },
    Side(usize),
    Nav(usize),
    ModeButton(usize),
    Config,
}

/// Hardware input event, stamped when received
#[derive(Debug, Clone, Copy)]
pub struct ButtonEvent {
    pub button: ButtonId,
    pub value: u8,
    pub timestamp: Instant,
}

impl ButtonEvent {
    pub fn new(button: ButtonId, value: u8, timestamp: Instant) -> Self {
        Self {
            button,
            value,
            timestamp,
        }
    }

    pub fn is_press(&self) -> bool {
        self.value != 0
    }
}

/// Shape reported by the hardware binding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceShape {
    pub width: usize,
    pub height: usize,
    pub top_buttons: usize,
    pub side_buttons: usize,
}

impl SurfaceShape {
    /// The only shape the mode selector accepts
    pub const LAUNCHPAD: SurfaceShape = SurfaceShape {
        width: GRID_SIZE,
        height: GRID_SIZE,
        top_buttons: TOP_BUTTON_COUNT,
        side_buttons: SIDE_BUTTON_COUNT,
    };
}

/// Construction-time shape violations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("button matrix must be {expected}x{expected}, got {width}x{height}")]
    Matrix {
        expected: usize,
        width: usize,
        height: usize,
    },
    #[error("expected {expected} top buttons, got {actual}")]
    TopButtons { expected: usize, actual: usize },
    #[error("expected {expected} side buttons, got {actual}")]
    SideButtons { expected: usize, actual: usize },
}

/// Every button the controller owns
#[derive(Debug, Clone)]
pub struct Surface {
    buttons: Vec<Button>,
    roles: Vec<Control>,
    matrix: [[ButtonId; GRID_SIZE]; GRID_SIZE],
    side: [ButtonId; SIDE_BUTTON_COUNT],
    top: [ButtonId; TOP_BUTTON_COUNT],
    config: ButtonId,
}

impl Surface {
    /// Build the surface, rejecting any shape other than 8x8 + 8 top + 8 side
    pub fn new(shape: SurfaceShape) -> Result<Self, LayoutError> {
        if shape.width != GRID_SIZE || shape.height != GRID_SIZE {
            return Err(LayoutError::Matrix {
                expected: GRID_SIZE,
                width: shape.width,
                height: shape.height,
            });
        }
        if shape.top_buttons != TOP_BUTTON_COUNT {
            return Err(LayoutError::TopButtons {
                expected: TOP_BUTTON_COUNT,
                actual: shape.top_buttons,
            });
        }
        if shape.side_buttons != SIDE_BUTTON_COUNT {
            return Err(LayoutError::SideButtons {
                expected: SIDE_BUTTON_COUNT,
                actual: shape.side_buttons,
            });
        }

        let mut buttons = Vec::new();
        let mut roles = Vec::new();
        let mut add = |name: String, role: Control| {
            let id = ButtonId(buttons.len());
            buttons.push(Button::new(id, name));
            roles.push(role);
            id
        };

        let mut matrix = [[ButtonId(0); GRID_SIZE]; GRID_SIZE];
        for (row, cells) in matrix.iter_mut().enumerate() {
            for (col, cell) in cells.iter_mut().enumerate() {
                *cell = add(format!("{}_Clip_{}_Button", col, row), Control::Matrix { col, row });
            }
        }

        let side: [ButtonId; SIDE_BUTTON_COUNT] =
            std::array::from_fn(|i| add(format!("{}_Scene_Button", i), Control::Side(i)));

        let top: [ButtonId; TOP_BUTTON_COUNT] = std::array::from_fn(|i| {
            if i < NAV_BUTTON_COUNT {
                add(format!("Nav_Button_{}", i), Control::Nav(i))
            } else {
                let mode = i - NAV_BUTTON_COUNT;
                add(format!("Mode_Button_{}", mode), Control::ModeButton(mode))
            }
        });

        let config = add("Config_Button".to_string(), Control::Config);

        Ok(Self {
            buttons,
            roles,
            matrix,
            side,
            top,
            config,
        })
    }

    pub fn button(&self, id: ButtonId) -> Option<&Button> {
        self.buttons.get(id.0)
    }

    pub fn button_mut(&mut self, id: ButtonId) -> Option<&mut Button> {
        self.buttons.get_mut(id.0)
    }

    /// Resolve which role a button plays
    pub fn resolve(&self, id: ButtonId) -> Option<Control> {
        self.roles.get(id.0).copied()
    }

    /// Look up a button by role
    pub fn id_of(&self, control: Control) -> Option<ButtonId> {
        match control {
            Control::Matrix { col, row } if col < GRID_SIZE && row < GRID_SIZE => {
                Some(self.matrix[row][col])
            }
            Control::Side(i) if i < SIDE_BUTTON_COUNT => Some(self.side[i]),
            Control::Nav(i) if i < NAV_BUTTON_COUNT => Some(self.top[i]),
            Control::ModeButton(i) if i < TOP_BUTTON_COUNT - NAV_BUTTON_COUNT => {
                Some(self.top[NAV_BUTTON_COUNT + i])
            }
            Control::Config => Some(self.config),
            _ => None,
        }
    }

    pub fn matrix_button(&self, col: usize, row: usize) -> ButtonId {
        self.matrix[row][col]
    }

    pub fn width(&self) -> usize {
        GRID_SIZE
    }

    pub fn height(&self) -> usize {
        GRID_SIZE
    }

    pub fn side_buttons(&self) -> &[ButtonId] {
        &self.side
    }

    pub fn nav_buttons(&self) -> &[ButtonId] {
        &self.top[..NAV_BUTTON_COUNT]
    }

    pub fn mode_buttons(&self) -> &[ButtonId] {
        &self.top[NAV_BUTTON_COUNT..]
    }

    pub fn config_button(&self) -> ButtonId {
        self.config
    }

    /// Matrix, side and nav buttons: everything whose channel follows the mode
    pub fn routed_buttons(&self) -> Vec<ButtonId> {
        let mut ids: Vec<ButtonId> = self.side.to_vec();
        ids.extend_from_slice(self.nav_buttons());
        ids.extend(self.matrix.iter().flatten().copied());
        ids
    }

    /// Apply an operation to every button in `ids`
    pub fn for_each(&mut self, ids: &[ButtonId], mut f: impl FnMut(&mut Button)) {
        for id in ids {
            if let Some(button) = self.buttons.get_mut(id.0) {
                f(button);
            }
        }
    }

    /// Take all queued LED values
    pub fn drain_output(&mut self) -> Vec<LedMessage> {
        let mut out = Vec::new();
        for button in &mut self.buttons {
            out.extend(button.take_outgoing());
        }
        out
    }

    pub fn buttons(&self) -> &[Button] {
        &self.buttons
    }
}

//! Per-mode binding tables
//!
//! Each steady mode gets one table, built once when the selector is
//! constructed. Switching modes swaps which table events are looked up in;
//! nothing is registered or unregistered at runtime.

use std::collections::HashMap;
use tracing::debug;

use super::mode::ActiveMode;
use crate::surface::{ButtonId, Control, Surface};

/// Bottom matrix row: stop buttons in session mode
pub const STOP_ROW: usize = 7;
/// Side button that arms delete mode
pub const DELETE_BUTTON: usize = 7;

/// What a button does in a given mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    /// Select the mode with this index (on press)
    SelectMode(usize),
    /// Hold to show the bank overview
    ZoomButton,
    /// Select the column's track and consume an armed delete
    MatrixPress { col: usize, row: usize },
    LaunchClip { track: usize, scene: usize },
    StopTrack(usize),
    /// Tap fires the scene, hold duplicates the row below
    SceneGesture(usize),
    ArmDelete,
    TrackBank(isize),
    SceneBank(isize),
    /// Owned by the mixer sub-mode selector
    SubMode,
}

/// Button → bindings for one mode
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    bindings: HashMap<ButtonId, Vec<Binding>>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a binding. Returns false (and leaves the table alone) for duplicates.
    pub fn bind(&mut self, button: ButtonId, binding: Binding) -> bool {
        let entry = self.bindings.entry(button).or_default();
        if entry.contains(&binding) {
            debug!("Ignoring duplicate binding {:?} on {:?}", binding, button);
            return false;
        }
        entry.push(binding);
        true
    }

    pub fn get(&self, button: ButtonId) -> &[Binding] {
        self.bindings.get(&button).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of bindings attached to a button
    pub fn listener_count(&self, button: ButtonId) -> usize {
        self.get(button).len()
    }

    /// Total number of bindings in the table
    pub fn len(&self) -> usize {
        self.bindings.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (ButtonId, &Binding)> {
        self.bindings
            .iter()
            .flat_map(|(id, list)| list.iter().map(move |b| (*id, b)))
    }
}

/// The three tables, one per steady mode
#[derive(Debug, Clone)]
pub struct ModeBindings {
    session: BindingTable,
    mixer: BindingTable,
    user: BindingTable,
}

impl ModeBindings {
    pub fn build(surface: &Surface) -> Self {
        let mut session = BindingTable::new();
        let mut mixer = BindingTable::new();
        let mut user = BindingTable::new();

        for (index, id) in surface.mode_buttons().iter().enumerate() {
            for table in [&mut session, &mut mixer, &mut user] {
                table.bind(*id, Binding::SelectMode(index));
            }
        }
        if let Some(zoom) = surface.mode_buttons().first() {
            session.bind(*zoom, Binding::ZoomButton);
        }

        for row in 0..surface.height() {
            for col in 0..surface.width() {
                let id = surface.matrix_button(col, row);
                session.bind(id, Binding::MatrixPress { col, row });
                if row == STOP_ROW {
                    session.bind(id, Binding::StopTrack(col));
                } else {
                    session.bind(id, Binding::LaunchClip { track: col, scene: row });
                }
                mixer.bind(id, Binding::SubMode);
            }
        }

        for (index, id) in surface.side_buttons().iter().enumerate() {
            if index == DELETE_BUTTON {
                session.bind(*id, Binding::ArmDelete);
            } else {
                session.bind(*id, Binding::SceneGesture(index));
            }
            mixer.bind(*id, Binding::SubMode);
        }

        // nav[3]/nav[2] scroll tracks, nav[1]/nav[0] scroll scenes
        let nav_bindings = [
            Binding::SceneBank(-1),
            Binding::SceneBank(1),
            Binding::TrackBank(-1),
            Binding::TrackBank(1),
        ];
        for (id, binding) in surface.nav_buttons().iter().zip(nav_bindings) {
            session.bind(*id, binding);
            mixer.bind(*id, binding);
        }

        Self {
            session,
            mixer,
            user,
        }
    }

    pub fn for_mode(&self, mode: ActiveMode) -> &BindingTable {
        match mode {
            ActiveMode::Session => &self.session,
            ActiveMode::Mixer => &self.mixer,
            ActiveMode::User2 => &self.user,
        }
    }
}

/// Overview input for a control, when the overview can take it
pub(crate) fn overview_input(control: Control) -> Option<crate::host::OverviewInput> {
    use crate::host::OverviewInput;

    match control {
        Control::Matrix { col, row } => Some(OverviewInput::Matrix { col, row }),
        Control::Side(i) => Some(OverviewInput::SceneBank(i)),
        Control::Nav(i) => Some(OverviewInput::Nav(i)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::SurfaceShape;

    fn bindings() -> (Surface, ModeBindings) {
        let surface = Surface::new(SurfaceShape::LAUNCHPAD).unwrap();
        let bindings = ModeBindings::build(&surface);
        (surface, bindings)
    }

    #[test]
    fn test_duplicate_bind_is_rejected() {
        let mut table = BindingTable::new();
        assert!(table.bind(ButtonId(1), Binding::ArmDelete));
        assert!(!table.bind(ButtonId(1), Binding::ArmDelete));
        assert_eq!(table.listener_count(ButtonId(1)), 1);
    }

    #[test]
    fn test_session_table_layout() {
        let (surface, bindings) = bindings();
        let session = bindings.for_mode(ActiveMode::Session);

        assert_eq!(
            session.get(surface.matrix_button(2, 3)),
            &[
                Binding::MatrixPress { col: 2, row: 3 },
                Binding::LaunchClip { track: 2, scene: 3 }
            ]
        );
        assert_eq!(
            session.get(surface.matrix_button(5, STOP_ROW)),
            &[
                Binding::MatrixPress { col: 5, row: STOP_ROW },
                Binding::StopTrack(5)
            ]
        );
        assert_eq!(
            session.get(surface.side_buttons()[DELETE_BUTTON]),
            &[Binding::ArmDelete]
        );
        assert_eq!(
            session.get(surface.side_buttons()[0]),
            &[Binding::SceneGesture(0)]
        );
        assert_eq!(
            session.get(surface.mode_buttons()[0]),
            &[Binding::SelectMode(0), Binding::ZoomButton]
        );
        assert_eq!(
            session.get(surface.nav_buttons()[3]),
            &[Binding::TrackBank(1)]
        );
    }

    #[test]
    fn test_user_table_only_has_mode_buttons() {
        let (surface, bindings) = bindings();
        let user = bindings.for_mode(ActiveMode::User2);
        assert_eq!(user.len(), surface.mode_buttons().len());
        for id in surface.routed_buttons() {
            assert_eq!(user.listener_count(id), 0);
        }
    }

    #[test]
    fn test_mixer_table_forwards_grid_and_side() {
        let (surface, bindings) = bindings();
        let mixer = bindings.for_mode(ActiveMode::Mixer);
        assert_eq!(mixer.get(surface.matrix_button(0, 0)), &[Binding::SubMode]);
        assert_eq!(mixer.get(surface.side_buttons()[7]), &[Binding::SubMode]);
        assert_eq!(mixer.get(surface.nav_buttons()[0]), &[Binding::SceneBank(-1)]);
    }
}

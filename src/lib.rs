//! Mode routing core for 8x8 grid controllers
//!
//! A `ModeSelector` owns the hardware surface and hands it to one of three
//! functions at a time: clip launching (session), the mixer sub-modes, or an
//! external user layer. See `selector` for the state machine and `host` for
//! the collaborator traits it drives.

pub mod cli;
pub mod config;
pub mod host;
pub mod paths;
pub mod selector;
pub mod sim;
pub mod surface;

pub use config::SelectorConfig;
pub use host::{HostError, SessionView, Song, SubModeSelector, ZoomOverview};
pub use selector::{Dispatch, Mode, ModeSelector};
pub use surface::{ButtonEvent, ButtonId, Control, Surface, SurfaceShape};

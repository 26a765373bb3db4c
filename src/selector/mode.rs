//! Top-level modes and their resolution

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sub-mode forced when User 1 is selected (mixer volume)
pub const VOLUME_SUB_MODE: usize = 0;

/// Mode requested through a mode button or the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Session,
    User1,
    User2,
    Mixer,
}

impl Mode {
    pub const COUNT: usize = 4;
    pub const ALL: [Mode; Mode::COUNT] = [Mode::Session, Mode::User1, Mode::User2, Mode::Mixer];

    /// Position of the mode button selecting this mode
    pub fn index(self) -> usize {
        match self {
            Mode::Session => 0,
            Mode::User1 => 1,
            Mode::User2 => 2,
            Mode::Mixer => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Mode> {
        Mode::ALL.get(index).copied()
    }

    /// Steady state reached by selecting this mode, plus any sub-mode it forces.
    ///
    /// User 1 is an alias: it lands in the mixer with the volume sub-mode.
    pub fn resolve(self) -> (ActiveMode, Option<usize>) {
        match self {
            Mode::Session => (ActiveMode::Session, None),
            Mode::User1 => (ActiveMode::Mixer, Some(VOLUME_SUB_MODE)),
            Mode::User2 => (ActiveMode::User2, None),
            Mode::Mixer => (ActiveMode::Mixer, None),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Session => write!(f, "session"),
            Mode::User1 => write!(f, "user1"),
            Mode::User2 => write!(f, "user2"),
            Mode::Mixer => write!(f, "mixer"),
        }
    }
}

impl FromStr for Mode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if let Ok(index) = s.parse::<usize>() {
            return Mode::from_index(index)
                .ok_or_else(|| anyhow!("Mode index {} out of range (0-{})", index, Mode::COUNT - 1));
        }

        match s.to_ascii_lowercase().as_str() {
            "session" => Ok(Mode::Session),
            "user1" | "user_1" => Ok(Mode::User1),
            "user2" | "user_2" => Ok(Mode::User2),
            "mixer" => Ok(Mode::Mixer),
            other => Err(anyhow!("Unknown mode '{}'", other)),
        }
    }
}

/// Mode that actually owns the hardware. User 1 never appears here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActiveMode {
    Session,
    User2,
    Mixer,
}

impl ActiveMode {
    pub fn mode(self) -> Mode {
        match self {
            ActiveMode::Session => Mode::Session,
            ActiveMode::User2 => Mode::User2,
            ActiveMode::Mixer => Mode::Mixer,
        }
    }

    pub fn index(self) -> usize {
        self.mode().index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user1_resolves_to_mixer_volume() {
        assert_eq!(
            Mode::User1.resolve(),
            (ActiveMode::Mixer, Some(VOLUME_SUB_MODE))
        );
        for mode in Mode::ALL {
            assert_ne!(mode.resolve().0.mode(), Mode::User1);
        }
    }

    #[test]
    fn test_index_round_trip() {
        for mode in Mode::ALL {
            assert_eq!(Mode::from_index(mode.index()), Some(mode));
        }
        assert_eq!(Mode::from_index(4), None);
    }

    #[test]
    fn test_parse() {
        assert_eq!("Mixer".parse::<Mode>().unwrap(), Mode::Mixer);
        assert_eq!("user_1".parse::<Mode>().unwrap(), Mode::User1);
        assert_eq!("2".parse::<Mode>().unwrap(), Mode::User2);
        assert!("7".parse::<Mode>().is_err());
        assert!("drums".parse::<Mode>().is_err());
    }
}

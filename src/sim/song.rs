//! In-memory track/scene model

use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::host::{HostError, Song};

/// A clip in a slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimClip {
    pub name: String,
}

/// Tracks x scenes grid of optional clips
#[derive(Debug, Clone, Default, Serialize)]
pub struct SimSong {
    /// Indexed [track][scene]
    clips: Vec<Vec<Option<SimClip>>>,
    scenes: usize,
    selected_track: Option<usize>,
    fired_scenes: Vec<usize>,
    /// Slots that reject writes, to model host refusals
    #[serde(skip)]
    locked: HashSet<(usize, usize)>,
}

impl SimSong {
    pub fn new(tracks: usize, scenes: usize) -> Self {
        Self {
            clips: vec![vec![None; scenes]; tracks],
            scenes,
            ..Default::default()
        }
    }

    /// A song with a few clips on the first rows, for the simulator
    pub fn demo(tracks: usize, scenes: usize) -> Self {
        let mut song = Self::new(tracks, scenes);
        for track in 0..tracks.min(4) {
            song.set_clip(track, 0, format!("Loop {}", track + 1));
        }
        if tracks > 1 && scenes > 2 {
            song.set_clip(1, 2, "Fill");
        }
        song
    }

    pub fn with_clip(mut self, track: usize, scene: usize, name: impl Into<String>) -> Self {
        self.set_clip(track, scene, name);
        self
    }

    pub fn set_clip(&mut self, track: usize, scene: usize, name: impl Into<String>) {
        if let Some(slot) = self.slot_mut(track, scene) {
            *slot = Some(SimClip { name: name.into() });
        }
    }

    pub fn clip(&self, track: usize, scene: usize) -> Option<&SimClip> {
        self.clips.get(track)?.get(scene)?.as_ref()
    }

    pub fn fired_scenes(&self) -> &[usize] {
        &self.fired_scenes
    }

    /// Make a slot refuse deletes and duplicates into it
    pub fn lock_slot(&mut self, track: usize, scene: usize) {
        self.locked.insert((track, scene));
    }

    /// Shrink the model, as when tracks or scenes are deleted in the host
    pub fn truncate(&mut self, tracks: usize, scenes: usize) {
        self.clips.truncate(tracks);
        self.scenes = self.scenes.min(scenes);
        for track in &mut self.clips {
            track.truncate(scenes);
        }
        if self.selected_track.is_some_and(|t| t >= self.clips.len()) {
            self.selected_track = None;
        }
    }

    pub fn clip_count(&self) -> usize {
        self.clips.iter().flatten().filter(|slot| slot.is_some()).count()
    }

    fn slot_mut(&mut self, track: usize, scene: usize) -> Option<&mut Option<SimClip>> {
        self.clips.get_mut(track)?.get_mut(scene)
    }

    fn check_writable(&self, track: usize, scene: usize) -> Result<(), HostError> {
        if !self.has_slot(track, scene) {
            return Err(HostError::NoSuchSlot { track, scene });
        }
        if self.locked.contains(&(track, scene)) {
            return Err(HostError::Rejected(format!(
                "slot {}/{} is locked",
                track, scene
            )));
        }
        Ok(())
    }
}

impl Song for SimSong {
    fn track_count(&self) -> usize {
        self.clips.len()
    }

    fn scene_count(&self) -> usize {
        self.scenes
    }

    fn selected_track(&self) -> Option<usize> {
        self.selected_track
    }

    fn select_track(&mut self, track: usize) {
        if track < self.track_count() {
            self.selected_track = Some(track);
        }
    }

    fn fire_scene(&mut self, scene: usize) {
        if scene < self.scenes {
            debug!("Scene {} fired", scene);
            self.fired_scenes.push(scene);
        }
    }

    fn has_clip(&self, track: usize, scene: usize) -> bool {
        self.clip(track, scene).is_some()
    }

    fn delete_clip(&mut self, track: usize, scene: usize) -> Result<(), HostError> {
        self.check_writable(track, scene)?;
        if let Some(slot) = self.slot_mut(track, scene) {
            *slot = None;
        }
        Ok(())
    }

    fn duplicate_clip(
        &mut self,
        track: usize,
        from_scene: usize,
        to_scene: usize,
    ) -> Result<(), HostError> {
        self.check_writable(track, to_scene)?;
        let clip = self
            .clip(track, from_scene)
            .cloned()
            .ok_or(HostError::NoSuchSlot {
                track,
                scene: from_scene,
            })?;
        if self.has_clip(track, to_scene) {
            return Err(HostError::Rejected(format!(
                "slot {}/{} is not empty",
                track, to_scene
            )));
        }
        if let Some(slot) = self.slot_mut(track, to_scene) {
            *slot = Some(clip);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_requires_empty_target() {
        let mut song = SimSong::new(2, 2).with_clip(0, 0, "a").with_clip(0, 1, "b");
        assert!(song.duplicate_clip(0, 0, 1).is_err());
        song.delete_clip(0, 1).unwrap();
        song.duplicate_clip(0, 0, 1).unwrap();
        assert_eq!(song.clip(0, 1).unwrap().name, "a");
    }

    #[test]
    fn test_locked_slot_rejects_writes() {
        let mut song = SimSong::new(1, 2).with_clip(0, 0, "a");
        song.lock_slot(0, 1);
        assert!(matches!(
            song.duplicate_clip(0, 0, 1),
            Err(HostError::Rejected(_))
        ));
    }

    #[test]
    fn test_truncate_shrinks_model() {
        let mut song = SimSong::new(8, 8);
        song.select_track(7);
        song.truncate(4, 3);
        assert_eq!(song.track_count(), 4);
        assert_eq!(song.scene_count(), 3);
        assert_eq!(song.selected_track(), None);
        assert!(!song.has_slot(0, 3));
    }
}

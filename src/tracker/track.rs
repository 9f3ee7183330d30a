//! Tracked objects and the table that owns them.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::tracker::rect::Point;
use crate::tracker::track_state::TrackState;

/// Single tracked object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    /// Unique track identifier, never reused by the owning tracker
    pub track_id: u64,
    /// Centroid of the last matched detection
    pub centroid: Point,
    /// Consecutive frames without a match
    pub missed: u32,
    /// Frames in which the track was born or matched
    pub hits: u64,
    /// Frame in which the track was born
    pub start_frame: u64,
    /// Frame of the last match (or birth)
    pub frame_id: u64,
}

impl Track {
    pub(crate) fn new(track_id: u64, centroid: Point, frame_id: u64) -> Self {
        Self {
            track_id,
            centroid,
            missed: 0,
            hits: 1,
            start_frame: frame_id,
            frame_id,
        }
    }

    pub fn state(&self) -> TrackState {
        if self.missed == 0 {
            TrackState::Tracked
        } else {
            TrackState::Lost
        }
    }

    pub(crate) fn update(&mut self, centroid: Point, frame_id: u64) {
        self.centroid = centroid;
        self.missed = 0;
        self.hits += 1;
        self.frame_id = frame_id;
    }

    pub(crate) fn mark_missed(&mut self) {
        self.missed = self.missed.saturating_add(1);
    }
}

/// Live tracks keyed by id.
///
/// Ids are handed out in strictly increasing order, so key order is also
/// creation order and iteration is deterministic.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TrackTable {
    tracks: BTreeMap<u64, Track>,
}

impl TrackTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, track_id: u64) -> Option<&Track> {
        self.tracks.get(&track_id)
    }

    pub fn contains(&self, track_id: u64) -> bool {
        self.tracks.contains_key(&track_id)
    }

    /// Tracks in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &Track> {
        self.tracks.values()
    }

    pub fn ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.tracks.keys().copied()
    }

    /// `(id, centroid)` pairs in creation order.
    pub fn centroids(&self) -> impl Iterator<Item = (u64, Point)> + '_ {
        self.tracks.iter().map(|(&id, t)| (id, t.centroid))
    }

    pub(crate) fn insert(&mut self, track: Track) {
        self.tracks.insert(track.track_id, track);
    }

    pub(crate) fn get_mut(&mut self, track_id: u64) -> Option<&mut Track> {
        self.tracks.get_mut(&track_id)
    }

    pub(crate) fn remove(&mut self, track_id: u64) -> Option<Track> {
        self.tracks.remove(&track_id)
    }
}

impl<'a> IntoIterator for &'a TrackTable {
    type Item = &'a Track;
    type IntoIter = std::collections::btree_map::Values<'a, u64, Track>;

    fn into_iter(self) -> Self::IntoIter {
        self.tracks.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_lifecycle_fields() {
        let mut track = Track::new(3, Point::new(1.0, 2.0), 5);
        assert_eq!(track.state(), TrackState::Tracked);
        assert_eq!((track.hits, track.start_frame, track.frame_id), (1, 5, 5));

        track.mark_missed();
        track.mark_missed();
        assert_eq!(track.missed, 2);
        assert_eq!(track.state(), TrackState::Lost);

        track.update(Point::new(4.0, 4.0), 8);
        assert_eq!(track.missed, 0);
        assert_eq!(track.hits, 2);
        assert_eq!(track.frame_id, 8);
        assert_eq!(track.start_frame, 5);
        assert_eq!(track.centroid, Point::new(4.0, 4.0));
    }

    #[test]
    fn test_counters_do_not_overflow() {
        let mut track = Track::new(0, Point::new(0.0, 0.0), u64::from(u32::MAX) + 1);
        track.missed = u32::MAX;
        track.mark_missed();
        assert_eq!(track.missed, u32::MAX);

        track.update(Point::new(1.0, 1.0), u64::from(u32::MAX) + 2);
        assert_eq!(track.frame_id, 4_294_967_297);
        assert_eq!(track.hits, 2);
    }

    #[test]
    fn test_table_iterates_in_id_order() {
        let mut table = TrackTable::new();
        for id in [0, 1, 2] {
            table.insert(Track::new(id, Point::new(id as f32, 0.0), 1));
        }
        table.remove(1);

        assert_eq!(table.len(), 2);
        assert!(!table.contains(1));
        assert_eq!(table.ids().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(
            table.centroids().collect::<Vec<_>>(),
            vec![(0, Point::new(0.0, 0.0)), (2, Point::new(2.0, 0.0))]
        );
        assert_eq!((&table).into_iter().count(), 2);
    }
}

//! Centroid tracker: association and track lifecycle.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::tracker::error::Result;
use crate::tracker::matching::{self, AssignmentSolver, CostMatrix, LapjvSolver};
use crate::tracker::rect::{Point, Rect};
use crate::tracker::track::{Track, TrackTable};

/// Configuration for the CentroidTracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Consecutive missed frames tolerated before a track is dropped
    pub max_lost: u32,
    /// Id given to the first track
    pub first_id: u64,
    /// Reject solver pairs farther apart than this. `None` matches at any distance.
    pub max_distance: Option<f32>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_lost: 10,
            first_id: 0,
            max_distance: None,
        }
    }
}

/// Solver output translated from matrix coordinates into track ids and
/// detection indices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Association {
    pub matches: Vec<(u64, usize)>,
    /// In table order
    pub unmatched_tracks: Vec<u64>,
    /// In detection order
    pub unmatched_detections: Vec<usize>,
}

impl Association {
    /// Classify solver pairs against the cost matrix they were solved from.
    ///
    /// Pairs costing more than `max_distance` count as unmatched on both sides.
    pub fn from_pairs(
        cost: &CostMatrix,
        pairs: &[(usize, usize)],
        track_ids: &[u64],
        max_distance: Option<f32>,
    ) -> Self {
        let (_, num_dets) = cost.dim();
        let mut matched_dets = vec![false; num_dets];
        let mut matches = Vec::with_capacity(pairs.len());

        for &(row, col) in pairs {
            let distance = cost.cost(row, col);
            if max_distance.is_some_and(|max| distance > max) {
                continue;
            }
            let (track_id, det_idx) = cost.resolve(row, col);
            matched_dets[det_idx] = true;
            matches.push((track_id, det_idx));
        }

        let unmatched_tracks = track_ids
            .iter()
            .copied()
            .filter(|id| !matches.iter().any(|&(m, _)| m == *id))
            .collect();
        let unmatched_detections = matched_dets
            .iter()
            .enumerate()
            .filter_map(|(i, &m)| if m { None } else { Some(i) })
            .collect();

        Self {
            matches,
            unmatched_tracks,
            unmatched_detections,
        }
    }
}

/// Assigns persistent ids to per-frame detections by centroid proximity.
///
/// One instance per stream. `update` takes `&mut self`, so callers sharing a
/// tracker across threads must serialize frames themselves; separate
/// instances share nothing.
#[derive(Debug, Clone)]
pub struct CentroidTracker<S = LapjvSolver> {
    tracks: TrackTable,
    next_id: u64,
    frame_id: u64,
    config: TrackerConfig,
    solver: S,
}

impl CentroidTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_solver(config, LapjvSolver)
    }
}

impl Default for CentroidTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl<S: AssignmentSolver> CentroidTracker<S> {
    pub fn with_solver(config: TrackerConfig, solver: S) -> Self {
        Self {
            tracks: TrackTable::new(),
            next_id: config.first_id,
            frame_id: 0,
            config,
            solver,
        }
    }

    /// Process one frame of bounding boxes and return the live tracks.
    ///
    /// A box with non-positive or non-finite geometry rejects the whole
    /// frame: the error is returned and no track, id or frame counter
    /// changes.
    pub fn update(&mut self, boxes: &[Rect]) -> Result<&TrackTable> {
        let centroids = match boxes.iter().map(Rect::centroid).collect::<Result<Vec<_>>>() {
            Ok(centroids) => centroids,
            Err(e) => {
                warn!(frame = self.frame_id + 1, error = %e, "rejecting frame");
                return Err(e);
            }
        };

        // Step 1: Nothing detected, every track misses this frame
        if centroids.is_empty() {
            self.frame_id += 1;
            let ids: Vec<u64> = self.tracks.ids().collect();
            let lost = self.mark_missed(&ids);
            debug!(frame = self.frame_id, lost, live = self.tracks.len(), "empty frame");
            return Ok(&self.tracks);
        }

        // Step 2: Nothing tracked yet, every detection starts a track
        if self.tracks.is_empty() {
            self.frame_id += 1;
            for &centroid in &centroids {
                self.add_track(centroid);
            }
            debug!(frame = self.frame_id, born = centroids.len(), "initialized tracks");
            return Ok(&self.tracks);
        }

        // Step 3: Associate against a snapshot of the table
        let snapshot: Vec<(u64, Point)> = self.tracks.centroids().collect();
        let cost = matching::centroid_distance(&snapshot, &centroids);
        let pairs = self.solver.solve(cost.costs())?;
        let track_ids: Vec<u64> = snapshot.iter().map(|&(id, _)| id).collect();
        let Association {
            matches,
            unmatched_tracks,
            unmatched_detections,
        } = Association::from_pairs(&cost, &pairs, &track_ids, self.config.max_distance);

        // Step 4: Apply
        self.frame_id += 1;
        let frame_id = self.frame_id;
        for &(track_id, det_idx) in &matches {
            if let Some(track) = self.tracks.get_mut(track_id) {
                let distance = matching::centroid_gap(&track.centroid, &centroids[det_idx]);
                trace!(track_id, det_idx, distance, frame = frame_id, "matched");
                track.update(centroids[det_idx], frame_id);
            }
        }
        let lost = self.mark_missed(&unmatched_tracks);
        for &det_idx in &unmatched_detections {
            self.add_track(centroids[det_idx]);
        }

        debug!(
            frame = frame_id,
            matched = matches.len(),
            lost,
            born = unmatched_detections.len(),
            live = self.tracks.len(),
            "frame updated"
        );
        Ok(&self.tracks)
    }

    pub fn tracks(&self) -> &TrackTable {
        &self.tracks
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Number of frames accepted so far.
    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    /// Id the next new track will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    fn add_track(&mut self, centroid: Point) -> u64 {
        let track_id = self.next_id;
        self.next_id += 1;
        debug!(track_id, frame = self.frame_id, x = centroid.x, y = centroid.y, "track born");
        self.tracks.insert(Track::new(track_id, centroid, self.frame_id));
        track_id
    }

    /// Age the given tracks by one frame, dropping those past `max_lost`.
    /// Returns how many were aged.
    fn mark_missed(&mut self, ids: &[u64]) -> usize {
        let mut aged = 0;
        for &track_id in ids {
            let Some(track) = self.tracks.get_mut(track_id) else {
                continue;
            };
            track.mark_missed();
            aged += 1;
            if track.missed > self.config.max_lost {
                self.tracks.remove(track_id);
                debug!(track_id, frame = self.frame_id, "track removed");
            }
        }
        aged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::error::TrackerError;
    use crate::tracker::hungarian::HungarianSolver;

    fn square(cx: f32, cy: f32) -> Rect {
        Rect::from_xywh(cx, cy, 10.0, 10.0)
    }

    #[test]
    fn test_association_translates_ids() {
        let snapshot = [(4, Point::new(0.0, 0.0)), (6, Point::new(100.0, 0.0))];
        let dets = [Point::new(101.0, 0.0), Point::new(50.0, 50.0), Point::new(1.0, 0.0)];
        let cost = matching::centroid_distance(&snapshot, &dets);
        let pairs = LapjvSolver.solve(cost.costs()).unwrap();

        let assoc = Association::from_pairs(&cost, &pairs, &[4, 6], None);
        assert_eq!(assoc.matches, vec![(4, 2), (6, 0)]);
        assert!(assoc.unmatched_tracks.is_empty());
        assert_eq!(assoc.unmatched_detections, vec![1]);
    }

    #[test]
    fn test_association_gating() {
        let snapshot = [(0, Point::new(0.0, 0.0)), (1, Point::new(100.0, 0.0))];
        let dets = [Point::new(2.0, 0.0), Point::new(400.0, 0.0)];
        let cost = matching::centroid_distance(&snapshot, &dets);
        let pairs = LapjvSolver.solve(cost.costs()).unwrap();

        let ungated = Association::from_pairs(&cost, &pairs, &[0, 1], None);
        assert_eq!(ungated.matches, vec![(0, 0), (1, 1)]);

        let gated = Association::from_pairs(&cost, &pairs, &[0, 1], Some(50.0));
        assert_eq!(gated.matches, vec![(0, 0)]);
        assert_eq!(gated.unmatched_tracks, vec![1]);
        assert_eq!(gated.unmatched_detections, vec![1]);
    }

    #[test]
    fn test_first_frame_creates_tracks_in_order() {
        let mut tracker = CentroidTracker::default();
        let table = tracker.update(&[square(10.0, 10.0), square(50.0, 50.0)]).unwrap();

        assert_eq!(
            table.centroids().collect::<Vec<_>>(),
            vec![(0, Point::new(10.0, 10.0)), (1, Point::new(50.0, 50.0))]
        );
        assert_eq!(tracker.frame_id(), 1);
        assert_eq!(tracker.next_id(), 2);
    }

    #[test]
    fn test_first_id_is_configurable() {
        let config = TrackerConfig {
            first_id: 100,
            ..TrackerConfig::default()
        };
        let mut tracker = CentroidTracker::new(config);
        let ids: Vec<u64> = tracker.update(&[square(0.0, 0.0)]).unwrap().ids().collect();
        assert_eq!(ids, vec![100]);
    }

    #[test]
    fn test_invalid_box_leaves_state_untouched() {
        let mut tracker = CentroidTracker::default();
        tracker.update(&[square(10.0, 10.0)]).unwrap();
        let before = tracker.tracks().clone();

        let err = tracker
            .update(&[square(10.0, 10.0), Rect::new(0.0, 0.0, 0.0, 5.0)])
            .unwrap_err();
        assert!(matches!(err, TrackerError::InvalidBox { .. }));
        assert_eq!(tracker.frame_id(), 1);
        assert_eq!(tracker.next_id(), 1);
        assert_eq!(
            tracker.tracks().iter().collect::<Vec<_>>(),
            before.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_matched_track_bookkeeping() {
        let mut tracker = CentroidTracker::default();
        tracker.update(&[square(10.0, 10.0)]).unwrap();
        tracker.update(&[]).unwrap();
        tracker.update(&[square(12.0, 11.0)]).unwrap();

        let track = tracker.tracks().get(0).unwrap();
        assert_eq!(track.centroid, Point::new(12.0, 11.0));
        assert_eq!(track.missed, 0);
        assert_eq!(track.hits, 2);
        assert_eq!(track.start_frame, 1);
        assert_eq!(track.frame_id, 3);
    }

    #[test]
    fn test_max_distance_births_instead_of_teleporting() {
        let config = TrackerConfig {
            max_distance: Some(30.0),
            ..TrackerConfig::default()
        };
        let mut tracker = CentroidTracker::new(config);
        tracker.update(&[square(10.0, 10.0)]).unwrap();
        let table = tracker.update(&[square(300.0, 300.0)]).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get(0).unwrap().missed, 1);
        assert_eq!(table.get(1).unwrap().centroid, Point::new(300.0, 300.0));
    }

    #[test]
    fn test_without_gating_far_detection_takes_the_id() {
        let mut tracker = CentroidTracker::default();
        tracker.update(&[square(10.0, 10.0)]).unwrap();
        let table = tracker.update(&[square(300.0, 300.0)]).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get(0).unwrap().centroid, Point::new(300.0, 300.0));
    }

    #[test]
    fn test_far_detection_matches_without_overflow() {
        let mut tracker = CentroidTracker::default();
        tracker.update(&[Rect::new(0.0, 0.0, 1.0, 1.0)]).unwrap();

        let table = tracker.update(&[Rect::new(3.0e38, 3.0e38, 1.0, 1.0)]).unwrap();
        assert_eq!(table.ids().collect::<Vec<_>>(), vec![0]);
        assert_eq!(table.get(0).unwrap().missed, 0);
    }

    #[test]
    fn test_frame_counter_past_u32() {
        let mut tracker = CentroidTracker::default();
        tracker.frame_id = u64::from(u32::MAX);
        tracker.update(&[square(10.0, 10.0)]).unwrap();
        tracker.update(&[square(11.0, 10.0)]).unwrap();

        assert_eq!(tracker.frame_id(), u64::from(u32::MAX) + 2);
        let track = tracker.tracks().get(0).unwrap();
        assert_eq!(track.start_frame, u64::from(u32::MAX) + 1);
        assert_eq!(track.frame_id, u64::from(u32::MAX) + 2);
    }

    #[test]
    fn test_borrowed_solver() {
        let solver = HungarianSolver;
        let mut tracker = CentroidTracker::with_solver(TrackerConfig::default(), &solver);
        tracker.update(&[square(10.0, 10.0), square(80.0, 10.0)]).unwrap();
        let table = tracker.update(&[square(82.0, 11.0), square(9.0, 12.0)]).unwrap();

        assert_eq!(
            table.centroids().collect::<Vec<_>>(),
            vec![(0, Point::new(9.0, 12.0)), (1, Point::new(82.0, 11.0))]
        );
    }

    #[test]
    fn test_solvers_agree_on_sequence() {
        let frames = vec![
            vec![square(10.0, 10.0), square(100.0, 10.0)],
            vec![square(102.0, 12.0), square(12.0, 12.0), square(200.0, 200.0)],
            vec![square(15.0, 14.0)],
            vec![],
            vec![square(104.0, 15.0), square(17.0, 15.0)],
        ];
        let mut lapjv = CentroidTracker::new(TrackerConfig::default());
        let mut hungarian = CentroidTracker::with_solver(TrackerConfig::default(), HungarianSolver);

        for frame in &frames {
            let a: Vec<Track> = lapjv.update(frame).unwrap().iter().cloned().collect();
            let b: Vec<Track> = hungarian.update(frame).unwrap().iter().cloned().collect();
            assert_eq!(a, b);
        }
    }
}

/// Track state derived from the consecutive-miss counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Matched in the most recent frame
    #[default]
    Tracked,
    /// Missed in one or more recent frames, still within `max_lost`
    Lost,
}

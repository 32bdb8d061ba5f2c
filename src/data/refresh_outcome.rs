/// Result of feeding one payload into the playback tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Nothing the display cares about has changed
    Unchanged,
    /// Same track, but the album art URI moved
    ImageUpdated,
    /// A different track is now playing
    TrackChanged,
}

impl RefreshOutcome {
    /// True when the display should fetch new album art and redraw
    pub fn needs_redraw(&self) -> bool {
        !matches!(self, RefreshOutcome::Unchanged)
    }
}

impl Default for RefreshOutcome {
    fn default() -> Self {
        RefreshOutcome::Unchanged
    }
}

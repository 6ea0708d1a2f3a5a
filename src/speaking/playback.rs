//! Gapless scheduling of reply audio
//!
//! Times are seconds on the session clock. A clip never starts before the
//! previous one ends; an interruption drops everything queued.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledClip {
    pub id: u64,
    pub start: f64,
    pub duration: f64,
}

impl ScheduledClip {
    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

#[derive(Debug, Default)]
pub struct PlaybackScheduler {
    cursor: f64,
    clips: Vec<ScheduledClip>,
    next_id: u64,
}

impl PlaybackScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a clip of `duration` seconds
    pub fn schedule(&mut self, now: f64, duration: f64) -> ScheduledClip {
        self.prune(now);
        let start = self.cursor.max(now);
        let clip = ScheduledClip {
            id: self.next_id,
            start,
            duration: duration.max(0.0),
        };
        self.next_id += 1;
        self.cursor = clip.end();
        self.clips.push(clip);
        clip
    }

    /// Drop every pending or playing clip and restart the cursor at `now`.
    /// Returns how many clips were cleared.
    pub fn interrupt(&mut self, now: f64) -> usize {
        let cleared = self.clips.len();
        self.clips.clear();
        self.cursor = now;
        cleared
    }

    /// Forget clips that finished before `now`
    pub fn prune(&mut self, now: f64) {
        self.clips.retain(|clip| clip.end() > now);
    }

    /// Clips still pending or playing
    pub fn active(&self) -> &[ScheduledClip] {
        &self.clips
    }

    /// When the last queued clip ends
    pub fn cursor(&self) -> f64 {
        self.cursor
    }
}

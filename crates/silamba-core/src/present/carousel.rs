use std::time::{Duration, Instant};

/// How often the hero banner carousel advances.
pub const BANNER_AUTOPLAY_INTERVAL: Duration = Duration::from_secs(5);

/// How often a placement slot rotates to its next advertisement.
pub const AD_ROTATION_INTERVAL: Duration = Duration::from_secs(8);

/// Cyclic index over a list of `len` items.
///
/// The length is re-synced whenever the underlying list changes, so the
/// index never points past the end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Carousel {
    index: usize,
    len: usize,
}

impl Carousel {
    pub fn new(len: usize) -> Self {
        Self { index: 0, len }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.index >= len {
            self.index = 0;
        }
    }

    /// Advance one slide, wrapping at the end. Lists of one or zero items
    /// stay put.
    pub fn tick(&mut self) {
        if self.len > 1 {
            self.index = (self.index + 1) % self.len;
        }
    }

    pub fn prev(&mut self) {
        if self.len > 1 {
            self.index = (self.index + self.len - 1) % self.len;
        }
    }

    pub fn select(&mut self, index: usize) {
        if index < self.len {
            self.index = index;
        }
    }

    pub fn current<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        items.get(self.index)
    }
}

/// Fixed-interval timer that says when a carousel should tick.
#[derive(Debug, Clone, Copy)]
pub struct Autoplay {
    interval: Duration,
    last: Instant,
    paused: bool,
}

impl Autoplay {
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last: now,
            paused: false,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True once per elapsed interval. Manual navigation should call
    /// `restart` so the slide the user picked stays up a full interval.
    pub fn due(&mut self, now: Instant) -> bool {
        if self.paused || now.saturating_duration_since(self.last) < self.interval {
            return false;
        }
        self.last = now;
        true
    }

    pub fn restart(&mut self, now: Instant) {
        self.last = now;
    }

    pub fn set_paused(&mut self, paused: bool, now: Instant) {
        self.paused = paused;
        self.last = now;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Tick `carousel` if the interval has elapsed. Returns whether it moved.
    pub fn drive(&mut self, carousel: &mut Carousel, now: Instant) -> bool {
        if carousel.len() <= 1 || !self.due(now) {
            return false;
        }
        carousel.tick();
        true
    }
}

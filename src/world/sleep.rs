//! Awake/sleeping bookkeeping.

use crate::integration::TIME_EPSILON;
use crate::objects::Body;

use super::EngineConfig;

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SleepThresholds {
    pub linear: f64,
    pub angular: f64,
    pub time: f64,
}

impl SleepThresholds {
    pub(crate) fn from_config(config: &EngineConfig) -> Self {
        Self {
            linear: config.velocity_sleep_threshold,
            angular: config.angular_sleep_threshold,
            time: config.sleep_time_threshold,
        }
    }

    /// Below both speed thresholds.
    pub(crate) fn is_resting(&self, body: &Body) -> bool {
        body.velocity.length() < self.linear && body.angular_velocity.abs() < self.angular
    }

    /// Whether `body` hitting a sleeping body should wake it: it must be
    /// awake and actually moving, otherwise the sleeper stays put.
    pub(crate) fn wakes_on_contact(&self, body: &Body) -> bool {
        body.is_active() && body.velocity.length() >= self.linear
    }

    /// Advances the rest timer after a sub-step of length `dt`. Returns true
    /// once the body has rested long enough and should fall asleep.
    pub(crate) fn update_timer(&self, body: &mut Body, dt: f64) -> bool {
        if !body.is_active() || !body.can_sleep {
            body.sleep_timer = 0.0;
            return false;
        }
        if !self.is_resting(body) {
            body.sleep_timer = 0.0;
            return false;
        }
        body.sleep_timer += dt;
        self.has_rested(body.sleep_timer)
    }

    pub(crate) fn has_rested(&self, seconds: f64) -> bool {
        seconds + TIME_EPSILON >= self.time
    }
}

/// Groups awake bodies that touch each other so a resting pile falls asleep
/// as one. Sleeping its members one at a time lets a settled body go
/// immovable under neighbours that are still settling.
#[derive(Debug, Clone, Default)]
pub(crate) struct SleepIslands {
    parent: Vec<usize>,
    /// Shortest rest timer in each island, stored at its root.
    rest: Vec<f64>,
}

impl SleepIslands {
    /// Starts over with `len` singleton islands.
    pub(crate) fn reset(&mut self, len: usize) {
        self.parent.clear();
        self.parent.extend(0..len);
        self.rest.clear();
        self.rest.resize(len, f64::INFINITY);
    }

    fn find(&mut self, mut index: usize) -> usize {
        while self.parent[index] != index {
            self.parent[index] = self.parent[self.parent[index]];
            index = self.parent[index];
        }
        index
    }

    pub(crate) fn link(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a != root_b {
            let (low, high) = (root_a.min(root_b), root_a.max(root_b));
            self.parent[high] = low;
            self.rest[low] = self.rest[low].min(self.rest[high]);
        }
    }

    pub(crate) fn record(&mut self, index: usize, rest_time: f64) {
        let root = self.find(index);
        self.rest[root] = self.rest[root].min(rest_time);
    }

    /// How long the least rested member of `index`'s island has rested.
    pub(crate) fn rest_time(&mut self, index: usize) -> f64 {
        let root = self.find(index);
        self.rest[root]
    }
}

//! Pointer dragging of engine bodies with release momentum.

use std::collections::VecDeque;

use crate::error::{ConfigError, EngineError};
use crate::math::Vec2;
use crate::objects::BodyId;
use crate::world::Engine;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragOptions {
    /// Seconds of pointer history used to estimate the release velocity. Default: 0.1.
    pub sample_window: f64,
    /// Release speed cap in world units per second. Default: 5000.
    pub max_release_speed: f64,
}

impl Default for DragOptions {
    fn default() -> Self {
        Self {
            sample_window: 0.1,
            max_release_speed: 5000.0,
        }
    }
}

impl DragOptions {
    pub fn validate(&self) -> Result<(), ConfigError> {
        ConfigError::check_positive("sample_window", self.sample_window)?;
        ConfigError::check_positive("max_release_speed", self.max_release_speed)
    }
}

/// Moves one body with the pointer.
///
/// While held, the body is driven by velocity rather than teleported, so it
/// still pushes other bodies out of the way. On release it keeps the
/// pointer's recent velocity.
#[derive(Debug, Clone)]
pub struct DragController {
    body: BodyId,
    /// Body position minus pointer position at grab time.
    grab_offset: Vec2,
    clock: f64,
    samples: VecDeque<(f64, Vec2)>,
    options: DragOptions,
}

impl DragController {
    /// Grabs `body` at `pointer`, waking it and cancelling its motion.
    pub fn grab(engine: &mut Engine, body: BodyId, pointer: Vec2) -> Result<Self, EngineError> {
        Self::grab_with(engine, body, pointer, DragOptions::default())
    }

    pub fn grab_with(
        engine: &mut Engine,
        body: BodyId,
        pointer: Vec2,
        options: DragOptions,
    ) -> Result<Self, EngineError> {
        options.validate()?;
        let position = engine.body(body).ok_or(EngineError::BodyNotFound(body))?.position;
        engine.set_velocity(body, Vec2::ZERO)?;
        engine.wake_body(body)?;

        let mut samples = VecDeque::new();
        samples.push_back((0.0, pointer));
        Ok(Self {
            body,
            grab_offset: position - pointer,
            clock: 0.0,
            samples,
            options,
        })
    }

    /// Grabs the last dynamic body under `pointer`, if any.
    pub fn grab_at(engine: &mut Engine, pointer: Vec2) -> Option<Self> {
        let hit = engine
            .query_point(pointer)
            .filter(|&id| engine.body(id).map_or(false, |body| body.is_dynamic()))
            .last()?;
        Self::grab(engine, hit, pointer).ok()
    }

    pub fn body(&self) -> BodyId {
        self.body
    }

    pub fn grab_offset(&self) -> Vec2 {
        self.grab_offset
    }

    /// Where the body should be for the given pointer position.
    pub fn target_for(&self, pointer: Vec2) -> Vec2 {
        pointer + self.grab_offset
    }

    /// Records a pointer move `dt` seconds after the previous one and steers
    /// the body to arrive under the pointer over the same interval. A zero
    /// `dt` teleports the body instead.
    pub fn move_to(&mut self, engine: &mut Engine, pointer: Vec2, dt: f64) -> Result<(), EngineError> {
        let target = self.target_for(pointer);
        if dt > 0.0 && dt.is_finite() {
            self.clock += dt;
            self.record(pointer);
            let position = engine.body(self.body).ok_or(EngineError::BodyNotFound(self.body))?.position;
            engine.set_velocity(self.body, (target - position) / dt)
        } else {
            self.record(pointer);
            engine.set_position(self.body, target)?;
            engine.set_velocity(self.body, Vec2::ZERO)
        }
    }

    fn record(&mut self, pointer: Vec2) {
        match self.samples.back_mut() {
            // No time has passed: the newer pointer replaces the older one.
            Some(last) if last.0 == self.clock => last.1 = pointer,
            _ => self.samples.push_back((self.clock, pointer)),
        }
        let horizon = self.clock - self.options.sample_window;
        // Keep one sample at or before the horizon so the window stays full.
        while self.samples.len() > 2 && self.samples[1].0 <= horizon {
            self.samples.pop_front();
        }
    }

    /// Pointer velocity over the sample window, capped at `max_release_speed`.
    pub fn pointer_velocity(&self) -> Vec2 {
        let (Some(&(t0, p0)), Some(&(t1, p1))) = (self.samples.front(), self.samples.back()) else {
            return Vec2::ZERO;
        };
        let span = t1 - t0;
        if span <= 0.0 {
            return Vec2::ZERO;
        }
        ((p1 - p0) / span).clamp_length(self.options.max_release_speed)
    }

    /// Lets go, handing the body the pointer's velocity. Returns that velocity.
    pub fn release(self, engine: &mut Engine) -> Result<Vec2, EngineError> {
        let velocity = self.pointer_velocity();
        engine.set_velocity(self.body, velocity)?;
        log::debug!("released body {} at {:.1} units/s", self.body, velocity.length());
        Ok(velocity)
    }
}

//! Five-segment envelope generator.
//!
//! Attack, hold, decay, sustain and release, followed by a terminal end
//! segment. The same state machine drives the amplitude and the pitch
//! envelope of every operator; only the parameters differ.
//!
//! Every segment starts from the level captured when it was entered, so a
//! transition (including an early release) never produces a step in the
//! output.

#[allow(unused_imports)]
use num_traits::float::Float;

use crate::resources::{apply_shape, shape_table};
use crate::utils::sanitize;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    #[default]
    Attack,

    Hold,
    Decay,
    Sustain,
    Release,
    End,
}

/// Segment durations in frames and the sustain level.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub hold: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

impl EnvelopeParams {
    /// Builds parameters from durations in frames. Negative or non-finite
    /// durations collapse to zero and the sustain level is clamped to `0..=1`.
    pub fn new(attack: f32, hold: f32, decay: f32, sustain: f32, release: f32) -> Self {
        Self {
            attack: sanitize(attack, 0.0, f32::MAX, 0.0),
            hold: sanitize(hold, 0.0, f32::MAX, 0.0),
            decay: sanitize(decay, 0.0, f32::MAX, 0.0),
            sustain: sanitize(sustain, 0.0, 1.0, 0.0),
            release: sanitize(release, 0.0, f32::MAX, 0.0),
        }
    }

    #[inline]
    fn duration(&self, segment: Segment) -> Option<f32> {
        match segment {
            Segment::Attack => Some(self.attack),
            Segment::Hold => Some(self.hold),
            Segment::Decay => Some(self.decay),
            Segment::Release => Some(self.release),
            Segment::Sustain | Segment::End => None,
        }
    }
}

/// Attack, decay and release curves, resolved once per note.
#[derive(Debug, Clone, Copy)]
pub struct ShapeSet {
    pub attack: &'static [f32],
    pub decay: &'static [f32],
    pub release: &'static [f32],
}

impl ShapeSet {
    pub fn new(attack: f32, decay: f32, release: f32) -> Self {
        Self {
            attack: shape_table(attack),
            decay: shape_table(decay),
            release: shape_table(release),
        }
    }
}

impl Default for ShapeSet {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

#[derive(Debug, Clone)]
pub struct Envelope {
    segment: Segment,
    elapsed: f32,
    start: f32,
    level: f32,
    shapes: Option<ShapeSet>,
}

impl Envelope {
    pub fn new() -> Self {
        Self {
            segment: Segment::End,
            elapsed: 0.0,
            start: 0.0,
            level: 0.0,
            shapes: None,
        }
    }

    /// Restarts from the attack segment at zero and forgets the cached shapes.
    pub fn note_on(&mut self) {
        self.enter(Segment::Attack, 0.0);
        self.level = 0.0;
        self.shapes = None;
    }

    /// Restarts the attack from the current output level.
    pub fn retrigger(&mut self) {
        self.enter(Segment::Attack, self.level);
    }

    /// Moves to the release segment from wherever the envelope is, starting
    /// at the current output level.
    pub fn note_off(&mut self) {
        if !matches!(self.segment, Segment::Release | Segment::End) {
            self.enter(Segment::Release, self.level);
        }
    }

    /// Shapes are looked up on the first block of a note and kept until the
    /// next hard note on.
    #[inline]
    pub fn needs_shapes(&self) -> bool {
        self.shapes.is_none()
    }

    #[inline]
    pub fn set_shapes(&mut self, shapes: ShapeSet) {
        self.shapes = Some(shapes);
    }

    #[inline]
    pub fn segment(&self) -> Segment {
        self.segment
    }

    #[inline]
    pub fn level(&self) -> f32 {
        self.level
    }

    #[inline]
    pub fn is_done(&self) -> bool {
        self.segment == Segment::End
    }

    #[inline]
    fn enter(&mut self, segment: Segment, start: f32) {
        self.segment = segment;
        self.elapsed = 0.0;
        self.start = start;
    }

    /// Advances by `frames` and returns the output level at the new position.
    /// Zero-length segments are passed through within the same call.
    pub fn step(&mut self, params: &EnvelopeParams, frames: f32) -> f32 {
        let mut frames = sanitize(frames, 0.0, f32::MAX, 0.0);

        while let Some(duration) = params.duration(self.segment) {
            if self.elapsed + frames < duration {
                self.elapsed += frames;
                break;
            }

            frames = (self.elapsed + frames - duration).max(0.0);
            match self.segment {
                Segment::Attack => self.enter(Segment::Hold, 1.0),
                Segment::Hold => self.enter(Segment::Decay, 1.0),
                Segment::Decay => self.enter(Segment::Sustain, params.sustain),
                Segment::Release => self.enter(Segment::End, 0.0),
                Segment::Sustain | Segment::End => break,
            }
        }

        self.level = self.value(params);
        self.level
    }

    /// Output level at the current position without advancing.
    pub fn value(&self, params: &EnvelopeParams) -> f32 {
        let shapes = self.shapes.unwrap_or_default();
        let progress = |duration: f32| {
            if duration > 0.0 {
                (self.elapsed / duration).clamp(0.0, 1.0)
            } else {
                1.0
            }
        };

        match self.segment {
            Segment::Attack => {
                let remaining = apply_shape(shapes.attack, progress(params.attack));
                self.start + (1.0 - self.start) * (1.0 - remaining)
            }
            Segment::Hold => self.start,
            Segment::Decay => {
                let remaining = apply_shape(shapes.decay, progress(params.decay));
                self.start + (params.sustain - self.start) * (1.0 - remaining)
            }
            Segment::Sustain => params.sustain,
            Segment::Release => {
                self.start * apply_shape(shapes.release, progress(params.release))
            }
            Segment::End => 0.0,
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}

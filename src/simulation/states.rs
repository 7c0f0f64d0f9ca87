//! Core state types for the galaxy simulation.
//!
//! - `Particle`: lightweight entity pulled by bodies, never by other particles
//! - `Body`: massive gravitational source with a bounded `Trail`
//! - `Rgba`: 8-bit colour carried for the renderer
//!
//! Everything is 2D and uses `NVec2` (nalgebra, f64).

use std::collections::VecDeque;

use nalgebra::Vector2;
pub type NVec2 = Vector2<f64>;

/// Cap on stored trail points per body
pub const MAX_TRAIL_LENGTH: usize = 50;

/// 8-bit RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Rgba::WHITE
    }
}

#[derive(Debug, Clone)]
pub struct Particle {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64, // mass
    pub age: f64, // seconds since emission
    pub lifetime: f64, // seconds
    pub active: bool,
    pub size: f32, // render size
    pub color: Rgba, // render colour
}

impl Particle {
    /// Template at `x` moving with `v`, unit mass, effectively immortal
    pub fn new(x: NVec2, v: NVec2) -> Self {
        Self {
            x,
            v,
            ..Default::default()
        }
    }

    /// Positive finite mass and finite position and velocity
    pub fn is_valid_template(&self) -> bool {
        self.m > 0.0
            && self.m.is_finite()
            && self.x.iter().all(|c| c.is_finite())
            && self.v.iter().all(|c| c.is_finite())
    }

    /// Fraction of life remaining, 1 at birth and 0 at expiry
    pub fn fade(&self) -> f32 {
        if self.lifetime <= 0.0 {
            return 0.0;
        }
        (1.0 - self.age / self.lifetime).clamp(0.0, 1.0) as f32
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            x: NVec2::zeros(),
            v: NVec2::zeros(),
            m: 1.0,
            age: 0.0,
            lifetime: 1.0e6,
            active: false,
            size: 1.0,
            color: Rgba::WHITE,
        }
    }
}

/// Bounded FIFO of past positions, oldest first
#[derive(Debug, Clone)]
pub struct Trail {
    points: VecDeque<NVec2>,
    cap: usize,
}

impl Trail {
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap + 1),
            cap,
        }
    }

    /// Append `p`, evicting the oldest point once over capacity
    pub fn push(&mut self, p: NVec2) {
        self.points.push_back(p);
        while self.points.len() > self.cap {
            self.points.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NVec2> + '_ {
        self.points.iter()
    }
}

impl Default for Trail {
    fn default() -> Self {
        Self::with_capacity(MAX_TRAIL_LENGTH)
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub x: NVec2, // position
    pub v: NVec2, // velocity
    pub m: f64, // mass, always > 0
    pub radius: f64, // render radius
    pub color: Rgba,
    pub trail: Trail,
}

impl Body {
    pub fn new(x: NVec2, v: NVec2, m: f64, radius: f64) -> Self {
        Self {
            x,
            v,
            m,
            radius,
            color: Rgba::WHITE,
            trail: Trail::default(),
        }
    }

    pub fn with_color(mut self, color: Rgba) -> Self {
        self.color = color;
        self
    }
}

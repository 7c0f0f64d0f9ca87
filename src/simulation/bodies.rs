//! Registry of massive bodies
//!
//! Small and growable. Bodies are never removed one at a time, only replaced
//! wholesale when a scenario loads.

use crate::error::{SimError, SimResult};
use crate::simulation::states::Body;

#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: Vec<Body>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self { bodies: Vec::new() }
    }

    /// Add a body; rejects non-positive (or NaN) mass and non-finite state
    pub fn push(&mut self, body: Body) -> SimResult<()> {
        Self::check(&body)?;
        self.bodies.push(body);
        Ok(())
    }

    pub(crate) fn check(body: &Body) -> SimResult<()> {
        if !(body.m > 0.0) {
            return Err(SimError::NonPositiveMass(body.m));
        }
        if !body.m.is_finite() {
            return Err(SimError::InvalidParameter { name: "mass", value: body.m });
        }
        if let Some(&c) = body.x.iter().chain(body.v.iter()).find(|c| !c.is_finite()) {
            return Err(SimError::InvalidParameter { name: "body state", value: c });
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.bodies.clear();
    }

    /// Drop every stored trail point
    pub fn clear_trails(&mut self) {
        for b in &mut self.bodies {
            b.trail.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&Body> {
        self.bodies.get(i)
    }

    pub fn as_slice(&self) -> &[Body] {
        &self.bodies
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Body> {
        self.bodies.iter()
    }

    // positions and velocities only; mass stays fixed once registered
    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, Body> {
        self.bodies.iter_mut()
    }
}

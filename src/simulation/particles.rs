//! Fixed-capacity particle store
//!
//! Every slot is allocated up front and reused in place. Emission looks for
//! an inactive slot starting from a rotating cursor, so steady-state emission
//! does not rescan the busy front of the buffer each time.

use crate::simulation::states::Particle;

#[derive(Debug, Clone)]
pub struct ParticleStore {
    slots: Vec<Particle>,
    cursor: usize, // where the next free-slot search starts
}

impl ParticleStore {
    /// Store with `capacity` inactive slots; capacity never changes afterwards
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Particle::default(); capacity],
            cursor: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Copy `template` into a free slot, with age 0 and marked active
    ///
    /// Returns `false` and changes nothing when every slot is in use or the
    /// template is not [`Particle::is_valid_template`].
    pub fn emit(&mut self, template: &Particle) -> bool {
        if !template.is_valid_template() {
            return false;
        }
        let Some(i) = self.find_inactive() else {
            return false;
        };

        let slot = &mut self.slots[i];
        *slot = template.clone();
        slot.age = 0.0;
        slot.active = true;

        self.cursor = (i + 1) % self.slots.len();
        true
    }

    /// Emit up to `count` copies of `template`; returns how many were placed
    pub fn emit_burst(&mut self, count: usize, template: &Particle) -> usize {
        let mut emitted = 0;
        while emitted < count && self.emit(template) {
            emitted += 1;
        }
        emitted
    }

    /// Deactivate every slot
    pub fn clear(&mut self) {
        for p in &mut self.slots {
            p.active = false;
        }
        self.cursor = 0;
    }

    /// O(P) scan; for diagnostics
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.active).count()
    }

    /// Every slot, active or not
    pub fn slots(&self) -> &[Particle] {
        &self.slots
    }

    /// Move the buffer out for a step; must be handed back with `restore_slots`
    pub(crate) fn take_slots(&mut self) -> Vec<Particle> {
        std::mem::take(&mut self.slots)
    }

    pub(crate) fn restore_slots(&mut self, slots: Vec<Particle>) {
        self.slots = slots;
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Particle> + '_ {
        self.slots.iter().filter(|p| p.active)
    }

    fn find_inactive(&self) -> Option<usize> {
        let n = self.slots.len();
        (0..n)
            .map(|k| (self.cursor + k) % n)
            .find(|&i| !self.slots[i].active)
    }
}

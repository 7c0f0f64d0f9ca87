//! Procedural initial conditions
//!
//! A [`ScenarioGenerator`] turns a [`ScenarioKind`] into a [`Scenario`]: a list
//! of bodies plus a list of particle templates, ready for
//! `Simulation::load_scenario`. Orbital speeds are derived from the
//! gravitational constant in use so the disks start close to circular orbits.
//!
//! Presets:
//! - `Spiral`: central black hole, bulge, four logarithmic arms, a few globular clusters
//! - `Binary`: two stars on opposite tracks, each with an accretion disk
//! - `Cluster`: a dense ball of stars with no bodies at all

use std::f64::consts::TAU;

use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp1, StandardNormal};
use serde::Deserialize;

use crate::simulation::states::{Body, NVec2, Particle, Rgba};

/// Lifetime given to preset particles; they only die by culling
pub const PRESET_LIFETIME: f64 = 1.0e6;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScenarioKind {
    #[default]
    #[serde(rename = "spiral")]
    Spiral,
    #[serde(rename = "binary")]
    Binary,
    #[serde(rename = "cluster")]
    Cluster,
}

impl ScenarioKind {
    pub const ALL: [ScenarioKind; 3] = [ScenarioKind::Spiral, ScenarioKind::Binary, ScenarioKind::Cluster];

    /// Next preset in demo order, wrapping around
    pub fn next(self) -> Self {
        match self {
            ScenarioKind::Spiral => ScenarioKind::Binary,
            ScenarioKind::Binary => ScenarioKind::Cluster,
            ScenarioKind::Cluster => ScenarioKind::Spiral,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ScenarioKind::Spiral => "spiral galaxy",
            ScenarioKind::Binary => "binary system",
            ScenarioKind::Cluster => "globular cluster",
        }
    }
}

/// Bodies and particle templates making up one initial state
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    pub bodies: Vec<Body>,
    pub particles: Vec<Particle>,
}

pub struct ScenarioGenerator {
    rng: StdRng,
}

impl ScenarioGenerator {
    /// Deterministic generator
    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }

    /// Generator seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    /// Orbital speeds scale with `sqrt(g)`; a negative or NaN `g` is treated as 0
    pub fn generate(&mut self, kind: ScenarioKind, center: NVec2, g: f64) -> Scenario {
        let g = g.max(0.0);
        let scenario = match kind {
            ScenarioKind::Spiral => self.spiral_galaxy(center, g),
            ScenarioKind::Binary => self.binary_system(center, g),
            ScenarioKind::Cluster => self.globular_cluster(center),
        };
        info!(
            "generated {} with {} particles and {} bodies",
            kind.name(),
            scenario.particles.len(),
            scenario.bodies.len()
        );
        scenario
    }

    /// Random pastel colour, each channel in [150, 255]
    pub fn pastel(&mut self) -> Rgba {
        Rgba::opaque(
            self.rng.gen_range(150..=255),
            self.rng.gen_range(150..=255),
            self.rng.gen_range(150..=255),
        )
    }

    // presets ==============================================================================

    fn spiral_galaxy(&mut self, center: NVec2, g: f64) -> Scenario {
        let black_hole = Body::new(center, NVec2::zeros(), 30_000.0, 5.0)
            .with_color(Rgba::opaque(255, 255, 200));
        let gm = g * black_hole.m;

        const NUM_ARMS: usize = 4;
        const MAX_RADIUS: f64 = 600.0;
        const CORE_RADIUS: f64 = 80.0;
        const ARM_WIDTH: f64 = 40.0;
        const DISK_THICKNESS: f64 = 15.0;
        const WINDING: f64 = 0.2;
        let arm_offset = TAU / NUM_ARMS as f64;
        let bar_radius = CORE_RADIUS * 1.5;

        let mut particles = Vec::with_capacity(30_000);

        // Bulge: dense, older, yellow-red, brighter toward the middle
        for _ in 0..8_000 {
            let r = (CORE_RADIUS * (1.0 - self.exponential(3.0) / 3.0)).max(3.0);
            let angle = self.angle();
            let bulge_height = self.normal(0.0, CORE_RADIUS * 0.3);

            let x = center + NVec2::new(r * angle.cos(), r * angle.sin() + bulge_height);
            let speed = (gm / r).sqrt() * self.rng.gen_range(0.5..1.5);
            let v = tangent(center, x) * speed;

            let (color, size) = self.bulge_star();
            let brightness = 1.0 + (1.0 - r / CORE_RADIUS) * 0.5;
            particles.push(star(x, v, brighten(color, brightness), size));
        }

        // Arms
        for i in 0..20_000 {
            let radius = CORE_RADIUS + (MAX_RADIUS - CORE_RADIUS) * self.unit().powf(0.6);
            let arm_base = (i % NUM_ARMS) as f64 * arm_offset;

            let mut spiral_angle = if radius < bar_radius {
                arm_base
            } else {
                arm_base + (radius / bar_radius).ln() * WINDING
            };

            let distance_ratio = (radius - CORE_RADIUS) / (MAX_RADIUS - CORE_RADIUS);
            let in_arm = self.unit() < 0.6;
            let arm_width = ARM_WIDTH * (1.0 - distance_ratio * 0.7);

            spiral_angle += if in_arm {
                self.normal(0.0, arm_width / radius.max(50.0))
            } else {
                self.rng.gen_range(-arm_offset / 2.0..arm_offset / 2.0)
            };

            let height = self.normal(0.0, DISK_THICKNESS) * (1.0 - distance_ratio * 0.7);
            let x = center + NVec2::new(radius * spiral_angle.cos(), radius * spiral_angle.sin() + height);
            let speed = (gm / radius).sqrt() * self.rng.gen_range(0.5..1.5);
            let v = tangent(center, x) * speed;

            let (color, size) = if in_arm { self.arm_star() } else { self.inter_arm_star() };

            // thin out the rim
            if distance_ratio > 0.7 && self.unit() > (1.0 - distance_ratio) * 2.0 {
                continue;
            }
            let edge_fade = if distance_ratio > 0.6 {
                (-5.0 * (distance_ratio - 0.6)).exp()
            } else {
                1.0
            };
            let color = color.with_alpha((color.a as f64 * edge_fade) as u8);
            particles.push(star(x, v, color, size));
        }

        // Globular clusters orbiting the disk
        let num_clusters = self.rng.gen_range(3..=6);
        for _ in 0..num_clusters {
            let cluster_radius = MAX_RADIUS * self.rng.gen_range(0.3..1.2);
            let cluster_angle = self.angle();
            let cluster_height = self.normal(0.0, 100.0);
            let cluster_center = center
                + NVec2::new(
                    cluster_radius * cluster_angle.cos(),
                    cluster_radius * cluster_angle.sin() + cluster_height,
                );

            let speed = (gm / cluster_radius).sqrt() * 0.8;
            let v = tangent(center, cluster_center) * speed;

            let stars = self.rng.gen_range(100..=300);
            for _ in 0..stars {
                let offset = NVec2::new(self.normal(0.0, 20.0), self.normal(0.0, 20.0));
                let size = 0.3 + self.unit() as f32 * 0.4;
                particles.push(star(cluster_center + offset, v, Rgba::opaque(255, 220, 180), size));
            }
        }

        Scenario {
            bodies: vec![black_hole],
            particles,
        }
    }

    fn binary_system(&mut self, center: NVec2, g: f64) -> Scenario {
        const SEPARATION: f64 = 200.0;
        const TOTAL_MASS: f64 = 5_000.0;

        let bodies = vec![
            Body::new(
                center + NVec2::new(-SEPARATION * 0.5, 0.0),
                NVec2::new(0.0, -30.0),
                TOTAL_MASS * 0.6,
                15.0,
            )
            .with_color(Rgba::opaque(255, 200, 100)),
            Body::new(
                center + NVec2::new(SEPARATION * 0.5, 0.0),
                NVec2::new(0.0, 30.0),
                TOTAL_MASS * 0.4,
                12.0,
            )
            .with_color(Rgba::opaque(100, 150, 255)),
        ];

        let mut particles = Vec::with_capacity(30_000);
        for i in 0..30_000 {
            let angle = self.angle();
            let radius = 50.0 + 300.0 * self.unit().powi(2);

            // a third of the disk material goes to the heavier star
            let host = &bodies[if i % 3 == 0 { 0 } else { 1 }];
            // flattened disk
            let x = host.x + NVec2::new(radius * angle.cos(), radius * angle.sin() * 0.3);
            let speed = (g * host.m / radius).sqrt();
            let v = host.v + tangent(host.x, x) * speed;

            let color = if i % 3 == 0 {
                Rgba::new(255, 220, 180, 150)
            } else {
                Rgba::new(180, 200, 255, 150)
            };
            particles.push(star(x, v, color, 1.0));
        }

        Scenario { bodies, particles }
    }

    fn globular_cluster(&mut self, center: NVec2) -> Scenario {
        const CLUSTER_RADIUS: f64 = 300.0;

        let mut particles = Vec::with_capacity(40_000);
        for _ in 0..40_000 {
            // uniform in a ball, projected onto the plane
            let theta = self.angle();
            let phi = (1.0 - 2.0 * self.unit()).acos();
            let r = CLUSTER_RADIUS * self.unit().cbrt();

            let x = center + NVec2::new(r * phi.sin() * theta.cos(), r * phi.sin() * theta.sin());
            let v = NVec2::new(self.normal(-10.0, 20.0), self.normal(-10.0, 20.0));

            let kind = self.unit();
            let color = if kind < 0.7 {
                Rgba::new(255, 255, 200, 200) // main sequence
            } else if kind < 0.9 {
                Rgba::new(255, 150, 100, 200) // red giants
            } else {
                Rgba::new(150, 180, 255, 255) // blue giants
            };
            let size = if kind < 0.9 { 1.0 } else { 1.5 };
            particles.push(star(x, v, color, size));
        }

        Scenario {
            bodies: Vec::new(),
            particles,
        }
    }

    // star classes =========================================================================

    fn bulge_star(&mut self) -> (Rgba, f32) {
        let t = self.unit();
        let s = self.unit() as f32;
        if t < 0.6 {
            (Rgba::opaque(255, 160, 100), 0.3 + s * 0.3) // red dwarf
        } else if t < 0.85 {
            (Rgba::opaque(255, 200, 150), 0.5 + s * 0.5) // K
        } else if t < 0.95 {
            (Rgba::opaque(255, 240, 200), 0.8 + s * 0.4) // G
        } else {
            (Rgba::opaque(255, 120, 80), 1.5 + s * 0.8) // red giant
        }
    }

    fn arm_star(&mut self) -> (Rgba, f32) {
        let t = self.unit();
        let s = self.unit() as f32;
        let (color, size) = if t < 0.1 {
            (Rgba::opaque(155, 176, 255), 2.0 + s) // O
        } else if t < 0.3 {
            (Rgba::opaque(170, 191, 255), 1.2 + s * 0.6) // B
        } else if t < 0.5 {
            (Rgba::opaque(202, 215, 255), 0.8 + s * 0.4) // A
        } else if t < 0.7 {
            (Rgba::opaque(248, 247, 255), 0.7 + s * 0.3) // F
        } else if t < 0.85 {
            (Rgba::opaque(255, 244, 234), 0.6 + s * 0.3) // G
        } else {
            (Rgba::opaque(255, 210, 161), 0.5 + s * 0.25) // K
        };

        // nebulosity around young hot stars
        if t < 0.2 && self.unit() < 0.3 {
            return (color.with_alpha(180), size);
        }
        (color, size)
    }

    fn inter_arm_star(&mut self) -> (Rgba, f32) {
        let t = self.unit();
        let s = self.unit() as f32;
        if t < 0.7 {
            (Rgba::new(255, 204, 111, 220), 0.2 + s * 0.2) // M
        } else if t < 0.9 {
            (Rgba::new(255, 210, 161, 220), 0.4 + s * 0.3) // K
        } else if t < 0.98 {
            (Rgba::new(255, 244, 234, 220), 0.6 + s * 0.3) // G
        } else {
            (Rgba::new(255, 167, 82, 200), 1.0 + s * 0.8) // red giant
        }
    }

    // sampling =============================================================================

    fn unit(&mut self) -> f64 {
        self.rng.gen()
    }

    fn angle(&mut self) -> f64 {
        self.rng.gen_range(0.0..TAU)
    }

    fn normal(&mut self, mean: f64, sd: f64) -> f64 {
        let z: f64 = self.rng.sample(StandardNormal);
        mean + sd * z
    }

    fn exponential(&mut self, lambda: f64) -> f64 {
        let e: f64 = self.rng.sample(Exp1);
        e / lambda
    }
}

/// Unit vector perpendicular to `x - origin` (counter-clockwise orbit)
fn tangent(origin: NVec2, x: NVec2) -> NVec2 {
    let to_origin = origin - x;
    let n = to_origin.norm();
    if n == 0.0 {
        return NVec2::zeros();
    }
    let to_origin = to_origin / n;
    NVec2::new(-to_origin.y, to_origin.x)
}

fn brighten(c: Rgba, factor: f64) -> Rgba {
    let scale = |ch: u8| (ch as f64 * factor).min(255.0) as u8;
    Rgba::new(scale(c.r), scale(c.g), scale(c.b), c.a)
}

fn star(x: NVec2, v: NVec2, color: Rgba, size: f32) -> Particle {
    Particle {
        x,
        v,
        m: 1.0,
        age: 0.0,
        lifetime: PRESET_LIFETIME,
        active: true,
        size,
        color,
    }
}

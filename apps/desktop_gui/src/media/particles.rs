//! Drifting particle backdrop with proximity links.
//!
//! Distances are compared squared so the per-frame pair scan never takes a
//! square root. A link is drawn only while the squared distance is strictly
//! below the squared threshold, and its opacity fades linearly to zero at the
//! threshold.

use egui::{Color32, Pos2, Vec2};
use rand::{rngs::StdRng, Rng, SeedableRng};

pub const AREA_PER_PARTICLE: f32 = 15_000.0;
pub const NARROW_VIEWPORT_WIDTH: f32 = 768.0;
pub const NARROW_PARTICLE_CAP: usize = 35;
pub const WIDE_PARTICLE_CAP: usize = 100;
pub const NARROW_LINK_DISTANCE: f32 = 80.0;
pub const WIDE_LINK_DISTANCE: f32 = 120.0;
pub const POINTER_LINK_DISTANCE: f32 = 150.0;
pub const LINK_WIDTH: f32 = 0.3;
pub const POINTER_LINK_WIDTH: f32 = 0.8;

const NARROW_SPEED: f32 = 0.5;
const WIDE_SPEED: f32 = 0.8;
const MIN_RADIUS: f32 = 1.0;
const RADIUS_SPREAD: f32 = 3.0;

/// Purple, pink and sky blue.
pub const PALETTE: [Color32; 3] = [
    Color32::from_rgb(128, 0, 128),
    Color32::from_rgb(255, 192, 203),
    Color32::from_rgb(135, 206, 235),
];
pub const LINK_RGB: [u8; 3] = [180, 180, 180];
pub const POINTER_LINK_RGB: [u8; 3] = [255, 0, 0];

/// Pointer position used while nothing hovers or touches the surface.
pub const POINTER_SENTINEL: Pos2 = Pos2::new(-9999.0, -9999.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    Narrow,
    Wide,
}

impl ViewportClass {
    pub fn for_width(width: f32) -> Self {
        if width < NARROW_VIEWPORT_WIDTH {
            Self::Narrow
        } else {
            Self::Wide
        }
    }

    pub fn particle_cap(self) -> usize {
        match self {
            Self::Narrow => NARROW_PARTICLE_CAP,
            Self::Wide => WIDE_PARTICLE_CAP,
        }
    }

    pub fn link_distance(self) -> f32 {
        match self {
            Self::Narrow => NARROW_LINK_DISTANCE,
            Self::Wide => WIDE_LINK_DISTANCE,
        }
    }

    fn speed(self) -> f32 {
        match self {
            Self::Narrow => NARROW_SPEED,
            Self::Wide => WIDE_SPEED,
        }
    }
}

/// `ceil(min(area / 15000, cap))`; zero for an empty surface.
pub fn particle_count(size: Vec2) -> usize {
    let area = size.x * size.y;
    if area.is_nan() || area <= 0.0 {
        return 0;
    }
    let cap = ViewportClass::for_width(size.x).particle_cap();
    (area / AREA_PER_PARTICLE).min(cap as f32).ceil() as usize
}

/// Link opacity for two points `dist_sq` apart, or `0.0` at or past the threshold.
pub fn fade_opacity(dist_sq: f32, threshold_sq: f32) -> f32 {
    if dist_sq < threshold_sq {
        1.0 - dist_sq / threshold_sq
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub pos: Pos2,
    pub vel: Vec2,
    pub radius: f32,
    pub color: Color32,
}

impl Particle {
    fn random(bounds: Vec2, speed: f32, rng: &mut impl Rng) -> Self {
        Self {
            pos: Pos2::new(rng.gen::<f32>() * bounds.x, rng.gen::<f32>() * bounds.y),
            vel: Vec2::new(
                (rng.gen::<f32>() - 0.5) * speed,
                (rng.gen::<f32>() - 0.5) * speed,
            ),
            radius: rng.gen::<f32>() * RADIUS_SPREAD + MIN_RADIUS,
            color: PALETTE[rng.gen_range(0..PALETTE.len())],
        }
    }

    /// Reflects off an edge the particle has already crossed, then moves.
    fn advance(&mut self, bounds: Vec2) {
        if self.pos.x > bounds.x || self.pos.x < 0.0 {
            self.vel.x = -self.vel.x;
        }
        if self.pos.y > bounds.y || self.pos.y < 0.0 {
            self.vel.y = -self.vel.y;
        }
        self.pos += self.vel;
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Link {
    pub from: Pos2,
    pub to: Pos2,
    pub opacity: f32,
}

/// Line segments for one frame. The buffers are reused between frames.
#[derive(Debug, Default)]
pub struct FrameScene {
    pub links: Vec<Link>,
    pub pointer_links: Vec<Link>,
}

impl FrameScene {
    fn clear(&mut self) {
        self.links.clear();
        self.pointer_links.clear();
    }
}

#[derive(Debug)]
pub struct ParticleField {
    bounds: Vec2,
    class: ViewportClass,
    particles: Vec<Particle>,
    scene: FrameScene,
}

impl ParticleField {
    pub fn generate(bounds: Vec2, rng: &mut impl Rng) -> Self {
        let class = ViewportClass::for_width(bounds.x);
        let particles = (0..particle_count(bounds))
            .map(|_| Particle::random(bounds, class.speed(), rng))
            .collect();
        Self {
            bounds,
            class,
            particles,
            scene: FrameScene::default(),
        }
    }

    pub fn bounds(&self) -> Vec2 {
        self.bounds
    }

    pub fn class(&self) -> ViewportClass {
        self.class
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn step(&mut self) {
        let bounds = self.bounds;
        for particle in &mut self.particles {
            particle.advance(bounds);
        }
    }

    /// Collects particle-to-particle links and links to `pointer` for the
    /// current positions.
    pub fn build_scene(&mut self, pointer: Pos2) -> &FrameScene {
        self.scene.clear();

        let link_sq = self.class.link_distance().powi(2);
        for (i, a) in self.particles.iter().enumerate() {
            for b in &self.particles[i + 1..] {
                let dist_sq = (a.pos - b.pos).length_sq();
                if dist_sq < link_sq {
                    self.scene.links.push(Link {
                        from: a.pos,
                        to: b.pos,
                        opacity: fade_opacity(dist_sq, link_sq),
                    });
                }
            }
        }

        let pointer_sq = POINTER_LINK_DISTANCE.powi(2);
        for particle in &self.particles {
            let dist_sq = (particle.pos - pointer).length_sq();
            if dist_sq < pointer_sq {
                self.scene.pointer_links.push(Link {
                    from: particle.pos,
                    to: pointer,
                    opacity: fade_opacity(dist_sq, pointer_sq),
                });
            }
        }

        &self.scene
    }
}

/// Last known pointer position relative to the backdrop surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerTracker {
    position: Pos2,
}

impl Default for PointerTracker {
    fn default() -> Self {
        Self {
            position: POINTER_SENTINEL,
        }
    }
}

impl PointerTracker {
    pub fn moved(&mut self, position: Pos2) {
        self.position = position;
    }

    /// A lifted finger no longer attracts links.
    pub fn touch_ended(&mut self) {
        self.position = POINTER_SENTINEL;
    }

    pub fn position(&self) -> Pos2 {
        self.position
    }
}

/// Owns the particle field across frames and regenerates it when the
/// surface size changes.
pub struct ParticleBackdrop {
    field: Option<ParticleField>,
    pointer: PointerTracker,
    rng: StdRng,
    running: bool,
}

impl Default for ParticleBackdrop {
    fn default() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }
}

impl ParticleBackdrop {
    pub fn with_rng(rng: StdRng) -> Self {
        Self {
            field: None,
            pointer: PointerTracker::default(),
            rng,
            running: true,
        }
    }

    pub fn pointer_mut(&mut self) -> &mut PointerTracker {
        &mut self.pointer
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    /// Regenerates the field when `size` differs from the current surface.
    /// A zero-area surface leaves no field, so frames become no-ops.
    pub fn sync_viewport(&mut self, size: Vec2) {
        if !self.running {
            return;
        }
        if self.field.as_ref().is_some_and(|field| field.bounds() == size) {
            return;
        }
        if particle_count(size) == 0 {
            self.field = None;
            return;
        }
        let field = ParticleField::generate(size, &mut self.rng);
        tracing::debug!(
            width = size.x,
            height = size.y,
            particles = field.particles().len(),
            "regenerated particle field"
        );
        self.field = Some(field);
    }

    /// Advances one frame and returns what to draw, or `None` when stopped or
    /// the surface is empty.
    pub fn frame(&mut self, size: Vec2) -> Option<(&[Particle], &FrameScene)> {
        self.sync_viewport(size);
        if !self.running {
            return None;
        }
        let pointer = self.pointer.position();
        let field = self.field.as_mut()?;
        field.step();
        field.build_scene(pointer);
        Some((&field.particles, &field.scene))
    }

    /// Cancels the animation and releases the field.
    pub fn stop(&mut self) {
        self.running = false;
        self.field = None;
    }
}

#[cfg(test)]
#[path = "tests/particles_tests.rs"]
mod tests;

use bytemuck::{Pod, Zeroable};

// This layout is shared with the per-slot device programs; the stride
// constants below are what the device validates dispatches against.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Particle {
    /// Location in normalized device coordinates.
    pub position: [f32; 2],
    pub velocity: [f32; 2],
    /// Point size at spawn; the render stage decays it toward zero over the
    /// lifetime.
    pub size: f32,
    /// Absolute simulation time at which this slot was last (re)initialized.
    pub spawn_time: f32,
    /// How long this generation stays alive, in simulation-time units.
    pub lifetime: f32,
}

pub const PARTICLE_STRIDE: usize = std::mem::size_of::<Particle>();

/// One point primitive per slot, handed to the rasterizer. Dead slots are
/// parked off-screen at zero size rather than omitted, so a frame always
/// carries exactly capacity primitives.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct PointSprite {
    pub position: [f32; 2],
    pub size: f32,
}

pub const SPRITE_STRIDE: usize = std::mem::size_of::<PointSprite>();

impl Particle {
    /// Life left at `time`; non-positive means the slot is dead and eligible
    /// for rebirth.
    pub fn remaining(&self, time: f32) -> f32 {
        self.spawn_time + self.lifetime - time
    }

    /// Whether the slot renders at `time`. A zero-initialized record has
    /// `lifetime == 0` and is dead at every clock value, including its own
    /// spawn time.
    pub fn is_alive(&self, time: f32) -> bool {
        self.lifetime > 0.0 && time - self.spawn_time <= self.lifetime
    }
}

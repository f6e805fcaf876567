use cgmath::Vector2;

use crate::device::SlotKernel;
use crate::particle::{Particle, PointSprite, PARTICLE_STRIDE, SPRITE_STRIDE};

/// Where dead slots are parked: far outside clip space, at zero size. The
/// primitive still exists (invisibility is geometry, not omission), so
/// every frame submits exactly one primitive per slot.
pub const OFFSCREEN: [f32; 2] = [-1000.0, -1000.0];

/// Render/integrate program: derives a transient point primitive for every
/// slot from its stored base state and the frame clock. Velocity and
/// position are integrated from the spawn-time values each frame; the
/// generation buffers are never written here, so re-rendering the same
/// generation is idempotent.
pub struct RenderKernel {
    time: f32,
    acceleration: Vector2<f32>,
}

impl RenderKernel {
    pub fn new(time: f32, acceleration: [f32; 2]) -> Self {
        RenderKernel {
            time,
            acceleration: acceleration.into(),
        }
    }

    pub fn integrate_slot(&self, particle: &Particle) -> PointSprite {
        if particle.is_alive(self.time) {
            let dt = self.time - particle.spawn_time;
            let velocity = Vector2::from(particle.velocity) + self.acceleration * dt;
            let position = Vector2::from(particle.position) + velocity * dt;
            PointSprite {
                position: position.into(),
                size: particle.size * (1.0 - dt / particle.lifetime),
            }
        } else {
            PointSprite {
                position: OFFSCREEN,
                size: 0.0,
            }
        }
    }
}

impl SlotKernel for RenderKernel {
    fn input_stride(&self) -> usize {
        PARTICLE_STRIDE
    }

    fn output_stride(&self) -> usize {
        SPRITE_STRIDE
    }

    fn eval(&self, _slot: usize, input: &[u8], output: &mut [u8]) {
        let particle = bytemuck::pod_read_unaligned::<Particle>(input);
        output.copy_from_slice(bytemuck::bytes_of(&self.integrate_slot(&particle)));
    }
}

use std::sync::Arc;

use cgmath::Vector2;

use crate::device::SlotKernel;
use crate::noise_field::NoiseField;
use crate::particle::{Particle, PARTICLE_STRIDE};
use crate::sim_params::NozzleParams;

// Salt distance between successive draws within one slot's evaluation.
const SALT_STEP: f32 = 0.1;

/// The fixed in-slot draw sequence: each draw samples the noise field at
/// (time, slot phase, salt) and advances the salt by `SALT_STEP`, starting
/// from the frame time. Fixing the order makes a spawn a pure function of
/// (field, time, slot).
struct DrawSequence<'a> {
    noise: &'a NoiseField,
    time: f32,
    slot_phase: f32,
    salt: f32,
}

impl<'a> DrawSequence<'a> {
    fn new(noise: &'a NoiseField, time: f32, slot_phase: f32) -> Self {
        DrawSequence {
            noise,
            time,
            slot_phase,
            salt: time,
        }
    }

    fn next(&mut self) -> f32 {
        let value = self.noise.sample(self.time, self.slot_phase, self.salt);
        self.salt += SALT_STEP;
        value
    }
}

fn spread(draw: f32, min: f32, max: f32) -> f32 {
    min + draw * (max - min)
}

/// Emission/update program, rebuilt each frame around the frame clock the
/// way a per-frame uniform block would be. One evaluation per slot, reading
/// the current generation and writing the next: dead slots that pass the
/// birth draw respawn from the nozzle, everything else copies through
/// untouched. Integration is the render stage's job.
pub struct EmitKernel {
    noise: Arc<NoiseField>,
    nozzle: NozzleParams,
    emission_rate: f32,
    time: f32,
    num_particles: u32,
}

impl EmitKernel {
    pub fn new(
        noise: Arc<NoiseField>,
        nozzle: NozzleParams,
        emission_rate: f32,
        time: f32,
        num_particles: u32,
    ) -> Self {
        EmitKernel {
            noise,
            nozzle,
            emission_rate,
            time,
            num_particles,
        }
    }

    /// The per-slot update rule. Draw order within a slot is fixed: birth
    /// test, velocity-x, velocity-y, size. Both rebirth conditions are
    /// required: the slot must be dead AND its birth draw must fall below
    /// the emission rate.
    pub fn update_slot(&self, slot: usize, current: &Particle) -> Particle {
        let mut draws = DrawSequence::new(
            &self.noise,
            self.time,
            slot as f32 / self.num_particles as f32,
        );
        if current.remaining(self.time) <= 0.0 && draws.next() < self.emission_rate {
            let nozzle = &self.nozzle;
            let velocity = Vector2::new(
                spread(draws.next(), nozzle.velocity_x_min, nozzle.velocity_x_max),
                spread(draws.next(), nozzle.velocity_y_min, nozzle.velocity_y_max),
            );
            Particle {
                position: nozzle.spawn_position,
                velocity: velocity.into(),
                size: spread(draws.next(), nozzle.size_min, nozzle.size_max),
                spawn_time: self.time,
                lifetime: nozzle.lifetime,
            }
        } else {
            *current
        }
    }
}

impl SlotKernel for EmitKernel {
    fn input_stride(&self) -> usize {
        PARTICLE_STRIDE
    }

    fn output_stride(&self) -> usize {
        PARTICLE_STRIDE
    }

    fn eval(&self, slot: usize, input: &[u8], output: &mut [u8]) {
        // Buffer storage is raw bytes with no alignment promise, so records
        // are read and written by copy.
        let current = bytemuck::pod_read_unaligned::<Particle>(input);
        output.copy_from_slice(bytemuck::bytes_of(&self.update_slot(slot, &current)));
    }
}

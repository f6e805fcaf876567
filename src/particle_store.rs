use log::info;

use crate::device::{BufferId, Device};
use crate::error::{Error, Result};
use crate::particle::PARTICLE_STRIDE;

/// The generation buffer pair. One buffer is the frame's read-only "current"
/// generation, the other the write-only "next"; `swap` flips the roles after
/// the emission pass is fenced. Role flipping is the entire synchronization
/// discipline for the pair: the same buffer never plays both roles within a
/// frame, so the emission writer and render reader can't collide.
pub struct ParticleStore {
    buffers: [BufferId; 2],
    src_index: usize,
    capacity: u32,
}

impl ParticleStore {
    /// Creates both generation buffers, zero-initialized. Every slot starts
    /// born-dead; real emission happens on the first update. There is no
    /// resize: capacity is fixed for the simulation's lifetime.
    pub fn allocate(device: &mut Device, capacity: u32) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidCapacity);
        }
        let len = capacity as usize * PARTICLE_STRIDE;
        let buffers = [
            device.create_buffer("particle generation buffer 0", len)?,
            device.create_buffer("particle generation buffer 1", len)?,
        ];
        info!("Particle store: {} slots per generation", capacity);
        Ok(ParticleStore {
            buffers,
            src_index: 0,
            capacity,
        })
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// The generation this frame's stages read.
    pub fn current(&self) -> BufferId {
        self.buffers[self.src_index]
    }

    /// The generation this frame's emission pass writes.
    pub fn next(&self) -> BufferId {
        self.buffers[(self.src_index + 1) % 2]
    }

    /// Flips the roles; the freshly written generation becomes current.
    pub fn swap(&mut self) {
        self.src_index = (self.src_index + 1) % 2;
    }

    pub fn buffers(&self) -> [BufferId; 2] {
        self.buffers
    }
}

use std::sync::Arc;

use log::info;

use crate::device::{BufferId, Device, FENCE_TIMEOUT};
use crate::emitter::EmitKernel;
use crate::error::Result;
use crate::fence::Fence;
use crate::noise_field::NoiseField;
use crate::particle::{PointSprite, SPRITE_STRIDE};
use crate::particle_store::ParticleStore;
use crate::renderer::RenderKernel;
use crate::sim_params::SimParams;

/// The pipeline facade. One `advance` + `render` pair per frame: `advance`
/// moves the clock, runs the emission pass from the current generation into
/// the next, fences it, and flips the buffer roles; `render` waits on that
/// fence and derives the frame's point primitives from the freshly written
/// generation.
pub struct Simulation {
    device: Device,
    params: SimParams,
    noise: Arc<NoiseField>,
    store: ParticleStore,
    sprite_buffer: BufferId,
    time: f32,
    emission_fence: Option<Fence>,
}

impl Simulation {
    /// Builds the simulation, generating the noise field from
    /// `params.noise`. Construction errors are fatal and surface here.
    pub fn new(device: Device, params: &SimParams) -> Result<Self> {
        let noise = NoiseField::generate(&params.noise)?;
        Simulation::with_noise(device, params, noise)
    }

    /// Builds the simulation around a caller-supplied noise field instead of
    /// generating one.
    pub fn with_noise(mut device: Device, params: &SimParams, noise: NoiseField) -> Result<Self> {
        let store = ParticleStore::allocate(&mut device, params.num_particles)?;
        let sprite_buffer = device.create_buffer(
            "point sprite buffer",
            params.num_particles as usize * SPRITE_STRIDE,
        )?;
        info!(
            "Simulation up: {} slots, emission rate {}",
            params.num_particles, params.emission_rate
        );
        Ok(Simulation {
            device,
            params: *params,
            noise: Arc::new(noise),
            store,
            sprite_buffer,
            time: 0.0,
            emission_fence: None,
        })
    }

    /// Advances the clock by `dt` and runs one emission pass. Call exactly
    /// once per frame, before `render`.
    pub fn advance(&mut self, dt: f32) -> Result<()> {
        self.time += dt;
        let kernel = EmitKernel::new(
            Arc::clone(&self.noise),
            self.params.nozzle,
            self.params.emission_rate,
            self.time,
            self.store.capacity(),
        );
        self.device
            .submit_transform(Arc::new(kernel), self.store.current(), self.store.next())?;
        let fence = self.device.install_fence();
        self.store.swap();
        self.emission_fence = Some(fence);
        Ok(())
    }

    /// Derives this frame's point primitives, exactly one per slot, and
    /// returns them for rasterization. Blocks on the fence from the most
    /// recent `advance` so the emission writes are visible before they are
    /// read; rendering again without an intervening `advance` reuses the
    /// already-visible generation and yields an identical list.
    pub fn render(&mut self) -> Result<Vec<PointSprite>> {
        if let Some(fence) = self.emission_fence.take() {
            fence.wait(FENCE_TIMEOUT)?;
        }
        let kernel = RenderKernel::new(self.time, self.params.acceleration);
        self.device
            .submit_transform(Arc::new(kernel), self.store.current(), self.sprite_buffer)?;
        let bytes = self.device.read_buffer(self.sprite_buffer)?;
        Ok(bytes
            .chunks_exact(SPRITE_STRIDE)
            .map(bytemuck::pod_read_unaligned::<PointSprite>)
            .collect())
    }

    /// The simulation clock, as of the most recent `advance`.
    pub fn time(&self) -> f32 {
        self.time
    }

    /// Releases both generation buffers, the sprite buffer, and the device
    /// (its worker is joined on drop). Dropping the simulation without
    /// calling this releases the same resources.
    pub fn shutdown(mut self) -> Result<()> {
        for buffer in self.store.buffers() {
            self.device.destroy_buffer(buffer)?;
        }
        self.device.destroy_buffer(self.sprite_buffer)?;
        Ok(())
    }
}

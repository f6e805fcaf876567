pub mod device;
pub mod emitter;
pub mod error;
pub mod fence;
pub mod noise_field;
pub mod particle;
pub mod particle_store;
pub mod renderer;
pub mod sim_params;
pub mod simulation;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal() {
        let device = device::Device::new().unwrap();
        let mut sim =
            simulation::Simulation::new(device, &sim_params::SimParams::default()).unwrap();
        sim.advance(1.0 / 60.0).unwrap();
        let sprites = sim.render().unwrap();
        assert_eq!(sprites.len(), 200);
    }
}

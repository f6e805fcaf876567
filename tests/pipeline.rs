use plume::device::Device;
use plume::noise_field::NoiseField;
use plume::renderer::OFFSCREEN;
use plume::sim_params::{NoiseParams, SimParams};
use plume::simulation::Simulation;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// A 2x2x2 field whose value follows the time axis: 0.0 on the x=0 plane,
// 1.0 on the x=1 plane. Draws at whole-number clock values read 0.0 and
// spawn everything; draws at half-number clock values read 1.0 and spawn
// nothing.
fn time_gated_field() -> NoiseField {
    NoiseField::from_values(2, vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]).unwrap()
}

fn small_params() -> SimParams {
    SimParams {
        num_particles: 4,
        emission_rate: 0.5,
        ..SimParams::default()
    }
}

#[test]
fn full_lifecycle_spawn_die_respawn() {
    init_logs();
    let params = small_params();
    let nozzle = params.nozzle;
    let device = Device::new().unwrap();
    let mut sim = Simulation::with_noise(device, &params, time_gated_field()).unwrap();

    // Frame 1, t = 0: every slot is born dead and the birth draw reads 0.0,
    // so all four spawn with range-minimum velocity and size.
    sim.advance(0.0).unwrap();
    let fresh = sim.render().unwrap();
    assert_eq!(fresh.len(), 4);
    for sprite in &fresh {
        assert_eq!(sprite.position, nozzle.spawn_position);
        assert_eq!(sprite.size, nozzle.size_min);
    }

    // Frame 2, t = 2.5: past the lifetime, and the birth draw reads 1.0, so
    // the generation dies without being replaced. All four primitives are
    // still emitted, parked off-screen at zero size.
    sim.advance(2.5).unwrap();
    let dead = sim.render().unwrap();
    assert_eq!(dead.len(), 4);
    for sprite in &dead {
        assert_eq!(sprite.position, OFFSCREEN);
        assert_eq!(sprite.size, 0.0);
    }

    // Frame 3, t = 3.0: the birth draw reads 0.0 again and every slot is
    // reborn exactly like the first generation.
    sim.advance(0.5).unwrap();
    let reborn = sim.render().unwrap();
    assert_eq!(reborn, fresh);

    sim.shutdown().unwrap();
}

#[test]
fn render_always_yields_capacity_primitives() {
    init_logs();
    let params = SimParams {
        num_particles: 32,
        emission_rate: 0.3,
        noise: NoiseParams {
            dimension: 16,
            seed: 11,
        },
        ..SimParams::default()
    };
    let device = Device::new().unwrap();
    let mut sim = Simulation::new(device, &params).unwrap();

    for _ in 0..10 {
        sim.advance(0.37).unwrap();
        assert_eq!(sim.render().unwrap().len(), 32);
    }
}

#[test]
fn re_render_without_advance_is_idempotent() {
    let params = small_params();
    let device = Device::new().unwrap();
    let mut sim = Simulation::with_noise(device, &params, time_gated_field()).unwrap();

    sim.advance(0.0).unwrap();
    let first = sim.render().unwrap();
    let second = sim.render().unwrap();
    assert_eq!(first, second);
}

#[test]
fn identical_runs_produce_identical_frames() {
    let params = SimParams {
        num_particles: 16,
        emission_rate: 0.8,
        noise: NoiseParams {
            dimension: 8,
            seed: 3,
        },
        ..SimParams::default()
    };

    let mut a = Simulation::new(Device::new().unwrap(), &params).unwrap();
    let mut b = Simulation::new(Device::new().unwrap(), &params).unwrap();
    for _ in 0..5 {
        a.advance(0.21).unwrap();
        b.advance(0.21).unwrap();
        assert_eq!(a.render().unwrap(), b.render().unwrap());
    }
}

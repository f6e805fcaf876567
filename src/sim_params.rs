use serde::{Deserialize, Serialize};

// Parameters that define one simulation run. These don't change at runtime.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct SimParams {
    /// Slot count of each generation buffer; fixed for the simulation's
    /// lifetime.
    pub num_particles: u32,
    /// Probability threshold a dead slot's birth draw must fall below to
    /// respawn this frame.
    pub emission_rate: f32,
    /// Constant acceleration applied during render-time integration.
    pub acceleration: [f32; 2],

    #[serde(default)]
    pub nozzle: NozzleParams,

    #[serde(default)]
    pub noise: NoiseParams,
}

/// Where and how reborn particles launch.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct NozzleParams {
    pub spawn_position: [f32; 2],
    pub velocity_x_min: f32,
    pub velocity_x_max: f32,
    pub velocity_y_min: f32,
    pub velocity_y_max: f32,
    pub size_min: f32,
    pub size_max: f32,
    pub lifetime: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct NoiseParams {
    /// Lattice points per axis.
    pub dimension: u32,
    pub seed: u64,
}

impl Default for SimParams {
    fn default() -> Self {
        SimParams {
            num_particles: 200,
            emission_rate: 0.3,
            acceleration: [0.0, -1.0],
            nozzle: NozzleParams::default(),
            noise: NoiseParams::default(),
        }
    }
}

impl Default for NozzleParams {
    fn default() -> Self {
        NozzleParams {
            spawn_position: [0.0, -1.0],
            velocity_x_min: -1.0,
            velocity_x_max: 1.0,
            velocity_y_min: 1.0,
            velocity_y_max: 2.4,
            size_min: 60.0,
            size_max: 80.0,
            lifetime: 2.0,
        }
    }
}

impl Default for NoiseParams {
    fn default() -> Self {
        NoiseParams {
            dimension: 128,
            seed: 0,
        }
    }
}

impl std::str::FromStr for SimParams {
    type Err = toml::de::Error;
    fn from_str(serialized: &str) -> Result<Self, Self::Err> {
        let params = toml::from_str(serialized)?;
        Ok(params)
    }
}

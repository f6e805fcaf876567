use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::sim_params::NoiseParams;

/// Precomputed 3-D field of pseudo-random scalars in [0, 1), the only
/// randomness source of the emission stage. A lookup is a pure function of
/// the coordinates, which keeps per-slot evaluation order-independent and
/// reproducible.
pub struct NoiseField {
    dimension: usize,
    values: Vec<f32>,
}

impl NoiseField {
    /// Fills a `dimension`³ lattice from a seeded generator. Fails only on a
    /// zero dimension; this is a construction-time error, not retried.
    pub fn generate(params: &NoiseParams) -> Result<Self> {
        if params.dimension == 0 {
            return Err(Error::InvalidNoiseDimension);
        }
        let dimension = params.dimension as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);
        let values = (0..dimension * dimension * dimension)
            .map(|_| rng.gen::<f32>())
            .collect();
        info!(
            "Noise field: {0}x{0}x{0} lattice, seed {1}",
            dimension, params.seed
        );
        Ok(NoiseField { dimension, values })
    }

    /// Builds a field from explicit lattice values, `dimension` per axis,
    /// x varying fastest.
    pub fn from_values(dimension: usize, values: Vec<f32>) -> Result<Self> {
        if dimension == 0 || values.len() != dimension * dimension * dimension {
            return Err(Error::InvalidNoiseDimension);
        }
        Ok(NoiseField { dimension, values })
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Samples the field at a point measured in field widths: one full width
    /// per unit coordinate, wrapping rather than clamping, so every input is
    /// in-domain. Interpolation is trilinear between the eight surrounding
    /// lattice points.
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        let (x0, x1, tx) = self.axis(x);
        let (y0, y1, ty) = self.axis(y);
        let (z0, z1, tz) = self.axis(z);
        let c00 = lerp(self.at(x0, y0, z0), self.at(x1, y0, z0), tx);
        let c10 = lerp(self.at(x0, y1, z0), self.at(x1, y1, z0), tx);
        let c01 = lerp(self.at(x0, y0, z1), self.at(x1, y0, z1), tx);
        let c11 = lerp(self.at(x0, y1, z1), self.at(x1, y1, z1), tx);
        lerp(lerp(c00, c10, ty), lerp(c01, c11, ty), tz)
    }

    // Wraps one coordinate onto the lattice: the pair of bracketing indices
    // and the blend factor between them.
    fn axis(&self, coordinate: f32) -> (usize, usize, f32) {
        let scaled = coordinate.rem_euclid(1.0) * self.dimension as f32;
        let base = scaled.floor();
        let i0 = base as usize % self.dimension;
        let i1 = (i0 + 1) % self.dimension;
        (i0, i1, scaled - base)
    }

    fn at(&self, x: usize, y: usize, z: usize) -> f32 {
        self.values[(z * self.dimension + y) * self.dimension + x]
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_deterministic() {
        let params = NoiseParams {
            dimension: 8,
            seed: 42,
        };
        let a = NoiseField::generate(&params).unwrap();
        let b = NoiseField::generate(&params).unwrap();
        assert_eq!(a.values, b.values);

        let c = NoiseField::generate(&NoiseParams {
            dimension: 8,
            seed: 43,
        })
        .unwrap();
        assert_ne!(a.values, c.values);
    }

    #[test]
    fn lattice_values_are_unit_interval() {
        let field = NoiseField::generate(&NoiseParams {
            dimension: 16,
            seed: 7,
        })
        .unwrap();
        assert!(field.values.iter().all(|v| (0.0..1.0).contains(v)));
    }

    #[test]
    fn sampling_wraps_in_every_axis() {
        let field = NoiseField::generate(&NoiseParams {
            dimension: 4,
            seed: 1,
        })
        .unwrap();
        let reference = field.sample(0.25, 0.5, 0.75);
        assert_eq!(field.sample(1.25, 0.5, 0.75), reference);
        assert_eq!(field.sample(0.25, -0.5, 0.75), reference);
        assert_eq!(field.sample(0.25, 0.5, 7.75), reference);
    }

    #[test]
    fn constant_field_samples_constant() {
        let field = NoiseField::from_values(2, vec![0.25; 8]).unwrap();
        assert_eq!(field.sample(0.0, 0.0, 0.0), 0.25);
        assert_eq!(field.sample(0.13, 0.62, 0.99), 0.25);
    }

    #[test]
    fn interpolates_between_lattice_points() {
        // Two planes along x: 0 at x=0, 1 at x=1.
        let field = NoiseField::from_values(2, vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]).unwrap();
        assert_eq!(field.sample(0.0, 0.0, 0.0), 0.0);
        assert_eq!(field.sample(0.5, 0.0, 0.0), 1.0);
        // Halfway between the two lattice columns.
        assert!((field.sample(0.25, 0.0, 0.0) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_dimension_is_rejected() {
        assert!(matches!(
            NoiseField::generate(&NoiseParams {
                dimension: 0,
                seed: 0
            }),
            Err(Error::InvalidNoiseDimension)
        ));
        assert!(matches!(
            NoiseField::from_values(2, vec![0.0; 7]),
            Err(Error::InvalidNoiseDimension)
        ));
    }
}

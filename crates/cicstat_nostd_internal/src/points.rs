use crate::real::Real;
use ndarray::{ArrayView2, Axis};

/// A read-only view of particle positions.
///
/// Positions are stored as 3 separate, equal-length slices (one per axis).
/// This is equivalent to the layout that [`ParticleSet::from_array_view`]
/// accepts, where:
/// - axis 0 is the slow axis and it corresponds to the x, y, z components
/// - axis 1 is the fast axis. The length along this axis coincides with the
///   number of particles and we require that it is contiguous.
#[derive(Clone, Copy)]
pub struct ParticleSet<'a, T: Real> {
    components_xyz: [&'a [T]; 3],
}

impl<'a, T: Real> ParticleSet<'a, T> {
    /// create a new instance from the separate x, y, z components
    pub fn new(x: &'a [T], y: &'a [T], z: &'a [T]) -> Result<ParticleSet<'a, T>, &'static str> {
        if x.len() != y.len() || x.len() != z.len() {
            Err("x, y, and z must all hold the same number of particles")
        } else if x.is_empty() {
            Err("at least one particle is required")
        } else if [x, y, z]
            .iter()
            .any(|comp| comp.iter().any(|val| !val.is_finite()))
        {
            Err("particle positions must all be finite")
        } else {
            Ok(Self {
                components_xyz: [x, y, z],
            })
        }
    }

    /// create a new instance from an array with shape `(3, n_particles)`
    pub fn from_array_view(positions: ArrayView2<'a, T>) -> Result<ParticleSet<'a, T>, &'static str> {
        if positions.shape()[0] != 3 {
            return Err("positions must have exactly 3 spatial components along axis 0");
        }
        let x = positions.index_axis_move(Axis(0), 0).to_slice();
        let y = positions.index_axis_move(Axis(0), 1).to_slice();
        let z = positions.index_axis_move(Axis(0), 2).to_slice();
        match (x, y, z) {
            (Some(x), Some(y), Some(z)) => Self::new(x, y, z),
            _ => Err("positions must be contiguous along the fast axis"),
        }
    }

    #[inline(always)]
    pub fn n_particles(&self) -> usize {
        self.components_xyz[0].len()
    }

    /// access the slice holding a single component
    #[inline(always)]
    pub fn component(&self, axis: usize) -> &'a [T] {
        self.components_xyz[axis]
    }

    #[inline(always)]
    pub fn position(&self, idx: usize) -> [T; 3] {
        [
            self.components_xyz[0][idx],
            self.components_xyz[1][idx],
            self.components_xyz[2][idx],
        ]
    }

    /// returns the per-axis minimum and maximum positions
    pub fn extrema(&self) -> ([T; 3], [T; 3]) {
        let mut min = self.position(0);
        let mut max = min;
        for (axis, comp) in self.components_xyz.iter().enumerate() {
            for &val in comp.iter() {
                if val < min[axis] {
                    min[axis] = val;
                }
                if val > max[axis] {
                    max[axis] = val;
                }
            }
        }
        (min, max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn particle_set_errs() {
        let a = [0.0, 1.0, 2.0];
        let b = [0.0, 1.0];
        assert!(ParticleSet::new(&a, &a, &b).is_err());
        let empty: [f64; 0] = [];
        assert!(ParticleSet::new(&empty, &empty, &empty).is_err());
        let bad = [0.0, f64::NAN, 2.0];
        assert!(ParticleSet::new(&a, &bad, &a).is_err());
    }

    #[test]
    fn particle_set_from_array() {
        // position 0 is [0, 3, 6]
        let positions: [f32; 9] = [0., 1., 2., 3., 4., 5., 6., 7., 8.];
        let view = ArrayView2::from_shape((3, 3), &positions).unwrap();
        let particles = ParticleSet::from_array_view(view).unwrap();
        assert_eq!(particles.n_particles(), 3);
        assert_eq!(particles.position(0), [0.0, 3.0, 6.0]);
        assert_eq!(particles.position(2), [2.0, 5.0, 8.0]);

        let wrong_shape = ArrayView2::from_shape((2, 3), &positions[..6]).unwrap();
        assert!(ParticleSet::from_array_view(wrong_shape).is_err());

        // transposed views aren't contiguous along the fast axis
        // (the shape is still (3, 3), but the strides are (1, 3))
        let transposed = ArrayView2::from_shape((3, 3), &positions).unwrap().reversed_axes();
        assert!(ParticleSet::from_array_view(transposed).is_err());
    }

    #[test]
    fn extrema() {
        let x = [4.0, -1.0, 2.0];
        let y = [0.5, 0.25, 0.75];
        let z = [9.0, 9.0, 9.0];
        let particles = ParticleSet::new(&x, &y, &z).unwrap();
        let (min, max) = particles.extrema();
        assert_eq!(min, [-1.0, 0.25, 9.0]);
        assert_eq!(max, [4.0, 0.75, 9.0]);
    }
}

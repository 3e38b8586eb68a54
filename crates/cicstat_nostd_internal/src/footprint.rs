//! Implements [`FootprintCenters`], which draws sphere centers that lie
//! within the footprint of a survey.
//!
//! A survey rarely fills its bounding box. The footprint is described by a
//! catalogue of random points (the "randoms") that uniformly fill it. A
//! candidate center is accepted only when at least `threshold` randoms lie
//! within `rmax` of it, i.e. when the sphere is (almost) entirely inside of
//! the footprint.
//!
//! Candidates are drawn uniformly from the [`BoundingVolume`]. The centers
//! are produced in the same units of work as [`SphereSampler`]
//! (`SPHERES_PER_UNIT` centers per unit, each unit with its own random
//! stream), so the accepted centers don't depend on how the units are
//! distributed among threads.
//!
//! [`SphereSampler`]: crate::SphereSampler

use crate::bins::ShellEdges;
use crate::kernel::CountKernel;
use crate::parallel::n_batches;
use crate::points::ParticleSet;
use crate::real::Real;
use crate::sampler::{SPHERES_PER_UNIT, substream_seed};
use crate::volume::{BoundingVolume, EdgePolicy};
use core::marker::PhantomData;
use rand::{RngCore, SeedableRng};

/// The number of candidates that may be rejected, per requested center,
/// before we give up on a unit of work.
pub const MAX_CANDIDATES_PER_CENTER: usize = 1000;

pub struct FootprintCenters<'a, T: Real, K: CountKernel, G> {
    randoms: ParticleSet<'a, T>,
    // a single shell with an outer radius of rmax
    sphere: ShellEdges<'a, T>,
    volume: BoundingVolume<T>,
    threshold: u64,
    n_centers: usize,
    seed: u64,
    kernel: K,
    _rng: PhantomData<fn() -> G>,
}

impl<'a, T, K, G> FootprintCenters<'a, T, K, G>
where
    T: Real,
    K: CountKernel,
    G: SeedableRng + RngCore,
{
    /// `sphere` must hold exactly one shell (with an outer radius of `rmax`)
    pub fn new(
        randoms: ParticleSet<'a, T>,
        sphere: ShellEdges<'a, T>,
        volume: BoundingVolume<T>,
        threshold: u64,
        n_centers: usize,
        seed: u64,
        kernel: K,
    ) -> Result<Self, &'static str> {
        if sphere.n_shells() != 1 {
            Err("the footprint test uses a single shell")
        } else if threshold == 0 {
            Err("the threshold number of randoms must be positive")
        } else if threshold > randoms.n_particles() as u64 {
            Err("the threshold exceeds the total number of randoms")
        } else {
            Ok(Self {
                randoms,
                sphere,
                volume,
                threshold,
                n_centers,
                seed,
                kernel,
                _rng: PhantomData,
            })
        }
    }

    pub fn n_centers(&self) -> usize {
        self.n_centers
    }

    pub fn n_units(&self) -> usize {
        n_batches(SPHERES_PER_UNIT, self.n_centers)
    }

    /// returns whether a sphere centered on `center` lies within the footprint
    pub fn accepts(&self, center: [T; 3]) -> bool {
        let mut count = [0_u64; 1];
        self.kernel
            .count_in_shells(&self.randoms, center, &self.sphere, &self.volume, &mut count);
        count[0] >= self.threshold
    }

    /// Fill `out` with the centers of the `unit_index`-th unit of work.
    ///
    /// `out` must hold exactly the number of centers in that unit (every
    /// unit holds `SPHERES_PER_UNIT` centers, except for the last one).
    pub fn fill_unit(&self, unit_index: usize, out: &mut [[T; 3]]) -> Result<(), &'static str> {
        let mut rng = G::seed_from_u64(substream_seed(self.seed, unit_index));
        let rmax = T::from_f64(self.sphere.rmax());
        let mut remaining_attempts = out.len() * MAX_CANDIDATES_PER_CENTER;
        for slot in out.iter_mut() {
            loop {
                if remaining_attempts == 0 {
                    return Err("too few candidate centers lie within the footprint; \
                                lower the threshold or rmax");
                }
                remaining_attempts -= 1;
                let candidate = self.volume.draw_center(&mut rng, rmax, EdgePolicy::Anywhere);
                if self.accepts(candidate) {
                    *slot = candidate;
                    break;
                }
            }
        }
        Ok(())
    }
}

//! Implements [`SphereSampler`], which describes the counts-in-cells
//! calculation as a [`ReductionSpec`].

use crate::bins::ShellEdges;
use crate::kernel::CountKernel;
use crate::parallel::{ReductionSpec, n_batches, unit_bounds};
use crate::points::ParticleSet;
use crate::real::Real;
use crate::reducer::{CountsInCells, Datum, Reducer};
use crate::state::StatePackViewMut;
use crate::volume::{BoundingVolume, EdgePolicy};
use core::marker::PhantomData;
use rand::{RngCore, SeedableRng};

/// The number of spheres in a single unit of work.
///
/// This is part of the definition of the random stream: changing it changes
/// the results obtained for a given seed.
pub const SPHERES_PER_UNIT: usize = 256;

/// The seed of the random stream used by a given unit of work.
///
/// Both inputs are mixed (SplitMix64-style) so that nearby `(seed,
/// unit_index)` pairs, like `(s + 1, u)` and `(s, u + 1)`, give unrelated
/// streams.
#[inline]
pub fn substream_seed(seed: u64, unit_index: usize) -> u64 {
    let mut z = 0x9E37_79B9_7F4A_7C15_u64
        ^ seed.wrapping_mul(0xBF58_476D_1CE4_E5B9)
        ^ (unit_index as u64).wrapping_mul(0x94D0_49BB_1331_11EB);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Specifies where spheres get placed
#[derive(Clone, Copy)]
pub enum CenterSource<'a, T: Real> {
    /// draw `n_spheres` centers at random
    Random {
        n_spheres: usize,
        seed: u64,
        policy: EdgePolicy,
    },
    /// use pre-specified centers
    Explicit(&'a [[T; 3]]),
}

impl<T: Real> CenterSource<'_, T> {
    pub fn n_spheres(&self) -> usize {
        match self {
            CenterSource::Random { n_spheres, .. } => *n_spheres,
            CenterSource::Explicit(centers) => centers.len(),
        }
    }
}

/// Places spheres in the particle distribution and tallies, for each shell,
/// how many particles the spheres enclose.
///
/// `G` is the random number generator type. Each unit of work constructs a
/// fresh generator with [`SeedableRng::seed_from_u64`] (see
/// [`substream_seed`]).
pub struct SphereSampler<'a, T: Real, K: CountKernel, G> {
    reducer: CountsInCells,
    particles: ParticleSet<'a, T>,
    shells: ShellEdges<'a, T>,
    volume: BoundingVolume<T>,
    centers: CenterSource<'a, T>,
    kernel: K,
    rmax: T,
    _rng: PhantomData<fn() -> G>,
}

impl<'a, T, K, G> SphereSampler<'a, T, K, G>
where
    T: Real,
    K: CountKernel,
    G: SeedableRng + RngCore,
{
    pub fn new(
        reducer: CountsInCells,
        particles: ParticleSet<'a, T>,
        shells: ShellEdges<'a, T>,
        volume: BoundingVolume<T>,
        centers: CenterSource<'a, T>,
        kernel: K,
    ) -> Result<Self, &'static str> {
        if let CenterSource::Explicit(centers) = centers {
            if centers.iter().flatten().any(|val| !val.is_finite()) {
                return Err("sphere centers must be finite");
            } else if volume.is_periodic() && centers.iter().any(|c| !volume.contains(*c)) {
                return Err("sphere centers must lie within the periodic domain");
            }
        }
        Ok(Self {
            reducer,
            particles,
            rmax: T::from_f64(shells.rmax()),
            shells,
            volume,
            centers,
            kernel,
            _rng: PhantomData,
        })
    }

    pub fn n_spheres(&self) -> usize {
        self.centers.n_spheres()
    }

    #[inline]
    fn add_sphere(&self, center: [T; 3], statepack: &mut StatePackViewMut, counts: &mut [u64]) {
        self.kernel
            .count_in_shells(&self.particles, center, &self.shells, &self.volume, counts);
        for (shell, count) in counts.iter().enumerate() {
            self.reducer.consume(
                &mut statepack.get_state_mut(shell),
                &Datum::from_count(*count),
            );
        }
    }
}

impl<T, K, G> ReductionSpec for SphereSampler<'_, T, K, G>
where
    T: Real,
    K: CountKernel,
    G: SeedableRng + RngCore,
{
    type ReducerType = CountsInCells;

    fn get_reducer(&self) -> &Self::ReducerType {
        &self.reducer
    }

    fn n_bins(&self) -> usize {
        self.shells.n_shells()
    }

    fn n_units(&self) -> usize {
        n_batches(SPHERES_PER_UNIT, self.n_spheres())
    }

    fn scratch_len(&self) -> usize {
        self.shells.n_shells()
    }

    fn add_unit_contrib(
        &self,
        unit_index: usize,
        statepack: &mut StatePackViewMut,
        scratch: &mut [u64],
    ) {
        let (start, stop) = unit_bounds(unit_index, SPHERES_PER_UNIT, self.n_spheres());
        let counts = &mut scratch[..self.shells.n_shells()];
        match self.centers {
            CenterSource::Random { seed, policy, .. } => {
                let mut rng = G::seed_from_u64(substream_seed(seed, unit_index));
                for _ in start..stop {
                    let center = self.volume.draw_center(&mut rng, self.rmax, policy);
                    self.add_sphere(center, statepack, counts);
                }
            }
            CenterSource::Explicit(centers) => {
                for center in &centers[start..stop] {
                    self.add_sphere(*center, statepack, counts);
                }
            }
        }
    }
}

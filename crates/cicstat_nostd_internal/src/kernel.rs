//! The count kernels: for a single sphere center, count the particles
//! enclosed by each shell.
//!
//! There are a few implementations of [`CountKernel`] that differ only in how
//! the loop over particles is structured. The lane-based kernels process a
//! fixed-size chunk of particles at a time. This is only a hint to the
//! auto-vectorizer: no kernel uses `#[target_feature]` or explicit SIMD
//! intrinsics, so the generated code depends on the target features the
//! crate is compiled with, and the instruction-set choice that selects a
//! lane width may have little effect on performance.
//!
//! The choice of kernel must **never** change the result. Every kernel
//! evaluates exactly the same floating point expression for every particle
//! (see [`BoundingVolume::separation_squared`]) and the counts are integers,
//! so this holds by construction.

use crate::bins::ShellEdges;
use crate::points::ParticleSet;
use crate::real::Real;
use crate::volume::BoundingVolume;

/// Selects the count kernel. The choice is made once, when a calculation is
/// launched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelChoice {
    /// processes a single particle at a time
    Scalar,
    /// processes 4 particles at a time
    Lanes4,
    /// processes 8 particles at a time
    Lanes8,
}

pub trait CountKernel: Copy + Send + Sync {
    /// Fill `counts` so that `counts[i]` holds the number of particles that
    /// lie within the outer radius of shell `i`.
    ///
    /// `counts` must have an entry for every shell.
    fn count_in_shells<T: Real>(
        &self,
        particles: &ParticleSet<T>,
        center: [T; 3],
        shells: &ShellEdges<T>,
        volume: &BoundingVolume<T>,
        counts: &mut [u64],
    );
}

#[derive(Clone, Copy, Default)]
pub struct ScalarKernel;

impl CountKernel for ScalarKernel {
    fn count_in_shells<T: Real>(
        &self,
        particles: &ParticleSet<T>,
        center: [T; 3],
        shells: &ShellEdges<T>,
        volume: &BoundingVolume<T>,
        counts: &mut [u64],
    ) {
        debug_assert_eq!(counts.len(), shells.n_shells());
        counts.fill(0);
        for i in 0..particles.n_particles() {
            let dist2 = volume.separation_squared(particles.position(i), center);
            if let Some(shell) = shells.innermost_shell(dist2) {
                counts[shell] += 1;
            }
        }
        cumulative_sum(counts);
    }
}

/// Processes `LANES` particles per iteration (plain scalar code arranged
/// for auto-vectorization).
#[derive(Clone, Copy, Default)]
pub struct LaneKernel<const LANES: usize>;

impl<const LANES: usize> CountKernel for LaneKernel<LANES> {
    fn count_in_shells<T: Real>(
        &self,
        particles: &ParticleSet<T>,
        center: [T; 3],
        shells: &ShellEdges<T>,
        volume: &BoundingVolume<T>,
        counts: &mut [u64],
    ) {
        debug_assert_eq!(counts.len(), shells.n_shells());
        counts.fill(0);

        let xs = particles.component(0);
        let ys = particles.component(1);
        let zs = particles.component(2);
        let n_particles = particles.n_particles();
        let n_full = n_particles - (n_particles % LANES);
        let max_r2 = shells.max_squared_radius();

        let mut dist2 = [T::ZERO; LANES];
        for start in (0..n_full).step_by(LANES) {
            let x_chunk = &xs[start..start + LANES];
            let y_chunk = &ys[start..start + LANES];
            let z_chunk = &zs[start..start + LANES];

            // the body of this loop is identical to separation_squared. We
            // write it out by hand so that each step is applied across lanes
            for lane in 0..LANES {
                let dx = volume.wrap_displacement(0, x_chunk[lane] - center[0]);
                let dy = volume.wrap_displacement(1, y_chunk[lane] - center[1]);
                let dz = volume.wrap_displacement(2, z_chunk[lane] - center[2]);
                dist2[lane] = dx * dx + dy * dy + dz * dz;
            }

            // most particles lie outside of the sphere
            if dist2.iter().all(|d2| *d2 > max_r2) {
                continue;
            }
            for d2 in dist2.iter() {
                if let Some(shell) = shells.innermost_shell(*d2) {
                    counts[shell] += 1;
                }
            }
        }

        // the remainder
        for i in n_full..n_particles {
            let dist2 = volume.separation_squared(particles.position(i), center);
            if let Some(shell) = shells.innermost_shell(dist2) {
                counts[shell] += 1;
            }
        }
        cumulative_sum(counts);
    }
}

/// convert per-shell tallies into cumulative counts
#[inline]
fn cumulative_sum(counts: &mut [u64]) {
    for i in 1..counts.len() {
        counts[i] += counts[i - 1];
    }
}

/// Count the particles within each shell of a sphere centered on `center`
/// using the kernel specified by `choice`.
pub fn count_in_shells<T: Real>(
    choice: KernelChoice,
    particles: &ParticleSet<T>,
    center: [T; 3],
    shells: &ShellEdges<T>,
    volume: &BoundingVolume<T>,
    counts: &mut [u64],
) {
    match choice {
        KernelChoice::Scalar => {
            ScalarKernel.count_in_shells(particles, center, shells, volume, counts)
        }
        KernelChoice::Lanes4 => {
            LaneKernel::<4>.count_in_shells(particles, center, shells, volume, counts)
        }
        KernelChoice::Lanes8 => {
            LaneKernel::<8>.count_in_shells(particles, center, shells, volume, counts)
        }
    }
}

//! Define API functions to actually drive the calculation
//!
//! It may be useful to enumerate the inputs into the calculation:
//!
//! 1. the particle positions ([`ParticleSet`])
//! 2. the parameters that determine the result ([`VpfConfig`])
//! 3. optionally, pre-specified sphere centers or a catalogue of randoms that
//!    describes the survey footprint
//! 4. runtime-parameters that don't have any impact on the output, but
//!    impact performance (see [`RuntimeSpec`])
//!
//! Every function validates all of its inputs before any sampling occurs.
//! A calculation either fully succeeds or returns an [`Error`] (there are no
//! partial results).

use crate::{
    Error, ExecutorKind, RuntimeSpec, VpfBuilder, VpfConfig, parallel_rayon::RayonExecutor,
    parallel_serial::SerialExecutor,
};
use cicstat_nostd_internal::{
    BoundingVolume, CenterSource, CountKernel, CountsInCells, EdgePolicy, Executor,
    FootprintCenters, KernelChoice, LaneKernel, ParticleSet, Real, Reducer, ReductionSpec,
    SPHERES_PER_UNIT, ScalarKernel, ShellEdges, SphereSampler, StatePackViewMut, TailStatus,
    fill_squared_shell_radii,
};
use ndarray::{Array2, ArrayView1};
use rand_xoshiro::Xoshiro256PlusPlus;
use std::time::{Duration, Instant};

/// The probabilities computed for a single shell
#[derive(Clone, Debug, PartialEq)]
pub struct ResultRow {
    /// the outer radius of the shell
    pub rmax: f64,
    /// `pn[k]` is the probability that a sphere of radius `rmax` contains
    /// exactly `k` particles, except for the final entry, which holds the
    /// probability of containing `pn.len() - 1` or more particles.
    pub pn: Vec<f64>,
}

/// The output of a counts-in-cells calculation
#[derive(Clone, Debug)]
pub struct VpfOutput {
    /// one row per shell, in order of increasing radius
    pub rows: Vec<ResultRow>,
    /// the time spent sampling spheres & counting particles (this includes
    /// the time spent selecting centers within a footprint)
    pub elapsed: Duration,
    /// whether round-off pushed a tail probability below 0 (it was then set
    /// to 0)
    pub tail_clamped: bool,
    /// the seed that was actually used (`None` when the sphere centers were
    /// pre-specified)
    pub seed: Option<u64>,
}

impl VpfOutput {
    /// the outer radius of each shell
    pub fn radii(&self) -> Vec<f64> {
        self.rows.iter().map(|row| row.rmax).collect()
    }

    /// Pack the probabilities into an array of shape `(nbins, num_pN)`
    pub fn pn_array(&self) -> Array2<f64> {
        let num_pn = self.rows.first().map_or(0, |row| row.pn.len());
        let mut out = Array2::zeros((self.rows.len(), num_pn));
        for (mut dest, row) in out.rows_mut().into_iter().zip(self.rows.iter()) {
            dest.assign(&ArrayView1::from(&row.pn));
        }
        out
    }
}

/// Compute the counts-in-cells probabilities for spheres placed at random.
///
/// For a fixed positive seed, the result is bitwise identical for every
/// choice in `runtime`.
pub fn compute_vpf<T: Real>(
    config: &VpfConfig,
    particles: ParticleSet<T>,
    runtime: &RuntimeSpec,
) -> Result<VpfOutput, Error> {
    exec_vpf(config, particles, Placement::Random, runtime)
}

/// Compute the counts-in-cells probabilities for spheres placed at the
/// specified `centers`.
///
/// The number of spheres is given by `centers.len()` (the `nspheres` and
/// `seed` parameters of `config` are ignored).
pub fn compute_vpf_at_centers<T: Real>(
    config: &VpfConfig,
    particles: ParticleSet<T>,
    centers: &[[T; 3]],
    runtime: &RuntimeSpec,
) -> Result<VpfOutput, Error> {
    exec_vpf(config, particles, Placement::Explicit(centers), runtime)
}

/// Compute the counts-in-cells probabilities for random spheres that lie
/// within a survey footprint.
///
/// The footprint is described by `randoms`, a catalogue of points that
/// uniformly fills it. Candidate centers are drawn uniformly from the domain
/// and a candidate is kept only when at least `threshold` randoms lie within
/// `rmax` of it. The `edge_policy` of `config` is ignored. Like
/// [`compute_vpf`], the result is bitwise identical for every choice in
/// `runtime` when the seed is fixed.
///
/// This fails with [`ErrorCategory::InfeasibleSampling`] when candidates are
/// rejected too often (more than [`MAX_CANDIDATES_PER_CENTER`] times per
/// requested center within a unit of work).
///
/// [`ErrorCategory::InfeasibleSampling`]: crate::ErrorCategory::InfeasibleSampling
/// [`MAX_CANDIDATES_PER_CENTER`]: crate::MAX_CANDIDATES_PER_CENTER
pub fn compute_vpf_in_footprint<T: Real>(
    config: &VpfConfig,
    particles: ParticleSet<T>,
    randoms: ParticleSet<T>,
    threshold: usize,
    runtime: &RuntimeSpec,
) -> Result<VpfOutput, Error> {
    exec_vpf(
        config,
        particles,
        Placement::Footprint { randoms, threshold },
        runtime,
    )
}

/// A convenience function for computing the counts-in-cells probabilities
/// with the default [`RuntimeSpec`].
///
/// `seed <= 0` requests a seed drawn from the wall clock. `boxsize == 0`
/// means that the domain is derived from the extent of the particles.
#[allow(clippy::too_many_arguments)]
pub fn vpf<T: Real>(
    rmax: f64,
    nbins: usize,
    nspheres: usize,
    num_pn: usize,
    seed: i64,
    x: &[T],
    y: &[T],
    z: &[T],
    periodic: bool,
    boxsize: f64,
) -> Result<Vec<ResultRow>, Error> {
    let config = VpfBuilder::new()
        .rmax(rmax)
        .nbins(nbins)
        .nspheres(nspheres)
        .num_pn(num_pn)
        .seed(seed)
        .periodic(periodic)
        .boxsize(boxsize)
        .build()?;
    let particles = ParticleSet::new(x, y, z).map_err(|e| Error::argument("particles", e))?;
    compute_vpf(&config, particles, &RuntimeSpec::default()).map(|output| output.rows)
}

/// Describes how the sphere centers are chosen
#[derive(Clone, Copy)]
enum Placement<'a, T: Real> {
    Random,
    Explicit(&'a [[T; 3]]),
    Footprint {
        randoms: ParticleSet<'a, T>,
        threshold: usize,
    },
}

/// the executors are generic over the [`ReductionSpec`], so we can't use
/// trait objects
enum AnyExecutor {
    Serial(SerialExecutor),
    Rayon(RayonExecutor),
}

impl AnyExecutor {
    fn new(runtime: &RuntimeSpec) -> Result<AnyExecutor, Error> {
        match runtime.executor {
            ExecutorKind::Serial => Ok(AnyExecutor::Serial(SerialExecutor)),
            ExecutorKind::Rayon if runtime.n_threads > 0 => RayonExecutor::with_threads(
                runtime.n_threads,
            )
            .map(AnyExecutor::Rayon)
            .map_err(Error::thread_pool),
            ExecutorKind::Rayon => Ok(AnyExecutor::Rayon(RayonExecutor::new())),
        }
    }

    fn n_threads(&self) -> usize {
        match self {
            AnyExecutor::Serial(_) => 1,
            AnyExecutor::Rayon(executor) => executor.n_threads(),
        }
    }

    fn drive_reduce(
        &mut self,
        out: &mut StatePackViewMut,
        reduction_spec: &(impl ReductionSpec + Sync),
    ) -> Result<(), Error> {
        match self {
            AnyExecutor::Serial(executor) => executor.drive_reduce(out, reduction_spec),
            AnyExecutor::Rayon(executor) => executor.drive_reduce(out, reduction_spec),
        }
        .map_err(Error::internal_legacy_adhoc)
    }

    fn fill_chunks<C, F>(&self, items: &mut [C], chunk_len: usize, f: F) -> Result<(), &'static str>
    where
        C: Send,
        F: Fn(usize, &mut [C]) -> Result<(), &'static str> + Send + Sync,
    {
        match self {
            AnyExecutor::Serial(executor) => executor.fill_chunks(items, chunk_len, f),
            AnyExecutor::Rayon(executor) => executor.fill_chunks(items, chunk_len, f),
        }
    }
}

/// The inputs shared by every kernel
struct Problem<'a, T: Real> {
    reducer: CountsInCells,
    particles: ParticleSet<'a, T>,
    shells: ShellEdges<'a, T>,
    volume: BoundingVolume<T>,
    centers: CenterSource<'a, T>,
}

/// construct the sampler & drive the reduction. Returns the time spent in
/// the reduction
fn run_with_kernel<T: Real, K: CountKernel>(
    kernel: K,
    problem: &Problem<T>,
    executor: &mut AnyExecutor,
    out: &mut StatePackViewMut,
) -> Result<Duration, Error> {
    let sampler = SphereSampler::<T, K, Xoshiro256PlusPlus>::new(
        problem.reducer,
        problem.particles,
        problem.shells,
        problem.volume,
        problem.centers,
        kernel,
    )
    .map_err(|e| Error::argument("centers", e))?;
    log::debug!(
        "sampling {} spheres in {} units of work",
        sampler.n_spheres(),
        sampler.n_units()
    );

    let start = Instant::now();
    executor.drive_reduce(out, &sampler)?;
    Ok(start.elapsed())
}

/// The inputs to the footprint test
struct Footprint<'a, T: Real> {
    randoms: ParticleSet<'a, T>,
    sphere: ShellEdges<'a, T>,
    volume: BoundingVolume<T>,
    threshold: usize,
    n_centers: usize,
    seed: u64,
}

/// draw the sphere centers that lie within the footprint
fn footprint_centers_with_kernel<T: Real, K: CountKernel>(
    kernel: K,
    footprint: &Footprint<T>,
    executor: &AnyExecutor,
) -> Result<Vec<[T; 3]>, Error> {
    let selector = FootprintCenters::<T, K, Xoshiro256PlusPlus>::new(
        footprint.randoms,
        footprint.sphere,
        footprint.volume,
        footprint.threshold as u64,
        footprint.n_centers,
        footprint.seed,
        kernel,
    )
    .map_err(Error::internal_legacy_adhoc)?;

    let mut centers = vec![[T::ZERO; 3]; footprint.n_centers];
    executor
        .fill_chunks(&mut centers, SPHERES_PER_UNIT, |unit_index, chunk| {
            selector.fill_unit(unit_index, chunk)
        })
        .map_err(|what| Error::footprint(what, footprint.threshold, footprint.sphere.rmax()))?;
    log::debug!(
        "selected {} centers within the footprint of {} randoms",
        centers.len(),
        footprint.randoms.n_particles()
    );
    Ok(centers)
}

fn footprint_centers<T: Real>(
    kernel: KernelChoice,
    footprint: &Footprint<T>,
    executor: &AnyExecutor,
) -> Result<Vec<[T; 3]>, Error> {
    match kernel {
        KernelChoice::Scalar => footprint_centers_with_kernel(ScalarKernel, footprint, executor),
        KernelChoice::Lanes4 => footprint_centers_with_kernel(LaneKernel::<4>, footprint, executor),
        KernelChoice::Lanes8 => footprint_centers_with_kernel(LaneKernel::<8>, footprint, executor),
    }
}

/// returns an error when particles lie outside of a periodic domain
fn check_inside_periodic<T: Real>(
    who: &'static str,
    particles: &ParticleSet<T>,
    volume: &BoundingVolume<T>,
) -> Result<(), Error> {
    if !volume.is_periodic() {
        return Ok(());
    }
    let n_outside = (0..particles.n_particles())
        .filter(|i| !volume.contains(particles.position(*i)))
        .count();
    if n_outside > 0 {
        let lo = volume.origin()[0].to_f64();
        let hi = lo + volume.lengths()[0].to_f64();
        Err(Error::argument(
            who,
            format!("{n_outside} point(s) lie outside of the periodic domain [{lo}, {hi}]"),
        ))
    } else {
        Ok(())
    }
}

/// check that the spheres can be placed in the domain
fn check_feasibility<T: Real>(
    volume: &BoundingVolume<T>,
    rmax: f64,
    nspheres: usize,
    policy: EdgePolicy,
) -> Result<(), Error> {
    let sphere_volume = 4.0 * std::f64::consts::PI * rmax.powi(3) / 3.0;
    if (nspheres as f64) * sphere_volume > volume.volume() {
        return Err(Error::volume_feasibility(nspheres, rmax, volume.volume()));
    }
    volume
        .check_sphere_fits(rmax, policy)
        .map_err(|what| Error::sphere_fit(what, rmax, volume.min_length()))?;
    if volume.exceeds_half_length(rmax) {
        log::warn!(
            "rmax = {rmax} exceeds half of the periodic domain's shortest length ({}); \
             spheres only count the nearest image of each particle",
            volume.min_length()
        );
    }
    Ok(())
}

fn exec_vpf<T: Real>(
    config: &VpfConfig,
    particles: ParticleSet<T>,
    placement: Placement<T>,
    runtime: &RuntimeSpec,
) -> Result<VpfOutput, Error> {
    let rmax = config.rmax();

    // setup the domain
    let volume = if config.boxsize() > 0.0 {
        let volume = BoundingVolume::from_boxsize(T::from_f64(config.boxsize()), config.periodic())
            .map_err(|e| Error::argument("boxsize", e))?;
        check_inside_periodic("particles", &particles, &volume)?;
        volume
    } else {
        BoundingVolume::from_particle_extents(&particles, config.periodic())
            .map_err(|e| Error::argument("particles", e))?
    };
    if let Placement::Footprint { randoms, threshold } = placement {
        check_inside_periodic("randoms", &randoms, &volume)?;
        if threshold == 0 || threshold > randoms.n_particles() {
            return Err(Error::argument(
                "threshold",
                format!(
                    "must lie between 1 and the number of randoms ({})",
                    randoms.n_particles()
                ),
            ));
        }
    }

    // only centers drawn uniformly from the domain are subject to the edge
    // policy
    let (nspheres, policy) = match placement {
        Placement::Random => (config.nspheres(), config.edge_policy()),
        Placement::Explicit(centers) => (centers.len(), EdgePolicy::Anywhere),
        Placement::Footprint { .. } => (config.nspheres(), EdgePolicy::Anywhere),
    };
    check_feasibility(&volume, rmax, nspheres, policy)?;

    let mut squared_radii = vec![T::ZERO; config.nbins()];
    fill_squared_shell_radii(rmax, &mut squared_radii);
    let shells =
        ShellEdges::new(rmax, &squared_radii).map_err(|e| Error::argument("nbins", e))?;
    let reducer = CountsInCells::new(config.num_pn()).map_err(|e| Error::argument("num_pN", e))?;

    let mut executor = AnyExecutor::new(runtime)?;
    let kernel = runtime.isa.resolve();

    // the seed is resolved after every check has passed
    let mut elapsed = Duration::ZERO;
    let selected;
    let (centers, seed) = match placement {
        Placement::Explicit(centers) => (CenterSource::Explicit(centers), None),
        Placement::Random => {
            let seed = config.seed().resolve();
            let source = CenterSource::Random {
                n_spheres: nspheres,
                seed,
                policy,
            };
            (source, Some(seed))
        }
        Placement::Footprint { randoms, threshold } => {
            let seed = config.seed().resolve();
            let outer = [shells.max_squared_radius()];
            let footprint = Footprint {
                randoms,
                sphere: ShellEdges::new(rmax, &outer).map_err(|e| Error::argument("rmax", e))?,
                volume,
                threshold,
                n_centers: nspheres,
                seed,
            };
            let start = Instant::now();
            selected = footprint_centers(kernel, &footprint, &executor)?;
            elapsed += start.elapsed();
            (CenterSource::Explicit(selected.as_slice()), Some(seed))
        }
    };

    let problem = Problem {
        reducer,
        particles,
        shells,
        volume,
        centers,
    };

    let shape = [reducer.accum_state_size(), shells.n_shells()];
    let mut buf = vec![0.0; shape[0] * shape[1]];
    let mut statepack =
        StatePackViewMut::from_slice(shape, &mut buf).map_err(Error::internal_legacy_adhoc)?;

    elapsed += match kernel {
        KernelChoice::Scalar => {
            run_with_kernel(ScalarKernel, &problem, &mut executor, &mut statepack)
        }
        KernelChoice::Lanes4 => {
            run_with_kernel(LaneKernel::<4>, &problem, &mut executor, &mut statepack)
        }
        KernelChoice::Lanes8 => {
            run_with_kernel(LaneKernel::<8>, &problem, &mut executor, &mut statepack)
        }
    }?;

    // convert the histograms to probabilities
    let mut tail_clamped = false;
    let n_per_state = reducer.output_descr().n_per_accum_state();
    let rows: Vec<ResultRow> = (0..shells.n_shells())
        .map(|i| {
            let mut pn = vec![0.0; n_per_state];
            if reducer.fill_probabilities(&mut pn, &statepack.get_state(i)) == TailStatus::Clamped
            {
                tail_clamped = true;
            }
            ResultRow {
                rmax: shells.outer_radius(i),
                pn,
            }
        })
        .collect();

    if tail_clamped {
        log::warn!("round-off produced a negative tail probability; it was clamped to 0");
    }
    if runtime.verbose {
        log::info!(
            "counts-in-cells: {} particles ({}), {} spheres, {} shells, seed {:?}, \
             kernel {:?}, {} thread(s), {:.3}s",
            particles.n_particles(),
            T::NAME,
            nspheres,
            shells.n_shells(),
            seed,
            kernel,
            executor.n_threads(),
            elapsed.as_secs_f64()
        );
    }

    Ok(VpfOutput {
        rows,
        elapsed,
        tail_clamped,
        seed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;

    #[test]
    fn single_particle() {
        // a lone particle at the center of a periodic box. A sphere holds
        // the particle only if its center lies within rmax of the particle
        let pos = [5.0];
        let config = VpfBuilder::new()
            .rmax(1.0)
            .nbins(1)
            .nspheres(200)
            .num_pn(2)
            .seed(31)
            .boxsize(10.0)
            .build()
            .unwrap();
        let particles = ParticleSet::new(&pos, &pos, &pos).unwrap();
        let output = compute_vpf(&config, particles, &RuntimeSpec::serial()).unwrap();
        assert_eq!(output.rows.len(), 1);
        assert_eq!(output.seed, Some(31));
        let row = &output.rows[0];
        assert_eq!(row.rmax, 1.0);
        // the expected value of pn[1] is 4.19e-3
        assert!(row.pn[0] > 0.95, "{:?}", row.pn);
        assert!((row.pn[0] + row.pn[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn explicit_centers() {
        let x = [1.0, 9.5, 8.0];
        let y = [1.0, 9.5, 8.0];
        let z = [1.0, 9.5, 8.0];
        let config = VpfBuilder::new()
            .rmax(2.0)
            .nbins(2)
            .nspheres(0)
            .num_pn(3)
            .boxsize(10.0)
            .build()
            .unwrap();
        let particles = ParticleSet::new(&x, &y, &z).unwrap();
        // relative to the first center, the particles are 0.87, 1.73 (thanks
        // to periodicity) and 4.33 away. The second center encloses nothing
        let centers = [[0.5, 0.5, 0.5], [5.0, 5.0, 5.0]];
        let output =
            compute_vpf_at_centers(&config, particles, &centers, &RuntimeSpec::serial()).unwrap();
        assert_eq!(output.seed, None);
        assert_eq!(output.rows[0].rmax, 1.0);
        assert_eq!(output.rows[0].pn, vec![0.5, 0.5, 0.0]);
        assert_eq!(output.rows[1].pn, vec![0.5, 0.0, 0.5]);

        assert_eq!(output.radii(), vec![1.0, 2.0]);
        let arr = output.pn_array();
        assert_eq!(arr.shape(), &[2, 3]);
        assert_eq!(arr[[1, 2]], 0.5);
    }

    #[test]
    fn particles_outside_periodic_box() {
        let x = [1.0, 12.0];
        let config = VpfBuilder::new()
            .rmax(1.0)
            .nbins(1)
            .nspheres(10)
            .num_pn(2)
            .seed(1)
            .boxsize(10.0)
            .build()
            .unwrap();
        let particles = ParticleSet::new(&x, &x, &x).unwrap();
        let err = compute_vpf(&config, particles, &RuntimeSpec::serial()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InvalidArgument);
    }
}

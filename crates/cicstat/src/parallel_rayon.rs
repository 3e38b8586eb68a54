//! Implements a multi-threaded backend (built on rayon) for driving a
//! reduction
//!
//! Each rayon task folds units of work into a private statepack. Once every
//! unit is complete, the private statepacks are merged. We never share a
//! statepack between threads, so there are no locks on the hot path.

use cicstat_nostd_internal::{
    Executor, ReductionSpec, StatePackViewMut, merge_full_statepacks, reset_full_statepack,
};
use rayon::prelude::*;

pub struct RayonExecutor {
    // when None, we use rayon's global pool
    pool: Option<rayon::ThreadPool>,
}

impl Default for RayonExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl RayonExecutor {
    /// an executor that uses rayon's global thread pool
    pub fn new() -> Self {
        RayonExecutor { pool: None }
    }

    /// an executor that uses a dedicated pool with `n_threads` threads
    pub fn with_threads(n_threads: usize) -> Result<Self, rayon::ThreadPoolBuildError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(n_threads)
            .build()?;
        Ok(RayonExecutor { pool: Some(pool) })
    }

    pub fn n_threads(&self) -> usize {
        match &self.pool {
            Some(pool) => pool.current_num_threads(),
            None => rayon::current_num_threads(),
        }
    }

    /// Call `f(i, chunk)` on the `i`-th chunk of `items`, for every chunk of
    /// `chunk_len` consecutive items. The chunks are processed concurrently.
    pub fn fill_chunks<C, F>(
        &self,
        items: &mut [C],
        chunk_len: usize,
        f: F,
    ) -> Result<(), &'static str>
    where
        C: Send,
        F: Fn(usize, &mut [C]) -> Result<(), &'static str> + Send + Sync,
    {
        let mut run = || {
            items
                .par_chunks_mut(chunk_len)
                .enumerate()
                .try_for_each(|(i, chunk)| f(i, chunk))
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }
}

/// allocate a buffer holding a freshly initialized statepack
fn fresh_statepack(reduction_spec: &impl ReductionSpec, shape: [usize; 2]) -> Vec<f64> {
    let mut buf = vec![0.0; shape[0] * shape[1]];
    let mut statepack = StatePackViewMut::from_slice(shape, &mut buf)
        .expect("There must be a bug: the buffer was sized for the shape");
    reset_full_statepack(reduction_spec.get_reducer(), &mut statepack);
    buf
}

fn wrap(shape: [usize; 2], buf: &mut [f64]) -> StatePackViewMut {
    StatePackViewMut::from_slice(shape, buf)
        .expect("There must be a bug: the buffer was sized for the shape")
}

impl Executor for RayonExecutor {
    fn drive_reduce(
        &mut self,
        out: &mut StatePackViewMut,
        reduction_spec: &(impl ReductionSpec + Sync),
    ) -> Result<(), &'static str> {
        let shape = reduction_spec.statepack_shape();
        if out.shape() != shape {
            return Err("the out argument doesn't have the correct shape!");
        }
        let scratch_len = reduction_spec.scratch_len();
        let n_units = reduction_spec.n_units();

        let run = || -> Vec<f64> {
            (0..n_units)
                .into_par_iter()
                .fold(
                    || (fresh_statepack(reduction_spec, shape), vec![0_u64; scratch_len]),
                    |(mut buf, mut scratch), unit_index| {
                        reduction_spec.add_unit_contrib(
                            unit_index,
                            &mut wrap(shape, &mut buf),
                            &mut scratch,
                        );
                        (buf, scratch)
                    },
                )
                .map(|(buf, _)| buf)
                .reduce(
                    || fresh_statepack(reduction_spec, shape),
                    |mut left, mut right| {
                        merge_full_statepacks(
                            reduction_spec.get_reducer(),
                            &mut wrap(shape, &mut left),
                            &wrap(shape, &mut right),
                        );
                        left
                    },
                )
        };

        let mut combined = match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        reset_full_statepack(reduction_spec.get_reducer(), out);
        merge_full_statepacks(
            reduction_spec.get_reducer(),
            out,
            &wrap(shape, &mut combined),
        );
        Ok(())
    }
}

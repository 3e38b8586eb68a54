//! Our parallelism abstractions are built around the idea of a binned
//! reduction that is decomposed into _units of work_.
//!
//! In general, a parallel reduction is a way of characterizing a certain kind
//! of calculation that can be broken into parts, where each part can be
//! computed simultaneously, and each of the partial results can be combined
//! together into a single result.
//!
//! For the counts-in-cells statistic, a unit of work is a fixed-size batch of
//! spheres. Every unit can be completed independently of every other unit:
//! - each unit draws its sphere centers from a private random number stream
//!   that is seeded from the global seed and the unit's index.
//! - each unit records contributions into whatever statepack it is handed.
//!
//! Consequently, the way that units are distributed among threads can't
//! influence the result. An [`Executor`] is free to hand each thread its own
//! statepack and merge the statepacks once every unit is complete. Because
//! the accumulated quantities are integer-valued (they are tallies), the
//! merge order doesn't affect the bits of the result either.

use crate::reducer::Reducer;
use crate::state::StatePackViewMut;

/// Used for specifying the details of a binned reduction, providing an
/// interface for external code to carry it out (potentially in parallel).
///
/// At a high-level, types that implement this trait:
///
/// 1. encode details about a _binned reduction_, wherein data is partitioned
///    into bins (shells), with a separate `accum_state` for each. The
///    collection of `accum_state`s for each bin is called a `statepack`.
///
/// 2. have access to the data-source used in the binned reduction
///
/// 3. know how to decompose the overall binned reduction into _units of
///    work_. The decomposition must not depend on the number of threads.
pub trait ReductionSpec {
    // An important premise is that you do error-checking while constructing
    // structs, and you design the logic such that you don't have to do **any**
    // error-handling in this trait's methods.

    type ReducerType: Reducer;

    /// return a reference to the reducer
    fn get_reducer(&self) -> &Self::ReducerType;

    /// The number of bins in this reduction.
    fn n_bins(&self) -> usize;

    /// The number of units of work
    fn n_units(&self) -> usize;

    /// the number of scratch entries needed by [`Self::add_unit_contrib`]
    fn scratch_len(&self) -> usize;

    /// the shape of a statepack that holds the reduction's output
    fn statepack_shape(&self) -> [usize; 2] {
        [self.get_reducer().accum_state_size(), self.n_bins()]
    }

    /// Complete the unit of work with index `unit_index` by adding its
    /// contributions to `statepack`.
    ///
    /// `scratch` must hold [`Self::scratch_len`] entries. Its contents on
    /// entry are ignored.
    fn add_unit_contrib(
        &self,
        unit_index: usize,
        statepack: &mut StatePackViewMut,
        scratch: &mut [u64],
    );
}

/// a trait for expressing how to launch a reduction
///
/// The idea is that we implement this for each parallelism "backend," so we
/// have a uniform interface for easily switching between backends.
///
/// Every implementation must initialize `out` before adding contributions.
pub trait Executor {
    fn drive_reduce(
        &mut self,
        out: &mut StatePackViewMut,
        reduction_spec: &(impl ReductionSpec + Sync),
    ) -> Result<(), &'static str>;
}

/// The bounds `[start, stop)` of the `unit_index`-th batch, when
/// `n_items` items are split into batches of `batch_size` items.
#[inline]
pub fn unit_bounds(unit_index: usize, batch_size: usize, n_items: usize) -> (usize, usize) {
    let start = unit_index * batch_size;
    let stop = (start + batch_size).min(n_items);
    (start, stop)
}

/// the number of batches of `batch_size` needed to cover `n_items` items
#[inline]
pub fn n_batches(batch_size: usize, n_items: usize) -> usize {
    n_items.div_ceil(batch_size)
}

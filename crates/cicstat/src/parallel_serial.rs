//! Implements the "serial" backend for driving a reduction

use cicstat_nostd_internal::{Executor, ReductionSpec, StatePackViewMut, reset_full_statepack};

pub struct SerialExecutor;

impl SerialExecutor {
    /// Call `f(i, chunk)` on the `i`-th chunk of `items`, for every chunk of
    /// `chunk_len` consecutive items, in order. Stops at the first error.
    pub fn fill_chunks<C, F>(
        &self,
        items: &mut [C],
        chunk_len: usize,
        f: F,
    ) -> Result<(), &'static str>
    where
        F: Fn(usize, &mut [C]) -> Result<(), &'static str>,
    {
        for (i, chunk) in items.chunks_mut(chunk_len).enumerate() {
            f(i, chunk)?;
        }
        Ok(())
    }
}

impl Executor for SerialExecutor {
    fn drive_reduce(
        &mut self,
        out: &mut StatePackViewMut,
        reduction_spec: &(impl ReductionSpec + Sync),
    ) -> Result<(), &'static str> {
        if out.shape() != reduction_spec.statepack_shape() {
            return Err("the out argument doesn't have the correct shape!");
        }
        reset_full_statepack(reduction_spec.get_reducer(), out);

        let mut scratch = vec![0_u64; reduction_spec.scratch_len()];
        for unit_index in 0..reduction_spec.n_units() {
            reduction_spec.add_unit_contrib(unit_index, out, &mut scratch);
        }
        Ok(())
    }
}

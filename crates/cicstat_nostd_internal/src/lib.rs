/*!
Internal machinery for the counts-in-cells estimator (that doesn't require
the standard library).

# Developer Guide

The calculation proceeds as follows:

1. [`SphereSampler`] places spheres of radius `rmax` inside the domain
   (described by [`BoundingVolume`]). Each sphere is split into concentric
   shells (described by [`ShellEdges`]).
2. For each sphere, a [`CountKernel`] tallies the number of particles
   enclosed by every shell.
3. For each shell, the [`CountsInCells`] reducer accumulates a histogram
   of the enclosed counts. The histograms are converted to probabilities
   at the very end.

When the particles come from a survey that doesn't fill its bounding box,
[`FootprintCenters`] can be used to pre-select centers whose spheres lie
within the survey's footprint.

The overall calculation is framed as a binned reduction (the shell index is
the bin index) that is decomposed into units of work (see
[`ReductionSpec`]). The standard library crate provides the [`Executor`]
implementations.
*/

#![no_std]
#![deny(rustdoc::broken_intra_doc_links)]

mod bins;
mod footprint;
mod kernel;
mod parallel;
mod points;
mod real;
mod reduce_utils;
mod reducer;
mod sampler;
mod state;
mod volume;

pub use bins::{ShellEdges, fill_squared_shell_radii, shell_outer_radius};
pub use footprint::{FootprintCenters, MAX_CANDIDATES_PER_CENTER};
pub use kernel::{CountKernel, KernelChoice, LaneKernel, ScalarKernel, count_in_shells};
pub use parallel::{Executor, ReductionSpec, n_batches, unit_bounds};
pub use points::ParticleSet;
pub use real::Real;
pub use reduce_utils::{merge_full_statepacks, reset_full_statepack};
pub use reducer::{CountsInCells, Datum, OutputDescr, Reducer, TailStatus};
pub use sampler::{CenterSource, SPHERES_PER_UNIT, SphereSampler, substream_seed};
pub use state::StatePackViewMut;
pub use volume::{BoundingVolume, EdgePolicy};

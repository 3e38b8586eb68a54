/*!
Provides parallelized routines for computing counts-in-cells statistics of
3D point distributions. The headline statistic is the void probability
function (VPF).

# High-Level: Counts-in-Cells

We place `nspheres` spheres at random within the domain that holds the
particles. Each sphere is divided into `nbins` concentric shells, where the
outer radius of the `i`th shell is `rmax * (i + 1) / nbins`. For every
shell, we report `pN[k]`: the fraction of spheres of that radius that
enclose exactly `k` particles. The final entry of `pN` is the "tail": the
fraction of spheres that hold at least `num_pN - 1` particles. `pN[0]` is
the VPF.

When the domain is periodic, distances follow the minimum image
convention. Sphere centers may also be pre-specified
([`compute_vpf_at_centers`]) or restricted to the footprint of a survey,
described by a catalogue of randoms ([`compute_vpf_in_footprint`]).

# User Guide

```
use cicstat::{ParticleSet, RuntimeSpec, VpfBuilder, compute_vpf};

let x = [1.0, 4.0, 6.5, 9.0];
let y = [2.0, 5.0, 3.5, 8.0];
let z = [7.0, 1.0, 5.5, 2.0];
let config = VpfBuilder::new()
    .rmax(2.0)
    .nbins(4)
    .nspheres(20)
    .num_pn(3)
    .seed(42)
    .boxsize(10.0)
    .build()
    .unwrap();
let particles = ParticleSet::new(&x, &y, &z).unwrap();
let output = compute_vpf(&config, particles, &RuntimeSpec::default()).unwrap();
assert_eq!(output.rows.len(), 4);
```

For a fixed (positive) seed, the results are bitwise identical regardless of
the number of threads, the parallelism backend or the instruction set
choice.

# Developer Guide

See the crate-level documentation for [`cicstat_nostd_internal`].

*/

#![deny(rustdoc::broken_intra_doc_links)]

// inform build-system of the crates in this package
mod config;
mod error;
mod func;
mod isa;
mod parallel_rayon;
mod parallel_serial;
mod runtime;
mod seed;

// pull in symbols that are visible outside of the package
pub use cicstat_nostd_internal::{
    BoundingVolume, EdgePolicy, Executor, KernelChoice, MAX_CANDIDATES_PER_CENTER, ParticleSet,
    Real, ReductionSpec, ShellEdges, StatePackViewMut, count_in_shells, fill_squared_shell_radii,
};
pub use config::{VpfBuilder, VpfConfig};
pub use error::{Error, ErrorCategory};
pub use func::{
    ResultRow, VpfOutput, compute_vpf, compute_vpf_at_centers, compute_vpf_in_footprint, vpf,
};
pub use isa::Isa;
pub use parallel_rayon::RayonExecutor;
pub use parallel_serial::SerialExecutor;
pub use runtime::{ExecutorKind, RuntimeSpec};
pub use seed::SeedChoice;

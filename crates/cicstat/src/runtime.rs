use crate::Isa;

/// Selects the parallelism backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ExecutorKind {
    /// every unit of work is completed by the calling thread
    Serial,
    /// units of work are distributed with rayon
    #[default]
    Rayon,
}

/// Runtime parameters that don't have any impact on the output (the results
/// are bitwise identical for any choice), but do affect performance.
#[derive(Clone, Debug, Default)]
pub struct RuntimeSpec {
    /// the instruction set hint used to select the count kernel
    pub isa: Isa,
    /// The number of threads used by [`ExecutorKind::Rayon`]. A value of 0
    /// means that we use rayon's global thread pool.
    pub n_threads: usize,
    pub executor: ExecutorKind,
    /// emit a summary of the calculation at the `info` log level
    pub verbose: bool,
}

impl RuntimeSpec {
    /// a spec that does everything on the calling thread
    pub fn serial() -> Self {
        RuntimeSpec {
            executor: ExecutorKind::Serial,
            ..Default::default()
        }
    }

    /// a spec that uses a dedicated pool of `n_threads` threads
    pub fn with_threads(n_threads: usize) -> Self {
        RuntimeSpec {
            n_threads,
            ..Default::default()
        }
    }
}

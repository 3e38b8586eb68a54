use std::time::{SystemTime, UNIX_EPOCH};

/// How the random stream is seeded
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SeedChoice {
    /// results are reproducible
    Fixed(u64),
    /// seed from the wall clock (results are not reproducible)
    #[default]
    WallClock,
}

impl SeedChoice {
    /// Interpret a signed seed: positive values are used verbatim, while
    /// zero or negative values request a wall-clock seed.
    pub fn from_signed(seed: i64) -> Self {
        if seed > 0 {
            SeedChoice::Fixed(seed as u64)
        } else {
            SeedChoice::WallClock
        }
    }

    /// produce the seed for a single calculation
    pub fn resolve(&self) -> u64 {
        match self {
            SeedChoice::Fixed(seed) => *seed,
            SeedChoice::WallClock => {
                // a clock set before the epoch is the only failure mode.
                // Any value is an acceptable seed in that case
                let nanos = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_nanos() as u64)
                    .unwrap_or(0);
                let seed = nanos.max(1);
                log::info!("no seed was specified, using the wall-clock seed {seed}");
                seed
            }
        }
    }
}

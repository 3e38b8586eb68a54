// this defines some basic utilities used in reductions.
// it's unclear if we want these things to be part of the public API.
// But, in the short term, these are quite useful utilities

use crate::reducer::Reducer;
use crate::state::StatePackViewMut;

pub fn reset_full_statepack(reducer: &impl Reducer, statepack: &mut StatePackViewMut) {
    for i in 0..statepack.n_states() {
        reducer.init_accum_state(&mut statepack.get_state_mut(i));
    }
}

// ideally, other would be more clearly immutable, but I don't think we want to
// introduce another type just for this 1 case
pub fn merge_full_statepacks(
    reducer: &impl Reducer,
    statepack: &mut StatePackViewMut,
    other: &StatePackViewMut,
) {
    let n_bins = statepack.n_states();
    assert_eq!(n_bins, other.n_states());
    for i in 0..n_bins {
        reducer.merge(&mut statepack.get_state_mut(i), &other.get_state(i));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reducer::{CountsInCells, Datum};

    #[test]
    fn reset_and_merge() {
        let reducer = CountsInCells::new(2).unwrap();
        let mut buf_a = [7.0; 6];
        let mut buf_b = [0.0; 6];
        let mut statepack_a = StatePackViewMut::from_slice([3, 2], &mut buf_a).unwrap();
        let mut statepack_b = StatePackViewMut::from_slice([3, 2], &mut buf_b).unwrap();
        reset_full_statepack(&reducer, &mut statepack_a);
        reset_full_statepack(&reducer, &mut statepack_b);

        reducer.consume(&mut statepack_a.get_state_mut(0), &Datum::from_count(0));
        reducer.consume(&mut statepack_b.get_state_mut(0), &Datum::from_count(3));
        reducer.consume(&mut statepack_b.get_state_mut(1), &Datum::from_count(1));
        merge_full_statepacks(&reducer, &mut statepack_a, &statepack_b);

        // [weight, p0, tail] for each of the 2 bins
        assert_eq!(statepack_a.get_state(0).to_vec(), [2.0, 1.0, 1.0]);
        assert_eq!(statepack_a.get_state(1).to_vec(), [1.0, 0.0, 1.0]);
    }
}

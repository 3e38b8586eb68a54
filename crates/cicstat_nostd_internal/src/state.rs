use ndarray::{ArrayView1, ArrayViewMut1, ArrayViewMut2, Axis};

/// Represents a collection of accumulator states (one per shell)
///
/// # Note
/// There is some benefit to defining this even though it wraps ArrayViewMut2
/// since it helps contain most references to the ndarray package to a single
/// file.
///
/// The layout is `[accum_state_size, n_states]`, i.e. the entries of a given
/// accum_state are strided. That matches the layout used by the executors,
/// which allocate a single flat buffer per statepack.
pub struct StatePackViewMut<'a> {
    data: ArrayViewMut2<'a, f64>,
}

impl<'a> StatePackViewMut<'a> {
    pub fn from_array_view(array_view: ArrayViewMut2<'a, f64>) -> Self {
        Self { data: array_view }
    }

    /// Interpret a flat buffer as a statepack with the specified shape
    pub fn from_slice(
        shape: [usize; 2],
        buf: &'a mut [f64],
    ) -> Result<StatePackViewMut<'a>, &'static str> {
        ArrayViewMut2::from_shape(shape, buf)
            .map(Self::from_array_view)
            .map_err(|_| "the buffer length is inconsistent with the statepack shape")
    }

    pub fn get_state(&self, i: usize) -> ArrayView1<f64> {
        self.data.index_axis(Axis(1), i)
    }

    pub fn get_state_mut(&mut self, i: usize) -> ArrayViewMut1<f64> {
        self.data.index_axis_mut(Axis(1), i)
    }

    pub fn state_size(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn n_states(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn shape(&self) -> [usize; 2] {
        [self.state_size(), self.n_states()]
    }
}

use ndarray::{ArrayViewMut1, ArrayViewMut2, Axis};

/// Represents the collection of per-thread accumulators
///
/// Axis 0 indexes the (padded) term index and axis 1 indexes the thread. In
/// other words, each thread owns a single column.
///
/// # Note
/// There is some benefit to defining this even though it wraps ArrayViewMut2
/// since it helps contain all references to the ndarray package to a single
/// file.
pub struct AccumPackViewMut<'a> {
    data: ArrayViewMut2<'a, f64>,
}

impl<'a> AccumPackViewMut<'a> {
    pub fn from_array_view(array_view: ArrayViewMut2<'a, f64>) -> Self {
        Self { data: array_view }
    }

    pub fn get_accum_mut(&mut self, thread_index: usize) -> ArrayViewMut1<'_, f64> {
        self.data.index_axis_mut(Axis(1), thread_index)
    }

    /// the number of entries in each accumulator (including padding)
    pub fn accum_len(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn n_accums(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    /// Iterate over mutable views of every accumulator.
    ///
    /// The views are disjoint, so they can be handed off to separate threads.
    pub fn accums_mut(&mut self) -> impl Iterator<Item = ArrayViewMut1<'_, f64>> {
        self.data.axis_iter_mut(Axis(1))
    }
}

use super::{BoxedIterator, XdmItemResult};
use crate::engine::runtime::Error;
use crate::model::XdmNode;
use crate::xdm::XdmSequence;

/// Adapter from a forward iterator to `std::iter::Iterator`.
pub struct XdmSequenceStream<N: XdmNode> {
    inner: BoxedIterator<N>,
}

impl<N: XdmNode> XdmSequenceStream<N> {
    pub fn new(inner: BoxedIterator<N>) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> BoxedIterator<N> {
        self.inner
    }

    /// Collect all items, stopping at the first error.
    pub fn materialize(self) -> Result<XdmSequence<N>, Error> {
        self.collect()
    }
}

impl<N: XdmNode> Iterator for XdmSequenceStream<N> {
    type Item = XdmItemResult<N>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next_item()
    }
}

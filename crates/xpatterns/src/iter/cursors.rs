use std::marker::PhantomData;
use std::sync::Arc;

use super::{BoxedIterator, CursorState, ForwardIterator, Position, XdmItemResult};
use crate::engine::runtime::Error;
use crate::model::XdmNode;
use crate::xdm::XdmItem;

pub struct EmptyIterator<N> {
    finished: bool,
    _marker: PhantomData<fn() -> N>,
}

impl<N: XdmNode> EmptyIterator<N> {
    pub fn new() -> Self {
        Self {
            finished: false,
            _marker: PhantomData,
        }
    }
}

impl<N: XdmNode> Default for EmptyIterator<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: XdmNode> ForwardIterator<N> for EmptyIterator<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        self.finished = true;
        None
    }

    fn current(&self) -> Option<&XdmItem<N>> {
        None
    }

    fn position(&self) -> Position {
        if self.finished {
            Position::Finished
        } else {
            Position::NotStarted
        }
    }

    fn copy(&self) -> BoxedIterator<N> {
        Box::new(Self::new())
    }

    fn count(&self) -> Result<usize, Error> {
        Ok(0)
    }
}

/// Exactly one item, no backing collection.
pub struct SingletonIterator<N: XdmNode> {
    item: XdmItem<N>,
    state: CursorState<N>,
}

impl<N: XdmNode> SingletonIterator<N> {
    pub fn new(item: XdmItem<N>) -> Self {
        Self {
            item,
            state: CursorState::new(),
        }
    }
}

impl<N: XdmNode> ForwardIterator<N> for SingletonIterator<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        match self.state.position() {
            Position::NotStarted => self.state.record(Some(Ok(self.item.clone()))),
            _ => self.state.record(None),
        }
    }

    fn current(&self) -> Option<&XdmItem<N>> {
        self.state.current()
    }

    fn position(&self) -> Position {
        self.state.position()
    }

    fn copy(&self) -> BoxedIterator<N> {
        Box::new(Self::new(self.item.clone()))
    }

    fn count(&self) -> Result<usize, Error> {
        Ok(1)
    }

    // one item reads the same in either direction
    fn to_reversed(&self) -> Result<BoxedIterator<N>, Error> {
        Ok(self.copy())
    }
}

/// Cursor over a materialized, shared list of items.
pub struct ListIterator<N: XdmNode> {
    items: Arc<[XdmItem<N>]>,
    index: usize,
    state: CursorState<N>,
}

impl<N: XdmNode> ListIterator<N> {
    pub fn new(items: impl Into<Arc<[XdmItem<N>]>>) -> Self {
        Self {
            items: items.into(),
            index: 0,
            state: CursorState::new(),
        }
    }
}

impl<N: XdmNode> ForwardIterator<N> for ListIterator<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        if self.state.is_finished() {
            return None;
        }
        let step = self.items.get(self.index).cloned().map(Ok);
        self.index += 1;
        self.state.record(step)
    }

    fn current(&self) -> Option<&XdmItem<N>> {
        self.state.current()
    }

    fn position(&self) -> Position {
        self.state.position()
    }

    fn copy(&self) -> BoxedIterator<N> {
        Box::new(Self::new(Arc::clone(&self.items)))
    }

    fn count(&self) -> Result<usize, Error> {
        Ok(self.items.len())
    }

    fn to_reversed(&self) -> Result<BoxedIterator<N>, Error> {
        let reversed: Vec<XdmItem<N>> = self.items.iter().rev().cloned().collect();
        Ok(Box::new(Self::new(reversed)))
    }
}

/// Items of several iterators, one after the other.
pub struct ConcatIterator<N: XdmNode> {
    parts: Vec<BoxedIterator<N>>,
    active: usize,
    state: CursorState<N>,
}

impl<N: XdmNode> ConcatIterator<N> {
    pub fn new(parts: impl IntoIterator<Item = BoxedIterator<N>>) -> Self {
        Self {
            parts: parts.into_iter().collect(),
            active: 0,
            state: CursorState::new(),
        }
    }
}

impl<N: XdmNode> ForwardIterator<N> for ConcatIterator<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        if self.state.is_finished() {
            return None;
        }
        while let Some(part) = self.parts.get_mut(self.active) {
            match part.next_item() {
                None => self.active += 1,
                step => return self.state.record(step),
            }
        }
        self.state.record(None)
    }

    fn current(&self) -> Option<&XdmItem<N>> {
        self.state.current()
    }

    fn position(&self) -> Position {
        self.state.position()
    }

    fn copy(&self) -> BoxedIterator<N> {
        Box::new(Self::new(self.parts.iter().map(|p| p.copy())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::simple::SimpleNode;
    use crate::xdm::XdmAtomicValue;

    fn int(i: i64) -> XdmItem<SimpleNode> {
        XdmItem::Atomic(XdmAtomicValue::Integer(i))
    }

    #[test]
    fn list_positions() {
        let mut it = ListIterator::new(vec![int(1), int(2)]);
        assert_eq!(it.position().as_i64(), 0);
        assert_eq!(it.next_item().unwrap().unwrap(), int(1));
        assert_eq!(it.position(), Position::At(1));
        assert_eq!(it.current(), Some(&int(1)));
        assert!(it.next_item().is_some());
        assert!(it.next_item().is_none());
        assert_eq!(it.position().as_i64(), -1);
        assert!(it.current().is_none());
        assert!(it.next_item().is_none());
    }

    #[test]
    fn concat_skips_empty_parts_and_copies_fresh() {
        let mut it = ConcatIterator::new(vec![
            Box::new(EmptyIterator::new()) as BoxedIterator<SimpleNode>,
            Box::new(SingletonIterator::new(int(1))),
            Box::new(ListIterator::new(vec![int(2), int(3)])),
        ]);
        assert_eq!(it.next_item().unwrap().unwrap(), int(1));
        let copy = it.copy();
        assert_eq!(copy.position(), Position::NotStarted);
        assert_eq!(copy.count().unwrap(), 3);
        assert_eq!(it.next_item().unwrap().unwrap(), int(2));
        assert_eq!(it.position(), Position::At(2));
    }

    #[test]
    fn reversed_list() {
        let it = ListIterator::new(vec![int(1), int(2), int(3)]);
        let mut rev = it.to_reversed().unwrap();
        assert_eq!(rev.next_item().unwrap().unwrap(), int(3));
        assert_eq!(it.position(), Position::NotStarted);
    }
}

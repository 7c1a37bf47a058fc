use smallvec::SmallVec;
use std::collections::VecDeque;
use std::sync::Arc;

use super::{BoxedIterator, CursorState, ForwardIterator, Position, XdmItemResult};
use crate::engine::runtime::{Error, ErrorCode};
use crate::model::XdmNode;
use crate::types::{Cardinality, ItemType};
use crate::xdm::XdmItem;

/// Per-item transformation producing zero or more items.
pub type ItemMapper<N> =
    Arc<dyn Fn(XdmItem<N>) -> Result<SmallVec<[XdmItem<N>; 1]>, Error> + Send + Sync>;

/// Lazily applies an [`ItemMapper`] to every item of the source.
pub struct FlatMapIterator<N: XdmNode> {
    source: BoxedIterator<N>,
    mapper: ItemMapper<N>,
    pending: VecDeque<XdmItem<N>>,
    state: CursorState<N>,
}

impl<N: XdmNode> FlatMapIterator<N> {
    pub fn new(source: BoxedIterator<N>, mapper: ItemMapper<N>) -> Self {
        Self {
            source,
            mapper,
            pending: VecDeque::new(),
            state: CursorState::new(),
        }
    }
}

impl<N: XdmNode> ForwardIterator<N> for FlatMapIterator<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        if self.state.is_finished() {
            return None;
        }
        loop {
            if let Some(item) = self.pending.pop_front() {
                return self.state.record(Some(Ok(item)));
            }
            match self.source.next_item() {
                None => return self.state.record(None),
                Some(Err(e)) => return self.state.record(Some(Err(e))),
                Some(Ok(item)) => match (self.mapper)(item) {
                    Ok(mapped) => self.pending.extend(mapped),
                    Err(e) => return self.state.record(Some(Err(e))),
                },
            }
        }
    }

    fn current(&self) -> Option<&XdmItem<N>> {
        self.state.current()
    }

    fn position(&self) -> Position {
        self.state.position()
    }

    fn copy(&self) -> BoxedIterator<N> {
        Box::new(Self::new(self.source.copy(), Arc::clone(&self.mapper)))
    }
}

/// Passes items through while checking them against an item type and a cardinality.
///
/// Item type violations and surplus items are reported as soon as they are pulled; a
/// missing minimum is reported at the end of the source.
pub struct VerifyingIterator<N: XdmNode> {
    source: BoxedIterator<N>,
    item_type: Option<ItemType>,
    cardinality: Option<Cardinality>,
    code: ErrorCode,
    seen: u32,
    state: CursorState<N>,
}

impl<N: XdmNode> VerifyingIterator<N> {
    pub fn new(
        source: BoxedIterator<N>,
        item_type: Option<ItemType>,
        cardinality: Option<Cardinality>,
        code: ErrorCode,
    ) -> Self {
        Self {
            source,
            item_type,
            cardinality,
            code,
            seen: 0,
            state: CursorState::new(),
        }
    }

    fn step(&mut self) -> Option<XdmItemResult<N>> {
        match self.source.next_item() {
            None => match self.cardinality {
                Some(card) if self.seen < card.min => Some(Err(Error::from_code(
                    self.code,
                    format!("expected {card} item(s), got {}", self.seen),
                ))),
                _ => None,
            },
            Some(Ok(item)) => {
                self.seen = self.seen.saturating_add(1);
                if let Some(card) = self.cardinality
                    && card.max.is_some_and(|max| self.seen > max)
                {
                    return Some(Err(Error::from_code(
                        self.code,
                        format!("expected {card} item(s), got more"),
                    )));
                }
                if let Some(t) = &self.item_type
                    && !t.matches(&item)
                {
                    return Some(Err(Error::from_code(
                        self.code,
                        format!("item {item} does not match {t}"),
                    )));
                }
                Some(Ok(item))
            }
            Some(Err(e)) => Some(Err(e)),
        }
    }
}

impl<N: XdmNode> ForwardIterator<N> for VerifyingIterator<N> {
    fn next_item(&mut self) -> Option<XdmItemResult<N>> {
        if self.state.is_finished() {
            return None;
        }
        let step = self.step();
        self.state.record(step)
    }

    fn current(&self) -> Option<&XdmItem<N>> {
        self.state.current()
    }

    fn position(&self) -> Position {
        self.state.position()
    }

    fn copy(&self) -> BoxedIterator<N> {
        Box::new(Self::new(
            self.source.copy(),
            self.item_type.clone(),
            self.cardinality,
            self.code,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iter::ListIterator;
    use crate::model::simple::SimpleNode;
    use crate::types::AtomicType;
    use crate::xdm::XdmAtomicValue;
    use smallvec::smallvec;

    fn ints(v: &[i64]) -> BoxedIterator<SimpleNode> {
        Box::new(ListIterator::new(
            v.iter()
                .map(|i| XdmItem::Atomic(XdmAtomicValue::Integer(*i)))
                .collect::<Vec<_>>(),
        ))
    }

    #[test]
    fn flat_map_expands_and_stops_on_error() {
        let mapper: ItemMapper<SimpleNode> = Arc::new(
            |item: XdmItem<SimpleNode>| -> Result<SmallVec<[XdmItem<SimpleNode>; 1]>, Error> {
                match item {
                    XdmItem::Atomic(XdmAtomicValue::Integer(3)) => {
                        Err(Error::from_code(ErrorCode::FOER0000, "three"))
                    }
                    other => Ok(smallvec![other.clone(), other]),
                }
            },
        );
        let mut it = FlatMapIterator::new(ints(&[1, 3, 5]), mapper);
        assert!(it.next_item().unwrap().is_ok());
        assert!(it.next_item().unwrap().is_ok());
        assert!(it.next_item().unwrap().is_err());
        assert_eq!(it.position(), Position::Finished);
        assert!(it.next_item().is_none());
        assert_eq!(it.copy().position(), Position::NotStarted);
    }

    #[test]
    fn verifier_reports_surplus_lazily() {
        let mut it = VerifyingIterator::new(
            ints(&[1, 2]),
            None,
            Some(Cardinality::exactly_one()),
            ErrorCode::XPDY0050,
        );
        assert!(it.next_item().unwrap().is_ok());
        let err = it.next_item().unwrap().unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::XPDY0050);
        assert!(it.next_item().is_none());
    }

    #[test]
    fn verifier_reports_missing_minimum_at_end() {
        let mut it = VerifyingIterator::new(
            ints(&[]),
            None,
            Some(Cardinality::one_or_more()),
            ErrorCode::XPTY0004,
        );
        let err = it.next_item().unwrap().unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::XPTY0004);
    }

    #[test]
    fn verifier_checks_item_type() {
        let mut it = VerifyingIterator::new(
            ints(&[1]),
            Some(ItemType::Atomic(AtomicType::String)),
            None,
            ErrorCode::XPTY0004,
        );
        assert!(it.next_item().unwrap().is_err());
    }
}

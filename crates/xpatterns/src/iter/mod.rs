//! Pull-based, single-pass sequence iteration.
//!
//! A [`ForwardIterator`] produces items lazily through `next_item()`. Once it has returned
//! `None` (or an error) it stays exhausted. Re-evaluation goes through `copy()`, which
//! starts an independent cursor from the beginning of the same logical source.

mod adapters;
mod cursors;
mod stream;

pub use adapters::{FlatMapIterator, ItemMapper, VerifyingIterator};
pub use cursors::{ConcatIterator, EmptyIterator, ListIterator, SingletonIterator};
pub use stream::XdmSequenceStream;

use crate::engine::runtime::Error;
use crate::model::XdmNode;
use crate::xdm::XdmItem;

pub type XdmItemResult<N> = Result<XdmItem<N>, Error>;
pub type BoxedIterator<N> = Box<dyn ForwardIterator<N>>;

/// Cursor position. `At(n)` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    NotStarted,
    At(usize),
    Finished,
}

impl Position {
    /// Numeric form: `0` before the first item, `n` at the n-th item, `-1` once exhausted.
    pub fn as_i64(self) -> i64 {
        match self {
            Position::NotStarted => 0,
            Position::At(n) => i64::try_from(n).unwrap_or(i64::MAX),
            Position::Finished => -1,
        }
    }

    fn advance(self) -> Position {
        match self {
            Position::NotStarted => Position::At(1),
            Position::At(n) => Position::At(n + 1),
            Position::Finished => Position::Finished,
        }
    }
}

pub trait ForwardIterator<N: XdmNode>: Send {
    /// Advance and return the next item; `None` marks the end, forever after.
    fn next_item(&mut self) -> Option<XdmItemResult<N>>;

    /// The item most recently returned by `next_item`, if the cursor is on one.
    fn current(&self) -> Option<&XdmItem<N>>;

    fn position(&self) -> Position;

    /// Fresh, independent cursor over the same source, at position 0.
    fn copy(&self) -> BoxedIterator<N>;

    /// Number of items in the source. Consumes a copy; `self` is left untouched.
    fn count(&self) -> Result<usize, Error> {
        let mut it = self.copy();
        let mut n = 0;
        while let Some(item) = it.next_item() {
            item?;
            n += 1;
        }
        Ok(n)
    }

    /// Cursor over the source in reverse order.
    fn to_reversed(&self) -> Result<BoxedIterator<N>, Error> {
        let mut items = XdmSequenceStream::new(self.copy()).materialize()?;
        items.reverse();
        Ok(Box::new(ListIterator::new(items)))
    }
}

/// Shared bookkeeping for `current()` / `position()`.
pub(crate) struct CursorState<N> {
    current: Option<XdmItem<N>>,
    position: Position,
}

impl<N: XdmNode> CursorState<N> {
    pub(crate) fn new() -> Self {
        Self {
            current: None,
            position: Position::NotStarted,
        }
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.position == Position::Finished
    }

    /// Record the outcome of one step. Errors and end-of-sequence both finish the cursor.
    pub(crate) fn record(&mut self, step: Option<XdmItemResult<N>>) -> Option<XdmItemResult<N>> {
        match step {
            Some(Ok(item)) => {
                self.position = self.position.advance();
                self.current = Some(item.clone());
                Some(Ok(item))
            }
            Some(Err(e)) => {
                self.finish();
                Some(Err(e))
            }
            None => {
                self.finish();
                None
            }
        }
    }

    pub(crate) fn finish(&mut self) {
        self.position = Position::Finished;
        self.current = None;
    }

    pub(crate) fn current(&self) -> Option<&XdmItem<N>> {
        self.current.as_ref()
    }

    pub(crate) fn position(&self) -> Position {
        self.position
    }
}

/// Singleton for `Some`, empty otherwise.
pub fn from_option<N: XdmNode>(item: Option<XdmItem<N>>) -> BoxedIterator<N> {
    match item {
        Some(item) => Box::new(SingletonIterator::new(item)),
        None => Box::new(EmptyIterator::new()),
    }
}

//! Static types: cardinalities, item types and sequence types.

mod cardinality;
pub mod common;
mod item_type;
pub mod parser;
mod sequence_type;

pub use cardinality::Cardinality;
pub use item_type::{AtomicType, ItemType, MultiItemType};
pub use parser::parse_sequence_type;
pub use sequence_type::SequenceType;

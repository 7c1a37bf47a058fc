use core::fmt;

use super::{Cardinality, ItemType};
use crate::engine::runtime::{Error, ErrorCode};

/// Static type of a sequence: what its items are and how many there may be.
///
/// The pair is kept consistent: a sequence type that admits no items always carries
/// `ItemType::Empty` with `Cardinality::empty()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SequenceType {
    item_type: ItemType,
    cardinality: Cardinality,
}

impl SequenceType {
    /// Validate and normalize an item type / cardinality pair.
    pub fn new(item_type: ItemType, cardinality: Cardinality) -> Result<Self, Error> {
        if cardinality.max.is_some_and(|m| m < cardinality.min) {
            return Err(Error::from_code(
                ErrorCode::XPST0003,
                format!(
                    "invalid cardinality range {}..{:?}",
                    cardinality.min, cardinality.max
                ),
            ));
        }
        if item_type == ItemType::Empty && cardinality.min > 0 {
            return Err(Error::from_code(
                ErrorCode::XPST0003,
                format!("empty-sequence() cannot have cardinality {cardinality}"),
            ));
        }
        Ok(Self::normalized(item_type, cardinality))
    }

    /// Construct without validation. The caller guarantees the pair is consistent.
    pub const fn new_unchecked(item_type: ItemType, cardinality: Cardinality) -> Self {
        Self {
            item_type,
            cardinality,
        }
    }

    pub const fn empty() -> Self {
        Self::new_unchecked(ItemType::Empty, Cardinality::empty())
    }

    /// Combination used by type inference, where an `Empty` item type or a zero-max
    /// cardinality both mean "no items".
    pub(crate) fn normalized(item_type: ItemType, cardinality: Cardinality) -> Self {
        if item_type == ItemType::Empty || cardinality.is_empty() {
            Self::empty()
        } else {
            Self::new_unchecked(item_type, cardinality)
        }
    }

    pub fn item_type(&self) -> &ItemType {
        &self.item_type
    }

    pub fn cardinality(&self) -> Cardinality {
        self.cardinality
    }

    pub fn is_empty_sequence(&self) -> bool {
        self.cardinality.is_empty()
    }

    /// `item()*`, the type that requires nothing.
    pub fn is_zero_or_more_items(&self) -> bool {
        self.item_type == ItemType::Item && self.cardinality == Cardinality::zero_or_more()
    }

    pub fn is_subtype_of(&self, other: &SequenceType) -> bool {
        self.item_type.is_subtype_of(&other.item_type)
            && self.cardinality.is_subset_of(&other.cardinality)
    }

    pub fn with_cardinality(&self, cardinality: Cardinality) -> Self {
        Self::normalized(self.item_type.clone(), cardinality)
    }

    pub fn with_item_type(&self, item_type: ItemType) -> Self {
        Self::normalized(item_type, self.cardinality)
    }

    /// Type of the comma-concatenation of two sequences.
    pub fn concat(&self, other: &SequenceType) -> Self {
        Self::normalized(
            if self.is_empty_sequence() {
                other.item_type.clone()
            } else if other.is_empty_sequence() {
                self.item_type.clone()
            } else {
                self.item_type.union(&other.item_type)
            },
            self.cardinality.concat(&other.cardinality),
        )
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty_sequence() {
            return f.write_str("empty-sequence()");
        }
        write!(f, "{}{}", self.item_type, self.cardinality.indicator())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AtomicType, common};

    #[test]
    fn contradictory_pair_is_rejected() {
        let err = SequenceType::new(ItemType::Empty, Cardinality::exactly_one()).unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::XPST0003);
        let err =
            SequenceType::new(ItemType::Item, Cardinality::from_range(2, Some(1))).unwrap_err();
        assert_eq!(err.code_enum(), ErrorCode::XPST0003);
    }

    #[test]
    fn empty_forms_normalize() {
        let a = SequenceType::new(ItemType::Empty, Cardinality::zero_or_more()).unwrap();
        let b = SequenceType::new(ItemType::Item, Cardinality::empty()).unwrap();
        assert_eq!(a, SequenceType::empty());
        assert_eq!(b, SequenceType::empty());
        assert_eq!(a.to_string(), "empty-sequence()");
    }

    #[test]
    fn subtype_requires_both_parts() {
        assert!(common::EXACTLY_ONE_INTEGER.is_subtype_of(&common::ZERO_OR_ONE_NUMERIC));
        assert!(!common::ZERO_OR_MORE_ITEMS.is_subtype_of(&common::ZERO_OR_ONE_ITEM));
        assert!(SequenceType::empty().is_subtype_of(&common::ZERO_OR_ONE_NUMERIC));
        assert!(!SequenceType::empty().is_subtype_of(&common::EXACTLY_ONE_INTEGER));
    }

    #[test]
    fn concat_unions_items() {
        let t = common::EXACTLY_ONE_INTEGER.concat(&common::EXACTLY_ONE_DOUBLE);
        assert_eq!(t.item_type(), &ItemType::Atomic(AtomicType::Numeric));
        assert_eq!(t.cardinality(), Cardinality::from_range(2, Some(2)));
        assert_eq!(
            SequenceType::empty().concat(&common::EXACTLY_ONE_STRING),
            common::EXACTLY_ONE_STRING
        );
    }

    #[test]
    fn display_uses_indicators() {
        assert_eq!(common::ZERO_OR_MORE_ITEMS.to_string(), "item()*");
        assert_eq!(common::ZERO_OR_ONE_NUMERIC.to_string(), "xs:numeric?");
        assert_eq!(
            common::ELEMENT_OR_DOCUMENT.to_string(),
            "(element() | document-node())"
        );
    }
}

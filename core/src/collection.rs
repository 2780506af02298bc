//! Collection elements (§3, §4.B): an ordered, tag-addressed list of child
//! elements with no back-pointer to its parent (§9).

use crate::element::{Element, Header};
use crate::identifier::Identifier;
use crate::scalar::Scalar;
use crate::value_type::PhysicalType;
use crate::vector::Vector;

/// An ordered list of child [`Element`]s.
///
/// `read_size` records the child count a file claimed to have (§3's
/// "read-size"); it may exceed `children.len()` when the physical reader
/// had to stop parsing a truncated stream partway through.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    tag: Identifier,
    children: Vec<Element>,
    read_size: usize,
}

impl Collection {
    /// Create an empty collection.
    pub fn new(tag: Identifier) -> Self {
        Collection {
            tag,
            children: Vec::new(),
            read_size: 0,
        }
    }

    /// Build a collection from already-parsed children, recording the
    /// file's claimed child count separately from `children.len()`.
    pub fn from_children(tag: Identifier, children: Vec<Element>, read_size: usize) -> Self {
        Collection {
            tag,
            children,
            read_size,
        }
    }

    /// This element's tag.
    pub fn tag(&self) -> Identifier {
        self.tag
    }

    /// Change this collection's tag (used when a record's root tag
    /// defaults to the record-type tag per §3).
    pub fn set_tag(&mut self, tag: Identifier) {
        self.tag = tag;
    }

    /// The child count this collection actually holds.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether this collection holds no children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// The child count the file claimed to have, which may exceed
    /// `len()` for a truncated stream.
    pub fn read_size(&self) -> usize {
        self.read_size
    }

    /// Iterate over all children, in insertion/on-disk order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter()
    }

    /// Iterate mutably over all children.
    pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut()
    }

    /// Append a child element.
    pub fn add(&mut self, element: impl Into<Element>) {
        self.children.push(element.into());
    }

    /// Remove the first child equal to `element`. Returns whether an
    /// element was removed.
    pub fn remove(&mut self, element: &Element) -> bool {
        if let Some(pos) = self.children.iter().position(|c| c == element) {
            self.children.remove(pos);
            true
        } else {
            false
        }
    }

    /// Remove every child with the given tag. Returns the number removed.
    pub fn remove_by_tag(&mut self, tag: Identifier) -> usize {
        let before = self.children.len();
        self.children.retain(|c| c.tag() != tag);
        before - self.children.len()
    }

    /// Iterate over every child with the given tag, in order ("any" lookup
    /// semantics — §3).
    pub fn get_all_by_tag(&self, tag: Identifier) -> impl Iterator<Item = &Element> {
        self.children
            .iter()
            .filter(move |c| (*c).tag() == tag)
    }

    /// The first child with the given tag, of any kind ("single-or-none"
    /// lookup semantics — §3: the writer never checks for ambiguity on
    /// read).
    pub fn get_by_tag(&self, tag: Identifier) -> Option<&Element> {
        self.get_all_by_tag(tag).next()
    }

    /// The first child with the given tag, cast to [`Scalar`], or `None`
    /// if absent or of a different kind.
    pub fn get_scalar_by_tag(&self, tag: Identifier) -> Option<&Scalar> {
        self.get_by_tag(tag).and_then(Element::as_scalar)
    }

    /// The first child with the given tag, cast to [`Vector`], or `None`
    /// if absent or of a different kind.
    pub fn get_vector_by_tag(&self, tag: Identifier) -> Option<&Vector> {
        self.get_by_tag(tag).and_then(Element::as_vector)
    }

    /// The first child with the given tag, cast to [`Collection`], or
    /// `None` if absent or of a different kind.
    pub fn get_collection_by_tag(&self, tag: Identifier) -> Option<&Collection> {
        self.get_by_tag(tag).and_then(Element::as_collection)
    }

    /// Find the first `Scalar` child with the given tag, appending a
    /// freshly initialized one of `value_type` if absent ("ensure"
    /// semantics — §3).
    pub fn get_or_add_scalar(&mut self, tag: Identifier, value_type: PhysicalType) -> &mut Scalar {
        let pos = self
            .children
            .iter()
            .position(|c| c.tag() == tag && c.as_scalar().is_some());
        let pos = pos.unwrap_or_else(|| {
            self.children.push(Element::Scalar(Scalar::new(tag, value_type)));
            self.children.len() - 1
        });
        self.children[pos].as_scalar_mut().expect("just ensured scalar")
    }

    /// Find the first `Vector` child with the given tag, appending a
    /// freshly initialized (zero-length) one of `value_type` if absent.
    pub fn get_or_add_vector(&mut self, tag: Identifier, value_type: PhysicalType) -> &mut Vector {
        let pos = self
            .children
            .iter()
            .position(|c| c.tag() == tag && c.as_vector().is_some());
        let pos = pos.unwrap_or_else(|| {
            self.children.push(Element::Vector(Vector::new(tag, value_type)));
            self.children.len() - 1
        });
        self.children[pos].as_vector_mut().expect("just ensured vector")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scalar::ScalarValue;
    use uuid::Uuid;

    fn tag(n: u128) -> Identifier {
        Identifier::from_uuid(Uuid::from_u128(n))
    }

    #[test]
    fn get_or_add_scalar_is_idempotent() {
        let mut c = Collection::new(tag(0));
        c.get_or_add_scalar(tag(1), PhysicalType::UnsignedInteger1)
            .set(ScalarValue::UnsignedInteger1(5));
        assert_eq!(c.len(), 1);
        c.get_or_add_scalar(tag(1), PhysicalType::UnsignedInteger1);
        assert_eq!(c.len(), 1);
        assert_eq!(
            c.get_scalar_by_tag(tag(1)).unwrap().get_u1().unwrap(),
            5
        );
    }

    #[test]
    fn get_all_by_tag_preserves_order() {
        let mut c = Collection::new(tag(0));
        c.add(Scalar::new(tag(1), PhysicalType::UnsignedInteger1));
        c.add(Scalar::new(tag(2), PhysicalType::UnsignedInteger1));
        c.add(Scalar::new(tag(1), PhysicalType::UnsignedInteger1));
        let matches: Vec<_> = c.get_all_by_tag(tag(1)).collect();
        assert_eq!(matches.len(), 2);
    }

    #[test]
    fn remove_by_tag_counts_removed() {
        let mut c = Collection::new(tag(0));
        c.add(Scalar::new(tag(1), PhysicalType::UnsignedInteger1));
        c.add(Scalar::new(tag(1), PhysicalType::UnsignedInteger1));
        assert_eq!(c.remove_by_tag(tag(1)), 2);
        assert!(c.is_empty());
    }
}

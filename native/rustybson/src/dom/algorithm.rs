//! Tree algorithms over sibling lists
//!
//! Reordering works on links only: elements keep their RepIds, so handles
//! held by callers stay valid through a sort.

use std::cmp::Ordering;

use super::document::Document;
use super::element::Element;
use super::node::{RepId, EMPTY_REP};
use super::walk::{Cursor, Node};
use crate::core::ElementType;
use crate::error::{Error, Result};

impl Document {
    /// Stable sort of `parent`'s children
    pub fn sort_children<F>(&mut self, parent: Element, mut cmp: F) -> Result<()>
    where
        F: FnMut(&Document, Element, Element) -> Ordering,
    {
        let mut order = self.child_ids(parent)?;
        if order.len() < 2 {
            return Ok(());
        }
        let doc = &*self;
        order.sort_by(|a, b| cmp(doc, doc.element(*a), doc.element(*b)));
        self.relink(parent.rep, &order);
        Ok(())
    }

    /// Remove adjacent children that `eq` considers duplicates of the
    /// preceding kept child. Returns how many were removed.
    pub fn dedup_children<F>(&mut self, parent: Element, mut eq: F) -> Result<usize>
    where
        F: FnMut(&Document, Element, Element) -> bool,
    {
        let order = self.child_ids(parent)?;
        let Some((&first, rest)) = order.split_first() else {
            return Ok(0);
        };
        let mut kept = first;
        let mut removed = 0;
        for &id in rest {
            if eq(&*self, self.element(kept), self.element(id)) {
                self.unlink(id);
                removed += 1;
            } else {
                kept = id;
            }
        }
        Ok(removed)
    }

    /// Number of siblings before `el`
    pub fn count_siblings_left(&self, el: Element) -> usize {
        std::iter::successors(self.prev_sibling(el), |e| self.prev_sibling(*e)).count()
    }

    /// Number of siblings after `el`
    pub fn count_siblings_right(&self, el: Element) -> usize {
        std::iter::successors(self.next_sibling(el), |e| self.next_sibling(*e)).count()
    }

    /// Check whether two elements (possibly of different documents) have
    /// the same name, type, value, and children. Names of array members are
    /// not compared, since serialization replaces them with indexes.
    pub fn equivalent(&self, a: Element, other: &Document, b: Element) -> Result<bool> {
        let (a, b) = (Node::Rep(self.own(a)?), Node::Rep(other.own(b)?));
        if self.node_name(a) != other.node_name(b) {
            return Ok(false);
        }
        let mut stack = Vec::new();
        if !self.same_node(a, other, b, &mut stack)? {
            return Ok(false);
        }
        while let Some((left, right, is_array)) = stack.last_mut() {
            let is_array = *is_array;
            match (self.advance(left), other.advance(right)) {
                (None, None) => {
                    stack.pop();
                }
                (Some(x), Some(y)) => {
                    if !is_array && self.node_name(x) != other.node_name(y) {
                        return Ok(false);
                    }
                    if !self.same_node(x, other, y, &mut stack)? {
                        return Ok(false);
                    }
                }
                _ => return Ok(false),
            }
        }
        Ok(true)
    }

    /// Compare kinds and leaf bytes; a container pair is queued for its children
    fn same_node(
        &self,
        x: Node,
        other: &Document,
        y: Node,
        stack: &mut Vec<(Cursor, Cursor, bool)>,
    ) -> Result<bool> {
        let kind = self.node_kind(x);
        if kind != other.node_kind(y) {
            return Ok(false);
        }
        match (self.node_value(x), other.node_value(y)) {
            (Some(l), Some(r)) => Ok(self.span_bytes(l) == other.span_bytes(r)),
            _ => {
                stack.push((self.open(x)?, other.open(y)?, kind == ElementType::Array));
                Ok(true)
            }
        }
    }

    fn child_ids(&mut self, parent: Element) -> Result<Vec<RepId>> {
        let children = self.children(parent)?;
        let mut ids = Vec::new();
        ids.try_reserve(children.clone().count())
            .map_err(Error::alloc("child order"))?;
        ids.extend(children.map(|c| c.rep()));
        Ok(ids)
    }

    /// Rewrite the sibling chain of `parent` to follow `order`
    fn relink(&mut self, parent: RepId, order: &[RepId]) {
        let mut prev = EMPTY_REP;
        for &id in order {
            let rep = self.reps.get_mut(id);
            rep.prev_sibling = prev;
            rep.next_sibling = EMPTY_REP;
            if prev != EMPTY_REP {
                self.reps.get_mut(prev).next_sibling = id;
            }
            prev = id;
        }
        let rep = self.reps.get_mut(parent);
        rep.first_child = order.first().copied().unwrap_or(EMPTY_REP);
        rep.last_child = prev;
    }
}

#[cfg(test)]
mod tests {
    use crate::core::Value;
    use crate::dom::Document;

    fn names(doc: &mut Document) -> Vec<String> {
        let root = doc.root();
        let children = doc.children(root).unwrap();
        let doc = children.document();
        children.map(|c| doc.name(c).to_string()).collect()
    }

    #[test]
    fn test_sort_by_name_is_stable() {
        let mut doc = Document::new();
        let root = doc.root();
        for (name, v) in [("b", 1), ("a", 2), ("b", 3), ("a", 4)] {
            let leaf = doc.make_leaf(name, v).unwrap();
            doc.push_back(root, leaf).unwrap();
        }
        let before = doc.first_child(root).unwrap().unwrap();
        doc.sort_children(root, |d, x, y| d.name(x).cmp(d.name(y))).unwrap();
        assert_eq!(names(&mut doc), ["a", "a", "b", "b"]);

        let values: Vec<_> = {
            let children = doc.children(root).unwrap();
            let d = children.document();
            children.map(|c| d.value(c).unwrap()).collect()
        };
        assert_eq!(
            values,
            [2, 4, 1, 3].map(|n| Some(Value::Int32(n)))
        );
        assert_eq!(doc.value(before).unwrap(), Some(Value::Int32(1)));
        let back: Vec<_> = doc.children(root).unwrap().rev().collect();
        assert_eq!(back.len(), 4);
    }

    #[test]
    fn test_dedup_adjacent_names() {
        let mut doc = Document::new();
        let root = doc.root();
        for name in ["x", "x", "y", "x", "x", "x"] {
            let leaf = doc.make_leaf(name, Value::Null).unwrap();
            doc.push_back(root, leaf).unwrap();
        }
        let removed = doc
            .dedup_children(root, |d, a, b| d.name(a) == d.name(b))
            .unwrap();
        assert_eq!(removed, 3);
        assert_eq!(names(&mut doc), ["x", "y", "x"]);
    }

    #[test]
    fn test_sibling_counts() {
        let mut doc = Document::new();
        let root = doc.root();
        let mut middle = None;
        for i in 0..5 {
            let leaf = doc.make_leaf("n", i).unwrap();
            doc.push_back(root, leaf).unwrap();
            if i == 1 {
                middle = Some(leaf);
            }
        }
        let middle = middle.unwrap();
        assert_eq!(doc.count_siblings_left(middle), 1);
        assert_eq!(doc.count_siblings_right(middle), 3);
    }

    #[test]
    fn test_equivalent_across_documents() {
        let mut a = Document::new();
        let inner = a.make_object("o").unwrap();
        let leaf = a.make_leaf("k", "v").unwrap();
        a.push_back(inner, leaf).unwrap();

        let mut b = Document::new();
        let copy = b.import(&a, inner).unwrap();
        assert!(a.equivalent(inner, &b, copy).unwrap());

        let other = b.make_object("o").unwrap();
        assert!(!a.equivalent(inner, &b, other).unwrap());
    }

    /// `{arr: [1]}` whose array member is keyed "x" on the wire
    const ODD_ARRAY: [u8; 22] = [
        22, 0, 0, 0, 0x04, b'a', b'r', b'r', 0, 12, 0, 0, 0, 0x10, b'x', 0, 1, 0, 0, 0, 0, 0,
    ];

    #[test]
    fn test_equivalent_ignores_wire_array_names() {
        let verbatim = Document::from_bytes(ODD_ARRAY.to_vec()).unwrap();
        let mut expanded = Document::from_bytes(ODD_ARRAY.to_vec()).unwrap();
        let root = expanded.root();
        expanded.materialize_all(root).unwrap();

        // Verbatim keeps "x", the expanded copy writes "0"
        assert_ne!(verbatim.serialize().unwrap(), expanded.serialize().unwrap());
        assert!(verbatim
            .equivalent(verbatim.root(), &expanded, expanded.root())
            .unwrap());
        assert!(expanded
            .equivalent(expanded.root(), &verbatim, verbatim.root())
            .unwrap());
    }

    #[test]
    fn test_equivalent_detects_differences() {
        let base = Document::from_bytes(ODD_ARRAY.to_vec()).unwrap();

        let mut changed = Document::from_bytes(ODD_ARRAY.to_vec()).unwrap();
        let root = changed.root();
        let arr = changed.find_child(root, "arr").unwrap().unwrap();
        let n = changed.first_child(arr).unwrap().unwrap();
        changed.set_value(n, 2).unwrap();
        assert!(!base.equivalent(base.root(), &changed, changed.root()).unwrap());

        let mut longer = Document::from_bytes(ODD_ARRAY.to_vec()).unwrap();
        let root = longer.root();
        let arr = longer.find_child(root, "arr").unwrap().unwrap();
        let extra = longer.make_leaf("y", 1).unwrap();
        longer.push_back(arr, extra).unwrap();
        assert!(!base.equivalent(base.root(), &longer, longer.root()).unwrap());

        let mut renamed = Document::from_bytes(ODD_ARRAY.to_vec()).unwrap();
        let root = renamed.root();
        let arr = renamed.find_child(root, "arr").unwrap().unwrap();
        renamed.rename(arr, "list").unwrap();
        assert!(!base.equivalent(base.root(), &renamed, renamed.root()).unwrap());
    }
}

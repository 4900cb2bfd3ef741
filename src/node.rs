//! The vertices of a [`Tree`][crate::Tree].
//!
//! A `Node` owns its two children (through [`Link`]s allocated with `Box::leak`) and points back
//! at its parent through another `Link` which is only ever used for navigation. Every node is
//! ultimately owned by the `Tree` that holds the root, which is also responsible for freeing them.

use std::ptr::NonNull;

/// A possibly-null pointer to a [`Node`]. Depending on the field it is stored in this is either
/// an owning pointer (`left`/`right`) or a back-reference (`parent`).
pub(crate) struct Link<T>(pub(crate) Option<NonNull<Node<T>>>);

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}
impl<T> Copy for Link<T> {}

impl<T> Link<T> {
    pub(crate) fn none() -> Self {
        Self(None)
    }

    /// Leaks the boxed node so it can be owned through a `Link`. The allocation must eventually be
    /// reclaimed with [`Link::free`].
    pub(crate) fn from_box(node: Box<Node<T>>) -> Self {
        Self(Some(NonNull::from(Box::leak(node))))
    }

    pub(crate) fn is_some(&self) -> bool {
        self.0.is_some()
    }

    /// Whether this link points at exactly `node`.
    pub(crate) fn is(&self, node: NonNull<Node<T>>) -> bool {
        self.0 == Some(node)
    }

    pub(crate) fn node(&self) -> Option<&Node<T>> {
        // SAFETY: A non-null link always points at a live node owned by the tree this link
        // belongs to. Mutation only happens through `&mut Tree`, so handing out a shared
        // reference tied to a shared borrow of the link can't alias a write.
        unsafe { self.0.as_ref().map(|ptr| ptr.as_ref()) }
    }

    /// Points the node behind this link (if any) back at `parent`.
    ///
    /// # Safety
    ///
    /// The link must be null or point at a live node that nothing else is currently borrowing.
    pub(crate) unsafe fn set_parent(self, parent: Link<T>) {
        if let Some(child) = self.0 {
            (*child.as_ptr()).parent = parent;
        }
    }

    /// Follows left children starting at the node behind this link. A null link stays null.
    pub(crate) fn leftmost(self) -> Link<T> {
        let Some(mut current) = self.0 else {
            return self;
        };
        // SAFETY: Every pointer we follow was read out of a live node's child link.
        while let Some(left) = unsafe { current.as_ref() }.left.0 {
            current = left;
        }
        Link(Some(current))
    }

    /// Reclaims the allocation behind this link, returning the node's value. The node's own links
    /// are plain pointers, so its children are untouched.
    ///
    /// # Safety
    ///
    /// The link must point at a node leaked by [`Link::from_box`] that is no longer reachable from
    /// any other node or from the tree's root, and it must not be freed twice.
    pub(crate) unsafe fn free(self) -> Option<T> {
        self.0.map(|ptr| Box::from_raw(ptr.as_ptr()).value)
    }
}

/// How many children a [`Node`] has. Exactly one of these holds for any node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Children {
    None,
    One,
    Two,
}

pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) parent: Link<T>,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    pub(crate) fn new_boxed(value: T, parent: Link<T>) -> Box<Self> {
        Box::new(Node {
            value,
            parent,
            left: Link::none(),
            right: Link::none(),
        })
    }

    pub(crate) fn left(&self) -> Option<&Self> {
        self.left.node()
    }

    pub(crate) fn right(&self) -> Option<&Self> {
        self.right.node()
    }

    /// The node holding the smallest value in this subtree. That's `self` when there is no left
    /// child.
    pub(crate) fn leftmost(&self) -> &Self {
        let mut current = self;
        while let Some(left) = current.left() {
            current = left;
        }
        current
    }

    /// The node holding the largest value in this subtree.
    pub(crate) fn rightmost(&self) -> &Self {
        let mut current = self;
        while let Some(right) = current.right() {
            current = right;
        }
        current
    }

    /// The number of edges on the longest path from this node down to a leaf. A node without
    /// children has a height of 0 and a missing child contributes nothing.
    pub(crate) fn height(&self) -> usize {
        let mut height = 0;
        let mut stack = vec![(self, 0)];
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(node.left().map(|left| (left, depth + 1)));
            stack.extend(node.right().map(|right| (right, depth + 1)));
        }
        height
    }

    pub(crate) fn children(&self) -> Children {
        match (self.left.is_some(), self.right.is_some()) {
            (false, false) => Children::None,
            (true, true) => Children::Two,
            _ => Children::One,
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.children() == Children::None
    }

    pub(crate) fn has_one_child(&self) -> bool {
        self.children() == Children::One
    }

    pub(crate) fn has_two_children(&self) -> bool {
        self.children() == Children::Two
    }

    /// The child of a node with exactly one child. Null for leaves and for nodes with two
    /// children, where promoting "the" child isn't meaningful.
    pub(crate) fn only_child(&self) -> Link<T> {
        match (self.left.0, self.right.0) {
            (Some(child), None) | (None, Some(child)) => Link(Some(child)),
            _ => Link::none(),
        }
    }

    /// The node holding the next larger value in the whole tree. This is the leftmost node of the
    /// right subtree when there is one, otherwise the closest ancestor that has this node in its
    /// left subtree. Null for the largest node.
    ///
    /// Removal only asks for this when the node has two children, in which case the successor
    /// always lives in the right subtree and has no left child.
    pub(crate) fn in_order_successor(&self) -> Link<T> {
        if self.right.is_some() {
            return self.right.leftmost();
        }

        let mut child = NonNull::from(self);
        let mut parent = self.parent;
        while let Some(ancestor) = parent.0 {
            // SAFETY: Parent links always point at live nodes of the same tree.
            let ancestor_node = unsafe { ancestor.as_ref() };
            if !ancestor_node.right.is(child) {
                return parent;
            }
            child = ancestor;
            parent = ancestor_node.parent;
        }
        Link::none()
    }

    /// Appends the values of this subtree to `sink` in ascending order.
    pub(crate) fn collect_in_order<'a>(&'a self, sink: &mut Vec<&'a T>) {
        let mut stack = Vec::new();
        let mut current = Some(self);
        loop {
            while let Some(node) = current {
                stack.push(node);
                current = node.left();
            }
            let Some(node) = stack.pop() else {
                break;
            };
            sink.push(&node.value);
            current = node.right();
        }
    }

    /// Asserts that both children point back at this node and sit on the correct side of it.
    pub(crate) fn assert_local_invariants(&self)
    where
        T: Ord,
    {
        let this = NonNull::from(self);
        if let Some(left) = self.left() {
            assert!(left.value < self.value);
            assert!(left.parent.is(this), "left child lost its parent link");
        }
        if let Some(right) = self.right() {
            assert!(right.value > self.value);
            assert!(right.parent.is(this), "right child lost its parent link");
        }
    }
}

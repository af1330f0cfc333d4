//! Tree vertex: one owned value, two owned child slots.

use std::cmp::Ordering;
use std::io::{Read, Write};

use crate::domain::error::DomainResult;
use crate::domain::record::{Criterion, Record};

/// Exclusively owned subtree slot.
pub type Link<R> = Option<Box<Node<R>>>;

#[derive(Debug)]
pub struct Node<R: Record> {
    value: R,
    index: u32,
    /// Nodes on the longest path down to a leaf, leaf = 1. Display only.
    pub(crate) height: u32,
    pub(crate) greater: Link<R>,
    pub(crate) less: Link<R>,
}

impl<R: Record> Node<R> {
    pub fn new(value: R, index: u32) -> Self {
        Self {
            value,
            index,
            height: 1,
            greater: None,
            less: None,
        }
    }

    /// Reads the next value from `input` into a fresh node.
    ///
    /// `Ok(None)` means end-of-stream: no node is produced and `index` is
    /// not consumed.
    pub fn load(input: &mut dyn Read, index: u32) -> DomainResult<Option<Self>> {
        Ok(R::read_from(input)?.map(|value| Self::new(value, index)))
    }

    pub fn value(&self) -> &R {
        &self.value
    }

    pub(crate) fn into_value(self) -> R {
        self.value
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sort_key(&self) -> &str {
        self.value.sort_key()
    }

    pub fn greater(&self) -> Option<&Node<R>> {
        self.greater.as_deref()
    }

    pub fn less(&self) -> Option<&Node<R>> {
        self.less.as_deref()
    }

    pub fn is_leaf(&self) -> bool {
        self.greater.is_none() && self.less.is_none()
    }

    /// Replaces the held value and hands the previous one back.
    ///
    /// The node keeps its index and position; the caller decides whether
    /// the new sort key requires a move.
    pub fn set_value(&mut self, value: R) -> R {
        std::mem::replace(&mut self.value, value)
    }

    /// `Equal` when this node satisfies `criterion`.
    pub fn find_cmp(&self, criterion: &Criterion<R::Query>) -> Ordering {
        match criterion {
            Criterion::Index(target) => self.index.cmp(target),
            Criterion::Leaves => {
                if self.is_leaf() {
                    Ordering::Equal
                } else {
                    Ordering::Greater
                }
            }
            Criterion::Field(query) => self.value.find_cmp(query),
        }
    }

    pub fn matches(&self, criterion: &Criterion<R::Query>) -> bool {
        self.find_cmp(criterion) == Ordering::Equal
    }

    /// Record order with the index as tie-breaker, so equal keys keep
    /// insertion order.
    pub fn sort_cmp(&self, other: &Node<R>) -> Ordering {
        self.value
            .sort_cmp(&other.value)
            .then_with(|| self.index.cmp(&other.index))
    }

    /// Writes this subtree in preorder: self, greater, less.
    pub fn save(&self, out: &mut dyn Write) -> DomainResult<usize> {
        let mut written = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            node.value.encode(out)?;
            written += 1;
            // less is pushed first so the greater subtree is written first
            stack.extend(node.less());
            stack.extend(node.greater());
        }
        Ok(written)
    }

    /// Non-clearing destroy: drops the value and returns both children
    /// (greater, less) to the caller.
    pub fn into_children(self) -> (Link<R>, Link<R>) {
        let (_, greater, less) = self.into_parts();
        (greater, less)
    }

    pub(crate) fn into_parts(self) -> (R, Link<R>, Link<R>) {
        (self.value, self.greater, self.less)
    }

    /// Clearing destroy: releases the whole subtree without recursion.
    /// Returns the number of nodes released.
    pub fn destroy_subtree(root: Box<Node<R>>) -> usize {
        let mut released = 0;
        let mut stack = vec![root];
        while let Some(mut node) = stack.pop() {
            stack.extend(node.greater.take());
            stack.extend(node.less.take());
            released += 1;
        }
        released
    }
}

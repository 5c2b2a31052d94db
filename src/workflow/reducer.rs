//! Merge policies applied when a node's patch is folded into the running audit state.
//!
//! Every state field is wrapped in a type that fixes how updates combine with what is already
//! there: [`AppendOnly`] concatenates, [`LastWrite`] replaces when an update is present. The
//! wrappers only hand out shared references, so the reducer is the single mutation path.

use serde::Serialize;
use std::ops::Deref;

/// Combine an update into an existing value.
pub trait Reducer {
    /// Shape of the update a node may contribute for this field.
    type Update;

    /// Fold `update` into `self`.
    fn reduce(&mut self, update: Self::Update);
}

/// Ordered sequence that can only grow.
///
/// Updates are appended in the order they arrive; prior entries are never removed or
/// reordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AppendOnly<T>(Vec<T>);

impl<T> AppendOnly<T> {
    /// Create an empty accumulator.
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// View the accumulated entries.
    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    /// Consume the accumulator, returning its entries in insertion order.
    pub fn into_vec(self) -> Vec<T> {
        self.0
    }
}

impl<T> Default for AppendOnly<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for AppendOnly<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.0
    }
}

impl<T> Reducer for AppendOnly<T> {
    type Update = Vec<T>;

    fn reduce(&mut self, update: Vec<T>) {
        self.0.extend(update);
    }
}

/// Value owned by whichever node wrote it most recently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct LastWrite<T>(T);

impl<T> LastWrite<T> {
    /// Wrap an initial value.
    pub const fn new(value: T) -> Self {
        Self(value)
    }

    /// Consume the wrapper, returning the current value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for LastWrite<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> Reducer for LastWrite<T> {
    type Update = Option<T>;

    fn reduce(&mut self, update: Option<T>) {
        if let Some(value) = update {
            self.0 = value;
        }
    }
}

//! Position ordering shared by the reducer and the view layer.
//!
//! Siblings are ordered by a numeric `position`, ascending. Positions need not
//! be unique; ties keep their original relative order because the sort is
//! stable. `f64::total_cmp` makes the order total, so a NaN never panics the
//! sort and always lands after every finite position.

use crate::entity::{Column, Task};
use std::cmp::Ordering;
use std::sync::Arc;

/// Anything carrying a sibling ordering key
pub trait Positioned {
    /// The ordering key
    fn position(&self) -> f64;
}

impl Positioned for Task {
    fn position(&self) -> f64 {
        self.position
    }
}

impl Positioned for Column {
    fn position(&self) -> f64 {
        self.position
    }
}

impl<T: Positioned + ?Sized> Positioned for Arc<T> {
    fn position(&self) -> f64 {
        (**self).position()
    }
}

impl<T: Positioned + ?Sized> Positioned for &T {
    fn position(&self) -> f64 {
        (**self).position()
    }
}

/// Folds `-0.0` into `0.0` and every NaN into the positive quiet NaN
///
/// `total_cmp` tells the two zeros apart and puts negative NaNs first; after
/// this they compare equal and sort last respectively.
#[must_use]
pub fn canonical_position(position: f64) -> f64 {
    if position.is_nan() {
        f64::NAN
    } else {
        position + 0.0
    }
}

/// Total order on positions; `-0.0` and `0.0` are a tie
#[must_use]
pub fn compare_positions(a: f64, b: f64) -> Ordering {
    canonical_position(a).total_cmp(&canonical_position(b))
}

/// Sorts ascending by position, keeping the relative order of ties
pub fn sort_by_position<T: Positioned>(items: &mut [T]) {
    // `sort_by` is stable; `sort_unstable_by` would break tie order.
    items.sort_by(|a, b| compare_positions(a.position(), b.position()));
}

/// Position one past the largest finite position, or `1.0` when there is none
#[must_use]
pub fn next_position<I>(positions: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    positions
        .into_iter()
        .filter(|p| p.is_finite())
        .reduce(f64::max)
        .map_or(1.0, |max| max + 1.0)
}

//! Input comparison for memoized selectors.
//!
//! Shared values compare by pointer (`Arc::ptr_eq`); plain values such as
//! positions and ids compare by value. Containers compare element-wise.

use composable_board_core::{BoardId, ColumnId, TaskId};
use std::sync::Arc;

/// "Is this the same input as last time?"
pub trait Identity {
    /// Returns `true` when `other` is indistinguishable from `self` for
    /// caching purposes
    fn same(&self, other: &Self) -> bool;
}

impl<T: ?Sized> Identity for Arc<T> {
    fn same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Identity> Identity for Option<T> {
    fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T: Identity> Identity for [T] {
    fn same(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other).all(|(a, b)| a.same(b))
    }
}

impl<T: Identity> Identity for Vec<T> {
    fn same(&self, other: &Self) -> bool {
        self.as_slice().same(other.as_slice())
    }
}

impl<A: Identity, B: Identity> Identity for (A, B) {
    fn same(&self, other: &Self) -> bool {
        self.0.same(&other.0) && self.1.same(&other.1)
    }
}

impl<A: Identity, B: Identity, C: Identity> Identity for (A, B, C) {
    fn same(&self, other: &Self) -> bool {
        self.0.same(&other.0) && self.1.same(&other.1) && self.2.same(&other.2)
    }
}

macro_rules! value_identity {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identity for $ty {
                fn same(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

value_identity!(bool, u32, u64, usize, f64, BoardId, ColumnId, TaskId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arcs_compare_by_pointer_not_value() {
        let a = Arc::new(String::from("same"));
        let b = Arc::new(String::from("same"));
        assert!(a.same(&Arc::clone(&a)));
        assert!(!a.same(&b));
    }

    #[test]
    fn vectors_compare_element_wise() {
        let a = Arc::new(1);
        let b = Arc::new(2);
        let left = vec![Some(Arc::clone(&a)), None];
        assert!(left.same(&vec![Some(Arc::clone(&a)), None]));
        assert!(!left.same(&vec![Some(b), None]));
        assert!(!left.same(&vec![Some(a)]));
    }

    #[test]
    fn positions_compare_by_value() {
        assert!((1.5_f64, ColumnId::new(3)).same(&(1.5, ColumnId::new(3))));
        assert!(!f64::NAN.same(&f64::NAN));
    }
}

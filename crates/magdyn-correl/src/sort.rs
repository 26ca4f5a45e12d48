//! Descending energy ordering of the Hamiltonian eigen-pairs.

use std::cmp::Ordering;

use magdyn_core::MagdynReal;

fn descending<T: MagdynReal>(a: T, b: T) -> Ordering {
    match b.partial_cmp(&a) {
        Some(ord) => ord,
        // NaN energies sink to the end
        None => {
            let a_nan = a.partial_cmp(&a).is_none();
            let b_nan = b.partial_cmp(&b).is_none();
            a_nan.cmp(&b_nan)
        }
    }
}

/// Returns the band indices ordered by non-increasing energy.
///
/// Equal energies keep their original index order.
pub fn energy_permutation<T: MagdynReal>(energies: &[T]) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..energies.len()).collect();
    perm.sort_by(|&a, &b| descending(energies[a], energies[b]));
    perm
}

/// Applies a permutation produced by [`energy_permutation`].
pub fn reorder<V: Clone>(items: &[V], perm: &[usize]) -> Vec<V> {
    perm.iter().map(|&idx| items[idx].clone()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sorts_descending() {
        assert_eq!(energy_permutation(&[1.0, 3.0, -2.0, 2.0]), vec![1, 3, 0, 2]);
    }

    #[test]
    fn ties_keep_index_order() {
        assert_eq!(energy_permutation(&[1.0, 2.0, 1.0, 2.0]), vec![1, 3, 0, 2]);
    }

    #[test]
    fn nan_goes_last() {
        assert_eq!(energy_permutation(&[f64::NAN, 1.0, 5.0]), vec![2, 1, 0]);
    }

    #[test]
    fn reorder_follows_permutation() {
        assert_eq!(reorder(&['a', 'b', 'c'], &[2, 0, 1]), vec!['c', 'a', 'b']);
    }
}

use magdyn_core::{EnergiesAndWeights, EnergyAndWeight, MagdynReal};
use nalgebra::ComplexField;

/// Merges bands whose energies lie within `eps` of an earlier retained band.
///
/// Tensors, sums and weights of merged bands are added to the retained one,
/// which keeps its energy. Retained bands stay in their original order.
pub fn unite_degenerate_energies<T: MagdynReal>(bands: &mut EnergiesAndWeights<T>, eps: T) {
    let mut united: Vec<EnergyAndWeight<T>> = Vec::with_capacity(bands.len());
    for band in bands.drain(..) {
        let target = united
            .iter_mut()
            .find(|kept| ComplexField::abs(kept.energy - band.energy) <= eps);
        match target {
            Some(kept) => {
                kept.s += band.s;
                kept.s_perp += band.s_perp;
                kept.s_sum += band.s_sum;
                kept.s_perp_sum += band.s_perp_sum;
                kept.weight_full += band.weight_full;
                kept.weight += band.weight;
            }
            None => united.push(band),
        }
    }
    *bands = united;
}

//! Bose occupation factors.

use magdyn_core::MagdynReal;
use nalgebra::ComplexField;

/// Boltzmann constant in meV/K.
pub const K_B_MEV_PER_K: f64 = 0.086_173_332_62;

/// Bose factor including the detailed-balance offset for energy loss (`E ≥ 0`).
pub fn bose<T: MagdynReal>(energy: T, temperature: T) -> T {
    let kt = T::lit(K_B_MEV_PER_K) * temperature;
    let mut n = T::one() / (ComplexField::exp(ComplexField::abs(energy) / kt) - T::one());
    if energy >= T::zero() {
        n += T::one();
    }
    n
}

/// Bose factor clamped to `±|cutoff|` for energies closer to zero than the cutoff.
pub fn bose_cutoff<T: MagdynReal>(energy: T, temperature: T, cutoff: T) -> T {
    let cutoff = ComplexField::abs(cutoff);
    if ComplexField::abs(energy) < cutoff {
        let signed = if energy >= T::zero() { cutoff } else { -cutoff };
        bose(signed, temperature)
    } else {
        bose(energy, temperature)
    }
}

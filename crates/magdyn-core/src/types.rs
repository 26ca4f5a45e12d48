use nalgebra::Complex;
use serde::{Deserialize, Serialize};

use crate::scalar::{zero_tensor, CVec3, MagdynReal, RVec3, Tensor3};

/// Magnetic site data consumed by the correlation builder.
///
/// The local-frame vectors are precomputed by the lattice model and express
/// the spin operators of the site in its rotated frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagneticSite<T: MagdynReal = f64> {
    /// Site position in reduced lattice units.
    pub position: RVec3<T>,
    /// Spin magnitude.
    pub spin_mag: T,
    /// Local-frame complex basis vector `u`.
    pub u: CVec3<T>,
    /// Conjugate of the local-frame basis vector.
    pub u_conj: CVec3<T>,
}

impl<T: MagdynReal> MagneticSite<T> {
    /// Creates a site whose conjugate frame vector is derived from `u`.
    pub fn new(position: RVec3<T>, spin_mag: T, u: CVec3<T>) -> Self {
        let u_conj = u.conjugate();
        Self {
            position,
            spin_mag,
            u,
            u_conj,
        }
    }

    /// Creates a site with an explicitly supplied conjugate frame vector.
    pub fn with_frame(position: RVec3<T>, spin_mag: T, u: CVec3<T>, u_conj: CVec3<T>) -> Self {
        Self {
            position,
            spin_mag,
            u,
            u_conj,
        }
    }
}

/// Per-band energy, correlation tensor and scattering weights.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyAndWeight<T: MagdynReal = f64> {
    /// Band energy (meV).
    pub energy: T,
    /// Full spin-spin correlation tensor.
    pub s: Tensor3<T>,
    /// Correlation tensor projected perpendicular to the momentum transfer.
    pub s_perp: Tensor3<T>,
    /// Trace of [`Self::s`].
    pub s_sum: Complex<T>,
    /// Trace of [`Self::s_perp`].
    pub s_perp_sum: Complex<T>,
    /// `|Re(s_sum)|`.
    pub weight_full: T,
    /// `|Re(s_perp_sum)|`, the neutron scattering weight.
    pub weight: T,
}

impl<T: MagdynReal> EnergyAndWeight<T> {
    /// Creates a record for a band with zeroed tensors and weights.
    pub fn new(energy: T) -> Self {
        Self {
            energy,
            s: zero_tensor(),
            s_perp: zero_tensor(),
            s_sum: Complex::new(T::zero(), T::zero()),
            s_perp_sum: Complex::new(T::zero(), T::zero()),
            weight_full: T::zero(),
            weight: T::zero(),
        }
    }
}

/// Ordered band records, descending in energy once sorted.
pub type EnergiesAndWeights<T = f64> = Vec<EnergyAndWeight<T>>;

/// Creates one record per preliminary band energy.
pub fn bands_from_energies<T: MagdynReal>(energies: &[T]) -> EnergiesAndWeights<T> {
    energies.iter().copied().map(EnergyAndWeight::new).collect()
}

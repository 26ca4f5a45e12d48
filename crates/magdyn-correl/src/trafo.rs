//! Paraunitary transform of the Bogoliubov eigenvectors.

use magdyn_core::{
    CMat, CVec, EnergiesAndWeights, EnergyAndWeight, ErrorInfo, MagdynError, MagdynReal, RVec3,
};
use nalgebra::{Complex, ComplexField, DMatrix};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::observer::{format_vec, CorrelationObserver};
use crate::sort::{energy_permutation, reorder};

/// Upstream eigen-data of the Hamiltonian at one momentum point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HamiltonianInput<T: MagdynReal = f64> {
    /// Hermitian `2N x 2N` Hamiltonian whose eigenvectors are supplied.
    pub hamiltonian: CMat<T>,
    /// Cholesky factor from the bosonic factorization.
    pub cholesky: CMat<T>,
    /// Diagonal particle/hole sign matrix.
    pub g_sign: CMat<T>,
    /// Raw eigenvectors, one per band, in the order of the preliminary energies.
    pub eigenvectors: Vec<CVec<T>>,
}

impl<T: MagdynReal> HamiltonianInput<T> {
    /// Dimension of the doubled basis.
    pub fn dim(&self) -> usize {
        self.hamiltonian.nrows()
    }

    /// Checks that every matrix and eigenvector has the doubled-basis size.
    pub fn check_shapes(&self) -> Result<(), MagdynError> {
        let dim = self.dim();
        let square = |what: &str, mat: &CMat<T>| -> Result<(), MagdynError> {
            if mat.nrows() != dim {
                return Err(MagdynError::shape_mismatch(what, dim, mat.nrows()));
            }
            if mat.ncols() != dim {
                return Err(MagdynError::shape_mismatch(what, dim, mat.ncols()));
            }
            Ok(())
        };
        square("hamiltonian", &self.hamiltonian)?;
        square("cholesky factor", &self.cholesky)?;
        square("sign matrix", &self.g_sign)?;
        if self.eigenvectors.len() != dim {
            return Err(MagdynError::shape_mismatch(
                "eigenvector set",
                dim,
                self.eigenvectors.len(),
            ));
        }
        if let Some(bad) = self.eigenvectors.iter().find(|evec| evec.len() != dim) {
            return Err(MagdynError::shape_mismatch("eigenvector", dim, bad.len()));
        }
        Ok(())
    }
}

/// Basis change into the physically normalized quasi-particle basis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParaunitaryTransform<T: MagdynReal = f64> {
    /// `T = C⁻¹ V E_sqrt`.
    pub trafo: CMat<T>,
    /// Hermitian conjugate of [`Self::trafo`].
    pub trafo_herm: CMat<T>,
    /// False when the Cholesky factor could not be inverted.
    pub inversion_ok: bool,
}

impl<T: MagdynReal> ParaunitaryTransform<T> {
    /// Transform of the empty basis.
    pub fn empty() -> Self {
        Self {
            trafo: DMatrix::zeros(0, 0),
            trafo_herm: DMatrix::zeros(0, 0),
            inversion_ok: true,
        }
    }

    /// Dimension of the doubled basis.
    pub fn dim(&self) -> usize {
        self.trafo.nrows()
    }
}

/// Inverts the Cholesky factor, degrading to a pseudo-inverse when singular.
fn invert_cholesky<T: MagdynReal>(cholesky: &CMat<T>, q: &RVec3<T>) -> (CMat<T>, bool) {
    if let Some(inv) = cholesky.clone().try_inverse() {
        return (inv, true);
    }
    warn!(q = %format_vec(q), "inversion of the cholesky factor failed");
    let dim = cholesky.nrows();
    let fallback = cholesky
        .clone()
        .pseudo_inverse(T::lit(1e-12))
        .unwrap_or_else(|_| DMatrix::zeros(dim, dim));
    (fallback, false)
}

/// Builds the paraunitary transform and rewrites the band records.
///
/// The eigenvectors are ordered by the energies currently stored in `bands`.
/// Afterwards `bands` holds one fresh record per band with the energy
/// `Re((V† H V)_ii)` and zeroed tensors. A singular Cholesky factor is
/// reported through `tracing` and the calculation continues with a
/// best-effort inverse.
pub fn paraunitary_transform<T, O>(
    bands: &mut EnergiesAndWeights<T>,
    input: &HamiltonianInput<T>,
    q: &RVec3<T>,
    observer: &O,
) -> Result<ParaunitaryTransform<T>, MagdynError>
where
    T: MagdynReal,
    O: CorrelationObserver<T> + ?Sized,
{
    input.check_shapes()?;
    let dim = input.dim();
    if bands.len() != dim {
        return Err(MagdynError::Input(
            ErrorInfo::new(
                "band-count-mismatch",
                format!("{} band records for {} eigenvectors", bands.len(), dim),
            )
            .with_context("bands", bands.len().to_string())
            .with_context("eigenvectors", dim.to_string()),
        ));
    }
    if dim == 0 {
        bands.clear();
        return Ok(ParaunitaryTransform::empty());
    }

    let energies: Vec<T> = bands.iter().map(|band| band.energy).collect();
    let sorting = energy_permutation(&energies);
    let evec_mat = DMatrix::from_columns(&reorder(&input.eigenvectors, &sorting));
    let evec_mat_herm = evec_mat.adjoint();

    let energy_mat = &evec_mat_herm * &input.hamiltonian * &evec_mat;
    let abs_energies = &input.g_sign * &energy_mat;
    let zero = Complex::new(T::zero(), T::zero());
    let e_sqrt = DMatrix::from_fn(dim, dim, |row, col| {
        if row == col {
            ComplexField::sqrt(abs_energies[(row, col)])
        } else {
            zero
        }
    });

    // energies are re-created to stay consistent with the weights
    *bands = (0..dim)
        .map(|idx| EnergyAndWeight::new(energy_mat[(idx, idx)].re))
        .collect();

    let (chol_inv, inversion_ok) = invert_cholesky(&input.cholesky, q);
    let trafo = chol_inv * evec_mat * &e_sqrt;
    let trafo_herm = trafo.adjoint();

    if observer.enabled() {
        let dynamical = &trafo_herm * &input.hamiltonian * &trafo;
        observer.transform(q, &dynamical, &e_sqrt, &energy_mat);
    }

    Ok(ParaunitaryTransform {
        trafo,
        trafo_herm,
        inversion_ok,
    })
}

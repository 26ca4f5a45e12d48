use magdyn_core::{
    bands_from_energies, CorrelationConfig, EnergiesAndWeights, ErrorInfo, MagdynError,
    MagdynReal, MagneticSite, RVec3, RunProvenance,
};
use serde::{Deserialize, Serialize};

use crate::intensity::apply_intensities;
use crate::observer::CorrelationObserver;
use crate::tensor::build_correlation_tensors;
use crate::trafo::{paraunitary_transform, HamiltonianInput, ParaunitaryTransform};

/// Everything the upstream model supplies for one momentum point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumPoint<T: MagdynReal = f64> {
    /// Momentum transfer in reduced lattice units.
    pub q: RVec3<T>,
    /// Preliminary band energies, in eigenvector order, used for sorting.
    pub energies: Vec<T>,
    /// Hamiltonian eigen-data.
    pub input: HamiltonianInput<T>,
}

/// Final per-band records for one momentum point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumReport<T: MagdynReal = f64> {
    /// Momentum transfer in reduced lattice units.
    pub q: RVec3<T>,
    /// Bands in descending energy order.
    pub bands: EnergiesAndWeights<T>,
    /// False when the Cholesky factor was singular and the values are unreliable.
    pub inversion_ok: bool,
    /// Schema, configuration hash and tool version.
    pub provenance: RunProvenance,
}

/// Sorts, transforms and builds the correlation tensors for one momentum point.
///
/// Without magnetic sites this is a no-op that leaves `bands` untouched.
pub fn calc_correlations<T, O>(
    sites: &[MagneticSite<T>],
    config: &CorrelationConfig,
    input: &HamiltonianInput<T>,
    q: &RVec3<T>,
    bands: &mut EnergiesAndWeights<T>,
    observer: &O,
) -> Result<ParaunitaryTransform<T>, MagdynError>
where
    T: MagdynReal,
    O: CorrelationObserver<T> + ?Sized,
{
    if sites.is_empty() {
        return Ok(ParaunitaryTransform::empty());
    }
    if input.dim() != 2 * sites.len() {
        return Err(MagdynError::Input(
            ErrorInfo::new(
                "site-count-mismatch",
                format!(
                    "{} magnetic sites need a {}-dimensional hamiltonian, got {}",
                    sites.len(),
                    2 * sites.len(),
                    input.dim()
                ),
            )
            .with_context("sites", sites.len().to_string())
            .with_context("dim", input.dim().to_string()),
        ));
    }

    let transform = paraunitary_transform(bands, input, q, observer)?;
    build_correlation_tensors(bands, sites, q, config.phase_sign, &transform, observer)?;
    Ok(transform)
}

/// Post-processes correlation tensors into scattering weights.
pub fn calc_intensities<T: MagdynReal>(
    q_rlu: &RVec3<T>,
    bands: &mut EnergiesAndWeights<T>,
    config: &CorrelationConfig,
) {
    apply_intensities(q_rlu, bands, config);
}

/// Runs the full calculation for one momentum point on fresh records.
pub fn query_momentum<T, O>(
    sites: &[MagneticSite<T>],
    config: &CorrelationConfig,
    point: &MomentumPoint<T>,
    observer: &O,
) -> Result<MomentumReport<T>, MagdynError>
where
    T: MagdynReal,
    O: CorrelationObserver<T> + ?Sized,
{
    let mut bands = bands_from_energies(&point.energies);
    let transform = calc_correlations(sites, config, &point.input, &point.q, &mut bands, observer)?;
    calc_intensities(&point.q, &mut bands, config);
    Ok(MomentumReport {
        q: point.q,
        bands,
        inversion_ok: transform.inversion_ok,
        provenance: RunProvenance::for_config(config, env!("CARGO_PKG_VERSION"))?,
    })
}

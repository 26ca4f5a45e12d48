//! Per-band spin-spin correlation tensors.

use magdyn_core::{
    real, CMat, EnergiesAndWeights, ErrorInfo, MagdynError, MagdynReal, MagneticSite, PhaseSign,
    RVec3,
};
use nalgebra::{Complex, ComplexField, DMatrix};

use crate::observer::CorrelationObserver;
use crate::trafo::ParaunitaryTransform;

/// Phase factor `exp(-s · i · 2π · Q·(r_j − r_i))` between two sites.
pub fn site_phase<T: MagdynReal>(
    q: &RVec3<T>,
    pos_i: &RVec3<T>,
    pos_j: &RVec3<T>,
    phase_sign: PhaseSign,
) -> Complex<T> {
    let angle = -T::lit(phase_sign.value()) * T::two_pi() * (pos_j - pos_i).dot(q);
    Complex::new(ComplexField::cos(angle), ComplexField::sin(angle))
}

/// Assembles the doubled-basis coupling matrix for the component pair `(x, y)`.
///
/// The quadrants hold the particle-particle (`u_i u*_j`), particle-hole
/// (`u_i u_j`), hole-particle (`u*_i u*_j`) and hole-hole (`u*_i u_j`)
/// products, each weighted by `√(S_i S_j)` and the site phase.
pub fn coupling_matrix<T: MagdynReal>(
    sites: &[MagneticSite<T>],
    q: &RVec3<T>,
    phase_sign: PhaseSign,
    x: usize,
    y: usize,
) -> CMat<T> {
    let n = sites.len();
    let mut m = DMatrix::zeros(2 * n, 2 * n);
    for (i, s_i) in sites.iter().enumerate() {
        for (j, s_j) in sites.iter().enumerate() {
            let s_mag = ComplexField::sqrt(s_i.spin_mag * s_j.spin_mag);
            let prefactor = site_phase(q, &s_i.position, &s_j.position, phase_sign) * real(s_mag);

            m[(i, j)] = prefactor * s_i.u[x] * s_j.u_conj[y];
            m[(i, j + n)] = prefactor * s_i.u[x] * s_j.u[y];
            m[(i + n, j)] = prefactor * s_i.u_conj[x] * s_j.u_conj[y];
            m[(i + n, j + n)] = prefactor * s_i.u_conj[x] * s_j.u[y];
        }
    }
    m
}

/// Accumulates the correlation tensor of every band.
///
/// For each component pair the coupling matrix is projected as `T† M T` and
/// the diagonal element of band `k`, divided by the mode count `2N`, is added
/// to `S_k(x, y)`. Without magnetic sites nothing is touched.
pub fn build_correlation_tensors<T, O>(
    bands: &mut EnergiesAndWeights<T>,
    sites: &[MagneticSite<T>],
    q: &RVec3<T>,
    phase_sign: PhaseSign,
    transform: &ParaunitaryTransform<T>,
    observer: &O,
) -> Result<(), MagdynError>
where
    T: MagdynReal,
    O: CorrelationObserver<T> + ?Sized,
{
    let n = sites.len();
    if n == 0 {
        return Ok(());
    }
    let modes = 2 * n;
    if transform.dim() != modes || transform.trafo_herm.nrows() != modes {
        return Err(MagdynError::shape_mismatch(
            "paraunitary transform",
            modes,
            transform.dim(),
        ));
    }
    if bands.len() != modes {
        return Err(MagdynError::Input(
            ErrorInfo::new(
                "band-count-mismatch",
                format!("{} band records for {} modes", bands.len(), modes),
            )
            .with_context("bands", bands.len().to_string())
            .with_context("modes", modes.to_string()),
        ));
    }

    let norm = real(T::one() / T::lit(modes as f64));
    for x in 0..3 {
        for y in 0..3 {
            let m = coupling_matrix(sites, q, phase_sign, x, y);
            let m_trafo = &transform.trafo_herm * m * &transform.trafo;
            observer.projected_coupling(x, y, &m_trafo);

            for (k, band) in bands.iter_mut().enumerate() {
                band.s[(x, y)] += m_trafo[(k, k)] * norm;
            }
        }
    }
    Ok(())
}

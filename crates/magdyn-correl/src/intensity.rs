//! Neutron-scattering weights from the correlation tensors.

use magdyn_core::{
    real, CorrelationConfig, EnergiesAndWeights, FormFactorExpr, MagdynReal, Polarisation, RVec3,
    Tensor3,
};
use nalgebra::{Complex, ComplexField, Matrix3, Vector3};
use tracing::warn;

use crate::bose::bose_cutoff;
use crate::degeneracy::unite_degenerate_energies;

/// Projector onto the plane perpendicular to `q`.
///
/// Magnetic neutron scattering only sees spin components transverse to the
/// momentum transfer. A zero vector defines no plane and yields the identity.
pub fn ortho_projector<T: MagdynReal>(q: &RVec3<T>) -> Tensor3<T> {
    let len2 = q.dot(q);
    if len2 <= T::zero() {
        return Tensor3::identity();
    }
    let proj: Matrix3<T> = Matrix3::identity() - (q * q.transpose()) / len2;
    proj.map(real)
}

/// Evaluates the configured form factor at `|B · Q|`, if one is configured.
///
/// Never fails: an unparsable or unevaluable formula yields zero.
pub fn form_factor<T: MagdynReal>(q_rlu: &RVec3<T>, config: &CorrelationConfig) -> Option<T> {
    if config.form_factor.trim().is_empty() {
        return None;
    }
    let q_f64 = Vector3::new(q_rlu[0].as_f64(), q_rlu[1].as_f64(), q_rlu[2].as_f64());
    let q_abs = (config.xtal_b_matrix() * q_f64).norm();

    let value = match FormFactorExpr::parse(&config.form_factor) {
        Ok(mut expr) => {
            expr.register_var("Q", q_abs);
            expr.eval_noexcept()
        }
        Err(err) => {
            warn!(formula = %config.form_factor, error = %err, "form factor does not parse");
            Complex::new(0.0, 0.0)
        }
    };
    Some(T::lit(value.re))
}

/// Applies Bose weighting, form factor and the transverse projector to every
/// band and fills in the scalar weights.
///
/// The order is Bose factor, form factor, projection. When configured,
/// degenerate bands are united afterwards.
pub fn apply_intensities<T: MagdynReal>(
    q_rlu: &RVec3<T>,
    bands: &mut EnergiesAndWeights<T>,
    config: &CorrelationConfig,
) {
    let ffact = form_factor(q_rlu, config);
    let proj_neutron = ortho_projector(q_rlu);
    let temperature = T::lit(config.temperature);
    let cutoff = T::lit(config.bose_cutoff);

    for band in bands.iter_mut() {
        if config.bose_enabled() {
            band.s *= real(bose_cutoff(band.energy, temperature, cutoff));
        }
        if let Some(ffact) = ffact {
            band.s *= real(ffact);
        }

        band.s_perp = proj_neutron * band.s * proj_neutron;

        match config.polarisation {
            Polarisation::Unpolarised => {}
            // no polarisation-resolved (Blume-Maleev) channels yet
            _ => {}
        }

        band.s_sum = band.s.trace();
        band.s_perp_sum = band.s_perp.trace();
        band.weight_full = ComplexField::abs(band.s_sum.re);
        band.weight = ComplexField::abs(band.s_perp_sum.re);
    }

    if let Some(eps) = config.unite_degeneracies {
        unite_degenerate_energies(bands, T::lit(eps));
    }
}

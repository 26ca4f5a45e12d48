//! Injectable hook for tracing intermediate matrices.

use magdyn_core::{CMat, MagdynReal, RVec3};
use tracing::{debug, Level};

/// Receives intermediate results of a momentum-point calculation.
///
/// All methods default to no-ops. Diagnostics that cost extra work (such as
/// the transformed Hamiltonian) are only computed when [`Self::enabled`]
/// returns true.
pub trait CorrelationObserver<T: MagdynReal> {
    /// Whether the observer wants the optional diagnostics.
    fn enabled(&self) -> bool {
        false
    }

    /// Called once the paraunitary transform is known.
    ///
    /// `dynamical` is `T† H T`, `e_sqrt` the square-rooted sign-corrected
    /// energies and `energies` is `V† H V`.
    fn transform(&self, _q: &RVec3<T>, _dynamical: &CMat<T>, _e_sqrt: &CMat<T>, _energies: &CMat<T>) {
    }

    /// Called with `T† M T` for every Cartesian component pair.
    fn projected_coupling(&self, _x: usize, _y: usize, _m_trafo: &CMat<T>) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl<T: MagdynReal> CorrelationObserver<T> for NoopObserver {}

/// Observer forwarding the matrices to `tracing` at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl<T: MagdynReal> CorrelationObserver<T> for TracingObserver {
    fn enabled(&self) -> bool {
        tracing::enabled!(Level::DEBUG)
    }

    fn transform(&self, q: &RVec3<T>, dynamical: &CMat<T>, e_sqrt: &CMat<T>, energies: &CMat<T>) {
        debug!(q = %format_vec(q), "D = {dynamical}\nE = {e_sqrt}\nL = {energies}");
    }

    fn projected_coupling(&self, x: usize, y: usize, m_trafo: &CMat<T>) {
        debug!(x, y, "M_trafo = {m_trafo}");
    }
}

/// Formats a momentum vector as `(h, k, l)`.
pub(crate) fn format_vec<T: MagdynReal>(q: &RVec3<T>) -> String {
    format!("({}, {}, {})", q[0], q[1], q[2])
}

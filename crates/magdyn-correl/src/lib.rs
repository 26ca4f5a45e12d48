//! Dynamical spin-spin correlations and neutron intensities of magnon bands.
//!
//! The calculation follows Toth and Lake, J. Phys.: Condens. Matter 27,
//! 166002 (2015): the Bogoliubov eigenvectors are turned into a paraunitary
//! transform, the spin correlation tensor of every band is read off the
//! transformed coupling matrices, and the tensors are weighted into
//! scattering intensities.

pub mod bose;
pub mod degeneracy;
pub mod intensity;
pub mod observer;
pub mod pipeline;
pub mod sort;
pub mod sweep;
pub mod tensor;
pub mod trafo;

pub use bose::{bose, bose_cutoff, K_B_MEV_PER_K};
pub use degeneracy::unite_degenerate_energies;
pub use intensity::{apply_intensities, form_factor, ortho_projector};
pub use observer::{CorrelationObserver, NoopObserver, TracingObserver};
pub use pipeline::{calc_correlations, calc_intensities, query_momentum, MomentumPoint, MomentumReport};
pub use sort::{energy_permutation, reorder};
pub use sweep::{sweep_momenta, SweepOpts};
pub use tensor::{build_correlation_tensors, coupling_matrix, site_phase};
pub use trafo::{paraunitary_transform, HamiltonianInput, ParaunitaryTransform};

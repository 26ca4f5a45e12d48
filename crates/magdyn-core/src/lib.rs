#![deny(missing_docs)]
#![doc = "Core data model, numeric capability set, configuration and errors for magnon spin-spin correlation calculations."]

pub mod config;
pub mod errors;
pub mod expr;
pub mod provenance;
pub mod scalar;
pub mod serde;
mod types;

pub use config::{CorrelationConfig, PhaseSign, Polarisation};
pub use errors::{ErrorInfo, MagdynError};
pub use expr::FormFactorExpr;
pub use provenance::{RunProvenance, SchemaVersion};
pub use scalar::{real, zero_tensor, CMat, CVec, CVec3, Cplx, MagdynReal, RVec3, Tensor3};
pub use types::{bands_from_energies, EnergiesAndWeights, EnergyAndWeight, MagneticSite};

//! Immutable configuration threaded through every correlation call.

use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, MagdynError};
use crate::expr::FormFactorExpr;

fn config_error(code: &str, message: impl Into<String>) -> MagdynError {
    MagdynError::Config(ErrorInfo::new(code, message))
}

fn default_temperature() -> f64 {
    -1.0
}

fn default_bose_cutoff() -> f64 {
    0.02
}

fn default_xtal_b() -> [[f64; 3]; 3] {
    [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]]
}

/// Sign convention of the inter-site phase factor.
///
/// The phase between sites `i` and `j` is `exp(-s · i · 2π · Q·(r_j − r_i))`
/// with `s = -1` for [`PhaseSign::Negative`] and `s = +1` for
/// [`PhaseSign::Positive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PhaseSign {
    /// `s = -1`.
    #[default]
    Negative,
    /// `s = +1`.
    Positive,
}

impl PhaseSign {
    /// Numeric value of the sign.
    pub fn value(self) -> f64 {
        match self {
            PhaseSign::Negative => -1.0,
            PhaseSign::Positive => 1.0,
        }
    }
}

/// Polarisation analysis applied after the transverse projection.
///
/// Only unpolarised scattering is supported; polarisation-resolved
/// (Blume–Maleev) channels would extend this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum Polarisation {
    /// Unpolarised neutrons, no channel separation.
    #[default]
    Unpolarised,
}

/// Shared read-only configuration for correlation and intensity calculations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Temperature in K; negative values disable Bose weighting.
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Energy cutoff (meV) below which the Bose factor is clamped.
    #[serde(default = "default_bose_cutoff")]
    pub bose_cutoff: f64,
    /// Phase-sign convention of the site phase factor.
    #[serde(default)]
    pub phase_sign: PhaseSign,
    /// Magnetic form-factor expression in the variable `Q` (Å⁻¹); empty disables it.
    #[serde(default)]
    pub form_factor: String,
    /// Row-major crystal metric mapping reduced units to Å⁻¹.
    #[serde(default = "default_xtal_b")]
    pub xtal_b: [[f64; 3]; 3],
    /// Polarisation analysis mode.
    #[serde(default)]
    pub polarisation: Polarisation,
    /// Energy tolerance for merging degenerate bands after post-processing.
    #[serde(default)]
    pub unite_degeneracies: Option<f64>,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            bose_cutoff: default_bose_cutoff(),
            phase_sign: PhaseSign::default(),
            form_factor: String::new(),
            xtal_b: default_xtal_b(),
            polarisation: Polarisation::default(),
            unite_degeneracies: None,
        }
    }
}

impl CorrelationConfig {
    /// Parses a configuration from YAML.
    pub fn from_yaml_str(data: &str) -> Result<Self, MagdynError> {
        serde_yaml::from_str(data).map_err(|err| {
            MagdynError::Serde(ErrorInfo::new("yaml_deserialize", err.to_string()))
        })
    }

    /// Parses a configuration from JSON.
    pub fn from_json_str(data: &str) -> Result<Self, MagdynError> {
        serde_json::from_str(data).map_err(|err| {
            MagdynError::Serde(ErrorInfo::new("json_deserialize", err.to_string()))
        })
    }

    /// Whether Bose weighting is active.
    pub fn bose_enabled(&self) -> bool {
        self.temperature >= 0.0
    }

    /// Crystal metric as a matrix.
    pub fn xtal_b_matrix(&self) -> Matrix3<f64> {
        let b = &self.xtal_b;
        Matrix3::new(
            b[0][0], b[0][1], b[0][2], b[1][0], b[1][1], b[1][2], b[2][0], b[2][1], b[2][2],
        )
    }

    /// Checks that all values are usable.
    ///
    /// The calculations themselves never fail on configuration values, this
    /// is meant for front ends that want to reject bad input early.
    pub fn validate(&self) -> Result<(), MagdynError> {
        if self.temperature.is_nan() || self.temperature.is_infinite() {
            return Err(config_error(
                "invalid-temperature",
                format!("temperature must be finite, got {}", self.temperature),
            ));
        }
        if !self.bose_cutoff.is_finite() {
            return Err(config_error(
                "invalid-bose-cutoff",
                format!("bose cutoff must be finite, got {}", self.bose_cutoff),
            ));
        }
        if self.xtal_b.iter().flatten().any(|value| !value.is_finite()) {
            return Err(config_error(
                "invalid-xtal-b",
                "crystal metric contains non-finite entries",
            ));
        }
        if let Some(eps) = self.unite_degeneracies {
            if !(eps.is_finite() && eps >= 0.0) {
                return Err(config_error(
                    "invalid-degeneracy-tolerance",
                    format!("degeneracy tolerance must be finite and non-negative, got {eps}"),
                ));
            }
        }
        if !self.form_factor.trim().is_empty() {
            FormFactorExpr::parse(&self.form_factor).map_err(|err| {
                MagdynError::Config(
                    ErrorInfo::new("invalid-form-factor", err.info().message.clone())
                        .with_context("formula", self.form_factor.clone()),
                )
            })?;
        }
        Ok(())
    }
}

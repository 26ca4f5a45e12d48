mod common;

use common::{assert_close, c};
use magdyn_core::{CorrelationConfig, EnergyAndWeight, Tensor3};
use magdyn_correl::{apply_intensities, bose_cutoff, form_factor, ortho_projector};
use nalgebra::{Complex, Matrix3, Vector3};
use proptest::prelude::*;

fn sample_tensor() -> Tensor3<f64> {
    Matrix3::new(
        c(0.25, 0.0),
        c(0.0, -0.25),
        c(0.1, 0.0),
        c(0.0, 0.25),
        c(0.25, 0.0),
        c(0.0, 0.05),
        c(0.1, 0.0),
        c(0.0, -0.05),
        c(0.125, 0.0),
    )
}

fn band_with(energy: f64, s: Tensor3<f64>) -> EnergyAndWeight<f64> {
    let mut band = EnergyAndWeight::new(energy);
    band.s = s;
    band
}

#[test]
fn disabled_bose_factor_is_a_no_op() {
    let config = CorrelationConfig::default();
    let mut bands = vec![band_with(1.0, sample_tensor()), band_with(-1.0, sample_tensor())];
    apply_intensities(&Vector3::new(1.0, 0.5, 0.25), &mut bands, &config);
    for band in &bands {
        assert_eq!(band.s, sample_tensor());
    }
}

#[test]
fn bose_factor_scales_by_energy() {
    let config = CorrelationConfig {
        temperature: 20.0,
        ..CorrelationConfig::default()
    };
    let mut bands = vec![band_with(1.0, sample_tensor()), band_with(-1.0, sample_tensor())];
    apply_intensities(&Vector3::new(1.0, 0.0, 0.0), &mut bands, &config);
    for band in &bands {
        let factor = bose_cutoff(band.energy, 20.0, 0.02);
        assert_close(band.s[(0, 0)], c(0.25 * factor, 0.0), 1e-12);
        assert_close(band.s[(1, 0)], c(0.0, 0.25 * factor), 1e-12);
    }
    assert!(bands[0].weight_full > bands[1].weight_full);
}

#[test]
fn form_factor_uses_absolute_momentum() {
    let config = CorrelationConfig {
        form_factor: "Q / 2".into(),
        xtal_b: [[2.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 2.0]],
        ..CorrelationConfig::default()
    };
    // |B · (0, 3, 4)| = 10
    let q = Vector3::new(0.0, 3.0, 4.0);
    assert_eq!(form_factor(&q, &config), Some(5.0));

    let mut bands = vec![band_with(1.0, sample_tensor())];
    apply_intensities(&q, &mut bands, &config);
    assert_close(bands[0].s[(0, 0)], c(1.25, 0.0), 1e-12);
}

#[test]
fn broken_form_factors_fall_back_to_zero() {
    let unparsable = CorrelationConfig {
        form_factor: "exp(-Q".into(),
        ..CorrelationConfig::default()
    };
    let q = Vector3::new(1.0, 0.0, 0.0);
    assert_eq!(form_factor(&q, &unparsable), Some(0.0));

    let unknown = CorrelationConfig {
        form_factor: "j0(Q)".into(),
        ..CorrelationConfig::default()
    };
    let mut bands = vec![band_with(1.0, sample_tensor())];
    apply_intensities(&q, &mut bands, &unknown);
    assert_eq!(bands[0].weight_full, 0.0);
    assert_eq!(bands[0].weight, 0.0);

    assert_eq!(form_factor(&q, &CorrelationConfig::default()), None);
}

#[test]
fn deeply_nested_form_factor_falls_back_to_zero() {
    let depth = 30_000;
    let config = CorrelationConfig {
        form_factor: format!("{}Q{}", "(".repeat(depth), ")".repeat(depth)),
        ..CorrelationConfig::default()
    };
    let q = Vector3::new(0.0, 0.0, 1.0);
    assert_eq!(form_factor(&q, &config), Some(0.0));

    let mut bands = vec![band_with(1.0, sample_tensor())];
    apply_intensities(&q, &mut bands, &config);
    assert_eq!(bands[0].weight_full, 0.0);
    assert_eq!(bands[0].weight, 0.0);
}

#[test]
fn projector_is_idempotent_and_transverse() {
    let q = Vector3::new(1.0, -2.0, 0.5);
    let p = ortho_projector(&q);
    assert!((p * p - p).norm() < 1e-12);
    let q_c = q.map(|value| c(value, 0.0));
    assert!((p * q_c).norm() < 1e-12);

    let s = sample_tensor();
    let once = p * s * p;
    let twice = p * p * s * p * p;
    assert!((once - twice).norm() < 1e-12);
}

#[test]
fn zero_momentum_projector_is_identity() {
    let p = ortho_projector(&Vector3::<f64>::zeros());
    assert_eq!(p, Tensor3::<f64>::identity());
}

#[test]
fn weights_are_traces() {
    let config = CorrelationConfig::default();
    let mut bands = vec![band_with(2.0, sample_tensor())];
    apply_intensities(&Vector3::new(0.0, 0.0, 1.0), &mut bands, &config);
    let band = &bands[0];
    assert_close(band.s_sum, c(0.625, 0.0), 1e-12);
    // projecting out z removes S_zz
    assert_close(band.s_perp_sum, c(0.5, 0.0), 1e-12);
    assert!((band.weight_full - 0.625).abs() < 1e-12);
    assert!((band.weight - 0.5).abs() < 1e-12);
}

#[test]
fn degenerate_bands_are_united_when_configured() {
    let config = CorrelationConfig {
        unite_degeneracies: Some(1e-6),
        ..CorrelationConfig::default()
    };
    let mut bands = vec![
        band_with(1.0, sample_tensor()),
        band_with(1.0, sample_tensor()),
        band_with(-1.0, sample_tensor()),
    ];
    apply_intensities(&Vector3::new(0.0, 0.0, 1.0), &mut bands, &config);
    assert_eq!(bands.len(), 2);
    assert!((bands[0].weight - 1.0).abs() < 1e-12);
    assert!((bands[1].weight - 0.5).abs() < 1e-12);
}

fn psd_tensor(entries: &[f64]) -> Tensor3<f64> {
    let a = Matrix3::from_fn(|row, col| {
        let idx = 2 * (3 * row + col);
        Complex::new(entries[idx], entries[idx + 1])
    });
    a * a.adjoint()
}

proptest! {
    #[test]
    fn transverse_weight_never_exceeds_full_weight(
        entries in prop::collection::vec(-1.0f64..1.0, 18),
        qx in -2.0f64..2.0,
        qy in -2.0f64..2.0,
        qz in 0.1f64..2.0,
        energy in -5.0f64..5.0,
    ) {
        let config = CorrelationConfig::default();
        let mut bands = vec![band_with(energy, psd_tensor(&entries))];
        apply_intensities(&Vector3::new(qx, qy, qz), &mut bands, &config);
        prop_assert!(bands[0].weight <= bands[0].weight_full + 1e-12);
        prop_assert!(bands[0].weight >= 0.0);
    }
}

use magdyn_core::serde::{from_json_slice, stable_hash_string, to_canonical_json_bytes};
use magdyn_core::{bands_from_energies, EnergyAndWeight, MagneticSite};
use nalgebra::{Complex, Vector3};

#[test]
fn fresh_records_are_zeroed() {
    let bands = bands_from_energies(&[1.5_f64, -1.5]);
    assert_eq!(bands.len(), 2);
    assert_eq!(bands[0].energy, 1.5);
    assert_eq!(bands[1].energy, -1.5);
    for band in &bands {
        assert!(band.s.iter().all(|c| *c == Complex::new(0.0, 0.0)));
        assert!(band.s_perp.iter().all(|c| *c == Complex::new(0.0, 0.0)));
        assert_eq!(band.weight, 0.0);
        assert_eq!(band.weight_full, 0.0);
    }
}

#[test]
fn site_conjugate_frame_is_derived() {
    let h = std::f64::consts::FRAC_1_SQRT_2;
    let u = Vector3::new(Complex::new(h, 0.0), Complex::new(0.0, h), Complex::new(0.0, 0.0));
    let site = MagneticSite::new(Vector3::zeros(), 1.0, u);
    assert_eq!(site.u_conj[1], Complex::new(0.0, -h));
    assert_eq!(site.u_conj[0], Complex::new(h, 0.0));
}

#[test]
fn records_survive_json_and_hash_stably() {
    let mut record = EnergyAndWeight::new(0.75_f64);
    record.s[(0, 1)] = Complex::new(0.0, -0.25);
    record.weight = 0.5;
    let bytes = to_canonical_json_bytes(&record).unwrap();
    let back: EnergyAndWeight<f64> = from_json_slice(&bytes).unwrap();
    assert_eq!(back, record);
    assert_eq!(
        stable_hash_string(&record).unwrap(),
        stable_hash_string(&back).unwrap()
    );
}

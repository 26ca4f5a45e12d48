#![allow(dead_code)]

use std::f64::consts::FRAC_1_SQRT_2;

use magdyn_core::{CMat, CVec, MagneticSite};
use magdyn_correl::{HamiltonianInput, MomentumPoint};
use nalgebra::{Cholesky, Complex, DMatrix, DVector, SymmetricEigen, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub fn c(re: f64, im: f64) -> Complex<f64> {
    Complex::new(re, im)
}

pub fn sign_matrix(n: usize) -> CMat<f64> {
    DMatrix::from_fn(2 * n, 2 * n, |row, col| {
        if row != col {
            c(0.0, 0.0)
        } else if row < n {
            c(1.0, 0.0)
        } else {
            c(-1.0, 0.0)
        }
    })
}

/// Ferromagnetic site with `u = (1, i, 0)/√2` and unit spin.
pub fn ferromagnet_site(position: Vector3<f64>) -> MagneticSite<f64> {
    let u = Vector3::new(c(FRAC_1_SQRT_2, 0.0), c(0.0, FRAC_1_SQRT_2), c(0.0, 0.0));
    MagneticSite::new(position, 1.0, u)
}

/// Bogoliubov eigen-data for a Hermitian positive-definite `h0 = K† K`.
///
/// The supplied Hamiltonian is `K g K†`, whose eigenvectors are handed over
/// in ascending eigenvalue order together with their eigenvalues.
pub fn bogoliubov_point(h0: &CMat<f64>, q: Vector3<f64>) -> MomentumPoint<f64> {
    let dim = h0.nrows();
    let n = dim / 2;
    let lower = Cholesky::new(h0.clone()).expect("positive definite").l();
    let k = lower.adjoint();
    let g = sign_matrix(n);
    let h_trafo = &k * &g * k.adjoint();
    let h_trafo = (&h_trafo + h_trafo.adjoint()) * c(0.5, 0.0);
    let eigen = SymmetricEigen::new(h_trafo.clone());

    let mut order: Vec<usize> = (0..dim).collect();
    order.sort_by(|&a, &b| eigen.eigenvalues[a].partial_cmp(&eigen.eigenvalues[b]).unwrap());
    let energies = order.iter().map(|&idx| eigen.eigenvalues[idx]).collect();
    let eigenvectors: Vec<CVec<f64>> = order
        .iter()
        .map(|&idx| eigen.eigenvectors.column(idx).into_owned())
        .collect();

    MomentumPoint {
        q,
        energies,
        input: HamiltonianInput {
            hamiltonian: h_trafo,
            cholesky: k,
            g_sign: g,
            eigenvectors,
        },
    }
}

/// Single-site ferromagnet with gap `e0`, eigenvectors given hole-first.
pub fn ferromagnet_point(e0: f64, q: Vector3<f64>) -> MomentumPoint<f64> {
    let root = e0.sqrt();
    MomentumPoint {
        q,
        energies: vec![-e0, e0],
        input: HamiltonianInput {
            hamiltonian: DMatrix::from_diagonal(&DVector::from_vec(vec![c(e0, 0.0), c(-e0, 0.0)])),
            cholesky: DMatrix::from_diagonal(&DVector::from_vec(vec![c(root, 0.0), c(root, 0.0)])),
            g_sign: sign_matrix(1),
            eigenvectors: vec![
                DVector::from_vec(vec![c(0.0, 0.0), c(1.0, 0.0)]),
                DVector::from_vec(vec![c(1.0, 0.0), c(0.0, 0.0)]),
            ],
        },
    }
}

pub fn random_complex(rng: &mut StdRng, rows: usize, cols: usize) -> CMat<f64> {
    DMatrix::from_fn(rows, cols, |_, _| {
        c(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0))
    })
}

/// Random Hermitian positive-definite matrix.
pub fn random_positive_hamiltonian(seed: u64, dim: usize) -> CMat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let x = random_complex(&mut rng, dim, dim);
    let identity: CMat<f64> = DMatrix::identity(dim, dim);
    &x * x.adjoint() + identity * c(dim as f64, 0.0)
}

/// Random unitary matrix from the QR decomposition of a random matrix.
pub fn random_unitary(seed: u64, dim: usize) -> CMat<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    random_complex(&mut rng, dim, dim).qr().q()
}

pub fn random_sites(seed: u64, n: usize) -> Vec<MagneticSite<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let position = Vector3::new(rng.gen(), rng.gen(), rng.gen());
            let u = Vector3::new(
                c(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
                c(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
                c(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)),
            );
            MagneticSite::new(position, rng.gen_range(0.5..2.5), u)
        })
        .collect()
}

pub fn assert_close(actual: Complex<f64>, expected: Complex<f64>, tol: f64) {
    assert!(
        (actual - expected).norm_sqr().sqrt() <= tol,
        "expected {expected}, got {actual}"
    );
}

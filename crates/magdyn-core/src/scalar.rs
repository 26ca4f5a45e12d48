//! Numeric capability set shared by every computation routine.
//!
//! All routines are generic over a real scalar `T`; the complex scalar, dense
//! matrices and 3x3 tensors are derived from it through nalgebra so that the
//! whole family stays consistent.

use nalgebra::{Complex, DMatrix, DVector, Matrix3, RealField, Vector3};

/// Real scalar usable by the correlation routines.
///
/// Anything satisfying [`RealField`] and `Copy` qualifies (`f32`, `f64`).
pub trait MagdynReal: RealField + Copy {
    /// Converts an `f64` literal into the scalar type.
    fn lit(value: f64) -> Self {
        nalgebra::convert(value)
    }

    /// Converts the scalar into an `f64`, saturating to NaN if impossible.
    fn as_f64(self) -> f64 {
        nalgebra::try_convert::<Self, f64>(self).unwrap_or(f64::NAN)
    }
}

impl<T> MagdynReal for T where T: RealField + Copy {}

/// Complex scalar for a given real type.
pub type Cplx<T> = Complex<T>;

/// Dense complex matrix (Hamiltonian, transform, coupling matrices).
pub type CMat<T> = DMatrix<Complex<T>>;

/// Dense complex vector (eigenvectors).
pub type CVec<T> = DVector<Complex<T>>;

/// Complex 3x3 correlation tensor.
pub type Tensor3<T> = Matrix3<Complex<T>>;

/// Complex 3-vector (local-frame basis vectors).
pub type CVec3<T> = Vector3<Complex<T>>;

/// Real 3-vector (positions, momenta).
pub type RVec3<T> = Vector3<T>;

/// Lifts a real number into the complex plane.
pub fn real<T: MagdynReal>(value: T) -> Complex<T> {
    Complex::new(value, T::zero())
}

/// Returns the zero 3x3 tensor.
pub fn zero_tensor<T: MagdynReal>() -> Tensor3<T> {
    Matrix3::zeros()
}

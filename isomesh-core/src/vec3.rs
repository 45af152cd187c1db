//! Fixed-size 3-component vector used by all geometric computations

use crate::error::{Error, Result};
use num_traits::{Num, NumCast};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Div, Index, IndexMut, Mul, Sub};

/// Tolerance used for component-wise equality of two vectors.
pub const EQUALITY_EPSILON: f64 = 1e-8;

/// A 3-component vector over an integer or floating component type.
///
/// Equality is component-wise within [`EQUALITY_EPSILON`], not bit equality,
/// to absorb floating round-off. Normalizing a zero-magnitude vector is a
/// defined no-op rather than an error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Vec3<T> {
    data: [T; 3],
}

impl<T: Num + NumCast + Copy + PartialOrd> Vec3<T> {
    /// Create a vector from its three components.
    pub fn new(a: T, b: T, c: T) -> Self {
        Self { data: [a, b, c] }
    }

    /// Create a vector from a slice, which must contain exactly 3 elements.
    pub fn from_slice(values: &[T]) -> Result<Self> {
        if values.len() != 3 {
            return Err(Error::InvalidArgument(format!(
                "Vec3 requires exactly 3 components, got {}",
                values.len()
            )));
        }
        Ok(Self::new(values[0], values[1], values[2]))
    }

    /// Number of components, always 3.
    pub const fn size(&self) -> usize {
        3
    }

    /// Euclidean norm as `f64` regardless of the component type.
    pub fn magnitude(&self) -> f64 {
        let [a, b, c] = [
            as_f64(self.data[0]),
            as_f64(self.data[1]),
            as_f64(self.data[2]),
        ];
        (a * a + b * b + c * c).sqrt()
    }

    /// Scale the vector in place so its magnitude becomes 1.
    ///
    /// When the magnitude is 0 this is a no-op, not an error.
    pub fn normalize(&mut self) {
        let magnitude = self.magnitude();

        if magnitude > 0.0 {
            for component in &mut self.data {
                if let Some(scaled) = T::from(as_f64(*component) / magnitude) {
                    *component = scaled;
                }
            }
        }
    }

    /// Smallest of the three components.
    ///
    /// A component wins only when strictly less than both others; on ties the
    /// last component is returned.
    pub fn min(&self) -> T {
        if self.data[0] < self.data[1] && self.data[0] < self.data[2] {
            return self.data[0];
        }
        if self.data[1] < self.data[0] && self.data[1] < self.data[2] {
            return self.data[1];
        }
        self.data[2]
    }
}

fn as_f64<T: NumCast>(value: T) -> f64 {
    // Casts from the supported component types cannot fail.
    num_traits::cast(value).unwrap_or(f64::NAN)
}

impl<T: Num + NumCast + Copy + PartialOrd> Default for Vec3<T> {
    fn default() -> Self {
        Self::new(T::zero(), T::zero(), T::zero())
    }
}

impl<T> From<[T; 3]> for Vec3<T> {
    fn from(data: [T; 3]) -> Self {
        Self { data }
    }
}

impl<T> Index<usize> for Vec3<T> {
    type Output = T;

    fn index(&self, idx: usize) -> &T {
        &self.data[idx]
    }
}

impl<T> IndexMut<usize> for Vec3<T> {
    fn index_mut(&mut self, idx: usize) -> &mut T {
        &mut self.data[idx]
    }
}

impl<T: Num + NumCast + Copy + PartialOrd> PartialEq for Vec3<T> {
    fn eq(&self, other: &Self) -> bool {
        self.data
            .iter()
            .zip(other.data.iter())
            .all(|(&a, &b)| (as_f64(a) - as_f64(b)).abs() <= EQUALITY_EPSILON)
    }
}

impl<T: Num + NumCast + Copy + PartialOrd> Add for Vec3<T> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.data[0] + rhs.data[0],
            self.data[1] + rhs.data[1],
            self.data[2] + rhs.data[2],
        )
    }
}

impl<T: Num + NumCast + Copy + PartialOrd> Sub for Vec3<T> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(
            self.data[0] - rhs.data[0],
            self.data[1] - rhs.data[1],
            self.data[2] - rhs.data[2],
        )
    }
}

/// Component-wise product.
impl<T: Num + NumCast + Copy + PartialOrd> Mul for Vec3<T> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.data[0] * rhs.data[0],
            self.data[1] * rhs.data[1],
            self.data[2] * rhs.data[2],
        )
    }
}

/// Scalar product.
impl<T: Num + NumCast + Copy + PartialOrd> Mul<T> for Vec3<T> {
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self::new(self.data[0] * rhs, self.data[1] * rhs, self.data[2] * rhs)
    }
}

/// Component-wise quotient.
impl<T: Num + NumCast + Copy + PartialOrd> Div for Vec3<T> {
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        Self::new(
            self.data[0] / rhs.data[0],
            self.data[1] / rhs.data[1],
            self.data[2] / rhs.data[2],
        )
    }
}

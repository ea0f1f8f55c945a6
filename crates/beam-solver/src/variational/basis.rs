//! Nodal bases built from a monomial space.
//!
//! The basis functions are `N_k(x) = Σ_j C[j, k] m_j(x)` with `C = V⁻¹` and the
//! Vandermonde matrix `V[i, j] = m_j(x_i)`, so `N_k(x_i) = δ_ik` holds by
//! construction for any unisolvent node set.

use nalgebra::{DMatrix, DVector, Vector3};

use crate::error::ElementError;

/// Exponents `(a, b, c)` of the monomial `x^a y^b z^c`
pub type Exponents = [u32; 3];

/// Monomials of total degree at most `degree` (full Lagrange space on simplices)
pub fn total_degree(degree: u32) -> Vec<Exponents> {
    let mut exps = Vec::new();
    for total in 0..=degree {
        for a in (0..=total).rev() {
            for b in (0..=total - a).rev() {
                exps.push([a, b, total - a - b]);
            }
        }
    }
    exps
}

/// Monomials with every exponent at most `degree` (tensor-product space)
pub fn tensor_degree(degree: u32) -> Vec<Exponents> {
    let mut exps = Vec::new();
    for c in 0..=degree {
        for b in 0..=degree {
            for a in 0..=degree {
                exps.push([a, b, c]);
            }
        }
    }
    exps
}

/// Quadratic serendipity space on the cube: tensor-quadratic monomials in which
/// at most one variable appears squared (20 functions).
pub fn serendipity_quadratic() -> Vec<Exponents> {
    tensor_degree(2)
        .into_iter()
        .filter(|e| e.iter().filter(|&&p| p == 2).count() <= 1)
        .collect()
}

fn power(x: f64, p: u32) -> f64 {
    x.powi(p as i32)
}

fn monomial(e: &Exponents, x: &Vector3<f64>) -> f64 {
    power(x.x, e[0]) * power(x.y, e[1]) * power(x.z, e[2])
}

fn monomial_gradient(e: &Exponents, x: &Vector3<f64>) -> Vector3<f64> {
    let d = |axis: usize| -> f64 {
        if e[axis] == 0 {
            return 0.0;
        }
        let mut v = e[axis] as f64;
        for k in 0..3 {
            let p = if k == axis { e[k] - 1 } else { e[k] };
            v *= power(x[k], p);
        }
        v
    };
    Vector3::new(d(0), d(1), d(2))
}

/// Lagrange basis dual to point evaluation at a node set
#[derive(Debug, Clone)]
pub struct NodalBasis {
    exponents: Vec<Exponents>,
    coefficients: DMatrix<f64>,
}

impl NodalBasis {
    /// Build the basis of `exponents` interpolating at `nodes`.
    pub fn new(
        name: &'static str,
        nodes: &[Vector3<f64>],
        exponents: Vec<Exponents>,
    ) -> Result<Self, ElementError> {
        let n = nodes.len();
        if exponents.len() != n {
            return Err(ElementError::NodeCount {
                expected: exponents.len(),
                actual: n,
            });
        }
        let vandermonde = DMatrix::from_fn(n, n, |i, j| monomial(&exponents[j], &nodes[i]));
        let coefficients = vandermonde
            .try_inverse()
            .ok_or(ElementError::SingularBasis(name))?;
        Ok(Self {
            exponents,
            coefficients,
        })
    }

    pub fn dim(&self) -> usize {
        self.exponents.len()
    }

    pub fn values(&self, x: &Vector3<f64>) -> Vec<f64> {
        let m = DVector::from_iterator(self.dim(), self.exponents.iter().map(|e| monomial(e, x)));
        (self.coefficients.transpose() * m).iter().copied().collect()
    }

    pub fn gradients(&self, x: &Vector3<f64>) -> Vec<Vector3<f64>> {
        let dm: Vec<Vector3<f64>> = self
            .exponents
            .iter()
            .map(|e| monomial_gradient(e, x))
            .collect();
        (0..self.dim())
            .map(|k| {
                dm.iter()
                    .enumerate()
                    .map(|(j, g)| g * self.coefficients[(j, k)])
                    .sum()
            })
            .collect()
    }
}

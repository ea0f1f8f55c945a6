//! Hyperelastic material laws.
//!
//! Every law is written in terms of the right Cauchy-Green tensor `C = FᵀF` and
//! returns the second Piola-Kirchhoff stress `S = 2 ∂W/∂C` and the material
//! elasticity tensor `ℂ = 4 ∂²W/∂C∂C`. Symmetric tensors use Voigt notation in
//! the order xx, yy, zz, xy, yz, zx; the tangent is the 6×6 matrix acting on
//! engineering strains, so `dS = ℂ : dE` reads `ds = D de`.

use std::fmt::Debug;

use nalgebra::{Matrix3, Matrix6, Vector3, Vector6};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tensor index pairs of the Voigt components
pub const VOIGT_PAIRS: [(usize, usize); 6] = [(0, 0), (1, 1), (2, 2), (0, 1), (1, 2), (0, 2)];

/// Voigt component of the tensor index pair `(i, j)`
pub fn voigt_index(i: usize, j: usize) -> usize {
    match (i.min(j), i.max(j)) {
        (0, 0) => 0,
        (1, 1) => 1,
        (2, 2) => 2,
        (0, 1) => 3,
        (1, 2) => 4,
        _ => 5,
    }
}

pub fn to_voigt(s: &Matrix3<f64>) -> Vector6<f64> {
    Vector6::from_fn(|a, _| {
        let (i, j) = VOIGT_PAIRS[a];
        s[(i, j)]
    })
}

pub fn from_voigt(v: &Vector6<f64>) -> Matrix3<f64> {
    Matrix3::from_fn(|i, j| v[voigt_index(i, j)])
}

/// `A ⊗ B` restricted to symmetric arguments: `A_IJ B_KL`
fn outer(a: &Matrix3<f64>, b: &Matrix3<f64>) -> Matrix6<f64> {
    to_voigt(a) * to_voigt(b).transpose()
}

/// Symmetrized product `½ (A_IK B_JL + A_IL B_JK)`
fn sym_product(a: &Matrix3<f64>, b: &Matrix3<f64>) -> Matrix6<f64> {
    Matrix6::from_fn(|r, c| {
        let (i, j) = VOIGT_PAIRS[r];
        let (k, l) = VOIGT_PAIRS[c];
        0.5 * (a[(i, k)] * b[(j, l)] + a[(i, l)] * b[(j, k)])
    })
}

/// Lamé parameters `(λ, μ)` from Young's modulus and Poisson's ratio
pub fn lame_parameters(young_modulus: f64, poisson_ratio: f64) -> (f64, f64) {
    let lambda = young_modulus * poisson_ratio / ((1.0 + poisson_ratio) * (1.0 - 2.0 * poisson_ratio));
    let mu = young_modulus / (2.0 * (1.0 + poisson_ratio));
    (lambda, mu)
}

fn check_elastic_constants(young_modulus: f64, poisson_ratio: f64) -> Result<(), ConfigError> {
    if !(young_modulus > 0.0) {
        return Err(ConfigError::InvalidParameter(format!(
            "Young's modulus must be positive, got {}",
            young_modulus
        )));
    }
    if !(poisson_ratio > -1.0 && poisson_ratio < 0.5) {
        return Err(ConfigError::InvalidParameter(format!(
            "Poisson's ratio must lie in (-1, 0.5), got {}",
            poisson_ratio
        )));
    }
    Ok(())
}

/// Strain measures at one material point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    /// Right Cauchy-Green tensor
    pub c: Matrix3<f64>,
    pub c_inv: Matrix3<f64>,
    /// `det F`
    pub j: f64,
}

impl Kinematics {
    /// `None` when `det F ≤ 0`
    pub fn from_deformation_gradient(f: &Matrix3<f64>) -> Option<Self> {
        let j = f.determinant();
        if j <= 0.0 {
            return None;
        }
        let c = f.transpose() * f;
        let c_inv = c.try_inverse()?;
        Some(Self { c, c_inv, j })
    }

    pub fn from_right_cauchy_green(c: &Matrix3<f64>) -> Option<Self> {
        let det = c.determinant();
        if det <= 0.0 {
            return None;
        }
        let c_inv = c.try_inverse()?;
        Some(Self {
            c: *c,
            c_inv,
            j: det.sqrt(),
        })
    }

    /// First invariant `tr C`
    pub fn i1(&self) -> f64 {
        self.c.trace()
    }

    /// Pseudo-invariant `a · C b`
    pub fn mixed(&self, a: &Vector3<f64>, b: &Vector3<f64>) -> f64 {
        a.dot(&(self.c * b))
    }
}

/// Stored-energy law
pub trait HyperelasticLaw: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// Energy per unit reference volume
    fn strain_energy(&self, k: &Kinematics) -> f64;

    /// Second Piola-Kirchhoff stress
    fn second_piola(&self, k: &Kinematics) -> Matrix3<f64>;

    /// Material elasticity tensor in Voigt form
    fn elasticity(&self, k: &Kinematics) -> Matrix6<f64>;
}

/// Saint Venant-Kirchhoff: `W = λ/2 (tr E)² + μ tr(E²)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SaintVenantKirchhoff {
    pub lambda: f64,
    pub mu: f64,
}

impl SaintVenantKirchhoff {
    pub fn new(young_modulus: f64, poisson_ratio: f64) -> Self {
        let (lambda, mu) = lame_parameters(young_modulus, poisson_ratio);
        Self { lambda, mu }
    }

    fn green_lagrange(k: &Kinematics) -> Matrix3<f64> {
        (k.c - Matrix3::identity()) * 0.5
    }
}

impl HyperelasticLaw for SaintVenantKirchhoff {
    fn name(&self) -> &'static str {
        "SaintVenantKirchhoff"
    }

    fn strain_energy(&self, k: &Kinematics) -> f64 {
        let e = Self::green_lagrange(k);
        let tr = e.trace();
        0.5 * self.lambda * tr * tr + self.mu * (e * e).trace()
    }

    fn second_piola(&self, k: &Kinematics) -> Matrix3<f64> {
        let e = Self::green_lagrange(k);
        Matrix3::identity() * (self.lambda * e.trace()) + e * (2.0 * self.mu)
    }

    fn elasticity(&self, _k: &Kinematics) -> Matrix6<f64> {
        let id = Matrix3::identity();
        outer(&id, &id) * self.lambda + sym_product(&id, &id) * (2.0 * self.mu)
    }
}

/// Compressible neo-Hookean: `W = μ/2 (I₁ - 3) - μ ln J + λ/2 (ln J)²`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NeoHookean {
    pub lambda: f64,
    pub mu: f64,
}

impl NeoHookean {
    pub fn new(young_modulus: f64, poisson_ratio: f64) -> Self {
        let (lambda, mu) = lame_parameters(young_modulus, poisson_ratio);
        Self { lambda, mu }
    }
}

impl HyperelasticLaw for NeoHookean {
    fn name(&self) -> &'static str {
        "NeoHookean"
    }

    fn strain_energy(&self, k: &Kinematics) -> f64 {
        let ln_j = k.j.ln();
        0.5 * self.mu * (k.i1() - 3.0) - self.mu * ln_j + 0.5 * self.lambda * ln_j * ln_j
    }

    fn second_piola(&self, k: &Kinematics) -> Matrix3<f64> {
        let ln_j = k.j.ln();
        Matrix3::identity() * self.mu + k.c_inv * (self.lambda * ln_j - self.mu)
    }

    fn elasticity(&self, k: &Kinematics) -> Matrix6<f64> {
        let ln_j = k.j.ln();
        outer(&k.c_inv, &k.c_inv) * self.lambda
            + sym_product(&k.c_inv, &k.c_inv) * (2.0 * (self.mu - self.lambda * ln_j))
    }
}

/// Anisotropic law with two fiber families and a nearly incompressible bulk term:
///
/// `W = κ/4 (J² - 1 - 2 ln J) + a/2b exp(b (I₁ - 3))
///    + Σ aᵢ/2bᵢ (exp(bᵢ (I₄ᵢ - 1)²) - 1) + a_fs/2b_fs (exp(b_fs I₈²) - 1)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FiberReinforced {
    pub bulk_modulus: f64,
    pub a: f64,
    pub b: f64,
    pub a_f: f64,
    pub b_f: f64,
    pub a_s: f64,
    pub b_s: f64,
    pub a_fs: f64,
    pub b_fs: f64,
    /// Fiber direction in the reference configuration
    pub f0: [f64; 3],
    /// Sheet direction in the reference configuration
    pub s0: [f64; 3],
}

impl Default for FiberReinforced {
    fn default() -> Self {
        let r = std::f64::consts::FRAC_1_SQRT_2;
        Self {
            bulk_modulus: 1e9,
            a: 1e6,
            b: 5.0,
            a_f: 16e4,
            b_f: 12.8,
            a_s: 18e4,
            b_s: 10.0,
            a_fs: 9e3,
            b_fs: 12.0,
            f0: [0.0, r, r],
            s0: [0.0, r, -r],
        }
    }
}

/// `(ψ, dψ/dx, d²ψ/dx²)` of `ψ = a/2b (exp(b x²) - 1)`
fn exp_quadratic(a: f64, b: f64, x: f64) -> (f64, f64, f64) {
    let e = (b * x * x).exp();
    (a / (2.0 * b) * (e - 1.0), a * x * e, a * (1.0 + 2.0 * b * x * x) * e)
}

impl FiberReinforced {
    fn directions(&self) -> (Vector3<f64>, Vector3<f64>) {
        (Vector3::from(self.f0), Vector3::from(self.s0))
    }

    /// `(ψ, ψ', ψ'')` of each invariant term: I₁, I₄f, I₄s, I₈
    fn terms(&self, k: &Kinematics) -> [(f64, f64, f64); 4] {
        let (f, s) = self.directions();
        let e1 = (self.b * (k.i1() - 3.0)).exp();
        [
            (
                self.a / (2.0 * self.b) * e1,
                0.5 * self.a * e1,
                0.5 * self.a * self.b * e1,
            ),
            exp_quadratic(self.a_f, self.b_f, k.mixed(&f, &f) - 1.0),
            exp_quadratic(self.a_s, self.b_s, k.mixed(&s, &s) - 1.0),
            exp_quadratic(self.a_fs, self.b_fs, k.mixed(&f, &s)),
        ]
    }

    /// `∂I/∂C` of each invariant term
    fn invariant_gradients(&self) -> [Matrix3<f64>; 4] {
        let (f, s) = self.directions();
        let fs = f * s.transpose();
        [
            Matrix3::identity(),
            f * f.transpose(),
            s * s.transpose(),
            (fs + fs.transpose()) * 0.5,
        ]
    }
}

impl HyperelasticLaw for FiberReinforced {
    fn name(&self) -> &'static str {
        "FiberReinforced"
    }

    fn strain_energy(&self, k: &Kinematics) -> f64 {
        let j2 = k.j * k.j;
        let vol = 0.25 * self.bulk_modulus * (j2 - 1.0 - 2.0 * k.j.ln());
        vol + self.terms(k).iter().map(|t| t.0).sum::<f64>()
    }

    fn second_piola(&self, k: &Kinematics) -> Matrix3<f64> {
        let j2 = k.j * k.j;
        let mut s = k.c_inv * (0.5 * self.bulk_modulus * (j2 - 1.0));
        for (t, g) in self.terms(k).iter().zip(self.invariant_gradients()) {
            s += g * (2.0 * t.1);
        }
        s
    }

    fn elasticity(&self, k: &Kinematics) -> Matrix6<f64> {
        let j2 = k.j * k.j;
        let mut d = outer(&k.c_inv, &k.c_inv) * (self.bulk_modulus * j2)
            - sym_product(&k.c_inv, &k.c_inv) * (self.bulk_modulus * (j2 - 1.0));
        for (t, g) in self.terms(k).iter().zip(self.invariant_gradients()) {
            d += outer(&g, &g) * (4.0 * t.2);
        }
        d
    }
}

/// Material law selected by name
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MaterialModel {
    SaintVenantKirchhoff(SaintVenantKirchhoff),
    NeoHookean(NeoHookean),
    FiberReinforced(FiberReinforced),
}

impl MaterialModel {
    /// Build a law from its name and elastic constants. The fiber-reinforced law
    /// carries its own constants and ignores `young_modulus`/`poisson_ratio`.
    pub fn from_name(
        name: &str,
        young_modulus: f64,
        poisson_ratio: f64,
    ) -> Result<Self, ConfigError> {
        match name {
            "SaintVenantKirchhoff" => {
                check_elastic_constants(young_modulus, poisson_ratio)?;
                Ok(Self::SaintVenantKirchhoff(SaintVenantKirchhoff::new(
                    young_modulus,
                    poisson_ratio,
                )))
            }
            "NeoHookean" => {
                check_elastic_constants(young_modulus, poisson_ratio)?;
                Ok(Self::NeoHookean(NeoHookean::new(young_modulus, poisson_ratio)))
            }
            "FiberReinforced" => Ok(Self::FiberReinforced(FiberReinforced::default())),
            other => Err(ConfigError::UnknownMaterial(other.to_string())),
        }
    }

    fn law(&self) -> &dyn HyperelasticLaw {
        match self {
            Self::SaintVenantKirchhoff(m) => m,
            Self::NeoHookean(m) => m,
            Self::FiberReinforced(m) => m,
        }
    }
}

impl HyperelasticLaw for MaterialModel {
    fn name(&self) -> &'static str {
        self.law().name()
    }

    fn strain_energy(&self, k: &Kinematics) -> f64 {
        self.law().strain_energy(k)
    }

    fn second_piola(&self, k: &Kinematics) -> Matrix3<f64> {
        self.law().second_piola(k)
    }

    fn elasticity(&self, k: &Kinematics) -> Matrix6<f64> {
        self.law().elasticity(k)
    }
}

/// Material section of a study configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    pub model: String,
    pub young_modulus: f64,
    pub poisson_ratio: f64,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            model: "NeoHookean".to_string(),
            young_modulus: 3000.0,
            poisson_ratio: 0.3,
        }
    }
}

impl MaterialConfig {
    pub fn build(&self) -> Result<MaterialModel, ConfigError> {
        MaterialModel::from_name(&self.model, self.young_modulus, self.poisson_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn deformed() -> Kinematics {
        let f = Matrix3::new(1.05, 0.08, -0.02, 0.03, 0.97, 0.06, -0.04, 0.01, 1.1);
        Kinematics::from_deformation_gradient(&f).unwrap()
    }

    fn laws() -> Vec<MaterialModel> {
        vec![
            MaterialModel::from_name("SaintVenantKirchhoff", 3000.0, 0.3).unwrap(),
            MaterialModel::from_name("NeoHookean", 3000.0, 0.3).unwrap(),
            MaterialModel::from_name("FiberReinforced", 0.0, 0.0).unwrap(),
        ]
    }

    /// Symmetric perturbation of `C` producing a unit engineering strain in
    /// Voigt component `b`.
    fn perturbation(b: usize, h: f64) -> Matrix3<f64> {
        let (k, l) = VOIGT_PAIRS[b];
        let mut dc = Matrix3::zeros();
        if k == l {
            dc[(k, k)] = 2.0 * h;
        } else {
            dc[(k, l)] = h;
            dc[(l, k)] = h;
        }
        dc
    }

    #[test]
    fn voigt_round_trip_keeps_symmetric_tensors() {
        let s = Matrix3::new(1.0, 2.0, 3.0, 2.0, 4.0, 5.0, 3.0, 5.0, 6.0);
        assert_eq!(from_voigt(&to_voigt(&s)), s);
        assert_eq!(to_voigt(&s), Vector6::new(1.0, 4.0, 6.0, 2.0, 5.0, 3.0));
    }

    #[test]
    fn lame_parameters_of_beam_material() {
        let (lambda, mu) = lame_parameters(3000.0, 0.3);
        assert_relative_eq!(mu, 3000.0 / 2.6, max_relative = 1e-14);
        assert_relative_eq!(lambda, 900.0 / (1.3 * 0.4), max_relative = 1e-14);
    }

    #[test]
    fn isotropic_laws_are_stress_free_at_rest() {
        let rest = Kinematics::from_deformation_gradient(&Matrix3::identity()).unwrap();
        for law in &laws()[..2] {
            assert_relative_eq!(law.second_piola(&rest), Matrix3::zeros(), epsilon = 1e-12);
            assert_relative_eq!(law.strain_energy(&rest), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn small_strain_tangents_agree_at_rest() {
        let rest = Kinematics::from_deformation_gradient(&Matrix3::identity()).unwrap();
        let svk = SaintVenantKirchhoff::new(3000.0, 0.3);
        let nh = NeoHookean::new(3000.0, 0.3);
        assert_relative_eq!(svk.elasticity(&rest), nh.elasticity(&rest), epsilon = 1e-9);
        assert_relative_eq!(svk.elasticity(&rest)[(3, 3)], svk.mu, epsilon = 1e-12);
    }

    #[test]
    fn stress_is_energy_derivative() {
        let k0 = deformed();
        for law in laws() {
            let s = to_voigt(&law.second_piola(&k0));
            let scale = s.amax().max(1.0);
            for b in 0..6 {
                let h = 1e-6;
                let dc = perturbation(b, h);
                let kp = Kinematics::from_right_cauchy_green(&(k0.c + dc)).unwrap();
                let km = Kinematics::from_right_cauchy_green(&(k0.c - dc)).unwrap();
                let fd = (law.strain_energy(&kp) - law.strain_energy(&km)) / (2.0 * h);
                assert!(
                    (fd - s[b]).abs() < 1e-5 * scale,
                    "{}: S[{}] = {} vs fd {}",
                    law.name(),
                    b,
                    s[b],
                    fd
                );
            }
        }
    }

    #[test]
    fn tangent_is_stress_derivative() {
        let k0 = deformed();
        for law in laws() {
            let d = law.elasticity(&k0);
            assert_relative_eq!(d, d.transpose(), max_relative = 1e-10);
            let scale = d.amax();
            for b in 0..6 {
                let h = 1e-6;
                let dc = perturbation(b, h);
                let kp = Kinematics::from_right_cauchy_green(&(k0.c + dc)).unwrap();
                let km = Kinematics::from_right_cauchy_green(&(k0.c - dc)).unwrap();
                let fd = (to_voigt(&law.second_piola(&kp)) - to_voigt(&law.second_piola(&km)))
                    / (2.0 * h);
                for a in 0..6 {
                    assert!(
                        (fd[a] - d[(a, b)]).abs() < 1e-5 * scale,
                        "{}: D[{}, {}] = {} vs fd {}",
                        law.name(),
                        a,
                        b,
                        d[(a, b)],
                        fd[a]
                    );
                }
            }
        }
    }

    #[test]
    fn fiber_law_is_prestressed_by_isotropic_term() {
        let rest = Kinematics::from_deformation_gradient(&Matrix3::identity()).unwrap();
        let law = FiberReinforced::default();
        assert_relative_eq!(law.second_piola(&rest), Matrix3::identity() * law.a, epsilon = 1e-6);
    }

    #[test]
    fn inverted_deformation_has_no_kinematics() {
        let f = Matrix3::from_diagonal(&Vector3::new(1.0, 1.0, -0.5));
        assert!(Kinematics::from_deformation_gradient(&f).is_none());
    }

    #[test]
    fn unknown_material_is_rejected() {
        let err = MaterialModel::from_name("MooneyRivlin", 3000.0, 0.3).unwrap_err();
        assert_eq!(err, ConfigError::UnknownMaterial("MooneyRivlin".to_string()));
        assert!(MaterialConfig::default().build().is_ok());
        let bad = MaterialConfig {
            poisson_ratio: 0.5,
            ..MaterialConfig::default()
        };
        assert!(matches!(bad.build(), Err(ConfigError::InvalidParameter(_))));
    }
}

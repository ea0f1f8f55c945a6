//! Quadrature rules on reference cells.
//!
//! Tetrahedra and triangles use the unit simplex (volume 1/6, area 1/2).
//! Hexahedra come in two flavours: the symmetric cube `[-1, 1]³` used by the
//! native elements and the unit cube `[0, 1]³` used by the variational ones.

use nalgebra::{Vector2, Vector3};

/// Integration point in a 3D reference cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadraturePoint {
    pub xi: Vector3<f64>,
    pub weight: f64,
}

/// Integration point in a 2D reference face
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacePoint {
    pub st: Vector2<f64>,
    pub weight: f64,
}

/// Reference cube convention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeDomain {
    /// `[-1, 1]³`
    Symmetric,
    /// `[0, 1]³`
    Unit,
}

/// Gauss-Legendre points and weights on `[-1, 1]`.
pub fn gauss_legendre(n: usize) -> Vec<(f64, f64)> {
    match n {
        0 | 1 => vec![(0.0, 2.0)],
        2 => {
            let g = 1.0 / 3.0_f64.sqrt();
            vec![(-g, 1.0), (g, 1.0)]
        }
        3 => {
            let g = (3.0_f64 / 5.0).sqrt();
            vec![(-g, 5.0 / 9.0), (0.0, 8.0 / 9.0), (g, 5.0 / 9.0)]
        }
        _ => {
            let (a, wa) = (0.339_981_043_584_856_3, 0.652_145_154_862_546_1);
            let (b, wb) = (0.861_136_311_594_052_6, 0.347_854_845_137_453_8);
            vec![(-b, wb), (-a, wa), (a, wa), (b, wb)]
        }
    }
}

/// Points per direction of a Gauss rule exact for polynomials of `degree`.
pub fn gauss_points_for_degree(degree: usize) -> usize {
    (degree + 2) / 2
}

/// Tensor-product Gauss rule with `n` points per direction.
pub fn hexahedron(n: usize, domain: CubeDomain) -> Vec<QuadraturePoint> {
    let line: Vec<(f64, f64)> = match domain {
        CubeDomain::Symmetric => gauss_legendre(n),
        CubeDomain::Unit => gauss_legendre(n)
            .into_iter()
            .map(|(x, w)| (0.5 * (x + 1.0), 0.5 * w))
            .collect(),
    };

    let mut points = Vec::with_capacity(line.len().pow(3));
    for &(z, wz) in &line {
        for &(y, wy) in &line {
            for &(x, wx) in &line {
                points.push(QuadraturePoint {
                    xi: Vector3::new(x, y, z),
                    weight: wx * wy * wz,
                });
            }
        }
    }
    points
}

fn tet_point(l1: f64, l2: f64, l3: f64, weight: f64) -> QuadraturePoint {
    QuadraturePoint {
        xi: Vector3::new(l1, l2, l3),
        weight,
    }
}

/// Symmetric rule on the unit tetrahedron exact to `degree` (capped at 4).
pub fn tetrahedron(degree: usize) -> Vec<QuadraturePoint> {
    match degree {
        0 | 1 => vec![tet_point(0.25, 0.25, 0.25, 1.0 / 6.0)],
        2 => {
            let a = 0.585_410_196_624_968_5;
            let b = 0.138_196_601_125_010_5;
            let w = 1.0 / 24.0;
            vec![
                tet_point(b, b, b, w),
                tet_point(a, b, b, w),
                tet_point(b, a, b, w),
                tet_point(b, b, a, w),
            ]
        }
        3 => {
            let w0 = -2.0 / 15.0;
            let w1 = 3.0 / 40.0;
            let (a, b) = (0.5, 1.0 / 6.0);
            vec![
                tet_point(0.25, 0.25, 0.25, w0),
                tet_point(b, b, b, w1),
                tet_point(a, b, b, w1),
                tet_point(b, a, b, w1),
                tet_point(b, b, a, w1),
            ]
        }
        _ => {
            // Keast, 11 points
            let w0 = -74.0 / 5625.0;
            let w1 = 343.0 / 45000.0;
            let w2 = 56.0 / 2250.0;
            let (c, d) = (1.0 / 14.0, 11.0 / 14.0);
            let (a, b) = (0.399_403_576_166_799_2, 0.100_596_423_833_200_8);
            vec![
                tet_point(0.25, 0.25, 0.25, w0),
                tet_point(c, c, c, w1),
                tet_point(d, c, c, w1),
                tet_point(c, d, c, w1),
                tet_point(c, c, d, w1),
                tet_point(a, a, b, w2),
                tet_point(a, b, a, w2),
                tet_point(b, a, a, w2),
                tet_point(a, b, b, w2),
                tet_point(b, a, b, w2),
                tet_point(b, b, a, w2),
            ]
        }
    }
}

fn face_point(s: f64, t: f64, weight: f64) -> FacePoint {
    FacePoint {
        st: Vector2::new(s, t),
        weight,
    }
}

/// Symmetric rule on the unit triangle exact to `degree` (capped at 4).
pub fn triangle(degree: usize) -> Vec<FacePoint> {
    match degree {
        0 | 1 => vec![face_point(1.0 / 3.0, 1.0 / 3.0, 0.5)],
        2 => {
            let w = 1.0 / 6.0;
            vec![
                face_point(1.0 / 6.0, 1.0 / 6.0, w),
                face_point(2.0 / 3.0, 1.0 / 6.0, w),
                face_point(1.0 / 6.0, 2.0 / 3.0, w),
            ]
        }
        _ => {
            let (a, wa) = (0.445_948_490_915_965, 0.223_381_589_678_011 / 2.0);
            let (b, wb) = (0.091_576_213_509_771, 0.109_951_743_655_322 / 2.0);
            vec![
                face_point(a, a, wa),
                face_point(1.0 - 2.0 * a, a, wa),
                face_point(a, 1.0 - 2.0 * a, wa),
                face_point(b, b, wb),
                face_point(1.0 - 2.0 * b, b, wb),
                face_point(b, 1.0 - 2.0 * b, wb),
            ]
        }
    }
}

/// Tensor Gauss rule on `[-1, 1]²` exact to `degree`.
pub fn quadrilateral(degree: usize) -> Vec<FacePoint> {
    let line = gauss_legendre(gauss_points_for_degree(degree));
    let mut points = Vec::with_capacity(line.len() * line.len());
    for &(t, wt) in &line {
        for &(s, ws) in &line {
            points.push(face_point(s, t, ws * wt));
        }
    }
    points
}

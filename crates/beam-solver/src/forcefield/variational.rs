//! Hyperelastic residual in first Piola-Kirchhoff form on variational elements.
//!
//! ```text
//! r_a  = ∫ P ∇N_a dV - ∫ B N_a dV,        P = F S
//! K_ab = ∫ ∇N_a · A · ∇N_b dV,           A_iJkL = δ_ik S_JL + F_iI ℂ_IJKL F_kK
//! ```
//!
//! Cells must be given in the variational local order.

use nalgebra::{DVector, Matrix3, SMatrix, Vector3};

use super::{ForceField, GaussData, cell_displacements, deformation_gradient, precompute};
use crate::assembly::{AssembledSystem, ElementContribution, assemble_elements};
use crate::elements::Element;
use crate::error::{Result, SolverError};
use crate::materials::{HyperelasticLaw, Kinematics, MaterialModel, voigt_index};
use crate::mesh::DOFS_PER_NODE;
use crate::variational::VariationalElement;

type Matrix9 = SMatrix<f64, 9, 9>;

/// First elasticity tensor, row `3i + J`, column `3k + L`
fn first_elasticity(f: &Matrix3<f64>, s: &Matrix3<f64>, k: &Kinematics, material: &MaterialModel) -> Matrix9 {
    let d = material.elasticity(k);
    // ℂ_IJKL contracted with F on the first and third index
    let mut a = Matrix9::zeros();
    for i in 0..3 {
        for jj in 0..3 {
            for kk in 0..3 {
                for ll in 0..3 {
                    let mut v = if i == kk { s[(jj, ll)] } else { 0.0 };
                    for ii in 0..3 {
                        for m in 0..3 {
                            v += f[(i, ii)] * d[(voigt_index(ii, jj), voigt_index(m, ll))] * f[(kk, m)];
                        }
                    }
                    a[(3 * i + jj, 3 * kk + ll)] = v;
                }
            }
        }
    }
    a
}

pub struct VariationalForceField {
    element: VariationalElement,
    cells: Vec<Vec<usize>>,
    material: MaterialModel,
    body_force: Vector3<f64>,
    gauss: Vec<Vec<GaussData>>,
    num_dofs: usize,
}

impl VariationalForceField {
    pub fn new(element: VariationalElement, cells: Vec<Vec<usize>>, material: MaterialModel) -> Self {
        Self {
            element,
            cells,
            material,
            body_force: Vector3::zeros(),
            gauss: Vec::new(),
            num_dofs: 0,
        }
    }

    /// Body force per unit reference volume
    pub fn with_body_force(mut self, body_force: Vector3<f64>) -> Self {
        self.body_force = body_force;
        self
    }

    pub fn element(&self) -> &VariationalElement {
        &self.element
    }

    fn element_contribution(
        &self,
        e: usize,
        u: &DVector<f64>,
        with_tangent: bool,
    ) -> Result<ElementContribution> {
        let cell = &self.cells[e];
        let ue = cell_displacements(cell, u);
        let mut out = ElementContribution::new(cell.clone(), with_tangent);

        for gp in &self.gauss[e] {
            let f = deformation_gradient(&ue, &gp.gradients);
            let k = Kinematics::from_deformation_gradient(&f).ok_or(SolverError::InvertedElement {
                element: e,
                j: f.determinant(),
            })?;
            let s = self.material.second_piola(&k);
            let p = f * s;

            for (a, (ga, &na)) in gp.gradients.iter().zip(&gp.values).enumerate() {
                let ra = (p * ga - self.body_force * na) * gp.weight;
                for i in 0..DOFS_PER_NODE {
                    out.force[DOFS_PER_NODE * a + i] += ra[i];
                }
            }

            if let Some(stiffness) = out.stiffness.as_mut() {
                let tangent = first_elasticity(&f, &s, &k, &self.material);
                for (a, ga) in gp.gradients.iter().enumerate() {
                    for (b, gb) in gp.gradients.iter().enumerate() {
                        for i in 0..3 {
                            for kk in 0..3 {
                                let mut v = 0.0;
                                for jj in 0..3 {
                                    for ll in 0..3 {
                                        v += ga[jj] * tangent[(3 * i + jj, 3 * kk + ll)] * gb[ll];
                                    }
                                }
                                stiffness[(DOFS_PER_NODE * a + i, DOFS_PER_NODE * b + kk)] +=
                                    v * gp.weight;
                            }
                        }
                    }
                }
            }
        }
        Ok(out)
    }
}

impl ForceField for VariationalForceField {
    fn name(&self) -> &'static str {
        "VariationalForceField"
    }

    fn init(&mut self, rest: &[Vector3<f64>]) -> Result<()> {
        if let Some((e, cell)) = self
            .cells
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != self.element.num_nodes())
        {
            return Err(SolverError::Mesh(format!(
                "cell {} has {} nodes, {} expects {}",
                e,
                cell.len(),
                self.element.name(),
                self.element.num_nodes()
            )));
        }
        self.gauss = precompute(&self.element, rest, &self.cells)?;
        self.num_dofs = rest.len() * DOFS_PER_NODE;
        log::debug!(
            "{}: {} {} cells, quadrature degree {}, {} material",
            self.name(),
            self.cells.len(),
            self.element.name(),
            self.element.quadrature_degree(),
            self.material.name()
        );
        Ok(())
    }

    fn assemble(&self, displacement: &DVector<f64>, with_tangent: bool) -> Result<AssembledSystem> {
        assemble_elements(self.num_dofs, self.gauss.len(), with_tangent, |e| {
            self.element_contribution(e, displacement, with_tangent)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variational::VariationalElementKind;
    use approx::assert_relative_eq;

    fn unit_tet() -> (Vec<Vector3<f64>>, VariationalElement) {
        let element = VariationalElement::new(VariationalElementKind::P2Tetrahedron).unwrap();
        let rest = element.reference_nodes().iter().map(|x| x * 2.0).collect();
        (rest, element)
    }

    #[test]
    fn body_force_integrates_to_total_load() {
        let (rest, element) = unit_tet();
        let material = MaterialModel::from_name("SaintVenantKirchhoff", 3000.0, 0.3).unwrap();
        let mut ff = VariationalForceField::new(element, vec![(0..10).collect()], material)
            .with_body_force(Vector3::new(0.0, -3.0, 0.0));
        ff.init(&rest).unwrap();
        let sys = ff.assemble(&DVector::zeros(30), false).unwrap();
        // Residual carries -∫B: total -(volume · B)
        let total_y: f64 = (0..10).map(|a| sys.force[3 * a + 1]).sum();
        assert_relative_eq!(total_y, 3.0 * 8.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn tangent_matches_finite_differences() {
        let (rest, element) = unit_tet();
        for name in ["NeoHookean", "FiberReinforced"] {
            let material = MaterialModel::from_name(name, 3000.0, 0.3).unwrap();
            let mut ff = VariationalForceField::new(element.clone(), vec![(0..10).collect()], material);
            ff.init(&rest).unwrap();

            let u = DVector::from_fn(30, |i, _| 1e-3 * ((i * 11 % 7) as f64 - 3.0));
            let k = nalgebra::DMatrix::from(&ff.assemble(&u, true).unwrap().tangent_csr().unwrap());
            let scale = k.amax();
            let h = 1e-7;
            for col in [1, 9, 17, 28] {
                let mut up = u.clone();
                let mut um = u.clone();
                up[col] += h;
                um[col] -= h;
                let fd = (ff.assemble(&up, false).unwrap().force - ff.assemble(&um, false).unwrap().force)
                    / (2.0 * h);
                for row in 0..30 {
                    assert!(
                        (k[(row, col)] - fd[row]).abs() < 1e-5 * scale,
                        "{}: K[{}, {}] = {} vs fd {}",
                        name,
                        row,
                        col,
                        k[(row, col)],
                        fd[row]
                    );
                }
            }
        }
    }

    #[test]
    fn tangent_is_symmetric() {
        let (rest, element) = unit_tet();
        let material = MaterialModel::from_name("NeoHookean", 3000.0, 0.3).unwrap();
        let mut ff = VariationalForceField::new(element, vec![(0..10).collect()], material);
        ff.init(&rest).unwrap();
        let u = DVector::from_fn(30, |i, _| 0.02 * ((i % 4) as f64 - 1.5));
        let k = nalgebra::DMatrix::from(&ff.assemble(&u, true).unwrap().tangent_csr().unwrap());
        assert_relative_eq!(k, k.transpose(), epsilon = 1e-9, max_relative = 1e-10);
    }
}

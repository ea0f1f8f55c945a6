//! Total Lagrangian hyperelastic force field on native elements.
//!
//! At each integration point, with `g_a = ∇N_a` in rest coordinates:
//!
//! ```text
//! B_a = [ F_0x g_x            F_1x g_x            F_2x g_x           ]   xx
//!       [ F_0y g_y            F_1y g_y            F_2y g_y           ]   yy
//!       [ F_0z g_z            F_1z g_z            F_2z g_z           ]   zz
//!       [ F_0x g_y + F_0y g_x ...                                    ]   xy
//!       [ F_0y g_z + F_0z g_y ...                                    ]   yz
//!       [ F_0x g_z + F_0z g_x ...                                    ]   zx
//!
//! f_a  = ∫ B_aᵀ S dV
//! K_ab = ∫ B_aᵀ D B_b dV + ∫ (g_a · S g_b) I dV
//! ```

use nalgebra::{DVector, Matrix3, Matrix6x3, Vector3};

use super::{ForceField, GaussData, cell_displacements, deformation_gradient, precompute};
use crate::assembly::{AssembledSystem, ElementContribution, assemble_elements};
use crate::elements::{Element, native_element};
use crate::error::{Result, SolverError};
use crate::materials::{HyperelasticLaw, Kinematics, MaterialModel, VOIGT_PAIRS, to_voigt};
use crate::mesh::{DOFS_PER_NODE, ElementType};

/// Strain-displacement matrix of node `a`
fn b_matrix(f: &Matrix3<f64>, g: &Vector3<f64>) -> Matrix6x3<f64> {
    Matrix6x3::from_fn(|v, i| {
        let (p, q) = VOIGT_PAIRS[v];
        if p == q {
            f[(i, p)] * g[p]
        } else {
            f[(i, p)] * g[q] + f[(i, q)] * g[p]
        }
    })
}

pub struct HyperelasticForceField {
    element: Box<dyn Element>,
    cells: Vec<Vec<usize>>,
    material: MaterialModel,
    gauss: Vec<Vec<GaussData>>,
    num_dofs: usize,
}

impl HyperelasticForceField {
    pub fn new(element_type: ElementType, cells: Vec<Vec<usize>>, material: MaterialModel) -> Self {
        Self {
            element: native_element(element_type),
            cells,
            material,
            gauss: Vec::new(),
            num_dofs: 0,
        }
    }

    pub fn material(&self) -> &MaterialModel {
        &self.material
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
            let s_voigt = to_voigt(&s);
            let b: Vec<Matrix6x3<f64>> = gp.gradients.iter().map(|g| b_matrix(&f, g)).collect();

            for (a, ba) in b.iter().enumerate() {
                let fa = ba.transpose() * s_voigt * gp.weight;
                for i in 0..DOFS_PER_NODE {
                    out.force[DOFS_PER_NODE * a + i] += fa[i];
                }
            }

            if let Some(stiffness) = out.stiffness.as_mut() {
                let d = self.material.elasticity(&k);
                let db: Vec<Matrix6x3<f64>> = b.iter().map(|bb| d * bb).collect();
                for (a, (ba, ga)) in b.iter().zip(&gp.gradients).enumerate() {
                    let sg = s * ga;
                    for (c, (dbc, gc)) in db.iter().zip(&gp.gradients).enumerate() {
                        let material = ba.transpose() * dbc;
                        let geometric = sg.dot(gc);
                        for i in 0..DOFS_PER_NODE {
                            for j in 0..DOFS_PER_NODE {
                                let mut v = material[(i, j)];
                                if i == j {
                                    v += geometric;
                                }
                                stiffness[(DOFS_PER_NODE * a + i, DOFS_PER_NODE * c + j)] +=
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

impl ForceField for HyperelasticForceField {
    fn name(&self) -> &'static str {
        "HyperelasticForceField"
    }

    fn init(&mut self, rest: &[Vector3<f64>]) -> Result<()> {
        for (e, cell) in self.cells.iter().enumerate() {
            if cell.len() != self.element.num_nodes() {
                return Err(SolverError::Mesh(format!(
                    "cell {} has {} nodes, {} expects {}",
                    e,
                    cell.len(),
                    self.element.name(),
                    self.element.num_nodes()
                )));
            }
        }
        self.gauss = precompute(self.element.as_ref(), rest, &self.cells)?;
        self.num_dofs = rest.len() * DOFS_PER_NODE;
        log::debug!(
            "{}: {} {} cells, {} material",
            self.name(),
            self.cells.len(),
            self.element.name(),
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

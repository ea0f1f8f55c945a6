use std::sync::Arc;

use nalgebra::{DVector, Vector3};
use serde::{Deserialize, Serialize};

use super::constraints::{ConstantForceField, FixedConstraint};
use crate::bc_builder::BCBuilder;
use crate::boundary_conditions::BoundaryConditions;
use crate::error::{Result, SolverError};
use crate::forcefield::ForceField;
use crate::mesh::{DOFS_PER_NODE, Mesh};
use crate::nonlinear_solver::{NonlinearConfig, NonlinearResults, NonlinearSolver};

/// Rest positions and the current displacement of a node's points
#[derive(Debug, Clone)]
pub struct MechanicalObject {
    rest: Vec<Vector3<f64>>,
    displacement: DVector<f64>,
}

impl MechanicalObject {
    pub fn new(rest: Vec<Vector3<f64>>) -> Self {
        let displacement = DVector::zeros(rest.len() * DOFS_PER_NODE);
        Self { rest, displacement }
    }

    pub fn num_points(&self) -> usize {
        self.rest.len()
    }

    pub fn rest_positions(&self) -> &[Vector3<f64>] {
        &self.rest
    }

    pub fn displacement(&self) -> &DVector<f64> {
        &self.displacement
    }

    /// Displacement of point `i`
    pub fn point_displacement(&self, i: usize) -> Vector3<f64> {
        self.displacement.fixed_rows::<3>(DOFS_PER_NODE * i).into_owned()
    }

    /// Rest positions plus displacement
    pub fn positions(&self) -> Vec<Vector3<f64>> {
        (0..self.rest.len())
            .map(|i| self.rest[i] + self.point_displacement(i))
            .collect()
    }
}

/// Newton settings of a node's static solve
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticSolver {
    pub newton: NonlinearConfig,
}

/// One simulation subgraph: state, topology, force field, boundary conditions and solver
pub struct SimulationNode {
    name: String,
    topology: Arc<Mesh>,
    state: MechanicalObject,
    forcefield: Box<dyn ForceField>,
    fixed: Vec<FixedConstraint>,
    loads: Vec<ConstantForceField>,
    solver: StaticSolver,
    bcs: BoundaryConditions,
    last_result: Option<NonlinearResults>,
}

impl SimulationNode {
    pub fn new(name: impl Into<String>, topology: Arc<Mesh>, forcefield: Box<dyn ForceField>) -> Self {
        let state = MechanicalObject::new(topology.positions());
        Self {
            name: name.into(),
            topology,
            state,
            forcefield,
            fixed: Vec::new(),
            loads: Vec::new(),
            solver: StaticSolver::default(),
            bcs: BoundaryConditions::new(),
            last_result: None,
        }
    }

    pub fn with_solver(mut self, solver: StaticSolver) -> Self {
        self.solver = solver;
        self
    }

    pub fn with_fixed(mut self, fixed: FixedConstraint) -> Self {
        self.fixed.push(fixed);
        self
    }

    pub fn with_load(mut self, load: ConstantForceField) -> Self {
        self.loads.push(load);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn topology(&self) -> &Mesh {
        &self.topology
    }

    pub fn state(&self) -> &MechanicalObject {
        &self.state
    }

    pub fn forcefield(&self) -> &dyn ForceField {
        self.forcefield.as_ref()
    }

    pub fn boundary_conditions(&self) -> &BoundaryConditions {
        &self.bcs
    }

    /// Result of the latest static solve
    pub fn last_result(&self) -> Option<&NonlinearResults> {
        self.last_result.as_ref()
    }

    /// Cache rest data in the force field and build the boundary conditions.
    pub fn init(&mut self) -> Result<()> {
        self.forcefield.init(self.state.rest_positions())?;
        let mut builder = BCBuilder::new(&self.topology);
        for fixed in &self.fixed {
            builder = builder.fix_set(&fixed.node_set());
        }
        for load in &self.loads {
            let force = load
                .nodal_force()
                .ok_or_else(|| SolverError::Mesh(format!("{}: load region holds no point", self.name)))?;
            builder = builder.load_nodes(&load.node_set(), force);
        }
        self.bcs = builder.build()?;
        let stats = self.bcs.statistics();
        log::info!(
            "{}: {} points, {} fixed, {} loaded, {}",
            self.name,
            self.state.num_points(),
            stats.num_displacement_bcs,
            stats.num_concentrated_loads,
            self.forcefield.name()
        );
        Ok(())
    }

    /// Static solve from the current state. A solve that runs out of Newton
    /// iterations still updates the state.
    pub fn solve_static(&mut self) -> Result<&NonlinearResults> {
        let results = NonlinearSolver::new(self.forcefield.as_ref(), &self.bcs, self.solver.newton)
            .solve(self.state.displacement.clone())?;
        if !results.converged {
            log::warn!(
                "{}: static solve stopped after {} iterations (|R| = {:.3e})",
                self.name,
                results.num_iterations,
                results.residual_norm
            );
        }
        self.state.displacement = results.displacement.clone();
        Ok(self.last_result.insert(results))
    }
}

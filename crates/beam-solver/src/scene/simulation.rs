use super::node::SimulationNode;
use crate::error::{Result, SolverError};

/// Default time step of a scene
pub const DEFAULT_DT: f64 = 0.01;

/// Hooks called by [`Simulation`] around initialisation and every step
pub trait Controller {
    fn on_init_done(&mut self, _nodes: &[SimulationNode]) -> Result<()> {
        Ok(())
    }

    fn on_animate_begin(&mut self, _time: f64, _nodes: &[SimulationNode]) -> Result<()> {
        Ok(())
    }

    fn on_animate_end(&mut self, _time: f64, _nodes: &[SimulationNode]) -> Result<()> {
        Ok(())
    }
}

impl Controller for () {}

/// Root of a scene: subgraph nodes stepped in insertion order
pub struct Simulation<C: Controller = ()> {
    nodes: Vec<SimulationNode>,
    controller: C,
    dt: f64,
    time: f64,
    steps: usize,
    initialized: bool,
}

impl<C: Controller> Simulation<C> {
    pub fn new(controller: C) -> Self {
        Self {
            nodes: Vec::new(),
            controller,
            dt: DEFAULT_DT,
            time: 0.0,
            steps: 0,
            initialized: false,
        }
    }

    pub fn with_dt(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    pub fn add_node(&mut self, node: SimulationNode) {
        self.nodes.push(node);
    }

    pub fn nodes(&self) -> &[SimulationNode] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Result<&SimulationNode> {
        self.nodes
            .iter()
            .find(|n| n.name() == name)
            .ok_or_else(|| SolverError::UnknownNode(name.to_string()))
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn into_controller(self) -> C {
        self.controller
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Initialise every node, then notify the controller.
    pub fn init(&mut self) -> Result<()> {
        for node in &mut self.nodes {
            node.init()?;
        }
        self.initialized = true;
        self.controller.on_init_done(&self.nodes)
    }

    /// One step: a static solve per node, then the end-of-step event.
    pub fn animate(&mut self) -> Result<()> {
        if !self.initialized {
            self.init()?;
        }
        self.controller.on_animate_begin(self.time, &self.nodes)?;
        for node in &mut self.nodes {
            let iterations = node.solve_static()?.num_iterations;
            log::debug!("step {} {}: {} Newton iterations", self.steps + 1, node.name(), iterations);
        }
        self.time += self.dt;
        self.steps += 1;
        self.controller.on_animate_end(self.time, &self.nodes)
    }

    pub fn run(&mut self, steps: usize) -> Result<()> {
        for _ in 0..steps {
            self.animate()?;
        }
        log::info!("ran {} steps, t = {:.3}", steps, self.time);
        Ok(())
    }
}

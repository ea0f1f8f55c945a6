//! Reduced mesh-convergence sweep of the fiber-reinforced beam

use beam_solver::convergence::{result_path, solve_resolution};
use beam_solver::{ConvergenceConfig, NonlinearConfig, SolverError, run_convergence_study};

fn reduced(dir: &std::path::Path, nz_values: Vec<usize>) -> ConvergenceConfig {
    ConvergenceConfig {
        nx: 2,
        ny: 2,
        nz_values,
        output_dir: dir.to_path_buf(),
        ..ConvergenceConfig::default()
    }
}

#[test]
fn sweep_writes_one_converged_value_per_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let config = reduced(dir.path(), vec![2, 4, 8, 16]);
    assert_eq!(config.reported_axis, 2);
    let points = run_convergence_study(&config).unwrap();
    assert_eq!(points.len(), 4);

    for p in &points {
        // (nx + 1)(ny + 1)(nz + 1) vertices, three components each
        assert_eq!(p.num_dofs, 3 * 9 * (p.nz + 1));
        let path = result_path(dir.path(), p.num_dofs);
        assert_eq!(p.path.as_deref(), Some(path.as_path()));
        let written = beam_io::read_scalar_result(&path).unwrap();
        assert_eq!(written, p.min_displacement);
        // The rest stress of the fiber law shortens the beam
        assert!(p.min_displacement < 0.0);
        assert!(p.newton_iterations >= 1);
    }
}

#[test]
fn minimum_settles_under_refinement() {
    let dir = tempfile::tempdir().unwrap();
    let points = run_convergence_study(&reduced(dir.path(), vec![2, 4, 8, 16])).unwrap();
    let d: Vec<f64> = points.iter().map(|p| p.min_displacement).collect();

    let steps: Vec<f64> = d.windows(2).map(|w| w[1] - w[0]).collect();
    assert!(
        steps.iter().all(|&s| s > 0.0) || steps.iter().all(|&s| s < 0.0),
        "minimum displacements {:?} are not monotone",
        d
    );
    for w in steps.windows(2) {
        assert!(w[1].abs() < w[0].abs(), "minimum displacements {:?}", d);
    }
}

#[test]
fn unconverged_resolution_is_not_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = ConvergenceConfig {
        newton: NonlinearConfig {
            max_iterations: 1,
            ..NonlinearConfig::incremental(1e-12, 1e-14)
        },
        ..reduced(dir.path(), vec![2])
    };

    let solution = solve_resolution(&config, 2).unwrap();
    assert!(!solution.results.converged);

    let err = run_convergence_study(&config).unwrap_err();
    assert!(matches!(err, SolverError::NotConverged { iterations: 1, .. }));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn reported_axis_selects_the_component() {
    let dir = tempfile::tempdir().unwrap();
    let config = reduced(dir.path(), vec![2]);
    let solution = solve_resolution(&config, 2).unwrap();
    assert!(solution.results.converged);
    let u = &solution.results.displacement;

    let along_y = ConvergenceConfig {
        reported_axis: 1,
        ..config.clone()
    };
    let by_z = run_convergence_study(&config).unwrap()[0].min_displacement;
    let by_y = run_convergence_study(&along_y).unwrap()[0].min_displacement;
    assert_eq!(by_z, beam_solver::convergence::min_component(u, 2));
    assert_eq!(by_y, beam_solver::convergence::min_component(u, 1));
}

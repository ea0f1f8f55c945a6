//! Native and variational backends on the same beam
//!
//! Both force fields integrate at the same physical points, so on any mesh and
//! load their Newton iterates coincide up to round-off.

use std::path::PathBuf;

use beam_io::CellKind;
use beam_solver::comparison::{NATIVE_NODE, VARIATIONAL_NODE, build_comparison_scene};
use beam_solver::mesh_builder::{BoxMesh, MeshBuilder};
use beam_solver::ordering::{TETRA_P1, TETRA_P2};
use beam_solver::variational::TET_EDGES;
use beam_solver::{
    ComparisonConfig, ComparisonController, ElementConfig, ElementFamily, MaterialConfig, reorder_cells, run_comparison,
    run_comparison_with,
};
use nalgebra::Vector3;

fn small_beam(element: ElementFamily, degree: u8, model: &str, force: f64) -> ComparisonConfig {
    ComparisonConfig {
        element: ElementConfig::new(element, degree),
        material: MaterialConfig {
            model: model.to_string(),
            ..MaterialConfig::default()
        },
        total_force: [0.0, force, 0.0],
        mesh_dir: PathBuf::from("/nonexistent/meshes"),
        fallback_mesh: BoxMesh {
            min: [-7.5, -7.5, 0.0],
            max: [7.5, 7.5, 80.0],
            divisions: [1, 1, 4],
        },
        steps: 2,
        ..ComparisonConfig::default()
    }
}

#[test]
fn zero_load_gives_exactly_zero_error() {
    let config = small_beam(ElementFamily::Tetrahedron, 1, "NeoHookean", 0.0);
    let report = run_comparison(&config, None).unwrap();
    assert_eq!(report.history, vec![0.0, 0.0]);
    assert_eq!(report.final_error(), 0.0);
}

#[test]
fn backends_agree_for_every_element_and_material() {
    let cases = [
        (ElementFamily::Tetrahedron, 1),
        (ElementFamily::Tetrahedron, 2),
        (ElementFamily::Hexahedron, 1),
        (ElementFamily::Hexahedron, 2),
    ];
    for (family, degree) in cases {
        for model in ["SaintVenantKirchhoff", "NeoHookean"] {
            let config = small_beam(family, degree, model, -200.0);
            let report = run_comparison(&config, None).unwrap();
            assert_eq!(report.history.len(), 2);
            assert!(
                report.native_min_displacement[1] < -1e-3,
                "{:?} P{} {}: beam did not bend ({:?})",
                family,
                degree,
                model,
                report.native_min_displacement
            );
            assert!(
                report.final_error() < 1e-8,
                "{:?} P{} {}: mean relative error {:e}",
                family,
                degree,
                model,
                report.final_error()
            );
            for c in 0..3 {
                let (a, b) = (report.native_min_displacement[c], report.variational_min_displacement[c]);
                assert!((a - b).abs() <= 1e-8 * a.abs().max(1.0));
            }
        }
    }
}

#[test]
fn fixed_end_points_do_not_move() {
    let config = small_beam(ElementFamily::Hexahedron, 1, "NeoHookean", -100.0);
    let resolved = config.element.resolve().unwrap();
    let data = config.fallback_mesh.generate(resolved.cell_kind).unwrap();
    let mesh = std::sync::Arc::new(MeshBuilder::build_from_data(&data, resolved.cell_kind).unwrap());
    let mut sim = build_comparison_scene(&config, &resolved, mesh, ComparisonController::new()).unwrap();
    sim.run(1).unwrap();

    for name in [NATIVE_NODE, VARIATIONAL_NODE] {
        let node = sim.node(name).unwrap();
        let fixed = config.fixed_roi.indices(node.state().rest_positions());
        assert_eq!(fixed.len(), 4);
        for i in fixed {
            assert_eq!(node.state().point_displacement(i), Vector3::zeros());
        }
        assert!(node.last_result().unwrap().converged);
    }
    assert_eq!(sim.controller().history().len(), 1);
}

#[test]
fn fiber_material_is_rejected() {
    let config = small_beam(ElementFamily::Tetrahedron, 1, "FiberReinforced", -1.0);
    assert!(run_comparison(&config, None).is_err());
}

#[test]
fn unsupported_degree_is_rejected() {
    let config = small_beam(ElementFamily::Tetrahedron, 3, "NeoHookean", -1.0);
    assert!(run_comparison(&config, None).is_err());
}

#[test]
fn tetra_p1_cells_are_unchanged() {
    let data = BoxMesh::new([0.0; 3], [1.0; 3], [1, 1, 1]).unwrap().tetrahedra();
    let cells = data.cells_of(CellKind::Tetra).unwrap();
    assert_eq!(reorder_cells(cells, &TETRA_P1), cells.to_vec());
}

#[test]
fn tetra_p2_cells_follow_the_variational_edges() {
    let data = BoxMesh::new([0.0; 3], [1.0; 3], [1, 1, 1]).unwrap().generate(CellKind::Tetra10).unwrap();
    let cells = data.cells_of(CellKind::Tetra10).unwrap();
    let reordered = reorder_cells(cells, &TETRA_P2);
    let point = |i: usize| Vector3::from(data.points[i]);

    for (native, variational) in cells.iter().zip(&reordered) {
        let expected: Vec<usize> = [0, 1, 2, 3, 9, 8, 5, 7, 6, 4].iter().map(|&k| native[k]).collect();
        assert_eq!(variational, &expected);
        for (e, &(a, b)) in TET_EDGES.iter().enumerate() {
            let mid = (point(variational[a]) + point(variational[b])) * 0.5;
            assert!((point(variational[4 + e]) - mid).norm() < 1e-12);
        }
    }
}

#[test]
fn exported_displacements_are_written() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_beam(ElementFamily::Tetrahedron, 1, "SaintVenantKirchhoff", -50.0);
    run_comparison(&config, Some(dir.path())).unwrap();
    for name in [NATIVE_NODE, VARIATIONAL_NODE] {
        let path = dir.path().join(format!("{}.vtk", name));
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("displacement"));
    }
}

#[test]
fn quiet_controller_still_records_every_step() {
    let config = small_beam(ElementFamily::Hexahedron, 1, "NeoHookean", -50.0);
    let report = run_comparison_with(&config, None, ComparisonController::new().quiet()).unwrap();
    assert_eq!(report.history.len(), config.steps);
    assert!(report.final_error() < 1e-8);
}

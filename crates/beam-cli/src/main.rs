use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use beam_io::{CellKind, VtkWriter};
use beam_solver::{
    BoxMesh, ComparisonConfig, ComparisonController, ConvergenceConfig, ElementFamily, load_config,
    run_comparison_with, run_convergence_study, save_config,
};
use clap::{ArgEnum, Parser, Subcommand};

const ABOUT: &str = "
Hyperelastic cantilever beam studies: native-vs-variational backend comparison and
mesh convergence of a fiber-reinforced beam.";

#[derive(Parser)]
#[clap(author, about = ABOUT, name = "beam-cli")]
struct Opt {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ArgEnum)]
enum Family {
    Tet,
    Hex,
}

impl From<Family> for ElementFamily {
    fn from(family: Family) -> Self {
        match family {
            Family::Tet => ElementFamily::Tetrahedron,
            Family::Hex => ElementFamily::Hexahedron,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Step the native and variational backends side by side and print the
    /// mean relative displacement error after every step.
    Compare {
        /// JSON settings layered over the built-in defaults.
        #[clap(short, long, parse(from_os_str))]
        config: Option<PathBuf>,

        /// Element family of the beam mesh.
        #[clap(long, arg_enum)]
        element: Option<Family>,

        /// Approximation degree (1 or 2).
        #[clap(long)]
        degree: Option<u8>,

        /// Material model: SaintVenantKirchhoff or NeoHookean.
        #[clap(long)]
        material: Option<String>,

        /// Number of animation steps.
        #[clap(short, long)]
        steps: Option<usize>,

        /// Directory receiving the displacement of each backend as legacy VTK.
        #[clap(long, parse(from_os_str))]
        export: Option<PathBuf>,

        /// Print the final report as JSON.
        #[clap(long)]
        json: bool,
    },

    /// Solve the fiber-reinforced beam for every resolution and write one
    /// minimum displacement per resolution.
    Convergence {
        /// JSON settings layered over the built-in defaults.
        #[clap(short, long, parse(from_os_str))]
        config: Option<PathBuf>,

        /// Divisions along the beam axis, overriding the configured sweep.
        #[clap(long, multiple_values = true)]
        nz: Vec<usize>,

        /// Directory receiving `displacement_<num_dofs>.txt`.
        #[clap(short, long, parse(from_os_str))]
        output_dir: Option<PathBuf>,
    },

    /// Generate the four comparison meshes `beam_{p1,p2,q1,q2}.vtk`.
    Mesh {
        #[clap(short, long, parse(from_os_str), default_value = "./meshes")]
        dir: PathBuf,

        #[clap(long, default_value = "3")]
        nx: usize,

        #[clap(long, default_value = "3")]
        ny: usize,

        #[clap(long, default_value = "20")]
        nz: usize,
    },

    /// Write the default settings of both studies as JSON.
    Defaults {
        #[clap(short, long, parse(from_os_str), default_value = ".")]
        dir: PathBuf,
    },
}

pub fn main() {
    if let Err(err) = try_main() {
        eprintln!("{:#}", err);
        std::process::exit(1);
    }
}

pub fn try_main() -> Result<()> {
    let _ = env_logger::Builder::from_env("BEAM_LOG").try_init();

    let opt = Opt::parse();
    match opt.command {
        Command::Compare {
            config,
            element,
            degree,
            material,
            steps,
            export,
            json,
        } => {
            let mut settings: ComparisonConfig = load_config(config.as_deref())?;
            if let Some(element) = element {
                settings.element.element = element.into();
            }
            if let Some(degree) = degree {
                settings.element.degree = degree;
            }
            if let Some(material) = material {
                settings.material.model = material;
            }
            if let Some(steps) = steps {
                settings.steps = steps;
            }
            compare(&settings, export.as_deref(), json)
        }
        Command::Convergence {
            config,
            nz,
            output_dir,
        } => {
            let mut settings: ConvergenceConfig = load_config(config.as_deref())?;
            if !nz.is_empty() {
                settings.nz_values = nz;
            }
            if let Some(dir) = output_dir {
                settings.output_dir = dir;
            }
            let points = run_convergence_study(&settings)?;
            log::info!("{} resolutions written to {}", points.len(), settings.output_dir.display());
            Ok(())
        }
        Command::Mesh { dir, nx, ny, nz } => write_meshes(&dir, [nx, ny, nz]),
        Command::Defaults { dir } => {
            save_config(&dir.join("comparison.json"), &ComparisonConfig::default())?;
            save_config(&dir.join("convergence.json"), &ConvergenceConfig::default())?;
            Ok(())
        }
    }
}

fn compare(settings: &ComparisonConfig, export: Option<&Path>, json: bool) -> Result<()> {
    if let Some(dir) = export {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    let report = run_comparison_with(settings, export, controller(json))?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        log::info!(
            "{} / {} on {} points: final mean relative error {:e}",
            report.native_element,
            report.variational_element,
            report.num_points,
            report.final_error()
        );
    }
    Ok(())
}

/// Quiet when stdout carries the JSON report
fn controller(json: bool) -> ComparisonController {
    if json {
        ComparisonController::new().quiet()
    } else {
        ComparisonController::new()
    }
}

/// The comparison beam in every cell kind, written next to each other.
fn write_meshes(dir: &Path, divisions: [usize; 3]) -> Result<()> {
    let defaults = ComparisonConfig::default().fallback_mesh;
    let beam = BoxMesh::new(defaults.min, defaults.max, divisions)?;
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let kinds = [
        ("beam_p1.vtk", CellKind::Tetra),
        ("beam_p2.vtk", CellKind::Tetra10),
        ("beam_q1.vtk", CellKind::Hexahedron),
        ("beam_q2.vtk", CellKind::Hexahedron20),
    ];
    for (name, kind) in kinds {
        let data = beam.generate(kind)?;
        let path = dir.join(name);
        VtkWriter::new(&data)
            .with_title(format!("cantilever beam, {}", kind.name()))
            .write_vtk(&path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("{}: {} points, {} cells", path.display(), data.points.len(), data.num_cells());
    }
    Ok(())
}

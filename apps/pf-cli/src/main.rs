use clap::{Parser, Subcommand};
use pf_assembly::{newton_solve, CcAssembler, NewtonConfig, TimeContext};
use pf_core::Real;
use pf_flux::{isotropic, CacheFiller, FaceBc, FillContext, MpfaFiller, TpfaFiller};
use pf_grid::{CartesianGrid, SubControlVolume, SubControlVolumeFace};
use pf_models::{
    BoundaryTypes, CellCenterModel, EvalContext, Problem, SinglePhaseDarcy, VolumeVariables,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Assembly(#[from] pf_assembly::AssemblyError),
    #[error(transparent)]
    Model(#[from] pf_models::ModelError),
    #[error(transparent)]
    Flux(#[from] pf_flux::FluxError),
    #[error(transparent)]
    Grid(#[from] pf_grid::GridError),
    #[error("cannot read scenario file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed scenario file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("solver did not converge: residual norm {norm}")]
    NotConverged { norm: Real },
}

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "porousflow CLI - finite-volume assembly demos", long_about = None)]
struct Cli {
    /// Print wall-clock timings of the assembly hot paths
    #[arg(long, global = true)]
    timing: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a single-phase Darcy pressure drop and report the outlet flux
    Darcy {
        /// Path to a JSON scenario file; omitted, a water-through-sand
        /// channel is used
        #[arg(long)]
        scenario: Option<PathBuf>,
        /// Skip Jacobian recomputation for quiet elements
        #[arg(long)]
        partial_reassembly: bool,
    },
    /// Uniform-boundary patch check of the multi-point scheme on a
    /// heterogeneous medium
    Patch {
        #[arg(long, default_value_t = 6)]
        nx: usize,
        #[arg(long, default_value_t = 6)]
        ny: usize,
        /// Uniform Dirichlet boundary pressure
        #[arg(long, default_value_t = 1.0e5)]
        pressure: Real,
    },
}

#[derive(Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DarcyScenario {
    nx: usize,
    ny: usize,
    length: Real,
    height: Real,
    permeability: Real,
    viscosity: Real,
    inlet_pressure: Real,
    outlet_pressure: Real,
}

impl Default for DarcyScenario {
    fn default() -> Self {
        Self {
            nx: 10,
            ny: 1,
            length: 1.0,
            height: 1.0,
            permeability: 1e-12,
            viscosity: 1e-3,
            inlet_pressure: 1.0e5,
            outlet_pressure: 0.5e5,
        }
    }
}

struct DarcyProblem {
    scenario: DarcyScenario,
}

impl Problem for DarcyProblem {
    fn boundary_types(&self, scvf: &SubControlVolumeFace) -> BoundaryTypes {
        if scvf.direction_index() == 0 {
            BoundaryTypes::all_dirichlet(1)
        } else {
            BoundaryTypes::all_neumann(1)
        }
    }
    fn dirichlet(&self, scvf: &SubControlVolumeFace, _eq: usize) -> Real {
        if scvf.center().x < 0.5 * self.scenario.length {
            self.scenario.inlet_pressure
        } else {
            self.scenario.outlet_pressure
        }
    }
    fn neumann(&self, _scvf: &SubControlVolumeFace, _eq: usize) -> Real {
        0.0
    }
    fn source(&self, _scv: &SubControlVolume, _eq: usize) -> Real {
        0.0
    }
}

struct PatchProblem {
    pressure: Real,
}

impl Problem for PatchProblem {
    fn boundary_types(&self, _scvf: &SubControlVolumeFace) -> BoundaryTypes {
        BoundaryTypes::all_dirichlet(1)
    }
    fn dirichlet(&self, _scvf: &SubControlVolumeFace, _eq: usize) -> Real {
        self.pressure
    }
    fn neumann(&self, _scvf: &SubControlVolumeFace, _eq: usize) -> Real {
        0.0
    }
    fn source(&self, _scv: &SubControlVolume, _eq: usize) -> Real {
        0.0
    }
}

/// Deterministic per-cell permeability spread over two orders of magnitude.
fn heterogeneous_permeability(cell: usize) -> Real {
    let mut state = cell as u64 ^ 0x9e37_79b9_7f4a_7c15;
    state ^= state << 13;
    state ^= state >> 7;
    state ^= state << 17;
    let unit = (state % 1000) as Real / 1000.0;
    1e-13 * (1.0 + 99.0 * unit)
}

fn load_scenario(path: Option<&Path>) -> Result<DarcyScenario, CliError> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&text)?)
        }
        None => Ok(DarcyScenario::default()),
    }
}

fn cmd_darcy(scenario: Option<&Path>, partial_reassembly: bool) -> Result<(), CliError> {
    let scenario = load_scenario(scenario)?;
    tracing::info!(nx = scenario.nx, ny = scenario.ny, "darcy scenario");
    let grid = CartesianGrid::new(scenario.nx, scenario.ny, scenario.length, scenario.height)?;
    let problem = DarcyProblem { scenario };
    let model = SinglePhaseDarcy;
    let filler = TpfaFiller::new();
    let k = problem.scenario.permeability;
    let mu = problem.scenario.viscosity;
    let perm = move |_: usize| isotropic(k);
    let vol_vars_of = move |_: usize, pressure: Real| VolumeVariables {
        pressure,
        viscosity: mu,
        ..Default::default()
    };

    let mut assembler =
        CcAssembler::new(&grid, &problem, &model, &filler, &perm, &vol_vars_of)?;
    assembler.enable_partial_reassembly(partial_reassembly);
    let n = grid.num_cells();
    let mean = 0.5 * (problem.scenario.inlet_pressure + problem.scenario.outlet_pressure);
    let outcome = newton_solve(
        &mut assembler,
        vec![mean; n],
        &TimeContext::Stationary,
        &NewtonConfig::default(),
    )?;
    if !outcome.converged {
        return Err(CliError::NotConverged {
            norm: outcome.residual_norm,
        });
    }

    let flux = outlet_flux(&grid, &problem, &outcome.x, &perm, &vol_vars_of)?;
    let analytic = k * (problem.scenario.inlet_pressure - problem.scenario.outlet_pressure)
        / (mu * problem.scenario.length)
        * problem.scenario.height;
    println!(
        "converged in {} iterations, residual norm {:.3e}",
        outcome.iterations, outcome.residual_norm
    );
    println!("outlet flux {flux:.6e} m^3/s (analytic {analytic:.6e})");
    Ok(())
}

/// Mass flux leaving through the outlet boundary, summed over the
/// right-side boundary faces.
fn outlet_flux(
    grid: &CartesianGrid,
    problem: &DarcyProblem,
    solution: &[Real],
    perm: &dyn pf_flux::PermeabilityField,
    vol_vars_of: &dyn Fn(usize, Real) -> VolumeVariables,
) -> Result<Real, CliError> {
    let model = SinglePhaseDarcy;
    let filler = TpfaFiller::new();
    let mut total = 0.0;
    for cell in 0..grid.num_cells() {
        let fv = grid.bind(cell)?;
        let bc = |scvf: &SubControlVolumeFace| match problem.boundary_types(scvf).kind(0) {
            pf_models::BcKind::Dirichlet => FaceBc::Dirichlet(problem.dirichlet(scvf, 0)),
            _ => FaceBc::Neumann,
        };
        let fill_ctx = FillContext {
            grid,
            fv_geometry: &fv,
            permeability: perm,
            boundary: &bc,
        };
        let caches = filler.fill_element(&fill_ctx)?;
        let vols = |dof: usize| vol_vars_of(dof, solution[dof]);
        let ctx = EvalContext {
            problem,
            grid,
            fv_geometry: &fv,
            vol_vars: &vols,
            face_vars: None,
            flux_caches: &caches,
        };
        for scvf in fv.scvfs() {
            let outlet = scvf.boundary()
                && scvf.direction_index() == 0
                && scvf.center().x > 0.5 * problem.scenario.length;
            if !outlet {
                continue;
            }
            let mut residual = [0.0];
            model.boundary(&ctx, scvf, &mut residual)?;
            total += residual[0];
        }
    }
    Ok(total)
}

fn cmd_patch(nx: usize, ny: usize, pressure: Real) -> Result<(), CliError> {
    let grid = CartesianGrid::new(nx, ny, nx as Real, ny as Real)?;
    let problem = PatchProblem { pressure };
    let model = SinglePhaseDarcy;
    let filler = MpfaFiller::new();
    let perm = |cell: usize| isotropic(heterogeneous_permeability(cell));
    let vol_vars_of = |_: usize, pressure: Real| VolumeVariables {
        pressure,
        viscosity: 1e-3,
        ..Default::default()
    };
    let mut assembler =
        CcAssembler::new(&grid, &problem, &model, &filler, &perm, &vol_vars_of)?;
    let n = grid.num_cells();
    let outcome = newton_solve(
        &mut assembler,
        vec![0.0; n],
        &TimeContext::Stationary,
        &NewtonConfig::default(),
    )?;
    if !outcome.converged {
        return Err(CliError::NotConverged {
            norm: outcome.residual_norm,
        });
    }
    let deviation = outcome
        .x
        .iter()
        .map(|p| (p - pressure).abs())
        .fold(0.0, Real::max);
    println!(
        "patch check on {nx}x{ny} cells: max deviation from uniform pressure {deviation:.3e} Pa"
    );
    Ok(())
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    if cli.timing {
        pf_core::timing::enable_timing();
    }
    match cli.command {
        Commands::Darcy {
            scenario,
            partial_reassembly,
        } => cmd_darcy(scenario.as_deref(), partial_reassembly),
        Commands::Patch { nx, ny, pressure } => cmd_patch(nx, ny, pressure),
    }
}

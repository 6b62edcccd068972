// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! scadview CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use nalgebra::Point3;
use scadview::config::parse_grid_unit;
use scadview::{view_stl, Compiler, Error, GridSpec, GridUnit, ViewConfig, ViewOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Parser)]
#[command(name = "scadview")]
#[command(about = "Render OpenSCAD models and view them as interactive three.js scenes", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to ./scadview.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a SCAD file to a mesh
    Render {
        /// Input SCAD file
        input: PathBuf,

        /// Output mesh file
        #[arg(short, long)]
        output: PathBuf,

        /// Path to the OpenSCAD executable
        #[arg(long, value_name = "PATH")]
        openscad: Option<PathBuf>,
    },

    /// Build a scene from a SCAD or STL file
    View {
        /// Input SCAD or STL file
        input: PathBuf,

        /// Output file (.html or .json)
        #[arg(short, long)]
        output: PathBuf,

        /// Grid cell size, 0 to disable, -1 for automatic
        #[arg(short, long, allow_hyphen_values = true, value_parser = grid_unit_arg)]
        grid_unit: Option<f64>,

        /// Pixel width
        #[arg(long)]
        width: Option<u32>,

        /// Pixel height
        #[arg(long)]
        height: Option<u32>,

        /// Hide the coordinate axes
        #[arg(long)]
        no_axes: bool,

        /// Keep the intermediate STL at this path
        #[arg(long, value_name = "FILE")]
        stl: Option<PathBuf>,

        /// Path to the OpenSCAD executable
        #[arg(long, value_name = "PATH")]
        openscad: Option<PathBuf>,
    },

    /// Print the detected OpenSCAD executable
    Locate,

    /// Compute reference grid placement for a bounding box
    Grid {
        /// Minimum corner
        #[arg(long, required = true, num_args = 3, allow_hyphen_values = true, value_names = ["X", "Y", "Z"])]
        min: Vec<f64>,

        /// Maximum corner
        #[arg(long, required = true, num_args = 3, allow_hyphen_values = true, value_names = ["X", "Y", "Z"])]
        max: Vec<f64>,

        /// Grid cell size, -1 for automatic
        #[arg(short, long, default_value = "-1", allow_hyphen_values = true, value_parser = grid_unit_arg)]
        unit: f64,
    },
}

fn grid_unit_arg(value: &str) -> std::result::Result<f64, String> {
    parse_grid_unit(value).map_err(|e| e.to_string())
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    if let Err(e) = run(cli) {
        match e.downcast_ref::<Error>() {
            Some(Error::Compilation(err)) => {
                eprintln!("{}", "❌ OpenSCAD reported an error:".red().bold());
                err.show();
            }
            _ => eprintln!("{} {:#}", "Error:".red().bold(), e),
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => {
            let mut config = ViewConfig::from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_env(|key| std::env::var(key).ok())?;
            config
        }
        None => ViewConfig::load().context("Failed to load configuration")?,
    };

    match cli.command {
        Commands::Render {
            input,
            output,
            openscad,
        } => {
            let compiler = compiler_for(openscad.or_else(|| config.openscad_path.clone()));
            render_command(&compiler, &input, &output, cli.verbose)
        }
        Commands::View {
            input,
            output,
            grid_unit,
            width,
            height,
            no_axes,
            stl,
            openscad,
        } => {
            let mut options = config.to_view_options();
            if let Some(unit) = grid_unit {
                options.grid_unit = unit.into();
            }
            options.width = width.unwrap_or(options.width);
            options.height = height.unwrap_or(options.height);
            options.axes = options.axes && !no_axes;
            options.outfile = stl;
            if openscad.is_some() {
                options.executable = openscad;
            }
            view_command(&input, &output, &options, cli.verbose)
        }
        Commands::Locate => {
            let compiler = compiler_for(config.openscad_path.clone());
            let path = compiler.resolve_executable()?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Grid { min, max, unit } => {
            let grid = grid_command(&min, &max, unit)?;
            println!("{}", serde_json::to_string_pretty(&grid)?);
            Ok(())
        }
    }
}

fn grid_command(min: &[f64], max: &[f64], unit: f64) -> Result<GridSpec> {
    let (min, max) = match (min, max) {
        ([x0, y0, z0], [x1, y1, z1]) => (Point3::new(*x0, *y0, *z0), Point3::new(*x1, *y1, *z1)),
        _ => anyhow::bail!("--min and --max take exactly three coordinates"),
    };

    GridUnit::from_value(unit)
        .grid(min, max)
        .ok_or_else(|| anyhow::anyhow!("Grid unit 0 disables the grid; nothing to compute"))
}

fn compiler_for(executable: Option<PathBuf>) -> Compiler {
    Compiler::new().maybe_executable(executable)
}

fn spinner(message: String) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn render_command(compiler: &Compiler, input: &Path, output: &Path, verbose: bool) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let pb = spinner(format!("Rendering {}", input.display()));
    let start = Instant::now();
    let result = compiler.compile_file(input, output);
    pb.finish_and_clear();
    result?;

    if verbose {
        println!("Rendered in {:.2?}", start.elapsed());
    }
    println!("{} {}", "✅ Wrote".green(), output.display());
    Ok(())
}

fn view_command(input: &Path, output: &Path, options: &ViewOptions, verbose: bool) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let is_stl = input
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("stl"))
        .unwrap_or(false);

    let scene = if is_stl {
        view_stl(input, options)?
    } else {
        let dir = tempfile::TempDir::new()?;
        let stl = options
            .outfile
            .clone()
            .unwrap_or_else(|| dir.path().join("model.stl"));

        let compiler = compiler_for(options.executable.clone());
        render_command(&compiler, input, &stl, verbose)?;
        view_stl(&stl, options)?
    };

    if verbose {
        if let Some(mesh) = scene.mesh() {
            println!("Vertices: {}", mesh.geometry.vertex_count());
        }
        println!("Grid planes: {}", scene.grid_helpers().count());
    }

    let is_json = output
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if is_json {
        std::fs::write(output, scene.to_json_pretty()?)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    } else {
        scene
            .write_html(output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
    }

    println!("{} {}", "✅ Scene written to".green(), output.display());
    Ok(())
}

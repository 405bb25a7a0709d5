mod cli;

use usmkit::pipeline::{
    dispatch, AudioRouting, BatchReport, JoinOutcome, Pipeline, PipelineOptions,
};
use usmkit::provision::{provision, DependencyManifest};

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "usmkit=trace,usmkit_av=debug,usmkit_demux=debug".to_string()
        } else {
            "usmkit=info,usmkit_av=info,usmkit_demux=warn".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .init();

    let Some(command) = cli.command.take() else {
        let _ = Cli::command().print_help();
        return ExitCode::from(1);
    };

    match run(command, &cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => match e.downcast_ref::<usmkit::Error>() {
            Some(err @ usmkit::Error::FileNotFound(_)) => {
                println!("{}. The program will now exit.", err);
                ExitCode::from(2)
            }
            _ => {
                eprintln!("FATAL ERROR: {:?}", e);
                ExitCode::from(255)
            }
        },
    }
}

fn run(command: Commands, cli: &Cli) -> Result<()> {
    match command {
        Commands::Extract {
            path,
            join,
            output_dir,
            clean,
        } => {
            let options = base_options(cli)
                .with_join(join)
                .with_output_dir(output_dir)
                .with_cleanup(clean);
            run_batch(&path, options)
        }
        Commands::Convert {
            path,
            output_dir,
            clean,
        } => {
            let options = base_options(cli)
                .with_join(true)
                .with_output_dir(output_dir)
                .with_cleanup(clean);
            run_batch(&path, options)
        }
        Commands::GetDependencies { manifest } => get_dependencies(&manifest, &cli.tools_dir),
        Commands::CheckTools => check_tools(&cli.tools_dir),
    }
}

fn base_options(cli: &Cli) -> PipelineOptions {
    PipelineOptions::extract()
        .with_strict_dependencies(cli.strict_dependencies)
        .with_config_path(&cli.config)
        .with_tools_dir(&cli.tools_dir)
}

fn run_batch(input: &Path, options: PipelineOptions) -> Result<()> {
    let pipeline = Pipeline::new(options);
    let report = dispatch(input, &pipeline)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &BatchReport) {
    for file in &report.files {
        print!("✓ {}", file.source.display());

        if let AudioRouting::Converted { from, to } = &file.audio {
            print!(" ({} → {})", from, to);
        }

        match &file.join {
            JoinOutcome::Joined { output } => print!(" → {}", output.display()),
            JoinOutcome::Skipped { reason } => print!(" (join skipped: {:?})", reason),
            JoinOutcome::NotRequested => {}
        }

        println!();
    }

    for failure in &report.failures {
        println!("✗ {} - {}", failure.path.display(), failure.error);
    }

    println!();
    println!(
        "Processed {} file(s), {} failed",
        report.total(),
        report.failures.len()
    );
}

fn get_dependencies(manifest_path: &Path, tools_dir: &Path) -> Result<()> {
    let manifest = DependencyManifest::load(manifest_path)?;

    let rt = tokio::runtime::Runtime::new()?;
    let report = rt.block_on(provision(&manifest, tools_dir))?;

    println!("ffmpeg: {}", report.ffmpeg.display());
    println!(
        "vgmstream: {} ({} files)",
        report.vgmstream_dir.display(),
        report.vgmstream_files
    );

    Ok(())
}

fn check_tools(tools_dir: &Path) -> Result<()> {
    println!("Checking external tools...\n");

    let tools = usmkit_av::check_tools(tools_dir);
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Run get-dependencies to download them.");
    }

    Ok(())
}

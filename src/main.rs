use clap::Parser;
use droidmap::cli::commands::{cmd_devices, cmd_explore};
use droidmap::cli::config::{Cli, Commands, build_settings, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // Resolve the adb binary: CLI > config > PATH lookup
    let adb_path = cli.adb_path.as_deref().or(config.adb.path.as_deref());

    match cli.command {
        Commands::Explore {
            device,
            package,
            max_screens,
            max_depth,
            screen_delay,
            back_delay,
            ignore,
            stay_in_app,
            mode,
            seed,
            output_dir,
            trace,
        } => {
            let settings = build_settings(
                max_screens,
                max_depth,
                screen_delay,
                back_delay,
                &ignore,
                stay_in_app,
                mode.as_deref(),
                seed,
                &config.explore,
            );
            cmd_explore(
                &device,
                &package,
                settings,
                &output_dir,
                trace.as_deref(),
                adb_path,
                cli.verbose,
            )?;
        }
        Commands::Devices => {
            cmd_devices(adb_path)?;
        }
    }

    Ok(())
}

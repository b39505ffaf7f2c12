use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use groundtrack::propagator::Propagator;
use groundtrack::scenario::{split_tle_text, OutputFormat, Scenario, ScenarioError};
use groundtrack::tle::{self, ParseOptions};
use groundtrack::trajectory::{sample_trajectory, SampleError, TrajectorySample};
use groundtrack::{Error, GravityModel};

#[derive(Parser)]
#[command(name = "groundtrack")]
#[command(about = "TLE orbit propagation and ground-track sampling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a TLE file and print the decoded elements
    Validate {
        tle: PathBuf,
        /// Skip checksum verification
        #[arg(long)]
        no_checksum: bool,
    },
    /// Propagate a TLE file over a time span
    Propagate {
        tle: PathBuf,
        /// Propagation span (humantime, e.g. 90h)
        #[arg(long, default_value = "24h")]
        duration: String,
        /// Sampling interval (humantime, e.g. 10m)
        #[arg(long, default_value = "10m")]
        step: String,
        /// Gravity model: wgs72old, wgs72 or wgs84
        #[arg(long, default_value = "wgs84")]
        model: GravityModel,
        /// Output format: table or json
        #[arg(long, default_value = "table")]
        output: OutputFormat,
        /// Skip checksum verification
        #[arg(long)]
        no_checksum: bool,
    },
    /// Execute a YAML scenario file
    Run { scenario: PathBuf },
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { tle, no_checksum } => validate(&tle, no_checksum),
        Commands::Propagate {
            tle,
            duration,
            step,
            model,
            output,
            no_checksum,
        } => propagate(&tle, &duration, &step, model, output, no_checksum),
        Commands::Run { scenario } => run(&scenario),
    }
}

fn validate(path: &PathBuf, no_checksum: bool) -> ExitCode {
    let (name, line1, line2) = match read_tle_file(path) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let options = ParseOptions {
        validate_checksum: !no_checksum,
        ..ParseOptions::default()
    };
    match tle::parse_with(&line1, &line2, options) {
        Ok(record) => {
            if let Some(name) = name {
                println!("{name}");
            }
            println!(
                "catalog {} ({}) epoch {}",
                record.catalog_number,
                record.international_designator,
                record
                    .epoch
                    .to_datetime()
                    .map(|dt| dt.to_rfc3339())
                    .unwrap_or_else(|| "?".into()),
            );
            println!(
                "  inclination {:9.4} deg   raan        {:9.4} deg",
                record.inclination_deg, record.right_ascension_deg
            );
            println!(
                "  eccentricity {:9.7}   arg perigee {:9.4} deg",
                record.eccentricity, record.arg_perigee_deg
            );
            println!(
                "  mean motion {:11.8} rev/day   period {:7.1} min   bstar {:e}",
                record.mean_motion_rev_day,
                record.period_minutes(),
                record.bstar
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Invalid TLE: {e}");
            ExitCode::from(2)
        }
    }
}

fn propagate(
    path: &PathBuf,
    duration: &str,
    step: &str,
    model: GravityModel,
    output: OutputFormat,
    no_checksum: bool,
) -> ExitCode {
    let (_, line1, line2) = match read_tle_file(path) {
        Ok(t) => t,
        Err(code) => return code,
    };

    let duration_minutes = match parse_minutes(duration) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Bad duration: {e}");
            return ExitCode::FAILURE;
        }
    };
    let step_minutes = match parse_minutes(step) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Bad step: {e}");
            return ExitCode::FAILURE;
        }
    };

    let options = ParseOptions {
        validate_checksum: !no_checksum,
        gravity_model: model,
    };
    execute(&line1, &line2, options, duration_minutes, step_minutes, output)
}

fn run(path: &PathBuf) -> ExitCode {
    let scenario = match Scenario::from_file(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading scenario: {e}");
            return ExitCode::FAILURE;
        }
    };

    let parts = (|| {
        let lines = scenario.tle_lines()?;
        let duration = scenario.duration_minutes()?;
        let step = scenario.step_minutes()?;
        Ok::<_, ScenarioError>((lines, duration, step))
    })();
    let ((_, line1, line2), duration_minutes, step_minutes) = match parts {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Invalid scenario: {e}");
            return ExitCode::FAILURE;
        }
    };

    let options = ParseOptions {
        validate_checksum: !scenario.skip_checksum,
        gravity_model: scenario.gravity_model,
    };
    execute(
        &line1,
        &line2,
        options,
        duration_minutes,
        step_minutes,
        scenario.output,
    )
}

fn execute(
    line1: &str,
    line2: &str,
    options: ParseOptions,
    duration_minutes: f64,
    step_minutes: f64,
    output: OutputFormat,
) -> ExitCode {
    let result = (|| {
        let record = tle::parse_with(line1, line2, options)?;
        let propagator = Propagator::new(&record)?;
        Ok::<_, Error>(sample_trajectory(
            &propagator,
            duration_minutes,
            step_minutes,
        )?)
    })();

    match result {
        Ok(samples) => {
            render(&samples, output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code(&e)
        }
    }
}

fn render(samples: &[TrajectorySample], output: OutputFormat) {
    match output {
        OutputFormat::Json => match serde_json::to_string_pretty(samples) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error encoding samples: {e}"),
        },
        OutputFormat::Table => {
            println!(
                "{:>9} | {:>35} | {:>26} | {:>8} {:>9} {:>9}",
                "t (min)", "position TEME (km)", "velocity TEME (km/s)", "lat", "lon", "alt (km)"
            );
            for s in samples {
                let [x, y, z] = s.state.position_km;
                let [vx, vy, vz] = s.state.velocity_km_s;
                println!(
                    "{:9.1} | {:11.3} {:11.3} {:11.3} | {:8.4} {:8.4} {:8.4} | {:8.3} {:9.3} {:9.3}",
                    s.minutes_from_epoch,
                    x,
                    y,
                    z,
                    vx,
                    vy,
                    vz,
                    s.geodetic.latitude_deg,
                    s.geodetic.longitude_deg,
                    s.geodetic.altitude_km,
                );
            }
        }
    }
}

/// Distinct exit codes per failure class, so scripts can tell bad input
/// from a mid-run propagation failure.
fn exit_code(error: &Error) -> ExitCode {
    match error {
        Error::Tle(_) => ExitCode::from(2),
        Error::InvalidOrbit(_) => ExitCode::from(3),
        Error::Sample(SampleError::Propagation { .. }) => ExitCode::from(4),
        Error::Sample(SampleError::Allocation { .. }) => ExitCode::from(5),
        Error::Sample(_) => ExitCode::FAILURE,
    }
}

fn read_tle_file(path: &PathBuf) -> Result<(Option<String>, String, String), ExitCode> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            return Err(ExitCode::FAILURE);
        }
    };
    split_tle_text(&text).map_err(|e| {
        eprintln!("Error in {}: {e}", path.display());
        ExitCode::FAILURE
    })
}

fn parse_minutes(text: &str) -> Result<f64, String> {
    humantime::parse_duration(text.trim())
        .map(|d| d.as_secs_f64() / 60.0)
        .map_err(|e| e.to_string())
}

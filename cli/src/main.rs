//! attest: mark attendance or enrol from a terminal.

mod host;

use anyhow::Context;
use attest_capture::WifiReading;
use attest_session::{
    http_backend, init_logging, AttendanceSession, AttestConfig, AttestError, Capabilities,
    LogFormat,
};
use attest_submit::SubmissionPipeline;
use attest_types::{Coordinates, Credentials, EnrolmentProfile, Flow, DEPARTMENTS};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use host::{ConsoleAuthenticator, FixedLocation, FixedWifi, StillImageCamera};

#[derive(Parser)]
#[command(name = "attest", about = "Campus attendance: enrol, check in, log in")]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// flags and env vars override them.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL.
    #[arg(long, global = true, env = "ATTEST_BACKEND_URL")]
    backend_url: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, global = true, env = "ATTEST_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, global = true, env = "ATTEST_LOG_FORMAT")]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with email and password.
    Login {
        #[arg(long)]
        email: String,
        #[arg(long, env = "ATTEST_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Mark today's attendance.
    CheckIn {
        #[arg(long)]
        roll_number: String,
        #[command(flatten)]
        capture: CaptureArgs,
    },
    /// Register a new student.
    Enrol {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, env = "ATTEST_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, value_parser = clap::builder::PossibleValuesParser::new(DEPARTMENTS))]
        department: String,
        #[arg(long)]
        roll_number: String,
        #[command(flatten)]
        capture: CaptureArgs,
    },
    /// Print the effective configuration as TOML.
    Config,
}

#[derive(Args)]
struct CaptureArgs {
    /// PNG file used as the camera image.
    #[arg(long)]
    photo: PathBuf,

    #[arg(long, requires = "longitude", allow_negative_numbers = true)]
    latitude: Option<f64>,

    #[arg(long, requires = "latitude", allow_negative_numbers = true)]
    longitude: Option<f64>,

    /// Wi-Fi SSID, when known. Without it the configured fallback applies.
    #[arg(long)]
    ssid: Option<String>,

    /// Device MAC address, colon-hex.
    #[arg(long)]
    mac: Option<String>,

    /// Confirm presence without prompting.
    #[arg(long, short = 'y')]
    yes: bool,
}

impl CaptureArgs {
    fn capabilities(&self, config: &AttestConfig) -> Capabilities {
        let location = self
            .latitude
            .zip(self.longitude)
            .map(|(lat, lng)| Coordinates::new(lat, lng));
        let wifi = (self.ssid.is_some() || self.mac.is_some()).then(|| {
            Arc::new(FixedWifi(WifiReading {
                ssid: self.ssid.clone(),
                mac: self.mac.clone(),
            })) as Arc<dyn attest_capture::NetworkInfoSource>
        });
        Capabilities::with_http_backend(
            config,
            Arc::new(FixedLocation(location)),
            wifi,
            Arc::new(StillImageCamera::new(&self.photo)),
            Arc::new(ConsoleAuthenticator::new(self.yes)),
        )
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AttestConfig> {
    let mut config = match &cli.config {
        Some(path) => AttestConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => AttestConfig::default(),
    };
    if let Some(url) = &cli.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.clone();
    }
    Ok(config)
}

/// Drive one capture session to submission, printing each status line.
async fn run_session(mut session: AttendanceSession) -> Result<String, AttestError> {
    session.start_locating()?;
    let identity = session.probe_network().await?;
    tracing::info!(ssid = %identity.ssid, "network identity probed");

    session.open_camera().await?;
    session.wait_for_camera().await?;
    session.take_photo()?;
    if let Some(status) = session.status() {
        eprintln!("{status}");
    }
    session.close_camera();

    session.capture_biometric().await?;
    let location = session.locate().await?;
    tracing::info!(?location, "location settled");
    let message = session.submit().await?;
    session.unmount();
    Ok(message.to_string())
}

fn print_outcome(result: Result<String, AttestError>) -> anyhow::Result<()> {
    match result {
        Ok(message) => {
            println!("{message}");
            Ok(())
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            anyhow::bail!(e.user_message())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let format: LogFormat = config.log_format.parse()?;
    init_logging(format, &config.log_level)?;

    match cli.command {
        Command::Login { email, password } => {
            let pipeline = SubmissionPipeline::new(http_backend(&config));
            let result = pipeline
                .login(&Credentials::new(email, password))
                .await
                .map_err(AttestError::from);
            match result {
                Ok(login) => {
                    println!("{}", login.message);
                    if let Some(user) = login.user {
                        println!("{user}");
                    }
                    Ok(())
                }
                Err(e) => anyhow::bail!(e.user_message()),
            }
        }
        Command::CheckIn {
            roll_number,
            capture,
        } => {
            let mut session =
                AttendanceSession::new(Flow::CheckIn, &config, capture.capabilities(&config));
            session.set_roll_number(roll_number);
            print_outcome(run_session(session).await)
        }
        Command::Enrol {
            name,
            email,
            password,
            department,
            roll_number,
            capture,
        } => {
            let mut session =
                AttendanceSession::new(Flow::Enrolment, &config, capture.capabilities(&config));
            session.set_roll_number(roll_number);
            if let Some(profile) = session.profile_mut() {
                *profile = EnrolmentProfile {
                    name,
                    email,
                    password,
                    department,
                };
            }
            print_outcome(run_session(session).await)
        }
        Command::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        }
    }
}

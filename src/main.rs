//! Capture Verify CLI
//!
//! Command-line front end for checking selfie sharpness and running a
//! full capture-and-verify exchange against a verification service.

use capture_verify::{
    capture::{decode_frame, Camera, StillImageCamera},
    metrics::{MetricsRegistry, MetricsSnapshot},
    session::{CaptureSession, SessionError},
    DocumentArtifact, FileConfig, HttpVerificationClient, SharpnessEstimator,
};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "capture-verify", version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check whether an image is sharp enough to submit.
    Check {
        /// Image file (JPEG or PNG).
        image: PathBuf,
    },
    /// Capture a selfie, attach a document and submit both for verification.
    Verify {
        /// Identity document (PDF, JPG or PNG).
        #[arg(short, long)]
        document: PathBuf,
        /// Selfie image file used as the camera still.
        #[arg(short, long)]
        selfie: Option<PathBuf>,
        /// Capture the selfie from this camera device instead of a file.
        #[cfg(feature = "camera")]
        #[arg(long, conflicts_with = "selfie")]
        camera: Option<u32>,
        /// Override the service base URL.
        #[arg(short, long)]
        endpoint: Option<String>,
        /// Print Prometheus metrics after the exchange.
        #[arg(long)]
        print_metrics: bool,
    },
}

fn load_config(path: Option<&Path>) -> Result<FileConfig, String> {
    match path {
        Some(path) => FileConfig::from_file(path).map_err(|e| e.to_string()),
        None => Ok(FileConfig::default()),
    }
}

fn check(config: &FileConfig, image: &Path) -> ExitCode {
    let bytes = match std::fs::read(image) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Failed to read {}: {}", image.display(), e);
            return ExitCode::FAILURE;
        }
    };
    let frame = match decode_frame(&bytes, 1) {
        Ok(frame) => frame,
        Err(e) => {
            eprintln!("Failed to decode {}: {}", image.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let estimator = SharpnessEstimator::from_config(&config.sharpness);
    let verdict = estimator.evaluate(&frame);
    println!(
        "{}x{} luma mean {:.2}, variance {:.2} (min {:.2}): {}",
        frame.width(),
        frame.height(),
        verdict.stats.mean,
        verdict.variance(),
        estimator.threshold().min_variance,
        if verdict.is_blurry { "blurry" } else { "sharp" }
    );

    if verdict.is_blurry {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}

async fn verify<C: Camera>(
    config: &FileConfig,
    camera: C,
    document: &Path,
    print_metrics: bool,
) -> ExitCode {
    let document = match DocumentArtifact::from_path(document) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Failed to read {}: {}", document.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let client = match HttpVerificationClient::new(&config.service) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Failed to create service client: {}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(endpoint = client.endpoint(), "Using verification service");

    let session = CaptureSession::from_config(camera, client, config);
    let outcome = run_session(&session, document).await;
    if let Err(e) = session.close_camera() {
        warn!("Failed to release camera: {}", e);
    }

    if print_metrics {
        match MetricsRegistry::new() {
            Ok(registry) => {
                registry.update(&MetricsSnapshot::from_session(
                    &session.stats(),
                    session.phase(),
                ));
                match registry.encode() {
                    Ok(text) => print!("{text}"),
                    Err(e) => warn!("Failed to encode metrics: {}", e),
                }
            }
            Err(e) => warn!("Failed to create metrics registry: {}", e),
        }
    }

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run_session<C: Camera>(
    session: &CaptureSession<C, HttpVerificationClient>,
    document: DocumentArtifact,
) -> Result<(), SessionError> {
    session.request_camera()?;
    let verdict = session.capture_selfie()?;
    info!("Selfie accepted (luma variance {:.2})", verdict.variance());

    session.attach_document(document)?;

    let result = session.submit().await?;
    println!("Verification Results");
    println!("{result}");
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();
    info!("Capture Verify v{}", capture_verify::VERSION);

    let mut config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Check { image } => check(&config, &image),
        Command::Verify {
            document,
            selfie,
            #[cfg(feature = "camera")]
            camera,
            endpoint,
            print_metrics,
        } => {
            if let Some(endpoint) = endpoint {
                config.service.base_url = endpoint;
                if let Err(e) = config.service.validate() {
                    eprintln!("Invalid endpoint: {}", e);
                    return ExitCode::FAILURE;
                }
            }

            #[cfg(feature = "camera")]
            if let Some(device_id) = camera {
                config.capture.device_id = device_id;
                let device = capture_verify::capture::DeviceCamera::new();
                return verify(&config, device, &document, print_metrics).await;
            }

            match selfie {
                Some(selfie) => {
                    verify(&config, StillImageCamera::new(selfie), &document, print_metrics).await
                }
                None => {
                    eprintln!("A selfie image is required");
                    ExitCode::FAILURE
                }
            }
        }
    }
}

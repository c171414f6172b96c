mod config;
mod logging;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use config::AppConfig;
use crashlens_adapters::{
    default_camera, present_add_outcome, present_export, present_report, present_usage,
    Font8x8Rasterizer, FsExportSink, FsPhotoLoader, GeminiReportClient, ImageCrateJpegEncoder,
    LopdfDocumentWriter, SqliteUsageStore, SystemClock,
};
use crashlens_application::{
    ApplicationError, ApplicationService, Clock, ExportReportCommand, GenerateReportCommand,
    ImageEncoder, LoadPhotosCommand, ReportExportService, ReportRequestService, ReportSession,
    UsageGovernor,
};
use tracing::warn;

#[derive(Parser, Debug)]
#[command(name = "crashlens")]
#[command(about = "Informes de accidentes de tráfico a partir de fotografías")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Command {
    /// Open the desktop window (default)
    Ui,
    /// Generate a report from photo files or folders
    Report {
        /// Photo files or folders, 1 to 10 photos in total
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Also export the report to PDF
        #[arg(long)]
        pdf: bool,
    },
    /// Show how many reports this device has generated
    Usage,
}

#[derive(Debug, Clone)]
enum CommandError {
    Usage(String),
    Runtime(String),
}

fn main() -> ExitCode {
    logging::init_logging();
    let cli = Cli::parse();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(message) => {
            eprintln!("{message}");
            return ExitCode::from(2);
        }
    };

    match run_command(cli.command.unwrap_or(Command::Ui), &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CommandError::Usage(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(2)
        }
        Err(CommandError::Runtime(msg)) => {
            eprintln!("{msg}");
            ExitCode::from(1)
        }
    }
}

fn build_application_service(config: &AppConfig) -> Result<ApplicationService, ApplicationError> {
    let client = GeminiReportClient::new(config.gemini())?;
    let encoder: Arc<dyn ImageEncoder> = Arc::new(ImageCrateJpegEncoder);
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let exports = ReportExportService::new(
        Arc::new(Font8x8Rasterizer),
        Arc::clone(&encoder),
        Arc::new(LopdfDocumentWriter),
        Arc::new(FsExportSink::new(config.export_dir.clone())),
        Arc::clone(&clock),
    );

    Ok(ApplicationService::new(
        Arc::new(FsPhotoLoader),
        ReportRequestService::new(Arc::new(client)),
        exports,
        Arc::from(default_camera(config.camera_index)),
        encoder,
        clock,
    ))
}

/// The counter still works in memory when the database cannot be prepared.
fn open_usage_governor(config: &AppConfig) -> UsageGovernor {
    let store = SqliteUsageStore::new(config.usage_db_path());
    if let Err(error) = store.initialize() {
        warn!(error = %error, path = %store.path().display(), "usage store unavailable");
    }
    UsageGovernor::new(Box::new(store))
}

fn run_command(command: Command, config: &AppConfig) -> Result<(), CommandError> {
    match command {
        Command::Ui => {
            let service = build_application_service(config)
                .map_err(|error| CommandError::Runtime(format!("startup failed: {error}")))?;
            let session = ReportSession::new(open_usage_governor(config));
            ui::launch_window(service, session, config).map_err(CommandError::Runtime)
        }
        Command::Report { paths, pdf } => {
            let service = build_application_service(config)
                .map_err(|error| CommandError::Runtime(format!("startup failed: {error}")))?;
            let mut session = ReportSession::new(open_usage_governor(config));
            run_report(&service, &mut session, paths, pdf)
        }
        Command::Usage => {
            let session = ReportSession::new(open_usage_governor(config));
            println!("{}", present_usage(session.usage()));
            Ok(())
        }
    }
}

fn run_report(
    service: &ApplicationService,
    session: &mut ReportSession,
    paths: Vec<PathBuf>,
    pdf: bool,
) -> Result<(), CommandError> {
    let photos = service
        .load_photos(LoadPhotosCommand { paths })
        .map_err(|error| match error {
            ApplicationError::InvalidInput(msg) => CommandError::Usage(msg),
            other => CommandError::Runtime(format!("load failed: {other}")),
        })?;
    let outcome = session
        .add_dropped(photos)
        .map_err(|error| CommandError::Runtime(error.user_message()))?;
    println!("{}", present_add_outcome(&outcome, session.photos().len()));
    if let Some(warning) = session.error() {
        eprintln!("{warning}");
    }

    let ticket = session
        .begin_generation()
        .map_err(|error| CommandError::Usage(error.user_message()))?;
    let result = service.generate_report(GenerateReportCommand {
        photos: ticket.photos,
    });
    if !session.finish_generation(ticket.seq, result) {
        let message = session
            .error()
            .unwrap_or("Error al generar el informe.")
            .to_string();
        return Err(CommandError::Runtime(message));
    }

    let report = session
        .report()
        .cloned()
        .ok_or_else(|| CommandError::Runtime("report missing after generation".to_string()))?;
    println!("{}", present_report(&report));
    println!("{}", present_usage(session.usage()));

    if pdf {
        let ticket = session
            .begin_export()
            .map_err(|error| CommandError::Runtime(error.user_message()))?;
        let result = service.export_report(ExportReportCommand {
            report: ticket.report,
        });
        session.finish_export(ticket.seq, result);
        if let Some(alert) = session.take_alert() {
            return Err(CommandError::Runtime(alert));
        }
        if let Some(exported) = session.last_export() {
            println!("{}", present_export(exported));
        }
    }
    Ok(())
}

use clap::Parser;
use std::process;
use xgextract::{
    Cli, OutputFormatter, OutputMode, UserFriendlyError, XgExtract, XgExtractError,
};

fn main() {
    process::exit(run());
}

fn run() -> i32 {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Handle special commands first
    if cli.generate_config {
        return handle_generate_config(&cli);
    }

    // Create XgExtract instance
    let app = match XgExtract::from_cli(&cli) {
        Ok(app) => app,
        Err(e) => {
            print_startup_error(&e);
            return exit_code(&e);
        }
    };

    let result = if cli.list {
        app.list_groups(&cli.directory)
    } else if let Some(ref destination) = cli.repack {
        app.repack(&cli.directory, destination).map(|_| ())
    } else {
        app.export(&cli.directory).map(|_| ())
    };

    match result {
        Ok(()) => 0,
        Err(e) => {
            app.handle_error(&e);
            exit_code(&e)
        }
    }
}

/// Map error classes to stable exit codes so wrapper scripts can react to
/// each failure mode.
fn exit_code(error: &XgExtractError) -> i32 {
    match error {
        XgExtractError::Config { .. } | XgExtractError::InvalidSelection { .. } => 2,
        XgExtractError::NoBackupFound { .. } => 3,
        XgExtractError::ArchiveCorrupt { .. } => 4,
        XgExtractError::ConfigNotFound { .. } => 5,
        XgExtractError::MalformedXml { .. } => 6,
        XgExtractError::WriteError { .. } | XgExtractError::OutputExists { .. } => 7,
        _ => 1, // General error
    }
}

fn handle_generate_config(cli: &Cli) -> i32 {
    let config_path = cli
        .config
        .as_ref()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|| "xgextract.toml".to_string());

    match XgExtract::generate_sample_config(&config_path) {
        Ok(()) => {
            println!("Generated sample configuration file: {}", config_path);
            println!("\nTo use this configuration:");
            println!("  xgextract <directory> --config {}", config_path);
            println!("\nEdit the file to customize settings for your needs.");
            0
        }
        Err(e) => {
            eprintln!("Failed to generate configuration file: {}", e.user_message());
            if let Some(suggestion) = e.suggestion() {
                eprintln!("Suggestion: {}", suggestion);
            }
            1
        }
    }
}

fn print_startup_error(error: &XgExtractError) {
    // Create a basic formatter for startup errors
    let formatter = OutputFormatter::new(OutputMode::Human, 0, false);
    formatter.print_user_friendly_error(error);
}

//! Wallpaper CLI commands.
//!
//! One-shot rotations, applying local images, display inspection and
//! cleanup of generated files.

use std::path::Path;

use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use super::types::ModeArg;
use crate::cli::output;
use crate::config::{self, LoadedConfig, WallspanConfig};
use crate::error::WallspanError;
use crate::platform;
use crate::storage::format_bytes;
use crate::unsplash::UnsplashClient;
use crate::wallpaper::controller::RotationReport;
use crate::wallpaper::geometry::{classify_aspect, compute_bounds};
use crate::wallpaper::rotation::RotationFiles;
use crate::wallpaper::{DisplayEnumerator, Services, SystemDesktop, SystemDisplays};

/// The production collaborators.
pub type SystemServices = Services<UnsplashClient, SystemDisplays, SystemDesktop>;

/// Builds the display enumerator described by `config`.
#[must_use]
pub fn system_displays(config: &WallspanConfig) -> SystemDisplays {
    SystemDisplays::new(&config.displays, config.vertical_axis)
}

/// Builds the Unsplash client. A missing key surfaces when fetching.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn unsplash_client(loaded: &LoadedConfig) -> Result<UnsplashClient, WallspanError> {
    let key = loaded.access_key().unwrap_or_default();
    if key.is_empty() {
        tracing::warn!("No Unsplash access key configured");
    }
    Ok(UnsplashClient::new(key)?)
}

/// Builds every production collaborator from `loaded`.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be created.
pub fn system_services(loaded: &LoadedConfig) -> Result<SystemServices, WallspanError> {
    Ok(Services::new(
        unsplash_client(loaded)?,
        system_displays(&loaded.config),
        SystemDesktop::new(),
    ))
}

/// Runtime for CLI commands. Single threaded, so desktop calls stay on the
/// main thread.
///
/// # Errors
///
/// Returns an error if the runtime cannot be built.
pub fn runtime() -> Result<tokio::runtime::Runtime, WallspanError> {
    Ok(tokio::runtime::Builder::new_current_thread().enable_all().build()?)
}

// ============================================================================
// next
// ============================================================================

/// Fetches a photo and applies it once.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded or the rotation fails.
pub fn execute_next(config_path: Option<&Path>) -> Result<(), WallspanError> {
    let loaded = config::load(config_path)?;
    let services = system_services(&loaded)?;
    let mut files = RotationFiles::in_data_dir();

    let runtime = runtime()?;
    let result = runtime.block_on(services.rotate(&loaded.config, &mut files, None));
    runtime.shutdown_background();

    print_report(&result?);
    Ok(())
}

// ============================================================================
// set
// ============================================================================

/// Applies a local image file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or applied.
pub fn execute_set(
    config_path: Option<&Path>,
    path: &str,
    mode: Option<ModeArg>,
) -> Result<(), WallspanError> {
    let image_path = platform::expand(path);
    if !image_path.is_file() {
        return Err(WallspanError::InvalidArguments(format!(
            "Image not found: {}",
            image_path.display()
        )));
    }

    let mut loaded = config::load(config_path)?;
    if let Some(mode) = mode {
        loaded.config.mode = mode.into();
    }

    let bytes = std::fs::read(&image_path)?;
    let services = system_services(&loaded)?;
    let mut files = RotationFiles::in_data_dir();

    let runtime = runtime()?;
    let result = runtime.block_on(services.apply_image(&loaded.config, &mut files, bytes));
    runtime.shutdown_background();

    print_report(&result?);
    Ok(())
}

fn print_report(report: &RotationReport) {
    if let Some(credit) = &report.credit {
        println!("{credit}");
    }
    for path in &report.applied {
        println!("{} {}", "Applied".green(), path.display());
    }
    if let Some(warning) = &report.warning {
        eprintln!("{} {warning}", "Warning:".yellow());
    }
}

// ============================================================================
// displays
// ============================================================================

/// Lists the displays a rotation would use.
///
/// # Errors
///
/// Returns an error if the configuration cannot be loaded.
#[allow(clippy::cast_possible_truncation)]
pub fn execute_displays(config_path: Option<&Path>, json: bool) -> Result<(), WallspanError> {
    #[derive(Tabled)]
    struct DisplayRow {
        #[tabled(rename = "#")]
        index: usize,
        #[tabled(rename = "ID")]
        id: u32,
        #[tabled(rename = "Position")]
        position: String,
        #[tabled(rename = "Size")]
        size: String,
        #[tabled(rename = "Scale")]
        scale: String,
        #[tabled(rename = "Native")]
        native: String,
    }

    let loaded = config::load(config_path)?;
    let enumerator = system_displays(&loaded.config);
    let displays = enumerator.list_displays();

    if displays.is_empty() {
        if json {
            println!(r#"{{"displays":[]}}"#);
        } else {
            println!("{}", "No displays detected.".dimmed());
        }
        return Ok(());
    }

    let bounds = compute_bounds(&displays)?;
    let aspect = classify_aspect(&bounds);

    if json {
        let value = serde_json::json!({
            "displays": displays,
            "bounds": bounds,
            "aspect": aspect.to_string(),
            "verticalAxis": enumerator.vertical_axis(),
        });
        output::print_highlighted_json(&value);
        return Ok(());
    }

    let rows: Vec<DisplayRow> = displays
        .iter()
        .enumerate()
        .map(|(index, d)| {
            let (native_width, native_height) = d.native_size();
            DisplayRow {
                index,
                id: d.id,
                position: format!("{}, {}", d.x as i64, d.y as i64),
                size: format!("{}x{}", d.width as i64, d.height as i64),
                scale: format!("{}x", d.scale),
                native: format!("{native_width}x{native_height}"),
            }
        })
        .collect();

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::first()).with(Alignment::right()))
        .with(Modify::new(Columns::new(2..6)).with(Alignment::right()))
        .to_string();

    println!("{}", format!("Displays ({})", displays.len()).bold());
    println!("{table}");
    println!(
        "Virtual desktop: {}x{} at ({}, {}), {}",
        bounds.width() as i64,
        bounds.height() as i64,
        bounds.min_x as i64,
        bounds.min_y as i64,
        aspect
    );
    Ok(())
}

// ============================================================================
// clean
// ============================================================================

/// Deletes every generated wallpaper file.
///
/// # Errors
///
/// Returns an error if the data directory cannot be read.
pub fn execute_clean() -> Result<(), WallspanError> {
    let mut files = RotationFiles::in_data_dir();
    let freed = files.clear()?;

    println!("Removed {} from {}", format_bytes(freed), files.dir().display());
    Ok(())
}

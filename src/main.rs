use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::PathBuf;

use campusreport::api::moderation::ModerationVerdict;
use campusreport::api::{BackendClient, reverse_geocode, verify_image};
use campusreport::config::{FileConfig, GeocoderConfig, ModerationConfig};
use campusreport::domain::{Category, NewReport, Report, ReportLocation, parse_tags};
use campusreport::geofence::{GeoPoint, Polygon};
use campusreport::image::{base64_payload, encode_data_uri};

/// Campus issue reporting client
///
/// Examples:
///   # Check whether a coordinate is on campus
///   campusreport check --lat 19.0213 --lon 72.8707
///
///   # Submit a report with a photo
///   campusreport submit --title "Broken light" --description "Lamp out near gate 2" \
///       --image lamp.jpg --lat 19.0213 --lon 72.8707 --category electrical --tags "lighting,gate2"
///
///   # Admin triage
///   campusreport resolved
///   campusreport delete 64f2c91a --yes
///   campusreport attach-solution 64f2c91a --image fixed.jpg
#[derive(Parser, Debug)]
#[command(name = "campusreport")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to config file (optional, auto-searches campusreport.toml if not provided)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// Enable verbose logging
    #[arg(short = 'v', long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a coordinate lies inside the campus boundary
    Check {
        /// Latitude of the position to check
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the position to check
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
    },
    /// Submit a new issue report
    Submit {
        /// Report title
        #[arg(long)]
        title: String,
        /// Detailed description
        #[arg(long)]
        description: String,
        /// Path to the photo to attach
        #[arg(long)]
        image: PathBuf,
        /// Latitude of the issue location
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        /// Longitude of the issue location
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        /// Issue category
        #[arg(long, value_enum)]
        category: Category,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
        /// Skip the image moderation check
        #[arg(long)]
        skip_moderation: bool,
    },
    /// List resolved reports
    Resolved,
    /// Delete a report by id
    Delete {
        /// Report id
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Attach an "after" photo to a resolved report
    AttachSolution {
        /// Report id
        id: String,
        /// Path to the photo to attach
        #[arg(long)]
        image: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let file_config = if let Some(ref config_path) = cli.config {
        if config_path.exists() {
            let contents = std::fs::read_to_string(config_path)
                .context(format!("Failed to read config file: {:?}", config_path))?;
            toml::from_str(&contents).context("Failed to parse config file")?
        } else {
            bail!("Config file not found: {:?}", config_path);
        }
    } else {
        FileConfig::load().unwrap_or_default()
    };

    let api_url = cli.api_url.clone().unwrap_or_else(|| file_config.api_url());
    let verbose = cli.verbose || file_config.verbose;
    let boundary = file_config.boundary();
    let geocoder = file_config.geocoder.clone().unwrap_or_default();
    let moderation = file_config.moderation.clone().unwrap_or_default();

    if verbose {
        println!("Configuration:");
        println!("  Backend: {}", api_url);
        println!("  Boundary vertices: {}", boundary.vertices().len());
        println!("  Geocoder: {}", geocoder.url);
        println!("  Moderation endpoints: {}", moderation.endpoints.len());
        println!();
    }

    match cli.command {
        Command::Check { lat, lon } => check_location(lat, lon, &boundary, &geocoder),
        Command::Submit {
            title,
            description,
            image,
            lat,
            lon,
            category,
            tags,
            skip_moderation,
        } => submit_report(
            &api_url,
            &boundary,
            &geocoder,
            &moderation,
            SubmitArgs {
                title,
                description,
                image,
                lat,
                lon,
                category,
                tags,
                skip_moderation,
            },
        ),
        Command::Resolved => list_resolved(&api_url),
        Command::Delete { id, yes } => delete_report(&api_url, &id, yes),
        Command::AttachSolution { id, image } => attach_solution(&api_url, &id, &image),
    }
}

struct SubmitArgs {
    title: String,
    description: String,
    image: PathBuf,
    lat: f64,
    lon: f64,
    category: Category,
    tags: String,
    skip_moderation: bool,
}

fn check_location(
    lat: f64,
    lon: f64,
    boundary: &Polygon,
    geocoder: &GeocoderConfig,
) -> Result<()> {
    let point = GeoPoint::new(lat, lon);

    if !boundary.contains(point) {
        bail!("You must be on campus to submit reports");
    }
    println!("({:.6}, {:.6}) is on campus", lat, lon);

    let spinner = create_spinner("Looking up address...");
    match reverse_geocode(point, geocoder) {
        Ok(address) => spinner.finish_with_message(format!("Address: {}", address)),
        Err(e) => spinner.finish_with_message(format!("Address lookup failed: {:#}", e)),
    }

    Ok(())
}

fn submit_report(
    api_url: &str,
    boundary: &Polygon,
    geocoder: &GeocoderConfig,
    moderation: &ModerationConfig,
    args: SubmitArgs,
) -> Result<()> {
    let point = GeoPoint::new(args.lat, args.lon);
    if !boundary.contains(point) {
        bail!("You must be on campus to submit reports");
    }

    let data_uri = encode_data_uri(&args.image)?;

    if args.skip_moderation {
        println!("Skipping image moderation");
    } else {
        let spinner = create_spinner("Verifying image content...");
        match verify_image(base64_payload(&data_uri), moderation) {
            Ok(ModerationVerdict::Safe) => {
                spinner.finish_with_message("Image verified");
            }
            Ok(ModerationVerdict::Unsafe(reason)) => {
                spinner.finish_with_message("Image rejected");
                bail!(
                    "Inappropriate content detected: {}. Please select another image.",
                    reason
                );
            }
            Err(e) => {
                spinner.finish_with_message("Image verification unavailable");
                eprintln!("Moderation failed: {:#}", e);
                if !confirm(
                    "We couldn't automatically verify this image. Are you sure it's \
                     appropriate and relevant to your campus report?",
                )? {
                    bail!("Submission cancelled");
                }
            }
        }
    }

    let spinner = create_spinner("Looking up address...");
    let address = match reverse_geocode(point, geocoder) {
        Ok(address) => {
            spinner.finish_with_message(format!("Address: {}", address));
            address
        }
        Err(e) => {
            spinner.finish_with_message("Address lookup failed, using fallback");
            eprintln!("Reverse geocoding failed: {:#}", e);
            campusreport::api::geocode::FALLBACK_ADDRESS.to_string()
        }
    };

    let location = ReportLocation::new(point, address);

    // Re-validate the final location before sending, in case it diverged
    // from the checked position.
    if !boundary.contains(location.point()) {
        bail!("Location must be within campus boundaries");
    }

    let report = NewReport {
        title: args.title,
        description: args.description,
        image: data_uri,
        location,
        category: args.category,
        tags: parse_tags(&args.tags),
    };

    let client = BackendClient::new(api_url)?;
    let spinner = create_spinner("Submitting report...");
    client.submit_report(&report)?;
    spinner.finish_with_message("Report submitted successfully!");

    Ok(())
}

fn list_resolved(api_url: &str) -> Result<()> {
    let client = BackendClient::new(api_url)?;

    let spinner = create_spinner("Fetching resolved reports...");
    let reports = client.list_resolved()?;
    spinner.finish_with_message(format!("{} resolved report(s)", reports.len()));
    println!();

    for report in &reports {
        print_report(report);
    }

    Ok(())
}

fn print_report(report: &Report) {
    println!("{} [{}]", report.title, report.category);
    println!("  id: {}", report.id);
    if let Some(ref created) = report.created_at {
        println!("  created: {}", created);
    }
    println!(
        "  location: {}",
        report
            .location
            .address
            .as_deref()
            .unwrap_or("No address available")
    );
    if !report.tags.is_empty() {
        println!("  tags: {}", report.tags.join(", "));
    }
    if report.solution_image.is_some() {
        println!("  solution image: attached");
    }

    // Clamp long descriptions the way the dashboard cards do.
    let description = report.description.trim();
    if description.chars().count() > 150 {
        let clipped: String = description.chars().take(150).collect();
        println!("  {}...", clipped);
    } else {
        println!("  {}", description);
    }
    println!();
}

fn delete_report(api_url: &str, id: &str, yes: bool) -> Result<()> {
    if !yes && !confirm(&format!("Are you sure you want to delete report {}?", id))? {
        bail!("Deletion cancelled");
    }

    let client = BackendClient::new(api_url)?;
    let spinner = create_spinner("Deleting report...");
    client.delete_report(id)?;
    spinner.finish_with_message(format!("Deleted report {}", id));

    Ok(())
}

fn attach_solution(api_url: &str, id: &str, image: &std::path::Path) -> Result<()> {
    let data_uri = encode_data_uri(image)?;

    let client = BackendClient::new(api_url)?;
    let spinner = create_spinner("Uploading solution image...");
    client.attach_solution_image(id, &data_uri)?;
    spinner.finish_with_message(format!("Attached solution image to report {}", id));

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .read_line(&mut answer)
        .context("Failed to read confirmation")?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

//! Command-line surface.
//!
//! Thin wrappers over the orchestrator and the favorites store. Each
//! subcommand does one thing and maps failures to an exit code.

use crate::favorites::{FavoritesStore, FileBackend};
use crate::geolocation::{Coordinates, FixedLocation, Unsupported};
use crate::llm::provider::ProviderInfo;
use crate::llm::{self, DescribeSpeciesInput, ProviderId, SpeciesKind};
use crate::pipeline::{Identifier, Notification, NotificationKind, Phase};
use crate::report;
use crate::settings::{self, Settings};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

/// Identify plants, animals and mushrooms from a photo
#[derive(Parser, Debug)]
#[command(name = "natureid", author, version, about, long_about = None)]
pub struct Args {
    /// LLM provider to use (overrides LLM_PROVIDER)
    #[arg(long, global = true)]
    pub provider: Option<ProviderId>,

    /// Directory holding saved favorites (overrides NATUREID_DATA_DIR)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Identify the species in a PNG, JPEG or WEBP photo
    Identify {
        /// Path to the photo
        image: PathBuf,

        /// Sighting location as "lat,lon" (overrides NATUREID_LOCATION)
        #[arg(long)]
        location: Option<String>,

        /// Save the result to favorites
        #[arg(long, default_value_t = false)]
        favorite: bool,

        /// Print the raw JSON result instead of the report
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Short description of a named species
    Describe {
        /// Species name, common or scientific
        name: String,

        /// plant, animal or mushroom
        #[arg(long, default_value = "plant")]
        kind: SpeciesKind,
    },
    /// Manage saved favorites
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },
    /// List providers and which ones have a key
    Providers,
    /// Save a provider API key to the OS keychain
    SetKey {
        provider: ProviderId,
        api_key: String,
    },
    /// Send a minimal request to check a provider's key
    TestProvider { provider: ProviderId },
}

#[derive(Subcommand, Debug)]
pub enum FavoritesAction {
    /// List saved species
    List,
    /// Show the saved report for a species
    Show {
        scientific_name: String,
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Remove a species from favorites
    Remove { scientific_name: String },
}

fn print_notifications(notifications: Vec<Notification>) {
    for n in notifications {
        let tag = match n.kind {
            NotificationKind::Error => "error",
            NotificationKind::Advisory => "note",
        };
        eprintln!("[{}] {}: {}", tag, n.title, n.description);
    }
}

pub async fn dispatch(args: Args) -> ExitCode {
    let mut settings = Settings::from_env();
    if let Some(provider) = args.provider {
        settings.provider = provider;
    }
    if let Some(dir) = args.data_dir {
        settings.data_dir = dir;
    }

    match args.command {
        Command::Identify {
            image,
            location,
            favorite,
            json,
        } => identify(&settings, image, location, favorite, json).await,
        Command::Describe { name, kind } => describe(&settings, name, kind).await,
        Command::Favorites { action } => favorites(&settings, action),
        Command::Providers => providers(&settings),
        Command::SetKey { provider, api_key } => match settings::save_api_key(provider, &api_key) {
            Ok(()) => {
                println!("Saved {} key to the OS keychain.", provider);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
        Command::TestProvider { provider } => match settings::test_provider(provider).await {
            Ok(true) => {
                println!("{}: ok", provider);
                ExitCode::SUCCESS
            }
            Ok(false) => {
                println!("{}: request rejected", provider);
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("{}: {}", provider, e);
                ExitCode::FAILURE
            }
        },
    }
}

async fn identify(
    settings: &Settings,
    image: PathBuf,
    location: Option<String>,
    favorite: bool,
    json: bool,
) -> ExitCode {
    let model = match settings.model_client() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}. Set {} or run `natureid set-key`.", e, settings.provider.env_key());
            return ExitCode::FAILURE;
        }
    };
    let store = FavoritesStore::load(FileBackend::new(&settings.data_dir));
    let mut identifier = Identifier::new(model, store);

    match location.or_else(|| settings.location.clone()) {
        Some(raw) => match Coordinates::parse(&raw) {
            Some(coords) => identifier.mount(FixedLocation(coords)),
            None => {
                eprintln!("Invalid location '{}', expected \"lat,lon\"", raw);
                return ExitCode::FAILURE;
            }
        },
        None => identifier.mount(Unsupported),
    }

    if let Err(e) = identifier.select_image_file(&image) {
        eprintln!("{}: {}", image.display(), e);
        return ExitCode::FAILURE;
    }

    identifier.wait_for_location().await;
    if let Some(advisory) = &identifier.state().location_advisory {
        eprintln!("[note] {}", advisory);
    }

    eprintln!("Identifying with {} ({})...", settings.provider, identifier.model().model());
    let outcome = identifier.identify().await;
    print_notifications(identifier.take_notifications());

    if outcome.is_err() || identifier.state().phase != Phase::ResultReady {
        if let Some(message) = &identifier.state().error {
            eprintln!("{}", message);
        }
        return ExitCode::FAILURE;
    }

    if favorite && identifier.save_favorite() {
        eprintln!("Saved to favorites.");
    }
    print_notifications(identifier.take_notifications());

    let Some(result) = identifier.state().result.as_ref() else {
        return ExitCode::FAILURE;
    };
    if json {
        match serde_json::to_string_pretty(result) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        print!("{}", report::render_report(result, identifier.is_current_favorite()));
    }
    ExitCode::SUCCESS
}

async fn describe(settings: &Settings, name: String, kind: SpeciesKind) -> ExitCode {
    let model = match settings.model_client() {
        Ok(m) => m,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let input = DescribeSpeciesInput {
        species_name: name,
        species_type: kind,
    };
    match llm::describe_species(&model, &input).await {
        Ok(output) => {
            println!("{}", output.description);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("[LLM] Describe failed: {}", e);
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

fn favorites(settings: &Settings, action: FavoritesAction) -> ExitCode {
    let mut store = FavoritesStore::load(FileBackend::new(&settings.data_dir));
    match action {
        FavoritesAction::List => {
            print!("{}", report::render_favorites(&store.list()));
            ExitCode::SUCCESS
        }
        FavoritesAction::Show {
            scientific_name,
            json,
        } => {
            let Some(entry) = store.get(&scientific_name) else {
                eprintln!("'{}' is not in favorites", scientific_name);
                return ExitCode::FAILURE;
            };
            if json {
                match serde_json::to_string_pretty(&entry.result) {
                    Ok(text) => println!("{}", text),
                    Err(e) => {
                        eprintln!("{}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print!("{}", report::render_report(&entry.result, true));
            }
            ExitCode::SUCCESS
        }
        FavoritesAction::Remove { scientific_name } => match store.remove(&scientific_name) {
            Ok(true) => {
                println!("Removed {}.", scientific_name);
                ExitCode::SUCCESS
            }
            Ok(false) => {
                eprintln!("'{}' is not in favorites", scientific_name);
                ExitCode::FAILURE
            }
            Err(e) => {
                eprintln!("{}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn provider_row(info: &ProviderInfo, active: bool, configured: bool) -> String {
    format!(
        "{} {:<10} {:<36} {:<18} {:<12} {}",
        if active { "*" } else { " " },
        info.id.as_str(),
        info.name,
        info.env_key,
        if configured { "configured" } else { "no key" },
        info.cost_per_identification
    )
}

fn providers(settings: &Settings) -> ExitCode {
    for info in llm::provider::all_providers() {
        let configured = settings::api_key(info.id).is_some();
        println!(
            "{}",
            provider_row(&info, info.id == settings.provider, configured)
        );
    }
    ExitCode::SUCCESS
}

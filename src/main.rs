#[macro_use]
extern crate clap;
use clap::{App, AppSettings, Arg, ArgGroup, ArgMatches, SubCommand};

use failure::Error;

use log::{error, info, warn};
use std::io;
use std::path::Path;
use std::sync::Arc;

use parking_finder::catalog::{self, Catalog, SpotProvider};
use parking_finder::catalog_utils::{self, CatalogSource};
use parking_finder::query_params::QueryParams;
use parking_finder::recommender::{RankingStrategy, Recommender};
use parking_finder::report;

use chrono::offset::Local;

fn main() {
    let matches = build_app().get_matches();

    let local_time = Local::now();
    let time_offset = local_time.offset();
    let level = if matches.is_present("verbose") {
        simplelog::LevelFilter::Debug
    } else {
        simplelog::LevelFilter::Info
    };
    // Configure logging
    simplelog::TermLogger::init(
        level,
        simplelog::Config {
            offset: time_offset.clone(),
            ..simplelog::Config::default()
        },
        simplelog::TerminalMode::Stderr,
    )
    .ok();

    match do_main(&matches) {
        Ok(_) => info!("Process finished OK"),
        Err(err) => {
            error!("Process finished with an error: {}", err);
            std::process::exit(1);
        }
    };
}

fn catalog_args<'a, 'b>(command: App<'a, 'b>) -> App<'a, 'b> {
    command
        .arg(Arg::with_name("catalog")
            .short("c")
            .long("catalog")
            .help("CSV file with the parking spots. The built-in Bengaluru spots are used if omitted.")
            .takes_value(true)
        )
        .arg(Arg::with_name("geo-json")
            .short("g")
            .long("geo-json")
            .help("GeoJSON feature collection of points with the parking spots.")
            .takes_value(true)
        )
        .arg(Arg::with_name("snapshot")
            .short("x")
            .long("snapshot")
            .help("Catalog snapshot created with the snapshot command.")
            .takes_value(true)
        )
        .group(ArgGroup::with_name("catalog-source")
            .args(&["catalog", "geo-json", "snapshot"])
            .required(false))
        .arg(Arg::with_name("seed")
            .long("seed")
            .help("Seed for the statuses of spots loaded without one.")
            .takes_value(true)
        )
}

fn filter_args<'a, 'b>(command: App<'a, 'b>) -> App<'a, 'b> {
    command
        .arg(Arg::with_name("type")
            .long("type")
            .help("Accepted spot types (comma separated).")
            .takes_value(true)
            .multiple(true)
            .number_of_values(1)
        )
        .arg(Arg::with_name("fee")
            .long("fee")
            .help("Accepted fee: free/no or paid/yes.")
            .takes_value(true)
            .multiple(true)
            .number_of_values(1)
        )
        .arg(Arg::with_name("status")
            .long("status")
            .help("Accepted statuses. Defaults to available, use 'any' for every status.")
            .takes_value(true)
            .multiple(true)
            .number_of_values(1)
        )
        .arg(Arg::with_name("index")
            .long("index")
            .help("Narrow the candidates with an R-tree before ranking.")
        )
}

fn format_arg<'a, 'b>() -> Arg<'a, 'b> {
    Arg::with_name("format")
        .short("f")
        .long("format")
        .help("Output format")
        .takes_value(true)
        .possible_values(&["text", "json"])
        .default_value("text")
}

fn build_app<'a, 'b>() -> App<'a, 'b> {
    App::new("parking-finder")
        .version(crate_version!())
        .author("Gustavo Ajzenman")
        .about("Nearest parking spots for a location")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("verbose")
            .short("v")
            .long("verbose")
            .global(true)
            .help("Debug logging")
        )
        .subcommand(filter_args(catalog_args(
            SubCommand::with_name("recommend")
                .about("Recommend the nearest parking spots")
                .arg(Arg::with_name("lat")
                    .long("lat")
                    .help("Latitude of the user")
                    .takes_value(true)
                    .allow_hyphen_values(true)
                )
                .arg(Arg::with_name("lng")
                    .long("lng")
                    .help("Longitude of the user")
                    .takes_value(true)
                    .allow_hyphen_values(true)
                )
                .arg(Arg::with_name("count")
                    .short("n")
                    .long("count")
                    .help("Number of spots to recommend")
                    .takes_value(true)
                    .allow_hyphen_values(true)
                )
                .arg(format_arg())
        )))
        .subcommand(catalog_args(
            SubCommand::with_name("spots")
                .about("List every parking spot")
                .arg(format_arg())
        ))
        .subcommand(catalog_args(
            SubCommand::with_name("snapshot")
                .about("Save the catalog into a snapshot file")
                .arg(Arg::with_name("output")
                    .short("o")
                    .long("output")
                    .help("Output path or file for the snapshot")
                    .takes_value(true)
                    .default_value(".")
                )
                .arg(Arg::with_name("feed")
                    .long("feed")
                    .help("CSV occupancy feed (name,status) applied before saving")
                    .takes_value(true)
                )
                .arg(Arg::with_name("force")
                    .long("force")
                    .help("Overwrite the snapshot")
                    .takes_value(false)
                )
        ))
}

fn load_catalog(matches: &ArgMatches) -> Result<Catalog, Error> {
    let source = if let Some(path) = matches.value_of("catalog") {
        CatalogSource::Csv(Path::new(path))
    } else if let Some(path) = matches.value_of("geo-json") {
        CatalogSource::GeoJson(Path::new(path))
    } else if let Some(path) = matches.value_of("snapshot") {
        CatalogSource::Snapshot(Path::new(path))
    } else {
        CatalogSource::Builtin
    };

    let seed = if matches.is_present("seed") {
        value_t!(matches, "seed", u64)?
    } else {
        catalog::DEFAULT_SEED
    };

    let spots = catalog_utils::load_spots(&source, seed)?;
    Ok(Catalog::new(spots))
}

fn build_recommender(matches: &ArgMatches) -> Result<Recommender<Arc<Catalog>>, Error> {
    let catalog = Arc::new(load_catalog(matches)?);
    let strategy = if matches.is_present("index") {
        RankingStrategy::Indexed
    } else {
        RankingStrategy::Scan
    };
    Ok(Recommender::new(catalog).with_strategy(strategy))
}

/// Command line filters and location, as request parameters.
fn query_params(matches: &ArgMatches) -> QueryParams {
    let mut params = QueryParams::new();
    for key in &["lat", "lng", "count"] {
        if let Some(value) = matches.value_of(key) {
            params.push(key, value);
        }
    }
    for key in &["type", "fee", "status"] {
        for value in matches.values_of(key).into_iter().flatten() {
            params.push(key, value);
        }
    }
    params
}

fn recommend_command(matches: &ArgMatches) -> Result<(), Error> {
    let as_json = matches.value_of("format") == Some("json");

    let query = match query_params(matches).to_query() {
        Ok(query) => query,
        Err(err) => {
            if as_json {
                println!("{}", serde_json::to_string_pretty(&report::ErrorResponse::new(&err))?);
            }
            return Err(Error::from(err));
        }
    };

    let recommender = build_recommender(matches)?;
    info!(
        "Recommending {} spots near {:?} ({:?})",
        query.limit,
        query.origin,
        recommender.strategy()
    );
    let ranked = recommender.recommend(&query);

    if as_json {
        let response = report::RecommendationsResponse::new(query.origin, &ranked);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", report::format_recommendations(&query.origin, &ranked));
    }
    Ok(())
}

fn spots_command(matches: &ArgMatches) -> Result<(), Error> {
    let catalog = load_catalog(matches)?;
    let snapshot = catalog.snapshot();

    if matches.value_of("format") == Some("json") {
        let response = report::SpotsResponse::new(snapshot.spots());
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", report::format_spots(snapshot.spots()));
    }
    Ok(())
}

fn snapshot_command(matches: &ArgMatches) -> Result<(), Error> {
    let output = Path::new(matches.value_of("output").unwrap_or_default());

    let mut dest_file_buffer = output.to_path_buf();
    if output.is_dir() {
        dest_file_buffer.push("spots.snapshot.bin");
    }
    let dest_file: &Path = dest_file_buffer.as_path();

    if dest_file.exists() && !matches.is_present("force") {
        warn!(
            "Snapshot exists in {}. Skipping. Use --force to overwrite",
            dest_file.display()
        );
        return Ok(());
    }

    let catalog = load_catalog(matches)?;

    if let Some(feed_path) = matches.value_of("feed") {
        info!("Applying occupancy feed {}", feed_path);
        let feed = std::fs::File::open(feed_path)?;
        let updates = catalog::read_status_feed(io::BufReader::new(feed))?;
        let unknown = catalog.apply_statuses(updates.iter().map(|(name, status)| (name.as_str(), *status)));
        for name in &unknown {
            warn!("Occupancy feed names an unknown spot: {}", name);
        }
        info!("Applied {} status updates", updates.len() - unknown.len());
    }

    info!("Saving {} spots into {}", catalog.len(), dest_file.display());
    catalog_utils::save_snapshot(catalog.snapshot().spots(), dest_file)?;
    Ok(())
}

fn do_main(matches: &ArgMatches) -> Result<(), Error> {
    match matches.subcommand() {
        ("recommend", Some(sub_matches)) => recommend_command(sub_matches),
        ("spots", Some(sub_matches)) => spots_command(sub_matches),
        ("snapshot", Some(sub_matches)) => snapshot_command(sub_matches),
        _ => Ok(()),
    }
}

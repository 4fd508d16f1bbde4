use std::sync::Arc;

use clap::{Parser, Subcommand};
use foundation::DistanceUnit;
use journey::ComparisonMode;
use planner::{HeadlessView, HydrationRequest, Planner, Services};
use services::{
    Geocoder, HttpClient, NominatimGeocoder, ReqwestClient, SearchResult, ServicesConfig,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod report;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plan a multi-stop journey on the globe")]
struct Args {
    /// Nominatim base URL (default: NOMINATIM_URL or the public instance)
    #[arg(long)]
    nominatim_url: Option<String>,

    /// REST Countries base URL (default: RESTCOUNTRIES_URL or the public API)
    #[arg(long)]
    restcountries_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List geocoding candidates for a place name
    Search {
        /// Free-text place name (at least 3 characters)
        query: String,
    },

    /// Resolve stops in order and print the legs
    Route {
        /// Place names, first to last
        stops: Vec<String>,

        /// Distance unit: km or mi
        #[arg(long, default_value = "km")]
        unit: DistanceUnit,

        /// Compare stops by distance, population or area
        #[arg(long, default_value = "distance")]
        compare: ComparisonMode,

        /// Start from the device position (JOURNEY_CURRENT_LOCATION)
        #[arg(long)]
        from_here: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut config = ServicesConfig::from_env();
    if let Some(url) = args.nominatim_url {
        config.nominatim_url = url;
    }
    if let Some(url) = args.restcountries_url {
        config.restcountries_url = url;
    }

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(&config.user_agent)?);
    let geocoder = NominatimGeocoder::from_config(Arc::clone(&http), &config);

    match args.command {
        Command::Search { query } => {
            let results = geocoder.search(&query).await.map_err(|e| e.user_message())?;
            if results.is_empty() {
                println!("No matches for {query:?}");
            }
            for line in report::render_results(&results) {
                println!("{line}");
            }
        }
        Command::Route {
            stops,
            unit,
            compare,
            from_here,
        } => {
            let services = Services::from_config(http, &config);
            let planner = plan_route(&geocoder, services, &stops, unit, compare, from_here).await?;
            print_route(&planner, compare);
        }
    }

    Ok(())
}

async fn resolve(geocoder: &NominatimGeocoder, stop: &str) -> Result<SearchResult, String> {
    let results = geocoder.search(stop).await.map_err(|e| e.user_message())?;
    let first = results
        .into_iter()
        .next()
        .ok_or_else(|| format!("No location found for {stop:?}"))?;
    info!(stop, resolved = %first.name, "stop resolved");
    Ok(first)
}

async fn plan_route(
    geocoder: &NominatimGeocoder,
    services: Services,
    stops: &[String],
    unit: DistanceUnit,
    compare: ComparisonMode,
    from_here: bool,
) -> Result<Planner<HeadlessView>, Box<dyn std::error::Error>> {
    let offset = usize::from(from_here);
    if stops.len() + offset < 2 {
        return Err("A journey needs at least two stops".into());
    }

    let mut planner = Planner::new(services, HeadlessView);
    planner.set_unit(unit);
    let mut requests = Vec::new();

    if from_here {
        planner
            .use_current_location()
            .await
            .map_err(|e| e.user_message())?;
    }

    for (i, stop) in stops.iter().enumerate() {
        let index = i + offset;
        while planner.journey().len() <= index {
            planner.append();
        }
        let result = resolve(geocoder, stop).await?;
        requests.extend(planner.select(index, &result)?);
    }

    hydrate(&mut planner, requests).await;
    let requests = planner.set_comparison_mode(compare);
    hydrate(&mut planner, requests).await;
    Ok(planner)
}

async fn hydrate(planner: &mut Planner<HeadlessView>, requests: Vec<HydrationRequest>) {
    let total = requests.len();
    let applied = planner.hydrate(requests).await;
    if applied < total {
        warn!(total, applied, "some lookups no longer matched a stop");
    }
}

fn print_route(planner: &Planner<HeadlessView>, compare: ComparisonMode) {
    for line in report::render_stops(planner.journey()) {
        println!("{line}");
    }
    println!();
    for line in report::render_legs(planner.journey(), planner.unit()) {
        println!("{line}");
    }

    let comparisons = report::render_comparisons(planner.journey(), compare);
    if !comparisons.is_empty() {
        println!();
        println!("{compare} comparison");
        for line in comparisons {
            println!("{line}");
        }
    }
}

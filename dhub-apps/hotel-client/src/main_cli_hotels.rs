//!  Dhub Hotel Client
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.
//!
//! # Examples
//!
//! Credentials are read from `X_API_KEY` / `X_SECRET_KEY` (or a `.env` file).
//!
//! ## List the remote tools
//!
//! ```bash
//! dhub-hotels tools
//! ```
//!
//! ## Search by hotel name
//!
//! ```bash
//! dhub-hotels name -k Tokyo -i 2026-12-01 -o 2026-12-03 --language zh-CN --page-size 10
//! ```
//!
//! ## Search around coordinates
//!
//! ```bash
//! dhub-hotels address --lat 43.88597 --lng 125.276516 -i 2026-11-21 -o 2026-11-23 --distance 3
//! ```
//!
//! ## Details and live price
//!
//! ```bash
//! dhub-hotels details --hotel-id 1364848
//! dhub-hotels price --hotel-id 1364848 -i 2026-12-01 -o 2026-12-03 -a 2 -c 1
//! ```
//!
//! # Output
//!
//! Tool results are printed to stdout exactly as the server returned them.
//! Logs go to stderr and to `logs/mcp_client.<date>.log`.

use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use dhub_hotel_client::{
    ClientConfig, Credentials, GeoPoint, HotelApiClient, HotelId, HotelSession,
    Language, Occupancy, SearchFilters, StayWindow, load_dotenv, telemetry,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "dhub-hotels")]
#[command(author, version, about = "Query the Dhub global hotel supply chain over MCP")]
struct Args {
    #[arg(long, env = "X_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "X_SECRET_KEY", hide_env_values = true)]
    secret_key: Option<String>,

    #[arg(long, help = "MCP endpoint [default: $DHUB_MCP_URL or the Dhub service]")]
    base_url: Option<String>,

    #[arg(
        long,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Handshake deadline in seconds [default: $DHUB_CONNECT_TIMEOUT_SECS or 30]"
    )]
    connect_timeout: Option<u64>,

    #[arg(
        long,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Per-call deadline in seconds [default: $DHUB_REQUEST_TIMEOUT_SECS or 60]"
    )]
    request_timeout: Option<u64>,

    #[arg(long, default_value = telemetry::DEFAULT_LOG_DIR)]
    log_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the tools advertised by the server
    Tools,

    /// Search hotels around a latitude/longitude
    Address {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lng: f64,
        #[command(flatten)]
        stay: StayArgs,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Search hotels by name or free-text keyword
    Name {
        #[arg(short = 'k', long)]
        keyword: String,
        #[command(flatten)]
        stay: StayArgs,
        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Fetch descriptive details for one hotel
    Details {
        #[arg(long)]
        hotel_id: u64,
        #[arg(short = 'l', long, default_value = "en-US")]
        language: String,
        #[arg(long, help = "Leave out facility information")]
        no_facility: bool,
    },

    /// Fetch live room rates for one hotel
    Price {
        #[arg(long)]
        hotel_id: u64,
        #[command(flatten)]
        stay: StayArgs,
        #[arg(short = 'a', long, default_value = "2")]
        adults: u32,
        #[arg(short = 'c', long, default_value = "0")]
        children: u32,
        #[arg(long, default_value = "CN", help = "ISO-3166 two-letter code")]
        nationality: String,
        #[arg(short = 'l', long, default_value = "en-US")]
        language: String,
    },

    /// Run one call of every tool against the live service
    Demo,
}

#[derive(ClapArgs, Debug)]
struct StayArgs {
    #[arg(short = 'i', long, help = "Check-in date (yyyy-MM-dd)")]
    checkin: String,
    #[arg(short = 'o', long, help = "Check-out date (yyyy-MM-dd)")]
    checkout: String,
}

impl StayArgs {
    fn window(&self) -> Result<StayWindow> {
        Ok(StayWindow::parse(&self.checkin, &self.checkout)?)
    }
}

#[derive(ClapArgs, Debug)]
struct FilterArgs {
    #[arg(short = 'l', long, default_value = "en-US")]
    language: String,
    #[arg(long, help = "Minimum price")]
    price_min: Option<f64>,
    #[arg(long, help = "Maximum price")]
    price_max: Option<f64>,
    #[arg(short = 's', long, value_delimiter = ',', help = "Star ratings (comma-separated)")]
    stars: Vec<String>,
    #[arg(short = 'd', long, default_value = "5", help = "Radius in km")]
    distance: u32,
    #[arg(short = 'n', long, default_value = "20", help = "Results per page (max 50)")]
    page_size: u32,
}

impl FilterArgs {
    fn filters(&self) -> Result<SearchFilters> {
        let stars: Vec<String> = self
            .stars
            .iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(SearchFilters::default()
            .language(self.language.parse()?)
            .price_min(self.price_min)
            .price_max(self.price_max)
            .star_ratings((!stars.is_empty()).then_some(stars))
            .distance(self.distance)
            .page_size(self.page_size))
    }
}

fn credentials(args: &Args) -> Result<Credentials> {
    let (Some(api_key), Some(secret_key)) = (&args.api_key, &args.secret_key) else {
        bail!("Set X_API_KEY and X_SECRET_KEY (environment, .env, or --api-key/--secret-key)");
    };
    Ok(Credentials::new(api_key.as_str(), secret_key.as_str())?)
}

async fn run_demo(session: &HotelSession, creds: &Credentials) {
    let today = chrono::Local::now().date_naive();
    let checkin = today + chrono::Duration::days(30);
    let Ok(stay) = StayWindow::new(checkin, checkin + chrono::Duration::days(2)) else {
        tracing::error!("Could not build demo stay window");
        return;
    };
    let hotel_id = HotelId(1364848);

    tracing::info!("{}", "=".repeat(60));
    tracing::info!("Dhub MCP client demo");
    tracing::info!("{}", "=".repeat(60));

    tracing::info!("Example 1: search by hotel name");
    let filters = SearchFilters::default().page_size(5);
    match session
        .search_hotels_by_hotel_name(creds, "长春", stay, filters)
        .await
    {
        Ok(result) => tracing::info!("Search results:\n{}", result),
        Err(e) => tracing::error!("Search failed: {}", e),
    }

    tracing::info!("Example 2: search by coordinates");
    match GeoPoint::new(43.88597, 125.276516) {
        Ok(geo) => {
            let filters = SearchFilters::default()
                .language(Language::ZhCn)
                .distance(5)
                .page_size(5);
            match session.search_hotels_by_address(creds, geo, stay, filters).await {
                Ok(result) => tracing::info!("Search results:\n{}", result),
                Err(e) => tracing::error!("Search failed: {}", e),
            }
        }
        Err(e) => tracing::error!("Bad demo coordinates: {}", e),
    }

    tracing::info!("Example 3: hotel details");
    match session
        .get_hotel_details(creds, hotel_id, Language::EnUs, true)
        .await
    {
        Ok(result) => tracing::info!("Hotel details:\n{}", result),
        Err(e) => tracing::error!("Details failed: {}", e),
    }

    tracing::info!("Example 4: hotel price");
    match session
        .check_hotel_price(creds, hotel_id, stay, Occupancy::default(), Language::EnUs)
        .await
    {
        Ok(result) => tracing::info!("Price information:\n{}", result),
        Err(e) => tracing::error!("Price check failed: {}", e),
    }

    tracing::info!("Demo finished");
}

async fn run(args: Args, session: &HotelSession) -> Result<()> {
    match &args.command {
        Command::Tools => {
            for tool in session.available_tools() {
                println!("{}: {}", tool.name, tool.description);
            }
        }
        Command::Address {
            lat,
            lng,
            stay,
            filters,
        } => {
            let creds = credentials(&args)?;
            let result = session
                .search_hotels_by_address(
                    &creds,
                    GeoPoint::new(*lat, *lng)?,
                    stay.window()?,
                    filters.filters()?,
                )
                .await?;
            println!("{}", result);
        }
        Command::Name {
            keyword,
            stay,
            filters,
        } => {
            let creds = credentials(&args)?;
            let result = session
                .search_hotels_by_hotel_name(&creds, keyword, stay.window()?, filters.filters()?)
                .await?;
            println!("{}", result);
        }
        Command::Details {
            hotel_id,
            language,
            no_facility,
        } => {
            let creds = credentials(&args)?;
            let result = session
                .get_hotel_details(&creds, HotelId(*hotel_id), language.parse()?, !no_facility)
                .await?;
            println!("{}", result);
        }
        Command::Price {
            hotel_id,
            stay,
            adults,
            children,
            nationality,
            language,
        } => {
            let creds = credentials(&args)?;
            let occupancy = Occupancy::new(*adults, *children, nationality.as_str())?;
            let result = session
                .check_hotel_price(
                    &creds,
                    HotelId(*hotel_id),
                    stay.window()?,
                    occupancy,
                    language.parse()?,
                )
                .await?;
            println!("{}", result);
        }
        Command::Demo => {
            let creds = credentials(&args)?;
            run_demo(session, &creds).await;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    load_dotenv();
    let args = Args::parse();
    let _log_guard = telemetry::init_tracing(&args.log_dir)?;
    tracing::debug!("Parsed args: {:?}", args.command);

    let mut config = ClientConfig::from_env()?;
    if let Some(url) = &args.base_url {
        config.base_url = url.clone();
    }
    if let Some(secs) = args.connect_timeout {
        config.connect_timeout = Duration::from_secs(secs);
    }
    if let Some(secs) = args.request_timeout {
        config.request_timeout = Duration::from_secs(secs);
    }
    let client = HotelApiClient::new(config);
    let session = client
        .connect()
        .await
        .context("Failed to connect to the Dhub MCP server")?;

    let outcome = run(args, &session).await;
    if let Err(e) = session.close().await {
        tracing::warn!("{}", e);
    }
    outcome.context("Request failed")
}

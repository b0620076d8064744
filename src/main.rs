mod analysis;
mod api;
mod cache;
mod config;
mod crawl;
mod display;
mod error;
mod icons;
mod model;
mod rate_limit;
mod store;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use analysis::{PlacementStats, Rankings};
use anyhow::{bail, Context};
use api::client::RiotApiClient;
use clap::{Parser, Subcommand};
use config::{ArenaFormat, Config, CrawlConfig, PacingConfig, SeedPlayer};
use crawl::{CancelFlag, Crawler};
use display::output::{
    display_best_champions, display_best_pairs, display_champion_report, display_crawl_report, display_error,
    display_icon_report, display_info, display_pair_report, display_success, display_total_matches,
};
use error::AppError;
use indicatif::{ProgressBar, ProgressStyle};
use model::Champion;
use store::{CsvDirectory, MemoryTables, PlacementStore, TableKind};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "Arena Stats")]
#[command(about = "Crawl Arena matches and rank champions and duos by placement", long_about = None)]
struct Cli {
    /// Number of teams per Arena match (4 or 8)
    #[arg(long, global = true, default_value = "8")]
    teams: usize,

    /// Directory holding the CSV tables (default: $ARENA_DATA_DIR or ~/.arena_stats)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Platform id of the seed player (default: $RIOT_REGION or euw1)
    #[arg(short, long, global = true)]
    region: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save the most recent Arena matches of one player
    SaveRecent {
        #[command(flatten)]
        seed: SeedArgs,

        /// Number of recent matches to look at
        #[arg(short, long, default_value = "20")]
        count: usize,
    },

    /// Crawl outward from a seed player until enough new matches are saved
    Crawl {
        #[command(flatten)]
        seed: SeedArgs,

        /// Number of new matches to record
        #[arg(short, long, default_value = "100")]
        target: usize,

        /// Match ids requested per player
        #[arg(long, default_value = "10")]
        per_player: usize,

        /// Stop after this many minutes
        #[arg(long)]
        time_budget_mins: Option<u64>,

        /// Crawl against an in-memory copy of the tables
        #[arg(long)]
        dry_run: bool,
    },

    /// Zero all placements and forget recorded matches
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Register a new champion
    AddChampion { name: String },

    /// Show totals and the best champions and duos
    Stats {
        /// Number of rows per ranking
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show the placement report of one champion
    Champion {
        name: String,

        /// Number of teammates to list
        #[arg(short, long, default_value = "5")]
        limit: usize,
    },

    /// Show how one duo has placed together
    Pair { first: String, second: String },

    /// Download champion icons from Community Dragon
    FetchIcons {
        /// Output directory (default: <data dir>/champion_icons)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Highest champion id to try, exclusive
        #[arg(long, default_value = "1000")]
        max_id: u32,

        #[arg(short, long, default_value = "5")]
        workers: usize,
    },
}

#[derive(clap::Args, Debug)]
struct SeedArgs {
    /// Riot game name of the seed player (default: $MY_SUMMONER_NAME)
    #[arg(long)]
    name: Option<String>,

    /// Riot tag line of the seed player (default: $MY_TAGLINE)
    #[arg(long)]
    tag: Option<String>,
}

impl SeedArgs {
    fn resolve(self, config: &Config) -> Result<SeedPlayer, AppError> {
        match (self.name, self.tag) {
            (Some(game_name), Some(tag_line)) => Ok(SeedPlayer { game_name, tag_line }),
            _ => config.seed.clone().ok_or(AppError::MissingSeed),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry().with(filter).with(fmt::layer()).init();

    if let Err(e) = run(cli) {
        display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(region) = cli.region {
        config.region = region;
    }
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    let format = ArenaFormat::supported(cli.teams)?;

    match cli.command {
        Command::SaveRecent { seed, count } => save_recent(&config, format, seed.resolve(&config)?, count),
        Command::Crawl {
            seed,
            target,
            per_player,
            time_budget_mins,
            dry_run,
        } => {
            let mut crawl_config = CrawlConfig::new(format, target);
            crawl_config.matches_per_player = per_player;
            crawl_config.time_budget = time_budget_mins.map(|mins| Duration::from_secs(mins * 60));
            crawl(&config, crawl_config, seed.resolve(&config)?, dry_run)
        }
        Command::Reset { yes } => reset(&config, format, yes),
        Command::AddChampion { name } => {
            let mut store = open_store(&config, format)?;
            let champion = Champion::of(&name);
            store
                .add_champion(champion.clone())
                .with_context(|| format!("could not add champion '{}'", name))?;
            display_success(&format!("Added {} ({} champions registered)", champion, store.roster().len()));
            Ok(())
        }
        Command::Stats { limit } => {
            let store = open_store(&config, format)?;
            let stats = PlacementStats::new(store.matrix());
            display_total_matches(&stats);
            display_best_champions(&Rankings::best_champions(&stats, limit));
            display_best_pairs(&Rankings::best_pairs(&stats, limit));
            Ok(())
        }
        Command::Champion { name, limit } => {
            let store = open_store(&config, format)?;
            let stats = PlacementStats::new(store.matrix());
            let champion = Champion::of(&name);
            let teammates =
                Rankings::best_teammates_for(&stats, &champion, limit).ok_or(AppError::UnknownChampion(name))?;
            display_champion_report(&stats, &champion, &teammates);
            Ok(())
        }
        Command::Pair { first, second } => {
            let store = open_store(&config, format)?;
            let stats = PlacementStats::new(store.matrix());
            let (first, second) = (Champion::of(&first), Champion::of(&second));
            let counts = stats
                .pairwise_placements(&first, &second)
                .ok_or_else(|| unknown_of(&stats, &[&first, &second]))?;
            display_pair_report(&stats, &first, &second, &counts);
            Ok(())
        }
        Command::FetchIcons { dir, max_id, workers } => {
            let dir = dir.unwrap_or_else(|| config.data_dir.join("champion_icons"));
            display_info(&format!("Downloading champion icons into {}", dir.display()));
            let report = icons::download_all(&dir, max_id, workers)
                .with_context(|| format!("could not prepare {}", dir.display()))?;
            display_icon_report(&report);
            Ok(())
        }
    }
}

/// Names the first of `champions` that is not registered.
fn unknown_of(stats: &PlacementStats, champions: &[&Champion]) -> AppError {
    let missing = champions
        .iter()
        .copied()
        .find(|c| stats.matrix().index_of(c).is_none())
        .or(champions.first().copied());
    AppError::UnknownChampion(missing.map(Champion::to_string).unwrap_or_default())
}

fn open_store(config: &Config, format: ArenaFormat) -> anyhow::Result<PlacementStore> {
    PlacementStore::open_dir(&config.data_dir, format)
        .with_context(|| format!("could not open tables in {}", config.data_dir.display()))
}

fn client(config: &Config) -> Result<RiotApiClient, AppError> {
    let api_key = config.require_api_key()?;
    Ok(RiotApiClient::new(api_key, &config.region, PacingConfig::default()))
}

fn save_recent(config: &Config, format: ArenaFormat, seed: SeedPlayer, count: usize) -> anyhow::Result<()> {
    let client = client(config)?;
    let mut store = open_store(config, format)?;

    display_info(&format!(
        "Saving the last {} matches of {}#{} in region {}",
        count, seed.game_name, seed.tag_line, config.region
    ));

    let mut crawler = Crawler::new(&client, &mut store, CrawlConfig::new(format, count));
    let puuid = crawler.resolve_seed(&seed.game_name, &seed.tag_line)?;
    let report = crawler.save_recent(&puuid, count)?;

    display_crawl_report(&report);
    client.usage().display_status();
    Ok(())
}

fn crawl(config: &Config, crawl_config: CrawlConfig, seed: SeedPlayer, dry_run: bool) -> anyhow::Result<()> {
    let client = client(config)?;
    let format = crawl_config.format;

    let mut store = if dry_run {
        let kinds = [
            TableKind::ChampionNames,
            TableKind::Placements { team_count: format.team_count },
            TableKind::RecordedMatches { team_count: format.team_count },
        ];
        let snapshot = MemoryTables::snapshot_of(&CsvDirectory::new(&config.data_dir), &kinds)?;
        display_info("Dry run: nothing will be written to disk");
        PlacementStore::open(Box::new(snapshot), format)?
    } else {
        open_store(config, format)?
    };
    if store.roster().is_empty() {
        bail!(
            "no champions registered in {}; use add-champion first",
            config.data_dir.display()
        );
    }

    let pb = ProgressBar::new(crawl_config.target_matches as u64);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {pos}/{len} matches {msg}") {
        pb.set_style(style);
    }

    // Enter on stdin stops the crawl at the next iteration
    let cancel = CancelFlag::new();
    let stopper = cancel.clone();
    thread::spawn(move || {
        stopper.cancel_on_line(io::stdin().lock());
    });

    display_info(&format!(
        "Crawling from {}#{} for {} new matches (press Enter to stop)",
        seed.game_name, seed.tag_line, crawl_config.target_matches
    ));

    let mut crawler = Crawler::new(&client, &mut store, crawl_config)
        .with_cancel_flag(cancel)
        .with_progress(pb);
    let puuid = crawler.resolve_seed(&seed.game_name, &seed.tag_line)?;
    let report = crawler.run(puuid)?;

    info!("Crawl finished with {} matches recorded in total", store.recorded_match_ids().len());
    display_crawl_report(&report);
    client.usage().display_status();
    Ok(())
}

fn reset(config: &Config, format: ArenaFormat, yes: bool) -> anyhow::Result<()> {
    let mut store = open_store(config, format)?;

    if !yes {
        print!(
            "Reset {} recorded {}-team matches in {}? [y/N] ",
            store.recorded_match_ids().len(),
            format.team_count,
            config.data_dir.display()
        );
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes") {
            display_info("Reset cancelled");
            return Ok(());
        }
    }

    store.reset()?;
    display_success(&format!("Reset {}-team placement data", store.team_count()));
    Ok(())
}

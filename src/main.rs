use clap::{Parser, Subcommand};
use tokio::sync::broadcast;
use tracing_subscriber::EnvFilter;

use music_recommender_client::{
    config::Config,
    models::{Rating, RecommendationResult},
    services::RecommendationParams,
    session::{NoticeLevel, SessionEvent, SessionState, SongFilter},
    AppError, Recommender,
};

/// Used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Parser)]
#[command(name = "music-recommender", about = "Rate songs and get recommendations")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show dataset statistics and service health
    Stats,
    /// List songs with their current rating
    Songs {
        #[arg(long, value_enum, default_value_t = SongFilter::All)]
        filter: SongFilter,
        #[arg(long, default_value = "")]
        search: String,
    },
    /// Rate a song; rating it again with the same stars removes the rating
    Rate {
        song: String,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=5))]
        stars: u8,
    },
    /// Delete every rating
    Reset,
    /// Get a classification and ranked recommendations
    Recommend {
        #[arg(long)]
        results: Option<u32>,
        #[arg(long)]
        neighbors: Option<u32>,
    },
    /// Get only the classification
    Classify {
        #[arg(long)]
        neighbors: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let app = Recommender::from_config(&config)?;

    let events = app.session().subscribe();
    app.bootstrap().await;

    let outcome = run_command(&app, cli.command).await;
    print_notices(events);

    // Failures were already reported as notices
    match outcome {
        Ok(()) => Ok(()),
        Err(AppError::NotEligible { .. }) => std::process::exit(2),
        Err(_) => std::process::exit(1),
    }
}

async fn run_command(app: &Recommender, command: Command) -> Result<(), AppError> {
    match command {
        Command::Stats => {
            let state = app.session().snapshot().await;
            print_stats(&state);
            match app.client().health().await {
                Ok(health) => println!(
                    "Service: {} ({}), dataset loaded: {}",
                    health.service, health.status, health.dataset_loaded
                ),
                Err(e) => println!("Service health unavailable: {}", e),
            }
        }
        Command::Songs { filter, search } => {
            app.session().set_filter(filter).await;
            app.session().set_search_query(search).await;
            print_songs(&app.session().snapshot().await);
        }
        Command::Rate { song, stars } => {
            // The argument parser already restricts stars to 1..=5
            if let Some(rating) = Rating::new(stars) {
                let outcome = app.ratings().apply_rating(&song, rating).await;
                let state = app.session().snapshot().await;
                if !state.catalog.is_empty() && !state.catalog.contains(&outcome.song) {
                    println!("Note: '{}' is not in the catalog", outcome.song);
                }
                print_progress(&state);
            }
        }
        Command::Reset => {
            app.ratings().reset().await;
        }
        Command::Recommend { results, neighbors } => {
            let defaults = app.recommendations().params();
            let params = RecommendationParams {
                max_results: results.unwrap_or(defaults.max_results),
                neighbor_count: neighbors.unwrap_or(defaults.neighbor_count),
            };
            let result = app.recommendations().run_with(params).await?;
            print_recommendations(&result);
        }
        Command::Classify { neighbors } => {
            let defaults = app.recommendations().params();
            let params = RecommendationParams {
                neighbor_count: neighbors.unwrap_or(defaults.neighbor_count),
                ..defaults
            };
            let classification = app.recommendations().classify_with(params).await?;
            println!("Category: {}", classification.category);
            println!("Mean similarity: {:.3}", classification.mean_similarity);
            println!(
                "Neighbourhood rating: {:.2}",
                classification.neighborhood_average_rating
            );
        }
    }

    Ok(())
}

fn print_stats(state: &SessionState) {
    match &state.stats {
        Some(stats) => {
            println!("Songs: {}", stats.song_count);
            println!("Users: {}", stats.user_count);
            println!("Average rating: {:.1}", stats.global_average_rating);
            if let Some(density) = stats.density_percent {
                println!("Density: {:.2}%", density);
            }
        }
        None => println!("Statistics unavailable"),
    }
}

fn print_songs(state: &SessionState) {
    let visible = state.visible_songs();
    if visible.is_empty() {
        println!("No songs found. Try another search or filter.");
    }
    for song in visible {
        let stars = state.rating_of(song).map(Rating::value).unwrap_or(0);
        let bar: String = (1..=Rating::MAX)
            .map(|star| if star <= stars { '★' } else { '☆' })
            .collect();
        println!("{} {}", bar, song);
    }
    print_progress(state);
}

fn print_progress(state: &SessionState) {
    println!(
        "Rated {} of {} songs ({:.1}%)",
        state.rated_count(),
        state.catalog.len(),
        state.progress_percent()
    );
    if state.is_eligible_for_recommendation() {
        println!("Ready for recommendations");
    } else {
        println!("Rate at least {} more songs", state.ratings_needed());
    }
}

fn print_recommendations(result: &RecommendationResult) {
    let classification = &result.classification;
    println!("Category: {}", classification.category);
    println!("Mean similarity: {:.3}", classification.mean_similarity);
    println!(
        "Neighbourhood rating: {:.2}",
        classification.neighborhood_average_rating
    );
    println!(
        "Songs rated per neighbour: {}",
        classification.neighborhood_songs_rated.round()
    );

    if result.recommendations.is_empty() {
        println!("No recommendations available");
        return;
    }

    for (index, item) in result.recommendations.iter().enumerate() {
        println!(
            "#{:<3} {:<40} score {:.2}  rating {:.2}  ({} neighbours)",
            index + 1,
            item.name,
            item.predicted_score,
            item.neighbor_average_rating,
            item.neighbor_count
        );
    }
}

fn print_notices(mut events: broadcast::Receiver<SessionEvent>) {
    while let Ok(event) = events.try_recv() {
        if let SessionEvent::Notice(notice) = event {
            let prefix = match notice.level {
                NoticeLevel::Success => "ok",
                NoticeLevel::Warning => "warning",
                NoticeLevel::Error => "error",
            };
            eprintln!("[{}] {}", prefix, notice.message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_default_log_filter_is_info() {
        let filter = EnvFilter::new(DEFAULT_LOG_FILTER);
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_classify_accepts_neighbors() {
        let cli = Cli::try_parse_from(["music-recommender", "classify", "--neighbors", "5"]).unwrap();
        assert!(matches!(cli.command, Command::Classify { neighbors: Some(5) }));

        let cli = Cli::try_parse_from(["music-recommender", "classify"]).unwrap();
        assert!(matches!(cli.command, Command::Classify { neighbors: None }));
    }

    #[test]
    fn test_songs_filter_parses_into_song_filter() {
        let cli = Cli::try_parse_from(["music-recommender", "songs", "--filter", "unrated"]).unwrap();
        match cli.command {
            Command::Songs { filter, search } => {
                assert_eq!(filter, SongFilter::Unrated);
                assert!(search.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rate_rejects_out_of_range_stars() {
        assert!(Cli::try_parse_from(["music-recommender", "rate", "Clocks", "6"]).is_err());
    }
}

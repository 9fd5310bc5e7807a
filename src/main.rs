use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use stashbrowse::api::{Entity, format_duration};
use stashbrowse::cli::{Cli, Commands};
use stashbrowse::filter::{FindFilter, MultiCriterion, SceneFilter, SortDirection};
use stashbrowse::recommend;
use stashbrowse::settings::{self, Settings};
use stashbrowse::{FetchCoordinator, StashClient};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_dir = settings::config_dir(cli.config_dir.as_ref());
    let _log_guard = init_logging(&cli, config_dir.as_ref());

    let settings = config_dir
        .as_ref()
        .map(|dir| {
            let path = settings::settings_path(dir);
            Settings::load(&path).unwrap_or_else(|e| {
                eprintln!("Warning: {}", e);
                Settings::default()
            })
        })
        .unwrap_or_default();

    let endpoint = cli
        .endpoint
        .clone()
        .or_else(|| settings.resolve_endpoint())
        .context(
            "No GraphQL endpoint configured. Pass --endpoint, set STASH_GRAPHQL_URL, \
             or add graphql_url to settings.toml",
        )?;
    let api_key = cli.api_key.clone().or_else(|| settings.resolve_api_key());
    let per_page = cli.per_page.unwrap_or_else(|| settings.page_size());

    let client = StashClient::new(endpoint, api_key);

    match cli.command {
        Commands::Scenes {
            query,
            tag,
            studio,
            performer,
            pages,
        } => {
            let mut filter = FindFilter::new().sort("date", SortDirection::Desc);
            if let Some(q) = query {
                filter = filter.query(q);
            }
            let scene_filter = SceneFilter {
                tags: (!tag.is_empty()).then(|| MultiCriterion::includes_all(tag)),
                studios: studio.map(|id| MultiCriterion::includes_all(vec![id])),
                performers: performer.map(|id| MultiCriterion::includes_all(vec![id])),
            };
            let coord = client.paginated_scenes(per_page);
            run_pages(coord, filter, Some(scene_filter), pages, |scene| {
                println!(
                    "{:>6}  {:<50}  {:>8}  {}",
                    scene.id,
                    scene.display_title(),
                    format_duration(scene.duration_secs()),
                    scene.studio.as_ref().map(|s| s.name.as_str()).unwrap_or("-"),
                );
            })
            .await
        }
        Commands::Tags { query, pages } => {
            let filter = FindFilter::new()
                .query(query)
                .sort("name", SortDirection::Asc);
            let coord = client.paginated_tags(per_page);
            run_pages(coord, filter, None, pages, |tag| {
                println!("{:>6}  {}", tag.id, tag.name);
            })
            .await
        }
        Commands::Performers { query, pages } => {
            let filter = FindFilter::new()
                .query(query)
                .sort("name", SortDirection::Asc);
            let coord = client.paginated_performers(per_page);
            run_pages(coord, filter, None, pages, |performer| {
                println!("{:>6}  {}", performer.id, performer.name);
            })
            .await
        }
        Commands::Studios { query, pages } => {
            let filter = FindFilter::new()
                .query(query)
                .sort("name", SortDirection::Asc);
            let coord = client.paginated_studios(per_page);
            run_pages(coord, filter, None, pages, |studio| {
                println!("{:>6}  {}", studio.id, studio.name);
            })
            .await
        }
        Commands::Recommend { scene_id } => show_recommendations(&client, &scene_id).await,
    }
}

/// Drive a coordinator the way a scrolling UI would: load the first page,
/// then repeatedly bring the sentinel into view until enough pages loaded
/// or the partition is exhausted.
async fn run_pages<T, F>(
    mut coord: FetchCoordinator<T>,
    filter: FindFilter,
    scene_filter: Option<SceneFilter>,
    pages: u32,
    print: F,
) -> Result<()>
where
    T: Entity + Send + 'static,
    F: Fn(&T),
{
    coord.set_filter(filter, scene_filter);

    let mut fetched = 0u32;
    let mut printed = 0usize;
    while let Some(settled) = coord.settled().await {
        coord.apply_settled(settled);
        fetched += 1;

        let (has_more, error) = {
            let snap = coord.snapshot();
            for item in &snap.items[printed..] {
                print(item);
            }
            printed = snap.items.len();
            (snap.has_more, snap.error.map(str::to_string))
        };

        if let Some(error) = error {
            bail!("{error}");
        }
        if !has_more || fetched >= pages {
            break;
        }

        coord.sensor().on_intersection(1.0);
        coord.poll();
    }

    if printed == 0 {
        println!("No results.");
    } else if coord.has_more() {
        println!("... {printed} loaded, more available");
    }
    Ok(())
}

async fn show_recommendations(client: &StashClient, scene_id: &str) -> Result<()> {
    let Some(current) = client
        .find_scene(scene_id)
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?
    else {
        bail!("Scene '{scene_id}' not found");
    };

    // Pull a candidate pool of recent scenes sharing any of the current
    // scene's first three tags; too many tags over-restricts the pool.
    let tag_ids: Vec<String> = current.tags.iter().take(3).map(|t| t.id.clone()).collect();
    let scene_filter = (!tag_ids.is_empty()).then(|| SceneFilter {
        tags: Some(MultiCriterion::includes_any(tag_ids)),
        ..Default::default()
    });
    let filter = FindFilter::new()
        .sort("date", SortDirection::Desc)
        .page(1, 20);
    let candidates = client
        .find_scenes(&filter, scene_filter.as_ref())
        .await
        .map_err(|e| anyhow::anyhow!(e.user_message()))?;

    let mut rng = rand::rng();
    let recs = recommend::recommend(&current, &candidates.items, &mut rng);

    if recs.is_empty() {
        println!("No recommendations for '{}'.", current.display_title());
        return Ok(());
    }

    println!("Related to '{}':", current.display_title());
    for rec in recs {
        let matches = if rec.tag_matches > 0 {
            format!("{} shared tags", rec.tag_matches)
        } else {
            "random pick".to_string()
        };
        println!(
            "{:>6}  {:<50}  {:>8}  ({matches})",
            rec.scene.id,
            rec.scene.display_title(),
            format_duration(rec.scene.duration_secs()),
        );
    }
    Ok(())
}

fn init_logging(cli: &Cli, config_dir: Option<&PathBuf>) -> Option<WorkerGuard> {
    if cli.verbose
        && let Some(dir) = config_dir
    {
        let path = settings::log_path(dir);
        let _ = std::fs::create_dir_all(dir);
        let appender = tracing_appender::rolling::never(dir, "stashbrowse.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("stashbrowse=debug"))
            .with_writer(writer)
            .with_ansi(false)
            .init();
        eprintln!("Logging to {}", path.display());
        return Some(guard);
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stashbrowse=warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    None
}

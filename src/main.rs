use achievement_sync::achievements::{bundled_catalog, load_catalog_file, AchievementCatalog};
use achievement_sync::session::{Credentials, SessionConfig};
use achievement_sync::sync::{HttpRemoteClient, SyncCoordinator, UploadStatus};
use achievement_sync::build_info;
use achievement_sync::utils::persistence::data_dir;
use std::io;
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

type Coordinator = SyncCoordinator<HttpRemoteClient>;

fn print_help() {
    println!("Achievement Sync - local achievements reconciled with the achievement service\n");
    println!("Usage: achievement-sync <command>\n");
    println!("Commands:");
    println!("  sync                    Fetch and merge remote achievement state");
    println!("  unlock <id>             Unlock an achievement and queue it for upload");
    println!("  progress <id> <value>   Set achievement progress and queue it");
    println!("  flush                   Upload queued changes");
    println!("  status                  Show achievements and queued changes");
    println!("  score <n>               Upload a score");
    println!("  highscores              Show the top scores");
    println!("  --version               Show version information");
    println!("  --help                  Show this help message");
    println!("\nEnvironment:");
    println!("  ACHIEVEMENT_SYNC_USER_ID, ACHIEVEMENT_SYNC_ACCESS_TOKEN  login identity");
    println!("  ACHIEVEMENT_SYNC_GAME_ID, ACHIEVEMENT_SYNC_GAME_SECRET   game settings");
    println!("  ACHIEVEMENT_SYNC_DIR                                     save directory");
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_shipped(config: &SessionConfig) -> io::Result<AchievementCatalog> {
    let result = match &config.catalog_path {
        Some(path) => load_catalog_file(path),
        None => bundled_catalog(),
    };
    result.map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Build a coordinator and run the start of the session.
fn open_session(dir: &Path) -> io::Result<Coordinator> {
    let config = SessionConfig::load(dir);
    let shipped = load_shipped(&config)?;
    let credentials = Credentials::from_env();

    let client = match &credentials {
        Some(c) => HttpRemoteClient::new(
            &config.api_base_url,
            &c.access_token,
            &c.user_id,
            &config.game_secret,
        ),
        None => HttpRemoteClient::new(&config.api_base_url, "", "", &config.game_secret),
    };

    let mut coordinator = SyncCoordinator::new(client, config, dir, shipped);
    let online = coordinator.start_session(credentials.map(|c| c.user_id));
    if !online {
        println!("Playing offline this session ({}).", coordinator.state().name());
    }
    Ok(coordinator)
}

fn print_status(coordinator: &Coordinator) {
    let catalog = coordinator.catalog();
    println!(
        "State: {}   Unlocked: {}/{}   Points: {}",
        coordinator.state().name(),
        catalog.unlocked_count(),
        catalog.len(),
        catalog.total_points()
    );
    let mut categories: Vec<&str> = Vec::new();
    for a in &catalog.achievements {
        if !categories.contains(&a.category.as_str()) {
            categories.push(&a.category);
        }
    }
    for category in categories {
        let (unlocked, total) = catalog.count_by_category(category);
        println!("{} ({}/{})", category, unlocked, total);
        for a in catalog.achievements.iter().filter(|a| a.category == category) {
            let mark = if a.is_unlocked() { "x" } else { " " };
            println!(
                "  [{}] {:<20} {:>4}/{:<4} {:>3.0}%  {}",
                mark,
                a.id,
                a.unlock_progress,
                a.unlock_requirement,
                a.progress_percentage(),
                a.title
            );
        }
    }
    let pending = coordinator.pending();
    println!(
        "Pending: {} unlock(s), {} progress update(s)",
        pending.unlock_count(),
        pending.progress_count()
    );
}

fn report_upload(status: &UploadStatus) -> ExitCode {
    match status {
        UploadStatus::Complete {
            unlocks_pushed,
            progress_saved,
        } => {
            println!(
                "Achievement upload complete ({} unlock(s), {} progress update(s)).",
                unlocks_pushed, progress_saved
            );
            ExitCode::SUCCESS
        }
        UploadStatus::Failed(e) => {
            eprintln!("Achievement upload failed: {}", e);
            eprintln!("Queued changes were kept and will be retried.");
            ExitCode::FAILURE
        }
        UploadStatus::Skipped => {
            println!("Achievement upload skipped; changes stay queued.");
            ExitCode::SUCCESS
        }
    }
}

fn run(args: &[String]) -> io::Result<ExitCode> {
    let dir = data_dir()?;

    match args[1].as_str() {
        "sync" | "status" => {
            let coordinator = open_session(&dir)?;
            print_status(&coordinator);
        }
        "unlock" => {
            let Some(id) = args.get(2) else {
                eprintln!("Usage: achievement-sync unlock <id>");
                return Ok(ExitCode::FAILURE);
            };
            let mut coordinator = open_session(&dir)?;
            if !coordinator.record_unlock(id) {
                println!("{} is unknown or already unlocked.", id);
                return Ok(ExitCode::SUCCESS);
            }
            if !coordinator.checkpoint() {
                eprintln!("Failed to save the unlock of {}; it was not queued.", id);
                return Ok(ExitCode::FAILURE);
            }
            println!("Unlocked {}.", id);
        }
        "progress" => {
            let (Some(id), Some(value)) = (args.get(2), args.get(3)) else {
                eprintln!("Usage: achievement-sync progress <id> <value>");
                return Ok(ExitCode::FAILURE);
            };
            let Ok(value) = value.parse::<i32>() else {
                eprintln!("Progress must be a whole number: {}", value);
                return Ok(ExitCode::FAILURE);
            };
            let mut coordinator = open_session(&dir)?;
            if !coordinator.record_progress(id, value) {
                eprintln!("Unknown achievement: {}", id);
                return Ok(ExitCode::FAILURE);
            }
            if !coordinator.checkpoint() {
                eprintln!("Failed to save progress for {}; it was not queued.", id);
                return Ok(ExitCode::FAILURE);
            }
            println!("Progress for {} set to {}.", id, value);
        }
        "flush" => {
            let mut coordinator = open_session(&dir)?;
            let status = coordinator.flush();
            return Ok(report_upload(&status));
        }
        "score" => {
            let Some(Ok(score)) = args.get(2).map(|s| s.parse::<i64>()) else {
                eprintln!("Usage: achievement-sync score <n>");
                return Ok(ExitCode::FAILURE);
            };
            let coordinator = open_session(&dir)?;
            if coordinator.upload_score(score) {
                println!("Score upload complete.");
            } else {
                eprintln!("Score upload failed.");
                return Ok(ExitCode::FAILURE);
            }
        }
        "highscores" => {
            let coordinator = open_session(&dir)?;
            match coordinator.highscores() {
                Some(scores) => {
                    for (rank, s) in scores.iter().enumerate() {
                        let me = if s.belongs_to_user { " (you)" } else { "" };
                        println!("{:>2}. {:<12} {:>8}{}", rank + 1, s.tag, s.score, me);
                    }
                }
                None => {
                    eprintln!("Highscore load failed.");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        other => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Run 'achievement-sync --help' for usage.");
            return Ok(ExitCode::FAILURE);
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("--help") | Some("-h") => {
            print_help();
            return ExitCode::SUCCESS;
        }
        Some("--version") | Some("-v") => {
            println!("{}", build_info::version_string());
            return ExitCode::SUCCESS;
        }
        Some(_) => {}
    }

    init_tracing();
    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

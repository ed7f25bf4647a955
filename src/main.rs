//! Wiring & DI. Entry point: bootstrap adapters, inject into the game
//! service, run the update loop.
//! No business logic here; scoring and round rules live in the use cases.

use dotenv::dotenv;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use wortrunde::adapters::persistence::JsonScoreStore;
use wortrunde::adapters::telegram::GrammersChatGateway;
use wortrunde::domain::WordCatalog;
use wortrunde::ports::{NotifierPort, ScoreStorePort, UpdateSource};
use wortrunde::shared::config::BotConfig;
use wortrunde::usecases::{GameService, GameSettings, ScoreLedger};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    let cfg = BotConfig::load().unwrap_or_default();
    let api_hash = cfg
        .api_hash
        .clone()
        .or_else(|| std::env::var("WORTRUNDE_API_HASH").ok())
        .unwrap_or_default();
    if api_hash.is_empty() {
        anyhow::bail!("Set WORTRUNDE_API_HASH (env or .env). Get from https://my.telegram.org");
    }
    let bot_token = cfg
        .bot_token
        .clone()
        .ok_or_else(|| anyhow::anyhow!("Set WORTRUNDE_BOT_TOKEN (or BOT_TOKEN) in .env"))?;

    // --- Word catalog: a list that does not parse is fatal, the game never
    // runs on a partial catalog ---
    let words_path = cfg.words_path_or_default();
    let words_text = tokio::fs::read_to_string(&words_path)
        .await
        .map_err(|e| anyhow::anyhow!("read word list {}: {}", words_path, e))?;
    let catalog = Arc::new(
        WordCatalog::parse(&words_text).map_err(|e| anyhow::anyhow!("{}", e))?,
    );
    info!(path = %words_path, words = catalog.len(), "word catalog loaded");

    // --- Score ledger: restore is tolerant, a corrupt file starts empty ---
    let store: Arc<dyn ScoreStorePort> =
        Arc::new(JsonScoreStore::new(cfg.scores_path_or_default()));
    let ledger = Arc::new(ScoreLedger::new(store, cfg.ledger_scope()));
    ledger.restore().await;

    // --- Telegram client + bot sign-in ---
    let tg_client = create_telegram_client(&cfg, &PathBuf::from(cfg.session_path_or_default())).await?;
    let gateway = Arc::new(GrammersChatGateway::new(tg_client));
    gateway
        .ensure_bot_authorized(&bot_token, &api_hash)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    // --- Game service ---
    let settings = GameSettings {
        selection: cfg.selection_mode(),
        points: cfg.point_values(),
        admin_id: cfg.admin_id.clone(),
        round_interval: cfg.round_interval(),
        rotation_grace: cfg.rotation_grace(),
    };
    info!(
        selection = ?settings.selection,
        interval_secs = settings.round_interval.as_secs(),
        admin = settings.admin_id.as_deref().unwrap_or("<anyone>"),
        "game service ready"
    );
    let service = Arc::new(GameService::new(
        catalog,
        ledger,
        Arc::clone(&gateway) as Arc<dyn NotifierPort>,
        settings,
    ));

    // --- Update loop: one spawned task per event, so groups progress in
    // parallel while each group serializes on its own state lock ---
    let updates: Arc<dyn UpdateSource> = gateway;
    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                info!("shutdown signal received");
                break;
            }
            event = updates.next_event() => match event {
                Ok(Some(event)) => {
                    let service = Arc::clone(&service);
                    tokio::spawn(async move {
                        service.handle_event(event).await;
                    });
                }
                Ok(None) => {
                    info!("update stream closed");
                    break;
                }
                Err(e) => warn!(error = %e, "update stream error"),
            }
        }
    }

    service.shutdown().await;
    Ok(())
}

/// Create grammers Client with persistent session storage.
/// Loads existing session from `session_path` if present; otherwise a new
/// session is created and saved after the bot signs in. Requires
/// WORTRUNDE_API_ID (and WORTRUNDE_API_HASH for sign-in).
async fn create_telegram_client(
    cfg: &BotConfig,
    session_path: &std::path::Path,
) -> anyhow::Result<grammers_client::Client> {
    let api_id = cfg
        .api_id
        .or_else(|| {
            std::env::var("WORTRUNDE_API_ID")
                .ok()
                .and_then(|s| s.parse().ok())
        })
        .unwrap_or(0);

    if api_id == 0 {
        anyhow::bail!(
            "Set WORTRUNDE_API_ID (and WORTRUNDE_API_HASH) in .env. Get from https://my.telegram.org"
        );
    }

    let session = wortrunde::adapters::telegram::session::open_file_session(session_path).await?;
    let session = Arc::new(session);
    let pool = grammers_client::SenderPool::new(session, api_id);
    let handle = pool.handle.clone();
    tokio::spawn(async move {
        pool.runner.run().await;
    });
    let client = grammers_client::Client::new(handle);

    Ok(client)
}

//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use legal_intake::adapters::api::{HttpSubmitGateway, MockSubmitGateway};
use legal_intake::adapters::host::{NoopHost, TelegramHost};
use legal_intake::adapters::persistence::SnapshotJson;
use legal_intake::adapters::ui::wizard_tui::TuiInputPort;
use legal_intake::ports::{HostPort, InputPort, SnapshotPort, SubmitGateway};
use legal_intake::shared::config::AppConfig;
use legal_intake::usecases::AutosaveWorker;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!("no .env found"),
    }

    legal_intake::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_default();

    let data_dir = cfg.data_dir.as_deref().unwrap_or("./data").to_string();
    let data_path = PathBuf::from(&data_dir);
    tokio::fs::create_dir_all(&data_path)
        .await
        .map_err(|e| anyhow::anyhow!("create data dir: {}", e))?;
    let snapshot_path = data_path.join("draft.json");
    info!(path = %snapshot_path.display(), "draft snapshot location");

    // --- Form state store: JSON snapshot with TTL + debounced autosave ---
    let ttl = chrono::Duration::hours(cfg.snapshot_ttl_hours_or_default() as i64);
    let snapshot: Arc<dyn SnapshotPort> = Arc::new(SnapshotJson::new(&snapshot_path, ttl));
    let autosave = AutosaveWorker::spawn(
        Arc::clone(&snapshot),
        Duration::from_millis(cfg.autosave_debounce_ms_or_default()),
    );

    // --- Submission gateway: real backend when configured, mock otherwise ---
    let timeout = Duration::from_secs(cfg.request_timeout_secs_or_default());
    let gateway: Arc<dyn SubmitGateway> = match cfg.submit_url.clone() {
        Some(url) => {
            info!(url = %url, timeout_secs = cfg.request_timeout_secs_or_default(), "backend gateway enabled");
            Arc::new(
                HttpSubmitGateway::new(url, cfg.notify_url.clone(), timeout)
                    .map_err(|e| anyhow::anyhow!("{}", e))?,
            )
        }
        None => {
            warn!("INTAKE_SUBMIT_URL not set, using mock gateway");
            Arc::new(MockSubmitGateway::new())
        }
    };

    // --- Hosting chat client capability set ---
    let host: Arc<dyn HostPort> = if cfg.is_host_configured() {
        info!(
            user_id = cfg.telegram_user_id,
            "hosting chat client context detected"
        );
        Arc::new(TelegramHost::new(
            cfg.telegram_user_id,
            cfg.start_param.clone(),
        ))
    } else {
        info!("no hosting chat client context, running standalone");
        Arc::new(NoopHost)
    };

    // --- Run (restore -> category -> details -> contact -> review/submit) ---
    let input_port: Arc<dyn InputPort> =
        Arc::new(TuiInputPort::new(snapshot, gateway, host, autosave));
    input_port
        .run_wizard()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}

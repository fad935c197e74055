use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use engine::sim::MapId;
use engine::{load_world, resolve_app_paths, run_app, AppError, AppPaths, LoopConfig, StartupError};
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

const LOG_DIR_ENV_VAR: &str = "ADVENTURE_LOG_DIR";
const SEED_ENV_VAR: &str = "ADVENTURE_SEED";
const START_MAP_ENV_VAR: &str = "ADVENTURE_START_MAP";
const LOG_FILE_NAME: &str = "adventure.log";

pub(crate) struct AppWiring {
    config: LoopConfig,
    paths: Result<AppPaths, StartupError>,
    start_map_override: Option<MapId>,
}

impl AppWiring {
    pub(crate) fn run(self) -> Result<(), AppError> {
        let paths = self.paths?;
        info!(
            root = %paths.root.display(),
            assets_dir = %paths.assets_dir.display(),
            "startup"
        );

        let mut world = load_world(&paths.assets_dir)?;
        if let Some(start_map) = self.start_map_override {
            info!(
                manifest_start_map = %world.start_map,
                start_map = %start_map,
                "start_map_overridden"
            );
            world.start_map = start_map;
        }
        run_app(self.config, world)
    }
}

/// Installs logging and the panic hook, then gathers configuration. The
/// returned guard flushes the log file when dropped.
pub(crate) fn build_app() -> (AppWiring, Option<WorkerGuard>) {
    let paths = resolve_app_paths();
    let log_dir = env::var_os(LOG_DIR_ENV_VAR)
        .map(PathBuf::from)
        .or_else(|| paths.as_ref().ok().map(|paths| paths.logs_dir.clone()));
    let guard = init_tracing(log_dir.as_deref());
    install_panic_hook();
    info!(version = env!("CARGO_PKG_VERSION"), "=== Adventure Startup ===");

    let mut config = LoopConfig::default();
    config.sim.rng_seed = parse_seed(env::var(SEED_ENV_VAR).ok().as_deref());
    let start_map_override = parse_start_map(env::var(START_MAP_ENV_VAR).ok().as_deref());

    let wiring = AppWiring {
        config,
        paths,
        start_map_override,
    };
    (wiring, guard)
}

fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_names(true)
        .compact();

    let mut unavailable = None;
    let mut guard = None;
    let file_layer = log_dir.and_then(|dir| match fs::create_dir_all(dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, worker_guard) = tracing_appender::non_blocking(appender);
            guard = Some(worker_guard);
            Some(fmt::layer().with_writer(writer).with_ansi(false))
        }
        Err(error) => {
            unavailable = Some(error);
            None
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .init();

    match (log_dir, unavailable) {
        (Some(dir), Some(error)) => warn!(
            log_dir = %dir.display(),
            error = %error,
            "log_dir_unavailable; logging to stderr only"
        ),
        (Some(dir), None) => info!(log_file = %dir.join(LOG_FILE_NAME).display(), "logging_initialized"),
        (None, _) => info!("logging_initialized_stderr_only"),
    }
    guard
}

fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        error!(panic = %info, "panic");
        default_hook(info);
    }));
}

fn parse_seed(raw: Option<&str>) -> Option<u64> {
    let raw = raw?.trim();
    match raw.parse::<u64>() {
        Ok(seed) => {
            info!(seed, "rng_seed_from_env");
            Some(seed)
        }
        Err(_) => {
            warn!(
                env_var = SEED_ENV_VAR,
                value = raw,
                "invalid seed env var value; seeding from entropy"
            );
            None
        }
    }
}

fn parse_start_map(raw: Option<&str>) -> Option<MapId> {
    let raw = raw?.trim();
    if raw.is_empty() {
        warn!(
            env_var = START_MAP_ENV_VAR,
            "empty start map env var value; using manifest start map"
        );
        return None;
    }
    Some(MapId::from(raw))
}

use std::path::PathBuf;
use std::sync::Once;
use tracing::Level;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Configuration for logging initialization
pub struct LogConfig {
    /// Component name, used as the log file prefix and filter target
    pub component: String,
    /// Directory where log files will be stored
    pub log_dir: PathBuf,
    /// Maximum log level
    pub max_level: Level,
    /// Whether to also log to stderr.
    /// stdout belongs to the native messaging channel and is never written to.
    pub log_to_console: bool,
    /// Optional custom env filter string
    pub env_filter: Option<String>,
    /// List of dependency crates to silence
    pub silent_deps: Vec<String>,
    /// Rotated files kept on disk
    pub max_log_files: usize,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            component: "native_host".to_string(),
            log_dir: PathBuf::from("logs"),
            max_level: Level::INFO,
            log_to_console: true,
            env_filter: None,
            silent_deps: Vec::new(),
            max_log_files: 7,
        }
    }
}

/// Installs the global subscriber. Later calls are no-ops.
pub fn init_logging(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut result = Ok(());

    INIT.call_once(|| {
        result = initialize_logging_internal(config);
    });

    result
}

fn initialize_logging_internal(config: LogConfig) -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all(&config.log_dir)?;

    // the browser starts a fresh host per connection, keep the directory bounded
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(&config.component)
        .filename_suffix("log")
        .max_log_files(config.max_log_files)
        .build(&config.log_dir)?;

    let mut layers = vec![
        fmt::Layer::new()
            .with_ansi(false)
            .with_writer(file_appender)
            .with_target(true)
            .with_filter(build_filter(&config)?)
            .boxed(),
    ];

    if config.log_to_console {
        layers.push(
            fmt::Layer::new()
                .with_ansi(false)
                .with_target(true)
                .with_writer(std::io::stderr)
                .compact()
                .with_filter(build_filter(&config)?)
                .boxed(),
        );
    }

    tracing_subscriber::registry().with(layers).try_init()?;

    Ok(())
}

fn build_filter(config: &LogConfig) -> Result<EnvFilter, Box<dyn std::error::Error>> {
    let mut filter = if let Some(filter_str) = &config.env_filter {
        EnvFilter::try_new(filter_str)?
    } else {
        EnvFilter::try_new(format!("{}", config.max_level))?
            .add_directive(format!("{}={}", config.component, config.max_level).parse()?)
    };

    for dep in &config.silent_deps {
        filter = filter.add_directive(format!("{}=error", dep).parse()?);
    }

    Ok(filter)
}

/// Log setup for the native messaging host.
pub fn get_native_host_config(log_dir: PathBuf, max_level: Level) -> LogConfig {
    LogConfig {
        component: "native_host".to_string(),
        log_dir,
        max_level,
        silent_deps: vec![
            "hyper".to_string(),
            "hyper_util".to_string(),
            "reqwest".to_string(),
            "mio".to_string(),
        ],
        ..Default::default()
    }
}

pub fn parse_level(level: &str) -> Option<Level> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

use anyhow::Context;
use clap::Parser;
use therapist_finder::utils::{logger, validation::Validate};
use therapist_finder::ServerConfig;

#[derive(Parser)]
#[command(name = "finder-web")]
#[command(about = "Web form for uploading and filtering massage therapist candidates")]
struct Args {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the bind address, e.g. 0.0.0.0:8501
    #[arg(long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // 載入 TOML 配置
    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("Failed to load config file '{}'", path))?,
        None => ServerConfig::default(),
    };

    // 應用命令列覆蓋設定
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }

    logger::init_server_logger(config.logging.json);

    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        std::process::exit(1);
    }

    tracing::info!(
        "✅ Configuration loaded (upload limit {} bytes, {} sessions, ttl {} min)",
        config.server.max_upload_bytes,
        config.session.max_sessions,
        config.session.ttl_minutes
    );

    therapist_finder::web::serve(config).await?;
    Ok(())
}

use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use teamdash::config::{has_flag, ServerConfig};

const USAGE: &str = "teamdash\n\nUSAGE:\n  teamdash [--port N] [--bind ADDR]\n\nOPTIONS:\n  --port N      HTTP port (env: TEAMDASH_HTTP_PORT, default 3000)\n  --bind ADDR   Listen address (env: TEAMDASH_BIND, default 0.0.0.0)\n\nREQUIRED ENV:\n  TEAMDASH_AUTH_URL, TEAMDASH_AUTH_ANON_KEY\n\nOPTIONAL ENV:\n  TEAMDASH_AUTH_TIMEOUT_MS, TEAMDASH_LOGIN_PATH, TEAMDASH_EXECUTIVE_PASSCODE_HASH,\n  TEAMDASH_EXECUTIVE_SESSION_TTL_SECS, TEAMDASH_SECURE_COOKIES\n\n  teamdash --hash-passcode <PASSCODE> prints a value for TEAMDASH_EXECUTIVE_PASSCODE_HASH.\n";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Init logging
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;
    fmt().with_env_filter(filter).init();

    let args: Vec<String> = std::env::args().collect();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        println!("{USAGE}");
        return Ok(());
    }
    if let Some(i) = args.iter().position(|a| a == "--hash-passcode") {
        let Some(passcode) = args.get(i + 1) else {
            anyhow::bail!("--hash-passcode needs a value");
        };
        println!("{}", teamdash::security::hash_password(passcode)?);
        return Ok(());
    }

    let rust_log = std::env::var("RUST_LOG").unwrap_or_else(|_| "<unset>".to_string());
    let mut cfg = ServerConfig::from_env()?;
    cfg.apply_args(&args);
    info!(target: "teamdash", "RUST_LOG='{}'", rust_log);

    teamdash::server::run(cfg).await
}

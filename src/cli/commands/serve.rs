//! Web server command.

use console::style;

use crate::config::Settings;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind)?;

    println!(
        "{} Starting receipt scanner at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!(
        "  Ledger: {}  Drive folder: {}",
        style(&settings.sheet_name).bold(),
        style(&settings.drive_folder).bold()
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(settings, &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "8080" -> 0.0.0.0:8080
/// - Just a host: "127.0.0.1" -> 127.0.0.1:5000
/// - Host and port: "127.0.0.1:8080"
fn parse_bind_address(bind: &str) -> anyhow::Result<(String, u16)> {
    if let Ok(port) = bind.parse::<u16>() {
        return Ok((DEFAULT_HOST.to_string(), port));
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        let port = port_str
            .parse::<u16>()
            .map_err(|_| anyhow::anyhow!("Invalid port in bind address: {}", bind))?;
        return Ok((host.to_string(), port));
    }

    if bind.is_empty() {
        anyhow::bail!("Empty bind address");
    }
    Ok((bind.to_string(), DEFAULT_PORT))
}

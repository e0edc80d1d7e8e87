mod console;

use sanafi_services::ViewScope;
use sanafi_storage::RocksDbStore;
use sanafi_wallet_core::{AppConfig, WalletCore};
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use console::{Command, Console};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env();
    if let Some(parent) = Path::new(&config.store_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Arc::new(RocksDbStore::open_default(&config.store_path)?);
    let wallet = WalletCore::open(&config, store).await?;

    info!(
        service = "sanafi-wallet-app",
        version = env!("CARGO_PKG_VERSION"),
        store = %config.store_path,
        "wallet ready"
    );
    println!("screen: {}", console::route_name(wallet.route().await));

    let mut console = Console::new(wallet);
    println!("{}", console.greeting());
    println!("type 'help' for commands");

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match console::parse(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };

        // Ctrl-C dismisses the command in flight instead of killing the app.
        let scope = ViewScope::new();
        let output = tokio::select! {
            output = console.run(command, &scope) => output,
            _ = tokio::signal::ctrl_c() => {
                scope.dismiss();
                warn!("command interrupted");
                "cancelled".to_owned()
            }
        };
        if !output.is_empty() {
            println!("{output}");
        }
    }

    info!("console closed");
    Ok(())
}

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use shopkeep_app::{AppConfig, AppState, Command, Console};
use shopkeep_auth::StaticIdentityProvider;

/// Account accepted out of the box.
const DEMO_EMAIL: &str = "test@example.com";
const DEMO_PASSWORD: &str = "123456";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    shopkeep_observability::init(&config.observability);

    let provider = StaticIdentityProvider::default()
        .with_account(DEMO_EMAIL, DEMO_PASSWORD)
        .context("failed to seed demo account")?;
    let state = AppState::bootstrap(config, provider).await?;
    let mut console = Console::new(&state);

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout
            .write_all(format!("{}> ", console.screen().title()).as_bytes())
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let output = match Command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(command) => match console.execute(command).await {
                Ok(output) => output,
                Err(e) => {
                    tracing::error!(error = %format!("{e:#}"), "command failed");
                    format!("error: {e:#}")
                }
            },
            Err(shopkeep_app::console::ParseError::Empty) => continue,
            Err(e) => e.to_string(),
        };
        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }

    tracing::info!("shutting down");
    Ok(())
}

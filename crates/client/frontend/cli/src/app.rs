//! Glue code tying the game client and the terminal together.
use std::time::Instant;

use anyhow::Result;
use async_trait::async_trait;
use client_blockchain_core::{Address, MockChain};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use runtime::GameClient;

use crate::config::CliConfig;
use crate::shell::{Flow, LocalOpponent, Shell};
use client_frontend_core::{Frontend, FrontendConfig};

/// Line-oriented terminal frontend.
pub struct CliFrontend {
    frontend_config: FrontendConfig,
    cli_config: CliConfig,
    opponent: Option<LocalOpponent>,
}

impl CliFrontend {
    pub fn new(frontend_config: FrontendConfig, cli_config: CliConfig) -> Self {
        Self {
            frontend_config,
            cli_config,
            opponent: None,
        }
    }

    /// Enable the `opponent` command against an in-process chain.
    pub fn with_local_opponent(mut self, chain: MockChain, address: Address) -> Self {
        self.opponent = Some(LocalOpponent { chain, address });
        self
    }

    pub async fn execute(&mut self, mut client: GameClient) -> Result<()> {
        tracing::info!("CLI client starting...");

        let mut shell = Shell::new(
            &client,
            &self.frontend_config,
            self.cli_config.ui.clone(),
            self.opponent.clone(),
            std::io::stdout(),
        );
        shell.greet(&client)?;

        let mut panics = report_panics();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut tick = time::interval(self.cli_config.ui.tick_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line? else {
                        tracing::info!("Input closed");
                        break;
                    };
                    if shell.execute(&mut client, &line).await? == Flow::Quit {
                        break;
                    }
                }
                event = client.next_event() => {
                    shell.on_client_event(&mut client, event).await?;
                }
                Some(message) = panics.recv() => {
                    shell.on_unexpected(&message)?;
                }
                _ = tick.tick() => {
                    shell.tick(Instant::now());
                }
            }
        }

        tracing::info!("CLI client exiting");
        Ok(())
    }
}

/// Forward panics from any task to the command loop.
///
/// The previously installed hook (file logging) still runs.
fn report_panics() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = tx.send(info.to_string());
        previous(info);
    }));
    rx
}

#[async_trait]
impl Frontend for CliFrontend {
    async fn run(&mut self, client: GameClient) -> Result<()> {
        self.execute(client).await
    }
}

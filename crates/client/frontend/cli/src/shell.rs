//! Line-oriented command shell over a [`GameClient`].
//!
//! The shell turns typed commands into client actions, feeds wallet and
//! contract notifications back into the client, and prints everything the
//! event consumer produces. Output goes to any [`Write`] so tests can capture
//! it.
use std::io::Write;
use std::time::Instant;

use anyhow::Result;
use client_blockchain_core::{Address, MockChain};
use runtime::{ClientEvent, Event, GameClient, Topic};
use tokio::sync::broadcast::{self, error::TryRecvError};

use client_frontend_core::{
    EventConsumer, FrontendConfig, GameEventConsumer, MessageLevel, StatusView,
};

use crate::command::{Command, CommandError};
use crate::config::UiConfig;

/// Second account on the in-process chain, driven from the shell.
#[derive(Clone)]
pub struct LocalOpponent {
    pub chain: MockChain,
    pub address: Address,
}

/// Whether the loop keeps reading input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<W: Write> {
    consumer: GameEventConsumer,
    subscriptions: Vec<(Topic, broadcast::Receiver<Event>)>,
    /// Notification cursor already printed.
    seen: u64,
    opponent: Option<LocalOpponent>,
    ui: UiConfig,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(
        client: &GameClient,
        frontend_config: &FrontendConfig,
        ui: UiConfig,
        opponent: Option<LocalOpponent>,
        out: W,
    ) -> Self {
        let subscriptions = client.event_bus().subscribe_multiple(&[
            Topic::Session,
            Topic::Game,
            Topic::Transaction,
        ]);

        Self {
            consumer: GameEventConsumer::new(&frontend_config.messages),
            subscriptions,
            seen: 0,
            opponent,
            ui,
            out,
        }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    pub fn greet(&mut self, client: &GameClient) -> Result<()> {
        writeln!(self.out, "Encrypted Warriors")?;
        writeln!(
            self.out,
            "Contract {} on {}",
            client.contract_name(),
            client.network().chain_name
        )?;
        if !client.has_wallet() {
            writeln!(self.out, "No wallet available: read-only mode.")?;
        }
        writeln!(self.out, "Type 'help' for commands.")?;
        self.print_status(client)?;
        self.prompt()
    }

    /// Run one typed line.
    pub async fn execute(&mut self, client: &mut GameClient, line: &str) -> Result<Flow> {
        let flow = match Command::parse(line) {
            Ok(None) => Flow::Continue,
            Ok(Some(command)) => self.dispatch(client, command).await?,
            Err(CommandError::Help(text)) => {
                writeln!(self.out, "{}", text)?;
                Flow::Continue
            }
            Err(err) => {
                self.warn(&err);
                Flow::Continue
            }
        };

        if flow == Flow::Continue {
            self.flush()?;
            self.prompt()?;
        }
        Ok(flow)
    }

    /// Apply a wallet or contract notification.
    pub async fn on_client_event(&mut self, client: &mut GameClient, event: ClientEvent) -> Result<()> {
        tracing::debug!("Client event: {:?}", event);
        if let Err(err) = client.handle_event(event).await {
            self.consumer.on_error(&err, Instant::now());
        }
        self.drain();
        if self.has_unseen() {
            writeln!(self.out)?;
            self.flush()?;
            if self.ui.auto_status {
                self.print_status(client)?;
            }
            self.prompt()?;
        }
        Ok(())
    }

    /// Report a failure that escaped every action boundary.
    pub fn on_unexpected(&mut self, message: &str) -> Result<()> {
        self.consumer.on_unexpected(message, Instant::now());
        writeln!(self.out)?;
        self.flush()?;
        self.prompt()
    }

    /// Periodic housekeeping.
    pub fn tick(&mut self, now: Instant) {
        let dismissed = self.consumer.notifications_mut().prune(now);
        if dismissed > 0 {
            tracing::trace!("Dismissed {} notifications", dismissed);
        }
    }

    async fn dispatch(&mut self, client: &mut GameClient, command: Command) -> Result<Flow> {
        if let Err(err) = command.check(client.step()) {
            self.warn(&err);
            return Ok(Flow::Continue);
        }

        let is_action = command.is_game_action();
        let result = match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                writeln!(self.out, "{}", Command::help())?;
                return Ok(Flow::Continue);
            }
            Command::Status => {
                self.print_status(client)?;
                return Ok(Flow::Continue);
            }
            Command::Log => {
                self.print_log()?;
                return Ok(Flow::Continue);
            }
            Command::Connect => client.connect().await.map(|_| ()),
            Command::Disconnect => {
                client.disconnect();
                Ok(())
            }
            Command::Network => client.switch_network().await,
            Command::Refresh => client.refresh().await.map(|_| ()),
            Command::Create => client.create_game().await.map(|_| ()),
            Command::Join { code } => client.join_game(&code).await.map(|_| ()),
            Command::Deploy(args) => client.deploy_unit(args.loadout()).await.map(|_| ()),
            Command::Attack => client.attack().await,
            Command::Reveal => client.reveal_outcome().await.map(|_| ()),
            Command::Opponent => self.opponent_joins(client),
        };

        if let Err(err) = result {
            self.consumer.on_error(&err, Instant::now());
        }
        self.drain();

        if is_action && self.ui.auto_status {
            self.flush()?;
            self.print_status(client)?;
        }
        Ok(Flow::Continue)
    }

    fn opponent_joins(&mut self, client: &GameClient) -> runtime::Result<()> {
        let Some(opponent) = &self.opponent else {
            self.consumer.notifications_mut().push(
                "No local opponent: the game runs against an external chain.",
                MessageLevel::Warning,
                Instant::now(),
            );
            return Ok(());
        };
        let Some(code) = client.state().game_code else {
            self.consumer.notifications_mut().push(
                "Create a game first.",
                MessageLevel::Warning,
                Instant::now(),
            );
            return Ok(());
        };

        tracing::info!("Local opponent {} joins {}", opponent.address, code);
        opponent.chain.join_as(opponent.address, &code)?;
        Ok(())
    }

    /// Feed queued bus events to the consumer.
    fn drain(&mut self) {
        let now = Instant::now();
        for (topic, receiver) in &mut self.subscriptions {
            loop {
                match receiver.try_recv() {
                    Ok(event) => {
                        self.consumer.on_event(&event, now);
                    }
                    Err(TryRecvError::Lagged(skipped)) => {
                        tracing::warn!("Dropped {} stale {:?} events", skipped, topic);
                    }
                    Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
                }
            }
        }
    }

    fn warn(&mut self, err: &CommandError) {
        self.consumer.notifications_mut().push(
            err.to_string(),
            MessageLevel::Warning,
            Instant::now(),
        );
    }

    fn has_unseen(&self) -> bool {
        self.consumer.notifications().issued() > self.seen
    }

    /// Print notifications not shown yet.
    fn flush(&mut self) -> Result<()> {
        let notifications = self.consumer.notifications();
        for entry in notifications.unseen(self.seen) {
            writeln!(self.out, "{} {}", level_tag(entry.level), entry.text)?;
        }
        self.seen = notifications.issued();
        Ok(())
    }

    fn print_status(&mut self, client: &GameClient) -> Result<()> {
        let view = StatusView::new(client.session(), &client.state(), client.step());
        writeln!(self.out, "----")?;
        for line in view.lines() {
            writeln!(self.out, "  {}", line)?;
        }
        writeln!(self.out, "----")?;
        Ok(())
    }

    fn print_log(&mut self) -> Result<()> {
        let log = self.consumer.message_log();
        if log.is_empty() {
            writeln!(self.out, "Combat log is empty.")?;
            return Ok(());
        }
        let mut recent: Vec<_> = log.recent(self.ui.log_lines).collect();
        recent.reverse();
        for entry in recent {
            writeln!(self.out, "  {}", entry.text)?;
        }
        Ok(())
    }

    fn prompt(&mut self) -> Result<()> {
        write!(self.out, "{}", self.ui.prompt)?;
        self.out.flush()?;
        Ok(())
    }
}

fn level_tag(level: MessageLevel) -> &'static str {
    match level {
        MessageLevel::Info => "[info]",
        MessageLevel::Success => "[ok]",
        MessageLevel::Warning => "[warn]",
        MessageLevel::Error => "[error]",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use runtime::Step;

    use super::*;

    fn alice() -> Address {
        Address::from_bytes([0xa1; 20])
    }

    fn bob() -> Address {
        Address::from_bytes([0xb0; 20])
    }

    fn setup() -> (GameClient, Shell<Vec<u8>>) {
        let chain = MockChain::new(vec![alice()]);
        let client = GameClient::builder()
            .wallet(Arc::new(chain.clone()))
            .contract(Arc::new(chain.clone()))
            .build()
            .unwrap();
        let opponent = LocalOpponent {
            chain,
            address: bob(),
        };
        let shell = Shell::new(
            &client,
            &FrontendConfig::default(),
            UiConfig::default(),
            Some(opponent),
            Vec::new(),
        );
        (client, shell)
    }

    fn output(shell: Shell<Vec<u8>>) -> String {
        String::from_utf8(shell.into_output()).unwrap()
    }

    async fn run(client: &mut GameClient, shell: &mut Shell<Vec<u8>>, line: &str) {
        assert_eq!(shell.execute(client, line).await.unwrap(), Flow::Continue);
    }

    #[tokio::test]
    async fn create_prints_share_code() {
        let (mut client, mut shell) = setup();
        run(&mut client, &mut shell, "connect").await;
        run(&mut client, &mut shell, "create").await;

        let text = output(shell);
        assert!(text.contains("[ok] Wallet connected: 0xa1a1...a1a1"));
        assert!(text.contains("[ok] Game created! Share this code with your opponent: 0x"));
        assert!(text.contains("Players: 1/2"));
    }

    #[tokio::test]
    async fn actions_outside_their_step_are_refused() {
        let (mut client, mut shell) = setup();
        run(&mut client, &mut shell, "connect").await;
        run(&mut client, &mut shell, "attack").await;

        let text = output(shell);
        assert!(text.contains("[warn] 'attack' is not available during step Join Game"));
    }

    #[tokio::test]
    async fn runtime_errors_are_readable() {
        let (mut client, mut shell) = setup();
        run(&mut client, &mut shell, "create").await;

        let text = output(shell);
        assert!(text.contains("[error] Please connect your wallet first."));
    }

    #[tokio::test]
    async fn unexpected_failures_are_printed() {
        let (_client, mut shell) = setup();
        shell.on_unexpected("worker panicked").unwrap();

        let text = output(shell);
        assert!(text.contains("[error] Unexpected error: worker panicked"));
    }

    async fn opponent_joins(client: &mut GameClient, shell: &mut Shell<Vec<u8>>) {
        run(client, shell, "opponent").await;
        // GameCreated from our own write comes first, then PlayerJoined
        while client.state().players_joined < 2 {
            let event = tokio::time::timeout(Duration::from_secs(1), client.next_event())
                .await
                .unwrap();
            shell.on_client_event(client, event).await.unwrap();
        }
    }

    #[tokio::test]
    async fn help_and_bad_input_are_printed() {
        let (mut client, mut shell) = setup();
        run(&mut client, &mut shell, "help").await;
        run(&mut client, &mut shell, "deploy 10 10 dragon").await;

        let text = output(shell);
        assert!(text.contains("Join a game by code"));
        assert!(text.contains("[warn] error: invalid value 'dragon'"));
    }

    #[tokio::test]
    async fn create_after_a_finished_game_starts_over() {
        let (mut client, mut shell) = setup();
        run(&mut client, &mut shell, "connect").await;
        run(&mut client, &mut shell, "create").await;
        let first = client.state().game_code;
        opponent_joins(&mut client, &mut shell).await;

        run(&mut client, &mut shell, "deploy 40 30 warrior").await;
        run(&mut client, &mut shell, "attack").await;
        run(&mut client, &mut shell, "reveal").await;
        assert_eq!(client.step(), Step::RevealOutcome);

        run(&mut client, &mut shell, "create").await;
        let state = client.state();
        assert_eq!(client.step(), Step::JoinGame);
        assert!(state.last_combat_outcome.is_none());
        assert!(state.my_unit.is_none());
        assert_eq!(state.players_joined, 1);
        assert_ne!(state.game_code, first);

        let text = output(shell);
        assert!(!text.contains("'create' is not available"));
    }

    #[tokio::test]
    async fn full_match_through_the_shell() {
        let (mut client, mut shell) = setup();
        run(&mut client, &mut shell, "connect").await;
        run(&mut client, &mut shell, "create").await;
        opponent_joins(&mut client, &mut shell).await;

        run(&mut client, &mut shell, "deploy 40 30 warrior").await;
        run(&mut client, &mut shell, "attack").await;
        run(&mut client, &mut shell, "reveal").await;
        run(&mut client, &mut shell, "log").await;
        assert_eq!(shell.execute(&mut client, "quit").await.unwrap(), Flow::Quit);

        let text = output(shell);
        assert!(text.contains("[ok] Second player joined! Deploy your unit."));
        assert!(text.contains("Unit: Warrior ATK 40 / DEF 30"));
        assert!(text.contains("[ok] Outcome revealed: Attacker Wins"));
        assert!(text.contains("  Deployed Warrior (ATK 40, DEF 30)"));
    }
}

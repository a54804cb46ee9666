//! End-to-end client behavior against the in-memory chain.

use std::sync::Arc;
use std::time::Duration;

use client_blockchain_core::{
    Address, ChainId, CombatOutcome, GameCode, MockChain, NetworkParams, WalletEvent,
};
use runtime::{
    ClientEvent, Event, GameClient, GameCodeRepository, GameEvent, InMemoryGameCodeRepository,
    RuntimeError, Step, Topic, TransactionEvent, TxAction, UnitLoadout, UnitType,
};
use tokio::sync::broadcast;

fn alice() -> Address {
    Address::from_bytes([0xa1; 20])
}

fn bob() -> Address {
    Address::from_bytes([0xb0; 20])
}

fn feed() -> GameCode {
    GameCode::parse("0xFEED").unwrap()
}

fn client_with(chain: &MockChain, repository: Arc<dyn GameCodeRepository>) -> GameClient {
    GameClient::builder()
        .wallet(Arc::new(chain.clone()))
        .contract(Arc::new(chain.clone()))
        .repository(repository)
        .build()
        .unwrap()
}

fn client(chain: &MockChain) -> GameClient {
    client_with(chain, Arc::new(InMemoryGameCodeRepository::new()))
}

fn drain(receiver: &mut broadcast::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        events.push(event);
    }
    events
}

/// Handle notifications until `done` holds or nothing arrives for a while.
async fn pump_until(client: &mut GameClient, done: impl Fn(&GameClient) -> bool) {
    while !done(client) {
        let event = tokio::time::timeout(Duration::from_secs(1), client.next_event())
            .await
            .expect("notification expected");
        client.handle_event(event).await.unwrap();
    }
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let chain = MockChain::new(vec![alice()]);
    chain.insert_game(feed(), alice(), Some(bob()));
    let mut client = client(&chain);
    client.connect().await.unwrap();

    let first = client.refresh().await.unwrap();
    let mut watch = client.watch_state();
    watch.borrow_and_update();

    let second = client.refresh().await.unwrap();
    assert_eq!(first, second);
    assert!(!watch.has_changed().unwrap());
}

#[tokio::test]
async fn test_create_resets_before_submitting() {
    let chain = MockChain::new(vec![alice()]);
    chain.insert_game(feed(), alice(), Some(bob()));
    let mut client = client(&chain);
    client.connect().await.unwrap();
    client
        .deploy_unit(UnitLoadout::new(40, 40, UnitType::Warrior))
        .await
        .unwrap();
    assert!(client.state().my_unit.is_some());

    // The transaction fails, so only the reset before submission is visible
    chain.revert_next_write("out of gas");
    let err = client.create_game().await.unwrap_err();
    assert!(matches!(err, RuntimeError::Contract(ref reason) if reason == "out of gas"));
    assert!(client.state().is_empty());
}

#[tokio::test]
async fn test_create_never_exposes_a_mixed_state() {
    let chain = MockChain::new(vec![alice()]);
    chain.insert_game(feed(), alice(), Some(bob()));
    let mut client = client(&chain);
    client.connect().await.unwrap();
    let old = client.state();

    let mut watch = client.watch_state();
    watch.borrow_and_update();
    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while watch.changed().await.is_ok() {
            seen.push(watch.borrow_and_update().clone());
        }
        seen
    });

    let code = client.create_game().await.unwrap();
    drop(client);

    for state in observer.await.unwrap() {
        assert!(
            state == old || state.is_empty() || state.game_code.as_ref() == Some(&code),
            "mixed snapshot observed: {state:?}"
        );
    }
}

#[tokio::test]
async fn test_second_player_notification_fires_once() {
    let chain = MockChain::new(vec![alice()]);
    let mut client = client(&chain);
    let mut game_events = client.subscribe(Topic::Game);

    client.connect().await.unwrap();
    assert_eq!(client.state().players_joined, 0);

    let code = client.create_game().await.unwrap();
    assert_eq!(client.state().players_joined, 1);

    chain.join_as(bob(), &code).unwrap();
    for _ in 0..3 {
        client.refresh().await.unwrap();
        assert_eq!(client.state().players_joined, 2);
    }

    let joined: Vec<_> = drain(&mut game_events)
        .into_iter()
        .filter(|event| matches!(event, Event::Game(GameEvent::SecondPlayerJoined { .. })))
        .collect();
    assert_eq!(
        joined,
        vec![Event::Game(GameEvent::SecondPlayerJoined {
            code,
            player2: bob()
        })]
    );
}

#[tokio::test]
async fn test_player_joined_event_triggers_refresh() {
    let chain = MockChain::new(vec![alice()]);
    let mut client = client(&chain);
    client.connect().await.unwrap();
    let code = client.create_game().await.unwrap();
    assert_eq!(client.step(), Step::JoinGame);

    chain.join_as(bob(), &code).unwrap();
    pump_until(&mut client, |c| c.state().players_joined == 2).await;

    assert_eq!(client.state().player2, Some(bob()));
    assert_eq!(client.step(), Step::DeployUnit);
}

#[tokio::test]
async fn test_join_code_is_normalized_before_submission() {
    let chain = MockChain::new(vec![bob()]);
    chain.insert_game(feed(), alice(), None);
    let mut client = client(&chain);
    client.connect().await.unwrap();

    let err = client.join_game("   ").await.unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidCode(_)));
    assert_eq!(chain.write_calls(), 0);

    let code = client.join_game("  0xFEED  ").await.unwrap();
    assert_eq!(code.as_str(), "0xFEED");
    assert_eq!(client.state().players_joined, 2);
    assert_eq!(client.state().player1, Some(alice()));
}

#[tokio::test]
async fn test_creator_cannot_join_own_game() {
    let chain = MockChain::new(vec![alice()]);
    let mut client = client(&chain);
    client.connect().await.unwrap();
    let code = client.create_game().await.unwrap();

    let err = client.join_game(code.as_str()).await.unwrap_err();
    assert!(matches!(err, RuntimeError::CreatorCannotJoin));
    assert_eq!(
        err.user_message(),
        "You cannot join your own game. Please share the code with a friend!"
    );
}

#[tokio::test]
async fn test_empty_accounts_notification_disconnects() {
    let chain = MockChain::new(vec![alice()]);
    chain.insert_game(feed(), alice(), Some(bob()));
    let mut client = client(&chain);
    client.connect().await.unwrap();
    assert!(!client.state().is_empty());

    chain.set_accounts(Vec::new());
    let event = client.next_event().await;
    assert_eq!(event, ClientEvent::Wallet(WalletEvent::AccountsChanged(Vec::new())));
    client.handle_event(event).await.unwrap();

    assert!(client.session().is_none());
    assert!(client.state().is_empty());
    assert_eq!(client.step(), Step::JoinGame);
}

#[tokio::test]
async fn test_account_switch_reconciles_through_refresh() {
    let carol = Address::from_bytes([0xc0; 20]);
    let chain = MockChain::new(vec![alice()]);
    chain.insert_game(feed(), alice(), Some(carol));
    chain.insert_game(GameCode::parse("0xBEEF").unwrap(), bob(), None);
    let mut client = client(&chain);
    client.connect().await.unwrap();
    assert_eq!(client.state().players_joined, 2);

    chain.set_accounts(vec![bob()]);
    pump_until(&mut client, |c| c.session().map(|s| s.address) == Some(bob())).await;

    let state = client.state();
    assert_eq!(state.game_code, Some(GameCode::parse("0xbeef").unwrap()));
    assert_eq!(state.player1, Some(bob()));
    assert_eq!(state.players_joined, 1);
}

#[tokio::test]
async fn test_fresh_game_starts_at_join_step() {
    let chain = MockChain::new(vec![alice()]);
    let mut client = client(&chain);
    assert_eq!(client.step(), Step::JoinGame);

    client.connect().await.unwrap();
    client.create_game().await.unwrap();

    let state = client.state();
    assert_eq!(state.players_joined, 1);
    assert_eq!(state.player1, Some(alice()));
    assert_eq!(client.step(), Step::JoinGame);
}

#[tokio::test]
async fn test_stale_index_falls_back_to_cached_code() {
    let chain = MockChain::new(vec![alice()]);
    chain.insert_game(feed(), alice(), Some(bob()));
    chain.set_index_lag(true);
    let repository = Arc::new(InMemoryGameCodeRepository::with_code(feed()));
    let mut client = client_with(&chain, repository);

    client.connect().await.unwrap();

    let state = client.state();
    assert_eq!(state.game_code, Some(feed()));
    assert_eq!(state.players_joined, 2);
    assert_eq!(client.step(), Step::DeployUnit);
}

#[tokio::test]
async fn test_created_code_is_cached() {
    let chain = MockChain::new(vec![alice()]);
    let repository = Arc::new(InMemoryGameCodeRepository::new());
    let mut client = client_with(&chain, repository.clone());
    client.connect().await.unwrap();

    let code = client.create_game().await.unwrap();
    assert_eq!(repository.load().unwrap(), Some(code.clone()));

    // Index lags right after the write; the cache keeps the game visible
    chain.set_index_lag(true);
    client.refresh().await.unwrap();
    assert_eq!(client.state().game_code, Some(code));
}

#[tokio::test]
async fn test_full_match_progression() {
    let chain = MockChain::new(vec![alice()]);
    let mut client = client(&chain);
    let mut transactions = client.subscribe(Topic::Transaction);
    client.connect().await.unwrap();

    let code = client.create_game().await.unwrap();
    chain.join_as(bob(), &code).unwrap();
    client.refresh().await.unwrap();
    assert_eq!(client.step(), Step::DeployUnit);

    let unit = client
        .deploy_unit(UnitLoadout::new(45, 30, UnitType::Mage))
        .await
        .unwrap();
    assert!(unit.deployed);
    assert!(chain.is_deployed(&alice()));
    assert_eq!(client.step(), Step::Attack);

    client.attack().await.unwrap();
    assert_eq!(client.state().last_combat_outcome, Some(CombatOutcome::NoCombat));
    assert_eq!(client.step(), Step::RevealOutcome);

    let outcome = client.reveal_outcome().await.unwrap();
    assert_eq!(outcome, CombatOutcome::AttackerWins);
    assert_eq!(
        client.state().last_combat_outcome,
        Some(CombatOutcome::AttackerWins)
    );
    assert_eq!(client.step(), Step::RevealOutcome);

    let confirmed: Vec<TxAction> = drain(&mut transactions)
        .into_iter()
        .filter_map(|event| match event {
            Event::Transaction(TransactionEvent::Confirmed { action, .. }) => Some(action),
            _ => None,
        })
        .collect();
    assert_eq!(
        confirmed,
        vec![
            TxAction::CreateGame,
            TxAction::DeployUnit,
            TxAction::Attack,
            TxAction::RevealOutcome
        ]
    );
}

#[tokio::test]
async fn test_pending_transactions_carry_explorer_links() {
    let chain = MockChain::new(vec![alice()]);
    let mut client = client(&chain);
    let mut transactions = client.subscribe(Topic::Transaction);
    client.connect().await.unwrap();
    client.create_game().await.unwrap();

    let pending = drain(&mut transactions).into_iter().find_map(|event| match event {
        Event::Transaction(TransactionEvent::Pending { explorer_url, .. }) => explorer_url,
        _ => None,
    });
    let url = pending.expect("pending event with explorer link");
    assert!(url.starts_with("https://sepolia.etherscan.io/tx/0x"));
}

#[tokio::test]
async fn test_attack_requires_opponent() {
    let chain = MockChain::new(vec![alice()]);
    let mut client = client(&chain);
    client.connect().await.unwrap();
    client.create_game().await.unwrap();
    let writes = chain.write_calls();

    assert!(matches!(
        client.attack().await,
        Err(RuntimeError::NoOpponent)
    ));
    assert_eq!(chain.write_calls(), writes);
}

#[tokio::test]
async fn test_over_budget_unit_is_rejected_locally() {
    let chain = MockChain::new(vec![alice()]);
    chain.insert_game(feed(), alice(), Some(bob()));
    let mut client = client(&chain);
    client.connect().await.unwrap();

    let err = client
        .deploy_unit(UnitLoadout::new(60, 60, UnitType::Warrior))
        .await
        .unwrap_err();
    assert!(matches!(err, RuntimeError::InvalidUnit(_)));
    assert_eq!(chain.write_calls(), 0);
    assert!(client.state().my_unit.is_none());
}

#[tokio::test]
async fn test_writes_blocked_on_wrong_network() {
    let chain = MockChain::new(vec![alice()]).with_chain(ChainId::new("0x1"));
    let mut client = client(&chain);
    client.connect().await.unwrap();

    assert!(matches!(
        client.create_game().await,
        Err(RuntimeError::WrongNetwork { .. })
    ));
    assert_eq!(chain.write_calls(), 0);

    client.switch_network().await.unwrap();
    client.create_game().await.unwrap();
}

#[tokio::test]
async fn test_chain_changed_notification_gates_writes() {
    let chain = MockChain::new(vec![alice()]);
    let mut client = client(&chain);
    client.connect().await.unwrap();
    assert!(client.session().unwrap().chain_valid);

    chain.set_chain(ChainId::new("0x1"));
    let event = client.next_event().await;
    assert_eq!(
        event,
        ClientEvent::Wallet(WalletEvent::ChainChanged(ChainId::new("0x1")))
    );
    client.handle_event(event).await.unwrap();
    assert!(!client.session().unwrap().chain_valid);

    assert!(matches!(
        client.create_game().await,
        Err(RuntimeError::WrongNetwork { .. })
    ));
    assert_eq!(chain.write_calls(), 0);

    chain.set_chain(NetworkParams::sepolia().chain_id);
    let event = client.next_event().await;
    client.handle_event(event).await.unwrap();
    assert!(client.session().unwrap().chain_valid);

    client.create_game().await.unwrap();
    assert_eq!(chain.write_calls(), 1);
}

#[tokio::test]
async fn test_switching_to_a_full_game_is_not_a_join() {
    let carol = Address::from_bytes([0xc0; 20]);
    let beef = GameCode::parse("0xBEEF").unwrap();
    let chain = MockChain::new(vec![alice()]);
    chain.insert_game(feed(), alice(), None);
    chain.insert_game(beef.clone(), bob(), Some(carol));
    let mut client = client(&chain);
    client.connect().await.unwrap();
    assert_eq!(client.state().players_joined, 1);

    let mut game_events = client.subscribe(Topic::Game);
    chain.set_accounts(vec![bob()]);
    pump_until(&mut client, |c| c.session().map(|s| s.address) == Some(bob())).await;

    assert_eq!(client.state().game_code, Some(beef));
    assert_eq!(client.state().players_joined, 2);
    assert!(
        !drain(&mut game_events)
            .iter()
            .any(|event| matches!(event, Event::Game(GameEvent::SecondPlayerJoined { .. })))
    );
}

#[tokio::test]
async fn test_failed_refresh_keeps_state() {
    let chain = MockChain::new(vec![alice()]);
    chain.insert_game(feed(), alice(), Some(bob()));
    let mut client = client(&chain);
    client.connect().await.unwrap();
    let before = client.state();

    chain.set_read_failure(Some("connection reset"));
    let err = client.refresh().await.unwrap_err();
    assert!(matches!(err, RuntimeError::Sync(_)));
    assert_eq!(client.state(), before);
}

#[tokio::test]
async fn test_invalid_session_reconnects_once() {
    let chain = MockChain::new(vec![alice()]);
    chain.insert_game(feed(), alice(), Some(bob()));
    let mut client = client(&chain);
    client.connect().await.unwrap();

    // Signer locked: one reconnect, then the retried refresh succeeds
    chain.set_signer_unavailable(true);
    let state = client.refresh().await.unwrap();
    assert_eq!(state.players_joined, 2);
    assert!(client.session().is_some());

    // Reads keep failing: the state is cleared and the error surfaces
    chain.set_signer_unavailable(false);
    chain.set_unknown_account(true);
    let err = client.refresh().await.unwrap_err();
    assert!(err.is_session_invalid());
    assert!(client.state().is_empty());
}

#[tokio::test]
async fn test_connect_without_wallet_capability() {
    let chain = MockChain::new(vec![alice()]);
    let mut client = GameClient::builder()
        .contract(Arc::new(chain))
        .build()
        .unwrap();

    assert!(!client.has_wallet());
    assert!(matches!(
        client.connect().await,
        Err(RuntimeError::NoWalletCapability)
    ));
}

#[test]
fn test_builder_requires_contract() {
    assert!(matches!(
        GameClient::builder().build(),
        Err(RuntimeError::MissingContract)
    ));
}

//! Trait describing a runnable client front-end.
use anyhow::Result;
use async_trait::async_trait;
use runtime::GameClient;

/// Frontend abstraction for UI layers.
///
/// The frontend owns the [`GameClient`] for the lifetime of the session:
/// it forwards user commands to the client, feeds wallet and contract
/// notifications back through [`GameClient::handle_event`], and renders
/// the derived state.
///
/// # Implementations
///
/// - `CliFrontend`: line-oriented terminal UI
/// - Future: `GuiFrontend`, `WebFrontend`, etc.
///
/// # Example Implementation
///
/// ```no_run
/// use async_trait::async_trait;
/// use client_frontend_core::Frontend;
/// use runtime::GameClient;
/// use anyhow::Result;
///
/// struct MyFrontend;
///
/// #[async_trait]
/// impl Frontend for MyFrontend {
///     async fn run(&mut self, mut client: GameClient) -> Result<()> {
///         client.connect().await?;
///         loop {
///             let event = client.next_event().await;
///             client.handle_event(event).await?;
///         }
///     }
/// }
/// ```
#[async_trait]
pub trait Frontend: Send {
    /// Run the frontend event loop.
    ///
    /// It should block until the user quits the application.
    ///
    /// # Errors
    ///
    /// Returns an error if the frontend encounters a fatal error.
    async fn run(&mut self, client: GameClient) -> Result<()>;
}

use tagsift_types::{Command, Envelope, Reply};
use tokio::sync::mpsc;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    #[error("No active tab found")]
    NoActiveTab,

    /// Nothing on the page is listening for commands
    #[error(
        "This page does not have a debug log. Please navigate to a Salesforce debug log page."
    )]
    NotConnected,

    /// The page accepted the command but never answered
    #[error("Error: The message port closed before a response was received.")]
    PortClosed,
}

/// Point-to-point command channel to the filter engine of one page
#[derive(Clone, Debug)]
pub struct PageLink {
    commands: mpsc::UnboundedSender<Envelope>,
}

impl PageLink {
    pub fn new(commands: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { commands }
    }

    /// Send a command and wait for its single reply. No retry, no timeout.
    pub async fn send(&self, command: Command) -> Result<Reply, LinkError> {
        let (envelope, reply) = Envelope::new(command);
        self.commands
            .send(envelope)
            .map_err(|_| LinkError::NotConnected)?;
        reply.await.map_err(|_| LinkError::PortClosed)
    }

    /// Whether the receiving side has gone away
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }
}

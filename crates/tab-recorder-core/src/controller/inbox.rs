use crate::{
    controller::{Command, Intent},
    session::SessionStatus,
};

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

/// Command side of the controller: the receiver plus deferred requests.
pub(crate) struct Inbox {
    command_rx: mpsc::Receiver<Command>,
    pending: Option<Intent>,
    shutdown_reply: Option<oneshot::Sender<()>>,
    shutdown_requested: bool,
    closed: bool,
}

impl Inbox {
    pub(crate) fn new(command_rx: mpsc::Receiver<Command>) -> Self {
        Self {
            command_rx,
            pending: None,
            shutdown_reply: None,
            shutdown_requested: false,
            closed: false,
        }
    }

    /// Next command, or `None` once every handle is dropped.
    pub(crate) async fn recv(&mut self) -> Option<Command> {
        if self.closed {
            return None;
        }
        let cmd = self.command_rx.recv().await;
        if cmd.is_none() {
            self.closed = true;
        }
        cmd
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed
    }

    /// Hold `cmd` until the in-flight transition completes.
    ///
    /// Status queries are answered on the spot. A newer intent replaces an
    /// older pending one, which is answered as superseded.
    pub(crate) fn defer(&mut self, cmd: Command, status: &SessionStatus) {
        let intent = match cmd {
            Command::GetStatus { reply } => {
                let _ = reply.send(status.clone());
                return;
            }
            Command::Shutdown { reply } => {
                self.request_shutdown(Some(reply));
                return;
            }
            Command::Start { reply } => Intent::Start(reply),
            Command::Stop { reply } => Intent::Stop(reply),
            Command::Toggle { direction, reply } => Intent::Toggle { direction, reply },
        };

        debug!(
            intent = ?intent,
            phase = ?status.phase,
            "Deferring intent until transition completes"
        );

        if let Some(displaced) = self.pending.replace(intent) {
            debug!(displaced = ?displaced, "Pending intent superseded");
            displaced.supersede();
        }
    }

    pub(crate) fn take_pending(&mut self) -> Option<Intent> {
        self.pending.take()
    }

    pub(crate) fn request_shutdown(&mut self, reply: Option<oneshot::Sender<()>>) {
        self.shutdown_requested = true;
        if reply.is_some() {
            self.shutdown_reply = reply;
        }
    }

    pub(crate) fn shutdown_requested(&self) -> bool {
        self.shutdown_requested || self.closed
    }

    /// Acknowledge the shutdown request and supersede anything still queued.
    pub(crate) fn finish_shutdown(&mut self) {
        if let Some(intent) = self.pending.take() {
            intent.supersede();
        }
        if let Some(reply) = self.shutdown_reply.take() {
            let _ = reply.send(());
        }
    }
}

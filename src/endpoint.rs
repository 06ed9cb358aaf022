//! Connection endpoint: the session read loop and its state machine.
//!
//! The endpoint owns the transport session. [`Endpoint::spawn`] starts a
//! task that walks the `Connecting -> Open -> Closed` lifecycle (with a
//! terminal `Errored` branch), probes the peer on open, and pumps every
//! inbound frame through the codec into the distributor. State is published
//! through a watch channel so UIs can render connection status.
//!
//! The endpoint never reconnects. A transport error leaves it in `Errored`;
//! whoever owns the connection decides what to do next.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::codec;
use crate::distributor::Distributor;
use crate::transport::Transport;

/// Liveness probe sent to the peer when the session opens.
///
/// The probe has no protocol meaning; a peer may ignore it, and a failed
/// send does not prevent the session from opening.
pub const PROBE_LINE: &str = "mindstream probe";

/// Lifecycle states of a connection endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    /// The session exists but the read loop has not started yet.
    Connecting,
    /// Frames are being received and forwarded.
    Open,
    /// The session ended cleanly (peer close, recording end, or [`EndpointHandle::close`]).
    Closed,
    /// The transport failed; no further frames will be forwarded.
    Errored,
}

impl EndpointState {
    /// Whether the endpoint will never leave this state.
    pub fn is_terminal(self) -> bool {
        matches!(self, EndpointState::Closed | EndpointState::Errored)
    }
}

/// Handle to a spawned endpoint.
pub struct EndpointHandle {
    state: watch::Receiver<EndpointState>,
    cancel: CancellationToken,
    distributor: Arc<Distributor>,
}

impl EndpointHandle {
    /// Current endpoint state.
    pub fn state(&self) -> EndpointState {
        *self.state.borrow()
    }

    /// Watch receiver for state transitions.
    pub fn state_changes(&self) -> watch::Receiver<EndpointState> {
        self.state.clone()
    }

    /// Close the session.
    ///
    /// Idempotent: closing an already closed (or errored) endpoint does
    /// nothing. New publishes stop immediately; history buffered in the
    /// distributor stays readable.
    pub fn close(&self) {
        self.cancel.cancel();
        self.distributor.close();
    }

    /// Wait until the endpoint reaches a terminal state and return it.
    pub async fn wait_terminal(&self) -> EndpointState {
        let mut rx = self.state.clone();
        loop {
            let state = *rx.borrow_and_update();
            if state.is_terminal() {
                return state;
            }
            if rx.changed().await.is_err() {
                return *rx.borrow();
            }
        }
    }
}

/// Endpoint spawns and manages the session read loop.
pub struct Endpoint;

impl Endpoint {
    /// Spawn the read loop for the given transport.
    ///
    /// The task owns the transport and publishes decoded samples into
    /// `distributor` until the session ends one way or another.
    pub fn spawn<T>(transport: T, distributor: Arc<Distributor>) -> EndpointHandle
    where
        T: Transport,
    {
        let (state_tx, state_rx) = watch::channel(EndpointState::Connecting);
        let cancel = CancellationToken::new();

        let cancel_session = cancel.clone();
        let task_distributor = Arc::clone(&distributor);
        tokio::spawn(async move {
            Self::session_task(transport, task_distributor, state_tx, cancel_session).await;
        });

        EndpointHandle { state: state_rx, cancel, distributor }
    }

    /// Session task: probe on open, then decode and forward until the
    /// session ends.
    async fn session_task<T>(
        mut transport: T,
        distributor: Arc<Distributor>,
        state_tx: watch::Sender<EndpointState>,
        cancel: CancellationToken,
    ) where
        T: Transport,
    {
        info!(session = %transport.describe(), "session open");
        advance(&state_tx, EndpointState::Open);

        // Best-effort liveness probe; failure to send is not fatal.
        if let Err(err) = transport.send(PROBE_LINE).await {
            warn!(error = %err, "probe send failed");
        }

        let mut forwarded = 0u64;
        let mut dropped = 0u64;

        let terminal = loop {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("session cancelled");
                    break EndpointState::Closed;
                }
                result = transport.recv() => result,
            };

            match result {
                Ok(Some(frame)) => match codec::decode(&frame) {
                    Ok(sample) => {
                        forwarded += 1;
                        trace!(timestamp = sample.timestamp, forwarded, "sample forwarded");
                        distributor.publish(&sample);
                    }
                    Err(err) => {
                        // Bad frame: drop it and keep the session alive.
                        dropped += 1;
                        warn!(error = %err, dropped, "malformed frame dropped");
                    }
                },
                Ok(None) => {
                    info!(forwarded, "peer closed the session");
                    break EndpointState::Closed;
                }
                Err(err) => {
                    error!(error = %err, "transport failed");
                    break EndpointState::Errored;
                }
            }
        };

        distributor.close();
        advance(&state_tx, terminal);
        info!(forwarded, dropped, state = ?terminal, "session ended");
    }
}

/// Publish a state transition, never leaving a terminal state.
fn advance(state_tx: &watch::Sender<EndpointState>, next: EndpointState) {
    state_tx.send_if_modified(|state| {
        if state.is_terminal() || *state == next {
            return false;
        }
        *state = next;
        true
    });
}

//! INS command driver
//!
//! The driver owns all mutable state (queue, latest fix, retry counter and
//! pending-reply flag). Inbound events and drive-loop cycles are processed
//! one at a time by the same task, so no event can observe a half-finished
//! dispatch.
//!
//! ```text
//!   fix event ──► queue tail ─┐
//!                             ├─► peek tail ─► encode ─► link.send ─► publish reply
//!   command event ► queue head┘
//! ```

use super::bus::{BusEvent, CommandResponse};
use super::fix::{FixState, GpsFix};
use super::protocol::{self, CommandKind, EncodeError};
use super::queue::CommandQueue;
use super::transport::{DeviceLink, TransportError};
use crate::config::DriverSettings;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc};
use tokio::time::MissedTickBehavior;

/// Why a dispatch attempt failed
#[derive(Error, Debug)]
pub enum AttemptError {
    /// Command could not be encoded
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Exchange with the device failed
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl AttemptError {
    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Encode(_) => "encode",
            Self::Transport(e) => e.kind(),
        }
    }
}

/// Drive loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriveStatus {
    /// Queue empty
    Idle,
    /// A command is at the tail, being sent or retried
    Dispatching,
}

/// Result of one drive-loop cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Nothing queued
    Idle,
    /// Command sent and removed from the queue
    Sent {
        /// Command sent
        command: CommandKind,
        /// Published reply, for query commands
        response: Option<CommandResponse>,
    },
    /// Attempt failed; the command stays queued
    Retrying {
        /// Command attempted
        command: CommandKind,
        /// Consecutive failures so far
        attempt: u32,
    },
    /// Retry budget exhausted; the command was removed
    Dropped {
        /// Command dropped
        command: CommandKind,
    },
}

/// Mutable driver state
#[derive(Debug, Default)]
pub struct DriverState {
    /// Pending commands
    pub queue: CommandQueue,
    /// Latest GPS fix
    pub fix: FixState,
    /// Consecutive failed attempts for the command at the tail
    pub retries: u32,
    /// The in-flight command expects a reply to publish
    pub pending_response: bool,
}

/// Driver counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Commands sent successfully
    pub sent: u64,
    /// Failed attempts
    pub failed_attempts: u64,
    /// Commands dropped after exhausting retries
    pub dropped: u64,
    /// Query replies published
    pub responses: u64,
    /// Command events rejected for an unknown ordinal
    pub rejected: u64,
}

/// INS command driver
pub struct Driver {
    link: Box<dyn DeviceLink>,
    settings: DriverSettings,
    state: DriverState,
    stats: DriverStats,
    responses: broadcast::Sender<CommandResponse>,
}

impl Driver {
    /// Create a driver sending through `link`
    pub fn new(link: Box<dyn DeviceLink>, settings: DriverSettings) -> Self {
        let (responses, _) = broadcast::channel(64);
        Self {
            link,
            settings,
            state: DriverState::default(),
            stats: DriverStats::default(),
            responses,
        }
    }

    /// Subscribe to published query replies
    pub fn subscribe(&self) -> broadcast::Receiver<CommandResponse> {
        self.responses.subscribe()
    }

    /// Current state
    pub fn state(&self) -> &DriverState {
        &self.state
    }

    /// Counters
    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    /// Loop status
    pub fn status(&self) -> DriveStatus {
        if self.state.queue.is_empty() {
            DriveStatus::Idle
        } else {
            DriveStatus::Dispatching
        }
    }

    /// Record a fix and queue a manual position update
    pub fn handle_fix(&mut self, fix: GpsFix) {
        if !self.state.fix.has_fix() {
            tracing::info!("First GPS fix received, manual position updates enabled");
        }
        tracing::info!(
            "GPS fix received: lat {:.6} lon {:.6} alt {:.2}",
            fix.latitude,
            fix.longitude,
            fix.altitude
        );
        self.state.fix.update(fix);
        self.state.queue.enqueue_fix_driven(CommandKind::SetManualFix);
    }

    /// Queue an operator command given by ordinal
    pub fn handle_command(&mut self, value: i8) -> Result<CommandKind, EncodeError> {
        match CommandKind::try_from(value) {
            Ok(kind) => {
                tracing::info!("Command received: {}", kind);
                self.state.queue.enqueue_priority(kind);
                Ok(kind)
            }
            Err(e) => {
                tracing::warn!("Rejecting command event: {}", e);
                self.stats.rejected += 1;
                Err(e)
            }
        }
    }

    /// Apply one inbound bus event
    pub fn handle_event(&mut self, event: BusEvent) {
        match event {
            BusEvent::Fix(fix) => self.handle_fix(fix),
            BusEvent::Command(value) => {
                let _ = self.handle_command(value);
            }
        }
    }

    async fn attempt(&mut self, command: CommandKind) -> Result<Option<String>, AttemptError> {
        let request = protocol::encode(command, self.state.fix.current())?;
        self.state.pending_response = request.expects_reply();

        tracing::debug!("Sending {} to {}: {:?}", command, self.link.connection_info(), request.message);
        let reply = self.link.send(&request.message, request.expects_reply()).await?;

        if request.expects_reply() && reply.is_none() {
            return Err(TransportError::ReadFailed("device returned no reply".to_string()).into());
        }
        Ok(reply)
    }

    /// Run one drive-loop cycle: send the tail command and apply the
    /// retry/drop policy.
    pub async fn poll_once(&mut self) -> PollOutcome {
        let Some(command) = self.state.queue.peek_next() else {
            return PollOutcome::Idle;
        };

        match self.attempt(command).await {
            Ok(reply) => {
                let response = if self.state.pending_response {
                    self.state.pending_response = false;
                    let response = CommandResponse::new(reply.as_deref().unwrap_or_default(), command);
                    tracing::info!("Publishing response for {}: {}", command, response.data);
                    // No subscribers is not an error
                    let _ = self.responses.send(response.clone());
                    self.stats.responses += 1;
                    Some(response)
                } else {
                    None
                };

                self.state.retries = 0;
                self.state.queue.dequeue();
                self.stats.sent += 1;
                PollOutcome::Sent { command, response }
            }
            Err(e) => {
                self.state.pending_response = false;
                self.state.retries += 1;
                self.stats.failed_attempts += 1;
                tracing::warn!(
                    "Attempt {} for {} failed ({}): {}",
                    self.state.retries,
                    command,
                    e.kind(),
                    e
                );

                if self.state.retries > self.settings.max_retries {
                    tracing::error!(
                        "Dropping {} after {} failed attempts",
                        command,
                        self.state.retries
                    );
                    self.state.queue.dequeue();
                    self.state.retries = 0;
                    self.stats.dropped += 1;
                    PollOutcome::Dropped { command }
                } else {
                    PollOutcome::Retrying {
                        command,
                        attempt: self.state.retries,
                    }
                }
            }
        }
    }

    /// Run until the inbound event channel closes and the queue has drained.
    ///
    /// Events are applied between cycles; a cycle in progress always
    /// completes before the next event is looked at. Once the sender is
    /// dropped the loop keeps cycling until every queued command was either
    /// sent or dropped.
    pub async fn run(mut self, mut events: mpsc::Receiver<BusEvent>) -> DriverStats {
        let mut ticker = tokio::time::interval(self.settings.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Driver started: device {}, poll every {} ms, max {} retries",
            self.link.connection_info(),
            self.settings.poll_interval_ms,
            self.settings.max_retries
        );

        let mut closed = false;
        loop {
            if closed && self.state.queue.is_empty() {
                tracing::info!("Event channel closed and queue drained, driver stopping");
                break;
            }

            // Pending events are drained before the next cycle
            tokio::select! {
                biased;
                event = events.recv(), if !closed => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        tracing::info!(
                            "Event channel closed, draining {} queued command(s)",
                            self.state.queue.len()
                        );
                        closed = true;
                    }
                },
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }

        self.stats
    }
}

//! Connection lifecycle state machine for notify-sync.
//!
//! This module provides a pure, side-effect-free state machine for the
//! push channel lifecycle. The state machine takes events as input and
//! produces a new state plus a list of actions to execute.
//!
//! The actual I/O (opening the channel, binding the subscription,
//! running the retry timer) is performed by notify-client, not by this
//! module. This enables instant unit testing without network mocks.
//!
//! Retry policy is a fixed configurable delay with unbounded attempts:
//! [`LinkAction::StartRetryTimer`] carries no duration, the driver
//! supplies its configured delay, and the attempt counter saturates
//! without ever terminating the cycle. Only
//! [`LinkEvent::DisconnectRequested`] stops it.

/// Connection state machine - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkState {
    /// Never connected; no session requested yet.
    Idle,
    /// Channel open in progress.
    Connecting {
        /// Which attempt this is within the current retry cycle.
        attempt: u32,
    },
    /// Channel established and subscribed.
    Connected,
    /// Channel lost or failed; waiting on the fixed-delay retry timer.
    Reconnecting {
        /// Number of failed attempts so far in this retry cycle.
        attempt: u32,
    },
    /// Explicitly torn down by the application.
    Disconnected,
}

impl LinkState {
    /// Create a new state machine in the Idle state.
    pub fn new() -> Self {
        Self::Idle
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller
    /// (notify-client) is responsible for executing the returned actions.
    pub fn on_event(self, event: LinkEvent) -> (Self, Vec<LinkAction>) {
        match (self, event) {
            // A session can be requested from either rest state.
            (Self::Idle | Self::Disconnected, LinkEvent::ConnectRequested) => (
                Self::Connecting { attempt: 1 },
                vec![LinkAction::OpenChannel],
            ),

            // From Connecting
            (Self::Connecting { .. }, LinkEvent::ConnectSucceeded) => (
                Self::Connected,
                vec![
                    LinkAction::BindSubscription,
                    LinkAction::RefreshSnapshot,
                    LinkAction::Emit(LinkChange::Up),
                ],
            ),
            (Self::Connecting { attempt }, LinkEvent::ConnectFailed { error }) => (
                Self::Reconnecting { attempt },
                vec![
                    LinkAction::Emit(LinkChange::RetryScheduled { attempt, error }),
                    LinkAction::StartRetryTimer,
                ],
            ),
            (Self::Connecting { .. }, LinkEvent::DisconnectRequested) => (
                Self::Disconnected,
                vec![
                    LinkAction::CloseChannel,
                    LinkAction::Emit(LinkChange::Down {
                        reason: "disconnect requested".into(),
                    }),
                ],
            ),

            // From Connected
            (Self::Connected, LinkEvent::ConnectionLost { reason }) => (
                // A fresh cycle: no attempts made yet.
                Self::Reconnecting { attempt: 0 },
                vec![
                    LinkAction::Emit(LinkChange::Down { reason }),
                    LinkAction::StartRetryTimer,
                ],
            ),
            (Self::Connected, LinkEvent::DisconnectRequested) => (
                Self::Disconnected,
                vec![
                    LinkAction::CloseChannel,
                    LinkAction::Emit(LinkChange::Down {
                        reason: "disconnect requested".into(),
                    }),
                ],
            ),

            // From Reconnecting
            (Self::Reconnecting { attempt }, LinkEvent::RetryTimer) => (
                Self::Connecting {
                    attempt: attempt.saturating_add(1),
                },
                vec![LinkAction::OpenChannel],
            ),
            (Self::Reconnecting { .. }, LinkEvent::ConnectSucceeded) => (
                Self::Connected,
                vec![
                    LinkAction::BindSubscription,
                    LinkAction::RefreshSnapshot,
                    LinkAction::Emit(LinkChange::Up),
                ],
            ),
            (Self::Reconnecting { attempt }, LinkEvent::ConnectFailed { error }) => {
                let attempt = attempt.saturating_add(1);
                (
                    Self::Reconnecting { attempt },
                    vec![
                        LinkAction::Emit(LinkChange::RetryScheduled { attempt, error }),
                        LinkAction::StartRetryTimer,
                    ],
                )
            }
            (Self::Reconnecting { .. }, LinkEvent::DisconnectRequested) => (
                Self::Disconnected,
                vec![
                    LinkAction::CancelRetryTimer,
                    LinkAction::Emit(LinkChange::Down {
                        reason: "disconnect requested".into(),
                    }),
                ],
            ),

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Check if the channel is currently established.
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }

    /// Check if a session is in progress in any form.
    ///
    /// While active, a further connect request is a no-op.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::Connecting { .. } | Self::Connected | Self::Reconnecting { .. }
        )
    }

    /// Check if results of session-scoped requests may still be applied.
    ///
    /// Stale-response guard: a request started under a session may only
    /// mutate local state while that session is Connected or riding out
    /// a reconnect cycle.
    pub fn is_session_live(&self) -> bool {
        matches!(self, Self::Connected | Self::Reconnecting { .. })
    }
}

impl Default for LinkState {
    fn default() -> Self {
        Self::new()
    }
}

/// Events that can occur in the channel lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// Application requested a connection.
    ConnectRequested,
    /// Channel open succeeded.
    ConnectSucceeded,
    /// Channel open failed.
    ConnectFailed {
        /// Error message describing the failure.
        error: String,
    },
    /// An established channel dropped unexpectedly.
    ConnectionLost {
        /// Reason for the drop.
        reason: String,
    },
    /// The fixed-delay retry timer fired.
    RetryTimer,
    /// Application requested disconnect.
    DisconnectRequested,
}

/// Actions to be executed by notify-client.
///
/// These are instructions, not side effects. The client interprets
/// these and performs the actual I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkAction {
    /// Open the channel against the current session token.
    OpenChannel,
    /// Bind the per-session notification subscription.
    BindSubscription,
    /// Refresh the local view from REST (list page + unread count).
    RefreshSnapshot,
    /// Start the fixed-delay retry timer (duration is configuration).
    StartRetryTimer,
    /// Cancel any pending retry timer.
    CancelRetryTimer,
    /// Close the channel and discard the subscription handle.
    CloseChannel,
    /// Surface a lifecycle change to the application.
    Emit(LinkChange),
}

/// Lifecycle changes surfaced to the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkChange {
    /// Channel established.
    Up,
    /// Channel closed or lost.
    Down {
        /// Reason for going down.
        reason: String,
    },
    /// A connect attempt failed; another runs after the fixed delay.
    RetryScheduled {
        /// Which attempt just failed.
        attempt: u32,
        /// Error message from the failed attempt.
        error: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fail(error: &str) -> LinkEvent {
        LinkEvent::ConnectFailed {
            error: error.into(),
        }
    }

    #[test]
    fn starts_idle() {
        assert!(matches!(LinkState::new(), LinkState::Idle));
    }

    #[test]
    fn connect_request_opens_channel() {
        let (state, actions) = LinkState::Idle.on_event(LinkEvent::ConnectRequested);
        assert!(matches!(state, LinkState::Connecting { attempt: 1 }));
        assert!(actions.iter().any(|a| matches!(a, LinkAction::OpenChannel)));
    }

    #[test]
    fn connect_request_works_after_disconnect() {
        let (state, _) = LinkState::Disconnected.on_event(LinkEvent::ConnectRequested);
        assert!(matches!(state, LinkState::Connecting { .. }));
    }

    #[test]
    fn connect_success_binds_and_refreshes() {
        let (state, actions) =
            LinkState::Connecting { attempt: 1 }.on_event(LinkEvent::ConnectSucceeded);
        assert!(matches!(state, LinkState::Connected));
        assert!(actions
            .iter()
            .any(|a| matches!(a, LinkAction::BindSubscription)));
        assert!(actions
            .iter()
            .any(|a| matches!(a, LinkAction::RefreshSnapshot)));
        assert!(actions
            .iter()
            .any(|a| matches!(a, LinkAction::Emit(LinkChange::Up))));
    }

    #[test]
    fn connect_failure_schedules_retry() {
        let (state, actions) = LinkState::Connecting { attempt: 1 }.on_event(fail("refused"));
        assert!(matches!(state, LinkState::Reconnecting { attempt: 1 }));
        assert!(actions
            .iter()
            .any(|a| matches!(a, LinkAction::StartRetryTimer)));
        assert!(actions.iter().any(|a| matches!(
            a,
            LinkAction::Emit(LinkChange::RetryScheduled { attempt: 1, .. })
        )));
    }

    #[test]
    fn retry_timer_reopens_channel_with_next_attempt() {
        let (state, actions) =
            LinkState::Reconnecting { attempt: 1 }.on_event(LinkEvent::RetryTimer);
        assert!(matches!(state, LinkState::Connecting { attempt: 2 }));
        assert!(actions.iter().any(|a| matches!(a, LinkAction::OpenChannel)));
    }

    #[test]
    fn repeated_failures_keep_cycling_unbounded() {
        // Three consecutive failures: Connecting -> Reconnecting each
        // time, never a terminal failure state.
        let mut state = LinkState::Idle.on_event(LinkEvent::ConnectRequested).0;
        let mut seen_attempts = Vec::new();

        for _ in 0..3 {
            assert!(matches!(state, LinkState::Connecting { .. }));
            state = state.on_event(fail("refused")).0;
            match state {
                LinkState::Reconnecting { attempt } => seen_attempts.push(attempt),
                ref other => panic!("expected Reconnecting, got {other:?}"),
            }
            state = state.on_event(LinkEvent::RetryTimer).0;
        }

        assert_eq!(seen_attempts, vec![1, 2, 3]);
        assert!(state.is_active());
    }

    #[test]
    fn attempt_counter_saturates() {
        let (state, _) = LinkState::Connecting { attempt: u32::MAX }.on_event(fail("refused"));
        assert!(matches!(
            state,
            LinkState::Reconnecting { attempt: u32::MAX }
        ));
        let (state, _) = state.on_event(LinkEvent::RetryTimer);
        assert!(matches!(state, LinkState::Connecting { attempt: u32::MAX }));
    }

    #[test]
    fn connection_lost_starts_a_fresh_cycle() {
        let (state, actions) = LinkState::Connected.on_event(LinkEvent::ConnectionLost {
            reason: "socket closed".into(),
        });
        assert!(matches!(state, LinkState::Reconnecting { attempt: 0 }));
        assert!(actions.iter().any(|a| matches!(
            a,
            LinkAction::Emit(LinkChange::Down { reason }) if reason == "socket closed"
        )));
        assert!(actions
            .iter()
            .any(|a| matches!(a, LinkAction::StartRetryTimer)));

        // The first attempt of the new cycle is attempt 1.
        let (state, _) = state.on_event(LinkEvent::RetryTimer);
        assert!(matches!(state, LinkState::Connecting { attempt: 1 }));
    }

    #[test]
    fn disconnect_from_connected_closes_channel() {
        let (state, actions) = LinkState::Connected.on_event(LinkEvent::DisconnectRequested);
        assert!(matches!(state, LinkState::Disconnected));
        assert!(actions
            .iter()
            .any(|a| matches!(a, LinkAction::CloseChannel)));
    }

    #[test]
    fn disconnect_while_reconnecting_cancels_timer() {
        let (state, actions) =
            LinkState::Reconnecting { attempt: 5 }.on_event(LinkEvent::DisconnectRequested);
        assert!(matches!(state, LinkState::Disconnected));
        assert!(actions
            .iter()
            .any(|a| matches!(a, LinkAction::CancelRetryTimer)));
    }

    #[test]
    fn disconnect_halts_cycle_at_any_point() {
        for state in [
            LinkState::Connecting { attempt: 1 },
            LinkState::Connected,
            LinkState::Reconnecting { attempt: 3 },
        ] {
            let (next, _) = state.on_event(LinkEvent::DisconnectRequested);
            assert!(matches!(next, LinkState::Disconnected));
        }
    }

    #[test]
    fn reconnect_success_flow() {
        let state = LinkState::Reconnecting { attempt: 3 };
        let (state, _) = state.on_event(LinkEvent::RetryTimer);
        assert!(matches!(state, LinkState::Connecting { attempt: 4 }));
        let (state, actions) = state.on_event(LinkEvent::ConnectSucceeded);
        assert!(matches!(state, LinkState::Connected));
        assert!(actions
            .iter()
            .any(|a| matches!(a, LinkAction::RefreshSnapshot)));
    }

    #[test]
    fn failure_while_reconnecting_still_increments() {
        let (state, actions) = LinkState::Reconnecting { attempt: 2 }.on_event(fail("refused"));
        assert!(matches!(state, LinkState::Reconnecting { attempt: 3 }));
        assert!(actions
            .iter()
            .any(|a| matches!(a, LinkAction::StartRetryTimer)));
    }

    #[test]
    fn events_out_of_phase_are_ignored() {
        // A late retry timer after disconnect must not reopen anything.
        let (state, actions) = LinkState::Disconnected.on_event(LinkEvent::RetryTimer);
        assert!(matches!(state, LinkState::Disconnected));
        assert!(actions.is_empty());

        // A drop report while already reconnecting changes nothing.
        let (state, actions) =
            LinkState::Reconnecting { attempt: 2 }.on_event(LinkEvent::ConnectionLost {
                reason: "late".into(),
            });
        assert!(matches!(state, LinkState::Reconnecting { attempt: 2 }));
        assert!(actions.is_empty());

        // A connect request while already active changes nothing.
        let (state, actions) = LinkState::Connected.on_event(LinkEvent::ConnectRequested);
        assert!(matches!(state, LinkState::Connected));
        assert!(actions.is_empty());
    }

    #[test]
    fn is_connected_helper() {
        assert!(!LinkState::Idle.is_connected());
        assert!(!LinkState::Connecting { attempt: 1 }.is_connected());
        assert!(LinkState::Connected.is_connected());
        assert!(!LinkState::Reconnecting { attempt: 1 }.is_connected());
        assert!(!LinkState::Disconnected.is_connected());
    }

    #[test]
    fn is_active_helper() {
        assert!(!LinkState::Idle.is_active());
        assert!(LinkState::Connecting { attempt: 1 }.is_active());
        assert!(LinkState::Connected.is_active());
        assert!(LinkState::Reconnecting { attempt: 1 }.is_active());
        assert!(!LinkState::Disconnected.is_active());
    }

    #[test]
    fn session_live_covers_connected_and_reconnecting() {
        assert!(LinkState::Connected.is_session_live());
        assert!(LinkState::Reconnecting { attempt: 1 }.is_session_live());
        assert!(!LinkState::Idle.is_session_live());
        assert!(!LinkState::Connecting { attempt: 1 }.is_session_live());
        assert!(!LinkState::Disconnected.is_session_live());
    }
}

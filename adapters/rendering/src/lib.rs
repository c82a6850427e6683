#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Maze Patrol adapters.
//!
//! The core pushes [`Notification`]s onto a channel; the [`Presenter`] drains
//! it on the presentation thread and forwards each one to a [`Renderer`].

mod scene;
mod text_board;

use crossbeam::channel::Receiver;
use maze_patrol_core::{GameOutcome, HostileSnapshot, Notification, PlayerSnapshot};
use tracing::debug;

pub use scene::Scene;
pub use text_board::TextBoard;

/// Push interface through which the core refreshes the display.
pub trait Renderer {
    /// Hostiles moved or turned; the slice holds every hostile.
    fn on_hostiles_changed(&mut self, hostiles: &[HostileSnapshot]);

    /// The player moved, took damage or was reset.
    fn on_player_changed(&mut self, player: PlayerSnapshot);

    /// The round ended. Move intents stay disabled until acknowledged.
    fn on_game_over(&mut self, outcome: GameOutcome);
}

/// Routes a single notification to the matching renderer callback.
pub fn dispatch<R>(renderer: &mut R, notification: Notification)
where
    R: Renderer + ?Sized,
{
    match notification {
        Notification::HostilesChanged { hostiles } => renderer.on_hostiles_changed(&hostiles),
        Notification::PlayerChanged { player } => renderer.on_player_changed(player),
        Notification::GameOver { outcome } => renderer.on_game_over(outcome),
    }
}

/// Collapses every run of consecutive hostile snapshots into its latest
/// member. Other notifications keep their relative order.
#[must_use]
pub fn coalesce(notifications: Vec<Notification>) -> Vec<Notification> {
    let mut coalesced: Vec<Notification> = Vec::with_capacity(notifications.len());
    for notification in notifications {
        let superseded = matches!(notification, Notification::HostilesChanged { .. })
            && matches!(
                coalesced.last(),
                Some(Notification::HostilesChanged { .. })
            );
        if superseded {
            let _ = coalesced.pop();
        }
        coalesced.push(notification);
    }
    coalesced
}

/// Presentation context that feeds a renderer from the notification channel.
#[derive(Debug)]
pub struct Presenter {
    receiver: Receiver<Notification>,
}

impl Presenter {
    /// Creates a presenter draining the provided channel.
    #[must_use]
    pub fn new(receiver: Receiver<Notification>) -> Self {
        Self { receiver }
    }

    /// Dispatches notifications until every sender has disconnected.
    ///
    /// Whatever is already queued when the presenter wakes up is handled as
    /// one batch, so a burst of hostile updates costs a single redraw.
    /// Returns the number of notifications handed to the renderer.
    pub fn run<R>(self, renderer: &mut R) -> usize
    where
        R: Renderer + ?Sized,
    {
        let mut dispatched = 0;
        while let Ok(first) = self.receiver.recv() {
            let mut batch = vec![first];
            batch.extend(self.receiver.try_iter());

            let received = batch.len();
            let batch = coalesce(batch);
            if batch.len() < received {
                debug!(received, drawn = batch.len(), "coalesced hostile redraws");
            }

            dispatched += batch.len();
            for notification in batch {
                dispatch(renderer, notification);
            }
        }
        debug!(dispatched, "notification channel closed; presenter stopping");
        dispatched
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crossbeam::channel;
    use maze_patrol_core::{HostileId, HostileKind, Position};

    use super::*;

    #[derive(Debug, Default)]
    struct Recorder {
        calls: Vec<String>,
    }

    impl Renderer for Recorder {
        fn on_hostiles_changed(&mut self, hostiles: &[HostileSnapshot]) {
            let xs: Vec<String> = hostiles
                .iter()
                .map(|hostile| hostile.position.x().to_string())
                .collect();
            self.calls.push(format!("hostiles {}", xs.join(",")));
        }

        fn on_player_changed(&mut self, player: PlayerSnapshot) {
            self.calls.push(format!("player {}", player.health));
        }

        fn on_game_over(&mut self, outcome: GameOutcome) {
            self.calls.push(format!("over {}", outcome.title()));
        }
    }

    fn hostiles_at(x: u32) -> Notification {
        Notification::HostilesChanged {
            hostiles: vec![HostileSnapshot {
                id: HostileId::new(0),
                kind: HostileKind::Spider,
                position: Position::new(x, 0),
                direction: HostileKind::Spider.axis().initial_direction(),
                damage: 5,
                period: Duration::from_millis(200),
            }],
        }
    }

    fn player(health: i32) -> Notification {
        Notification::PlayerChanged {
            player: PlayerSnapshot {
                position: Position::new(0, 0),
                health,
                max_health: 10,
            },
        }
    }

    #[test]
    fn dispatch_routes_each_variant() {
        let mut recorder = Recorder::default();

        dispatch(&mut recorder, hostiles_at(2));
        dispatch(&mut recorder, player(7));
        dispatch(
            &mut recorder,
            Notification::GameOver {
                outcome: GameOutcome::Won,
            },
        );

        assert_eq!(recorder.calls, vec!["hostiles 2", "player 7", "over YOU WON"]);
    }

    #[test]
    fn coalesce_keeps_latest_hostiles_per_run() {
        let coalesced = coalesce(vec![
            hostiles_at(1),
            hostiles_at(2),
            player(5),
            hostiles_at(3),
            hostiles_at(4),
            hostiles_at(5),
        ]);

        assert_eq!(coalesced, vec![hostiles_at(2), player(5), hostiles_at(5)]);
    }

    #[test]
    fn coalesce_never_drops_player_or_outcome() {
        let game_over = Notification::GameOver {
            outcome: GameOutcome::Died,
        };
        let notifications = vec![player(5), player(0), game_over.clone()];

        assert_eq!(coalesce(notifications.clone()), notifications);
    }

    #[test]
    fn presenter_drains_until_disconnected() {
        let (sender, receiver) = channel::unbounded();
        for notification in [hostiles_at(1), hostiles_at(2), player(3)] {
            sender.send(notification).expect("receiver alive");
        }
        drop(sender);

        let mut recorder = Recorder::default();
        let dispatched = Presenter::new(receiver).run(&mut recorder);

        assert_eq!(dispatched, 2);
        assert_eq!(recorder.calls, vec!["hostiles 2", "player 3"]);
    }
}

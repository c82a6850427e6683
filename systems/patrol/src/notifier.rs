use crossbeam::channel::{self, Receiver, Sender};
use maze_patrol_core::{Event, Notification};
use maze_patrol_world::{query, World};
use tracing::debug;

/// Sending half of the channel that feeds the presentation context.
#[derive(Clone, Debug)]
pub struct Notifier {
    sender: Sender<Notification>,
}

impl Notifier {
    /// Wraps an existing sender.
    #[must_use]
    pub fn new(sender: Sender<Notification>) -> Self {
        Self { sender }
    }

    /// Creates a notifier together with the receiver the presenter drains.
    #[must_use]
    pub fn channel() -> (Self, Receiver<Notification>) {
        let (sender, receiver) = channel::unbounded();
        (Self::new(sender), receiver)
    }

    /// Translates world events into the notifications a renderer needs.
    ///
    /// Must be called with the same world borrow the events were produced
    /// under, so the attached snapshots describe exactly that state.
    #[must_use]
    pub fn collect(world: &World, events: &[Event]) -> Vec<Notification> {
        let mut player_changed = false;
        let mut hostiles_changed = false;
        let mut outcomes = Vec::new();

        for event in events {
            match event {
                Event::PlayerMoved { .. } | Event::PlayerDamaged { .. } => player_changed = true,
                Event::HostileAdvanced { .. } | Event::HostileTurned { .. } => {
                    hostiles_changed = true;
                }
                Event::GameReset => {
                    player_changed = true;
                    hostiles_changed = true;
                }
                Event::GameOver { outcome } => outcomes.push(*outcome),
            }
        }

        let mut notifications = Vec::new();
        if player_changed {
            notifications.push(Self::player_changed(world));
        }
        if hostiles_changed {
            notifications.push(Self::hostiles_changed(world));
        }
        notifications.extend(
            outcomes
                .into_iter()
                .map(|outcome| Notification::GameOver { outcome }),
        );
        notifications
    }

    /// Snapshot of every hostile, ready to be pushed to the renderer.
    #[must_use]
    pub fn hostiles_changed(world: &World) -> Notification {
        Notification::HostilesChanged {
            hostiles: query::hostile_view(world).into_vec(),
        }
    }

    /// Snapshot of the player, ready to be pushed to the renderer.
    #[must_use]
    pub fn player_changed(world: &World) -> Notification {
        Notification::PlayerChanged {
            player: query::player(world),
        }
    }

    /// Pushes a single notification. A vanished presenter is not an error.
    pub fn send(&self, notification: Notification) {
        if self.sender.send(notification).is_err() {
            debug!("presentation context disconnected; notification dropped");
        }
    }

    /// Pushes notifications in order.
    pub fn publish(&self, notifications: Vec<Notification>) {
        for notification in notifications {
            self.send(notification);
        }
    }
}

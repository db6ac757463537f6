//! Event-to-notification routing.
//!
//! [`NotificationRouter`] subscribes to the event bus and turns events that
//! concern a specific person into inbox entries.

use std::sync::Arc;

use hive_events::{EventKind, HiveEvent};
use tokio::sync::broadcast;

use super::inbox::{Notification, NotificationInbox, KIND_SHOT_MORE_REQUESTED};

pub struct NotificationRouter {
    inbox: Arc<NotificationInbox>,
}

impl NotificationRouter {
    pub fn new(inbox: Arc<NotificationInbox>) -> Self {
        Self { inbox }
    }

    /// Run the routing loop.
    ///
    /// Exits when the channel is closed, i.e. when the
    /// [`EventBus`](hive_events::EventBus) is dropped.
    pub async fn run(self, mut receiver: broadcast::Receiver<HiveEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) => self.route_event(event).await,
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(skipped = n, "Notification router lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, notification router shutting down");
                    break;
                }
            }
        }
    }

    /// File a single event. Events without a recipient are dropped.
    pub async fn route_event(&self, event: HiveEvent) {
        let EventKind::ShotMoreRequested {
            shot_id,
            event_id,
            recipient_id,
            description,
            requested_by,
        } = event.kind
        else {
            return;
        };

        let Some(recipient_id) = recipient_id else {
            tracing::info!(
                shot_id = %shot_id,
                event_id = %event_id,
                "More shots requested but nobody is assigned, notification dropped",
            );
            return;
        };

        let message = match requested_by {
            Some(by) => format!("{by} requested more coverage for \"{description}\""),
            None => format!("More coverage requested for \"{description}\""),
        };
        let mut notification = Notification::new(recipient_id, KIND_SHOT_MORE_REQUESTED, message);
        notification.shot_id = Some(shot_id);
        notification.event_id = Some(event_id);
        notification.created_at = event.timestamp;

        tracing::debug!(
            recipient_id = %notification.recipient_id,
            shot_id = ?notification.shot_id,
            "Notification filed",
        );
        self.inbox.push(notification).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn more_requested(recipient: Option<&str>) -> HiveEvent {
        HiveEvent::new(EventKind::ShotMoreRequested {
            shot_id: "s1".into(),
            event_id: "evt1".into(),
            recipient_id: recipient.map(String::from),
            description: "Wide crowd".into(),
            requested_by: Some("editor".into()),
        })
    }

    #[tokio::test]
    async fn files_request_more_for_recipient() {
        let inbox = Arc::new(NotificationInbox::default());
        let router = NotificationRouter::new(Arc::clone(&inbox));

        router.route_event(more_requested(Some("p1"))).await;

        let entries = inbox.for_recipient("p1").await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, KIND_SHOT_MORE_REQUESTED);
        assert_eq!(entries[0].shot_id.as_deref(), Some("s1"));
        assert!(entries[0].message.contains("Wide crowd"));
    }

    #[tokio::test]
    async fn drops_request_without_recipient() {
        let inbox = Arc::new(NotificationInbox::default());
        let router = NotificationRouter::new(Arc::clone(&inbox));
        router.route_event(more_requested(None)).await;
        assert!(inbox.all().await.is_empty());
    }

    #[tokio::test]
    async fn ignores_unrelated_events() {
        let inbox = Arc::new(NotificationInbox::default());
        let router = NotificationRouter::new(Arc::clone(&inbox));
        router
            .route_event(HiveEvent::new(EventKind::JobReconciled {
                job_id: "job1".into(),
                shots_updated: 2,
            }))
            .await;
        assert!(inbox.all().await.is_empty());
    }

    #[tokio::test]
    async fn loop_stops_when_bus_closes() {
        let inbox = Arc::new(NotificationInbox::default());
        let bus = hive_events::EventBus::default();
        let handle = tokio::spawn(NotificationRouter::new(Arc::clone(&inbox)).run(bus.subscribe()));

        bus.publish(more_requested(Some("p2")));
        drop(bus);
        handle.await.unwrap();

        assert_eq!(inbox.for_recipient("p2").await.len(), 1);
    }
}

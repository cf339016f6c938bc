//! Background task appending state events from the bus to the event log.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use super::postgres::PostgresPersistence;
use crate::domain::PoolEvent;

/// Row contents for one persisted event.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    /// Pool the event belongs to.
    pub pool_id: Option<String>,
    /// Event type discriminator.
    pub event_type: &'static str,
    /// Serialized event.
    pub payload: serde_json::Value,
}

/// Converts an event into a row, or `None` for events that are not
/// persisted (notifications).
#[must_use]
pub fn event_record(event: &PoolEvent) -> Option<EventRecord> {
    if !event.is_state_change() {
        return None;
    }
    let payload = match serde_json::to_value(event) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!(event_type = event.event_type_str(), error = %err, "event not serializable");
            return None;
        }
    };
    Some(EventRecord {
        pool_id: event.pool_id().map(ToString::to_string),
        event_type: event.event_type_str(),
        payload,
    })
}

/// Spawns the recorder. It runs until the bus is closed.
///
/// Write failures are logged and skipped; a lagging recorder logs how many
/// events it missed.
pub fn spawn_event_recorder(
    persistence: PostgresPersistence,
    mut rx: broadcast::Receiver<PoolEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let Some(record) = event_record(&event) else {
                        continue;
                    };
                    if let Err(err) = persistence
                        .save_event(record.pool_id.as_deref(), record.event_type, &record.payload)
                        .await
                    {
                        tracing::error!(
                            event_type = record.event_type,
                            error = %err,
                            "failed to persist event"
                        );
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event recorder lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        tracing::info!("event recorder stopped");
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{Notification, ParticipantId, PoolId};
    use chrono::Utc;

    #[test]
    fn winner_event_becomes_row() {
        let Ok(pool_id) = PoolId::new("salawara") else {
            panic!("valid id");
        };
        let Ok(winner) = ParticipantId::new("0xwinner") else {
            panic!("valid winner");
        };
        let event = PoolEvent::WinnerSelected {
            pool_id,
            round: 2,
            winner,
            timestamp: Utc::now(),
        };

        let Some(record) = event_record(&event) else {
            panic!("state change should be recorded");
        };
        assert_eq!(record.pool_id.as_deref(), Some("salawara"));
        assert_eq!(record.event_type, "winner_selected");
        assert_eq!(record.payload["winner"], "0xwinner");
        assert_eq!(record.payload["round"], 2);
    }

    #[test]
    fn notifications_are_not_recorded() {
        let event = PoolEvent::Notification(Notification::success(None, "done"));
        assert!(event_record(&event).is_none());
    }
}

use novanest_core::goals::GoalScope;
use serde_json::Value;
use tokio::sync::broadcast;

/// Serializable envelope that carries event names and optional payloads.
///
/// `scope` is the owner of the goal the event is about; stream subscribers
/// only see events for scopes they belong to.
#[derive(Clone, Debug)]
pub struct ServerEvent {
    pub name: &'static str,
    pub scope: GoalScope,
    pub payload: Option<Value>,
}

impl ServerEvent {
    pub fn scoped(name: &'static str, scope: GoalScope, payload: Value) -> Self {
        Self {
            name,
            scope,
            payload: Some(payload),
        }
    }
}

/// Lightweight broadcast bus that fans out events to any connected clients.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: ServerEvent) {
        // Lagging listeners are ignored to avoid blocking producers.
        let _ = self.sender.send(event);
    }
}

/// Who is listening on a stream: the caller's own goals plus, optionally,
/// one team's shared goals.
#[derive(Clone, Debug)]
pub struct EventAudience {
    user: GoalScope,
    team: Option<GoalScope>,
}

impl EventAudience {
    pub fn new(user_id: &str, team_id: Option<&str>) -> Self {
        Self {
            user: GoalScope::user(user_id),
            team: team_id.map(GoalScope::team),
        }
    }

    pub fn admits(&self, event: &ServerEvent) -> bool {
        event.scope == self.user || self.team.as_ref() == Some(&event.scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(scope: GoalScope) -> ServerEvent {
        ServerEvent::scoped("goal:updated", scope, json!({}))
    }

    #[test]
    fn test_audience_sees_only_its_scopes() {
        let audience = EventAudience::new("alice", Some("t-1"));
        assert!(audience.admits(&event(GoalScope::user("alice"))));
        assert!(audience.admits(&event(GoalScope::team("t-1"))));
        assert!(!audience.admits(&event(GoalScope::user("bob"))));
        assert!(!audience.admits(&event(GoalScope::team("t-2"))));
        // A team id equal to a user id is still a different scope
        assert!(!audience.admits(&event(GoalScope::team("alice"))));

        let personal_only = EventAudience::new("alice", None);
        assert!(!personal_only.admits(&event(GoalScope::team("t-1"))));
    }
}

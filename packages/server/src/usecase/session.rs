//! Per-connection session state.

use crate::domain::{ConnectionId, DisplayName, RoomKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    Joined(DisplayName),
    Closed,
}

/// One connection's view of its room: who it is and how far it got.
#[derive(Debug)]
pub struct Session {
    connection_id: ConnectionId,
    key: RoomKey,
    /// Identity supplied by the upstream auth proxy, if any.
    identity: Option<DisplayName>,
    state: SessionState,
}

impl Session {
    pub fn new(key: RoomKey, identity: Option<DisplayName>) -> Self {
        Self {
            connection_id: ConnectionId::generate(),
            key,
            identity,
            state: SessionState::Connecting,
        }
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.connection_id
    }

    pub fn key(&self) -> &RoomKey {
        &self.key
    }

    pub fn identity(&self) -> Option<&DisplayName> {
        self.identity.as_ref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Name the connection joined under, if it has joined.
    pub fn display_name(&self) -> Option<&DisplayName> {
        match &self.state {
            SessionState::Joined(name) => Some(name),
            _ => None,
        }
    }

    pub fn is_closed(&self) -> bool {
        self.state == SessionState::Closed
    }

    /// A closed session stays closed.
    pub(super) fn mark_joined(&mut self, name: DisplayName) {
        if !self.is_closed() {
            self.state = SessionState::Joined(name);
        }
    }

    /// Returns `true` only for the call that actually closed the session.
    pub fn close(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.state = SessionState::Closed;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(s: &str) -> DisplayName {
        DisplayName::new(s.to_string()).unwrap()
    }

    #[test]
    fn test_session_lifecycle() {
        // テスト項目: Connecting → Joined → Closed と遷移し、Closed は一度だけ成立する
        // given (前提条件):
        let mut session = Session::new("whiteboard:abc".parse().unwrap(), None);
        assert_eq!(session.state(), &SessionState::Connecting);

        // when (操作):
        session.mark_joined(name("alice"));
        let joined_name = session.display_name().cloned();
        let first_close = session.close();
        let second_close = session.close();

        // then (期待する結果):
        assert_eq!(joined_name, Some(name("alice")));
        assert!(first_close);
        assert!(!second_close);
        assert!(session.display_name().is_none());
    }

    #[test]
    fn test_closed_session_cannot_rejoin() {
        // テスト項目: Closed になったセッションは join されない
        // given (前提条件):
        let mut session = Session::new("chat:abc".parse().unwrap(), Some(name("bob")));
        session.close();

        // when (操作):
        session.mark_joined(name("bob"));

        // then (期待する結果):
        assert!(session.is_closed());
        assert_eq!(session.identity(), Some(&name("bob")));
    }
}

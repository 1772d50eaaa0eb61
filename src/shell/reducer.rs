//! Reducer for the shell session lifecycle.

use crate::mvi::Reducer;

use super::intent::SessionIntent;
use super::state::SessionState;

/// Pure state transitions. Killing and spawning happen in
/// [`ShellSession`](super::ShellSession) around the dispatch.
pub struct SessionReducer;

impl Reducer for SessionReducer {
    type State = SessionState;
    type Intent = SessionIntent;

    fn reduce(state: Self::State, intent: Self::Intent) -> Self::State {
        match intent {
            SessionIntent::Start => SessionState::Starting,

            SessionIntent::Spawned => match state {
                SessionState::Starting => SessionState::Running,
                other => other,
            },

            SessionIntent::SpawnFailed => match state {
                SessionState::Starting => SessionState::Exited,
                other => other,
            },

            SessionIntent::ProcessExited | SessionIntent::Stop => match state {
                SessionState::Starting | SessionState::Running => SessionState::Exited,
                // Stopping a session that never ran, or one already gone, changes nothing.
                other => other,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_from_stopped_then_spawned_is_running() {
        let state = SessionReducer::reduce(SessionState::Stopped, SessionIntent::Start);
        assert_eq!(state, SessionState::Starting);
        let state = SessionReducer::reduce(state, SessionIntent::Spawned);
        assert_eq!(state, SessionState::Running);
    }

    #[test]
    fn restart_passes_through_starting() {
        let state = SessionReducer::reduce(SessionState::Running, SessionIntent::Start);
        assert_eq!(state, SessionState::Starting);
    }

    #[test]
    fn start_from_exited() {
        let state = SessionReducer::reduce(SessionState::Exited, SessionIntent::Start);
        assert_eq!(state, SessionState::Starting);
    }

    #[test]
    fn spawn_failure_exits() {
        let state = SessionReducer::reduce(SessionState::Starting, SessionIntent::SpawnFailed);
        assert_eq!(state, SessionState::Exited);
    }

    #[test]
    fn spawned_outside_starting_is_noop() {
        assert_eq!(
            SessionReducer::reduce(SessionState::Exited, SessionIntent::Spawned),
            SessionState::Exited
        );
        assert_eq!(
            SessionReducer::reduce(SessionState::Stopped, SessionIntent::Spawned),
            SessionState::Stopped
        );
    }

    #[test]
    fn process_exit_from_running() {
        let state = SessionReducer::reduce(SessionState::Running, SessionIntent::ProcessExited);
        assert_eq!(state, SessionState::Exited);
    }

    #[test]
    fn stop_is_idempotent_on_exited() {
        let state = SessionReducer::reduce(SessionState::Exited, SessionIntent::Stop);
        assert_eq!(state, SessionState::Exited);
    }

    #[test]
    fn stop_on_never_started_session_stays_stopped() {
        let state = SessionReducer::reduce(SessionState::Stopped, SessionIntent::Stop);
        assert_eq!(state, SessionState::Stopped);
    }
}

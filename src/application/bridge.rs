//! Bridge Orchestrator
//!
//! Applies the pre-bridge channel variables and issues the bridge. Every
//! action is blocking; the first rejected one aborts the sequence.

use crate::domain::routing::DialTarget;
use crate::domain::shared::{CallControlError, Result};
use crate::domain::call::EslConnection;
use tracing::{debug, info};

pub const DEFAULT_RINGBACK: &str = "${us-ring}";

#[derive(Debug, Clone)]
pub struct BridgeOrchestrator {
    ringback: String,
}

impl BridgeOrchestrator {
    pub fn new(ringback: impl Into<String>) -> Self {
        Self {
            ringback: ringback.into(),
        }
    }

    /// `set` arguments applied, in order, before bridging
    pub fn channel_variables(&self) -> Vec<String> {
        vec![
            "hangup_after_bridge=true".to_string(),
            "continue_on_fail=true".to_string(),
            format!("ringback={}", self.ringback),
        ]
    }

    pub async fn bridge<C>(&self, conn: &mut C, target: &DialTarget) -> Result<()>
    where
        C: EslConnection + ?Sized,
    {
        for variable in self.channel_variables() {
            Self::execute(conn, "set", &variable).await?;
        }

        info!("Bridging to: {}", target);
        Self::execute(conn, "bridge", target.as_str()).await
    }

    async fn execute<C>(conn: &mut C, app: &str, args: &str) -> Result<()>
    where
        C: EslConnection + ?Sized,
    {
        debug!(app, args, "Executing");
        conn.execute(app, args, true)
            .await
            .map(|_| ())
            .map_err(|e| CallControlError::action(app, args, e))
    }
}

impl Default for BridgeOrchestrator {
    fn default() -> Self {
        Self::new(DEFAULT_RINGBACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::call::{ChannelEvent, EslError};
    use async_trait::async_trait;

    /// Records executed actions; fails the one at `fail_at`.
    #[derive(Default)]
    struct RecordingConnection {
        executed: Vec<(String, String, bool)>,
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl EslConnection for RecordingConnection {
        async fn send(&mut self, _command: &str) -> std::result::Result<ChannelEvent, EslError> {
            Ok(ChannelEvent::default())
        }

        async fn execute(
            &mut self,
            app: &str,
            args: &str,
            blocking: bool,
        ) -> std::result::Result<ChannelEvent, EslError> {
            let index = self.executed.len();
            self.executed
                .push((app.to_string(), args.to_string(), blocking));
            if self.fail_at == Some(index) {
                return Err(EslError::CommandFailed("-ERR rejected".to_string()));
            }
            Ok(ChannelEvent::default())
        }

        async fn read_event(&mut self) -> std::result::Result<ChannelEvent, EslError> {
            Err(EslError::Disconnected)
        }

        async fn close(&mut self) {}
    }

    #[tokio::test]
    async fn test_actions_in_order() {
        let mut conn = RecordingConnection::default();
        let target = DialTarget::new("user/2002@example.test");

        BridgeOrchestrator::default()
            .bridge(&mut conn, &target)
            .await
            .unwrap();

        let expected = vec![
            ("set", "hangup_after_bridge=true"),
            ("set", "continue_on_fail=true"),
            ("set", "ringback=${us-ring}"),
            ("bridge", "user/2002@example.test"),
        ];
        assert_eq!(conn.executed.len(), expected.len());
        for ((app, args, blocking), (want_app, want_args)) in conn.executed.iter().zip(expected) {
            assert_eq!(app, want_app);
            assert_eq!(args, want_args);
            assert!(blocking);
        }
    }

    #[tokio::test]
    async fn test_custom_ringback() {
        let orchestrator = BridgeOrchestrator::new("%(2000,4000,440,480)");
        assert_eq!(
            orchestrator.channel_variables()[2],
            "ringback=%(2000,4000,440,480)"
        );
    }

    #[tokio::test]
    async fn test_set_failure_aborts_before_bridge() {
        let mut conn = RecordingConnection {
            fail_at: Some(1),
            ..Default::default()
        };
        let target = DialTarget::new("user/2002@example.test");

        let err = BridgeOrchestrator::default()
            .bridge(&mut conn, &target)
            .await
            .unwrap_err();

        assert!(matches!(err, CallControlError::Action { ref app, .. } if app == "set"));
        assert_eq!(conn.executed.len(), 2);
        assert!(conn.executed.iter().all(|(app, _, _)| app != "bridge"));
    }

    #[tokio::test]
    async fn test_bridge_failure_is_action_error() {
        let mut conn = RecordingConnection {
            fail_at: Some(3),
            ..Default::default()
        };
        let target = DialTarget::new("user/2002@example.test");

        let err = BridgeOrchestrator::default()
            .bridge(&mut conn, &target)
            .await
            .unwrap_err();

        match err {
            CallControlError::Action { app, args, .. } => {
                assert_eq!(app, "bridge");
                assert_eq!(args, "user/2002@example.test");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}

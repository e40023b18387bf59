use async_trait::async_trait;

use crate::models::player::UserId;

/// Callback prefix for night target selections.
pub const NIGHT_CALLBACK: &str = "target_";
/// Callback prefix for exclusion votes.
pub const VOTE_CALLBACK: &str = "vote_";

/// A selectable target list attached to a private prompt, rendered by the
/// transport as buttons. Replies come back through the engine's
/// `submit_night_action` / `submit_vote` surface with the prefix stripped.
#[derive(Clone, Debug)]
pub struct TargetPrompt {
    pub targets: Vec<String>,
    pub callback_prefix: &'static str,
}

impl TargetPrompt {
    pub fn night(targets: Vec<String>) -> Self {
        Self {
            targets,
            callback_prefix: NIGHT_CALLBACK,
        }
    }

    pub fn vote(targets: Vec<String>) -> Self {
        Self {
            targets,
            callback_prefix: VOTE_CALLBACK,
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("delivery to {recipient} failed: {reason}")]
pub struct NotifyError {
    pub recipient: UserId,
    pub reason: String,
}

/// Outbound boundary between the engine and the chat transport.
///
/// The engine addresses real participants by their external identity and
/// never learns how messages are rendered or routed. A failed delivery is
/// reported through the `Result`; the engine logs it and carries on, so an
/// unreachable participant can never stall a phase transition.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_to(
        &self,
        recipient: UserId,
        text: &str,
        prompt: Option<TargetPrompt>,
    ) -> Result<(), NotifyError>;
}

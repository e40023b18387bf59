#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use mafia_engine::models::config::GameConfig;
use mafia_engine::models::game::Phase;
use mafia_engine::models::player::UserId;
use mafia_engine::notifier::{Notifier, NotifyError, TargetPrompt};
use mafia_engine::AppState;

/// Captures every outbound delivery for assertions.
#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<(UserId, String, Option<TargetPrompt>)>>,
}

impl RecordingNotifier {
    pub fn messages_for(&self, id: UserId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(recipient, _, _)| *recipient == id)
            .map(|(_, text, _)| text.clone())
            .collect()
    }

    pub fn prompts_for(&self, id: UserId) -> Vec<TargetPrompt> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(recipient, _, _)| *recipient == id)
            .filter_map(|(_, _, prompt)| prompt.clone())
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_to(
        &self,
        recipient: UserId,
        text: &str,
        prompt: Option<TargetPrompt>,
    ) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient, text.to_string(), prompt));
        Ok(())
    }
}

pub fn test_state(seed: u64) -> (AppState, Arc<RecordingNotifier>) {
    test_state_with(seed, GameConfig::default())
}

pub fn test_state_with(seed: u64, config: GameConfig) -> (AppState, Arc<RecordingNotifier>) {
    let notifier = Arc::new(RecordingNotifier::default());
    let state = AppState::with_seed(notifier.clone(), config, seed);
    (state, notifier)
}

/// Polls the session until it reaches `phase`, panicking on timeout. Used
/// for transitions driven by the spawned discussion scheduler.
pub async fn wait_for_phase(state: &AppState, phase: Phase, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if state.session.lock().await.phase == phase {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for {phase:?}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

use std::sync::Arc;

use log::{info, warn};
use tokio::sync::Notify;
use tokio::time;

use super::game_service::{begin_voting, broadcast};
use crate::error::GameError;
use crate::models::game::{DiscussionState, GameSession, Phase};
use crate::state::AppState;

/// Opens the discussion round and spawns the turn scheduler. Speaking
/// order is join order; each participant gets one timed window.
pub async fn start_discussion(state: AppState) -> Result<(), GameError> {
    let mut session = state.session.lock().await;
    if !session.started {
        warn!("start_discussion rejected: no running game");
        return Err(GameError::NotStarted);
    }
    if session.phase != Phase::Day {
        warn!("start_discussion rejected outside the day phase");
        return Err(GameError::WrongPhase(session.phase));
    }

    let skip = Arc::new(Notify::new());
    session.phase = Phase::Discussion;
    session.discussion = Some(DiscussionState {
        cursor: 0,
        skip: skip.clone(),
    });

    let secs = state.config.discussion_turn.as_secs();
    broadcast(
        &state,
        &session,
        &format!("Discussion begins! Each player has {secs} seconds."),
    )
    .await;
    drop(session);

    tokio::spawn(run_discussion(state, skip));
    Ok(())
}

/// Raises the skip signal for the current round. The scheduler ends the
/// discussion as soon as the signal wins the race against the timer.
pub async fn skip_discussion(state: AppState) -> Result<(), GameError> {
    let session = state.session.lock().await;
    match &session.discussion {
        Some(round) => {
            info!("discussion skip requested");
            round.skip.notify_one();
            Ok(())
        }
        None => Err(GameError::WrongPhase(session.phase)),
    }
}

/// Drives the speaking turns. Each iteration announces the speaker, then
/// waits on whichever fires first: the speaking timer or the skip signal.
/// The `Notify` handle doubles as the round identity, so a stale task
/// from an earlier round can never touch a newer round's cursor.
async fn run_discussion(state: AppState, my_round: Arc<Notify>) {
    loop {
        {
            let mut session = state.session.lock().await;
            let cursor = match &session.discussion {
                Some(round) if Arc::ptr_eq(&round.skip, &my_round) => round.cursor,
                _ => return,
            };
            if cursor >= session.players.len() {
                end_discussion(&state, &mut session).await;
                return;
            }
            let speaker = session.players[cursor].name.clone();
            let secs = state.config.discussion_turn.as_secs();
            broadcast(
                &state,
                &session,
                &format!("Now speaking: {speaker}. {secs} seconds."),
            )
            .await;
        }

        tokio::select! {
            _ = time::sleep(state.config.discussion_turn) => {
                let mut session = state.session.lock().await;
                match &mut session.discussion {
                    Some(round) if Arc::ptr_eq(&round.skip, &my_round) => round.cursor += 1,
                    _ => return,
                }
            }
            _ = my_round.notified() => {
                let mut session = state.session.lock().await;
                if matches!(&session.discussion, Some(round) if Arc::ptr_eq(&round.skip, &my_round)) {
                    info!("discussion ended early by skip");
                    end_discussion(&state, &mut session).await;
                }
                return;
            }
        }
    }
}

/// Closes the round and hands straight off to voting; the machine is
/// never left idle between discussion and the vote.
async fn end_discussion(state: &AppState, session: &mut GameSession) {
    session.discussion = None;
    session.phase = Phase::Voting;
    broadcast(state, session, "Discussion is over. Voting begins.").await;
    begin_voting(state, session).await;
}

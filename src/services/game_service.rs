use log::{error, info, warn};
use rand::rngs::StdRng;

use crate::error::GameError;
use crate::models::game::{
    GameSession, NightOutcome, NightState, Phase, Plurality, VoteOutcome, VoterKey,
};
use crate::models::player::UserId;
use crate::models::role::Role;
use crate::notifier::TargetPrompt;
use crate::state::AppState;

/// Delivers one private message, downgrading transport failures to a log
/// line so an unreachable participant never aborts an operation.
pub(crate) async fn notify(
    state: &AppState,
    recipient: UserId,
    text: &str,
    prompt: Option<TargetPrompt>,
) {
    if let Err(e) = state.notifier.send_to(recipient, text, prompt).await {
        error!("{e}");
    }
}

/// Addresses every real participant currently in the roster.
pub(crate) async fn broadcast(state: &AppState, session: &GameSession, text: &str) {
    for player in &session.players {
        if let Some(id) = player.id {
            notify(state, id, text, None).await;
        }
    }
}

/// Adds a participant to the lobby. With an identity this is a real join
/// and everyone already seated hears about it; without one it adds an
/// autonomous filler that the engine will play for.
pub async fn register(
    state: AppState,
    identity: Option<UserId>,
    name: String,
) -> Result<(), GameError> {
    let mut session = state.session.lock().await;
    session.register(identity, &name)?;
    match identity {
        Some(joiner) => {
            info!("player {name} ({joiner}) joined the game");
            for player in &session.players {
                match player.id {
                    Some(id) if id != joiner => {
                        notify(&state, id, &format!("{name} joined the game!"), None).await;
                    }
                    Some(id) => notify(&state, id, "You have joined the game.", None).await,
                    None => {}
                }
            }
        }
        None => info!("autonomous filler {name} added to the game"),
    }
    Ok(())
}

pub async fn list_roster(state: AppState) -> Vec<String> {
    state.session.lock().await.names()
}

/// Deals roles, reveals them privately, and drops into the first night.
pub async fn start(state: AppState) -> Result<(), GameError> {
    let mut session = state.session.lock().await;
    let required = state.config.min_players;
    if session.players.len() < required {
        warn!(
            "start rejected: {} of {} required players",
            session.players.len(),
            required
        );
        return Err(GameError::NotEnoughPlayers {
            joined: session.players.len(),
            required,
        });
    }
    if session.started {
        warn!("start rejected: the game is already running");
        return Err(GameError::AlreadyStarted);
    }

    let mut rng = state.rng.lock().await;
    session.assign_roles(&mut *rng);
    session.started = true;
    info!("game started with {} players", session.players.len());

    for player in &session.players {
        if let Some(id) = player.id {
            notify(&state, id, &format!("Your role: {}", player.role), None).await;
        }
    }
    broadcast(
        &state,
        &session,
        "The game has started! Roles are dealt; night falls.",
    )
    .await;

    begin_night(&state, &mut session, &mut rng).await;
    Ok(())
}

/// Says goodbye to everyone and clears the table back to an empty lobby.
pub async fn end_game(state: AppState) {
    let mut session = state.session.lock().await;
    info!("game ended by command");
    broadcast(&state, &session, "The game is over. Thanks for playing!").await;
    session.reset();
}

/// Enters the night phase: clears the target slots, prompts every real
/// role-holder for a pick, and resolves autonomous role-holders on the
/// spot with a uniform random choice. Mafia and Detective may not target
/// themselves; the Healer's choice set is unrestricted.
pub(crate) async fn begin_night(state: &AppState, session: &mut GameSession, rng: &mut StdRng) {
    session.phase = Phase::Night;
    session.night = NightState::default();

    let mafia: Vec<_> = session
        .players
        .iter()
        .filter(|p| p.role == Role::Mafia)
        .cloned()
        .collect();
    let detective = session.find_role(Role::Detective).cloned();
    let healer = session.find_role(Role::Healer).cloned();

    for member in &mafia {
        match member.id {
            Some(id) => {
                let prompt = TargetPrompt::night(session.target_names(Some(&member.name)));
                notify(state, id, "Night has fallen. Choose your victim.", Some(prompt)).await;
            }
            None => {
                session.night.mafia_target = session.random_target(rng, Some(&member.name));
                info!(
                    "autonomous mafia {} picked victim {:?}",
                    member.name, session.night.mafia_target
                );
            }
        }
    }

    if let Some(detective) = detective {
        match detective.id {
            Some(id) => {
                let prompt = TargetPrompt::night(session.target_names(Some(&detective.name)));
                notify(
                    state,
                    id,
                    "Night has fallen. Who will you investigate?",
                    Some(prompt),
                )
                .await;
            }
            None => {
                session.night.detective_target =
                    session.random_target(rng, Some(&detective.name));
                info!(
                    "autonomous detective {} investigates {:?}",
                    detective.name, session.night.detective_target
                );
            }
        }
    }

    if let Some(healer) = healer {
        match healer.id {
            Some(id) => {
                let prompt = TargetPrompt::night(session.target_names(None));
                notify(state, id, "Night has fallen. Who will you heal?", Some(prompt)).await;
            }
            None => {
                session.night.healer_target = session.random_target(rng, None);
                info!(
                    "autonomous healer {} heals {:?}",
                    healer.name, session.night.healer_target
                );
            }
        }
    }
}

/// Records a night pick from a real participant, routed by their role.
/// Resubmission overwrites the earlier pick.
pub async fn submit_night_action(
    state: AppState,
    actor: UserId,
    target: String,
) -> Result<(), GameError> {
    let mut session = state.session.lock().await;
    let role = session.record_night_action(actor, target.clone())?;
    info!("night action from {actor} ({role}): {target}");
    let ack = match role {
        Role::Mafia => format!("You chose your victim: {target}."),
        Role::Detective => format!("You will investigate {target}."),
        Role::Healer => format!("You will heal {target}."),
        Role::Villager => return Ok(()),
    };
    notify(&state, actor, &ack, None).await;
    Ok(())
}

/// Resolves the night: the victim dies unless the healer picked the same
/// target, the detective gets a private verdict, and the win evaluator
/// runs after the kill. On a terminal result the session resets;
/// otherwise day breaks.
pub async fn end_night(state: AppState) -> Result<NightOutcome, GameError> {
    let mut session = state.session.lock().await;
    if session.phase != Phase::Night {
        warn!("end_night rejected outside the night phase");
        return Err(GameError::WrongPhase(session.phase));
    }

    let NightState {
        mafia_target,
        detective_target,
        healer_target,
    } = session.night.clone();

    // verdict is taken before the kill, so a victim investigated on the
    // same night still yields a report
    let verdict = detective_target
        .as_deref()
        .and_then(|name| session.find_by_name(name))
        .map(|p| (p.name.clone(), p.role == Role::Mafia));

    let mut summary = String::from("The night is over.\n");
    let mut killed = None;
    let mut saved = false;

    if let Some(victim) = mafia_target {
        if healer_target.as_deref() == Some(victim.as_str()) {
            saved = true;
            summary.push_str(&format!("The healer saved {victim} from the mafia!\n"));
        } else {
            if let Some(id) = session.find_by_name(&victim).and_then(|p| p.id) {
                notify(
                    &state,
                    id,
                    "You were killed during the night. Thanks for playing!",
                    None,
                )
                .await;
            }
            session.remove(&victim);
            info!("{victim} was killed during the night");
            summary.push_str(&format!("{victim} was killed by the mafia.\n"));
            killed = Some(victim);
        }
    }

    // the report only reaches a detective who survived the night
    if let Some((checked, is_mafia)) = verdict {
        if let Some(id) = session.find_role(Role::Detective).and_then(|p| p.id) {
            let text = format!(
                "You investigated {checked}: {}.",
                if is_mafia { "Mafia" } else { "Not Mafia" }
            );
            notify(&state, id, &text, None).await;
        }
    }

    if let Some(winner) = session.check_win() {
        broadcast(&state, &session, &format!("{summary}\n{}", winner.announcement())).await;
        info!("game over: {winner:?}");
        session.reset();
        return Ok(NightOutcome::GameEnded(winner));
    }

    session.phase = Phase::Day;
    summary.push_str("\nDay breaks. Discuss, then vote!");
    broadcast(&state, &session, &summary).await;
    Ok(NightOutcome::Resolved { killed, saved })
}

/// Voting setup, entered straight from the end of discussion: clears the
/// day's vote map, casts every autonomous vote immediately, and hands
/// real participants a ballot.
pub(crate) async fn begin_voting(state: &AppState, session: &mut GameSession) {
    if session.players.len() <= 1 {
        // too few seats to hold a vote; fall through to night rather than
        // leaving the machine parked in the voting phase
        broadcast(state, session, "Not enough players for a vote. Night falls.").await;
        let mut rng = state.rng.lock().await;
        begin_night(state, session, &mut rng).await;
        return;
    }

    session.votes.clear();
    let ballot = session.names();
    let seats = session.players.clone();
    for player in seats {
        match player.id {
            Some(id) => {
                notify(
                    state,
                    id,
                    "Vote to exclude a player:",
                    Some(TargetPrompt::vote(ballot.clone())),
                )
                .await;
            }
            None => {
                let target = {
                    let mut rng = state.rng.lock().await;
                    session.random_target(&mut *rng, Some(&player.name))
                };
                if let Some(target) = target {
                    info!("autonomous {} votes for {}", player.name, target);
                    session
                        .votes
                        .insert(VoterKey::Filler(player.name.clone()), target);
                }
            }
        }
    }
}

/// Records or overwrites one exclusion vote. Only roster membership is
/// checked; submission is accepted in any phase.
pub async fn submit_vote(state: AppState, voter: UserId, target: String) -> Result<(), GameError> {
    let mut session = state.session.lock().await;
    session.record_vote(voter, target.clone())?;
    info!("vote from {voter}: {target}");
    notify(&state, voter, &format!("Your vote: {target}."), None).await;
    Ok(())
}

/// Tallies the day's votes. A unique plurality target is excluded; a tie
/// or an empty map excludes nobody. The win evaluator runs after any
/// exclusion; if the game goes on, night falls again.
pub async fn end_day(state: AppState) -> Result<VoteOutcome, GameError> {
    let mut session = state.session.lock().await;
    if session.phase != Phase::Voting {
        warn!("end_day rejected outside the voting phase");
        return Err(GameError::WrongPhase(session.phase));
    }

    match session.plurality() {
        Plurality::NoVotes => {
            broadcast(
                &state,
                &session,
                "No votes were cast. Nobody is excluded. Night falls.",
            )
            .await;
            let mut rng = state.rng.lock().await;
            begin_night(&state, &mut session, &mut rng).await;
            Ok(VoteOutcome::NoExclusion)
        }
        Plurality::Tie => {
            let message = "The votes are split evenly. Nobody is excluded.";
            if let Some(winner) = session.check_win() {
                broadcast(&state, &session, &format!("{message}\n{}", winner.announcement()))
                    .await;
                session.reset();
                return Ok(VoteOutcome::GameEnded {
                    excluded: None,
                    winner,
                });
            }
            broadcast(&state, &session, &format!("{message} Night falls.")).await;
            let mut rng = state.rng.lock().await;
            begin_night(&state, &mut session, &mut rng).await;
            Ok(VoteOutcome::Tie)
        }
        Plurality::Target(name) => {
            if let Some(id) = session.find_by_name(&name).and_then(|p| p.id) {
                notify(
                    &state,
                    id,
                    "You have been excluded from the game. Thanks for playing!",
                    None,
                )
                .await;
            }
            session.remove(&name);
            info!("{name} was excluded by vote");
            let message = format!("{name} has been excluded from the game.");
            if let Some(winner) = session.check_win() {
                broadcast(&state, &session, &format!("{message}\n{}", winner.announcement()))
                    .await;
                info!("game over: {winner:?}");
                session.reset();
                return Ok(VoteOutcome::GameEnded {
                    excluded: Some(name),
                    winner,
                });
            }
            broadcast(&state, &session, &format!("{message} Night falls.")).await;
            let mut rng = state.rng.lock().await;
            begin_night(&state, &mut session, &mut rng).await;
            Ok(VoteOutcome::Excluded(name))
        }
    }
}

use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;

use super::player::{Participant, UserId};
use super::role::Role;
use crate::error::GameError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    #[default]
    Lobby,
    Night,
    Day,
    Discussion,
    Voting,
    Ended,
}

/// Per-night target slots. Cleared on every entry into the night phase.
/// Each slot is last-write-wins: a second Mafia submission overwrites the
/// first rather than merging.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct NightState {
    pub mafia_target: Option<String>,
    pub detective_target: Option<String>,
    pub healer_target: Option<String>,
}

/// Key under which a vote is recorded: real participants vote under their
/// external identity, fillers under their table name.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum VoterKey {
    Player(UserId),
    Filler(String),
}

/// Live state of a discussion round. `skip` is a fresh signal per round,
/// raced against the speaking timer by the scheduler task.
#[derive(Debug)]
pub struct DiscussionState {
    pub cursor: usize,
    pub skip: Arc<Notify>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Villagers,
    Mafia,
}

impl Winner {
    pub fn announcement(&self) -> &'static str {
        match self {
            Winner::Villagers => "The game is over. The villagers win!",
            Winner::Mafia => "The game is over. The mafia wins!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NightOutcome {
    GameEnded(Winner),
    Resolved { killed: Option<String>, saved: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteOutcome {
    NoExclusion,
    Tie,
    Excluded(String),
    GameEnded {
        excluded: Option<String>,
        winner: Winner,
    },
}

/// Outcome of counting the current vote map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plurality {
    NoVotes,
    Tie,
    Target(String),
}

/// The single authoritative game. Mutated only behind the state mutex;
/// removal from `players` is the one and only form of elimination.
#[derive(Debug, Default)]
pub struct GameSession {
    pub players: Vec<Participant>,
    pub started: bool,
    pub phase: Phase,
    pub night: NightState,
    pub votes: HashMap<VoterKey, String>,
    pub discussion: Option<DiscussionState>,
}

impl GameSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Back to the empty lobby. Runs when a win condition fires or an
    /// explicit end-game command arrives.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Adds a participant during the lobby. Join order is speaking order.
    pub fn register(&mut self, identity: Option<UserId>, name: &str) -> Result<(), GameError> {
        if self.started {
            return Err(GameError::AlreadyStarted);
        }
        if self.players.iter().any(|p| p.name == name) {
            return Err(GameError::DuplicateName);
        }
        if identity.is_some() && self.players.iter().any(|p| p.id == identity) {
            return Err(GameError::DuplicateIdentity);
        }
        self.players.push(Participant::new(identity, name.to_string()));
        Ok(())
    }

    pub fn names(&self) -> Vec<String> {
        self.players.iter().map(|p| p.name.clone()).collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<&Participant> {
        self.players.iter().find(|p| p.name == name)
    }

    pub fn find_by_id(&self, id: UserId) -> Option<&Participant> {
        self.players.iter().find(|p| p.id == Some(id))
    }

    pub fn find_role(&self, role: Role) -> Option<&Participant> {
        self.players.iter().find(|p| p.role == role)
    }

    pub fn remove(&mut self, name: &str) -> Option<Participant> {
        let index = self.players.iter().position(|p| p.name == name)?;
        Some(self.players.remove(index))
    }

    /// Shuffles the role multiset for the current roster and deals it in
    /// roster order. Called exactly once, at the start transition.
    pub fn assign_roles(&mut self, rng: &mut impl Rng) {
        let mut roles = Role::distribution(self.players.len());
        roles.shuffle(rng);
        for (player, role) in self.players.iter_mut().zip(roles) {
            player.role = role;
        }
    }

    /// All table names, optionally without one participant (actors that
    /// may not target themselves).
    pub fn target_names(&self, exclude: Option<&str>) -> Vec<String> {
        self.players
            .iter()
            .filter(|p| exclude != Some(p.name.as_str()))
            .map(|p| p.name.clone())
            .collect()
    }

    /// Uniform random pick among eligible targets, used for every
    /// autonomous decision.
    pub fn random_target(&self, rng: &mut impl Rng, exclude: Option<&str>) -> Option<String> {
        self.target_names(exclude).choose(rng).cloned()
    }

    /// Routes a night submission by the actor's role into the matching
    /// target slot. Villagers have no night action; their submissions are
    /// accepted and ignored.
    pub fn record_night_action(
        &mut self,
        actor: UserId,
        target: String,
    ) -> Result<Role, GameError> {
        let role = self
            .find_by_id(actor)
            .map(|p| p.role)
            .ok_or(GameError::NotInGame)?;
        if self.phase != Phase::Night {
            return Err(GameError::WrongPhase(self.phase));
        }
        match role {
            Role::Mafia => self.night.mafia_target = Some(target),
            Role::Detective => self.night.detective_target = Some(target),
            Role::Healer => self.night.healer_target = Some(target),
            Role::Villager => {}
        }
        Ok(role)
    }

    /// Records or overwrites a vote. Deliberately unphased: only roster
    /// membership is checked.
    pub fn record_vote(&mut self, voter: UserId, target: String) -> Result<(), GameError> {
        if self.find_by_id(voter).is_none() {
            return Err(GameError::NotInGame);
        }
        self.votes.insert(VoterKey::Player(voter), target);
        Ok(())
    }

    /// Counts the vote map and reports the unique plurality target, a tie
    /// at the maximum, or an empty map.
    pub fn plurality(&self) -> Plurality {
        if self.votes.is_empty() {
            return Plurality::NoVotes;
        }
        let mut counts: HashMap<&String, usize> = HashMap::new();
        for target in self.votes.values() {
            *counts.entry(target).or_insert(0) += 1;
        }
        let max = counts.values().copied().max().unwrap_or(0);
        let mut leaders = counts
            .into_iter()
            .filter(|(_, count)| *count == max)
            .map(|(name, _)| name.clone());
        let first = leaders.next().expect("non-empty vote map has a leader");
        if leaders.next().is_some() {
            Plurality::Tie
        } else {
            Plurality::Target(first)
        }
    }

    /// Terminal check, run after every elimination. Mafia win on reaching
    /// parity with everyone else (>=, not strict majority); villagers win
    /// once no Mafia remain.
    pub fn check_win(&self) -> Option<Winner> {
        let mafia = self.players.iter().filter(|p| p.role == Role::Mafia).count();
        let others = self.players.len() - mafia;
        if mafia == 0 {
            Some(Winner::Villagers)
        } else if mafia >= others {
            Some(Winner::Mafia)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn session_with(roles: &[Role]) -> GameSession {
        let mut session = GameSession::new();
        for (i, role) in roles.iter().enumerate() {
            let mut player = Participant::new(Some(i as UserId + 1), format!("P{}", i + 1));
            player.role = *role;
            session.players.push(player);
        }
        session
    }

    #[test]
    fn register_rejects_duplicates() {
        let mut session = GameSession::new();
        session.register(Some(1), "Alice").unwrap();
        session.register(None, "Bot").unwrap();
        assert_eq!(
            session.register(Some(2), "Alice"),
            Err(GameError::DuplicateName)
        );
        assert_eq!(
            session.register(Some(1), "Alice2"),
            Err(GameError::DuplicateIdentity)
        );
        assert_eq!(session.players.len(), 2);

        session.started = true;
        assert_eq!(
            session.register(Some(3), "Carol"),
            Err(GameError::AlreadyStarted)
        );
    }

    #[test]
    fn assign_roles_deals_the_full_multiset() {
        let mut session = GameSession::new();
        for i in 0..7 {
            session.register(None, &format!("B{i}")).unwrap();
        }
        let mut rng = StdRng::seed_from_u64(11);
        session.assign_roles(&mut rng);
        let mafia = session
            .players
            .iter()
            .filter(|p| p.role == Role::Mafia)
            .count();
        assert_eq!(mafia, 2);
        assert!(session.find_role(Role::Detective).is_some());
        assert!(session.find_role(Role::Healer).is_some());
    }

    #[test]
    fn win_check_thresholds() {
        assert_eq!(
            session_with(&[Role::Villager, Role::Villager]).check_win(),
            Some(Winner::Villagers)
        );
        assert_eq!(
            session_with(&[Role::Mafia, Role::Villager]).check_win(),
            Some(Winner::Mafia)
        );
        assert_eq!(
            session_with(&[Role::Mafia, Role::Villager, Role::Villager]).check_win(),
            None
        );
        assert_eq!(
            session_with(&[Role::Mafia, Role::Mafia, Role::Villager, Role::Villager]).check_win(),
            Some(Winner::Mafia)
        );
    }

    #[test]
    fn plurality_reports_unique_max_and_ties() {
        let mut session = session_with(&[Role::Villager; 4]);
        assert_eq!(session.plurality(), Plurality::NoVotes);

        session.votes.insert(VoterKey::Player(1), "P3".into());
        session.votes.insert(VoterKey::Player(2), "P3".into());
        session.votes.insert(VoterKey::Filler("B".into()), "P1".into());
        assert_eq!(session.plurality(), Plurality::Target("P3".into()));

        session.votes.insert(VoterKey::Player(4), "P1".into());
        assert_eq!(session.plurality(), Plurality::Tie);
    }

    #[test]
    fn night_action_routing_follows_roles() {
        let mut session = session_with(&[Role::Mafia, Role::Detective, Role::Healer, Role::Villager]);
        session.phase = Phase::Night;

        session.record_night_action(1, "P4".into()).unwrap();
        session.record_night_action(2, "P1".into()).unwrap();
        session.record_night_action(3, "P3".into()).unwrap();
        session.record_night_action(4, "P1".into()).unwrap();

        assert_eq!(session.night.mafia_target.as_deref(), Some("P4"));
        assert_eq!(session.night.detective_target.as_deref(), Some("P1"));
        assert_eq!(session.night.healer_target.as_deref(), Some("P3"));

        assert_eq!(
            session.record_night_action(99, "P1".into()),
            Err(GameError::NotInGame)
        );
        session.phase = Phase::Day;
        assert_eq!(
            session.record_night_action(1, "P2".into()),
            Err(GameError::WrongPhase(Phase::Day))
        );
    }
}

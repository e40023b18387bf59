use crate::models::game::Phase;

/// Caller-visible rejections returned by engine operations.
///
/// Every variant is recoverable: the command that triggered it is refused
/// and the session is left untouched. Delivery problems on the notifier
/// side are not part of this taxonomy; they are logged and swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("that action is not allowed during the {0:?} phase")]
    WrongPhase(Phase),
    #[error("the game has already started")]
    AlreadyStarted,
    #[error("the game has not been started")]
    NotStarted,
    #[error("not enough players: {joined} joined, {required} required")]
    NotEnoughPlayers { joined: usize, required: usize },
    #[error("a player with that name is already registered")]
    DuplicateName,
    #[error("you are already registered")]
    DuplicateIdentity,
    #[error("you are not part of this game")]
    NotInGame,
}

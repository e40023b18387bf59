use serde::{Deserialize, Serialize};

use super::role::Role;

/// External chat identity of a real participant.
pub type UserId = i64;

/// One seat at the table. `id` is `None` for autonomous fillers, whose
/// actions the engine resolves by uniform random choice. `name` is the
/// addressing key for votes and night actions and is unique per game.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Participant {
    pub id: Option<UserId>,
    pub name: String,
    pub role: Role,
}

impl Participant {
    pub fn new(id: Option<UserId>, name: String) -> Self {
        Self {
            id,
            name,
            role: Role::Villager,
        }
    }

    pub fn is_real(&self) -> bool {
        self.id.is_some()
    }
}

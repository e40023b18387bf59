use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Mafia,
    Detective,
    Healer,
    Villager,
}

impl Role {
    /// Role multiset for a game of `n` players: `max(1, n / 3)` Mafia,
    /// exactly one Detective and one Healer, Villagers for the rest.
    /// Callers guarantee `n >= 5` (enforced at game start).
    pub fn distribution(n: usize) -> Vec<Role> {
        let mafia = std::cmp::max(1, n / 3);
        let mut roles = vec![Role::Mafia; mafia];
        roles.push(Role::Detective);
        roles.push(Role::Healer);
        roles.resize(n, Role::Villager);
        roles
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Mafia => write!(f, "Mafia"),
            Role::Detective => write!(f, "Detective"),
            Role::Healer => write!(f, "Healer"),
            Role::Villager => write!(f, "Villager"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distribution_counts_match_formula() {
        for n in 5..=15 {
            let roles = Role::distribution(n);
            assert_eq!(roles.len(), n);
            let mafia = roles.iter().filter(|r| **r == Role::Mafia).count();
            let detectives = roles.iter().filter(|r| **r == Role::Detective).count();
            let healers = roles.iter().filter(|r| **r == Role::Healer).count();
            let villagers = roles.iter().filter(|r| **r == Role::Villager).count();
            assert_eq!(mafia, std::cmp::max(1, n / 3));
            assert_eq!(detectives, 1);
            assert_eq!(healers, 1);
            assert_eq!(villagers, n - mafia - 2);
        }
    }
}

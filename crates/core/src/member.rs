//! Team members and ticket assignment.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A team member that tickets can be assigned to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Member {
    /// Check whether the member lists a skill.
    pub fn has_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }
}

/// The roster used when configuration does not provide one.
pub fn default_roster() -> Vec<Member> {
    let member = |id, name: &str, skills: &[&str]| Member {
        id,
        name: name.to_string(),
        skills: skills.iter().map(|s| s.to_string()).collect(),
    };
    vec![
        member(1, "Alice", &["frontend", "ui"]),
        member(2, "Bob", &["backend", "api"]),
        member(3, "Charlie", &["database", "backend"]),
    ]
}

/// Infer the skill a ticket needs from its title.
pub fn skill_for_title(title: &str) -> &'static str {
    if title.to_lowercase().contains("api") {
        "backend"
    } else {
        "frontend"
    }
}

/// Pick a member with `skill` uniformly at random.
///
/// Returns `None` when nobody on the roster has the skill.
pub fn assign_member<'a, R>(roster: &'a [Member], skill: &str, rng: &mut R) -> Option<&'a Member>
where
    R: Rng + ?Sized,
{
    let candidates: Vec<&Member> = roster.iter().filter(|m| m.has_skill(skill)).collect();
    candidates.choose(rng).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn skill_inferred_from_title() {
        assert_eq!(skill_for_title("Fix login API"), "backend");
        assert_eq!(skill_for_title("rework the api client"), "backend");
        assert_eq!(skill_for_title("New landing page"), "frontend");
    }

    #[test]
    fn assignment_only_picks_matching_members() {
        let roster = default_roster();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let member = assign_member(&roster, "backend", &mut rng).unwrap();
            assert!(member.name == "Bob" || member.name == "Charlie");
        }
        let member = assign_member(&roster, "ui", &mut rng).unwrap();
        assert_eq!(member.name, "Alice");
    }

    #[test]
    fn assignment_without_candidates_is_none() {
        let roster = default_roster();
        let mut rng = StdRng::seed_from_u64(1);
        assert!(assign_member(&roster, "devops", &mut rng).is_none());
        assert!(assign_member(&[], "backend", &mut rng).is_none());
    }
}

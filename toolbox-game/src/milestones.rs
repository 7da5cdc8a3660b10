//! XP milestones and "what's next" lookup.
use serde::{Deserialize, Serialize};

/// An XP threshold paired with the reward shown when it is reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub xp_threshold: u32,
    pub reward: String,
}

impl Milestone {
    #[must_use]
    pub fn new(xp_threshold: u32, reward: impl Into<String>) -> Self {
        Self {
            xp_threshold,
            reward: reward.into(),
        }
    }
}

/// Pick the milestone list in effect: a non-empty override wins over the default.
#[must_use]
pub fn effective_milestones<'a>(
    override_list: &'a [Milestone],
    default_list: &'a [Milestone],
) -> &'a [Milestone] {
    if override_list.is_empty() {
        default_list
    } else {
        override_list
    }
}

/// Stable ascending copy of a milestone list; ties keep their original order.
#[must_use]
pub fn sorted_milestones(list: &[Milestone]) -> Vec<&Milestone> {
    let mut sorted: Vec<&Milestone> = list.iter().collect();
    sorted.sort_by_key(|m| m.xp_threshold);
    sorted
}

/// The smallest-threshold milestone strictly above `xp`, if any.
#[must_use]
pub fn next_milestone<'a>(
    xp: u32,
    override_list: &'a [Milestone],
    default_list: &'a [Milestone],
) -> Option<&'a Milestone> {
    sorted_milestones(effective_milestones(override_list, default_list))
        .into_iter()
        .find(|m| m.xp_threshold > xp)
}

/// Milestones whose threshold lies in `(before, after]`, ascending.
///
/// Used after an XP gain to announce every milestone crossed in one step.
#[must_use]
pub fn milestones_crossed<'a>(
    before: u32,
    after: u32,
    override_list: &'a [Milestone],
    default_list: &'a [Milestone],
) -> Vec<&'a Milestone> {
    if after <= before {
        return Vec::new();
    }
    sorted_milestones(effective_milestones(override_list, default_list))
        .into_iter()
        .filter(|m| m.xp_threshold > before && m.xp_threshold <= after)
        .collect()
}

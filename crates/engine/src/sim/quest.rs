use std::collections::BTreeMap;
use std::fmt;

use super::geometry::{MapId, Vec2};

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuestId(pub String);

impl QuestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuestStatus {
    #[default]
    None,
    Offered,
    Accepted,
    Complete,
}

impl QuestStatus {
    pub fn as_token(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Offered => "offered",
            Self::Accepted => "accepted",
            Self::Complete => "complete",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RewardItem {
    pub name: String,
    pub sprite: String,
    pub position: Vec2,
}

/// `status` is what the game shows; `future_status` is staged during a
/// conversation and only becomes `status` through [`Quest::commit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Quest {
    id: QuestId,
    name: String,
    reward: RewardItem,
    target_map: MapId,
    status: QuestStatus,
    future_status: QuestStatus,
}

impl Quest {
    pub fn new(id: QuestId, name: impl Into<String>, reward: RewardItem, target_map: MapId) -> Self {
        Self {
            id,
            name: name.into(),
            reward,
            target_map,
            status: QuestStatus::None,
            future_status: QuestStatus::None,
        }
    }

    pub fn id(&self) -> &QuestId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reward(&self) -> &RewardItem {
        &self.reward
    }

    pub fn target_map(&self) -> &MapId {
        &self.target_map
    }

    pub fn status(&self) -> QuestStatus {
        self.status
    }

    pub fn future_status(&self) -> QuestStatus {
        self.future_status
    }

    pub fn stage(&mut self, next: QuestStatus) {
        self.future_status = next;
    }

    /// Returns the committed transition, if the status actually moved.
    pub fn commit(&mut self) -> Option<(QuestStatus, QuestStatus)> {
        if self.status == self.future_status {
            return None;
        }
        let previous = self.status;
        self.status = self.future_status;
        Some((previous, self.status))
    }
}

/// Every quest in the game, shared across maps because a quest offered on
/// one map can place its reward on another.
#[derive(Debug, Clone, Default)]
pub struct QuestRegistry {
    quests: BTreeMap<QuestId, Quest>,
}

impl QuestRegistry {
    pub fn insert(&mut self, quest: Quest) -> Option<Quest> {
        self.quests.insert(quest.id.clone(), quest)
    }

    pub fn get(&self, id: &QuestId) -> Option<&Quest> {
        self.quests.get(id)
    }

    pub fn get_mut(&mut self, id: &QuestId) -> Option<&mut Quest> {
        self.quests.get_mut(id)
    }

    pub fn contains(&self, id: &QuestId) -> bool {
        self.quests.contains_key(id)
    }

    pub fn status(&self, id: &QuestId) -> Option<QuestStatus> {
        self.quests.get(id).map(Quest::status)
    }

    pub fn stage(&mut self, id: &QuestId, next: QuestStatus) -> bool {
        match self.quests.get_mut(id) {
            Some(quest) => {
                quest.stage(next);
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_quest() -> Quest {
        Quest::new(
            QuestId::new("lost_wrench"),
            "Lost Wrench",
            RewardItem {
                name: "wrench".to_string(),
                sprite: "items/wrench.png".to_string(),
                position: Vec2::new(10.0, 20.0),
            },
            MapId::from("plains_portal.tmx"),
        )
    }

    #[test]
    fn staging_does_not_touch_committed_status() {
        let mut quest = sample_quest();
        quest.stage(QuestStatus::Offered);
        quest.stage(QuestStatus::Accepted);
        quest.stage(QuestStatus::Offered);
        assert_eq!(quest.status(), QuestStatus::None);
        assert_eq!(quest.future_status(), QuestStatus::Offered);
    }

    #[test]
    fn commit_moves_staged_status() {
        let mut quest = sample_quest();
        quest.stage(QuestStatus::Offered);
        assert_eq!(
            quest.commit(),
            Some((QuestStatus::None, QuestStatus::Offered))
        );
        assert_eq!(quest.status(), QuestStatus::Offered);
        assert_eq!(quest.commit(), None);
    }

    #[test]
    fn registry_stage_reports_unknown_ids() {
        let mut registry = QuestRegistry::default();
        registry.insert(sample_quest());
        assert!(registry.stage(&QuestId::new("lost_wrench"), QuestStatus::Offered));
        assert!(!registry.stage(&QuestId::new("missing"), QuestStatus::Offered));
        assert_eq!(
            registry.status(&QuestId::new("lost_wrench")),
            Some(QuestStatus::None)
        );
    }
}

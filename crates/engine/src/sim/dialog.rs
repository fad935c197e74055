use super::geometry::MapId;
use super::quest::{QuestId, QuestRegistry, QuestStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialogKey {
    Hello,
    What,
    Salutation,
    GoAway,
    Bye,
}

impl DialogKey {
    pub const ALL: [DialogKey; 5] = [
        DialogKey::Hello,
        DialogKey::What,
        DialogKey::Salutation,
        DialogKey::GoAway,
        DialogKey::Bye,
    ];

    pub fn as_token(self) -> &'static str {
        match self {
            Self::Hello => "hello",
            Self::What => "what",
            Self::Salutation => "salutation",
            Self::GoAway => "goaway",
            Self::Bye => "bye",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_token() == token)
    }

    const fn index(self) -> usize {
        match self {
            Self::Hello => 0,
            Self::What => 1,
            Self::Salutation => 2,
            Self::GoAway => 3,
            Self::Bye => 4,
        }
    }
}

/// One line per conversational state. Construction requires all of them,
/// so a missing line is a load-time problem rather than a blank bubble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogTable {
    lines: [String; 5],
}

impl DialogTable {
    pub fn new(hello: String, what: String, salutation: String, goaway: String, bye: String) -> Self {
        Self {
            lines: [hello, what, salutation, goaway, bye],
        }
    }

    pub fn line(&self, key: DialogKey) -> &str {
        &self.lines[key.index()]
    }
}

/// Hero-side conversation state. `active_quest` survives between sessions;
/// `partner` and `text` only live while talking mode is on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DialogSession {
    pub talking: bool,
    pub partner: Option<DialogPartner>,
    pub text: Option<String>,
    pub active_quest: Option<QuestId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogPartner {
    pub map: MapId,
    pub npc_index: usize,
    pub name: String,
}

impl DialogSession {
    pub fn clear_partner(&mut self) {
        self.partner = None;
        self.text = None;
    }
}

/// Picks the line an NPC says to the hero and stages any quest change the
/// conversation causes. Line choice reads committed status only.
pub(crate) fn select_line(
    first_contact: bool,
    npc_quest: Option<&QuestId>,
    session: &mut DialogSession,
    quests: &mut QuestRegistry,
) -> DialogKey {
    if first_contact {
        let Some(quest_id) = npc_quest else {
            return DialogKey::Hello;
        };
        // Quests can be shared between NPCs; only a never-offered one is offered.
        match quests.status(quest_id) {
            Some(QuestStatus::Complete) => return DialogKey::Bye,
            Some(QuestStatus::None) if session.active_quest.is_none() => {
                if quests.stage(quest_id, QuestStatus::Offered) {
                    session.active_quest = Some(quest_id.clone());
                }
            }
            _ => {}
        }
        return DialogKey::Hello;
    }

    let Some(quest_id) = npc_quest else {
        return DialogKey::Salutation;
    };
    let committed = quests.status(quest_id).unwrap_or_default();

    match session.active_quest.as_ref() {
        Some(active) if active == quest_id => match committed {
            QuestStatus::None => DialogKey::Hello,
            QuestStatus::Offered => {
                quests.stage(quest_id, QuestStatus::Accepted);
                DialogKey::What
            }
            QuestStatus::Accepted => DialogKey::What,
            QuestStatus::Complete => DialogKey::Bye,
        },
        Some(_) => DialogKey::GoAway,
        None => match committed {
            QuestStatus::Complete => DialogKey::Bye,
            QuestStatus::None => {
                quests.stage(quest_id, QuestStatus::Offered);
                session.active_quest = Some(quest_id.clone());
                DialogKey::Hello
            }
            QuestStatus::Offered | QuestStatus::Accepted => DialogKey::Salutation,
        },
    }
}

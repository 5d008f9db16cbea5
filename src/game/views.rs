//! Read-only snapshots for the screens

use super::{find_case, hotspot_visible, Game};
use crate::data::{PuzzleKind, SessionStatus, SKILLS};
use crate::GameError;

/// `m:ss`
pub fn format_time(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// One case on the hub
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HubEntry {
    pub case_id: String,
    pub title: String,
    pub chapter: u32,
    pub difficulty: u8,
    pub description: String,
    pub status: Option<SessionStatus>,
    pub stars: Option<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HotspotView {
    pub clue_id: String,
    pub icon: String,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub puzzle: PuzzleKind,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CaseView {
    pub case_id: String,
    pub title: String,
    pub intro: String,
    pub scene: String,
    pub suspects: Vec<(String, String)>,
    pub hotspots: Vec<HotspotView>,
    pub status: SessionStatus,
    pub essential_found: usize,
    pub essential_total: usize,
    pub errors: u32,
    pub hints: u32,
    pub coins: u32,
    pub hint_cost: u32,
    pub elapsed: String,
    /// Seconds left on the reveal-all power-up
    pub power_up_left: Option<i64>,
}

/// Found clues. Hidden confession clues are listed apart and left out of
/// the counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryView {
    pub essential: Vec<String>,
    pub bonus: Vec<String>,
    pub essential_found: usize,
    pub essential_total: usize,
}

/// One row of the parents' dashboard
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentRow {
    pub date: String,
    pub title: String,
    pub status: SessionStatus,
    pub time: String,
    pub errors: u32,
    pub hints: u32,
    pub stars: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillCard {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub cost: u32,
    pub unlocked: bool,
    pub affordable: bool,
}

impl Game {
    pub fn hub_entries(&self) -> Vec<HubEntry> {
        self.catalog
            .cases
            .iter()
            .map(|case| {
                let session = self.sessions.session(&case.id);
                HubEntry {
                    case_id: case.id.clone(),
                    title: case.title.clone(),
                    chapter: case.chapter,
                    difficulty: case.difficulty,
                    description: case.description.clone(),
                    status: session.map(|s| s.status),
                    stars: session.and_then(|s| s.result).map(|r| r.stars),
                }
            })
            .collect()
    }

    pub fn case_view(&self, case_id: &str) -> Result<CaseView, GameError> {
        let case = find_case(&self.catalog, case_id)?;
        let session = self.sessions.session(case_id);
        let modifiers = self.modifiers();
        let now = self.clock.now();
        let inventory = self.inventory(case_id)?;

        let hotspots = case
            .clues
            .iter()
            .filter(|c| hotspot_visible(c, session, &modifiers, now))
            .filter_map(|c| {
                c.hotspot.as_ref().map(|h| HotspotView {
                    clue_id: c.id.clone(),
                    icon: h.icon.clone(),
                    x: h.x,
                    y: h.y,
                    w: h.w,
                    h: h.h,
                    puzzle: c.requirement(),
                })
            })
            .collect();

        Ok(CaseView {
            case_id: case.id.clone(),
            title: case.title.clone(),
            intro: case.intro.clone(),
            scene: case.scene.clone(),
            suspects: case.suspects.iter().map(|s| (s.id.clone(), s.name.clone())).collect(),
            hotspots,
            status: session.map_or(SessionStatus::Open, |s| s.status),
            essential_found: inventory.essential_found,
            essential_total: inventory.essential_total,
            errors: session.map_or(0, |s| s.errors),
            hints: session.map_or(0, |s| s.hints),
            coins: self.profile().coins,
            hint_cost: modifiers.hint_cost(),
            elapsed: format_time(session.map_or(0, |s| s.elapsed_seconds(now))),
            power_up_left: session
                .and_then(|s| s.reveal_all_remaining(now))
                .map(|d| d.num_seconds()),
        })
    }

    pub fn inventory(&self, case_id: &str) -> Result<InventoryView, GameError> {
        let case = find_case(&self.catalog, case_id)?;
        let session = self.sessions.session(case_id);
        let found = |id: &str| session.is_some_and(|s| s.has_clue(id));

        let (essential, bonus): (Vec<_>, Vec<_>) = case
            .clues
            .iter()
            .filter(|c| found(&c.id))
            .partition(|c| c.is_essential());

        Ok(InventoryView {
            essential_found: essential.len(),
            essential_total: case.essential_clues().count(),
            essential: essential.into_iter().map(|c| c.text.clone()).collect(),
            bonus: bonus.into_iter().map(|c| c.text.clone()).collect(),
        })
    }

    /// Every session, oldest first
    pub fn parent_rows(&self) -> Vec<ParentRow> {
        let now = self.clock.now();
        let mut sessions: Vec<_> = self.sessions.document().sessions.values().collect();
        sessions.sort_by_key(|s| s.start);
        sessions
            .into_iter()
            .map(|s| ParentRow {
                date: s.start.format("%d/%m/%Y").to_string(),
                title: self
                    .catalog
                    .case(&s.case_id)
                    .map_or_else(|| s.case_id.clone(), |c| c.title.clone()),
                status: s.status,
                time: format_time(s.elapsed_seconds(now)),
                errors: s.errors,
                hints: s.hints,
                stars: s.result.map(|r| r.stars),
            })
            .collect()
    }

    pub fn skill_cards(&self) -> Vec<SkillCard> {
        let profile = self.profile();
        SKILLS
            .iter()
            .map(|skill| SkillCard {
                id: skill.id,
                name: skill.name,
                description: skill.description,
                icon: skill.icon,
                cost: skill.cost,
                unlocked: profile.has_skill(skill.id),
                affordable: profile.can_afford(skill.cost),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_formats_as_minutes_and_seconds() {
        assert_eq!(format_time(0), "0:00");
        assert_eq!(format_time(65), "1:05");
        assert_eq!(format_time(600), "10:00");
    }
}

//! Skill definitions and the modifiers they grant

/// What an unlocked skill changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillEffect {
    /// Hints cost this much less, and stop counting towards the penalty
    HintCostReduction(u32),
    /// Every hotspot is visible, revealed or not
    RevealAllHotspots,
    /// Flat addition to the time bonus
    TimeBonusIncrease(i64),
}

/// A permanent, coin-purchased modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skill {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub cost: u32,
    pub effect: SkillEffect,
    pub icon: &'static str,
}

pub static SKILLS: [Skill; 3] = [
    Skill {
        id: "dica_barata",
        name: "Mente Económica",
        description: "As dicas inteligentes custam apenas 0 moedas.",
        cost: 5,
        effect: SkillEffect::HintCostReduction(1),
        icon: "💡",
    },
    Skill {
        id: "olho_clinico",
        name: "Olho Clínico",
        description: "Pistas \"ocultas\" (reveladas por diálogo) são visíveis desde o início no mapa.",
        cost: 8,
        effect: SkillEffect::RevealAllHotspots,
        icon: "👁",
    },
    Skill {
        id: "detetive_rapido",
        name: "Detetive Rápido",
        description: "Dá um bónus de 50 pontos de tempo ao resolver um caso.",
        cost: 10,
        effect: SkillEffect::TimeBonusIncrease(50),
        icon: "⚡",
    },
];

/// Base price of a hint before skills
pub const BASE_HINT_COST: u32 = 1;

pub fn find_skill(skill_id: &str) -> Option<&'static Skill> {
    SKILLS.iter().find(|s| s.id == skill_id)
}

/// The combined effect of a profile's unlocked skills
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkillModifiers {
    pub hint_cost_reduction: u32,
    pub hints_free_of_penalty: bool,
    pub reveal_all_hotspots: bool,
    pub time_bonus: i64,
}

impl SkillModifiers {
    pub fn from_unlocked<S: AsRef<str>>(unlocked: &[S]) -> Self {
        let mut modifiers = Self::default();
        for skill in unlocked.iter().filter_map(|id| find_skill(id.as_ref())) {
            match skill.effect {
                SkillEffect::HintCostReduction(n) => {
                    modifiers.hint_cost_reduction += n;
                    modifiers.hints_free_of_penalty = true;
                }
                SkillEffect::RevealAllHotspots => modifiers.reveal_all_hotspots = true,
                SkillEffect::TimeBonusIncrease(n) => modifiers.time_bonus += n,
            }
        }
        modifiers
    }

    pub fn hint_cost(&self) -> u32 {
        BASE_HINT_COST.saturating_sub(self.hint_cost_reduction)
    }
}

//! Player profile and progression

use serde::{Deserialize, Serialize};

/// Medals earned on case completion. Each is granted at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Medal {
    NoErrorsNoHints,  // Solve without mistakes or hints
    EagleEye,         // Find every essential clue
    Lightning,        // Solve within five minutes
}

impl Medal {
    pub const ALL: [Medal; 3] = [Medal::NoErrorsNoHints, Medal::EagleEye, Medal::Lightning];

    /// Name stored in the profile's medal list
    pub fn name(&self) -> &'static str {
        match self {
            Medal::NoErrorsNoHints => "Sem Erros/Dicas",
            Medal::EagleEye => "Olho de Águia",
            Medal::Lightning => "Relâmpago",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Medal::NoErrorsNoHints => "Resolver um caso sem erros e sem dicas",
            Medal::EagleEye => "Encontrar todas as pistas essenciais",
            Medal::Lightning => "Resolver um caso em até 5 minutos",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Medal::NoErrorsNoHints => "🎯",
            Medal::EagleEye => "🦅",
            Medal::Lightning => "⚡",
        }
    }
}

/// Accessibility settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub large_font: bool,
    /// Read-aloud toggle; narration itself is not implemented
    pub narration: bool,
}

/// The player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: String,
    pub level: u32,
    pub points: u64,
    pub coins: u32,
    pub medals: Vec<String>,
    pub settings: Settings,
    pub unlocked_skills: Vec<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::new("Bia")
    }
}

impl UserProfile {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            level: 1,
            points: 0,
            coins: 0,
            medals: Vec::new(),
            settings: Settings::default(),
            unlocked_skills: Vec::new(),
        }
    }

    /// Grant a medal; false when it was already held
    pub fn award_medal(&mut self, medal: Medal) -> bool {
        if self.has_medal(medal) {
            false
        } else {
            self.medals.push(medal.name().to_string());
            true
        }
    }

    pub fn has_medal(&self, medal: Medal) -> bool {
        self.medals.iter().any(|m| m == medal.name())
    }

    pub fn has_skill(&self, skill_id: &str) -> bool {
        self.unlocked_skills.iter().any(|s| s == skill_id)
    }

    pub fn can_afford(&self, cost: u32) -> bool {
        self.coins >= cost
    }

    /// Debit coins; refuses to go negative
    pub fn spend_coins(&mut self, cost: u32) -> bool {
        match self.coins.checked_sub(cost) {
            Some(left) => {
                self.coins = left;
                true
            }
            None => false,
        }
    }
}

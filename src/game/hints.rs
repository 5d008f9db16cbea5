//! Hint text generation
//!
//! Hint text comes from a [`HintSource`] that may fail on its own. It is
//! never on the path of scoring or session state: the hint is paid for
//! and counted before any text is requested.

use crate::data::PuzzleKind;
use std::time::Duration;
use tracing::{debug, warn};

/// Shown when every attempt fails
pub const FALLBACK_HINT: &str =
    "Não foi possível obter uma dica agora. Observa bem a cena e tenta mais tarde.";

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum HintError {
    #[error("hint source unavailable: {0}")]
    Unavailable(String),

    #[error("hint source returned nothing")]
    Empty,
}

/// What a hint source knows about the investigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HintContext {
    pub case_title: String,
    pub intro: String,
    pub suspects: Vec<String>,
    pub found: Vec<String>,
    /// Unfound clues currently on screen, with their gate
    pub visible_unfound: Vec<(String, PuzzleKind)>,
    /// Unfound clues still hidden from the scene
    pub concealed: usize,
    pub errors: u32,
    pub hints: u32,
}

pub trait HintSource {
    fn generate_hint(&mut self, context: &HintContext) -> Result<String, HintError>;
}

/// Rule-based hints built from the session alone
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalHints;

impl HintSource for LocalHints {
    fn generate_hint(&mut self, context: &HintContext) -> Result<String, HintError> {
        if let Some((text, kind)) = context.visible_unfound.first() {
            let hint = match kind {
                PuzzleKind::Cipher => {
                    format!("\"{text}\" esconde uma mensagem. Recua cada letra três casas.")
                }
                PuzzleKind::Pattern => {
                    format!("Olha para \"{text}\": quanto cresce a sequência de cada vez?")
                }
                PuzzleKind::Difference => {
                    format!("Compara com calma as duas imagens de \"{text}\".")
                }
                PuzzleKind::None => format!("Ainda não examinaste: {text}."),
            };
            return Ok(hint);
        }
        if context.concealed > 0 {
            return Ok(
                "Alguém sabe mais do que diz. Conversa outra vez com os suspeitos.".to_string()
            );
        }
        Ok(
            "Já tens as pistas todas. Pensa em quem teve motivo e oportunidade, e acusa!"
                .to_string(),
        )
    }
}

/// Wraps a source with bounded retries and exponential backoff, and falls
/// back to [`FALLBACK_HINT`] once attempts run out
pub struct RetryingHints {
    source: Box<dyn HintSource>,
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryingHints {
    pub fn new(source: Box<dyn HintSource>, max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            source,
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Delay before retry number `attempt` (1-based): `base * 2^attempt`
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }

    pub fn hint(&mut self, context: &HintContext) -> String {
        for attempt in 1..=self.max_attempts {
            match self.source.generate_hint(context) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(attempt, "hint generated");
                    return text.trim().to_string();
                }
                Ok(_) => warn!(attempt, error = %HintError::Empty, "hint attempt failed"),
                Err(e) => warn!(attempt, error = %e, "hint attempt failed"),
            }
            if attempt < self.max_attempts {
                let delay = self.delay_for(attempt);
                if !delay.is_zero() {
                    std::thread::sleep(delay);
                }
            }
        }
        warn!(attempts = self.max_attempts, "hint source exhausted, using fallback");
        FALLBACK_HINT.to_string()
    }
}

impl Default for RetryingHints {
    fn default() -> Self {
        Self::new(Box::new(LocalHints), 3, Duration::from_millis(1000))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Fails a fixed number of times, then answers
    struct Flaky {
        failures_left: u32,
        calls: Rc<Cell<u32>>,
    }

    impl HintSource for Flaky {
        fn generate_hint(&mut self, _context: &HintContext) -> Result<String, HintError> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left > 0 {
                self.failures_left -= 1;
                Err(HintError::Unavailable("offline".into()))
            } else {
                Ok("Procura perto do relógio.".into())
            }
        }
    }

    #[test]
    fn retries_until_success() {
        let calls = Rc::new(Cell::new(0));
        let source = Flaky { failures_left: 2, calls: calls.clone() };
        let mut hints = RetryingHints::new(Box::new(source), 3, Duration::ZERO);

        assert_eq!(hints.hint(&HintContext::default()), "Procura perto do relógio.");
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn exhausted_attempts_fall_back() {
        let calls = Rc::new(Cell::new(0));
        let source = Flaky { failures_left: 10, calls: calls.clone() };
        let mut hints = RetryingHints::new(Box::new(source), 3, Duration::ZERO);

        assert_eq!(hints.hint(&HintContext::default()), FALLBACK_HINT);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn backoff_doubles() {
        let hints = RetryingHints::new(Box::new(LocalHints), 3, Duration::from_millis(1000));
        assert_eq!(hints.delay_for(1), Duration::from_millis(2000));
        assert_eq!(hints.delay_for(2), Duration::from_millis(4000));
    }

    #[test]
    fn local_hints_point_at_the_next_step() {
        let mut local = LocalHints;
        let context = HintContext {
            visible_unfound: vec![("Bilhete".into(), PuzzleKind::Cipher)],
            ..HintContext::default()
        };
        assert!(local.generate_hint(&context).unwrap().contains("Bilhete"));

        let context = HintContext { concealed: 1, ..HintContext::default() };
        assert!(local.generate_hint(&context).unwrap().contains("suspeitos"));

        let done = local.generate_hint(&HintContext::default()).unwrap();
        assert!(done.contains("acusa"));
    }
}

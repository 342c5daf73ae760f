pub use crate::config::*;
use crate::history::{parse_history, ExclusionTable};
use crate::{start_draw, DrawStage};

use rand::Rng;

/// A builder for preparing a draw.
///
/// ```
/// pub use kart_draw::builder::Builder;
/// pub use kart_draw::DrawRules;
/// # use kart_draw::DrawErrors;
///
/// let builder = Builder::new(&DrawRules::DEFAULT_RULES)?
///     .drivers(&["Anna".to_string(), "Bob".to_string()])?
///     .karts(&["1".to_string(), "2".to_string(), "3".to_string()])?
///     .history("Anna: 1\nBob: 2")?;
///
/// let outcome = builder.draw()?;
/// assert!(outcome.perfect);
///
/// # Ok::<(), DrawErrors>(())
/// ```
pub struct Builder {
    pub(crate) _rules: DrawRules,
    pub(crate) _drivers: Vec<Driver>,
    pub(crate) _karts: Vec<Kart>,
    pub(crate) _exclusions: ExclusionTable,
}

impl Builder {
    pub fn new(rules: &DrawRules) -> Result<Builder, DrawErrors> {
        Ok(Builder {
            _rules: rules.clone(),
            _drivers: Vec::new(),
            _karts: Vec::new(),
            _exclusions: ExclusionTable::new(),
        })
    }

    /// Sets the drivers. Names that only differ by case or surrounding spaces are
    /// counted once.
    pub fn drivers(self, names: &[String]) -> Result<Builder, DrawErrors> {
        let mut drivers: Vec<Driver> = Vec::new();
        for name in names {
            let d = Driver::new(name);
            if !d.key.is_empty() && !drivers.iter().any(|x| x.key == d.key) {
                drivers.push(d);
            }
        }
        Ok(Builder {
            _drivers: drivers,
            ..self
        })
    }

    /// Sets the drivers from a roster typed by hand (separated by commas or newlines).
    pub fn drivers_text(self, raw: &str) -> Result<Builder, DrawErrors> {
        Ok(Builder {
            _drivers: parse_drivers(raw),
            ..self
        })
    }

    pub fn karts(self, labels: &[String]) -> Result<Builder, DrawErrors> {
        Ok(Builder {
            _karts: labels
                .iter()
                .map(|l| Kart::new(l))
                .filter(|k| !k.key.is_empty())
                .collect(),
            ..self
        })
    }

    /// Sets the karts from a comma-separated list.
    pub fn karts_text(self, raw: &str) -> Result<Builder, DrawErrors> {
        Ok(Builder {
            _karts: parse_karts(raw),
            ..self
        })
    }

    /// Sets the history from its text form, replacing any previous history.
    pub fn history(self, raw: &str) -> Result<Builder, DrawErrors> {
        Ok(Builder {
            _exclusions: parse_history(raw),
            ..self
        })
    }

    /// Adds one driver to the history, as a history line would.
    pub fn exclude(&mut self, driver: &str, karts: &[String]) -> Result<(), DrawErrors> {
        self._exclusions
            .set(driver, karts.iter().map(|s| s.as_str()));
        Ok(())
    }

    pub fn drivers_list(&self) -> &[Driver] {
        &self._drivers
    }

    pub fn karts_list(&self) -> &[Kart] {
        &self._karts
    }

    pub fn exclusions(&self) -> &ExclusionTable {
        &self._exclusions
    }

    /// Starts the draw, leaving the confirmation step to the caller.
    pub fn start<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<DrawStage, DrawErrors> {
        start_draw(
            &self._drivers,
            &self._karts,
            &self._exclusions,
            &self._rules,
            rng,
        )
    }

    /// Runs the whole draw with the random source of the rules, accepting repeats if needed.
    pub fn draw(&self) -> Result<DrawOutcome, DrawErrors> {
        let mut rng = self._rules.rng();
        match self.start(&mut rng)? {
            DrawStage::Done(outcome) => Ok(outcome),
            DrawStage::NeedsConfirmation(pending) => Ok(pending.confirm(&mut rng)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builder_deduplicates_drivers() {
        let b = Builder::new(&DrawRules::DEFAULT_RULES)
            .unwrap()
            .drivers(&strings(&["Ana", " ana", "Bob", ""]))
            .unwrap();
        let names: Vec<&str> = b.drivers_list().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bob"]);
    }

    #[test]
    fn builder_exclusions() {
        let mut b = Builder::new(&DrawRules::DEFAULT_RULES)
            .unwrap()
            .drivers_text("Ana\nBob")
            .unwrap()
            .karts_text("1,2")
            .unwrap();
        b.exclude("Ana", &strings(&["1"])).unwrap();
        b.exclude("Bob", &strings(&["2"])).unwrap();
        let outcome = b.draw().unwrap();
        assert!(outcome.perfect);
        assert_eq!(
            outcome.assignment.kart_for("ana").map(|k| k.label.as_str()),
            Some("2")
        );
    }

    #[test]
    fn seeded_builder_is_reproducible() {
        let rules = DrawRules {
            fallback_mode: FallbackMode::Greedy,
            seed: Some(11),
        };
        let b = Builder::new(&rules)
            .unwrap()
            .drivers_text("A, B, C, D")
            .unwrap()
            .karts_text("1, 2, 3, 4, 5")
            .unwrap();
        assert_eq!(b.draw().unwrap(), b.draw().unwrap());
    }

    #[test]
    fn builder_reports_count_mismatch() {
        let b = Builder::new(&DrawRules::DEFAULT_RULES)
            .unwrap()
            .drivers_text("A, B, C")
            .unwrap()
            .karts_text("1, 2")
            .unwrap();
        assert_eq!(
            b.draw(),
            Err(DrawErrors::CountMismatch {
                drivers: 3,
                karts: 2
            })
        );
    }
}

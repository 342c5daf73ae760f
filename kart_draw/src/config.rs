// ********* Input data structures ***********

use std::error::Error;
use std::fmt::Display;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::history::ExclusionTable;

/// The identity of a driver or a kart.
///
/// Names and kart labels are typed by hand, so `" Ana"`, `"ana"` and `"ANA "` all
/// refer to the same driver. Every comparison in this crate goes through this key.
#[derive(Eq, PartialEq, Debug, Clone, Hash, Ord, PartialOrd, Default)]
pub struct NormalizedKey(String);

impl NormalizedKey {
    pub fn new(raw: &str) -> NormalizedKey {
        NormalizedKey(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for NormalizedKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Driver {
    /// The name as it was typed (trimmed), used for display.
    pub name: String,
    pub key: NormalizedKey,
}

impl Driver {
    pub fn new(name: &str) -> Driver {
        Driver {
            name: name.trim().to_string(),
            key: NormalizedKey::new(name),
        }
    }
}

/// A seat in the draw.
///
/// Two karts with the same label are still two seats: the draw tracks karts by
/// their position in the input list.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Kart {
    pub label: String,
    pub key: NormalizedKey,
}

impl Kart {
    pub fn new(label: &str) -> Kart {
        Kart {
            label: label.trim().to_string(),
            key: NormalizedKey::new(label),
        }
    }
}

/// Splits a free-form roster into drivers.
///
/// Names are separated by newlines or commas. Blank entries are dropped, and a
/// name that appears twice (after normalization) is only kept the first time.
pub fn parse_drivers(raw: &str) -> Vec<Driver> {
    let mut res: Vec<Driver> = Vec::new();
    for token in raw.split(|c: char| c == '\n' || c == ',') {
        let driver = Driver::new(token);
        if driver.key.is_empty() || res.iter().any(|d| d.key == driver.key) {
            continue;
        }
        res.push(driver);
    }
    res
}

/// Splits a list of kart labels. Duplicates are kept as distinct seats.
pub fn parse_karts(raw: &str) -> Vec<Kart> {
    raw.split(|c: char| c == '\n' || c == ',')
        .map(Kart::new)
        .filter(|k| !k.key.is_empty())
        .collect()
}

// ******** Output data structures *********

/// One line of an assignment.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Seat {
    pub driver: Driver,
    pub kart: Kart,
    /// Position of the kart in the input kart list.
    pub kart_index: usize,
    /// True if the driver already used this kart according to the history.
    pub repeat: bool,
}

/// The karts given to the drivers, in the order of the input drivers.
///
/// Every driver appears exactly once and every kart index at most once.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Assignment {
    seats: Vec<Seat>,
}

impl Assignment {
    /// Assembles an assignment from the kart index chosen for each driver.
    pub(crate) fn from_kart_indexes(
        drivers: &[Driver],
        karts: &[Kart],
        kart_of_driver: &[usize],
        exclusions: &ExclusionTable,
    ) -> Assignment {
        debug_assert_eq!(drivers.len(), kart_of_driver.len());
        let seats = drivers
            .iter()
            .zip(kart_of_driver.iter())
            .map(|(driver, &kart_index)| {
                let kart = karts[kart_index].clone();
                Seat {
                    repeat: exclusions.excludes(&driver.key, &kart.key),
                    driver: driver.clone(),
                    kart,
                    kart_index,
                }
            })
            .collect();
        Assignment { seats }
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// The kart given to a driver, looked up by name (case and surrounding spaces ignored).
    pub fn kart_for(&self, driver_name: &str) -> Option<&Kart> {
        let key = NormalizedKey::new(driver_name);
        self.seats
            .iter()
            .find(|s| s.driver.key == key)
            .map(|s| &s.kart)
    }

    /// Display names of the drivers who received a kart they already used.
    pub fn repeated(&self) -> Vec<String> {
        self.seats
            .iter()
            .filter(|s| s.repeat)
            .map(|s| s.driver.name.clone())
            .collect()
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DrawOutcome {
    pub assignment: Assignment,
    /// True if every driver avoided all the karts of their history.
    pub perfect: bool,
    /// The drivers that have already used at least as many karts as there are
    /// karts in this draw. They cannot avoid a repeat, whatever the assignment.
    pub cannot_avoid: Vec<String>,
    /// The drivers that ended up with a repeated kart.
    pub repeated: Vec<String>,
}

/// Conditions that stop a draw before any kart is assigned.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum DrawErrors {
    NoDrivers,
    NoKarts,
    /// There are more drivers than karts.
    CountMismatch {
        drivers: usize,
        karts: usize,
    },
}

impl Error for DrawErrors {}

impl Display for DrawErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DrawErrors::NoDrivers => write!(f, "at least one driver is required for a draw"),
            DrawErrors::NoKarts => write!(f, "at least one kart is required for a draw"),
            DrawErrors::CountMismatch { drivers, karts } => write!(
                f,
                "there are more drivers ({}) than karts available ({})",
                drivers, karts
            ),
        }
    }
}

// ********* Configuration **********

/// What to do when no assignment avoids every repeat and the draw was confirmed anyway.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum FallbackMode {
    /// Shuffles the karts once, then each driver (in input order) takes the first
    /// kart they have not used yet, or the first remaining kart if there is none.
    ///
    /// This depends on the order of the drivers: a later driver may get a repeat that
    /// another order would have avoided.
    Greedy,
    /// Computes a maximum matching on the karts that every driver has not used yet,
    /// then completes it with the remaining karts. This gives the smallest possible
    /// number of repeats.
    Maximum,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct DrawRules {
    pub fallback_mode: FallbackMode,
    /// Seed for the random source. When missing, the draw is seeded from the
    /// operating system.
    pub seed: Option<u64>,
}

impl DrawRules {
    pub const DEFAULT_RULES: DrawRules = DrawRules {
        fallback_mode: FallbackMode::Greedy,
        seed: None,
    };

    /// The random source for a draw under these rules.
    pub fn rng(&self) -> ChaCha8Rng {
        match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        }
    }
}

/// Turns a human-readable seed (for example the name of the event) into a numeric seed.
///
/// The text is hashed so that close seeds like `round-1` and `round-2` lead to
/// unrelated draws.
pub fn seed_from_text(text: &str) -> u64 {
    let hex = sha256::digest(text);
    u64::from_str_radix(&hex[..16], 16).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_key_ignores_case_and_spaces() {
        assert_eq!(NormalizedKey::new("  Ana "), NormalizedKey::new("ANA"));
        assert_eq!(NormalizedKey::new(" Kart 7 ").as_str(), "kart 7");
        assert!(NormalizedKey::new("   ").is_empty());
    }

    #[test]
    fn drivers_are_split_on_newlines_and_commas() {
        let drivers = parse_drivers("Ana, Bob\n\nCleo ,\n  Dan");
        let names: Vec<&str> = drivers.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Bob", "Cleo", "Dan"]);
    }

    #[test]
    fn duplicate_drivers_keep_the_first_spelling() {
        let drivers = parse_drivers("Ana\nbob\nANA\nBob ");
        let names: Vec<&str> = drivers.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "bob"]);
    }

    #[test]
    fn duplicate_karts_are_distinct_seats() {
        let karts = parse_karts("1, 2,,2 , 3");
        let labels: Vec<&str> = karts.iter().map(|k| k.label.as_str()).collect();
        assert_eq!(labels, vec!["1", "2", "2", "3"]);
    }

    #[test]
    fn count_mismatch_message() {
        let e = DrawErrors::CountMismatch {
            drivers: 3,
            karts: 2,
        };
        assert_eq!(
            e.to_string(),
            "there are more drivers (3) than karts available (2)"
        );
    }

    #[test]
    fn text_seeds_are_stable() {
        assert_eq!(seed_from_text("round-3"), seed_from_text("round-3"));
        assert_ne!(seed_from_text("round-3"), seed_from_text("round-4"));
    }

    #[test]
    fn seeded_rules_give_the_same_random_source() {
        use rand::Rng;
        let rules = DrawRules {
            fallback_mode: FallbackMode::Greedy,
            seed: Some(7),
        };
        let a: u64 = rules.rng().gen();
        let b: u64 = rules.rng().gen();
        assert_eq!(a, b);
    }
}

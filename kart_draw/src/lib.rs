mod config;
pub mod builder;
pub mod history;
pub mod manual;
pub mod matching;
pub mod reel;

use log::{debug, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;

pub use crate::config::*;
pub use crate::history::{append_assignment, parse_history, ExclusionTable};
pub use crate::matching::{find_perfect_matching, maximum_matching};

/// Where a draw stands after the first matching attempt.
#[derive(Debug)]
pub enum DrawStage {
    /// Every driver got a kart outside of their history.
    Done(DrawOutcome),
    /// No assignment avoids all the repeats. The draw continues only if the caller
    /// confirms it.
    NeedsConfirmation(PendingDraw),
}

/// A draw waiting for the caller to accept repeated karts.
#[derive(Debug)]
pub struct PendingDraw {
    drivers: Vec<Driver>,
    karts: Vec<Kart>,
    exclusions: ExclusionTable,
    rules: DrawRules,
    cannot_avoid: Vec<String>,
}

impl PendingDraw {
    /// The drivers who have used as many karts as there are in the draw.
    pub fn cannot_avoid(&self) -> &[String] {
        &self.cannot_avoid
    }

    /// The question to ask before falling back to repeated karts.
    pub fn message(&self) -> String {
        if self.cannot_avoid.is_empty() {
            "No assignment without repeated karts could be found. Continue?".to_string()
        } else {
            format!(
                "There are not enough different karts to avoid repeats for: {}. Continue and allow repeats?",
                self.cannot_avoid.join(", ")
            )
        }
    }

    /// Accepts repeats and completes the draw with the fallback of the rules.
    pub fn confirm<R: Rng + ?Sized>(self, rng: &mut R) -> DrawOutcome {
        info!(
            "confirm: fallback {:?} for {} drivers",
            self.rules.fallback_mode,
            self.drivers.len()
        );
        let kart_of_driver = match self.rules.fallback_mode {
            FallbackMode::Greedy => {
                greedy_assignment(&self.drivers, &self.karts, &self.exclusions, rng)
            }
            FallbackMode::Maximum => {
                maximum_assignment(&self.drivers, &self.karts, &self.exclusions, rng)
            }
        };
        let assignment = Assignment::from_kart_indexes(
            &self.drivers,
            &self.karts,
            &kart_of_driver,
            &self.exclusions,
        );
        let repeated = assignment.repeated();
        for name in repeated.iter() {
            warn!("confirm: {} gets a kart already used", name);
        }
        DrawOutcome {
            assignment,
            perfect: false,
            cannot_avoid: self.cannot_avoid,
            repeated,
        }
    }

    /// Gives up on this draw. No kart is assigned.
    pub fn abort(self) {
        info!("abort: draw of {} drivers cancelled", self.drivers.len());
    }
}

/// Checks that a draw can take place with these drivers and karts.
pub fn validate_counts(drivers: &[Driver], karts: &[Kart]) -> Result<(), DrawErrors> {
    if drivers.is_empty() {
        return Err(DrawErrors::NoDrivers);
    }
    if karts.is_empty() {
        return Err(DrawErrors::NoKarts);
    }
    if drivers.len() > karts.len() {
        return Err(DrawErrors::CountMismatch {
            drivers: drivers.len(),
            karts: karts.len(),
        });
    }
    Ok(())
}

/// The drivers whose history holds at least as many karts as the draw has.
///
/// They will get a repeat whatever the assignment. The names are the first spelling
/// found in the history.
pub fn cannot_avoid(
    drivers: &[Driver],
    karts: &[Kart],
    exclusions: &ExclusionTable,
) -> Vec<String> {
    drivers
        .iter()
        .filter(|d| exclusions.get(&d.key).is_some())
        .filter(|d| exclusions.exclusion_count(&d.key) >= karts.len())
        .map(|d| {
            exclusions
                .display_name(&d.key)
                .unwrap_or(d.name.as_str())
                .to_string()
        })
        .collect()
}

/// Starts a draw: validates the input and looks for an assignment without repeats.
///
/// Arguments:
/// * `drivers` the drivers, in the order used by the fallback
/// * `karts` the karts available for this draw
/// * `exclusions` the history of every driver
/// * `rules` the rules applied if the draw falls back to repeats
pub fn start_draw<R: Rng + ?Sized>(
    drivers: &[Driver],
    karts: &[Kart],
    exclusions: &ExclusionTable,
    rules: &DrawRules,
    rng: &mut R,
) -> Result<DrawStage, DrawErrors> {
    info!(
        "start_draw: {} drivers, {} karts, {} drivers with history, rules: {:?}",
        drivers.len(),
        karts.len(),
        exclusions.len(),
        rules
    );
    validate_counts(drivers, karts)?;

    if let Some(assignment) = find_perfect_matching(drivers, karts, exclusions, rng) {
        info!("start_draw: found an assignment without repeats");
        return Ok(DrawStage::Done(DrawOutcome {
            assignment,
            perfect: true,
            cannot_avoid: Vec::new(),
            repeated: Vec::new(),
        }));
    }

    let cannot_avoid = cannot_avoid(drivers, karts, exclusions);
    warn!(
        "start_draw: no assignment without repeats, drivers that cannot avoid one: {:?}",
        cannot_avoid
    );
    Ok(DrawStage::NeedsConfirmation(PendingDraw {
        drivers: drivers.to_vec(),
        karts: karts.to_vec(),
        exclusions: exclusions.clone(),
        rules: rules.clone(),
        cannot_avoid,
    }))
}

/// Runs a complete draw with the default rules, accepting repeats if there is no other way.
///
/// `history` is the raw history text, see [history] for the format.
pub fn assign<R: Rng + ?Sized>(
    drivers: &[Driver],
    karts: &[Kart],
    history: &str,
    rng: &mut R,
) -> Result<DrawOutcome, DrawErrors> {
    let exclusions = parse_history(history);
    match start_draw(drivers, karts, &exclusions, &DrawRules::DEFAULT_RULES, rng)? {
        DrawStage::Done(outcome) => Ok(outcome),
        DrawStage::NeedsConfirmation(pending) => Ok(pending.confirm(rng)),
    }
}

// Takes the first kart of the pool that the driver has not used, or the first kart
// of the pool if they used them all.
fn take_seat(
    driver: &Driver,
    pool: &mut Vec<usize>,
    karts: &[Kart],
    exclusions: &ExclusionTable,
) -> usize {
    let pos = pool
        .iter()
        .position(|&j| !exclusions.excludes(&driver.key, &karts[j].key))
        .unwrap_or(0);
    pool.remove(pos)
}

// Returns the kart index of each driver.
// The pool is shuffled once, and the drivers pick in input order.
fn greedy_assignment<R: Rng + ?Sized>(
    drivers: &[Driver],
    karts: &[Kart],
    exclusions: &ExclusionTable,
    rng: &mut R,
) -> Vec<usize> {
    let mut pool: Vec<usize> = (0..karts.len()).collect();
    pool.shuffle(rng);
    debug!("greedy_assignment: pool: {:?}", pool);
    drivers
        .iter()
        .map(|driver| take_seat(driver, &mut pool, karts, exclusions))
        .collect()
}

fn maximum_assignment<R: Rng + ?Sized>(
    drivers: &[Driver],
    karts: &[Kart],
    exclusions: &ExclusionTable,
    rng: &mut R,
) -> Vec<usize> {
    let matched = maximum_matching(drivers, karts, exclusions, rng);
    let mut pool: Vec<usize> = (0..karts.len())
        .filter(|j| !matched.contains(&Some(*j)))
        .collect();
    pool.shuffle(rng);
    debug!(
        "maximum_assignment: matched: {:?} remaining pool: {:?}",
        matched, pool
    );
    drivers
        .iter()
        .zip(matched.iter())
        .map(|(driver, m)| match m {
            Some(j) => *j,
            None => take_seat(driver, &mut pool, karts, exclusions),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::collections::HashSet;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn rng() -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(42)
    }

    fn label<'a>(outcome: &'a DrawOutcome, name: &str) -> &'a str {
        outcome
            .assignment
            .kart_for(name)
            .map(|k| k.label.as_str())
            .unwrap_or("")
    }

    fn assert_complete(outcome: &DrawOutcome, drivers: &[Driver], karts: &[Kart]) {
        assert_eq!(outcome.assignment.len(), drivers.len());
        let used: HashSet<usize> = outcome
            .assignment
            .seats()
            .iter()
            .map(|s| s.kart_index)
            .collect();
        assert_eq!(used.len(), drivers.len());
        assert!(used.iter().all(|&j| j < karts.len()));
    }

    #[test]
    fn perfect_draw() {
        init();
        let drivers = parse_drivers("Ana, Bob");
        let karts = parse_karts("1, 2");
        let outcome = assign(&drivers, &karts, "Ana: 1\nBob: 2", &mut rng()).unwrap();
        assert!(outcome.perfect);
        assert!(outcome.cannot_avoid.is_empty());
        assert!(outcome.repeated.is_empty());
        assert_eq!(label(&outcome, "Ana"), "2");
        assert_eq!(label(&outcome, "Bob"), "1");
    }

    #[test]
    fn more_drivers_than_karts() {
        init();
        let drivers = parse_drivers("Ana, Bob");
        let karts = parse_karts("1");
        assert_eq!(
            assign(&drivers, &karts, "", &mut rng()),
            Err(DrawErrors::CountMismatch {
                drivers: 2,
                karts: 1
            })
        );
    }

    #[test]
    fn empty_inputs() {
        let drivers = parse_drivers("Ana");
        assert_eq!(
            assign(&[], &parse_karts("1"), "", &mut rng()),
            Err(DrawErrors::NoDrivers)
        );
        assert_eq!(
            assign(&drivers, &[], "", &mut rng()),
            Err(DrawErrors::NoKarts)
        );
    }

    #[test]
    fn needs_confirmation_lists_blocked_drivers() {
        init();
        let drivers = parse_drivers("ana, Bob, Cleo");
        let karts = parse_karts("1, 2, 3");
        let history = parse_history("Ana: 1,2,3");
        let stage = start_draw(
            &drivers,
            &karts,
            &history,
            &DrawRules::DEFAULT_RULES,
            &mut rng(),
        )
        .unwrap();
        match stage {
            DrawStage::NeedsConfirmation(pending) => {
                // The spelling comes from the history.
                assert_eq!(pending.cannot_avoid(), &["Ana".to_string()]);
                assert!(pending.message().contains("Ana"));
            }
            DrawStage::Done(_) => panic!("no perfect assignment exists"),
        }
    }

    #[test]
    fn generic_message_when_nobody_is_blocked() {
        let drivers = parse_drivers("Ana, Bob, Cleo");
        let karts = parse_karts("1, 2, 3");
        let history = parse_history("Ana: 2, 3\nBob: 2, 3");
        let stage = start_draw(
            &drivers,
            &karts,
            &history,
            &DrawRules::DEFAULT_RULES,
            &mut rng(),
        )
        .unwrap();
        match stage {
            DrawStage::NeedsConfirmation(pending) => {
                assert!(pending.cannot_avoid().is_empty());
                assert_eq!(
                    pending.message(),
                    "No assignment without repeated karts could be found. Continue?"
                );
                pending.abort();
            }
            DrawStage::Done(_) => panic!("no perfect assignment exists"),
        }
    }

    #[test]
    fn confirmed_fallback_gives_a_repeat_only_to_the_blocked_driver() {
        init();
        let drivers = parse_drivers("Ana, Bob, Cleo");
        let karts = parse_karts("1, 2, 3");
        for seed in 0..20 {
            let mut r = ChaCha8Rng::seed_from_u64(seed);
            let outcome = assign(&drivers, &karts, "Ana: 1,2,3", &mut r).unwrap();
            assert!(!outcome.perfect);
            assert_eq!(outcome.cannot_avoid, vec!["Ana".to_string()]);
            assert_eq!(outcome.repeated, vec!["Ana".to_string()]);
            assert_complete(&outcome, &drivers, &karts);
        }
    }

    #[test]
    fn greedy_picks_in_driver_order() {
        let drivers = parse_drivers("Ana, Bob");
        let karts = parse_karts("1, 2, 3");
        // Both drivers only accept kart 3: Ana gets it, Bob gets a repeat.
        let history = parse_history("Ana: 1, 2\nBob: 1, 2");
        for seed in 0..20 {
            let mut r = ChaCha8Rng::seed_from_u64(seed);
            let seats = greedy_assignment(&drivers, &karts, &history, &mut r);
            assert_eq!(seats[0], 2);
            assert_ne!(seats[1], 2);
        }
    }

    #[test]
    fn greedy_can_miss_an_avoidable_repeat() {
        // Bob only accepts kart 1, Ana accepts 1 and 2. Whenever kart 1 comes before
        // kart 2 in the shuffled pool, Ana takes it and Bob gets a repeat, although
        // Ana: 2, Bob: 1 and Cleo: 3 (a repeat for Cleo only) was possible.
        let drivers = parse_drivers("Ana, Bob, Cleo");
        let karts = parse_karts("1, 2, 3");
        let history = parse_history("Ana: 3\nBob: 2, 3\nCleo: 1, 2, 3");
        let mut greedy_repeats: HashSet<usize> = HashSet::new();
        for seed in 0..50 {
            let mut r = ChaCha8Rng::seed_from_u64(seed);
            let seats = greedy_assignment(&drivers, &karts, &history, &mut r);
            let a = Assignment::from_kart_indexes(&drivers, &karts, &seats, &history);
            greedy_repeats.insert(a.repeated().len());
        }
        assert!(greedy_repeats.contains(&2));
    }

    #[test]
    fn maximum_fallback_minimizes_repeats() {
        let drivers = parse_drivers("Ana, Bob, Cleo");
        let karts = parse_karts("1, 2, 3");
        let history = parse_history("Ana: 3\nBob: 2, 3\nCleo: 1, 2, 3");
        let rules = DrawRules {
            fallback_mode: FallbackMode::Maximum,
            seed: None,
        };
        for seed in 0..50 {
            let mut r = ChaCha8Rng::seed_from_u64(seed);
            let stage = start_draw(&drivers, &karts, &history, &rules, &mut r).unwrap();
            let outcome = match stage {
                DrawStage::NeedsConfirmation(pending) => pending.confirm(&mut r),
                DrawStage::Done(_) => panic!("no perfect assignment exists"),
            };
            assert_complete(&outcome, &drivers, &karts);
            assert_eq!(outcome.repeated, vec!["Cleo".to_string()]);
            assert_eq!(label(&outcome, "Bob"), "1");
            assert_eq!(label(&outcome, "Ana"), "2");
        }
    }

    #[test]
    fn fallback_always_completes() {
        init();
        let mut r = rng();
        let histories = [
            "",
            "A: 1,2,3,4",
            "A: 1\nB: 1\nC: 1\nD: 1",
            "A: 1,2\nB: 1,2\nC: 1,2",
            "A: 9, 10\nB, 1, 2, 3, 4",
        ];
        for history in histories.iter() {
            for drivers_s in ["A", "A, B", "A, B, C", "A, B, C, D"].iter() {
                let drivers = parse_drivers(drivers_s);
                let karts = parse_karts("1, 2, 3, 4");
                let exclusions = parse_history(history);
                for mode in [FallbackMode::Greedy, FallbackMode::Maximum] {
                    let rules = DrawRules {
                        fallback_mode: mode,
                        seed: None,
                    };
                    let outcome = match start_draw(&drivers, &karts, &exclusions, &rules, &mut r)
                        .unwrap()
                    {
                        DrawStage::Done(o) => o,
                        DrawStage::NeedsConfirmation(p) => p.confirm(&mut r),
                    };
                    assert_complete(&outcome, &drivers, &karts);
                    if outcome.perfect {
                        assert!(outcome.repeated.is_empty());
                    }
                }
            }
        }
    }

    #[test]
    fn seeded_draws_are_reproducible() {
        let drivers = parse_drivers("A, B, C, D, E, F");
        let karts = parse_karts("1, 2, 3, 4, 5, 6, 7");
        let rules = DrawRules {
            fallback_mode: FallbackMode::Greedy,
            seed: Some(seed_from_text("round-3")),
        };
        let a = assign(&drivers, &karts, "A: 1", &mut rules.rng()).unwrap();
        let b = assign(&drivers, &karts, "A: 1", &mut rules.rng()).unwrap();
        assert_eq!(a, b);
    }
}

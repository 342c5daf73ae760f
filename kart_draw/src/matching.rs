use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::{Assignment, Driver, Kart};
use crate::history::ExclusionTable;

// Drivers on one side, karts on the other. There is an edge between a driver and a
// kart if the driver has not used this kart yet.
// All the orders are shuffled so that no driver or kart is favored when several
// matchings are possible.
struct EligibilityGraph {
    // For each driver, the indexes of the karts it may receive.
    adjacency: Vec<Vec<usize>>,
    // The order in which the drivers look for a kart.
    driver_order: Vec<usize>,
    num_karts: usize,
}

impl EligibilityGraph {
    fn build<R: Rng + ?Sized>(
        drivers: &[Driver],
        karts: &[Kart],
        exclusions: &ExclusionTable,
        rng: &mut R,
    ) -> EligibilityGraph {
        let mut kart_order: Vec<usize> = (0..karts.len()).collect();
        kart_order.shuffle(rng);
        let mut driver_order: Vec<usize> = (0..drivers.len()).collect();
        driver_order.shuffle(rng);

        let adjacency: Vec<Vec<usize>> = drivers
            .iter()
            .map(|driver| {
                let mut eligible: Vec<usize> = kart_order
                    .iter()
                    .cloned()
                    .filter(|&j| !exclusions.excludes(&driver.key, &karts[j].key))
                    .collect();
                eligible.shuffle(rng);
                eligible
            })
            .collect();
        debug!(
            "EligibilityGraph: driver_order: {:?} adjacency: {:?}",
            driver_order, adjacency
        );
        EligibilityGraph {
            adjacency,
            driver_order,
            num_karts: karts.len(),
        }
    }

    fn isolated_driver(&self) -> Option<usize> {
        self.adjacency.iter().position(|adj| adj.is_empty())
    }

    // Kuhn's augmenting path search from one driver. Every kart is visited at most
    // once per attempt.
    fn augment(
        &self,
        driver: usize,
        seen: &mut [bool],
        driver_of_kart: &mut [Option<usize>],
    ) -> bool {
        for &kart in self.adjacency[driver].iter() {
            if seen[kart] {
                continue;
            }
            seen[kart] = true;
            let free = match driver_of_kart[kart] {
                None => true,
                Some(other) => self.augment(other, seen, driver_of_kart),
            };
            if free {
                driver_of_kart[kart] = Some(driver);
                return true;
            }
        }
        false
    }

    // Runs the search for all the drivers. Stops at the first driver without a kart
    // if `stop_on_failure` is set.
    // Returns the driver matched to each kart, and whether every driver got a kart.
    fn run(&self, stop_on_failure: bool) -> (Vec<Option<usize>>, bool) {
        let mut driver_of_kart: Vec<Option<usize>> = vec![None; self.num_karts];
        let mut complete = true;
        for &driver in self.driver_order.iter() {
            let mut seen = vec![false; self.num_karts];
            if !self.augment(driver, &mut seen, &mut driver_of_kart) {
                debug!("EligibilityGraph: no augmenting path for driver {}", driver);
                complete = false;
                if stop_on_failure {
                    break;
                }
            }
        }
        (driver_of_kart, complete)
    }
}

/// Finds an assignment in which no driver receives a kart from their history.
///
/// Returns `None` if there is no such assignment. The result is random among all the
/// valid assignments: running it twice on the same input may give different answers.
///
/// The caller must make sure that there are at least as many karts as drivers. The
/// result should not be relied upon otherwise.
pub fn find_perfect_matching<R: Rng + ?Sized>(
    drivers: &[Driver],
    karts: &[Kart],
    exclusions: &ExclusionTable,
    rng: &mut R,
) -> Option<Assignment> {
    let graph = EligibilityGraph::build(drivers, karts, exclusions, rng);

    if let Some(driver) = graph.isolated_driver() {
        debug!(
            "find_perfect_matching: driver {:?} has no eligible kart",
            drivers[driver].name
        );
        return None;
    }

    let (driver_of_kart, complete) = graph.run(true);
    if !complete {
        return None;
    }

    let mut kart_of_driver: Vec<usize> = vec![0; drivers.len()];
    for (kart, driver) in driver_of_kart.iter().enumerate() {
        if let Some(driver) = driver {
            kart_of_driver[*driver] = kart;
        }
    }
    Some(Assignment::from_kart_indexes(
        drivers,
        karts,
        &kart_of_driver,
        exclusions,
    ))
}

/// Matches as many drivers as possible with a kart they have not used yet.
///
/// Returns, for each driver, the index of its kart if it could get one.
pub fn maximum_matching<R: Rng + ?Sized>(
    drivers: &[Driver],
    karts: &[Kart],
    exclusions: &ExclusionTable,
    rng: &mut R,
) -> Vec<Option<usize>> {
    let graph = EligibilityGraph::build(drivers, karts, exclusions, rng);
    let (driver_of_kart, _) = graph.run(false);

    let mut kart_of_driver: Vec<Option<usize>> = vec![None; drivers.len()];
    for (kart, driver) in driver_of_kart.iter().enumerate() {
        if let Some(driver) = driver {
            kart_of_driver[*driver] = Some(kart);
        }
    }
    kart_of_driver
}

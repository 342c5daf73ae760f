//! The sequence of labels shown by the slot-machine reveal of a kart.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::Kart;

/// Number of entries in a reel, the assigned kart included.
pub const REEL_LENGTH: usize = 50;

/// Builds the reel that ends on the assigned kart.
///
/// The first entry is empty (the reel starts blank), then come random labels from
/// the karts of the draw, and the assigned label is the last entry.
pub fn reel<R: Rng + ?Sized>(karts: &[Kart], assigned: &Kart, rng: &mut R) -> Vec<String> {
    let mut res: Vec<String> = Vec::with_capacity(REEL_LENGTH);
    res.push(String::new());
    for _ in 0..REEL_LENGTH - 2 {
        if let Some(k) = karts.choose(rng) {
            res.push(k.label.clone());
        }
    }
    res.push(assigned.label.clone());
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_karts;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn reel_ends_on_the_assigned_kart() {
        let karts = parse_karts("1, 2, 3");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let r = reel(&karts, &karts[1], &mut rng);
        assert_eq!(r.len(), REEL_LENGTH);
        assert_eq!(r[0], "");
        assert_eq!(r[REEL_LENGTH - 1], "2");
        assert!(r[1..].iter().all(|l| ["1", "2", "3"].contains(&l.as_str())));
    }

    #[test]
    fn reel_without_karts() {
        let assigned = Kart::new("9");
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        assert_eq!(reel(&[], &assigned, &mut rng), vec!["", "9"]);
    }
}

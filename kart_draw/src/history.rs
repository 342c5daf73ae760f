/*!
Reading and writing the draw history.

The history is plain text kept by the league organizers. Each line lists the
karts a driver already used, in one of two forms:

```text
Ana: 1, 4, 7
Bob, 2, 3
```

Lines that cannot be understood are skipped. When a driver appears on several
lines, the last line wins.
*/

use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::config::{Assignment, NormalizedKey};

/// For each driver, the karts they should not get again.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ExclusionTable {
    exclusions: BTreeMap<NormalizedKey, BTreeSet<NormalizedKey>>,
    // The first spelling seen for each driver, for messages.
    display_names: HashMap<NormalizedKey, String>,
}

impl ExclusionTable {
    pub fn new() -> ExclusionTable {
        ExclusionTable::default()
    }

    /// Replaces the history of a driver.
    ///
    /// Empty kart labels are ignored. The display name is only recorded the first
    /// time the driver is seen.
    pub fn set<'a>(&mut self, name: &str, karts: impl IntoIterator<Item = &'a str>) {
        let key = NormalizedKey::new(name);
        if key.is_empty() {
            return;
        }
        let kart_keys: BTreeSet<NormalizedKey> = karts
            .into_iter()
            .map(NormalizedKey::new)
            .filter(|k| !k.is_empty())
            .collect();
        self.display_names
            .entry(key.clone())
            .or_insert_with(|| name.trim().to_string());
        self.exclusions.insert(key, kart_keys);
    }

    /// Adds the karts of a confirmed draw to the existing history of each driver.
    pub fn record(&mut self, assignment: &Assignment) {
        for seat in assignment.seats() {
            self.display_names
                .entry(seat.driver.key.clone())
                .or_insert_with(|| seat.driver.name.clone());
            self.exclusions
                .entry(seat.driver.key.clone())
                .or_default()
                .insert(seat.kart.key.clone());
        }
    }

    pub fn get(&self, driver: &NormalizedKey) -> Option<&BTreeSet<NormalizedKey>> {
        self.exclusions.get(driver)
    }

    pub fn excludes(&self, driver: &NormalizedKey, kart: &NormalizedKey) -> bool {
        self.exclusions
            .get(driver)
            .map(|karts| karts.contains(kart))
            .unwrap_or(false)
    }

    /// The number of karts in the history of a driver.
    pub fn exclusion_count(&self, driver: &NormalizedKey) -> usize {
        self.exclusions.get(driver).map(|s| s.len()).unwrap_or(0)
    }

    pub fn display_name(&self, driver: &NormalizedKey) -> Option<&str> {
        self.display_names.get(driver).map(|s| s.as_str())
    }

    pub fn drivers(&self) -> impl Iterator<Item = &NormalizedKey> {
        self.exclusions.keys()
    }

    pub fn len(&self) -> usize {
        self.exclusions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exclusions.is_empty()
    }

    /// Writes the table back in the `Name: kart1, kart2` form, one driver per line.
    ///
    /// Kart labels are written in their normalized form. Reading the text again with
    /// [parse_history] gives the same table, as long as the driver names do not
    /// contain a colon.
    pub fn to_history_text(&self) -> String {
        let lines: Vec<String> = self
            .exclusions
            .iter()
            .map(|(key, karts)| {
                let name = self.display_name(key).unwrap_or_else(|| key.as_str());
                let labels: Vec<&str> = karts.iter().map(|k| k.as_str()).collect();
                format!("{}: {}", name, labels.join(", "))
            })
            .collect();
        lines.join("\n")
    }
}

/// Parses a history text into an exclusion table. This never fails.
pub fn parse_history(raw: &str) -> ExclusionTable {
    let mut table = ExclusionTable::new();
    for (lineno, line) in raw.lines().enumerate() {
        match parse_line(line) {
            Some((name, karts)) => {
                debug!(
                    "parse_history: line {}: driver {:?} karts {:?}",
                    lineno + 1,
                    name,
                    karts
                );
                table.set(name, karts);
            }
            None if !line.trim().is_empty() => {
                debug!("parse_history: line {}: no driver name, skipping", lineno + 1);
            }
            None => {}
        }
    }
    table
}

fn parse_line(line: &str) -> Option<(&str, Vec<&str>)> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let (name, karts): (&str, Vec<&str>) = match line.split_once(':') {
        // Everything after the first colon is the kart list, colons included.
        Some((name, rest)) => (name.trim(), split_tokens(rest)),
        None => {
            let mut tokens = split_tokens(line);
            if tokens.is_empty() {
                return None;
            }
            let name = tokens.remove(0);
            (name, tokens)
        }
    };
    if name.is_empty() {
        None
    } else {
        Some((name, karts))
    }
}

fn split_tokens(s: &str) -> Vec<&str> {
    s.split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Appends the seats of a confirmed draw to a history text, one `Name: kart` line
/// per driver.
///
/// Since the last line of a driver wins, the new lines replace what was known for
/// these drivers. Use [ExclusionTable::record] to accumulate instead.
pub fn append_assignment(raw: &str, assignment: &Assignment) -> String {
    let lines: Vec<String> = assignment
        .seats()
        .iter()
        .map(|s| format!("{}: {}", s.driver.name, s.kart.label))
        .collect();
    let existing = raw.trim();
    let separator = if existing.is_empty() { "" } else { "\n" };
    format!("{}{}{}", existing, separator, lines.join("\n"))
}

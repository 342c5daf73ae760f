use std::path::{Path, PathBuf};

/// Resolves a path from a config file against the directory of that config file.
pub fn resolve_path(root: &Path, file_path: &str) -> String {
    let p: PathBuf = if Path::new(file_path).is_absolute() {
        PathBuf::from(file_path)
    } else {
        root.join(file_path)
    };
    p.as_path().display().to_string()
}

/// Keeps the names that are not blank, trimmed.
pub fn clean_names<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|s| s.as_ref().trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_follow_the_config() {
        let root = Path::new("/data/round_3");
        assert_eq!(
            resolve_path(root, "drivers.csv"),
            Path::new("/data/round_3/drivers.csv").display().to_string()
        );
        assert_eq!(resolve_path(root, "/tmp/history.txt"), "/tmp/history.txt");
    }

    #[test]
    fn blank_names_are_dropped() {
        assert_eq!(clean_names(vec![" Ana ", "", "  ", "Bob"]), vec!["Ana", "Bob"]);
    }
}

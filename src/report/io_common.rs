use std::path::{Path, PathBuf};

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

/// The directory of a file, used to resolve the paths of a configuration.
pub fn parent_dir(path: &str) -> String {
    Path::new(path)
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_default()
}

/// Resolves a path of the configuration against the directory of the configuration.
/// Absolute paths are kept as they are.
pub fn resolve_path(root: &str, path: &str) -> String {
    if Path::new(path).is_absolute() || root.is_empty() {
        return path.to_string();
    }
    let p: PathBuf = [root, path].iter().collect();
    p.as_path().display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths() {
        assert_eq!(simplify_file_name("data/ssg_2024.json"), "ssg_2024.json");
        assert_eq!(parent_dir("data/config.json"), "data");
        assert_eq!(parent_dir("config.json"), "");
        assert_eq!(resolve_path("data", "snap.json"), "data/snap.json");
        assert_eq!(resolve_path("", "snap.json"), "snap.json");
        assert_eq!(resolve_path("data", "/tmp/snap.json"), "/tmp/snap.json");
    }
}

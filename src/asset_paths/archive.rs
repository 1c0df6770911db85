use std::path::{Component, Path, PathBuf};

/// Render a relative filesystem path as an archive path.
///
/// Archive entries always use forward slashes so that the produced zip is portable,
/// regardless of the native separator of the machine that discovered the files.
pub fn to_archive_path(path: &Path) -> String {
    path.components()
        .filter_map(|component| match component {
            Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
        .replace('\\', "/")
}

/// Relative location of `path` underneath `base`.
///
/// Returns `None` when the path escapes the base directory or is the base itself, which is
/// the signal for quarantining the file under the external namespace.
pub fn relative_to(base: &Path, path: &Path) -> Option<PathBuf> {
    let relative = path.strip_prefix(base).ok()?;
    if relative.as_os_str().is_empty() || relative.is_absolute() {
        return None;
    }
    if relative
        .components()
        .any(|component| !matches!(component, Component::Normal(_)))
    {
        return None;
    }
    Some(relative.to_path_buf())
}

/// Directory portion of an archive path, empty for entries at the archive root.
pub fn archive_dir(archive_path: &str) -> &str {
    match archive_path.rfind('/') {
        Some(index) => &archive_path[..index],
        None => "",
    }
}

/// Express `target` relative to the archive directory `from_dir`.
pub fn relative_archive_reference(from_dir: &str, target: &str) -> String {
    let from: Vec<&str> = archive_segments(from_dir).collect();
    let to: Vec<&str> = archive_segments(target).collect();

    let shared = from
        .iter()
        .zip(to.iter())
        .take_while(|(left, right)| left == right)
        .count();

    let mut segments: Vec<&str> = Vec::with_capacity(from.len() - shared + to.len() - shared);
    segments.extend(std::iter::repeat_n("..", from.len() - shared));
    segments.extend(&to[shared..]);
    segments.join("/")
}

/// Insert a numeric counter before the file extension, `photo.png` becoming `photo_1.png`.
pub fn suffixed_file_name(file_name: &str, counter: usize) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    match path.extension() {
        Some(extension) => format!("{stem}_{counter}.{}", extension.to_string_lossy()),
        None => format!("{stem}_{counter}"),
    }
}

fn archive_segments(value: &str) -> impl Iterator<Item = &str> {
    value
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_components_with_forward_slashes() {
        let path = Path::new("images").join("icons").join("logo.png");
        assert_eq!(to_archive_path(&path), "images/icons/logo.png");
    }

    #[test]
    fn normalises_backslashes_from_windows_inputs() {
        assert_eq!(to_archive_path(Path::new("videos\\intro.mp4")), "videos/intro.mp4");
    }

    #[test]
    fn relative_to_rejects_paths_outside_base() {
        let base = Path::new("/srv/site");
        assert_eq!(
            relative_to(base, Path::new("/srv/site/img/a.png")),
            Some(PathBuf::from("img/a.png"))
        );
        assert_eq!(relative_to(base, Path::new("/srv/other/a.png")), None);
        assert_eq!(relative_to(base, Path::new("/srv/site-two/a.png")), None);
        assert_eq!(relative_to(base, base), None);
    }

    #[test]
    fn archive_dir_of_root_entry_is_empty() {
        assert_eq!(archive_dir("index.html"), "");
        assert_eq!(archive_dir("docs/report/index.html"), "docs/report");
    }

    #[test]
    fn relative_reference_walks_up_from_nested_directories() {
        assert_eq!(relative_archive_reference("", "a.png"), "a.png");
        assert_eq!(relative_archive_reference(".", "_ext/a.png"), "_ext/a.png");
        assert_eq!(relative_archive_reference("css", "img/bg.png"), "../img/bg.png");
        assert_eq!(relative_archive_reference("css", "css/bg.png"), "bg.png");
        assert_eq!(
            relative_archive_reference("docs/report", "_ext/photo.png"),
            "../../_ext/photo.png"
        );
    }

    #[test]
    fn suffixes_before_the_extension() {
        assert_eq!(suffixed_file_name("photo.png", 1), "photo_1.png");
        assert_eq!(suffixed_file_name("archive.tar.gz", 2), "archive.tar_2.gz");
        assert_eq!(suffixed_file_name("LICENSE", 3), "LICENSE_3");
    }
}

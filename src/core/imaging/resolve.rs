use std::path::{Component, Path, PathBuf};

/// Where uploaded images live and which URL hosts point at them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRoots {
    /// Directory that root-relative references are joined onto
    pub upload_root: PathBuf,
    /// Sub-folder of `upload_root` that holds bare filenames
    pub uploads_dir: String,
    /// URL prefixes (scheme + host + port) served from `upload_root`
    pub host_prefixes: Vec<String>,
}

impl ImageRoots {
    pub fn new(upload_root: impl Into<PathBuf>) -> Self {
        Self {
            upload_root: upload_root.into(),
            uploads_dir: "uploads".to_string(),
            host_prefixes: Vec::new(),
        }
    }

    pub fn with_host_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.host_prefixes.push(prefix.into());
        self
    }
}

/// Resolve a logical image reference to a local path.
///
/// Three shapes are accepted:
/// * absolute URL on a known host: `http://localhost:3001/uploads/a.jpg`
/// * root-relative path: `/uploads/a.jpg`
/// * bare filename: `a.jpg`, which lives in the uploads sub-folder
///
/// Returns `None` for blank references, URLs on unknown hosts, and paths that
/// would escape the upload root.
pub fn resolve_image_ref(reference: &str, roots: &ImageRoots) -> Option<PathBuf> {
    let reference = reference.trim();
    if reference.is_empty() {
        return None;
    }

    if is_absolute_url(reference) {
        let path = strip_host_prefix(reference, &roots.host_prefixes)?;
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let decoded = urlencoding::decode(path).ok()?;
        return join_relative(&roots.upload_root, decoded.trim_start_matches('/'));
    }

    if reference.starts_with('/') {
        return join_relative(&roots.upload_root, reference.trim_start_matches('/'));
    }

    if !reference.contains(['/', '\\']) {
        return join_relative(&roots.upload_root.join(&roots.uploads_dir), reference);
    }

    join_relative(&roots.upload_root, reference)
}

fn is_absolute_url(reference: &str) -> bool {
    let lowered = reference.to_ascii_lowercase();
    lowered.starts_with("http://") || lowered.starts_with("https://")
}

/// Path part of `url` after a matching host prefix
fn strip_host_prefix<'a>(url: &'a str, prefixes: &[String]) -> Option<&'a str> {
    prefixes.iter().find_map(|prefix| {
        let prefix = prefix.trim_end_matches('/');
        let head = url.get(..prefix.len())?;
        if !head.eq_ignore_ascii_case(prefix) {
            return None;
        }
        let rest = url.get(prefix.len()..)?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    })
}

fn join_relative(base: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    let mut resolved = base.to_path_buf();
    let mut has_file = false;

    for component in relative.components() {
        match component {
            Component::Normal(part) => {
                resolved.push(part);
                has_file = true;
            }
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    has_file.then_some(resolved)
}

//! Best-effort lookup of car images among the static assets.
//!
//! Stored image paths and the files on disk drift apart (`mini_cooper.png`
//! vs `mini-cooper.svg`). [`resolve`] probes a bounded set of spellings and
//! extensions and falls back to [`PLACEHOLDER_IMAGE`]. The existence check
//! is injected through [`AssetLookup`] so resolution is testable without a
//! filesystem.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

use crate::repository::RentalRepository;
use crate::CoreResult;

pub const PLACEHOLDER_IMAGE: &str = "/cars/placeholder.svg";

const DEFAULT_DIR: &str = "cars";
const DEFAULT_EXTENSION: &str = ".svg";
const FALLBACK_EXTENSIONS: [&str; 4] = [".svg", ".png", ".jpg", ".jpeg"];

/// Existence check for an asset path relative to the asset root
/// (e.g. `cars/swift.svg`).
pub trait AssetLookup: Send + Sync {
    fn exists(&self, relative: &str) -> bool;
}

/// Assets served from a directory on disk.
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLookup for FsAssets {
    /// Only plain relative paths are looked up; anything that could leave
    /// the root (`..`, absolute paths, prefixes) is reported missing.
    fn exists(&self, relative: &str) -> bool {
        let rel = Path::new(relative);
        let plain = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if rel.as_os_str().is_empty() || !plain {
            return false;
        }
        self.root.join(rel).is_file()
    }
}

impl AssetLookup for HashSet<String> {
    fn exists(&self, relative: &str) -> bool {
        self.contains(relative)
    }
}

impl<F> AssetLookup for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn exists(&self, relative: &str) -> bool {
        self(relative)
    }
}

/// Remote URLs and data URIs are used as-is and never probed.
pub fn is_external(image: &str) -> bool {
    let lower = image.get(..8).unwrap_or(image).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:")
}

/// Resolves `requested` to an existing asset path (leading `/`, forward
/// slashes), or the placeholder when nothing matches. Empty and external
/// inputs come back unchanged.
pub fn resolve<A>(requested: &str, assets: &A) -> String
where
    A: AssetLookup + ?Sized,
{
    if requested.is_empty() || is_external(requested) {
        return requested.to_string();
    }

    let Some(parts) = AssetPath::parse(requested) else {
        return PLACEHOLDER_IMAGE.to_string();
    };
    for variant in parts.name_variants() {
        for ext in parts.extensions() {
            let candidate = format!("{}/{}{}", parts.dir, variant, ext);
            if assets.exists(&candidate) {
                return format!("/{}", candidate);
            }
        }
    }

    PLACEHOLDER_IMAGE.to_string()
}

#[derive(Debug, PartialEq, Eq)]
struct AssetPath {
    dir: String,
    name: String,
    ext: String,
}

impl AssetPath {
    /// `None` when the path cannot name a file under the asset root.
    fn parse(requested: &str) -> Option<Self> {
        let normalized = requested.replace('\\', "/");
        let rel = normalized.trim_start_matches('/');

        let (dir, file) = match rel.rfind('/') {
            Some(i) => (&rel[..i], &rel[i + 1..]),
            None => ("", rel),
        };
        // A leading dot names a hidden file, not an extension.
        let (name, ext) = match file.rfind('.') {
            Some(i) if i > 0 => (&file[..i], &file[i..]),
            _ => (file, ""),
        };

        if !dir.is_empty() && !dir.split('/').all(is_plain_segment) {
            return None;
        }
        if !is_plain_segment(file) {
            return None;
        }

        Some(Self {
            dir: if dir.is_empty() { DEFAULT_DIR } else { dir }.to_string(),
            name: name.to_string(),
            ext: if ext.is_empty() { DEFAULT_EXTENSION } else { ext }.to_string(),
        })
    }

    fn name_variants(&self) -> Vec<String> {
        unique(vec![
            self.name.clone(),
            self.name.replace('_', "-"),
            self.name.replace('-', "_"),
        ])
    }

    fn extensions(&self) -> Vec<String> {
        let mut exts = vec![self.ext.clone()];
        exts.extend(FALLBACK_EXTENSIONS.iter().map(|e| e.to_string()));
        unique(exts)
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty() && segment != "." && segment != ".." && !segment.contains(':')
}

fn unique(items: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

/// Startup pass: re-resolves every local car image and persists the result
/// when it differs from what is stored. Returns how many cars changed.
pub async fn normalize_car_images<A>(repo: &dyn RentalRepository, assets: &A) -> CoreResult<usize>
where
    A: AssetLookup + ?Sized,
{
    let mut changed = 0;
    for car in repo.list_cars().await? {
        if is_external(&car.image) {
            continue;
        }

        let resolved = if car.image.is_empty() {
            PLACEHOLDER_IMAGE.to_string()
        } else {
            resolve(&car.image, assets)
        };

        if resolved == PLACEHOLDER_IMAGE && car.image != PLACEHOLDER_IMAGE {
            warn!(
                "image missing for car {} {} ({}), set to placeholder",
                car.make, car.model, car.image
            );
        }

        if resolved != car.image {
            repo.set_car_image(car.id, &resolved).await?;
            info!("Normalized image for {} {} to {}", car.make, car.model, resolved);
            changed += 1;
        }
    }
    Ok(changed)
}

//! Ranking and presentation of neighbor candidates.
//!
//! Candidates come back from the index in service order. [`rank_candidates`]
//! reorders them by **descending** distance with a stable sort, so equal
//! distances keep their service order. Whether "larger" means "closer" depends
//! on the metric the index was built with; this crate deliberately does not
//! guess and keeps the descending order as the contract.
//!
//! [`Presenter`] then maps each candidate id onto a file under a fixed image
//! directory. Candidates whose file is missing are dropped without error.

use std::path::{Component, Path, PathBuf};

use neighbors::NeighborCandidate;
use serde::{Deserialize, Serialize};

/// Sort by distance, largest first. Stable for ties. Under `total_cmp` a positive
/// NaN sorts ahead of every number and a negative NaN after every number.
pub fn rank_candidates(mut candidates: Vec<NeighborCandidate>) -> Vec<NeighborCandidate> {
    candidates.sort_by(|a, b| b.distance.total_cmp(&a.distance));
    candidates
}

/// Candidate ids must be a single relative file name component chain with no `..`,
/// root, or drive prefix, so they always resolve inside the image directory.
pub fn is_safe_id(id: &str) -> bool {
    !id.is_empty()
        && Path::new(id)
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
}

/// One displayable result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedImage {
    /// 1-based position in the ranked order (skipped candidates still consume a rank).
    pub rank: usize,
    pub id: String,
    pub distance: f32,
    pub path: PathBuf,
    /// Grid column this image lands in.
    pub column: usize,
}

/// Presentation settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PresenterConfig {
    /// Directory holding the indexed images, named by datapoint id.
    pub image_directory: PathBuf,
    /// Width of the result grid.
    pub columns: usize,
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self {
            image_directory: PathBuf::from("extracted"),
            columns: 5,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Presenter {
    image_directory: PathBuf,
    columns: usize,
}

impl Presenter {
    pub fn new(config: PresenterConfig) -> Self {
        Self {
            image_directory: config.image_directory,
            columns: config.columns.max(1),
        }
    }

    pub fn image_directory(&self) -> &Path {
        &self.image_directory
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Local file for `id`, if it exists.
    pub fn resolve(&self, id: &str) -> Option<PathBuf> {
        if !is_safe_id(id) {
            return None;
        }
        let path = self.image_directory.join(id);
        path.is_file().then_some(path)
    }

    /// Rank `candidates` and keep only those with a stored image.
    pub fn present(&self, candidates: Vec<NeighborCandidate>) -> Vec<RankedImage> {
        let total = candidates.len();
        let images: Vec<RankedImage> = rank_candidates(candidates)
            .into_iter()
            .enumerate()
            .filter_map(|(position, candidate)| {
                let Some(path) = self.resolve(&candidate.id) else {
                    tracing::debug!(id = %candidate.id, "no stored image for candidate, skipping");
                    return None;
                };
                Some(RankedImage {
                    rank: position + 1,
                    column: position % self.columns,
                    id: candidate.id,
                    distance: candidate.distance,
                    path,
                })
            })
            .collect();

        if images.len() < total {
            tracing::warn!(
                shown = images.len(),
                skipped = total - images.len(),
                dir = %self.image_directory.display(),
                "some candidates have no stored image"
            );
        }
        images
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new(PresenterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn candidates(pairs: &[(&str, f32)]) -> Vec<NeighborCandidate> {
        pairs
            .iter()
            .map(|(id, d)| NeighborCandidate::new(*id, *d))
            .collect()
    }

    fn ids(ranked: &[NeighborCandidate]) -> Vec<&str> {
        ranked.iter().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn rank_orders_by_descending_distance() {
        let ranked = rank_candidates(candidates(&[
            ("a", 0.1),
            ("b", 0.9),
            ("c", -0.3),
            ("d", 0.5),
        ]));
        assert_eq!(ids(&ranked), vec!["b", "d", "a", "c"]);
        assert!(ranked.windows(2).all(|w| w[0].distance >= w[1].distance));
    }

    #[test]
    fn rank_is_stable_for_ties() {
        let ranked = rank_candidates(candidates(&[
            ("first", 0.5),
            ("top", 0.7),
            ("second", 0.5),
            ("third", 0.5),
        ]));
        assert_eq!(ids(&ranked), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn rank_places_nan_first() {
        let ranked = rank_candidates(candidates(&[("x", 1.0), ("nan", f32::NAN)]));
        assert_eq!(ids(&ranked), vec!["nan", "x"]);
    }

    #[test]
    fn rank_places_negative_nan_last() {
        let ranked = rank_candidates(candidates(&[
            ("neg_nan", -f32::NAN),
            ("x", -1.0),
            ("nan", f32::NAN),
        ]));
        assert_eq!(ids(&ranked), vec!["nan", "x", "neg_nan"]);
    }

    #[test]
    fn rank_empty_is_empty() {
        assert!(rank_candidates(Vec::new()).is_empty());
    }

    #[test]
    fn safe_ids() {
        assert!(is_safe_id("img_001.jpg"));
        assert!(is_safe_id("shard-3/img_001.jpg"));
        assert!(!is_safe_id(""));
        assert!(!is_safe_id("../secret.png"));
        assert!(!is_safe_id("/etc/passwd"));
        assert!(!is_safe_id("./img.jpg"));
    }

    #[test]
    fn present_skips_missing_files_without_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("near.jpg"), b"jpg").unwrap();
        fs::write(dir.path().join("far.jpg"), b"jpg").unwrap();

        let presenter = Presenter::new(PresenterConfig {
            image_directory: dir.path().to_path_buf(),
            columns: 5,
        });
        let shown = presenter.present(candidates(&[
            ("far.jpg", 0.2),
            ("gone.jpg", 0.8),
            ("near.jpg", 0.6),
        ]));

        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].id, "near.jpg");
        assert_eq!(shown[0].rank, 2);
        assert_eq!(shown[0].path, dir.path().join("near.jpg"));
        assert_eq!(shown[1].id, "far.jpg");
        assert_eq!(shown[1].rank, 3);
        assert!(presenter.resolve("gone.jpg").is_none());
    }

    #[test]
    fn present_wraps_columns_by_rank_position() {
        let dir = tempfile::tempdir().unwrap();
        let mut input = Vec::new();
        for i in 0..7 {
            let id = format!("{i}.png");
            fs::write(dir.path().join(&id), b"png").unwrap();
            input.push(NeighborCandidate::new(id, 10.0 - i as f32));
        }

        let presenter = Presenter::new(PresenterConfig {
            image_directory: dir.path().to_path_buf(),
            columns: 3,
        });
        let columns: Vec<usize> = presenter.present(input).iter().map(|r| r.column).collect();
        assert_eq!(columns, vec![0, 1, 2, 0, 1, 2, 0]);
    }

    #[test]
    fn directories_are_not_images() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        let presenter = Presenter::new(PresenterConfig {
            image_directory: dir.path().to_path_buf(),
            columns: 5,
        });
        assert!(presenter.resolve("nested").is_none());
    }

    #[test]
    fn zero_columns_falls_back_to_one() {
        let presenter = Presenter::new(PresenterConfig {
            columns: 0,
            ..PresenterConfig::default()
        });
        assert_eq!(presenter.columns(), 1);
    }

    #[test]
    fn presenter_config_defaults() {
        let cfg: PresenterConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.image_directory, PathBuf::from("extracted"));
        assert_eq!(cfg.columns, 5);
    }
}

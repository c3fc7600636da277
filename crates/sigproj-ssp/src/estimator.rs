//! Deriving projection items from recorded data.
//!
//! For each channel group the epoch data is flattened to channels×samples and
//! decomposed with a thin SVD; the leading left singular vectors become new
//! single-row projection items.

use nalgebra::DMatrix;
use ndarray::Array3;
use sigproj_fiff::{ItemKind, NamedMatrix, ProjectionItem};
use tracing::warn;

/// One group of channels to derive vectors for.
///
/// Groups typically correspond to sensor categories (gradiometers,
/// magnetometers, EEG); the caller controls the iteration order.
#[derive(Debug, Clone)]
pub struct ChannelGroup {
    /// Label used in the generated item descriptions.
    pub label: String,
    /// Channel indices into the epoch-data channel axis.
    pub picks: Vec<usize>,
    /// Channel names, one per pick.
    pub names: Vec<String>,
    /// How many singular vectors to retain for this group.
    pub n_vectors: usize,
}

/// Derive projection items from epoch data, shape `[epoch, channel, sample]`.
///
/// Per group: a zero vector request skips the group; a group with no matching
/// channels is demoted to zero vectors with a warning, not an error. Items
/// come out in group order, descending singular value within a group, each
/// active, with a single-row matrix over the group's channel names.
pub fn compute_spatial_vectors(
    data: &Array3<f64>,
    groups: &[ChannelGroup],
) -> Vec<ProjectionItem> {
    let (n_epochs, n_channels, n_samples) = data.dim();

    let mut projs = Vec::new();
    for group in groups {
        if group.n_vectors == 0 {
            continue;
        }
        if group.picks.is_empty() {
            warn!(
                group = %group.label,
                "no channels found for group; forcing vector count to 0"
            );
            continue;
        }
        if group.names.len() != group.picks.len() {
            warn!(
                group = %group.label,
                picks = group.picks.len(),
                names = group.names.len(),
                "channel name count does not match picks; skipping group"
            );
            continue;
        }
        if group.picks.iter().any(|&ch| ch >= n_channels) {
            warn!(
                group = %group.label,
                "channel index out of range; skipping group"
            );
            continue;
        }

        // Flatten epochs and samples into one long observation axis.
        let mut flat = DMatrix::<f64>::zeros(group.picks.len(), n_epochs * n_samples);
        for (gi, &ch) in group.picks.iter().enumerate() {
            for e in 0..n_epochs {
                for t in 0..n_samples {
                    flat[(gi, e * n_samples + t)] = data[[e, ch, t]];
                }
            }
        }

        let svd = flat.svd(true, false);
        let u = svd.u.expect("left singular vectors were requested");

        // The thin SVD bounds how many directions the data can supply.
        let kept = group.n_vectors.min(u.ncols());
        for k in 0..kept {
            let row = DMatrix::from_fn(1, u.nrows(), |_, c| u[(c, k)]);
            let matrix = NamedMatrix::new(group.names.clone(), row)
                .expect("name count checked against picks above");
            projs.push(ProjectionItem::new(
                ItemKind::Field,
                true,
                format!("{}-{}", group.label, k + 1),
                matrix,
            ));
        }
    }

    projs
}

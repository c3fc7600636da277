//! Orthogonal-complement projector construction.
//!
//! The active projection items are scattered into a common channel space,
//! column-normalized, reorthogonalized with a thin SVD, and truncated to the
//! singular values above a relative threshold. The projector is then
//! `I − U·Uᵗ` over the retained basis.

use std::collections::HashSet;

use nalgebra::DMatrix;
use sigproj_fiff::ProjectionItem;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectorError {
    #[error("no channel names specified")]
    InvalidChannelSet,
    #[error("channel name list in projection item {0} contains duplicate entries")]
    DuplicateChannel(usize),
}

/// Configuration for projector construction.
#[derive(Debug, Clone)]
pub struct ProjectorConfig {
    /// Relative singular-value cutoff: directions with
    /// `s[i] / s[0] <= rank_threshold` are dropped as near-linearly dependent.
    pub rank_threshold: f64,
}

impl Default for ProjectorConfig {
    fn default() -> Self {
        Self {
            rank_threshold: 0.01,
        }
    }
}

/// The measurement channel layout the projector is built against.
#[derive(Debug, Clone, Default)]
pub struct ChannelSet {
    /// Ordered channel names; defines the projector dimensionality.
    pub names: Vec<String>,
    /// Channels flagged unreliable. Currently informational only: the
    /// reference algorithm does not exclude them from vector construction
    /// or normalization, and that behavior is pinned here pending product
    /// clarification.
    pub bads: Vec<String>,
}

/// An orthogonal-complement projector over `N` channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Projector {
    /// `N×N` projection matrix; the identity when `rank == 0`.
    pub matrix: DMatrix<f64>,
    /// Number of retained artifact directions.
    pub rank: usize,
    /// `N×rank` orthonormal basis of the projected-out subspace.
    pub basis: DMatrix<f64>,
}

impl Projector {
    /// The no-op projector: identity matrix, empty basis.
    pub fn identity(nchan: usize) -> Self {
        Self {
            matrix: DMatrix::identity(nchan, nchan),
            rank: 0,
            basis: DMatrix::zeros(nchan, 0),
        }
    }
}

/// Build a projector from `items` against the channel ordering `ch_names`.
///
/// Degenerate inputs are not errors: with no active items, or with every
/// contributing vector vanishing in the target channel space, the result is
/// the identity projector with rank 0.
pub fn make_projector(
    items: &[ProjectionItem],
    ch_names: &[String],
    config: &ProjectorConfig,
) -> Result<Projector, ProjectorError> {
    let nchan = ch_names.len();
    if nchan == 0 {
        return Err(ProjectorError::InvalidChannelSet);
    }

    let nvec_total: usize = items
        .iter()
        .filter(|p| p.active)
        .map(|p| p.matrix.row_count())
        .sum();
    if nvec_total == 0 {
        return Ok(Projector::identity(nchan));
    }

    let mut vecs = DMatrix::<f64>::zeros(nchan, nvec_total);
    let mut offset = 0;
    let mut nonzero = 0;
    for (index, item) in items.iter().enumerate() {
        if !item.active {
            continue;
        }
        let names = item.matrix.col_names();
        let unique: HashSet<&str> = names.iter().map(String::as_str).collect();
        if unique.len() != names.len() {
            return Err(ProjectorError::DuplicateChannel(index));
        }

        // Correspondence between target rows and item columns; names present
        // on only one side are dropped without complaint.
        let mut sel = Vec::with_capacity(names.len());
        for (row, name) in ch_names.iter().enumerate() {
            if let Some(col) = names.iter().position(|n| n == name) {
                sel.push((row, col));
            }
        }

        let nrow = item.matrix.row_count();
        let data = item.matrix.data();
        for v in 0..nrow {
            for &(row, col) in &sel {
                vecs[(row, offset + v)] = data[(v, col)];
            }
        }

        // Rescale for better detection of small singular values. Zero-norm
        // columns stay as they are.
        for v in 0..nrow {
            let norm = vecs.column(offset + v).norm();
            if norm > 0.0 {
                vecs.column_mut(offset + v).unscale_mut(norm);
                nonzero += 1;
            }
        }

        offset += nrow;
    }

    // Every contributing vector vanished in the target channel space.
    if nonzero == 0 {
        return Ok(Projector::identity(nchan));
    }

    // Reorthogonalize; singular values come back in descending order.
    let svd = vecs.svd(true, false);
    let u = svd.u.expect("left singular vectors were requested");
    let s = svd.singular_values;

    let rank = s.iter().filter(|&&sv| sv / s[0] > config.rank_threshold).count();
    let basis = u.columns(0, rank).into_owned();
    let matrix = DMatrix::identity(nchan, nchan) - &basis * basis.transpose();

    Ok(Projector { matrix, rank, basis })
}

/// Build a projector for a measurement channel set.
///
/// Forwards the channel-name ordering to [`make_projector`]. The bad-channel
/// set is accepted for interface completeness but not applied (see
/// [`ChannelSet::bads`]).
pub fn make_projector_for(
    set: &ChannelSet,
    items: &[ProjectionItem],
    config: &ProjectorConfig,
) -> Result<Projector, ProjectorError> {
    if !set.bads.is_empty() {
        debug!(
            n_bads = set.bads.len(),
            "bad channels are not excluded from projector construction"
        );
    }
    make_projector(items, &set.names, config)
}

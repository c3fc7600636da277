//! Reading projection items out of a tagged tree.
//!
//! Each field resolves through an explicit, ordered source list (item tag,
//! then fallback tag, then failure); the only implicit recovery is the
//! documented defaulting of the item channel count to the block-level value
//! and of the description to the name tag.

use thiserror::Error;
use tracing::debug;

use crate::constants::*;
use crate::item::{ItemKind, NamedMatrix, ProjectionItem};
use crate::tree::TreeNode;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjReadError {
    #[error("projection item {item}: missing required field `{field}`")]
    MissingField { field: &'static str, item: usize },
    #[error(
        "projection item {item}: data matrix has {actual} columns \
         but the channel name list has {expected} entries"
    )]
    ShapeMismatch {
        item: usize,
        expected: usize,
        actual: usize,
    },
}

/// Read all projection items under `node`, in persistence order.
///
/// An absent projection block is not an error; it reads as an empty list.
pub fn read_proj(node: &TreeNode) -> Result<Vec<ProjectionItem>, ProjReadError> {
    let blocks = node.find_blocks(BLOCK_PROJ);
    let block = match blocks.first() {
        Some(block) => *block,
        None => return Ok(Vec::new()),
    };

    // Block-level default, threaded through this call only.
    let global_nchan = block.tag_int(TAG_NCHAN);

    let mut items = Vec::new();
    for (index, item) in block.find_blocks(BLOCK_PROJ_ITEM).into_iter().enumerate() {
        items.push(read_item(item, index, global_nchan)?);
    }

    if !items.is_empty() {
        debug!(count = items.len(), "read projection items");
        for item in &items {
            debug!(
                "    {} ({} x {}) {}",
                item.description,
                item.matrix.row_count(),
                item.matrix.col_count(),
                if item.active { "active" } else { "idle" }
            );
        }
    }

    Ok(items)
}

fn read_item(
    item: &TreeNode,
    index: usize,
    global_nchan: Option<i32>,
) -> Result<ProjectionItem, ProjReadError> {
    // The channel count participates in field resolution but the matrix
    // dimensions come from the data tag; see the shape check below.
    let _nchan = resolve_nchan(item, index, global_nchan)?;
    let description = resolve_description(item, index)?;
    let kind = ItemKind::from_code(require_int(item, TAG_PROJ_ITEM_KIND, "kind", index)?);
    let _nvec = require_int(item, TAG_PROJ_ITEM_NVEC, "vector_count", index)?;
    let names = resolve_channel_names(item, index)?;
    let data = item
        .tag_matrix(TAG_PROJ_ITEM_VECTORS)
        .ok_or(ProjReadError::MissingField {
            field: "data",
            item: index,
        })?;
    let active = item.find_tag(TAG_PROJ_ITEM_ACTIVE).is_some();

    let matrix = NamedMatrix::new(names, data.data.clone()).map_err(|_| {
        ProjReadError::ShapeMismatch {
            item: index,
            expected: channel_name_count(item),
            actual: data.data.ncols(),
        }
    })?;

    Ok(ProjectionItem::new(kind, active, description, matrix))
}

fn resolve_nchan(
    item: &TreeNode,
    index: usize,
    global_nchan: Option<i32>,
) -> Result<i32, ProjReadError> {
    item.tag_int(TAG_NCHAN)
        .or(global_nchan)
        .ok_or(ProjReadError::MissingField {
            field: "nchan",
            item: index,
        })
}

fn resolve_description(item: &TreeNode, index: usize) -> Result<String, ProjReadError> {
    item.tag_text(TAG_DESCRIPTION)
        .or_else(|| item.tag_text(TAG_NAME))
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .ok_or(ProjReadError::MissingField {
            field: "description",
            item: index,
        })
}

fn resolve_channel_names(item: &TreeNode, index: usize) -> Result<Vec<String>, ProjReadError> {
    item.tag_text(TAG_PROJ_ITEM_CH_NAME_LIST)
        .map(|list| list.split(':').map(str::to_owned).collect())
        .ok_or(ProjReadError::MissingField {
            field: "channel_names",
            item: index,
        })
}

fn require_int(
    item: &TreeNode,
    tag: i32,
    field: &'static str,
    index: usize,
) -> Result<i32, ProjReadError> {
    item.tag_int(tag)
        .ok_or(ProjReadError::MissingField { field, item: index })
}

fn channel_name_count(item: &TreeNode) -> usize {
    item.tag_text(TAG_PROJ_ITEM_CH_NAME_LIST)
        .map(|list| list.split(':').count())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{TagValue, TreeBuilder, TreeSink};
    use nalgebra::dmatrix;

    fn item_block(
        sink: &mut TreeBuilder,
        desc_tag: Option<(i32, &str)>,
        nchan: Option<i32>,
        kind: Option<i32>,
        nvec: Option<i32>,
        names: Option<&str>,
        with_data: bool,
        active: bool,
    ) {
        sink.start_block(BLOCK_PROJ_ITEM);
        if let Some((tag, desc)) = desc_tag {
            sink.put_text(tag, desc);
        }
        if let Some(n) = nchan {
            sink.put_int(TAG_NCHAN, n);
        }
        if let Some(k) = kind {
            sink.put_int(TAG_PROJ_ITEM_KIND, k);
        }
        if let Some(n) = nvec {
            sink.put_int(TAG_PROJ_ITEM_NVEC, n);
        }
        if let Some(list) = names {
            sink.put_text(TAG_PROJ_ITEM_CH_NAME_LIST, list);
        }
        if with_data {
            sink.put_matrix(TAG_PROJ_ITEM_VECTORS, &dmatrix![0.5, -0.5]);
        }
        if active {
            sink.put_int(TAG_PROJ_ITEM_ACTIVE, 1);
        }
        sink.end_block(BLOCK_PROJ_ITEM);
    }

    fn full_item(sink: &mut TreeBuilder, active: bool) {
        item_block(
            sink,
            Some((TAG_DESCRIPTION, "ECG-1")),
            Some(2),
            Some(1),
            Some(1),
            Some("MEG 001:MEG 002"),
            true,
            active,
        );
    }

    #[test]
    fn absent_block_reads_as_empty() {
        let sink = TreeBuilder::new();
        let tree = sink.finish();
        assert_eq!(read_proj(&tree).unwrap(), Vec::new());
    }

    #[test]
    fn reads_complete_item() {
        let mut sink = TreeBuilder::new();
        sink.start_block(BLOCK_PROJ);
        full_item(&mut sink, true);
        sink.end_block(BLOCK_PROJ);
        let items = read_proj(&sink.finish()).unwrap();

        assert_eq!(items.len(), 1);
        let item = &items[0];
        assert_eq!(item.description, "ECG-1");
        assert_eq!(item.kind, ItemKind::Field);
        assert!(item.active);
        assert_eq!(
            item.matrix.col_names(),
            &["MEG 001".to_string(), "MEG 002".to_string()]
        );
        assert_eq!(item.matrix.row_count(), 1);
    }

    #[test]
    fn absent_active_marker_means_idle() {
        let mut sink = TreeBuilder::new();
        sink.start_block(BLOCK_PROJ);
        full_item(&mut sink, false);
        sink.end_block(BLOCK_PROJ);
        let items = read_proj(&sink.finish()).unwrap();
        assert!(!items[0].active);
    }

    #[test]
    fn description_falls_back_to_name_tag() {
        let mut sink = TreeBuilder::new();
        sink.start_block(BLOCK_PROJ);
        item_block(
            &mut sink,
            Some((TAG_NAME, "EOG-plane")),
            Some(2),
            Some(2),
            Some(1),
            Some("EEG 001:EEG 002"),
            true,
            false,
        );
        sink.end_block(BLOCK_PROJ);
        let items = read_proj(&sink.finish()).unwrap();
        assert_eq!(items[0].description, "EOG-plane");
        assert_eq!(items[0].kind, ItemKind::DipoleFixed);
    }

    #[test]
    fn missing_description_fails() {
        let mut sink = TreeBuilder::new();
        sink.start_block(BLOCK_PROJ);
        item_block(
            &mut sink,
            None,
            Some(2),
            Some(1),
            Some(1),
            Some("A:B"),
            true,
            false,
        );
        sink.end_block(BLOCK_PROJ);
        assert_eq!(
            read_proj(&sink.finish()).unwrap_err(),
            ProjReadError::MissingField {
                field: "description",
                item: 0
            }
        );
    }

    #[test]
    fn item_nchan_defaults_to_block_level() {
        let mut sink = TreeBuilder::new();
        sink.start_block(BLOCK_PROJ);
        sink.put_int(TAG_NCHAN, 2);
        item_block(
            &mut sink,
            Some((TAG_DESCRIPTION, "x")),
            None,
            Some(1),
            Some(1),
            Some("A:B"),
            true,
            false,
        );
        sink.end_block(BLOCK_PROJ);
        assert!(read_proj(&sink.finish()).is_ok());
    }

    #[test]
    fn missing_nchan_everywhere_fails() {
        let mut sink = TreeBuilder::new();
        sink.start_block(BLOCK_PROJ);
        item_block(
            &mut sink,
            Some((TAG_DESCRIPTION, "x")),
            None,
            Some(1),
            Some(1),
            Some("A:B"),
            true,
            false,
        );
        sink.end_block(BLOCK_PROJ);
        assert_eq!(
            read_proj(&sink.finish()).unwrap_err(),
            ProjReadError::MissingField {
                field: "nchan",
                item: 0
            }
        );
    }

    #[test]
    fn missing_required_fields_fail_in_order() {
        for (field, kind, nvec, names, data) in [
            ("kind", None, Some(1), Some("A:B"), true),
            ("vector_count", Some(1), None, Some("A:B"), true),
            ("channel_names", Some(1), Some(1), None, true),
            ("data", Some(1), Some(1), Some("A:B"), false),
        ] {
            let mut sink = TreeBuilder::new();
            sink.start_block(BLOCK_PROJ);
            item_block(
                &mut sink,
                Some((TAG_DESCRIPTION, "x")),
                Some(2),
                kind,
                nvec,
                names,
                data,
                false,
            );
            sink.end_block(BLOCK_PROJ);
            assert_eq!(
                read_proj(&sink.finish()).unwrap_err(),
                ProjReadError::MissingField { field, item: 0 }
            );
        }
    }

    #[test]
    fn shape_mismatch_is_rejected() {
        let mut sink = TreeBuilder::new();
        sink.start_block(BLOCK_PROJ);
        item_block(
            &mut sink,
            Some((TAG_DESCRIPTION, "x")),
            Some(3),
            Some(1),
            Some(1),
            Some("A:B:C"), // three names, two data columns
            true,
            false,
        );
        sink.end_block(BLOCK_PROJ);
        assert_eq!(
            read_proj(&sink.finish()).unwrap_err(),
            ProjReadError::ShapeMismatch {
                item: 0,
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn wrong_payload_type_reads_as_missing() {
        let mut sink = TreeBuilder::new();
        sink.start_block(BLOCK_PROJ);
        sink.start_block(BLOCK_PROJ_ITEM);
        sink.put_text(TAG_DESCRIPTION, "x");
        sink.put_int(TAG_NCHAN, 2);
        // kind carried as text instead of an integer
        sink.put_text(TAG_PROJ_ITEM_KIND, "1");
        sink.end_block(BLOCK_PROJ_ITEM);
        sink.end_block(BLOCK_PROJ);
        assert_eq!(
            read_proj(&sink.finish()).unwrap_err(),
            ProjReadError::MissingField {
                field: "kind",
                item: 0
            }
        );
    }

    #[test]
    fn items_keep_persistence_order() {
        let mut sink = TreeBuilder::new();
        sink.start_block(BLOCK_PROJ);
        item_block(
            &mut sink,
            Some((TAG_DESCRIPTION, "first")),
            Some(2),
            Some(1),
            Some(1),
            Some("A:B"),
            true,
            true,
        );
        item_block(
            &mut sink,
            Some((TAG_DESCRIPTION, "second")),
            Some(2),
            Some(1),
            Some(1),
            Some("A:B"),
            true,
            false,
        );
        sink.end_block(BLOCK_PROJ);
        let items = read_proj(&sink.finish()).unwrap();
        assert_eq!(items[0].description, "first");
        assert_eq!(items[1].description, "second");
    }

    #[test]
    fn active_marker_value_is_irrelevant() {
        // Presence alone decides; even a zero payload marks the item active.
        let mut sink = TreeBuilder::new();
        sink.start_block(BLOCK_PROJ);
        sink.start_block(BLOCK_PROJ_ITEM);
        sink.put_text(TAG_DESCRIPTION, "x");
        sink.put_int(TAG_NCHAN, 2);
        sink.put_int(TAG_PROJ_ITEM_KIND, 1);
        sink.put_int(TAG_PROJ_ITEM_NVEC, 1);
        sink.put_text(TAG_PROJ_ITEM_CH_NAME_LIST, "A:B");
        sink.put_matrix(TAG_PROJ_ITEM_VECTORS, &dmatrix![1.0, 0.0]);
        sink.put_int(TAG_PROJ_ITEM_ACTIVE, 0);
        sink.end_block(BLOCK_PROJ_ITEM);
        sink.end_block(BLOCK_PROJ);
        let items = read_proj(&sink.finish()).unwrap();
        assert!(items[0].active);
    }

    #[test]
    fn matrix_tag_with_names_is_accepted() {
        let mut sink = TreeBuilder::new();
        sink.start_block(BLOCK_PROJ);
        full_item(&mut sink, true);
        sink.end_block(BLOCK_PROJ);
        let mut tree = sink.finish();
        // Decorate the data tag with a row-name list; the reader ignores it.
        if let Some(TagValue::Matrix(m)) = tree.children[0].children[0]
            .tags
            .iter_mut()
            .find(|t| t.kind == TAG_PROJ_ITEM_VECTORS)
            .map(|t| &mut t.value)
        {
            m.row_names = Some(vec!["v1".into()]);
        }
        assert!(read_proj(&tree).is_ok());
    }
}

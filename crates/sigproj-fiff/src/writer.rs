//! Writing projection items back into tagged-block form.

use crate::constants::*;
use crate::item::{ItemKind, ProjectionItem};
use crate::tree::TreeSink;

/// Serialize `items`, in list order, into the projection-block shape
/// [`crate::read_proj`] expects.
///
/// The active marker is emitted only for active items: the reader derives
/// the flag from the marker's presence, so writing it unconditionally would
/// resurrect idle items as active on the next read.
pub fn write_proj<S: TreeSink>(sink: &mut S, items: &[ProjectionItem]) {
    sink.start_block(BLOCK_PROJ);

    for item in items {
        sink.start_block(BLOCK_PROJ_ITEM);
        sink.put_text(TAG_NAME, &item.description);
        sink.put_int(TAG_PROJ_ITEM_KIND, item.kind.code());
        if item.kind == ItemKind::Field {
            sink.put_float(TAG_PROJ_ITEM_TIME, 0.0);
        }
        sink.put_int(TAG_NCHAN, item.matrix.col_count() as i32);
        sink.put_int(TAG_PROJ_ITEM_NVEC, item.matrix.row_count() as i32);
        if item.active {
            sink.put_int(TAG_PROJ_ITEM_ACTIVE, 1);
        }
        sink.put_name_list(TAG_PROJ_ITEM_CH_NAME_LIST, item.matrix.col_names());
        sink.put_matrix(TAG_PROJ_ITEM_VECTORS, item.matrix.data());
        sink.end_block(BLOCK_PROJ_ITEM);
    }

    sink.end_block(BLOCK_PROJ);
}

//! Wire codes for the projection block.
//!
//! Block and tag numbers follow the FIF numbering the records were originally
//! persisted with, so trees produced here stay interoperable with existing
//! container files.

/// Block holding all projection items.
pub const BLOCK_PROJ: i32 = 313;
/// Sub-block holding one projection item.
pub const BLOCK_PROJ_ITEM: i32 = 314;

/// Channel count; at block level it is the global default for all items.
pub const TAG_NCHAN: i32 = 200;
/// Free-form item description.
pub const TAG_DESCRIPTION: i32 = 206;
/// Item name; fallback source for the description.
pub const TAG_NAME: i32 = 233;

/// Item kind code (see [`crate::ItemKind`]).
pub const TAG_PROJ_ITEM_KIND: i32 = 3411;
/// Time point of a field-type item; always written as zero.
pub const TAG_PROJ_ITEM_TIME: i32 = 3412;
/// Number of projection vectors in the item.
pub const TAG_PROJ_ITEM_NVEC: i32 = 3414;
/// The projection vectors, one row per vector.
pub const TAG_PROJ_ITEM_VECTORS: i32 = 3415;
/// Colon-delimited channel name list.
pub const TAG_PROJ_ITEM_CH_NAME_LIST: i32 = 3417;
/// Marker tag; its presence means the item is active.
pub const TAG_PROJ_ITEM_ACTIVE: i32 = 3523;

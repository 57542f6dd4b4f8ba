mod arena;
mod handle;
mod node;
mod raw_avl_tree;
mod raw_cursor;

pub(crate) use handle::Handle;
pub(crate) use raw_avl_tree::{InsertResult, RawAvlTree};
pub(crate) use raw_cursor::RawCursor;

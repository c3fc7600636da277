//! In-memory tagged-tree surface.
//!
//! The projection block lives inside a tagged hierarchical container; the
//! reader only needs to locate blocks and read typed tag payloads, and the
//! writer only needs a handful of emit primitives. `TreeNode` and `TreeSink`
//! are that surface, and `TreeBuilder` is an in-memory sink producing a
//! `TreeNode`, which lets the reader/writer pair round-trip without touching
//! a container file.

use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

/// Matrix payload of a tag: data plus optional row/column name lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixTag {
    pub row_names: Option<Vec<String>>,
    pub col_names: Option<Vec<String>>,
    pub data: DMatrix<f64>,
}

/// Typed payload of a single tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    Int(i32),
    Float(f64),
    Text(String),
    Matrix(MatrixTag),
}

/// One tag: a wire code plus its payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub kind: i32,
    pub value: TagValue,
}

/// A block node: tags plus nested sub-blocks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    pub block: i32,
    pub tags: Vec<Tag>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new(block: i32) -> Self {
        Self {
            block,
            tags: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn add_tag(&mut self, kind: i32, value: TagValue) {
        self.tags.push(Tag { kind, value });
    }

    /// Collect all blocks of the given kind, depth first, including this node.
    pub fn find_blocks(&self, block: i32) -> Vec<&TreeNode> {
        let mut found = Vec::new();
        self.collect_blocks(block, &mut found);
        found
    }

    fn collect_blocks<'a>(&'a self, block: i32, found: &mut Vec<&'a TreeNode>) {
        if self.block == block {
            found.push(self);
        }
        for child in &self.children {
            child.collect_blocks(block, found);
        }
    }

    /// First tag of the given kind on this node, if any.
    pub fn find_tag(&self, kind: i32) -> Option<&TagValue> {
        self.tags.iter().find(|t| t.kind == kind).map(|t| &t.value)
    }

    /// Integer payload of a tag; a tag of another payload type reads as absent.
    pub fn tag_int(&self, kind: i32) -> Option<i32> {
        match self.find_tag(kind) {
            Some(TagValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    /// Text payload of a tag.
    pub fn tag_text(&self, kind: i32) -> Option<&str> {
        match self.find_tag(kind) {
            Some(TagValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Matrix payload of a tag.
    pub fn tag_matrix(&self, kind: i32) -> Option<&MatrixTag> {
        match self.find_tag(kind) {
            Some(TagValue::Matrix(m)) => Some(m),
            _ => None,
        }
    }
}

/// Write primitives consumed by [`crate::write_proj`].
///
/// Every emitted field sits between an explicit `start_block`/`end_block`
/// pair keyed by the block-kind code.
pub trait TreeSink {
    fn start_block(&mut self, block: i32);
    fn end_block(&mut self, block: i32);
    fn put_int(&mut self, kind: i32, value: i32);
    fn put_float(&mut self, kind: i32, value: f64);
    fn put_text(&mut self, kind: i32, value: &str);
    /// Name lists travel as a single colon-joined text payload.
    fn put_name_list(&mut self, kind: i32, names: &[String]);
    fn put_matrix(&mut self, kind: i32, data: &DMatrix<f64>);
}

/// In-memory [`TreeSink`] building a [`TreeNode`].
#[derive(Debug)]
pub struct TreeBuilder {
    /// Open blocks, outermost first; index 0 is the synthetic root.
    stack: Vec<TreeNode>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            stack: vec![TreeNode::new(ROOT_BLOCK)],
        }
    }

    /// Finish building and return the root node.
    ///
    /// Unbalanced `start_block`/`end_block` calls leave blocks open; they are
    /// attached to their parents as-is.
    pub fn finish(mut self) -> TreeNode {
        while self.stack.len() > 1 {
            let open = self.stack.pop().unwrap_or_else(|| TreeNode::new(ROOT_BLOCK));
            if let Some(parent) = self.stack.last_mut() {
                parent.children.push(open);
            }
        }
        self.stack.pop().unwrap_or_else(|| TreeNode::new(ROOT_BLOCK))
    }

    fn current(&mut self) -> &mut TreeNode {
        // The stack always holds at least the root.
        self.stack.last_mut().expect("tree builder stack is never empty")
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Block code of the synthetic root node a [`TreeBuilder`] starts from.
const ROOT_BLOCK: i32 = 999;

impl TreeSink for TreeBuilder {
    fn start_block(&mut self, block: i32) {
        self.stack.push(TreeNode::new(block));
    }

    fn end_block(&mut self, block: i32) {
        if self.stack.len() < 2 {
            return;
        }
        if self.stack.last().map(|n| n.block) != Some(block) {
            return;
        }
        let done = match self.stack.pop() {
            Some(node) => node,
            None => return,
        };
        self.current().children.push(done);
    }

    fn put_int(&mut self, kind: i32, value: i32) {
        self.current().add_tag(kind, TagValue::Int(value));
    }

    fn put_float(&mut self, kind: i32, value: f64) {
        self.current().add_tag(kind, TagValue::Float(value));
    }

    fn put_text(&mut self, kind: i32, value: &str) {
        self.current().add_tag(kind, TagValue::Text(value.to_owned()));
    }

    fn put_name_list(&mut self, kind: i32, names: &[String]) {
        self.current().add_tag(kind, TagValue::Text(names.join(":")));
    }

    fn put_matrix(&mut self, kind: i32, data: &DMatrix<f64>) {
        self.current().add_tag(
            kind,
            TagValue::Matrix(MatrixTag {
                row_names: None,
                col_names: None,
                data: data.clone(),
            }),
        );
    }
}

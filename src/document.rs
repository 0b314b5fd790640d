//! The page document the engine reads and patches.
//!
//! The engine never holds on to elements between passes: every apply
//! re-queries the document, so the trait only needs lookups by selector and a
//! handful of mutations.

pub mod memory;
pub mod selector;

pub use memory::MemoryDocument;
pub use selector::{
    AttributeFilter,
    Selector,
};

/// Handle to an element, valid until the element is removed. A later insert
/// may reuse the id of a removed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// Mutable view of a page document.
pub trait Document {
    /// All live elements matching `selector`, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<NodeId>;

    /// First element matching `selector`.
    fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str);

    fn text(&self, node: NodeId) -> Option<String>;

    /// Replace the text content of an element.
    fn set_text(&mut self, node: NodeId, text: &str);

    /// Set the current value of a form control.
    fn set_value(&mut self, node: NodeId, value: &str);

    /// Create an element with the given attributes at the end of `<head>`.
    fn append_to_head(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId;

    fn remove(&mut self, node: NodeId);

    fn title(&self) -> Option<String>;

    fn set_title(&mut self, title: &str);

    /// `lang` attribute of the root element.
    fn language(&self) -> Option<String>;

    fn set_language(&mut self, code: &str);
}

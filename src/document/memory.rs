//! In-memory document used by the CLI and tests.

use std::fmt::Write as _;

use super::{
    Document,
    NodeId,
    Selector,
};

/// Elements without closing tags.
const VOID_ELEMENTS: &[&str] = &["meta", "link", "br", "hr", "img", "input"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Head,
    Body,
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    value: Option<String>,
    section: Section,
}

impl Element {
    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.iter().find(|(key, _)| key == name).map(|(_, value)| value.as_str())
    }
}

/// Flat list of `<head>` and `<body>` children.
///
/// Nesting is not modelled; the engine only ever addresses elements by
/// selector.
///
/// Elements live in slots. A removed element frees its slot for the next
/// insert, so storage is bounded by the largest number of live elements
/// rather than by the number of applies. A [`NodeId`] therefore stays valid
/// only until its element is removed; afterwards it may name a newer element.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocument {
    slots: Vec<Option<Element>>,
    free: Vec<usize>,
    /// Slot indices of `<head>` children in document order.
    head: Vec<usize>,
    /// Slot indices of `<body>` children in document order.
    body: Vec<usize>,
    language: Option<String>,
    title: Option<String>,
}

impl MemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(title.to_string());
        self
    }

    pub fn push_head(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        self.push(Section::Head, tag, attributes, "")
    }

    pub fn push_body(&mut self, tag: &str, attributes: &[(&str, &str)], text: &str) -> NodeId {
        self.push(Section::Body, tag, attributes, text)
    }

    fn push(
        &mut self,
        section: Section,
        tag: &str,
        attributes: &[(&str, &str)],
        text: &str,
    ) -> NodeId {
        let element = Element {
            tag: tag.to_ascii_lowercase(),
            attributes: attributes
                .iter()
                .map(|(name, value)| ((*name).to_string(), (*value).to_string()))
                .collect(),
            text: text.to_string(),
            value: None,
            section,
        };

        let index = if let Some(index) = self.free.pop()
            && let Some(slot) = self.slots.get_mut(index)
        {
            *slot = Some(element);
            index
        } else {
            self.slots.push(Some(element));
            self.slots.len() - 1
        };
        self.order_mut(section).push(index);
        NodeId(index)
    }

    const fn order(&self, section: Section) -> &Vec<usize> {
        match section {
            Section::Head => &self.head,
            Section::Body => &self.body,
        }
    }

    const fn order_mut(&mut self, section: Section) -> &mut Vec<usize> {
        match section {
            Section::Head => &mut self.head,
            Section::Body => &mut self.body,
        }
    }

    fn live(&self, node: NodeId) -> Option<&Element> {
        self.slots.get(node.0)?.as_ref()
    }

    fn live_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.slots.get_mut(node.0)?.as_mut()
    }

    /// Live elements of `section` with their ids, in document order.
    fn section_elements(&self, section: Section) -> impl Iterator<Item = (NodeId, &Element)> {
        self.order(section)
            .iter()
            .filter_map(|&index| Some((NodeId(index), self.slots.get(index)?.as_ref()?)))
    }

    /// Current value of a form control set through [`Document::set_value`].
    #[must_use]
    pub fn value(&self, node: NodeId) -> Option<String> {
        self.live(node).and_then(|element| element.value.clone())
    }

    /// Number of live elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.head.len() + self.body.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn render_section(&self, out: &mut String, section: Section) {
        for (_, element) in self.section_elements(section) {
            out.push('<');
            out.push_str(&element.tag);
            for (name, value) in &element.attributes {
                let _ = write!(out, " {name}=\"{}\"", escape_attribute(value));
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&element.tag.as_str()) {
                out.push('\n');
                continue;
            }
            if element.tag == "script" {
                out.push_str(&element.text.replace("</", "<\\/"));
            } else {
                out.push_str(&escape_text(&element.text));
            }
            let _ = writeln!(out, "</{}>", element.tag);
        }
    }

    /// Serialize as an HTML page.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        match &self.language {
            Some(language) => {
                let _ = writeln!(out, "<html lang=\"{}\">", escape_attribute(language));
            }
            None => out.push_str("<html>\n"),
        }
        out.push_str("<head>\n");
        if let Some(title) = &self.title {
            let _ = writeln!(out, "<title>{}</title>", escape_text(title));
        }
        self.render_section(&mut out, Section::Head);
        out.push_str("</head>\n<body>\n");
        self.render_section(&mut out, Section::Body);
        out.push_str("</body>\n</html>\n");
        out
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

impl Document for MemoryDocument {
    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        [Section::Head, Section::Body]
            .into_iter()
            .flat_map(|section| self.section_elements(section))
            .filter(|(_, element)| selector.matches(&element.tag, |name| element.attribute(name)))
            .map(|(node, _)| node)
            .collect()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.live(node)?.attribute(name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(element) = self.live_mut(node) else {
            return;
        };
        match element.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => value.clone_into(existing),
            None => element.attributes.push((name.to_string(), value.to_string())),
        }
    }

    fn text(&self, node: NodeId) -> Option<String> {
        self.live(node).map(|element| element.text.clone())
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        if let Some(element) = self.live_mut(node) {
            text.clone_into(&mut element.text);
        }
    }

    fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(element) = self.live_mut(node) {
            element.value = Some(value.to_string());
        }
    }

    fn append_to_head(&mut self, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        self.push_head(tag, attributes)
    }

    fn remove(&mut self, node: NodeId) {
        let Some(element) = self.slots.get_mut(node.0).and_then(Option::take) else {
            return;
        };
        self.order_mut(element.section).retain(|&index| index != node.0);
        self.free.push(node.0);
    }

    fn title(&self) -> Option<String> {
        self.title.clone()
    }

    fn set_title(&mut self, title: &str) {
        self.title = Some(title.to_string());
    }

    fn language(&self) -> Option<String> {
        self.language.clone()
    }

    fn set_language(&mut self, code: &str) {
        self.language = Some(code.to_string());
    }
}

#[cfg(test)]
impl MemoryDocument {
    /// Slots allocated so far, live or free.
    const fn stored(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::expect_used, clippy::panic)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;

    #[rstest]
    fn query_all_returns_head_before_body() {
        let mut document = MemoryDocument::new();
        let body = document.push_body("h1", &[("data-lang-key", "nav.title")], "Hello");
        let head = document.push_head("meta", &[("data-lang-key", "meta.x")]);

        let found = document.query_all(&Selector::any().with_attribute("data-lang-key"));

        assert_eq!(found, vec![head, body]);
    }

    #[rstest]
    fn removed_elements_are_invisible() {
        let mut document = MemoryDocument::new();
        let link = document.push_head("link", &[("rel", "alternate"), ("hreflang", "en")]);

        document.remove(link);

        assert_that!(document.query_all(&Selector::tag("link")), len(eq(0)));
        assert_that!(document.attribute(link, "rel"), none());
        assert_that!(document.is_empty(), eq(true));
    }

    #[rstest]
    fn repeated_replacement_reuses_freed_slots() {
        let mut document = MemoryDocument::new();
        document.push_head("meta", &[("charset", "utf-8")]);
        let heading = document.push_body("h1", &[], "Hello");

        for _ in 0..100 {
            for link in document.query_all(&Selector::tag("link")) {
                document.remove(link);
            }
            for hreflang in ["en", "tr", "x-default"] {
                document.append_to_head("link", &[("rel", "alternate"), ("hreflang", hreflang)]);
            }
        }

        assert_that!(document.len(), eq(5));
        assert_that!(document.stored(), eq(5));
        assert_that!(document.text(heading), some(eq("Hello")));
        let order: Vec<Option<String>> = document
            .query_all(&Selector::tag("link"))
            .into_iter()
            .map(|node| document.attribute(node, "hreflang"))
            .collect();
        assert_eq!(
            order,
            vec![Some("en".to_string()), Some("tr".to_string()), Some("x-default".to_string())]
        );
    }

    #[rstest]
    fn reused_slot_keeps_document_order() {
        let mut document = MemoryDocument::new();
        let first = document.push_head("meta", &[("name", "a")]);
        document.push_head("meta", &[("name", "b")]);

        document.remove(first);
        let reused = document.append_to_head("meta", &[("name", "c")]);

        assert_that!(reused, eq(first));
        let names: Vec<Option<String>> = document
            .query_all(&Selector::tag("meta"))
            .into_iter()
            .map(|node| document.attribute(node, "name"))
            .collect();
        assert_eq!(names, vec![Some("b".to_string()), Some("c".to_string())]);
        assert_that!(
            document.to_html(),
            contains_substring("<meta name=\"b\">\n<meta name=\"c\">\n")
        );
    }

    #[rstest]
    fn set_attribute_updates_or_adds() {
        let mut document = MemoryDocument::new();
        let meta = document.push_head("meta", &[("name", "description"), ("content", "old")]);

        document.set_attribute(meta, "content", "new");
        document.set_attribute(meta, "data-x", "1");

        assert_that!(document.attribute(meta, "content"), some(eq("new")));
        assert_that!(document.attribute(meta, "data-x"), some(eq("1")));
    }

    #[rstest]
    fn to_html_escapes_and_closes_tags() {
        let mut document = MemoryDocument::new().with_title("A & B");
        document.set_language("tr");
        document.push_head("meta", &[("name", "description"), ("content", "\"quoted\"")]);
        let script = document.push_head("script", &[("type", "application/ld+json")]);
        document.set_text(script, r#"{"a":"</script>"}"#);
        document.push_body("p", &[], "1 < 2");

        let html = document.to_html();

        assert_that!(html, contains_substring("<html lang=\"tr\">"));
        assert_that!(html, contains_substring("<title>A &amp; B</title>"));
        assert_that!(
            html,
            contains_substring("<meta name=\"description\" content=\"&quot;quoted&quot;\">\n")
        );
        assert_that!(html, contains_substring(r#"{"a":"<\/script>"}</script>"#));
        assert_that!(html, contains_substring("<p>1 &lt; 2</p>"));
    }
}

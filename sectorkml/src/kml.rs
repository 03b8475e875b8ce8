//! Minimal typed KML/XML node tree, serialized once at the end of assembly.
//!
//! Building the document as a tree instead of string concatenation keeps
//! escaping in one place: element text and attribute values are escaped on
//! serialization, and CDATA sections are split around `]]>` so user data can
//! never terminate them early.

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Cdata(String),
}

#[derive(Debug, Clone)]
pub struct Element {
    name: &'static str,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: &'static str) -> Self {
        Element {
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    pub fn child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    pub fn cdata(mut self, data: impl Into<String>) -> Self {
        self.children.push(Node::Cdata(data.into()));
        self
    }

    /// Shorthand for a leaf element wrapping a single text node.
    pub fn leaf(name: &'static str, text: impl Into<String>) -> Self {
        Element::new(name).text(text)
    }

    /// Serialize the whole document: XML declaration plus this element.
    pub fn into_document(self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.write(&mut out, 0);
        out
    }

    fn write(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        out.push_str(&pad);
        out.push('<');
        out.push_str(self.name);
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }

        if self.children.is_empty() {
            out.push_str("/>\n");
            return;
        }

        let inline = self
            .children
            .iter()
            .all(|c| !matches!(c, Node::Element(_)));

        out.push('>');
        if inline {
            for child in &self.children {
                match child {
                    Node::Text(t) => out.push_str(&escape_text(t)),
                    Node::Cdata(d) => write_cdata(out, d),
                    Node::Element(_) => unreachable!(),
                }
            }
        } else {
            out.push('\n');
            for child in &self.children {
                match child {
                    Node::Element(e) => e.write(out, depth + 1),
                    Node::Text(t) => {
                        out.push_str(&"  ".repeat(depth + 1));
                        out.push_str(&escape_text(t));
                        out.push('\n');
                    }
                    Node::Cdata(d) => {
                        out.push_str(&"  ".repeat(depth + 1));
                        write_cdata(out, d);
                        out.push('\n');
                    }
                }
            }
            out.push_str(&pad);
        }
        out.push_str("</");
        out.push_str(self.name);
        out.push_str(">\n");
    }
}

pub fn escape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

fn write_cdata(out: &mut String, data: &str) {
    out.push_str("<![CDATA[");
    // A literal "]]>" inside the payload would close the section; split it
    // across two sections instead.
    out.push_str(&data.replace("]]>", "]]]]><![CDATA[>"));
    out.push_str("]]>");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_elements_serialize_inline() {
        let doc = Element::leaf("name", "Site A").into_document();
        assert!(doc.contains("<name>Site A</name>"), "got: {doc}");
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    }

    #[test]
    fn nested_elements_are_indented() {
        let doc = Element::new("kml")
            .child(Element::new("Document").child(Element::leaf("name", "x")))
            .into_document();
        assert!(doc.contains("<kml>\n  <Document>\n    <name>x</name>\n  </Document>\n</kml>"), "got: {doc}");
    }

    #[test]
    fn empty_element_self_closes() {
        let doc = Element::new("Point").into_document();
        assert!(doc.contains("<Point/>"));
    }

    #[test]
    fn text_is_escaped() {
        let doc = Element::leaf("name", "A & B <Ltd>").into_document();
        assert!(doc.contains("<name>A &amp; B &lt;Ltd&gt;</name>"), "got: {doc}");
    }

    #[test]
    fn attributes_are_escaped() {
        let doc = Element::new("Style").attr("id", "a\"b&c").into_document();
        assert!(doc.contains("id=\"a&quot;b&amp;c\""), "got: {doc}");
    }

    #[test]
    fn cdata_payload_cannot_close_the_section() {
        let doc = Element::new("description")
            .cdata("before ]]> after")
            .into_document();
        assert!(doc.contains("<![CDATA[before ]]]]><![CDATA[> after]]>"), "got: {doc}");
    }
}

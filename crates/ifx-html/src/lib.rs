//! HTML tokenization and tree construction.

use ifx_dom::Document;
use ifx_dom::NodeId;

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Parses raw HTML into a DOM document.
///
/// Tolerant by design: unknown constructs are skipped, mismatched end tags
/// are ignored, and fragments without an `<html>` wrapper parse under an
/// implicit root element.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> Document {
        let mut doc = Document::new();
        let root = doc.create_element("html");
        doc.set_root(root);

        let bytes = input.as_bytes();
        let mut open_stack: Vec<(String, NodeId)> = vec![("html".to_owned(), root)];
        let mut idx = 0_usize;

        while idx < bytes.len() {
            if bytes[idx] != b'<' {
                let next = find_byte(bytes, idx, b'<').unwrap_or(bytes.len());
                let segment = &input[idx..next];
                if !segment.trim().is_empty() {
                    let parent = current_parent(&open_stack, root);
                    let text = doc.create_text(segment);
                    doc.append_child(parent, text);
                }
                idx = next;
                continue;
            }

            if starts_with(bytes, idx, b"<!--") {
                idx = skip_comment(bytes, idx);
                continue;
            }

            if starts_with(bytes, idx, b"<!") {
                idx = skip_to_gt(bytes, idx.saturating_add(2));
                continue;
            }

            if starts_with(bytes, idx, b"<?") {
                idx = skip_processing_instruction(bytes, idx);
                continue;
            }

            let Some((tag, next_idx)) = parse_tag(input, idx) else {
                idx = idx.saturating_add(1);
                continue;
            };

            if tag.is_end {
                close_open_tag(&mut open_stack, &tag.name);
                idx = next_idx;
                continue;
            }

            if tag.name == "html" {
                // Fold duplicate document roots onto the implicit one.
                for (name, value) in &tag.attributes {
                    doc.set_attribute(root, name, value);
                }
                idx = next_idx;
                continue;
            }

            let parent = current_parent(&open_stack, root);
            let element = doc.create_element(&tag.name);
            for (name, value) in &tag.attributes {
                doc.set_attribute(element, name, value);
            }
            doc.append_child(parent, element);

            if !tag.self_closing && (tag.name == "script" || tag.name == "style") {
                // Raw text is irrelevant to element resolution; skip it whole.
                let (_, after_raw) = read_raw_text_until_end_tag(input, next_idx, &tag.name);
                idx = after_raw;
                continue;
            }

            if tag.name == "title" || tag.name == "textarea" {
                let (raw, after_raw) = read_raw_text_until_end_tag(input, next_idx, &tag.name);
                if !raw.trim().is_empty() {
                    let text = doc.create_text(raw);
                    doc.append_child(element, text);
                }
                idx = after_raw;
                continue;
            }

            if !tag.self_closing && !VOID_TAGS.contains(&tag.name.as_str()) {
                open_stack.push((tag.name.clone(), element));
            }

            idx = next_idx;
        }

        doc
    }
}

fn current_parent(open_stack: &[(String, NodeId)], root: NodeId) -> NodeId {
    open_stack.last().map(|(_, id)| *id).unwrap_or(root)
}

fn close_open_tag(open_stack: &mut Vec<(String, NodeId)>, name: &str) {
    // Never pop the implicit root at the bottom of the stack.
    let Some(position) = open_stack
        .iter()
        .skip(1)
        .rposition(|(open_name, _)| open_name == name)
    else {
        return;
    };

    open_stack.truncate(position.saturating_add(1));
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ParsedTag {
    name: String,
    attributes: Vec<(String, String)>,
    is_end: bool,
    self_closing: bool,
}

fn parse_tag(input: &str, start: usize) -> Option<(ParsedTag, usize)> {
    let bytes = input.as_bytes();
    if bytes.get(start).copied() != Some(b'<') {
        return None;
    }

    let mut idx = start.saturating_add(1);
    let mut is_end = false;
    if bytes.get(idx).copied() == Some(b'/') {
        is_end = true;
        idx = idx.saturating_add(1);
    }

    idx = skip_spaces(bytes, idx);
    let name_start = idx;
    while idx < bytes.len() && is_tag_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }

    if idx == name_start {
        return None;
    }

    let name = input[name_start..idx].to_ascii_lowercase();
    let mut attributes = Vec::new();
    let mut self_closing = false;

    loop {
        idx = skip_spaces(bytes, idx);
        match bytes.get(idx).copied() {
            None => return None,
            Some(b'>') => {
                return Some((
                    ParsedTag {
                        name,
                        attributes,
                        is_end,
                        self_closing,
                    },
                    idx.saturating_add(1),
                ));
            }
            Some(b'/') => {
                self_closing = true;
                idx = idx.saturating_add(1);
            }
            Some(_) => {
                let Some((attribute, next_idx)) = parse_attribute(input, idx) else {
                    idx = idx.saturating_add(1);
                    continue;
                };
                attributes.push(attribute);
                idx = next_idx;
            }
        }
    }
}

fn parse_attribute(input: &str, start: usize) -> Option<((String, String), usize)> {
    let bytes = input.as_bytes();
    let mut idx = start;

    let name_start = idx;
    while idx < bytes.len() && is_attribute_name_char(bytes[idx]) {
        idx = idx.saturating_add(1);
    }
    if idx == name_start {
        return None;
    }

    let name = input[name_start..idx].to_ascii_lowercase();
    let after_name = skip_spaces(bytes, idx);
    if bytes.get(after_name).copied() != Some(b'=') {
        return Some(((name, String::new()), idx));
    }

    idx = skip_spaces(bytes, after_name.saturating_add(1));
    match bytes.get(idx).copied() {
        Some(quote @ (b'"' | b'\'')) => {
            let value_start = idx.saturating_add(1);
            let value_end = find_byte(bytes, value_start, quote).unwrap_or(bytes.len());
            let value = input[value_start..value_end].to_owned();
            Some(((name, value), value_end.saturating_add(1)))
        }
        Some(_) => {
            let value_start = idx;
            while idx < bytes.len() && !bytes[idx].is_ascii_whitespace() && bytes[idx] != b'>' {
                idx = idx.saturating_add(1);
            }
            Some(((name, input[value_start..idx].to_owned()), idx))
        }
        None => Some(((name, String::new()), idx)),
    }
}

fn read_raw_text_until_end_tag<'a>(
    input: &'a str,
    start: usize,
    tag_name: &str,
) -> (&'a str, usize) {
    let bytes = input.as_bytes();
    let tag_bytes = tag_name.as_bytes();
    let mut idx = start;

    while idx < bytes.len() {
        if bytes[idx] == b'<'
            && bytes.get(idx.saturating_add(1)).copied() == Some(b'/')
            && starts_with_ignore_ascii_case(bytes, idx.saturating_add(2), tag_bytes)
            && tag_name_boundary(bytes, idx.saturating_add(2 + tag_bytes.len()))
        {
            let end_idx = skip_to_gt(bytes, idx);
            return (&input[start..idx], end_idx);
        }

        idx = idx.saturating_add(1);
    }

    (&input[start..], bytes.len())
}

fn skip_comment(bytes: &[u8], start: usize) -> usize {
    find_subslice(bytes, start.saturating_add(4), b"-->")
        .map(|end| end.saturating_add(3))
        .unwrap_or(bytes.len())
}

fn skip_processing_instruction(bytes: &[u8], start: usize) -> usize {
    if let Some(end) = find_subslice(bytes, start.saturating_add(2), b"?>") {
        return end.saturating_add(2);
    }

    skip_to_gt(bytes, start.saturating_add(2))
}

fn skip_to_gt(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() {
        if bytes[idx] == b'>' {
            return idx.saturating_add(1);
        }
        idx = idx.saturating_add(1);
    }

    bytes.len()
}

fn tag_name_boundary(bytes: &[u8], idx: usize) -> bool {
    match bytes.get(idx).copied() {
        None => true,
        Some(byte) => byte.is_ascii_whitespace() || byte == b'>' || byte == b'/',
    }
}

fn skip_spaces(bytes: &[u8], mut idx: usize) -> usize {
    while idx < bytes.len() && bytes[idx].is_ascii_whitespace() {
        idx = idx.saturating_add(1);
    }
    idx
}

fn is_tag_name_char(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':')
}

fn is_attribute_name_char(byte: u8) -> bool {
    !byte.is_ascii_whitespace() && !matches!(byte, b'=' | b'>' | b'/' | b'"' | b'\'')
}

fn starts_with(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    end <= bytes.len() && bytes[idx..end] == *pattern
}

fn starts_with_ignore_ascii_case(bytes: &[u8], idx: usize, pattern: &[u8]) -> bool {
    let end = idx.saturating_add(pattern.len());
    if end > bytes.len() {
        return false;
    }

    bytes[idx..end]
        .iter()
        .zip(pattern.iter())
        .all(|(left, right)| left.eq_ignore_ascii_case(right))
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from >= bytes.len() {
        return None;
    }

    bytes[from..]
        .windows(needle.len())
        .position(|window| window == needle)
        .map(|offset| from + offset)
}

fn find_byte(bytes: &[u8], from: usize, byte: u8) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|candidate| *candidate == byte)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::HtmlParser;

    #[test]
    fn builds_tree_with_attributes() {
        let parser = HtmlParser;
        let doc = parser.parse(
            r#"<body><form id="signup-form" class="card wide">
                 <input type="email" name="email">
                 <input type='password' name=password>
               </form></body>"#,
        );

        let form = doc.element_by_id("signup-form");
        assert!(form.is_some());
        let Some(form) = form else {
            panic!("form not parsed");
        };
        assert!(doc.has_class(form, "wide"));

        let inputs = doc
            .descendant_elements(form)
            .into_iter()
            .filter(|id| doc.tag(*id) == Some("input"))
            .collect::<Vec<_>>();
        assert_eq!(inputs.len(), 2);
        assert_eq!(doc.attribute(inputs[0], "type"), Some("email"));
        assert_eq!(doc.attribute(inputs[1], "name"), Some("password"));
    }

    #[test]
    fn void_elements_do_not_swallow_siblings() {
        let parser = HtmlParser;
        let doc = parser.parse("<div><input type=\"file\"><button id=\"go\">Go</button></div>");

        let Some(button) = doc.element_by_id("go") else {
            panic!("button not parsed");
        };
        let parent = doc.parent(button);
        assert_eq!(parent.and_then(|id| doc.tag(id)), Some("div"));
    }

    #[test]
    fn skips_comments_doctype_and_script_bodies() {
        let parser = HtmlParser;
        let doc = parser.parse(
            "<!DOCTYPE html><!-- note --><body><script>var x = '<div>';</script><p id=\"p\">ok</p></body>",
        );

        assert!(doc.element_by_id("p").is_some());
        let divs = doc
            .elements()
            .into_iter()
            .filter(|id| doc.tag(*id) == Some("div"))
            .count();
        assert_eq!(divs, 0);
    }

    #[test]
    fn tolerates_mismatched_end_tags() {
        let parser = HtmlParser;
        let doc = parser.parse("<section><div>text</span></div></section><p id=\"after\">x</p>");
        assert!(doc.element_by_id("after").is_some());
    }

    #[test]
    fn fragment_without_html_wrapper_gets_implicit_root() {
        let parser = HtmlParser;
        let doc = parser.parse("<form></form><nav></nav>");
        let Some(root) = doc.root() else {
            panic!("missing root");
        };
        assert_eq!(doc.tag(root), Some("html"));
        assert_eq!(doc.descendant_elements(root).len(), 2);
    }

    #[test]
    fn boolean_attributes_parse_with_empty_values() {
        let parser = HtmlParser;
        let doc = parser.parse("<button id=\"b\" disabled>x</button>");
        let Some(button) = doc.element_by_id("b") else {
            panic!("button not parsed");
        };
        assert_eq!(doc.attribute(button, "disabled"), Some(""));
    }
}

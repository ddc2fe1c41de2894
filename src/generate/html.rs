use super::Generator;
use crate::ast::{Element, Pair};
use crate::resolve::ComponentCache;

/// HTML emitter.
///
/// Attributes are always written in the order style, dataset, id, class,
/// props, whatever order the blocks had in source. Content and attribute
/// values are written verbatim (no HTML escaping).
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlGenerator;

impl HtmlGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Render one element (and its subtree) into `out`.
    pub fn render_element(&self, element: &Element, components: &ComponentCache, out: &mut String) {
        // Component usage: the whole node is replaced by the compiled component
        if let Some(html) = components.get(&element.tag_name) {
            out.push_str(html);
            return;
        }

        out.push('<');
        out.push_str(&element.tag_name);
        write_attributes(element, out);
        out.push('>');

        if let Some(content) = element.visible_content() {
            out.push_str(content);
        }

        for child in &element.children {
            self.render_element(child, components, out);
        }

        if element.needs_closing_tag() {
            out.push_str("</");
            out.push_str(&element.tag_name);
            out.push('>');
        }
    }
}

impl Generator for HtmlGenerator {
    /// Top-level elements are joined with a single newline.
    fn generate(&self, elements: &[Element], components: &ComponentCache) -> String {
        elements
            .iter()
            .map(|element| {
                let mut out = String::new();
                self.render_element(element, components, &mut out);
                out
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn write_attributes(element: &Element, out: &mut String) {
    if !element.style.is_empty() {
        let declarations: Vec<String> = element
            .style
            .iter()
            .map(|Pair { key, value }| format!("{}:{}", key, value))
            .collect();
        out.push_str(&format!(" style=\"{}\"", declarations.join(";")));
    }

    for Pair { key, value } in &element.datasets {
        out.push_str(&format!(" data-{}=\"{}\"", key, value));
    }

    if !element.ids.is_empty() {
        out.push_str(&format!(" id=\"{}\"", element.ids.join(" ")));
    }

    if !element.classes.is_empty() {
        out.push_str(&format!(" class=\"{}\"", element.classes.join(" ")));
    }

    for Pair { key, value } in &element.props {
        out.push_str(&format!(" {}=\"{}\"", key, value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn render(source: &str) -> String {
        let doc = parse(source).unwrap();
        HtmlGenerator::new().generate(&doc.elements, &ComponentCache::new())
    }

    #[test]
    fn test_empty_leaf_has_no_closing_tag() {
        assert_eq!(render("div:;"), "<div>");
    }

    #[test]
    fn test_content_closes() {
        assert_eq!(render("div: content:{x};;"), "<div>x</div>");
    }

    #[test]
    fn test_children_are_concatenated() {
        assert_eq!(
            render("ul: li: content:{a}; li: content:{b};;"),
            "<ul><li>a</li><li>b</li></ul>"
        );
    }

    #[test]
    fn test_roots_joined_by_newline() {
        assert_eq!(render("hr:; p: content:{x}; br:;"), "<hr>\n<p>x</p>\n<br>");
    }

    #[test]
    fn test_attribute_order_is_fixed() {
        let html = render(
            "a: props:{href: /x, target: _blank} classes:{btn, big} ids:{go} dataset:{k: v, n: 1} styles:{color: red, margin: 0};",
        );
        assert_eq!(
            html,
            r#"<a style="color:red;margin:0" data-k="v" data-n="1" id="go" class="btn big" href="/x" target="_blank">"#
        );
    }

    #[test]
    fn test_values_are_not_escaped() {
        assert_eq!(
            render(r#"p: props:{title: "a<b"} content:{<b>bold</b>};"#),
            r#"<p title=""a<b""><b>bold</b></p>"#
        );
    }

    #[test]
    fn test_duplicate_props_both_emitted() {
        assert_eq!(render("i: props:{a: 1, a: 2};"), r#"<i a="1" a="2">"#);
    }

    #[test]
    fn test_empty_content_block_is_an_empty_leaf() {
        assert_eq!(render("p: content:{};"), "<p>");
    }

    #[test]
    fn test_component_substitution_discards_usage_attributes() {
        let doc = parse("main: Card: classes:{ignored} content:{ignored}; ;").unwrap();
        let mut components = ComponentCache::new();
        components.insert("Card", "<span>hi</span>");

        let html = HtmlGenerator::new().generate(&doc.elements, &components);
        assert_eq!(html, "<main><span>hi</span></main>");
    }
}

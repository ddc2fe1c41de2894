/// Parsed source file: leading imports, then the element tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub imports: Vec<Import>,
    pub elements: Vec<Element>,
}

/// `import Name from "path";`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Tag name substituted by the compiled component
    pub name: String,
    /// Path relative to the importing file's directory
    pub path: String,
}

/// One `key: value` entry from a props, dataset or styles block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pair {
    pub key: String,
    pub value: String,
}

impl Pair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

/// Markup element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag_name: String,
    pub props: Vec<Pair>,
    pub datasets: Vec<Pair>,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
    pub content: Option<String>,
    pub style: Vec<Pair>,
    /// Body was terminated by `;`
    pub closed: bool,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    /// Content that will actually be written (`content:{}` counts as none).
    pub fn visible_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|content| !content.is_empty())
    }

    /// Only an empty leaf closed by its own `;` omits the closing tag.
    pub fn needs_closing_tag(&self) -> bool {
        !self.closed || !self.children.is_empty() || self.visible_content().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_closed_leaf_has_no_closing_tag() {
        let element = Element { closed: true, ..Element::new("br") };
        assert!(!element.needs_closing_tag());
    }

    #[test]
    fn test_content_or_children_force_closing_tag() {
        let with_content = Element {
            closed: true,
            content: Some("x".into()),
            ..Element::new("p")
        };
        assert!(with_content.needs_closing_tag());

        let with_child = Element {
            closed: true,
            children: vec![Element::new("span")],
            ..Element::new("div")
        };
        assert!(with_child.needs_closing_tag());
    }

    #[test]
    fn test_empty_content_counts_as_none() {
        let element = Element {
            closed: true,
            content: Some(String::new()),
            ..Element::new("p")
        };
        assert_eq!(element.visible_content(), None);
        assert!(!element.needs_closing_tag());
    }

    #[test]
    fn test_unclosed_element_keeps_closing_tag() {
        assert!(Element::new("div").needs_closing_tag());
    }
}

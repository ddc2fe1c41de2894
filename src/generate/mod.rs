pub mod html;

pub use html::HtmlGenerator;

use crate::ast::Element;
use crate::resolve::ComponentCache;

/// Generator trait - renders a parsed element tree to output text
pub trait Generator {
    fn generate(&self, elements: &[Element], components: &ComponentCache) -> String;
}

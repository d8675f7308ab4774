//! Computed-style probing for visibility checks.

use scraper::node::Element;

/// CSS `visibility` value. Inherited by descendants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapse,
}

impl Visibility {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "visible" => Some(Self::Visible),
            "hidden" => Some(Self::Hidden),
            "collapse" => Some(Self::Collapse),
            _ => None,
        }
    }
}

/// The parts of an element's computed style that decide whether its text
/// is rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    /// `display: none` removes the element and its whole subtree.
    pub display_none: bool,
    pub visibility: Visibility,
}

impl ComputedStyle {
    pub fn is_visible(&self) -> bool {
        !self.display_none && self.visibility == Visibility::Visible
    }
}

/// Source of computed styles for the elements of the current document.
///
/// `parent` is the already computed style of the nearest element ancestor
/// (the default style for the root), so implementations can apply
/// inheritance.
pub trait StyleProbe: Send + Sync {
    fn computed_style(&self, element: &Element, parent: &ComputedStyle) -> ComputedStyle;
}

/// Probe that sees only the `hidden` attribute and inline `style`
/// declarations. Stylesheets are not evaluated.
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineStyleProbe;

impl StyleProbe for InlineStyleProbe {
    fn computed_style(&self, element: &Element, parent: &ComputedStyle) -> ComputedStyle {
        let mut style = ComputedStyle {
            display_none: element.attr("hidden").is_some(),
            visibility: parent.visibility,
        };

        if let Some(inline) = element.attr("style") {
            for (property, value) in declarations(inline) {
                match property.as_str() {
                    "display" => style.display_none = value == "none",
                    "visibility" => {
                        if let Some(v) = Visibility::parse(&value) {
                            style.visibility = v;
                        }
                    }
                    _ => {}
                }
            }
        }

        style
    }
}

/// Split an inline style into lowercase `(property, value)` pairs, in
/// source order, with `!important` stripped.
fn declarations(inline: &str) -> impl Iterator<Item = (String, String)> + '_ {
    inline.split(';').filter_map(|decl| {
        let (property, value) = decl.split_once(':')?;
        let property = property.trim().to_ascii_lowercase();
        let value = value.trim().to_ascii_lowercase();
        let value = value
            .strip_suffix("!important")
            .map(|v| v.trim_end().to_string())
            .unwrap_or(value);
        if property.is_empty() {
            None
        } else {
            Some((property, value))
        }
    })
}

use std::str::FromStr;

use roxmltree::Node;

use crate::error::DaeError;

// ─── Node helpers ─────────────────────────────────────────────────────────────

/// Parent-scoped accessors over `roxmltree` nodes. Nothing here searches
/// descendants, so nested `<node>`/`<animation>` elements are seen once.
pub(super) trait NodeExt<'a, 'input: 'a>: Sized {
    fn element_children(self) -> impl Iterator<Item = Node<'a, 'input>>;

    fn children_named(self, name: &'static str) -> impl Iterator<Item = Node<'a, 'input>>;

    fn child(self, name: &str) -> Option<Node<'a, 'input>>;

    fn name(self) -> &'a str;

    /// Element text, or `""` when the element is empty.
    fn body(self) -> &'a str;

    fn owned_attribute(self, name: &str) -> Option<String>;

    /// URL-like attribute with its leading `#` removed.
    fn reference_attribute(self, name: &str) -> Option<String>;

    fn parse_attribute<T: FromStr>(self, name: &str) -> Result<Option<T>, DaeError>;

    /// Count, offset or stride attribute: a non-negative signed 32-bit value.
    fn parse_index_attribute(self, name: &str) -> Result<Option<usize>, DaeError>;
}

impl<'a, 'input: 'a> NodeExt<'a, 'input> for Node<'a, 'input> {
    fn element_children(self) -> impl Iterator<Item = Node<'a, 'input>> {
        self.children().filter(|child| child.is_element())
    }

    fn children_named(self, name: &'static str) -> impl Iterator<Item = Node<'a, 'input>> {
        self.element_children()
            .filter(move |child| child.tag_name().name() == name)
    }

    fn child(self, name: &str) -> Option<Node<'a, 'input>> {
        self.element_children()
            .find(|child| child.tag_name().name() == name)
    }

    fn name(self) -> &'a str {
        self.tag_name().name()
    }

    fn body(self) -> &'a str {
        self.text().unwrap_or_default()
    }

    fn owned_attribute(self, name: &str) -> Option<String> {
        self.attribute(name).map(str::to_string)
    }

    fn reference_attribute(self, name: &str) -> Option<String> {
        self.attribute(name)
            .map(|value| strip_reference(value).to_string())
    }

    fn parse_attribute<T: FromStr>(self, name: &str) -> Result<Option<T>, DaeError> {
        let Some(value) = self.attribute(name) else {
            return Ok(None);
        };
        value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| DaeError::InvalidAttribute {
                attribute: name.to_string(),
                value: value.to_string(),
                element: self.tag_name().name().to_string(),
            })
    }

    fn parse_index_attribute(self, name: &str) -> Result<Option<usize>, DaeError> {
        let Some(value) = self.parse_attribute::<i32>(name)? else {
            return Ok(None);
        };
        usize::try_from(value)
            .map(Some)
            .map_err(|_| DaeError::InvalidAttribute {
                attribute: name.to_string(),
                value: value.to_string(),
                element: self.tag_name().name().to_string(),
            })
    }
}

// ─── Token lists ──────────────────────────────────────────────────────────────

/// Whitespace-separated single-precision floats.
pub fn parse_floats(text: &str, element: &str) -> Result<Vec<f32>, DaeError> {
    text.split_whitespace()
        .map(|token| {
            token.parse::<f32>().map_err(|_| DaeError::InvalidFloat {
                token: token.to_string(),
                element: element.to_string(),
            })
        })
        .collect()
}

/// Whitespace-separated signed 32-bit integers.
pub fn parse_ints(text: &str, element: &str) -> Result<Vec<i32>, DaeError> {
    text.split_whitespace()
        .map(|token| {
            token.parse::<i32>().map_err(|_| DaeError::InvalidInteger {
                token: token.to_string(),
                element: element.to_string(),
            })
        })
        .collect()
}

/// Integers that must not be negative, such as `<vcount>`.
pub fn parse_counts(text: &str, element: &str) -> Result<Vec<u32>, DaeError> {
    parse_ints(text, element)?
        .into_iter()
        .map(|value| {
            u32::try_from(value).map_err(|_| DaeError::NegativeCount {
                element: element.to_string(),
                value,
            })
        })
        .collect()
}

pub fn parse_names(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

/// Removes one leading `#` from a local-document reference.
pub fn strip_reference(url: &str) -> &str {
    url.strip_prefix('#').unwrap_or(url)
}

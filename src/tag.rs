//! Predicate names built from a base name and a tuple of parameters.
//!
//! Every template derives its auxiliary predicate names here, passing the adjacency kind, the color predicate and a
//! domain word such as `grid`, `area` or `bulb`, so that two templates instantiated with different parameters never
//! share a predicate.

use crate::adjacency::AdjacencyKind;
use crate::common::Container;
use crate::predicate::Predicate;

const SEPARATOR: &str = "_";

/// One parameter of a tag. [`TagPart::Skip`] contributes nothing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TagPart {
    /// A word; `-` and spaces become `_`.
    Text(String),
    /// A number; the minus sign of a negative number becomes `_`.
    Int(i64),
    /// An absent optional parameter.
    Skip,
}

impl TagPart {
    fn token(&self) -> Option<String> {
        match self {
            TagPart::Text(text) => Some(text.replace(['-', ' '], SEPARATOR)),
            TagPart::Int(value) => Some(value.to_string().replace('-', SEPARATOR)),
            TagPart::Skip => None,
        }
    }
}

impl From<&str> for TagPart {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for TagPart {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for TagPart {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for TagPart {
    fn from(value: i32) -> Self {
        Self::Int(value.into())
    }
}

impl From<usize> for TagPart {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<&Predicate> for TagPart {
    fn from(value: &Predicate) -> Self {
        Self::Text(value.token())
    }
}

impl From<AdjacencyKind> for TagPart {
    fn from(value: AdjacencyKind) -> Self {
        Self::Text(value.tag_token().to_owned())
    }
}

impl From<Container> for TagPart {
    fn from(value: Container) -> Self {
        Self::Text(value.name().to_owned())
    }
}

impl<T: Into<TagPart>> From<Option<T>> for TagPart {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Skip, Into::into)
    }
}

/// Join `base` and the tokens of `params` with `_`, replacing `-` and spaces inside tokens.
pub fn encode(base: &str, params: impl IntoIterator<Item = TagPart>) -> String {
    let mut tag = base.to_owned();
    for token in params.into_iter().filter_map(|part| part.token()) {
        tag.push_str(SEPARATOR);
        tag.push_str(&token);
    }

    tag
}

/// `tag!(base, params...)` calls [`encode`] with each parameter converted through [`TagPart::from`].
#[macro_export]
macro_rules! tag {
    ($base:expr $(, $param:expr)* $(,)?) => {
        $crate::tag::encode($base, [$($crate::tag::TagPart::from($param)),*])
    };
}

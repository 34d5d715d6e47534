use std::collections::BTreeSet;

use crate::core::Attributes;

/// Restricts result attributes to an allow list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultProjector {
    allowed: BTreeSet<String>,
}

impl ResultProjector {
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }

    /// Keep only allowed attributes.
    ///
    /// An empty allow list keeps everything. Returns `None` when nothing is
    /// left, so the caller can drop the item.
    pub fn project(&self, mut attributes: Attributes) -> Option<Attributes> {
        if self.allowed.is_empty() {
            return Some(attributes);
        }

        attributes.retain(|name, _| self.allowed.contains(name));
        if attributes.is_empty() {
            None
        } else {
            Some(attributes)
        }
    }

    pub fn is_passthrough(&self) -> bool {
        self.allowed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AttributeValue;
    use pretty_assertions::assert_eq;

    fn attributes() -> Attributes {
        let mut attributes = Attributes::new();
        attributes.insert("id".into(), AttributeValue::from(1));
        attributes.insert("name".into(), AttributeValue::from("London"));
        attributes.insert("population".into(), AttributeValue::from(346765));
        attributes
    }

    #[test]
    fn test_empty_allow_list_is_passthrough() {
        let projector = ResultProjector::default();
        assert!(projector.is_passthrough());
        assert_eq!(projector.project(attributes()), Some(attributes()));
    }

    #[test]
    fn test_keeps_intersection() {
        let projector = ResultProjector::new(["name", "score"]);
        let projected = projector.project(attributes()).unwrap();

        assert_eq!(projected.keys().collect::<Vec<_>>(), vec!["name"]);
    }

    #[test]
    fn test_empty_intersection_omits() {
        let projector = ResultProjector::new(["distance"]);
        assert_eq!(projector.project(attributes()), None);
    }

    #[test]
    fn test_idempotent() {
        let projector = ResultProjector::new(["id", "name"]);
        let once = projector.project(attributes()).unwrap();
        let twice = projector.project(once.clone()).unwrap();
        assert_eq!(once, twice);
    }
}

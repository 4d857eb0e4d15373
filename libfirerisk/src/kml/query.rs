use xmltree::{Element, ElementPredicate, XMLNode};

/// Depth-first queries over an element's descendants, in document order.
pub trait TreeQuery {
    fn descendants<P: ElementPredicate>(&self, predicate: P) -> Descendants<'_, P>;

    fn find_descendant<P, F>(&self, predicate: P, filter: F) -> Option<&Element>
    where
        P: ElementPredicate,
        F: FnMut(&&Element) -> bool,
    {
        self.descendants(predicate).find(filter)
    }

    /// Visits every matching descendant mutably, stopping at the first error.
    ///
    /// Children that `f` appends to a match are visited after it.
    fn try_for_each_descendant_mut<P, F, E>(&mut self, predicate: P, f: &mut F) -> Result<(), E>
    where
        P: ElementPredicate,
        F: FnMut(&mut Element) -> Result<(), E>;
}

impl TreeQuery for Element {
    fn descendants<P: ElementPredicate>(&self, predicate: P) -> Descendants<'_, P> {
        Descendants {
            stack: child_elements(self).rev().collect(),
            predicate,
        }
    }

    fn try_for_each_descendant_mut<P, F, E>(&mut self, predicate: P, f: &mut F) -> Result<(), E>
    where
        P: ElementPredicate,
        F: FnMut(&mut Element) -> Result<(), E>,
    {
        visit_mut(self, &predicate, f)
    }
}

fn visit_mut<P, F, E>(element: &mut Element, predicate: &P, f: &mut F) -> Result<(), E>
where
    P: ElementPredicate,
    F: FnMut(&mut Element) -> Result<(), E>,
{
    for child in element.children.iter_mut() {
        let XMLNode::Element(child) = child else {
            continue;
        };
        if predicate.match_element(child) {
            f(child)?;
        }
        visit_mut(child, predicate, f)?;
    }
    Ok(())
}

fn child_elements(element: &Element) -> impl DoubleEndedIterator<Item = &Element> {
    element.children.iter().filter_map(|node| match node {
        XMLNode::Element(element) => Some(element),
        _ => None,
    })
}

pub struct Descendants<'a, P> {
    stack: Vec<&'a Element>,
    predicate: P,
}

impl<'a, P: ElementPredicate> Iterator for Descendants<'a, P> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(element) = self.stack.pop() {
            self.stack.extend(child_elements(element).rev());
            if self.predicate.match_element(element) {
                return Some(element);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Element {
        Element::parse(
            r#"<a>
                <b n="1"><c/><b n="2"/></b>
                <c><b n="3"/></c>
                <!-- comment -->
                <b n="4"/>
            </a>"#
                .as_bytes(),
        )
        .unwrap()
    }

    fn n(element: &Element) -> &str {
        element.attributes.get("n").map(String::as_str).unwrap_or("")
    }

    #[test]
    fn descendants_are_in_document_order() {
        let tree = tree();
        let found: Vec<_> = tree.descendants("b").map(n).collect();
        assert_eq!(found, ["1", "2", "3", "4"]);
        assert_eq!(tree.descendants("c").count(), 2);
        assert_eq!(tree.descendants("missing").count(), 0);
    }

    #[test]
    fn descendants_exclude_self() {
        let tree = tree();
        assert_eq!(tree.descendants("a").count(), 0);
    }

    #[test]
    fn find_descendant_applies_filter() {
        let tree = tree();
        let found = tree.find_descendant("b", |b| n(b) == "3").unwrap();
        assert_eq!(n(found), "3");
        assert!(tree.find_descendant("b", |b| n(b) == "9").is_none());
    }

    #[test]
    fn mutable_visit_matches_document_order_and_stops_on_error() {
        let mut tree = tree();
        let mut seen = vec![];
        tree.try_for_each_descendant_mut("b", &mut |b: &mut Element| {
            seen.push(n(b).to_string());
            b.attributes.insert("seen".into(), "yes".into());
            Ok::<_, String>(())
        })
        .unwrap();
        assert_eq!(seen, ["1", "2", "3", "4"]);
        assert!(tree
            .descendants("b")
            .all(|b| b.attributes.get("seen").is_some()));

        let mut visited = 0;
        let err = tree
            .try_for_each_descendant_mut("b", &mut |b: &mut Element| {
                visited += 1;
                if n(b) == "2" {
                    Err(format!("stopped at {}", n(b)))
                } else {
                    Ok(())
                }
            })
            .unwrap_err();
        assert_eq!(err, "stopped at 2");
        assert_eq!(visited, 2);
    }
}

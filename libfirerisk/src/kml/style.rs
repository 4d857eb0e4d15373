use std::{collections::HashSet, fmt};

use xmltree::{Element, XMLNode};

use crate::{
    color::{KmlColor, Rgb},
    kml::{element, text_element},
    pipe::Pipe,
    Error,
};

/// Identifier of the shared `<Style>` for one color, `style_{r}_{g}_{b}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StyleId(String);

impl From<Rgb> for StyleId {
    fn from(Rgb { r, g, b }: Rgb) -> Self {
        Self(format!("style_{r}_{g}_{b}"))
    }
}

impl StyleId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<styleUrl>` referencing this style from a placemark.
    pub fn url_element(&self) -> Element {
        text_element("styleUrl", format!("#{}", self.0))
    }
}

impl fmt::Display for StyleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleDefinition {
    pub id: StyleId,
    pub color: KmlColor,
    pub fill: bool,
    pub outline: bool,
}

impl StyleDefinition {
    pub fn filled(rgb: Rgb) -> Self {
        Self {
            id: StyleId::from(rgb),
            color: KmlColor::from(rgb),
            fill: true,
            outline: false,
        }
    }

    pub fn to_element(&self) -> Element {
        fn flag(enabled: bool) -> &'static str {
            if enabled {
                "1"
            } else {
                "0"
            }
        }

        let mut poly = element("PolyStyle");
        poly.children.extend([
            XMLNode::Element(text_element("color", self.color.to_string())),
            XMLNode::Element(text_element("fill", flag(self.fill))),
            XMLNode::Element(text_element("outline", flag(self.outline))),
        ]);

        let mut style = element("Style");
        style
            .attributes
            .insert("id".to_string(), self.id.to_string());
        style.children.push(XMLNode::Element(poly));
        style
    }
}

/// Style definitions created during one run, in first-seen order.
#[derive(Debug, Default)]
pub struct StyleCache {
    seen: HashSet<Rgb>,
    definitions: Vec<StyleDefinition>,
}

impl StyleCache {
    pub fn intern(&mut self, rgb: Rgb) -> StyleId {
        if self.seen.insert(rgb) {
            trace!("new style for {rgb:?}");
            self.definitions.push(StyleDefinition::filled(rgb));
        }
        StyleId::from(rgb)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn into_definitions(self) -> Vec<StyleDefinition> {
        self.definitions
    }
}

/// Last stage: maps each sampled color to its shared style.
pub struct StyleAssigner<'c> {
    cache: &'c mut StyleCache,
}

impl<'c> StyleAssigner<'c> {
    pub fn new(cache: &'c mut StyleCache) -> Self {
        Self { cache }
    }
}

impl Pipe for StyleAssigner<'_> {
    type Input = Rgb;
    type Output = StyleId;
    type Error = Error;

    fn process(&mut self, rgb: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        Ok(Some(self.cache.intern(rgb)))
    }

    fn close(&mut self) {
        debug!("{} distinct styles", self.cache.len());
    }
}

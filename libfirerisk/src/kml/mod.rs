pub mod query;
pub mod style;

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::{Path, PathBuf},
};

use xmltree::{Element, EmitterConfig, XMLNode};

use self::query::TreeQuery;

pub const KML_NS: &str = "http://www.opengis.net/kml/2.2";

pub const DOCUMENT: (&str, &str) = ("Document", KML_NS);
pub const PLACEMARK: (&str, &str) = ("Placemark", KML_NS);
pub const SIMPLE_DATA: (&str, &str) = ("SimpleData", KML_NS);

/// `SimpleData` field carrying the county code.
pub const FIPS_FIELD: &str = "FIPS";

#[derive(Debug, thiserror::Error)]
pub enum KmlError {
    #[error("failed to open kml document `{path}`")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed kml document")]
    Parse(#[from] xmltree::ParseError),
    #[error("kml root `<{root}>` has no `<Document>` container")]
    MissingContainer { root: String },
    #[error("failed to create `{path}`")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write kml document")]
    Write(#[from] xmltree::Error),
    #[error("failed to flush kml document")]
    Flush(#[source] std::io::Error),
}

/// A parsed KML file whose root holds a single `<Document>` container.
#[derive(Debug, Clone)]
pub struct KmlDocument {
    root: Element,
}

impl KmlDocument {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, KmlError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| KmlError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("parsing {}", path.display());
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, KmlError> {
        let root = Element::parse(reader)?;
        if root.get_child(DOCUMENT).is_none() {
            return Err(KmlError::MissingContainer { root: root.name });
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn container(&self) -> Result<&Element, KmlError> {
        self.root
            .get_child(DOCUMENT)
            .ok_or_else(|| KmlError::MissingContainer {
                root: self.root.name.clone(),
            })
    }

    pub fn container_mut(&mut self) -> Result<&mut Element, KmlError> {
        let root = self.root.name.clone();
        self.root
            .get_mut_child(DOCUMENT)
            .ok_or(KmlError::MissingContainer { root })
    }

    pub fn placemarks(&self) -> Result<impl Iterator<Item = &Element>, KmlError> {
        Ok(self.container()?.descendants(PLACEMARK))
    }

    /// Overwrites `path` with the document, preceded by an XML declaration.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), KmlError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|source| KmlError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush().map_err(KmlError::Flush)?;
        info!("wrote {}", path.display());
        Ok(())
    }

    pub fn write_to(&self, writer: impl Write) -> Result<(), KmlError> {
        let config = EmitterConfig::new()
            .write_document_declaration(true)
            .perform_indent(true);
        Ok(self.root.write_with_config(writer, config)?)
    }
}

/// The trimmed FIPS code of a placemark, or `None` if it has no FIPS field.
pub fn region_id(placemark: &Element) -> Option<String> {
    placemark
        .find_descendant(SIMPLE_DATA, |data| {
            data.attributes.get("name").map(String::as_str) == Some(FIPS_FIELD)
        })
        .map(|data| {
            data.get_text()
                .map(|text| text.trim().to_string())
                .unwrap_or_default()
        })
}

/// A childless element in the KML namespace.
pub fn element(name: &str) -> Element {
    let mut element = Element::new(name);
    element.namespace = Some(KML_NS.to_string());
    element
}

pub fn text_element(name: &str, text: impl Into<String>) -> Element {
    let mut element = element(name);
    element.children.push(XMLNode::Text(text.into()));
    element
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_COUNTIES: &str = r##"<?xml version="1.0" encoding="UTF-8"?>
<kml xmlns="http://www.opengis.net/kml/2.2">
  <Document id="root_doc">
    <Folder>
      <name>counties</name>
      <Placemark>
        <name>Divide</name>
        <ExtendedData>
          <SchemaData schemaUrl="#counties">
            <SimpleData name="NAME">Divide</SimpleData>
            <SimpleData name="FIPS"> 38023 </SimpleData>
          </SchemaData>
        </ExtendedData>
      </Placemark>
      <Placemark>
        <name>Unknown</name>
      </Placemark>
    </Folder>
  </Document>
</kml>"##;

    #[test]
    fn finds_placemarks_under_nested_folders() {
        let document = KmlDocument::from_reader(TWO_COUNTIES.as_bytes()).unwrap();
        let ids: Vec<_> = document.placemarks().unwrap().map(region_id).collect();
        assert_eq!(ids, [Some("38023".to_string()), None]);
    }

    #[test]
    fn rejects_document_without_container() {
        let err = KmlDocument::from_reader(
            r#"<kml xmlns="http://www.opengis.net/kml/2.2"><Folder/></kml>"#.as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, KmlError::MissingContainer { root } if root == "kml"));
    }

    #[test]
    fn container_must_be_in_kml_namespace() {
        let err = KmlDocument::from_reader(
            r#"<kml xmlns="http://earth.google.com/kml/2.1"><Document/></kml>"#.as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, KmlError::MissingContainer { .. }));
    }

    #[test]
    fn rejects_malformed_xml() {
        let err = KmlDocument::from_reader("<kml><Document></kml>".as_bytes()).unwrap_err();
        assert!(matches!(err, KmlError::Parse(_)));
    }

    #[test]
    fn open_reports_missing_file() {
        let err = KmlDocument::open("does/not/exist.kml").unwrap_err();
        assert!(matches!(err, KmlError::Open { path, .. } if path.ends_with("exist.kml")));
    }

    #[test]
    fn writes_declaration_and_keeps_content() {
        let document = KmlDocument::from_reader(TWO_COUNTIES.as_bytes()).unwrap();
        let mut out = vec![];
        document.write_to(&mut out).unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.starts_with("<?xml"));
        assert!(out.contains("utf-8") || out.contains("UTF-8"));
        let reparsed = KmlDocument::from_reader(out.as_bytes()).unwrap();
        assert_eq!(reparsed.placemarks().unwrap().count(), 2);
        assert_eq!(
            reparsed.container().unwrap().attributes.get("id").map(String::as_str),
            Some("root_doc")
        );
    }
}

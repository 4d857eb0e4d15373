#[macro_use]
extern crate tracing;

pub mod color;
pub mod kml;
pub mod pipe;
pub mod raster;
pub mod regions;

use std::io::Write;

use image::RgbImage;
use xmltree::{Element, XMLNode};

use crate::{
    kml::{
        query::TreeQuery,
        style::{StyleAssigner, StyleCache},
        KmlDocument, KmlError,
    },
    pipe::Pipe,
    raster::ColorSampler,
    regions::{RegionLookup, RegionTable},
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to fetch raster from `{url}`")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to decode raster")]
    Decode(#[from] image::ImageError),
    #[error(transparent)]
    Kml(#[from] KmlError),
    #[error("failed to open region table `{path}`")]
    RegionTableOpen {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed region table")]
    RegionTable(#[from] serde_json::Error),
    #[error("region table lists FIPS {fips} more than once")]
    DuplicateRegion { fips: String },
    #[error("failed to report an unmapped region")]
    Diagnostics(#[source] std::io::Error),
    #[error("FIPS {fips} maps to pixel ({x}, {y}), outside the {width}x{height} raster")]
    PixelOutOfBounds {
        fips: String,
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

/// Outcome of one styling pass over a document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ColorizeReport {
    pub placemarks: usize,
    pub styled: usize,
    pub skipped: Vec<String>,
    pub styles: usize,
}

/// Reads the KML at `input`, styles every placemark whose FIPS code has a pixel
/// in `regions` with the color sampled from `raster`, and writes the result to
/// `output`. Each unmapped FIPS code gets one line on `diagnostics`.
pub fn colorize(
    input: impl AsRef<std::path::Path>,
    output: impl AsRef<std::path::Path>,
    raster: &RgbImage,
    regions: &RegionTable,
    diagnostics: impl Write,
) -> Result<ColorizeReport, Error> {
    let mut document = KmlDocument::open(input)?;
    let report = style_placemarks(&mut document, raster, regions, diagnostics)?;
    document.save(output)?;
    Ok(report)
}

pub fn style_placemarks(
    document: &mut KmlDocument,
    raster: &RgbImage,
    regions: &RegionTable,
    diagnostics: impl Write,
) -> Result<ColorizeReport, Error> {
    let mut cache = StyleCache::default();
    let mut report = ColorizeReport::default();

    let mut pipeline = RegionLookup::new(regions, &mut report.skipped, diagnostics)
        .pipe(ColorSampler::new(raster))
        .pipe(StyleAssigner::new(&mut cache));

    let mut placemarks = 0;
    let mut styled = 0;
    let mut visit = |placemark: &mut Element| -> Result<(), Error> {
        placemarks += 1;
        let Some(fips) = kml::region_id(placemark) else {
            return Ok(());
        };
        if let Some(style) = pipeline.process(fips)? {
            placemark.children.push(XMLNode::Element(style.url_element()));
            styled += 1;
        }
        Ok(())
    };
    document
        .container_mut()?
        .try_for_each_descendant_mut(kml::PLACEMARK, &mut visit)?;
    pipeline.close();

    let definitions = cache.into_definitions();
    let container = document.container_mut()?;
    container.children.extend(
        definitions
            .iter()
            .map(|definition| XMLNode::Element(definition.to_element())),
    );

    report.placemarks = placemarks;
    report.styled = styled;
    report.styles = definitions.len();
    info!(
        placemarks = report.placemarks,
        styled = report.styled,
        skipped = report.skipped.len(),
        styles = report.styles,
        "styled placemarks"
    );
    Ok(report)
}

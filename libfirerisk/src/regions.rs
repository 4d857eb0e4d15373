use std::{
    collections::HashMap,
    io::{Read, Write},
    path::Path,
};

use crate::{pipe::Pipe, Error};

const NORTH_DAKOTA_COUNTIES: &str = include_str!("../data/north_dakota_counties.json");

/// A county and the hand-picked pixel inside it on the fire-danger raster.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
pub struct Region {
    pub fips: String,
    pub name: String,
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, Default)]
pub struct RegionTable {
    regions: Vec<Region>,
    by_fips: HashMap<String, usize>,
}

impl RegionTable {
    /// The bundled table for the North Dakota fire-danger index map.
    pub fn north_dakota() -> Result<Self, Error> {
        Self::from_reader(NORTH_DAKOTA_COUNTIES.as_bytes())
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| Error::RegionTableOpen {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader(reader: impl Read) -> Result<Self, Error> {
        let regions: Vec<Region> = serde_json::from_reader(reader)?;
        Self::from_regions(regions)
    }

    pub fn from_regions(regions: Vec<Region>) -> Result<Self, Error> {
        let mut by_fips = HashMap::with_capacity(regions.len());
        for (index, region) in regions.iter().enumerate() {
            if by_fips.insert(region.fips.clone(), index).is_some() {
                return Err(Error::DuplicateRegion {
                    fips: region.fips.clone(),
                });
            }
        }
        debug!("loaded {} regions", regions.len());
        Ok(Self { regions, by_fips })
    }

    pub fn get(&self, fips: &str) -> Option<&Region> {
        self.by_fips.get(fips).map(|&index| &self.regions[index])
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter()
    }
}

/// A mapped region on its way to the sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionSample {
    pub fips: String,
    pub x: u32,
    pub y: u32,
}

/// First stage: resolves a FIPS code to its pixel. Unmapped codes get one
/// line on `diagnostics` and are dropped.
pub struct RegionLookup<'t, 's, W> {
    table: &'t RegionTable,
    skipped: &'s mut Vec<String>,
    diagnostics: W,
}

impl<'t, 's, W: Write> RegionLookup<'t, 's, W> {
    pub fn new(table: &'t RegionTable, skipped: &'s mut Vec<String>, diagnostics: W) -> Self {
        Self {
            table,
            skipped,
            diagnostics,
        }
    }
}

impl<W: Write> Pipe for RegionLookup<'_, '_, W> {
    type Input = String;
    type Output = RegionSample;
    type Error = Error;

    #[tracing::instrument(level = "trace", skip(self))]
    fn process(&mut self, fips: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        let Some(region) = self.table.get(&fips) else {
            writeln!(self.diagnostics, "Skipping FIPS {fips}: no pixel mapping found.")
                .map_err(Error::Diagnostics)?;
            self.skipped.push(fips);
            return Ok(None);
        };
        trace!(county = %region.name, x = region.x, y = region.y);
        Ok(Some(RegionSample {
            fips,
            x: region.x,
            y: region.y,
        }))
    }

    fn close(&mut self) {
        if let Err(err) = self.diagnostics.flush() {
            warn!("failed to flush diagnostics: {err}");
        }
        if !self.skipped.is_empty() {
            warn!("{} placemarks had no pixel mapping", self.skipped.len());
        }
    }
}

use image::RgbImage;
use reqwest::blocking::{Client, Response};

use crate::{color::Rgb, pipe::Pipe, regions::RegionSample, Error};

/// Downloads the raster at `url` with a single GET. Any transport error or
/// non-success status aborts the run.
pub fn fetch(url: &str) -> Result<RgbImage, Error> {
    fetch_with(&Client::new(), url)
}

pub fn fetch_with(client: &Client, url: &str) -> Result<RgbImage, Error> {
    let fetch_err = |source| Error::Fetch {
        url: url.to_string(),
        source,
    };

    info!("fetching raster from {url}");
    let response = client
        .get(url)
        .send()
        .and_then(Response::error_for_status)
        .map_err(fetch_err)?;
    debug!(status = %response.status(), "raster response");

    let body = response.bytes().map_err(fetch_err)?;
    decode(&body)
}

/// Decodes an encoded image and drops any alpha channel.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, Error> {
    let raster = image::load_from_memory(bytes)?.to_rgb8();
    info!(
        width = raster.width(),
        height = raster.height(),
        "decoded raster"
    );
    Ok(raster)
}

/// Reads the color under each region's pixel.
pub struct ColorSampler<'i> {
    raster: &'i RgbImage,
}

impl<'i> ColorSampler<'i> {
    pub fn new(raster: &'i RgbImage) -> Self {
        Self { raster }
    }
}

impl Pipe for ColorSampler<'_> {
    type Input = RegionSample;
    type Output = Rgb;
    type Error = Error;

    #[tracing::instrument(level = "trace", skip(self))]
    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        let RegionSample { fips, x, y } = input;
        let pixel = self
            .raster
            .get_pixel_checked(x, y)
            .ok_or_else(|| Error::PixelOutOfBounds {
                fips,
                x,
                y,
                width: self.raster.width(),
                height: self.raster.height(),
            })?;
        let rgb = Rgb::from(*pixel);
        trace!(?rgb);
        Ok(Some(rgb))
    }
}

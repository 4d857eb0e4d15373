use eyre::WrapErr;
use libfirerisk::regions::RegionTable;

const RASTER_URL: &str = "https://gis.des.nd.gov/NDDESFireIndex.png";
const KML_IN: &str = "northDakotaCounties.kml";
const KML_OUT: &str = "northDakotaFireRisk.kml";

fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter("libfirerisk=info,firerisk=info")
        .with_span_events(tracing_subscriber::fmt::format::FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .init();

    let raster = libfirerisk::raster::fetch(RASTER_URL)?;
    let regions = RegionTable::north_dakota().wrap_err("bundled county table is invalid")?;

    let stdout = std::io::stdout().lock();
    let report = libfirerisk::colorize(KML_IN, KML_OUT, &raster, &regions, stdout)
        .wrap_err_with(|| format!("failed to style `{KML_IN}` into `{KML_OUT}`"))?;

    tracing::info!(
        styled = report.styled,
        skipped = report.skipped.len(),
        styles = report.styles,
        "done"
    );
    Ok(())
}

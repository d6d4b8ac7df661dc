use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use geoforge::{init_logging, Config, Conversion, TextFormat, WktDisplayMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    #[value(alias = "json")]
    Geojson,
    Wkt,
}

impl From<FormatArg> for TextFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Geojson => TextFormat::GeoJson,
            FormatArg::Wkt => TextFormat::Wkt,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Convert a spatial document between GeoJSON and WKT")]
struct Args {
    /// Input file
    input: PathBuf,

    /// Output format (default: the other one)
    #[arg(long, value_enum)]
    to: Option<FormatArg>,

    /// Input format (default: from the extension)
    #[arg(long, value_enum)]
    from: Option<FormatArg>,

    /// Projection of the input coordinates
    #[arg(long, value_name = "CRS")]
    source: Option<String>,

    /// Projection of the output coordinates
    #[arg(long, value_name = "CRS")]
    projection: Option<String>,

    /// Write WKT one literal per geometry
    #[arg(long)]
    elements: bool,

    /// Configuration file (JSON or TOML)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

impl Args {
    fn conversion(&self) -> Conversion {
        let from = self
            .from
            .map(TextFormat::from)
            .unwrap_or_else(|| geoforge::guess_format(&self.input));
        let to = self.to.map(TextFormat::from).unwrap_or(match from {
            TextFormat::GeoJson => TextFormat::Wkt,
            TextFormat::Wkt => TextFormat::GeoJson,
        });

        let mut conversion = Conversion::new(self.input.clone(), to);
        conversion.from = Some(from);
        conversion.source_projection = self.source.clone();
        conversion.target_projection = self.projection.clone();
        conversion.wkt_display_mode = self.elements.then_some(WktDisplayMode::Elements);
        conversion
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging()?;

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_or_default()?,
    };

    let output = args.conversion().run(config)?;
    println!("{}", output);
    Ok(())
}

//! File conversion through a synchronization store

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use geoforge_core::{TextFormat, WktDisplayMode};
use geoforge_settings::Config;
use geoforge_store::{DerivedView, SyncStore};
use tracing::info;

/// One conversion request
#[derive(Debug, Clone)]
pub struct Conversion {
    pub input: PathBuf,
    /// Format of the input, guessed from the extension when `None`
    pub from: Option<TextFormat>,
    pub to: TextFormat,
    /// Projection of the input coordinates, the configured default when `None`
    pub source_projection: Option<String>,
    /// Projection of the output coordinates, the source projection when `None`
    pub target_projection: Option<String>,
    pub wkt_display_mode: Option<WktDisplayMode>,
}

impl Conversion {
    pub fn new(input: impl Into<PathBuf>, to: TextFormat) -> Self {
        Self {
            input: input.into(),
            from: None,
            to,
            source_projection: None,
            target_projection: None,
            wkt_display_mode: None,
        }
    }

    /// Run the conversion and return the output text
    pub fn run(&self, config: Config) -> anyhow::Result<String> {
        let text = std::fs::read_to_string(&self.input)
            .with_context(|| format!("Cannot read {}", self.input.display()))?;
        let from = self.from.unwrap_or_else(|| guess_format(&self.input));

        let mut store = SyncStore::from_config(config)?;
        if let Some(mode) = self.wkt_display_mode {
            store.set_wkt_display_mode(mode);
        }
        if let Some(projection) = &self.source_projection {
            if let Some(err) = store.set_projection(projection).error {
                bail!("Source projection {}: {}", projection, err);
            }
        }

        match from {
            TextFormat::GeoJson => {
                store.set_geojson_text(&text);
                store
                    .features()
                    .with_context(|| format!("Cannot convert {}", self.input.display()))?;
            }
            TextFormat::Wkt => {
                if let Some(err) = store.set_wkt_text(&text).error {
                    bail!("Cannot convert {}: {}", self.input.display(), err);
                }
            }
        }

        if let Some(projection) = &self.target_projection {
            if let Some(err) = store.set_projection(projection).error {
                bail!("Target projection {}: {}", projection, err);
            }
        }

        info!(
            input = %self.input.display(),
            from = %from,
            to = %self.to,
            projection = store.projection(),
            "Converted document"
        );
        match self.to {
            TextFormat::GeoJson => Ok(store.geojson_text().to_string()),
            TextFormat::Wkt => match store.wkt_view() {
                DerivedView::Current => Ok(store.wkt_text().to_string()),
                DerivedView::Skipped { length, limit } => {
                    bail!("Document too large for WKT ({} > {} chars)", length, limit)
                }
                DerivedView::Frozen => bail!("WKT could not be derived"),
            },
        }
    }
}

/// `.wkt` and `.txt` files are read as WKT, anything else as GeoJSON
pub fn guess_format(path: &Path) -> TextFormat {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("wkt") || ext.eq_ignore_ascii_case("txt") => {
            TextFormat::Wkt
        }
        _ => TextFormat::GeoJson,
    }
}

//! # emtf-viz-render
//!
//! Draws `emtf-viz` artifacts as SVG and, with the `png` feature, rasterizes
//! them through resvg. Artifacts arrive as JSON together with their kind so
//! that stored manifests can be re-rendered without re-reading ROOT files.

pub mod canvas;
pub mod color;
pub mod config;
pub mod layout;
pub mod output;
pub mod plots;
pub mod primitives;
pub mod text;

use config::StyleConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown artifact kind: {0}")]
    UnknownKind(String),
    #[error("deserialization error: {0}")]
    Deserialize(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("layout error: {0}")]
    Layout(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "png")]
    #[error("PNG encoding error: {0}")]
    Png(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Render an artifact JSON to SVG string.
pub fn render_svg(artifact_json: &str, kind: &str, config: &StyleConfig) -> Result<String> {
    let svg = match kind {
        "resolution" | "resolution_ratio" => {
            let art: emtf_viz::ResolutionArtifact = serde_json::from_str(artifact_json)?;
            plots::resolution::render(&art, config)?
        }
        "score_graph" => {
            let art: emtf_viz::ScoreGraphArtifact = serde_json::from_str(artifact_json)?;
            plots::score_graph::render(&art, config)?
        }
        other => return Err(RenderError::UnknownKind(other.to_string())),
    };
    Ok(svg)
}

/// Render an artifact JSON to bytes in the specified format.
pub fn render_to_bytes(artifact_json: &str, kind: &str, format: &str, config: &StyleConfig) -> Result<Vec<u8>> {
    let svg = render_svg(artifact_json, kind, config)?;
    match format {
        "svg" => Ok(svg.into_bytes()),
        #[cfg(feature = "png")]
        "png" => output::png::svg_to_png(&svg, config.output.dpi),
        other => Err(RenderError::UnknownKind(format!("format: {other}"))),
    }
}

/// Render an artifact JSON to a file (format inferred from extension),
/// creating parent directories.
pub fn render_to_file(artifact_json: &str, kind: &str, path: &std::path::Path, config: &StyleConfig) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("svg");
    if ext == "svg" {
        return output::svg::save_svg(&render_svg(artifact_json, kind, config)?, path);
    }
    let bytes = render_to_bytes(artifact_json, kind, ext, config)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, bytes)?;
    tracing::debug!(path = %path.display(), kind, "rendered");
    Ok(())
}

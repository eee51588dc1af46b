use std::path::PathBuf;

use clap::ValueHint;
use omi_gltf::{
    convert::{AngleUnit, Handedness},
    settings::{BoxExtents, CylinderFallback, RadiusPolicy},
    Settings,
};
use serde::de::DeserializeOwned;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, clap::ValueEnum)]
pub enum LogFormat {
    Compact,
    Full,
    Pretty,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Compact => f.write_str("compact"),
            LogFormat::Full => f.write_str("full"),
            LogFormat::Pretty => f.write_str("pretty"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, clap::Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Logging output filters; comma-separated
    #[arg(
        short,
        long,
        default_value = "warn,omi_gltf=info,omi_inspect=info",
        env = "OMI_INSPECT_LOG_FILTER"
    )]
    pub log_filter: String,
    /// Logging output format
    #[arg(long, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
    /// JSON file holding pass settings; flags below override it
    #[arg(short, long, env = "OMI_INSPECT_SETTINGS", value_hint = ValueHint::FilePath)]
    pub settings: Option<PathBuf>,
    /// Host axis mirroring (right_handed, flip_x, flip_z)
    #[arg(long, value_parser = parse_enum::<Handedness>)]
    pub handedness: Option<Handedness>,
    /// Host angular velocity unit (radians, degrees)
    #[arg(long, value_parser = parse_enum::<AngleUnit>)]
    pub angle_unit: Option<AngleUnit>,
    /// Host box size convention (full, half)
    #[arg(long, value_parser = parse_enum::<BoxExtents>)]
    pub box_extents: Option<BoxExtents>,
    /// The host has a native cylinder collider
    #[arg(long)]
    pub native_cylinder: bool,
    /// How tapered radii collapse onto one (average, max)
    #[arg(long, value_parser = parse_enum::<RadiusPolicy>)]
    pub radius_policy: Option<RadiusPolicy>,
    /// Cylinder substitute on hosts without cylinders (capsule, mesh)
    #[arg(long, value_parser = parse_enum::<CylinderFallback>)]
    pub cylinder_fallback: Option<CylinderFallback>,
    /// Segment count of generated cylinder meshes
    #[arg(long)]
    pub cylinder_segments: Option<u32>,
    /// Treat validation warnings as errors
    #[arg(short = 'W', long, env = "OMI_INSPECT_WARNINGS_AS_ERRORS")]
    pub warnings_as_errors: bool,
    /// Re-export each document into this directory
    #[arg(short, long, value_hint = ValueHint::DirPath)]
    pub export_dir: Option<PathBuf>,
    /// Pretty-print exported JSON
    #[arg(long)]
    pub pretty: bool,
    /// Documents to inspect (.gltf or .glb)
    #[arg(num_args = 1.., required = true, value_hint = ValueHint::FilePath)]
    pub files: Vec<PathBuf>,
}

impl Cli {
    /// Apply command-line overrides on top of `base`.
    pub fn settings(&self, mut base: Settings) -> Settings {
        if let Some(h) = self.handedness {
            base.host.handedness = h;
        }
        if let Some(u) = self.angle_unit {
            base.host.angle_unit = u;
        }
        if let Some(b) = self.box_extents {
            base.host.box_extents = b;
        }
        base.host.native_cylinder |= self.native_cylinder;
        if let Some(p) = self.radius_policy {
            base.shapes.radius_policy = p;
        }
        if let Some(f) = self.cylinder_fallback {
            base.shapes.cylinder_fallback = f;
        }
        if let Some(s) = self.cylinder_segments {
            base.shapes.cylinder_segments = s;
        }
        base.validation.warnings_as_errors |= self.warnings_as_errors;
        base
    }
}

/// Parse a unit enum by its serialized name.
fn parse_enum<T: DeserializeOwned>(
    s: &str,
) -> Result<T, Box<dyn std::error::Error + Send + Sync + 'static>> {
    Ok(serde_json::from_value(serde_json::Value::String(
        s.trim().to_owned(),
    ))?)
}

/// Set up pretty log output
pub(crate) fn initialize_tracing(log_filter: &str, log_format: LogFormat) {
    let tsub = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::OffsetTime::new(
            time::UtcOffset::current_local_offset().unwrap_or_else(|e| {
                tracing::warn!("couldn't get local time offset: {:?}", e);
                time::UtcOffset::UTC
            }),
            time::macros::format_description!("[hour]:[minute]:[second]"),
        ))
        .with_thread_ids(true)
        .with_thread_names(true)
        .with_env_filter(log_filter);

    match log_format {
        LogFormat::Compact => tsub.compact().init(),
        LogFormat::Full => tsub.init(),
        LogFormat::Pretty => tsub.pretty().init(),
        LogFormat::Json => tsub.json().init(),
    }
}

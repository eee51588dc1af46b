use std::{
    io,
    path::{Path, PathBuf},
    process::ExitCode,
};

use clap::Parser;
use omi_document::{Document, DocumentError};
use omi_gltf::{
    host::{parry, HostScene, MemoryScene},
    Diagnostics, Exporter, Importer, Registry, Settings, Severity,
};

mod cli;
mod input;

use cli::Cli;
use input::MappedFile;

#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Pipeline(#[from] omi_gltf::Error),
    #[error("invalid settings file: {0}")]
    Settings(serde_json::Error),
}

/// Summary of one inspected document.
#[derive(Debug)]
struct Inspection {
    nodes: usize,
    colliders: usize,
    /// Sum of the volumes of every measurable collider.
    volume: f32,
    import: Diagnostics,
    export: Option<(PathBuf, Diagnostics)>,
}

fn load_settings(cli: &Cli) -> Result<Settings, InspectError> {
    let base = match &cli.settings {
        Some(path) => {
            let data = std::fs::read(path)?;
            serde_json::from_slice(&data).map_err(InspectError::Settings)?
        }
        None => Settings::default(),
    };
    Ok(cli.settings(base))
}

#[tracing::instrument(skip(registry, settings, export_dir))]
fn inspect(
    registry: &Registry<MemoryScene>,
    settings: &Settings,
    path: &Path,
    export_dir: Option<&Path>,
    pretty: bool,
) -> Result<Inspection, InspectError> {
    let doc = Document::from_slice(&MappedFile::open(path)?)?;
    let mut host = MemoryScene::new();
    let report = Importer::new(registry, settings.clone()).import(&doc, &mut host)?;

    let mut colliders = 0;
    let mut volume = 0.0;
    for &object in &report.objects {
        for collider in host.colliders(object) {
            colliders += 1;
            let shape = parry::shared_shape(&collider.kind, settings.host.box_extents, |mesh| {
                host.geometry(*mesh)
                    .map(|(vertices, triangles)| (vertices.to_vec(), triangles.to_vec()))
            });
            match shape {
                Some(shape) => {
                    let (v, aabb) = parry::measure(&shape);
                    tracing::debug!(
                        kind = collider.kind.name(),
                        trigger = collider.is_trigger,
                        volume = v,
                        extents = ?aabb.extents(),
                        "measured collider"
                    );
                    volume += v;
                }
                None => tracing::debug!(kind = collider.kind.name(), "collider has no geometry"),
            }
        }
    }

    let export = match export_dir {
        Some(dir) => {
            let mut out = doc.clone();
            let res = Exporter::new(registry, settings.clone()).export(
                &host,
                &report.objects,
                &report.meshes,
                &mut out,
            )?;
            out.stamp_generator();
            let file_name = path.file_stem().unwrap_or(path.as_os_str());
            let target = dir.join(file_name).with_extension("gltf");
            out.write_path(&target, pretty)?;
            Some((target, res.diagnostics))
        }
        None => None,
    };

    Ok(Inspection {
        nodes: report.objects.len(),
        colliders,
        volume,
        import: report.diagnostics,
        export,
    })
}

fn print_diagnostics(label: &str, diagnostics: &Diagnostics) {
    if diagnostics.is_empty() {
        return;
    }
    println!(
        "  {label}: {} error(s), {} warning(s)",
        diagnostics.count(Severity::Error),
        diagnostics.count(Severity::Warning)
    );
    for diag in diagnostics {
        println!("    {diag}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    cli::initialize_tracing(&cli.log_filter, cli.log_format);

    let settings = match load_settings(&cli) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(dir) = &cli.export_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::error!(dir = ?dir, "couldn't create export directory: {e}");
            return ExitCode::FAILURE;
        }
    }

    let registry = Registry::with_builtin();
    let results = crossbeam::thread::scope(|s| {
        let handles: Vec<_> = cli
            .files
            .iter()
            .map(|path| {
                let (registry, settings) = (&registry, &settings);
                let export_dir = cli.export_dir.as_deref();
                s.spawn(move |_| inspect(registry, settings, path, export_dir, cli.pretty))
            })
            .collect();
        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect::<Vec<_>>()
    })
    .unwrap_or_else(|e| std::panic::resume_unwind(e));

    let mut failed = false;
    for (path, res) in cli.files.iter().zip(results) {
        println!("{}", path.display());
        match res {
            Ok(inspection) => {
                println!(
                    "  {} node(s), {} collider(s), total collider volume {:.3}",
                    inspection.nodes, inspection.colliders, inspection.volume
                );
                print_diagnostics("import", &inspection.import);
                failed |= inspection.import.count(Severity::Error) > 0;
                if let Some((target, diagnostics)) = &inspection.export {
                    println!("  exported to {}", target.display());
                    print_diagnostics("export", diagnostics);
                }
            }
            Err(e) => {
                println!("  failed: {e}");
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

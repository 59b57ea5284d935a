use clap::{Parser, Subcommand};
use rayon::prelude::*;
use retouch::editor::{self, AllowAll, EditRequest, ModifierDescriptor};
use retouch::imaging::{RustBackend, rust_backend};
use retouch::output;
use retouch::pipeline::LockRegistry;
use retouch::store::Library;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "retouch")]
#[command(about = "Non-destructive image edits with deterministic variant names")]
#[command(long_about = "\
Non-destructive image edits with deterministic variant names

Images live in a library directory. Every edit reads the resource's current
state, applies the modifiers in order, and writes a NEW file named after the
net edit state — the original is never overwritten, and identical edit
histories always produce the same name.

Library structure:

  .retouch/
  ├── meta/
  │   └── 1.json                  # durable edit metadata per resource
  └── files/
      ├── dawn.jpg                # imported source
      └── rotate-90.jpg           # edited variant

Edit operations (applied in the order given):

  crop=LEFT,TOP,WIDTH,HEIGHT     percentages of the current dimensions
  rotate=DEGREES                 signed; accumulates, wraps at 360
  flip=h|v|hv                    toggles the axis; twice = undone

Example:

  retouch import photos/dawn.jpg
  retouch edit --id 1 crop=10,0,50,100 rotate=90
  retouch show 1")]
#[command(version)]
struct Cli {
    /// Library directory
    #[arg(long, default_value = ".retouch", global = true)]
    library: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an empty library
    Init,
    /// Bring image files under library management
    Import { files: Vec<PathBuf> },
    /// Apply an ordered list of edit operations to one or more resources
    Edit {
        /// Target resource id (repeatable; multiple ids edit in parallel)
        #[arg(long = "id", required = true)]
        ids: Vec<u64>,
        /// Operations, e.g. crop=10,0,50,100 rotate=90 flip=h
        #[arg(required = true)]
        ops: Vec<String>,
    },
    /// Print a resource's edit state and derived variant name
    Show { id: u64 },
    /// List all managed resources
    List,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Init => {
            let library = Library::init(&cli.library)?;
            println!("Initialized library at {}", library.root().display());
        }
        Command::Import { files } => {
            let library = Library::init(&cli.library)?;
            for file in &files {
                if !rust_backend::is_supported_input(file) {
                    return Err(format!("unsupported image format: {}", file.display()).into());
                }
                let (id, record) = library.import(file)?;
                println!("{}", output::format_import(id, &record));
            }
        }
        Command::Edit { ids, ops } => {
            let modifiers = ops
                .iter()
                .map(|op| parse_op(op))
                .collect::<Result<Vec<_>, _>>()?;
            let library = Library::open(&cli.library);
            let backend = RustBackend::new();
            let locks = LockRegistry::new();

            let mut results: Vec<_> = ids
                .par_iter()
                .map(|&id| {
                    let request = EditRequest {
                        resource_id: id,
                        modifiers: modifiers.clone(),
                    };
                    (
                        id,
                        editor::apply_edits(&AllowAll, &library, &backend, &locks, &request),
                    )
                })
                .collect();
            results.sort_by_key(|(id, _)| *id);

            let mut failures = 0;
            for (id, result) in results {
                match result {
                    Ok(response) => {
                        for line in output::format_edit_result(&response) {
                            println!("{line}");
                        }
                    }
                    Err(e) => {
                        eprintln!("{id:03} failed: {e}");
                        failures += 1;
                    }
                }
            }
            if failures > 0 {
                return Err(format!("{failures} edit(s) failed").into());
            }
        }
        Command::Show { id } => {
            let library = Library::open(&cli.library);
            let record = library.load_record(id)?;
            for line in output::format_resource(id, &record) {
                println!("{line}");
            }
        }
        Command::List => {
            let library = Library::open(&cli.library);
            for id in library.list_ids()? {
                let record = library.load_record(id)?;
                for line in output::format_resource(id, &record) {
                    println!("{line}");
                }
            }
        }
    }

    Ok(())
}

/// Parse one CLI edit operation into a modifier descriptor.
///
/// `crop=L,T,W,H` / `rotate=DEG` / `flip=h|v|hv`.
fn parse_op(op: &str) -> Result<ModifierDescriptor, String> {
    let (name, args) = op
        .split_once('=')
        .ok_or_else(|| format!("malformed operation '{op}' (expected name=args)"))?;

    match name {
        "crop" => {
            let values: Vec<f64> = args
                .split(',')
                .map(|v| v.trim().parse::<f64>())
                .collect::<Result<_, _>>()
                .map_err(|_| format!("crop expects four numbers, got '{args}'"))?;
            let [left, top, width, height] = values[..] else {
                return Err(format!("crop expects LEFT,TOP,WIDTH,HEIGHT, got '{args}'"));
            };
            Ok(ModifierDescriptor::Crop {
                left,
                top,
                width,
                height,
            })
        }
        "rotate" => {
            let angle = args
                .trim()
                .parse::<i32>()
                .map_err(|_| format!("rotate expects an integer angle, got '{args}'"))?;
            Ok(ModifierDescriptor::Rotate { angle })
        }
        "flip" => match args.trim() {
            "h" => Ok(ModifierDescriptor::Flip {
                horizontal: true,
                vertical: false,
            }),
            "v" => Ok(ModifierDescriptor::Flip {
                horizontal: false,
                vertical: true,
            }),
            "hv" | "vh" => Ok(ModifierDescriptor::Flip {
                horizontal: true,
                vertical: true,
            }),
            other => Err(format!("flip expects h, v, or hv, got '{other}'")),
        },
        other => Err(format!("unknown operation '{other}'")),
    }
}

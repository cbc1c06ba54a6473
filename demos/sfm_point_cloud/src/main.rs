use argh::FromArgs;
use std::path::PathBuf;

use neogoma::{
    k3d::reconstruct::ColmapReconstructor,
    pipeline::{self, PipelineConfig, DEFAULT_CHUNK_SIZE},
};

#[derive(FromArgs)]
/// Build a colored point cloud from a folder of sequential images.
///
/// The camera poses and sparse points are read from the COLMAP text model in
/// <path_to_folder>/sparse/0 or <path_to_folder>/sparse.
struct Args {
    /// path to the folder with the images
    #[argh(positional)]
    path_to_folder: PathBuf,

    /// image extension without the dot, e.g. jpg
    #[argh(positional)]
    ext: String,

    /// first image to use, starting at 1
    #[argh(positional)]
    elem_first: usize,

    /// last image to use, clamped to the number of images
    #[argh(positional)]
    elem_last: usize,

    /// focal length in pixels, 0 for 800
    #[argh(positional)]
    f: f64,

    /// principal point x, 0 for the image center
    #[argh(positional)]
    cx: f64,

    /// principal point y, 0 for the image center
    #[argh(positional)]
    cy: f64,

    /// zero to write the points without color
    #[argh(positional)]
    with_color: i32,
}

/// Parse `args` for the program `cmd`.
///
/// On early exit, returns the process exit code and the text to print: the help on stdout
/// with code 0, or the error followed by the help on stderr with code 2.
fn parse_args_from(cmd: &str, args: &[&str]) -> Result<Args, (i32, String)> {
    match Args::from_args(&[cmd], args) {
        Ok(args) => Ok(args),
        Err(early_exit) => match early_exit.status {
            Ok(()) => Err((0, early_exit.output)),
            Err(()) => {
                let help = Args::from_args(&[cmd], &["--help"])
                    .err()
                    .map(|help| help.output)
                    .unwrap_or_default();
                Err((2, format!("{}\n{}", early_exit.output.trim_end(), help)))
            }
        },
    }
}

/// Parse the command line, exiting with code 2 on usage errors.
fn parse_args() -> Args {
    let strings = std::env::args().collect::<Vec<_>>();
    let cmd = strings
        .first()
        .and_then(|s| std::path::Path::new(s).file_name())
        .and_then(|s| s.to_str())
        .unwrap_or("sfm-neogoma");
    let args = strings.iter().skip(1).map(String::as_str).collect::<Vec<_>>();

    match parse_args_from(cmd, &args) {
        Ok(args) => args,
        Err((0, help)) => {
            println!("{help}");
            std::process::exit(0);
        }
        Err((code, usage)) => {
            eprintln!("{usage}");
            std::process::exit(code);
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args();
    env_logger::init();

    let config = PipelineConfig {
        folder: args.path_to_folder,
        extension: args.ext,
        first: args.elem_first,
        last: args.elem_last,
        focal_length: args.f,
        cx: args.cx,
        cy: args.cy,
        with_color: args.with_color != 0,
        chunk_size: DEFAULT_CHUNK_SIZE,
    };
    log::debug!("Running with {config:?}");

    let reconstructor = ColmapReconstructor::discover(&config.folder)?;
    log::info!("Using sparse model from {}", reconstructor.model_dir().display());

    let summary = pipeline::run(&config, &reconstructor)?;

    println!("\n[DONE] Program finished successfully");
    println!("Time elapsed: {}", pipeline::format_elapsed(summary.elapsed));

    Ok(())
}

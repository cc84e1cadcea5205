mod checksum;
mod config;
mod error;
mod icon;
mod resource;
mod transplant;
mod writer;

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use config::Config;
use error::TransplantError;
use icon::resample::ColorFilter;
use resource::Validation;
use transplant::{OutputFormat, Report, Request};

const EXIT_IO: i32 = 1;
const EXIT_USAGE: i32 = 2;

/// Replaces the 48x48 icon of a game executable with an upscaled copy of
/// its 32x32 icon.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file [.exe]
    #[arg(short, long)]
    input: PathBuf,

    /// Output file [.exe or .ico]. Default: [input]_dC.exe
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Allow overwriting existing files
    #[arg(long)]
    overwrite: bool,

    /// Ignore checksum checks for the icon data
    #[arg(long)]
    ignore: bool,

    /// Also save the new 48x48 icon as a PNG
    #[arg(long, value_name = "PNG")]
    preview: Option<PathBuf>,

    /// Color resampling filter, overrides config.json
    #[arg(long, value_enum)]
    filter: Option<ColorFilter>,

    /// Don't print the resampled mask
    #[arg(long)]
    quiet_mask: bool,
}

fn main() {
    let args = Args::parse();
    let config = config::load_config();
    init_logging(&config);

    println!("Executable icon transplant tool. Replaces the 48x48 icon with an upscaled 32x32 one.\n");

    let request = match build_request(&args, &config) {
        Ok(request) => request,
        Err(e) => {
            println!("Error: {:#}", e);
            process::exit(EXIT_USAGE);
        }
    };

    let blob = match std::fs::read(&args.input).with_context(|| format!("reading {}", args.input.display())) {
        Ok(blob) => blob,
        Err(e) => {
            println!("Error: {:#}", e);
            process::exit(EXIT_IO);
        }
    };
    log::info!("loaded {} ({} bytes)", args.input.display(), blob.len());

    match transplant::run(&blob, &request) {
        Ok(report) => print_report(&args, &request, &report),
        Err(e) => {
            match &e {
                TransplantError::ChecksumMismatch(validations) => {
                    print_validations(validations);
                    println!("Use --ignore to ignore checksum checks.");
                }
                other => println!("Error: {}", other),
            }
            process::exit(e.exit_code());
        }
    }
}

fn init_logging(config: &Config) {
    let log_config = ConfigBuilder::new().set_time_level(LevelFilter::Off).build();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        config.level_filter(),
        log_config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )];

    if config.log_to_file {
        let log_path = config::get_config_dir().join("icon-transplant.log");
        match File::create(&log_path) {
            Ok(file) => loggers.push(WriteLogger::new(LevelFilter::Debug, simplelog::Config::default(), file)),
            Err(e) => eprintln!("Cannot open log file {}: {}", log_path.display(), e),
        }
    }

    let _ = CombinedLogger::init(loggers);
}

/// `<dir>/<stem><suffix>.<ext>`, keeping the input's extension as written.
fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    input.with_file_name(name)
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case(wanted))
}

/// Argument checks that must pass before the executable is even read.
fn build_request(args: &Args, config: &Config) -> Result<Request> {
    if !has_extension(&args.input, "exe") {
        bail!("input {} is not an .exe", args.input.display());
    }
    if !args.input.is_file() {
        bail!("input {} does not exist", args.input.display());
    }

    let output = match &args.output {
        Some(output) => output.clone(),
        None => {
            let output = default_output(&args.input, &config.output_suffix);
            println!("No output defined. Using {}.", output.display());
            output
        }
    };

    let Some(format) = OutputFormat::from_path(&output) else {
        bail!("output {} does not end with .exe or .ico", output.display());
    };

    if !args.overwrite && output.exists() {
        bail!("{} exists. Use --overwrite to allow overwriting", output.display());
    }

    if let Some(preview) = &args.preview {
        if !has_extension(preview, "png") {
            bail!("preview {} does not end with .png", preview.display());
        }
        if !args.overwrite && preview.exists() {
            bail!("{} exists. Use --overwrite to allow overwriting", preview.display());
        }
    }

    Ok(Request {
        output,
        format,
        ignore_checksum: args.ignore,
        kernel: args.filter.unwrap_or(config.color_filter).into(),
    })
}

fn print_validations(validations: &[Validation]) {
    for v in validations {
        if v.is_valid() {
            println!("{} checksum ok", v.layout);
        } else {
            println!("{} checksum mismatch: {} (expected {})", v.layout, v.computed, v.expected);
        }
    }
}

fn print_report(args: &Args, request: &Request, report: &Report) {
    print_validations(&report.validations);

    if !args.quiet_mask {
        print!("{}", report.payload.resampled_mask.render());
    }

    print!("{}", output_summary(request, report));

    if let Some(preview) = &args.preview {
        match report.payload.to_rgba().save(preview) {
            Ok(()) => println!("Preview written to {}", preview.display()),
            Err(e) => {
                log::warn!("preview {} not written: {}", preview.display(), e);
                println!("Warning: could not write preview {}: {}", preview.display(), e);
            }
        }
    }
}

/// Lines describing the written file: palette size, destination and the
/// checksum sfall needs for a patched executable.
fn output_summary(request: &Request, report: &Report) -> String {
    let mut out = format!("New 48x48 palette: {} colors\n", report.payload.palette_size);
    match request.format {
        OutputFormat::Exe => {
            out += &format!("Icon data written to EXE file {}\n", request.output.display());
            out += &format!(
                "If you use sfall, add the checksum to your ddraw.ini (comma separated list): ExtraCRC={}\n",
                report.checksum
            );
        }
        OutputFormat::Ico => {
            out += &format!("Icon data written to ICON file {} ({})\n", request.output.display(), report.checksum);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icon::resample::Kernel;

    fn args(input: &Path, output: Option<&Path>) -> Args {
        Args {
            input: input.to_path_buf(),
            output: output.map(Path::to_path_buf),
            overwrite: false,
            ignore: false,
            preview: None,
            filter: None,
            quiet_mask: false,
        }
    }

    #[test]
    fn test_default_output_keeps_extension_case() {
        assert_eq!(
            default_output(Path::new("games/FALLOUT2.EXE"), "_dC"),
            PathBuf::from("games/FALLOUT2_dC.EXE")
        );
        assert_eq!(default_output(Path::new("a.exe"), "_x"), PathBuf::from("a_x.exe"));
    }

    #[test]
    fn test_request_validation() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("game.exe");
        std::fs::write(&input, b"MZ").unwrap();
        let config = Config::default();

        let request = build_request(&args(&input, None), &config).unwrap();
        assert_eq!(request.output, dir.path().join("game_dC.exe"));
        assert_eq!(request.format, OutputFormat::Exe);

        let ico = dir.path().join("icon.ICO");
        let request = build_request(&args(&input, Some(ico.as_path())), &config).unwrap();
        assert_eq!(request.format, OutputFormat::Ico);

        assert!(build_request(&args(&input, Some(dir.path().join("x.bmp").as_path())), &config).is_err());
        assert!(build_request(&args(&dir.path().join("game.dll"), None), &config).is_err());
        assert!(build_request(&args(&dir.path().join("missing.exe"), None), &config).is_err());
    }

    #[test]
    fn test_existing_output_needs_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("game.exe");
        let output = dir.path().join("out.exe");
        std::fs::write(&input, b"MZ").unwrap();
        std::fs::write(&output, b"old").unwrap();

        let mut a = args(&input, Some(output.as_path()));
        assert!(build_request(&a, &Config::default()).is_err());
        a.overwrite = true;
        assert!(build_request(&a, &Config::default()).is_ok());
    }

    #[test]
    fn test_filter_flag_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("game.exe");
        std::fs::write(&input, b"MZ").unwrap();

        let mut a = args(&input, None);
        a.filter = Some(ColorFilter::Gaussian);
        let request = build_request(&a, &Config::default()).unwrap();
        assert_eq!(request.kernel, Kernel::Smooth(ColorFilter::Gaussian));
    }

    #[test]
    fn test_cli_parses_flags() {
        let a = Args::try_parse_from([
            "icon-transplant", "--input", "g.exe", "-o", "g.ico", "--ignore", "--filter", "catmull-rom",
        ])
        .unwrap();
        assert!(a.ignore && !a.overwrite);
        assert_eq!(a.filter, Some(ColorFilter::CatmullRom));
        assert_eq!(a.output, Some(PathBuf::from("g.ico")));
    }

    #[test]
    fn test_output_summary_reports_palette_and_checksum() {
        use crate::checksum::Checksum;
        use crate::icon::build_payload;
        use crate::icon::tests::checkerboard_resource;
        use crate::resource::{locate_one, IconLayout};

        let bytes = checkerboard_resource();
        let small = locate_one(&bytes, IconLayout::Small).unwrap();
        let payload = build_payload(&small, Kernel::Nearest);
        let mut request = Request {
            output: PathBuf::from("game_dC.exe"),
            format: OutputFormat::Exe,
            ignore_checksum: false,
            kernel: Kernel::Nearest,
        };
        let report = Report {
            validations: Vec::new(),
            payload,
            checksum: Checksum(0x0123_abcd),
        };

        let text = output_summary(&request, &report);
        assert!(text.starts_with("New 48x48 palette: 2 colors\n"));
        assert!(text.contains("ExtraCRC=0x0123abcd"));

        request.format = OutputFormat::Ico;
        request.output = PathBuf::from("icon.ico");
        let text = output_summary(&request, &report);
        assert!(text.contains("ICON file icon.ico (0x0123abcd)"));
        assert!(!text.contains("ExtraCRC"));
    }
}

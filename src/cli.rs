// ============================================================================
// FilterFE CLI — headless batch filtering via command-line arguments
// ============================================================================
//
// Usage examples:
//   filterfe --input photo.png --preset vintage --output result.png
//   filterfe -i photo.jpg --brightness 10 --contrast 20 -o out.png
//   filterfe -i "*.jpg" --preset enhance --output-dir processed/ --format png
//   filterfe -i a.png b.png c.png --params warm.json --output-dir out/
//
// All processing runs on the current thread through the batch runner; the
// only parallelism is the engine's internal per-row fan-out.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::batch::BatchRunner;
use crate::io::{self, SaveFormat, TiffCompression};
use crate::params::{self, FilterParameters, Param};
use crate::{log_err, log_info};

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// FilterFE headless image filter.
///
/// Apply filter presets and slider adjustments to image files — no GUI
/// required.
#[derive(Parser, Debug)]
#[command(
    name = "filterfe",
    about = "FilterFE headless batch image filter",
    long_about = "Apply filter presets and per-slider adjustments to image files\n\
                  and convert between formats. Supports PNG, JPEG, WEBP, BMP, TGA,\n\
                  and TIFF.\n\n\
                  Example:\n  \
                  filterfe --input photo.png --preset vintage --output result.png\n  \
                  filterfe -i \"*.jpg\" --brightness 10 --output-dir out/ --format png"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for single-file input.
    /// For batch input use --output-dir instead.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    /// Files are written here with the original stem and the target format's extension.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Output format: png, jpeg, webp, bmp, tga, tiff.
    /// When omitted, the format is inferred from --output's extension, defaulting to png.
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<String>,

    /// JPEG quality (1–100, default 90).
    #[arg(short, long, default_value_t = 90, value_name = "1-100")]
    pub quality: u8,

    /// TIFF compression mode: none, lzw, deflate (default: none).
    #[arg(long, default_value = "none", value_name = "MODE")]
    pub tiff_compression: String,

    /// Built-in preset to apply (enhance, classic, vintage, mystic, gold).
    /// Slider flags below override individual preset fields.
    #[arg(long, value_name = "NAME")]
    pub preset: Option<String>,

    /// JSON parameter file (as produced by the session's parameter export).
    /// Mutually exclusive with --preset.
    #[arg(long, value_name = "FILE.json", conflicts_with = "preset")]
    pub params: Option<PathBuf>,

    /// Brightness (-100..100).
    #[arg(long, value_name = "VAL")]
    pub brightness: Option<f32>,

    /// Contrast (-100..100).
    #[arg(long, value_name = "VAL")]
    pub contrast: Option<f32>,

    /// Saturation (0..200, 100 = unchanged).
    #[arg(long, value_name = "VAL")]
    pub saturation: Option<f32>,

    /// Blur radius in pixels (0..10).
    #[arg(long, value_name = "PX")]
    pub blur: Option<f32>,

    /// Sepia intensity (0..100).
    #[arg(long, value_name = "VAL")]
    pub sepia: Option<f32>,

    /// Vintage intensity (0..100).
    #[arg(long, value_name = "VAL")]
    pub vintage: Option<f32>,

    /// Sharpness (-50..100, negative softens).
    #[arg(long, value_name = "VAL")]
    pub sharpness: Option<f32>,

    /// Color temperature (-100..100, positive warms).
    #[arg(long, value_name = "VAL")]
    pub temperature: Option<f32>,

    /// Tint hue rotation in degrees (-180..180).
    #[arg(long, value_name = "DEG")]
    pub tint: Option<f32>,

    /// Vignette intensity (0..100).
    #[arg(long, value_name = "VAL")]
    pub vignette: Option<f32>,

    /// Print per-file timing information.
    #[arg(short, long)]
    pub verbose: bool,
}

impl CliArgs {
    /// The ten slider flags, paired with the parameter they drive.
    fn slider_overrides(&self) -> [(Param, Option<f32>); 10] {
        [
            (Param::Brightness, self.brightness),
            (Param::Contrast, self.contrast),
            (Param::Saturation, self.saturation),
            (Param::Blur, self.blur),
            (Param::Sepia, self.sepia),
            (Param::Vintage, self.vintage),
            (Param::Sharpness, self.sharpness),
            (Param::Temperature, self.temperature),
            (Param::Tint, self.tint),
            (Param::Vignette, self.vignette),
        ]
    }
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    // Resolve glob patterns / literal paths → concrete PathBufs
    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    // Multiple inputs require --output-dir, not --output
    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let save_format = io::parse_format(args.format.as_deref(), args.output.as_deref());
    let tiff_compression = match args.tiff_compression.to_lowercase().as_str() {
        "lzw" => TiffCompression::Lzw,
        "deflate" => TiffCompression::Deflate,
        _ => TiffCompression::None,
    };

    // Base parameter record: preset, JSON file, or neutral.
    let mut filter_params = match base_params(&args) {
        Ok(p) => p,
        Err(msg) => {
            eprintln!("error: {}", msg);
            return ExitCode::FAILURE;
        }
    };

    // Individual slider flags override on top.
    for (param, value) in args.slider_overrides() {
        if let Some(v) = value {
            if let Err(e) = filter_params.set(param, v) {
                eprintln!("error: {}", e);
                return ExitCode::FAILURE;
            }
        }
    }

    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "error: could not create output directory '{}': {}",
                dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    }

    // -- Queue up ---------------------------------------------------------
    let mut runner = BatchRunner::new();
    let mut queued_paths: Vec<PathBuf> = Vec::new();
    let mut any_failure = false;

    for input_path in &inputs {
        match runner.enqueue_file(input_path) {
            Ok(_) => queued_paths.push(input_path.clone()),
            Err(e) => {
                eprintln!("error: could not load '{}': {}", input_path.display(), e);
                log_err!("load failed for {}: {}", input_path.display(), e);
                any_failure = true;
            }
        }
    }
    if runner.is_empty() {
        return ExitCode::FAILURE;
    }

    if let Err(e) = runner.update_global_params(filter_params) {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }
    runner.set_use_global(true);

    // -- Process ----------------------------------------------------------
    let total = runner.len();
    let multi = total > 1;
    let batch_start = Instant::now();
    log_info!("processing {} file(s)", total);

    let mut item_start = Instant::now();
    let run_result = runner.run(|progress| {
        if multi || args.verbose {
            println!(
                "[{}/{}] {} ({:.0}ms)",
                progress.current_index + 1,
                progress.total,
                queued_paths[progress.current_index].display(),
                item_start.elapsed().as_secs_f64() * 1000.0
            );
        }
        item_start = Instant::now();
    });
    if let Err(e) = run_result {
        eprintln!("error: {}", e);
        return ExitCode::FAILURE;
    }

    // -- Save -------------------------------------------------------------
    for (idx, item) in runner.items().iter().enumerate() {
        if let Some(reason) = &item.failure {
            eprintln!("  error: {}: {}", queued_paths[idx].display(), reason);
            any_failure = true;
            continue;
        }
        let result = match &item.result {
            Some(r) => r,
            None => continue,
        };
        let output_path = match build_output_path(
            &queued_paths[idx],
            args.output.as_deref(),
            args.output_dir.as_deref(),
            save_format,
        ) {
            Some(p) => p,
            None => {
                eprintln!(
                    "  error: cannot determine output path for '{}'.",
                    queued_paths[idx].display()
                );
                any_failure = true;
                continue;
            }
        };
        match io::encode_and_write(result, &output_path, save_format, args.quality, tiff_compression)
        {
            Ok(()) => {
                if args.verbose {
                    println!("  → {}", output_path.display());
                }
            }
            Err(e) => {
                eprintln!("  error: save failed for '{}': {}", output_path.display(), e);
                any_failure = true;
            }
        }
    }

    if args.verbose {
        println!(
            "done: {}/{} in {:.0}ms",
            runner.progress().completed,
            total,
            batch_start.elapsed().as_secs_f64() * 1000.0
        );
    }
    log_info!(
        "batch finished: {}/{} completed",
        runner.progress().completed,
        total
    );

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

// ============================================================================
// Helpers
// ============================================================================

/// Base parameter record from --preset or --params, neutral otherwise.
fn base_params(args: &CliArgs) -> Result<FilterParameters, String> {
    if let Some(id) = &args.preset {
        let preset = params::find_preset(id).ok_or_else(|| {
            let known: Vec<&str> = params::builtin_presets().iter().map(|p| p.id.as_str()).collect();
            format!("unknown preset '{}' (available: {})", id, known.join(", "))
        })?;
        return Ok(preset.resolve());
    }
    if let Some(path) = &args.params {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("could not read parameter file '{}': {}", path.display(), e))?;
        let parsed = FilterParameters::from_json(&json)
            .map_err(|e| format!("invalid parameter file '{}': {}", path.display(), e))?;
        parsed.validate().map_err(|e| e.to_string())?;
        return Ok(parsed);
    }
    Ok(FilterParameters::neutral())
}

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            // Literal path — use directly
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        // Treat as glob pattern
        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    if !result.contains(&entry) {
                        result.push(entry);
                    }
                    matched = true;
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, derives filename from input stem)
/// 3. Fallback: same directory as input, same stem, new extension
///    (appends `_out` to stem if it would collide with the input path)
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
    format: SaveFormat,
) -> Option<PathBuf> {
    // Explicit output path
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let ext = format.extension();
    let stem = input.file_stem()?.to_string_lossy().into_owned();

    if let Some(dir) = output_dir {
        return Some(dir.join(format!("{}.{}", stem, ext)));
    }

    // Write next to the input file
    let parent = input.parent().unwrap_or(Path::new("."));
    let candidate = parent.join(format!("{}.{}", stem, ext));

    // Avoid silent overwrite of the input
    if candidate == input {
        Some(parent.join(format!("{}_out.{}", stem, ext)))
    } else {
        Some(candidate)
    }
}

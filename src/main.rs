use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use focusmix::{
    analyze, AnalysisMode, AnalysisOptions, Decoder, ExportFormat, Metadata, MixOptions, Signal,
    SourceRole, SymphoniaDecoder,
};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "focusmix")]
#[command(about = "Loop a focus tone under a music track and render a fixed-length mix", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze one file and print its metadata as JSON
    Analyze {
        /// Audio file to analyze
        file: String,

        /// Tempo estimation mode
        #[arg(long, value_enum, default_value = "fast")]
        mode: ModeArg,

        /// Whether the file is the foundation tone or the music track
        #[arg(long, value_enum, default_value = "music")]
        role: RoleArg,
    },

    /// Render a mix of a foundation tone and a music track
    Render(RenderArgs),
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Foundation (ambience/tone) file, looped for the whole mix
    #[arg(short = 'f', long)]
    focus: String,

    /// Music file, played intro -> loop -> outro
    #[arg(short = 'm', long)]
    music: String,

    /// Output file
    #[arg(short = 'o', long)]
    output: String,

    /// JSON file with base mix options (flags override it)
    #[arg(long)]
    options: Option<String>,

    /// Mix length in seconds
    #[arg(short = 'd', long)]
    duration: Option<f64>,

    /// Music level in dB
    #[arg(long, allow_hyphen_values = true)]
    music_db: Option<f64>,

    /// Foundation level in dB
    #[arg(long, allow_hyphen_values = true)]
    focus_db: Option<f64>,

    /// Crossfade length in seconds
    #[arg(long)]
    crossfade: Option<f64>,

    /// Declared export format (payload is always PCM WAV)
    #[arg(long, value_enum)]
    format: Option<FormatArg>,

    /// Retime the music to this tempo
    #[arg(long)]
    target_bpm: Option<f64>,

    /// Source tempo to use instead of the detected one
    #[arg(long)]
    source_bpm: Option<f64>,

    /// Manual intro end in seconds (requires --outro-start)
    #[arg(long, requires = "outro_start")]
    intro_end: Option<f64>,

    /// Manual outro start in seconds (requires --intro-end)
    #[arg(long, requires = "intro_end")]
    outro_start: Option<f64>,

    /// Output sample rate in Hz
    #[arg(long)]
    sample_rate: Option<u32>,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Fast,
    Accurate,
}

impl From<ModeArg> for AnalysisMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Fast => AnalysisMode::Fast,
            ModeArg::Accurate => AnalysisMode::Accurate,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum RoleArg {
    Foundation,
    Music,
}

impl From<RoleArg> for SourceRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Foundation => SourceRole::Foundation,
            RoleArg::Music => SourceRole::Music,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Wav,
    Flac,
    Mp3,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Wav => ExportFormat::Wav,
            FormatArg::Flac => ExportFormat::Flac,
            FormatArg::Mp3 => ExportFormat::Mp3,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Command::Analyze { file, mode, role } => run_analyze(&file, mode.into(), role.into()),
        Command::Render(args) => run_render(args),
    }
}

fn run_analyze(file: &str, mode: AnalysisMode, role: SourceRole) -> Result<()> {
    let path = expand(file);
    let (signal, options) = load(&path, role)?;
    let metadata = analyze(&signal, &options.with_mode(mode), |status| log::info!("{}", status));

    println!("{}", serde_json::to_string_pretty(&metadata)?);
    Ok(())
}

fn run_render(args: RenderArgs) -> Result<()> {
    let mut options = mix_options(&args)?;
    let focus_path = expand(&args.focus);
    let music_path = expand(&args.music);
    let output_path = expand(&args.output);

    // Both inputs are independent, so decode and analyze them side by side
    let (focus, music) = rayon::join(
        || load_and_analyze(&focus_path, SourceRole::Foundation),
        || load_and_analyze(&music_path, SourceRole::Music),
    );
    let (focus, focus_meta) = focus?;
    let (music, music_meta) = music?;

    if let Some(freq) = &focus_meta.frequency {
        log::info!(
            "Foundation: {:.1} Hz (pulse {:.1}/min, suggested BPM {:?})",
            freq.frequency,
            freq.pulse_rate,
            freq.bpm_suggestions
        );
    }
    if let Some(tempo) = &music_meta.tempo {
        log::info!(
            "Music: {:.1} BPM ({:?} confidence, alternates {:?})",
            tempo.corrected,
            tempo.confidence,
            tempo.candidates
        );
    }

    // Reuse the music analysis instead of letting the renderer repeat it
    if options.manual_boundaries.is_none() {
        options.manual_boundaries = music_meta.boundaries;
    }
    if options.target_bpm.is_some() && options.source_bpm_override.is_none() {
        options.source_bpm_override = music_meta.tempo.as_ref().map(|t| t.corrected);
    }

    let encoded = focusmix::render(&focus, &music, &options, |p| log::info!("Render progress: {}%", p))
        .context("Render failed")?;

    std::fs::write(&output_path, &encoded.bytes)
        .with_context(|| format!("Failed to write output: {:?}", output_path))?;

    log::info!(
        "Wrote {} bytes ({}) to {:?}",
        encoded.bytes.len(),
        encoded.media_type,
        output_path
    );
    Ok(())
}

/// Build mix options from an optional JSON file plus command-line overrides
fn mix_options(args: &RenderArgs) -> Result<MixOptions> {
    let mut options = match &args.options {
        Some(file) => {
            let path = expand(file);
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read options file: {:?}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Invalid options file: {:?}", path))?
        }
        None => MixOptions::default(),
    };

    if let Some(duration) = args.duration {
        options.target_duration_seconds = duration;
    }
    if let Some(db) = args.music_db {
        options.music_volume_db = db;
    }
    if let Some(db) = args.focus_db {
        options.focus_volume_db = db;
    }
    if let Some(seconds) = args.crossfade {
        options.crossfade_seconds = seconds;
    }
    if let Some(format) = args.format {
        options.export_format = format.into();
    }
    if let Some(bpm) = args.target_bpm {
        options.target_bpm = Some(bpm);
    }
    if let Some(bpm) = args.source_bpm {
        options.source_bpm_override = Some(bpm);
    }
    if let (Some(intro_end), Some(outro_start)) = (args.intro_end, args.outro_start) {
        options = options.with_boundaries(intro_end, outro_start);
    }
    if let Some(rate) = args.sample_rate {
        options.sample_rate = rate;
    }

    Ok(options)
}

fn load_and_analyze(path: &Path, role: SourceRole) -> Result<(Signal, Metadata)> {
    let (signal, options) = load(path, role)?;
    let metadata = analyze(&signal, &options, |status| log::debug!("{:?}: {}", path, status));
    Ok((signal, metadata))
}

/// Read and decode a file, returning analysis options carrying its name
fn load(path: &Path, role: SourceRole) -> Result<(Signal, AnalysisOptions)> {
    log::info!("Loading {:?}", path);
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to open audio file: {:?}", path))?;

    let extension = path.extension().and_then(|e| e.to_str());
    let signal = SymphoniaDecoder::new()
        .decode(&bytes, extension)
        .with_context(|| format!("Failed to decode audio file: {:?}", path))?;

    let mut options = AnalysisOptions::new(role);
    if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
        options = options.with_file_name(name);
    }
    Ok((signal, options))
}

/// Expand ~ in a user-supplied path
fn expand(path: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(path).into_owned())
}

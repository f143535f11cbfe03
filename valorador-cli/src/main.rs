use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use valorador_core::export::{render_summary, to_csv_string, to_docx, to_json};
use valorador_core::preprocessors::PdfPreprocessor;
use valorador_core::{
    DocumentProcessor, Evidence, PipelineStages, ReaderError, ReportMeta, ScoreReport, StepProfiler,
    ValoradorConfig,
};

#[derive(Parser)]
#[command(name = "valorador")]
#[command(about = "Score an academic CV against the researcher-category valuation rubric")]
struct Args {
    /// Path to the CV (.docx, .pdf or .txt)
    #[arg(short, long, required_unless_present = "show_config")]
    input: Option<PathBuf>,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Output file path (if not specified, auto-generated based on input)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Docente name printed on the Word report
    #[arg(long)]
    docente: Option<String>,

    /// Institution printed on the Word report
    #[arg(long)]
    institucion: Option<String>,

    /// Print the text snippets behind every detected item
    #[arg(long)]
    explain: bool,

    /// Dump all intermediate pipeline stage outputs to a directory
    #[arg(long)]
    dump_stages: bool,

    /// Directory for stage dump output
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: PathBuf,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Print the effective configuration as YAML and exit
    #[arg(long)]
    show_config: bool,

    /// Year that open ranges ("2018 - actualidad") run up to
    #[arg(long)]
    reference_year: Option<i32>,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Console summary only
    Table,
    Csv,
    Json,
    Docx,
}

impl OutputFormat {
    fn extension(self) -> Option<&'static str> {
        match self {
            OutputFormat::Table => None,
            OutputFormat::Csv => Some("csv"),
            OutputFormat::Json => Some("json"),
            OutputFormat::Docx => Some("docx"),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    let mut config = match &args.config {
        Some(path) => ValoradorConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => ValoradorConfig::default(),
    };
    if let Some(year) = args.reference_year {
        config.reference_year = year;
    }

    if args.show_config {
        print!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    println!("📑 Valorador de CV docente");
    match &args.config {
        Some(path) => println!("📋 Loaded config from: {}", path.display()),
        None => println!("📋 Using built-in rubric"),
    }

    let Some(input) = args.input.as_deref() else {
        anyhow::bail!("--input is required");
    };
    if !input.exists() {
        println!("⚠️  CV not found at: {}", input.display());
        println!("   Please check the file path.");
        std::process::exit(1);
    }

    let processor = DocumentProcessor::new(config)?;
    println!(
        "🔍 {} detectors, reference year {}",
        processor.bank().len(),
        processor.config().reference_year
    );
    if !PdfPreprocessor::is_available() {
        println!("ℹ️  Built without PDF support");
    }
    println!("📄 Processing: {}", input.display());

    if args.dump_stages {
        println!("\n🔬 Pipeline stage dump mode");
        match processor.process_file_capture_stages(input) {
            Ok(stages) => {
                save_stages(&stages, &args.stages_dir)?;
                println!("\n✅ All stages dumped to: {}", args.stages_dir.display());
                return Ok(());
            }
            Err(e) => fail(&e),
        }
    }

    let mut profiler = StepProfiler::new(args.profile);
    let scored = if args.explain {
        processor
            .process_file_capture_stages_with_profiler(input, &mut profiler)
            .map(|stages| (stages.report, Some(stages.evidence)))
    } else {
        processor
            .process_file_with_profiler(input, &mut profiler)
            .map(|report| (report, None))
    };
    let (report, evidence) = match scored {
        Ok(scored) => scored,
        Err(e) => fail(&e),
    };

    println!("✅ Successfully scored document\n");
    print!("{}", render_summary(&report));

    if let Some(evidence) = &evidence {
        print_evidence(evidence);
    }

    if args.profile {
        println!("\n⏱️  Pipeline profile:");
        print!("{}", profiler.summary());
    }

    if let Some(extension) = args.format.extension() {
        let output_path = args
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(input, args.config.as_deref(), extension));
        let meta = ReportMeta {
            docente: args.docente.clone(),
            institucion: args.institucion.clone(),
        };
        save_report(&report, &meta, args.format, &output_path)?;
    }

    Ok(())
}

fn init_logging(level: &str) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .with_context(|| format!("invalid log level/filter '{level}'"))?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))
}

/// Print the error with a hint for reader failures and exit with status 1.
fn fail(err: &anyhow::Error) -> ! {
    eprintln!("❌ Processing failed: {err:#}");
    match err.downcast_ref::<ReaderError>() {
        Some(ReaderError::UnsupportedFormat { .. }) => {
            eprintln!("   Supported formats: .docx, .pdf, .txt");
        }
        Some(ReaderError::MissingCapability { .. }) => {
            eprintln!("   Rebuild with: --features pdf");
        }
        _ => {}
    }
    std::process::exit(1);
}

fn print_evidence(evidence: &[Evidence]) {
    println!("\n🔎 Evidence:");
    if evidence.is_empty() {
        println!("   (none)");
    }
    for item in evidence {
        println!("  {} ×{}", item.key, item.units);
        for snippet in &item.snippets {
            println!("     … {snippet} …");
        }
    }
}

/// `<input stem>[_<config stem>]_valoracion.<ext>` next to the working directory.
fn default_output_path(input: &Path, config: Option<&Path>, extension: &str) -> PathBuf {
    let input_name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cv");
    let config_suffix = config
        .and_then(|p| p.file_stem())
        .and_then(|s| s.to_str())
        .map(|s| format!("_{s}"))
        .unwrap_or_default();
    PathBuf::from(format!("{input_name}{config_suffix}_valoracion.{extension}"))
}

fn save_report(
    report: &ScoreReport,
    meta: &ReportMeta,
    format: OutputFormat,
    output_path: &Path,
) -> Result<()> {
    let bytes = match format {
        OutputFormat::Csv => to_csv_string(report)?.into_bytes(),
        OutputFormat::Json => to_json(report)?.into_bytes(),
        OutputFormat::Docx => to_docx(report, meta, chrono::Local::now().date_naive())?,
        OutputFormat::Table => return Ok(()),
    };
    std::fs::write(output_path, bytes)
        .with_context(|| format!("failed to write {}", output_path.display()))?;
    tracing::info!(path = %output_path.display(), format = ?format, "report written");

    match format {
        OutputFormat::Csv => println!("\n💾 CSV saved to: {}", output_path.display()),
        OutputFormat::Json => println!("\n💾 JSON saved to: {}", output_path.display()),
        OutputFormat::Docx => println!("\n💾 Word report saved to: {}", output_path.display()),
        OutputFormat::Table => {}
    }
    Ok(())
}

fn save_stages(stages: &PipelineStages, output_dir: &Path) -> Result<()> {
    use std::fs;
    fs::create_dir_all(output_dir)?;

    // Stage 1: extracted text
    let raw_path = output_dir.join("stage1_raw_text.txt");
    fs::write(&raw_path, &stages.raw_text)?;
    println!("  💾 {} ({} chars)", raw_path.display(), stages.source.characters);

    // Stage 2: normalized text
    let normalized_path = output_dir.join("stage2_normalized.txt");
    fs::write(&normalized_path, stages.normalized.as_str())?;
    println!("  💾 {}", normalized_path.display());

    // Stage 3: detections and evidence
    let detections_path = output_dir.join("stage3_detections.json");
    fs::write(
        &detections_path,
        serde_json::to_string_pretty(&serde_json::json!({
            "units": &stages.detections,
            "evidence": &stages.evidence,
        }))?,
    )?;
    println!(
        "  💾 {} ({} items detected)",
        detections_path.display(),
        stages.evidence.len()
    );

    // Stage 4: score report
    let report_path = output_dir.join("stage4_report.json");
    fs::write(&report_path, to_json(&stages.report)?)?;
    println!(
        "  💾 {} (total {})",
        report_path.display(),
        stages.report.grand_total
    );

    let summary = serde_json::json!({
        "input": stages.source.file_name,
        "source_kind": stages.source.kind,
        "fingerprint": stages.source.fingerprint,
        "captured_at": chrono::Utc::now().to_rfc3339(),
        "stage_counts": {
            "raw_chars": stages.source.characters,
            "normalized_chars": stages.normalized.as_str().chars().count(),
            "detected_items": stages.evidence.len(),
        },
        "totals": stages.report.totals(),
    });
    let summary_path = output_dir.join("summary.json");
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    println!("  💾 {}", summary_path.display());
    tracing::info!(dir = %output_dir.display(), files = 5, "pipeline stages dumped");

    Ok(())
}

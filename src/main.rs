use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueHint};
use clap_complete::{generate, Shell};
use console::style;
use dialoguer::{theme::ColorfulTheme, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use allele_insight::discovery::sniff_format;
use allele_insight::{
    AnalysisResult, Analyzer, FileDiscovery, KnowledgeBases, KnowledgeSources, ReportFormat,
    ReportGenerator, RiskTier, Settings, SourceFormat, TraitCategory,
};

const BATCH_PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";

/// Consumer genotype export interpreter
#[derive(Parser, Debug)]
#[command(
    name = "allele-insight",
    version,
    about = "Interpret consumer DNA-test raw data against disease-risk and trait tables",
    long_about = r#"
Parses raw genotype exports and reports:
- Disease-risk findings from a curated SNP table, filed by risk tier
- Findings from a bulk ClinVar variant_summary table (optional)
- Pharmacogenomic variants
- Trait and wellness findings grouped by category

Supports 23andMe, AncestryDNA, MyHeritage, FTDNA, Genera and single-sample
VCF exports, plain or gzip/zip compressed.
"#
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short, long, global = true)]
    threads: Option<usize>,

    /// Settings file (TOML)
    #[arg(long, global = true, env = "ALLELE_INSIGHT_CONFIG", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// ClinVar variant_summary table (plain or .gz)
    #[arg(long, global = true, env = "CLINVAR_PATH", value_hint = ValueHint::FilePath)]
    clinvar: Option<PathBuf>,

    /// Replacement disease SNP table (TOML)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    disease_table: Option<PathBuf>,

    /// Replacement trait SNP table (TOML)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    trait_table: Option<PathBuf>,

    /// Output directory for reports
    #[arg(short, long, global = true, value_hint = ValueHint::DirPath)]
    output: Option<PathBuf>,

    /// Report format
    #[arg(long, global = true, value_enum)]
    report_format: Option<ReportFormat>,

    /// Interactive mode with prompts for all parameters
    #[arg(short, long, help = "Interactive mode with default values")]
    interactive: bool,

    /// Subcommands
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one genotype export
    Analyze {
        /// Raw data file (.txt, .csv, .vcf, optionally .gz or .zip)
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,

        /// Source format; detected from the file header when omitted
        #[arg(short, long, value_enum)]
        format: Option<SourceFormat>,
    },
    /// Analyze every export found under the given files and directories
    Batch {
        #[arg(required = true, num_args = 1.., value_hint = ValueHint::AnyPath)]
        paths: Vec<PathBuf>,

        /// Recursively search directories
        #[arg(short, long)]
        recursive: bool,

        /// Source format for every file; detected per file when omitted
        #[arg(short, long, value_enum)]
        format: Option<SourceFormat>,
    },
    /// Query the loaded knowledge bases
    Kb(KbQuery),
    /// List supported source formats
    Formats,
    /// Generate shell completions
    Completions { shell: Shell },
}

#[derive(Args, Debug)]
struct KbQuery {
    /// Look up one rsID in every table
    #[arg(long)]
    rsid: Option<String>,

    /// List disease entries in a category
    #[arg(long)]
    category: Option<String>,

    /// List trait entries in a category
    #[arg(long, value_enum)]
    trait_category: Option<TraitCategory>,

    /// List every high-significance disease entry
    #[arg(long)]
    high: bool,
}

impl KbQuery {
    fn is_empty(&self) -> bool {
        self.rsid.is_none()
            && self.category.is_none()
            && self.trait_category.is_none()
            && !self.high
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Completions { shell }) => {
            generate_completions(*shell);
            return Ok(());
        }
        Some(Commands::Formats) => {
            list_formats();
            return Ok(());
        }
        _ => {}
    }

    init_logging(cli.verbose);

    let settings = resolve_settings(&cli)?;

    if cli.interactive {
        let (config, input, format) = run_interactive_mode(settings)?;
        init_thread_pool(config.threads)?;
        return run_analyze(&config, &input, format);
    }

    let config = AppConfig::from_settings(settings);
    init_thread_pool(config.threads)?;
    info!("Using {} threads", rayon::current_num_threads());

    match cli.command {
        Some(Commands::Analyze { input, format }) => run_analyze(&config, &input, format),
        Some(Commands::Batch {
            paths,
            recursive,
            format,
        }) => run_batch(&config, &paths, recursive, format),
        Some(Commands::Kb(query)) => run_kb_query(&config, &query),
        Some(Commands::Formats) | Some(Commands::Completions { .. }) => Ok(()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn list_formats() {
    println!("{}", style("Supported Genotype Export Formats:").bold().cyan());
    println!();

    for format in SourceFormat::ALL {
        println!("  {}", style(format.tag()).green().bold());
        println!("         {}", style(format.description()).dim());
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("allele_insight={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn init_thread_pool(threads: usize) -> Result<()> {
    // 0 leaves the choice to rayon
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .map_err(|e| anyhow::anyhow!("Failed to initialize thread pool: {}", e))?;

    Ok(())
}

/// Merge command-line flags (and their environment fallbacks) over the settings file.
fn resolve_settings(cli: &Cli) -> Result<Settings> {
    let from_cli = Settings {
        clinvar_path: cli.clinvar.clone(),
        disease_table: cli.disease_table.clone(),
        trait_table: cli.trait_table.clone(),
        threads: cli.threads,
        output_dir: cli.output.clone(),
        report_format: cli.report_format,
    };

    let from_file = match &cli.config {
        Some(path) => Settings::from_path(path)?,
        None => Settings::default(),
    };

    Ok(from_cli.or(from_file))
}

#[derive(Debug)]
struct AppConfig {
    sources: KnowledgeSources,
    threads: usize,
    output: PathBuf,
    report_format: ReportFormat,
}

impl AppConfig {
    fn from_settings(settings: Settings) -> Self {
        Self {
            sources: settings.knowledge_sources(),
            threads: settings.threads.unwrap_or(0),
            output: settings
                .output_dir
                .unwrap_or_else(|| PathBuf::from("./reports")),
            report_format: settings.report_format.unwrap_or_default(),
        }
    }
}

fn run_interactive_mode(
    settings: Settings,
) -> Result<(AppConfig, PathBuf, Option<SourceFormat>)> {
    println!(
        "{}",
        style("╔══════════════════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║          Allele Insight - Interactive Mode                   ║")
            .cyan()
            .bold()
    );
    println!(
        "{}",
        style("╚══════════════════════════════════════════════════════════════╝").cyan()
    );
    println!();

    let theme = ColorfulTheme::default();
    let defaults = AppConfig::from_settings(settings.clone());

    let input: String = Input::with_theme(&theme)
        .with_prompt("Genotype export file")
        .interact_text()?;

    // Source format
    let mut format_items = vec!["Detect from file header".to_string()];
    format_items.extend(
        SourceFormat::ALL
            .iter()
            .map(|f| format!("{} - {}", f.tag(), f.description())),
    );
    let format_idx = Select::with_theme(&theme)
        .with_prompt("Select source format")
        .default(0)
        .items(&format_items)
        .interact()?;
    let format = format_idx
        .checked_sub(1)
        .and_then(|idx| SourceFormat::ALL.get(idx).copied());

    let clinvar: String = Input::with_theme(&theme)
        .with_prompt("ClinVar variant_summary table (empty to skip)")
        .default(
            settings
                .clinvar_path
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default(),
        )
        .allow_empty(true)
        .interact_text()?;

    // Report format
    let report_formats = vec!["JSON", "TSV", "All formats"];
    let report_idx = Select::with_theme(&theme)
        .with_prompt("Select report format")
        .default(match defaults.report_format {
            ReportFormat::Json => 0,
            ReportFormat::Tsv => 1,
            ReportFormat::All => 2,
        })
        .items(&report_formats)
        .interact()?;
    let report_format = match report_idx {
        1 => ReportFormat::Tsv,
        2 => ReportFormat::All,
        _ => ReportFormat::Json,
    };

    let output: String = Input::with_theme(&theme)
        .with_prompt("Output directory")
        .default(defaults.output.display().to_string())
        .interact_text()?;

    let threads: usize = Input::with_theme(&theme)
        .with_prompt("Number of threads (0 = auto-detect)")
        .default(defaults.threads)
        .interact_text()?;

    let mut sources = defaults.sources;
    sources.clinvar = if clinvar.trim().is_empty() {
        None
    } else {
        Some(PathBuf::from(clinvar.trim()))
    };

    let config = AppConfig {
        sources,
        threads,
        output: PathBuf::from(output),
        report_format,
    };

    Ok((config, PathBuf::from(input), format))
}

fn load_knowledge(config: &AppConfig) -> Result<Arc<KnowledgeBases>> {
    let knowledge =
        KnowledgeBases::load(&config.sources).context("Failed to load knowledge bases")?;
    for warning in knowledge.warnings() {
        println!("{} {}", style("!").yellow().bold(), style(warning).yellow());
    }
    Ok(Arc::new(knowledge))
}

fn resolve_format(path: &Path, format: Option<SourceFormat>) -> Result<SourceFormat> {
    match format {
        Some(format) => Ok(format),
        None => {
            let detected = sniff_format(path)?;
            info!("Detected {} format for {}", detected, path.display());
            Ok(detected)
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "genome".to_string())
}

fn run_analyze(config: &AppConfig, input: &Path, format: Option<SourceFormat>) -> Result<()> {
    let analyzer = Analyzer::new(load_knowledge(config)?);
    let format = resolve_format(input, format)?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner.set_message(format!("Analyzing {} as {}...", input.display(), format));

    let result = analyzer
        .analyze_path(input, format)
        .with_context(|| format!("Failed to analyze {}", input.display()));
    spinner.finish_and_clear();
    let result = result?;

    print_summary(input, &result);

    let generator = ReportGenerator::new(&config.output)?;
    let written = generator.generate(&file_stem(input), &result, config.report_format)?;
    for path in &written {
        println!("  {} {}", style("→").dim(), path.display());
    }

    println!(
        "\n{} Reports saved to: {}",
        style("✓").green().bold(),
        style(config.output.display()).cyan()
    );

    Ok(())
}

fn run_batch(
    config: &AppConfig,
    paths: &[PathBuf],
    recursive: bool,
    format: Option<SourceFormat>,
) -> Result<()> {
    let files = FileDiscovery::new(recursive).discover(paths)?;
    if files.is_empty() {
        warn!("No genotype files found");
        println!("{} No genotype files found", style("✗").red());
        return Ok(());
    }
    info!("Found {} files to analyze", files.len());

    let analyzer = Analyzer::new(load_knowledge(config)?);
    let generator = ReportGenerator::new(&config.output)?;

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(BATCH_PROGRESS_TEMPLATE)?
            .progress_chars("#>-"),
    );
    pb.set_message("Analyzing genotype files...");

    let outcomes: Vec<(PathBuf, Result<AnalysisResult>)> = files
        .par_iter()
        .map(|path| {
            let outcome = resolve_format(path, format).and_then(|format| {
                analyzer
                    .analyze_path(path, format)
                    .map_err(anyhow::Error::from)
            });
            pb.inc(1);
            (path.clone(), outcome)
        })
        .collect();

    pb.finish_with_message("Analysis complete!");

    let mut failures = 0;
    for (path, outcome) in outcomes {
        match outcome {
            Ok(result) => {
                print_summary(&path, &result);
                generator.generate(&file_stem(&path), &result, config.report_format)?;
            }
            Err(e) => {
                failures += 1;
                warn!("Failed to analyze {}: {:#}", path.display(), e);
                println!("{} {}: {:#}", style("✗").red(), path.display(), e);
            }
        }
    }

    println!(
        "\n{} {} of {} files analyzed, reports saved to: {}",
        style("✓").green().bold(),
        files.len() - failures,
        files.len(),
        style(config.output.display()).cyan()
    );

    Ok(())
}

fn print_summary(path: &Path, result: &AnalysisResult) {
    let summary = &result.findings_summary;

    println!();
    println!("{}", style(path.display()).bold().cyan());
    println!("  SNPs analyzed:         {}", summary.total_snps_analyzed);
    println!("  ClinVar matches:       {}", summary.clinvar_matches);
    println!(
        "  High risk:             {}",
        style(summary.high_risk_variants).red().bold()
    );
    println!(
        "  Moderate risk:         {}",
        style(summary.moderate_risk_variants).yellow()
    );
    println!("  Low risk:              {}", summary.low_risk_variants);
    println!(
        "  Beneficial:            {}",
        style(summary.beneficial_variants).green()
    );
    println!("  Pharmacogenomic:       {}", summary.pharmacogenomic_variants);
    println!(
        "  Traits analyzed:       {} of {}",
        summary.traits_analyzed, result.traits_result.total_traits_checked
    );

    for finding in result.risk_result.bucket(RiskTier::High) {
        println!(
            "    {} {} ({}) {}: {}",
            style("●").red(),
            finding.rsid,
            finding.gene,
            finding.genotype,
            finding.condition
        );
    }
}

fn run_kb_query(config: &AppConfig, query: &KbQuery) -> Result<()> {
    let knowledge = load_knowledge(config)?;

    if query.is_empty() {
        println!("{}", style("Knowledge Bases:").bold().cyan());
        println!("  Disease SNPs:   {}", knowledge.disease.len());
        for category in knowledge.disease.categories() {
            println!(
                "    {} ({})",
                category,
                knowledge.disease.by_category(category).len()
            );
        }
        println!(
            "  Trait SNPs:     {} entries, {} distinct rsIDs",
            knowledge.traits.len(),
            knowledge.traits.rsids().len()
        );
        for category in TraitCategory::ALL {
            println!(
                "    {} ({})",
                category,
                knowledge.traits.by_category(category).len()
            );
        }
        println!("  ClinVar:        {} variants", knowledge.clinvar.len());
        return Ok(());
    }

    if let Some(rsid) = &query.rsid {
        let rsid = rsid.trim().to_lowercase();
        let mut found = false;

        if let Some(entry) = knowledge.disease.get(&rsid) {
            found = true;
            println!(
                "{} {} ({}) [{}] {}",
                style("disease").green().bold(),
                entry.rsid,
                entry.gene,
                entry.significance,
                entry.condition
            );
            println!("    risk allele {}, {}", entry.risk_allele, entry.description);
        }
        for entry in knowledge.traits.iter().filter(|e| e.rsid == rsid) {
            found = true;
            println!(
                "{} {} ({}) [{}] {}",
                style("trait").green().bold(),
                entry.rsid,
                entry.gene,
                entry.category,
                entry.trait_name
            );
            println!("    risk allele {}, {}", entry.risk_allele, entry.effect);
        }
        if let Some(entry) = knowledge.clinvar.get(&rsid) {
            found = true;
            println!(
                "{} {} ({}) {}: {}",
                style("clinvar").green().bold(),
                rsid,
                entry.gene,
                entry.clinical_significance,
                entry.phenotypes.join("; ")
            );
        }
        if !found {
            println!("{} {} is not in any table", style("✗").red(), rsid);
        }
    }

    if let Some(category) = &query.category {
        let entries = knowledge.disease.by_category(category);
        println!(
            "{} ({} entries)",
            style(category).bold().cyan(),
            entries.len()
        );
        for entry in entries {
            println!(
                "  {} ({}) [{}] {}",
                entry.rsid, entry.gene, entry.significance, entry.condition
            );
        }
    }

    if let Some(category) = query.trait_category {
        let entries = knowledge.traits.by_category(category);
        println!(
            "{} ({} entries)",
            style(category).bold().cyan(),
            entries.len()
        );
        for entry in entries {
            println!("  {} ({}) {}", entry.rsid, entry.gene, entry.trait_name);
        }
    }

    if query.high {
        let entries = knowledge.disease.high_significance();
        println!(
            "{} ({} entries)",
            style("High significance").bold().red(),
            entries.len()
        );
        for entry in entries {
            println!("  {} ({}) {}", entry.rsid, entry.gene, entry.condition);
        }
    }

    Ok(())
}

use chrono::Local;
use clap::{Args as ClapArgs, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;
use tracing_subscriber::EnvFilter;
use voc_insights::demo::Typewriter;
use voc_insights::upload::{self, FileType, UploadedFile, ACCEPTED_EXTENSIONS};
use voc_insights::{AnalysisRequest, AppState, Language, ServerConfig};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "voc-insights")]
#[command(author, version, about = "Turn customer review exports into a bilingual insights dashboard")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

/// Where reports and uploads live
#[derive(ClapArgs, Debug, Clone)]
struct StoreArgs {
    /// SQLite database holding generated reports
    #[arg(long, env = "VOC_DB_PATH", default_value = "voc-insights.db")]
    db_path: PathBuf,

    /// Directory that holds storage buckets
    #[arg(long, env = "VOC_STORAGE_ROOT", default_value = "voc-storage")]
    storage_root: PathBuf,

    /// Bucket for uploaded review files
    #[arg(long, env = "VOC_BUCKET", default_value = "reviews")]
    bucket: String,
}

impl StoreArgs {
    fn config(&self) -> ServerConfig {
        ServerConfig {
            db_path: self.db_path.clone(),
            storage_root: self.storage_root.clone(),
            bucket: self.bucket.clone(),
            ..ServerConfig::default()
        }
    }

    fn open(&self) -> AppState {
        match AppState::open(&self.config()) {
            Ok(state) => state,
            Err(e) => {
                eprintln!("Failed to open report database: {}", e);
                std::process::exit(1);
            }
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP API and dashboard server
    Serve {
        #[command(flatten)]
        config: ServerConfig,

        /// Don't open the browser
        #[arg(long)]
        no_open: bool,
    },

    /// Upload review files and generate one report
    Analyze {
        /// Product category the report is about
        #[arg(short, long)]
        category: String,

        /// Report language (en, zh)
        #[arg(short, long, default_value = "en")]
        language: Language,

        /// Own-brand review export (.csv, .xls, .xlsx)
        #[arg(long)]
        own: PathBuf,

        /// Competitor review export
        #[arg(long)]
        competitor: Option<PathBuf>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Analyze every review export under a directory
    Import {
        /// Directory to scan
        dir: PathBuf,

        /// Product category for every report
        #[arg(short, long)]
        category: String,

        /// Report language (en, zh)
        #[arg(short, long, default_value = "en")]
        language: Language,

        /// Number of parallel workers (default: number of CPUs)
        #[arg(short, long)]
        jobs: Option<usize>,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// List stored reports, newest first
    Reports {
        #[command(flatten)]
        store: StoreArgs,
    },

    /// Write a stored report to disk (.html, .json)
    Export {
        /// Report id
        id: String,

        /// Output file (default: voc-reports/report_<timestamp>.html)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Don't prompt to open the report
        #[arg(long)]
        no_open: bool,

        #[command(flatten)]
        store: StoreArgs,
    },

    /// Type a stored report's JSON out like a streaming response
    Stream {
        /// Report id
        id: String,

        #[command(flatten)]
        store: StoreArgs,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("voc_insights=info")))
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    match args.command {
        Command::Serve { config, no_open } => {
            if let Err(e) = voc_insights::serve::start(config, !no_open) {
                eprintln!("Server error: {}", e);
                std::process::exit(1);
            }
        }
        Command::Analyze { category, language, own, competitor, store } => {
            analyze(&store.open(), &category, language, &own, competitor.as_deref());
        }
        Command::Import { dir, category, language, jobs, store } => {
            import(&store.open(), &dir, &category, language, jobs);
        }
        Command::Reports { store } => list_reports(&store.open()),
        Command::Export { id, output, no_open, store } => export(&store.open(), &id, output, no_open),
        Command::Stream { id, store } => stream(&store.open(), &id),
    }
}

fn read_upload(path: &Path) -> io::Result<UploadedFile> {
    let original_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(UploadedFile {
        content_type: upload::content_type_for(&original_name).to_string(),
        data: std::fs::read(path)?,
        original_name,
    })
}

/// Upload one file and return its stored name
fn ingest(state: &AppState, path: &Path, file_type: FileType) -> Result<String, String> {
    let file = read_upload(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    state
        .store_upload(file, file_type)
        .map(|receipt| receipt.file_name)
        .map_err(|e| format!("{}: {}", path.display(), e))
}

fn analyze(state: &AppState, category: &str, language: Language, own: &Path, competitor: Option<&Path>) {
    let result = ingest(state, own, FileType::OwnBrand).and_then(|own_brand_file| {
        let competitor_file = match competitor {
            Some(p) => Some(ingest(state, p, FileType::Competitor)?),
            None => None,
        };
        let request = AnalysisRequest {
            own_brand_file,
            competitor_file,
            target_category: category.to_string(),
            language,
        };
        state.analyze(&request).map_err(|e| e.to_string())
    });

    match result {
        Ok(report) => {
            eprintln!("\x1b[32m✓\x1b[0m {}", report.summary().title);
            println!("{}", report.id);
        }
        Err(e) => {
            eprintln!("Analysis failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn import(state: &AppState, dir: &Path, category: &str, language: Language, jobs: Option<usize>) {
    if let Some(jobs) = jobs {
        rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build_global()
            .ok();
    }

    let files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ACCEPTED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    if files.is_empty() {
        eprintln!("No review exports found (supported: csv, xls, xlsx)");
        std::process::exit(1);
    }

    eprintln!("\x1b[1mVOC Insights - batch import\x1b[0m");
    eprintln!("{}", "─".repeat(70));
    eprintln!("Found {} review file(s)\n", files.len());

    let pb = ProgressBar::new(files.len() as u64);
    if let Ok(style) = ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}") {
        pb.set_style(style.progress_chars("=>-"));
    }

    let results: Vec<(PathBuf, Result<String, String>)> = files
        .par_iter()
        .map(|path| {
            let result = ingest(state, path, FileType::OwnBrand).and_then(|own_brand_file| {
                let request = AnalysisRequest {
                    own_brand_file,
                    competitor_file: None,
                    target_category: category.to_string(),
                    language,
                };
                state.analyze(&request).map(|r| r.id).map_err(|e| e.to_string())
            });
            pb.inc(1);
            pb.set_message(path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default());
            (path.clone(), result)
        })
        .collect();
    pb.finish_and_clear();

    let mut failed = 0;
    for (path, result) in &results {
        match result {
            Ok(id) => println!("\x1b[32m{:<8}\x1b[0m {}  {}", "[OK]", id, path.display()),
            Err(e) => {
                failed += 1;
                println!("\x1b[31m{:<8}\x1b[0m {}", "[FAILED]", e);
            }
        }
    }

    eprintln!("\n{}", "─".repeat(70));
    eprintln!("\x1b[1mSummary:\x1b[0m");
    eprintln!("  \x1b[32m✓ Reports:\x1b[0m {}", results.len() - failed);
    if failed > 0 {
        eprintln!("  \x1b[31m✗ Failed:\x1b[0m  {}", failed);
        std::process::exit(1);
    }
}

fn list_reports(state: &AppState) {
    let reports = match state.db.list_reports() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to list reports: {}", e);
            std::process::exit(1);
        }
    };

    if reports.is_empty() {
        eprintln!("No reports yet.");
        return;
    }

    println!("{:<38} {:<4} {:<5} {:<20} TITLE", "ID", "LANG", "COMP", "CATEGORY");
    println!("{}", "─".repeat(100));
    for r in reports {
        println!(
            "{:<38} {:<4} {:<5} {:<20} {}",
            r.id,
            r.language,
            if r.has_competitor_data { "yes" } else { "no" },
            truncate(&r.target_category, 20),
            r.title
        );
    }
}

fn load_report(state: &AppState, id: &str) -> voc_insights::AnalysisReport {
    match state.db.get_report(id) {
        Ok(Some(report)) => report,
        Ok(None) => {
            eprintln!("Report '{}' not found", id);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to load report: {}", e);
            std::process::exit(1);
        }
    }
}

fn export(state: &AppState, id: &str, output: Option<PathBuf>, no_open: bool) {
    let report = load_report(state, id);

    let output_path = output.unwrap_or_else(|| {
        let dir = PathBuf::from("voc-reports");
        std::fs::create_dir_all(&dir).ok();
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        dir.join(format!("report_{}.html", timestamp))
    });

    if let Err(e) = voc_insights::report::generate(&output_path, &report) {
        eprintln!("Failed to write report: {}", e);
        std::process::exit(1);
    }
    eprintln!("\n\x1b[32mReport saved: {}\x1b[0m", output_path.display());

    if no_open {
        return;
    }
    eprint!("\nOpen report in browser? [Y/n] ");
    io::stderr().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_ok() {
        let input = input.trim().to_lowercase();
        if input.is_empty() || input == "y" || input == "yes" {
            if let Err(e) = open::that(&output_path) {
                eprintln!("Failed to open report: {}", e);
            }
        }
    }
}

fn stream(state: &AppState, id: &str) {
    let report = load_report(state, id);
    let json = match serde_json::to_string_pretty(&report) {
        Ok(j) => j,
        Err(e) => {
            eprintln!("Failed to encode report: {}", e);
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = Typewriter::new(&json).run(&mut out, &AtomicBool::new(false)) {
        eprintln!("Stream interrupted: {}", e);
        std::process::exit(1);
    }
    let _ = writeln!(out);
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

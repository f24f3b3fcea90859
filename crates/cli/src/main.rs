mod echo;
mod generate;

use std::fs;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::Context;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use voiceprint_core::{
    DEFAULT_MIN_SAMPLE_CHARS, DEFAULT_PLATFORM_DOMAIN, FeedDocument, HttpTransport, InstructionSource, JsonConfig,
    PreparedPrompt, StyleConfig, StyleExtractor, VoiceprintError, convert_to_json, fetch_file, fetch_stdin,
    generate_stylesheet, load_instruction,
};

use crate::generate::CommandGenerator;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for the prompt or stylesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Invalid format: {}. Valid options: text, json", s)),
        }
    }
}

/// Build a writing-style extraction prompt from a publication's recent posts
#[derive(Parser, Debug)]
#[command(name = "voiceprint")]
#[command(author = "Voiceprint Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Build a writing-style prompt from a publication's feed", long_about = None)]
struct Args {
    /// Publication URL or name, or "-" to read a feed from stdin
    #[arg(value_name = "INPUT", required_unless_present_any = ["file", "completions"], conflicts_with = "file")]
    input: Option<String>,

    /// Read a previously downloaded feed instead of fetching one
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Output format (text, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: OutputFormat,

    /// Instruction template file (default: ~/.config/voiceprint/instruction.txt, then built-in)
    #[arg(long, value_name = "FILE")]
    instruction: Option<PathBuf>,

    /// Maximum corpus size in characters
    #[arg(long, value_name = "NUM")]
    budget: Option<usize>,

    /// Minimum cleaned length for a post to count as a sample
    #[arg(long, default_value_t = DEFAULT_MIN_SAMPLE_CHARS, value_name = "NUM")]
    min_chars: usize,

    /// Hosting platform used to guess the canonical feed host
    #[arg(long, default_value = DEFAULT_PLATFORM_DOMAIN, value_name = "DOMAIN")]
    platform_domain: String,

    /// Deadline in seconds for the whole run, also applied to each HTTP request
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Custom User-Agent for HTTP requests
    #[arg(long, value_name = "UA")]
    user_agent: Option<String>,

    /// Keep subscribe and share widgets in the samples
    #[arg(long)]
    no_boilerplate_strip: bool,

    /// Shell command that reads the prompt on stdin and prints a stylesheet
    #[arg(long, value_name = "COMMAND")]
    generate_with: Option<String>,

    /// Leave the prompt text out of JSON output
    #[arg(long)]
    no_prompt: bool,

    /// Print JSON on a single line
    #[arg(long)]
    compact: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// Generate shell completion script
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,
}

impl Args {
    fn style_config(&self) -> StyleConfig {
        let mut builder = StyleConfig::builder()
            .min_sample_chars(self.min_chars)
            .platform_domain(&self.platform_domain)
            .strip_boilerplate(!self.no_boilerplate_strip);

        if let Some(budget) = self.budget {
            builder = builder.char_budget(budget);
        }
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }

        builder.build()
    }

    fn total_steps(&self) -> usize {
        if self.generate_with.is_some() { 4 } else { 3 }
    }
}

fn init_tracing(verbose: bool) {
    let default_directive = if verbose { "voiceprint=debug,voiceprint_core=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Some(shell) = args.completions {
        clap_complete::generate(shell, &mut Args::command(), "voiceprint", &mut io::stdout());
        return;
    }

    init_tracing(args.verbose);

    if let Err(e) = run(args).await {
        echo::print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    if args.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    let (instruction, source) =
        load_instruction(args.instruction.as_deref()).context("Failed to load instruction template")?;

    if args.verbose {
        let origin = match &source {
            InstructionSource::File(path) | InstructionSource::UserConfig(path) => path.display().to_string(),
            InstructionSource::BuiltIn => "built-in".to_string(),
        };
        echo::print_info(&format!("Instruction: {}", origin));
        eprintln!();
    }

    match args.timeout {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), execute(&args, &instruction))
            .await
            .map_err(|_| VoiceprintError::Timeout { timeout: secs })?,
        None => execute(&args, &instruction).await,
    }
}

async fn execute(args: &Args, instruction: &str) -> anyhow::Result<()> {
    let total = args.total_steps();
    let extractor = StyleExtractor::with_config(args.style_config()).context("Failed to create HTTP client")?;

    let document = read_document(args, &extractor).await?;

    if args.verbose {
        echo::print_detail("Source", &document.url);
        echo::print_detail("Size", &echo::format_size(document.body.len()));
        eprintln!();
        echo::print_step(2, total, "Parsing feed and building prompt");
    }

    let prepared = extractor.prepare_document(&document, instruction)?;

    if args.verbose {
        echo::print_corpus_details(&prepared);
    }

    let output = match &args.generate_with {
        Some(command) => {
            if args.verbose {
                echo::print_step(3, total, &format!("Generating stylesheet with {}", command.bright_white()));
            }
            let stylesheet = generate_stylesheet(prepared, &CommandGenerator::new(command)).await?;
            render(args, &stylesheet.prepared, Some(&stylesheet.text))?
        }
        None => render(args, &prepared, None)?,
    };

    if args.verbose {
        echo::print_step(total, total, "Writing output");
        echo::print_detail("Format", &format!("{:?}", args.format));
        eprintln!();
    }

    match &args.output {
        Some(path) => {
            fs::write(path, output).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => {
            print!("{}", output);
        }
    }

    Ok(())
}

async fn read_document(args: &Args, extractor: &StyleExtractor<HttpTransport>) -> anyhow::Result<FeedDocument> {
    let total = args.total_steps();

    if let Some(path) = &args.file {
        if args.verbose {
            echo::print_step(1, total, &format!("Reading feed from file {}", path.display().bright_white()));
        }
        return Ok(fetch_file(&path.to_string_lossy())?);
    }

    match args.input.as_deref() {
        Some("-") => {
            if args.verbose {
                echo::print_step(1, total, "Reading feed from stdin");
            }
            fetch_stdin().context("Failed to read from stdin")
        }
        Some(identifier) => {
            if args.verbose {
                echo::print_step(1, total, &format!("Locating feed for {}", identifier.bright_white().underline()));
            }
            Ok(extractor.fetch(identifier).await?)
        }
        None => anyhow::bail!("No input given. Pass a publication URL, '-' for stdin, or --file"),
    }
}

/// Renders the prompt, or the stylesheet when one was generated.
fn render(args: &Args, prepared: &PreparedPrompt, stylesheet: Option<&str>) -> anyhow::Result<String> {
    match args.format {
        OutputFormat::Text => Ok(stylesheet.map_or_else(|| prepared.prompt.to_string(), str::to_string)),
        OutputFormat::Json => {
            let config = JsonConfig { include_prompt: !args.no_prompt, pretty: !args.compact };
            convert_to_json(prepared, stylesheet, &config).context("Failed to convert to JSON")
        }
    }
}

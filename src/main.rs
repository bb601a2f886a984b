use std::io::Read;
use std::path::PathBuf;

use careerdoc::config::AppConfig;
use careerdoc::layout::OverflowPolicy;
use careerdoc::model::{output_file_name, AiContent, PrescriptionRequest, Status};
use careerdoc::prompt::{build_prompt, ChatRequest};
use careerdoc::table::{self, DomainValidation};
use careerdoc::{telemetry, CareerDocError, RenderContext};
use clap::{Args, Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "careerdoc",
    about = "Generate career prescription PDFs from a domain selection and model-written text",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a prescription request (JSON) to a PDF
    Render(RenderArgs),
    /// List the domains in the catalog
    Domains,
    /// Print the career table rows and spans for a selection as JSON
    Table(SelectionArgs),
    /// Print the language-model prompt for a selection
    Prompt(PromptArgs),
    /// Print a sample prescription request
    Example,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Request file, or '-' to read stdin
    input: PathBuf,
    /// Output path (defaults to a timestamped file in the output directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Override the configured header image
    #[arg(long)]
    header: Option<PathBuf>,
    /// Override the configured page template
    #[arg(long)]
    template: Option<PathBuf>,
    /// Reject domains the catalog does not know
    #[arg(long)]
    strict: bool,
    /// Continue content that does not fit onto a new page
    #[arg(long)]
    new_page: bool,
}

#[derive(Args, Debug)]
struct SelectionArgs {
    /// Domain names, in selection order
    #[arg(required = true)]
    domains: Vec<String>,
}

#[derive(Args, Debug)]
struct PromptArgs {
    #[command(flatten)]
    selection: SelectionArgs,
    /// Print the full chat completion request body instead of the prompt text
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(err) = run_cli() {
        eprintln!("careerdoc error: {err}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<(), CareerDocError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command {
        Command::Render(args) => {
            if let Some(header) = args.header.clone() {
                config.header_image = header;
            }
            if let Some(template) = args.template.clone() {
                config.template_path = template;
            }
            if args.strict {
                config.domain_validation = DomainValidation::Strict;
            }
            if args.new_page {
                config.overflow = OverflowPolicy::NewPage;
            }
            run_render(&config, args)
        }
        Command::Domains => run_domains(&config),
        Command::Table(args) => run_table(&config, &args),
        Command::Prompt(args) => run_prompt(&args),
        Command::Example => {
            println!("{}", serde_json::to_string_pretty(&example_request())?);
            Ok(())
        }
    }
}

fn run_render(config: &AppConfig, args: RenderArgs) -> Result<(), CareerDocError> {
    let json = if args.input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&args.input)?
    };
    let request = PrescriptionRequest::from_json(&json)?;

    let catalog = careerdoc::load_catalog(config.catalog_path.as_deref())?;
    let ctx = RenderContext::from_config(config, &catalog);
    let pdf = careerdoc::render(&request, &ctx)?;

    let path = match args.output {
        Some(path) => path,
        None => {
            std::fs::create_dir_all(&config.output_dir)?;
            let timestamp = chrono::Utc::now().timestamp();
            config
                .output_dir
                .join(output_file_name(&request.name, timestamp))
        }
    };
    std::fs::write(&path, &pdf)?;

    info!(
        path = %path.display(),
        bytes = pdf.len(),
        domains = request.domains.len(),
        "prescription written"
    );
    println!("{}", path.display());
    Ok(())
}

fn run_domains(config: &AppConfig) -> Result<(), CareerDocError> {
    let catalog = careerdoc::load_catalog(config.catalog_path.as_deref())?;
    for entry in catalog.iter() {
        println!(
            "{:<16} {:<28} {} roles",
            entry.name,
            entry.display_name,
            entry.roles.len()
        );
    }
    Ok(())
}

fn run_table(config: &AppConfig, args: &SelectionArgs) -> Result<(), CareerDocError> {
    let catalog = careerdoc::load_catalog(config.catalog_path.as_deref())?;
    let assembly = table::build_checked(&args.domains, &catalog, config.domain_validation)?;
    info!(
        rows = assembly.rows.len(),
        domains = assembly.span_map.len(),
        "career table assembled"
    );
    println!("{}", serde_json::to_string_pretty(&assembly)?);
    Ok(())
}

fn run_prompt(args: &PromptArgs) -> Result<(), CareerDocError> {
    let domains = &args.selection.domains;
    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&ChatRequest::for_domains(domains))?
        );
    } else {
        println!("{}", build_prompt(domains));
    }
    Ok(())
}

fn example_request() -> PrescriptionRequest {
    let domains = vec!["Finance".to_string(), "Retail".to_string()];
    PrescriptionRequest {
        name: "Asha Menon".to_string(),
        status: Status::WorkingProfessional,
        ai_content: AiContent {
            intro_line: "Your profile points towards <b>Finance</b> and <b>Retail</b> analytics."
                .to_string(),
            domain_bullets: vec![
                "<b>Finance Analytics</b>: forecasting, risk scoring and cost control."
                    .to_string(),
                "<b>Retail Analytics</b>: demand planning, pricing and customer segmentation."
                    .to_string(),
            ],
            projects_bullet:
                "Build <b>3 industry projects</b> using <b>SQL</b>, <b>Python</b> and <b>Power BI</b>."
                    .to_string(),
            final_sentence: "With steady practice you can be <b>interview-ready</b> in six months."
                .to_string(),
            domains_title: String::new(),
            error: None,
        },
        domains,
    }
}

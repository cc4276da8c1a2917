use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use hwpx_fill::{
    Dispatcher, Error, FieldMap, JsonTemplateRegistry, TemplateRegistry, parse_markdown_content,
    render_report,
};

#[derive(Parser)]
#[command(name = "hwpx-fill", version, about = "Analyze HWPX documents and fill form templates")]
struct Cli {
    /// Log more (debug level) when RUST_LOG is unset
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Template registry directory
    #[arg(long, global = true, default_value = "templates")]
    templates: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show which document formats this environment supports
    Info,
    /// Write a Markdown structure report for a document
    Analyze {
        file: PathBuf,
        /// Report path (defaults to <stem>_structure.md beside the document)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Also print the report to stdout
        #[arg(long)]
        print: bool,
    },
    /// Fill a template with field values from a Markdown or JSON file
    Fill {
        /// Template document, or a registered template name with --registered
        template: String,
        /// Field values: Markdown headings or a JSON object of name → value
        content: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Treat TEMPLATE as a name in the template registry
        #[arg(long)]
        registered: bool,
    },
    /// Manage stored templates
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },
}

#[derive(Subcommand)]
enum TemplateAction {
    /// Store a template under a name
    Save {
        name: String,
        file: PathBuf,
        /// JSON object mapping field names to content keys
        #[arg(long)]
        mapping: Option<PathBuf>,
    },
    /// Show a stored template's record
    Get { name: String },
    /// List stored template names
    List,
    /// Remove a stored template
    Delete { name: String },
    /// Replace a stored template's field mapping
    Map { name: String, mapping: PathBuf },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Error> {
    let dispatcher = Dispatcher::new();
    match cli.command {
        Command::Info => {
            let info = dispatcher.support_info();
            println!("HWPX: {}", info.hwpx.message);
            println!("HWP: {}", info.hwp.message);
        }
        Command::Analyze {
            file,
            output,
            print,
        } => {
            let doc = dispatcher.analyze(&file)?;
            for warning in &doc.warnings {
                eprintln!("Warning: {warning}");
            }
            let path = hwpx_fill::save_structure(&doc, output.as_deref())?;
            println!("Report written to {}", path.display());
            if print {
                println!("\n{}", render_report(&doc));
            }
        }
        Command::Fill {
            template,
            content,
            output,
            registered,
        } => {
            let template = if registered {
                let registry = JsonTemplateRegistry::open(&cli.templates)?;
                registry
                    .get(&template)?
                    .ok_or(Error::Template(template))?
                    .file
            } else {
                PathBuf::from(template)
            };
            let mapping = read_mapping(&content)?;
            let written = dispatcher.fill(&template, &mapping, &output)?;
            println!("Filled {} field(s) into {}", mapping.len(), written.display());
        }
        Command::Template { action } => {
            let registry = JsonTemplateRegistry::with_dispatcher(&cli.templates, dispatcher)?;
            run_template(&registry, action)?;
        }
    }
    Ok(())
}

fn run_template(registry: &impl TemplateRegistry, action: TemplateAction) -> Result<(), Error> {
    match action {
        TemplateAction::Save {
            name,
            file,
            mapping,
        } => {
            let mapping = mapping.as_deref().map(read_json_mapping).transpose()?;
            let stored = registry.save(&name, &file, mapping.as_ref())?;
            println!("Saved {name} to {}", stored.display());
        }
        TemplateAction::Get { name } => {
            let record = registry.get(&name)?.ok_or(Error::Template(name))?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        TemplateAction::List => {
            for name in registry.list()? {
                println!("{name}");
            }
        }
        TemplateAction::Delete { name } => {
            if !registry.delete(&name)? {
                return Err(Error::Template(name));
            }
            println!("Deleted {name}");
        }
        TemplateAction::Map { name, mapping } => {
            let mapping = read_json_mapping(&mapping)?;
            if !registry.update_mapping(&name, &mapping)? {
                return Err(Error::Template(name));
            }
            println!("Updated mapping for {name}");
        }
    }
    Ok(())
}

fn read_mapping(path: &Path) -> Result<FieldMap, Error> {
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        read_json_mapping(path)
    } else {
        parse_markdown_content(path)
    }
}

fn read_json_mapping(path: &Path) -> Result<FieldMap, Error> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

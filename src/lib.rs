pub mod cli;
pub mod config;
pub mod filter;
pub mod output;
pub mod parser;
pub mod scan;
pub mod schema;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

pub use cli::{Cli, Commands, FilterArgs, OutputFormat, cli_parse};
pub use filter::{CompileErrors, ExpressionNode, FilterError, compile, evaluate};
pub use parser::{LineParseError, Record, parse_combined_line};
pub use schema::FieldSchema;

use crate::config::AppConfig;
use crate::output::{OutputOptions, RecordFormatter, select_output_fields};

fn init_logging(level: log::LevelFilter) {
    // RUST_LOG, when set, wins over -v / -q
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .format_target(false)
        .parse_default_env()
        .try_init();
}

/// Compile `-e` or `-m`, whichever was given
fn build_matcher(
    expression: Option<&str>,
    match_spec: Option<&str>,
    schema: &FieldSchema,
) -> Result<Option<ExpressionNode>> {
    if let Some(expression) = expression {
        let tree = compile(expression, schema)
            .with_context(|| format!("Invalid match expression {expression:?}"))?;
        return Ok(Some(tree));
    }
    if let Some(spec) = match_spec {
        let tree = filter::parse_match_spec(spec, schema)
            .with_context(|| format!("Invalid match {spec:?}"))?;
        return Ok(Some(tree));
    }
    Ok(None)
}

fn open_input(file: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match file {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open input file '{}'", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

fn run_filter(
    app_config: &AppConfig,
    schema: &FieldSchema,
    format: OutputFormat,
    args: &FilterArgs,
) -> Result<()> {
    let matcher = build_matcher(args.expression.as_deref(), args.match_spec.as_deref(), schema)?;
    if let Some(tree) = &matcher {
        log::info!("matching with {tree}");
    }

    let options = OutputOptions::new(select_output_fields(args.fields.as_deref(), schema))
        .separator(app_config.output.separator.clone())
        .rfc3339(args.rfc3339 || app_config.output.rfc3339)
        .whole_line(args.whole_line)
        .format(format);
    let formatter = RecordFormatter::new(&options, schema);

    let mut bad_file = match &args.bad_lines {
        Some(path) => Some(BufWriter::new(File::create(path).with_context(|| {
            format!("Failed to create bad lines file '{}'", path.display())
        })?)),
        None => None,
    };

    let input = open_input(args.file.as_deref())?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    let summary = scan::scan_lines(
        input,
        &mut out,
        bad_file.as_mut().map(|w| w as &mut dyn Write),
        matcher.as_ref(),
        &formatter,
    )
    .context("Failed to scan input")?;
    out.flush().context("Failed to flush output")?;
    if let Some(bad) = bad_file.as_mut() {
        bad.flush().context("Failed to write bad lines file")?;
    }

    log::info!(
        "{} of {} lines matched, {} could not be parsed",
        summary.matched,
        summary.lines,
        summary.rejected
    );
    Ok(())
}

fn run_explain(schema: &FieldSchema, expression: &str, dot: bool) -> Result<()> {
    let tree = compile(expression, schema)
        .with_context(|| format!("Invalid match expression {expression:?}"))?;
    if dot {
        print!("{}", tree.to_dot());
    } else {
        println!("{tree}");
    }
    Ok(())
}

fn run_fields(schema: &FieldSchema, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for (index, name) in schema.names().iter().enumerate() {
                println!("{index}\t{name}");
            }
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(schema.names())
                .context("Failed to serialize field names")?;
            println!("{json}");
        }
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = cli_parse();
    init_logging(cli.log_level());

    let app_config = config::load_config(cli.config.as_deref())
        .context("Failed to load config")?;
    let schema = app_config.schema()?;
    let format = cli.format.unwrap_or(app_config.output.format);

    if let Some(config_path) = &cli.config {
        log::debug!("config file: {}", config_path.display());
    }

    match &cli.command {
        Commands::Filter(args) => run_filter(&app_config, &schema, format, args),
        Commands::Explain { expression, dot } => run_explain(&schema, expression, *dot),
        Commands::Fields => run_fields(&schema, format),
    }
}

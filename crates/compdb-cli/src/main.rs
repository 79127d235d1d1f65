use clap::Parser;
use compdb_build::{Generator, GeneratorConfig, LogLevel, MetadataFormat};
use miette::{IntoDiagnostic, Result};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

/// Creates a compile_commands.json database from Kbuild .cmd files
#[derive(Parser)]
#[command(name = "gen-compile-commands")]
#[command(author, version, about)]
struct Cli {
    /// Object (.o), archive (.a) or module order (.order) files
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// The location to write compile_commands.json (defaults to
    /// compile_commands.json in the working directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// The level of log messages to produce (one of DEBUG, INFO, WARNING,
    /// ERROR, CRITICAL; defaults to WARNING)
    #[arg(long = "log_level", visible_alias = "log-level", value_name = "LEVEL")]
    log_level: Option<LogLevel>,

    /// Working directory recorded in the database (defaults to the current
    /// directory)
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Metadata to read for each object: raw .cmd files or prebuilt .json
    /// fragments
    #[arg(long, value_name = "cmd|json")]
    format: Option<MetadataFormat>,

    /// Fail instead of skipping objects that have no .cmd file
    #[arg(long)]
    strict: bool,

    /// Program used to list archive members
    #[arg(long, value_name = "PROGRAM")]
    archiver: Option<PathBuf>,

    /// Read settings from a TOML file; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

impl Cli {
    /// Merge the config file (if any) with command-line overrides.
    fn resolve_config(&self) -> Result<GeneratorConfig> {
        let mut config = match &self.config {
            Some(path) => GeneratorConfig::from_file(path)?,
            None => GeneratorConfig::default(),
        };

        if let Some(directory) = &self.directory {
            config.directory = directory.clone();
        }
        config.directory = absolute_directory(&config.directory)?;

        if let Some(output) = &self.output {
            config.output = Some(output.clone());
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.format {
            config.format = format;
        }
        if let Some(archiver) = &self.archiver {
            config.archiver = archiver.clone();
        }
        if self.strict {
            config = config.strict(true);
        }

        Ok(config)
    }
}

/// Entries record the directory verbatim, so anchor relative ones to the
/// current directory.
fn absolute_directory(directory: &Path) -> Result<PathBuf> {
    if directory.is_absolute() {
        return Ok(directory.to_path_buf());
    }

    let cwd = std::env::current_dir().into_diagnostic()?;
    if directory == Path::new(".") {
        Ok(cwd)
    } else {
        Ok(cwd.join(directory))
    }
}

fn init_logging(level: LogLevel) {
    tracing_subscriber::fmt()
        .with_max_level(level.tracing_level())
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .without_time()
        .init();
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let config = cli.resolve_config()?;
    init_logging(config.log_level);

    let generator = Generator::with_archiver(config);
    generator.run(cli.files.as_slice())?;

    Ok(())
}

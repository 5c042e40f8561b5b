//! Command line definition and dispatch.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};

use crate::app::export::CopyOutcome;
use crate::app::redact::Redactor;
use crate::app::scan::read_source;
use crate::app::session::ProjectSession;
use crate::domain::model::HiddenNames;
use crate::domain::syntax::OutlineEntry;
use crate::infra::clipboard::Clipboard;
use crate::infra::config::Config;
use crate::infra::parser::CSharpParser;
use crate::ui::app::UiApp;

#[derive(Parser, Debug)]
#[command(
    name = "capsule",
    author,
    version,
    about = "Pack C# sources into one Markdown document for an AI assistant.",
    long_about = "capsule lists the C# files of a folder, lets you collapse whole classes or hide \nmethod bodies, and stages the result into a single Markdown document that can be \nsaved next to the sources or copied to the clipboard.",
    after_help = "EXAMPLES:\n  capsule ./src\n  capsule outline Cart.cs --json\n  capsule redact Cart.cs --hide-method Add\n  capsule bundle ./src --hide-class Audit --stdout"
)]
pub struct Cli {
    /// Folder to open in the interactive view. Defaults to the current directory.
    pub folder: Option<PathBuf>,

    /// GitHub repository URL. Recorded only; remote fetching is not supported.
    #[arg(long, value_name = "URL")]
    pub github_url: Option<String>,

    /// Extra configuration file merged over the user and project layers.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// List the classes and methods of a file.
    Outline(OutlineArgs),
    /// Print a file with the given classes collapsed and method bodies hidden.
    Redact(RedactArgs),
    /// Stage files of a folder and export the Markdown document.
    Bundle(BundleArgs),
    /// Generate shell completion scripts.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Clone)]
pub struct OutlineArgs {
    pub file: PathBuf,
    /// Emit JSON instead of an indented listing.
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct HideArgs {
    /// Collapse every class (or struct, interface, record) with this name.
    #[arg(long = "hide-class", value_name = "NAME")]
    pub classes: Vec<String>,
    /// Hide the body of every method with this name.
    #[arg(long = "hide-method", value_name = "NAME")]
    pub methods: Vec<String>,
}

impl HideArgs {
    fn hidden_names(&self) -> HiddenNames {
        HiddenNames::from_names(self.classes.iter().cloned(), self.methods.iter().cloned())
    }
}

#[derive(Args, Debug, Clone)]
pub struct RedactArgs {
    pub file: PathBuf,
    #[command(flatten)]
    pub hide: HideArgs,
}

#[derive(Args, Debug, Clone)]
pub struct BundleArgs {
    pub folder: PathBuf,
    /// Stage only these file names, in this order. Defaults to every listed file.
    #[arg(long = "file", value_name = "NAME")]
    pub files: Vec<String>,
    #[command(flatten)]
    pub hide: HideArgs,
    /// Print the document instead of writing it into the folder.
    #[arg(long, conflicts_with = "copy")]
    pub stdout: bool,
    /// Copy the document to the clipboard instead of writing it into the folder.
    #[arg(long)]
    pub copy: bool,
}

/// Execute the parsed command line, writing command output to `out`.
pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let explicit = cli.config.as_deref();
    match cli.command {
        None => run_tui(cli.folder, cli.github_url, cli.config),
        Some(Commands::Outline(args)) => outline(&args, out),
        Some(Commands::Redact(args)) => redact(&args, explicit, out),
        Some(Commands::Bundle(args)) => bundle(&args, explicit, out),
        Some(Commands::Completions { shell }) => {
            let mut command = Cli::command();
            let bin_name = command.get_name().to_string();
            generate(shell, &mut command, bin_name, out);
            Ok(())
        }
    }
}

fn run_tui(
    folder: Option<PathBuf>,
    github_url: Option<String>,
    explicit: Option<PathBuf>,
) -> Result<()> {
    let root = match folder {
        Some(folder) => folder,
        None => std::env::current_dir().context("unable to determine working directory")?,
    };
    let config = Config::load_for(&root, explicit.as_deref())?;
    let mut app = UiApp::new(root, config, explicit)?;
    if let Some(url) = github_url {
        app.set_github_url(url);
    }
    app.run()
}

fn config_near(file: &Path, explicit: Option<&Path>) -> Result<Config> {
    let root = file
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Config::load_for(root, explicit)
}

fn outline(args: &OutlineArgs, out: &mut dyn Write) -> Result<()> {
    let source = CSharpParser::new()?.parse(read_source(&args.file)?)?;
    let entries = source.outline();

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &entries)?;
        writeln!(out)?;
        return Ok(());
    }

    for entry in &entries {
        match entry {
            OutlineEntry::Class { depth, .. } => {
                writeln!(out, "{}{}", "  ".repeat(*depth), entry.label())?
            }
            OutlineEntry::Method { .. } => writeln!(out, "    {}", entry.label())?,
        }
    }
    Ok(())
}

fn redact(args: &RedactArgs, explicit: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let config = config_near(&args.file, explicit)?;
    let source = CSharpParser::new()?.parse(read_source(&args.file)?)?;
    let text = Redactor::from_config(&config).redact(&source, &args.hide.hidden_names());
    out.write_all(text.as_bytes())?;
    Ok(())
}

fn bundle(args: &BundleArgs, explicit: Option<&Path>, out: &mut dyn Write) -> Result<()> {
    let config = Config::load_for(&args.folder, explicit)?;
    let mut session = ProjectSession::open(&args.folder, &config)?;

    let names: Vec<String> = if args.files.is_empty() {
        session.files().iter().map(|file| file.name.clone()).collect()
    } else {
        args.files.clone()
    };

    for name in &names {
        session.open_file(name)?;
        for class in &args.hide.classes {
            session.set_class_hidden(class, true)?;
        }
        for method in &args.hide.methods {
            session.set_method_hidden(method, true)?;
        }
        if session.displayed_text().is_empty() {
            tracing::info!(file = %name, "skipping empty file");
            continue;
        }
        session.stage_current()?;
    }

    if session.staged().is_empty() {
        writeln!(io::stderr(), "Nothing staged")?;
        return Ok(());
    }

    if args.stdout {
        out.write_all(session.document()?.as_bytes())?;
    } else if args.copy {
        match session.copy_document(&mut Clipboard::new())? {
            CopyOutcome::Copied => writeln!(out, "Copied to clipboard")?,
            CopyOutcome::NothingStaged | CopyOutcome::Unavailable => {
                writeln!(io::stderr(), "clipboard unavailable")?
            }
        }
    } else if let Some(path) = session.save_document()? {
        writeln!(out, "Saved {} files to {}", session.staged().len(), path.display())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const CART: &str = "namespace Shop\n{\n    class Cart\n    {\n        int Count() => items.Count;\n        void Add(Item item) { items.Add(item); }\n    }\n}\n";

    fn run_args(args: &[&str]) -> Result<String> {
        let cli = Cli::try_parse_from(args)?;
        let mut out = Vec::new();
        run(cli, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    fn project() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Cart.cs"), CART).unwrap();
        fs::write(dir.path().join("Audit.cs"), "class Audit { void Log() { } }").unwrap();
        dir
    }

    #[test]
    fn parses_tui_invocation() {
        let cli = Cli::try_parse_from([
            "capsule",
            "./src",
            "--github-url",
            "https://github.com/acme/shop",
        ])
        .unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.folder.as_deref(), Some(Path::new("./src")));
        assert_eq!(cli.github_url.as_deref(), Some("https://github.com/acme/shop"));
    }

    #[test]
    fn stdout_and_copy_conflict() {
        assert!(Cli::try_parse_from(["capsule", "bundle", ".", "--stdout", "--copy"]).is_err());
    }

    #[test]
    fn outline_lists_classes_and_methods() -> Result<()> {
        let dir = project();
        let file = dir.path().join("Cart.cs");
        let output = run_args(&["capsule", "outline", file.to_str().unwrap()])?;
        assert_eq!(output, "class Cart\n    int Count()\n    void Add()\n");
        Ok(())
    }

    #[test]
    fn outline_json_is_tagged() -> Result<()> {
        let dir = project();
        let file = dir.path().join("Cart.cs");
        let output = run_args(&["capsule", "outline", file.to_str().unwrap(), "--json"])?;
        let value: serde_json::Value = serde_json::from_str(&output)?;
        assert_eq!(value[0]["type"], "class");
        assert_eq!(value[0]["name"], "Cart");
        assert_eq!(value[2]["type"], "method");
        assert_eq!(value[2]["return_type"], "void");
        Ok(())
    }

    #[test]
    fn redact_hides_requested_methods() -> Result<()> {
        let dir = project();
        let file = dir.path().join("Cart.cs");
        let output = run_args(&[
            "capsule",
            "redact",
            file.to_str().unwrap(),
            "--hide-method",
            "Count",
        ])?;
        assert!(output.contains("int Count() { /* logic hidden */ }"));
        assert!(output.contains("void Add(Item item) { items.Add(item); }"));
        Ok(())
    }

    #[test]
    fn redact_accepts_legacy_encoded_file() -> Result<()> {
        let dir = project();
        let file = dir.path().join("Legacy.cs");
        fs::write(
            &file,
            b"\xef\xbb\xbf// \xcf\xf0\xe8\xe2\xe5\xf2\nclass Legacy { void Run() { Go(); } }\n",
        )?;
        let output = run_args(&[
            "capsule",
            "redact",
            file.to_str().unwrap(),
            "--hide-method",
            "Run",
        ])?;
        assert!(output.starts_with("// \u{fffd}"));
        assert!(output.contains("void Run() { /* logic hidden */ }"));
        Ok(())
    }

    #[test]
    fn bundle_to_stdout_in_requested_order() -> Result<()> {
        let dir = project();
        let output = run_args(&[
            "capsule",
            "bundle",
            dir.path().to_str().unwrap(),
            "--file",
            "Cart.cs",
            "--file",
            "Audit.cs",
            "--hide-class",
            "Audit",
            "--stdout",
        ])?;
        assert!(output.starts_with("# Project bundle for AI\n**Total files:** 2\n"));
        let cart = output.find("## File: `Cart.cs`").unwrap();
        let audit = output.find("## File: `Audit.cs`").unwrap();
        assert!(cart < audit);
        assert!(output.contains("/* whole class collapsed */"));
        assert!(!dir.path().join("AiContextMulti.md").exists());
        Ok(())
    }

    #[test]
    fn bundle_writes_output_file_by_default() -> Result<()> {
        let dir = project();
        let output = run_args(&["capsule", "bundle", dir.path().to_str().unwrap()])?;
        assert!(output.starts_with("Saved 2 files to"));
        let written = fs::read_to_string(dir.path().join("AiContextMulti.md"))?;
        assert!(written.contains("## File: `Audit.cs`"));
        Ok(())
    }

    #[test]
    fn bundle_of_unknown_file_fails() {
        let dir = project();
        let result = run_args(&[
            "capsule",
            "bundle",
            dir.path().to_str().unwrap(),
            "--file",
            "Missing.cs",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn completions_are_generated() -> Result<()> {
        let output = run_args(&["capsule", "completions", "bash"])?;
        assert!(output.contains("capsule"));
        Ok(())
    }
}

//! Command dispatch for the `plnav` binary.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cli::{Cli, Command, PositionArgs};
use crate::config::{Config, OutputFormat};
use crate::cursor::{self, CursorInfo};
use crate::errors::{EXIT_ERROR, EXIT_SUCCESS, PlnavError};
use crate::navigator::{Navigator, Synonyms};
use crate::output::{Formatter, OutlineEntry, ParamOutput, SymbolOutput, print_hint};
use crate::parser;
use crate::source::WorkspaceSource;
use crate::tree;
use crate::types::{Root, SymbolHandle};

/// Run one command and return the process exit code.
///
/// A navigation query with no result prints nothing and exits with
/// [`EXIT_ERROR`].
pub async fn dispatch(cli: Cli) -> Result<i32, PlnavError> {
    let config = Config::load(Some(&cli.root)).map_err(|e| PlnavError::Config(format!("{e:#}")))?;
    let json = cli.json || config.output.default_format == OutputFormat::Json;
    let navigator = Navigator::new(WorkspaceSource::from_config(&cli.root, &config))
        .with_translator(Synonyms::new(&config.synonyms));

    match cli.command {
        Command::Symbols(args) => {
            let root = load_file(&args.file).await?;
            let mut fmt = Formatter::new(std::io::stdout().lock(), json);
            for id in tree::symbols_from_root(&root) {
                fmt.format_outline(&OutlineEntry::new(&root, id))?;
            }
            for issue in root.issues() {
                let (line, col) = root.line_col(issue.offset);
                print_hint(&format!("{}:{line}:{col}: {}", root.file_name(), issue.kind), json);
            }
            Ok(EXIT_SUCCESS)
        }
        Command::Goto(args) => {
            let (root, cursor, offset) = locate(&args.position).await?;
            debug!(?cursor, offset, "goto");
            let found = navigator.goto(&cursor, offset, &root, args.spec).await?;
            print_result(found.as_ref(), args.doc, json)
        }
        Command::Switch(args) => {
            let (root, cursor, offset) = locate(&args).await?;
            debug!(?cursor, offset, "switch");
            let found = navigator.switch(&cursor, offset, &root).await?;
            print_result(found.as_ref(), false, json)
        }
        Command::Complete(args) => {
            let (_, cursor, _) = locate(&args).await?;
            debug!(?cursor, "complete");
            let Some(members) = navigator.complete(&cursor).await? else {
                return Ok(EXIT_ERROR);
            };
            let mut fmt = Formatter::new(std::io::stdout().lock(), json);
            for member in &members {
                fmt.format_symbol(&SymbolOutput::from_handle(member))?;
            }
            Ok(EXIT_SUCCESS)
        }
        Command::Params(args) => {
            let root = load_file(&args.file).await?;
            let routine = tree::walk(&root, root.symbols(), true)
                .find(|&id| root[id].kind.is_routine() && root[id].is_named(&args.name));
            let Some(id) = routine else {
                print_hint(&format!("no function or procedure named `{}` in {}", args.name, root.file_name()), json);
                return Ok(EXIT_ERROR);
            };
            let symbol = &root[id];
            let mut fmt = Formatter::new(std::io::stdout().lock(), json);
            for param in symbol.params() {
                fmt.format_param(&ParamOutput::new(&symbol.name, param))?;
            }
            Ok(EXIT_SUCCESS)
        }
    }
}

async fn load_file(path: &Path) -> Result<Arc<Root>, PlnavError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| std::io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;
    Ok(Arc::new(parser::parse(&path.to_string_lossy(), &text)))
}

/// Parse the file and derive the cursor context at `--line`/`--col`.
async fn locate(args: &PositionArgs) -> Result<(Arc<Root>, CursorInfo, usize), PlnavError> {
    if args.line == 0 || args.col == 0 {
        return Err(PlnavError::Usage("--line and --col are 1-based".into()));
    }
    let text = tokio::fs::read_to_string(&args.file)
        .await
        .map_err(|e| std::io::Error::new(e.kind(), format!("{}: {e}", args.file.display())))?;
    let (Some(line), Some(offset)) = (
        cursor::line_at(&text, args.line),
        cursor::offset_of(&text, args.line, args.col),
    ) else {
        return Err(PlnavError::Usage(format!(
            "--line {} is past the end of {}",
            args.line,
            args.file.display()
        )));
    };
    let cursor = CursorInfo::from_line(line, args.col - 1);
    let root = Arc::new(parser::parse(&args.file.to_string_lossy(), &text));
    Ok((root, cursor, offset))
}

fn print_result(found: Option<&SymbolHandle>, doc: bool, json: bool) -> Result<i32, PlnavError> {
    let Some(handle) = found else {
        return Ok(EXIT_ERROR);
    };
    let out = SymbolOutput::from_handle(handle);
    let mut fmt = Formatter::new(std::io::stdout().lock(), json);
    fmt.format_symbol(&out)?;
    if doc && let Some(text) = &out.documentation {
        fmt.format_documentation(text)?;
    }
    Ok(EXIT_SUCCESS)
}

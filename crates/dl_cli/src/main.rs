use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use dl_ast::DecoratorSyntax;
use dl_desugar::desugar_module;
use dl_parser::{parse_decorated, ParseResult};
use swc_common::errors::Handler;
use swc_common::source_map::DefaultSourceMapGenConfig;
use swc_common::{sync::Lrc, SourceMap};
use swc_ecma_codegen::{text_writer::JsWriter, Emitter, Node};

mod tracing_config;

#[derive(Parser)]
#[command(name = "dlc", about = "decolegacy: desugar legacy decorators into plain TypeScript")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand.
#[derive(Args)]
struct InputArgs {
    /// Input .ts/.tsx file.
    input: PathBuf,
    /// Treat the file as TSX.
    #[arg(long)]
    tsx: bool,
    /// JSON file with decorator syntax options.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Leave `@` inside object literals alone.
    #[arg(long)]
    no_object_decorators: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse, desugar, and emit decorator-free code.
    Desugar {
        #[command(flatten)]
        args: InputArgs,
        /// Output file (stdout if omitted).
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Generate a source map.
        #[arg(long)]
        source_map: bool,
    },
    /// Parse and desugar, reporting syntax errors and unsupported decorators.
    Check {
        #[command(flatten)]
        args: InputArgs,
    },
    /// Parse and dump the AST.
    Parse {
        #[command(flatten)]
        args: InputArgs,
        /// Dump as JSON instead of debug output.
        #[arg(long)]
        ast: bool,
    },
}

impl InputArgs {
    fn syntax(&self) -> Result<DecoratorSyntax> {
        let mut syntax = match &self.config {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => DecoratorSyntax::default(),
        };
        if self.no_object_decorators {
            syntax.object_members = false;
        }
        Ok(syntax)
    }

    /// The name the parser sees; `--tsx` forces TSX parsing.
    fn filename(&self) -> String {
        let filename = self.input.display().to_string();
        if self.tsx && !filename.ends_with(".tsx") {
            format!("{filename}.tsx")
        } else {
            filename
        }
    }

    fn parse(&self) -> Result<ParseResult> {
        let source = std::fs::read_to_string(&self.input)
            .with_context(|| format!("failed to read {}", self.input.display()))?;
        let syntax = self.syntax()?;
        tracing::debug!(input = %self.input.display(), object_members = syntax.object_members, "parsing");
        parse_decorated(&source, &self.filename(), &syntax)
    }
}

/// Desugar, routing transform errors through the SWC diagnostics handler.
fn desugar(
    module: swc_ecma_ast::Module,
    source_map: &Lrc<SourceMap>,
    input: &Path,
) -> Result<swc_ecma_ast::Module> {
    desugar_module(module).map_err(|err| {
        let handler =
            Handler::with_emitter_writer(Box::new(std::io::stderr()), Some(source_map.clone()));
        err.emit(&handler);
        anyhow::anyhow!("failed to desugar {}: {err}", input.display())
    })
}

fn main() -> Result<()> {
    tracing_config::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Desugar {
            args,
            output,
            source_map,
        } => {
            let ParseResult {
                module, source_map: cm, ..
            } = args.parse()?;
            let module = desugar(module, &cm, &args.input)?;

            let mut buf = Vec::new();
            let mut srcmap_buf = if source_map { Some(vec![]) } else { None };
            {
                let writer = JsWriter::new(
                    cm.clone(),
                    "\n",
                    &mut buf,
                    srcmap_buf.as_mut(),
                );
                let mut emitter = Emitter {
                    cfg: swc_ecma_codegen::Config::default()
                        .with_target(swc_ecma_ast::EsVersion::latest()),
                    cm: cm.clone(),
                    comments: None,
                    wr: writer,
                };
                module.emit_with(&mut emitter)?;
            }

            let output_str = String::from_utf8(buf)?;

            match &output {
                Some(path) => std::fs::write(path, &output_str)
                    .with_context(|| format!("failed to write {}", path.display()))?,
                None => print!("{output_str}"),
            }

            if let Some(srcmap_data) = srcmap_buf {
                let srcmap = cm.build_source_map(&srcmap_data, None, DefaultSourceMapGenConfig);
                let mut srcmap_json = vec![];
                srcmap
                    .to_writer(&mut srcmap_json)
                    .context("failed to serialize source map")?;

                let map_path = match &output {
                    Some(path) => format!("{}.map", path.display()),
                    None => format!("{}.map", args.input.display()),
                };
                std::fs::write(&map_path, srcmap_json)
                    .with_context(|| format!("failed to write {map_path}"))?;
                eprintln!("Source map written to {map_path}");
            }
        }
        Commands::Check { args } => {
            let parsed = args.parse()?;
            desugar(parsed.module, &parsed.source_map, &args.input)?;
            eprintln!("OK: {}", args.input.display());
        }
        Commands::Parse { args, ast } => {
            let parsed = args.parse()?;

            if ast {
                let json = serde_json::to_string_pretty(&parsed.module)?;
                println!("{json}");
            } else {
                println!("{:#?}", parsed.module);
            }
        }
    }

    Ok(())
}

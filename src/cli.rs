use crate::config::load_config;
use crate::interaction::{DragEvent, InteractionController};
use crate::layout::Layout;
use crate::layout_dump::{LayoutDump, write_layout_dump};
use crate::parser::parse_document;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "emlay", version, about = "Nested diagram layout: fit containers and replay drags")]
pub struct Args {
    /// Input graph document (.json/.json5) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long = "format", value_enum, default_value = "graph")]
    pub format: OutputFormat,

    /// Layout config JSON file (padding, port metrics, node defaults)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Fit every container around its children before applying moves
    #[arg(long = "fit")]
    pub fit: bool,

    /// Drag a node to a new position in its parent's frame: ID=X,Y (repeatable)
    #[arg(short = 'm', long = "move", value_parser = parse_move)]
    pub moves: Vec<MoveArg>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// The raw graph with geometry written back
    Graph,
    /// Root-space geometry of every node, port and link
    Dump,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MoveArg {
    pub node: String,
    pub x: f32,
    pub y: f32,
}

fn parse_move(value: &str) -> std::result::Result<MoveArg, String> {
    let (node, coords) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ID=X,Y, got `{value}`"))?;
    let (x, y) = coords
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y after `=`, got `{coords}`"))?;
    let node = node.trim();
    if node.is_empty() {
        return Err("node id must not be empty".to_string());
    }
    let x = x.trim().parse::<f32>().map_err(|e| format!("bad x `{x}`: {e}"))?;
    let y = y.trim().parse::<f32>().map_err(|e| format!("bad y `{y}`: {e}"))?;
    Ok(MoveArg {
        node: node.to_string(),
        x,
        y,
    })
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())
        .with_context(|| format!("failed to load config {:?}", args.config))?;

    let input = read_input(args.input.as_deref())?;
    let document = parse_document(&input)?;
    let mut layout = crate::build_layout(document, config)?;

    if args.fit {
        let refresh = layout.fit_all()?;
        tracing::info!(containers = refresh.fitted.len(), "fitted containers");
    }
    replay_moves(&mut layout, &args.moves)?;

    tracing::debug!(node_types = layout.catalog().len(), "layout ready");

    match (args.format, args.output.as_deref()) {
        (OutputFormat::Dump, Some(path)) => write_layout_dump(path, &layout)
            .with_context(|| format!("failed to write {}", path.display())),
        (OutputFormat::Dump, None) => {
            let json = serde_json::to_string_pretty(&LayoutDump::from_layout(&layout)?)?;
            write_output(&json, None)
        }
        (OutputFormat::Graph, output) => {
            let json = serde_json::to_string_pretty(&layout.export())?;
            write_output(&json, output)
        }
    }
}

/// Feeds each move through a full drag: start, move, end.
pub fn replay_moves(layout: &mut Layout, moves: &[MoveArg]) -> Result<()> {
    let mut controller = InteractionController::new();
    for step in moves {
        for event in [
            DragEvent::Start {
                node: step.node.clone(),
            },
            DragEvent::Move {
                node: step.node.clone(),
                x: step.x,
                y: step.y,
            },
            DragEvent::End {
                node: step.node.clone(),
            },
        ] {
            let notes = controller
                .handle(layout, event)
                .with_context(|| format!("failed to move node `{}`", step.node))?;
            tracing::debug!(node = %step.node, notifications = notes.len(), "replayed drag event");
        }
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path != Path::new("-") {
            return std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()));
        }
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(json: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            stdout.write_all(b"\n")?;
        }
    }
    Ok(())
}

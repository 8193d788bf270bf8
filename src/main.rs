//! Rich-Layout demo: lay out a text file and print its line table

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rich_layout::layout::{FontFace, FontLibrary, FontMetrics};
use rich_layout::{SimpleShaper, TextView};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rich-layout")]
#[command(about = "Lay out plain text and print the resulting lines")]
struct Cli {
    /// Layout width in device units
    #[arg(long, default_value_t = 400)]
    width: i32,

    /// Lay out right-to-left
    #[arg(long)]
    rtl: bool,

    /// Advance of every character
    #[arg(long, default_value_t = 8)]
    char_width: i32,

    /// File to lay out; stdin when omitted
    file: Option<PathBuf>,
}

fn read_input(file: Option<&PathBuf>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let text = match read_input(cli.file.as_ref()) {
        Ok(text) => text,
        Err(err) => {
            eprintln!("rich-layout: cannot read input: {err}");
            return ExitCode::FAILURE;
        }
    };

    let face = FontFace::monospace(cli.char_width.max(1), FontMetrics::default());
    let mut view = TextView::new(Box::new(SimpleShaper::new(FontLibrary::new(face))));
    if let Err(err) = view.set_layout_width(cli.width) {
        eprintln!("rich-layout: {err}");
        return ExitCode::FAILURE;
    }
    view.set_right_to_left(cli.rtl);
    if let Err(err) = view.append_text(&Default::default(), &text) {
        eprintln!("rich-layout: {err}");
        return ExitCode::FAILURE;
    }
    let diff = view.update();
    tracing::info!(lines = view.layout.line_count(), height = diff.height, "laid out");

    let TextView { document, layout } = &mut view;
    let document: &_ = document;
    let chars = document.chars();
    println!("{:>5} {:>6} {:>5} {:>4}  text", "line", "y", "x", "h");
    let mut line_index = 0;
    layout.visit_lines(document, i32::MIN, i32::MAX, |paragraph, line, runs| {
        let start = runs.iter().map(|visual| visual.slice.char_start).min().unwrap_or(0);
        let end = runs.iter().map(|visual| visual.slice.char_end()).max().unwrap_or(0);
        let from = paragraph.char_index + start;
        let to = paragraph.char_index + end.max(start);
        let text: String = chars[from..to]
            .iter()
            .map(|&c| if c == '\n' { '⏎' } else { c })
            .collect();
        println!(
            "{:>5} {:>6} {:>5} {:>4}  {}",
            line_index, line.y, line.x, line.height, text
        );
        line_index += 1;
    });
    ExitCode::SUCCESS
}

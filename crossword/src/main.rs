use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use crossword::file::PuzzleFile;
use crossword::{Error, Preview};
use log::{LevelFilter, info};
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// A simple CLI for checking puzzle files before they are solved
#[derive(Parser)]
#[command(name = "crossword", version)]
struct Cli {
  /// A puzzle file, or a directory of `.toml` puzzle files.
  path: PathBuf,
  /// Log level written to stderr.
  #[arg(long, default_value = "warn")]
  log_level: LevelFilter,
}

/// Prints the preview and every word error. Returns whether the puzzle is
/// ready to be solved.
fn check(path: &Path) -> Result<bool, Error> {
  info!("checking {}", path.display());
  let file = PuzzleFile::read(path)?;
  file.check_size()?;
  let words = file.words();
  let report = file.validate();

  println!("{}", path.display());
  print!("{}", Preview::build(&words, file.rows, file.columns));
  for (index, error) in &report.errors {
    let answer = words.get(*index).map(|w| w.text.as_str()).unwrap_or("");
    println!("  word {} ({answer}): {error}", index + 1);
  }
  for conflict in &report.conflicts {
    let (x, y) = conflict.point;
    println!(
      "  words {} and {} cross at row {}, column {} with {:?} and {:?}",
      conflict.first + 1,
      conflict.second + 1,
      y + 1,
      x + 1,
      conflict.letters.0,
      conflict.letters.1
    );
  }
  Ok(report.is_valid())
}

fn main() -> Result<(), Error> {
  let cli = Cli::parse();
  // Logging is best effort.
  let _ = TermLogger::init(
    cli.log_level,
    Config::default(),
    TerminalMode::Stderr,
    ColorChoice::Auto,
  );

  if fs::metadata(&cli.path)?.is_dir() {
    let mut success = 0;
    let mut failure = 0;

    for entry in fs::read_dir(&cli.path)? {
      let path = entry?.path();
      if path.extension().is_none_or(|ext| ext != "toml") {
        continue;
      }
      match check(&path) {
        Ok(true) => success += 1,
        Ok(false) => failure += 1,
        Err(e) => {
          println!("Failed with {} from {}", e, path.display());
          failure += 1;
        }
      }
    }
    println!("{success} valid, {failure} invalid");
  } else if !check(&cli.path)? {
    std::process::exit(1);
  }

  Ok(())
}

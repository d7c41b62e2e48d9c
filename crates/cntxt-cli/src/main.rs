mod visualize;

use std::io::{self, BufRead, Write};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use cntxt_core::{compress_file, wait_for_file, write_graph_json, CodebaseAnalyzer, Config};
use color_eyre::eyre::{bail, Result, WrapErr};
use indicatif::{ProgressBar, ProgressStyle};

#[derive(Parser)]
#[command(name = "cntxt")]
#[command(about = "Scan a Python codebase into a compressed knowledge graph", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a codebase and write its knowledge graph
    Analyze {
        /// Directory to analyze (prompted for when omitted)
        dir: Option<PathBuf>,
        /// Skip the compression pass
        #[arg(long)]
        no_compress: bool,
        /// Write a Graphviz export of the graph
        #[arg(long, conflicts_with = "no_visualize")]
        visualize: bool,
        /// Do not write a Graphviz export and do not ask
        #[arg(long)]
        no_visualize: bool,
        /// Directory the artifacts are written to
        #[arg(long)]
        output_dir: Option<String>,
    },
    /// Compress an existing graph JSON file
    Compress {
        /// Graph JSON produced by `analyze`
        json: PathBuf,
        /// Output text file (defaults to the configured name next to the JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the default configuration as TOML
    InitConfig,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .target(env_logger::Target::Stderr)
        .init();

    let config = Config::load().wrap_err("Failed to load configuration")?;

    match cli.command {
        Commands::Analyze {
            dir,
            no_compress,
            visualize,
            no_visualize,
            output_dir,
        } => {
            let dir = match dir {
                Some(dir) => dir,
                None => {
                    let answer = prompt("Enter the path to the codebase directory: ")?;
                    if answer.is_empty() {
                        bail!("No directory given");
                    }
                    PathBuf::from(answer)
                }
            };
            let visualize = match (visualize, no_visualize) {
                (true, _) => true,
                (_, true) => false,
                _ => confirm("Generate a visualization of the knowledge graph? (y/n): ")?,
            };
            run_analyze(config, dir, output_dir, visualize, !no_compress)
        }
        Commands::Compress { json, output } => {
            let output = output.unwrap_or_else(|| json.with_file_name(&config.output.compressed_file));
            let compressed = compress_file(&json, &output)
                .wrap_err_with(|| format!("Failed to compress {}", json.display()))?;
            println!(
                "Compressed {} terms into {}",
                compressed.codebook.len(),
                output.display()
            );
            Ok(())
        }
        Commands::InitConfig => {
            print!("{}", Config::default_config_string());
            Ok(())
        }
    }
}

fn run_analyze(
    config: Config,
    dir: PathBuf,
    output_dir: Option<String>,
    visualize: bool,
    compress: bool,
) -> Result<()> {
    let mut output = config.output;
    if let Some(output_dir) = output_dir {
        output.dir = output_dir;
    }
    ensure_output_dir(Path::new(&output.dir))?;

    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {wide_msg}")?
            .progress_chars("=> "),
    );

    let analyzer = CodebaseAnalyzer::new(&dir, &config.scan);
    let analysis = analyzer
        .analyze_with_progress(|index, total, rel| {
            bar.set_length(total as u64);
            bar.set_position(index as u64 + 1);
            bar.set_message(rel.to_string());
        })
        .wrap_err_with(|| format!("Failed to analyze {}", dir.display()))?;
    bar.finish_and_clear();

    let graph_path = output.graph_path();
    write_graph_json(&graph_path, &analysis.document()?)?;
    println!("{}", analysis.metadata.stats);
    println!("Knowledge graph saved to {}", graph_path.display());

    if visualize {
        let dot_path = output.dot_path();
        visualize::write_dot(&analysis.graph, &dot_path)?;
        println!("Visualization saved to {}", dot_path.display());
    }

    if compress {
        wait_for_file(&graph_path, Duration::from_secs(output.wait_secs))?;
        let compressed_path = output.compressed_path();
        compress_file(&graph_path, &compressed_path)?;
        println!("Compressed knowledge graph saved to {}", compressed_path.display());
    }

    Ok(())
}

/// Create the artifact directory and check it accepts new files.
fn ensure_output_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .wrap_err_with(|| format!("Failed to create output directory {}", dir.display()))?;
    tempfile::NamedTempFile::new_in(dir)
        .wrap_err_with(|| format!("Output directory {} is not writable", dir.display()))?;
    Ok(())
}

/// Read one trimmed line from stdin after printing `question`.
fn prompt(question: &str) -> Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        bail!("Standard input closed while waiting for an answer");
    }
    Ok(line.trim().to_string())
}

fn confirm(question: &str) -> Result<bool> {
    loop {
        match prompt(question)?.to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Please answer y or n."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ensure_output_dir_creates_nested_dirs() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("out").join("graphs");

        ensure_output_dir(&dir).unwrap();
        assert!(dir.is_dir());
        // The write check leaves nothing behind.
        assert_eq!(fs::read_dir(&dir).unwrap().count(), 0);
    }

    #[test]
    fn test_ensure_output_dir_fails_under_a_file() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("taken");
        fs::write(&file, "").unwrap();

        let err = ensure_output_dir(&file.join("out")).unwrap_err();
        assert!(err.to_string().contains("Failed to create output directory"));
    }
}

mod build_dict;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};

use libviet_core::{CharsetRegistry, Config, Dictionary, MacroTable};

#[derive(Parser)]
#[command(about = "Data tools for the Vietnamese input controller")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compile plain-text word lists into an FST dictionary
    BuildDict {
        #[arg(long, num_args = 1.., required = true)]
        inputs: Vec<PathBuf>,

        #[arg(long, default_value = "vietnamese.fst")]
        out: PathBuf,
    },
    /// Look words up in a dictionary (.fst or plain word list)
    CheckDict {
        #[arg(long)]
        dict: PathBuf,

        words: Vec<String>,
    },
    /// Validate a JSON macro table and print its entries
    CheckMacros {
        #[arg(long)]
        table: PathBuf,
    },
    /// Encode text into an output charset (reads stdin when no text is given)
    Encode {
        #[arg(long, default_value = "Unicode")]
        charset: String,

        text: Vec<String>,
    },
    /// List the built-in output charsets
    Charsets,
    /// Print the default configuration as TOML
    DefaultConfig,
}

fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
    if ext == "fst" {
        Dictionary::load_fst(path)
    } else {
        Dictionary::load_word_list(path)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::BuildDict { inputs, out } => {
            let count = build_dict::run(&inputs, &out)?;
            println!("Wrote {} words to {}", count, out.display());
        }
        Command::CheckDict { dict, words } => {
            let dictionary = load_dictionary(&dict)?;
            println!("{} entries in {}", dictionary.len(), dict.display());
            for word in words {
                let key = libviet_core::utils::normalize(&word).to_lowercase();
                let status = if dictionary.contains(&key) { "known" } else { "unknown" };
                println!("  {} -> {}", word, status);
            }
        }
        Command::CheckMacros { table } => {
            let macros = MacroTable::load_json(&table)?;
            println!("{} macros in {}", macros.len(), table.display());
        }
        Command::Encode { charset, text } => {
            let registry = CharsetRegistry::new();
            if registry.get(&charset).is_none() {
                anyhow::bail!("unknown charset {:?} (try `charsets`)", charset);
            }
            if text.is_empty() {
                for line in std::io::stdin().lock().lines() {
                    let line = line.context("read stdin")?;
                    println!("{}", registry.encode(&charset, &line));
                }
            } else {
                println!("{}", registry.encode(&charset, &text.join(" ")));
            }
        }
        Command::Charsets => {
            for name in CharsetRegistry::new().names() {
                println!("{}", name);
            }
        }
        Command::DefaultConfig => {
            let content = Config::default()
                .to_toml_string()
                .context("serialize default config")?;
            print!("{}", content);
        }
    }

    Ok(())
}

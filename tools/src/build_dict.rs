use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::{Path, PathBuf};

use libviet_core::utils::normalize;

/// Collect the words of one or more word lists: NFC, lower-cased, blank
/// lines skipped, sorted and deduplicated.
pub fn collect_words(inputs: &[PathBuf]) -> Result<BTreeSet<String>> {
    let mut words = BTreeSet::new();
    for input in inputs {
        let file = File::open(input).with_context(|| format!("open {}", input.display()))?;
        for line in BufReader::new(file).lines() {
            let line = line.with_context(|| format!("read {}", input.display()))?;
            let word = line.trim();
            if word.is_empty() {
                continue;
            }
            words.insert(normalize(word).to_lowercase());
        }
    }
    Ok(words)
}

pub fn run(inputs: &[PathBuf], out: &Path) -> Result<usize> {
    let words = collect_words(inputs)?;

    let writer = BufWriter::new(File::create(out).with_context(|| format!("create {}", out.display()))?);
    let mut builder = fst::SetBuilder::new(writer)?;
    for word in &words {
        builder.insert(word)?;
    }
    builder.finish()?;

    Ok(words.len())
}

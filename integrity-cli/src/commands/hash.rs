//! Hash Command
//!
//! Computes the integrity digest of a file or of standard input.

use crate::symbols;
use anyhow::{Context, Result};
use console::style;
use integrity_core::{
    compute_hash_from_file_with_strategy, compute_integrity_hash, HashConfig, IntegrityResult,
    Strategy,
};
use serde::Serialize;
use std::io;
use std::time::Instant;
use tracing::debug;

/// Hash configuration
pub struct HashCommandConfig {
    /// Input path, `-` for stdin
    pub path: String,
    pub hash_config: HashConfig,
    pub strategy: Strategy,
    pub json: bool,
}

/// JSON output shape
#[derive(Serialize)]
struct HashOutput<'a> {
    source: &'a str,
    segment_size: usize,
    data_shards: usize,
    parity_shards: usize,
    strategy: Strategy,
    #[serde(flatten)]
    result: &'a IntegrityResult,
}

/// Run hash command
pub fn run(config: HashCommandConfig) -> Result<()> {
    let started = Instant::now();
    let result = compute(&config)?;
    debug!(
        source = %config.path,
        content_length = result.content_length,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "Integrity hash computed"
    );

    if config.json {
        let output = HashOutput {
            source: &config.path,
            segment_size: config.hash_config.segment_size,
            data_shards: config.hash_config.erasure.data_shards,
            parity_shards: config.hash_config.erasure.parity_shards,
            strategy: config.strategy,
            result: &result,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_result(&config, &result);
    Ok(())
}

fn compute(config: &HashCommandConfig) -> Result<IntegrityResult> {
    if config.path == "-" {
        let stdin = io::stdin();
        return compute_integrity_hash(stdin.lock(), &config.hash_config, config.strategy)
            .context("Failed to hash standard input");
    }

    compute_hash_from_file_with_strategy(&config.path, &config.hash_config, config.strategy)
        .with_context(|| format!("Failed to hash {}", config.path))
}

fn print_result(config: &HashCommandConfig, result: &IntegrityResult) {
    let erasure = &config.hash_config.erasure;

    println!(
        "{} {}",
        style(symbols::CHECK).green(),
        style(&config.path).bold()
    );
    println!(
        "  Size:     {} ({} bytes)",
        style(format_bytes(result.content_length)).cyan(),
        result.content_length
    );
    println!(
        "  Segments: {} x {}",
        config.hash_config.segment_count(result.content_length),
        format_bytes(config.hash_config.segment_size as u64)
    );
    println!(
        "  Layout:   {} data + {} parity ({})",
        erasure.data_shards, erasure.parity_shards, result.redundancy_type
    );
    println!();
    println!("  {}", style(symbols::HLINE_SHORT).dim());
    if let Some(primary) = result.primary_root() {
        println!("  {:<8} {}", style("primary").yellow(), primary);
    }
    for (index, root) in result.shard_roots().iter().enumerate() {
        let label = if index < erasure.data_shards {
            format!("data {}", index)
        } else {
            format!("parity {}", index - erasure.data_shards)
        };
        println!("  {:<8} {}", style(label).dim(), root);
    }
}

/// Format bytes in human-readable form
fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use integrity_core::compute_hash_from_buffer;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.00 KB");
        assert_eq!(format_bytes(16 * 1024 * 1024), "16.00 MB");
    }

    #[test]
    fn test_compute_file_matches_buffer() {
        let content = b"the quick brown fox jumps over the lazy dog";
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content).unwrap();
        file.flush().unwrap();

        let hash_config = HashConfig::new(8, 3, 2).unwrap();
        for strategy in [Strategy::Serial, Strategy::Parallel] {
            let config = HashCommandConfig {
                path: file.path().display().to_string(),
                hash_config,
                strategy,
                json: true,
            };
            let result = compute(&config).unwrap();
            assert_eq!(result, compute_hash_from_buffer(content, &hash_config).unwrap());
        }
    }

    #[test]
    fn test_missing_file_is_error() {
        let config = HashCommandConfig {
            path: "/definitely/not/here.bin".to_string(),
            hash_config: HashConfig::default(),
            strategy: Strategy::Serial,
            json: false,
        };
        assert!(compute(&config).is_err());
    }

    #[test]
    fn test_directory_is_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = HashCommandConfig {
            path: dir.path().display().to_string(),
            hash_config: HashConfig::new(8, 2, 1).unwrap(),
            strategy: Strategy::Parallel,
            json: false,
        };
        assert!(compute(&config).is_err());
    }

    #[test]
    fn test_json_output_flattens_result() {
        let hash_config = HashConfig::new(4, 2, 1).unwrap();
        let result = compute_hash_from_buffer(b"abcdefghi", &hash_config).unwrap();
        let output = HashOutput {
            source: "-",
            segment_size: 4,
            data_shards: 2,
            parity_shards: 1,
            strategy: Strategy::Parallel,
            result: &result,
        };

        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["content_length"], 9);
        assert_eq!(value["strategy"], "parallel");
        assert_eq!(value["integrity_hashes"].as_array().unwrap().len(), 4);
    }
}

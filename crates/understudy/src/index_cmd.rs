// SPDX-FileCopyrightText: 2026 Understudy Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `understudy index` command implementation.
//!
//! Loads the dialogue corpus, embeds every snippet, and seeds the vector
//! index. Safe to re-run: snippet ids are stable, so re-indexing
//! replaces rows instead of duplicating them. Deleting the database file
//! and re-running this command is the recovery path for a corrupt or
//! outdated index.

use colored::Colorize;
use understudy_config::UnderstudyConfig;
use understudy_core::UnderstudyError;
use understudy_engine::seed_corpus;

use crate::setup;

/// Runs the `understudy index` command.
pub async fn run_index(config: UnderstudyConfig) -> Result<(), UnderstudyError> {
    let corpus = setup::load_corpus(&config)?;
    let stats = corpus.stats();
    println!(
        "corpus: {} snippets, {} speakers, {} scenes",
        stats.total,
        stats.speakers.len(),
        stats.scenes
    );

    let index = setup::open_index(&config).await?;
    let embedder = setup::build_embedder(&config).await?;

    let indexed = seed_corpus(index.as_ref(), embedder.as_ref(), corpus.as_ref()).await?;
    println!(
        "{}",
        format!(
            "indexed {indexed} snippets into {}",
            config.storage.database_path
        )
        .green()
    );
    Ok(())
}

//! Seed command handler

use crate::config::Config;
use crate::db::{Store, seed::seed_demo_catalog};

pub async fn cmd_seed(config: &Config) -> anyhow::Result<()> {
    let store = Store::new(&config.general.database_path).await?;
    let report = seed_demo_catalog(&store).await?;

    if report.skipped {
        println!("Catalog already contains categories, nothing seeded.");
        return Ok(());
    }

    println!("✓ Demo catalog seeded");
    println!("{:-<40}", "");
    println!("  Categories: {}", report.categories.len());
    println!("  Genres:     {}", report.genres.len());
    println!("  Movies:     {}", report.movies.len());
    println!("  Series:     {}", report.series.len());
    println!("  Seasons:    {}", report.seasons.len());
    println!("  Episodes:   {}", report.episodes.len());

    Ok(())
}

//! Cache command implementation

use dlang_deps::error::Result;
use dlang_deps::settings::Settings;
use dlang_deps::source::GitSourceResolver;

use crate::cli::{CacheArgs, CacheSubcommand};

pub fn run(args: CacheArgs) -> Result<()> {
    let settings = Settings::from_env()?;
    let sources = GitSourceResolver::new(&settings);

    match args.command {
        Some(CacheSubcommand::Clear) => {
            sources.clear_cache()?;
            println!("Cache cleared successfully.");
        }
        None => {
            let stats = sources.cache_stats()?;
            println!("Cache Statistics:");
            println!("  Location: {}", settings.cache_root.display());
            println!("  Repositories: {}", stats.repositories);
            println!("  Versions: {}", stats.versions);
            println!("  Size: {}", stats.formatted_size());

            if stats.repositories == 0 {
                println!("\nCache is empty.");
            } else {
                println!("\nRun 'dlang-deps cache clear' to remove everything from cache.");
            }
        }
    }
    Ok(())
}

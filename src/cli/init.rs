//! Init command handler.

use color_eyre::Result;

use crate::config::Config;
use crate::context::Context;
use crate::di::Resolve;
use crate::repositories::KnowledgeRepository;
use crate::seed::initial_knowledge;
use crate::store::AppStore;

use super::App;

impl App {
    /// Create both collections and, with `seed`, save the built-in knowledge.
    pub async fn run_init(&self, seed: bool) -> Result<()> {
        let config = Config::load()?;
        tracing::info!(
            url = %config.index.url,
            knowledge = %config.index.knowledge_collection,
            changelog = %config.index.changelog_collection,
            "Loaded configuration"
        );

        let ctx = Context::from_config(config)?;
        let store: AppStore = ctx.resolve();
        store
            .ready()
            .await
            .map_err(|e| color_eyre::eyre::eyre!("Failed to create collections: {}", e))?;

        println!(
            "Collections ready: {}, {}",
            store.knowledge_collection(),
            store.changelog_collection()
        );

        if !seed {
            return Ok(());
        }

        let repo: KnowledgeRepository = ctx.resolve();
        let entries = initial_knowledge();
        for entry in &entries {
            repo.save_knowledge(entry).await?;
            println!("  saved: {}", entry.title);
        }

        println!("\nSeeded {} knowledge entries.", entries.len());
        println!("Categories: {}", repo.get_categories().await?.join(", "));

        Ok(())
    }
}

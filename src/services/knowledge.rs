//! Knowledge service: the write paths that build entries for the operator.
//!
//! Repositories store whatever they are given. This service owns the
//! conventions on top: how updates append, what a logged solution or a
//! how-to looks like, and how a device config file becomes an entry.

use std::fmt::Write as _;

use crate::context::Context;
use crate::di::FromContext;
use crate::error::AppError;
use crate::models::{now_timestamp, ChangeLogEntry, KnowledgeEntry};
use crate::remote::{shell_escape, AppRemote};
use crate::repositories::{ChangelogRepository, KnowledgeRepository};

/// Category for entries produced by [`KnowledgeService::log_solution`].
pub const TROUBLESHOOTING: &str = "troubleshooting";

/// Services whose configs are filed under `voice-pipeline`; the rest go to `docker`.
const VOICE_SERVICES: &[&str] = &["whisper", "piper", "wakeword"];

/// Characters of the problem statement kept in a solution title.
const SOLUTION_TITLE_CHARS: usize = 50;

#[derive(FromContext, Clone)]
pub struct KnowledgeService {
    knowledge: KnowledgeRepository,
    changelog: ChangelogRepository,
    remote: AppRemote,
}

impl KnowledgeService {
    /// Replaces or appends to an entry's content and re-saves it under the same id.
    ///
    /// `updated_at` always moves forward, even within one clock tick.
    pub async fn update_knowledge(
        &self,
        id: &str,
        content: &str,
        append: bool,
    ) -> Result<KnowledgeEntry, AppError> {
        let mut entry = self
            .knowledge
            .get_knowledge_by_id(id)
            .await?
            .ok_or_else(|| AppError::KnowledgeNotFound(id.to_string()))?;

        if append {
            entry.append_content(content);
        } else {
            entry.replace_content(content);
        }

        self.knowledge.save_knowledge(&entry).await?;
        tracing::info!(id, append, "Updated knowledge entry");
        Ok(entry)
    }

    /// Files a solved problem under `troubleshooting`.
    pub async fn log_solution(
        &self,
        problem: &str,
        solution: &str,
        steps: &[String],
    ) -> Result<KnowledgeEntry, AppError> {
        let mut content = format!("## Problem\n{}\n\n## Solution\n{}\n\n## Steps\n", problem, solution);
        for (i, step) in steps.iter().enumerate() {
            let _ = writeln!(content, "{}. {}", i + 1, step);
        }

        let head: String = problem.chars().take(SOLUTION_TITLE_CHARS).collect();
        let entry = KnowledgeEntry::new(
            format!("Solution: {}...", head),
            content,
            TROUBLESHOOTING,
            vec!["solution".to_string(), "problem".to_string()],
        );

        self.knowledge.save_knowledge(&entry).await?;
        Ok(entry)
    }

    /// Saves a step-by-step guide.
    pub async fn create_howto(
        &self,
        title: &str,
        steps: &[String],
        category: &str,
        tags: Vec<String>,
    ) -> Result<KnowledgeEntry, AppError> {
        let mut content = format!("# {}\n\n", title);
        for (i, step) in steps.iter().enumerate() {
            let _ = write!(content, "## Step {}\n{}\n\n", i + 1, step);
        }
        let _ = write!(content, "\n---\nCreated: {}", now_timestamp());

        let mut all_tags = vec!["howto".to_string()];
        all_tags.extend(tags);

        let entry = KnowledgeEntry::new(format!("How-To: {}", title), content, category, all_tags);
        self.knowledge.save_knowledge(&entry).await?;
        Ok(entry)
    }

    /// Reads a config file from the device and stores it as an entry.
    ///
    /// A file that cannot be read is still documented, with the
    /// placeholder text the device printed instead.
    pub async fn document_config(
        &self,
        service: &str,
        path: &str,
        description: &str,
    ) -> Result<KnowledgeEntry, AppError> {
        let command = format!("cat {} 2>/dev/null || echo 'File not found'", shell_escape(path));
        let output = self.remote.execute(&command, None).await;
        if !output.success {
            tracing::warn!(path, stderr = %output.stderr, "Config read failed");
        }

        let content = format!(
            "## Service: {service}\n## Path: {path}\n## Description: {description}\n\n\
             ### Config contents\n```\n{body}\n```\n\n### Documented at\n{now}\n",
            body = output.stdout,
            now = now_timestamp(),
        );

        let category = if VOICE_SERVICES.contains(&service) {
            "voice-pipeline"
        } else {
            "docker"
        };

        let entry = KnowledgeEntry::new(
            format!("Config {}: {}", service, path),
            content,
            category,
            vec![service.to_string(), "config".to_string()],
        );
        self.knowledge.save_knowledge(&entry).await?;
        Ok(entry)
    }

    /// Records a change made to the device.
    pub async fn log_change(
        &self,
        what: &str,
        why: &str,
        details: &str,
        files_changed: Vec<String>,
        commands_run: Vec<String>,
    ) -> Result<ChangeLogEntry, AppError> {
        let entry = ChangeLogEntry::new(what, why, details, files_changed, commands_run);
        self.changelog.save_changelog(&entry).await?;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::di::FromRef;
    use crate::remote::ScriptedRemote;

    fn service_with(remote: ScriptedRemote) -> (Context, KnowledgeService) {
        let ctx = Context::for_tests(Arc::new(remote));
        let service = KnowledgeService::from_ref(&ctx);
        (ctx, service)
    }

    fn service() -> (Context, KnowledgeService) {
        service_with(ScriptedRemote::new())
    }

    #[tokio::test]
    async fn test_update_replace_sets_content_exactly() {
        let (ctx, service) = service();
        let repo = KnowledgeRepository::from_ref(&ctx);
        let entry = KnowledgeEntry::new("Whisper", "port 10300", "voice-pipeline", vec![]);
        repo.save_knowledge(&entry).await.unwrap();

        let updated = service
            .update_knowledge(&entry.id, "port 10301", false)
            .await
            .unwrap();
        assert_eq!(updated.content, "port 10301");
        assert!(updated.updated_at > entry.updated_at);

        let stored = repo.get_knowledge_by_id(&entry.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
    }

    #[tokio::test]
    async fn test_update_append_keeps_prefix() {
        let (ctx, service) = service();
        let repo = KnowledgeRepository::from_ref(&ctx);
        let entry = KnowledgeEntry::new("Piper", "voice ru_RU", "voice-pipeline", vec![]);
        repo.save_knowledge(&entry).await.unwrap();

        let updated = service
            .update_knowledge(&entry.id, "switched to en_US", true)
            .await
            .unwrap();
        assert!(updated.content.starts_with("voice ru_RU\n\n---\nUpdated "));
        assert!(updated.content.ends_with(":\nswitched to en_US"));
        assert_eq!(updated.created_at, entry.created_at);
    }

    #[tokio::test]
    async fn test_update_missing_entry() {
        let (_, service) = service();
        let err = service
            .update_knowledge("0b7f1f5e-6a43-4c47-9f0e-6d9c1b6d0a11", "x", false)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::KnowledgeNotFound(_)));
    }

    #[tokio::test]
    async fn test_log_solution_layout() {
        let (_, service) = service();
        let problem = "Whisper container restarts every few minutes because of OOM kills";
        let entry = service
            .log_solution(problem, "Limit threads", &["Edit compose".into(), "Restart".into()])
            .await
            .unwrap();

        assert_eq!(entry.category, TROUBLESHOOTING);
        assert_eq!(entry.tags, vec!["solution", "problem"]);
        assert_eq!(
            entry.title,
            format!("Solution: {}...", &problem[..SOLUTION_TITLE_CHARS])
        );
        assert!(entry.content.contains("## Problem\n"));
        assert!(entry.content.contains("## Solution\nLimit threads"));
        assert!(entry.content.ends_with("1. Edit compose\n2. Restart\n"));
    }

    #[tokio::test]
    async fn test_create_howto_layout() {
        let (_, service) = service();
        let entry = service
            .create_howto(
                "Record audio",
                &["arecord -l".into(), "arecord -d 5 test.wav".into()],
                "hardware",
                vec!["audio".into()],
            )
            .await
            .unwrap();

        assert_eq!(entry.title, "How-To: Record audio");
        assert_eq!(entry.tags, vec!["howto", "audio"]);
        assert!(entry.content.starts_with("# Record audio\n\n## Step 1\narecord -l\n\n## Step 2\n"));
        assert!(entry.content.contains("\n---\nCreated: "));
    }

    #[tokio::test]
    async fn test_document_config_reads_quoted_path() {
        let remote = ScriptedRemote::new().ok("cat '/opt/whisper/config.yml'", "model: small");
        let (_, service) = service_with(remote);

        let entry = service
            .document_config("whisper", "/opt/whisper/config.yml", "STT settings")
            .await
            .unwrap();

        assert_eq!(entry.title, "Config whisper: /opt/whisper/config.yml");
        assert_eq!(entry.category, "voice-pipeline");
        assert_eq!(entry.tags, vec!["whisper", "config"]);
        assert!(entry.content.contains("```\nmodel: small\n```"));
    }

    #[tokio::test]
    async fn test_document_config_other_services_go_to_docker() {
        let remote = ScriptedRemote::new().ok("cat", "File not found\n");
        let (_, service) = service_with(remote);

        let entry = service
            .document_config("qdrant", "/srv/qdrant.yaml", "Vector DB")
            .await
            .unwrap();
        assert_eq!(entry.category, "docker");
    }

    #[tokio::test]
    async fn test_log_change_is_persisted() {
        let (ctx, service) = service();
        let entry = service
            .log_change("Installed piper", "TTS", "docker run", vec![], vec!["docker run".into()])
            .await
            .unwrap();

        let recent = ChangelogRepository::from_ref(&ctx).get_changelog(5).await.unwrap();
        assert_eq!(recent, vec![entry]);
    }
}

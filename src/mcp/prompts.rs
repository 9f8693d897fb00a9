//! MCP prompts: task templates for common device work.

/// A prompt template advertised by the server.
#[derive(Debug, Clone, Copy)]
pub struct PromptDef {
    pub name: &'static str,
    pub description: &'static str,
    pub text: &'static str,
}

pub const PROMPTS: &[PromptDef] = &[
    PromptDef {
        name: "setup_microphone",
        description: "Set up a microphone on the CM3588",
        text: include_str!("../../assets/prompts/setup_microphone.md"),
    },
    PromptDef {
        name: "setup_camera",
        description: "Set up a camera on the CM3588",
        text: include_str!("../../assets/prompts/setup_camera.md"),
    },
    PromptDef {
        name: "optimize_model_npu",
        description: "Convert and optimize a model for the RKNN NPU",
        text: include_str!("../../assets/prompts/optimize_model_npu.md"),
    },
    PromptDef {
        name: "troubleshoot_voice",
        description: "Diagnose the voice pipeline",
        text: include_str!("../../assets/prompts/troubleshoot_voice.md"),
    },
    PromptDef {
        name: "after_change",
        description: "What to record after changing the device",
        text: include_str!("../../assets/prompts/after_change.md"),
    },
    PromptDef {
        name: "setup_llm_npu",
        description: "Run an LLM on the RK3588 NPU",
        text: include_str!("../../assets/prompts/setup_llm_npu.md"),
    },
    PromptDef {
        name: "document_current_state",
        description: "Document the current state of the CM3588",
        text: include_str!("../../assets/prompts/document_current_state.md"),
    },
];

pub fn find(name: &str) -> Option<&'static PromptDef> {
    PROMPTS.iter().find(|p| p.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find() {
        let prompt = find("after_change").unwrap();
        assert!(prompt.text.contains("log_change("));
        assert!(find("make_coffee").is_none());
    }

    #[test]
    fn test_templates_are_non_empty() {
        assert_eq!(PROMPTS.len(), 7);
        assert!(PROMPTS.iter().all(|p| p.text.starts_with("# ")));
    }
}

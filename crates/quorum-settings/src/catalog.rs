//! Default model catalog and speaker-name pools.

/// One selectable model.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ModelEntry {
    /// OpenRouter model ID.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
}

/// Default model catalog offered when configuring panelists.
pub static AVAILABLE_MODELS: &[ModelEntry] = &[
    ModelEntry { id: "openai/gpt-5.2", name: "GPT-5.2" },
    ModelEntry { id: "anthropic/claude-sonnet-4.5", name: "Claude Sonnet 4.5" },
    ModelEntry { id: "google/gemini-3-pro-preview", name: "Gemini 3 Pro" },
    ModelEntry { id: "google/gemini-3-flash-preview", name: "Gemini 3 Flash" },
    ModelEntry { id: "x-ai/grok-4.1-fast", name: "Grok 4.1 Fast" },
    ModelEntry { id: "deepseek/deepseek-v3.2", name: "DeepSeek V3.2" },
    ModelEntry { id: "moonshotai/kimi-k2-thinking", name: "Kimi K2 Thinking" },
    ModelEntry { id: "allenai/olmo-3.1-32b-think:free", name: "Olmo 3.1 32b Think" },
    ModelEntry { id: "xiaomi/mimo-v2-flash:free", name: "Mimo V2 Flash" },
    ModelEntry { id: "mistralai/devstral-2512:free", name: "Devstral 2512" },
    ModelEntry { id: "openai/gpt-oss-120b:free", name: "GPT-OSS 120b" },
    ModelEntry { id: "z-ai/glm-4.5-air:free", name: "GLM 4.5 Air" },
    ModelEntry { id: "moonshotai/kimi-k2:free", name: "Kimi K2" },
    ModelEntry { id: "deepseek/deepseek-r1-0528:free", name: "DeepSeek R1 0528" },
    ModelEntry { id: "qwen/qwen3-coder:free", name: "Qwen 3 Coder" },
];

/// Anonymized names assigned to panelists so models debate on equal
/// footing, without brand recognition shaping the exchange.
pub static PANELIST_NAMES: &[&str] = &[
    "Alice", "Bob", "Carol", "David", "Eve", "Frank", "Grace", "Henry", "Iris", "Jack", "Kate",
    "Leo", "Mia", "Noah", "Olivia",
];

/// Default moderator display name.
pub const MODERATOR_NAME: &str = "Max";

/// Display name for a model ID, falling back to the raw ID when the model
/// is not in the catalog.
#[must_use]
pub fn display_name(model_id: &str) -> &str {
    AVAILABLE_MODELS
        .iter()
        .find(|m| m.id == model_id)
        .map_or(model_id, |m| m.name)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

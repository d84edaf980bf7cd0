// Shared prompt constants for LLM calls.
// Task-specific templates live next to the module that uses them.

/// System instruction that enforces JSON-only output.
/// Models still wrap JSON in fences or prose at times; the analysis
/// recovery parser tolerates that.
pub const JSON_ONLY_SYSTEM: &str = "You are an expert resume analyzer and career coach. \
    You MUST respond with a single valid JSON object only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

// Shared prompt fragments. Each module that calls the model keeps its own
// prompts.rs alongside it and pulls cross-cutting pieces from here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You are a precise, structured assistant. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Appended to every recipe prompt so quantities stay usable by the ingredient parser.
pub const MEASUREMENT_INSTRUCTION: &str = "\
    Use common US kitchen measurements (cup, tbsp, tsp, oz, lb). \
    Write quantities as plain numbers or simple fractions such as 1/2. \
    Use \"as needed\" when an ingredient has no fixed amount.";

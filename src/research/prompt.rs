//! Fixed prompt and query fragments.

/// Instruction prepended to scraped page text.
pub const FUTURE_PLANS_INSTRUCTION: &str = "Summarize this company's future plans:";

/// Path every accepted profile URL must contain.
pub const PROFILE_PATH: &str = "linkedin.com/company";

/// Query restricted to company profile pages.
pub fn profile_query(subject: &str) -> String {
    format!("{} site:{}", subject, PROFILE_PATH)
}

/// Query for pages discussing the subject's plans.
pub fn future_plans_query(subject: &str) -> String {
    format!("{} future plans", subject)
}

/// Completion prompt for a block of scraped text.
pub fn future_plans_prompt(text: &str) -> String {
    format!("{}\n\n{}", FUTURE_PLANS_INSTRUCTION, text)
}

//! Fixed prompts for the two remote stages, plus the manual check guide.
//!
//! Centralising every prompt here keeps them inspectable from unit tests
//! without spinning up a model, and makes a prompt change a one-file edit.
//! The vision prompt is literal: it is the same for every image.

/// Instruction sent with the screenshot to the vision model.
pub const VISION_PROMPT: &str = r#"Analyze this Indian Payment (UPI) screenshot.
1. Look for 'Ghosting' around text.
2. Verify if the 'Transaction Successful' green color is the correct hex.
3. Check for overlapping fonts in the Transaction ID.
Provide a technical summary."#;

/// The three labels the verdict prompt asks for, most severe first.
pub const VERDICT_LABELS: [&str; 3] = ["HIGH RISK", "SUSPICIOUS", "SAFE"];

/// Build the verdict prompt from the metadata summary and vision report.
///
/// Both inputs are embedded verbatim; credentials never reach this function.
pub fn verdict_prompt(metadata_summary: &str, vision_report: &str) -> String {
    format!(
        "Act as a Digital Forensic Expert. Based on this Metadata: {metadata_summary}\n\
         And this Vision Report: {vision_report}\n\
         Give a verdict: 'SAFE', 'SUSPICIOUS', or 'HIGH RISK'.\n\
         Keep it under 100 words for mobile reading."
    )
}

/// Checks a person can do by eye before spending API calls.
pub const MANUAL_CHECKLIST: [&str; 3] = [
    "Is the Font consistent? (Check '₹' symbol)",
    "Is the Transaction ID 12 digits?",
    "Are the clock and battery icons blurred?",
];

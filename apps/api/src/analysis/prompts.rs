// Resume analysis prompt template.
// Placeholders are filled from the active `ScoringPolicy`; see `policy.rs`.

pub const ANALYSIS_PROMPT: &str = r#"Analyze this resume like a modern ATS system.

{guidance}

Focus on:

• structure
• readability
• skills
• clarity
• completeness

Return ONLY valid JSON:

{
"ats_score": number (0-100),
"message": string,
"status": "{ready_status}" or "{not_ready_status}",
"weaknesses": string[],
"improvements": string[]
}

Status rules:

If ats_score >= {threshold}:
message: "{ready_message}"
status: "{ready_status}"

If ats_score < {threshold}:
message: "{not_ready_message}"
status: "{not_ready_status}"

Weaknesses:
• maximum {max_weaknesses} items
{list_tone}

Improvements:
• maximum {max_improvements} items
• practical advice

Return ONLY the JSON object. Do not add any other text or code fences."#;

pub const BALANCED_GUIDANCE: &str = "\
Be FAIR, REALISTIC and SLIGHTLY POSITIVE.

Important scoring rules:

• Most resumes should score between 70 and 90
• Only very bad resumes below 60
• Only exceptional resumes above 90

Do NOT be overly strict. Be supportive, professional and balanced.";

pub const STRICT_GUIDANCE: &str = "\
Score the resume the way an automated ATS filter would, without leniency.";

pub const BALANCED_LIST_TONE: &str = "• keep simple\n• do NOT be harsh";

pub const STRICT_LIST_TONE: &str = "• be specific and concise";

// All prompt constants and canned instruction blocks for the Refinement
// module — the only consumer of the generative client today.

use crate::refinement::intent::{DerivedFormat, StructureChange, ToneValue};

/// System prompt for refinement calls — enforces JSON-only output.
pub const REFINEMENT_SYSTEM: &str =
    "You are the CVForge refinement engine. You transform an existing CV \
    document according to structured commands while preserving every fact \
    the user supplied. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Output-shape requirements appended to every compiled prompt.
pub const OUTPUT_SHAPE: &str = r#"OUTPUT FORMAT (JSON ONLY):
{
  "digital_summary": "Brief, energetic 1-2 sentence summary of changes made",
  "markup": "Full updated HTML CV body with ALL changes applied",
  "additional_formats": {
    "interview_points": ["3-5 bullet points for interview preparation"],
    "social_post": "A ready-to-post update about their career journey",
    "elevator_pitch": "A 30-45 second verbal summary of their value proposition",
    "cover_letter_bullets": ["3-5 bullet points for a cover letter"]
  },
  "change_log": ["List each major change applied", "Be specific"],
  "suggestions": ["2-3 actionable suggestions for further improvement"]
}"#;

/// Non-regression rules. These are enforced as literal prompt text and
/// re-checked after the response comes back.
pub const QUALITY_RULES: &str = "QUALITY REQUIREMENTS:
1. NEVER use placeholders like [Phone Number] - use actual data or omit
2. Maintain consistency - don't change unrelated sections
3. Preserve all original information unless explicitly asked to remove
4. Use STAR format for achievements: Accomplished [X] as measured by [Y] by doing [Z]
5. Keep HTML clean and semantic - no markdown, proper closing tags";

/// Canned suggestions used when the service omits its own.
pub const DEFAULT_SUGGESTIONS: &[&str] = &[
    "Consider adding more quantifiable metrics to achievements",
    "Review the tone to match your target industry",
    "Update the skills section with latest technologies",
];

pub fn tone_instruction(value: ToneValue, intensity: u8) -> String {
    let body = match value {
        ToneValue::Aggressive => format!(
            "Use action verbs: Engineered, Architected, Spearheaded, Drove, Shipped.\n\
             Start bullet points with strong verbs.\n\
             Remove weak language like \"Assisted with\" or \"Helped\".\n\
             Quantify everything possible.\n\
             Confidence level: {intensity}/5 - {}.",
            if intensity >= 4 { "Very bold" } else { "Moderately confident" }
        ),
        ToneValue::Professional => format!(
            "Use corporate language: Implemented, Managed, Coordinated, Developed, Oversaw.\n\
             Focus on business impact and ROI.\n\
             Include industry-standard terminology.\n\
             Formal sentence structure, no contractions.\n\
             Professionalism level: {intensity}/5."
        ),
        ToneValue::Concise => "Cut all fluff words.\n\
             Maximum 2 lines per bullet point.\n\
             Use fragment sentences where appropriate.\n\
             Remove redundant information.\n\
             Target 30% reduction in word count."
            .to_string(),
        ToneValue::Technical => format!(
            "Add technical specifications: tools, languages, frameworks.\n\
             Include system architecture details.\n\
             Use precise technical terminology.\n\
             Add a \"Technical Skills\" section if missing.\n\
             Depth: {intensity}/5."
        ),
        ToneValue::Confident => "Use \"I\" statements sparingly but powerfully.\n\
             Show ownership of outcomes.\n\
             Avoid passive voice.\n\
             Quantify achievements assertively."
            .to_string(),
        ToneValue::Friendly => "Use collaborative language: Partnered, Collaborated, Supported.\n\
             Include team achievements.\n\
             Warm, approachable tone.\n\
             Focus on relationship building."
            .to_string(),
    };
    format!("\nTONE ADJUSTMENT ({}):\n{body}\n", value.as_str())
}

pub fn focus_instruction(target: &str, value: &str) -> String {
    let body = match target {
        "leadership" => "Emphasize management experience, team size, mentoring, strategy.\n\
             Add leadership-specific metrics (team growth, retention, satisfaction).\n\
             Highlight decision-making authority and budget responsibility."
            .to_string(),
        "technical" => "Expand the technical skills section.\n\
             Add specific technologies, certifications, projects.\n\
             Use technical jargon appropriate for the role.\n\
             Show implementation details, not just management."
            .to_string(),
        "quantification" => "Find and add metrics to EVERY achievement.\n\
             If no numbers exist, estimate reasonable metrics.\n\
             Use %, $, #, time reductions.\n\
             Add before/after comparisons where possible."
            .to_string(),
        "projects" => "Add a \"Key Projects\" or \"Technical Projects\" section.\n\
             Describe scope, technologies, outcomes.\n\
             Include personal/portfolio projects if relevant."
            .to_string(),
        "market-region" => format!(
            "Adapt language for the {value} market: {}.",
            match value {
                "us" => "use US English, emphasize scalability, innovation, ROI",
                "uk" => "use UK English, focus on compliance, governance, efficiency",
                _ => "use international standards, highlight cross-cultural experience",
            }
        ),
        "industry" => format!(
            "Tailor for the {value} industry: {}.\n\
             Use industry-specific metrics and terminology.\n\
             Highlight relevant transferable skills.",
            industry_keywords(value)
        ),
        "role" => format!(
            "Align every section toward the target role of {value}.\n\
             Lead with the most role-relevant experience.\n\
             Mirror the vocabulary that role's hiring managers use."
        ),
        _ => format!("Focus on {value} as requested."),
    };
    format!("\nFOCUS ADJUSTMENT ({target}):\n{body}\n")
}

pub fn industry_keywords(industry: &str) -> &'static str {
    match industry {
        "tech" => "scalability, agile, sprint, deployment, stack, architecture",
        "fintech" => "compliance, fintech, blockchain, risk management, regulation",
        "startup" => "MVP, lean, growth, pivot, scalability, funding",
        "corporate" => "governance, compliance, stakeholder management, enterprise, scale",
        "consulting" => "client deliverables, stakeholder management, ROI, strategy, implementation",
        _ => "industry-specific terminology",
    }
}

pub fn structure_instruction(change: &StructureChange) -> String {
    match change {
        StructureChange::AddSection { section } => format!(
            "\nSTRUCTURE: Add \"{section}\" section\n\
             Create a new section titled \"{}\"\n\
             Populate it with relevant content from their experience\n\
             Place it in the logical flow of the CV\n",
            section.to_uppercase()
        ),
        StructureChange::RemoveSection { section } => format!(
            "\nSTRUCTURE: Remove \"{section}\" section\n\
             Remove the \"{section}\" section entirely\n\
             Do not reference it elsewhere\n\
             Maintain the flow of remaining sections\n"
        ),
        StructureChange::Reorder => "\nSTRUCTURE: Reorder sections\n\
             Prioritize the most relevant sections first\n\
             Typical order: Contact, Summary, Skills, Experience, Education, Other\n\
             Consider the target role when ordering\n"
            .to_string(),
        StructureChange::PageLimit { pages } => format!(
            "\nSTRUCTURE: Limit to {pages} page(s)\n\
             Adjust content density to fit {pages} page(s)\n\
             Remove the least relevant information\n\
             Condense verbose sections while maintaining readability\n"
        ),
        StructureChange::Simplify => "\nSTRUCTURE: Simplify\n\
             Remove redundant information\n\
             Combine similar bullet points\n\
             Use clearer, simpler language\n\
             Focus on core competencies\n"
            .to_string(),
        StructureChange::Expand => "\nSTRUCTURE: Expand\n\
             Add detail to each bullet point\n\
             Include more context and outcomes\n\
             Elaborate on responsibilities\n\
             Add more metrics and examples\n"
            .to_string(),
    }
}

pub const QUANTIFY_INSTRUCTION: &str = "\nQUANTIFICATION: Add metrics to all achievements\n\
For each bullet point, add at least one number:\n\
- Percentage: Increased by 40%\n\
- Dollar amount: Saved $50k\n\
- Time reduction: Reduced from 2 weeks to 3 days\n\
- Volume: Managed 250+ clients\n\
If exact numbers are unknown, use \"approximately\" or \"over\"\n";

pub fn format_instruction(format: DerivedFormat) -> &'static str {
    match format {
        DerivedFormat::InterviewPoints => "\nFORMAT GENERATION (interview points):\n\
             Generate 3-5 bullet points for interview preparation.\n\
             Each point should highlight a key achievement.\n\
             Use STAR format: Situation, Task, Action, Result.\n\
             Make them conversational for verbal delivery.\n",
        DerivedFormat::SocialPost => "\nFORMAT GENERATION (social post):\n\
             Write a professional social-network post about their career journey.\n\
             Professional but personal; mention specific achievements from the CV.\n\
             End with a call to action or reflection.\n",
        DerivedFormat::ElevatorPitch => "\nFORMAT GENERATION (elevator pitch):\n\
             Create a 30-45 second verbal summary.\n\
             Start with \"I help [target audience] achieve [outcome].\"\n\
             Include 2-3 key achievements.\n\
             End with what they're looking for next.\n",
        DerivedFormat::CoverLetterBullets => "\nFORMAT GENERATION (cover letter bullets):\n\
             Generate 3-5 bullet points for a cover letter.\n\
             Tailor them to the target role.\n\
             Show how their skills solve employer problems.\n\
             Use \"I achieved X resulting in Y for Z\" framing.\n",
    }
}

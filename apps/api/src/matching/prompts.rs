// All LLM prompt templates for the matching engine.

/// Skill-matching prompt template.
/// Replace: {candidate_skills}, {job_requirements}, {job_description}
pub const SKILL_MATCH_PROMPT_TEMPLATE: &str = r#"You are an expert technical recruiter analyzing skill matches between a candidate's resume and job requirements.

CANDIDATE SKILLS (EXACT NAMES - DO NOT MODIFY THESE):
{candidate_skills}

JOB REQUIREMENTS:
{job_requirements}

JOB DESCRIPTION:
{job_description}

MATCHING RULES:
1. Match flexibly: "JavaScript" = "Javascript" = "JS", "Node.js" = "Node" = "NodeJS", "CI/CD" = "CICD" = "Ci/Cd"
2. Match synonyms: "React.js" = "React" = "ReactJS", "TypeScript" = "Typescript" = "TS"
3. Match cloud: "AWS" = "Aws" = "Amazon Web Services", "Azure" = "Microsoft Azure", "GCP" = "Gcp" = "Google Cloud"
4. When a skill matches, use the EXACT TEXT from the CANDIDATE SKILLS list above
5. If you see "Typescript" in candidate skills and job needs "TypeScript", mark "Typescript" as matched

OUTPUT FORMAT (JSON only, no explanation):
{
    "required_skills": ["all technical skills mentioned in job, use your own names"],
    "matched_skills": ["EXACT candidate skill names that match - copy from candidate list above"],
    "missing_skills": ["required skills NOT found in candidate list"],
    "skills_score": <0-100 number>,
    "analysis": "one sentence summary"
}

CRITICAL: For matched_skills, you MUST copy the exact text from the candidate skills list. Do not change case, spelling, or format!"#;

/// Hiring memorandum prompt template.
/// Replace: {job_title}, {job_description}, {job_requirements}, {candidate_name},
///          {candidate_summary}, {skill_count}, {skills}, {work_count}, {experience_lines},
///          {education_lines}, {overall_score}, {skills_score}, {matched_count},
///          {assessed_count}, {experience_score}, {total_years}, {required_years},
///          {education_score}, {candidate_degree}, {required_degree}, {matched_skills},
///          {missing_skills}, {relevant_roles}, {web_context}
pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"You are a senior technical recruiter with 15+ years of experience in software engineering hiring. Analyze this candidate's fit for the position using a structured, data-driven approach.

JOB POSITION ANALYSIS:
Title: {job_title}
Description: {job_description}
Requirements: {job_requirements}

CANDIDATE PROFILE:
Name: {candidate_name}
Professional Summary: {candidate_summary}

TECHNICAL SKILLS ({skill_count}):
{skills}

WORK EXPERIENCE ({work_count} positions):
{experience_lines}

EDUCATION:
{education_lines}

MATCHING SCORES & ANALYSIS:
- Overall Fit: {overall_score}%
- Technical Skills: {skills_score}% ({matched_count}/{assessed_count} skills matched)
- Experience Level: {experience_score}% ({total_years} years vs {required_years} required)
- Education Match: {education_score}% ({candidate_degree} vs {required_degree} required)

MATCHED SKILLS: {matched_skills}
MISSING SKILLS: {missing_skills}
RELEVANT ROLES: {relevant_roles}{web_context}

Write a concise hiring memorandum covering:
1. Technical competency: skill match quality, experience depth, training needs
2. Risk assessment: onboarding complexity, gaps or red flags in the history
3. Interview strategy: specific technical and behavioral questions to ask
4. Final recommendation with confidence level

REPLY FORMAT: begin your reply with "1," if the candidate should proceed to interview or "0," if not, immediately followed by the memorandum text."#;

/// Substitutes `{key}` placeholders in a single pass over `template`.
/// Inserted values are never rescanned, and braces that name no key are kept as written.
pub fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let filled = after.find('}').and_then(|close| {
            let key = &after[..close];
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (close, *value))
        });
        match filled {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

// All LLM prompt constants for resume generation.

/// Exact CSS the generated document must reproduce. Shared by both prompts.
pub const LAYOUT_CSS: &str = "\
body { margin: 25px 30px; line-height: 1.25; font-size: 13.5px; font-family: Arial, sans-serif; }
h1 { font-size: 26px; margin: 0 0 5px 0; text-align: center; font-weight: bold; }
.contact { font-size: 11px; margin: 0 0 12px 0; text-align: center; }
h2 { font-size: 17px; margin: 12px 0 4px 0; padding-bottom: 2px; border-bottom: 1.5px solid #000; font-weight: bold; }
p { margin: 4px 0; }
ul { margin: 4px 0 8px 0; padding-left: 18px; }
li { margin: 2px 0; line-height: 1.3; }
.job-title { font-weight: bold; margin: 6px 0 2px 0; }
.job-company { font-style: italic; margin: 0; }
.job-date { margin: 0 0 3px 0; }";

/// System prompt. Replace `{layout_css}` before sending.
pub const RESUME_SYSTEM_TEMPLATE: &str = r#"You are a professional resume writer. Build a single, ATS-friendly resume by combining and aligning the candidate's resume with the job description contained in user input.

Rules for content:
Tailor the resume to the JD while staying truthful to the candidate's information. Prioritize skills/keywords the JD demands. Rephrase; do not invent facts.
Omit sections that have no data instead of adding placeholders.
Prefer the candidate's details when resume and JD conflict; only adjust wording to match JD terminology.
Keep the resume concise and within 2 pages maximum.

Rules for layout & style:
Output one valid HTML document only (no Markdown, no code fences, no JSON, no citations, no comments, no <think> or similar tags, no text before or after).
Use inline CSS inside <style> in the <head>; no external assets (fonts, scripts, images, icons, tables).

CRITICAL CSS REQUIREMENTS - Copy these exact styles:
{layout_css}

Structure:
Name at top center (h1), contact below (div.contact)
Section titles as h2 with underline
Skills section: Use category labels in bold followed by comma-separated items (NOT bullet lists)
Experience: Use .job-title, .job-company, .job-date classes, then <ul> for achievements
Keep everything tight and compact - NO extra whitespace between sections

Output requirement (critical):
Return only:
<!DOCTYPE html>
<html>...full document with inline <style>...</html>"#;

/// Per-request user prompt.
/// Replace: {layout_css}, then {merged_content} last so candidate text is never rescanned.
pub const RESUME_USER_TEMPLATE: &str = r#"Generate an ATS-friendly resume in HTML with extremely compact spacing.

Input data:
{merged_content}

MANDATORY CSS (use exactly as provided):
{layout_css}

STRUCTURE REQUIREMENTS:
1. Name (h1) → Contact info (div.contact) → Sections (h2)
2. Skills: Format as "Category: skill1, skill2, skill3" (NO bullets, just paragraphs)
3. Experience: job-title/company/date divs, then <ul> for bullet achievements
4. Keep spacing TIGHT - minimize all gaps
5. Aim for 2 pages max

Output ONLY the complete HTML document. No explanations."#;

/// Shell used when the model output contains no recognisable document.
/// Replace `{content}` with the raw model output.
pub const FALLBACK_DOCUMENT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <style>
        body { font-family: Arial, sans-serif; margin: 40px; line-height: 1.6; }
        h1 { text-align: center; }
    </style>
</head>
<body>
{content}
</body>
</html>"#;

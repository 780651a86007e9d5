//! System prompts shared by all providers

/// Instructions for the OCR (image -> markdown) step.
pub const OCR_SYSTEM_PROMPT: &str = "\
Convert the following document image to markdown.

Rules:
- Return only the markdown, with no explanation and no code fences.
- Transcribe all visible text exactly as written; do not correct spelling
  or normalize values.
- Preserve the reading order of the document.
- Render tables as markdown tables, preserving every row and column.
- Render checkboxes as ☐ (unchecked) or ☑ (checked).
- Describe logos or figures in a short italic note, e.g. *[Company logo]*.
- If part of the page is illegible, write [illegible] in its place.";

/// Instructions for the text -> JSON extraction step.
pub const JSON_EXTRACTION_SYSTEM_PROMPT: &str = "\
Extract the data from the following document text into JSON matching the
provided schema.

Rules:
- Return only a JSON object, with no explanation and no code fences.
- Use null for any field that is not present in the document.
- Copy values exactly as they appear; do not reformat numbers or dates.";

/// Instructions for the direct image -> JSON extraction step.
pub const IMAGE_EXTRACTION_SYSTEM_PROMPT: &str = "\
Extract the data from the following document image into JSON matching the
provided schema.

Rules:
- Return only a JSON object, with no explanation and no code fences.
- Use null for any field that is not visible in the image.
- Copy values exactly as they appear; do not reformat numbers or dates.";

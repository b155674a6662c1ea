use serde::Deserialize;

use crate::{
    models::{FormSummary, GeneratedPayload},
    submission::Submission,
};

pub const COPIED_MESSAGE: &str = "Copied to clipboard!";

const IMAGE_CAPTION: &str =
    "Powered by Cloudinary. The image is automatically enhanced to look more professional.";

/// Result fields that carry a Copy button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyField {
    Description,
    SocialPost,
    Hashtags,
}

impl CopyField {
    pub fn text(self, payload: &GeneratedPayload) -> String {
        let text = &payload.generated_text;
        match self {
            CopyField::Description => text.description.clone(),
            CopyField::SocialPost => text.social_post.clone(),
            CopyField::Hashtags => text.hashtag_line(),
        }
    }
}

/// One-off acknowledgment shown above the form after a copy.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Error(String),
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn page(form: &FormSummary, submission: &Submission, notice: Option<&Notice>) -> String {
    let notice = match notice {
        Some(Notice::Info(msg)) => format!(r#"<div class="notice">{}</div>"#, escape(msg)),
        Some(Notice::Error(msg)) => format!(r#"<div class="alert">{}</div>"#, escape(msg)),
        None => String::new(),
    };
    let error = submission
        .error()
        .map(|msg| format!(r#"<div class="alert"><p>Error: {}</p></div>"#, escape(msg)))
        .unwrap_or_default();
    let result = submission.payload().map(result_section).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Artisan AI</title>
<link rel="stylesheet" href="/assets/style.css">
</head>
<body>
<header>
<h1>Artisan AI 🎨</h1>
<p>Effortless content generation for your handmade products.</p>
</header>
<main>
{notice}
{form}
{error}
{result}
</main>
<footer><p>Built for the Hackathon</p></footer>
</body>
</html>
"#,
        form = form_section(form, submission.is_loading()),
    )
}

fn form_section(form: &FormSummary, loading: bool) -> String {
    let selected = form
        .image_name
        .as_deref()
        .map(|name| format!(r#"<p class="hint">Selected: {}</p>"#, escape(name)))
        .unwrap_or_default();
    let (disabled, label) = if loading { (" disabled", "Generating...") } else { ("", "Generate Content") };

    format!(
        r#"<section>
<h2>Create New Content</h2>
<form method="post" action="/" enctype="multipart/form-data" onsubmit="var b=this.querySelector('button[type=submit]');b.disabled=true;b.textContent='Generating...';">
<label for="product-image">Upload Product Image</label>
<input id="product-image" type="file" name="image">
{selected}
<label for="product-name">Product Name</label>
<input id="product-name" type="text" name="product_name" value="{product_name}" placeholder="e.g., Hand-carved Wooden Bowl">
<label for="keywords">Keywords (optional)</label>
<textarea id="keywords" name="keywords" rows="3" placeholder="e.g., eco-friendly, unique grain, made with love">{keywords}</textarea>
<button type="submit"{disabled}>{label}</button>
</form>
</section>"#,
        product_name = escape(&form.product_name),
        keywords = escape(&form.keywords),
    )
}

fn result_section(payload: &GeneratedPayload) -> String {
    let text = &payload.generated_text;
    format!(
        r#"<section class="results">
<h2>Generated Content</h2>
<div class="image">
<h3>Enhanced Image:</h3>
<img src="{url}" alt="Enhanced product">
<p class="hint">{IMAGE_CAPTION}</p>
</div>
{description}
{social_post}
{hashtags}
</section>"#,
        url = escape(&payload.enhanced_image_url),
        description = text_card("Product Description:", "description", &text.description),
        social_post = text_card("Social Media Post:", "social_post", &text.social_post),
        hashtags = text_card("Hashtags:", "hashtags", &text.hashtag_line()),
    )
}

fn text_card(title: &str, field: &str, body: &str) -> String {
    format!(
        r#"<div class="card">
<form method="post" action="/copy"><h3>{title}</h3><input type="hidden" name="field" value="{field}"><button type="submit">Copy</button></form>
<p id="{field}">{body}</p>
</div>"#,
        body = escape(body),
    )
}

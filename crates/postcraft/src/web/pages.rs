use postcraft_core::LoopOutcome;

use crate::render::{highlight_hashtags, html_escape};

/// Values echoed back into the form after a submission
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct FormValues {
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub mood: String,
    #[serde(default)]
    pub style_account: String,
}

/// Banner shown above the form
#[derive(Debug, Clone)]
pub enum Notice {
    Warning(String),
    Error(String),
}

/// Render the landing page with an empty or echoed form.
pub fn render_index(values: &FormValues, notice: Option<&Notice>) -> String {
    let notice = notice.map(render_notice).unwrap_or_default();
    let content = format!("{}{}", notice, render_form(values));
    build_page("Craft a post", &content)
}

/// Render the form followed by the finished post card.
pub fn render_result(values: &FormValues, outcome: &LoopOutcome) -> String {
    let content = format!("{}{}", render_form(values), render_post_card(outcome));
    build_page("Your post", &content)
}

fn render_notice(notice: &Notice) -> String {
    let (class, text) = match notice {
        Notice::Warning(text) => ("notice notice-warning", text),
        Notice::Error(text) => ("notice notice-error", text),
    };
    format!(r#"<div class="{class}">{}</div>"#, html_escape(text))
}

fn render_form(values: &FormValues) -> String {
    format!(
        r#"<form method="post" action="/craft" class="craft-form">
    <label for="topic">What's the topic of your post?</label>
    <input id="topic" name="topic" value="{topic}" placeholder="e.g., The future of Artificial Intelligence">
    <label for="mood">What's the mood? (Optional)</label>
    <input id="mood" name="mood" value="{mood}" placeholder="e.g., Funny, inspirational, serious, sarcastic">
    <label for="style_account">Copy the style of an account? (Optional)</label>
    <input id="style_account" name="style_account" value="{style}" placeholder="e.g., naval (without @)">
    <button type="submit">Craft my post</button>
</form>"#,
        topic = html_escape(&values.topic),
        mood = html_escape(&values.mood),
        style = html_escape(&values.style_account),
    )
}

fn render_post_card(outcome: &LoopOutcome) -> String {
    let status = if outcome.is_approved() {
        "Approved by the critic".to_string()
    } else {
        format!("Best effort after {} rounds", outcome.iterations())
    };

    format!(
        r#"<div class="post-card">
    <div class="post-header"><span class="author">AI Influencer</span> <span class="handle">@aicrafted_</span></div>
    <div class="post-body">{body}</div>
    <div class="post-meta">{status} &middot; {secs:.1}s</div>
</div>"#,
        body = highlight_hashtags(outcome.final_draft()),
        status = html_escape(&status),
        secs = outcome.total_duration_secs,
    )
}

fn build_page(title: &str, content: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | PostCraft</title>
<style>
*{{margin:0;padding:0;box-sizing:border-box;}}
body{{font-family:Inter,-apple-system,"Segoe UI",Roboto,sans-serif;background:#0e1117;color:#e0e0e0;}}
.container{{max-width:720px;margin:0 auto;padding:24px 16px;}}
.header{{text-align:center;margin-bottom:32px;}}
.header h1{{font-size:40px;font-weight:700;color:#fff;}}
.header h1 span{{color:#00a3ff;}}
.header p{{color:#b0b0b0;max-width:500px;margin:8px auto 0;}}
.craft-form label{{display:block;font-weight:600;margin:16px 0 4px;}}
.craft-form input{{width:100%;padding:10px;background:#262730;color:#fff;border:1px solid #333;border-radius:8px;}}
.craft-form button{{width:100%;margin-top:20px;padding:12px;border:none;border-radius:12px;font-weight:700;color:#fff;background:linear-gradient(45deg,#007bff,#00a3ff);cursor:pointer;}}
.notice{{padding:10px 14px;border-radius:8px;margin-bottom:16px;font-size:14px;}}
.notice-warning{{background:#3b3217;color:#ffd666;border:1px solid #6b5a1e;}}
.notice-error{{background:#3b1a1a;color:#ff8a8a;border:1px solid #6b2a2a;}}
.post-card{{background:#1e1e1e;border:1px solid #333;border-radius:16px;padding:24px;margin-top:32px;}}
.post-header{{margin-bottom:12px;}}
.post-header .author{{font-weight:700;}}
.post-header .handle{{color:#a0a0a0;}}
.post-body{{font-size:18px;line-height:1.6;color:#fff;white-space:pre-wrap;}}
.post-body .hashtag{{color:#1da1f2;font-weight:500;}}
.post-meta{{margin-top:12px;font-size:12px;color:#888;}}
</style>
</head>
<body>
<div class="container">
<div class="header">
    <h1>PostCraft <span>AI</span></h1>
    <p>Turn your ideas into posts in seconds. Give a topic and let the models draft, critique and polish it.</p>
</div>
{content}
</div>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_echoes_escaped_values() {
        let values = FormValues {
            topic: r#""quoted" <topic>"#.to_string(),
            ..Default::default()
        };
        let html = render_index(&values, None);
        assert!(html.contains(r#"value="&quot;quoted&quot; &lt;topic&gt;""#));
        assert!(!html.contains("notice-warning"));
    }

    #[test]
    fn test_index_renders_notice() {
        let notice = Notice::Warning("Please enter a topic to craft your post!".to_string());
        let html = render_index(&FormValues::default(), Some(&notice));
        assert!(html.contains(r#"<div class="notice notice-warning">Please enter a topic"#));

        let notice = Notice::Error("model <down>".to_string());
        let html = render_index(&FormValues::default(), Some(&notice));
        assert!(html.contains("model &lt;down&gt;"));
    }
}

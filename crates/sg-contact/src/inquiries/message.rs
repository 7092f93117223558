use std::fmt::Write as _;

use super::domain::Inquiry;

pub const SENDER_NAME: &str = "S&G Global Advisors";

/// Rendered notification for one inquiry, independent of how it is delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryEmail {
    pub subject: String,
    pub reply_to: String,
    pub text_body: String,
    pub html_body: String,
}

impl InquiryEmail {
    pub fn compose(inquiry: &Inquiry) -> Self {
        Self {
            subject: format!("New Contact Inquiry from {}", inquiry.name),
            reply_to: inquiry.email.clone(),
            text_body: render_text(inquiry),
            html_body: render_html(inquiry),
        }
    }
}

/// Escape the five HTML-significant characters.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    escaped
}

fn submitted_at(inquiry: &Inquiry) -> String {
    inquiry.created_at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

fn render_text(inquiry: &Inquiry) -> String {
    let mut body = format!(
        "New Contact Inquiry - {SENDER_NAME}\n\nName: {}\nEmail: {}\n",
        inquiry.name, inquiry.email
    );
    if let Some(phone) = present(&inquiry.phone) {
        let _ = writeln!(body, "Phone: {phone}");
    }
    if let Some(company) = present(&inquiry.company) {
        let _ = writeln!(body, "Company: {company}");
    }
    let _ = write!(
        body,
        "\nMessage:\n{}\n\nSubmitted: {}",
        inquiry.message,
        submitted_at(inquiry)
    );
    body
}

fn html_field(out: &mut String, label: &str, value_html: &str) {
    let _ = write!(
        out,
        r#"
            <div class="field">
              <div class="label">{label}:</div>
              <div class="value">{value_html}</div>
            </div>"#
    );
}

fn render_html(inquiry: &Inquiry) -> String {
    let mut fields = String::new();
    html_field(&mut fields, "Name", &escape_html(&inquiry.name));
    html_field(&mut fields, "Email", &escape_html(&inquiry.email));
    if let Some(phone) = present(&inquiry.phone) {
        html_field(&mut fields, "Phone", &escape_html(phone));
    }
    if let Some(company) = present(&inquiry.company) {
        html_field(&mut fields, "Company", &escape_html(company));
    }
    let message = escape_html(&inquiry.message).replace("\r\n", "\n").replace('\n', "<br>");
    html_field(&mut fields, "Message", &message);
    html_field(&mut fields, "Submitted", &submitted_at(inquiry));

    format!(
        r#"<!DOCTYPE html>
<html>
  <head>
    <meta charset="utf-8">
    <style>
      body {{ font-family: Arial, sans-serif; line-height: 1.6; color: #333; }}
      .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
      .header {{ background-color: #1e293b; color: white; padding: 20px; text-align: center; }}
      .content {{ background-color: #f8f9fa; padding: 20px; }}
      .field {{ margin-bottom: 15px; }}
      .label {{ font-weight: bold; color: #1e293b; }}
      .value {{ margin-top: 5px; padding: 10px; background-color: white; border-left: 3px solid #1e293b; }}
      .footer {{ margin-top: 20px; padding-top: 20px; border-top: 1px solid #ddd; font-size: 12px; color: #666; }}
    </style>
  </head>
  <body>
    <div class="container">
      <div class="header">
        <h2>New Contact Inquiry</h2>
        <p>{sender}</p>
      </div>
      <div class="content">{fields}
      </div>
      <div class="footer">
        <p>This email was automatically generated from the {sender} contact form.</p>
      </div>
    </div>
  </body>
</html>
"#,
        sender = escape_html(SENDER_NAME),
        fields = fields,
    )
}

/// Empty optional fields are left out of the message like absent ones.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

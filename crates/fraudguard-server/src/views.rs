//! Bare-bones HTML for the browser flow.
//!
//! Just enough markup to carry the forms and a failure line; styling and
//! templating live elsewhere.

fn page(title: &str, body: &str) -> String {
  format!(
    "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{title} · FraudGuard</title></head>\n\
     <body>\n<h1>{title}</h1>\n{body}\n</body></html>\n"
  )
}

fn error_line(error: Option<&str>) -> String {
  error
    .map(|e| format!("<p class=\"error\" role=\"alert\">{}</p>\n", escape(e)))
    .unwrap_or_default()
}

fn credentials_form(action: &str, submit: &str) -> String {
  format!(
    "<form method=\"post\" action=\"{action}\">\n\
     <label>Username <input name=\"username\" autocomplete=\"username\" required></label>\n\
     <label>Password <input name=\"password\" type=\"password\" required></label>\n\
     <button type=\"submit\">{submit}</button>\n</form>"
  )
}

pub fn login_page(error: Option<&str>) -> String {
  page(
    "Login",
    &format!(
      "{}{}\n<p><a href=\"/register\">Create an account</a></p>",
      error_line(error),
      credentials_form("/login", "Log in"),
    ),
  )
}

pub fn register_page(error: Option<&str>) -> String {
  page(
    "Register",
    &format!(
      "{}{}\n<p><a href=\"/login\">Already registered? Log in</a></p>",
      error_line(error),
      credentials_form("/register", "Register"),
    ),
  )
}

pub fn index_page(username: &str) -> String {
  page(
    "FraudGuard",
    &format!(
      "<p>Signed in as <strong>{}</strong>. <a href=\"/logout\">Log out</a></p>\n\
       <p>Submit transactions with <code>POST /analyze</code> and a JSON body \
       <code>{{\"data\": \"...\"}}</code>.</p>",
      escape(username)
    ),
  )
}

/// Minimal HTML escaping for text nodes and attribute values.
pub fn escape(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for c in s.chars() {
    match c {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      c => out.push(c),
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn escape_handles_markup() {
    assert_eq!(escape("<b>\"x\" & 'y'</b>"), "&lt;b&gt;&quot;x&quot; &amp; &#39;y&#39;&lt;/b&gt;");
  }

  #[test]
  fn login_page_shows_error_only_when_given() {
    assert!(!login_page(None).contains("class=\"error\""));
    assert!(login_page(Some("Invalid username or password")).contains("Invalid username or password"));
  }

  #[test]
  fn index_page_escapes_username() {
    let html = index_page("<script>");
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
  }
}

//! Entry HTML document generation.

/// WebSocket path the reload listener connects to.
pub const RELOAD_PATH: &str = "/__neutronium_reload__";

/// Message that tells a connected page to reload.
pub const RELOAD_MESSAGE: &str = "reload";

/// Route the dev server answers favicon requests on.
pub const FAVICON_ROUTE: &str = "/favicon.ico";

/// Element id the app is mounted into.
pub const MOUNT_ID: &str = "app";

/// Inputs for [`render_entry_document`].
#[derive(Debug, Clone)]
pub struct EntryDocument<'a> {
    pub title: &'a str,
    /// Root-absolute `src` of the module script (`/App.js`).
    pub script_src: &'a str,
    pub favicon: bool,
    pub live_reload: bool,
}

/// Render the `index.html` that loads the entry module.
pub fn render_entry_document(doc: &EntryDocument<'_>) -> String {
    let mut head = format!(
        "    <meta charset=\"UTF-8\" />\n    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n    <title>{}</title>\n",
        escape_html(doc.title)
    );
    if doc.favicon {
        head.push_str(&format!("    <link rel=\"icon\" href=\"{FAVICON_ROUTE}\" />\n"));
    }

    let mut body = format!(
        "    <div id=\"{MOUNT_ID}\"></div>\n    <script type=\"module\" src=\"{}\"></script>\n",
        escape_html(doc.script_src)
    );
    if doc.live_reload {
        body.push_str(&reload_listener());
    }

    format!("<!DOCTYPE html>\n<html lang=\"en\">\n  <head>\n{head}  </head>\n  <body>\n{body}  </body>\n</html>\n")
}

fn reload_listener() -> String {
    format!(
        r#"    <script>
      (() => {{
        const socket = new WebSocket(`${{location.protocol === 'https:' ? 'wss' : 'ws'}}://${{location.host}}{RELOAD_PATH}`);
        socket.addEventListener('message', (event) => {{
          if (event.data === '{RELOAD_MESSAGE}') {{
            location.reload();
          }}
        }});
      }})();
    </script>
"#
    )
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

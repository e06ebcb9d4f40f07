//! Operator index page.

use crate::observability::LogLevel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub path: String,
    pub description: String,
}

/// Ordered list of registered pages, built once at construction.
#[derive(Debug, Clone, Default)]
pub struct IndexPage {
    pages: Vec<Page>,
}

impl IndexPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_page(&mut self, path: impl Into<String>, description: impl Into<String>) {
        self.pages.push(Page {
            path: path.into(),
            description: description.into(),
        });
    }

    pub fn render(&self, current: LogLevel) -> String {
        let mut links = String::new();
        for page in &self.pages {
            links.push_str(&format!(
                "\t\t<li><a href=\"{}\">{}</a></li>\n",
                escape(&page.path),
                escape(&page.description)
            ));
        }

        let mut options = String::new();
        for level in LogLevel::ALL {
            let selected = if level == current { " selected" } else { "" };
            options.push_str(&format!(
                "\t\t\t<option value=\"{0}\"{1}>{0}</option>\n",
                level.as_str(),
                selected
            ));
        }

        format!(
            r#"<html>
<head><title>Chat Service Debug</title></head>
<body>
	<h2>Chat Service Debug</h2>
	<ul>
{links}	</ul>

	<h2>Log Level</h2>
	<p>Current: <b id="current-level">{current}</b></p>
	<form onsubmit="putLogLevel(); return false;">
		<select id="log-level-select">
{options}		</select>
		<input type="submit" value="Change">
	</form>

	<script>
		function putLogLevel() {{
			const req = new XMLHttpRequest();
			req.open('PUT', '/log/level', true);
			req.setRequestHeader('Content-Type', 'application/json');
			req.onload = function() {{ window.location.reload(); }};
			req.send(JSON.stringify({{ level: document.getElementById('log-level-select').value }}));
		}};
	</script>
</body>
</html>
"#
        )
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

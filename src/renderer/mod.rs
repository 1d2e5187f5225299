use crate::report::StoredRecord;
use crate::utils::format::round2;

/// Trait for converting result types into HTML fragments or pages.
pub trait ToHtml {
    /// Convert the object to HTML string
    fn to_html(&self) -> String;
}

/// Home page listing the most recent stored results.
pub struct HomePage<'a> {
    pub latest_results: &'a [StoredRecord],
}

impl ToHtml for HomePage<'_> {
    fn to_html(&self) -> String {
        let rows = if self.latest_results.is_empty() {
            r#"<tr><td colspan="6" class="empty">No results yet</td></tr>"#.to_string()
        } else {
            self.latest_results
                .iter()
                .map(ToHtml::to_html)
                .collect::<Vec<_>>()
                .join("\n")
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="uk">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Speed Test</title>
    <style>
        body {{
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            line-height: 1.6;
            margin: 0;
            padding: 20px;
            background-color: #f5f5f5;
        }}
        .container {{
            max-width: 1000px;
            margin: 0 auto;
            background-color: white;
            border-radius: 8px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
            padding: 30px;
        }}
        .header {{
            text-align: center;
            border-bottom: 3px solid #007acc;
            padding-bottom: 20px;
            margin-bottom: 30px;
        }}
        .header h1 {{
            color: #007acc;
            margin: 0;
        }}
        button {{
            background-color: #007acc;
            color: white;
            border: none;
            border-radius: 6px;
            padding: 10px 24px;
            font-size: 1em;
            cursor: pointer;
        }}
        button:disabled {{
            background-color: #6c757d;
        }}
        #result {{
            margin: 20px 0;
            font-weight: 500;
        }}
        .fast {{ color: #28a745; }}
        .slow {{ color: #dc3545; }}
        .empty {{ text-align: center; color: #6c757d; }}
        table {{
            width: 100%;
            border-collapse: collapse;
        }}
        th, td {{
            padding: 8px 12px;
            border-bottom: 1px solid #e9ecef;
            text-align: left;
        }}
        th {{
            color: #495057;
        }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>Internet Speed Test</h1>
        </div>

        <button id="check">Check speed</button>
        <div id="result"></div>

        <h2>Latest results</h2>
        <table>
            <thead>
                <tr>
                    <th>Time</th>
                    <th>Download (Mbps)</th>
                    <th>Upload (Mbps)</th>
                    <th>Ping (ms)</th>
                    <th>Server</th>
                    <th>Country</th>
                </tr>
            </thead>
            <tbody>
{}
            </tbody>
        </table>
        <p><a href="/export/json">Export JSON</a> | <a href="/export/csv">Export CSV</a></p>
    </div>
    <script>
        const button = document.getElementById('check');
        const result = document.getElementById('result');
        button.addEventListener('click', async () => {{
            button.disabled = true;
            result.textContent = 'Running speed test...';
            result.className = '';
            try {{
                const response = await fetch('/check-speed');
                const data = await response.json();
                if (data.success) {{
                    result.textContent = `${{data.summary}} ↓ ${{data.download_speed}} Mbps, ↑ ${{data.upload_speed}} Mbps, ${{data.ping}} ms (${{data.server_location}})`;
                    result.className = data.is_fast ? 'fast' : 'slow';
                }} else {{
                    result.textContent = data.error;
                    result.className = 'slow';
                }}
            }} catch (e) {{
                result.textContent = e.toString();
                result.className = 'slow';
            }} finally {{
                button.disabled = false;
            }}
        }});
    </script>
</body>
</html>"#,
            rows
        )
    }
}

impl ToHtml for StoredRecord {
    fn to_html(&self) -> String {
        format!(
            r#"                <tr>
                    <td>{}</td>
                    <td>{}</td>
                    <td>{}</td>
                    <td>{}</td>
                    <td>{}</td>
                    <td>{}</td>
                </tr>"#,
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            round2(self.download_speed),
            round2(self.upload_speed),
            round2(self.ping),
            escape_html(&self.server_location),
            escape_html(&self.server_country)
        )
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(server_location: &str) -> StoredRecord {
        StoredRecord {
            id: 1,
            timestamp: Utc.with_ymd_and_hms(2025, 6, 1, 12, 30, 0).unwrap(),
            download_speed: 123.456,
            upload_speed: 45.0,
            ping: 9.999,
            server_name: "Server1".to_string(),
            server_location: server_location.to_string(),
            server_country: "Country1".to_string(),
        }
    }

    #[test]
    fn test_home_page_lists_results() {
        let records = [record("Server1, Country1")];
        let html = HomePage {
            latest_results: &records,
        }
        .to_html();

        assert!(html.contains("<td>2025-06-01 12:30:00</td>"));
        assert!(html.contains("<td>123.46</td>"));
        assert!(html.contains("<td>10</td>"));
        assert!(html.contains("Server1, Country1"));
        assert!(!html.contains("No results yet"));
    }

    #[test]
    fn test_home_page_without_results() {
        let html = HomePage { latest_results: &[] }.to_html();
        assert!(html.contains("No results yet"));
    }

    #[test]
    fn test_record_fields_are_escaped() {
        let html = record("<script>alert(1)</script>").to_html();
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }
}

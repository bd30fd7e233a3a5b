pub const DAILY_REPORT_TEMPLATE: &str = r#"📅 *Daily Maintenance Report* - {{ date }}

📊 *Summary:*
Total Issues Processed: {{ total }}

📂 *By Category:*
{% for row in categories %}• {{ row.glyph }} {{ row.name }}: {{ row.count }}
{% endfor %}
🚨 *By Priority:*
{% for row in priorities %}• {{ row.glyph }} {{ row.name }}: {{ row.count }}
{% endfor %}
📋 *Top Issues:*
{% for issue in top_issues %}{{ loop.index }}. [{{ issue.category }}] {{ issue.priority }}: {{ issue.subject }}...
{% endfor %}"#;

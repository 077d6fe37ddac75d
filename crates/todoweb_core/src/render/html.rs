use crate::model::{Task, TaskStatus};
use crate::notify::NoticeLevel;
use crate::render::{EMPTY_STATE, ListView, Page, Row, format_created};
use time::UtcOffset;

/// Escapes text for use in element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#039;")
}

/// HTML fragment for a page. Row actions reference the row number and task
/// id, never a serialized copy of the record.
pub fn to_html(page: &Page) -> String {
    let mut html = String::new();

    html.push_str("<div class=\"notifications\">\n");
    for banner in &page.banners {
        let class = match banner.level {
            NoticeLevel::Error => "error-message",
            NoticeLevel::Success => "success-message",
        };
        html.push_str(&format!(
            "  <div class=\"{class}\">{}</div>\n",
            escape_html(&banner.message)
        ));
    }
    html.push_str("</div>\n");

    if let Some(list) = page.list.as_ref() {
        push_list(&mut html, list);
    }

    html
}

/// HTML fragment for a single record, as shown by the detail view.
pub fn task_to_html(task: &Task, offset: UtcOffset) -> String {
    let status = task.status();
    let completed_class = if status == TaskStatus::Completed {
        " completed"
    } else {
        ""
    };

    let mut html = format!(
        "<div class=\"todo-item{completed_class}\" data-id=\"{}\">\n",
        escape_html(&task.id)
    );
    html.push_str(&format!(
        "  <div class=\"todo-header\"><div class=\"todo-title\">{}</div><span class=\"todo-status {}\">{}</span></div>\n",
        escape_html(&task.title),
        status.css_class(),
        status.label()
    ));
    if let Some(description) = task.description_text() {
        html.push_str(&format!(
            "  <div class=\"todo-description\">{}</div>\n",
            escape_html(description)
        ));
    }
    html.push_str(&format!(
        "  <div class=\"todo-meta\">Created: {}</div>\n",
        escape_html(&format_created(&task.created_at, offset))
    ));
    if let Some(updated) = task.updated_at.as_deref() {
        html.push_str(&format!(
            "  <div class=\"todo-meta\">Updated: {}</div>\n",
            escape_html(&format_created(updated, offset))
        ));
    }
    html.push_str("</div>\n");
    html
}

fn push_list(html: &mut String, list: &ListView) {
    html.push_str(&format!(
        "<div class=\"stats\"><span id=\"todoCount\">{}</span><span id=\"completedCount\">{}</span></div>\n",
        list.counts.total_label(),
        list.counts.completed_label()
    ));

    if list.is_empty() {
        html.push_str(&format!(
            "<div id=\"emptyState\" class=\"empty-state\">{}</div>\n",
            escape_html(EMPTY_STATE)
        ));
        return;
    }

    html.push_str("<div id=\"todosList\">\n");
    for row in &list.rows {
        push_row(html, row);
    }
    html.push_str("</div>\n");
}

fn push_row(html: &mut String, row: &Row) {
    let completed_class = if row.status == TaskStatus::Completed {
        " completed"
    } else {
        ""
    };
    let id = escape_html(&row.id);

    html.push_str(&format!(
        "  <div class=\"todo-item{completed_class}\" data-row=\"{}\" data-id=\"{id}\">\n",
        row.number
    ));
    html.push_str(&format!(
        "    <div class=\"todo-header\"><div class=\"todo-title\">{}</div><span class=\"todo-status {}\">{}</span></div>\n",
        escape_html(&row.title),
        row.status.css_class(),
        row.status.label()
    ));
    if let Some(description) = row.description.as_deref() {
        html.push_str(&format!(
            "    <div class=\"todo-description\">{}</div>\n",
            escape_html(description)
        ));
    }
    html.push_str(&format!(
        "    <div class=\"todo-meta\">Created: {}</div>\n",
        escape_html(&row.created)
    ));
    html.push_str(&format!(
        "    <div class=\"todo-actions\"><button class=\"btn btn-edit\" data-action=\"edit\" data-row=\"{0}\">Edit</button><button class=\"btn btn-danger\" data-action=\"delete\" data-row=\"{0}\">Delete</button></div>\n",
        row.number
    ));
    html.push_str("  </div>\n");
}

#[cfg(test)]
mod tests {
    use super::{escape_html, task_to_html, to_html};
    use crate::model::Task;
    use crate::notify::Notice;
    use crate::render::{EMPTY_STATE, render_page};
    use crate::view_state::ViewState;
    use time::UtcOffset;

    fn view_with(title: &str, description: Option<&str>) -> ViewState {
        let mut view = ViewState::new();
        view.replace(vec![Task {
            id: "task-1".to_string(),
            title: title.to_string(),
            description: description.map(str::to_string),
            completed: false,
            created_at: "2025-12-20T00:00:00Z".to_string(),
            updated_at: None,
        }]);
        view
    }

    #[test]
    fn escape_html_neutralizes_markup() {
        let malicious_inputs = [
            r#"<script>alert('XSS')</script>"#,
            r#""><script>alert('XSS')</script>"#,
            r#"'/><script>alert('XSS')</script>"#,
            "Test & <script>",
        ];

        for input in malicious_inputs {
            let escaped = escape_html(input);
            assert!(!escaped.contains("<script>"));
            assert!(!escaped.contains("</script>"));
            assert!(escaped.contains("&lt;"));
        }
    }

    #[test]
    fn script_in_title_and_description_renders_as_text() {
        let view = view_with("<script>alert(1)</script>", Some("<img src=x onerror=alert(2)>"));
        let html = to_html(&render_page(Some(&view), Vec::new(), UtcOffset::UTC));

        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("&lt;img src=x onerror=alert(2)&gt;"));
    }

    #[test]
    fn rows_carry_row_number_instead_of_record() {
        let view = view_with("demo", None);
        let html = to_html(&render_page(Some(&view), Vec::new(), UtcOffset::UTC));

        assert!(html.contains("data-row=\"1\" data-id=\"task-1\""));
        assert!(html.contains("data-action=\"delete\" data-row=\"1\""));
        assert!(!html.contains("todo-description"));
        assert!(html.contains("status-pending"));
    }

    #[test]
    fn empty_list_shows_empty_state_and_counts() {
        let html = to_html(&render_page(Some(&ViewState::new()), Vec::new(), UtcOffset::UTC));

        assert!(html.contains(EMPTY_STATE));
        assert!(html.contains(">0 todos<"));
        assert!(html.contains(">0 completed<"));
        assert!(!html.contains("todosList"));
    }

    #[test]
    fn banners_are_escaped_and_list_omitted_before_first_load() {
        let page = render_page(None, vec![Notice::error("<b>boom</b>")], UtcOffset::UTC);
        let html = to_html(&page);

        assert!(html.contains("<div class=\"error-message\">&lt;b&gt;boom&lt;/b&gt;</div>"));
        assert!(!html.contains("stats"));
    }

    #[test]
    fn html_rendering_is_idempotent() {
        let view = view_with("demo", Some("notes"));
        let page = render_page(Some(&view), vec![Notice::success("saved")], UtcOffset::UTC);
        assert_eq!(to_html(&page), to_html(&page));
    }

    #[test]
    fn single_record_fragment_escapes_fields() {
        let task = Task {
            id: "a\"b".to_string(),
            title: "<script>alert(1)</script>".to_string(),
            description: Some("milk & eggs".to_string()),
            completed: true,
            created_at: "2025-12-20T00:00:00Z".to_string(),
            updated_at: None,
        };
        let html = task_to_html(&task, UtcOffset::UTC);

        assert!(html.starts_with("<div class=\"todo-item completed\" data-id=\"a&quot;b\">"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("<div class=\"todo-description\">milk &amp; eggs</div>"));
        assert!(html.contains("Created: 12/20/2025"));
        assert!(!html.contains("Updated:"));
    }
}

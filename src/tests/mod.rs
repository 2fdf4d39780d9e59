use crate::output::{self, DisplayRow, RenderError, ReportTemplate};
use crate::records::{self, CrawlRecord, FailureKind, LoadError, RedirectHop};

fn doc(url: &str, title: &str) -> String {
    format!(
        r#"{{"result":{{"data":{{"response":{{"url":{},"title":{},"status":{{"code":200}}}}}}}}}}"#,
        serde_json::to_string(url).unwrap(),
        serde_json::to_string(title).unwrap()
    )
}

fn read(input: &str) -> records::LoadReport {
    records::read_records(input.as_bytes()).unwrap()
}

fn hop(location: &str, connection: &str) -> RedirectHop {
    RedirectHop {
        location: location.to_string(),
        connection: connection.to_string(),
        ..Default::default()
    }
}

#[test]
fn format_redirects_keeps_chain_order_exactly() {
    let text = output::format_redirects(&[hop("a", "b"), hop("c", "d")]);
    assert_eq!(text, "Location: a\nConnection: b\n\nLocation: c\nConnection: d\n\n");
}

#[test]
fn format_redirects_empty_chain_is_empty() {
    assert_eq!(output::format_redirects(&[]), "");
}

#[test]
fn display_row_copies_every_field() {
    let record = CrawlRecord {
        response_url: "https://a.tld/final".to_string(),
        title: "Final".to_string(),
        redirect_chain: vec![hop("https://a.tld/final", "close")],
        screenshot_ref: "shots/a.png".to_string(),
        path: "/store/a".to_string(),
        status_code: 200,
    };
    let row = output::to_display_row(&record);
    assert_eq!(
        row,
        DisplayRow {
            url: "https://a.tld/final".to_string(),
            title: "Final".to_string(),
            redirects_text: "Location: https://a.tld/final\nConnection: close\n\n".to_string(),
            screenshot: "shots/a.png".to_string(),
            path: "/store/a".to_string(),
            status_code: 200,
        }
    );
    assert_eq!(output::to_display_row(&record), row);
}

#[test]
fn decodes_back_to_back_documents_in_order() {
    let input = format!("{}{}\n{}", doc("u1", "t1"), doc("u2", "t2"), doc("u3", "t3"));
    let report = read(&input);
    let urls: Vec<_> = report.records.iter().map(|r| r.response_url.as_str()).collect();
    assert_eq!(urls, vec!["u1", "u2", "u3"]);
    assert!(report.failures.is_empty());
}

#[test]
fn decodes_full_document_shape() {
    let input = r#"{"result":{"data":{"response":{
        "url":"https://a.tld/",
        "title":"Home",
        "redirects":[
            {"headers":{"location":"https://a.tld/","connection":"keep-alive"},"status":{"code":301},"redirect_uri":"http://a.tld/"}
        ],
        "rendered":{"screenshot":"https://cdn.tld/a.png"},
        "path":"/store/1",
        "status":{"code":200}
    }}}}"#;
    let report = read(input);
    assert_eq!(
        report.records,
        vec![CrawlRecord {
            response_url: "https://a.tld/".to_string(),
            title: "Home".to_string(),
            redirect_chain: vec![RedirectHop {
                location: "https://a.tld/".to_string(),
                connection: "keep-alive".to_string(),
                status_code: 301,
                redirect_uri: "http://a.tld/".to_string(),
            }],
            screenshot_ref: "https://cdn.tld/a.png".to_string(),
            path: "/store/1".to_string(),
            status_code: 200,
        }]
    );
}

#[test]
fn empty_input_yields_no_records() {
    assert!(read("").records.is_empty());
    let report = read("  \n\n ");
    assert!(report.records.is_empty());
    assert!(report.failures.is_empty());
}

#[test]
fn malformed_document_does_not_block_later_ones() {
    let input = format!(
        "{}{{\"result\": }}{}{}",
        doc("u1", "t1"),
        doc("u2", "t2"),
        doc("u3", "t3")
    );
    let report = read(&input);
    let urls: Vec<_> = report.records.iter().map(|r| r.response_url.as_str()).collect();
    assert_eq!(urls, vec!["u1", "u2", "u3"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert!(matches!(report.failures[0].kind, FailureKind::Malformed(_)));
}

#[test]
fn wrong_types_and_non_object_values_are_skipped() {
    let input = format!(
        r#"{{"result":{{"data":{{"response":{{"title":5}}}}}}}} 42 [] "s" {}"#,
        doc("ok", "t")
    );
    let report = read(&input);
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].response_url, "ok");
    assert_eq!(report.failures.len(), 4);
    assert_eq!(report.failures[0].index, 0);
}

#[test]
fn top_level_null_is_a_zero_valued_record() {
    let input = format!("null {}", doc("u1", "t1"));
    let report = read(&input);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0], CrawlRecord::default());
    assert_eq!(report.records[1].response_url, "u1");
    assert!(report.failures.is_empty());
}

#[test]
fn repeated_key_keeps_the_last_value() {
    let input = format!(
        r#"{{"result":{{"data":{{"response":{{"url":"a","url":"b","title":"t"}}}}}}}}{}"#,
        doc("u2", "t2")
    );
    let report = read(&input);
    let urls: Vec<_> = report.records.iter().map(|r| r.response_url.as_str()).collect();
    assert_eq!(urls, vec!["b", "u2"]);
    assert!(report.failures.is_empty());
}

#[test]
fn unclosed_document_does_not_swallow_later_ones() {
    let input = format!(
        "{}{{\"result\":{{\"data\":{}{}",
        doc("u1", "t1"),
        doc("u2", "t2"),
        doc("u3", "t3")
    );
    let report = read(&input);
    let urls: Vec<_> = report.records.iter().map(|r| r.response_url.as_str()).collect();
    assert_eq!(urls, vec!["u1", "u2", "u3"]);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].index, 1);
    assert_eq!(report.failures[0].kind, FailureKind::Truncated);
}

#[test]
fn documents_absorbed_by_a_malformed_frame_are_recovered() {
    // The closers balance the unclosed array, so the frame is complete but
    // does not decode.
    let input = format!(
        "{{\"result\":{{\"data\":[{}}}}}}}{}",
        doc("u1", "t1"),
        doc("u2", "t2")
    );
    let report = read(&input);
    let urls: Vec<_> = report.records.iter().map(|r| r.response_url.as_str()).collect();
    assert_eq!(urls, vec!["u1", "u2"]);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(report.failures[0].kind, FailureKind::Malformed(_)));
}

#[test]
fn truncated_trailing_document_keeps_earlier_records() {
    let input = format!("{}{}{{\"result\":{{\"data\"", doc("u1", "t1"), doc("u2", "t2"));
    let report = read(&input);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].kind, FailureKind::Truncated);
    assert_eq!(report.failures[0].index, 2);
}

#[test]
fn missing_and_null_fields_decode_to_zero_values() {
    let report = read(
        r#"{"result":{"data":{"response":{"url":"u","title":null,"redirects":null,"status":null}}}} {}"#,
    );
    assert_eq!(report.records.len(), 2);
    let first = &report.records[0];
    assert_eq!(first.response_url, "u");
    assert_eq!(first.title, "");
    assert!(first.redirect_chain.is_empty());
    assert_eq!(first.status_code, 0);
    assert_eq!(report.records[1], CrawlRecord::default());
    assert_eq!(output::to_display_row(first).redirects_text, "");
}

#[test]
fn unknown_fields_are_ignored() {
    let report = read(
        r#"{"id":"x","result":{"extra":[1,2],"data":{"response":{"url":"u","headers":{"server":"nginx"}}}}}"#,
    );
    assert_eq!(report.records.len(), 1);
    assert_eq!(report.records[0].response_url, "u");
}

#[test]
fn braces_and_quotes_in_strings_do_not_split_documents() {
    let input = format!("{}{}", doc("u1", "}{ \"][\\"), doc("u2", "t2"));
    let report = read(&input);
    assert_eq!(report.records.len(), 2);
    assert_eq!(report.records[0].title, "}{ \"][\\");
}

#[test]
fn load_records_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = records::load_records(&dir.path().join("data.json")).unwrap_err();
    assert!(matches!(err, LoadError::Open { .. }));
}

#[test]
fn load_records_reads_file_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, format!("{}{}", doc("u1", "t1"), doc("u2", "t2"))).unwrap();
    let report = records::load_records(&path).unwrap();
    assert_eq!(report.records.len(), 2);
}

#[test]
fn script_in_title_is_rendered_as_text() {
    let report = read(&doc("https://a.tld/", "</textarea><script>alert(1)</script>"));
    let rows = output::build_rows(&report.records);
    let html = output::report::render_html(&rows, &ReportTemplate::default());
    assert!(!html.contains("<script>alert(1)</script>"));
    assert!(!html.contains("</textarea><script>"));
    assert!(html.contains("&lt;/textarea&gt;&lt;script&gt;alert(1)&lt;/script&gt;"));
}

#[test]
fn javascript_urls_never_reach_attributes() {
    let row = DisplayRow {
        url: "javascript:alert(1)".to_string(),
        title: String::new(),
        redirects_text: String::new(),
        screenshot: "\" onerror=\"alert(1)".to_string(),
        path: String::new(),
        status_code: 0,
    };
    let html = output::report::render_html(&[row], &ReportTemplate::default());
    assert!(!html.contains("href=\"javascript:"));
    assert!(html.contains("href=\"about:invalid#blocked\""));
    assert!(html.contains("src=\"&quot; onerror=&quot;alert(1)\""));
}

#[test]
fn empty_rows_still_produce_a_complete_table() {
    let html = output::report::render_html(&[], &ReportTemplate::default());
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<th>Response URL</th>"));
    assert!(html.contains("<th>Status Code</th>"));
    assert!(html.contains("<tbody>\n    </tbody>"));
    assert!(!html.contains("{{rows}}"));
    assert!(html.trim_end().ends_with("</html>"));
}

#[test]
fn custom_template_receives_rows_in_order() {
    let template = ReportTemplate::new("<table>{{rows}}</table>").unwrap();
    let report = read(&format!("{}{}", doc("first", "1"), doc("second", "2")));
    let html = output::report::render_html(&output::build_rows(&report.records), &template);
    assert!(html.starts_with("<table>      <tr>"));
    assert!(html.ends_with("      </tr>\n</table>"));
    assert!(html.find(">first<").unwrap() < html.find(">second<").unwrap());
    assert_eq!(html.matches("<tr>").count(), 2);
}

#[test]
fn render_writes_and_truncates_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("output.html");
    std::fs::write(&path, "x".repeat(100_000)).unwrap();

    let summary = output::render(&[], &ReportTemplate::default(), &path).unwrap();
    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(summary.rows, 0);
    assert_eq!(summary.bytes, written.len());
    assert!(!written.contains("xxxx"));
}

#[test]
fn render_fails_when_output_cannot_be_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("no-such-dir").join("output.html");
    let err = output::render(&[], &ReportTemplate::default(), &path).unwrap_err();
    assert!(matches!(err, RenderError::Create { .. }));
}

/// `html` is already escaped by the server.
pub fn format_plain_text(html: &str) -> String {
    html.trim_end_matches(['\n', '\r'])
        .replace("\r\n", "\n")
        .replace('\n', "<br>")
}

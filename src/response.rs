//! CGI-style responses for running behind a web server.

use std::io::{self, Write};

use crate::clips::request::Artifact;

/// Headers plus body offering `artifact` as a download.
pub fn write_attachment<W: Write>(out: &mut W, artifact: &Artifact) -> io::Result<()> {
    write!(
        out,
        "Content-Type:{}; filename=\"{name}\"\r\nContent-Disposition: attachment; filename=\"{name}\"\r\n\r\n",
        artifact.content_type,
        name = artifact.file_name,
    )?;
    artifact.body.write_to(out)?;
    out.flush()
}

/// Small HTML page explaining why the request failed.
pub fn write_html_error<W: Write>(out: &mut W, message: &str) -> io::Result<()> {
    write!(
        out,
        "Content-Type:text/html\r\n\r\n<html>\n<body>\n<h1>Error:</h1>\n<p>\n{}\n</p>\n</body>\n</html>\n",
        escape_html(message)
    )?;
    out.flush()
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clips::request::ArtifactBody;

    #[test]
    fn attachment_has_download_headers() {
        let artifact = Artifact {
            file_name: "bookmarks.m3u",
            content_type: "text/enriched",
            body: ArtifactBody::Bytes(b"#EXTM3U\n".to_vec()),
            clip_count: 1,
        };
        let mut out = Vec::new();
        write_attachment(&mut out, &artifact).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Content-Type:text/enriched; filename=\"bookmarks.m3u\"\r\n"));
        assert!(
            text.contains("Content-Disposition: attachment; filename=\"bookmarks.m3u\"\r\n\r\n")
        );
        assert!(text.ends_with("\r\n\r\n#EXTM3U\n"));
    }

    #[test]
    fn error_page_escapes_message() {
        let mut out = Vec::new();
        write_html_error(&mut out, "Invalid time format '<b>'").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Content-Type:text/html\r\n\r\n"));
        assert!(text.contains("<p>\nInvalid time format '&lt;b&gt;'\n</p>"));
    }
}

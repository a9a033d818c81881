//! Standalone HTML export for signed documents.
//!
//! Wraps a stored record in a minimal self-contained HTML page so the
//! bitmap and content can be downloaded as one file or sent to print.

use serde_json::Value;

use crate::record::SignedDocument;

/// Render a signed document as a self-contained HTML page.
///
/// Signature images are inlined as data URLs; a raw-label signature is
/// rendered as text.
pub fn standalone_html(doc: &SignedDocument) -> String {
    let mut signatures = String::new();
    match serde_json::from_str::<Value>(&doc.signature) {
        Ok(Value::Object(signers)) => {
            for (name, entry) in &signers {
                if let Some(image) = entry.get("image").and_then(Value::as_str) {
                    let src = if image.starts_with("data:") {
                        image.to_string()
                    } else {
                        format!("data:image/jpeg;base64,{image}")
                    };
                    signatures.push_str(&format!(
                        "<figure><img src=\"{src}\" alt=\"Signature\"><figcaption>{}</figcaption></figure>\n",
                        escape_html(name)
                    ));
                }
            }
        }
        _ => {
            signatures.push_str(&format!("<p>{}</p>\n", escape_html(&doc.signature)));
        }
    }

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>body{{font-family:serif;margin:2em}}pre{{white-space:pre-wrap}}\
         figure{{margin:1em 0}}</style>\n</head>\n<body>\n\
         <h1>{title}</h1>\n<pre>{content}</pre>\n\
         <section>\n{signatures}</section>\n\
         <footer>Signed by {signed_by} on {signing_date}</footer>\n\
         </body>\n</html>\n",
        title = escape_html(&doc.title),
        content = escape_html(&doc.content),
        signed_by = escape_html(&doc.signed_by),
        signing_date = escape_html(&doc.signing_date),
    )
}

/// Minimal escaping for text interpolated into the page.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

use crate::models::{errors::AppError, uploaded_file::UploadedFile};
use crate::AppState;
use axum::{extract::State, response::Html};
use html_escape::{encode_double_quoted_attribute, encode_text};

const CELL_STYLE: &str = "padding: 12px; border: 1px solid #ddd;";
const HEADER_STYLE: &str = "padding: 12px; text-align: left; border: 1px solid #ddd;";

/// List uploaded files, newest first
pub async fn list_files(State(app_state): State<AppState>) -> Result<Html<String>, AppError> {
    let files = app_state.storage.list_files().await?;
    tracing::debug!("Listing {} uploaded files", files.len());
    Ok(Html(render_listing(&files)))
}

pub fn render_listing(files: &[UploadedFile]) -> String {
    let mut page = String::from(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n    <meta charset=\"UTF-8\">\n    \
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n    \
         <title>Uploaded Files</title>\n</head>\n<body>\n<h2>Uploaded Files</h2>\n",
    );

    if files.is_empty() {
        page.push_str("<p>No files uploaded yet.</p>\n");
    } else {
        page.push_str("<table style=\"width:100%; border-collapse: collapse;\">\n");
        page.push_str(&format!(
            "    <tr style=\"background-color: #f2f2f2;\">\n        \
             <th style=\"{h}\">File Name</th>\n        \
             <th style=\"{h}\">Upload Time</th>\n        \
             <th style=\"{h}\">Action</th>\n    </tr>\n",
            h = HEADER_STYLE
        ));

        for file in files {
            let href = format!("/download/{}", urlencoding::encode(&file.name));
            page.push_str(&format!(
                "    <tr>\n        <td style=\"{c}\">{name}</td>\n        \
                 <td style=\"{c}\">{time}</td>\n        \
                 <td style=\"{c}\"><a href=\"{href}\">Download</a></td>\n    </tr>\n",
                c = CELL_STYLE,
                name = encode_text(&file.name),
                time = file.upload_time(),
                href = encode_double_quoted_attribute(&href),
            ));
        }

        page.push_str("</table>\n");
    }

    page.push_str("<p><a href=\"/\">Back to Upload</a></p>\n</body>\n</html>\n");
    page
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    #[test]
    fn test_empty_listing() {
        let page = render_listing(&[]);
        assert!(page.contains("No files uploaded yet."));
        assert!(!page.contains("<table"));
    }

    #[test]
    fn test_rows_escape_names_and_encode_links() {
        let files = vec![UploadedFile::new(
            "<b>my report</b>.pdf",
            SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000),
        )];
        let page = render_listing(&files);

        assert!(page.contains("&lt;b&gt;my report&lt;/b&gt;.pdf"));
        assert!(page.contains("/download/%3Cb%3Emy%20report%3C%2Fb%3E.pdf"));
        assert!(page.contains(&files[0].upload_time()));
    }
}

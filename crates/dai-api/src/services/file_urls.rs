//! Storage URI to public URL mapping.

use dai_core::FileUrlResolver;

/// Resolves `public://` and `private://` URIs against the site's file paths.
///
/// `public://reports/q1.pdf` becomes
/// `{site_base_url}{public_files_path}/reports/q1.pdf`. Path segments are
/// percent-encoded. Any other scheme, or an unset site base, is unresolvable.
#[derive(Debug, Clone)]
pub struct StreamWrapperUrlResolver {
    site_base_url: String,
    public_files_path: String,
    private_files_path: String,
}

impl StreamWrapperUrlResolver {
    pub fn new(site_base_url: &str, public_files_path: &str, private_files_path: &str) -> Self {
        Self {
            site_base_url: site_base_url.trim_end_matches('/').to_string(),
            public_files_path: normalize_path(public_files_path),
            private_files_path: normalize_path(private_files_path),
        }
    }
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

fn encode_segments(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| urlencoding::encode(s).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

impl FileUrlResolver for StreamWrapperUrlResolver {
    fn resolve(&self, uri: &str) -> Option<String> {
        if self.site_base_url.is_empty() {
            return None;
        }
        let (scheme, target) = uri.trim().split_once("://")?;
        let base_path = match scheme.to_ascii_lowercase().as_str() {
            "public" => &self.public_files_path,
            "private" => &self.private_files_path,
            _ => return None,
        };
        let target = encode_segments(target);
        if target.is_empty() {
            return None;
        }
        Some(format!("{}{}/{}", self.site_base_url, base_path, target))
    }
}

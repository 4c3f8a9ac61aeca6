use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::{GalleryError, Result};

/// Produces the raw caption text for a file.
///
/// Implementations may read from disk; callers go through
/// [`CaptionCache`](super::CaptionCache) to avoid repeating the I/O.
pub trait CaptionSource: Send + Sync {
    fn load_caption(&self, path: &Path) -> Result<Option<String>>;
}

/// Reads captions from a text file next to the image, `photo.jpg` → `photo.txt`.
#[derive(Debug, Clone)]
pub struct SidecarCaptionSource {
    extension: String,
}

impl SidecarCaptionSource {
    pub fn new() -> Self {
        Self::with_extension("txt")
    }

    pub fn with_extension(extension: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
        }
    }

    pub fn sidecar_path(&self, path: &Path) -> PathBuf {
        path.with_extension(&self.extension)
    }
}

impl Default for SidecarCaptionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptionSource for SidecarCaptionSource {
    fn load_caption(&self, path: &Path) -> Result<Option<String>> {
        let sidecar = self.sidecar_path(path);
        match std::fs::read_to_string(&sidecar) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(GalleryError::CaptionIo {
                path: sidecar,
                source,
            }),
        }
    }
}

/// Drops unwanted tags from comma-separated tag captions.
/// Matching ignores case and surrounding whitespace.
#[derive(Debug, Clone, Default)]
pub struct TagFilter {
    excluded: HashSet<String>,
}

impl TagFilter {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded: excluded
                .into_iter()
                .map(|tag| tag.as_ref().trim().to_lowercase())
                .filter(|tag| !tag.is_empty())
                .collect(),
        }
    }

    pub fn apply(&self, caption: &str) -> String {
        caption
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty() && !self.excluded.contains(&tag.to_lowercase()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// A rewrite applied to a caption after filtering.
pub trait CaptionRule: Send + Sync {
    fn apply(&self, caption: String) -> String;
}

/// Replaces every occurrence of a literal string.
#[derive(Debug, Clone)]
pub struct ReplaceRule {
    pub from: String,
    pub to: String,
}

impl ReplaceRule {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl CaptionRule for ReplaceRule {
    fn apply(&self, caption: String) -> String {
        if self.from.is_empty() {
            return caption;
        }
        caption.replace(&self.from, &self.to)
    }
}

/// Source, optional tag filter, then rules in order.
pub struct CaptionPipeline {
    source: Box<dyn CaptionSource>,
    filter: Option<TagFilter>,
    rules: Vec<Box<dyn CaptionRule>>,
}

impl CaptionPipeline {
    pub fn new(source: impl CaptionSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            filter: None,
            rules: Vec::new(),
        }
    }

    pub fn with_filter(mut self, filter: TagFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_rule(mut self, rule: impl CaptionRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn load(&self, path: &Path) -> Result<Option<String>> {
        let Some(raw) = self.source.load_caption(path)? else {
            return Ok(None);
        };
        let filtered = match &self.filter {
            Some(filter) => filter.apply(&raw),
            None => raw,
        };
        let processed = self
            .rules
            .iter()
            .fold(filtered, |caption, rule| rule.apply(caption));
        Ok(Some(processed))
    }
}

/// Source for galleries without captions.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCaptions;

impl CaptionSource for NoCaptions {
    fn load_caption(&self, _path: &Path) -> Result<Option<String>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_sidecar_reads_text_file() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("cat.jpg");
        fs::write(dir.path().join("cat.txt"), "a cat, sleeping").unwrap();

        let source = SidecarCaptionSource::new();
        let caption = source.load_caption(&image).unwrap();
        assert_eq!(caption.as_deref(), Some("a cat, sleeping"));
    }

    #[test]
    fn test_sidecar_missing_is_none() {
        let dir = tempdir().unwrap();
        let source = SidecarCaptionSource::new();
        assert!(source
            .load_caption(&dir.path().join("dog.png"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_sidecar_unreadable_is_error() {
        let dir = tempdir().unwrap();
        // A directory where the sidecar should be cannot be read as text.
        fs::create_dir(dir.path().join("odd.txt")).unwrap();
        let source = SidecarCaptionSource::new();
        assert!(matches!(
            source.load_caption(&dir.path().join("odd.jpg")),
            Err(GalleryError::CaptionIo { .. })
        ));
    }

    #[test]
    fn test_tag_filter() {
        let filter = TagFilter::new(["Blurry", " watermark "]);
        assert_eq!(
            filter.apply("cat, blurry,  outdoors ,WATERMARK,,"),
            "cat, outdoors"
        );
    }

    #[test]
    fn test_pipeline_filters_then_rewrites() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("a.jpg");
        fs::write(dir.path().join("a.txt"), "1girl, blurry, smile").unwrap();

        let pipeline = CaptionPipeline::new(SidecarCaptionSource::new())
            .with_filter(TagFilter::new(["blurry"]))
            .with_rule(ReplaceRule::new("1girl", "girl"));
        assert_eq!(
            pipeline.load(&image).unwrap().as_deref(),
            Some("girl, smile")
        );
        assert!(pipeline.load(&dir.path().join("b.jpg")).unwrap().is_none());
    }

    #[test]
    fn test_no_captions() {
        let pipeline = CaptionPipeline::new(NoCaptions);
        assert!(pipeline.load(Path::new("/x.jpg")).unwrap().is_none());
    }
}

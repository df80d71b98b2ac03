//! Plain-text book processor: one pipeline run per file

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::core::cancel::CancellationSignal;
use crate::core::client::{BackendFactory, HttpBackendFactory};
use crate::core::errors::{Result, TranslationError};
use crate::core::models::TranslationReport;
use crate::core::pacing::ProgressCallback;
use crate::core::translator::AsyncTranslator;

/// Translates `.txt` books through an [`AsyncTranslator`]
#[derive(Debug, Clone)]
pub struct BookProcessor<F = HttpBackendFactory> {
    translator: AsyncTranslator<F>,
}

impl BookProcessor<HttpBackendFactory> {
    /// Create from environment configuration
    pub fn from_env() -> Result<Self> {
        let translator = AsyncTranslator::from_env()?;
        Ok(Self::new(translator))
    }
}

impl<F: BackendFactory> BookProcessor<F> {
    /// Create a new book processor
    pub fn new(translator: AsyncTranslator<F>) -> Self {
        Self { translator }
    }

    pub fn translator(&self) -> &AsyncTranslator<F> {
        &self.translator
    }

    /// Find text files in directory
    pub fn find_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TranslationError::FileError {
                path: dir.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_text_file(&path) {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }

    /// Find text files recursively
    pub fn find_files_recursive(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(TranslationError::FileError {
                path: dir.display().to_string(),
                message: "Not a directory".to_string(),
            });
        }

        let files = walkdir::WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .map(|e| e.into_path())
            .filter(|p| p.is_file() && is_text_file(p))
            .collect();

        Ok(files)
    }

    /// Translate one book file and write the joined output to `output`.
    ///
    /// Unit failures stay inline in the written text; the returned report
    /// lists them. Only IO problems are errors.
    pub async fn translate_file(
        &self,
        input: &Path,
        output: &Path,
        source_lang: &str,
        target_lang: &str,
        progress: Option<ProgressCallback>,
        cancel: Option<&CancellationSignal>,
    ) -> Result<TranslationReport> {
        debug!("Translating: {}", input.display());

        let content = tokio::fs::read_to_string(input)
            .await
            .map_err(|e| TranslationError::FileError {
                path: input.display().to_string(),
                message: e.to_string(),
            })?;

        let mut request = self.translator.request(content).with_source_lang(source_lang);
        request.target_lang = target_lang.to_string();
        let report = self.translator.translate_request(&request, progress, cancel).await;

        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| TranslationError::FileError {
                        path: parent.display().to_string(),
                        message: e.to_string(),
                    })?;
            }
        }

        tokio::fs::write(output, &report.text)
            .await
            .map_err(|e| TranslationError::FileError {
                path: output.display().to_string(),
                message: e.to_string(),
            })?;

        if report.has_failures() {
            warn!(
                "Translated with {} failed chunk(s): {} -> {}",
                report.failed_count,
                input.display(),
                output.display()
            );
        } else {
            info!("Translated: {} -> {}", input.display(), output.display());
        }

        Ok(report)
    }
}

/// Check if file is plain text
fn is_text_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| {
            let ext = ext.to_string_lossy().to_lowercase();
            ext == "txt" || ext == "text"
        })
        .unwrap_or(false)
}

/// Output path for `input` when translating a whole directory into `output_dir`
pub fn output_path_for(input: &Path, input_root: &Path, output_dir: &Path, target_lang: &str) -> PathBuf {
    let relative = input.strip_prefix(input_root).unwrap_or(input);
    let mut out = output_dir.join(relative);

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "book".to_string());
    out.set_file_name(format!("{}.{}.txt", stem, target_lang));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TranslatorConfig;
    use crate::core::testing::StubFactory;

    fn processor(factory: StubFactory) -> BookProcessor<StubFactory> {
        let config = TranslatorConfig {
            unit_size_limit: 20,
            inter_unit_delay_ms: 0,
            backoff_base_ms: 0,
            ..Default::default()
        };
        BookProcessor::new(AsyncTranslator::new(factory, config).unwrap())
    }

    #[test]
    fn test_is_text_file() {
        assert!(is_text_file(Path::new("moby.txt")));
        assert!(is_text_file(Path::new("MOBY.TXT")));
        assert!(!is_text_file(Path::new("moby.epub")));
        assert!(!is_text_file(Path::new("README")));
    }

    #[test]
    fn test_output_path_for_keeps_layout() {
        let out = output_path_for(
            Path::new("/books/classics/moby.txt"),
            Path::new("/books"),
            Path::new("/out"),
            "fr",
        );
        assert_eq!(out, PathBuf::from("/out/classics/moby.fr.txt"));
    }

    #[test]
    fn test_find_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.txt"), "B.").unwrap();
        std::fs::write(dir.path().join("a.txt"), "A.").unwrap();
        std::fs::write(dir.path().join("cover.png"), [0u8]).unwrap();
        std::fs::create_dir(dir.path().join("vol2")).unwrap();
        std::fs::write(dir.path().join("vol2").join("c.txt"), "C.").unwrap();

        let processor = processor(StubFactory::uppercase());
        let flat = processor.find_files(dir.path()).unwrap();
        assert_eq!(flat.len(), 2);
        assert!(flat[0].ends_with("a.txt"));

        let deep = processor.find_files_recursive(dir.path()).unwrap();
        assert_eq!(deep.len(), 3);

        assert!(processor.find_files(&dir.path().join("a.txt")).is_err());
    }

    #[tokio::test]
    async fn test_translate_file_writes_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tale.txt");
        let output = dir.path().join("out").join("tale.fr.txt");
        std::fs::write(&input, "It was the best of times. It was the worst of times.").unwrap();

        let factory = StubFactory::uppercase();
        let report = processor(factory.clone())
            .translate_file(&input, &output, "en", "fr", None, None)
            .await
            .unwrap();

        assert_eq!(report.unit_count, 2);
        assert_eq!(factory.calls(), 2);
        assert_eq!(
            std::fs::read_to_string(&output).unwrap(),
            "IT WAS THE BEST OF TIMES. IT WAS THE WORST OF TIMES."
        );
    }

    #[tokio::test]
    async fn test_cancelled_file_keeps_markers() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("tale.txt");
        let output = dir.path().join("tale.fr.txt");
        std::fs::write(&input, "It was the best of times. It was the worst of times.").unwrap();

        let signal = CancellationSignal::new();
        signal.cancel();
        let factory = StubFactory::uppercase();
        let report = processor(factory.clone())
            .translate_file(&input, &output, "en", "fr", None, Some(&signal))
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(factory.calls(), 0);
        assert!(std::fs::read_to_string(&output)
            .unwrap()
            .starts_with("[Translation failed for chunk 1: translation cancelled]"));
    }

    #[tokio::test]
    async fn test_translate_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = processor(StubFactory::uppercase())
            .translate_file(&dir.path().join("nope.txt"), &dir.path().join("o.txt"), "en", "fr", None, None)
            .await;

        assert!(matches!(result, Err(TranslationError::FileError { .. })));
    }
}

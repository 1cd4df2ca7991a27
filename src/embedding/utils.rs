use std::path::Path;

use tokenizers::{PaddingParams, PaddingStrategy, Tokenizer, TruncationParams};

use super::error::EmbeddingError;

/// Resolves `tokenizer.json` from a model directory or an explicit file path.
pub fn tokenizer_path(path: &Path) -> std::path::PathBuf {
    if path.is_dir() {
        path.join("tokenizer.json")
    } else {
        path.to_path_buf()
    }
}

/// Loads a tokenizer that pads each batch to its longest member and truncates at `max_len`.
pub fn load_batch_tokenizer(path: &Path, max_len: usize) -> Result<Tokenizer, EmbeddingError> {
    let path = tokenizer_path(path);
    let mut tokenizer =
        Tokenizer::from_file(&path).map_err(|e| EmbeddingError::Load {
            component: "tokenizer",
            reason: format!("{}: {e}", path.display()),
        })?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_len,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingError::Load {
            component: "tokenizer",
            reason: format!("truncation: {e}"),
        })?;

    tokenizer.with_padding(Some(PaddingParams {
        strategy: PaddingStrategy::BatchLongest,
        ..Default::default()
    }));

    Ok(tokenizer)
}

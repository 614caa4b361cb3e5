use crate::error::PipelineError;

/// Split a byte buffer into ordered pieces of `chunk_size`, the last piece
/// possibly smaller. An input of exactly `chunk_size` bytes yields one piece.
pub fn split(bytes: &[u8], chunk_size: usize) -> Result<Vec<Vec<u8>>, PipelineError> {
    if chunk_size == 0 {
        return Err(PipelineError::ZeroChunkSize);
    }
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }
    Ok(bytes.chunks(chunk_size).map(<[u8]>::to_vec).collect())
}

/// Concatenate pieces in the given order. Fails if the sequence is empty or
/// contributes no bytes at all.
pub fn reassemble(pieces: &[Vec<u8>]) -> Result<Vec<u8>, PipelineError> {
    let total: usize = pieces.iter().map(Vec::len).sum();
    if total == 0 {
        return Err(PipelineError::EmptyInput);
    }
    let mut out = Vec::with_capacity(total);
    for piece in pieces {
        out.extend_from_slice(piece);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_with_short_tail() {
        let pieces = split(&[1u8; 10], 4).unwrap();
        assert_eq!(
            pieces.iter().map(Vec::len).collect::<Vec<_>>(),
            vec![4, 4, 2]
        );
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        // Size exactly N yields a single chunk, N+1 yields sizes [N, 1].
        assert_eq!(split(&[0u8; 8], 8).unwrap().len(), 1);
        let pieces = split(&[0u8; 9], 8).unwrap();
        assert_eq!(pieces.iter().map(Vec::len).collect::<Vec<_>>(), vec![8, 1]);
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(split(&[], 8), Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        assert!(matches!(
            split(&[1u8; 4], 0),
            Err(PipelineError::ZeroChunkSize)
        ));
    }

    #[test]
    fn reassemble_restores_original_order() {
        let original = b"the quick brown fox".to_vec();
        let pieces = split(&original, 5).unwrap();
        assert_eq!(reassemble(&pieces).unwrap(), original);
    }

    #[test]
    fn reassemble_rejects_empty_sequences() {
        assert!(matches!(reassemble(&[]), Err(PipelineError::EmptyInput)));
        assert!(matches!(
            reassemble(&[Vec::new(), Vec::new()]),
            Err(PipelineError::EmptyInput)
        ));
    }
}

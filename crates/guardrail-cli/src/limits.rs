use anyhow::{bail, Result};
use guardrail_core::EvaluationRequest;

pub const MAX_PASSAGES: usize = 50;
pub const MAX_PASSAGE_BYTES: usize = 4 * 1024;
pub const MAX_TOTAL_BYTES: usize = 200 * 1024;

/// Reject requests too large to evaluate. Sizes are UTF-8 bytes.
pub fn check_request(request: &EvaluationRequest) -> Result<()> {
    if request.passages.len() > MAX_PASSAGES {
        bail!(
            "too many passages: {} > {}",
            request.passages.len(),
            MAX_PASSAGES
        );
    }

    let mut total = request.question.len() + request.answer.len();
    for (i, passage) in request.passages.iter().enumerate() {
        let size = passage.text.len();
        if size > MAX_PASSAGE_BYTES {
            bail!(
                "passage {} exceeds size limit: {} > {} bytes",
                i,
                size,
                MAX_PASSAGE_BYTES
            );
        }
        total += size;
    }

    if total > MAX_TOTAL_BYTES {
        bail!(
            "total request size exceeds limit: {} > {} bytes",
            total,
            MAX_TOTAL_BYTES
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use guardrail_core::Passage;

    fn request(passages: Vec<Passage>) -> EvaluationRequest {
        EvaluationRequest {
            question: "q".to_string(),
            answer: "a".to_string(),
            passages,
        }
    }

    #[test]
    fn test_small_request_passes() {
        assert!(check_request(&request(vec![Passage::new("p1", "text")])).is_ok());
    }

    #[test]
    fn test_too_many_passages() {
        let passages = (0..=MAX_PASSAGES)
            .map(|i| Passage::new(format!("p{}", i), "x"))
            .collect();
        let err = check_request(&request(passages)).unwrap_err();
        assert!(err.to_string().contains("too many passages: 51 > 50"));
    }

    #[test]
    fn test_passage_size_limit() {
        let at_limit = Passage::new("p0", "x".repeat(MAX_PASSAGE_BYTES));
        assert!(check_request(&request(vec![at_limit])).is_ok());

        let over = Passage::new("p0", "x".repeat(MAX_PASSAGE_BYTES + 1));
        let err = check_request(&request(vec![over])).unwrap_err();
        assert!(err.to_string().starts_with("passage 0 exceeds size limit"));
    }

    #[test]
    fn test_passage_size_counts_bytes() {
        // 'é' is two bytes in UTF-8
        let wide = Passage::new("p0", "é".repeat(MAX_PASSAGE_BYTES / 2 + 1));
        assert!(check_request(&request(vec![wide])).is_err());
    }

    #[test]
    fn test_total_size_limit() {
        let mut req = request(vec![Passage::new("p0", "x".repeat(MAX_PASSAGE_BYTES))]);
        req.answer = "y".repeat(MAX_TOTAL_BYTES);
        let err = check_request(&req).unwrap_err();
        assert!(err.to_string().contains("total request size exceeds limit"));
    }
}

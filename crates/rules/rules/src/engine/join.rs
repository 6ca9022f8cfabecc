use crate::network::{JoinNode, JoinOp};

use super::token::Token;

impl JoinNode {
    /// Combine the activations received on each operand slot.
    ///
    /// `inputs` holds one activation list per operand, in operand order.
    /// At most `limit` activations are produced.
    pub fn combine<'a, F>(&self, inputs: &[Vec<Token<'a, F>>], limit: usize) -> Vec<Token<'a, F>> {
        let no_input: &[Token<'a, F>] = &[];
        let left = inputs.first().map_or(no_input, Vec::as_slice);
        let right = inputs.get(1).map_or(no_input, Vec::as_slice);

        match self.op() {
            JoinOp::And => cross(left, right, limit),
            JoinOp::Or => match (left.is_empty(), right.is_empty()) {
                (true, true) => Vec::new(),
                (false, true) => left.iter().take(limit).cloned().collect(),
                (true, false) => right.iter().take(limit).cloned().collect(),
                (false, false) => cross(left, right, limit),
            },
            JoinOp::Not if left.is_empty() && limit > 0 => vec![Token::empty()],
            JoinOp::Not => Vec::new(),
        }
    }
}

/// Every left activation paired with every right activation, up to `limit`.
fn cross<'a, F>(left: &[Token<'a, F>], right: &[Token<'a, F>], limit: usize) -> Vec<Token<'a, F>> {
    left.iter()
        .flat_map(|l| right.iter().map(move |r| l.merge(r)))
        .take(limit)
        .collect()
}

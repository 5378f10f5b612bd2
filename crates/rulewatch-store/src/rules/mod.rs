//! Rule record persistence
//!
//! - [`writer`]: batched insertion of a capture's rules
//! - [`reconcile`]: the two explicit reads, the plan application and the
//!   live invariant check

pub mod reconcile;
pub mod writer;

pub use reconcile::{
    apply_reconciliation, load_added_by, load_previously_live, reconcile_snapshot,
    verify_live_invariant,
};
pub use writer::{validate_batch_size, write_rule_batches, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};

/// `(?, ?, ...)` with `n` placeholders
pub(crate) fn placeholders(n: usize) -> String {
    let mut out = String::with_capacity(n * 2 + 2);
    out.push('(');
    for i in 0..n {
        if i > 0 {
            out.push(',');
        }
        out.push('?');
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "(?)");
        assert_eq!(placeholders(3), "(?,?,?)");
    }
}

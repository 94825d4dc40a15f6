//! C3 linearization shared by classes and metaclasses.
//!
//! Identity is pointer identity of the `Arc`s, so two distinct classes that
//! happen to share a name are never merged.

use std::sync::Arc;

/// Merge the given sequences into one order that respects each of them.
///
/// Returns `None` when no such order exists.
fn merge<T>(mut sequences: Vec<Vec<Arc<T>>>) -> Option<Vec<Arc<T>>> {
    let mut result = Vec::new();

    loop {
        sequences.retain(|seq| !seq.is_empty());
        if sequences.is_empty() {
            return Some(result);
        }

        // A head is usable only if it does not appear in the tail of any sequence
        let candidate = sequences
            .iter()
            .map(|seq| &seq[0])
            .find(|head| {
                !sequences
                    .iter()
                    .any(|seq| seq[1..].iter().any(|item| Arc::ptr_eq(item, head)))
            })
            .cloned()?;

        for seq in sequences.iter_mut() {
            if Arc::ptr_eq(&seq[0], &candidate) {
                seq.remove(0);
            }
        }
        result.push(candidate);
    }
}

/// Linearize the ancestors of something with the given direct bases.
///
/// `full_order` must return a base's own linearization, the base itself
/// first. The returned order excludes the thing being linearized.
pub(crate) fn linearize<T, F>(bases: &[Arc<T>], full_order: F) -> Option<Vec<Arc<T>>>
where
    F: Fn(&Arc<T>) -> Vec<Arc<T>>,
{
    let mut sequences: Vec<Vec<Arc<T>>> = bases.iter().map(full_order).collect();
    sequences.push(bases.to_vec());
    merge(sequences)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Node {
        name: &'static str,
        order: Vec<Arc<Node>>,
    }

    fn node(name: &'static str, bases: &[Arc<Node>]) -> Arc<Node> {
        let ancestors = linearize(bases, full).expect("consistent");
        Arc::new(Node {
            name,
            order: ancestors,
        })
    }

    fn full(node: &Arc<Node>) -> Vec<Arc<Node>> {
        let mut order = vec![node.clone()];
        order.extend(node.order.iter().cloned());
        order
    }

    fn names(order: &[Arc<Node>]) -> Vec<&'static str> {
        order.iter().map(|n| n.name).collect()
    }

    #[test]
    fn test_single_chain() {
        let o = node("O", &[]);
        let a = node("A", &[o.clone()]);
        let b = node("B", &[a]);

        assert_eq!(names(&b.order), vec!["A", "O"]);
    }

    #[test]
    fn test_diamond() {
        let o = node("O", &[]);
        let a = node("A", &[o.clone()]);
        let b = node("B", &[o.clone()]);
        let c = node("C", &[a, b]);

        assert_eq!(names(&c.order), vec!["A", "B", "O"]);
    }

    #[test]
    fn test_inconsistent_order_fails() {
        let o = node("O", &[]);
        let a = node("A", &[o.clone()]);
        let b = node("B", &[a.clone()]);

        // A before B contradicts B's own order (B before A)
        assert!(linearize(&[a, b], full).is_none());
    }
}

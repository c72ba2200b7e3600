//! Domain-specific assertion macros for strata harnesses.
//!
//! These wrap `pretty_assertions` and add failure messages that name the
//! node type and the invariant that was violated.

/// Assert the final node set of a type, given by name.
///
/// ```rust
/// assert_nodes!(index, weeded, "sentence", [10]);
/// ```
#[macro_export]
macro_rules! assert_nodes {
    ($index:expr, $weeded:expr, $ntype:expr, [$($node:expr),* $(,)?]) => {{
        let index: &strata_core::CorpusIndex = &$index;
        let name: &str = $ntype;
        let ntype = index
            .chain()
            .lookup(name)
            .unwrap_or_else(|| panic!("assert_nodes! failed: no node type {:?}", name));
        let expected: strata_core::NodeSet = [$($node),*].into_iter().collect();
        let actual = $weeded.set(ntype);
        if *actual != expected {
            panic!(
                "assert_nodes! failed for type {:?}:\n  expected: {:?}\n  actual:   {:?}",
                name, expected, actual
            );
        }
    }};
}

/// Assert that adjacent final sets are each other's Up image and Down
/// closure.
#[macro_export]
macro_rules! assert_consistent {
    ($index:expr, $weeded:expr) => {{
        let index: &strata_core::CorpusIndex = &$index;
        let weeded: &strata_core::weed::Weeded = &$weeded;
        let chain = index.chain();
        for lower in chain.iter() {
            let Some(upper) = chain.parent_of(lower) else { continue };
            let up_image: strata_core::NodeSet = weeded
                .set(lower)
                .iter()
                .filter_map(|n| index.up(*n))
                .collect();
            if up_image != *weeded.set(upper) {
                panic!(
                    "assert_consistent! failed: Up({}) = {:?} but the {} set is {:?}",
                    chain.name(lower),
                    up_image,
                    chain.name(upper),
                    weeded.set(upper)
                );
            }
            let down_image: strata_core::NodeSet = weeded
                .set(upper)
                .iter()
                .flat_map(|n| index.children(*n))
                .collect();
            if !down_image.is_superset(weeded.set(lower)) {
                panic!(
                    "assert_consistent! failed: the {} set {:?} escapes Down({}) = {:?}",
                    chain.name(lower),
                    weeded.set(lower),
                    chain.name(upper),
                    down_image
                );
            }
        }
    }};
}

/// Assert the per-type statistics of a run, as `(name, count)` pairs.
#[macro_export]
macro_rules! assert_stats {
    ($outcome:expr, [$(($name:expr, $count:expr)),* $(,)?]) => {{
        let actual: Vec<(String, usize)> = $outcome
            .stats
            .iter()
            .map(|(n, c)| (n.to_string(), c))
            .collect();
        let mut expected: Vec<(String, usize)> = vec![$(($name.to_string(), $count)),*];
        expected.sort();
        pretty_assertions::assert_eq!(actual, expected, "assert_stats! failed");
    }};
}

/// Assert that a run recorded an error for one layer, matching a pattern.
#[macro_export]
macro_rules! assert_layer_error {
    ($outcome:expr, $ntype:expr, $layer:expr, $pat:pat) => {{
        let found = $outcome
            .errors
            .iter()
            .find(|e| e.ntype == $ntype && e.layer == $layer);
        match found {
            Some(e) if matches!(e.error, $pat) => {}
            Some(e) => panic!(
                "assert_layer_error! failed: {}/{} failed with {:?}, expected {}",
                $ntype,
                $layer,
                e.error,
                stringify!($pat)
            ),
            None => panic!(
                "assert_layer_error! failed: no error for {}/{}.\n  Recorded: {:?}",
                $ntype,
                $layer,
                $outcome.errors.iter().map(|e| e.to_string()).collect::<Vec<_>>()
            ),
        }
    }};
}

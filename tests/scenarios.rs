//! Walkthroughs of the trees' public API, run against both flavours.

macro_rules! scenarios {
    ($module:ident) => {
        mod $module {
            use spliced_bst::$module::Tree;

            fn sample() -> Tree<i32> {
                let mut tree = Tree::new();
                for x in [5, 3, 8, 1, 4] {
                    tree.insert(x);
                }
                tree
            }

            #[test]
            fn insert_then_read_back_in_order() {
                let tree = sample();

                assert_eq!(tree.to_vec(), [1, 3, 4, 5, 8]);
                assert_eq!(tree.len(), 5);
                assert!(!tree.is_empty());
            }

            #[test]
            fn remove_node_with_two_children() {
                let mut tree = sample();

                assert_eq!(tree.remove(&3), Some(3));

                assert_eq!(tree.to_vec(), [1, 4, 5, 8]);
                assert_eq!(tree.len(), 4);
                assert_eq!(tree.find(&1), Some(&1));
                assert_eq!(tree.find(&3), None);
                assert_eq!(tree.check_invariants(), Ok(()));
            }

            #[test]
            fn find_hit_and_miss() {
                let tree = sample();

                assert_eq!(tree.find(&8), Some(&8));
                assert_eq!(tree.find(&99), None);
            }

            #[test]
            fn rebalance_ascending_chain() {
                let mut tree: Tree<_> = (1..=7).collect();
                assert_eq!(tree.height(), 7);

                tree.rebalance();

                assert_eq!(tree.height(), 3);
                assert_eq!(tree.len(), 7);
                assert_eq!(tree.to_vec(), [1, 2, 3, 4, 5, 6, 7]);
            }

            #[test]
            fn remove_on_empty_tree() {
                let mut tree = Tree::<i32>::new();

                assert_eq!(tree.remove(&5), None);
                assert_eq!(tree.len(), 0);
                assert!(tree.is_empty());
            }

            #[test]
            fn duplicates() {
                let mut tree = Tree::new();
                tree.insert(5);
                tree.insert(5);

                assert_eq!(tree.len(), 2);
                assert_eq!(tree.to_vec(), [5, 5]);

                tree.remove(&5);
                assert_eq!(tree.len(), 1);
                assert_eq!(tree.to_vec(), [5]);
            }

            #[test]
            fn snapshots_are_independent() {
                let mut tree = sample();
                let before = tree.to_vec();

                tree.insert(2);

                assert_eq!(before, [1, 3, 4, 5, 8]);
                assert_eq!(tree.to_vec(), [1, 2, 3, 4, 5, 8]);
            }

            #[test]
            fn seeded_tree() {
                let mut tree = Tree::with_value("m");
                tree.insert("a");
                tree.insert("z");

                assert_eq!(tree.first(), Some(&"a"));
                assert_eq!(tree.last(), Some(&"z"));
                assert_eq!(tree.find(&"m"), Some(&"m"));
                assert_eq!(tree.height(), 2);
            }

            #[test]
            fn clear_is_repeatable() {
                let mut tree = sample();

                tree.clear();
                tree.clear();

                assert!(tree.is_empty());
                assert_eq!(tree.to_vec(), Vec::<i32>::new());
            }

            #[test]
            fn remove_and_insert_cycles() {
                let mut tree = sample();

                for round in 0..50 {
                    let x = round % 10;
                    tree.insert(x);
                    tree.insert(x);
                    assert_eq!(tree.remove(&x), Some(x));
                    if round % 7 == 0 {
                        tree.rebalance();
                    }
                }

                assert_eq!(tree.len(), 55);
                assert_eq!(tree.check_invariants(), Ok(()));
                let values = tree.into_sorted_vec();
                assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
            }

            #[test]
            fn borrowed_and_owned_iteration() {
                let tree = sample();

                let mut borrowed = Vec::new();
                for x in &tree {
                    borrowed.push(*x);
                }
                assert_eq!(borrowed, [1, 3, 4, 5, 8]);
                assert_eq!(tree.into_iter().rev().collect::<Vec<_>>(), [8, 5, 4, 3, 1]);
            }
        }
    };
}

scenarios!(linked);
scenarios!(boxed);

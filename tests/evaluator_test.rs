//! Integration tests for merge cost evaluation over whole trees

use proptest::prelude::*;

use anvilcalc::application::{CollisionPolicy, CostEvaluator, Disqualification, EvaluationError};
use anvilcalc::domain::{
    assemble, CandidateEnumerator, EnchantmentTable, Item, ItemType, PriorWork, ShapeBuilder,
    ShapeLayout,
};
use anvilcalc::util::testing::{book, init_test_setup, leaf};

fn evaluator(ceiling: u32) -> CostEvaluator<'static> {
    CostEvaluator::new(EnchantmentTable::standard(), ceiling, CollisionPolicy::Combine)
}

#[test]
fn given_same_tree_when_evaluated_twice_then_identical_results() {
    init_test_setup();
    let items = vec![
        leaf("Sword", ItemType::Item, &[("sharpness", 2, true)], 0),
        book("A", "sharpness", 2),
        book("B", "looting", 3),
    ];
    let candidate = CandidateEnumerator::new(3).unwrap().nth(4).unwrap();

    let first = evaluator(40)
        .evaluate(assemble(&candidate.shape, &candidate.assignment, &items).unwrap())
        .unwrap();
    let second = evaluator(40)
        .evaluate(assemble(&candidate.shape, &candidate.assignment, &items).unwrap())
        .unwrap();

    assert_eq!(first.total_cost, second.total_cost);
    assert_eq!(first.prior_work, second.prior_work);
    assert_eq!(first.enchantments, second.enchantments);
    assert_eq!(first.tree.len(), second.tree.len());
}

#[test]
fn given_three_books_when_evaluating_then_internal_nodes_carry_partial_results() {
    init_test_setup();
    // Shape 0 expands the target slot: ((0, 1), 2)
    let items = vec![
        book("Prot", "protection", 1),
        book("Unb", "unbreaking", 1),
        book("Mend", "mending", 1),
    ];
    let builder = ShapeBuilder::new(ShapeLayout::new(3).unwrap());
    let shapes = builder.shapes();
    let tree = assemble(&shapes[0], &[0, 1, 2], &items).unwrap();

    let evaluation = evaluator(40).evaluate(tree).unwrap();

    // inner: unbreaking book (1) onto protection, root: 1 penalty + mending book (2)
    assert_eq!(evaluation.total_cost, 1 + 3);
    assert_eq!(evaluation.prior_work.value(), 2);
    let internal_costs: u32 = evaluation
        .tree
        .iter()
        .filter(|(_, node)| !node.is_leaf())
        .map(|(_, node)| node.data.item.cost)
        .sum();
    assert_eq!(internal_costs, evaluation.total_cost);
}

#[test]
fn given_expensive_leaf_when_evaluating_then_whole_tree_disqualified() {
    init_test_setup();
    let items = vec![
        leaf("Worn pick", ItemType::Item, &[], 5),
        leaf("Worn book", ItemType::Book, &[("efficiency", 5, false)], 5),
    ];
    let candidate = CandidateEnumerator::new(2).unwrap().next().unwrap();
    let tree = assemble(&candidate.shape, &candidate.assignment, &items).unwrap();

    let result = evaluator(40).evaluate(tree);

    assert!(matches!(
        result,
        Err(EvaluationError::Disqualified(Disqualification::TooExpensive {
            cost: 67,
            ceiling: 40
        }))
    ));
}

const NAMES: [&str; 6] = [
    "protection",
    "unbreaking",
    "mending",
    "sharpness",
    "efficiency",
    "thorns",
];

fn arb_item() -> impl Strategy<Value = Item> {
    (
        prop::sample::subsequence(NAMES.to_vec(), 0..3),
        1u32..=3,
        0u8..=4,
        any::<bool>(),
    )
        .prop_map(|(names, level, prior_work, is_book)| {
            let entries: Vec<(&str, u32, bool)> =
                names.iter().map(|&name| (name, level, false)).collect();
            let item_type = if is_book { ItemType::Book } else { ItemType::Item };
            leaf("Generated", item_type, &entries, prior_work)
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_prior_work_grows_by_one_and_caps_at_six(
        items in prop::collection::vec(arb_item(), 1..=5),
        pick in any::<prop::sample::Index>(),
    ) {
        let total = CandidateEnumerator::new(items.len())
            .unwrap()
            .layout()
            .total_candidates()
            .unwrap() as usize;
        let candidate = CandidateEnumerator::new(items.len())
            .unwrap()
            .nth(pick.index(total))
            .unwrap();
        let tree = assemble(&candidate.shape, &candidate.assignment, &items).unwrap();

        let evaluation = evaluator(u32::MAX).evaluate(tree).unwrap();

        let mut internal_costs = 0;
        for (_, node) in evaluation.tree.iter() {
            prop_assert!(node.data.item.prior_work.value() <= PriorWork::MAX);
            if node.is_leaf() {
                continue;
            }
            internal_costs += node.data.item.cost;
            let children: Vec<u8> = node
                .children
                .iter()
                .map(|&c| evaluation.tree.get_node(c).unwrap().data.item.prior_work.value())
                .collect();
            let expected = children.iter().copied().max().unwrap().min(5) + 1;
            prop_assert_eq!(node.data.item.prior_work.value(), expected);
        }
        prop_assert_eq!(internal_costs, evaluation.total_cost);
    }

    #[test]
    fn prop_final_item_keeps_every_input_enchantment(
        items in prop::collection::vec(arb_item(), 1..=4),
    ) {
        let candidate = CandidateEnumerator::new(items.len()).unwrap().next().unwrap();
        let tree = assemble(&candidate.shape, &candidate.assignment, &items).unwrap();

        let evaluation = evaluator(u32::MAX).evaluate(tree).unwrap();

        for item in &items {
            for enchantment in item.enchantments.iter() {
                prop_assert!(evaluation.enchantments.contains(enchantment.id));
            }
        }
    }
}

use xpatterns::engine::runtime::{DynamicContextBuilder, StaticContextBuilder};
use xpatterns::iter::{ConcatIterator, ForwardIterator, ListIterator, Position, SingletonIterator};
use xpatterns::model::simple::SimpleNode;
use xpatterns::xdm::{XdmAtomicValue as A, XdmItem as I};
use xpatterns::{Expr, ExpandedName, compile};

fn int(i: i64) -> I<SimpleNode> {
    I::Atomic(A::Integer(i))
}

#[test]
fn singleton_yields_once_and_stays_exhausted() {
    let mut it = SingletonIterator::new(int(1));
    assert_eq!(it.position(), Position::NotStarted);
    assert_eq!(it.count().expect("count"), 1);
    assert_eq!(it.next_item().expect("item").expect("ok"), int(1));
    assert_eq!(it.position().as_i64(), 1);
    assert_eq!(it.current(), Some(&int(1)));
    assert!(it.next_item().is_none());
    assert_eq!(it.position().as_i64(), -1);
    assert!(it.current().is_none());
    assert!(it.next_item().is_none());
}

#[test]
fn copy_is_independent_of_the_original() {
    let mut it = ListIterator::new(vec![int(1), int(2), int(3)]);
    it.next_item();
    let mut copy = it.copy();
    assert_eq!(copy.position(), Position::NotStarted);
    assert_eq!(copy.next_item().expect("item").expect("ok"), int(1));
    assert_eq!(copy.next_item().expect("item").expect("ok"), int(2));
    assert_eq!(copy.position(), Position::At(2));
    assert_eq!(it.position(), Position::At(1));
    assert_eq!(it.current(), Some(&int(1)));
    assert_eq!(it.next_item().expect("item").expect("ok"), int(2));
    assert_eq!(it.count().expect("count"), 3);
}

#[test]
fn reversed_list() {
    let it = ListIterator::new(vec![int(1), int(2)]);
    let mut rev = it.to_reversed().expect("reverse");
    assert_eq!(rev.next_item().expect("item").expect("ok"), int(2));
    assert_eq!(rev.next_item().expect("item").expect("ok"), int(1));
    assert!(rev.next_item().is_none());
}

#[test]
fn concat_counts_all_parts() {
    let parts: Vec<Box<dyn ForwardIterator<SimpleNode>>> = vec![
        Box::new(SingletonIterator::new(int(1))),
        Box::new(ListIterator::new(Vec::new())),
        Box::new(ListIterator::new(vec![int(2), int(3)])),
    ];
    let it = ConcatIterator::new(parts);
    assert_eq!(it.count().expect("count"), 3);
    assert_eq!(it.position(), Position::NotStarted);
}

#[test]
fn variable_streams_are_repeatable() {
    let name = ExpandedName::local("xs");
    let sctx = StaticContextBuilder::new()
        .with_variable(name.clone(), "xs:integer*".parse().expect("type"))
        .build();
    let compiled = compile(Expr::variable(name.clone()), &sctx).expect("compile");
    let dctx = DynamicContextBuilder::<SimpleNode>::new()
        .with_variable(name, vec![int(1), int(2)])
        .build();
    let first = compiled.evaluate(&dctx).expect("eval");
    let second = compiled.evaluate(&dctx).expect("eval");
    assert_eq!(first, second);
    assert_eq!(first, vec![int(1), int(2)]);
}
